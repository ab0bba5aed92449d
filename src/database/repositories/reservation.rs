//! Reservation repository implementation

use sqlx::PgPool;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use crate::models::reservation::Reservation;
use crate::utils::errors::BaropotError;

const RESERVATION_COLUMNS: &str = "id, restaurant_id, user_id, date, time, status, party_size, description, created_at, updated_at";

/// Fields of a reservation about to be stored
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub restaurant_id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub party_size: Option<i32>,
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct ReservationRepository {
    pool: PgPool,
}

impl ReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Whether a non-cancelled reservation holds the slot
    pub async fn slot_taken(&self, restaurant_id: i64, date: NaiveDate, time: NaiveTime) -> Result<bool, BaropotError> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM restaurant_reservations
                WHERE restaurant_id = $1 AND date = $2 AND time = $3 AND status <> 'CANCELLED'
            )
            "#
        )
        .bind(restaurant_id)
        .bind(date)
        .bind(time)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    /// Store an APPROVED reservation; `None` when the slot was claimed concurrently
    pub async fn create(&self, reservation: &NewReservation) -> Result<Option<Reservation>, BaropotError> {
        let created = sqlx::query_as::<_, Reservation>(&format!(
            r#"
            INSERT INTO restaurant_reservations (restaurant_id, user_id, date, time, status, party_size, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 'APPROVED', $5, $6, $7, $7)
            ON CONFLICT DO NOTHING
            RETURNING {RESERVATION_COLUMNS}
            "#
        ))
        .bind(reservation.restaurant_id)
        .bind(reservation.user_id)
        .bind(reservation.date)
        .bind(reservation.time)
        .bind(reservation.party_size)
        .bind(&reservation.description)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(created)
    }

    /// Reservations made by the user, upcoming first
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<Reservation>, BaropotError> {
        let reservations = sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM restaurant_reservations WHERE user_id = $1 ORDER BY date DESC, time DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reservations)
    }

    /// Flip APPROVED reservations scheduled before `cutoff` to COMPLETED
    pub async fn complete_before(&self, cutoff: NaiveDateTime) -> Result<Vec<i64>, BaropotError> {
        let ids: Vec<i64> = sqlx::query_scalar(
            r#"
            UPDATE restaurant_reservations
            SET status = 'COMPLETED', updated_at = $2
            WHERE status = 'APPROVED' AND (date + time) < $1
            RETURNING id
            "#
        )
        .bind(cutoff)
        .bind(Utc::now())
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}
