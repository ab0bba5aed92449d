//! Baropot and participant repository implementation

use sqlx::{FromRow, PgConnection, PgPool, Postgres, QueryBuilder};
use chrono::{NaiveDate, NaiveTime, Utc};
use crate::models::baropot::{
    Baropot, BaropotStatus, ContactMethod, FindBaropotsQuery, JoinedStatus, Participant,
    ParticipantAgeGroup, ParticipantGender, ParticipantView, PaymentMethod,
};
use crate::utils::errors::BaropotError;
use crate::utils::location::BoundingBox;

const BAROPOT_COLUMNS: &str = "b.id, b.restaurant_id, b.status, b.title, b.location, b.max_participants, b.date, b.time, \
    b.participant_gender, b.participant_age_group, b.contact_method, b.estimated_cost_per_person, b.payment_method, \
    b.description, b.rule, b.created_at, b.updated_at";

const PARTICIPANT_COLUMNS: &str = "id, baropot_id, user_id, is_host, joined_status, join_message, host_memo, created_at, updated_at";

/// Validated fields of a baropot about to be stored
#[derive(Debug, Clone)]
pub struct NewBaropot {
    pub restaurant_id: i64,
    pub title: String,
    pub location: String,
    pub max_participants: i32,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub participant_gender: ParticipantGender,
    pub participant_age_group: ParticipantAgeGroup,
    pub contact_method: Option<ContactMethod>,
    pub estimated_cost_per_person: Option<i32>,
    pub payment_method: PaymentMethod,
    pub description: String,
    pub rule: Option<String>,
}

/// Column changes for an update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct BaropotChanges {
    pub title: Option<String>,
    pub location: Option<String>,
    pub max_participants: Option<i32>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub participant_gender: Option<ParticipantGender>,
    pub participant_age_group: Option<ParticipantAgeGroup>,
    pub contact_method: Option<ContactMethod>,
    pub estimated_cost_per_person: Option<i32>,
    pub payment_method: Option<PaymentMethod>,
    pub description: Option<String>,
    pub rule: Option<String>,
}

/// Baropot row joined with its restaurant name
#[derive(Debug, Clone, FromRow)]
pub struct BaropotRow {
    #[sqlx(flatten)]
    pub baropot: Baropot,
    pub restaurant_name: String,
}

/// Participant view tagged with its baropot
#[derive(Debug, Clone, FromRow)]
pub struct ParticipantRow {
    pub baropot_id: i64,
    #[sqlx(flatten)]
    pub participant: ParticipantView,
}

#[derive(Clone)]
pub struct BaropotRepository {
    pool: PgPool,
}

impl BaropotRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new baropot in OPEN state
    pub async fn create(&self, conn: &mut PgConnection, new: &NewBaropot) -> Result<Baropot, BaropotError> {
        let baropot = sqlx::query_as::<_, Baropot>(
            r#"
            INSERT INTO baropots AS b (restaurant_id, status, title, location, max_participants, date, time,
                                       participant_gender, participant_age_group, contact_method,
                                       estimated_cost_per_person, payment_method, description, rule,
                                       created_at, updated_at)
            VALUES ($1, 'OPEN', $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $14)
            RETURNING *
            "#
        )
        .bind(new.restaurant_id)
        .bind(&new.title)
        .bind(&new.location)
        .bind(new.max_participants)
        .bind(new.date)
        .bind(new.time)
        .bind(new.participant_gender)
        .bind(new.participant_age_group)
        .bind(new.contact_method)
        .bind(new.estimated_cost_per_person)
        .bind(new.payment_method)
        .bind(&new.description)
        .bind(&new.rule)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;

        Ok(baropot)
    }

    /// Load and lock the baropot row for the rest of the transaction
    pub async fn lock(&self, conn: &mut PgConnection, id: i64) -> Result<Option<Baropot>, BaropotError> {
        let baropot = sqlx::query_as::<_, Baropot>(&format!(
            "SELECT {BAROPOT_COLUMNS} FROM baropots b WHERE b.id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(baropot)
    }

    /// Find baropot by ID together with its restaurant name
    pub async fn find_by_id(&self, id: i64) -> Result<Option<BaropotRow>, BaropotError> {
        let row = sqlx::query_as::<_, BaropotRow>(&format!(
            "SELECT {BAROPOT_COLUMNS}, r.name AS restaurant_name FROM baropots b JOIN restaurants r ON r.id = b.restaurant_id WHERE b.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Search baropots with the listing filters
    pub async fn search(&self, query: &FindBaropotsQuery, window: Option<BoundingBox>) -> Result<Vec<BaropotRow>, BaropotError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {BAROPOT_COLUMNS}, r.name AS restaurant_name FROM baropots b JOIN restaurants r ON r.id = b.restaurant_id WHERE TRUE"
        ));

        if !query.statuses.is_empty() {
            let statuses: Vec<String> = query.statuses.iter().map(|s| s.as_str().to_string()).collect();
            builder.push(" AND b.status::text = ANY(").push_bind(statuses).push(")");
        }

        if let Some(title) = &query.title {
            builder.push(" AND b.title ILIKE ").push_bind(format!("%{}%", title));
        }

        if !query.tags.is_empty() {
            builder
                .push(" AND EXISTS (SELECT 1 FROM baropot_tag_links l JOIN baropot_tags t ON t.id = l.tag_id WHERE l.baropot_id = b.id AND t.name = ANY(")
                .push_bind(query.tags.clone())
                .push("))");
        }

        if !query.genders.is_empty() {
            let genders: Vec<String> = query.genders.iter().map(|g| g.as_str().to_string()).collect();
            builder.push(" AND b.participant_gender::text = ANY(").push_bind(genders).push(")");
        }

        if !query.age_groups.is_empty() {
            let groups: Vec<String> = query.age_groups.iter().map(|g| g.as_str().to_string()).collect();
            builder.push(" AND b.participant_age_group::text = ANY(").push_bind(groups).push(")");
        }

        if let Some(name) = &query.restaurant_name {
            builder.push(" AND r.name ILIKE ").push_bind(format!("%{}%", name));
        }

        if let Some(category) = query.restaurant_category {
            builder.push(" AND r.category::text = ").push_bind(category.as_str().to_string());
        }

        if let Some(address) = &query.address {
            builder.push(" AND r.address ILIKE ").push_bind(format!("%{}%", address));
        }

        if let Some(window) = window {
            builder
                .push(" AND r.lat BETWEEN ").push_bind(window.min_lat)
                .push(" AND ").push_bind(window.max_lat)
                .push(" AND r.lng BETWEEN ").push_bind(window.min_lng)
                .push(" AND ").push_bind(window.max_lng);
        }

        if let Some(user_id) = query.participant_user_id {
            builder
                .push(" AND EXISTS (SELECT 1 FROM baropot_participants p WHERE p.baropot_id = b.id AND p.user_id = ")
                .push_bind(user_id)
                .push(")");
        }

        builder.push(" ORDER BY b.date ASC, b.time ASC, b.id ASC");

        let rows = builder
            .build_query_as::<BaropotRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Apply column changes to a locked baropot
    pub async fn update(&self, conn: &mut PgConnection, id: i64, changes: &BaropotChanges) -> Result<Baropot, BaropotError> {
        let baropot = sqlx::query_as::<_, Baropot>(
            r#"
            UPDATE baropots
            SET title = COALESCE($2, title),
                location = COALESCE($3, location),
                max_participants = COALESCE($4, max_participants),
                date = COALESCE($5, date),
                time = COALESCE($6, time),
                participant_gender = COALESCE($7, participant_gender),
                participant_age_group = COALESCE($8, participant_age_group),
                contact_method = COALESCE($9, contact_method),
                estimated_cost_per_person = COALESCE($10, estimated_cost_per_person),
                payment_method = COALESCE($11, payment_method),
                description = COALESCE($12, description),
                rule = COALESCE($13, rule),
                updated_at = $14
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.location)
        .bind(changes.max_participants)
        .bind(changes.date)
        .bind(changes.time)
        .bind(changes.participant_gender)
        .bind(changes.participant_age_group)
        .bind(changes.contact_method)
        .bind(changes.estimated_cost_per_person)
        .bind(changes.payment_method)
        .bind(&changes.description)
        .bind(&changes.rule)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;

        Ok(baropot)
    }

    /// Overwrite the status column
    pub async fn set_status(&self, conn: &mut PgConnection, id: i64, status: BaropotStatus) -> Result<(), BaropotError> {
        sqlx::query("UPDATE baropots SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(status)
            .bind(Utc::now())
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    /// Insert a participant row
    pub async fn add_participant(
        &self,
        conn: &mut PgConnection,
        baropot_id: i64,
        user_id: i64,
        is_host: bool,
        status: JoinedStatus,
        join_message: Option<&str>,
    ) -> Result<Participant, BaropotError> {
        let participant = sqlx::query_as::<_, Participant>(&format!(
            r#"
            INSERT INTO baropot_participants (baropot_id, user_id, is_host, joined_status, join_message, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING {PARTICIPANT_COLUMNS}
            "#
        ))
        .bind(baropot_id)
        .bind(user_id)
        .bind(is_host)
        .bind(status)
        .bind(join_message)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;

        Ok(participant)
    }

    /// The user's participant row, whatever its status
    pub async fn find_participant(&self, conn: &mut PgConnection, baropot_id: i64, user_id: i64) -> Result<Option<Participant>, BaropotError> {
        let participant = sqlx::query_as::<_, Participant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM baropot_participants WHERE baropot_id = $1 AND user_id = $2"
        ))
        .bind(baropot_id)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(participant)
    }

    /// User id of the baropot host
    pub async fn host_id(&self, conn: &mut PgConnection, baropot_id: i64) -> Result<Option<i64>, BaropotError> {
        let host: Option<i64> = sqlx::query_scalar(
            "SELECT user_id FROM baropot_participants WHERE baropot_id = $1 AND is_host"
        )
        .bind(baropot_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(host)
    }

    /// Number of APPROVED participants, host included
    pub async fn count_approved(&self, conn: &mut PgConnection, baropot_id: i64) -> Result<i64, BaropotError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM baropot_participants WHERE baropot_id = $1 AND joined_status = 'APPROVED'"
        )
        .bind(baropot_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(count)
    }

    /// Set a participant's status, optionally recording a host memo
    pub async fn set_participant_status(
        &self,
        conn: &mut PgConnection,
        baropot_id: i64,
        user_id: i64,
        status: JoinedStatus,
        host_memo: Option<&str>,
    ) -> Result<(), BaropotError> {
        sqlx::query(
            r#"
            UPDATE baropot_participants
            SET joined_status = $3, host_memo = COALESCE($4, host_memo), updated_at = $5
            WHERE baropot_id = $1 AND user_id = $2
            "#
        )
        .bind(baropot_id)
        .bind(user_id)
        .bind(status)
        .bind(host_memo)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Participants of the given baropots with their display names
    pub async fn participants_for(&self, baropot_ids: &[i64]) -> Result<Vec<ParticipantRow>, BaropotError> {
        let rows = sqlx::query_as::<_, ParticipantRow>(
            r#"
            SELECT p.baropot_id, p.user_id, u.name, p.is_host, p.joined_status, p.join_message, p.host_memo
            FROM baropot_participants p
            JOIN users u ON u.id = p.user_id
            WHERE p.baropot_id = ANY($1)
            ORDER BY p.is_host DESC, p.created_at ASC
            "#
        )
        .bind(baropot_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
