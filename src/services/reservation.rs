//! Reservation service implementation
//!
//! Creates reservations within a restaurant's ordering hours and runs the
//! periodic sweep that completes reservations once their time has passed.

use std::time::Duration;

use chrono::{NaiveDateTime, NaiveTime};
use tokio::sync::watch;
use tracing::{error, info, debug};
use crate::config::SchedulerConfig;
use crate::database::repositories::NewReservation;
use crate::database::DatabaseService;
use crate::models::reservation::{CreateReservationRequest, Reservation};
use crate::utils::errors::{BaropotError, Result};
use crate::utils::helpers::{format_time, parse_date, parse_time};
use crate::utils::logging::log_database_operation;

#[derive(Clone)]
pub struct ReservationService {
    db: DatabaseService,
    grace: chrono::Duration,
}

impl ReservationService {
    pub fn new(db: DatabaseService, scheduler: &SchedulerConfig) -> Self {
        Self {
            db,
            grace: chrono::Duration::minutes(scheduler.reservation_grace_minutes),
        }
    }

    /// Reserve a slot at a restaurant
    pub async fn create(&self, user_id: i64, restaurant_id: i64, request: CreateReservationRequest) -> Result<Reservation> {
        let date = parse_date(&request.date)?;
        let time = parse_time(&request.time)?;
        if let Some(size) = request.party_size {
            if size < 1 {
                return Err(BaropotError::validation("party size must be at least 1"));
            }
        }

        let restaurant = self
            .db
            .restaurants
            .find_by_id(restaurant_id)
            .await?
            .ok_or_else(|| BaropotError::not_found("Restaurant", restaurant_id))?;

        check_within_hours(time, restaurant.opening_time, restaurant.last_order_time)?;

        if self.db.reservations.slot_taken(restaurant_id, date, time).await? {
            return Err(slot_taken(&request));
        }

        let new = NewReservation {
            restaurant_id,
            user_id,
            date,
            time,
            party_size: request.party_size,
            description: request.description.clone(),
        };

        // The unique slot index catches a concurrent booking of the same slot
        let reservation = self
            .db
            .reservations
            .create(&new)
            .await?
            .ok_or_else(|| slot_taken(&request))?;

        info!(reservation_id = reservation.id, restaurant_id = restaurant_id, user_id = user_id, "Reservation created");
        Ok(reservation)
    }

    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<Reservation>> {
        self.db.reservations.list_for_user(user_id).await
    }

    /// Complete APPROVED reservations older than the grace period; returns affected ids
    pub async fn complete_expired(&self, now: NaiveDateTime) -> Result<Vec<i64>> {
        let cutoff = now - self.grace;
        let started = std::time::Instant::now();
        let result = self.db.reservations.complete_before(cutoff).await;
        log_database_operation(
            "complete_before",
            "reservations",
            started.elapsed().as_millis() as u64,
            result.is_ok(),
        );
        let ids = result?;

        if ids.is_empty() {
            debug!("No reservations to complete");
        } else {
            info!(count = ids.len(), reservation_ids = ?ids, "Reservations marked completed");
        }
        Ok(ids)
    }

    /// Run the completion sweep every `interval` until `shutdown` flips to true
    pub async fn run_completion_sweep(self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        info!(interval_secs = interval.as_secs(), "Reservation completion sweep started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let now = chrono::Local::now().naive_local();
                    if let Err(e) = self.complete_expired(now).await {
                        error!(error = %e, "Reservation completion sweep failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Reservation completion sweep stopped");
    }
}

fn slot_taken(request: &CreateReservationRequest) -> BaropotError {
    BaropotError::conflict(format!("slot {} {} is already reserved", request.date, request.time))
}

/// Reservation time must lie within [opening, last order]
pub fn check_within_hours(time: NaiveTime, opening: NaiveTime, last_order: NaiveTime) -> Result<()> {
    if time < opening || time > last_order {
        return Err(BaropotError::validation(format!(
            "reservations are accepted between {} and {}",
            format_time(opening),
            format_time(last_order)
        )));
    }
    Ok(())
}
