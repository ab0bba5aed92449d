//! Baropot service implementation
//!
//! Event creation, listing, host edits and host-driven status changes.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, info};

use crate::config::SearchConfig;
use crate::database::repositories::{BaropotChanges, BaropotRow, NewBaropot, ParticipantRow};
use crate::database::DatabaseService;
use crate::models::baropot::{
    BaropotStatus, BaropotView, CreateBaropotRequest, FindBaropotsQuery, HostView, JoinedStatus,
    UpdateBaropotRequest,
};
use crate::models::notification::NotificationKind;
use crate::services::notification::NotificationService;
use crate::utils::errors::{BaropotError, Result};
use crate::utils::helpers::{combine, format_time, normalize_tags, normalize_whitespace, parse_date, parse_time};
use crate::utils::location::{bounding_box, effective_radius, validate_coordinates, BoundingBox};
use crate::utils::logging::log_baropot_action;

pub const MIN_PARTICIPANTS: i32 = 2;

#[derive(Clone)]
pub struct BaropotService {
    db: DatabaseService,
    notifications: NotificationService,
    search: SearchConfig,
}

impl BaropotService {
    pub fn new(db: DatabaseService, notifications: NotificationService, search: SearchConfig) -> Self {
        Self { db, notifications, search }
    }

    /// Create an OPEN baropot with the host as its first approved participant
    pub async fn create(&self, host_id: i64, request: CreateBaropotRequest) -> Result<BaropotView> {
        let title = normalize_whitespace(&request.title);
        if title.is_empty() {
            return Err(BaropotError::validation("title is required"));
        }
        let date = parse_date(&request.date)?;
        let time = parse_time(&request.time)?;
        check_max_participants(request.max_participants)?;

        if !self.db.restaurants.exists(request.restaurant_id).await? {
            return Err(BaropotError::not_found("Restaurant", request.restaurant_id));
        }

        let new = NewBaropot {
            restaurant_id: request.restaurant_id,
            title,
            location: normalize_whitespace(&request.location),
            max_participants: request.max_participants,
            date,
            time,
            participant_gender: request.participant_gender,
            participant_age_group: request.participant_age_group,
            contact_method: request.contact_method,
            estimated_cost_per_person: request.estimated_cost_per_person,
            payment_method: request.payment_method,
            description: request.description,
            rule: request.rule,
        };

        let mut tx = self.db.begin().await?;
        let baropot = self.db.baropots.create(&mut tx, &new).await?;
        self.db.baropot_tags.replace(&mut tx, baropot.id, &normalize_tags(&request.tags)).await?;
        self.db
            .baropots
            .add_participant(&mut tx, baropot.id, host_id, true, JoinedStatus::Approved, None)
            .await?;
        tx.commit().await?;

        log_baropot_action(baropot.id, "created", host_id, Some(&baropot.title));
        self.find_by_id(baropot.id).await
    }

    pub async fn find_by_id(&self, baropot_id: i64) -> Result<BaropotView> {
        let row = self
            .db
            .baropots
            .find_by_id(baropot_id)
            .await?
            .ok_or_else(|| BaropotError::not_found("Baropot", baropot_id))?;

        let mut views = self.decorate(vec![row]).await?;
        views.pop().ok_or_else(|| BaropotError::not_found("Baropot", baropot_id))
    }

    /// List baropots matching the filters, ordered by schedule
    pub async fn find_all(&self, query: &FindBaropotsQuery) -> Result<Vec<BaropotView>> {
        let window = search_window(query, &self.search)?;

        let rows = self.db.baropots.search(query, window).await?;
        debug!(results = rows.len(), near = window.is_some(), "Baropot search done");
        self.decorate(rows).await
    }

    /// Host edit; capacity and schedule are checked against the locked row
    pub async fn update(&self, baropot_id: i64, host_id: i64, request: UpdateBaropotRequest) -> Result<BaropotView> {
        let date = request.date.as_deref().map(parse_date).transpose()?;
        let time = request.time.as_deref().map(parse_time).transpose()?;
        if let Some(max) = request.max_participants {
            check_max_participants(max)?;
        }
        let title = request.title.as_deref().map(normalize_whitespace);
        if title.as_deref() == Some("") {
            return Err(BaropotError::validation("title cannot be empty"));
        }

        let mut tx = self.db.begin().await?;
        let current = self
            .db
            .baropots
            .lock(&mut tx, baropot_id)
            .await?
            .ok_or_else(|| BaropotError::not_found("Baropot", baropot_id))?;
        ensure_host(self.db.baropots.host_id(&mut tx, baropot_id).await?, host_id)?;

        let approved = self.db.baropots.count_approved(&mut tx, baropot_id).await?;
        let max_participants = request.max_participants.unwrap_or(current.max_participants);
        if i64::from(max_participants) < approved {
            return Err(BaropotError::conflict(format!(
                "max participants cannot be below the {approved} approved participants"
            )));
        }

        if date.is_some() || time.is_some() {
            let now = chrono::Local::now().naive_local();
            check_future_schedule(date.unwrap_or(current.date), time.unwrap_or(current.time), now)?;
        }

        let changes = BaropotChanges {
            title,
            location: request.location.as_deref().map(normalize_whitespace),
            max_participants: request.max_participants,
            date,
            time,
            participant_gender: request.participant_gender,
            participant_age_group: request.participant_age_group,
            contact_method: request.contact_method,
            estimated_cost_per_person: request.estimated_cost_per_person,
            payment_method: request.payment_method,
            description: request.description,
            rule: request.rule,
        };
        let updated = self.db.baropots.update(&mut tx, baropot_id, &changes).await?;

        if let Some(tags) = &request.tags {
            self.db.baropot_tags.replace(&mut tx, baropot_id, &normalize_tags(tags)).await?;
        }

        let status = updated.status.synchronize(approved, i64::from(updated.max_participants));
        if status != updated.status {
            self.db.baropots.set_status(&mut tx, baropot_id, status).await?;
        }
        tx.commit().await?;

        log_baropot_action(baropot_id, "updated", host_id, None);

        let view = self.find_by_id(baropot_id).await?;

        if schedule_changed(current.date, current.time, updated.date, updated.time) {
            let message = format!(
                "\"{}\" was rescheduled to {} {}.",
                updated.title,
                updated.date.format("%Y-%m-%d"),
                format_time(updated.time)
            );
            self.notifications
                .notify_many(
                    NotificationKind::BaropotDatetimeChanged,
                    &message,
                    &view.approved_guest_ids(),
                    Some(host_id),
                    Some(updated.restaurant_id),
                )
                .await;
        }

        Ok(view)
    }

    /// Host moves the event to IN_PROGRESS, COMPLETED or CANCELLED
    pub async fn update_status(&self, baropot_id: i64, host_id: i64, target: BaropotStatus) -> Result<BaropotView> {
        BaropotStatus::allowed_predecessors(target)?;

        let mut tx = self.db.begin().await?;
        let current = self
            .db
            .baropots
            .lock(&mut tx, baropot_id)
            .await?
            .ok_or_else(|| BaropotError::not_found("Baropot", baropot_id))?;
        ensure_host(self.db.baropots.host_id(&mut tx, baropot_id).await?, host_id)?;

        let next = current.status.transition_to(target)?;
        self.db.baropots.set_status(&mut tx, baropot_id, next).await?;
        tx.commit().await?;

        info!(baropot_id = baropot_id, from = %current.status, to = %next, "Baropot status changed");

        let view = self.find_by_id(baropot_id).await?;
        let message = format!("\"{}\" is now {}.", current.title, next.label());
        self.notifications
            .notify_many(
                NotificationKind::BaropotStatusUpdated,
                &message,
                &view.approved_guest_ids(),
                Some(host_id),
                Some(current.restaurant_id),
            )
            .await;

        Ok(view)
    }

    /// Attach tags and participant bookkeeping to bare rows
    async fn decorate(&self, rows: Vec<BaropotRow>) -> Result<Vec<BaropotView>> {
        if rows.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<i64> = rows.iter().map(|r| r.baropot.id).collect();
        let tags = self.db.baropot_tags.names_for(&ids).await?;
        let participants = self.db.baropots.participants_for(&ids).await?;

        Ok(assemble_views(rows, tags, participants))
    }
}

/// Group participants per baropot and derive host and head counts
pub fn assemble_views(
    rows: Vec<BaropotRow>,
    mut tags: HashMap<i64, Vec<String>>,
    participants: Vec<ParticipantRow>,
) -> Vec<BaropotView> {
    let mut grouped: HashMap<i64, Vec<_>> = HashMap::new();
    for row in participants {
        grouped.entry(row.baropot_id).or_default().push(row.participant);
    }

    rows.into_iter()
        .map(|row| {
            let id = row.baropot.id;
            let participants = grouped.remove(&id).unwrap_or_default();
            let host = participants
                .iter()
                .find(|p| p.is_host)
                .map(|p| HostView { user_id: p.user_id, name: p.name.clone() });
            let count = |status: JoinedStatus| participants.iter().filter(|p| p.joined_status == status).count() as i64;

            BaropotView {
                participant_count: count(JoinedStatus::Approved),
                pending_participant_count: count(JoinedStatus::Pending),
                tags: tags.remove(&id).unwrap_or_default(),
                restaurant_name: row.restaurant_name,
                baropot: row.baropot,
                host,
                participants,
            }
        })
        .collect()
}

fn ensure_host(actual_host: Option<i64>, user_id: i64) -> Result<()> {
    if actual_host != Some(user_id) {
        return Err(BaropotError::forbidden("only the host can manage this baropot"));
    }
    Ok(())
}

fn check_max_participants(max: i32) -> Result<()> {
    if max < MIN_PARTICIPANTS {
        return Err(BaropotError::validation(format!(
            "max participants must be at least {MIN_PARTICIPANTS}"
        )));
    }
    Ok(())
}

/// A rescheduled event must start after `now`
pub fn check_future_schedule(date: NaiveDate, time: NaiveTime, now: NaiveDateTime) -> Result<()> {
    if combine(date, time) <= now {
        return Err(BaropotError::validation("the new schedule must be in the future"));
    }
    Ok(())
}

pub fn schedule_changed(old_date: NaiveDate, old_time: NaiveTime, new_date: NaiveDate, new_time: NaiveTime) -> bool {
    old_date != new_date || old_time != new_time
}

/// Near-me prefilter window, rejecting out-of-range coordinates before any query runs
fn search_window(query: &FindBaropotsQuery, search: &SearchConfig) -> Result<Option<BoundingBox>> {
    let Some((lat, lng)) = query.near() else {
        return Ok(None);
    };
    validate_coordinates(lat, lng)?;
    Ok(Some(bounding_box(lat, lng, effective_radius(query.radius_km, search))))
}
