//! Participation lifecycle
//!
//! Join requests, host decisions and cancellations. Each operation locks the
//! baropot row, checks its preconditions against a consistent snapshot,
//! writes the participant row and the synchronized event status in one
//! transaction, and notifies after commit.

use sqlx::PgConnection;
use tracing::info;

use crate::database::DatabaseService;
use crate::models::baropot::{Baropot, BaropotStatus, Decision, JoinedStatus};
use crate::models::notification::{NewNotification, NotificationKind};
use crate::services::notification::NotificationService;
use crate::utils::errors::{BaropotError, Result};
use crate::utils::logging::log_baropot_action;

/// Capacity-relevant state of a locked baropot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSnapshot {
    pub status: BaropotStatus,
    pub host_id: i64,
    /// APPROVED rows, host included
    pub approved: i64,
    pub max_participants: i64,
}

/// Outcome of a host decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionPlan {
    pub previous: JoinedStatus,
    pub next: JoinedStatus,
    pub status: BaropotStatus,
}

/// Outcome of a participant cancelling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelPlan {
    pub previous: JoinedStatus,
    pub status: BaropotStatus,
}

fn existing_row_conflict(status: JoinedStatus) -> BaropotError {
    let message = match status {
        JoinedStatus::Pending => "join request is already pending",
        JoinedStatus::Approved => "join request was already approved",
        JoinedStatus::Rejected => "join request was already rejected",
        JoinedStatus::Cancelled => "join request was already cancelled",
        JoinedStatus::Removed => "participant was removed from this baropot",
    };
    BaropotError::conflict(message)
}

/// Preconditions of a join request, first failure wins
pub fn check_join(snapshot: &EventSnapshot, user_id: i64, existing: Option<JoinedStatus>) -> Result<()> {
    if user_id == snapshot.host_id {
        return Err(BaropotError::forbidden("the host cannot join their own baropot"));
    }

    if let Some(status) = existing {
        return Err(existing_row_conflict(status));
    }

    if snapshot.approved >= snapshot.max_participants || snapshot.status == BaropotStatus::Full {
        return Err(BaropotError::conflict("capacity exceeded"));
    }

    match snapshot.status {
        BaropotStatus::InProgress => Err(BaropotError::conflict("baropot has already started")),
        BaropotStatus::Completed => Err(BaropotError::conflict("baropot is already completed")),
        BaropotStatus::Cancelled => Err(BaropotError::conflict("baropot was cancelled")),
        BaropotStatus::Open | BaropotStatus::Full => Ok(()),
    }
}

/// Validate a host decision and compute the resulting event status
pub fn plan_decision(
    snapshot: &EventSnapshot,
    acting_user_id: i64,
    target_user_id: i64,
    existing: Option<JoinedStatus>,
    decision: Decision,
) -> Result<DecisionPlan> {
    if acting_user_id != snapshot.host_id {
        return Err(BaropotError::forbidden("only the host can handle join requests"));
    }

    if acting_user_id == target_user_id {
        return Err(BaropotError::conflict("the host cannot handle their own participation"));
    }

    if decision == Decision::Approved && snapshot.approved >= snapshot.max_participants {
        return Err(BaropotError::conflict("capacity exceeded"));
    }

    let previous = existing.ok_or_else(|| BaropotError::not_found("Participant", target_user_id))?;

    let eligible = match decision {
        Decision::Approved | Decision::Rejected => previous == JoinedStatus::Pending,
        Decision::Removed => matches!(previous, JoinedStatus::Pending | JoinedStatus::Approved),
    };
    if !eligible {
        return Err(BaropotError::conflict(format!(
            "cannot mark a {:?} participant as {:?}",
            previous, decision
        )));
    }

    let approved_after = match (previous, decision) {
        (_, Decision::Approved) => snapshot.approved + 1,
        (JoinedStatus::Approved, Decision::Removed) => snapshot.approved - 1,
        _ => snapshot.approved,
    };

    Ok(DecisionPlan {
        previous,
        next: decision.joined_status(),
        status: snapshot.status.synchronize(approved_after, snapshot.max_participants),
    })
}

/// Validate a participant's cancellation and compute the resulting event status
pub fn plan_cancel(snapshot: &EventSnapshot, user_id: i64, existing: Option<JoinedStatus>) -> Result<CancelPlan> {
    if user_id == snapshot.host_id {
        return Err(BaropotError::forbidden("the host cannot cancel participation"));
    }

    let previous = existing.ok_or_else(|| BaropotError::not_found("Participant", user_id))?;
    if previous.is_terminal() {
        return Err(existing_row_conflict(previous));
    }

    let approved_after = if previous == JoinedStatus::Approved {
        snapshot.approved - 1
    } else {
        snapshot.approved
    };

    Ok(CancelPlan {
        previous,
        status: snapshot.status.synchronize(approved_after, snapshot.max_participants),
    })
}

/// Participation lifecycle service
#[derive(Clone)]
pub struct ParticipationService {
    db: DatabaseService,
    notifications: NotificationService,
}

impl ParticipationService {
    pub fn new(db: DatabaseService, notifications: NotificationService) -> Self {
        Self { db, notifications }
    }

    /// Lock the baropot and read the capacity snapshot
    async fn snapshot(&self, conn: &mut PgConnection, baropot_id: i64) -> Result<(Baropot, EventSnapshot)> {
        let baropot = self
            .db
            .baropots
            .lock(&mut *conn, baropot_id)
            .await?
            .ok_or_else(|| BaropotError::not_found("Baropot", baropot_id))?;

        let host_id = self
            .db
            .baropots
            .host_id(&mut *conn, baropot_id)
            .await?
            .ok_or_else(|| BaropotError::not_found("Baropot host", baropot_id))?;

        let approved = self.db.baropots.count_approved(&mut *conn, baropot_id).await?;

        let snapshot = EventSnapshot {
            status: baropot.status,
            host_id,
            approved,
            max_participants: i64::from(baropot.max_participants),
        };
        Ok((baropot, snapshot))
    }

    /// Ask to join a baropot; the request starts PENDING
    pub async fn request_join(&self, baropot_id: i64, user_id: i64, join_message: Option<String>) -> Result<bool> {
        let mut tx = self.db.begin().await?;
        let (baropot, snapshot) = self.snapshot(&mut tx, baropot_id).await?;

        let existing = self.db.baropots.find_participant(&mut tx, baropot_id, user_id).await?;
        check_join(&snapshot, user_id, existing.map(|p| p.joined_status))?;

        self.db
            .baropots
            .add_participant(&mut tx, baropot_id, user_id, false, JoinedStatus::Pending, join_message.as_deref())
            .await?;
        tx.commit().await?;

        log_baropot_action(baropot_id, "join_requested", user_id, None);

        self.notifications
            .notify(NewNotification {
                kind: NotificationKind::BaropotParticipantJoined,
                message: format!("\"{}\" received a new join request.", baropot.title),
                recipient_id: snapshot.host_id,
                sender_id: Some(user_id),
                context_id: Some(baropot.restaurant_id),
            })
            .await;

        Ok(true)
    }

    /// Host approves, rejects or removes a participant
    pub async fn decide_join_request(
        &self,
        baropot_id: i64,
        host_id: i64,
        target_user_id: i64,
        decision: Decision,
        host_memo: Option<String>,
    ) -> Result<bool> {
        let mut tx = self.db.begin().await?;
        let (baropot, snapshot) = self.snapshot(&mut tx, baropot_id).await?;

        let existing = self.db.baropots.find_participant(&mut tx, baropot_id, target_user_id).await?;
        let plan = plan_decision(&snapshot, host_id, target_user_id, existing.map(|p| p.joined_status), decision)?;

        let memo = match decision {
            Decision::Rejected | Decision::Removed => host_memo.as_deref(),
            Decision::Approved => None,
        };
        self.db
            .baropots
            .set_participant_status(&mut tx, baropot_id, target_user_id, plan.next, memo)
            .await?;

        if plan.status != snapshot.status {
            self.db.baropots.set_status(&mut tx, baropot_id, plan.status).await?;
        }
        tx.commit().await?;

        info!(
            baropot_id = baropot_id,
            target_user_id = target_user_id,
            from = ?plan.previous,
            to = ?plan.next,
            status = %plan.status,
            "Join request handled"
        );

        let (kind, message) = match decision {
            Decision::Approved => (
                NotificationKind::BaropotJoinRequestApproved,
                format!("Your request to join \"{}\" was approved.", baropot.title),
            ),
            Decision::Rejected => (
                NotificationKind::BaropotJoinRequestRejected,
                match host_memo.as_deref().filter(|m| !m.trim().is_empty()) {
                    Some(memo) => format!("Your request to join \"{}\" was rejected. Reason: {}", baropot.title, memo),
                    None => format!("Your request to join \"{}\" was rejected.", baropot.title),
                },
            ),
            Decision::Removed => (
                NotificationKind::BaropotParticipantRemoved,
                format!("You were removed from \"{}\".", baropot.title),
            ),
        };

        self.notifications
            .notify(NewNotification {
                kind,
                message,
                recipient_id: target_user_id,
                sender_id: Some(host_id),
                context_id: Some(baropot.restaurant_id),
            })
            .await;

        Ok(true)
    }

    /// A participant withdraws a pending or approved request
    pub async fn cancel_join(&self, baropot_id: i64, user_id: i64) -> Result<bool> {
        let mut tx = self.db.begin().await?;
        let (baropot, snapshot) = self.snapshot(&mut tx, baropot_id).await?;

        let existing = self.db.baropots.find_participant(&mut tx, baropot_id, user_id).await?;
        let plan = plan_cancel(&snapshot, user_id, existing.map(|p| p.joined_status))?;

        self.db
            .baropots
            .set_participant_status(&mut tx, baropot_id, user_id, JoinedStatus::Cancelled, None)
            .await?;

        if plan.status != snapshot.status {
            self.db.baropots.set_status(&mut tx, baropot_id, plan.status).await?;
        }
        tx.commit().await?;

        log_baropot_action(baropot_id, "join_cancelled", user_id, None);

        let name = match self.db.users.find_by_id(user_id).await {
            Ok(Some(user)) => user.name,
            _ => format!("user{user_id}"),
        };

        self.notifications
            .notify(NewNotification {
                kind: NotificationKind::BaropotJoinCancelled,
                message: format!("{} cancelled their participation in \"{}\".", name, baropot.title),
                recipient_id: snapshot.host_id,
                sender_id: Some(user_id),
                context_id: Some(baropot.restaurant_id),
            })
            .await;

        Ok(true)
    }
}
