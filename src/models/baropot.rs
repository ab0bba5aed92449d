//! Baropot (group dining event) and participant models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;

use super::restaurant::RestaurantCategory;
use crate::utils::errors::{BaropotError, Result};
use crate::utils::helpers::hh_mm;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "baropot_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BaropotStatus {
    Open,
    Full,
    InProgress,
    Completed,
    Cancelled,
}

labelled_enum!(BaropotStatus {
    Open => "OPEN",
    Full => "FULL",
    InProgress => "IN_PROGRESS",
    Completed => "COMPLETED",
    Cancelled => "CANCELLED",
});

impl BaropotStatus {
    /// Recruiting states, the only ones the capacity synchronizer touches
    pub fn is_recruiting(self) -> bool {
        matches!(self, BaropotStatus::Open | BaropotStatus::Full)
    }

    /// Derive OPEN/FULL from the approved head count.
    ///
    /// Statuses outside OPEN/FULL are returned untouched.
    pub fn synchronize(self, approved: i64, max_participants: i64) -> BaropotStatus {
        if !self.is_recruiting() {
            return self;
        }
        if approved >= max_participants {
            BaropotStatus::Full
        } else {
            BaropotStatus::Open
        }
    }

    /// Statuses a host may move the event out of to reach `target`
    pub fn allowed_predecessors(target: BaropotStatus) -> Result<&'static [BaropotStatus]> {
        match target {
            BaropotStatus::InProgress => Ok(&[BaropotStatus::Open, BaropotStatus::Full]),
            BaropotStatus::Completed => Ok(&[BaropotStatus::InProgress]),
            BaropotStatus::Cancelled => Ok(&[BaropotStatus::Open, BaropotStatus::Full]),
            BaropotStatus::Open | BaropotStatus::Full => Err(BaropotError::validation(format!(
                "{target} is derived from the participant count and cannot be set directly"
            ))),
        }
    }

    /// Validate a host-driven move from `self` to `target`
    pub fn transition_to(self, target: BaropotStatus) -> Result<BaropotStatus> {
        let allowed = Self::allowed_predecessors(target)?;
        if allowed.contains(&self) {
            Ok(target)
        } else {
            let names: Vec<&str> = allowed.iter().map(|s| s.as_str()).collect();
            Err(BaropotError::conflict(format!(
                "cannot move from {self} to {target}; allowed only from {}",
                names.join(", ")
            )))
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BaropotStatus::Open => "recruiting",
            BaropotStatus::Full => "fully booked",
            BaropotStatus::InProgress => "in progress",
            BaropotStatus::Completed => "completed",
            BaropotStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "joined_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JoinedStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    Removed,
}

impl JoinedStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JoinedStatus::Rejected | JoinedStatus::Cancelled | JoinedStatus::Removed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "participant_gender", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantGender {
    #[default]
    Any,
    Male,
    Female,
}

labelled_enum!(ParticipantGender {
    Any => "ANY",
    Male => "MALE",
    Female => "FEMALE",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "participant_age_group", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantAgeGroup {
    #[default]
    Any,
    Twenties,
    Thirties,
    Forties,
    FiftiesPlus,
}

labelled_enum!(ParticipantAgeGroup {
    Any => "ANY",
    Twenties => "TWENTIES",
    Thirties => "THIRTIES",
    Forties => "FORTIES",
    FiftiesPlus => "FIFTIES_PLUS",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "contact_method", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactMethod {
    AppChat,
    KakaoTalk,
    PhoneNumber,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "payment_method", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[default]
    DutchPay,
    HostPay,
    Free,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Baropot {
    pub id: i64,
    pub restaurant_id: i64,
    pub status: BaropotStatus,
    pub title: String,
    pub location: String,
    pub max_participants: i32,
    pub date: NaiveDate,
    #[serde(with = "hh_mm")]
    pub time: NaiveTime,
    pub participant_gender: ParticipantGender,
    pub participant_age_group: ParticipantAgeGroup,
    pub contact_method: Option<ContactMethod>,
    pub estimated_cost_per_person: Option<i32>,
    pub payment_method: PaymentMethod,
    pub description: String,
    pub rule: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: i64,
    pub baropot_id: i64,
    pub user_id: i64,
    pub is_host: bool,
    pub joined_status: JoinedStatus,
    pub join_message: Option<String>,
    pub host_memo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Participant joined with the user's display name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantView {
    pub user_id: i64,
    pub name: String,
    pub is_host: bool,
    pub joined_status: JoinedStatus,
    pub join_message: Option<String>,
    pub host_memo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostView {
    pub user_id: i64,
    pub name: String,
}

/// Event with its tags, host and participant bookkeeping
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaropotView {
    #[serde(flatten)]
    pub baropot: Baropot,
    pub restaurant_name: String,
    pub tags: Vec<String>,
    pub host: Option<HostView>,
    /// Approved participants, host included
    pub participant_count: i64,
    pub pending_participant_count: i64,
    pub participants: Vec<ParticipantView>,
}

impl BaropotView {
    pub fn host_id(&self) -> Option<i64> {
        self.host.as_ref().map(|h| h.user_id)
    }

    /// Approved participants other than the host
    pub fn approved_guest_ids(&self) -> Vec<i64> {
        self.participants
            .iter()
            .filter(|p| !p.is_host && p.joined_status == JoinedStatus::Approved)
            .map(|p| p.user_id)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBaropotRequest {
    pub restaurant_id: i64,
    pub title: String,
    pub location: String,
    pub max_participants: i32,
    /// yyyy-MM-dd
    pub date: String,
    /// HH:mm
    pub time: String,
    #[serde(default)]
    pub participant_gender: ParticipantGender,
    #[serde(default)]
    pub participant_age_group: ParticipantAgeGroup,
    pub contact_method: Option<ContactMethod>,
    pub estimated_cost_per_person: Option<i32>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub description: String,
    pub rule: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBaropotRequest {
    pub title: Option<String>,
    pub location: Option<String>,
    pub max_participants: Option<i32>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub participant_gender: Option<ParticipantGender>,
    pub participant_age_group: Option<ParticipantAgeGroup>,
    pub contact_method: Option<ContactMethod>,
    pub estimated_cost_per_person: Option<i32>,
    pub payment_method: Option<PaymentMethod>,
    pub description: Option<String>,
    pub rule: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: BaropotStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub join_message: Option<String>,
}

/// Host decision on a participant row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Approved,
    Rejected,
    Removed,
}

impl Decision {
    pub fn joined_status(self) -> JoinedStatus {
        match self {
            Decision::Approved => JoinedStatus::Approved,
            Decision::Rejected => JoinedStatus::Rejected,
            Decision::Removed => JoinedStatus::Removed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    pub participant_user_id: i64,
    pub joined_status: Decision,
    pub host_memo: Option<String>,
}

/// Filters for the baropot listing
#[derive(Debug, Clone)]
pub struct FindBaropotsQuery {
    pub statuses: Vec<BaropotStatus>,
    pub title: Option<String>,
    pub tags: Vec<String>,
    pub genders: Vec<ParticipantGender>,
    pub age_groups: Vec<ParticipantAgeGroup>,
    pub restaurant_name: Option<String>,
    pub restaurant_category: Option<RestaurantCategory>,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius_km: Option<f64>,
    /// Restrict to events this user has a participant row in
    pub participant_user_id: Option<i64>,
}

impl Default for FindBaropotsQuery {
    fn default() -> Self {
        Self {
            statuses: vec![BaropotStatus::Open],
            title: None,
            tags: vec![],
            genders: vec![],
            age_groups: vec![],
            restaurant_name: None,
            restaurant_category: None,
            address: None,
            lat: None,
            lng: None,
            radius_km: None,
            participant_user_id: None,
        }
    }
}

impl FindBaropotsQuery {
    pub fn near(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lng)
    }
}
