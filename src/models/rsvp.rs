use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::couple::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "rsvp_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum RsvpStatus {
    Pending,
    Approved,
    Rejected,
}

impl RsvpStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rsvp {
    pub id: Uuid,
    pub guest_name: String,
    pub email: String,
    pub phone: String,
    pub guests: i32,
    pub status: RsvpStatus,
    pub category_id: Option<Uuid>,
    pub requested_side: Option<Side>,
    pub submitted_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewRsvp {
    pub guest_name: String,
    pub email: String,
    pub phone: String,
    pub guests: i32,
    pub status: RsvpStatus,
    pub category_id: Option<Uuid>,
    pub requested_side: Option<Side>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RsvpFilter {
    pub status: Option<RsvpStatus>,
    pub side: Option<Side>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRsvpRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub guests: i32,
    pub token: Option<String>,
    pub selected_side: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitRsvpResponse {
    pub success: bool,
    pub status: RsvpStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DecisionAction {
    Approve,
    Reject,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecideRsvpRequest {
    pub rsvp_id: Uuid,
    pub action: DecisionAction,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRsvpsParams {
    pub status: Option<RsvpStatus>,
    #[serde(default)]
    pub all_sides: bool,
}
