use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::couple::Side;

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestCategory {
    pub id: Uuid,
    pub name: String,
    pub side: Side,
    pub max_guests: i32,
    pub invitation_token: Uuid,
    pub is_default: bool,
    pub couple_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub side: Side,
    pub max_guests: i32,
    pub invitation_token: Uuid,
    pub is_default: bool,
    pub couple_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub name: String,
    pub side: Option<Side>,
    pub max_guests: i32,
    pub invitation_token: Option<Uuid>,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub side: Option<Side>,
    pub max_guests: Option<i32>,
    pub invitation_token: Option<Uuid>,
}

/// Category as shown to its owning couple, with the live approved aggregate.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    #[serde(flatten)]
    pub category: GuestCategory,
    pub approved_guests: i64,
    pub remaining_guests: i64,
}

/// What a guest holding an invitation link is allowed to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicCategoryMeta {
    pub name: String,
    pub side: Side,
    pub remaining_guests: i64,
}
