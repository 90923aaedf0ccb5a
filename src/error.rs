use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    Unauthorized,
    Forbidden,
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
    Database(sqlx::Error),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "Authentication required"),
            Self::Forbidden => write!(f, "Insufficient permissions"),
            Self::BadRequest(msg) => write!(f, "{msg}"),
            Self::NotFound(msg) => write!(f, "{msg}"),
            Self::Conflict(msg) => write!(f, "{msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
            Self::Database(e) => write!(f, "Database error: {e}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            Self::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            Self::Conflict(_) => (StatusCode::CONFLICT, self.to_string()),
            Self::Internal(_) | Self::Database(_) => {
                tracing::error!("{self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        if status.is_client_error() {
            tracing::warn!(status = status.as_u16(), "{message}");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        let constraint = match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Some(db.constraint().unwrap_or_default().to_string())
            }
            _ => None,
        };

        match constraint {
            Some(name) => Self::Conflict(conflict_message(&name).to_string()),
            None => Self::Database(e),
        }
    }
}

/// Human-readable message for a violated uniqueness constraint.
///
/// The in-memory store reuses these so both backends answer duplicates the
/// same way.
pub fn conflict_message(constraint: &str) -> &'static str {
    match constraint {
        "rsvps_email_key" | "rsvps_phone_key" => {
            "This email or phone number has already been used to RSVP."
        }
        "guest_categories_name_key" => "A category with that name already exists",
        "guest_categories_invitation_token_key" => {
            "That invitation token is already in use"
        }
        "guest_categories_one_default_per_side" => {
            "A default category already exists for that side"
        }
        "couples_email_key" => "An account with that email already exists",
        _ => "Duplicate record",
    }
}
