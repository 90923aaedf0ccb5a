use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::category::PublicCategoryMeta;
use crate::models::rsvp::{SubmitRsvpRequest, SubmitRsvpResponse};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/rsvp/meta", get(category_meta))
        .route("/api/rsvp", post(submit))
}

#[derive(Debug, Deserialize)]
struct MetaParams {
    token: Option<String>,
}

async fn category_meta(
    State(state): State<AppState>,
    Query(params): Query<MetaParams>,
) -> Result<Json<PublicCategoryMeta>, AppError> {
    let token = params.token.unwrap_or_default();
    let meta = state.invitations.public_meta(&token).await?;
    Ok(Json(meta))
}

async fn submit(
    State(state): State<AppState>,
    Json(body): Json<SubmitRsvpRequest>,
) -> Result<(StatusCode, Json<SubmitRsvpResponse>), AppError> {
    let rsvp = state.rsvps.submit(body).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitRsvpResponse {
            success: true,
            status: rsvp.status,
        }),
    ))
}
