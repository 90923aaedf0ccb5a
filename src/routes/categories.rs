use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use uuid::Uuid;

use crate::auth::middleware::AuthCouple;
use crate::error::AppError;
use crate::models::category::{
    CategoryResponse, CreateCategoryRequest, GuestCategory, UpdateCategoryRequest,
};
use crate::models::rsvp::Rsvp;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/admin/categories",
            get(list_categories).post(create_category),
        )
        .route("/api/admin/categories/{id}", patch(update_category))
        .route("/api/admin/categories/{id}/rsvps", get(category_rsvps))
}

async fn list_categories(
    State(state): State<AppState>,
    auth: AuthCouple,
) -> Result<Json<Vec<CategoryResponse>>, AppError> {
    let categories = state.registry.list_for_couple(auth.couple_id).await?;
    Ok(Json(categories))
}

async fn create_category(
    State(state): State<AppState>,
    auth: AuthCouple,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<GuestCategory>), AppError> {
    let side = body.side.unwrap_or(auth.side);
    let category = state
        .registry
        .create_category(auth.couple_id, side, body)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_category(
    State(state): State<AppState>,
    auth: AuthCouple,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateCategoryRequest>,
) -> Result<Json<GuestCategory>, AppError> {
    let category = state
        .registry
        .update_category(auth.couple_id, id, body)
        .await?;
    Ok(Json(category))
}

async fn category_rsvps(
    State(state): State<AppState>,
    auth: AuthCouple,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Rsvp>>, AppError> {
    let rsvps = state.rsvps.list_for_category(auth.couple_id, id).await?;
    Ok(Json(rsvps))
}
