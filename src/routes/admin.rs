use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::middleware::AuthCouple;
use crate::error::AppError;
use crate::lifecycle::Decision;
use crate::models::couple::Side;
use crate::models::rsvp::{DecideRsvpRequest, DecisionAction, ListRsvpsParams, Rsvp, RsvpFilter};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/me", get(me))
        .route("/api/admin/rsvps", get(list_rsvps))
        .route("/api/admin/rsvps/approve", post(decide))
        .route("/api/admin/rsvps/{id}", delete(remove))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MeResponse {
    id: Uuid,
    name: String,
    side: Side,
}

async fn me(auth: AuthCouple) -> Json<MeResponse> {
    Json(MeResponse {
        id: auth.couple_id,
        name: auth.name,
        side: auth.side,
    })
}

/// Scoped to the caller's side unless `allSides=true`. Uncategorized RSVPs
/// count toward the side picked on the website form.
async fn list_rsvps(
    State(state): State<AppState>,
    auth: AuthCouple,
    Query(params): Query<ListRsvpsParams>,
) -> Result<Json<Vec<Rsvp>>, AppError> {
    let filter = RsvpFilter {
        status: params.status,
        side: (!params.all_sides).then_some(auth.side),
    };
    let rsvps = state.rsvps.list(filter).await?;
    Ok(Json(rsvps))
}

async fn decide(
    State(state): State<AppState>,
    auth: AuthCouple,
    Json(body): Json<DecideRsvpRequest>,
) -> Result<Json<Rsvp>, AppError> {
    let decision = match body.action {
        DecisionAction::Approve => Decision::Approve {
            category_id: body.category_id,
        },
        DecisionAction::Reject => Decision::Reject,
    };
    tracing::info!(couple_id = %auth.couple_id, rsvp_id = %body.rsvp_id, ?decision, "rsvp decision");

    let rsvp = state.rsvps.decide(auth.couple_id, body.rsvp_id, decision).await?;
    Ok(Json(rsvp))
}

async fn remove(
    State(state): State<AppState>,
    auth: AuthCouple,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    tracing::info!(couple_id = %auth.couple_id, rsvp_id = %id, "removing rsvp");
    state.rsvps.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::Method;
    use serde_json::{json, Value};

    use crate::models::category::{CreateCategoryRequest, GuestCategory};
    use crate::models::couple::Side;
    use crate::routes::testing::TestApp;

    async fn category(app: &TestApp, name: &str, max_guests: i32) -> GuestCategory {
        app.state
            .registry
            .create_category(
                app.bride.id,
                Side::Bride,
                CreateCategoryRequest {
                    name: name.into(),
                    side: None,
                    max_guests,
                    invitation_token: None,
                    is_default: false,
                },
            )
            .await
            .unwrap()
    }

    async fn website_rsvp(app: &TestApp, n: u32, guests: i32, side: &str) {
        let (status, _) = app
            .request(
                Method::POST,
                "/api/rsvp",
                Some(json!({
                    "name": format!("Guest {n}"),
                    "email": format!("guest{n}@example.com"),
                    "phone": format!("555-{n:04}"),
                    "guests": guests,
                    "selectedSide": side,
                })),
                None,
            )
            .await;
        assert_eq!(status, 201);
    }

    async fn pending_ids(app: &TestApp) -> Vec<String> {
        let (status, list) = app
            .admin(Method::GET, "/api/admin/rsvps?status=PENDING", None)
            .await;
        assert_eq!(status, 200);
        list.as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn listing_is_scoped_to_callers_side() {
        let app = TestApp::new().await;
        website_rsvp(&app, 1, 1, "BRIDE").await;
        website_rsvp(&app, 2, 1, "GROOM").await;

        let (_, mine) = app.admin(Method::GET, "/api/admin/rsvps", None).await;
        assert_eq!(mine.as_array().unwrap().len(), 1);
        assert_eq!(mine[0]["requestedSide"], "BRIDE");

        let (_, all) = app
            .admin(Method::GET, "/api/admin/rsvps?allSides=true", None)
            .await;
        assert_eq!(all.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn approve_flow_and_status_codes() {
        let app = TestApp::new().await;
        let family = category(&app, "Bride's Family", 3).await;
        website_rsvp(&app, 1, 2, "BRIDE").await;
        website_rsvp(&app, 2, 2, "BRIDE").await;
        let ids = pending_ids(&app).await;

        // Website RSVPs have no category until one is supplied.
        let (status, _) = app
            .admin(
                Method::POST,
                "/api/admin/rsvps/approve",
                Some(json!({ "rsvpId": ids[0], "action": "APPROVE" })),
            )
            .await;
        assert_eq!(status, 400);

        let (status, approved) = app
            .admin(
                Method::POST,
                "/api/admin/rsvps/approve",
                Some(json!({ "rsvpId": ids[0], "action": "APPROVE", "categoryId": family.id })),
            )
            .await;
        assert_eq!(status, 200);
        assert_eq!(approved["status"], "APPROVED");

        // Only one seat left for a party of two.
        let (status, _) = app
            .admin(
                Method::POST,
                "/api/admin/rsvps/approve",
                Some(json!({ "rsvpId": ids[1], "action": "APPROVE", "categoryId": family.id })),
            )
            .await;
        assert_eq!(status, 409);

        let (status, rejected) = app
            .admin(
                Method::POST,
                "/api/admin/rsvps/approve",
                Some(json!({ "rsvpId": ids[1], "action": "REJECT" })),
            )
            .await;
        assert_eq!(status, 200);
        assert_eq!(rejected["status"], "REJECTED");

        let (status, _) = app
            .admin(
                Method::POST,
                "/api/admin/rsvps/approve",
                Some(json!({ "rsvpId": uuid::Uuid::new_v4(), "action": "REJECT" })),
            )
            .await;
        assert_eq!(status, 404);
    }

    #[tokio::test]
    async fn delete_removes_rsvp() {
        let app = TestApp::new().await;
        website_rsvp(&app, 1, 1, "BRIDE").await;
        let ids = pending_ids(&app).await;

        let (status, body) = app
            .admin(Method::DELETE, &format!("/api/admin/rsvps/{}", ids[0]), None)
            .await;
        assert_eq!(status, 204);
        assert_eq!(body, Value::Null);

        let (status, _) = app
            .admin(Method::DELETE, &format!("/api/admin/rsvps/{}", ids[0]), None)
            .await;
        assert_eq!(status, 404);
    }

    #[tokio::test]
    async fn me_returns_caller() {
        let app = TestApp::new().await;
        let (status, me) = app.admin(Method::GET, "/api/admin/me", None).await;
        assert_eq!(status, 200);
        assert_eq!(me["name"], "Diamond");
        assert_eq!(me["side"], "BRIDE");
    }
}
