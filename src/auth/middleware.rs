use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::couple::Side;
use crate::AppState;

use super::jwt;

/// The couple behind an admin request.
#[derive(Debug, Clone)]
pub struct AuthCouple {
    pub couple_id: Uuid,
    pub name: String,
    pub side: Side,
}

impl FromRequestParts<AppState> for AuthCouple {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Unauthorized)?;

        let claims = jwt::validate_token(bearer.token(), &state.config.jwt_secret)?;

        // Accounts can disappear or change side between token issue and use.
        let couple = state
            .store
            .get_couple(claims.sub)
            .await?
            .filter(|c| c.side == claims.side)
            .ok_or(AppError::Unauthorized)?;

        Ok(AuthCouple {
            couple_id: couple.id,
            name: couple.name,
            side: couple.side,
        })
    }
}
