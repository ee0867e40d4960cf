use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use bson::oid::ObjectId;
use workhive_db::models::User;
use workhive_services::auth::Claims;
use workhive_services::dao::base::DaoError;

use crate::{error::ApiError, state::AppState};

/// The authenticated requester, resolved per request from the bearer token.
/// The user record is re-loaded so a token issued before account deletion
/// stops working immediately.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: ObjectId,
    pub user: User,
    pub claims: Claims,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::Unauthorized("No token provided".to_string()))?;

        let claims = state.auth.verify_token(token)?;

        let user_id = ObjectId::parse_str(&claims.sub)
            .map_err(|_| ApiError::Unauthorized("Invalid user ID in token".to_string()))?;

        let user = state.users.base.find_by_id(user_id).await.map_err(|e| match e {
            DaoError::NotFound => ApiError::Unauthorized("User not found".to_string()),
            other => ApiError::from(other),
        })?;

        Ok(AuthUser {
            user_id,
            user,
            claims,
        })
    }
}
