use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::auth::jwt::{self, Claims};
use crate::error::AppError;
use crate::state::SharedState;

/// The authenticated account behind a request.
#[derive(Debug, Clone)]
pub struct AuthAccount {
    pub account_id: Uuid,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl AuthAccount {
    pub fn require_superuser(&self) -> Result<(), AppError> {
        if self.is_superuser {
            Ok(())
        } else {
            Err(AppError::Forbidden("Superuser access required".to_string()))
        }
    }
}

impl From<Claims> for AuthAccount {
    fn from(claims: Claims) -> Self {
        AuthAccount {
            account_id: claims.sub,
            is_staff: claims.staff,
            is_superuser: claims.su,
        }
    }
}

impl FromRequestParts<SharedState> for AuthAccount {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        // Bearer token first, then the access_token cookie
        if let Some(auth_header) = parts.headers.get("authorization") {
            let auth_str = auth_header
                .to_str()
                .map_err(|_| AppError::Unauthorized("Invalid authorization header".to_string()))?;

            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return decode(token, state);
            }
        }

        let jar = CookieJar::from_headers(&parts.headers);
        if let Some(cookie) = jar.get("access_token") {
            return decode(cookie.value(), state);
        }

        Err(AppError::Unauthorized(
            "Missing authentication token".to_string(),
        ))
    }
}

fn decode(token: &str, state: &SharedState) -> Result<AuthAccount, AppError> {
    jwt::decode_token(token, &state.config.jwt_secret)
        .map(AuthAccount::from)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))
}
