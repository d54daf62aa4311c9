//! Bearer-token guard for the admin analytics endpoints. Tokens are issued by
//! the main Smart-Edu API; this service only verifies them.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use crate::AppState;

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    pub exp: usize,
}

#[derive(Clone, Debug)]
pub struct AdminUser {
    pub user_id: String,
    pub email: String,
}

fn declined(status: StatusCode, code: &str, message: &str) -> Response {
    let body = serde_json::json!({
        "code": code,
        "message": message,
    });
    (status, Json(body)).into_response()
}

pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let Some(token) = token else {
        return declined(StatusCode::UNAUTHORIZED, "SMARTEDU_AUTH_DECLINED", "Authentication required");
    };

    let decoding_key = DecodingKey::from_secret(state.config.jwt_secret.as_ref());
    let validation = Validation::new(Algorithm::HS256);
    let claims = match decode::<Claims>(token, &decoding_key, &validation) {
        Ok(data) => data.claims,
        Err(e) => {
            tracing::debug!("Rejected admin token: {}", e);
            return declined(StatusCode::UNAUTHORIZED, "SMARTEDU_AUTH_DECLINED", "Session invalid");
        }
    };

    if claims.role.as_deref() != Some(ADMIN_ROLE) {
        tracing::warn!("Non-admin user {} requested admin analytics", claims.user_id);
        return declined(StatusCode::FORBIDDEN, "SMARTEDU_ADMIN_REQUIRED", "Insufficient permissions");
    }

    req.extensions_mut().insert(AdminUser {
        user_id: claims.user_id,
        email: claims.email,
    });

    next.run(req).await
}
