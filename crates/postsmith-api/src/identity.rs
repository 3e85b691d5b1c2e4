//! Caller identity from bearer tokens.

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use postsmith_core::models::User;

use crate::AppState;
use crate::error::ApiError;

/// Verified token claims describing the caller. `sub` is the identity
/// provider's subject id; `name` and `email` are optional profile hints
/// used when the caller's user row is first created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: usize,
}

/// Extract and validate the JWT from the Authorization header.
pub async fn require_identity(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized)?;

    let token_data = decode::<Identity>(
        token,
        &DecodingKey::from_secret(state.config.auth.token_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::Unauthorized)?;

    req.extensions_mut().insert(token_data.claims);
    Ok(next.run(req).await)
}

/// Look up the caller's user row. `None` means the caller has never written
/// anything yet; list endpoints answer that with an empty collection.
pub(crate) async fn lookup_user(
    state: &AppState,
    identity: &Identity,
) -> Result<Option<User>, ApiError> {
    Ok(state.db.get_user_by_external_id(&identity.sub).await?)
}
