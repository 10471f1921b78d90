pub mod admin;
pub mod applications;
pub mod docs;
pub mod extract;
pub mod health;
pub mod jobs;
pub mod notifications;
pub mod profile;
pub mod upload;

use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::AppState;

/// Parses a positive integer path segment, reporting `code` when it is not one.
pub(crate) fn parse_id(raw: &str, code: &str) -> Result<i64> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(Error::BadRequest(code.to_string())),
    }
}

/// Stored user id for the session, falling back to the token subject when the user
/// has no row yet.
pub(crate) async fn session_user_id(state: &AppState, claims: &Claims) -> Result<String> {
    let user = state
        .candidate_service
        .resolve_session_user(&claims.sub, claims.email.as_deref())
        .await?;
    Ok(user.map(|u| u.id).unwrap_or_else(|| claims.sub.clone()))
}
