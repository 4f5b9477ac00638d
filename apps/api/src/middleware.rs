use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use regiongate_core::AppError;
use tracing::debug;

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| AppError::Unauthorized("bearer token required".to_owned()))?;
    let user_id = state.access_tokens.verify(token.as_str())?;

    let identity = state
        .user_directory
        .find_identity(user_id)
        .await?
        .ok_or_else(|| {
            debug!(user_id = %user_id, "token subject has no account");
            AppError::Unauthorized(format!("unknown user '{user_id}'"))
        })?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
}
