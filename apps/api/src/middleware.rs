use axum::extract::{Extension, Request, State};
use axum::http::{HeaderMap, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use leavedesk_application::RateLimitRule;
use leavedesk_core::{AppError, UserIdentity};
use tower_sessions::Session;

use crate::auth::SESSION_USER_KEY;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn require_auth(
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Refuses state-changing requests that did not come from the frontend origin.
pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let mutating = matches!(
        *request.method(),
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    );
    if mutating && !sent_from(request.headers(), &state.frontend_url) {
        tracing::warn!(
            method = %request.method(),
            path = request.uri().path(),
            "cross-origin mutation refused"
        );
        return Err(AppError::Unauthorized("request origin not allowed".to_owned()).into());
    }

    Ok(next.run(request).await)
}

fn header_text<'a>(headers: &'a HeaderMap, name: header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Browser fetch metadata wins; otherwise `Origin` must match exactly or
/// `Referer` must point into the frontend.
fn sent_from(headers: &HeaderMap, frontend_url: &str) -> bool {
    if header_text(headers, header::HeaderName::from_static("sec-fetch-site")) == Some("cross-site")
    {
        return false;
    }

    let frontend = frontend_url.trim_end_matches('/');
    match header_text(headers, header::ORIGIN) {
        Some(origin) => origin == frontend,
        None => header_text(headers, header::REFERER).is_some_and(|referer| {
            referer == frontend || referer.starts_with(&format!("{frontend}/"))
        }),
    }
}

/// Counts the request against the route's rule, keyed by client address.
pub async fn rate_limit(
    State(state): State<AppState>,
    Extension(rule): Extension<RateLimitRule>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let client = client_address(request.headers()).unwrap_or_else(|| "unknown".to_owned());
    state
        .rate_limit_service
        .admit(rule, client.as_str())
        .await?;

    Ok(next.run(request).await)
}

pub(crate) fn client_address(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}
