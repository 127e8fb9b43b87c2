//! Independent axum middleware layers, composed outermost-first: tracing
//! (via `tower_http`), the per-request deadline, then `require_auth` for
//! every route that needs a session.

use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request};
use axum::middleware::Next;
use axum::response::Response;

use authcore_types::prelude::*;

use crate::error::ApiError;
use crate::App;

const PLATFORM_OBJECT: &str = "platform";

fn bearer_token(req: &Request<Body>) -> Result<&str, ApiError> {
	let header = req.headers().get(header::AUTHORIZATION).and_then(|h| h.to_str().ok()).ok_or(ApiError::Core(Error::Authentication))?;
	header.strip_prefix("Bearer ").map(str::trim).ok_or(ApiError::Core(Error::Authentication))
}

/// Parses the bearer token, resolves the platform-admin flag by asking the
/// policy agent, and installs a `Session` into the request extensions for
/// downstream extractors and handlers.
pub async fn require_auth(State(app): State<App>, mut req: Request<Body>, next: Next) -> Result<Response, ApiError> {
	let token = bearer_token(&req)?;
	let key = app.authorization.identify(token).await?;
	let subject = key.subject.ok_or(ApiError::Core(Error::Authentication))?;

	let super_admin = app
		.authorization
		.authorize(PolicyTuple {
			permission: Some(Permission::from("admin")),
			..PolicyTuple::filter(None, EntityType::User, subject.to_string(), Relation::from("administrator"), EntityType::Platform, PLATFORM_OBJECT)
		})
		.await
		.is_ok();

	let session = match key.domain {
		Some(domain_id) => authcore::Session::scoped(subject, domain_id, super_admin),
		None => authcore::Session::platform(subject, super_admin),
	};
	req.extensions_mut().insert(session);

	Ok(next.run(req).await)
}

/// Guards the `DeleteUserFromDomains` cross-service hook, which has no
/// session of its own to authorize against: callers present a preshared
/// token instead of a user credential.
pub async fn require_internal_service_token(State(app): State<App>, req: Request<Body>, next: Next) -> Result<Response, ApiError> {
	let expected = app.settings.internal_service_token.as_deref().ok_or_else(|| ApiError::Core(Error::Internal("internal service token not configured".into())))?;
	let token = bearer_token(&req)?;
	if token != expected {
		return Err(ApiError::Core(Error::Authentication));
	}
	Ok(next.run(req).await)
}

/// Enforces the per-request deadline from §5: a cancelled request leaves no
/// half-committed state, it just stops waiting for the response.
pub async fn enforce_deadline(State(app): State<App>, req: Request<Body>, next: Next) -> Result<Response, ApiError> {
	let deadline = Duration::from_secs(app.settings.request_deadline_secs);
	match tokio::time::timeout(deadline, next.run(req)).await {
		Ok(response) => Ok(response),
		Err(_) => Err(ApiError::Timeout),
	}
}

// vim: ts=4
