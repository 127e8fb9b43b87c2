//! Custom extractors reading state `require_auth` stashed in request
//! extensions, mirroring the split between a hard-required session and an
//! optional one used for a handful of read paths.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use authcore::Session;
use authcore_types::prelude::Error;

use crate::error::ApiError;

/// Present on every route behind the `require_auth` layer.
#[derive(Clone, Debug)]
pub struct AuthenticatedSession(pub Session);

impl<S> FromRequestParts<S> for AuthenticatedSession
where
	S: Send + Sync,
{
	type Rejection = ApiError;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		parts.extensions.get::<Session>().cloned().map(AuthenticatedSession).ok_or_else(|| ApiError::Core(Error::Authentication))
	}
}

// vim: ts=4
