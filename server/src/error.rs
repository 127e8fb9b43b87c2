//! Error handling subsystem. The facade is the one place `authcore_types::Error`
//! gets mapped to wire status codes; every inner crate just produces and
//! propagates it.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use authcore_types::prelude::Error;

use crate::types::ErrorResponse;

/// Wraps the core error taxonomy plus the two failure modes that only exist
/// at the wire boundary: a request that never reaches a service method, and
/// a per-request deadline blown by `tokio::time::timeout`.
#[derive(Debug)]
pub enum ApiError {
	Core(Error),
	Timeout,
	BadRequest(String),
}

impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		ApiError::Core(err)
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let (status, code, message) = match self {
			ApiError::Core(Error::MalformedEntity(m)) => (StatusCode::BAD_REQUEST, "E-VAL-INVALID", m),
			ApiError::Core(Error::Authentication) => (StatusCode::UNAUTHORIZED, "E-AUTH-UNAUTH", "authentication required or invalid token".to_string()),
			ApiError::Core(Error::KeyExpired) => (StatusCode::UNAUTHORIZED, "E-AUTH-EXPIRED", "token has expired".to_string()),
			ApiError::Core(Error::Authorization) => (StatusCode::FORBIDDEN, "E-AUTH-NOPERM", "you do not have permission to perform this action".to_string()),
			ApiError::Core(Error::DomainAuthorization) => (StatusCode::FORBIDDEN, "E-AUTH-NODOMAIN", "this operation requires a domain-scoped session".to_string()),
			ApiError::Core(Error::NotFound) => (StatusCode::NOT_FOUND, "E-CORE-NOTFOUND", "resource not found".to_string()),
			ApiError::Core(Error::Conflict(m)) => (StatusCode::CONFLICT, "E-CORE-CONFLICT", m),
			ApiError::Core(Error::InvalidPolicy(m)) => (StatusCode::BAD_REQUEST, "E-POLICY-INVALID", m),
			ApiError::Core(Error::Internal(m)) => {
				tracing::warn!(error = %m, "internal error");
				(StatusCode::INTERNAL_SERVER_ERROR, "E-CORE-INTERNAL", "internal server error".to_string())
			}
			ApiError::Core(Error::Db(m)) => {
				tracing::warn!(error = %m, "db error");
				(StatusCode::INTERNAL_SERVER_ERROR, "E-CORE-INTERNAL", "internal server error".to_string())
			}
			ApiError::Core(Error::Jwt(m)) => {
				tracing::warn!(error = %m, "token signing error");
				(StatusCode::INTERNAL_SERVER_ERROR, "E-CORE-INTERNAL", "internal server error".to_string())
			}
			ApiError::Core(Error::Io(m)) => {
				tracing::warn!(error = %m, "io error");
				(StatusCode::INTERNAL_SERVER_ERROR, "E-CORE-INTERNAL", "internal server error".to_string())
			}
			ApiError::Timeout => (StatusCode::SERVICE_UNAVAILABLE, "E-CORE-DEADLINE", "request exceeded its deadline".to_string()),
			ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, "E-VAL-INVALID", m),
		};

		(status, Json(ErrorResponse::new(code.to_string(), message))).into_response()
	}
}

// vim: ts=4
