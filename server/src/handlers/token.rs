//! `TokenService`: `Issue`, `Refresh`.

use axum::extract::State;
use axum::Json;

use authcore::KeySpec;
use authcore_types::prelude::*;

use crate::error::ApiError;
use crate::types::{IssueRequest, IssuedTokensResponse, RefreshRequest};
use crate::App;

pub async fn issue(State(app): State<App>, Json(req): Json<IssueRequest>) -> Result<Json<IssuedTokensResponse>, ApiError> {
	let kind: KeyKind = req.kind.parse()?;
	let spec = KeySpec { kind, subject: req.subject.map(UserId), domain: req.domain.map(DomainId) };
	let tokens = app.authorization.issue(req.current_token.as_deref(), spec).await?;
	Ok(Json(tokens.into()))
}

pub async fn refresh(State(app): State<App>, Json(req): Json<RefreshRequest>) -> Result<Json<IssuedTokensResponse>, ApiError> {
	let spec = KeySpec { kind: KeyKind::Refresh, subject: None, domain: None };
	let tokens = app.authorization.issue(Some(&req.refresh_token), spec).await?;
	Ok(Json(tokens.into()))
}

// vim: ts=4
