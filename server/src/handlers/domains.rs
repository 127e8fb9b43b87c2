//! `DomainsService`/`DomainService`: tenant CRUD, membership, and the
//! cross-service `DeleteUserFromDomains` hook.

use axum::extract::{Path, Query, State};
use axum::Json;
use uuid::Uuid;

use authcore_types::prelude::*;

use crate::error::ApiError;
use crate::extract::AuthenticatedSession;
use crate::types::{
	AssignUsersRequest, ChangeDomainStatusRequest, CreateDomainRequest, DomainPageResponse, DomainUpdateRequest, ListDomainsQuery, PageQuery, PermissionFilterQuery, UnassignUsersRequest,
};
use crate::App;

pub async fn create_domain(State(app): State<App>, AuthenticatedSession(session): AuthenticatedSession, Json(req): Json<CreateDomainRequest>) -> Result<Json<Domain>, ApiError> {
	let domain = app.domains.create_domain(&session, req.alias, req.name, req.tags, req.metadata).await?;
	Ok(Json(domain))
}

pub async fn retrieve_domain(State(app): State<App>, AuthenticatedSession(session): AuthenticatedSession, Path(id): Path<Uuid>) -> Result<Json<Domain>, ApiError> {
	let domain = app.domains.retrieve_domain(&session, DomainId(id)).await?;
	Ok(Json(domain))
}

pub async fn retrieve_domain_permissions(
	State(app): State<App>,
	AuthenticatedSession(session): AuthenticatedSession,
	Path(id): Path<Uuid>,
	Query(q): Query<PermissionFilterQuery>,
) -> Result<Json<Vec<String>>, ApiError> {
	let filter: Vec<Permission> = q.filter.split(',').filter(|s| !s.is_empty()).map(Permission::from).collect();
	let granted = app.domains.retrieve_domain_permissions(&session, DomainId(id), &filter).await?;
	Ok(Json(granted))
}

pub async fn update_domain(
	State(app): State<App>,
	AuthenticatedSession(session): AuthenticatedSession,
	Path(id): Path<Uuid>,
	Json(req): Json<DomainUpdateRequest>,
) -> Result<Json<Domain>, ApiError> {
	let domain = app.domains.update_domain(&session, DomainId(id), req.into()).await?;
	Ok(Json(domain))
}

pub async fn change_domain_status(
	State(app): State<App>,
	AuthenticatedSession(session): AuthenticatedSession,
	Path(id): Path<Uuid>,
	Json(req): Json<ChangeDomainStatusRequest>,
) -> Result<Json<Domain>, ApiError> {
	let status: DomainStatus = req.status.parse()?;
	let domain = app.domains.change_domain_status(&session, DomainId(id), status).await?;
	Ok(Json(domain))
}

pub async fn list_domains(State(app): State<App>, AuthenticatedSession(session): AuthenticatedSession, Query(q): Query<ListDomainsQuery>) -> Result<Json<DomainPageResponse>, ApiError> {
	let status = match q.status {
		Some(s) => Some(s.parse::<DomainStatus>()?),
		None => None,
	};
	let filter = DomainFilter { status, tag: q.tag, permission: q.permission, subject: q.subject.map(UserId) };
	let page = app.domains.list_domains(&session, filter, PageRequest { offset: q.offset, limit: q.limit }).await?;
	Ok(Json(page.into()))
}

pub async fn assign_users(
	State(app): State<App>,
	AuthenticatedSession(session): AuthenticatedSession,
	Path(id): Path<Uuid>,
	Json(req): Json<AssignUsersRequest>,
) -> Result<Json<()>, ApiError> {
	let user_ids = req.user_ids.into_iter().map(UserId).collect();
	app.domains.assign_users(&session, DomainId(id), user_ids, Relation::from(req.relation.as_str())).await?;
	Ok(Json(()))
}

pub async fn unassign_users(
	State(app): State<App>,
	AuthenticatedSession(session): AuthenticatedSession,
	Path(id): Path<Uuid>,
	Json(req): Json<UnassignUsersRequest>,
) -> Result<Json<()>, ApiError> {
	let user_ids = req.user_ids.into_iter().map(UserId).collect();
	app.domains.unassign_users(&session, DomainId(id), user_ids).await?;
	Ok(Json(()))
}

pub async fn list_user_domains(
	State(app): State<App>,
	AuthenticatedSession(session): AuthenticatedSession,
	Path(user_id): Path<Uuid>,
	Query(q): Query<PageQuery>,
) -> Result<Json<DomainPageResponse>, ApiError> {
	let page = app.domains.list_user_domains(&session, UserId(user_id), PageRequest { offset: q.offset, limit: q.limit }).await?;
	Ok(Json(page.into()))
}

/// Cross-service hook behind the internal-service-token guard, not the
/// regular `require_auth` layer: the user service calls this with no
/// session of its own when an account is deleted.
pub async fn delete_user_from_domains(State(app): State<App>, Path(user_id): Path<Uuid>) -> Result<Json<()>, ApiError> {
	app.domains.delete_user_from_domains(UserId(user_id)).await?;
	Ok(Json(()))
}

// vim: ts=4
