//! `AuthService`: `Authenticate`, `Authorize`, policy mutation and
//! enumeration passthroughs, plus the key-management operations the
//! authorization service exposes alongside them.

use axum::extract::{Path, Query, State};
use axum::Json;
use uuid::Uuid;

use authcore_types::prelude::*;

use crate::error::ApiError;
use crate::extract::AuthenticatedSession;
use crate::types::{
	AddPoliciesRequest, CountQuery, DeleteEntityPoliciesRequest, DeletePoliciesRequest, EnumerateQuery, KeyResponse, ObjectPageResponse, PermissionsQuery, PermissionsResponse, PolicyTupleRequest,
	SessionResponse,
};
use crate::App;

pub async fn authenticate(AuthenticatedSession(session): AuthenticatedSession) -> Json<SessionResponse> {
	Json(SessionResponse { user_id: session.user_id.0, domain_id: session.domain_id.map(|d| d.0), super_admin: session.super_admin })
}

pub async fn authorize(State(app): State<App>, Json(req): Json<PolicyTupleRequest>) -> Result<Json<()>, ApiError> {
	let tuple: PolicyTuple = req.try_into()?;
	if tuple.permission.is_none() {
		return Err(ApiError::BadRequest("authorize requires a permission".into()));
	}
	app.authorization.authorize(tuple).await?;
	Ok(Json(()))
}

pub async fn add_policy(State(app): State<App>, AuthenticatedSession(session): AuthenticatedSession, Json(req): Json<PolicyTupleRequest>) -> Result<Json<()>, ApiError> {
	let tuple: PolicyTuple = req.try_into()?;
	app.authorization.add_policy(&session, tuple).await?;
	Ok(Json(()))
}

pub async fn add_policies(State(app): State<App>, AuthenticatedSession(session): AuthenticatedSession, Json(req): Json<AddPoliciesRequest>) -> Result<Json<()>, ApiError> {
	let tuples = req.tuples.into_iter().map(PolicyTuple::try_from).collect::<Result<Vec<_>, _>>()?;
	app.authorization.add_policies(&session, tuples).await?;
	Ok(Json(()))
}

pub async fn delete_policy_filter(State(app): State<App>, AuthenticatedSession(session): AuthenticatedSession, Json(req): Json<PolicyTupleRequest>) -> Result<Json<()>, ApiError> {
	let filter: PolicyTuple = req.try_into()?;
	app.authorization.delete_policy_filter(&session, filter).await?;
	Ok(Json(()))
}

pub async fn delete_policies(State(app): State<App>, AuthenticatedSession(session): AuthenticatedSession, Json(req): Json<DeletePoliciesRequest>) -> Result<Json<()>, ApiError> {
	let filters = req.filters.into_iter().map(PolicyTuple::try_from).collect::<Result<Vec<_>, _>>()?;
	app.authorization.delete_policies(&session, filters).await?;
	Ok(Json(()))
}

pub async fn delete_entity_policies(State(app): State<App>, AuthenticatedSession(session): AuthenticatedSession, Json(req): Json<DeleteEntityPoliciesRequest>) -> Result<Json<()>, ApiError> {
	let entity_type: EntityType = req.entity_type.parse()?;
	app.authorization.delete_entity_policies(&session, entity_type, &req.entity_id).await?;
	Ok(Json(()))
}

pub async fn list_objects(State(app): State<App>, Query(q): Query<EnumerateQuery>) -> Result<Json<ObjectPageResponse>, ApiError> {
	let subject = q.subject.ok_or_else(|| ApiError::BadRequest("subject is required".into()))?;
	let object_type: EntityType = q.entity_type.parse()?;
	let page = PageRequest { offset: q.offset, limit: q.limit };
	let objects = app.authorization.list_objects(q.domain.map(DomainId), &subject, &Permission::from(q.permission.as_str()), object_type, page).await?;
	Ok(Json(objects.into()))
}

pub async fn list_all_objects(State(app): State<App>, Query(q): Query<EnumerateQuery>) -> Result<Json<Vec<String>>, ApiError> {
	let subject = q.subject.ok_or_else(|| ApiError::BadRequest("subject is required".into()))?;
	let object_type: EntityType = q.entity_type.parse()?;
	let ids = app.authorization.list_all_objects(q.domain.map(DomainId), &subject, &Permission::from(q.permission.as_str()), object_type).await?;
	Ok(Json(ids))
}

pub async fn count_objects(State(app): State<App>, Query(q): Query<CountQuery>) -> Result<Json<u64>, ApiError> {
	let subject = q.subject.ok_or_else(|| ApiError::BadRequest("subject is required".into()))?;
	let object_type: EntityType = q.entity_type.parse()?;
	let count = app.authorization.count_objects(q.domain.map(DomainId), &subject, &Permission::from(q.permission.as_str()), object_type).await?;
	Ok(Json(count))
}

pub async fn list_subjects(State(app): State<App>, Query(q): Query<EnumerateQuery>) -> Result<Json<ObjectPageResponse>, ApiError> {
	let object = q.object.ok_or_else(|| ApiError::BadRequest("object is required".into()))?;
	let subject_type: EntityType = q.entity_type.parse()?;
	let page = PageRequest { offset: q.offset, limit: q.limit };
	let subjects = app.authorization.list_subjects(q.domain.map(DomainId), &object, &Permission::from(q.permission.as_str()), subject_type, page).await?;
	Ok(Json(subjects.into()))
}

pub async fn list_all_subjects(State(app): State<App>, Query(q): Query<EnumerateQuery>) -> Result<Json<Vec<String>>, ApiError> {
	let object = q.object.ok_or_else(|| ApiError::BadRequest("object is required".into()))?;
	let subject_type: EntityType = q.entity_type.parse()?;
	let ids = app.authorization.list_all_subjects(q.domain.map(DomainId), &object, &Permission::from(q.permission.as_str()), subject_type).await?;
	Ok(Json(ids))
}

pub async fn count_subjects(State(app): State<App>, Query(q): Query<CountQuery>) -> Result<Json<u64>, ApiError> {
	let object = q.object.ok_or_else(|| ApiError::BadRequest("object is required".into()))?;
	let subject_type: EntityType = q.entity_type.parse()?;
	let count = app.authorization.count_subjects(q.domain.map(DomainId), &object, &Permission::from(q.permission.as_str()), subject_type).await?;
	Ok(Json(count))
}

pub async fn list_permissions(State(app): State<App>, Query(q): Query<PermissionsQuery>) -> Result<Json<PermissionsResponse>, ApiError> {
	let object_type: EntityType = q.object_type.parse()?;
	let filter: Vec<Permission> = q.filter.split(',').filter(|s| !s.is_empty()).map(Permission::from).collect();
	let granted = app.authorization.list_permissions(q.domain.map(DomainId), &q.subject, object_type, &q.object, &filter).await?;
	Ok(Json(PermissionsResponse { permissions: granted.into_iter().map(|p| p.as_str().to_string()).collect() }))
}

pub async fn revoke_key(State(app): State<App>, AuthenticatedSession(session): AuthenticatedSession, Path(id): Path<Uuid>) -> Result<Json<()>, ApiError> {
	let key = app.authorization.retrieve_key(session.user_id, KeyId(id)).await?;
	app.authorization.revoke(session.user_id, KeyId(id), key.kind).await?;
	Ok(Json(()))
}

pub async fn retrieve_key(State(app): State<App>, AuthenticatedSession(session): AuthenticatedSession, Path(id): Path<Uuid>) -> Result<Json<KeyResponse>, ApiError> {
	let key = app.authorization.retrieve_key(session.user_id, KeyId(id)).await?;
	Ok(Json(key.into()))
}

// vim: ts=4
