//! Facade over the external ReBAC relation store. Every other component
//! treats this trait as the single source of truth for `check`; nothing in
//! this workspace re-derives a permission decision on its own.

use async_trait::async_trait;

use crate::error::ClResult;
use crate::policy::{EntityType, Permission, PolicyTuple, Relation};
use crate::types::{DomainId, PageRequest};

/// One page of enumerated subject or object ids, mirroring `Page<T>` but
/// keyed by an opaque continuation token instead of an offset, since the
/// relation store paginates by its own internal cursor.
#[derive(Clone, Debug, Default)]
pub struct ObjectPage {
	pub ids: Vec<String>,
	pub next_page_token: Option<String>,
}

#[async_trait]
pub trait PolicyAgent: Send + Sync {
	/// Idempotent per tuple.
	async fn add_policy(&self, tuple: PolicyTuple) -> ClResult<()>;

	async fn add_policies(&self, tuples: Vec<PolicyTuple>) -> ClResult<()>;

	/// Deletes every tuple matching the non-empty fields of `filter`.
	async fn delete_policy_filter(&self, filter: PolicyTuple) -> ClResult<()>;

	/// Mass-delete every tuple in which `(entity_type, entity_id)` appears
	/// as either subject or object. Used on entity deletion.
	async fn delete_entity_policies(&self, entity_type: EntityType, entity_id: &str) -> ClResult<()>;

	/// Single-point authorization check. Returns `Authorization` when
	/// denied rather than `Ok(false)`, so callers can `?` straight through.
	async fn check_policy(&self, tuple: PolicyTuple) -> ClResult<()>;

	async fn retrieve_objects(
		&self,
		domain: Option<DomainId>,
		subject: &str,
		permission: &Permission,
		object_type: EntityType,
		page: PageRequest,
	) -> ClResult<ObjectPage>;

	async fn retrieve_all_objects(
		&self,
		domain: Option<DomainId>,
		subject: &str,
		permission: &Permission,
		object_type: EntityType,
	) -> ClResult<Vec<String>>;

	async fn retrieve_subjects(
		&self,
		domain: Option<DomainId>,
		object: &str,
		permission: &Permission,
		subject_type: EntityType,
		page: PageRequest,
	) -> ClResult<ObjectPage>;

	async fn retrieve_all_subjects(
		&self,
		domain: Option<DomainId>,
		object: &str,
		permission: &Permission,
		subject_type: EntityType,
	) -> ClResult<Vec<String>>;

	async fn count_objects(
		&self,
		domain: Option<DomainId>,
		subject: &str,
		permission: &Permission,
		object_type: EntityType,
	) -> ClResult<u64>;

	async fn count_subjects(
		&self,
		domain: Option<DomainId>,
		object: &str,
		permission: &Permission,
		subject_type: EntityType,
	) -> ClResult<u64>;

	/// Resolves the subset of `filter` the subject actually holds on
	/// `object`.
	async fn retrieve_permissions(
		&self,
		domain: Option<DomainId>,
		subject: &str,
		object_type: EntityType,
		object: &str,
		filter: &[Permission],
	) -> ClResult<Vec<Permission>>;

	/// Writes a relation edge; exposed separately from `add_policy` for
	/// adapters that want a typed shortcut in their own tests and seed
	/// scripts.
	async fn grant(&self, domain: Option<DomainId>, subject_type: EntityType, subject: &str, relation: Relation, object_type: EntityType, object: &str) -> ClResult<()> {
		self.add_policy(PolicyTuple::filter(domain, subject_type, subject, relation, object_type, object)).await
	}
}

// vim: ts=4
