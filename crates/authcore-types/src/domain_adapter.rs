//! Durable domain storage contract.

use async_trait::async_trait;

use crate::domain::{Domain, DomainFilter, DomainUpdate};
use crate::error::ClResult;
use crate::types::{DomainId, Page, PageRequest};

#[async_trait]
pub trait DomainStore: Send + Sync {
	/// Errors `Conflict` if `alias` is already taken.
	async fn create(&self, domain: Domain) -> ClResult<Domain>;

	/// Errors `NotFound` on a miss.
	async fn retrieve(&self, id: DomainId) -> ClResult<Domain>;

	async fn retrieve_by_alias(&self, alias: &str) -> ClResult<Domain>;

	/// Applies a patch; `alias` is never part of `DomainUpdate` since it is
	/// immutable once set.
	async fn update(&self, id: DomainId, patch: DomainUpdate) -> ClResult<Domain>;

	/// Row-level locked per domain id so concurrent status transitions on
	/// the same tenant serialize.
	async fn set_status(&self, id: DomainId, status: crate::domain::DomainStatus) -> ClResult<Domain>;

	/// `ids = None` means no id restriction (platform admin, sees every
	/// domain); `ids = Some(&[])` means restricted to nothing and must
	/// short-circuit to an empty page without matching every row.
	async fn list(&self, ids: Option<&[DomainId]>, filter: DomainFilter, page: PageRequest) -> ClResult<Page<Domain>>;
}

// vim: ts=4
