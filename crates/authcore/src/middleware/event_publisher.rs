//! Wraps the domain service so every successful mutation emits a
//! structured event to the external bus. Publish failures are logged but
//! never fail the user-visible call: the entity change has already
//! committed by the time this wrapper runs.

use std::collections::HashMap;
use std::sync::Arc;

use authcore_types::prelude::*;

use crate::domain_service::DomainService;
use crate::session::Session;

const TOPIC: &str = "magistrala.auth";

pub struct EventPublishingDomainService {
	inner: DomainService,
	publisher: Arc<dyn EventPublisher>,
}

impl EventPublishingDomainService {
	pub fn new(inner: DomainService, publisher: Arc<dyn EventPublisher>) -> Self {
		EventPublishingDomainService { inner, publisher }
	}

	async fn emit(&self, event: Event) {
		if let Err(e) = self.publisher.publish(TOPIC, event).await {
			warn!(error = %e, "event publish failed, entity change already committed");
		}
	}

	pub async fn create_domain(&self, session: &Session, alias: String, name: String, tags: Vec<String>, metadata: HashMap<String, serde_json::Value>) -> ClResult<Domain> {
		let domain = self.inner.create_domain(session, alias, name, tags, metadata).await?;
		let mut event = Event::new("domain.create", session.user_id);
		event.id = Some(domain.id.to_string());
		event.domain_id = Some(domain.id);
		self.emit(event).await;
		Ok(domain)
	}

	pub async fn retrieve_domain(&self, session: &Session, id: DomainId) -> ClResult<Domain> {
		self.inner.retrieve_domain(session, id).await
	}

	pub async fn retrieve_domain_permissions(&self, session: &Session, id: DomainId, filter: &[Permission]) -> ClResult<Vec<Permission>> {
		self.inner.retrieve_domain_permissions(session, id, filter).await
	}

	pub async fn update_domain(&self, session: &Session, id: DomainId, patch: DomainUpdate) -> ClResult<Domain> {
		let domain = self.inner.update_domain(session, id, patch).await?;
		let mut event = Event::new("domain.update", session.user_id);
		event.id = Some(domain.id.to_string());
		event.domain_id = Some(domain.id);
		self.emit(event).await;
		Ok(domain)
	}

	pub async fn change_domain_status(&self, session: &Session, id: DomainId, next: DomainStatus) -> ClResult<Domain> {
		let domain = self.inner.change_domain_status(session, id, next).await?;
		let mut event = Event::new("domain.status", session.user_id);
		event.id = Some(domain.id.to_string());
		event.domain_id = Some(domain.id);
		event.status = Some(domain.status.as_str().to_string());
		self.emit(event).await;
		Ok(domain)
	}

	pub async fn list_domains(&self, session: &Session, filter: DomainFilter, page: PageRequest) -> ClResult<Page<Domain>> {
		self.inner.list_domains(session, filter, page).await
	}

	pub async fn assign_users(&self, session: &Session, id: DomainId, user_ids: Vec<UserId>, relation: Relation) -> ClResult<()> {
		self.inner.assign_users(session, id, user_ids.clone(), relation.clone()).await?;
		let mut event = Event::new("domain.assign", session.user_id);
		event.domain_id = Some(id);
		event.user_ids = Some(user_ids);
		event.relation = Some(relation.as_str().to_string());
		self.emit(event).await;
		Ok(())
	}

	pub async fn unassign_users(&self, session: &Session, id: DomainId, user_ids: Vec<UserId>) -> ClResult<()> {
		self.inner.unassign_users(session, id, user_ids.clone()).await?;
		let mut event = Event::new("domain.unassign", session.user_id);
		event.domain_id = Some(id);
		event.user_ids = Some(user_ids);
		self.emit(event).await;
		Ok(())
	}

	pub async fn list_user_domains(&self, session: &Session, user_id: UserId, page: PageRequest) -> ClResult<Page<Domain>> {
		self.inner.list_user_domains(session, user_id, page).await
	}

	pub async fn delete_user_from_domains(&self, user_id: UserId) -> ClResult<()> {
		self.inner.delete_user_from_domains(user_id).await
	}
}

// vim: ts=4
