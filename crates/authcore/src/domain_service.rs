//! Tenant lifecycle: creation, retrieval, status transitions, and
//! membership, with policy side-effects pushed through the policy agent.

use std::sync::Arc;

use authcore_types::prelude::*;

use crate::session::Session;

const ADMIN_RELATION: &str = "administrator";
const PLATFORM_OBJECT: &str = "platform";

pub struct DomainService {
	domain_store: Arc<dyn DomainStore>,
	policy_agent: Arc<dyn PolicyAgent>,
}

impl DomainService {
	pub fn new(domain_store: Arc<dyn DomainStore>, policy_agent: Arc<dyn PolicyAgent>) -> Self {
		DomainService { domain_store, policy_agent }
	}

	/// Caller must be identified (any authenticated user). Policy
	/// side-effects are best-effort: a failure there is returned to the
	/// caller without rolling back the already-created domain, which is
	/// expected to retry the membership grant.
	pub async fn create_domain(&self, session: &Session, alias: String, name: String, tags: Vec<String>, metadata: std::collections::HashMap<String, serde_json::Value>) -> ClResult<Domain> {
		let now = Timestamp::now();
		let domain = Domain {
			id: DomainId::new(),
			alias,
			name,
			tags,
			metadata,
			status: DomainStatus::Enabled,
			created_at: now,
			updated_at: now,
			created_by: session.user_id,
			permissions: Vec::new(),
		};
		let created = self.domain_store.create(domain).await?;

		self.policy_agent
			.grant(Some(created.id), EntityType::User, &session.user_id.to_string(), Relation::from(ADMIN_RELATION), EntityType::Domain, &created.id.to_string())
			.await?;
		if let Err(e) = self
			.policy_agent
			.grant(None, EntityType::User, &session.user_id.to_string(), Relation::from("member"), EntityType::Platform, PLATFORM_OBJECT)
			.await
		{
			warn!(error = %e, "failed to grant platform membership after domain create");
		}

		Ok(created)
	}

	/// For `disabled`/`freezed` domains, only the platform admin may read;
	/// everyone else with `view` reads `enabled` domains normally.
	pub async fn retrieve_domain(&self, session: &Session, id: DomainId) -> ClResult<Domain> {
		let domain = self.domain_store.retrieve(id).await?;
		if matches!(domain.status, DomainStatus::Disabled | DomainStatus::Freezed) && !session.super_admin {
			self.require_platform_admin(session).await?;
		} else {
			self.require_permission(session, id, "view").await?;
		}
		Ok(domain)
	}

	pub async fn retrieve_domain_permissions(&self, session: &Session, id: DomainId, filter: &[Permission]) -> ClResult<Vec<Permission>> {
		self.policy_agent
			.retrieve_permissions(Some(id), &session.policy_subject(), EntityType::Domain, &id.to_string(), filter)
			.await
	}

	pub async fn update_domain(&self, session: &Session, id: DomainId, patch: DomainUpdate) -> ClResult<Domain> {
		self.require_permission(session, id, "admin").await?;
		self.domain_store.update(id, patch).await
	}

	/// Legal transitions: `enabled <-> disabled`, `enabled -> freezed`, any
	/// state into `deleted`. Illegal transitions leave status unchanged and
	/// return `MalformedEntity`.
	pub async fn change_domain_status(&self, session: &Session, id: DomainId, next: DomainStatus) -> ClResult<Domain> {
		self.require_permission(session, id, "admin").await?;
		let current = self.domain_store.retrieve(id).await?;
		if !current.status.can_transition_to(next) {
			return Err(Error::MalformedEntity(format!("illegal transition {:?} -> {:?}", current.status, next)));
		}
		self.domain_store.set_status(id, next).await
	}

	/// Platform admin sees everything; other callers see the subset for
	/// which they hold at least `membership` (or `filter.permission`, if
	/// narrower). `filter.subject` lets a platform admin list on behalf of
	/// another user; anyone else naming a subject other than themselves is
	/// rejected by `require_platform_admin`.
	pub async fn list_domains(&self, session: &Session, filter: DomainFilter, page: PageRequest) -> ClResult<Page<Domain>> {
		let permission = filter.permission.as_deref().map(Permission::from).unwrap_or_else(|| Permission::from("membership"));

		let ids: Option<Vec<DomainId>> = if let Some(subject) = &filter.subject {
			if *subject != session.user_id && !session.super_admin {
				self.require_platform_admin(session).await?;
			}
			let object_ids = self.policy_agent.retrieve_all_objects(None, &subject.to_string(), &permission, EntityType::Domain).await?;
			Some(object_ids.into_iter().filter_map(|s| s.parse().ok()).collect())
		} else if session.super_admin {
			None
		} else {
			let object_ids = self.policy_agent.retrieve_all_objects(None, &session.policy_subject(), &permission, EntityType::Domain).await?;
			Some(object_ids.into_iter().filter_map(|s| s.parse().ok()).collect())
		};

		let store_filter = DomainFilter { status: filter.status, tag: filter.tag, permission: None, subject: None };
		match ids {
			Some(ids) if ids.is_empty() => Ok(Page { items: Vec::new(), offset: page.offset, limit: page.limit, total: 0 }),
			Some(ids) => self.domain_store.list(Some(&ids), store_filter, page).await,
			None => self.domain_store.list(None, store_filter, page).await,
		}
	}

	/// Requires `share` on the domain; grants the chosen relation to every
	/// listed user.
	pub async fn assign_users(&self, session: &Session, id: DomainId, user_ids: Vec<UserId>, relation: Relation) -> ClResult<()> {
		self.require_permission(session, id, "share").await?;
		for user_id in &user_ids {
			self.policy_agent
				.add_policy(PolicyTuple::filter(Some(id), EntityType::User, user_id.to_string(), relation.clone(), EntityType::Domain, id.to_string()))
				.await?;
		}
		Ok(())
	}

	pub async fn unassign_users(&self, session: &Session, id: DomainId, user_ids: Vec<UserId>) -> ClResult<()> {
		self.require_permission(session, id, "share").await?;
		for user_id in &user_ids {
			self.policy_agent
				.delete_policy_filter(PolicyTuple {
					domain: Some(id),
					subject_type: EntityType::User,
					subject_kind: SubjectKind::UsersKind,
					subject: user_id.to_string(),
					relation: Relation::from(""),
					object_type: EntityType::Domain,
					object: id.to_string(),
					permission: None,
				})
				.await?;
		}
		Ok(())
	}

	/// Requires either self or platform admin.
	pub async fn list_user_domains(&self, session: &Session, user_id: UserId, page: PageRequest) -> ClResult<Page<Domain>> {
		if session.user_id != user_id && !session.super_admin {
			self.require_platform_admin(session).await?;
		}
		let object_ids = self
			.policy_agent
			.retrieve_objects(None, &user_id.to_string(), &Permission::from("membership"), EntityType::Domain, page)
			.await?;
		let ids: Vec<DomainId> = object_ids.ids.into_iter().filter_map(|s| s.parse().ok()).collect();
		if ids.is_empty() {
			return Ok(Page { items: Vec::new(), offset: 0, limit: page.limit, total: 0 });
		}
		let limit = ids.len() as u32;
		self.domain_store.list(Some(&ids), DomainFilter::default(), PageRequest { offset: 0, limit }).await
	}

	/// Cross-service hook used by the user service when a user account is
	/// deleted: drop every tuple mentioning them across all domains.
	pub async fn delete_user_from_domains(&self, user_id: UserId) -> ClResult<()> {
		self.policy_agent.delete_entity_policies(EntityType::User, &user_id.to_string()).await
	}

	async fn require_permission(&self, session: &Session, id: DomainId, permission: &str) -> ClResult<()> {
		if session.super_admin {
			return Ok(());
		}
		self.policy_agent
			.check_policy(PolicyTuple {
				domain: Some(id),
				subject_type: EntityType::User,
				subject_kind: SubjectKind::UsersKind,
				subject: session.policy_subject(),
				relation: Relation::from(ADMIN_RELATION),
				object_type: EntityType::Domain,
				object: id.to_string(),
				permission: Some(Permission::from(permission)),
			})
			.await
	}

	async fn require_platform_admin(&self, session: &Session) -> ClResult<()> {
		self.policy_agent
			.check_policy(PolicyTuple {
				domain: None,
				subject_type: EntityType::User,
				subject_kind: SubjectKind::UsersKind,
				subject: session.user_id.to_string(),
				relation: Relation::from(ADMIN_RELATION),
				object_type: EntityType::Platform,
				object: PLATFORM_OBJECT.to_string(),
				permission: Some(Permission::from("admin")),
			})
			.await
	}
}

// vim: ts=4
