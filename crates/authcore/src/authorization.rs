//! Top-level orchestrator combining the token codec, key store, and policy
//! agent into the decision engine.

use std::sync::Arc;

use authcore_types::prelude::*;

use crate::session::Session;
use crate::settings::Settings;
use crate::token_codec::TokenCodec;

/// What the caller wants issued. Mirrors the `Key` shape minus the fields
/// the service fills in itself (id, issuedAt).
#[derive(Clone, Debug)]
pub struct KeySpec {
	pub kind: KeyKind,
	pub subject: Option<UserId>,
	pub domain: Option<DomainId>,
}

pub struct AuthorizationService {
	key_store: Arc<dyn KeyStore>,
	policy_agent: Arc<dyn PolicyAgent>,
	codec: TokenCodec,
	access_ttl: i64,
	refresh_ttl: i64,
	recovery_ttl: i64,
	invitation_ttl: i64,
}

impl AuthorizationService {
	pub fn new(key_store: Arc<dyn KeyStore>, policy_agent: Arc<dyn PolicyAgent>, settings: &Settings) -> Self {
		AuthorizationService {
			key_store,
			policy_agent,
			codec: TokenCodec::new(&settings.signing_secret),
			access_ttl: settings.access_ttl_secs,
			refresh_ttl: settings.refresh_ttl_secs,
			recovery_ttl: settings.recovery_ttl_secs,
			invitation_ttl: settings.invitation_ttl_secs,
		}
	}

	/// `currentToken` is the caller's existing credential, required for
	/// every kind but `Access` issued fresh (empty currentToken is only
	/// legal there).
	pub async fn issue(&self, current_token: Option<&str>, spec: KeySpec) -> ClResult<IssuedTokens> {
		match spec.kind {
			KeyKind::Access => {
				if let Some(token) = current_token {
					let current = self.codec.parse(token)?;
					if current.kind != KeyKind::Refresh {
						return Err(Error::Authentication);
					}
					if current.subject != spec.subject {
						return Err(Error::Authentication);
					}
				}
				self.issue_access_refresh_pair(spec.subject, spec.domain)
			}
			KeyKind::Refresh => {
				let token = current_token.ok_or(Error::Authentication)?;
				let current = self.codec.parse(token)?;
				if current.kind != KeyKind::Refresh {
					return Err(Error::Authentication);
				}
				self.issue_access_refresh_pair(current.subject, current.domain)
			}
			KeyKind::Api => {
				let token = current_token.ok_or(Error::Authentication)?;
				let current = self.identify(token).await?;
				if current.kind != KeyKind::Access {
					return Err(Error::Authentication);
				}
				let key = Key {
					id: KeyId::new(),
					kind: KeyKind::Api,
					issuer: current.issuer,
					subject: spec.subject.or(current.subject),
					domain: spec.domain.or(current.domain),
					issued_at: Timestamp::now(),
					expires_at: Timestamp(0),
				};
				self.key_store.save(key.clone()).await?;
				let access_token = self.codec.issue(&key)?;
				Ok(IssuedTokens { access_token, refresh_token: None, access_type: "api".into() })
			}
			KeyKind::Recovery => {
				let token = current_token.ok_or(Error::Authentication)?;
				let current = self.identify(token).await?;
				if current.subject != spec.subject {
					return Err(Error::Authentication);
				}
				let key = Key {
					id: KeyId::new(),
					kind: KeyKind::Recovery,
					issuer: current.issuer,
					subject: spec.subject,
					domain: spec.domain,
					issued_at: Timestamp::now(),
					expires_at: Timestamp::from_now(self.recovery_ttl),
				};
				let access_token = self.codec.issue(&key)?;
				Ok(IssuedTokens { access_token, refresh_token: None, access_type: "recovery".into() })
			}
			KeyKind::Invitation => {
				let token = current_token.ok_or(Error::Authentication)?;
				let current = self.identify(token).await?;
				let domain = spec.domain.ok_or_else(|| Error::MalformedEntity("invitation requires a domain".into()))?;
				self.require_admin(&current, Some(domain)).await?;
				let key = Key {
					id: KeyId::new(),
					kind: KeyKind::Invitation,
					issuer: current.issuer,
					subject: spec.subject,
					domain: Some(domain),
					issued_at: Timestamp::now(),
					expires_at: Timestamp::from_now(self.invitation_ttl),
				};
				let access_token = self.codec.issue(&key)?;
				Ok(IssuedTokens { access_token, refresh_token: None, access_type: "invitation".into() })
			}
		}
	}

	fn issue_access_refresh_pair(&self, subject: Option<UserId>, domain: Option<DomainId>) -> ClResult<IssuedTokens> {
		let subject = subject.ok_or_else(|| Error::MalformedEntity("access key requires a subject".into()))?;
		let issued_at = Timestamp::now();

		let access = Key {
			id: KeyId::new(),
			kind: KeyKind::Access,
			issuer: subject,
			subject: Some(subject),
			domain,
			issued_at,
			expires_at: Timestamp::from_now(self.access_ttl),
		};
		let refresh = Key {
			id: KeyId::new(),
			kind: KeyKind::Refresh,
			issuer: subject,
			subject: Some(subject),
			domain,
			issued_at,
			expires_at: Timestamp::from_now(self.refresh_ttl),
		};

		Ok(IssuedTokens {
			access_token: self.codec.issue(&access)?,
			refresh_token: Some(self.codec.issue(&refresh)?),
			access_type: "bearer".into(),
		})
	}

	/// Only valid for API keys; idempotent on an already-removed id only in
	/// the sense that the caller gets a clean `NotFound`, not a crash. The
	/// caller identifies `kind` itself (e.g. from a `Key` it already holds)
	/// since the key store only ever persists API keys and so can't be
	/// asked to resolve a bare id's kind on its own.
	pub async fn revoke(&self, issuer: UserId, id: KeyId, kind: KeyKind) -> ClResult<()> {
		if kind != KeyKind::Api {
			return Err(Error::MalformedEntity("revoke is only valid for API keys".into()));
		}
		self.key_store.remove(issuer, id).await
	}

	pub async fn retrieve_key(&self, issuer: UserId, id: KeyId) -> ClResult<Key> {
		self.key_store.retrieve(issuer, id).await
	}

	/// Verifies signature and expiry; for API kind cross-checks the key
	/// store so a revoked key fails even though its signature still
	/// validates.
	pub async fn identify(&self, token: &str) -> ClResult<Key> {
		let key = self.codec.parse(token)?;
		if key.kind == KeyKind::Api {
			let subject = key.subject.ok_or(Error::Authentication)?;
			let stored = self.key_store.retrieve(subject, key.id).await.map_err(|e| match e {
				Error::NotFound => Error::Authentication,
				other => other,
			})?;
			if stored.is_expired() {
				return Err(Error::Authentication);
			}
		}
		Ok(key)
	}

	/// Resolves `subjectKind` shortcuts then defers to the policy agent.
	pub async fn authorize(&self, tuple: PolicyTuple) -> ClResult<()> {
		self.policy_agent.check_policy(tuple).await
	}

	pub async fn add_policy(&self, session: &Session, tuple: PolicyTuple) -> ClResult<()> {
		self.require_admin(&session_key(session), tuple.domain).await?;
		self.policy_agent.add_policy(tuple).await
	}

	pub async fn add_policies(&self, session: &Session, tuples: Vec<PolicyTuple>) -> ClResult<()> {
		for tuple in &tuples {
			self.require_admin(&session_key(session), tuple.domain).await?;
		}
		self.policy_agent.add_policies(tuples).await
	}

	pub async fn delete_policy_filter(&self, session: &Session, filter: PolicyTuple) -> ClResult<()> {
		self.require_admin(&session_key(session), filter.domain).await?;
		self.policy_agent.delete_policy_filter(filter).await
	}

	pub async fn delete_policies(&self, session: &Session, filters: Vec<PolicyTuple>) -> ClResult<()> {
		for filter in filters {
			self.delete_policy_filter(session, filter).await?;
		}
		Ok(())
	}

	pub async fn delete_entity_policies(&self, session: &Session, entity_type: EntityType, entity_id: &str) -> ClResult<()> {
		self.require_admin(&session_key(session), session.domain_id).await?;
		self.policy_agent.delete_entity_policies(entity_type, entity_id).await
	}

	pub async fn list_objects(&self, domain: Option<DomainId>, subject: &str, permission: &Permission, object_type: EntityType, page: PageRequest) -> ClResult<ObjectPage> {
		self.policy_agent.retrieve_objects(domain, subject, permission, object_type, page).await
	}

	pub async fn list_all_objects(&self, domain: Option<DomainId>, subject: &str, permission: &Permission, object_type: EntityType) -> ClResult<Vec<String>> {
		self.policy_agent.retrieve_all_objects(domain, subject, permission, object_type).await
	}

	pub async fn count_objects(&self, domain: Option<DomainId>, subject: &str, permission: &Permission, object_type: EntityType) -> ClResult<u64> {
		self.policy_agent.count_objects(domain, subject, permission, object_type).await
	}

	pub async fn list_subjects(&self, domain: Option<DomainId>, object: &str, permission: &Permission, subject_type: EntityType, page: PageRequest) -> ClResult<ObjectPage> {
		self.policy_agent.retrieve_subjects(domain, object, permission, subject_type, page).await
	}

	pub async fn list_all_subjects(&self, domain: Option<DomainId>, object: &str, permission: &Permission, subject_type: EntityType) -> ClResult<Vec<String>> {
		self.policy_agent.retrieve_all_subjects(domain, object, permission, subject_type).await
	}

	pub async fn count_subjects(&self, domain: Option<DomainId>, object: &str, permission: &Permission, subject_type: EntityType) -> ClResult<u64> {
		self.policy_agent.count_subjects(domain, object, permission, subject_type).await
	}

	pub async fn list_permissions(&self, domain: Option<DomainId>, subject: &str, object_type: EntityType, object: &str, filter: &[Permission]) -> ClResult<Vec<Permission>> {
		self.policy_agent.retrieve_permissions(domain, subject, object_type, object, filter).await
	}

	/// Used by policy-mutating passthroughs: the caller must hold `admin`
	/// over the relevant domain (or `platform` when acting outside one).
	async fn require_admin(&self, key: &Key, domain: Option<DomainId>) -> ClResult<()> {
		let subject = key.subject.map(|s| s.to_string()).ok_or(Error::Authentication)?;
		let (object_type, object) = match domain {
			Some(d) => (EntityType::Domain, d.to_string()),
			None => (EntityType::Platform, "platform".to_string()),
		};
		let tuple = PolicyTuple::filter(domain, EntityType::User, subject, Relation::from("administrator"), object_type, object.clone());
		match self.policy_agent.check_policy(PolicyTuple { permission: Some(Permission::from("admin")), ..tuple }).await {
			Ok(()) => Ok(()),
			Err(Error::Authorization) => {
				warn!(object = %object, "admin check failed for policy mutation");
				Err(Error::Authorization)
			}
			Err(other) => Err(other),
		}
	}
}

fn session_key(session: &Session) -> Key {
	Key {
		id: KeyId::default(),
		kind: KeyKind::Access,
		issuer: session.user_id,
		subject: Some(session.user_id),
		domain: session.domain_id,
		issued_at: Timestamp::now(),
		expires_at: Timestamp::from_now(60),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tokio::sync::Mutex;

	struct MemKeyStore {
		rows: Mutex<std::collections::HashMap<(UserId, KeyId), Key>>,
	}

	impl MemKeyStore {
		fn new() -> Self {
			MemKeyStore { rows: Mutex::new(std::collections::HashMap::new()) }
		}
	}

	#[async_trait::async_trait]
	impl KeyStore for MemKeyStore {
		async fn save(&self, key: Key) -> ClResult<()> {
			let mut rows = self.rows.lock().await;
			let k = (key.issuer, key.id);
			if rows.contains_key(&k) {
				return Err(Error::Conflict("duplicate key".into()));
			}
			rows.insert(k, key);
			Ok(())
		}

		async fn retrieve(&self, issuer: UserId, id: KeyId) -> ClResult<Key> {
			self.rows.lock().await.get(&(issuer, id)).cloned().ok_or(Error::NotFound)
		}

		async fn remove(&self, issuer: UserId, id: KeyId) -> ClResult<()> {
			self.rows.lock().await.remove(&(issuer, id)).map(|_| ()).ok_or(Error::NotFound)
		}
	}

	struct AllowAllAgent;

	#[async_trait::async_trait]
	impl PolicyAgent for AllowAllAgent {
		async fn add_policy(&self, _tuple: PolicyTuple) -> ClResult<()> {
			Ok(())
		}
		async fn add_policies(&self, _tuples: Vec<PolicyTuple>) -> ClResult<()> {
			Ok(())
		}
		async fn delete_policy_filter(&self, _filter: PolicyTuple) -> ClResult<()> {
			Ok(())
		}
		async fn delete_entity_policies(&self, _entity_type: EntityType, _entity_id: &str) -> ClResult<()> {
			Ok(())
		}
		async fn check_policy(&self, _tuple: PolicyTuple) -> ClResult<()> {
			Ok(())
		}
		async fn retrieve_objects(&self, _domain: Option<DomainId>, _subject: &str, _permission: &Permission, _object_type: EntityType, _page: PageRequest) -> ClResult<ObjectPage> {
			Ok(ObjectPage::default())
		}
		async fn retrieve_all_objects(&self, _domain: Option<DomainId>, _subject: &str, _permission: &Permission, _object_type: EntityType) -> ClResult<Vec<String>> {
			Ok(vec![])
		}
		async fn retrieve_subjects(&self, _domain: Option<DomainId>, _object: &str, _permission: &Permission, _subject_type: EntityType, _page: PageRequest) -> ClResult<ObjectPage> {
			Ok(ObjectPage::default())
		}
		async fn retrieve_all_subjects(&self, _domain: Option<DomainId>, _object: &str, _permission: &Permission, _subject_type: EntityType) -> ClResult<Vec<String>> {
			Ok(vec![])
		}
		async fn count_objects(&self, _domain: Option<DomainId>, _subject: &str, _permission: &Permission, _object_type: EntityType) -> ClResult<u64> {
			Ok(0)
		}
		async fn count_subjects(&self, _domain: Option<DomainId>, _object: &str, _permission: &Permission, _subject_type: EntityType) -> ClResult<u64> {
			Ok(0)
		}
		async fn retrieve_permissions(&self, _domain: Option<DomainId>, _subject: &str, _object_type: EntityType, _object: &str, filter: &[Permission]) -> ClResult<Vec<Permission>> {
			Ok(filter.to_vec())
		}
	}

	fn test_settings() -> Settings {
		Settings {
			log_level: "info".into(),
			db_dsn: "sqlite::memory:".into(),
			policy_agent_endpoint: None,
			policy_agent_preshared_key: None,
			signing_secret: "test-secret".into(),
			access_ttl_secs: 3600,
			refresh_ttl_secs: 86_400,
			recovery_ttl_secs: 900,
			invitation_ttl_secs: 604_800,
			listen_addr: "127.0.0.1:0".into(),
			telemetry_endpoint: None,
			request_deadline_secs: 30,
			tls_cert_path: None,
			tls_key_path: None,
			internal_service_token: None,
			event_log_path: "./authcore-events-test.ndjson".into(),
		}
	}

	#[tokio::test]
	async fn issue_then_identify_round_trips() {
		let svc = AuthorizationService::new(Arc::new(MemKeyStore::new()), Arc::new(AllowAllAgent), &test_settings());
		let user = UserId::new();
		let tokens = svc.issue(None, KeySpec { kind: KeyKind::Access, subject: Some(user), domain: None }).await.unwrap();
		let key = svc.identify(&tokens.access_token).await.unwrap();
		assert_eq!(key.subject, Some(user));
		assert_eq!(key.kind, KeyKind::Access);
	}

	#[tokio::test]
	async fn refresh_reissues_a_fresh_pair() {
		let svc = AuthorizationService::new(Arc::new(MemKeyStore::new()), Arc::new(AllowAllAgent), &test_settings());
		let user = UserId::new();
		let first = svc.issue(None, KeySpec { kind: KeyKind::Access, subject: Some(user), domain: None }).await.unwrap();
		let refresh_token = first.refresh_token.unwrap();
		let second = svc.issue(Some(&refresh_token), KeySpec { kind: KeyKind::Refresh, subject: Some(user), domain: None }).await.unwrap();
		let key = svc.identify(&second.access_token).await.unwrap();
		assert_eq!(key.subject, Some(user));
	}

	#[tokio::test]
	async fn revoked_api_key_fails_identify_even_with_valid_signature() {
		let svc = AuthorizationService::new(Arc::new(MemKeyStore::new()), Arc::new(AllowAllAgent), &test_settings());
		let user = UserId::new();
		let access = svc.issue(None, KeySpec { kind: KeyKind::Access, subject: Some(user), domain: None }).await.unwrap();
		let api = svc.issue(Some(&access.access_token), KeySpec { kind: KeyKind::Api, subject: Some(user), domain: None }).await.unwrap();
		let key = svc.identify(&api.access_token).await.unwrap();
		svc.revoke(user, key.id, key.kind).await.unwrap();
		assert!(matches!(svc.identify(&api.access_token).await, Err(Error::Authentication)));
	}

	#[tokio::test]
	async fn revoke_rejects_non_api_kind() {
		let svc = AuthorizationService::new(Arc::new(MemKeyStore::new()), Arc::new(AllowAllAgent), &test_settings());
		let user = UserId::new();
		let access = svc.issue(None, KeySpec { kind: KeyKind::Access, subject: Some(user), domain: None }).await.unwrap();
		let key = svc.identify(&access.access_token).await.unwrap();
		assert!(matches!(svc.revoke(user, key.id, key.kind).await, Err(Error::MalformedEntity(_))));
	}

	#[tokio::test]
	async fn revoke_is_idempotent_on_an_already_removed_api_key() {
		let svc = AuthorizationService::new(Arc::new(MemKeyStore::new()), Arc::new(AllowAllAgent), &test_settings());
		let user = UserId::new();
		let access = svc.issue(None, KeySpec { kind: KeyKind::Access, subject: Some(user), domain: None }).await.unwrap();
		let api = svc.issue(Some(&access.access_token), KeySpec { kind: KeyKind::Api, subject: Some(user), domain: None }).await.unwrap();
		let key = svc.identify(&api.access_token).await.unwrap();
		svc.revoke(user, key.id, key.kind).await.unwrap();
		assert!(matches!(svc.revoke(user, key.id, key.kind).await, Err(Error::NotFound)));
	}
}

// vim: ts=4
