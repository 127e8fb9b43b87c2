//! In-memory reference implementation of the `PolicyAgent` contract,
//! backed by a `DashMap` tuple store. Not meant to replace the external
//! ReBAC relation store the design treats as authoritative; it exists so
//! the rest of the workspace has a concrete, testable agent to run
//! against.

mod schema;

use std::collections::HashSet;

use async_trait::async_trait;
use dashmap::DashMap;

use authcore_types::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct TupleKey {
	domain: Option<DomainId>,
	subject_type: EntityTypeKey,
	subject: String,
	relation: String,
	object_type: EntityTypeKey,
	object: String,
}

/// `EntityType` itself is not `Hash`/`Eq` in the shared crate (it only
/// needs `Serialize`/`Deserialize` there); this mirrors it locally so it
/// can key the tuple map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum EntityTypeKey {
	User,
	Thing,
	Group,
	Domain,
	Platform,
}

impl From<EntityType> for EntityTypeKey {
	fn from(t: EntityType) -> Self {
		match t {
			EntityType::User => EntityTypeKey::User,
			EntityType::Thing => EntityTypeKey::Thing,
			EntityType::Group => EntityTypeKey::Group,
			EntityType::Domain => EntityTypeKey::Domain,
			EntityType::Platform => EntityTypeKey::Platform,
		}
	}
}

impl From<EntityTypeKey> for EntityType {
	fn from(t: EntityTypeKey) -> Self {
		match t {
			EntityTypeKey::User => EntityType::User,
			EntityTypeKey::Thing => EntityType::Thing,
			EntityTypeKey::Group => EntityType::Group,
			EntityTypeKey::Domain => EntityType::Domain,
			EntityTypeKey::Platform => EntityType::Platform,
		}
	}
}

impl TupleKey {
	fn from_tuple(t: &PolicyTuple) -> Self {
		TupleKey {
			domain: t.domain,
			subject_type: t.subject_type.into(),
			subject: t.subject.clone(),
			relation: t.relation.as_str().to_string(),
			object_type: t.object_type.into(),
			object: t.object.clone(),
		}
	}

	fn matches_filter(&self, f: &PolicyTuple) -> bool {
		if f.domain.is_some() && f.domain != self.domain {
			return false;
		}
		if !f.subject.is_empty() && f.subject != self.subject {
			return false;
		}
		if !f.relation.as_str().is_empty() && f.relation.as_str() != self.relation {
			return false;
		}
		if !f.object.is_empty() && f.object != self.object {
			return false;
		}
		true
	}
}

pub struct MemoryPolicyAgent {
	tuples: DashMap<TupleKey, ()>,
}

impl MemoryPolicyAgent {
	pub fn new() -> Self {
		MemoryPolicyAgent { tuples: DashMap::new() }
	}

	fn matching_relation(&self, domain: Option<DomainId>, subject: &str, object_type: EntityType, object: &str) -> Option<String> {
		self.tuples
			.iter()
			.filter(|entry| {
				let k = entry.key();
				k.domain == domain && k.subject == subject && EntityType::from(k.object_type) == object_type && k.object == object
			})
			.map(|entry| entry.key().relation.clone())
			.max_by_key(|r| schema::derive_permissions(object_type, r).len())
	}
}

impl Default for MemoryPolicyAgent {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl PolicyAgent for MemoryPolicyAgent {
	async fn add_policy(&self, tuple: PolicyTuple) -> ClResult<()> {
		self.tuples.insert(TupleKey::from_tuple(&tuple), ());
		Ok(())
	}

	async fn add_policies(&self, tuples: Vec<PolicyTuple>) -> ClResult<()> {
		for tuple in tuples {
			self.tuples.insert(TupleKey::from_tuple(&tuple), ());
		}
		Ok(())
	}

	async fn delete_policy_filter(&self, filter: PolicyTuple) -> ClResult<()> {
		let dead: Vec<TupleKey> = self.tuples.iter().map(|e| e.key().clone()).filter(|k| k.matches_filter(&filter)).collect();
		for key in dead {
			self.tuples.remove(&key);
		}
		Ok(())
	}

	async fn delete_entity_policies(&self, entity_type: EntityType, entity_id: &str) -> ClResult<()> {
		let key_type: EntityTypeKey = entity_type.into();
		let dead: Vec<TupleKey> = self
			.tuples
			.iter()
			.map(|e| e.key().clone())
			.filter(|k| (k.subject_type == key_type && k.subject == entity_id) || (k.object_type == key_type && k.object == entity_id))
			.collect();
		for key in dead {
			self.tuples.remove(&key);
		}
		Ok(())
	}

	async fn check_policy(&self, tuple: PolicyTuple) -> ClResult<()> {
		let permission = tuple.permission.as_ref().ok_or_else(|| Error::InvalidPolicy("check requires a permission".into()))?;
		let holds = self.tuples.iter().any(|entry| {
			let k = entry.key();
			k.domain == tuple.domain
				&& k.subject == tuple.subject
				&& EntityType::from(k.object_type) == tuple.object_type
				&& k.object == tuple.object
				&& schema::grants(tuple.object_type, &k.relation, permission.as_str())
		});
		if holds {
			Ok(())
		} else {
			Err(Error::Authorization)
		}
	}

	async fn retrieve_objects(&self, domain: Option<DomainId>, subject: &str, permission: &Permission, object_type: EntityType, page: PageRequest) -> ClResult<ObjectPage> {
		let all = self.retrieve_all_objects(domain, subject, permission, object_type).await?;
		let page = page.normalized();
		let ids = all.into_iter().skip(page.offset as usize).take(page.limit as usize).collect();
		Ok(ObjectPage { ids, next_page_token: None })
	}

	async fn retrieve_all_objects(&self, domain: Option<DomainId>, subject: &str, permission: &Permission, object_type: EntityType) -> ClResult<Vec<String>> {
		let mut seen = HashSet::new();
		let ids: Vec<String> = self
			.tuples
			.iter()
			.filter(|entry| {
				let k = entry.key();
				k.domain == domain && k.subject == subject && EntityType::from(k.object_type) == object_type && schema::grants(object_type, &k.relation, permission.as_str())
			})
			.map(|entry| entry.key().object.clone())
			.filter(|id| seen.insert(id.clone()))
			.collect();
		Ok(ids)
	}

	async fn retrieve_subjects(&self, domain: Option<DomainId>, object: &str, permission: &Permission, subject_type: EntityType, page: PageRequest) -> ClResult<ObjectPage> {
		let all = self.retrieve_all_subjects(domain, object, permission, subject_type).await?;
		let page = page.normalized();
		let ids = all.into_iter().skip(page.offset as usize).take(page.limit as usize).collect();
		Ok(ObjectPage { ids, next_page_token: None })
	}

	async fn retrieve_all_subjects(&self, domain: Option<DomainId>, object: &str, permission: &Permission, subject_type: EntityType) -> ClResult<Vec<String>> {
		let mut seen = HashSet::new();
		let ids: Vec<String> = self
			.tuples
			.iter()
			.filter(|entry| {
				let k = entry.key();
				k.domain == domain && k.object == object && EntityType::from(k.subject_type) == subject_type && schema::grants(k.object_type.into(), &k.relation, permission.as_str())
			})
			.map(|entry| entry.key().subject.clone())
			.filter(|id| seen.insert(id.clone()))
			.collect();
		Ok(ids)
	}

	async fn count_objects(&self, domain: Option<DomainId>, subject: &str, permission: &Permission, object_type: EntityType) -> ClResult<u64> {
		Ok(self.retrieve_all_objects(domain, subject, permission, object_type).await?.len() as u64)
	}

	async fn count_subjects(&self, domain: Option<DomainId>, object: &str, permission: &Permission, subject_type: EntityType) -> ClResult<u64> {
		Ok(self.retrieve_all_subjects(domain, object, permission, subject_type).await?.len() as u64)
	}

	async fn retrieve_permissions(&self, domain: Option<DomainId>, subject: &str, object_type: EntityType, object: &str, filter: &[Permission]) -> ClResult<Vec<Permission>> {
		let relation = self.matching_relation(domain, subject, object_type, object);
		let Some(relation) = relation else {
			return Ok(Vec::new());
		};
		let granted = schema::derive_permissions(object_type, &relation);
		Ok(filter.iter().filter(|p| granted.contains(&p.as_str())).cloned().collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn tuple(domain: Option<DomainId>, subject: &str, relation: &str, object_type: EntityType, object: &str) -> PolicyTuple {
		PolicyTuple {
			domain,
			subject_type: EntityType::User,
			subject_kind: SubjectKind::UsersKind,
			subject: subject.to_string(),
			relation: Relation::from(relation),
			object_type,
			object: object.to_string(),
			permission: None,
		}
	}

	fn check(domain: Option<DomainId>, subject: &str, permission: &str, object_type: EntityType, object: &str) -> PolicyTuple {
		PolicyTuple { permission: Some(Permission::from(permission)), ..tuple(domain, subject, "", object_type, object) }
	}

	#[tokio::test]
	async fn add_then_check_then_delete_filter() {
		let agent = MemoryPolicyAgent::new();
		let d = DomainId::new();
		agent.add_policy(tuple(Some(d), "u1", "administrator", EntityType::Domain, &d.to_string())).await.unwrap();

		agent.check_policy(check(Some(d), "u1", "admin", EntityType::Domain, &d.to_string())).await.unwrap();

		agent
			.delete_policy_filter(PolicyTuple { domain: None, subject: "u1".into(), object: d.to_string(), ..tuple(None, "", "", EntityType::Domain, "") })
			.await
			.unwrap();

		assert!(matches!(agent.check_policy(check(Some(d), "u1", "admin", EntityType::Domain, &d.to_string())).await, Err(Error::Authorization)));
	}

	#[tokio::test]
	async fn add_policy_is_idempotent_for_counts() {
		let agent = MemoryPolicyAgent::new();
		let d = DomainId::new();
		let t = tuple(Some(d), "u1", "editor", EntityType::Domain, &d.to_string());
		agent.add_policy(t.clone()).await.unwrap();
		agent.add_policy(t).await.unwrap();

		let count = agent.count_objects(Some(d), "u1", &Permission::from("edit"), EntityType::Domain).await.unwrap();
		assert_eq!(count, 1);
	}

	#[tokio::test]
	async fn delete_entity_policies_removes_every_tuple_mentioning_the_user() {
		let agent = MemoryPolicyAgent::new();
		let d1 = DomainId::new();
		let d2 = DomainId::new();
		agent.add_policy(tuple(Some(d1), "u1", "administrator", EntityType::Domain, &d1.to_string())).await.unwrap();
		agent.add_policy(tuple(Some(d2), "u1", "viewer", EntityType::Domain, &d2.to_string())).await.unwrap();

		agent.delete_entity_policies(EntityType::User, "u1").await.unwrap();

		assert!(matches!(agent.check_policy(check(Some(d1), "u1", "admin", EntityType::Domain, &d1.to_string())).await, Err(Error::Authorization)));
		assert!(matches!(agent.check_policy(check(Some(d2), "u1", "view", EntityType::Domain, &d2.to_string())).await, Err(Error::Authorization)));
	}

	#[tokio::test]
	async fn editor_relation_implies_view_but_not_admin() {
		let agent = MemoryPolicyAgent::new();
		let d = DomainId::new();
		agent.add_policy(tuple(Some(d), "u2", "editor", EntityType::Domain, &d.to_string())).await.unwrap();

		agent.check_policy(check(Some(d), "u2", "view", EntityType::Domain, &d.to_string())).await.unwrap();
		assert!(matches!(agent.check_policy(check(Some(d), "u2", "admin", EntityType::Domain, &d.to_string())).await, Err(Error::Authorization)));
	}
}

// vim: ts=4
