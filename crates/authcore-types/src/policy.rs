//! Policy tuples and the closed vocabulary of types/relations/permissions
//! the policy agent operates over.

use serde::{Deserialize, Serialize};

use crate::types::DomainId;

/// `SubjectType`/`ObjectType`: free-form strings over a closed vocabulary in
/// the wire protocol, but the core treats them as a real enum so that a
/// typo becomes a `MalformedEntity` instead of a silent no-op policy write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
	User,
	Thing,
	Group,
	Domain,
	Platform,
}

impl EntityType {
	pub fn as_str(&self) -> &'static str {
		match self {
			EntityType::User => "user",
			EntityType::Thing => "thing",
			EntityType::Group => "group",
			EntityType::Domain => "domain",
			EntityType::Platform => "platform",
		}
	}
}

impl std::str::FromStr for EntityType {
	type Err = crate::error::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"user" => Ok(EntityType::User),
			"thing" => Ok(EntityType::Thing),
			"group" => Ok(EntityType::Group),
			"domain" => Ok(EntityType::Domain),
			"platform" => Ok(EntityType::Platform),
			other => Err(crate::error::Error::MalformedEntity(format!("unknown entity type: {other}"))),
		}
	}
}

/// A direct edge in the policy graph, e.g. `administrator`, `editor`,
/// `viewer`, `member`, `owner`, `parent`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation(pub String);

impl Relation {
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&str> for Relation {
	fn from(s: &str) -> Self {
		Relation(s.to_string())
	}
}

/// A derived capability computed from relations by the agent's schema, e.g.
/// `edit`, `view`, `admin`, `membership`, `share`, `publish`, `subscribe`,
/// `delete`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission(pub String);

impl Permission {
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&str> for Permission {
	fn from(s: &str) -> Self {
		Permission(s.to_string())
	}
}

/// A single relation assertion: `(domain, subjectType, subjectKind,
/// subject, relation, objectType, object)` plus the derived permission it
/// is being checked against, when used for a `CheckPolicy` call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolicyTuple {
	pub domain: Option<DomainId>,
	pub subject_type: EntityType,
	/// Distinguishes a plain user subject from a domain-scoped one
	/// (`domainUserID`), e.g. `UsersKind` vs `DomainUsersKind`.
	pub subject_kind: SubjectKind,
	pub subject: String,
	pub relation: Relation,
	pub object_type: EntityType,
	pub object: String,
	/// Set when the tuple represents a permission check rather than a
	/// relation write; absent for `AddPolicy`/`DeletePolicyFilter`.
	pub permission: Option<Permission>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SubjectKind {
	/// A plain user id.
	UsersKind,
	/// `domainUserID` — the concatenation of domain and user, used when the
	/// subject's standing is scoped to one tenant.
	DomainUsersKind,
	/// The subject is itself a non-user entity (thing, group).
	EntityKind,
}

impl PolicyTuple {
	pub fn filter(
		domain: Option<DomainId>,
		subject_type: EntityType,
		subject: impl Into<String>,
		relation: impl Into<Relation>,
		object_type: EntityType,
		object: impl Into<String>,
	) -> Self {
		PolicyTuple {
			domain,
			subject_type,
			subject_kind: SubjectKind::UsersKind,
			subject: subject.into(),
			relation: relation.into(),
			object_type,
			object: object.into(),
			permission: None,
		}
	}
}

// vim: ts=4
