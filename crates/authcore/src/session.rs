//! The request-scoped authenticated principal. Synthesized once by the
//! facade from the bearer token and passed down by value; nothing in this
//! crate re-authenticates against it.

use authcore_types::prelude::{DomainId, UserId};

#[derive(Clone, Debug)]
pub struct Session {
	pub user_id: UserId,
	pub domain_id: Option<DomainId>,
	/// `domain:user` composite subject string used for domain-scoped policy
	/// lookups, present only when `domain_id` is.
	pub domain_user_id: Option<String>,
	pub super_admin: bool,
}

impl Session {
	pub fn platform(user_id: UserId, super_admin: bool) -> Self {
		Session { user_id, domain_id: None, domain_user_id: None, super_admin }
	}

	pub fn scoped(user_id: UserId, domain_id: DomainId, super_admin: bool) -> Self {
		Session {
			user_id,
			domain_id: Some(domain_id),
			domain_user_id: Some(format!("{domain_id}:{user_id}")),
			super_admin,
		}
	}

	/// The subject string to use for policy lookups: the domain-scoped
	/// composite when inside a tenant, otherwise the plain user id.
	pub fn policy_subject(&self) -> String {
		self.domain_user_id.clone().unwrap_or_else(|| self.user_id.to_string())
	}
}

// vim: ts=4
