//! The `Key` entity — the internal, typed record describing an issued
//! credential.

use serde::{Deserialize, Serialize};

use crate::types::{DomainId, KeyId, Timestamp, UserId};

/// Kind of credential a `Key` represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {
	Access,
	Refresh,
	Recovery,
	Api,
	Invitation,
}

impl KeyKind {
	/// Only API keys are durably persisted; every other kind is verified by
	/// signature and expiry alone.
	pub fn is_persisted(&self) -> bool {
		matches!(self, KeyKind::Api)
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			KeyKind::Access => "access",
			KeyKind::Refresh => "refresh",
			KeyKind::Recovery => "recovery",
			KeyKind::Api => "api",
			KeyKind::Invitation => "invitation",
		}
	}
}

impl std::str::FromStr for KeyKind {
	type Err = crate::error::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"access" => Ok(KeyKind::Access),
			"refresh" => Ok(KeyKind::Refresh),
			"recovery" => Ok(KeyKind::Recovery),
			"api" => Ok(KeyKind::Api),
			"invitation" => Ok(KeyKind::Invitation),
			other => Err(crate::error::Error::MalformedEntity(format!("unknown key kind: {other}"))),
		}
	}
}

/// The internal record behind every issued credential. Tokens (`token.rs`)
/// are a signed projection of this struct.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Key {
	pub id: KeyId,
	pub kind: KeyKind,
	pub issuer: UserId,
	pub subject: Option<UserId>,
	pub domain: Option<DomainId>,
	pub issued_at: Timestamp,
	/// Zero means "never expires" — only legal for `Api` keys.
	pub expires_at: Timestamp,
}

impl Key {
	pub fn is_expired(&self) -> bool {
		self.expires_at.has_passed()
	}
}

// vim: ts=4
