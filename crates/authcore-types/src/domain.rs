//! The `Domain` entity — the multi-tenant boundary.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{DomainId, Patch, Timestamp, UserId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainStatus {
	Enabled,
	Disabled,
	Freezed,
	Deleted,
}

impl DomainStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			DomainStatus::Enabled => "enabled",
			DomainStatus::Disabled => "disabled",
			DomainStatus::Freezed => "freezed",
			DomainStatus::Deleted => "deleted",
		}
	}

	/// Legal status transitions: `enabled <-> disabled`, `enabled ->
	/// freezed`, and any state into `deleted` (terminal).
	pub fn can_transition_to(&self, next: DomainStatus) -> bool {
		use DomainStatus::*;
		match (self, next) {
			(Deleted, _) => false,
			(_, Deleted) => true,
			(Enabled, Disabled) | (Disabled, Enabled) | (Enabled, Freezed) => true,
			(Freezed, Enabled) => true,
			_ => false,
		}
	}
}

impl std::str::FromStr for DomainStatus {
	type Err = crate::error::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"enabled" => Ok(DomainStatus::Enabled),
			"disabled" => Ok(DomainStatus::Disabled),
			"freezed" => Ok(DomainStatus::Freezed),
			"deleted" => Ok(DomainStatus::Deleted),
			other => Err(crate::error::Error::MalformedEntity(format!("unknown domain status: {other}"))),
		}
	}
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
	pub id: DomainId,
	/// Unique, immutable once assigned at creation.
	pub alias: String,
	pub name: String,
	pub tags: Vec<String>,
	pub metadata: HashMap<String, serde_json::Value>,
	pub status: DomainStatus,
	pub created_at: Timestamp,
	pub updated_at: Timestamp,
	pub created_by: UserId,
	/// Permissions the viewing session holds, filled in by the service layer
	/// right before the entity leaves the core; empty on a freshly loaded
	/// record from the store.
	#[serde(skip_serializing_if = "Vec::is_empty", default)]
	pub permissions: Vec<String>,
}

/// Patch payload for `UpdateDomain`. `alias` is deliberately absent: the
/// attribute is immutable once set.
#[derive(Clone, Debug, Default)]
pub struct DomainUpdate {
	pub name: Patch<String>,
	pub tags: Patch<Vec<String>>,
	pub metadata: Patch<HashMap<String, serde_json::Value>>,
}

#[derive(Clone, Debug, Default)]
pub struct DomainFilter {
	pub status: Option<DomainStatus>,
	pub tag: Option<String>,
	pub permission: Option<String>,
	pub subject: Option<UserId>,
}

// vim: ts=4
