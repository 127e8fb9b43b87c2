//! Side-effect publication of domain state changes to an external,
//! log-structured bus. Delivery is at-least-once from the core's
//! perspective: a publish failure is logged, never propagated back to the
//! caller, since the entity change has already committed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{DomainId, Timestamp, UserId};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Event {
	pub operation: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub domain_id: Option<DomainId>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub user_ids: Option<Vec<UserId>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub relation: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub status: Option<String>,
	pub created_at: Timestamp,
	pub created_by: UserId,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub extra: Option<Value>,
}

impl Event {
	pub fn new(operation: impl Into<String>, created_by: UserId) -> Self {
		Event {
			operation: operation.into(),
			id: None,
			domain_id: None,
			user_ids: None,
			relation: None,
			status: None,
			created_at: Timestamp::now(),
			created_by,
			extra: None,
		}
	}
}

#[async_trait]
pub trait EventPublisher: Send + Sync {
	/// Publish failures are the publisher's own concern; this signature
	/// still returns a `ClResult` so a caller that wants strict delivery
	/// (tests, batch tooling) can observe it, but the production
	/// middleware that wraps the domain service always logs and swallows.
	async fn publish(&self, topic: &str, event: Event) -> crate::error::ClResult<()>;
}

// vim: ts=4
