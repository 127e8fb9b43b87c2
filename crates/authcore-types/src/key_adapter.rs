//! Durable key storage contract. Only `Api` keys are ever persisted through
//! this trait; every other kind lives and dies with the signed token.

use async_trait::async_trait;

use crate::error::ClResult;
use crate::key::Key;
use crate::types::{KeyId, UserId};

#[async_trait]
pub trait KeyStore: Send + Sync {
	/// Insert a new key row. Errors `Conflict` on a duplicate (issuer, id).
	async fn save(&self, key: Key) -> ClResult<()>;

	/// Errors `NotFound` on a miss.
	async fn retrieve(&self, issuer: UserId, id: KeyId) -> ClResult<Key>;

	/// Errors `NotFound` if already removed or never existed.
	async fn remove(&self, issuer: UserId, id: KeyId) -> ClResult<()>;
}

// vim: ts=4
