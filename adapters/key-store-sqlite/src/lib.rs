//! SQLite-backed `KeyStore`: a durable table of issued API keys, indexed
//! by (issuer, id). Every other key kind is verified by signature alone
//! and never reaches this crate.

use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use authcore_types::prelude::*;

fn inspect(err: &sqlx::Error) {
	tracing::warn!("DB: {:#?}", err);
}

fn map_res<T>(row: Result<SqliteRow, sqlx::Error>, f: impl FnOnce(SqliteRow) -> Result<T, sqlx::Error>) -> ClResult<T> {
	match row {
		Ok(row) => f(row).map_err(|e| Error::Db(e.to_string())),
		Err(sqlx::Error::RowNotFound) => Err(Error::NotFound),
		Err(err) => {
			inspect(&err);
			Err(Error::Db(err.to_string()))
		}
	}
}

pub struct SqliteKeyStore {
	pool: SqlitePool,
}

impl SqliteKeyStore {
	pub fn new(pool: SqlitePool) -> Self {
		SqliteKeyStore { pool }
	}

	/// Creates the `keys` table if it does not yet exist. Call once at
	/// startup; safe to call repeatedly.
	pub async fn migrate(&self) -> ClResult<()> {
		sqlx::query(
			"CREATE TABLE IF NOT EXISTS keys (
				issuer_id TEXT NOT NULL,
				id TEXT NOT NULL,
				kind TEXT NOT NULL,
				subject TEXT,
				domain_id TEXT,
				issued_at INTEGER NOT NULL,
				expires_at INTEGER NOT NULL,
				PRIMARY KEY (issuer_id, id)
			)",
		)
		.execute(&self.pool)
		.await
		.map_err(|e| Error::Db(e.to_string()))?;
		Ok(())
	}

	fn row_to_key(row: SqliteRow) -> Result<Key, sqlx::Error> {
		let id: String = row.try_get("id")?;
		let issuer: String = row.try_get("issuer_id")?;
		let kind: String = row.try_get("kind")?;
		let subject: Option<String> = row.try_get("subject")?;
		let domain: Option<String> = row.try_get("domain_id")?;
		let issued_at: i64 = row.try_get("issued_at")?;
		let expires_at: i64 = row.try_get("expires_at")?;

		Ok(Key {
			id: id.parse().map_err(|_| sqlx::Error::Decode("malformed key id".into()))?,
			issuer: issuer.parse().map_err(|_| sqlx::Error::Decode("malformed issuer id".into()))?,
			kind: kind.parse().map_err(|_| sqlx::Error::Decode("malformed key kind".into()))?,
			subject: subject.and_then(|s| s.parse().ok()),
			domain: domain.and_then(|d| d.parse().ok()),
			issued_at: Timestamp(issued_at),
			expires_at: Timestamp(expires_at),
		})
	}
}

#[async_trait]
impl KeyStore for SqliteKeyStore {
	async fn save(&self, key: Key) -> ClResult<()> {
		let result = sqlx::query(
			"INSERT INTO keys (issuer_id, id, kind, subject, domain_id, issued_at, expires_at)
			VALUES (?, ?, ?, ?, ?, ?, ?)",
		)
		.bind(key.issuer.to_string())
		.bind(key.id.to_string())
		.bind(key.kind.as_str())
		.bind(key.subject.map(|s| s.to_string()))
		.bind(key.domain.map(|d| d.to_string()))
		.bind(key.issued_at.0)
		.bind(key.expires_at.0)
		.execute(&self.pool)
		.await;

		match result {
			Ok(_) => Ok(()),
			Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(Error::Conflict("duplicate (issuer, id)".into())),
			Err(e) => {
				inspect(&e);
				Err(Error::Db(e.to_string()))
			}
		}
	}

	async fn retrieve(&self, issuer: UserId, id: KeyId) -> ClResult<Key> {
		let row = sqlx::query("SELECT * FROM keys WHERE issuer_id = ? AND id = ?")
			.bind(issuer.to_string())
			.bind(id.to_string())
			.fetch_one(&self.pool)
			.await;
		map_res(row, Self::row_to_key)
	}

	async fn remove(&self, issuer: UserId, id: KeyId) -> ClResult<()> {
		let result = sqlx::query("DELETE FROM keys WHERE issuer_id = ? AND id = ?")
			.bind(issuer.to_string())
			.bind(id.to_string())
			.execute(&self.pool)
			.await
			.map_err(|e| Error::Db(e.to_string()))?;

		if result.rows_affected() == 0 {
			return Err(Error::NotFound);
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	async fn store() -> SqliteKeyStore {
		let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
		let store = SqliteKeyStore::new(pool);
		store.migrate().await.unwrap();
		store
	}

	fn sample_key() -> Key {
		Key {
			id: KeyId::new(),
			kind: KeyKind::Api,
			issuer: UserId::new(),
			subject: Some(UserId::new()),
			domain: None,
			issued_at: Timestamp::now(),
			expires_at: Timestamp::from_now(3600),
		}
	}

	#[tokio::test]
	async fn save_then_retrieve_round_trips() {
		let store = store().await;
		let key = sample_key();
		store.save(key.clone()).await.unwrap();
		let fetched = store.retrieve(key.issuer, key.id).await.unwrap();
		assert_eq!(fetched.id, key.id);
		assert_eq!(fetched.subject, key.subject);
	}

	#[tokio::test]
	async fn duplicate_save_conflicts() {
		let store = store().await;
		let key = sample_key();
		store.save(key.clone()).await.unwrap();
		assert!(matches!(store.save(key).await, Err(Error::Conflict(_))));
	}

	#[tokio::test]
	async fn retrieve_miss_is_not_found() {
		let store = store().await;
		assert!(matches!(store.retrieve(UserId::new(), KeyId::new()).await, Err(Error::NotFound)));
	}

	#[tokio::test]
	async fn remove_then_remove_again_is_not_found() {
		let store = store().await;
		let key = sample_key();
		store.save(key.clone()).await.unwrap();
		store.remove(key.issuer, key.id).await.unwrap();
		assert!(matches!(store.remove(key.issuer, key.id).await, Err(Error::NotFound)));
	}
}

// vim: ts=4
