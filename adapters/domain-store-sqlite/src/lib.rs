//! SQLite-backed `DomainStore`: tenants, their metadata, status, and
//! audit fields. Membership itself lives in the policy agent; this crate
//! only owns the `domains` row.

use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use authcore_types::prelude::*;

fn inspect(err: &sqlx::Error) {
	tracing::warn!("DB: {:#?}", err);
}

pub struct SqliteDomainStore {
	pool: SqlitePool,
}

impl SqliteDomainStore {
	pub fn new(pool: SqlitePool) -> Self {
		SqliteDomainStore { pool }
	}

	pub async fn migrate(&self) -> ClResult<()> {
		sqlx::query(
			"CREATE TABLE IF NOT EXISTS domains (
				id TEXT PRIMARY KEY,
				alias TEXT NOT NULL UNIQUE,
				name TEXT NOT NULL,
				tags TEXT NOT NULL,
				metadata TEXT NOT NULL,
				status TEXT NOT NULL,
				created_at INTEGER NOT NULL,
				updated_at INTEGER NOT NULL,
				created_by TEXT NOT NULL
			)",
		)
		.execute(&self.pool)
		.await
		.map_err(|e| Error::Db(e.to_string()))?;
		Ok(())
	}

	fn row_to_domain(row: SqliteRow) -> Result<Domain, sqlx::Error> {
		let id: String = row.try_get("id")?;
		let tags: String = row.try_get("tags")?;
		let metadata: String = row.try_get("metadata")?;
		let status: String = row.try_get("status")?;
		let created_by: String = row.try_get("created_by")?;

		Ok(Domain {
			id: id.parse().map_err(|_| sqlx::Error::Decode("malformed domain id".into()))?,
			alias: row.try_get("alias")?,
			name: row.try_get("name")?,
			tags: tags.split(',').filter(|s| !s.is_empty()).map(String::from).collect(),
			metadata: serde_json::from_str(&metadata).map_err(|_| sqlx::Error::Decode("malformed metadata".into()))?,
			status: status.parse().map_err(|_| sqlx::Error::Decode("malformed status".into()))?,
			created_at: Timestamp(row.try_get("created_at")?),
			updated_at: Timestamp(row.try_get("updated_at")?),
			created_by: created_by.parse().map_err(|_| sqlx::Error::Decode("malformed creator id".into()))?,
			permissions: Vec::new(),
		})
	}

	/// Pushes the `ids`/`status`/`tag` predicates shared by the row query
	/// and the count query, so a filtered `list()` can't drift the two
	/// apart again.
	fn push_predicates(builder: &mut sqlx::QueryBuilder<'_, sqlx::Sqlite>, ids: Option<&[DomainId]>, filter: &DomainFilter) {
		if let Some(ids) = ids {
			builder.push(" AND id IN (");
			let mut sep = builder.separated(", ");
			for id in ids {
				sep.push_bind(id.to_string());
			}
			builder.push(")");
		}
		if let Some(status) = filter.status {
			builder.push(" AND status = ").push_bind(status.as_str());
		}
		if let Some(tag) = &filter.tag {
			builder.push(" AND (',' || tags || ',') LIKE ").push_bind(format!("%,{tag},%"));
		}
	}

	async fn fetch_one_by(&self, clause: &str, bind: &str) -> ClResult<Domain> {
		let row = sqlx::query(&format!("SELECT * FROM domains WHERE {clause} = ?"))
			.bind(bind)
			.fetch_one(&self.pool)
			.await;
		match row {
			Ok(row) => Self::row_to_domain(row).map_err(|e| Error::Db(e.to_string())),
			Err(sqlx::Error::RowNotFound) => Err(Error::NotFound),
			Err(e) => {
				inspect(&e);
				Err(Error::Db(e.to_string()))
			}
		}
	}
}

#[async_trait]
impl DomainStore for SqliteDomainStore {
	async fn create(&self, domain: Domain) -> ClResult<Domain> {
		let metadata = serde_json::to_string(&domain.metadata).map_err(|e| Error::MalformedEntity(e.to_string()))?;
		let result = sqlx::query(
			"INSERT INTO domains (id, alias, name, tags, metadata, status, created_at, updated_at, created_by)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
		)
		.bind(domain.id.to_string())
		.bind(&domain.alias)
		.bind(&domain.name)
		.bind(domain.tags.join(","))
		.bind(metadata)
		.bind(domain.status.as_str())
		.bind(domain.created_at.0)
		.bind(domain.updated_at.0)
		.bind(domain.created_by.to_string())
		.execute(&self.pool)
		.await;

		match result {
			Ok(_) => Ok(domain),
			Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(Error::Conflict(format!("alias {} already taken", domain.alias))),
			Err(e) => {
				inspect(&e);
				Err(Error::Db(e.to_string()))
			}
		}
	}

	async fn retrieve(&self, id: DomainId) -> ClResult<Domain> {
		self.fetch_one_by("id", &id.to_string()).await
	}

	async fn retrieve_by_alias(&self, alias: &str) -> ClResult<Domain> {
		self.fetch_one_by("alias", alias).await
	}

	async fn update(&self, id: DomainId, patch: DomainUpdate) -> ClResult<Domain> {
		let mut builder = sqlx::QueryBuilder::new("UPDATE domains SET ");
		let mut has_updates = false;

		if let Some(name) = patch.name.value() {
			builder.push("name = ").push_bind(name.clone());
			has_updates = true;
		}
		if let Some(tags) = patch.tags.value() {
			if has_updates {
				builder.push(", ");
			}
			builder.push("tags = ").push_bind(tags.join(","));
			has_updates = true;
		}
		if let Some(metadata) = patch.metadata.value() {
			if has_updates {
				builder.push(", ");
			}
			let encoded = serde_json::to_string(metadata).map_err(|e| Error::MalformedEntity(e.to_string()))?;
			builder.push("metadata = ").push_bind(encoded);
			has_updates = true;
		}

		if has_updates {
			builder.push(", updated_at = ").push_bind(Timestamp::now().0);
			builder.push(" WHERE id = ").push_bind(id.to_string());
			builder.build().execute(&self.pool).await.map_err(|e| {
				inspect(&e);
				Error::Db(e.to_string())
			})?;
		}

		self.retrieve(id).await
	}

	async fn set_status(&self, id: DomainId, status: DomainStatus) -> ClResult<Domain> {
		sqlx::query("UPDATE domains SET status = ?, updated_at = ? WHERE id = ?")
			.bind(status.as_str())
			.bind(Timestamp::now().0)
			.bind(id.to_string())
			.execute(&self.pool)
			.await
			.map_err(|e| {
				inspect(&e);
				Error::Db(e.to_string())
			})?;
		self.retrieve(id).await
	}

	async fn list(&self, ids: Option<&[DomainId]>, filter: DomainFilter, page: PageRequest) -> ClResult<Page<Domain>> {
		let page = page.normalized();

		if matches!(ids, Some(ids) if ids.is_empty()) {
			return Ok(Page { items: Vec::new(), offset: page.offset, limit: page.limit, total: 0 });
		}

		let mut builder = sqlx::QueryBuilder::new("SELECT * FROM domains WHERE 1=1");
		Self::push_predicates(&mut builder, ids, &filter);
		builder.push(" ORDER BY created_at ASC LIMIT ").push_bind(page.limit as i64);
		builder.push(" OFFSET ").push_bind(page.offset as i64);

		let rows = builder.build().fetch_all(&self.pool).await.map_err(|e| {
			inspect(&e);
			Error::Db(e.to_string())
		})?;

		let mut items = Vec::with_capacity(rows.len());
		for row in rows {
			items.push(Self::row_to_domain(row).map_err(|e| Error::Db(e.to_string()))?);
		}

		let mut count_builder = sqlx::QueryBuilder::new("SELECT COUNT(*) FROM domains WHERE 1=1");
		Self::push_predicates(&mut count_builder, ids, &filter);
		let total: i64 = count_builder.build_query_scalar().fetch_one(&self.pool).await.map_err(|e| {
			inspect(&e);
			Error::Db(e.to_string())
		})?;

		Ok(Page { items, offset: page.offset, limit: page.limit, total: total as u64 })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	async fn store() -> SqliteDomainStore {
		let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
		let store = SqliteDomainStore::new(pool);
		store.migrate().await.unwrap();
		store
	}

	fn sample_domain(alias: &str) -> Domain {
		let now = Timestamp::now();
		Domain {
			id: DomainId::new(),
			alias: alias.into(),
			name: "Acme".into(),
			tags: vec!["iot".into()],
			metadata: HashMap::new(),
			status: DomainStatus::Enabled,
			created_at: now,
			updated_at: now,
			created_by: UserId::new(),
			permissions: Vec::new(),
		}
	}

	#[tokio::test]
	async fn create_then_retrieve_round_trips() {
		let store = store().await;
		let domain = sample_domain("acme");
		store.create(domain.clone()).await.unwrap();
		let fetched = store.retrieve(domain.id).await.unwrap();
		assert_eq!(fetched.alias, "acme");
		assert_eq!(fetched.tags, vec!["iot".to_string()]);
	}

	#[tokio::test]
	async fn duplicate_alias_conflicts() {
		let store = store().await;
		let a = sample_domain("acme");
		let mut b = sample_domain("acme");
		b.id = DomainId::new();
		store.create(a).await.unwrap();
		assert!(matches!(store.create(b).await, Err(Error::Conflict(_))));
	}

	#[tokio::test]
	async fn status_transition_persists() {
		let store = store().await;
		let domain = sample_domain("acme");
		store.create(domain.clone()).await.unwrap();
		let updated = store.set_status(domain.id, DomainStatus::Disabled).await.unwrap();
		assert_eq!(updated.status, DomainStatus::Disabled);
	}

	#[tokio::test]
	async fn list_filters_by_status() {
		let store = store().await;
		let a = sample_domain("acme");
		let mut b = sample_domain("globex");
		b.id = DomainId::new();
		store.create(a.clone()).await.unwrap();
		store.create(b.clone()).await.unwrap();
		store.set_status(b.id, DomainStatus::Disabled).await.unwrap();

		let page = store.list(None, DomainFilter { status: Some(DomainStatus::Enabled), ..Default::default() }, PageRequest::default()).await.unwrap();
		assert_eq!(page.items.len(), 1);
		assert_eq!(page.items[0].id, a.id);
		assert_eq!(page.total, 1, "total must reflect the status filter, not the whole table");
	}

	#[tokio::test]
	async fn list_with_empty_id_restriction_returns_nothing() {
		let store = store().await;
		store.create(sample_domain("acme")).await.unwrap();

		let page = store.list(Some(&[]), DomainFilter::default(), PageRequest::default()).await.unwrap();
		assert!(page.items.is_empty());
		assert_eq!(page.total, 0);
	}
}

// vim: ts=4
