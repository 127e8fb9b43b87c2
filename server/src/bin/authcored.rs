//! Reference binary: wires the SQLite and in-memory adapters together and
//! runs the facade. A deployment with a real policy backend or event bus
//! swaps the adapter construction below for its own, the services and
//! routes are unaware of the difference.

use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;

use authcore::Settings;
use authcore_domain_store_sqlite::SqliteDomainStore;
use authcore_event_publisher_ndjson::NdjsonEventPublisher;
use authcore_key_store_sqlite::SqliteKeyStore;
use authcore_policy_agent_memory::MemoryPolicyAgent;
use authcore_server::Builder;

#[tokio::main]
async fn main() {
	let settings = Settings::from_env().unwrap_or_else(|e| {
		eprintln!("FATAL: {e}");
		std::process::exit(1);
	});

	let pool = SqlitePoolOptions::new().connect(&settings.db_dsn).await.unwrap_or_else(|e| {
		eprintln!("FATAL: could not connect to {}: {e}", settings.db_dsn);
		std::process::exit(1);
	});

	let key_store = SqliteKeyStore::new(pool.clone());
	key_store.migrate().await.expect("FATAL: key store migration failed");

	let domain_store = SqliteDomainStore::new(pool.clone());
	domain_store.migrate().await.expect("FATAL: domain store migration failed");

	let policy_agent = MemoryPolicyAgent::new();
	let event_publisher = NdjsonEventPublisher::new(settings.event_log_path.clone());

	Builder::new()
		.key_store(Arc::new(key_store))
		.domain_store(Arc::new(domain_store))
		.policy_agent(Arc::new(policy_agent))
		.event_publisher(Arc::new(event_publisher))
		.settings(settings)
		.run()
		.await
		.unwrap_or_else(|e| {
			eprintln!("FATAL: {e}");
			std::process::exit(1);
		});
}

// vim: ts=4
