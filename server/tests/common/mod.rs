//! Shared test harness: builds a facade `Router` wired against a temp
//! SQLite file, the in-memory policy agent, and an NDJSON sink under a
//! `TempDir`, plus request helpers for driving it with `tower::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use tempfile::TempDir;
use tower::ServiceExt;

use authcore::Settings;
use authcore_domain_store_sqlite::SqliteDomainStore;
use authcore_event_publisher_ndjson::NdjsonEventPublisher;
use authcore_key_store_sqlite::SqliteKeyStore;
use authcore_policy_agent_memory::MemoryPolicyAgent;
use authcore_server::Builder;

pub struct TestApp {
	pub router: Router,
	_tmp: TempDir,
}

pub fn test_settings(tmp: &TempDir) -> Settings {
	Settings {
		log_level: "error".into(),
		db_dsn: format!("sqlite://{}/authcore.db?mode=rwc", tmp.path().display()),
		policy_agent_endpoint: None,
		policy_agent_preshared_key: None,
		signing_secret: "integration-test-secret".into(),
		access_ttl_secs: 3600,
		refresh_ttl_secs: 86_400,
		recovery_ttl_secs: 900,
		invitation_ttl_secs: 604_800,
		listen_addr: "127.0.0.1:0".into(),
		telemetry_endpoint: None,
		request_deadline_secs: 30,
		tls_cert_path: None,
		tls_key_path: None,
		internal_service_token: Some("internal-test-token".into()),
		event_log_path: tmp.path().join("events.ndjson").display().to_string(),
	}
}

pub async fn spawn() -> TestApp {
	let tmp = TempDir::new().expect("tempdir");
	let settings = test_settings(&tmp);

	let pool = SqlitePoolOptions::new().connect(&settings.db_dsn).await.expect("connect sqlite");
	let key_store = SqliteKeyStore::new(pool.clone());
	key_store.migrate().await.expect("migrate keys");
	let domain_store = SqliteDomainStore::new(pool.clone());
	domain_store.migrate().await.expect("migrate domains");

	let policy_agent = Arc::new(MemoryPolicyAgent::new());
	let event_publisher = Arc::new(NdjsonEventPublisher::new(settings.event_log_path.clone()));

	let app = Builder::new()
		.settings(settings)
		.key_store(Arc::new(key_store))
		.domain_store(Arc::new(domain_store))
		.policy_agent(policy_agent)
		.event_publisher(event_publisher)
		.build();

	let router = authcore_server::routes::init(app);
	TestApp { router, _tmp: tmp }
}

pub struct TestResponse {
	pub status: StatusCode,
	pub body: Value,
}

impl TestResponse {
	pub fn json<T: DeserializeOwned>(&self) -> T {
		serde_json::from_value(self.body.clone()).expect("response body did not match expected shape")
	}
}

impl TestApp {
	pub async fn request(&self, method: &str, uri: &str, bearer: Option<&str>, body: Option<Value>) -> TestResponse {
		let mut builder = Request::builder().method(method).uri(uri).header("content-type", "application/json");
		if let Some(token) = bearer {
			builder = builder.header("authorization", format!("Bearer {token}"));
		}
		let body = match body {
			Some(v) => Body::from(serde_json::to_vec(&v).unwrap()),
			None => Body::empty(),
		};
		let req = builder.body(body).unwrap();

		let response = self.router.clone().oneshot(req).await.unwrap();
		let status = response.status();
		let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
		let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
		TestResponse { status, body }
	}

	pub async fn issue_access(&self, subject: uuid::Uuid, domain: Option<uuid::Uuid>) -> String {
		let resp = self
			.request(
				"POST",
				"/api/token/issue",
				None,
				Some(serde_json::json!({ "currentToken": Value::Null, "kind": "access", "subject": subject, "domain": domain })),
			)
			.await;
		assert_eq!(resp.status, StatusCode::OK, "issue failed: {:?}", resp.body);
		resp.body["accessToken"].as_str().unwrap().to_string()
	}
}

// vim: ts=4
