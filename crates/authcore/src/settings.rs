//! Process configuration, loaded once at startup from the environment (via
//! `dotenvy`) and handed down by reference to every service.

use std::env;

use authcore_types::prelude::{ClResult, Error};

#[derive(Clone, Debug)]
pub struct Settings {
	pub log_level: String,
	pub db_dsn: String,
	pub policy_agent_endpoint: Option<String>,
	pub policy_agent_preshared_key: Option<String>,
	pub signing_secret: String,
	pub access_ttl_secs: i64,
	pub refresh_ttl_secs: i64,
	pub recovery_ttl_secs: i64,
	pub invitation_ttl_secs: i64,
	pub listen_addr: String,
	pub telemetry_endpoint: Option<String>,
	pub request_deadline_secs: u64,
	/// Paths to TLS cert/key material. TLS termination itself is left to a
	/// reverse proxy in front of this reference server; these are read for
	/// config-surface completeness only.
	pub tls_cert_path: Option<String>,
	pub tls_key_path: Option<String>,
	/// Shared secret gating cross-service hooks (e.g. `DeleteUserFromDomains`)
	/// that have no session of their own to authorize against.
	pub internal_service_token: Option<String>,
	/// Append-only sink path for the reference event publisher.
	pub event_log_path: String,
}

impl Settings {
	pub const DEFAULT_ACCESS_TTL_SECS: i64 = 3600;
	pub const DEFAULT_REFRESH_TTL_SECS: i64 = 86_400;
	pub const DEFAULT_RECOVERY_TTL_SECS: i64 = 15 * 60;
	pub const DEFAULT_INVITATION_TTL_SECS: i64 = 168 * 3600;
	pub const DEFAULT_REQUEST_DEADLINE_SECS: u64 = 30;

	/// Loads `.env` if present, then reads environment variables, falling
	/// back to documented defaults for everything but the signing secret.
	pub fn from_env() -> ClResult<Self> {
		dotenvy::dotenv().ok();

		let signing_secret = env::var("AUTHCORE_SIGNING_SECRET")
			.map_err(|_| Error::Internal("AUTHCORE_SIGNING_SECRET is required".into()))?;

		Ok(Settings {
			log_level: env::var("AUTHCORE_LOG_LEVEL").unwrap_or_else(|_| "info".into()),
			db_dsn: env::var("AUTHCORE_DB_DSN").unwrap_or_else(|_| "sqlite://authcore.db".into()),
			policy_agent_endpoint: env::var("AUTHCORE_POLICY_AGENT_ENDPOINT").ok(),
			policy_agent_preshared_key: env::var("AUTHCORE_POLICY_AGENT_PSK").ok(),
			signing_secret,
			access_ttl_secs: parse_or(env::var("AUTHCORE_ACCESS_TTL_SECS").ok(), Self::DEFAULT_ACCESS_TTL_SECS),
			refresh_ttl_secs: parse_or(env::var("AUTHCORE_REFRESH_TTL_SECS").ok(), Self::DEFAULT_REFRESH_TTL_SECS),
			recovery_ttl_secs: parse_or(env::var("AUTHCORE_RECOVERY_TTL_SECS").ok(), Self::DEFAULT_RECOVERY_TTL_SECS),
			invitation_ttl_secs: parse_or(env::var("AUTHCORE_INVITATION_TTL_SECS").ok(), Self::DEFAULT_INVITATION_TTL_SECS),
			listen_addr: env::var("AUTHCORE_LISTEN_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into()),
			telemetry_endpoint: env::var("AUTHCORE_TELEMETRY_ENDPOINT").ok(),
			request_deadline_secs: parse_or(env::var("AUTHCORE_REQUEST_DEADLINE_SECS").ok(), Self::DEFAULT_REQUEST_DEADLINE_SECS as i64) as u64,
			tls_cert_path: env::var("AUTHCORE_TLS_CERT_PATH").ok(),
			tls_key_path: env::var("AUTHCORE_TLS_KEY_PATH").ok(),
			internal_service_token: env::var("AUTHCORE_INTERNAL_SERVICE_TOKEN").ok(),
			event_log_path: env::var("AUTHCORE_EVENT_LOG_PATH").unwrap_or_else(|_| "./authcore-events.ndjson".into()),
		})
	}
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
	raw.and_then(|s| s.parse().ok()).unwrap_or(default)
}

// vim: ts=4
