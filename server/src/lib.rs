//! HTTP/JSON facade fronting the authentication and authorization core.
//! Builds the shared `AppState` from a settings struct and a set of
//! adapters, then hands out a router or runs it directly.

use std::sync::Arc;

use authcore::{AuthorizationService, DomainService, Settings};
use authcore::middleware::EventPublishingDomainService;
use authcore_types::prelude::*;

pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod prelude;
pub mod routes;
pub mod types;

pub struct AppState {
	pub authorization: AuthorizationService,
	pub domains: EventPublishingDomainService,
	pub settings: Settings,
}

pub type App = Arc<AppState>;

#[derive(Default)]
pub struct Builder {
	settings: Option<Settings>,
	key_store: Option<Arc<dyn KeyStore>>,
	domain_store: Option<Arc<dyn DomainStore>>,
	policy_agent: Option<Arc<dyn PolicyAgent>>,
	event_publisher: Option<Arc<dyn EventPublisher>>,
}

impl Builder {
	pub fn new() -> Self {
		Builder { settings: None, key_store: None, domain_store: None, policy_agent: None, event_publisher: None }
	}

	pub fn settings(mut self, settings: Settings) -> Self {
		self.settings = Some(settings);
		self
	}

	pub fn key_store(mut self, key_store: Arc<dyn KeyStore>) -> Self {
		self.key_store = Some(key_store);
		self
	}

	pub fn domain_store(mut self, domain_store: Arc<dyn DomainStore>) -> Self {
		self.domain_store = Some(domain_store);
		self
	}

	pub fn policy_agent(mut self, policy_agent: Arc<dyn PolicyAgent>) -> Self {
		self.policy_agent = Some(policy_agent);
		self
	}

	pub fn event_publisher(mut self, event_publisher: Arc<dyn EventPublisher>) -> Self {
		self.event_publisher = Some(event_publisher);
		self
	}

	/// Wires the adapters into the two orchestration services and wraps the
	/// domain service for event publication.
	pub fn build(self) -> App {
		let settings = self.settings.expect("FATAL: no settings configured");
		let key_store = self.key_store.expect("FATAL: no key store configured");
		let domain_store = self.domain_store.expect("FATAL: no domain store configured");
		let policy_agent = self.policy_agent.expect("FATAL: no policy agent configured");
		let event_publisher = self.event_publisher.expect("FATAL: no event publisher configured");

		let authorization = AuthorizationService::new(key_store, policy_agent.clone(), &settings);
		let domains = EventPublishingDomainService::new(DomainService::new(domain_store, policy_agent), event_publisher);

		Arc::new(AppState { authorization, domains, settings })
	}

	pub async fn run(self) -> ClResult<()> {
		let listen_addr = self.settings.as_ref().expect("FATAL: no settings configured").listen_addr.clone();
		let state = self.build();
		let router = routes::init(state.clone());

		tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).with_target(false).init();

		let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
		info!("listening on {}", listen_addr);
		axum::serve(listener, router).await?;
		Ok(())
	}
}

// vim: ts=4
