//! Orchestration layer: combines the adapter traits from `authcore-types`
//! into the authorization and domain services, plus the middleware stack
//! wrapping them.

pub mod authorization;
pub mod domain_service;
pub mod middleware;
pub mod session;
pub mod settings;
pub mod token_codec;

pub use authorization::{AuthorizationService, KeySpec};
pub use domain_service::DomainService;
pub use session::Session;
pub use settings::Settings;
pub use token_codec::TokenCodec;

// vim: ts=4
