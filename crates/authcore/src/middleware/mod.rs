//! Independent wrappers around the domain service, composed
//! outermost-first: `Service = Wrap(Wrap(Wrap(base)))`. Each wrapper
//! exposes the same method signatures as the service it wraps so callers
//! never need to know how many layers are underneath.

pub mod event_publisher;

pub use event_publisher::EventPublishingDomainService;

// vim: ts=4
