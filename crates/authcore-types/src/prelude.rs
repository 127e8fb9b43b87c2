pub use crate::domain::{Domain, DomainFilter, DomainStatus, DomainUpdate};
pub use crate::domain_adapter::DomainStore;
pub use crate::error::{ClResult, Error};
pub use crate::event_adapter::{Event, EventPublisher};
pub use crate::key::{Key, KeyKind};
pub use crate::key_adapter::KeyStore;
pub use crate::policy::{EntityType, Permission, PolicyTuple, Relation, SubjectKind};
pub use crate::policy_adapter::{ObjectPage, PolicyAgent};
pub use crate::token::{Claims, IssuedTokens};
pub use crate::types::{DomainId, KeyId, Page, PageRequest, Patch, Timestamp, UserId};

pub use tracing::{debug, debug_span, error, error_span, info, info_span, warn, warn_span};

// vim: ts=4
