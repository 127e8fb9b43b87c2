//! Error taxonomy shared by every crate in the workspace. The facade crate
//! is the only place these get mapped to wire status codes; everything
//! else just produces and propagates `Error`.

pub type ClResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	/// Structural validation failure (bad request shape, missing field).
	MalformedEntity(String),
	/// Missing, malformed-signature, or otherwise invalid bearer credential.
	Authentication,
	/// Structurally and cryptographically valid token whose `exp` has
	/// passed. Kept distinct from `Authentication` so callers can tell a
	/// forged/garbled credential from one that merely needs a refresh.
	KeyExpired,
	/// Credential valid, but the policy agent denied the requested relation.
	Authorization,
	/// Session carries no tenant context where one is required.
	DomainAuthorization,
	/// Referenced key/domain/tuple does not exist.
	NotFound,
	/// Uniqueness constraint violated (duplicate alias, duplicate save).
	Conflict(String),
	/// The policy agent rejected a write as a schema violation.
	InvalidPolicy(String),
	/// Anything else; the original message is logged, never returned to
	/// callers.
	Internal(String),

	// External error sources, converted via `From` below.
	Db(String),
	Jwt(String),
	Io(String),
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::MalformedEntity(m) => write!(f, "malformed entity: {m}"),
			Error::Authentication => write!(f, "authentication failed"),
			Error::KeyExpired => write!(f, "key expired"),
			Error::Authorization => write!(f, "authorization denied"),
			Error::DomainAuthorization => write!(f, "no domain context"),
			Error::NotFound => write!(f, "not found"),
			Error::Conflict(m) => write!(f, "conflict: {m}"),
			Error::InvalidPolicy(m) => write!(f, "invalid policy: {m}"),
			Error::Internal(m) => write!(f, "internal error: {m}"),
			Error::Db(m) => write!(f, "db error: {m}"),
			Error::Jwt(m) => write!(f, "token error: {m}"),
			Error::Io(m) => write!(f, "io error: {m}"),
		}
	}
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Error::Io(err.to_string())
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Error::MalformedEntity(err.to_string())
	}
}

impl From<uuid::Error> for Error {
	fn from(err: uuid::Error) -> Self {
		Error::MalformedEntity(format!("invalid id: {err}"))
	}
}

// vim: ts=4
