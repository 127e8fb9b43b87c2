//! The externally observable signed envelope carrying a key's fields:
//! claim names `iss`/`sub`/`iat`/`exp` plus custom `typ`/`usr`/`dom`.

use serde::{Deserialize, Serialize};

use crate::key::KeyKind;
use crate::types::{DomainId, Timestamp, UserId};

/// JWT-compatible claim set. Field names are fixed so existing
/// HS256-verifying clients keep working unchanged.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
	pub iss: UserId,
	pub sub: Option<UserId>,
	pub iat: i64,
	pub exp: i64,
	#[serde(rename = "typ")]
	pub kind: KeyKind,
	/// Redundant with `sub`/`iss` for recovery/invitation flows where the
	/// acting user differs from the token issuer.
	pub usr: Option<UserId>,
	pub dom: Option<DomainId>,
	/// Present only on API keys, so `Identify` can short-circuit the key
	/// store lookup for every other kind.
	pub kid: Option<uuid::Uuid>,
}

/// What callers get back from `Issue`/`Refresh`: a signed access token,
/// paired with its refresh token where the key kind calls for one.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IssuedTokens {
	pub access_token: String,
	pub refresh_token: Option<String>,
	pub access_type: String,
}

// vim: ts=4
