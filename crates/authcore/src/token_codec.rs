//! Signs and verifies bearer tokens via HS256 with a shared secret. A leaf
//! dependency: no DB hit, no knowledge of the key store or policy agent.

use authcore_types::prelude::*;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

pub struct TokenCodec {
	encoding_key: EncodingKey,
	decoding_key: DecodingKey,
}

impl TokenCodec {
	pub fn new(signing_secret: &str) -> Self {
		TokenCodec {
			encoding_key: EncodingKey::from_secret(signing_secret.as_bytes()),
			decoding_key: DecodingKey::from_secret(signing_secret.as_bytes()),
		}
	}

	/// Signs the full payload of `key` into a compact JWT string.
	pub fn issue(&self, key: &Key) -> ClResult<String> {
		let claims = Claims {
			iss: key.issuer,
			sub: key.subject,
			iat: key.issued_at.0,
			exp: key.expires_at.0,
			kind: key.kind,
			usr: key.subject,
			dom: key.domain,
			kid: if key.kind == KeyKind::Api { Some(key.id.0) } else { None },
		};
		jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
			.map_err(|e| Error::Jwt(e.to_string()))
	}

	/// Verifies signature and structural shape; `jsonwebtoken`'s own `exp`
	/// check is disabled so a non-expiring (zero `exp`) API key round-trips,
	/// and expiry is instead checked here via `Key::is_expired` so it can be
	/// reported as `KeyExpired` rather than folded into `Authentication`.
	pub fn parse(&self, token: &str) -> ClResult<Key> {
		let mut validation = Validation::new(Algorithm::HS256);
		validation.validate_exp = false;
		validation.required_spec_claims.clear();

		let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
			.map_err(|e| match e.kind() {
				jsonwebtoken::errors::ErrorKind::InvalidSignature => Error::Authentication,
				_ => Error::MalformedEntity(e.to_string()),
			})?;
		let claims = data.claims;

		let id = claims.kid.map(authcore_types::KeyId).unwrap_or_default();
		let key = Key {
			id,
			kind: claims.kind,
			issuer: claims.iss,
			subject: claims.sub.or(claims.usr),
			domain: claims.dom,
			issued_at: Timestamp(claims.iat),
			expires_at: Timestamp(claims.exp),
		};

		if key.is_expired() {
			return Err(Error::KeyExpired);
		}
		Ok(key)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample_key() -> Key {
		Key {
			id: KeyId::new(),
			kind: KeyKind::Access,
			issuer: UserId::new(),
			subject: Some(UserId::new()),
			domain: None,
			issued_at: Timestamp::now(),
			expires_at: Timestamp::from_now(3600),
		}
	}

	#[test]
	fn round_trips_an_unexpired_key() {
		let codec = TokenCodec::new("test-secret");
		let key = sample_key();
		let token = codec.issue(&key).unwrap();
		let parsed = codec.parse(&token).unwrap();
		assert_eq!(parsed.issuer, key.issuer);
		assert_eq!(parsed.subject, key.subject);
		assert_eq!(parsed.kind, key.kind);
	}

	#[test]
	fn rejects_an_expired_token() {
		let codec = TokenCodec::new("test-secret");
		let mut key = sample_key();
		key.expires_at = Timestamp::from_now(-10);
		let token = codec.issue(&key).unwrap();
		assert!(matches!(codec.parse(&token), Err(Error::KeyExpired)));
	}

	#[test]
	fn rejects_a_bad_signature() {
		let codec_a = TokenCodec::new("secret-a");
		let codec_b = TokenCodec::new("secret-b");
		let token = codec_a.issue(&sample_key()).unwrap();
		assert!(matches!(codec_b.parse(&token), Err(Error::Authentication)));
	}

	#[test]
	fn never_expiring_api_key_round_trips() {
		let codec = TokenCodec::new("test-secret");
		let mut key = sample_key();
		key.kind = KeyKind::Api;
		key.expires_at = Timestamp(0);
		let token = codec.issue(&key).unwrap();
		let parsed = codec.parse(&token).unwrap();
		assert!(parsed.expires_at.is_never());
		assert_eq!(parsed.id, key.id);
	}
}

// vim: ts=4
