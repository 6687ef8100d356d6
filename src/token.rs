//! Bearer token model with a redacting secret wrapper.

// self
use crate::_prelude::*;

/// Redacted bearer secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns `true` when the wrapped secret is empty.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Bearer token produced fresh per call, never cached or persisted.
#[derive(Clone, Debug)]
pub struct Token {
	/// Opaque bearer secret presented in the `Authorization` header.
	pub secret: TokenSecret,
	/// Instant the identity provider reported the token expires at.
	pub expires_at: OffsetDateTime,
}
impl Token {
	/// Wraps a freshly issued bearer secret with its expiry instant.
	pub fn new(secret: impl Into<String>, expires_at: OffsetDateTime) -> Self {
		Self { secret: TokenSecret::new(secret), expires_at }
	}

	/// Returns `true` when the token has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}
}
