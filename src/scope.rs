//! Scope derivation mapping request URLs to OAuth audiences.

// self
use crate::{_prelude::*, error::ScopeError};

/// Fixed scope for the Power Apps product family.
pub const POWER_APPS_SCOPE: &str = "https://service.powerapps.com/.default";
/// Fixed scope for the Power Platform API.
pub const POWER_PLATFORM_SCOPE: &str = "https://api.powerplatform.com/.default";

const DOT_COM_SLASH: &str = ".com/";

/// OAuth scope (audience) a bearer token must be requested for.
///
/// Computed per call, never stored. Derivation is a zero-configuration
/// heuristic over a small fixed family of known hosts with a convention-based
/// fallback; callers hitting other hosts supply their own scope via
/// [`Scope::new`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Scope(String);
impl Scope {
	/// Wraps an explicit, caller-supplied scope string.
	pub fn new(scope: impl Into<String>) -> Result<Self, ScopeError> {
		let scope = scope.into();

		if scope.is_empty() {
			return Err(ScopeError::Empty);
		}

		Ok(Self(scope))
	}

	/// Derives the scope to request for a URL.
	///
	/// Rules are ordered and the first match wins:
	/// 1. known Power Apps hosts map to [`POWER_APPS_SCOPE`],
	/// 2. the Power Platform API host maps to [`POWER_PLATFORM_SCOPE`],
	/// 3. any URL containing `.com/` is truncated after the first `.com/` and
	///    suffixed with `default`,
	/// 4. everything else fails and the caller must supply an explicit scope.
	pub fn for_url(url: &Url) -> Result<Self, ScopeError> {
		match url.host_str() {
			Some("api.bap.microsoft.com" | "api.powerapps.com") =>
				Ok(Self(POWER_APPS_SCOPE.into())),
			Some("api.powerplatform.com") => Ok(Self(POWER_PLATFORM_SCOPE.into())),
			_ => {
				let raw = url.as_str();

				if let Some(index) = raw.find(DOT_COM_SLASH) {
					Ok(Self(format!("{}default", &raw[..index + DOT_COM_SLASH.len()])))
				} else {
					Err(ScopeError::Undeterminable { url: raw.into() })
				}
			},
		}
	}

	/// Returns the scope string.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for Scope {
	fn as_ref(&self) -> &str {
		self.as_str()
	}
}
impl Display for Scope {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
