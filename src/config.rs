//! Credential configuration supplied by the plugin's configuration layer.

// self
use crate::{_prelude::*, error::ConfigError};

/// Credential material for one plugin session.
///
/// Constructed once at plugin configuration time from declarative input and
/// immutable afterwards. Empty strings are treated the same as absent values so
/// partially filled declarative blocks never select a half-configured strategy.
#[derive(Clone, Default, Deserialize)]
pub struct CredentialSet {
	/// Substitutes all real authentication with a fixed sentinel token.
	#[serde(default)]
	pub test_mode: bool,
	/// Directory tenant the application identity belongs to.
	#[serde(default)]
	pub tenant_id: Option<String>,
	/// Application (client) identifier.
	#[serde(default)]
	pub client_id: Option<String>,
	/// Application secret; callers must avoid logging it.
	#[serde(default)]
	pub client_secret: Option<String>,
	/// Whether the already-authenticated local operator session may be reused.
	#[serde(default)]
	pub use_local_session: bool,
}
impl CredentialSet {
	/// Credential set that always resolves to the sentinel test token.
	pub fn test_mode() -> Self {
		Self { test_mode: true, ..Self::default() }
	}

	/// Credential set backed by an application-secret identity.
	pub fn client_secret(
		tenant_id: impl Into<String>,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Self {
		Self {
			tenant_id: Some(tenant_id.into()),
			client_id: Some(client_id.into()),
			client_secret: Some(client_secret.into()),
			..Self::default()
		}
	}

	/// Credential set that reuses the local operator session only.
	pub fn local_session() -> Self {
		Self { use_local_session: true, ..Self::default() }
	}

	/// Additionally permits local-session login as a fallback strategy.
	pub fn allow_local_session(mut self) -> Self {
		self.use_local_session = true;

		self
	}

	/// Returns `true` when tenant, client, and secret are all present and non-empty.
	pub fn has_client_secret(&self) -> bool {
		[&self.tenant_id, &self.client_id, &self.client_secret]
			.into_iter()
			.all(|field| field.as_deref().is_some_and(|value| !value.is_empty()))
	}

	/// Returns `true` when local-session login is permitted.
	pub fn has_local_session(&self) -> bool {
		self.use_local_session
	}

	/// Selects the authentication strategy for this credential set.
	///
	/// Priority order is fixed: test mode overrides everything, an application
	/// secret beats local-session login, and an empty set is a fatal
	/// configuration error.
	pub fn strategy(&self) -> Result<CredentialStrategy, ConfigError> {
		if self.test_mode {
			return Ok(CredentialStrategy::TestMode);
		}
		if self.has_client_secret()
			&& let (Some(tenant_id), Some(client_id), Some(client_secret)) =
				(&self.tenant_id, &self.client_id, &self.client_secret)
		{
			return Ok(CredentialStrategy::ClientSecret {
				tenant_id: tenant_id.clone(),
				client_id: client_id.clone(),
				client_secret: client_secret.clone(),
			});
		}
		if self.has_local_session() {
			return Ok(CredentialStrategy::LocalSession);
		}

		Err(ConfigError::NoCredentials)
	}
}
impl Debug for CredentialSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialSet")
			.field("test_mode", &self.test_mode)
			.field("tenant_id", &self.tenant_id)
			.field("client_id", &self.client_id)
			.field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
			.field("use_local_session", &self.use_local_session)
			.finish()
	}
}

/// Closed set of authentication strategies, one per credential kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CredentialStrategy {
	/// Fixed sentinel token, no network interaction.
	TestMode,
	/// Non-interactive application identity within a tenant.
	ClientSecret {
		/// Directory tenant the application identity belongs to.
		tenant_id: String,
		/// Application (client) identifier.
		client_id: String,
		/// Application secret.
		client_secret: String,
	},
	/// Credentials of the already-logged-in local operator.
	LocalSession,
}
