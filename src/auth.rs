//! Credential resolution: exchanges a [`CredentialSet`] for a bearer [`Token`].
//!
//! Resolution is strictly per call. Nothing is cached, nothing is persisted,
//! and a failed exchange is never retried here; callers that want retries wrap
//! the executor instead.

// crates.io
use tokio::process::Command;
// self
use crate::{
	_prelude::*,
	config::{CredentialSet, CredentialStrategy},
	error::{IdentityError, ScopeError},
	obs,
	scope::Scope,
	token::Token,
};

/// Sentinel token returned in test mode instead of a real credential.
pub const TEST_MODE_TOKEN: &str = "test_mode_mock_token_value";

const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";
const DEFAULT_CLI_PROGRAM: &str = "az";
const TEST_MODE_TOKEN_LIFETIME: Duration = Duration::hours(1);

/// Credential resolver owning the identity-provider transport.
///
/// Holds the immutable [`CredentialSet`] for the plugin session plus an
/// explicitly injected HTTP client for token-endpoint calls. The identity
/// authority and the local-session CLI invocation are both overridable so
/// tests can substitute a mock server or a stub process.
#[derive(Clone, Debug)]
pub struct Auth {
	credentials: CredentialSet,
	http: ReqwestClient,
	authority: String,
	cli_program: String,
	cli_args: Vec<String>,
}
impl Auth {
	/// Creates a resolver over the given credential set and HTTP client.
	pub fn new(credentials: CredentialSet, http: ReqwestClient) -> Self {
		Self {
			credentials,
			http,
			authority: DEFAULT_AUTHORITY.into(),
			cli_program: DEFAULT_CLI_PROGRAM.into(),
			cli_args: Vec::new(),
		}
	}

	/// Overrides the identity authority base URL (default
	/// `https://login.microsoftonline.com`).
	pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
		self.authority = authority.into();

		self
	}

	/// Overrides the local-session CLI invocation (default `az`).
	///
	/// The configured arguments are inserted before the `account
	/// get-access-token` arguments the resolver appends.
	pub fn with_cli_command<I>(mut self, program: impl Into<String>, args: I) -> Self
	where
		I: IntoIterator,
		I::Item: Into<String>,
	{
		self.cli_program = program.into();
		self.cli_args = args.into_iter().map(Into::into).collect();

		self
	}

	/// Returns the credential set this resolver was configured with.
	pub fn credentials(&self) -> &CredentialSet {
		&self.credentials
	}

	/// Resolves a bearer token valid for the requested scopes.
	///
	/// Dispatches on the credential strategy in priority order; see
	/// [`CredentialSet::strategy`]. Identity-provider failures propagate
	/// wrapped, without retry.
	pub async fn token_for_scopes(&self, scopes: &[Scope]) -> Result<Token> {
		if scopes.is_empty() {
			return Err(ScopeError::Empty.into());
		}

		obs::debug_event("token_for_scopes", join_scopes(scopes));

		match self.credentials.strategy()? {
			CredentialStrategy::TestMode =>
				Ok(Token::new(TEST_MODE_TOKEN, OffsetDateTime::now_utc() + TEST_MODE_TOKEN_LIFETIME)),
			CredentialStrategy::ClientSecret { tenant_id, client_id, client_secret } =>
				self.authenticate_client_secret(&tenant_id, &client_id, &client_secret, scopes)
					.await,
			CredentialStrategy::LocalSession => self.authenticate_local_session(scopes).await,
		}
	}

	/// Performs the `client_credentials` grant against the tenant's token endpoint.
	async fn authenticate_client_secret(
		&self,
		tenant_id: &str,
		client_id: &str,
		client_secret: &str,
		scopes: &[Scope],
	) -> Result<Token> {
		let endpoint = Url::parse(&format!(
			"{}/{tenant_id}/oauth2/v2.0/token",
			self.authority.trim_end_matches('/'),
		))
		.map_err(|e| IdentityError::InvalidAuthority { source: e })?;
		let scope_value = join_scopes(scopes);
		let form = [
			("client_id", client_id),
			("client_secret", client_secret),
			("grant_type", "client_credentials"),
			("scope", scope_value.as_str()),
		];
		let response = self
			.http
			.post(endpoint)
			.form(&form)
			.send()
			.await
			.map_err(IdentityError::from)?;
		let status = response.status();
		let body = response.bytes().await.map_err(IdentityError::from)?;

		if !status.is_success() {
			return Err(IdentityError::TokenEndpoint {
				status,
				message: String::from_utf8_lossy(&body).into_owned(),
			}
			.into());
		}

		let payload: TokenEndpointResponse = {
			let mut deserializer = serde_json::Deserializer::from_slice(&body);

			serde_path_to_error::deserialize(&mut deserializer)
				.map_err(|e| IdentityError::TokenResponseParse { source: e })?
		};

		Ok(Token::new(
			payload.access_token,
			OffsetDateTime::now_utc() + Duration::seconds(payload.expires_in),
		))
	}

	/// Fetches a token from the already-authenticated local operator session.
	async fn authenticate_local_session(&self, scopes: &[Scope]) -> Result<Token> {
		// Dropping the resolution future must also stop the CLI child.
		let output = Command::new(&self.cli_program)
			.args(&self.cli_args)
			.args(["account", "get-access-token", "--output", "json", "--scope"])
			.arg(join_scopes(scopes))
			.kill_on_drop(true)
			.output()
			.await
			.map_err(|e| IdentityError::CliLaunch { source: e })?;

		if !output.status.success() {
			return Err(IdentityError::CliFailed {
				status: output.status,
				stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
			}
			.into());
		}

		let payload: LocalSessionResponse = {
			let mut deserializer = serde_json::Deserializer::from_slice(&output.stdout);

			serde_path_to_error::deserialize(&mut deserializer)
				.map_err(|e| IdentityError::CliResponseParse { source: e })?
		};
		let expires_at = OffsetDateTime::from_unix_timestamp(payload.expires_on)
			.map_err(|_| IdentityError::ExpiryOutOfRange)?;

		Ok(Token::new(payload.access_token, expires_at))
	}
}

/// Shape of the identity provider's token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
	access_token: String,
	expires_in: i64,
}

/// Shape of the local-session CLI's `get-access-token` output.
#[derive(Debug, Deserialize)]
struct LocalSessionResponse {
	#[serde(rename = "accessToken")]
	access_token: String,
	#[serde(rename = "expires_on")]
	expires_on: i64,
}

fn join_scopes(scopes: &[Scope]) -> String {
	scopes.iter().map(Scope::as_str).collect::<Vec<_>>().join(" ")
}
