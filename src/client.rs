//! Request execution: one authenticated HTTP call end-to-end.
//!
//! [`ApiClient`] derives a scope for the request URL, resolves a bearer token,
//! sends the request, buffers the whole response body, validates the status,
//! and hands back a [`ResponseEnvelope`] the caller can decode any number of
//! times. Single attempt, no retries, no token caching.

// crates.io
use reqwest::{
	Method, StatusCode,
	header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT},
};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::Auth,
	config::CredentialSet,
	error::{ConfigError, TransportError},
	obs,
	scope::Scope,
	token::Token,
};

/// Product identifier sent in the `User-Agent` header of every request.
pub const PRODUCT_IDENTIFIER: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// One outbound API request.
///
/// The body is serialized eagerly at construction so serialization failures
/// surface before any token is resolved. An empty accept list declares every
/// [200, 300) status acceptable.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Fully qualified request URL.
	pub url: Url,
	/// Headers merged into the request; standard headers are only injected
	/// when absent here.
	pub headers: HeaderMap,
	/// Serialized JSON body, if any.
	pub body: Option<Vec<u8>>,
	/// Status codes the caller accepts as success.
	pub accept: Vec<StatusCode>,
	/// Explicit scope overriding URL-based derivation.
	pub scope: Option<Scope>,
}
impl ApiRequest {
	/// Creates a request with no headers, no body, and an empty accept list.
	pub fn new(method: Method, url: Url) -> Self {
		Self {
			method,
			url,
			headers: HeaderMap::new(),
			body: None,
			accept: Vec::new(),
			scope: None,
		}
	}

	/// Adds a single header.
	pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Replaces the header set wholesale.
	pub fn headers(mut self, headers: HeaderMap) -> Self {
		self.headers = headers;

		self
	}

	/// Serializes `body` to JSON and attaches it to the request.
	pub fn json<B>(mut self, body: &B) -> Result<Self, TransportError>
	where
		B: Serialize + ?Sized,
	{
		self.body = Some(serde_json::to_vec(body)?);

		Ok(self)
	}

	/// Declares the status codes accepted as success.
	pub fn accept<I>(mut self, codes: I) -> Self
	where
		I: IntoIterator<Item = StatusCode>,
	{
		self.accept = codes.into_iter().collect();

		self
	}

	/// Supplies an explicit scope instead of deriving one from the URL.
	pub fn scope(mut self, scope: Scope) -> Self {
		self.scope = Some(scope);

		self
	}
}

/// Raw transport response with the body buffered for repeatable decoding.
///
/// Buffering the whole body up front keeps decode failures independently
/// diagnosable from transport failures and allows multiple decode attempts
/// against the same bytes.
#[derive(Clone, Debug)]
pub struct ResponseEnvelope {
	/// HTTP status code.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Complete response body bytes.
	pub body: Vec<u8>,
}
impl ResponseEnvelope {
	/// Decodes the buffered body into `T`.
	///
	/// May be called any number of times; failures are reported as
	/// [`Error::Decode`] with the offending JSON path.
	pub fn decode<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer).map_err(|e| Error::Decode { source: e })
	}

	/// Returns the body interpreted as text, replacing invalid UTF-8.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

/// Executor for authenticated API calls.
///
/// Owns an explicitly injected [`ReqwestClient`] (shared connection pool, safe
/// for concurrent reuse) and the credential resolver. Held for the lifetime of
/// the plugin session.
#[derive(Clone, Debug)]
pub struct ApiClient {
	http: ReqwestClient,
	auth: Auth,
}
impl ApiClient {
	/// Creates an executor with a default HTTP client.
	pub fn new(credentials: CredentialSet) -> Result<Self, ConfigError> {
		let http = ReqwestClient::builder().build().map_err(ConfigError::from)?;

		Ok(Self::with_client(credentials, http))
	}

	/// Creates an executor over a caller-constructed HTTP client.
	///
	/// The same client instance backs both the identity-provider exchange and
	/// the API call itself.
	pub fn with_client(credentials: CredentialSet, http: ReqwestClient) -> Self {
		let auth = Auth::new(credentials, http.clone());

		Self { http, auth }
	}

	/// Replaces the credential resolver, keeping the HTTP client.
	pub fn with_auth(mut self, auth: Auth) -> Self {
		self.auth = auth;

		self
	}

	/// Returns the credential resolver backing this executor.
	pub fn auth(&self) -> &Auth {
		&self.auth
	}

	/// Executes an authenticated request.
	///
	/// Derives the scope from the URL unless the request carries an explicit
	/// one, resolves a fresh token for it, and dispatches with the bearer
	/// attached.
	pub async fn execute(&self, request: ApiRequest) -> Result<ResponseEnvelope> {
		let scope = match &request.scope {
			Some(scope) => scope.clone(),
			None => Scope::for_url(&request.url)?,
		};
		let token = self.auth.token_for_scopes(std::slice::from_ref(&scope)).await?;

		self.execute_with_token(request, &token).await
	}

	/// Executes an authenticated request and decodes the body into `T`.
	pub async fn execute_into<T>(&self, request: ApiRequest) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.execute(request).await?.decode()
	}

	/// Executes a request with a caller-supplied token.
	///
	/// Fails with [`Error::EmptyToken`] before any network I/O when the token
	/// is empty; no credentials means no request is sent.
	pub async fn execute_with_token(
		&self,
		request: ApiRequest,
		token: &Token,
	) -> Result<ResponseEnvelope> {
		if token.secret.is_empty() {
			return Err(Error::EmptyToken);
		}

		self.dispatch(request, Some(token)).await
	}

	/// Executes a request without the authentication step.
	///
	/// For calls where no bearer token is required; no scope is derived and no
	/// `Authorization` header is injected.
	pub async fn execute_unauthenticated(&self, request: ApiRequest) -> Result<ResponseEnvelope> {
		self.dispatch(request, None).await
	}

	async fn dispatch(
		&self,
		request: ApiRequest,
		token: Option<&Token>,
	) -> Result<ResponseEnvelope> {
		let ApiRequest { method, url, mut headers, body, accept, .. } = request;

		obs::debug_event("dispatch", &url);

		if let Some(token) = token
			&& !headers.contains_key(AUTHORIZATION)
		{
			let mut value =
				HeaderValue::from_str(&format!("Bearer {}", token.secret.expose()))
					.map_err(TransportError::from)?;

			value.set_sensitive(true);
			headers.insert(AUTHORIZATION, value);
		}
		if !headers.contains_key(CONTENT_TYPE) {
			headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
		}

		headers.insert(USER_AGENT, HeaderValue::from_static(PRODUCT_IDENTIFIER));

		let mut builder = self.http.request(method, url).headers(headers);

		if let Some(bytes) = body {
			builder = builder.body(bytes);
		}

		let response = builder.send().await.map_err(TransportError::from)?;
		let status = response.status();
		let headers = response.headers().clone();
		let body = response.bytes().await.map_err(TransportError::from)?.to_vec();
		let envelope = ResponseEnvelope { status, headers, body };

		if !status.is_success() {
			return if envelope.body.is_empty() {
				Err(Error::StatusEmpty { status })
			} else {
				Err(Error::Status { status, body: envelope.text() })
			};
		}
		if !accept.is_empty() && !accept.contains(&status) {
			return Err(Error::UnexpectedStatus { expected: accept, received: status });
		}

		Ok(envelope)
	}
}
