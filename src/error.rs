//! Error taxonomy shared across credential resolution and request execution.

// crates.io
use reqwest::StatusCode;
// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Scope could not be derived for a request URL.
	#[error(transparent)]
	Scope(#[from] ScopeError),
	/// Identity provider rejected or failed the token exchange.
	#[error(transparent)]
	Identity(#[from] IdentityError),
	/// Transport failure while constructing or executing the request.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Response status fell outside [200, 300) and the body was non-empty.
	#[error("Request failed with status {status}: {body}.")]
	Status {
		/// HTTP status code returned by the server.
		status: StatusCode,
		/// Raw response body text, retained for diagnostics.
		body: String,
	},
	/// Response status fell outside [200, 300) and the body was empty.
	#[error("Request failed with status {status}.")]
	StatusEmpty {
		/// HTTP status code returned by the server.
		status: StatusCode,
	},
	/// Server answered with a 2xx status that the caller did not declare acceptable.
	#[error("Expected status one of {expected:?}, received {received}.")]
	UnexpectedStatus {
		/// Status codes the caller declared acceptable.
		expected: Vec<StatusCode>,
		/// Status code actually returned.
		received: StatusCode,
	},
	/// Bearer token was missing or empty; nothing was sent.
	#[error("Token is empty.")]
	EmptyToken,
	/// Response body did not decode into the requested shape.
	#[error("Response body did not match the expected shape.")]
	Decode {
		/// Structured decoding failure carrying the offending JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Local configuration failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// No usable credential strategy was found in the credential set.
	#[error("No credentials provided.")]
	NoCredentials,
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures while mapping a request URL to an OAuth scope.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ScopeError {
	/// No derivation rule matched the URL.
	#[error("Unable to determine scope from URL `{url}`. Please provide your own scope.")]
	Undeterminable {
		/// The offending request URL.
		url: String,
	},
	/// The requested scope list or scope string was empty.
	#[error("At least one non-empty scope must be requested.")]
	Empty,
}

/// Failures raised while exchanging credentials for a bearer token.
#[derive(Debug, ThisError)]
pub enum IdentityError {
	/// Authority plus tenant did not form a valid token endpoint URL.
	#[error("Identity authority URL is invalid.")]
	InvalidAuthority {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Token endpoint rejected the exchange.
	#[error("Token endpoint returned status {status}: {message}.")]
	TokenEndpoint {
		/// HTTP status code returned by the token endpoint.
		status: StatusCode,
		/// Response body text summarizing the failure.
		message: String,
	},
	/// Token endpoint responded with JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Local-session CLI could not be launched.
	#[error("Local session CLI could not be launched.")]
	CliLaunch {
		/// Underlying spawn failure.
		#[source]
		source: std::io::Error,
	},
	/// Local-session CLI ran but exited unsuccessfully.
	#[error("Local session CLI exited with {status}: {stderr}.")]
	CliFailed {
		/// Exit status reported by the CLI process.
		status: std::process::ExitStatus,
		/// Captured standard error text.
		stderr: String,
	},
	/// Local-session CLI produced output that could not be parsed.
	#[error("Local session CLI returned malformed JSON.")]
	CliResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Token expiry timestamp fell outside the representable range.
	#[error("Token expiry timestamp is out of range.")]
	ExpiryOutOfRange,
}
impl IdentityError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for IdentityError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Transport-level failures while constructing or executing an API request.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while executing the request.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request body could not be serialized to JSON.
	#[error("Request body could not be serialized.")]
	BodySerialize(#[from] serde_json::Error),
	/// Bearer token contained bytes that are not valid in an HTTP header.
	#[error("Bearer token is not a valid header value.")]
	AuthorizationHeader(#[from] reqwest::header::InvalidHeaderValue),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
