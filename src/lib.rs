//! Authenticated request execution for Power Platform provider plugins: scope
//! derivation, credential resolution, and typed HTTP calls in one crate.
//!
//! The crate is the request-execution core of a configuration-management
//! plugin: the plugin's lifecycle layer hands [`client::ApiClient`] a method,
//! URL, headers, and body, and gets back a buffered, status-validated
//! [`client::ResponseEnvelope`] or a structured [`error::Error`].

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
mod obs;
pub mod scope;
pub mod token;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{client::ApiClient, config::CredentialSet};

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_client() -> ReqwestClient {
		ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.")
	}

	/// Constructs an [`ApiClient`] in test mode, so every call authenticates with the
	/// deterministic sentinel token and no identity provider is contacted.
	pub fn test_mode_client() -> ApiClient {
		ApiClient::with_client(CredentialSet::test_mode(), test_reqwest_client())
	}

	/// Constructs an [`ApiClient`] over the given credential set and the insecure test
	/// transport.
	pub fn test_client(credentials: CredentialSet) -> ApiClient {
		ApiClient::with_client(credentials, test_reqwest_client())
	}
}

mod _prelude {
	pub use std::fmt::{Debug, Display, Formatter, Result as FmtResult};

	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use httpmock as _;
