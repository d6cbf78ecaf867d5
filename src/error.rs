//! Crate-level error types shared by resolution, stub construction, and the ADC provider.

// std
use std::path::PathBuf;
// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed error used where the failing component is caller-supplied.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Identity provider failed to produce credentials or tokens.
	#[error(transparent)]
	Identity(#[from] IdentityError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Caller-supplied stub constructor failed.
	#[error("Stub constructor failed.")]
	Stub {
		/// Error raised by the constructor.
		#[source]
		source: BoxError,
	},
}
impl Error {
	/// Wraps a constructor failure inside [`Error::Stub`].
	pub fn stub(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Stub { source: Box::new(src) }
	}
}

/// Failures raised while discovering identity credentials or minting tokens.
#[derive(Debug, ThisError)]
pub enum IdentityError {
	/// None of the discovery sources produced credentials.
	#[error("Could not load the default credentials.")]
	NotFound,
	/// Credential file could not be read.
	#[error("Failed to read credential file {}.", .path.display())]
	CredentialFile {
		/// Path that failed to load.
		path: PathBuf,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Credential file is not valid JSON for its declared type.
	#[error("Credential file {} is malformed.", .path.display())]
	CredentialParse {
		/// Path that failed to parse.
		path: PathBuf,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Credential file declares a type this crate cannot handle.
	#[error("Unsupported credential type: {kind}.")]
	UnsupportedCredentialType {
		/// Value of the `type` field.
		kind: String,
	},
	/// Service-account key could not be used to sign an assertion.
	#[error("Service account key is invalid.")]
	InvalidKey(#[from] jsonwebtoken::errors::Error),
	/// Token endpoint answered with a non-success status.
	#[error("Token endpoint returned {status}: {message}.")]
	TokenEndpoint {
		/// HTTP status code.
		status: u16,
		/// Response body preview.
		message: String,
	},
	/// Token endpoint returned an `expires_in` beyond the representable range.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
	/// Token endpoint returned a non-positive `expires_in`.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
	/// Token endpoint responded with JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse(#[from] serde_path_to_error::Error<serde_json::Error>),
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while contacting the identity provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Failure reported by a caller-implemented identity provider.
	#[error("{message}")]
	Custom {
		/// Provider-supplied message.
		message: String,
	},
}
impl IdentityError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Builds a [`IdentityError::Custom`] from any message.
	pub fn custom(message: impl Into<String>) -> Self {
		Self::Custom { message: message.into() }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for IdentityError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Requested scopes cannot be normalized.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// Target address is not a valid URI.
	#[error("Address `{address}` is invalid.")]
	InvalidAddress {
		/// Offending address.
		address: String,
		/// Underlying parsing failure.
		#[source]
		source: BoxError,
	},
	/// TLS settings were rejected by the transport.
	#[error("TLS configuration was rejected.")]
	Tls(#[source] tonic::transport::Error),
	/// Token cannot be rendered as an HTTP header value.
	#[error("Access token is not a valid header value.")]
	InvalidHeader(#[from] http::header::InvalidHeaderValue),
}
