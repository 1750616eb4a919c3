//! Interceptor-level error types shared across transports, providers, and caller resolution.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// The interceptor never converts a failure into a different outcome; every variant wraps the
/// collaborator's own error as its `source`.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Token provider failure (refresh exchange, backend, challenge).
	#[error(transparent)]
	Provider(#[from] crate::provider::ProviderError),
	/// Inner transport failure (DNS, TCP, TLS, cancellation).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Local configuration or request construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// No caller context is available for the outbound request.
	#[error("No caller context is available to request a user access token.")]
	MissingCallerContext,
}

/// Configuration failures: unusable token material or invalid request parameters.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Token type and access token do not form a valid `Authorization` header.
	#[error("Access token cannot be encoded as an Authorization header value.")]
	InvalidAuthorizationHeader {
		/// Underlying header validation failure.
		#[source]
		source: http::header::InvalidHeaderValue,
	},
	/// Request parameters could not be parsed from configuration.
	#[error("Token request parameters are invalid.")]
	InvalidParameters {
		/// Structured parsing failure pointing at the offending field.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl From<http::header::InvalidHeaderValue> for ConfigError {
	fn from(e: http::header::InvalidHeaderValue) -> Self {
		Self::InvalidAuthorizationHeader { source: e }
	}
}

/// Transport-level failures (network, cancellation).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while sending the request.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Caller cancelled the request before the transport completed it.
	#[error("Request was cancelled before a response arrived.")]
	Cancelled,
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::provider::ProviderError;

	#[test]
	fn provider_error_is_exposed_as_source() {
		let provider_error = ProviderError::Backend { message: "cache unreachable".into() };
		let error: Error = provider_error.into();

		assert!(matches!(error, Error::Provider(_)));
		assert!(error.to_string().contains("cache unreachable"));
	}

	#[test]
	fn transport_network_error_keeps_source() {
		let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
		let error: Error = TransportError::network(io).into();
		let source = StdError::source(&error)
			.expect("Network error should expose the underlying IO error.");

		assert_eq!(source.to_string(), "reset by peer");
	}
}
