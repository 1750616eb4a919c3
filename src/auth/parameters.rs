//! Per-request token parameters and the configuration they are derived from.

// self
use crate::{_prelude::*, error::ConfigError};

/// Forward-compatible bag of provider-specific values.
pub type TokenContext = BTreeMap<String, serde_json::Value>;

/// Describes which session, scheme, and resource a user token should be scoped to.
///
/// The same type doubles as interceptor configuration: the configured value stays immutable and
/// every attempt works on a fresh copy produced by [`UserTokenRequestParameters::for_attempt`],
/// so only [`force_renewal`](UserTokenRequestParameters::force_renewal) differs between the
/// first attempt and the retry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UserTokenRequestParameters {
	/// Authentication scheme whose session holds the user's tokens.
	pub sign_in_scheme: Option<String>,
	/// Scheme used when an interactive challenge is required.
	pub challenge_scheme: Option<String>,
	/// Identifier of the protected resource for providers that scope tokens per resource.
	pub resource: Option<String>,
	/// Provider-specific pass-through values.
	pub context: TokenContext,
	/// Bypass any cached token and obtain a fresh one.
	#[serde(skip)]
	pub force_renewal: bool,
}
impl UserTokenRequestParameters {
	/// Parses parameters from JSON, reporting the offending field path on failure.
	///
	/// `force_renewal` is never read from configuration.
	pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
		let mut deserializer = serde_json::Deserializer::from_str(raw);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| ConfigError::InvalidParameters { source })
	}

	/// Sets the sign-in scheme.
	pub fn with_sign_in_scheme(mut self, scheme: impl Into<String>) -> Self {
		self.sign_in_scheme = Some(scheme.into());

		self
	}

	/// Sets the challenge scheme.
	pub fn with_challenge_scheme(mut self, scheme: impl Into<String>) -> Self {
		self.challenge_scheme = Some(scheme.into());

		self
	}

	/// Sets the protected resource identifier.
	pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
		self.resource = Some(resource.into());

		self
	}

	/// Adds a provider-specific context value.
	pub fn with_context_value(
		mut self,
		key: impl Into<String>,
		value: impl Into<serde_json::Value>,
	) -> Self {
		self.context.insert(key.into(), value.into());

		self
	}

	/// Derives the parameters for a single send attempt.
	pub fn for_attempt(&self, force_renewal: bool) -> Self {
		Self {
			sign_in_scheme: self.sign_in_scheme.clone(),
			challenge_scheme: self.challenge_scheme.clone(),
			resource: self.resource.clone(),
			context: self.context.clone(),
			force_renewal,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn attempts_do_not_leak_into_defaults() {
		let defaults = UserTokenRequestParameters::default()
			.with_sign_in_scheme("cookie")
			.with_resource("urn:api:orders")
			.with_context_value("tenant_hint", "acme");
		let retry = defaults.for_attempt(true);

		assert!(retry.force_renewal);
		assert!(!defaults.force_renewal);
		assert_eq!(retry.sign_in_scheme.as_deref(), Some("cookie"));
		assert_eq!(retry.resource.as_deref(), Some("urn:api:orders"));
		assert_eq!(retry.context, defaults.context);
		assert!(!defaults.for_attempt(false).force_renewal);
	}

	#[test]
	fn json_configuration_parses_and_ignores_force_flag() {
		let parameters = UserTokenRequestParameters::from_json_str(
			r#"{"sign_in_scheme":"cookie","challenge_scheme":"oidc","context":{"acr":"mfa"}}"#,
		)
		.expect("Parameters should parse from JSON.");

		assert_eq!(parameters.sign_in_scheme.as_deref(), Some("cookie"));
		assert_eq!(parameters.challenge_scheme.as_deref(), Some("oidc"));
		assert_eq!(parameters.resource, None);
		assert_eq!(parameters.context.get("acr"), Some(&serde_json::Value::from("mfa")));
		assert!(!parameters.force_renewal);
		assert_eq!(
			UserTokenRequestParameters::from_json_str("{}")
				.expect("Empty configuration should parse."),
			UserTokenRequestParameters::default()
		);
	}

	#[test]
	fn json_errors_report_field_path() {
		let err = UserTokenRequestParameters::from_json_str(r#"{"resource":42}"#)
			.expect_err("Numeric resource must be rejected.");

		match err {
			ConfigError::InvalidParameters { source } => {
				assert_eq!(source.path().to_string(), "resource");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn json_rejects_force_renewal_from_configuration() {
		assert!(UserTokenRequestParameters::from_json_str(r#"{"force_renewal":true}"#).is_err());
	}
}
