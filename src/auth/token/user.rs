//! Token results handed back by providers and their `Authorization` header rendering.

// crates.io
use http::HeaderValue;
// self
use crate::{_prelude::*, auth::token::secret::TokenSecret, error::ConfigError};

/// Scheme used when a provider does not report the token type.
///
/// Cached tokens written before the type was tracked carry no type at all, so the header falls
/// back to the bearer scheme.
pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// Outcome of a user token request.
///
/// A blank [`UserToken::access_token`] means no token is available; the interceptor then leaves
/// the outbound request untouched.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserToken {
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Token type label reported by the provider (`Bearer`, `DPoP`, ...).
	pub access_token_type: Option<String>,
	/// Expiry instant, when the provider knows it.
	pub expires_at: Option<OffsetDateTime>,
}
impl UserToken {
	/// Creates a token without an explicit type.
	pub fn new(access_token: impl Into<String>) -> Self {
		Self { access_token: TokenSecret::new(access_token), ..Default::default() }
	}

	/// Result representing "no token available".
	pub fn none() -> Self {
		Self::default()
	}

	/// Sets the token type label.
	pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
		self.access_token_type = Some(token_type.into());

		self
	}

	/// Sets the absolute expiry instant.
	pub fn with_expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets the expiry relative to the current clock.
	pub fn with_expires_in(self, duration: Duration) -> Self {
		self.with_expires_at(OffsetDateTime::now_utc() + duration)
	}

	/// Returns `true` when the access token is present and not blank.
	pub fn is_present(&self) -> bool {
		!self.access_token.is_blank()
	}

	/// Effective scheme for the `Authorization` header.
	///
	/// The issued type is trimmed; an absent, empty, or whitespace-only type falls back to
	/// [`DEFAULT_TOKEN_TYPE`].
	pub fn token_type(&self) -> &str {
		self.access_token_type
			.as_deref()
			.map(str::trim)
			.filter(|value| !value.is_empty())
			.unwrap_or(DEFAULT_TOKEN_TYPE)
	}

	/// Returns `true` if the token expires within `window` of `now`.
	///
	/// Tokens without a known expiry never report as expiring.
	pub fn expires_within(&self, now: OffsetDateTime, window: Duration) -> bool {
		match self.expires_at {
			Some(expires_at) => expires_at - now <= window,
			None => false,
		}
	}

	/// Renders `"<type> <token>"` as a sensitive header value, or `None` for a blank token.
	pub fn authorization_value(&self) -> Result<Option<HeaderValue>, ConfigError> {
		if !self.is_present() {
			return Ok(None);
		}

		let mut value =
			HeaderValue::try_from(format!("{} {}", self.token_type(), self.access_token.expose()))?;

		value.set_sensitive(true);

		Ok(Some(value))
	}
}
impl Debug for UserToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("UserToken")
			.field("access_token", &self.is_present().then_some("<redacted>"))
			.field("access_token_type", &self.access_token_type)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn header(token: &UserToken) -> Option<String> {
		token
			.authorization_value()
			.expect("Header value should encode successfully.")
			.map(|value| value.to_str().expect("Header should be visible ASCII.").to_owned())
	}

	#[test]
	fn missing_type_falls_back_to_bearer() {
		assert_eq!(header(&UserToken::new("abc123")), Some("Bearer abc123".into()));
		assert_eq!(
			header(&UserToken::new("abc123").with_token_type("  ")),
			Some("Bearer abc123".into())
		);
	}

	#[test]
	fn explicit_type_is_preserved() {
		assert_eq!(header(&UserToken::new("xyz").with_token_type("DPoP")), Some("DPoP xyz".into()));
		assert_eq!(
			header(&UserToken::new("xyz").with_token_type(" DPoP\t")),
			Some("DPoP xyz".into())
		);
	}

	#[test]
	fn blank_tokens_render_nothing() {
		assert_eq!(header(&UserToken::none()), None);
		assert_eq!(header(&UserToken::new("   ").with_token_type("Bearer")), None);
	}

	#[test]
	fn control_characters_are_rejected() {
		let err = UserToken::new("bad\ntoken")
			.authorization_value()
			.expect_err("Newlines cannot appear in header values.");

		assert!(matches!(err, ConfigError::InvalidAuthorizationHeader { .. }));
	}

	#[test]
	fn header_value_is_sensitive() {
		let value = UserToken::new("abc123")
			.authorization_value()
			.expect("Header value should encode successfully.")
			.expect("Present token should produce a header.");

		assert!(value.is_sensitive());
	}

	#[test]
	fn expiry_window_checks() {
		let now = OffsetDateTime::now_utc();
		let token = UserToken::new("abc").with_expires_at(now + Duration::seconds(30));

		assert!(token.expires_within(now, Duration::seconds(60)));
		assert!(!token.expires_within(now, Duration::seconds(10)));
		assert!(!UserToken::new("abc").expires_within(now, Duration::hours(1)));
	}

	#[test]
	fn debug_redacts_secret() {
		let rendered = format!("{:?}", UserToken::new("super-secret"));

		assert!(!rendered.contains("super-secret"));
		assert!(rendered.contains("<redacted>"));
	}
}
