//! Token provider contract consumed by the interceptor.
//!
//! A provider knows how to obtain, cache, and renew a user access token for a caller. The
//! interceptor only asks for a token and passes the provider's failures through unchanged;
//! caching and renewal de-duplication live behind this trait (see
//! [`CachingTokenProvider`](crate::cache::CachingTokenProvider) for a built-in
//! implementation).

// self
use crate::{
	_prelude::*,
	auth::{CallerContext, UserToken, UserTokenRequestParameters},
	error::BoxError,
};

/// Boxed future returned by [`UserTokenProvider::user_access_token`].
pub type ProviderFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, ProviderError>> + 'a + Send>>;

/// Source of user access tokens.
pub trait UserTokenProvider
where
	Self: Send + Sync,
{
	/// Returns a currently valid token for `caller`.
	///
	/// Implementations must bypass any cached token when
	/// [`UserTokenRequestParameters::force_renewal`] is set. Returning [`UserToken::none`] is
	/// allowed and means the request proceeds without a new `Authorization` header.
	fn user_access_token<'a>(
		&'a self,
		caller: &'a CallerContext,
		parameters: &'a UserTokenRequestParameters,
	) -> ProviderFuture<'a, UserToken>;
}
impl<T> UserTokenProvider for Arc<T>
where
	T: ?Sized + UserTokenProvider,
{
	fn user_access_token<'a>(
		&'a self,
		caller: &'a CallerContext,
		parameters: &'a UserTokenRequestParameters,
	) -> ProviderFuture<'a, UserToken> {
		(**self).user_access_token(caller, parameters)
	}
}

/// Error type produced by [`UserTokenProvider`] implementations.
#[derive(Debug, ThisError)]
pub enum ProviderError {
	/// Identity provider rejected the refresh grant.
	#[error("Identity provider rejected the grant: {reason}.")]
	InvalidGrant {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// The caller must complete an interactive challenge before a token can be issued.
	#[error("Interactive challenge required to obtain a user token.")]
	ChallengeRequired {
		/// Scheme that should run the challenge, when configured.
		scheme: Option<String>,
	},
	/// Network failure while talking to the identity provider.
	#[error("Network error occurred while obtaining a user token.")]
	Network {
		/// Underlying transport error.
		#[source]
		source: BoxError,
	},
	/// Token cache or backing store failure.
	#[error("Token backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
impl ProviderError {
	/// Wraps a network error raised during a token exchange.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::PrincipalId;

	struct StaticProvider(&'static str);
	impl UserTokenProvider for StaticProvider {
		fn user_access_token<'a>(
			&'a self,
			_: &'a CallerContext,
			_: &'a UserTokenRequestParameters,
		) -> ProviderFuture<'a, UserToken> {
			let token = UserToken::new(self.0);

			Box::pin(async move { Ok(token) })
		}
	}

	#[tokio::test]
	async fn arc_wrapped_providers_delegate() {
		let provider: Arc<dyn UserTokenProvider> = Arc::new(StaticProvider("abc123"));
		let caller =
			CallerContext::new(PrincipalId::new("alice").expect("Principal should be valid."));
		let token = provider
			.user_access_token(&caller, &UserTokenRequestParameters::default())
			.await
			.expect("Static provider should always succeed.");

		assert_eq!(token.access_token.expose(), "abc123");
	}

	#[test]
	fn network_errors_keep_source() {
		let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "token endpoint timed out");
		let err = ProviderError::network(io);
		let source = StdError::source(&err).expect("Network error should expose its source.");

		assert_eq!(source.to_string(), "token endpoint timed out");
	}
}
