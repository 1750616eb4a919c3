//! Token-injecting decorator with a single forced-renewal retry.
//!
//! [`TokenInjectingInterceptor`] sits in front of any [`HttpTransport`]. Each call attaches a
//! user access token, sends the request, and, when the resource answers `401 Unauthorized`,
//! drops that response, attaches a forcibly renewed token, and sends once more. The second
//! response is returned whatever its status. Errors from the transport, the token provider, or
//! caller resolution propagate untouched.
//!
//! Token attachment is a pluggable [`TokenAttacher`]; [`ProviderTokenAttacher`] is the default
//! and asks a [`UserTokenProvider`] for the caller resolved by a [`CallerResolver`].

// crates.io
use http::{StatusCode, header::AUTHORIZATION};
// self
use crate::{
	_prelude::*,
	auth::{CallerContext, CallerResolver, UserTokenRequestParameters},
	obs::{self, InterceptKind, InterceptOutcome, InterceptSpan},
	provider::UserTokenProvider,
	transport::{HttpRequest, HttpResponse, HttpTransport, SendFuture},
};
#[cfg(feature = "reqwest")] use crate::transport::ReqwestTransport;

/// Boxed future returned by [`TokenAttacher::attach`].
pub type AttachFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + 'a + Send>>;

/// Strategy that writes credentials onto an outbound request.
pub trait TokenAttacher
where
	Self: Send + Sync,
{
	/// Attaches a token to `request`; `force_renewal` is `true` only for the retry after a `401`.
	fn attach<'a>(
		&'a self,
		request: &'a mut HttpRequest,
		force_renewal: bool,
	) -> AttachFuture<'a>;
}

/// Default [`TokenAttacher`] backed by a caller resolver and a token provider.
#[derive(Clone)]
pub struct ProviderTokenAttacher {
	/// Resolves the caller the request is sent on behalf of.
	pub resolver: Arc<dyn CallerResolver>,
	/// Source of user access tokens.
	pub provider: Arc<dyn UserTokenProvider>,
	/// Configured defaults every attempt is derived from.
	pub parameters: UserTokenRequestParameters,
}
impl ProviderTokenAttacher {
	/// Creates an attacher; `None` parameters mean an empty configuration.
	pub fn new(
		resolver: Arc<dyn CallerResolver>,
		provider: Arc<dyn UserTokenProvider>,
		parameters: Option<UserTokenRequestParameters>,
	) -> Self {
		Self { resolver, provider, parameters: parameters.unwrap_or_default() }
	}

	async fn attach_now(&self, request: &mut HttpRequest, force_renewal: bool) -> Result<()> {
		let parameters = self.parameters.for_attempt(force_renewal);
		let caller = self.resolver.resolve(request).ok_or(Error::MissingCallerContext)?;
		let token = self.provider.user_access_token(&caller, &parameters).await?;

		if let Some(value) = token.authorization_value()? {
			request.headers_mut().insert(AUTHORIZATION, value);
		}

		Ok(())
	}
}
impl TokenAttacher for ProviderTokenAttacher {
	fn attach<'a>(
		&'a self,
		request: &'a mut HttpRequest,
		force_renewal: bool,
	) -> AttachFuture<'a> {
		let stage = if force_renewal { "forced_renewal" } else { "initial" };
		let span = InterceptSpan::new(InterceptKind::AttachToken, stage);

		Box::pin(async move {
			const KIND: InterceptKind = InterceptKind::AttachToken;

			obs::record_intercept_outcome(KIND, InterceptOutcome::Attempt);

			let result = span.instrument(self.attach_now(request, force_renewal)).await;

			match &result {
				Ok(_) => obs::record_intercept_outcome(KIND, InterceptOutcome::Success),
				Err(_) => obs::record_intercept_outcome(KIND, InterceptOutcome::Failure),
			}

			result
		})
	}
}
impl Debug for ProviderTokenAttacher {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProviderTokenAttacher").field("parameters", &self.parameters).finish()
	}
}

/// Decorates an [`HttpTransport`] so every request carries the caller's access token.
///
/// The interceptor holds no mutable state; concurrent calls share the inner transport and the
/// attacher, and any token caching or renewal de-duplication belongs to the provider.
pub struct TokenInjectingInterceptor<T>
where
	T: ?Sized + HttpTransport,
{
	/// Transport that performs the network exchange.
	pub inner: Arc<T>,
	/// Strategy used to attach tokens before each attempt.
	pub attacher: Arc<dyn TokenAttacher>,
}
impl<T> TokenInjectingInterceptor<T>
where
	T: ?Sized + HttpTransport,
{
	/// Wraps `inner` with the provider-backed attacher.
	///
	/// `None` parameters mean an empty configuration (all options unset).
	pub fn with_transport(
		inner: impl Into<Arc<T>>,
		resolver: Arc<dyn CallerResolver>,
		provider: Arc<dyn UserTokenProvider>,
		parameters: Option<UserTokenRequestParameters>,
	) -> Self {
		Self::with_attacher(
			inner,
			Arc::new(ProviderTokenAttacher::new(resolver, provider, parameters)),
		)
	}

	/// Wraps `inner` with a custom attachment strategy.
	pub fn with_attacher(inner: impl Into<Arc<T>>, attacher: Arc<dyn TokenAttacher>) -> Self {
		Self { inner: inner.into(), attacher }
	}

	/// Sends `request` with an attached token, retrying once with a renewed token on `401`.
	///
	/// `cancel` is honored by the inner sends; token attachment always runs to completion.
	pub async fn send(
		&self,
		request: HttpRequest,
		cancel: &CancellationToken,
	) -> Result<HttpResponse> {
		const KIND: InterceptKind = InterceptKind::Send;

		let span = InterceptSpan::new(KIND, "send");

		obs::record_intercept_outcome(KIND, InterceptOutcome::Attempt);

		let result = span.instrument(self.send_with_retry(request, cancel)).await;

		match &result {
			Ok(_) => obs::record_intercept_outcome(KIND, InterceptOutcome::Success),
			Err(_) => obs::record_intercept_outcome(KIND, InterceptOutcome::Failure),
		}

		result
	}

	/// Stores `caller` in the request's extensions, then [`send`](Self::send)s it.
	///
	/// Pairs with [`RequestExtensionResolver`](crate::auth::RequestExtensionResolver).
	pub async fn send_on_behalf_of(
		&self,
		caller: CallerContext,
		mut request: HttpRequest,
		cancel: &CancellationToken,
	) -> Result<HttpResponse> {
		request.extensions_mut().insert(caller);

		self.send(request, cancel).await
	}

	async fn send_with_retry(
		&self,
		mut request: HttpRequest,
		cancel: &CancellationToken,
	) -> Result<HttpResponse> {
		self.attacher.attach(&mut request, false).await?;

		let response = self.inner.send(request.clone(), cancel).await?;

		if response.status() != StatusCode::UNAUTHORIZED {
			return Ok(response);
		}

		// The rejected response must be released before the retry goes out.
		drop(response);
		obs::record_unauthorized_retry(request.uri());
		obs::record_intercept_outcome(InterceptKind::Send, InterceptOutcome::Retried);

		self.attacher.attach(&mut request, true).await?;
		self.inner.send(request, cancel).await
	}
}
#[cfg(feature = "reqwest")]
impl TokenInjectingInterceptor<ReqwestTransport> {
	/// Creates an interceptor in front of a default reqwest transport.
	pub fn new(
		resolver: Arc<dyn CallerResolver>,
		provider: Arc<dyn UserTokenProvider>,
		parameters: Option<UserTokenRequestParameters>,
	) -> Self {
		Self::with_transport(ReqwestTransport::default(), resolver, provider, parameters)
	}
}
impl<T> Clone for TokenInjectingInterceptor<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self { inner: Arc::clone(&self.inner), attacher: Arc::clone(&self.attacher) }
	}
}
impl<T> HttpTransport for TokenInjectingInterceptor<T>
where
	T: ?Sized + HttpTransport,
{
	fn send<'a>(&'a self, request: HttpRequest, cancel: &'a CancellationToken) -> SendFuture<'a> {
		Box::pin(Self::send(self, request, cancel))
	}
}
impl<T> Debug for TokenInjectingInterceptor<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("TokenInjectingInterceptor(..)")
	}
}
