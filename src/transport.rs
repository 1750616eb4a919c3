//! Transport primitives the interceptor decorates.
//!
//! [`HttpTransport`] is the only dependency on an HTTP stack. Requests and responses are plain
//! [`http`] messages with buffered bodies, so a request can be re-sent after a `401` and a
//! dropped response has already released its connection. Every send receives a
//! [`CancellationToken`]; implementations stop waiting and return
//! [`TransportError::Cancelled`](crate::error::TransportError::Cancelled) once it fires.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::_prelude::*;
#[cfg(feature = "reqwest")] use crate::error::TransportError;

/// Outbound request with a buffered body.
pub type HttpRequest = http::Request<Vec<u8>>;
/// Inbound response with a buffered body.
pub type HttpResponse = http::Response<Vec<u8>>;

/// Boxed future returned by [`HttpTransport::send`].
pub type SendFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpResponse>> + 'a + Send>>;

/// Capability that performs the actual network exchange.
///
/// Implementations must be `Send + Sync` so one instance can serve concurrent calls, and the
/// futures they return must be `Send` so callers can spawn them on multi-threaded executors.
pub trait HttpTransport
where
	Self: Send + Sync,
{
	/// Sends `request`, giving up once `cancel` fires.
	fn send<'a>(&'a self, request: HttpRequest, cancel: &'a CancellationToken) -> SendFuture<'a>;
}
impl<T> HttpTransport for Arc<T>
where
	T: ?Sized + HttpTransport,
{
	fn send<'a>(&'a self, request: HttpRequest, cancel: &'a CancellationToken) -> SendFuture<'a> {
		(**self).send(request, cancel)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Request extensions are not forwarded to reqwest; only method, URI, version, headers, and
/// body reach the wire.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ReqwestError> {
		let response = self.0.execute(reqwest::Request::try_from(request)?).await?;
		let status = response.status();
		let version = response.version();
		let headers = response.headers().to_owned();
		let mut response_new = HttpResponse::new(response.bytes().await?.to_vec());

		*response_new.status_mut() = status;
		*response_new.version_mut() = version;
		*response_new.headers_mut() = headers;

		Ok(response_new)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn send<'a>(&'a self, request: HttpRequest, cancel: &'a CancellationToken) -> SendFuture<'a> {
		Box::pin(async move {
			match cancel.run_until_cancelled(self.execute(request)).await {
				Some(result) => Ok(result.map_err(TransportError::from)?),
				None => Err(TransportError::Cancelled.into()),
			}
		})
	}
}
