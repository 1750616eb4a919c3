//! Caller context carried alongside outbound requests and the resolvers that find it.
//!
//! The caller is an explicit input: it either travels inside the request's extensions or is
//! produced by a resolver supplied at construction time. A request without a caller fails with
//! [`Error::MissingCallerContext`](crate::error::Error::MissingCallerContext) before anything is
//! sent.

// self
use crate::{
	_prelude::*,
	auth::{PrincipalId, SessionId},
	transport::HttpRequest,
};

/// Identity of the user an outbound request is sent on behalf of.
///
/// The interceptor forwards the context to the token provider unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallerContext {
	/// Authenticated user.
	pub principal: PrincipalId,
	/// Sign-in session the user's tokens belong to, if the host tracks sessions.
	pub session: Option<SessionId>,
	/// Opaque host-specific values for providers that need more than the principal.
	#[serde(default)]
	pub properties: BTreeMap<String, serde_json::Value>,
}
impl CallerContext {
	/// Creates a context for the provided principal.
	pub fn new(principal: PrincipalId) -> Self {
		Self { principal, session: None, properties: BTreeMap::new() }
	}

	/// Associates the context with a sign-in session.
	pub fn with_session(mut self, session: SessionId) -> Self {
		self.session = Some(session);

		self
	}

	/// Adds a host-specific property.
	pub fn with_property(
		mut self,
		key: impl Into<String>,
		value: impl Into<serde_json::Value>,
	) -> Self {
		self.properties.insert(key.into(), value.into());

		self
	}
}

/// Resolves the caller context for an outbound request.
pub trait CallerResolver
where
	Self: Send + Sync,
{
	/// Returns the caller the request is sent on behalf of, if any.
	fn resolve(&self, request: &HttpRequest) -> Option<CallerContext>;
}
impl<F> CallerResolver for F
where
	F: Send + Sync + Fn(&HttpRequest) -> Option<CallerContext>,
{
	fn resolve(&self, request: &HttpRequest) -> Option<CallerContext> {
		self(request)
	}
}

/// Reads the [`CallerContext`] stored in the request's extensions.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestExtensionResolver;
impl CallerResolver for RequestExtensionResolver {
	fn resolve(&self, request: &HttpRequest) -> Option<CallerContext> {
		request.extensions().get::<CallerContext>().cloned()
	}
}

/// Always resolves to the same caller; suited to per-user client instances.
#[derive(Clone, Debug)]
pub struct FixedCallerResolver(pub CallerContext);
impl CallerResolver for FixedCallerResolver {
	fn resolve(&self, _: &HttpRequest) -> Option<CallerContext> {
		Some(self.0.clone())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn alice() -> CallerContext {
		CallerContext::new(PrincipalId::new("alice").expect("Principal fixture should be valid."))
	}

	fn request() -> HttpRequest {
		http::Request::builder()
			.uri("https://api.example.com/orders")
			.body(Vec::new())
			.expect("Request fixture should build.")
	}

	#[test]
	fn extension_resolver_reads_request_extensions() {
		let mut with_caller = request();

		with_caller.extensions_mut().insert(alice());

		assert_eq!(RequestExtensionResolver.resolve(&with_caller), Some(alice()));
		assert_eq!(RequestExtensionResolver.resolve(&request()), None);
	}

	#[test]
	fn fixed_and_closure_resolvers() {
		let fixed = FixedCallerResolver(alice());
		let nobody = |_: &HttpRequest| -> Option<CallerContext> { None };

		assert_eq!(fixed.resolve(&request()), Some(alice()));
		assert_eq!(CallerResolver::resolve(&nobody, &request()), None);
	}
}
