//! In-process caching [`UserTokenProvider`] with per-caller singleflight renewal.
//!
//! [`CachingTokenProvider`] keeps the last token issued for each caller/scheme/resource
//! partition and reuses it until it comes within `refresh_before_expiration` of its expiry.
//! Renewals go through a pluggable [`TokenRenewer`] (typically a refresh-token exchange) and
//! are serialized per [`CacheKey`], so concurrent callers for the same partition wait on one
//! renewal instead of stampeding the identity provider. A forced renewal always renews unless
//! another renewal replaced the cached token while the caller waited for the guard.

// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	auth::{CallerContext, PrincipalId, SessionId, UserToken, UserTokenRequestParameters},
	obs::{self, InterceptKind, InterceptOutcome, InterceptSpan},
	provider::{ProviderError, ProviderFuture, UserTokenProvider},
};

type EntryMap = Arc<RwLock<HashMap<CacheKey, UserToken>>>;
type GuardMap = Arc<Mutex<HashMap<CacheKey, Arc<AsyncMutex<()>>>>>;

/// Obtains a fresh token for a caller, ignoring any cache.
pub trait TokenRenewer
where
	Self: Send + Sync,
{
	/// Performs the renewal exchange for `caller`.
	fn renew<'a>(
		&'a self,
		caller: &'a CallerContext,
		parameters: &'a UserTokenRequestParameters,
	) -> ProviderFuture<'a, UserToken>;
}

/// Partition a cached token belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
	/// Caller the token was issued to.
	pub principal: PrincipalId,
	/// Sign-in session, when the host tracks sessions.
	pub session: Option<SessionId>,
	/// Fingerprint of the sign-in scheme and resource.
	pub partition_fingerprint: String,
}
impl CacheKey {
	/// Builds the key for a caller and the parameters of one attempt.
	pub fn new(caller: &CallerContext, parameters: &UserTokenRequestParameters) -> Self {
		Self {
			principal: caller.principal.clone(),
			session: caller.session.clone(),
			partition_fingerprint: partition_fingerprint(parameters),
		}
	}
}

/// Caching provider that delegates cache misses and forced renewals to a [`TokenRenewer`].
#[derive(Clone)]
pub struct CachingTokenProvider {
	/// Renewal backend invoked on cache misses and forced renewals.
	pub renewer: Arc<dyn TokenRenewer>,
	/// Window before expiry in which a cached token is renewed early.
	pub refresh_before_expiration: Duration,
	entries: EntryMap,
	guards: GuardMap,
}
impl CachingTokenProvider {
	const DEFAULT_REFRESH_BEFORE_EXPIRATION: Duration = Duration::seconds(60);

	/// Creates a provider with an empty cache.
	pub fn new(renewer: Arc<dyn TokenRenewer>) -> Self {
		Self {
			renewer,
			refresh_before_expiration: Self::DEFAULT_REFRESH_BEFORE_EXPIRATION,
			entries: Default::default(),
			guards: Default::default(),
		}
	}

	/// Overrides the early-renewal window (defaults to 60 seconds; negative values mean zero).
	pub fn with_refresh_before_expiration(mut self, window: Duration) -> Self {
		self.refresh_before_expiration = if window.is_negative() { Duration::ZERO } else { window };

		self
	}

	/// Returns the cached token for the partition, usable or not.
	pub fn cached(
		&self,
		caller: &CallerContext,
		parameters: &UserTokenRequestParameters,
	) -> Option<UserToken> {
		self.entries.read().get(&CacheKey::new(caller, parameters)).cloned()
	}

	/// Removes and returns the cached token for the partition.
	pub fn invalidate(
		&self,
		caller: &CallerContext,
		parameters: &UserTokenRequestParameters,
	) -> Option<UserToken> {
		let key = CacheKey::new(caller, parameters);
		let removed = self.entries.write().remove(&key);

		self.prune_guard(&key);

		removed
	}

	/// Drops every cached token.
	pub fn clear(&self) {
		self.entries.write().clear();
		self.guards.lock().retain(|_, guard| Arc::strong_count(guard) > 1);
	}

	fn is_usable(&self, token: &UserToken, now: OffsetDateTime) -> bool {
		token.is_present() && !token.expires_within(now, self.refresh_before_expiration)
	}

	fn guard(&self, key: &CacheKey) -> Arc<AsyncMutex<()>> {
		let mut guards = self.guards.lock();

		guards.entry(key.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
	}

	// Guards are handed out under the map lock, so a count of one means no caller holds it.
	fn prune_guard(&self, key: &CacheKey) {
		let mut guards = self.guards.lock();

		if guards.get(key).is_some_and(|guard| Arc::strong_count(guard) == 1) {
			guards.remove(key);
		}
	}

	async fn fetch(
		&self,
		caller: &CallerContext,
		parameters: &UserTokenRequestParameters,
	) -> Result<UserToken, ProviderError> {
		let key = CacheKey::new(caller, parameters);
		let observed = self.entries.read().get(&key).cloned();

		if let Some(token) = observed.as_ref().filter(|token| {
			!parameters.force_renewal && self.is_usable(token, OffsetDateTime::now_utc())
		}) {
			return Ok(token.clone());
		}

		let guard = self.guard(&key);
		let result = {
			let _singleflight = guard.lock().await;

			self.fetch_guarded(&key, caller, parameters, observed).await
		};

		drop(guard);
		self.prune_guard(&key);

		result
	}

	async fn fetch_guarded(
		&self,
		key: &CacheKey,
		caller: &CallerContext,
		parameters: &UserTokenRequestParameters,
		observed: Option<UserToken>,
	) -> Result<UserToken, ProviderError> {
		let current = self.entries.read().get(key).cloned();

		// Forced callers only reuse a token another caller renewed while they waited.
		if let Some(current) = current.filter(|token| {
			self.is_usable(token, OffsetDateTime::now_utc())
				&& (!parameters.force_renewal || observed.as_ref() != Some(token))
		}) {
			return Ok(current);
		}

		let token = self.renew(caller, parameters).await?;

		if token.is_present() {
			self.entries.write().insert(key.clone(), token.clone());
		} else {
			self.entries.write().remove(key);
		}

		Ok(token)
	}

	async fn renew(
		&self,
		caller: &CallerContext,
		parameters: &UserTokenRequestParameters,
	) -> Result<UserToken, ProviderError> {
		const KIND: InterceptKind = InterceptKind::Renew;

		let span = InterceptSpan::new(KIND, "caching_provider");

		obs::record_intercept_outcome(KIND, InterceptOutcome::Attempt);

		let result = span.instrument(self.renewer.renew(caller, parameters)).await;

		match &result {
			Ok(_) => obs::record_intercept_outcome(KIND, InterceptOutcome::Success),
			Err(_) => obs::record_intercept_outcome(KIND, InterceptOutcome::Failure),
		}

		result
	}
}
impl UserTokenProvider for CachingTokenProvider {
	fn user_access_token<'a>(
		&'a self,
		caller: &'a CallerContext,
		parameters: &'a UserTokenRequestParameters,
	) -> ProviderFuture<'a, UserToken> {
		Box::pin(self.fetch(caller, parameters))
	}
}
impl Debug for CachingTokenProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CachingTokenProvider")
			.field("refresh_before_expiration", &self.refresh_before_expiration)
			.field("entries", &self.entries.read().len())
			.finish()
	}
}

/// Base64 (no padding) SHA-256 digest of the sign-in scheme and resource.
fn partition_fingerprint(parameters: &UserTokenRequestParameters) -> String {
	let mut hasher = Sha256::new();

	for part in [&parameters.sign_in_scheme, &parameters.resource] {
		match part {
			Some(value) => {
				hasher.update([1_u8]);
				hasher.update((value.len() as u64).to_be_bytes());
				hasher.update(value.as_bytes());
			},
			None => hasher.update([0_u8]),
		}
	}

	URL_SAFE_NO_PAD.encode(hasher.finalize())
}
