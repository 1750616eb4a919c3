//! Optional observability helpers for intercepted sends.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth2_token_injector.intercept` with the
//!   `kind` (operation) and `stage` (call site) fields, plus a `debug` event whenever a `401`
//!   triggers the forced-renewal retry.
//! - Enable `metrics` to increment the `oauth2_token_injector_intercept_total` counter for every
//!   attempt/success/retry/failure, labeled by `kind` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the interceptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InterceptKind {
	/// Full send including the optional retry.
	Send,
	/// Token lookup and header attachment for one attempt.
	AttachToken,
	/// Cache-bypassing token renewal performed by the caching provider.
	Renew,
}
impl InterceptKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			InterceptKind::Send => "send",
			InterceptKind::AttachToken => "attach_token",
			InterceptKind::Renew => "renew",
		}
	}
}
impl Display for InterceptKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InterceptOutcome {
	/// Entry to an interceptor operation.
	Attempt,
	/// Successful completion.
	Success,
	/// A `401` forced a renewal and a second send.
	Retried,
	/// Failure propagated back to the caller.
	Failure,
}
impl InterceptOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			InterceptOutcome::Attempt => "attempt",
			InterceptOutcome::Success => "success",
			InterceptOutcome::Retried => "retried",
			InterceptOutcome::Failure => "failure",
		}
	}
}
impl Display for InterceptOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
