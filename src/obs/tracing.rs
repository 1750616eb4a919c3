// self
use crate::{_prelude::*, obs::InterceptKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedIntercept<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedIntercept<F> = F;

/// A span builder used by the interceptor.
#[derive(Clone, Debug)]
pub struct InterceptSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl InterceptSpan {
	/// Creates a new span tagged with the provided operation kind + stage.
	pub fn new(kind: InterceptKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("oauth2_token_injector.intercept", kind = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedIntercept<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits the event marking a `401` that triggers the forced-renewal retry.
pub fn record_unauthorized_retry(uri: &http::Uri) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(%uri, "resource rejected the access token; retrying with forced renewal");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = uri;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn retry_event_is_safe_without_subscriber() {
		record_unauthorized_retry(&http::Uri::from_static("https://api.example.com/orders"));
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = InterceptSpan::new(InterceptKind::Send, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
