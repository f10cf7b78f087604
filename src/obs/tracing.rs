// self
use crate::{_prelude::*, obs::SyncKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedSync<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedSync<F> = F;

/// A span builder used by hub sync flows.
#[derive(Clone, Debug)]
pub struct SyncSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl SyncSpan {
	/// Creates a new span tagged with the provided flow kind + stage.
	pub fn new(kind: SyncKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("timeoff_hub.sync", kind = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Enters the span for synchronous sections.
	pub fn entered(self) -> SyncSpanGuard {
		#[cfg(feature = "tracing")]
		{
			SyncSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			SyncSpanGuard {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedSync<Fut>
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

/// RAII guard returned by [`SyncSpan::entered`].
pub struct SyncSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for SyncSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("SyncSpanGuard(..)")
	}
}

/// Emits a warning about a non-fatal internal failure (when tracing is enabled).
pub(crate) fn warn_non_fatal(context: &'static str, error: &dyn std::error::Error) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(context, error = %error, "Non-fatal internal failure.");
	}

	#[cfg(not(feature = "tracing"))]
	{
		let _ = (context, error);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn sync_span_noop_without_tracing() {
		let _guard = SyncSpan::new(SyncKind::Timeoff, "test").entered();
		// Compile-time smoke test ensures the guard exists even when tracing is disabled.
	}

	#[cfg(feature = "tracing")]
	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = SyncSpan::new(SyncKind::TimeoffDelete, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
