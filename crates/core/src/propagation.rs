//! Serializes trace propagation context to and from a [`Carrier`].
//!
//! Wraps the W3C trace-context propagator: `extract(inject(c))` reconstructs
//! the same trace/span linkage as `c`, including sampling flags and
//! tracestate.

use opentelemetry::Context;
use opentelemetry::propagation::TextMapPropagator;
use opentelemetry::trace::{SpanContext, TraceContextExt};
use opentelemetry_sdk::propagation::TraceContextPropagator;

use crate::carrier::Carrier;
use crate::error::{Result, StitchError};

pub struct ContextCodec {
    propagator: TraceContextPropagator,
}

impl ContextCodec {
    pub fn new() -> Self {
        Self {
            propagator: TraceContextPropagator::new(),
        }
    }

    pub fn inject(&self, span_context: &SpanContext) -> Carrier {
        let cx = Context::new().with_remote_span_context(span_context.clone());
        let mut carrier = Carrier::new();
        self.propagator.inject_context(&cx, &mut carrier);
        carrier
    }

    pub fn extract(&self, carrier: &Carrier) -> Result<SpanContext> {
        let cx = self.propagator.extract_with_context(&Context::new(), carrier);
        let span_context = cx.span().span_context().clone();
        if !span_context.is_valid() {
            return Err(StitchError::Extraction(format!(
                "carrier does not hold a valid trace context (keys: {:?})",
                carrier.iter().map(|(k, _)| k).collect::<Vec<_>>()
            )));
        }
        Ok(span_context)
    }

    /// Wraps an extracted context so it can parent a new span.
    pub fn as_parent(span_context: &SpanContext) -> Context {
        Context::new().with_remote_span_context(span_context.clone())
    }
}

impl Default for ContextCodec {
    fn default() -> Self {
        Self::new()
    }
}
