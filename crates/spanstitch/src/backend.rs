//! The narrow tracing-backend capability interface and its OTLP
//! implementation.
//!
//! A live backend span cannot cross a process boundary, so "starting" a span
//! here only pins down the identity a later invocation will replay: the
//! span's future `SpanContext`. Finishing rebuilds an equivalent span from
//! the persisted description and ends it in one step.

use std::env;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use opentelemetry::trace::{
    Span, SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState, Tracer,
    TracerProvider as _,
};
use opentelemetry::{Context, KeyValue};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace as sdktrace;
use spanstitch_core::tags::TagSet;
use spanstitch_core::{Result, StitchError};

/// Per-invocation backend initialization: stored tags become resource
/// attributes, visible on every span this initialization emits.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub service: String,
    pub env: String,
    pub global_tags: TagSet,
}

/// The reconstructable description of a span, identical at open and close.
#[derive(Debug, Clone)]
pub struct SpanSpec<'a> {
    pub operation: &'a str,
    pub resource: &'a str,
    pub env: &'a str,
    pub span_id: SpanId,
    /// The span's own trace id; required for roots, ignored in favor of the
    /// parent's trace when a parent is present.
    pub trace_id: Option<TraceId>,
    pub start: DateTime<Utc>,
    pub parent: Option<SpanContext>,
}

pub trait SpanBackend {
    fn start_span(&self, spec: &SpanSpec<'_>) -> Result<SpanContext>;
    fn finish_span(&self, spec: &SpanSpec<'_>, end: DateTime<Utc>) -> Result<()>;
}

/// Computes the context a span described by `spec` will carry: the parent's
/// trace (and tracestate) when linked, otherwise the spec's own trace id.
pub fn opened_span_context(spec: &SpanSpec<'_>) -> Result<SpanContext> {
    let (trace_id, trace_state) = match &spec.parent {
        Some(parent) => (parent.trace_id(), parent.trace_state().clone()),
        None => (
            spec.trace_id
                .ok_or_else(|| StitchError::Backend("a root span needs a trace id".to_string()))?,
            TraceState::default(),
        ),
    };
    Ok(SpanContext::new(
        trace_id,
        spec.span_id,
        TraceFlags::SAMPLED,
        false,
        trace_state,
    ))
}

pub struct OtlpBackend {
    provider: sdktrace::SdkTracerProvider,
    tracer: sdktrace::Tracer,
}

impl OtlpBackend {
    /// Builds the provider for this invocation. Export is wired up only when
    /// `OTEL_EXPORTER_OTLP_ENDPOINT` is set; without it spans are dropped and
    /// both operations still succeed.
    pub fn initialize(cfg: &BackendConfig) -> Result<Self> {
        let mut attrs = vec![KeyValue::new("deployment.environment", cfg.env.clone())];
        attrs.extend(cfg.global_tags.to_key_values());
        let resource = Resource::builder()
            .with_service_name(cfg.service.clone())
            .with_attributes(attrs)
            .build();

        let mut builder = sdktrace::SdkTracerProvider::builder().with_resource(resource);
        if env::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_ok() {
            let exporter = opentelemetry_otlp::SpanExporter::builder()
                .with_tonic()
                .build()
                .map_err(|e| StitchError::Backend(format!("failed building OTLP exporter: {e}")))?;
            builder = builder.with_batch_exporter(exporter);
        }

        Ok(Self::from_provider(builder.build()))
    }

    fn from_provider(provider: sdktrace::SdkTracerProvider) -> Self {
        let tracer = provider.tracer("spanstitch");
        Self { provider, tracer }
    }

    /// Flushes and releases the provider, surfacing export failures. The
    /// `Drop` impl covers error exit paths where this is never reached.
    pub fn shutdown(self) -> Result<()> {
        self.provider
            .shutdown()
            .map_err(|e| StitchError::Backend(format!("failed flushing spans: {e}")))
    }
}

impl Drop for OtlpBackend {
    fn drop(&mut self) {
        let _ = self.provider.shutdown();
    }
}

impl SpanBackend for OtlpBackend {
    fn start_span(&self, spec: &SpanSpec<'_>) -> Result<SpanContext> {
        opened_span_context(spec)
    }

    fn finish_span(&self, spec: &SpanSpec<'_>, end: DateTime<Utc>) -> Result<()> {
        let mut builder = self
            .tracer
            .span_builder(spec.operation.to_string())
            .with_span_id(spec.span_id)
            .with_start_time(SystemTime::from(spec.start))
            .with_attributes(vec![
                KeyValue::new("env", spec.env.to_string()),
                KeyValue::new("resource.name", spec.resource.to_string()),
            ]);
        if let Some(trace_id) = spec.trace_id {
            builder = builder.with_trace_id(trace_id);
        }

        let mut span = match &spec.parent {
            Some(parent) => builder.start_with_context(
                &self.tracer,
                &Context::new().with_remote_span_context(parent.clone()),
            ),
            None => builder.start(&self.tracer),
        };
        span.end_with_timestamp(SystemTime::from(end));
        Ok(())
    }
}
