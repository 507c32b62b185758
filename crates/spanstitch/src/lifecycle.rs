//! OPEN and CLOSE: the two halves of the split span lifecycle.
//!
//! OPEN persists a span's reconstructable description; CLOSE reads it back,
//! rebuilds an equivalent span at the backend, and finishes it. The record is
//! self-sufficient for CLOSE: the parent's propagation context is inlined at
//! OPEN time, so the parent's own state file may disappear in between.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use spanstitch_core::Result;
use spanstitch_core::ids::{self, IdGenerator};
use spanstitch_core::propagation::ContextCodec;
use spanstitch_core::state::SpanState;
use spanstitch_core::tags::TagSet;
use spanstitch_store::StateFile;

use crate::backend::{SpanBackend, SpanSpec};

pub struct OpenRequest {
    pub env: String,
    pub service: String,
    pub resource: String,
    pub operation: String,
    pub tags_json: Option<String>,
    pub state: PathBuf,
    pub parent: Option<PathBuf>,
    pub at: Option<DateTime<Utc>>,
}

pub fn open<B: SpanBackend>(backend: &B, req: &OpenRequest) -> Result<SpanState> {
    let start = req.at.unwrap_or_else(Utc::now);
    let mut ids = IdGenerator::from_start_time(start);
    let span_id = ids.span_id();

    // Tags are validated before anything is written: malformed JSON must not
    // leave a state file behind.
    let tags = match req.tags_json.as_deref() {
        Some(raw) => TagSet::parse(raw)?,
        None => TagSet::default(),
    };

    let codec = ContextCodec::new();
    let (parent_ctx, parent_carrier) = match req.parent.as_deref() {
        Some(path) => {
            let record = StateFile::new(path).load()?;
            let ctx = codec.extract(&record.context)?;
            (Some(ctx), Some(record.context))
        }
        None => (None, None),
    };

    let trace_id = parent_ctx.is_none().then(|| ids.trace_id());
    let spec = SpanSpec {
        operation: &req.operation,
        resource: &req.resource,
        env: &req.env,
        span_id,
        trace_id,
        start,
        parent: parent_ctx,
    };
    let own = backend.start_span(&spec)?;

    let state = SpanState {
        env: req.env.clone(),
        service: req.service.clone(),
        resource: req.resource.clone(),
        operation: req.operation.clone(),
        start,
        span_id: ids::span_id_to_u64(span_id),
        tags,
        context: codec.inject(&own),
        parent_context: parent_carrier,
    };
    StateFile::new(&req.state).save(&state)?;

    tracing::info!(
        span = %own.span_id(),
        trace = %own.trace_id(),
        state = %req.state.display(),
        "opened span"
    );
    Ok(state)
}

pub fn close<B: SpanBackend>(
    backend: &B,
    state: &SpanState,
    finish_at: Option<DateTime<Utc>>,
) -> Result<()> {
    let codec = ContextCodec::new();
    let own = codec.extract(&state.context)?;
    if ids::span_id_to_u64(own.span_id()) != state.span_id {
        tracing::warn!(
            recorded = state.span_id,
            "span id in the stored context differs from the recorded id; using the recorded id"
        );
    }

    let parent = state
        .parent_context
        .as_ref()
        .map(|carrier| codec.extract(carrier))
        .transpose()?;
    let parent_span = parent.as_ref().map(|p| p.span_id());

    let spec = SpanSpec {
        operation: &state.operation,
        resource: &state.resource,
        env: &state.env,
        span_id: ids::span_id_from_u64(state.span_id),
        trace_id: Some(own.trace_id()),
        start: state.start,
        parent,
    };
    backend.finish_span(&spec, finish_at.unwrap_or_else(Utc::now))?;

    tracing::info!(
        span = %spec.span_id,
        parent = ?parent_span,
        "finished span"
    );
    Ok(())
}
