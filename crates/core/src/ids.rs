//! Pseudo-random trace and span identifiers.
//!
//! Draws come from an RNG seeded with the span's effective start time and are
//! never checked for collisions. The per-pair odds of two open spans sharing
//! a 64-bit id are about 2^-64; this tool accepts that as a known limitation.

use chrono::{DateTime, Utc};
use opentelemetry::trace::{SpanId, TraceId};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

pub struct IdGenerator(StdRng);

impl IdGenerator {
    pub fn from_start_time(start: DateTime<Utc>) -> Self {
        let seed = start
            .timestamp_nanos_opt()
            .unwrap_or_else(|| start.timestamp_millis()) as u64;
        Self(StdRng::seed_from_u64(seed))
    }

    pub fn span_id(&mut self) -> SpanId {
        loop {
            let raw = self.0.next_u64();
            if raw != 0 {
                return SpanId::from_bytes(raw.to_be_bytes());
            }
        }
    }

    pub fn trace_id(&mut self) -> TraceId {
        loop {
            let raw = ((self.0.next_u64() as u128) << 64) | self.0.next_u64() as u128;
            if raw != 0 {
                return TraceId::from_bytes(raw.to_be_bytes());
            }
        }
    }
}

pub fn span_id_to_u64(id: SpanId) -> u64 {
    u64::from_be_bytes(id.to_bytes())
}

pub fn span_id_from_u64(raw: u64) -> SpanId {
    SpanId::from_bytes(raw.to_be_bytes())
}
