use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_spanstitch")
}

fn run(args: &[&str]) -> Output {
    Command::new(bin())
        .args(args)
        .env_remove("OTEL_EXPORTER_OTLP_ENDPOINT")
        .output()
        .unwrap()
}

fn read_state(path: &Path) -> Value {
    let raw = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&raw).unwrap()
}

fn traceparent_trace_id(state: &Value) -> &str {
    let header = state["Context"]["traceparent"].as_str().unwrap();
    header.split('-').nth(1).unwrap()
}

#[test]
fn start_then_finish_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("a.json");

    let start = run(&[
        "start",
        "--env",
        "prod",
        "--service",
        "svc",
        "--resource",
        "GET /x",
        "--operation",
        "http.request",
        "--state",
        state.to_str().unwrap(),
    ]);
    assert!(start.status.success(), "{start:?}");

    let record = read_state(&state);
    assert_eq!(record["Env"], "prod");
    assert_eq!(record["Service"], "svc");
    assert_eq!(record["Resource"], "GET /x");
    assert_eq!(record["Operation"], "http.request");
    let span_id = record["SpanID"].as_u64().unwrap();
    assert_ne!(span_id, 0);

    // The span's own context carries its id in the traceparent header.
    let header = record["Context"]["traceparent"].as_str().unwrap();
    assert!(header.contains(&format!("{span_id:016x}")));

    let finish = run(&["finish", "--state", state.to_str().unwrap()]);
    assert!(finish.status.success(), "{finish:?}");

    // Finish never deletes or mutates the record.
    assert_eq!(read_state(&state), record);
}

#[test]
fn child_record_inlines_parent_context() {
    let dir = tempfile::tempdir().unwrap();
    let parent = dir.path().join("parent.json");
    let child = dir.path().join("child.json");

    assert!(
        run(&["start", "--state", parent.to_str().unwrap()])
            .status
            .success()
    );
    assert!(
        run(&[
            "start",
            "--state",
            child.to_str().unwrap(),
            "--parent",
            parent.to_str().unwrap(),
        ])
        .status
        .success()
    );

    let parent_record = read_state(&parent);
    let child_record = read_state(&child);

    // Self-contained linkage: the parent's Context field is copied verbatim.
    assert_eq!(child_record["ParentContext"], parent_record["Context"]);
    assert_eq!(
        traceparent_trace_id(&child_record),
        traceparent_trace_id(&parent_record)
    );

    // Parent state can disappear before the child closes.
    std::fs::remove_file(&parent).unwrap();
    assert!(
        run(&["finish", "--state", child.to_str().unwrap()])
            .status
            .success()
    );
}

#[test]
fn root_record_has_no_parent_context() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("a.json");

    assert!(
        run(&["start", "--state", state.to_str().unwrap()])
            .status
            .success()
    );
    let record = read_state(&state);
    assert!(record.as_object().unwrap().get("ParentContext").is_none());
}

#[test]
fn malformed_tags_abort_without_state_file() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("a.json");

    let output = run(&[
        "start",
        "--state",
        state.to_str().unwrap(),
        "--tags",
        "{not valid",
    ]);
    assert!(!output.status.success());
    assert!(!state.exists());
}

#[test]
fn tags_land_in_the_record() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("a.json");

    assert!(
        run(&[
            "start",
            "--state",
            state.to_str().unwrap(),
            "--tags",
            r#"{"team":"infra","tier":"1"}"#,
        ])
        .status
        .success()
    );
    let record = read_state(&state);
    assert_eq!(record["Tags"]["team"], "infra");
    assert_eq!(record["Tags"]["tier"], "1");
}

#[test]
fn iso_time_wins_over_epoch_time() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("a.json");

    assert!(
        run(&[
            "start",
            "--state",
            state.to_str().unwrap(),
            "--epoch-time",
            "1500000000000000000",
            "--iso-time",
            "2026-01-05T10:00:00Z",
        ])
        .status
        .success()
    );

    let record = read_state(&state);
    let start: chrono::DateTime<chrono::Utc> =
        record["StartMillis"].as_str().unwrap().parse().unwrap();
    assert_eq!(start.to_rfc3339(), "2026-01-05T10:00:00+00:00");
}

#[test]
fn epoch_time_used_when_no_iso() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("a.json");

    assert!(
        run(&[
            "start",
            "--state",
            state.to_str().unwrap(),
            "--epoch-time",
            "1700000000000000000",
        ])
        .status
        .success()
    );

    let record = read_state(&state);
    let start: chrono::DateTime<chrono::Utc> =
        record["StartMillis"].as_str().unwrap().parse().unwrap();
    assert_eq!(start.timestamp(), 1_700_000_000);
}

#[test]
fn finish_with_missing_state_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&[
        "finish",
        "--state",
        dir.path().join("missing.json").to_str().unwrap(),
    ]);
    assert!(!output.status.success());
}

#[test]
fn unsupported_action_is_rejected() {
    let output = run(&["frobnicate"]);
    assert!(!output.status.success());
}

#[test]
fn deterministic_ids_for_fixed_start_time() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.json");
    let b = dir.path().join("b.json");

    for state in [&a, &b] {
        assert!(
            run(&[
                "start",
                "--state",
                state.to_str().unwrap(),
                "--iso-time",
                "2026-01-05T10:00:00Z",
            ])
            .status
            .success()
        );
    }

    // The id draw is seeded from the effective start time.
    assert_eq!(read_state(&a)["SpanID"], read_state(&b)["SpanID"]);
}
