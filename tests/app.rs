//! Executor behavior: sequential order, bridging, short-circuit on first
//! failure, and usage accumulation.

mod common;

use common::*;
use serde_json::json;
use std::sync::{Arc, Mutex};

use formweaver::app::{App, RunnerError};
use formweaver::bridge::{FieldMapBridge, IdentityBridge};
use formweaver::graphs::GraphBuilder;
use formweaver::schema::ValidationMode;
use formweaver::worker::{Holder, WorkerError};

fn tagger_chain(trace: &Arc<Mutex<Vec<&'static str>>>) -> App {
    GraphBuilder::new()
        .add_node("input", Holder::<Text>::new())
        .add_node(
            "a",
            Tagger {
                tag: "a",
                trace: Arc::clone(trace),
            },
        )
        .add_node(
            "b",
            Tagger {
                tag: "b",
                trace: Arc::clone(trace),
            },
        )
        .bridge("input", "a", IdentityBridge)
        .bridge("a", "b", IdentityBridge)
        .set_entry_node("input")
        .set_exit_node("b")
        .compile()
        .unwrap()
}

#[tokio::test]
async fn test_stages_execute_sequentially_in_edge_order() {
    let trace = Arc::new(Mutex::new(Vec::new()));
    let app = tagger_chain(&trace);

    let outcome = app
        .invoke(Text { body: "hi".into() })
        .await
        .unwrap();

    assert_eq!(*trace.lock().unwrap(), vec!["a", "b"]);
    assert_eq!(outcome.decode::<Text>().unwrap().body, "hi+a+b");
    let visited: Vec<&str> = outcome.visited.iter().map(|n| n.as_str()).collect();
    assert_eq!(visited, vec!["input", "a", "b"]);
}

#[tokio::test]
async fn test_rerun_executes_every_stage_again() {
    let trace = Arc::new(Mutex::new(Vec::new()));
    let app = tagger_chain(&trace);

    app.invoke(Text { body: "x".into() }).await.unwrap();
    app.invoke(Text { body: "x".into() }).await.unwrap();

    // No memoization: both runs executed both workers.
    assert_eq!(*trace.lock().unwrap(), vec!["a", "b", "a", "b"]);
}

#[tokio::test]
async fn test_first_failure_short_circuits() {
    let trace = Arc::new(Mutex::new(Vec::new()));
    let app = GraphBuilder::new()
        .add_node("input", Holder::<Text>::new())
        .add_node("boom", Exploding)
        .add_node(
            "after",
            Tagger {
                tag: "after",
                trace: Arc::clone(&trace),
            },
        )
        .bridge("input", "boom", IdentityBridge)
        .bridge("boom", "after", IdentityBridge)
        .set_entry_node("input")
        .set_exit_node("after")
        .compile()
        .unwrap();

    let err = app.invoke(Text { body: "hi".into() }).await.unwrap_err();

    // Exactly one failing stage is reported, verbatim.
    assert_eq!(err.failing_node().unwrap().as_str(), "boom");
    match err {
        RunnerError::Stage { source, .. } => {
            assert!(matches!(
                source,
                WorkerError::RemoteCall { operation, .. } if operation == "test.op"
            ));
        }
        other => panic!("expected stage error, got {other:?}"),
    }
    // The downstream worker never ran.
    assert!(trace.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_usage_accumulates_across_stages() {
    let app = GraphBuilder::new()
        .add_node("input", Holder::<Text>::new())
        .add_node("first", Metered { tokens: 40 })
        .add_node("second", Metered { tokens: 2 })
        .bridge("input", "first", IdentityBridge)
        .bridge("first", "second", IdentityBridge)
        .set_entry_node("input")
        .set_exit_node("second")
        .compile()
        .unwrap();

    let outcome = app.invoke(Text { body: "hi".into() }).await.unwrap();

    assert_eq!(outcome.usage.len(), 2);
    let total: u32 = outcome.usage.iter().map(|u| u.total_tokens).sum();
    assert_eq!(total, 42);
}

#[tokio::test]
async fn test_field_map_bridge_runs_on_edge() {
    let app = GraphBuilder::new()
        .add_node("input", Holder::<Text>::new())
        .add_node("renamed", TakesRenamed)
        .bridge(
            "input",
            "renamed",
            FieldMapBridge::new().map_field("body", "text"),
        )
        .set_entry_node("input")
        .set_exit_node("renamed")
        .compile()
        .unwrap();

    let outcome = app.invoke(Text { body: "hi".into() }).await.unwrap();
    assert_eq!(outcome.decode::<Renamed>().unwrap().text, "hi");
}

#[tokio::test]
async fn test_invalid_initial_input_fails_at_entry() {
    let trace = Arc::new(Mutex::new(Vec::new()));
    let app = tagger_chain(&trace);

    let err = app.invoke_value(json!({"wrong": 1})).await.unwrap_err();

    assert_eq!(err.failing_node().unwrap().as_str(), "input");
    assert!(matches!(
        err,
        RunnerError::Stage {
            source: WorkerError::Validation(_),
            ..
        }
    ));
    assert!(trace.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_strict_mode_rejects_unknown_initial_field() {
    let trace = Arc::new(Mutex::new(Vec::new()));
    let app = GraphBuilder::new()
        .add_node("input", Holder::<Text>::new())
        .add_node(
            "a",
            Tagger {
                tag: "a",
                trace: Arc::clone(&trace),
            },
        )
        .bridge("input", "a", IdentityBridge)
        .set_entry_node("input")
        .set_exit_node("a")
        .with_validation(ValidationMode::Strict)
        .compile()
        .unwrap();

    let raw = json!({"body": "hi", "color": "blue"});
    let err = app.invoke_value(raw.clone()).await.unwrap_err();
    assert!(matches!(
        err,
        RunnerError::Stage {
            source: WorkerError::Validation(_),
            ..
        }
    ));

    // The same payload passes a lenient graph.
    let lenient = tagger_chain(&Arc::new(Mutex::new(Vec::new())));
    assert!(lenient.invoke_value(raw).await.is_ok());
}

#[tokio::test]
async fn test_concurrent_runs_are_isolated() {
    let trace = Arc::new(Mutex::new(Vec::new()));
    let app = Arc::new(tagger_chain(&trace));

    let runs = (0..8).map(|i| {
        let app = Arc::clone(&app);
        tokio::spawn(async move {
            app.invoke(Text {
                body: format!("run{i}"),
            })
            .await
        })
    });
    for (i, handle) in runs.into_iter().enumerate() {
        let outcome = handle.await.unwrap().unwrap();
        assert_eq!(
            outcome.decode::<Text>().unwrap().body,
            format!("run{i}+a+b")
        );
    }
}
