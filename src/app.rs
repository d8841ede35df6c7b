//! Compiled graph and sequential executor.
//!
//! An [`App`] is the immutable product of
//! [`GraphBuilder::compile`](crate::graphs::GraphBuilder::compile). Invoking
//! it walks the single active path from the entry node to the exit node,
//! strictly sequentially: each worker is awaited to completion, its output
//! is mapped through the outgoing edge's bridge into the next worker's
//! input, and the first failure stops the run.
//!
//! The executor never retries and never rolls back: side effects of already
//! completed workers (a form shell created remotely, for instance) survive a
//! later failure, and re-running the same graph with the same input
//! re-executes every worker, external effects included. Whether to retry a
//! failed run is the caller's decision.

use rustc_hash::FxHashMap;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use miette::Diagnostic;

use crate::auth::AuthProvider;
use crate::bridge::{Bridge, BridgeError};
use crate::envelope::{Envelope, LlmUsage};
use crate::schema::{Schema, ValidationError, ValidationMode};
use crate::types::NodeId;
use crate::worker::{ErasedWorker, WorkerContext, WorkerError};

/// Errors returned by [`App::invoke`].
#[derive(Debug, Error, Diagnostic)]
pub enum RunnerError {
    /// A worker failed; `node` identifies the failing stage and `source`
    /// carries the worker's error verbatim.
    #[error("stage `{node}` failed: {source}")]
    #[diagnostic(code(formweaver::runner::stage))]
    Stage {
        node: NodeId,
        #[source]
        source: WorkerError,
    },

    /// A bridge failed to map a payload across an edge.
    #[error("bridge on edge `{from}` -> `{to}` failed: {source}")]
    #[diagnostic(code(formweaver::runner::bridge))]
    Bridge {
        from: NodeId,
        to: NodeId,
        #[source]
        source: BridgeError,
    },

    /// A non-exit node had no outgoing edge at run time.
    ///
    /// Cannot occur for graphs produced by `compile()`, which rejects dead
    /// ends at construction.
    #[error("node `{node}` has no outgoing edge")]
    #[diagnostic(code(formweaver::runner::missing_edge))]
    MissingEdge { node: NodeId },

    /// A node id resolved to no registered worker at run time.
    ///
    /// Cannot occur for graphs produced by `compile()`.
    #[error("no worker registered for node `{node}`")]
    #[diagnostic(code(formweaver::runner::unknown_node))]
    UnknownNode { node: NodeId },

    /// The initial value could not be serialized for the entry node.
    #[error(transparent)]
    #[diagnostic(code(formweaver::runner::serde_json))]
    Serde(#[from] serde_json::Error),
}

impl RunnerError {
    /// The node a stage-level failure originated from, if any.
    #[must_use]
    pub fn failing_node(&self) -> Option<&NodeId> {
        match self {
            Self::Stage { node, .. } => Some(node),
            _ => None,
        }
    }
}

/// Final result of a successful run.
#[derive(Clone, Debug)]
pub struct RunOutcome {
    /// Identifier of this run.
    pub run_id: String,
    /// The exit node's output payload.
    pub body: Value,
    /// Usage accumulated across every invocation of the run.
    pub usage: Vec<LlmUsage>,
    /// Nodes visited, in execution order (entry first, exit last).
    pub visited: Vec<NodeId>,
}

impl RunOutcome {
    /// Decodes the final payload into a typed schema value.
    pub fn decode<S: Schema>(&self) -> Result<S, ValidationError> {
        S::validate(&self.body, ValidationMode::Lenient)
    }
}

/// An immutable, validated flow graph ready for execution.
///
/// Cheap to clone internally (workers and bridges are shared), and safe to
/// invoke from several tasks at once: every run owns its envelope and its
/// credential lookups.
pub struct App {
    nodes: FxHashMap<NodeId, Arc<dyn ErasedWorker>>,
    edges: FxHashMap<NodeId, Vec<(NodeId, Arc<dyn Bridge>)>>,
    entry: NodeId,
    exit: NodeId,
    auth: Arc<dyn AuthProvider>,
    validation: ValidationMode,
}

impl App {
    /// Internal (crate) factory to build an App while keeping wiring private.
    pub(crate) fn from_parts(
        nodes: FxHashMap<NodeId, Arc<dyn ErasedWorker>>,
        edges: FxHashMap<NodeId, Vec<(NodeId, Arc<dyn Bridge>)>>,
        entry: NodeId,
        exit: NodeId,
        auth: Arc<dyn AuthProvider>,
        validation: ValidationMode,
    ) -> Self {
        Self {
            nodes,
            edges,
            entry,
            exit,
            auth,
            validation,
        }
    }

    /// The designated entry node.
    #[must_use]
    pub fn entry_node(&self) -> &NodeId {
        &self.entry
    }

    /// The designated exit node.
    #[must_use]
    pub fn exit_node(&self) -> &NodeId {
        &self.exit
    }

    /// Number of registered nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Execute the graph on a typed initial value.
    ///
    /// The value is serialized and re-validated at the entry node's
    /// boundary, so a caller-constructed value and a raw payload take the
    /// same path through the pipeline.
    #[instrument(skip(self, input), err)]
    pub async fn invoke<I: Schema>(&self, input: I) -> Result<RunOutcome, RunnerError> {
        let initial = serde_json::to_value(&input)?;
        self.invoke_value(initial).await
    }

    /// Execute the graph on a raw initial payload.
    ///
    /// Walks the single active path from entry to exit. On the first worker
    /// failure the run stops and the failure is returned verbatim, wrapped
    /// with the failing node's identity; completed side effects are not
    /// rolled back.
    pub async fn invoke_value(&self, initial: Value) -> Result<RunOutcome, RunnerError> {
        let run_id = Uuid::new_v4().to_string();
        let mut envelope = Envelope::initial(self.entry.clone(), initial);
        let mut current = self.entry.clone();
        let mut visited: Vec<NodeId> = Vec::new();

        loop {
            let worker = self
                .nodes
                .get(&current)
                .ok_or_else(|| RunnerError::UnknownNode {
                    node: current.clone(),
                })?;
            let ctx = WorkerContext {
                node_id: current.clone(),
                run_id: run_id.clone(),
                auth: Arc::clone(&self.auth),
                validation: self.validation,
            };

            tracing::info!(
                run = %run_id,
                node = %current,
                worker = worker.name(),
                "executing stage"
            );
            let (output, usage) = worker
                .invoke_erased(envelope.body.clone(), &ctx)
                .await
                .map_err(|source| {
                    tracing::error!(run = %run_id, node = %current, error = %source, "stage failed");
                    RunnerError::Stage {
                        node: current.clone(),
                        source,
                    }
                })?;
            visited.push(current.clone());

            let mut merged_usage = envelope.usage;
            merged_usage.extend(usage);

            if current == self.exit {
                return Ok(RunOutcome {
                    run_id,
                    body: output,
                    usage: merged_usage,
                    visited,
                });
            }

            // Single active path: follow the first-registered outgoing edge.
            let (next, bridge) = self
                .edges
                .get(&current)
                .and_then(|targets| targets.first())
                .ok_or_else(|| RunnerError::MissingEdge {
                    node: current.clone(),
                })?;
            let mapped = bridge.map(output).map_err(|source| RunnerError::Bridge {
                from: current.clone(),
                to: next.clone(),
                source,
            })?;

            envelope = Envelope::next(current.clone(), mapped, merged_usage);
            current = next.clone();
        }
    }
}
