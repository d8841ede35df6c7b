//! Request/response wrappers and per-run metering.
//!
//! Workers exchange typed values through [`Request`] and [`Response`]; the
//! executor moves the type-erased [`Envelope`] along graph edges, merging each
//! invocation's result (and any recorded [`LlmUsage`]) into the envelope for
//! the next node. An envelope lives for exactly one invocation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::NodeId;

/// Input wrapper handed to a worker's `invoke`.
///
/// Carries the already-validated value; by the time a worker sees a
/// `Request`, the erased layer has checked the payload against the worker's
/// declared input schema.
#[derive(Clone, Debug)]
pub struct Request<S> {
    /// The validated input value.
    pub body: S,
}

impl<S> Request<S> {
    #[must_use]
    pub fn new(body: S) -> Self {
        Self { body }
    }
}

/// Token usage recorded by one generation call.
///
/// Accumulated on the run's envelope so callers can meter cost across the
/// whole pipeline.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmUsage {
    /// Model that served the call.
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl LlmUsage {
    /// Extracts usage from an OpenAI-style chat completion body.
    ///
    /// Returns `None` when the body carries no `usage` block; generation
    /// still succeeds in that case, it just goes unmetered.
    #[must_use]
    pub fn from_chat_completion(body: &Value) -> Option<Self> {
        let usage = body.get("usage")?;
        let read = |field: &str| {
            usage
                .get(field)
                .and_then(Value::as_u64)
                .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
                .unwrap_or(0)
        };
        Some(Self {
            model: body
                .get("model")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            prompt_tokens: read("prompt_tokens"),
            completion_tokens: read("completion_tokens"),
            total_tokens: read("total_tokens"),
        })
    }
}

/// Successful output of one worker invocation.
#[derive(Clone, Debug)]
pub struct Response<S> {
    /// The output value, conforming to the worker's declared output schema.
    pub body: S,
    /// Usage recorded during this invocation (empty for pure workers).
    pub usage: Vec<LlmUsage>,
}

impl<S> Response<S> {
    #[must_use]
    pub fn new(body: S) -> Self {
        Self {
            body,
            usage: Vec::new(),
        }
    }

    /// Attach usage fluently.
    #[must_use]
    pub fn with_usage(mut self, usage: LlmUsage) -> Self {
        self.usage.push(usage);
        self
    }

    /// Record usage on an existing response.
    pub fn add_usage(&mut self, usage: LlmUsage) {
        self.usage.push(usage);
    }
}

/// A value in flight between two nodes, plus per-run metadata.
///
/// Created by the executor for each invocation and destroyed when the
/// invocation's result is merged into the next envelope. The `source` is the
/// node that produced `body` (for the initial envelope, the entry node about
/// to receive it).
#[derive(Clone, Debug)]
pub struct Envelope {
    /// Node that produced this payload.
    pub source: NodeId,
    /// Schema-valid payload.
    pub body: Value,
    /// Usage accumulated across all completed invocations of this run.
    pub usage: Vec<LlmUsage>,
    /// When this envelope was created.
    pub created_at: DateTime<Utc>,
}

impl Envelope {
    /// Envelope wrapping the run's initial value, addressed at the entry node.
    #[must_use]
    pub fn initial(entry: NodeId, body: Value) -> Self {
        Self {
            source: entry,
            body,
            usage: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Successor envelope: a node's output plus the usage merged so far.
    #[must_use]
    pub fn next(source: NodeId, body: Value, usage: Vec<LlmUsage>) -> Self {
        Self {
            source,
            body,
            usage,
            created_at: Utc::now(),
        }
    }
}
