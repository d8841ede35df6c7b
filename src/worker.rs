//! Worker execution framework: the schema-in/schema-out unit of a pipeline.
//!
//! This module provides the core abstractions for executable pipeline
//! workers: the typed [`Worker`] trait, the object-safe [`ErasedWorker`]
//! layer the graph stores, the execution context, and structured worker
//! errors.
//!
//! # Design Principles
//!
//! - **Stateless**: Workers hold configuration only; all per-run data flows
//!   through the request and context, so one worker definition is safely
//!   re-entrant across concurrent runs.
//! - **Typed at the seams**: A worker's input and output are [`Schema`]
//!   types. The erased layer validates every payload against the declared
//!   input schema before the worker body runs, and output conformity is
//!   guaranteed by the type system.
//! - **Structured failure**: A worker reports downstream problems as a
//!   [`WorkerError`], never as an unstructured panic; the executor stops at
//!   the first failure and reports the failing node.
//! - **Fail-fast credentials**: A worker that declares a required
//!   [`AuthRequirement`] is never invoked when the credential is absent.
//!
//! # Examples
//!
//! ```rust
//! use async_trait::async_trait;
//! use formweaver::envelope::{Request, Response};
//! use formweaver::schema::Schema;
//! use formweaver::worker::{Worker, WorkerContext, WorkerError};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Text {
//!     body: String,
//! }
//!
//! impl Schema for Text {
//!     fn name() -> &'static str {
//!         "Text"
//!     }
//! }
//!
//! struct Shout;
//!
//! #[async_trait]
//! impl Worker for Shout {
//!     type Input = Text;
//!     type Output = Text;
//!
//!     fn name(&self) -> &'static str {
//!         "shout"
//!     }
//!
//!     async fn invoke(
//!         &self,
//!         req: Request<Text>,
//!         _ctx: &WorkerContext,
//!     ) -> Result<Response<Text>, WorkerError> {
//!         Ok(Response::new(Text {
//!             body: req.body.body.to_uppercase(),
//!         }))
//!     }
//! }
//! ```

use async_trait::async_trait;
use miette::Diagnostic;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;

use crate::auth::{AuthError, AuthProvider, AuthRequirement};
use crate::envelope::{LlmUsage, Request, Response};
use crate::schema::{Schema, SchemaDescriptor, ValidationError, ValidationMode};
use crate::types::NodeId;

/// Execution context passed to workers during a run.
///
/// Provides the worker's node identity, the run identifier, the graph's
/// credential provider, and the configured validation mode. One context is
/// built per invocation, so concurrent runs never share credential lookups.
#[derive(Clone)]
pub struct WorkerContext {
    /// Graph node this invocation executes as.
    pub node_id: NodeId,
    /// Identifier of the enclosing run.
    pub run_id: String,
    /// Credential provider configured on the graph.
    pub auth: Arc<dyn AuthProvider>,
    /// Validation mode applied at every schema boundary of this run.
    pub validation: ValidationMode,
}

/// Errors that can occur during worker execution.
///
/// These are stage-local failures: the executor wraps them with the failing
/// node's identity and stops the run. Construction-time problems live in
/// [`GraphConfigurationError`](crate::graphs::GraphConfigurationError)
/// instead.
#[derive(Debug, Error, Diagnostic)]
pub enum WorkerError {
    /// Input payload failed validation against the declared input schema.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    /// A required credential could not be resolved.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Auth(#[from] AuthError),

    /// The generation collaborator returned no parseable structured value.
    #[error("generation produced no parseable design: {detail}")]
    #[diagnostic(
        code(formweaver::worker::generation_parse),
        help("The model reply must be a single JSON object matching the design schema, with at least one item.")
    )]
    GenerationParse { detail: String },

    /// A remote call failed.
    ///
    /// `operation` names which call failed (e.g. `forms.create` vs
    /// `forms.batchUpdate`) so partial-failure states stay diagnosable;
    /// `context` carries structured facts about completed side effects,
    /// such as the id of a form shell that already exists remotely.
    #[error("remote call `{operation}` failed: {message}")]
    #[diagnostic(
        code(formweaver::worker::remote_call),
        help("Completed side effects are not rolled back; inspect `context` before retrying the run.")
    )]
    RemoteCall {
        operation: String,
        message: String,
        context: Value,
    },

    /// JSON serialization error at a stage boundary.
    #[error(transparent)]
    #[diagnostic(code(formweaver::worker::serde_json))]
    Serde(#[from] serde_json::Error),
}

impl WorkerError {
    /// Convenience constructor for [`WorkerError::RemoteCall`].
    #[must_use]
    pub fn remote(operation: impl Into<String>, message: impl Into<String>, context: Value) -> Self {
        Self::RemoteCall {
            operation: operation.into(),
            message: message.into(),
            context,
        }
    }
}

/// Core trait defining a typed processing worker.
///
/// A worker consumes one validated input value and produces one output value
/// or a descriptive failure. Processing workers may perform external effects
/// (generation calls, REST calls); the entry [`Holder`] performs none.
#[async_trait]
pub trait Worker: Send + Sync + 'static {
    /// Declared input schema type.
    type Input: Schema;
    /// Declared output schema type.
    type Output: Schema;

    /// Human-readable worker name, used in logging.
    fn name(&self) -> &'static str;

    /// The external credential this worker needs, if any.
    fn auth_requirement(&self) -> Option<AuthRequirement> {
        None
    }

    /// Execute this worker on a validated request.
    async fn invoke(
        &self,
        req: Request<Self::Input>,
        ctx: &WorkerContext,
    ) -> Result<Response<Self::Output>, WorkerError>;
}

/// Object-safe worker surface stored in the graph.
///
/// The blanket implementation over every [`Worker`] enforces the stage
/// boundary contract: validate the raw payload against the declared input
/// schema, fail fast on a missing required credential, then run the typed
/// worker and re-erase its output.
#[async_trait]
pub trait ErasedWorker: Send + Sync {
    fn name(&self) -> &'static str;
    fn input_schema(&self) -> SchemaDescriptor;
    fn output_schema(&self) -> SchemaDescriptor;
    fn auth_requirement(&self) -> Option<AuthRequirement>;

    /// Invoke on a type-erased payload, returning the erased output and any
    /// usage recorded by the invocation.
    async fn invoke_erased(
        &self,
        body: Value,
        ctx: &WorkerContext,
    ) -> Result<(Value, Vec<LlmUsage>), WorkerError>;
}

#[async_trait]
impl<W: Worker> ErasedWorker for W {
    fn name(&self) -> &'static str {
        Worker::name(self)
    }

    fn input_schema(&self) -> SchemaDescriptor {
        W::Input::descriptor()
    }

    fn output_schema(&self) -> SchemaDescriptor {
        W::Output::descriptor()
    }

    fn auth_requirement(&self) -> Option<AuthRequirement> {
        Worker::auth_requirement(self)
    }

    async fn invoke_erased(
        &self,
        body: Value,
        ctx: &WorkerContext,
    ) -> Result<(Value, Vec<LlmUsage>), WorkerError> {
        let input = W::Input::validate(&body, ctx.validation)?;

        // Required credentials are resolved before the worker body runs, so
        // a missing secret can never reach a remote call.
        if let Some(requirement) = Worker::auth_requirement(self) {
            if requirement.required {
                ctx.auth
                    .get(requirement.integration, requirement.secret, true)?;
            }
        }

        tracing::debug!(
            node = %ctx.node_id,
            worker = Worker::name(self),
            input = %W::Input::name(),
            output = %W::Output::name(),
            "invoking worker"
        );
        let response = self.invoke(Request::new(input), ctx).await?;
        let output = serde_json::to_value(&response.body)?;
        Ok((output, response.usage))
    }
}

/// Entry worker that holds and validates the run's input schema.
///
/// Performs no external effects: the erased layer validates the initial
/// payload against `S`, and the holder passes it through unchanged. Every
/// graph built by this crate starts with a holder so the raw initial value
/// is schema-checked before any processing worker runs.
pub struct Holder<S: Schema> {
    schema: PhantomData<fn() -> S>,
}

impl<S: Schema> Holder<S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema: PhantomData,
        }
    }
}

impl<S: Schema> Default for Holder<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<S: Schema> Worker for Holder<S> {
    type Input = S;
    type Output = S;

    /// Reports the held schema's name.
    fn name(&self) -> &'static str {
        S::name()
    }

    async fn invoke(
        &self,
        req: Request<S>,
        _ctx: &WorkerContext,
    ) -> Result<Response<S>, WorkerError> {
        Ok(Response::new(req.body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticAuthProvider;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Text {
        body: String,
    }

    impl Schema for Text {
        fn name() -> &'static str {
            "Text"
        }
    }

    struct Gated;

    #[async_trait]
    impl Worker for Gated {
        type Input = Text;
        type Output = Text;

        fn name(&self) -> &'static str {
            "gated"
        }

        fn auth_requirement(&self) -> Option<AuthRequirement> {
            Some(AuthRequirement::required("remote", "api_key"))
        }

        async fn invoke(
            &self,
            req: Request<Text>,
            _ctx: &WorkerContext,
        ) -> Result<Response<Text>, WorkerError> {
            Ok(Response::new(req.body))
        }
    }

    fn ctx(auth: StaticAuthProvider) -> WorkerContext {
        WorkerContext {
            node_id: "test".into(),
            run_id: "run-0".into(),
            auth: Arc::new(auth),
            validation: ValidationMode::Lenient,
        }
    }

    #[tokio::test]
    async fn test_erased_invoke_validates_input() {
        let holder = Holder::<Text>::new();
        let err = holder
            .invoke_erased(json!({"wrong": 1}), &ctx(StaticAuthProvider::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkerError::Validation(_)));
    }

    #[tokio::test]
    async fn test_erased_invoke_round_trips_payload() {
        let holder = Holder::<Text>::new();
        let (out, usage) = holder
            .invoke_erased(json!({"body": "hi"}), &ctx(StaticAuthProvider::new()))
            .await
            .unwrap();
        assert_eq!(out, json!({"body": "hi"}));
        assert!(usage.is_empty());
    }

    #[tokio::test]
    async fn test_missing_required_credential_fails_fast() {
        let err = Gated
            .invoke_erased(json!({"body": "hi"}), &ctx(StaticAuthProvider::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkerError::Auth(_)));
    }

    #[tokio::test]
    async fn test_present_credential_passes_gate() {
        let auth = StaticAuthProvider::new().with_secret("remote", "api_key", "tok");
        let (out, _) = Gated
            .invoke_erased(json!({"body": "hi"}), &ctx(auth))
            .await
            .unwrap();
        assert_eq!(out, json!({"body": "hi"}));
    }
}
