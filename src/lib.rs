//! # Formweaver: Graph-driven Form Builder
//!
//! Formweaver turns a free-text requirement ("help me plan a reunion
//! survey") into a fully populated Google Form by running it through a small
//! typed pipeline: a declarative directed graph of schema-in/schema-out
//! workers connected by adapter bridges, with one entry node, one exit node,
//! and per-stage failure propagation.
//!
//! ## Core Concepts
//!
//! - **Schemas**: Validated, strongly-typed value containers exchanged
//!   between workers
//! - **Workers**: Async units of work consuming one typed value and
//!   producing one typed value or a structured failure
//! - **Bridges**: Schema-to-schema adapters on every edge (identity by
//!   default)
//! - **Graph**: Declarative wiring, validated eagerly at compile time
//! - **Executor**: Sequential entry-to-exit walk with first-failure
//!   short-circuit
//!
//! ## Quick Start
//!
//! ### Running the form-builder flow
//!
//! ```rust,no_run
//! use formweaver::auth::EnvAuthProvider;
//! use formweaver::forms::{CreateFormResponse, DesignRequirement, form_builder_graph};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Credentials come from OPENAI_API_KEY and GOOGLE_FORMS_API_KEY.
//! let app = form_builder_graph(Arc::new(EnvAuthProvider::from_dotenv()))?;
//!
//! let outcome = app
//!     .invoke(DesignRequirement {
//!         user_requirement: "Find an evening between Oct 1 and Oct 7 that \
//!             works for everyone, and collect dietary preferences."
//!             .to_string(),
//!     })
//!     .await?;
//!
//! let receipt: CreateFormResponse = outcome.decode()?;
//! println!("edit:    {}", receipt.edit_url());
//! println!("respond: {}", receipt.respond_url());
//! # Ok(())
//! # }
//! ```
//!
//! ### Building a custom flow
//!
//! ```rust
//! use async_trait::async_trait;
//! use formweaver::bridge::IdentityBridge;
//! use formweaver::envelope::{Request, Response};
//! use formweaver::graphs::GraphBuilder;
//! use formweaver::schema::Schema;
//! use formweaver::worker::{Holder, Worker, WorkerContext, WorkerError};
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
//!
//! let app = GraphBuilder::new()
//!     .add_node("input", Holder::<Text>::new())
//!     .add_node("shout", Shout)
//!     .bridge("input", "shout", IdentityBridge)
//!     .set_entry_node("input")
//!     .set_exit_node("shout")
//!     .compile()
//!     .expect("valid graph");
//! ```
//!
//! ## Failure Model
//!
//! Stage-local failures are caught at the stage boundary, wrapped into a
//! structured [`WorkerError`](crate::worker::WorkerError), and surfaced as
//! [`RunnerError::Stage`](crate::app::RunnerError::Stage) naming the failing
//! node. Configuration mistakes (unreachable nodes, incompatible bridges,
//! missing entry/exit) abort
//! [`compile()`](crate::graphs::GraphBuilder::compile); a graph that
//! compiles cannot fail at run time for wiring reasons. The executor never
//! retries and never rolls back completed side effects; see
//! [`app`](crate::app) for the exact semantics.
//!
//! ## Module Guide
//!
//! - [`schema`] - Typed schema values and validation
//! - [`envelope`] - Request/response wrappers and usage metering
//! - [`worker`] - Worker trait and execution primitives
//! - [`bridge`] - Adapter links between workers
//! - [`graphs`] - Flow graph definition and compilation
//! - [`app`] - Compiled graph and sequential executor
//! - [`auth`] - Credential requirements and providers
//! - [`forms`] - The concrete form-builder flow (designer + creator)
//! - [`telemetry`] - Tracing and diagnostics bootstrap

pub mod app;
pub mod auth;
pub mod bridge;
pub mod envelope;
pub mod forms;
pub mod graphs;
pub mod schema;
pub mod telemetry;
pub mod types;
pub mod worker;
