//! Graph definition and compilation for pipeline execution.
//!
//! This module provides the core graph building functionality for wiring
//! workers and bridges into a flow. The main entry point is [`GraphBuilder`],
//! which uses a builder pattern to construct graphs that compile into
//! executable [`App`](crate::app::App) instances.
//!
//! # Core Concepts
//!
//! - **Nodes**: Executable units of work implementing the
//!   [`Worker`](crate::worker::Worker) trait, registered under a
//!   [`NodeId`](crate::types::NodeId)
//! - **Bridges**: Schema-to-schema adapters sitting on every edge
//!   ([`IdentityBridge`](crate::bridge::IdentityBridge) by default)
//! - **Entry/Exit**: The graph's designated start and end nodes
//! - **Compilation**: Eager validation and conversion to an executable
//!   [`App`](crate::app::App)
//!
//! # Quick Start
//!
//! ```
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
//! struct Trim;
//!
//! #[async_trait]
//! impl Worker for Trim {
//!     type Input = Text;
//!     type Output = Text;
//!
//!     fn name(&self) -> &'static str {
//!         "trim"
//!     }
//!
//!     async fn invoke(
//!         &self,
//!         req: Request<Text>,
//!         _ctx: &WorkerContext,
//!     ) -> Result<Response<Text>, WorkerError> {
//!         Ok(Response::new(Text {
//!             body: req.body.body.trim().to_string(),
//!         }))
//!     }
//! }
//!
//! // Build a linear flow: input -> trim
//! let app = GraphBuilder::new()
//!     .add_node("input", Holder::<Text>::new())
//!     .add_node("trim", Trim)
//!     .bridge("input", "trim", IdentityBridge)
//!     .set_entry_node("input")
//!     .set_exit_node("trim")
//!     .compile()
//!     .expect("valid graph");
//! ```

// Internal module declarations
mod builder;
mod compilation;

// Public re-exports
pub use builder::{EdgeSpec, GraphBuilder};
pub use compilation::GraphConfigurationError;
