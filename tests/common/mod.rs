//! Shared fixtures for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, Mutex};

use formweaver::auth::StaticAuthProvider;
use formweaver::envelope::{LlmUsage, Request, Response};
use formweaver::schema::{Schema, ValidationMode};
use formweaver::worker::{Worker, WorkerContext, WorkerError};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub body: String,
}

impl Schema for Text {
    fn name() -> &'static str {
        "Text"
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Renamed {
    pub text: String,
}

impl Schema for Renamed {
    fn name() -> &'static str {
        "Renamed"
    }
}

/// Appends its tag to the payload and records itself on a shared trace, so
/// tests can assert execution order.
pub struct Tagger {
    pub tag: &'static str,
    pub trace: Arc<Mutex<Vec<&'static str>>>,
}

#[async_trait]
impl Worker for Tagger {
    type Input = Text;
    type Output = Text;

    fn name(&self) -> &'static str {
        "tagger"
    }

    async fn invoke(
        &self,
        req: Request<Text>,
        _ctx: &WorkerContext,
    ) -> Result<Response<Text>, WorkerError> {
        self.trace.lock().unwrap().push(self.tag);
        Ok(Response::new(Text {
            body: format!("{}+{}", req.body.body, self.tag),
        }))
    }
}

/// Fails with a remote-call error without performing any I/O.
pub struct Exploding;

#[async_trait]
impl Worker for Exploding {
    type Input = Text;
    type Output = Text;

    fn name(&self) -> &'static str {
        "exploding"
    }

    async fn invoke(
        &self,
        _req: Request<Text>,
        _ctx: &WorkerContext,
    ) -> Result<Response<Text>, WorkerError> {
        Err(WorkerError::remote("test.op", "boom", Value::Null))
    }
}

/// Passes its input through and records fixed usage on the response.
pub struct Metered {
    pub tokens: u32,
}

#[async_trait]
impl Worker for Metered {
    type Input = Text;
    type Output = Text;

    fn name(&self) -> &'static str {
        "metered"
    }

    async fn invoke(
        &self,
        req: Request<Text>,
        _ctx: &WorkerContext,
    ) -> Result<Response<Text>, WorkerError> {
        Ok(Response::new(req.body).with_usage(LlmUsage {
            model: "test-model".to_string(),
            prompt_tokens: self.tokens,
            completion_tokens: 0,
            total_tokens: self.tokens,
        }))
    }
}

/// Consumes a [`Renamed`] payload, proving a field-map bridge ran.
pub struct TakesRenamed;

#[async_trait]
impl Worker for TakesRenamed {
    type Input = Renamed;
    type Output = Renamed;

    fn name(&self) -> &'static str {
        "takes_renamed"
    }

    async fn invoke(
        &self,
        req: Request<Renamed>,
        _ctx: &WorkerContext,
    ) -> Result<Response<Renamed>, WorkerError> {
        Ok(Response::new(req.body))
    }
}

pub fn test_context(node: &str) -> WorkerContext {
    WorkerContext {
        node_id: node.into(),
        run_id: "test-run".to_string(),
        auth: Arc::new(StaticAuthProvider::new()),
        validation: ValidationMode::Lenient,
    }
}
