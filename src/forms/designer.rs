//! Questionnaire designer worker.
//!
//! Turns a [`DesignRequirement`] into a [`QuestionnaireDesign`] through one
//! JSON-mode chat completion against an OpenAI-compatible endpoint. The reply
//! is parsed and schema-validated before it leaves this stage; a reply that
//! yields no parseable design (malformed JSON, a schema mismatch, or an
//! empty item list) is a fatal [`WorkerError::GenerationParse`] for the
//! stage, with no local repair attempted.

use async_trait::async_trait;
use serde_json::{Value, json};

use super::prompt::{DESIGNER_SYSTEM_PROMPT, designer_user_prompt};
use super::schemas::{DesignRequirement, QuestionnaireDesign};
use crate::auth::AuthRequirement;
use crate::envelope::{LlmUsage, Request, Response};
use crate::schema::Schema;
use crate::worker::{Worker, WorkerContext, WorkerError};

const INTEGRATION: &str = "openai";
const SECRET: &str = "api_key";
const OPERATION: &str = "chat.completions";

/// Configuration for the designer's generation endpoint.
#[derive(Clone, Debug)]
pub struct DesignerConfig {
    /// Model requested for the completion.
    pub model: String,
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,
}

impl Default for DesignerConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }
}

/// Produces a high-quality, detailed questionnaire design from the user's
/// requirement.
///
/// The output design is format-agnostic; exporting it to a concrete form
/// backend is a downstream worker's job (see
/// [`GoogleFormCreator`](super::creator::GoogleFormCreator)).
pub struct QuestionnaireDesigner {
    config: DesignerConfig,
    client: reqwest::Client,
}

impl QuestionnaireDesigner {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DesignerConfig::default())
    }

    #[must_use]
    pub fn with_config(config: DesignerConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Extracts and validates the design from a completion body.
    fn parse_design(
        &self,
        body: &Value,
        ctx: &WorkerContext,
    ) -> Result<QuestionnaireDesign, WorkerError> {
        let content = body
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(Value::as_str)
            .ok_or_else(|| WorkerError::GenerationParse {
                detail: "completion carried no message content".to_string(),
            })?;

        let raw: Value =
            serde_json::from_str(content).map_err(|e| WorkerError::GenerationParse {
                detail: format!("reply is not valid JSON: {e}"),
            })?;
        let design = QuestionnaireDesign::validate(&raw, ctx.validation).map_err(|e| {
            WorkerError::GenerationParse {
                detail: e.to_string(),
            }
        })?;
        if design.items.is_empty() {
            return Err(WorkerError::GenerationParse {
                detail: "design contains no items".to_string(),
            });
        }
        Ok(design)
    }
}

impl Default for QuestionnaireDesigner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Worker for QuestionnaireDesigner {
    type Input = DesignRequirement;
    type Output = QuestionnaireDesign;

    fn name(&self) -> &'static str {
        "questionnaire_designer"
    }

    fn auth_requirement(&self) -> Option<AuthRequirement> {
        Some(AuthRequirement::required(INTEGRATION, SECRET))
    }

    async fn invoke(
        &self,
        req: Request<DesignRequirement>,
        ctx: &WorkerContext,
    ) -> Result<Response<QuestionnaireDesign>, WorkerError> {
        let token = ctx.auth.get(INTEGRATION, SECRET, true)?.ok_or_else(|| {
            crate::auth::AuthError::MissingCredential {
                integration: INTEGRATION.to_string(),
                secret: SECRET.to_string(),
            }
        })?;

        let payload = json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": DESIGNER_SYSTEM_PROMPT},
                {"role": "user", "content": designer_user_prompt(&req.body.user_requirement)},
            ],
            "response_format": {"type": "json_object"},
        });

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(token.expose())
            .json(&payload)
            .send()
            .await
            .map_err(|e| WorkerError::remote(OPERATION, e.to_string(), Value::Null))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| WorkerError::remote(OPERATION, e.to_string(), Value::Null))?;
        if !status.is_success() {
            return Err(WorkerError::remote(
                OPERATION,
                format!("status {status}: {text}"),
                Value::Null,
            ));
        }

        let body: Value =
            serde_json::from_str(&text).map_err(|e| WorkerError::GenerationParse {
                detail: format!("completion body is not valid JSON: {e}"),
            })?;
        let design = self.parse_design(&body, ctx)?;
        tracing::info!(
            run = %ctx.run_id,
            title = %design.title,
            items = design.items.len(),
            "questionnaire design generated"
        );

        let mut resp = Response::new(design);
        if let Some(usage) = LlmUsage::from_chat_completion(&body) {
            resp.add_usage(usage);
        }
        Ok(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticAuthProvider;
    use crate::schema::ValidationMode;
    use std::sync::Arc;

    fn ctx() -> WorkerContext {
        WorkerContext {
            node_id: "designer".into(),
            run_id: "run-0".into(),
            auth: Arc::new(StaticAuthProvider::new()),
            validation: ValidationMode::Lenient,
        }
    }

    fn completion_with_content(content: &str) -> Value {
        json!({
            "model": "gpt-4o-mini",
            "choices": [{"message": {"role": "assistant", "content": content}}],
        })
    }

    #[test]
    fn test_parse_design_accepts_valid_reply() {
        let content = r#"{"title":"T","description":"D","items":[
            {"index":0,"is_multiple_choice":false,"question_body":"Q","choices":["a","b"]}
        ]}"#;
        let designer = QuestionnaireDesigner::new();
        let design = designer
            .parse_design(&completion_with_content(content), &ctx())
            .unwrap();
        assert_eq!(design.items.len(), 1);
    }

    #[test]
    fn test_parse_design_rejects_invalid_json() {
        let designer = QuestionnaireDesigner::new();
        let err = designer
            .parse_design(&completion_with_content("not json"), &ctx())
            .unwrap_err();
        assert!(matches!(err, WorkerError::GenerationParse { .. }));
    }

    #[test]
    fn test_parse_design_rejects_schema_mismatch() {
        let designer = QuestionnaireDesigner::new();
        let err = designer
            .parse_design(&completion_with_content(r#"{"title":"T"}"#), &ctx())
            .unwrap_err();
        assert!(matches!(err, WorkerError::GenerationParse { .. }));
    }

    #[test]
    fn test_parse_design_rejects_empty_items() {
        let content = r#"{"title":"T","description":"D","items":[]}"#;
        let designer = QuestionnaireDesigner::new();
        let err = designer
            .parse_design(&completion_with_content(content), &ctx())
            .unwrap_err();
        assert!(
            matches!(err, WorkerError::GenerationParse { detail } if detail.contains("no items"))
        );
    }

    #[test]
    fn test_parse_design_rejects_missing_content() {
        let designer = QuestionnaireDesigner::new();
        let err = designer
            .parse_design(&json!({"choices": []}), &ctx())
            .unwrap_err();
        assert!(matches!(err, WorkerError::GenerationParse { .. }));
    }
}
