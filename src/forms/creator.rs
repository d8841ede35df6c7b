//! Google Form creator worker.
//!
//! Execution worker that turns a [`QuestionnaireDesign`] into a real Google
//! Form through two sequential Forms API calls: `forms.create` builds the
//! form shell, then `forms.batchUpdate` appends one `createItem` request per
//! design item.
//!
//! The two calls are deliberately not atomic. When the shell is created but
//! the batch update fails, the shell already exists remotely and is NOT
//! rolled back; the returned [`WorkerError::RemoteCall`] names the failing
//! operation and carries the created form's id and edit link in its context,
//! so a caller retrying the run knows a duplicate shell would result.

use async_trait::async_trait;
use serde_json::{Value, json};

use super::schemas::{CreateFormResponse, QuestionnaireDesign};
use crate::auth::{AuthError, AuthRequirement, Secret};
use crate::envelope::{Request, Response};
use crate::schema::{Schema, ValidationMode};
use crate::worker::{Worker, WorkerContext, WorkerError};

const INTEGRATION: &str = "google_forms";
const SECRET: &str = "api_key";
const OP_CREATE: &str = "forms.create";
const OP_BATCH_UPDATE: &str = "forms.batchUpdate";

/// Configuration for the Forms API endpoint.
#[derive(Clone, Debug)]
pub struct CreatorConfig {
    /// Base URL of the Google Forms API.
    pub base_url: String,
}

impl Default for CreatorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://forms.googleapis.com".to_string(),
        }
    }
}

/// Execution worker that pushes a questionnaire design to Google Forms.
pub struct GoogleFormCreator {
    config: CreatorConfig,
    client: reqwest::Client,
}

impl GoogleFormCreator {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(CreatorConfig::default())
    }

    #[must_use]
    pub fn with_config(config: CreatorConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn forms_url(&self) -> String {
        format!("{}/v1/forms", self.config.base_url.trim_end_matches('/'))
    }

    fn batch_update_url(&self, form_id: &str) -> String {
        format!(
            "{}/v1/forms/{form_id}:batchUpdate",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// One POST with bearer auth; returns the response text on 2xx and a
    /// `RemoteCall` error naming `operation` otherwise.
    async fn post(
        &self,
        operation: &str,
        url: String,
        token: &Secret,
        body: &Value,
        error_context: Value,
    ) -> Result<String, WorkerError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(token.expose())
            .json(body)
            .send()
            .await
            .map_err(|e| WorkerError::remote(operation, e.to_string(), error_context.clone()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| WorkerError::remote(operation, e.to_string(), error_context.clone()))?;
        if !status.is_success() {
            return Err(WorkerError::remote(
                operation,
                format!("status {status}: {text}"),
                error_context,
            ));
        }
        Ok(text)
    }
}

impl Default for GoogleFormCreator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Worker for GoogleFormCreator {
    type Input = QuestionnaireDesign;
    type Output = CreateFormResponse;

    fn name(&self) -> &'static str {
        "google_form_creator"
    }

    fn auth_requirement(&self) -> Option<AuthRequirement> {
        Some(AuthRequirement::required(INTEGRATION, SECRET))
    }

    async fn invoke(
        &self,
        req: Request<QuestionnaireDesign>,
        ctx: &WorkerContext,
    ) -> Result<Response<CreateFormResponse>, WorkerError> {
        let design = req.body;
        let token = ctx.auth.get(INTEGRATION, SECRET, true)?.ok_or_else(|| {
            AuthError::MissingCredential {
                integration: INTEGRATION.to_string(),
                secret: SECRET.to_string(),
            }
        })?;

        let create_body = design.create_body();
        let text = self
            .post(
                OP_CREATE,
                self.forms_url(),
                &token,
                &create_body,
                json!({"requestBody": create_body.clone()}),
            )
            .await?;
        let raw: Value = serde_json::from_str(&text).map_err(|e| {
            WorkerError::remote(
                OP_CREATE,
                format!("unparseable response: {e}"),
                Value::Null,
            )
        })?;
        let created = CreateFormResponse::validate(&raw, ValidationMode::Lenient).map_err(|e| {
            WorkerError::remote(OP_CREATE, format!("unexpected response shape: {e}"), raw.clone())
        })?;
        tracing::info!(
            run = %ctx.run_id,
            form_id = %created.form_id,
            "form shell created, appending {} items",
            design.items.len()
        );

        // The shell now exists remotely. A failure past this point must keep
        // the created form diagnosable for the caller.
        self.post(
            OP_BATCH_UPDATE,
            self.batch_update_url(&created.form_id),
            &token,
            &design.batch_update_body(),
            json!({
                "formId": created.form_id.clone(),
                "editUrl": created.edit_url(),
            }),
        )
        .await?;

        tracing::info!(
            run = %ctx.run_id,
            form_id = %created.form_id,
            respond_url = %created.respond_url(),
            edit_url = %created.edit_url(),
            "form created successfully"
        );
        Ok(Response::new(created))
    }
}
