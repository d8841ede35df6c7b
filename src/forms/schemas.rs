//! Schema types flowing through the form-builder pipeline.
//!
//! Three values travel the graph: the user's raw [`DesignRequirement`], the
//! generated [`QuestionnaireDesign`], and the [`CreateFormResponse`] receipt
//! returned by the Google Forms API. The design knows how to render its own
//! wire representation for the Forms API, but performing the calls is the
//! creator worker's job, not the data's.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::schema::Schema;

/// The user requirement a questionnaire design starts from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignRequirement {
    /// Free-text requirement on the form design.
    pub user_requirement: String,
}

impl Schema for DesignRequirement {
    fn name() -> &'static str {
        "DesignRequirement"
    }

    fn examples() -> Vec<Value> {
        vec![json!({
            "user_requirement": "Plan a class reunion: which evening between \
                Oct 1 and Oct 7 works for everyone, and are there dietary \
                restrictions or preferences?"
        })]
    }
}

/// A single question in a form design.
///
/// Every question is a choice question; `is_multiple_choice` selects between
/// single-choice (`RADIO`) and multi-choice (`CHECKBOX`) rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionItem {
    /// Position of the item, starting from 0, in presentation order.
    pub index: u32,
    /// Whether respondents may pick several choices.
    pub is_multiple_choice: bool,
    /// The question body.
    pub question_body: String,
    /// The choices for the question.
    pub choices: Vec<String>,
}

impl QuestionItem {
    /// Forms API question type for this item.
    #[must_use]
    pub fn question_type(&self) -> &'static str {
        if self.is_multiple_choice {
            "CHECKBOX"
        } else {
            "RADIO"
        }
    }

    /// Renders this item as one `createItem` request for
    /// `forms.batchUpdate`.
    ///
    /// Every generated question is required, choices keep their order, and
    /// shuffling is off; the insertion index matches the item's declared
    /// position.
    #[must_use]
    pub fn to_create_item_request(&self) -> Value {
        json!({
            "createItem": {
                "item": {
                    "title": self.question_body,
                    "questionItem": {
                        "question": {
                            "required": true,
                            "choiceQuestion": {
                                "type": self.question_type(),
                                "options": self
                                    .choices
                                    .iter()
                                    .map(|choice| json!({"value": choice}))
                                    .collect::<Vec<_>>(),
                                "shuffle": false,
                            },
                        },
                    },
                },
                "location": {"index": self.index},
            },
        })
    }
}

/// The generated design of a questionnaire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionnaireDesign {
    /// Title of the form.
    pub title: String,
    /// Description covering the background and purpose of the form.
    pub description: String,
    /// The body of the form; one entry per question, in presentation order.
    pub items: Vec<QuestionItem>,
}

impl Schema for QuestionnaireDesign {
    fn name() -> &'static str {
        "QuestionnaireDesign"
    }
}

impl QuestionnaireDesign {
    /// Request body for the `forms.create` call.
    #[must_use]
    pub fn create_body(&self) -> Value {
        json!({
            "info": {
                "title": self.title,
                "documentTitle": self.title,
            },
        })
    }

    /// Request body for the `forms.batchUpdate` call: one `createItem`
    /// request per design item.
    #[must_use]
    pub fn batch_update_body(&self) -> Value {
        json!({
            "requests": self
                .items
                .iter()
                .map(QuestionItem::to_create_item_request)
                .collect::<Vec<_>>(),
        })
    }
}

/// Basic information block of a Google Form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormsInfo {
    /// Title of the form.
    pub title: String,
    /// Document title of the form on Google Drive.
    pub document_title: String,
}

/// The API response of creating a Google Form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFormResponse {
    pub form_id: String,
    pub info: FormsInfo,
    /// Form settings as returned by the API; carried opaquely.
    #[serde(default)]
    pub settings: Value,
    pub revision_id: String,
    pub responder_uri: String,
}

impl Schema for CreateFormResponse {
    fn name() -> &'static str {
        "CreateFormResponse"
    }
}

impl CreateFormResponse {
    /// Link for editing the created form.
    #[must_use]
    pub fn edit_url(&self) -> String {
        format!("https://docs.google.com/forms/d/{}/edit", self.form_id)
    }

    /// Link respondents fill the form in at: the API's `responderUri`,
    /// unchanged.
    #[must_use]
    pub fn respond_url(&self) -> &str {
        &self.responder_uri
    }
}
