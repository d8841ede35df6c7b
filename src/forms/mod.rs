//! The form-builder flow: requirement in, live Google Form out.
//!
//! Domain leaves plugged into the core's worker/bridge interfaces:
//! [`QuestionnaireDesigner`] generates a structured design from a free-text
//! requirement, and [`GoogleFormCreator`] pushes that design to the Google
//! Forms API. [`form_builder_graph`] wires the concrete graph.
//!
//! ```text
//! requirement (Holder<DesignRequirement>)
//!     │ identity
//!     ▼
//! designer (QuestionnaireDesigner)    needs `openai/api_key`
//!     │ identity
//!     ▼
//! creator (GoogleFormCreator)         needs `google_forms/api_key`
//! ```

mod creator;
mod designer;
mod prompt;
mod schemas;

pub use creator::{CreatorConfig, GoogleFormCreator};
pub use designer::{DesignerConfig, QuestionnaireDesigner};
pub use schemas::{
    CreateFormResponse, DesignRequirement, FormsInfo, QuestionItem, QuestionnaireDesign,
};

use std::sync::Arc;

use crate::app::App;
use crate::auth::AuthProvider;
use crate::bridge::IdentityBridge;
use crate::graphs::{GraphBuilder, GraphConfigurationError};
use crate::worker::Holder;

/// Wires the form-builder graph with default endpoints.
///
/// There is no ambient registry: this explicit constructor is the one place
/// the concrete graph for this use case is instantiated.
pub fn form_builder_graph(
    auth: Arc<dyn AuthProvider>,
) -> Result<App, GraphConfigurationError> {
    form_builder_graph_with(auth, DesignerConfig::default(), CreatorConfig::default())
}

/// Wires the form-builder graph against specific endpoints.
///
/// Tests point both configs at a mock server; production callers rarely need
/// anything beyond [`form_builder_graph`].
pub fn form_builder_graph_with(
    auth: Arc<dyn AuthProvider>,
    designer: DesignerConfig,
    creator: CreatorConfig,
) -> Result<App, GraphConfigurationError> {
    GraphBuilder::new()
        .add_node("requirement", Holder::<DesignRequirement>::new())
        .add_node("designer", QuestionnaireDesigner::with_config(designer))
        .add_node("creator", GoogleFormCreator::with_config(creator))
        .bridge("requirement", "designer", IdentityBridge)
        .bridge("designer", "creator", IdentityBridge)
        .set_entry_node("requirement")
        .set_exit_node("creator")
        .with_auth(auth)
        .compile()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticAuthProvider;

    #[test]
    fn test_form_builder_graph_compiles() {
        let app = form_builder_graph(Arc::new(StaticAuthProvider::new())).unwrap();
        assert_eq!(app.entry_node().as_str(), "requirement");
        assert_eq!(app.exit_node().as_str(), "creator");
        assert_eq!(app.node_count(), 3);
    }
}
