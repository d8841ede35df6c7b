//! Build a Google Form from a free-text requirement.
//!
//! Credentials come from the environment (or a `.env` file):
//! - `OPENAI_API_KEY` for the questionnaire designer
//! - `GOOGLE_FORMS_API_KEY` for the form creator (an OAuth access token with
//!   the forms scope)
//!
//! Running This Demo:
//! ```bash
//! cargo run --example build_form -- "survey availability for a team offsite"
//! ```

use miette::Result;
use std::sync::Arc;
use tracing::info;

use formweaver::auth::EnvAuthProvider;
use formweaver::forms::{CreateFormResponse, DesignRequirement, form_builder_graph};
use formweaver::telemetry::{init_miette, init_tracing};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    init_miette();

    let user_requirement = std::env::args().nth(1).unwrap_or_else(|| {
        "Plan a class reunion: which evening between Oct 1 and Oct 7 works \
         for everyone, and are there dietary restrictions or preferences?"
            .to_string()
    });
    info!(%user_requirement, "building form");

    let app = form_builder_graph(Arc::new(EnvAuthProvider::from_dotenv()))?;
    let outcome = app
        .invoke(DesignRequirement { user_requirement })
        .await?;
    let receipt: CreateFormResponse = outcome.decode()?;

    println!("Form created: {}", receipt.info.title);
    println!("  edit:    {}", receipt.edit_url());
    println!("  respond: {}", receipt.respond_url());
    for usage in &outcome.usage {
        println!(
            "  usage:   {} tokens ({} prompt / {} completion) on {}",
            usage.total_tokens, usage.prompt_tokens, usage.completion_tokens, usage.model
        );
    }

    Ok(())
}
