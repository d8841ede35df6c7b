//! Prompt templates for the questionnaire designer.

/// System prompt establishing the designer's contract.
///
/// The reply must be a single JSON object so it can be parsed straight into
/// a [`QuestionnaireDesign`](super::schemas::QuestionnaireDesign).
pub(crate) const DESIGNER_SYSTEM_PROMPT: &str = "\
You are a questionnaire designer. Based on the user's requirement, design the \
questionnaire's title, description, and every question with its choices.

Every question must be a choice question; use the `is_multiple_choice` flag to \
mark whether a question is single-choice or multi-choice.

The questionnaire must be complete and directly usable as-is. It needs at \
least one question; there is no upper limit. What matters is matching the \
user's requirement precisely.

Reply with a single JSON object and nothing else, with this shape:
{
  \"title\": string,
  \"description\": string,
  \"items\": [
    {
      \"index\": integer starting from 0 in presentation order,
      \"is_multiple_choice\": boolean,
      \"question_body\": string,
      \"choices\": [string, ...]
    }
  ]
}";

/// User prompt carrying the raw requirement.
pub(crate) fn designer_user_prompt(user_requirement: &str) -> String {
    format!(
        "[User requirement]\n{user_requirement}\n\n[Your questionnaire design]"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_prompt_embeds_requirement() {
        let prompt = designer_user_prompt("survey lunch preferences");
        assert!(prompt.contains("survey lunch preferences"));
    }
}
