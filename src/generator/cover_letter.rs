use anyhow::Result;

use super::llm::LanguageModel;
use super::prompts::COVER_LETTER_PROMPT_TEMPLATE;

pub fn cover_letter_prompt(company: &str, role: &str, job_desc: &str, highlights: &[String]) -> String {
    COVER_LETTER_PROMPT_TEMPLATE
        .replace("{role}", role)
        .replace("{company}", company)
        .replace("{highlights}", &highlights.join("; "))
        .replace("{job_desc}", job_desc)
}

/// The completion is returned verbatim.
pub async fn cover_letter_draft(
    llm: &dyn LanguageModel,
    company: &str,
    role: &str,
    job_desc: &str,
    highlights: &[String],
) -> Result<String> {
    llm.complete(&cover_letter_prompt(company, role, job_desc, highlights))
        .await
}
