use anyhow::Result;

use super::llm::LanguageModel;
use super::prompts::{RESUME_PROMPT_TEMPLATE, RESUME_SYSTEM};

pub fn resume_prompt(role: &str, job_desc: &str, base_bullets: &[String]) -> String {
    RESUME_PROMPT_TEMPLATE
        .replace("{system}", RESUME_SYSTEM)
        .replace("{role}", role)
        .replace("{job_desc}", job_desc)
        .replace("{bullets}", &base_bullets.join("\n- "))
}

/// Keep dash-prefixed lines, stripped of their leading/trailing dash and space markers.
pub fn parse_bullets(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| line.trim().starts_with('-'))
        .map(|line| line.trim().trim_matches(|c| c == '-' || c == ' ').to_string())
        .filter(|b| !b.is_empty())
        .collect()
}

/// Ask the model for bullets tailored to a posting.
pub async fn tailor_resume_bullets(
    llm: &dyn LanguageModel,
    role: &str,
    job_desc: &str,
    base_bullets: &[String],
) -> Result<Vec<String>> {
    let prompt = resume_prompt(role, job_desc, base_bullets);
    let output = llm.complete(&prompt).await?;
    let bullets = parse_bullets(&output);
    tracing::debug!(provider = llm.name(), count = bullets.len(), "resume bullets drafted");
    Ok(bullets)
}
