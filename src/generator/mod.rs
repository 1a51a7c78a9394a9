//! Application material drafting: tailored resume bullets and cover letters.

pub mod cover_letter;
pub mod llm;
pub mod prompts;
pub mod resume;

use anyhow::Result;

pub use cover_letter::cover_letter_draft;
pub use llm::{build_language_model, DraftModel, DynLanguageModel, LanguageModel};
pub use resume::tailor_resume_bullets;

/// Bullets plus a cover letter for one posting.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Materials {
    pub bullets: Vec<String>,
    pub cover_letter: String,
}

/// How many tailored bullets the cover letter weaves in.
pub const COVER_LETTER_HIGHLIGHTS: usize = 3;

pub async fn generate_materials(
    llm: &dyn LanguageModel,
    company: &str,
    role: &str,
    job_desc: &str,
    base_bullets: &[String],
) -> Result<Materials> {
    let bullets = tailor_resume_bullets(llm, role, job_desc, base_bullets).await?;
    let highlights = &bullets[..bullets.len().min(COVER_LETTER_HIGHLIGHTS)];
    let cover_letter = cover_letter_draft(llm, company, role, job_desc, highlights).await?;
    Ok(Materials {
        bullets,
        cover_letter,
    })
}
