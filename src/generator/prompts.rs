// Prompt constants for resume and cover letter drafting.

/// Framing prepended to every resume-bullet prompt.
pub const RESUME_SYSTEM: &str = "You write concise, impact-oriented resume bullets using STAR framing. \
    Optimize for ATS keywords and clarity.";

/// Resume prompt. Replace `{system}`, `{role}`, `{job_desc}`, `{bullets}` before sending.
pub const RESUME_PROMPT_TEMPLATE: &str = "System: {system}

Role: {role}
Job Description:
{job_desc}

Base bullets:
- {bullets}

Rewrite 4-5 bullets that best match the role. Keep each bullet under 25 words.
Use strong verbs and quantify impact.
";

/// Cover letter prompt. Replace `{role}`, `{company}`, `{highlights}`, `{job_desc}` before sending.
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = "Write a 250-300 word cover letter for {role} at {company}.
Weave in these highlights: {highlights}.
Mirror the language of this job description:
{job_desc}
Keep tone: enthusiastic, concrete, professional. No fluff.
";
