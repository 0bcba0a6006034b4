// Prompt constants for resume import.

/// Resume extraction prompt. Replace `{resume_text}` before sending.
pub const RESUME_PARSE_PROMPT: &str = r#"Parse the following resume and extract the information in JSON format with these fields:
- firstName
- middleName (if available)
- lastName
- email
- phone
- address
- city
- state
- zipCode
- education (list with degree, institution, year)
- experience (list with title, company, duration, description)
- skills (list)
- certifications (list if available)
- languages (list if available)

Resume text:
{resume_text}

Return only the JSON object without any additional text."#;

pub fn build_resume_prompt(resume_text: &str) -> String {
    RESUME_PARSE_PROMPT.replace("{resume_text}", resume_text)
}
