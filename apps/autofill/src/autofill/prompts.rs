// Autofill LLM prompt templates.
// Placeholders in braces are substituted in one pass over the template;
// substituted text is never rescanned.

use serde::Serialize;

use crate::autofill::descriptor::FieldDescriptor;
use crate::models::profile::Profile;

pub const UNKNOWN_FIELDS_PROMPT: &str = r#"I need help filling out a job application form. Below are the fields I couldn't automatically identify,
and my profile information. For each field, determine what information from my profile should be used to fill it.

Form fields:
{fields}

My profile:
{profile}

For each field, provide a JSON object with the field identifier (label, name, or id) and the value to fill.
Format your response as a valid JSON array like this:
[
  {"identifier": "field_identifier", "value": "value_to_fill"},
  ...
]

Only include fields where you're confident about what information should be filled in.
Return only the JSON array without any additional text."#;

/// One line per unknown field: its best handle and its control type.
pub fn describe_fields<'a>(fields: impl IntoIterator<Item = &'a FieldDescriptor>) -> String {
    fields
        .into_iter()
        .map(|f| format!("Field: {}, Type: {}", f.display_name(), f.control_type))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The profile as a plain-text block. Education and experience are inlined
/// as JSON so the model sees every field of every entry. Never includes the
/// API credential.
pub fn describe_profile(profile: &Profile) -> String {
    let mut lines = vec![
        format!("Name: {}", profile.full_name()),
        format!("Email: {}", profile.email),
        format!("Phone: {}", profile.phone),
        format!(
            "Address: {}, {}, {} {}",
            profile.address, profile.city, profile.state, profile.zip_code
        ),
        format!("Education: {}", to_json(&profile.education)),
        format!("Experience: {}", to_json(&profile.experience)),
        format!("Skills: {}", profile.skills.join(", ")),
    ];
    if let Some(certifications) = &profile.certifications {
        lines.push(format!("Certifications: {}", certifications.join(", ")));
    }
    if let Some(languages) = &profile.languages {
        lines.push(format!("Languages: {}", languages.join(", ")));
    }
    lines.join("\n")
}

pub fn build_unknown_fields_prompt<'a>(
    fields: impl IntoIterator<Item = &'a FieldDescriptor>,
    profile: &Profile,
) -> String {
    let fields = describe_fields(fields);
    let profile = describe_profile(profile);
    fill_template(
        UNKNOWN_FIELDS_PROMPT,
        &[("{fields}", fields.as_str()), ("{profile}", profile.as_str())],
    )
}

fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match values.iter().find(|(key, _)| tail.starts_with(key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::Education;

    fn unknown(label: &str, name: &str, control_type: &str) -> FieldDescriptor {
        FieldDescriptor {
            label: label.to_string(),
            name: name.to_string(),
            control_type: control_type.to_string(),
            ..FieldDescriptor::default()
        }
    }

    #[test]
    fn test_fields_listed_with_best_handle() {
        let fields = [
            unknown("visa sponsorship", "q1", "select-one"),
            unknown("", "linkedin_url", "url"),
            unknown("", "", "text"),
        ];
        let text = describe_fields(&fields);
        assert_eq!(
            text,
            "Field: visa sponsorship, Type: select-one\n\
             Field: linkedin_url, Type: url\n\
             Field: Unnamed field, Type: text"
        );
    }

    #[test]
    fn test_profile_block_omits_missing_optionals_and_key() {
        let profile = Profile {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            education: vec![Education {
                degree: "BSc".to_string(),
                institution: "UCL".to_string(),
                year: "1835".to_string(),
            }],
            languages: Some(vec!["English".to_string(), "French".to_string()]),
            gemini_api_key: Some("secret".to_string()),
            ..Profile::default()
        };
        let block = describe_profile(&profile);
        assert!(block.contains("Name: Ada Lovelace"));
        assert!(block.contains(r#"Education: [{"degree":"BSc","institution":"UCL","year":"1835"}]"#));
        assert!(block.contains("Languages: English, French"));
        assert!(!block.contains("Certifications"));
        assert!(!block.contains("secret"));
    }

    #[test]
    fn test_prompt_has_no_unfilled_placeholders() {
        let fields = [unknown("portfolio", "", "url")];
        let prompt = build_unknown_fields_prompt(&fields, &Profile::default());
        assert!(prompt.contains("Field: portfolio, Type: url"));
        assert!(!prompt.contains("{fields}"));
        assert!(!prompt.contains("{profile}"));
        assert!(prompt.contains(r#"{"identifier": "field_identifier""#));
    }

    #[test]
    fn test_placeholder_text_in_fields_stays_literal() {
        let fields = [unknown("notes {profile}", "", "text")];
        let profile = Profile {
            email: "ada@example.com".to_string(),
            ..Profile::default()
        };
        let prompt = build_unknown_fields_prompt(&fields, &profile);
        assert_eq!(prompt.matches("ada@example.com").count(), 1);
        assert!(prompt.contains("Field: notes {profile}, Type: text"));
    }
}
