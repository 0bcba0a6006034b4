//! AI fallback: asks the generative-text API about fields no rule claimed.
//!
//! Failure policy is fire-and-forget: any network, status or parse problem
//! is logged and the pass continues with whatever the heuristics filled.

use tracing::{error, info, warn};

use crate::autofill::descriptor::FieldDescriptor;
use crate::autofill::executor::apply_value;
use crate::autofill::prompts::build_unknown_fields_prompt;
use crate::autofill::suggestions::{parse_suggestions, Suggestion};
use crate::dom::{Document, NodeId};
use crate::llm_client::{LlmError, TextGenerator};
use crate::models::profile::Profile;

/// A control no heuristic rule matched.
#[derive(Debug, Clone)]
pub struct UnknownField {
    pub node: NodeId,
    pub descriptor: FieldDescriptor,
}

/// What the resolver did during one pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AiOutcome {
    /// True once a request was issued, whatever its result.
    pub attempted: bool,
    /// Indexes into the unknown list that received a value, ascending.
    pub filled: Vec<usize>,
}

/// Index of the first unknown field whose label, name or id contains
/// `identifier` (case-insensitive). No scoring: first hit wins.
pub fn find_matching_field(unknown: &[UnknownField], identifier: &str) -> Option<usize> {
    let needle = identifier.to_lowercase();
    unknown.iter().position(|field| {
        let d = &field.descriptor;
        [&d.label, &d.name, &d.id]
            .into_iter()
            .any(|s| !s.is_empty() && s.to_lowercase().contains(&needle))
    })
}

/// Pairs each suggestion with the unknown field it lands on. Suggestions
/// that match nothing are dropped.
pub fn match_suggestions<'a>(
    unknown: &[UnknownField],
    suggestions: &'a [Suggestion],
) -> Vec<(usize, &'a str)> {
    suggestions
        .iter()
        .filter_map(|s| match find_matching_field(unknown, &s.identifier) {
            Some(index) => Some((index, s.value.as_str())),
            None => {
                info!("Dropping AI suggestion with no matching field: {}", s.identifier);
                None
            }
        })
        .collect()
}

/// Runs the fallback if it is enabled, there is something to resolve and a
/// credential is present. Otherwise returns without any network call.
pub async fn resolve_unknown_fields(
    doc: &mut Document,
    unknown: &[UnknownField],
    profile: &Profile,
    use_ai: bool,
    generator: &dyn TextGenerator,
) -> AiOutcome {
    let api_key = match profile.api_key() {
        Some(key) if use_ai && !unknown.is_empty() => key,
        _ => return AiOutcome::default(),
    };

    let prompt = build_unknown_fields_prompt(unknown.iter().map(|f| &f.descriptor), profile);
    info!("Asking AI about {} unknown field(s)", unknown.len());

    let text = match generator.generate(api_key, &prompt).await {
        Ok(text) => text,
        Err(LlmError::Api { status, message }) => {
            error!("AI request failed with status {status}: {message}");
            return AiOutcome {
                attempted: true,
                filled: Vec::new(),
            };
        }
        Err(e) => {
            error!("Error using AI to fill unknown fields: {e}");
            return AiOutcome {
                attempted: true,
                filled: Vec::new(),
            };
        }
    };

    let suggestions = match parse_suggestions(&text) {
        Ok(suggestions) => suggestions,
        Err(e) => {
            warn!("Could not read AI suggestions: {e}");
            return AiOutcome {
                attempted: true,
                filled: Vec::new(),
            };
        }
    };

    let mut filled = Vec::new();
    for (index, value) in match_suggestions(unknown, &suggestions) {
        let written = apply_value(&mut doc.control(unknown[index].node), value);
        // a select rejects values none of its options carry
        if written.is_empty() {
            info!(
                "AI value for '{}' was not accepted by the control",
                unknown[index].descriptor.display_name()
            );
            continue;
        }
        filled.push(index);
    }
    filled.sort_unstable();
    filled.dedup();

    info!(
        "AI filled {} of {} unknown field(s)",
        filled.len(),
        unknown.len()
    );
    AiOutcome {
        attempted: true,
        filled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autofill::descriptor::extract_descriptor;
    use crate::autofill::testing::FakeGenerator;

    fn unknown_fields(doc: &Document) -> Vec<UnknownField> {
        doc.form_controls()
            .into_iter()
            .map(|node| UnknownField {
                node,
                descriptor: extract_descriptor(doc, node),
            })
            .collect()
    }

    fn profile_with_key() -> Profile {
        Profile {
            first_name: "Ada".to_string(),
            gemini_api_key: Some("k-123".to_string()),
            ..Profile::default()
        }
    }

    const FORM: &str = r#"<input name="phone-2-alt"><input name="Portfolio" id="site"><input id="visa">"#;

    #[test]
    fn test_substring_match_on_name() {
        let doc = Document::parse(FORM);
        let unknown = unknown_fields(&doc);
        assert_eq!(find_matching_field(&unknown, "Phone-2"), Some(0));
        assert_eq!(find_matching_field(&unknown, "portfolio"), Some(1));
        assert_eq!(find_matching_field(&unknown, "SITE"), Some(1));
        assert_eq!(find_matching_field(&unknown, "salary"), None);
    }

    #[test]
    fn test_first_match_wins() {
        let doc = Document::parse(r#"<input name="ref-1"><input name="ref-2">"#);
        let unknown = unknown_fields(&doc);
        assert_eq!(find_matching_field(&unknown, "ref"), Some(0));
    }

    #[test]
    fn test_unmatched_suggestions_dropped() {
        let doc = Document::parse(FORM);
        let unknown = unknown_fields(&doc);
        let suggestions = vec![
            Suggestion {
                identifier: "nope".to_string(),
                value: "x".to_string(),
            },
            Suggestion {
                identifier: "visa".to_string(),
                value: "No".to_string(),
            },
        ];
        assert_eq!(match_suggestions(&unknown, &suggestions), vec![(2, "No")]);
    }

    #[tokio::test]
    async fn test_disabled_ai_makes_no_call() {
        let mut doc = Document::parse(FORM);
        let unknown = unknown_fields(&doc);
        let generator = FakeGenerator::replying("[]");

        let outcome =
            resolve_unknown_fields(&mut doc, &unknown, &profile_with_key(), false, &generator)
                .await;

        assert_eq!(outcome, AiOutcome::default());
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_key_makes_no_call() {
        let mut doc = Document::parse(FORM);
        let unknown = unknown_fields(&doc);
        let generator = FakeGenerator::replying("[]");
        let profile = Profile {
            gemini_api_key: None,
            ..profile_with_key()
        };

        let outcome = resolve_unknown_fields(&mut doc, &unknown, &profile, true, &generator).await;

        assert!(!outcome.attempted);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_no_unknown_fields_makes_no_call() {
        let mut doc = Document::parse(FORM);
        let generator = FakeGenerator::replying("[]");

        let outcome =
            resolve_unknown_fields(&mut doc, &[], &profile_with_key(), true, &generator).await;

        assert!(!outcome.attempted);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_applies_matching_suggestions() {
        let mut doc = Document::parse(FORM);
        let unknown = unknown_fields(&doc);
        let generator = FakeGenerator::replying(
            "```json\n[{\"identifier\": \"phone-2\", \"value\": \"555-0199\"}, {\"identifier\": \"github\", \"value\": \"ada\"}]\n```",
        );

        let outcome =
            resolve_unknown_fields(&mut doc, &unknown, &profile_with_key(), true, &generator)
                .await;

        assert!(outcome.attempted);
        assert_eq!(outcome.filled, vec![0]);
        assert_eq!(doc.control_value(unknown[0].node), "555-0199");
        assert_eq!(doc.control_value(unknown[1].node), "");
        assert_eq!(doc.events().len(), 2);
        assert_eq!(generator.last_key().as_deref(), Some("k-123"));
        assert!(generator
            .last_prompt()
            .unwrap()
            .contains("Field: phone-2-alt, Type: text"));
    }

    #[tokio::test]
    async fn test_select_rejecting_suggestion_is_not_filled() {
        let mut doc = Document::parse(
            r#"<label for="visa">Visa sponsorship needed</label><select id="visa"><option value="y">Yes</option><option value="n">No</option></select>"#,
        );
        let unknown = unknown_fields(&doc);
        let generator = FakeGenerator::replying(r#"[{"identifier": "visa", "value": "No"}]"#);

        let outcome =
            resolve_unknown_fields(&mut doc, &unknown, &profile_with_key(), true, &generator)
                .await;

        assert!(outcome.attempted);
        assert!(outcome.filled.is_empty());
        assert_eq!(doc.control_value(unknown[0].node), "");
    }

    #[tokio::test]
    async fn test_select_accepts_option_value_suggestion() {
        let mut doc = Document::parse(
            r#"<label for="visa">Visa sponsorship needed</label><select id="visa"><option value="y">Yes</option><option value="n">No</option></select>"#,
        );
        let unknown = unknown_fields(&doc);
        let generator = FakeGenerator::replying(r#"[{"identifier": "visa", "value": "n"}]"#);

        let outcome =
            resolve_unknown_fields(&mut doc, &unknown, &profile_with_key(), true, &generator)
                .await;

        assert_eq!(outcome.filled, vec![0]);
        let reparsed = Document::parse(&doc.to_html());
        assert_eq!(reparsed.control_value(reparsed.form_controls()[0]), "n");
    }

    #[tokio::test]
    async fn test_api_failure_leaves_fields_blank() {
        let mut doc = Document::parse(FORM);
        let unknown = unknown_fields(&doc);
        let generator = FakeGenerator::failing(403);

        let outcome =
            resolve_unknown_fields(&mut doc, &unknown, &profile_with_key(), true, &generator)
                .await;

        assert!(outcome.attempted);
        assert!(outcome.filled.is_empty());
        assert!(doc.events().is_empty());
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_unparseable_reply_fills_nothing() {
        let mut doc = Document::parse(FORM);
        let unknown = unknown_fields(&doc);
        let generator = FakeGenerator::replying("I'm not sure what these fields are.");

        let outcome =
            resolve_unknown_fields(&mut doc, &unknown, &profile_with_key(), true, &generator)
                .await;

        assert!(outcome.attempted);
        assert!(outcome.filled.is_empty());
        assert!(doc.events().is_empty());
    }
}
