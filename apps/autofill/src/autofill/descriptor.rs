//! Field descriptor extraction: the identifying strings a control is classified by.

use serde::Serialize;

use crate::dom::{Document, NodeId};

/// Input types the engine never touches.
pub const SKIPPED_TYPES: &[&str] = &["hidden", "submit", "button", "file"];

/// Elements whose text may label the control that directly follows them.
const PRECEDING_LABEL_TAGS: &[&str] = &["label", "span", "div"];

/// Elements searched for stray label text inside the enclosing `div`.
const NEARBY_TEXT_TAGS: &[&str] = &["div", "span", "p"];

/// Lowercased identifying strings for one control. Lives for one fill pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub id: String,
    pub name: String,
    pub label: String,
    pub placeholder: String,
    #[serde(rename = "type")]
    pub control_type: String,
}

impl FieldDescriptor {
    /// The strings classifier patterns are tested against, in priority order.
    pub fn candidates(&self) -> [&str; 4] {
        [
            self.id.as_str(),
            self.name.as_str(),
            self.label.as_str(),
            self.placeholder.as_str(),
        ]
    }

    /// Best human-readable handle for the field: label, then name, then id.
    pub fn display_name(&self) -> &str {
        [&self.label, &self.name, &self.id]
            .into_iter()
            .find(|s| !s.is_empty())
            .map(String::as_str)
            .unwrap_or("Unnamed field")
    }
}

pub fn is_skipped_type(control_type: &str) -> bool {
    SKIPPED_TYPES.contains(&control_type)
}

/// Derives the descriptor for `control`.
pub fn extract_descriptor(doc: &Document, control: NodeId) -> FieldDescriptor {
    let lower = |attr: &str| doc.attr(control, attr).unwrap_or_default().to_lowercase();
    FieldDescriptor {
        id: lower("id"),
        name: lower("name"),
        label: resolve_label(doc, control).to_lowercase(),
        placeholder: lower("placeholder"),
        control_type: doc.control_type(control),
    }
}

/// Best-effort label text for a control, trimmed but not lowercased.
///
/// Tries, in order: a `<label for=id>`, an enclosing `<label>` (minus the
/// control's own value), the preceding label/span/div sibling, and finally
/// the first text-bearing div/span/p in the nearest enclosing `div`.
/// The last step can pick up unrelated text in busy layouts.
pub fn resolve_label(doc: &Document, control: NodeId) -> String {
    let id = doc.attr(control, "id").unwrap_or_default();
    if let Some(label) = doc.label_for(id) {
        return doc.text_content(label).trim().to_string();
    }

    if let Some(label) = doc.ancestors(control).find(|a| doc.is_element(*a, "label")) {
        let text = doc.text_content(label).trim().to_string();
        let value = doc.control_value(control);
        return if value.is_empty() {
            text
        } else {
            text.replacen(&value, "", 1)
        };
    }

    if let Some(prev) = doc.previous_element_sibling(control) {
        if doc.tag(prev).is_some_and(|t| PRECEDING_LABEL_TAGS.contains(&t)) {
            return doc.text_content(prev).trim().to_string();
        }
    }

    if let Some(container) = doc.closest(control, "div") {
        for candidate in doc.descendant_elements(container, NEARBY_TEXT_TAGS) {
            if candidate == control || doc.contains(candidate, control) {
                continue;
            }
            let text = doc.text_content(candidate);
            let text = text.trim();
            if !text.is_empty() {
                return text.to_string();
            }
        }
    }

    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_control(markup: &str) -> (Document, NodeId) {
        let doc = Document::parse(markup);
        let control = doc.form_controls()[0];
        (doc, control)
    }

    #[test]
    fn test_label_for_wins() {
        let (doc, control) = first_control(
            r#"<span>Decoy</span><input id="fname"><label for="fname"> First Name </label>"#,
        );
        assert_eq!(resolve_label(&doc, control), "First Name");
    }

    #[test]
    fn test_wrapping_label_strips_current_value() {
        let (doc, control) =
            first_control(r#"<label>Cover letter <textarea>Dear team</textarea></label>"#);
        assert_eq!(resolve_label(&doc, control), "Cover letter ");
    }

    #[test]
    fn test_preceding_sibling_span() {
        let (doc, control) = first_control(r#"<section><span>Phone</span><input></section>"#);
        assert_eq!(resolve_label(&doc, control), "Phone");
    }

    #[test]
    fn test_preceding_sibling_of_other_tag_is_ignored() {
        let (doc, control) = first_control(r#"<section><b>Phone</b><input></section>"#);
        assert_eq!(resolve_label(&doc, control), "");
    }

    #[test]
    fn test_nearby_text_in_enclosing_div() {
        let (doc, control) = first_control(
            r#"<div class="field"><p class="hint">  </p><span><input></span><p>Portfolio URL</p></div>"#,
        );
        // The span holds the control so it is skipped; the blank <p> too.
        assert_eq!(resolve_label(&doc, control), "Portfolio URL");
    }

    #[test]
    fn test_no_label_anywhere() {
        let (doc, control) = first_control(r#"<form><input name="x"></form>"#);
        assert_eq!(resolve_label(&doc, control), "");
    }

    #[test]
    fn test_extract_lowercases_everything() {
        let (doc, control) = first_control(
            r#"<label for="Email">E-Mail Address</label><input id="Email" name="UserEmail" placeholder="You@Example.com" type="EMAIL">"#,
        );
        let d = extract_descriptor(&doc, control);
        assert_eq!(d.id, "email");
        assert_eq!(d.name, "useremail");
        assert_eq!(d.label, "e-mail address");
        assert_eq!(d.placeholder, "you@example.com");
        assert_eq!(d.control_type, "email");
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut d = FieldDescriptor {
            id: "q7".to_string(),
            ..FieldDescriptor::default()
        };
        assert_eq!(d.display_name(), "q7");
        d.name = "visa".to_string();
        assert_eq!(d.display_name(), "visa");
        d.label = "visa status".to_string();
        assert_eq!(d.display_name(), "visa status");
        assert_eq!(FieldDescriptor::default().display_name(), "Unnamed field");
    }

    #[test]
    fn test_skipped_types() {
        for t in ["hidden", "submit", "button", "file"] {
            assert!(is_skipped_type(t));
        }
        assert!(!is_skipped_type("text"));
        assert!(!is_skipped_type("select-one"));
    }
}
