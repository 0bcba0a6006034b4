//! Document model: a mutable arena of element and text nodes parsed from HTML.
//!
//! The fill engine never talks to a browser. It walks this arena, reads the
//! attributes and surrounding text it needs to classify a control, and writes
//! values back through the `FormControl` capability in `control.rs`.

use std::collections::{HashMap, HashSet};

use scraper::{Html, Node as HtmlNode};

pub mod control;
mod serialize;

pub use control::{ControlEvent, ControlHandle, EventKind, FormControl, SelectOption};

/// Index of a node inside a `Document` arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub(crate) struct ElementData {
    pub(crate) tag: String,
    pub(crate) attrs: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Root,
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

/// Tags collected as form controls, in the order the engine scans them.
const CONTROL_TAGS: &[&str] = &["input", "textarea", "select"];

/// `type` values a browser keeps. Anything else reads back as `text`.
const INPUT_TYPES: &[&str] = &[
    "button", "checkbox", "color", "date", "datetime-local", "email", "file", "hidden",
    "image", "month", "number", "password", "radio", "range", "reset", "search", "submit",
    "tel", "text", "time", "url", "week",
];

/// A parsed document plus the live control state layered on top of the markup.
///
/// Control values are kept in an overlay (`values`) rather than in the
/// attributes, mirroring the DOM split between the `value` property and the
/// `value` attribute. Serialisation folds the overlay back into the markup.
#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) nodes: Vec<Node>,
    pub(crate) fragment: bool,
    pub(crate) values: HashMap<NodeId, String>,
    pub(crate) events: Vec<ControlEvent>,
    /// `for` attribute -> first label carrying it, in document order.
    labels: HashMap<String, NodeId>,
}

impl Document {
    /// Parses markup into a document. Input without an `<html>` tag is
    /// treated as a fragment and serialised back without the wrapper.
    pub fn parse(markup: &str) -> Self {
        let fragment = !markup.to_ascii_lowercase().contains("<html");
        let html = if fragment {
            Html::parse_fragment(markup)
        } else {
            Html::parse_document(markup)
        };

        let mut doc = Document {
            nodes: vec![Node {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            }],
            fragment,
            values: HashMap::new(),
            events: Vec::new(),
            labels: HashMap::new(),
        };

        let mut pending = vec![(html.tree.root(), doc.root())];
        while let Some((source, parent)) = pending.pop() {
            for child in source.children() {
                let kind = match child.value() {
                    HtmlNode::Element(el) => NodeKind::Element(ElementData {
                        tag: el.name().to_ascii_lowercase(),
                        attrs: el
                            .attrs()
                            .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
                            .collect(),
                    }),
                    HtmlNode::Text(text) => NodeKind::Text((**text).to_string()),
                    // Doctype, comments and processing instructions carry nothing we read.
                    _ => continue,
                };
                let id = doc.push(kind, parent);
                pending.push((child, id));
            }
        }

        for label in doc.descendant_elements(doc.root(), &["label"]) {
            let target = match doc.attr(label, "for") {
                Some(t) if !t.is_empty() => t.to_string(),
                _ => continue,
            };
            doc.labels.entry(target).or_insert(label);
        }
        doc
    }

    fn push(&mut self, kind: NodeKind, parent: NodeId) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.node(id).kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Lowercase tag name, or `None` for text and root nodes.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    pub fn is_element(&self, id: NodeId, tag: &str) -> bool {
        self.tag(id) == Some(tag)
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| {
            el.attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        })
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    /// Parent element, skipping the synthetic root.
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)
            .parent
            .filter(|p| matches!(self.node(*p).kind, NodeKind::Element(_)))
    }

    /// Element ancestors from nearest to farthest, excluding `id` itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent_element(id), move |p| self.parent_element(*p))
    }

    /// Nearest element with the given tag, starting at `id` itself.
    pub fn closest(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|n| self.is_element(*n, tag))
    }

    /// True when `node` is `container` or lies inside it.
    pub fn contains(&self, container: NodeId, node: NodeId) -> bool {
        node == container || self.ancestors(node).any(|a| a == container)
    }

    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.node(id).parent?;
        let siblings = &self.node(parent).children;
        let pos = siblings.iter().position(|s| *s == id)?;
        siblings[..pos]
            .iter()
            .rev()
            .copied()
            .find(|s| self.element(*s).is_some())
    }

    /// Descendants of `id` in document order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.node(id).children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.node(next).children.iter().rev().copied());
        }
        out
    }

    /// Element descendants whose tag is one of `tags`, in document order.
    pub fn descendant_elements(&self, id: NodeId, tags: &[&str]) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|n| self.tag(*n).is_some_and(|t| tags.contains(&t)))
            .collect()
    }

    /// Concatenated text of all descendant text nodes, untrimmed.
    pub fn text_content(&self, id: NodeId) -> String {
        if let NodeKind::Text(text) = &self.node(id).kind {
            return text.clone();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|n| match &self.node(n).kind {
                NodeKind::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// All `input`, `textarea` and `select` elements in document order.
    pub fn form_controls(&self) -> Vec<NodeId> {
        self.descendant_elements(self.root(), CONTROL_TAGS)
    }

    /// First `label` element whose `for` attribute equals `control_id`.
    pub fn label_for(&self, control_id: &str) -> Option<NodeId> {
        if control_id.is_empty() {
            return None;
        }
        self.labels.get(control_id).copied()
    }

    // ────────────────────────────────────────────────────────────────────────
    // Live control state
    // ────────────────────────────────────────────────────────────────────────

    /// The control's type as a browser reports it: the lowercased `type`
    /// attribute for inputs (`text` when missing or unknown), `textarea`, or
    /// `select-one`/`select-multiple`.
    pub fn control_type(&self, id: NodeId) -> String {
        match self.tag(id) {
            Some("input") => self
                .attr(id, "type")
                .map(|t| t.trim().to_ascii_lowercase())
                .filter(|t| INPUT_TYPES.contains(&t.as_str()))
                .unwrap_or_else(|| "text".to_string()),
            Some("textarea") => "textarea".to_string(),
            Some("select") if self.has_attr(id, "multiple") => "select-multiple".to_string(),
            Some("select") => "select-one".to_string(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }

    pub fn select_options(&self, id: NodeId) -> Vec<SelectOption> {
        self.option_nodes(id)
            .into_iter()
            .map(|opt| SelectOption {
                value: self.option_value(opt),
                text: self.text_content(opt).trim().to_string(),
            })
            .collect()
    }

    pub(crate) fn option_nodes(&self, select: NodeId) -> Vec<NodeId> {
        self.descendant_elements(select, &["option"])
    }

    pub(crate) fn option_value(&self, option: NodeId) -> String {
        self.attr(option, "value")
            .map(str::to_string)
            .unwrap_or_else(|| self.text_content(option).trim().to_string())
    }

    /// Current value of a control, falling back to what the markup implies.
    pub fn control_value(&self, id: NodeId) -> String {
        if let Some(value) = self.values.get(&id) {
            return value.clone();
        }
        match self.tag(id) {
            Some("input") => self.attr(id, "value").unwrap_or_default().to_string(),
            Some("textarea") => self.text_content(id),
            Some("select") => {
                let options = self.option_nodes(id);
                options
                    .iter()
                    .find(|o| self.has_attr(**o, "selected"))
                    .or_else(|| options.first())
                    .map(|o| self.option_value(*o))
                    .unwrap_or_default()
            }
            _ => String::new(),
        }
    }

    /// Writes the live value. A select only takes a value one of its options
    /// carries; anything else leaves it with no selection and an empty value.
    pub fn set_control_value(&mut self, id: NodeId, value: &str) {
        let value = if self.is_element(id, "select")
            && !self
                .option_nodes(id)
                .into_iter()
                .any(|o| self.option_value(o) == value)
        {
            String::new()
        } else {
            value.to_string()
        };
        self.values.insert(id, value);
    }

    pub fn dispatch(&mut self, id: NodeId, kind: EventKind) {
        self.events.push(ControlEvent {
            target: id,
            kind,
            bubbles: true,
        });
    }

    /// Events dispatched so far, oldest first.
    pub fn events(&self) -> &[ControlEvent] {
        &self.events
    }

    pub fn control(&mut self, id: NodeId) -> ControlHandle<'_> {
        ControlHandle::new(self, id)
    }

    /// Option nodes that must carry `selected` after serialisation, for every
    /// select whose value was changed through the overlay.
    pub(crate) fn overlaid_selections(&self) -> (HashSet<NodeId>, HashSet<NodeId>) {
        let mut touched = HashSet::new();
        let mut selected = HashSet::new();
        for (select, value) in &self.values {
            if !self.is_element(*select, "select") {
                continue;
            }
            let options = self.option_nodes(*select);
            if let Some(hit) = options.iter().find(|o| self.option_value(**o) == *value) {
                selected.insert(*hit);
            }
            touched.extend(options);
        }
        (touched, selected)
    }

    /// Serialises the document with live control values written back.
    pub fn to_html(&self) -> String {
        serialize::to_html(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORM: &str = r#"
        <form>
          <div class="row">
            <label for="firstName">First Name</label>
            <input id="firstName" name="first_name" type="text">
          </div>
          <label>Email <input name="email" value="old@example.com"></label>
          <textarea id="cover">Hello</textarea>
          <select id="degree">
            <option value="">Choose</option>
            <option value="bsc" selected>Bachelor of Science</option>
            <option>Master</option>
          </select>
          <input type="hidden" name="token" value="abc">
        </form>
    "#;

    #[test]
    fn test_form_controls_in_document_order() {
        let doc = Document::parse(FORM);
        let tags: Vec<_> = doc
            .form_controls()
            .into_iter()
            .map(|c| doc.tag(c).unwrap().to_string())
            .collect();
        assert_eq!(tags, vec!["input", "input", "textarea", "select", "input"]);
    }

    #[test]
    fn test_control_types() {
        let doc = Document::parse(FORM);
        let types: Vec<_> = doc
            .form_controls()
            .into_iter()
            .map(|c| doc.control_type(c))
            .collect();
        assert_eq!(types, vec!["text", "text", "textarea", "select-one", "hidden"]);
    }

    #[test]
    fn test_initial_values_come_from_markup() {
        let doc = Document::parse(FORM);
        let controls = doc.form_controls();
        assert_eq!(doc.control_value(controls[0]), "");
        assert_eq!(doc.control_value(controls[1]), "old@example.com");
        assert_eq!(doc.control_value(controls[2]), "Hello");
        assert_eq!(doc.control_value(controls[3]), "bsc");
    }

    #[test]
    fn test_option_without_value_uses_text() {
        let doc = Document::parse(FORM);
        let select = doc.form_controls()[3];
        let options = doc.select_options(select);
        assert_eq!(options.len(), 3);
        assert_eq!(options[2].value, "Master");
        assert_eq!(options[1].text, "Bachelor of Science");
    }

    #[test]
    fn test_label_for_and_closest() {
        let doc = Document::parse(FORM);
        let label = doc.label_for("firstName").expect("label present");
        assert_eq!(doc.text_content(label).trim(), "First Name");
        assert!(doc.label_for("").is_none());

        let email = doc.form_controls()[1];
        let wrapping = doc.closest(email, "label").expect("inside label");
        assert!(doc.contains(wrapping, email));
        assert!(!doc.contains(email, wrapping));
    }

    #[test]
    fn test_previous_element_sibling_skips_text() {
        let doc = Document::parse(FORM);
        let first = doc.form_controls()[0];
        let prev = doc.previous_element_sibling(first).unwrap();
        assert!(doc.is_element(prev, "label"));
    }

    #[test]
    fn test_set_value_overlays_without_touching_attrs() {
        let mut doc = Document::parse(FORM);
        let email = doc.form_controls()[1];
        doc.set_control_value(email, "ada@example.com");
        assert_eq!(doc.control_value(email), "ada@example.com");
        assert_eq!(doc.attr(email, "value"), Some("old@example.com"));
    }

    #[test]
    fn test_select_only_takes_option_values() {
        let mut doc = Document::parse(FORM);
        let select = doc.form_controls()[3];

        doc.set_control_value(select, "Master");
        assert_eq!(doc.control_value(select), "Master");

        doc.set_control_value(select, "PhD");
        assert_eq!(doc.control_value(select), "");
    }

    #[test]
    fn test_unknown_input_type_reads_as_text() {
        let doc = Document::parse(
            r#"<input type="foo"><input type=" EMAIL "><input type="">"#,
        );
        let types: Vec<_> = doc
            .form_controls()
            .into_iter()
            .map(|c| doc.control_type(c))
            .collect();
        assert_eq!(types, vec!["text", "email", "text"]);
    }

    #[test]
    fn test_label_for_takes_first_in_document_order() {
        let doc = Document::parse(
            r#"<div><p><label for="x">Outer</label></p></div><label for="x">Second</label><label for="y">Why</label>"#,
        );
        let label = doc.label_for("x").unwrap();
        assert_eq!(doc.text_content(label), "Outer");
        assert_eq!(doc.text_content(doc.label_for("y").unwrap()), "Why");
        assert!(doc.label_for("z").is_none());
    }
}
