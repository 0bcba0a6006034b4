use serde::Serialize;

use super::{Document, NodeId};

/// Synthetic events a fill dispatches so host listeners see a typed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Input,
    Change,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlEvent {
    pub target: NodeId,
    pub kind: EventKind,
    pub bubbles: bool,
}

/// One `<option>` of a select control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub text: String,
}

/// What the fill engine needs from a form control: read it, write it, and
/// tell the page it changed. `ControlHandle` backs it with a `Document`;
/// tests can back it with a plain struct.
pub trait FormControl {
    fn control_type(&self) -> String;
    fn value(&self) -> String;
    fn set_value(&mut self, value: &str);
    fn options(&self) -> Vec<SelectOption>;
    fn dispatch(&mut self, event: EventKind);

    fn is_select(&self) -> bool {
        self.control_type().starts_with("select")
    }
}

/// A mutable view of one control inside a `Document`.
pub struct ControlHandle<'a> {
    doc: &'a mut Document,
    node: NodeId,
}

impl<'a> ControlHandle<'a> {
    pub(crate) fn new(doc: &'a mut Document, node: NodeId) -> Self {
        Self { doc, node }
    }
}

impl FormControl for ControlHandle<'_> {
    fn control_type(&self) -> String {
        self.doc.control_type(self.node)
    }

    fn value(&self) -> String {
        self.doc.control_value(self.node)
    }

    fn set_value(&mut self, value: &str) {
        self.doc.set_control_value(self.node, value);
    }

    fn options(&self) -> Vec<SelectOption> {
        self.doc.select_options(self.node)
    }

    fn dispatch(&mut self, event: EventKind) {
        self.doc.dispatch(self.node, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_writes_through_to_document() {
        let mut doc = Document::parse(r#"<input id="city">"#);
        let node = doc.form_controls()[0];
        {
            let mut control = doc.control(node);
            control.set_value("Paris");
            control.dispatch(EventKind::Input);
            assert_eq!(control.value(), "Paris");
            assert!(!control.is_select());
        }
        assert_eq!(doc.control_value(node), "Paris");
        assert_eq!(doc.events().len(), 1);
        assert!(doc.events()[0].bubbles);
    }

    #[test]
    fn test_select_handle_reports_options() {
        let mut doc = Document::parse(r#"<select><option value="a">A</option></select>"#);
        let node = doc.form_controls()[0];
        let control = doc.control(node);
        assert!(control.is_select());
        assert_eq!(control.options()[0].value, "a");
    }
}
