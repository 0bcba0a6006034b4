use std::collections::HashSet;

use super::{Document, NodeId, NodeKind};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

struct Writer<'a> {
    doc: &'a Document,
    touched_options: HashSet<NodeId>,
    selected_options: HashSet<NodeId>,
    out: String,
}

pub(super) fn to_html(doc: &Document) -> String {
    let (touched_options, selected_options) = doc.overlaid_selections();
    let mut writer = Writer {
        doc,
        touched_options,
        selected_options,
        out: String::new(),
    };

    let mut top = doc.node(doc.root()).children.clone();
    if doc.fragment {
        // html5ever wraps fragments in a synthetic <html>; emit its children only.
        top = top
            .into_iter()
            .flat_map(|n| {
                if doc.is_element(n, "html") {
                    doc.node(n).children.clone()
                } else {
                    vec![n]
                }
            })
            .collect();
    } else {
        writer.out.push_str("<!DOCTYPE html>");
    }

    for node in top {
        writer.write(node, false);
    }
    writer.out
}

impl Writer<'_> {
    fn write(&mut self, id: NodeId, raw_text: bool) {
        let doc = self.doc;
        match &doc.node(id).kind {
            NodeKind::Root => {}
            NodeKind::Text(text) => {
                if raw_text {
                    self.out.push_str(text);
                } else {
                    escape_text(text, &mut self.out);
                }
            }
            NodeKind::Element(el) => {
                let tag = el.tag.as_str();
                self.out.push('<');
                self.out.push_str(tag);

                let overlay = doc.values.get(&id);
                let mut wrote_value = false;
                for (name, value) in &el.attrs {
                    if tag == "input" && name == "value" {
                        if let Some(live) = overlay {
                            self.write_attr(name, live);
                            wrote_value = true;
                            continue;
                        }
                    }
                    if name == "selected" && self.touched_options.contains(&id) {
                        continue;
                    }
                    self.write_attr(name, value);
                }
                if tag == "input" && !wrote_value {
                    if let Some(live) = overlay {
                        self.write_attr("value", live);
                    }
                }
                if self.selected_options.contains(&id) {
                    self.out.push_str(" selected");
                }
                self.out.push('>');

                if VOID_ELEMENTS.contains(&tag) {
                    return;
                }

                if tag == "textarea" {
                    if let Some(live) = overlay {
                        escape_text(live, &mut self.out);
                    } else {
                        self.write_children(id, false);
                    }
                } else {
                    self.write_children(id, RAW_TEXT_ELEMENTS.contains(&tag));
                }

                self.out.push_str("</");
                self.out.push_str(tag);
                self.out.push('>');
            }
        }
    }

    fn write_children(&mut self, id: NodeId, raw_text: bool) {
        let children = self.doc.node(id).children.clone();
        for child in children {
            self.write(child, raw_text);
        }
    }

    fn write_attr(&mut self, name: &str, value: &str) {
        self.out.push(' ');
        self.out.push_str(name);
        self.out.push_str("=\"");
        for c in value.chars() {
            match c {
                '&' => self.out.push_str("&amp;"),
                '"' => self.out.push_str("&quot;"),
                _ => self.out.push(c),
            }
        }
        self.out.push('"');
    }
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}
