//! The fill pass: extract → classify → fill or collect → AI fallback.
//!
//! Everything up to the AI call runs synchronously, so heuristic fills are
//! complete before the only await point. Callers that disable AI or have no
//! credential never suspend.

use serde::Serialize;
use tracing::{debug, info};

use crate::autofill::classifier::{classify, Category, Classification, Slot};
use crate::autofill::descriptor::{extract_descriptor, is_skipped_type, FieldDescriptor};
use crate::autofill::executor::apply_value;
use crate::autofill::resolver::{resolve_unknown_fields, UnknownField};
use crate::dom::Document;
use crate::llm_client::TextGenerator;
use crate::models::profile::Profile;

/// Switches that gate a pass. Passed in explicitly; the engine never reads
/// stored settings itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillOptions {
    pub auto_fill_enabled: bool,
    pub use_ai: bool,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            auto_fill_enabled: true,
            use_ai: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FillSource {
    Heuristic,
    Ai,
}

/// One filled field as reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FillRecord {
    pub id: String,
    pub name: String,
    pub label: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<Slot>,
    pub source: FillSource,
}

impl FillRecord {
    fn new(descriptor: &FieldDescriptor, value: String, slot: Option<Slot>) -> Self {
        Self {
            id: descriptor.id.clone(),
            name: descriptor.name.clone(),
            label: descriptor.label.clone(),
            value,
            category: slot.map(|s| s.category()),
            slot,
            source: if slot.is_some() {
                FillSource::Heuristic
            } else {
                FillSource::Ai
            },
        }
    }
}

/// Result of the synchronous heuristic pass.
#[derive(Debug, Default)]
pub struct HeuristicPass {
    pub records: Vec<FillRecord>,
    pub unknown: Vec<UnknownField>,
    /// Fields a rule claimed but had no value for. They stay blank.
    pub declined: usize,
}

#[derive(Debug, Default, Serialize)]
pub struct FillReport {
    /// Heuristic fills in document order, then AI fills in unknown-field order.
    pub fields: Vec<FillRecord>,
    /// Unknown fields still blank after the pass.
    pub unknown: Vec<FieldDescriptor>,
    pub ai_attempted: bool,
}

/// Classifies every fillable control and fills the ones the rules recognise.
pub fn fill_known_fields(doc: &mut Document, profile: &Profile) -> HeuristicPass {
    let mut pass = HeuristicPass::default();

    for node in doc.form_controls() {
        if is_skipped_type(&doc.control_type(node)) {
            continue;
        }

        let descriptor = extract_descriptor(doc, node);
        let mut control = doc.control(node);

        match classify(&descriptor, profile, &control) {
            Classification::Filled(fill) => {
                let value = apply_value(&mut control, &fill.value);
                debug!("Filled {:?} field '{}'", fill.slot, descriptor.display_name());
                pass.records
                    .push(FillRecord::new(&descriptor, value, Some(fill.slot)));
            }
            Classification::Declined(category) => {
                debug!(
                    "{:?} field '{}' left blank: no usable profile value",
                    category,
                    descriptor.display_name()
                );
                pass.declined += 1;
            }
            Classification::Unmatched => pass.unknown.push(UnknownField { node, descriptor }),
        }
    }

    pass
}

/// Scans `doc`, fills what the heuristics recognise, then offers the rest to
/// the AI resolver when `options.use_ai` allows it.
pub async fn fill_form(
    doc: &mut Document,
    profile: &Profile,
    options: FillOptions,
    generator: &dyn TextGenerator,
) -> FillReport {
    if !options.auto_fill_enabled {
        info!("Auto-fill disabled; leaving form untouched");
        return FillReport::default();
    }

    let HeuristicPass {
        mut records,
        unknown,
        declined,
    } = fill_known_fields(doc, profile);
    info!(
        "Heuristic pass: {} filled, {} unknown, {} left blank",
        records.len(),
        unknown.len(),
        declined
    );

    let outcome = resolve_unknown_fields(doc, &unknown, profile, options.use_ai, generator).await;

    for &index in &outcome.filled {
        let field = &unknown[index];
        records.push(FillRecord::new(
            &field.descriptor,
            doc.control_value(field.node),
            None,
        ));
    }

    let remaining = unknown
        .into_iter()
        .enumerate()
        .filter(|(index, _)| outcome.filled.binary_search(index).is_err())
        .map(|(_, field)| field.descriptor)
        .collect();

    FillReport {
        fields: records,
        unknown: remaining,
        ai_attempted: outcome.attempted,
    }
}
