use crate::dom::{EventKind, FormControl};

/// Writes `value` into the control and fires `input` then `change` so page
/// listeners react as if the user had typed it. Returns the control's value
/// after the write. Nothing is rolled back if a later field fails.
pub fn apply_value(control: &mut dyn FormControl, value: &str) -> String {
    control.set_value(value);
    control.dispatch(EventKind::Input);
    control.dispatch(EventKind::Change);
    control.value()
}
