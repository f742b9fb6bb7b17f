//! Work queue: the input set minus everything the result stores already hold.

use crate::input::InputError;
use std::collections::HashSet;

/// Identifiers still needing a probe, in input order. Both `all` and
/// `processed` must have been case-folded with the same policy, or resume
/// will double-probe.
///
/// Empty input is an error; a fully-processed input yields an empty queue so
/// callers can tell "nothing to do" apart from "no input". Duplicates within
/// the input are kept — the resume check only consults the stores.
pub fn build(all: &[String], processed: &HashSet<String>) -> Result<Vec<String>, InputError> {
    if all.is_empty() {
        return Err(InputError::Empty);
    }
    Ok(all
        .iter()
        .filter(|id| !processed.contains(id.as_str()))
        .cloned()
        .collect())
}
