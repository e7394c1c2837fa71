//! Display rules for directory listings: hidden-entry filtering, local
//! search, and default ordering.

use std::cmp::Ordering;

use crate::api::types::Entry;

/// Apply the display rules to a raw listing.
///
/// Hidden entries are always dropped, even though the listing endpoint is
/// expected to have filtered them already. A non-blank search term keeps
/// case-insensitive substring matches in the server's original order and
/// skips the sort; otherwise the listing is sorted directories-first.
pub fn apply(entries: &[Entry], search: Option<&str>) -> Vec<Entry> {
    let mut visible: Vec<Entry> = entries.iter().filter(|e| !e.is_hidden()).cloned().collect();

    if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
        let needle = term.to_lowercase();
        visible.retain(|e| e.name.to_lowercase().contains(&needle));
        return visible;
    }

    visible.sort_by(compare);
    visible
}

/// Directories before everything else; ties by case-insensitive name, with
/// the raw name as a final tiebreak so the order is total.
fn compare(a: &Entry, b: &Entry) -> Ordering {
    b.is_dir
        .cmp(&a.is_dir)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.name.cmp(&b.name))
}
