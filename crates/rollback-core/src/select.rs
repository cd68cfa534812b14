use std::cmp::Ordering;

use crate::revision::RevisionRecord;

const RETIRED_REASON: &str = "Retired";
const TRUE_STATUS: &str = "True";

/// True when any condition on the revision records `Retired` with status `True`.
pub fn is_retired(revision: &RevisionRecord) -> bool {
    revision
        .conditions
        .iter()
        .any(|c| c.reason == RETIRED_REASON && c.status == TRUE_STATUS)
}

/// Newest first; equal timestamps fall back to name, descending.
fn newest_first(a: &RevisionRecord, b: &RevisionRecord) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.name.cmp(&a.name))
}

/// Pick the most recently created retired revision.
///
/// Records with an empty name are never returned, even if retired. Returns
/// `None` when nothing qualifies.
pub fn select_retired(revisions: &[RevisionRecord]) -> Option<&RevisionRecord> {
    let mut ordered: Vec<&RevisionRecord> = revisions.iter().collect();
    ordered.sort_by(|a, b| newest_first(a, b));

    ordered
        .into_iter()
        .filter(|r| !r.name.is_empty())
        .find(|r| is_retired(r))
}
