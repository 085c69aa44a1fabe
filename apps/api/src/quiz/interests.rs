//! Interest aggregation — pure set union over the tags implied by answers.

use std::collections::BTreeSet;

/// Unions `new_tags` into `existing`. Idempotent, commutative, no side effects.
pub fn aggregate(existing: &BTreeSet<String>, new_tags: &[String]) -> BTreeSet<String> {
    let mut merged = existing.clone();
    merged.extend(new_tags.iter().cloned());
    merged
}
