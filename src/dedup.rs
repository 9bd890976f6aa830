//! Novelty tracking for variants and subject variants.
//!
//! Both sets are seeded from a snapshot of the store taken before the run
//! and grow as the run emits create commands, so a name repeated later in
//! the same file is reported as known. Check-and-mark is not synchronized;
//! concurrent runs rely on the store's conflict handling instead.

use std::collections::HashSet;

/// Membership sets answering "is this name new?" exactly once per name.
#[derive(Debug, Clone, Default)]
pub struct DedupTracker {
    known_variants: HashSet<String>,
    known_subject_variants: HashSet<String>,
}

impl DedupTracker {
    /// Seed the tracker with the names already present in the store.
    pub fn new(
        known_variants: HashSet<String>,
        known_subject_variants: HashSet<String>,
    ) -> Self {
        Self {
            known_variants,
            known_subject_variants,
        }
    }

    /// True the first time `name` is seen and absent from the global set.
    pub fn is_new_variant(&mut self, name: &str) -> bool {
        mark(&mut self.known_variants, name)
    }

    /// True the first time `name` is seen and absent from the subject's set.
    pub fn is_new_subject_variant(&mut self, name: &str) -> bool {
        mark(&mut self.known_subject_variants, name)
    }

    /// Number of variant names currently known.
    pub fn known_variant_count(&self) -> usize {
        self.known_variants.len()
    }

    /// Number of subject variant names currently known.
    pub fn known_subject_variant_count(&self) -> usize {
        self.known_subject_variants.len()
    }
}

fn mark(set: &mut HashSet<String>, name: &str) -> bool {
    if set.contains(name) {
        return false;
    }
    set.insert(name.to_string())
}
