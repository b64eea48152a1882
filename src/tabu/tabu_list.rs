//! Tabu list with per-entry remaining lifetime.

use std::collections::HashMap;

use crate::neighborhood::MoveSignature;

/// Move signatures that are currently forbidden, each with a remaining lifetime.
///
/// # Examples
///
/// ```
/// use tabu_routing::neighborhood::MoveSignature;
/// use tabu_routing::tabu::TabuList;
///
/// let sig = MoveSignature::Relocate { stop: 3, from: 1, to: 0 };
/// let mut tabu = TabuList::new();
/// tabu.insert(sig, 2);
/// assert!(tabu.contains(&sig));
/// tabu.tick();
/// assert!(tabu.contains(&sig));
/// tabu.tick();
/// assert!(!tabu.contains(&sig));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TabuList {
    entries: HashMap<MoveSignature, usize>,
}

impl TabuList {
    /// Creates an empty tabu list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forbids `signature` for `tenure` ticks; an existing entry keeps the
    /// longer of the two lifetimes.
    pub fn insert(&mut self, signature: MoveSignature, tenure: usize) {
        if tenure == 0 {
            return;
        }
        let left = self.entries.entry(signature).or_insert(0);
        *left = (*left).max(tenure);
    }

    /// Returns `true` if `signature` is forbidden.
    pub fn contains(&self, signature: &MoveSignature) -> bool {
        self.entries.contains_key(signature)
    }

    /// Decrements every lifetime and drops expired entries.
    pub fn tick(&mut self) {
        self.entries.retain(|_, left| {
            *left -= 1;
            *left > 0
        });
    }

    /// Forgets every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of forbidden signatures.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is forbidden.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
