//! Display labels for dense state ids.
//!
//! Algorithms only ever see `StateId`s. The labels a user wrote in a snapshot
//! are interned here so they can be restored on the way out.

use crate::automaton::state::StateId;
use indexmap::IndexSet;

/// Interner mapping display labels to sequential state ids.
///
/// The id of a label is its insertion index. A state without a label is
/// displayed as its id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateLabels {
    labels: IndexSet<String>,
}

impl StateLabels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Labels `"0"`, `"1"`, .. for `count` states.
    pub fn sequential(count: usize) -> Self {
        Self {
            labels: (0..count).map(|i| i.to_string()).collect(),
        }
    }

    /// Get the id of `label`, interning it as the next id if it is new.
    pub fn get_or_create(&mut self, label: &str) -> StateId {
        if let Some(id) = self.labels.get_index_of(label) {
            id as StateId
        } else {
            let (id, _) = self.labels.insert_full(label.to_string());
            id as StateId
        }
    }

    pub fn id(&self, label: &str) -> Option<StateId> {
        self.labels.get_index_of(label).map(|id| id as StateId)
    }

    pub fn get(&self, id: StateId) -> Option<&str> {
        self.labels.get_index(id as usize).map(String::as_str)
    }

    /// The display label of `id`.
    pub fn display(&self, id: StateId) -> String {
        self.get(id)
            .map_or_else(|| id.to_string(), ToString::to_string)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// A label based on `base` that is not in use yet.
    pub fn fresh(&self, base: &str) -> String {
        let mut candidate = base.to_string();
        while self.labels.contains(&candidate) {
            candidate.push('\'');
        }
        candidate
    }

    /// Labels for a new automaton whose state `i` is the old state `old_ids[i]`.
    pub fn project(&self, old_ids: &[StateId]) -> Self {
        let mut projected = Self::new();
        for (new_id, &old) in old_ids.iter().enumerate() {
            let label = self.display(old);
            let label = if projected.id(&label).is_some() {
                projected.fresh(&label)
            } else {
                label
            };
            let id = projected.get_or_create(&label);
            debug_assert_eq!(id as usize, new_id);
        }
        projected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning_is_stable() {
        let mut labels = StateLabels::new();
        assert_eq!(labels.get_or_create("q0"), 0);
        assert_eq!(labels.get_or_create("q1"), 1);
        assert_eq!(labels.get_or_create("q0"), 0);
        assert_eq!(labels.id("q1"), Some(1));
        assert_eq!(labels.id("missing"), None);
        assert_eq!(labels.get(1), Some("q1"));
        assert_eq!(labels.len(), 2);
    }

    #[test]
    fn test_display_falls_back_to_id() {
        let labels = StateLabels::sequential(2);
        assert_eq!(labels.display(1), "1");
        assert_eq!(labels.display(7), "7");
    }

    #[test]
    fn test_fresh_avoids_collisions() {
        let mut labels = StateLabels::new();
        labels.get_or_create("trash");
        assert_eq!(labels.fresh("trash"), "trash'");
        assert_eq!(labels.fresh("sink"), "sink");
    }

    #[test]
    fn test_project_keeps_labels_of_survivors() {
        let mut labels = StateLabels::new();
        for name in ["a", "b", "c"] {
            labels.get_or_create(name);
        }
        let projected = labels.project(&[2, 0]);
        assert_eq!(projected.get(0), Some("c"));
        assert_eq!(projected.get(1), Some("a"));
    }
}
