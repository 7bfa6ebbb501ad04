//! Ordered selection set with membership diffing.

use crate::registry::ComponentId;

/// Membership change produced by a selection mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionDiff {
    /// Ids that joined the selection, in selection order.
    pub added: Vec<ComponentId>,
    /// Ids that left the selection, in their former order.
    pub removed: Vec<ComponentId>,
}

impl SelectionDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Fold a later diff into this one, cancelling ids that came and went.
    pub fn merge(&mut self, later: SelectionDiff) {
        for id in later.removed {
            if let Some(pos) = self.added.iter().position(|&a| a == id) {
                self.added.remove(pos);
            } else if !self.removed.contains(&id) {
                self.removed.push(id);
            }
        }
        for id in later.added {
            if let Some(pos) = self.removed.iter().position(|&r| r == id) {
                self.removed.remove(pos);
            } else if !self.added.contains(&id) {
                self.added.push(id);
            }
        }
    }
}

/// Insertion-ordered set of selected component ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<ComponentId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[ComponentId] {
        &self.ids
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Replace the whole selection. Duplicate ids in `ids` are collapsed.
    pub fn replace(&mut self, ids: impl IntoIterator<Item = ComponentId>) -> SelectionDiff {
        let mut next: Vec<ComponentId> = Vec::new();
        for id in ids {
            if !next.contains(&id) {
                next.push(id);
            }
        }
        let removed = self.ids.iter().copied().filter(|id| !next.contains(id)).collect();
        let added = next.iter().copied().filter(|id| !self.ids.contains(id)).collect();
        self.ids = next;
        SelectionDiff { added, removed }
    }

    /// Add ids that are not yet selected.
    pub fn extend(&mut self, ids: impl IntoIterator<Item = ComponentId>) -> SelectionDiff {
        let mut diff = SelectionDiff::default();
        for id in ids {
            if !self.ids.contains(&id) {
                self.ids.push(id);
                diff.added.push(id);
            }
        }
        diff
    }

    pub fn add(&mut self, id: ComponentId) -> SelectionDiff {
        self.extend([id])
    }

    pub fn remove(&mut self, id: ComponentId) -> SelectionDiff {
        let mut diff = SelectionDiff::default();
        if let Some(pos) = self.ids.iter().position(|&s| s == id) {
            self.ids.remove(pos);
            diff.removed.push(id);
        }
        diff
    }

    pub fn clear(&mut self) -> SelectionDiff {
        self.replace([])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids<const N: usize>() -> [ComponentId; N] {
        std::array::from_fn(|_| ComponentId::new())
    }

    #[test]
    fn test_replace_diffs_membership() {
        let [a, b, c] = ids();
        let mut selection = Selection::new();
        let first = selection.replace([a, b]);
        assert_eq!(first.added, vec![a, b]);
        assert!(first.removed.is_empty());

        let second = selection.replace([b, c]);
        assert_eq!(second.added, vec![c]);
        assert_eq!(second.removed, vec![a]);
        assert_eq!(selection.ids(), &[b, c]);
    }

    #[test]
    fn test_replace_collapses_duplicates() {
        let [a, b] = ids();
        let mut selection = Selection::new();
        selection.replace([a, b, a, b]);
        assert_eq!(selection.ids(), &[a, b]);
    }

    #[test]
    fn test_extend_only_reports_new() {
        let [a, b] = ids();
        let mut selection = Selection::new();
        selection.add(a);
        let diff = selection.extend([a, b]);
        assert_eq!(diff.added, vec![b]);
        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn test_same_selection_is_empty_diff() {
        let [a, b] = ids();
        let mut selection = Selection::new();
        selection.replace([a, b]);
        assert!(selection.replace([a, b]).is_empty());
        assert!(selection.remove(ComponentId::new()).is_empty());
    }

    #[test]
    fn test_merge_cancels_round_trips() {
        let [a, b, c] = ids();
        let mut selection = Selection::new();
        selection.replace([a]);

        let mut diff = selection.replace([b]);
        diff.merge(selection.replace([a, c]));
        // a left then came back; b came then left.
        assert_eq!(diff.added, vec![c]);
        assert!(diff.removed.is_empty());
    }
}
