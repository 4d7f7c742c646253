use crate::types::GraphId;

/// Decides which graphs a control command reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkCoordinator {
    linked: bool,
    selected: GraphId,
}

impl Default for LinkCoordinator {
    fn default() -> Self {
        Self {
            linked: false,
            selected: GraphId::First,
        }
    }
}

impl LinkCoordinator {
    pub fn is_linked(&self) -> bool {
        self.linked
    }

    pub fn selected(&self) -> GraphId {
        self.selected
    }

    /// Both graphs when linked, otherwise the selected one.
    pub fn targets(&self) -> &'static [GraphId] {
        if self.linked {
            &GraphId::ALL
        } else {
            self.selected.as_slice()
        }
    }

    /// Returns whether the mode actually changed.
    pub fn set_linked(&mut self, linked: bool) -> bool {
        let changed = self.linked != linked;
        self.linked = linked;
        changed
    }

    /// Returns the previously selected graph when the selection changed.
    pub fn select(&mut self, graph: GraphId) -> Option<GraphId> {
        if self.selected == graph {
            return None;
        }
        let previous = self.selected;
        self.selected = graph;
        Some(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_follow_mode_and_selection() {
        let mut link = LinkCoordinator::default();
        assert_eq!(link.targets(), &[GraphId::First]);
        assert_eq!(link.select(GraphId::Second), Some(GraphId::First));
        assert_eq!(link.select(GraphId::Second), None);
        assert_eq!(link.targets(), &[GraphId::Second]);
        assert!(link.set_linked(true));
        assert!(!link.set_linked(true));
        assert_eq!(link.targets(), &GraphId::ALL);
    }
}
