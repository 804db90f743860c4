use crate::edge_index::EdgeIndex;
use crate::tables::TableCollection;
use crate::visitor::EdgeVisitor;
use coalseq_core::{NodeId, Position};

// Stands in for a visitor when only the trees are wanted.
pub(crate) struct NoVisitor;

impl EdgeVisitor for NoVisitor {
    type Output = ();

    #[inline]
    fn on_edge_removed(&mut self, _: NodeId, _: &[NodeId], _: &TableCollection) {}

    #[inline]
    fn on_edge_added(&mut self, _: NodeId, _: &[NodeId], _: &TableCollection) {}

    fn result(&self) {}
}

// Ids in an EdgeIndex were checked against the
// node table when the index was built.
#[inline]
fn slot(u: NodeId) -> usize {
    u.raw() as usize
}

/// Left-to-right sweep over an [`EdgeIndex`],
/// maintaining the parent array of the current tree.
pub(crate) struct Sweep<'index> {
    index: &'index EdgeIndex,
    parent: Vec<NodeId>,
    insertion: usize,
    removal: usize,
    x: Position,
    left: Position,
    right: Position,
}

impl<'index> Sweep<'index> {
    pub(crate) fn new(index: &'index EdgeIndex, num_nodes: usize) -> Self {
        Self {
            index,
            parent: vec![NodeId::NULL; num_nodes],
            insertion: 0,
            removal: 0,
            x: Position::ZERO,
            left: Position::ZERO,
            right: Position::ZERO,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.parent.fill(NodeId::NULL);
        self.insertion = 0;
        self.removal = 0;
        self.x = Position::ZERO;
        self.left = Position::ZERO;
        self.right = Position::ZERO;
    }

    /// Move to the next tree, reporting each edge event to `visitor`.
    ///
    /// Returns `false` once the whole genome has been covered.
    pub(crate) fn advance<V: EdgeVisitor>(
        &mut self,
        tables: &TableCollection,
        visitor: &mut V,
    ) -> bool {
        let index = self.index;
        let sequence_length = index.sequence_length();
        let insertion = index.insertion_order();
        let removal = index.removal_order();
        if !(self.insertion < insertion.len() || self.x < sequence_length) {
            return false;
        }
        for e in removal[self.removal..].iter() {
            if e.position != self.x {
                break;
            }
            visitor.on_edge_removed(e.child, &self.parent, tables);
            self.parent[slot(e.child)] = NodeId::NULL;
            self.removal += 1;
        }
        for e in insertion[self.insertion..].iter() {
            if e.position != self.x {
                break;
            }
            self.parent[slot(e.child)] = e.parent;
            visitor.on_edge_added(e.child, &self.parent, tables);
            self.insertion += 1;
        }
        let mut right = sequence_length;
        if let Some(e) = insertion.get(self.insertion) {
            right = std::cmp::min(right, e.position);
        }
        if let Some(e) = removal.get(self.removal) {
            right = std::cmp::min(right, e.position);
        }
        self.left = self.x;
        self.right = right;
        self.x = right;
        true
    }

    pub(crate) fn parent_array(&self) -> &[NodeId] {
        &self.parent
    }

    pub(crate) fn range(&self) -> (Position, Position) {
        (self.left, self.right)
    }
}

#[cfg(test)]
mod test_sweep {
    use super::*;
    use crate::edge_index::build_edge_index;
    use coalseq_core::DemeId;

    // Records the order of edge events.
    #[derive(Default)]
    struct EventLog {
        events: Vec<(bool, NodeId, NodeId)>,
    }

    impl EdgeVisitor for EventLog {
        type Output = usize;
        fn on_edge_removed(&mut self, child: NodeId, parent: &[NodeId], _: &TableCollection) {
            self.events.push((false, child, parent[slot(child)]));
        }
        fn on_edge_added(&mut self, child: NodeId, parent: &[NodeId], _: &TableCollection) {
            self.events.push((true, child, parent[slot(child)]));
        }
        fn result(&self) -> usize {
            self.events.len()
        }
    }

    #[test]
    fn test_events_see_the_right_parent() {
        let mut tables = TableCollection::new(1.).unwrap();
        tables.add_sample(0., DemeId::NULL).unwrap();
        tables.add_node(1., DemeId::NULL).unwrap();
        tables.add_node(2., DemeId::NULL).unwrap();
        tables.add_edge(0., 0.5, 1, 0).unwrap();
        tables.add_edge(0.5, 1., 2, 0).unwrap();
        let index = build_edge_index(&tables).unwrap();
        let mut sweep = Sweep::new(&index, tables.num_nodes());
        let mut log = EventLog::default();

        assert!(sweep.advance(&tables, &mut log));
        assert_eq!(sweep.range(), (Position::ZERO, Position::new_valid(0.5)));
        assert_eq!(sweep.parent_array()[0], 1);

        assert!(sweep.advance(&tables, &mut log));
        assert_eq!(sweep.parent_array()[0], 2);
        assert!(!sweep.advance(&tables, &mut log));

        let expected = vec![
            (true, NodeId::from(0), NodeId::from(1)),
            (false, NodeId::from(0), NodeId::from(1)),
            (true, NodeId::from(0), NodeId::from(2)),
        ];
        assert_eq!(log.events, expected);
    }

    #[test]
    fn test_reset() {
        let mut tables = TableCollection::new(1.).unwrap();
        tables.add_sample(0., DemeId::NULL).unwrap();
        tables.add_node(1., DemeId::NULL).unwrap();
        tables.add_edge(0., 1., 1, 0).unwrap();
        let index = build_edge_index(&tables).unwrap();
        let mut sweep = Sweep::new(&index, tables.num_nodes());
        assert!(sweep.advance(&tables, &mut NoVisitor));
        assert!(!sweep.advance(&tables, &mut NoVisitor));
        sweep.reset();
        assert_eq!(sweep.parent_array()[0], NodeId::NULL);
        assert!(sweep.advance(&tables, &mut NoVisitor));
        assert_eq!(sweep.parent_array()[0], 1);
    }
}
