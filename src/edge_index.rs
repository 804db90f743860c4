use crate::tables::{TableCollection, TablesError, TablesResult};
use coalseq_core::{NodeId, Position, Time};
use std::cmp::Ordering;

/// An edge event used by the tree sweep.
///
/// `position` is the edge's left end in the insertion
/// order and its right end in the removal order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IndexedEdge {
    /// Where the event happens
    pub position: Position,
    /// Time of `parent`, used to break ties
    pub parent_time: Time,
    /// Parent node
    pub parent: NodeId,
    /// Child node
    pub child: NodeId,
}

impl IndexedEdge {
    fn tie_break(&self, other: &Self) -> Ordering {
        self.parent_time
            .cmp(&other.parent_time)
            .then_with(|| self.parent.cmp(&other.parent))
            .then_with(|| self.child.cmp(&other.child))
    }
}

fn insertion_order(a: &IndexedEdge, b: &IndexedEdge) -> Ordering {
    a.position
        .cmp(&b.position)
        .then_with(|| a.tie_break(b))
}

// At a shared boundary, edges with older parents
// leave before younger ones.
fn removal_order(a: &IndexedEdge, b: &IndexedEdge) -> Ordering {
    a.position
        .cmp(&b.position)
        .then_with(|| a.tie_break(b).reverse())
}

/// Edge insertion and removal orders for a [`TableCollection`].
///
/// Built by [`build_edge_index`].  An index describes the
/// tables it was built from and must be rebuilt if they change.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeIndex {
    insertion: Vec<IndexedEdge>,
    removal: Vec<IndexedEdge>,
    sequence_length: Position,
    num_nodes: usize,
}

impl EdgeIndex {
    /// Edges sorted by `(left, parent time, parent, child)`.
    pub fn insertion_order(&self) -> &[IndexedEdge] {
        &self.insertion
    }

    /// Edges sorted by `right`, then by
    /// `(parent time, parent, child)` descending.
    pub fn removal_order(&self) -> &[IndexedEdge] {
        &self.removal
    }

    /// Number of indexed edges
    pub fn len(&self) -> usize {
        self.insertion.len()
    }

    /// `true` if no edges were indexed
    pub fn is_empty(&self) -> bool {
        self.insertion.is_empty()
    }

    /// Genome length of the indexed tables
    pub fn sequence_length(&self) -> Position {
        self.sequence_length
    }

    /// `true` if `tables` has the shape of the tables
    /// used to build `self`.
    pub fn matches(&self, tables: &TableCollection) -> bool {
        self.sequence_length == tables.sequence_length()
            && self.num_nodes == tables.num_nodes()
            && self.insertion.len() == tables.num_edges()
    }

    /// Count the number of trees.
    ///
    /// This runs the sweep over the index
    /// without building any trees.
    ///
    /// ```
    /// use coalseq::prelude::*;
    ///
    /// let mut tables = TableCollection::new(1.).unwrap();
    /// tables.add_sample(0., DemeId::NULL).unwrap();
    /// tables.add_sample(0., DemeId::NULL).unwrap();
    /// tables.add_node(1., DemeId::NULL).unwrap();
    /// tables.add_edge(0., 0.5, 2, 0).unwrap();
    /// tables.add_edge(0., 1., 2, 1).unwrap();
    /// let index = build_edge_index(&tables).unwrap();
    /// assert_eq!(index.count_trees(), 2);
    /// ```
    pub fn count_trees(&self) -> usize {
        let mut num_trees = 0;
        let mut input_index: usize = 0;
        let mut output_index: usize = 0;
        let input = self.insertion.as_slice();
        let output = self.removal.as_slice();

        let mut tree_left = Position::ZERO;
        while input_index < input.len() || tree_left < self.sequence_length {
            output_index += output[output_index..]
                .iter()
                .take_while(|e| e.position == tree_left)
                .count();
            input_index += input[input_index..]
                .iter()
                .take_while(|e| e.position == tree_left)
                .count();
            let mut tree_right = self.sequence_length;
            if let Some(e) = input.get(input_index) {
                tree_right = std::cmp::min(tree_right, e.position);
            }
            if let Some(e) = output.get(output_index) {
                tree_right = std::cmp::min(tree_right, e.position);
            }
            tree_left = tree_right;
            num_trees += 1;
        }
        num_trees
    }
}

/// Build the edge insertion and removal orders.
///
/// # Errors
///
/// [`TablesError::NodeOutOfBounds`] if an edge refers
/// to a node not in the node table.
pub fn build_edge_index(tables: &TableCollection) -> TablesResult<EdgeIndex> {
    let times = tables.nodes().time();
    let edges = tables.edges();
    let mut insertion = Vec::with_capacity(edges.len());
    let mut removal = Vec::with_capacity(edges.len());
    for e in edges.iter() {
        if e.child.as_index().map_or(true, |c| c >= times.len()) {
            return Err(TablesError::NodeOutOfBounds { found: e.child });
        }
        let parent_time = e
            .parent
            .as_index()
            .and_then(|p| times.get(p).copied())
            .ok_or(TablesError::NodeOutOfBounds { found: e.parent })?;
        let event = IndexedEdge {
            position: e.left,
            parent_time,
            parent: e.parent,
            child: e.child,
        };
        insertion.push(event);
        removal.push(IndexedEdge {
            position: e.right,
            ..event
        });
    }
    insertion.sort_by(insertion_order);
    removal.sort_by(removal_order);
    log::debug!(
        "indexed {} edges over {} nodes",
        insertion.len(),
        times.len()
    );
    Ok(EdgeIndex {
        insertion,
        removal,
        sequence_length: tables.sequence_length(),
        num_nodes: tables.num_nodes(),
    })
}
