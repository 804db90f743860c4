//! Streaming statistics over a tree sweep.
//!
//! An [`EdgeVisitor`] is told about every edge that leaves or
//! enters the current tree and reports a result once per tree.
//! See [`traverse_with_visitor`](crate::traverse_with_visitor).

use crate::tables::TableCollection;
use coalseq_core::NodeId;

/// Callbacks invoked by the tree sweep.
///
/// For each interval of the genome, the sweep first reports
/// every edge leaving the tree, then every edge entering it,
/// and finally asks for [`EdgeVisitor::result`].
///
/// `parent` is the parent array of the tree being built.
/// During [`EdgeVisitor::on_edge_removed`], `parent[child]`
/// still holds the outgoing parent.  During
/// [`EdgeVisitor::on_edge_added`], it already holds the new one.
///
/// # Example
///
/// Count the edges in each tree:
///
/// ```
/// use coalseq::prelude::*;
///
/// #[derive(Default)]
/// struct EdgeCount(usize);
///
/// impl EdgeVisitor for EdgeCount {
///     type Output = usize;
///     fn on_edge_removed(&mut self, _: NodeId, _: &[NodeId], _: &TableCollection) {
///         self.0 -= 1;
///     }
///     fn on_edge_added(&mut self, _: NodeId, _: &[NodeId], _: &TableCollection) {
///         self.0 += 1;
///     }
///     fn result(&self) -> usize {
///         self.0
///     }
/// }
///
/// let mut tables = TableCollection::new(1.).unwrap();
/// tables.add_sample(0., DemeId::NULL).unwrap();
/// tables.add_sample(0., DemeId::NULL).unwrap();
/// tables.add_node(1., DemeId::NULL).unwrap();
/// tables.add_edge(0., 1., 2, 0).unwrap();
/// tables.add_edge(0., 1., 2, 1).unwrap();
/// let index = build_edge_index(&tables).unwrap();
/// let counts = traverse_with_visitor(&tables, &index, EdgeCount::default())
///     .unwrap()
///     .collect::<Vec<_>>();
/// assert_eq!(counts, vec![2]);
/// ```
pub trait EdgeVisitor {
    /// The per-tree result
    type Output;

    /// Called before `child` loses its parent.
    fn on_edge_removed(&mut self, child: NodeId, parent: &[NodeId], tables: &TableCollection);

    /// Called after `child` gains its parent.
    fn on_edge_added(&mut self, child: NodeId, parent: &[NodeId], tables: &TableCollection);

    /// The statistic for the current tree.
    fn result(&self) -> Self::Output;
}

impl<V: EdgeVisitor + ?Sized> EdgeVisitor for &mut V {
    type Output = V::Output;

    fn on_edge_removed(&mut self, child: NodeId, parent: &[NodeId], tables: &TableCollection) {
        (**self).on_edge_removed(child, parent, tables)
    }

    fn on_edge_added(&mut self, child: NodeId, parent: &[NodeId], tables: &TableCollection) {
        (**self).on_edge_added(child, parent, tables)
    }

    fn result(&self) -> Self::Output {
        (**self).result()
    }
}

// Length of the branch above `child`, or zero for a root.
fn branch_length(child: NodeId, parent: &[NodeId], tables: &TableCollection) -> f64 {
    let time = tables.nodes().time();
    let c = match child.as_index() {
        Some(c) => c,
        None => return 0.0,
    };
    match parent.get(c).and_then(|p| p.as_index()) {
        Some(p) => time[p].raw() - time[c].raw(),
        None => 0.0,
    }
}

/// The sum of all branch lengths in a tree.
///
/// Branch lengths are in the units of node times.
#[derive(Clone, Debug, Default)]
pub struct TotalBranchLength {
    total: f64,
}

impl TotalBranchLength {
    /// Create a new instance
    pub fn new() -> Self {
        Self::default()
    }
}

impl EdgeVisitor for TotalBranchLength {
    type Output = f64;

    fn on_edge_removed(&mut self, child: NodeId, parent: &[NodeId], tables: &TableCollection) {
        self.total -= branch_length(child, parent, tables);
    }

    fn on_edge_added(&mut self, child: NodeId, parent: &[NodeId], tables: &TableCollection) {
        self.total += branch_length(child, parent, tables);
    }

    fn result(&self) -> f64 {
        self.total
    }
}

/// Sum `time[parent] - time[child]` over all edges.
///
/// If `by_span` is `true`, each term is multiplied by the
/// edge's span.  The result then equals the sum, over all
/// trees, of each tree's total branch length times its span.
/// For tables with a single tree covering the whole genome,
/// `by_span == false` gives that tree's total branch length.
///
/// No index or sweep is involved.
pub fn edge_branch_length_sum(tables: &TableCollection, by_span: bool) -> f64 {
    let time = tables.nodes().time();
    tables
        .edges()
        .iter()
        .map(|e| {
            let length = match (e.parent.as_index(), e.child.as_index()) {
                (Some(p), Some(c)) => time[p].raw() - time[c].raw(),
                _ => 0.0,
            };
            if by_span {
                length * e.span()
            } else {
                length
            }
        })
        .sum()
}
