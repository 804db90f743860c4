use crate::edge_index::{build_edge_index, EdgeIndex};
use crate::error::CoalseqError;
use crate::sweep::{NoVisitor, Sweep};
use crate::tables::{TableCollection, TableValidationFlags};
use crate::visitor::EdgeVisitor;
use bitflags::bitflags;
use coalseq_core::{NodeId, Position};
use std::borrow::Cow;

/// Error type related to [``TreeSequence``] and [``Tree``].
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum TreesError {
    /// Returned when a [`NodeId`] is not
    /// present in a [`Tree`] or [`TreeSequence`].
    #[error("Node ID out of range")]
    NodeIdOutOfRange,
    /// Returned if a tree sequence is
    /// initialized with no samples.
    #[error("No samples found.")]
    NoSamples,
    /// Returned when an [`EdgeIndex`] was not built
    /// from the tables it is used with.
    #[error("Edge index does not match the tables.")]
    IndexMismatch,
}

/// Result type for operations on trees and tree sequences.
pub type TreesResult<T> = Result<T, TreesError>;

trait NodeIterator {
    fn next_node(&mut self);
    fn current_node(&mut self) -> Option<NodeId>;
}

struct ParentsIterator<'a> {
    current_node: Option<NodeId>,
    next_node: NodeId,
    parent: &'a [NodeId],
}

impl<'a> ParentsIterator<'a> {
    fn new(parent: &'a [NodeId], u: NodeId) -> Self {
        ParentsIterator {
            current_node: None,
            next_node: u,
            parent,
        }
    }
}

impl NodeIterator for ParentsIterator<'_> {
    fn next_node(&mut self) {
        self.current_node = match self.next_node.as_index() {
            None => None,
            Some(r) => {
                let cr = Some(self.next_node);
                self.next_node = self.parent[r];
                cr
            }
        };
    }

    fn current_node(&mut self) -> Option<NodeId> {
        self.current_node
    }
}

iterator_for_nodeiterator!(ParentsIterator<'_>);

/// A tree is the genealogy of a non-recombining
/// segment of a genome.
///
/// A `Tree` is a [`StreamingIterator`](streaming_iterator::StreamingIterator):
/// each call to `next` moves it to the tree covering the
/// next interval of the genome, left to right.
///
/// Obtain one from [`traverse`] or [`TreeSequence::tree_iterator`].
pub struct Tree<'a> {
    tables: &'a TableCollection,
    sweep: Sweep<'a>,
    samples: Cow<'a, [NodeId]>,
    advanced: bool,
}

impl<'a> Tree<'a> {
    fn new(tables: &'a TableCollection, index: &'a EdgeIndex, samples: Cow<'a, [NodeId]>) -> Self {
        Self {
            tables,
            sweep: Sweep::new(index, tables.num_nodes()),
            samples,
            advanced: false,
        }
    }

    fn id_in_range<N: Into<NodeId>>(&self, u: N) -> TreesResult<usize> {
        u.into()
            .as_index()
            .filter(|&i| i < self.num_nodes())
            .ok_or(TreesError::NodeIdOutOfRange)
    }

    /// Return the `[left, right)` [`Position`] for
    /// which this tree is the genealogy.
    pub fn range(&self) -> (Position, Position) {
        self.sweep.range()
    }

    /// Return the length of this tree along the genome.
    pub fn span(&self) -> f64 {
        let (left, right) = self.range();
        right.raw() - left.raw()
    }

    /// The number of nodes in the tables.
    pub fn num_nodes(&self) -> usize {
        self.tables.num_nodes()
    }

    /// Return the parent of node `u`.
    ///
    /// # Errors
    ///
    /// [`TreesError::NodeIdOutOfRange`] if `u` is out of range.
    pub fn parent<N: Into<NodeId>>(&self, u: N) -> TreesResult<NodeId> {
        let i = self.id_in_range(u)?;
        Ok(self.sweep.parent_array()[i])
    }

    /// The parent of every node, indexed by [`NodeId`].
    ///
    /// Nodes not in the current tree, and roots,
    /// have a parent of [`NodeId::NULL`].
    pub fn parent_array(&self) -> &[NodeId] {
        self.sweep.parent_array()
    }

    /// Return an [`Iterator`] from the node `u` to the root of the tree,
    /// travering all parent nodes.
    ///
    /// The first value is `u` itself.
    ///
    /// # Errors
    ///
    /// [`TreesError::NodeIdOutOfRange`] if `u` is out of range.
    pub fn parents<N: Into<NodeId> + Copy>(
        &self,
        u: N,
    ) -> TreesResult<impl Iterator<Item = NodeId> + '_> {
        self.id_in_range(u)?;
        Ok(ParentsIterator::new(self.parent_array(), u.into()))
    }

    /// Return all roots as a vector.
    ///
    /// A root is the top-most ancestor of at least one sample.
    /// Roots are returned in increasing id order.
    pub fn roots_to_vec(&self) -> Vec<NodeId> {
        let parent = self.parent_array();
        let mut is_root = vec![false; parent.len()];
        for s in self.samples.iter() {
            if let Some(root) = ParentsIterator::new(parent, *s).last() {
                if let Some(r) = root.as_index() {
                    is_root[r] = true;
                }
            }
        }
        is_root
            .iter()
            .enumerate()
            .filter(|(_, r)| **r)
            .filter_map(|(i, _)| NodeId::try_from(i).ok())
            .collect()
    }

    /// Return an [`Iterator`] over the roots of the tree.
    ///
    /// See [`Tree::roots_to_vec`].
    pub fn roots(&self) -> impl Iterator<Item = NodeId> {
        self.roots_to_vec().into_iter()
    }

    /// Return a slice of the samples in this tree.
    pub fn sample_nodes(&self) -> &[NodeId] {
        &self.samples
    }

    /// Calculate the total length of the tree.
    ///
    /// # Parameters
    ///
    /// * `by_span`: if `true`, multiply the return value by [`Tree::span`].
    pub fn total_branch_length(&self, by_span: bool) -> f64 {
        let time = self.tables.nodes().time();
        let b: f64 = self
            .parent_array()
            .iter()
            .enumerate()
            .filter_map(|(c, p)| p.as_index().map(|p| time[p].raw() - time[c].raw()))
            .sum();
        match by_span {
            true => b * self.span(),
            false => b,
        }
    }

    /// Start over from the left end of the genome.
    ///
    /// The next call to `next` returns the first tree.
    pub fn reset(&mut self) {
        self.sweep.reset();
        self.advanced = false;
    }
}

/// Left-to-right iteration of trees.
impl<'a> streaming_iterator::StreamingIterator for Tree<'a> {
    type Item = Tree<'a>;

    fn advance(&mut self) {
        self.advanced = self.sweep.advance(self.tables, &mut NoVisitor);
    }

    fn get(&self) -> Option<&Self::Item> {
        match self.advanced {
            true => Some(self),
            false => None,
        }
    }
}

/// Left-to-right iteration of the results of an [`EdgeVisitor`].
///
/// Yields [`EdgeVisitor::result`] once per tree.
/// Obtain one from [`traverse_with_visitor`] or
/// [`TreeSequence::statistic_iterator`].
pub struct StatisticIterator<'a, V> {
    tables: &'a TableCollection,
    sweep: Sweep<'a>,
    visitor: V,
    interval: Option<(Position, Position)>,
}

impl<'a, V: EdgeVisitor> StatisticIterator<'a, V> {
    fn new(tables: &'a TableCollection, index: &'a EdgeIndex, visitor: V) -> Self {
        Self {
            tables,
            sweep: Sweep::new(index, tables.num_nodes()),
            visitor,
            interval: None,
        }
    }

    /// The `[left, right)` interval of the most recent result.
    ///
    /// `None` before the first call to `next`.
    pub fn current_interval(&self) -> Option<(Position, Position)> {
        self.interval
    }

    /// Get the visitor back, consuming `self`.
    pub fn into_visitor(self) -> V {
        self.visitor
    }
}

impl<V: EdgeVisitor> Iterator for StatisticIterator<'_, V> {
    type Item = V::Output;

    fn next(&mut self) -> Option<Self::Item> {
        if self.sweep.advance(self.tables, &mut self.visitor) {
            self.interval = Some(self.sweep.range());
            Some(self.visitor.result())
        } else {
            None
        }
    }
}

fn check_index(tables: &TableCollection, index: &EdgeIndex) -> TreesResult<()> {
    if index.matches(tables) {
        Ok(())
    } else {
        Err(TreesError::IndexMismatch)
    }
}

/// Iterate over the trees described by `tables`.
///
/// # Errors
///
/// [`TreesError::IndexMismatch`] if `index` was not built from `tables`.
///
/// # Example
///
/// ```
/// use coalseq::prelude::*;
/// use streaming_iterator::StreamingIterator;
///
/// let mut tables = TableCollection::new(1.).unwrap();
/// tables.add_sample(0., DemeId::NULL).unwrap();
/// tables.add_sample(0., DemeId::NULL).unwrap();
/// tables.add_node(1., DemeId::NULL).unwrap();
/// tables.add_edge(0., 1., 2, 0).unwrap();
/// tables.add_edge(0., 1., 2, 1).unwrap();
/// let index = build_edge_index(&tables).unwrap();
/// let mut trees = traverse(&tables, &index).unwrap();
/// while let Some(tree) = trees.next() {
///     assert_eq!(tree.parent(0).unwrap(), 2);
///     assert_eq!(tree.roots_to_vec(), vec![NodeId::from(2)]);
/// }
/// ```
pub fn traverse<'a>(tables: &'a TableCollection, index: &'a EdgeIndex) -> TreesResult<Tree<'a>> {
    check_index(tables, index)?;
    Ok(Tree::new(
        tables,
        index,
        Cow::Owned(tables.sample_nodes()),
    ))
}

/// Run `visitor` over the trees described by `tables`.
///
/// # Errors
///
/// [`TreesError::IndexMismatch`] if `index` was not built from `tables`.
pub fn traverse_with_visitor<'a, V: EdgeVisitor>(
    tables: &'a TableCollection,
    index: &'a EdgeIndex,
    visitor: V,
) -> TreesResult<StatisticIterator<'a, V>> {
    check_index(tables, index)?;
    Ok(StatisticIterator::new(tables, index, visitor))
}

bitflags! {
    /// Bit flags modifying the behavior of [`TreeSequence`]
    /// initialization.
    #[derive(Default)]
    pub struct TreeSequenceFlags: u32 {
        /// Do not validate tables when creating a [`TreeSequence`]
        const NO_TABLE_VALIDATION = 1 << 0;
    }
}

/// A tree sequence.
///
/// Owns a [`TableCollection`] together with its [`EdgeIndex`].
#[derive(Clone, Debug)]
pub struct TreeSequence {
    tables: TableCollection,
    index: EdgeIndex,
    samples: Vec<NodeId>,
    num_trees: usize,
}

impl TreeSequence {
    /// Create a new tree sequence from a [`TableCollection`].
    ///
    /// The input tables are consumed, owned by the tree sequence.
    ///
    /// By default, the tables will be validated.
    /// To disable validation, `flags` should contain
    /// [`TreeSequenceFlags::NO_TABLE_VALIDATION`].
    ///
    /// The list of samples is taken from the node flags.
    ///
    /// # Errors
    ///
    /// [`TablesError`](crate::TablesError) if table validation fails.
    ///
    /// [`TreesError::NoSamples`] if no node is a sample.
    pub fn new(tables: TableCollection, flags: TreeSequenceFlags) -> Result<Self, CoalseqError> {
        if !flags.contains(TreeSequenceFlags::NO_TABLE_VALIDATION) {
            tables.validate(TableValidationFlags::default())?;
        }
        let samples = tables.sample_nodes();
        if samples.is_empty() {
            return Err(TreesError::NoSamples.into());
        }
        let index = build_edge_index(&tables)?;
        let num_trees = index.count_trees();
        Ok(Self {
            tables,
            index,
            samples,
            num_trees,
        })
    }

    /// Get a reference to the underlying [`TableCollection`].
    pub fn tables(&self) -> &TableCollection {
        &self.tables
    }

    /// Move the underlying [`TableCollection`], consuming `self`.
    pub fn into_tables(self) -> TableCollection {
        self.tables
    }

    /// Get a reference to the [`EdgeIndex`].
    pub fn edge_index(&self) -> &EdgeIndex {
        &self.index
    }

    /// Return a streaming iterator over all [`Tree`]
    /// objects in the tree sequence.
    pub fn tree_iterator(&self) -> Tree<'_> {
        Tree::new(&self.tables, &self.index, Cow::Borrowed(self.samples.as_slice()))
    }

    /// Return an iterator over the results of `visitor`,
    /// one per tree.
    pub fn statistic_iterator<V: EdgeVisitor>(&self, visitor: V) -> StatisticIterator<'_, V> {
        StatisticIterator::new(&self.tables, &self.index, visitor)
    }

    /// The sample nodes
    pub fn sample_nodes(&self) -> &[NodeId] {
        &self.samples
    }

    /// The number of trees in the tree sequence
    pub fn num_trees(&self) -> usize {
        self.num_trees
    }
}

#[cfg(test)]
mod test_trees {
    use super::*;
    use coalseq_core::DemeId;
    use streaming_iterator::StreamingIterator;

    pub fn make_small_table_collection_two_trees() -> TableCollection {
        // The two trees are:
        //  0
        // +++
        // | |  1
        // | | +++
        // 2 3 4 5

        //     0
        //   +-+-+
        //   1   |
        // +-+-+ |
        // 2 4 5 3

        let mut tables = TableCollection::new(1000.).unwrap();
        tables.add_node(2., DemeId::NULL).unwrap();
        tables.add_node(1., DemeId::NULL).unwrap();
        for _ in 0..4 {
            tables.add_sample(0., DemeId::NULL).unwrap();
        }
        tables.add_edge(500., 1000., 0, 1).unwrap();
        tables.add_edge(0., 500., 0, 2).unwrap();
        tables.add_edge(0., 1000., 0, 3).unwrap();
        tables.add_edge(500., 1000., 1, 2).unwrap();
        tables.add_edge(0., 1000., 1, 4).unwrap();
        tables.add_edge(0., 1000., 1, 5).unwrap();
        tables
            .validate(TableValidationFlags::VALIDATE_ALL)
            .unwrap();
        tables
    }

    #[test]
    fn test_treeseq_creation_and_table_access() {
        let mut tables = TableCollection::new(100.).unwrap();
        tables.add_node(1., DemeId::NULL).unwrap();
        tables.add_sample(0., DemeId::NULL).unwrap();
        tables.add_edge(0., 1., 0, 1).unwrap();

        let ts = TreeSequence::new(tables, TreeSequenceFlags::empty()).unwrap();
        assert_eq!(ts.tables().edges().len(), 1);
        // [0, 1) and [1, 100)
        assert_eq!(ts.num_trees(), 2);
        assert_eq!(ts.into_tables().num_nodes(), 2);
    }

    #[test]
    fn test_no_samples() {
        let mut tables = TableCollection::new(1.).unwrap();
        tables.add_node(0., DemeId::NULL).unwrap();
        let _ = TreeSequence::new(tables, TreeSequenceFlags::default()).map_or_else(
            |x: CoalseqError| {
                assert_eq!(
                    x,
                    CoalseqError::TreesError {
                        value: TreesError::NoSamples
                    }
                )
            },
            |_| panic!(),
        );
    }

    #[test]
    fn test_index_mismatch() {
        let tables = make_small_table_collection_two_trees();
        let mut other = tables.clone();
        let index = build_edge_index(&tables).unwrap();
        other.add_node(5., DemeId::NULL).unwrap();
        assert!(matches!(
            traverse(&other, &index),
            Err(TreesError::IndexMismatch)
        ));
        assert!(matches!(
            traverse_with_visitor(&other, &index, crate::TotalBranchLength::new()),
            Err(TreesError::IndexMismatch)
        ));
    }

    #[test]
    fn test_two_trees() {
        let tables = make_small_table_collection_two_trees();
        let treeseq = TreeSequence::new(tables, TreeSequenceFlags::empty()).unwrap();
        assert_eq!(treeseq.sample_nodes().len(), 4);
        assert_eq!(treeseq.num_trees(), 2);

        let mut tree_iter = treeseq.tree_iterator();
        let mut ntrees = 0;
        let expected_roots = [vec![NodeId::from(0), NodeId::from(1)], vec![NodeId::from(0)]];
        let expected_ranges = [(0., 500.), (500., 1000.)];
        while let Some(tree) = tree_iter.next() {
            let (left, right) = tree.range();
            assert_eq!(left, expected_ranges[ntrees].0);
            assert_eq!(right, expected_ranges[ntrees].1);
            assert_eq!(tree.span(), 500.);
            assert_eq!(tree.roots_to_vec(), expected_roots[ntrees]);
            assert_eq!(tree.roots().count(), expected_roots[ntrees].len());
            if ntrees == 0 {
                assert_eq!(tree.parent(2).unwrap(), 0);
                assert_eq!(tree.parent(3).unwrap(), 0);
                assert_eq!(tree.parent(4).unwrap(), 1);
                assert_eq!(tree.parent(5).unwrap(), 1);
                assert_eq!(tree.parent(1).unwrap(), NodeId::NULL);
                // 2 + 2 + 1 + 1
                assert_eq!(tree.total_branch_length(false), 6.);
            } else {
                assert_eq!(tree.parent(2).unwrap(), 1);
                assert_eq!(tree.parent(1).unwrap(), 0);
                let path = tree.parents(5).unwrap().collect::<Vec<_>>();
                assert_eq!(path, vec![NodeId::from(5), NodeId::from(1), NodeId::from(0)]);
                // 1 + 1 + 1 + 1 + 2
                assert_eq!(tree.total_branch_length(false), 6.);
                assert_eq!(tree.total_branch_length(true), 3000.);
            }
            ntrees += 1;
        }
        assert_eq!(ntrees, 2);
    }

    #[test]
    fn test_node_out_of_range() {
        let tables = make_small_table_collection_two_trees();
        let index = build_edge_index(&tables).unwrap();
        let mut trees = traverse(&tables, &index).unwrap();
        let tree = trees.next().unwrap();
        assert_eq!(tree.parent(6), Err(TreesError::NodeIdOutOfRange));
        assert_eq!(tree.parent(-1), Err(TreesError::NodeIdOutOfRange));
        assert!(tree.parents(100).is_err());
    }

    #[test]
    fn test_reset() {
        let tables = make_small_table_collection_two_trees();
        let index = build_edge_index(&tables).unwrap();
        let mut trees = traverse(&tables, &index).unwrap();
        let mut first = 0;
        while trees.next().is_some() {
            first += 1;
        }
        assert!(trees.get().is_none());
        trees.reset();
        let mut second = 0;
        while let Some(tree) = trees.next() {
            if second == 0 {
                assert_eq!(tree.parent(2).unwrap(), 0);
            }
            second += 1;
        }
        assert_eq!(first, second);
    }

    #[test]
    fn test_statistic_iterator() {
        let tables = make_small_table_collection_two_trees();
        let treeseq = TreeSequence::new(tables, TreeSequenceFlags::empty()).unwrap();
        let mut stats = treeseq.statistic_iterator(crate::TotalBranchLength::new());
        assert!(stats.current_interval().is_none());
        assert_eq!(stats.next(), Some(6.));
        assert_eq!(
            stats.current_interval(),
            Some((Position::ZERO, Position::new_valid(500.)))
        );
        assert_eq!(stats.next(), Some(6.));
        assert_eq!(stats.next(), None);
        assert_eq!(stats.into_visitor().result(), 6.);
    }
}
