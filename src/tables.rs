use bitflags::bitflags;
use coalseq_core::{DemeId, EdgeId, NodeId, Position, Time};
use thiserror::Error;

/// Reasons for [`TablesError::InvalidTopology`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TopologyViolation {
    /// The parent is not strictly older than the child.
    ParentNotOlder,
    /// An edge of the same parent overlaps this one,
    /// but the child ids do not increase.
    ChildrenUnsorted,
    /// `left >= right`.
    EmptyInterval,
    /// The interval is not within `[0, L)`.
    OutsideGenome,
}

/// Error type related to [``TableCollection``]
#[derive(Error, Debug, PartialEq)]
pub enum TablesError {
    /// Returned by [``TableCollection::new``].
    #[error("Invalid sequence length: {found:?}")]
    InvalidSequenceLength {
        /// The invalid length
        found: f64,
    },
    /// Returned when a position is not a finite number.
    #[error("Invalid value for position: {found:?}")]
    InvalidPosition {
        /// The invalid position
        found: f64,
    },
    /// Returned when invalid times are encountered.
    #[error("Invalid value for time: {found:?}")]
    InvalidTime {
        /// The invalid time
        found: f64,
    },
    /// Returned when a deme's `ID` is neither NULL
    /// nor a registered population.
    #[error("Invalid value for deme: {found:?}")]
    InvalidDeme {
        /// The invalid deme `ID`
        found: DemeId,
    },
    /// Returned when an edge refers to a node
    /// that is not in the node table.
    #[error("Node is out of bounds: {found:?}")]
    NodeOutOfBounds {
        /// The invalid node `ID`
        found: NodeId,
    },
    /// Returned when an edge breaks the parent/child
    /// invariants of a tree sequence.
    #[error("Invalid topology for parent {parent}, child {child}: {reason:?}")]
    InvalidTopology {
        /// Parent of the offending edge
        parent: NodeId,
        /// Child of the offending edge
        child: NodeId,
        /// What went wrong
        reason: TopologyViolation,
    },
    /// A table grew beyond what its id type can address.
    #[error("{value}")]
    ConversionError {
        /// The redirected error
        #[from]
        value: coalseq_core::Error,
    },
}

/// Result type for operations on tables
pub type TablesResult<T> = std::result::Result<T, TablesError>;

bitflags! {
    /// Set properties of a [`Node`].
    #[derive(Default)]
    pub struct NodeFlags: u32 {
        /// Default
        const NONE = 0;
        /// The node is a sample node.
        const IS_SAMPLE = 1 << 0;
    }
}

bitflags! {
    /// Modifies behavior of
    /// [``TableCollection::validate``]
    ///
    /// ```
    /// let f = coalseq::TableValidationFlags::default();
    /// assert_eq!(f.contains(coalseq::TableValidationFlags::VALIDATE_ALL), true);
    /// ```
    pub struct TableValidationFlags: u32 {
        /// Validate the edge table
        const VALIDATE_EDGES = 1<<0;
        /// Validate the node table
        const VALIDATE_NODES = 1<<1;
        /// Validate all tables.
        /// This is also the "default" value.
        const VALIDATE_ALL = Self::VALIDATE_EDGES.bits|Self::VALIDATE_NODES.bits;
    }
}

impl Default for TableValidationFlags {
    fn default() -> Self {
        TableValidationFlags::VALIDATE_ALL
    }
}

/// A row of a [`NodeTable`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Node {
    /// Time of the node, measured backwards from the present.
    pub time: Time,
    /// Population (deme) of node.
    /// [`DemeId::NULL`] if the node has no population.
    pub deme: DemeId,
    /// Bit flags.  See [`NodeFlags`].
    pub flags: u32,
}

impl Node {
    /// `true` if [`NodeFlags::IS_SAMPLE`] is set.
    pub fn is_sample(&self) -> bool {
        self.flags & NodeFlags::IS_SAMPLE.bits() > 0
    }
}

/// A row of an [`EdgeTable`].
///
/// An edge is a record of transmission of
/// a half-open chunk of genome `[left, right)`
/// from `parent` to `child`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Edge {
    /// Left end
    pub left: Position,
    /// Right end
    pub right: Position,
    /// Index of parent in a [`NodeTable`]
    pub parent: NodeId,
    /// Index of child in a [`NodeTable`]
    pub child: NodeId,
}

impl Edge {
    /// Length of the genomic interval covered by the edge.
    pub fn span(&self) -> f64 {
        self.right.raw() - self.left.raw()
    }

    fn overlaps(&self, other: &Edge) -> bool {
        self.left < other.right && other.left < self.right
    }
}

/// A node table stored as columns.
///
/// Row `i` is the node with id `i`.
#[derive(Clone, Debug, Default)]
pub struct NodeTable {
    time: Vec<Time>,
    deme: Vec<DemeId>,
    flags: Vec<u32>,
}

impl NodeTable {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            time: Vec::with_capacity(capacity),
            deme: Vec::with_capacity(capacity),
            flags: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, node: Node) {
        self.time.push(node.time);
        self.deme.push(node.deme);
        self.flags.push(node.flags);
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// `true` if there are no rows
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// The time column
    pub fn time(&self) -> &[Time] {
        &self.time
    }

    /// The deme column
    pub fn deme(&self) -> &[DemeId] {
        &self.deme
    }

    /// The flags column
    pub fn flags(&self) -> &[u32] {
        &self.flags
    }

    /// Return row `i`, or `None` if `i` is out of range.
    pub fn row<N: Into<NodeId>>(&self, i: N) -> Option<Node> {
        let index = i.into().as_index()?;
        Some(Node {
            time: *self.time.get(index)?,
            deme: self.deme[index],
            flags: self.flags[index],
        })
    }

    /// Iterate over all rows
    pub fn iter(&self) -> impl Iterator<Item = Node> + '_ {
        self.time
            .iter()
            .zip(self.deme.iter())
            .zip(self.flags.iter())
            .map(|((&time, &deme), &flags)| Node { time, deme, flags })
    }
}

/// An edge table stored as columns.
#[derive(Clone, Debug, Default)]
pub struct EdgeTable {
    left: Vec<Position>,
    right: Vec<Position>,
    parent: Vec<NodeId>,
    child: Vec<NodeId>,
}

impl EdgeTable {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            left: Vec::with_capacity(capacity),
            right: Vec::with_capacity(capacity),
            parent: Vec::with_capacity(capacity),
            child: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, edge: Edge) {
        self.left.push(edge.left);
        self.right.push(edge.right);
        self.parent.push(edge.parent);
        self.child.push(edge.child);
    }

    fn get(&self, index: usize) -> Edge {
        Edge {
            left: self.left[index],
            right: self.right[index],
            parent: self.parent[index],
            child: self.child[index],
        }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// `true` if there are no rows
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// The left column
    pub fn left(&self) -> &[Position] {
        &self.left
    }

    /// The right column
    pub fn right(&self) -> &[Position] {
        &self.right
    }

    /// The parent column
    pub fn parent(&self) -> &[NodeId] {
        &self.parent
    }

    /// The child column
    pub fn child(&self) -> &[NodeId] {
        &self.child
    }

    /// Return row `i`, or `None` if `i` is out of range.
    pub fn row<E: Into<EdgeId>>(&self, i: E) -> Option<Edge> {
        let index = i.into().as_index()?;
        if index < self.len() {
            Some(self.get(index))
        } else {
            None
        }
    }

    /// Iterate over all rows
    pub fn iter(&self) -> impl Iterator<Item = Edge> + '_ {
        (0..self.len()).map(|i| self.get(i))
    }
}

fn node_time(nodes: &NodeTable, node: NodeId) -> TablesResult<Time> {
    node.as_index()
        .and_then(|i| nodes.time.get(i).copied())
        .ok_or(TablesError::NodeOutOfBounds { found: node })
}

fn check_deme(deme: DemeId, num_populations: usize) -> TablesResult<()> {
    match deme.as_index() {
        None if deme.is_null() => Ok(()),
        Some(d) if d < num_populations => Ok(()),
        _ => Err(TablesError::InvalidDeme { found: deme }),
    }
}

fn invalid_topology(edge: &Edge, reason: TopologyViolation) -> TablesError {
    TablesError::InvalidTopology {
        parent: edge.parent,
        child: edge.child,
        reason,
    }
}

fn check_edge(sequence_length: Position, nodes: &NodeTable, edge: &Edge) -> TablesResult<()> {
    if edge.left >= edge.right {
        return Err(invalid_topology(edge, TopologyViolation::EmptyInterval));
    }
    if edge.right > sequence_length {
        return Err(invalid_topology(edge, TopologyViolation::OutsideGenome));
    }
    let parent_time = node_time(nodes, edge.parent)?;
    let child_time = node_time(nodes, edge.child)?;
    if parent_time <= child_time {
        return Err(invalid_topology(edge, TopologyViolation::ParentNotOlder));
    }
    Ok(())
}

// The most recent edge of each parent, indexed by parent id.
#[derive(Clone, Debug, Default)]
struct LastEdgeByParent(Vec<Option<Edge>>);

impl LastEdgeByParent {
    // The parent id must already be known to be in bounds.
    fn check(&self, edge: &Edge) -> TablesResult<()> {
        let previous = edge.parent.as_index().and_then(|p| self.0.get(p).copied());
        match previous {
            Some(Some(p)) if p.overlaps(edge) && edge.child <= p.child => Err(invalid_topology(
                edge,
                TopologyViolation::ChildrenUnsorted,
            )),
            _ => Ok(()),
        }
    }

    fn record(&mut self, edge: Edge) {
        if let Some(p) = edge.parent.as_index() {
            if p >= self.0.len() {
                self.0.resize(p + 1, None);
            }
            self.0[p] = Some(edge);
        }
    }
}

// Non-finite values are malformed input; finite values
// outside the genome are a topology problem.
fn edge_position(value: f64, edge: &Edge) -> TablesResult<Position> {
    if !value.is_finite() {
        return Err(TablesError::InvalidPosition { found: value });
    }
    Position::new(value).ok_or_else(|| invalid_topology(edge, TopologyViolation::OutsideGenome))
}

/// Perform a data integrity check on an [``EdgeTable``].
///
/// # Parameters
///
/// * `sequence_length`, the genome length of the tables.
/// * `edges`, the [``EdgeTable``]
/// * `nodes`, the [``NodeTable``]
///
/// # Return
///
/// Returns ``Ok(true)`` if the tables pass all tests,
/// allowing use in [``debug_assert``].
///
/// # Errors
///
/// Will return [``TablesError``] if the tables are not valid.
pub fn validate_edge_table(
    sequence_length: Position,
    edges: &EdgeTable,
    nodes: &NodeTable,
) -> TablesResult<bool> {
    let mut last = LastEdgeByParent::default();
    for edge in edges.iter() {
        check_edge(sequence_length, nodes, &edge)?;
        last.check(&edge)?;
        last.record(edge);
    }
    Ok(true)
}

/// Check that every node's deme is NULL or
/// one of `num_populations` registered demes.
pub fn validate_node_table(nodes: &NodeTable, num_populations: usize) -> TablesResult<bool> {
    for deme in nodes.deme() {
        check_deme(*deme, num_populations)?;
    }
    Ok(true)
}

/// A collection of node and edge tables
/// plus the number of populations.
///
/// Tables are append-only: rows are never
/// removed or modified once added.
#[derive(Clone, Debug)]
pub struct TableCollection {
    sequence_length: Position,
    nodes_: NodeTable,
    edges_: EdgeTable,
    num_populations: usize,
    last_edge: LastEdgeByParent,
}

impl TableCollection {
    /// Create a new instance.
    ///
    /// # Parameters
    ///
    /// * `sequence_length`: the total genome length for the tables.
    ///
    /// # Errors
    ///
    /// Will return [``TablesError``] if `sequence_length` is not
    /// finite and positive.
    ///
    /// # Example
    ///
    /// ```
    /// let tables = coalseq::TableCollection::new(1.0).unwrap();
    /// assert_eq!(tables.sequence_length(), 1.0);
    /// assert!(coalseq::TableCollection::new(0.0).is_err());
    /// ```
    pub fn new<L: Into<f64>>(sequence_length: L) -> TablesResult<TableCollection> {
        Self::with_capacity(sequence_length, 0, 0)
    }

    /// Create a new instance with room for
    /// `num_nodes` nodes and `num_edges` edges.
    pub fn with_capacity<L: Into<f64>>(
        sequence_length: L,
        num_nodes: usize,
        num_edges: usize,
    ) -> TablesResult<TableCollection> {
        let length = sequence_length.into();
        match Position::new(length) {
            Some(p) if p > 0.0 => Ok(TableCollection {
                sequence_length: p,
                nodes_: NodeTable::with_capacity(num_nodes),
                edges_: EdgeTable::with_capacity(num_edges),
                num_populations: 0,
                last_edge: LastEdgeByParent::default(),
            }),
            _ => Err(TablesError::InvalidSequenceLength { found: length }),
        }
    }

    /// Register a new population.
    ///
    /// # Returns
    ///
    /// The [`DemeId`] of the new population.
    pub fn add_population(&mut self) -> TablesResult<DemeId> {
        let id = DemeId::try_from(self.num_populations)?;
        self.num_populations += 1;
        Ok(id)
    }

    /// Add a [``Node``] to the [``NodeTable``]
    ///
    /// # Parameters
    ///
    /// * `time`, the node time.
    /// * `deme`, the deme where the node is found,
    ///   or [`DemeId::NULL`].
    ///
    /// # Errors
    ///
    /// Will return [``TablesError``] if `time` is negative or
    /// not finite, or if `deme` is not a registered population.
    ///
    /// # Example
    ///
    /// ```
    /// use coalseq::prelude::*;
    ///
    /// let mut tables = TableCollection::new(1.).unwrap();
    /// let id = tables.add_node(0.5, DemeId::NULL).unwrap();
    /// assert_eq!(id, 0);
    /// assert!(tables.add_node(0.5, 0).is_err());
    /// ```
    pub fn add_node<T: Into<f64>, D: Into<DemeId>>(
        &mut self,
        time: T,
        deme: D,
    ) -> TablesResult<NodeId> {
        self.add_node_with_flags(time, deme, NodeFlags::default())
    }

    /// Add a [``Node``] to the [``NodeTable``] with flags set.
    pub fn add_node_with_flags<T: Into<f64>, D: Into<DemeId>>(
        &mut self,
        time: T,
        deme: D,
        flags: NodeFlags,
    ) -> TablesResult<NodeId> {
        let t = time.into();
        let time = Time::new(t).ok_or(TablesError::InvalidTime { found: t })?;
        let deme = deme.into();
        check_deme(deme, self.num_populations)?;
        let id = NodeId::try_from(self.nodes_.len())?;
        self.nodes_.push(Node {
            time,
            deme,
            flags: flags.bits(),
        });
        Ok(id)
    }

    /// Add a sample node.
    ///
    /// Shorthand for [`TableCollection::add_node_with_flags`]
    /// with [`NodeFlags::IS_SAMPLE`].
    pub fn add_sample<T: Into<f64>, D: Into<DemeId>>(
        &mut self,
        time: T,
        deme: D,
    ) -> TablesResult<NodeId> {
        self.add_node_with_flags(time, deme, NodeFlags::IS_SAMPLE)
    }

    /// Add an [``Edge``] to the [``EdgeTable``].
    ///
    /// # Parameters
    ///
    /// * `left`, the left end of the edge
    /// * `right`, the right end of the edge
    /// * `parent`, the parent of the edge
    /// * `child`, the child of the edge
    ///
    /// # Errors
    ///
    /// Will return [``TablesError``] if:
    ///
    /// * `left` or `right` is not finite.
    /// * `[left, right)` is empty or not within the genome.
    /// * `parent` or `child` are not in the node table.
    /// * `parent` is not older than `child`.
    /// * The most recent edge with the same parent overlaps
    ///   `[left, right)` and has a child id that is not smaller
    ///   than `child`.
    ///
    /// # Example
    ///
    /// ```
    /// use coalseq::prelude::*;
    ///
    /// let mut tables = TableCollection::new(1.).unwrap();
    /// let c = tables.add_sample(0., DemeId::NULL).unwrap();
    /// let p = tables.add_node(1., DemeId::NULL).unwrap();
    /// let id = tables.add_edge(0., 1., p, c).unwrap();
    /// assert_eq!(id, 0);
    /// assert!(tables.add_edge(0., 1., c, p).is_err());
    /// ```
    pub fn add_edge<L: Into<f64>, R: Into<f64>, P: Into<NodeId>, C: Into<NodeId>>(
        &mut self,
        left: L,
        right: R,
        parent: P,
        child: C,
    ) -> TablesResult<EdgeId> {
        let (left, right) = (left.into(), right.into());
        let mut edge = Edge {
            left: Position::ZERO,
            right: Position::ZERO,
            parent: parent.into(),
            child: child.into(),
        };
        edge.left = edge_position(left, &edge)?;
        edge.right = edge_position(right, &edge)?;
        check_edge(self.sequence_length, &self.nodes_, &edge)?;
        self.last_edge.check(&edge)?;
        let id = EdgeId::try_from(self.edges_.len())?;
        self.last_edge.record(edge);
        self.edges_.push(edge);
        Ok(id)
    }

    /// Get genome length
    pub fn sequence_length(&self) -> Position {
        self.sequence_length
    }

    /// Return immutable reference to the [``NodeTable``]
    pub fn nodes(&self) -> &NodeTable {
        &self.nodes_
    }

    /// Return immutable reference to the [``EdgeTable``]
    pub fn edges(&self) -> &EdgeTable {
        &self.edges_
    }

    /// Return the i-th [``Node``].
    pub fn node<N: Into<NodeId>>(&self, i: N) -> Option<Node> {
        self.nodes_.row(i)
    }

    /// Return the i-th [``Edge``].
    pub fn edge<E: Into<EdgeId>>(&self, i: E) -> Option<Edge> {
        self.edges_.row(i)
    }

    /// Return number of nodes
    pub fn num_nodes(&self) -> usize {
        self.nodes_.len()
    }

    /// Return number of edges
    pub fn num_edges(&self) -> usize {
        self.edges_.len()
    }

    /// Return number of populations
    pub fn num_populations(&self) -> usize {
        self.num_populations
    }

    /// All nodes with [`NodeFlags::IS_SAMPLE`] set,
    /// in increasing id order.
    pub fn sample_nodes(&self) -> Vec<NodeId> {
        self.nodes_
            .flags()
            .iter()
            .enumerate()
            .filter(|(_, f)| *f & NodeFlags::IS_SAMPLE.bits() > 0)
            .filter_map(|(i, _)| NodeId::try_from(i).ok())
            .collect()
    }

    /// Run a validation check on the tables.
    pub fn validate(&self, flags: TableValidationFlags) -> TablesResult<bool> {
        if flags.contains(TableValidationFlags::VALIDATE_NODES) {
            validate_node_table(&self.nodes_, self.num_populations)?;
        }
        if flags.contains(TableValidationFlags::VALIDATE_EDGES) {
            validate_edge_table(self.sequence_length, &self.edges_, &self.nodes_)?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod test_tables {

    use super::*;

    fn two_samples_and_a_parent() -> TableCollection {
        let mut tables = TableCollection::new(1.).unwrap();
        tables.add_sample(0., DemeId::NULL).unwrap();
        tables.add_sample(0., DemeId::NULL).unwrap();
        tables.add_node(1., DemeId::NULL).unwrap();
        tables
    }

    #[test]
    fn test_bad_sequence_length() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let _ = TableCollection::new(bad).map_or_else(
                |x: TablesError| assert!(matches!(x, TablesError::InvalidSequenceLength { .. })),
                |_| panic!(),
            );
        }
    }

    #[test]
    fn test_add_node() {
        let mut tables = TableCollection::new(1.).unwrap();
        let n = tables.add_sample(0., DemeId::NULL).unwrap();
        assert_eq!(n, 0);
        let n = tables.add_node(0.25, DemeId::NULL).unwrap();
        assert_eq!(n, 1);
        assert_eq!(tables.num_nodes(), 2);
        assert!(tables.node(0).unwrap().is_sample());
        assert!(!tables.node(1).unwrap().is_sample());
        assert_eq!(tables.node(1).unwrap().time, 0.25);
        assert!(tables.node(2).is_none());
        assert!(tables.node(NodeId::NULL).is_none());
        assert_eq!(tables.sample_nodes(), vec![NodeId::from(0)]);
    }

    #[test]
    fn test_add_node_bad_time() {
        let mut tables = TableCollection::new(1.).unwrap();
        let _ = tables.add_node(-1., DemeId::NULL).map_or_else(
            |x: TablesError| assert_eq!(x, TablesError::InvalidTime { found: -1. }),
            |_| panic!(),
        );
        assert!(tables.add_node(f64::NAN, DemeId::NULL).is_err());
        assert_eq!(tables.num_nodes(), 0);
    }

    #[test]
    fn test_add_node_requires_registered_deme() {
        let mut tables = TableCollection::new(1.).unwrap();
        let _ = tables.add_node(0., 0).map_or_else(
            |x: TablesError| {
                assert_eq!(
                    x,
                    TablesError::InvalidDeme {
                        found: DemeId::from(0)
                    }
                )
            },
            |_| panic!(),
        );
        let d0 = tables.add_population().unwrap();
        let d1 = tables.add_population().unwrap();
        assert_eq!(d0, 0);
        assert_eq!(d1, 1);
        assert!(tables.add_node(0., d1).is_ok());
        assert!(tables.add_node(0., 2).is_err());
        assert_eq!(tables.num_populations(), 2);
    }

    #[test]
    fn test_add_edge() {
        let mut tables = two_samples_and_a_parent();
        let result = tables.add_edge(0., 1., 2, 0).unwrap();
        assert_eq!(result, 0);
        let result = tables.add_edge(0., 1., 2, 1).unwrap();
        assert_eq!(result, 1);
        assert_eq!(tables.num_edges(), 2);
        let e = tables.edge(1).unwrap();
        assert_eq!(e.parent, 2);
        assert_eq!(e.child, 1);
        assert_eq!(e.span(), 1.0);
        assert_eq!(tables.edges().child(), &[NodeId::from(0), NodeId::from(1)]);
        assert!(tables.validate(TableValidationFlags::default()).unwrap());
    }

    #[test]
    fn test_add_edge_bad_positions() {
        let mut tables = two_samples_and_a_parent();

        let _ = tables.add_edge(f64::NAN, 1., 2, 0).map_or_else(
            |x: TablesError| assert!(matches!(x, TablesError::InvalidPosition { .. })),
            |_| panic!(),
        );

        let _ = tables.add_edge(0., f64::INFINITY, 2, 0).map_or_else(
            |x: TablesError| {
                assert_eq!(
                    x,
                    TablesError::InvalidPosition {
                        found: f64::INFINITY
                    }
                )
            },
            |_| panic!(),
        );

        for (left, right, reason) in [
            (0.5, 0.5, TopologyViolation::EmptyInterval),
            (0.75, 0.25, TopologyViolation::EmptyInterval),
            (0.5, 1.5, TopologyViolation::OutsideGenome),
            (-1., 1., TopologyViolation::OutsideGenome),
        ] {
            let _ = tables.add_edge(left, right, 2, 0).map_or_else(
                |x: TablesError| {
                    assert_eq!(
                        x,
                        TablesError::InvalidTopology {
                            parent: 2.into(),
                            child: 0.into(),
                            reason
                        }
                    )
                },
                |_| panic!(),
            );
        }
        assert_eq!(tables.num_edges(), 0);
    }

    #[test]
    fn test_add_edge_bad_nodes() {
        let mut tables = two_samples_and_a_parent();

        let _ = tables.add_edge(0., 1., -1, 0).map_or_else(
            |x: TablesError| assert_eq!(x, TablesError::NodeOutOfBounds { found: NodeId::NULL }),
            |_| panic!(),
        );

        let _ = tables.add_edge(0., 1., 2, 3).map_or_else(
            |x: TablesError| {
                assert_eq!(
                    x,
                    TablesError::NodeOutOfBounds {
                        found: NodeId::from(3)
                    }
                )
            },
            |_| panic!(),
        );
    }

    #[test]
    fn test_parent_must_be_older() {
        let mut tables = two_samples_and_a_parent();
        // Same time
        let _ = tables.add_edge(0., 1., 1, 0).map_or_else(
            |x: TablesError| {
                assert_eq!(
                    x,
                    TablesError::InvalidTopology {
                        parent: 1.into(),
                        child: 0.into(),
                        reason: TopologyViolation::ParentNotOlder
                    }
                )
            },
            |_| panic!(),
        );
        // Reversed
        assert!(tables.add_edge(0., 1., 0, 2).is_err());
    }

    #[test]
    fn test_children_must_increase() {
        let mut tables = two_samples_and_a_parent();
        tables.add_edge(0., 1., 2, 1).unwrap();
        let _ = tables.add_edge(0., 1., 2, 0).map_or_else(
            |x: TablesError| {
                assert_eq!(
                    x,
                    TablesError::InvalidTopology {
                        parent: 2.into(),
                        child: 0.into(),
                        reason: TopologyViolation::ChildrenUnsorted
                    }
                )
            },
            |_| panic!(),
        );
        // Duplicates are also out of order
        assert!(tables.add_edge(0., 1., 2, 1).is_err());
    }

    #[test]
    fn test_children_may_repeat_on_disjoint_intervals() {
        let mut tables = two_samples_and_a_parent();
        tables.add_edge(0.5, 1., 2, 1).unwrap();
        tables.add_edge(0., 0.5, 2, 1).unwrap();
        tables.add_edge(0., 0.5, 2, 0).unwrap_err();
        assert_eq!(tables.num_edges(), 2);
    }

    #[test]
    fn test_children_unsorted_across_other_parents() {
        let mut tables = TableCollection::new(1.).unwrap();
        tables.add_sample(0., DemeId::NULL).unwrap();
        tables.add_sample(0., DemeId::NULL).unwrap();
        tables.add_node(0.5, DemeId::NULL).unwrap();
        tables.add_node(1., DemeId::NULL).unwrap();
        tables.add_node(2., DemeId::NULL).unwrap();
        tables.add_edge(0., 1., 3, 1).unwrap();
        tables.add_edge(0., 1., 4, 3).unwrap();
        let _ = tables.add_edge(0., 1., 3, 0).map_or_else(
            |x: TablesError| {
                assert_eq!(
                    x,
                    TablesError::InvalidTopology {
                        parent: 3.into(),
                        child: 0.into(),
                        reason: TopologyViolation::ChildrenUnsorted
                    }
                )
            },
            |_| panic!(),
        );
        assert_eq!(tables.num_edges(), 2);
        // A rejected edge does not become the parent's last edge
        tables.add_edge(0., 1., 3, 2).unwrap();
        assert!(tables.validate(TableValidationFlags::default()).unwrap());
    }

    #[test]
    fn test_validate_edges_tracks_each_parent() {
        let mut unsorted = TableCollection::new(1.).unwrap();
        for t in [0., 0., 0.5, 1.] {
            unsorted.add_node(t, DemeId::NULL).unwrap();
        }
        let mut edges = EdgeTable::default();
        for (parent, child) in [(2, 1), (3, 2), (2, 0)] {
            edges.push(Edge {
                left: Position::ZERO,
                right: Position::new_valid(1.),
                parent: parent.into(),
                child: child.into(),
            });
        }
        assert!(matches!(
            validate_edge_table(unsorted.sequence_length(), &edges, unsorted.nodes()),
            Err(TablesError::InvalidTopology {
                reason: TopologyViolation::ChildrenUnsorted,
                ..
            })
        ));
        unsorted.add_edge(0., 1., 2, 0).unwrap();
        unsorted.add_edge(0., 1., 3, 2).unwrap();
        unsorted.add_edge(0., 1., 2, 1).unwrap();
        assert!(unsorted.validate(TableValidationFlags::default()).unwrap());
    }

    #[test]
    fn test_columns_and_rows_agree() {
        let mut tables = two_samples_and_a_parent();
        tables.add_edge(0., 1., 2, 0).unwrap();
        tables.add_edge(0., 1., 2, 1).unwrap();
        for (i, e) in tables.edges().iter().enumerate() {
            assert_eq!(tables.edges().left()[i], e.left);
            assert_eq!(tables.edges().right()[i], e.right);
            assert_eq!(tables.edges().parent()[i], e.parent);
            assert_eq!(tables.edges().child()[i], e.child);
        }
        for (i, n) in tables.nodes().iter().enumerate() {
            assert_eq!(tables.nodes().time()[i], n.time);
            assert_eq!(tables.nodes().deme()[i], n.deme);
            assert_eq!(tables.nodes().flags()[i], n.flags);
        }
    }

    #[test]
    fn test_validate_nodes() {
        let tables = two_samples_and_a_parent();
        assert!(validate_node_table(tables.nodes(), 0).unwrap());
        assert!(tables.validate(TableValidationFlags::VALIDATE_NODES).unwrap());
    }
}
