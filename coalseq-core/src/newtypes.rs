type LowLevelIdType = i32;

/// The id of a row in a node table.
///
/// ```
/// # use coalseq_core::NodeId;
/// let n = NodeId::from(-1);
/// assert_eq!(n, NodeId::NULL);
/// assert!(n.is_null());
/// assert_eq!(n.raw(), -1);
/// let n = NodeId::try_from(3_usize).unwrap();
/// assert_eq!(usize::try_from(n).unwrap(), 3);
/// ```
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, std::hash::Hash)]
pub struct NodeId(LowLevelIdType);

/// The id of a row in an edge table.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, std::hash::Hash)]
#[repr(transparent)]
pub struct EdgeId(LowLevelIdType);

/// The id of a deme (population).
///
/// [`DemeId::NULL`] means "no population".
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, std::hash::Hash)]
pub struct DemeId(LowLevelIdType);

impl_table_id!(NodeId, LowLevelIdType);
impl_table_id!(EdgeId, LowLevelIdType);
impl_table_id!(DemeId, LowLevelIdType);
