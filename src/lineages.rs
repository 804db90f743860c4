use coalseq_core::NodeId;

/// The lineages that have not yet found
/// a common ancestor, stored in dense slots.
///
/// Removal moves the last slot into the hole,
/// so every operation is `O(1)` and the occupied
/// slots are always `0..len()`.
///
/// # Example
///
/// ```
/// use coalseq::prelude::*;
///
/// let mut active = ActiveLineages::from_samples(4).unwrap();
/// let removed = active.swap_remove(1);
/// assert_eq!(removed, 1);
/// assert_eq!(active.as_slice(), &[0, 3, 2]);
/// let old = active.replace(0, NodeId::from(4));
/// assert_eq!(old, 0);
/// assert_eq!(active.as_slice(), &[4, 3, 2]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActiveLineages {
    nodes: Vec<NodeId>,
}

impl ActiveLineages {
    /// Fill slots `0..n` with node ids `0..n`.
    ///
    /// # Errors
    ///
    /// [`coalseq_core::Error`] if `n` does not fit in a [`NodeId`].
    pub fn from_samples(n: usize) -> Result<Self, coalseq_core::Error> {
        let nodes = (0..n)
            .map(NodeId::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { nodes })
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// `true` if no lineages remain
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The node in `slot`, if occupied.
    pub fn get(&self, slot: usize) -> Option<NodeId> {
        self.nodes.get(slot).copied()
    }

    /// Take the node out of `slot`, moving the last
    /// occupied slot into its place.
    ///
    /// # Panics
    ///
    /// If `slot >= self.len()`.
    pub fn swap_remove(&mut self, slot: usize) -> NodeId {
        self.nodes.swap_remove(slot)
    }

    /// Put `node` into `slot`, returning the node
    /// that was there.
    ///
    /// # Panics
    ///
    /// If `slot >= self.len()`.
    pub fn replace(&mut self, slot: usize, node: NodeId) -> NodeId {
        std::mem::replace(&mut self.nodes[slot], node)
    }

    /// The occupied slots
    pub fn as_slice(&self) -> &[NodeId] {
        &self.nodes
    }
}

#[cfg(test)]
mod test_active_lineages {
    use super::*;

    #[test]
    fn test_remove_last_slot() {
        let mut active = ActiveLineages::from_samples(3).unwrap();
        assert_eq!(active.swap_remove(2), 2);
        assert_eq!(active.as_slice(), &[0, 1]);
    }

    #[test]
    fn test_drain_to_empty() {
        let mut active = ActiveLineages::from_samples(5).unwrap();
        let mut removed = vec![];
        while !active.is_empty() {
            removed.push(active.swap_remove(0));
        }
        removed.sort();
        let expected = (0..5).map(NodeId::from).collect::<Vec<_>>();
        assert_eq!(removed, expected);
    }

    #[test]
    fn test_get() {
        let active = ActiveLineages::from_samples(2).unwrap();
        assert_eq!(active.get(1), Some(NodeId::from(1)));
        assert_eq!(active.get(2), None);
        assert_eq!(active.len(), 2);
    }

    #[test]
    #[should_panic]
    fn test_replace_out_of_range() {
        let mut active = ActiveLineages::from_samples(2).unwrap();
        active.replace(2, NodeId::from(2));
    }
}
