//! The standard neutral coalescent for one population.

use crate::error::CoalseqError;
use crate::lineages::ActiveLineages;
use crate::tables::TableCollection;
use coalseq_core::{DemeId, NodeId};
use coalseq_rng::CoalescentRng;

// Rate at which some pair among k lineages coalesces.
pub(crate) fn pairwise_coalescence_rate(k: usize) -> f64 {
    (k * k.saturating_sub(1)) as f64 / 2.0
}

pub(crate) fn sorted_pair(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Simulate the genealogy of `n` samples from
/// a single population.
///
/// This is the algorithm of Hudson (1990), recording
/// the genealogy as tables.  Time is in units of
/// `2N` generations and the genome is `[0, 1)`.
///
/// Sample nodes are `0..n`, at time zero.  Each
/// coalescence adds one ancestor node, so node
/// `n + i` is the ancestor created by the `i`-th
/// coalescence, and adds an edge to each of its
/// two children, smaller child id first.
///
/// # Errors
///
/// [`CoalseqError::InvalidArgument`] if `n < 2`.
///
/// # Example
///
/// ```
/// use coalseq::prelude::*;
///
/// let mut rng = coalseq_rng::Rng::new(101);
/// let tables = generate_single_population(10, &mut rng).unwrap();
/// assert_eq!(tables.num_nodes(), 19);
/// assert_eq!(tables.num_edges(), 18);
/// ```
pub fn generate_single_population<R: CoalescentRng + ?Sized>(
    n: usize,
    rng: &mut R,
) -> Result<TableCollection, CoalseqError> {
    if n < 2 {
        return Err(CoalseqError::invalid_argument(format!(
            "sample size must be at least 2, got {}",
            n
        )));
    }
    log::debug!("simulating a single population with {} samples", n);

    let mut tables = TableCollection::with_capacity(1.0, 2 * n - 1, 2 * (n - 1))?;
    for _ in 0..n {
        tables.add_sample(0.0, DemeId::NULL)?;
    }

    let mut active = ActiveLineages::from_samples(n)?;
    let mut time = 0.0;
    while active.len() > 1 {
        let k = active.len();
        time += rng.exponential(pairwise_coalescence_rate(k));
        let ancestor = tables.add_node(time, DemeId::NULL)?;
        let c1 = active.swap_remove(rng.uniform_index(k));
        let c2 = active.replace(rng.uniform_index(k - 1), ancestor);
        let (c1, c2) = sorted_pair(c1, c2);
        tables.add_edge(0.0, 1.0, ancestor, c1)?;
        tables.add_edge(0.0, 1.0, ancestor, c2)?;
        log::trace!("{} and {} coalesce into {} at {}", c1, c2, ancestor, time);
    }

    log::debug!("time to most recent common ancestor: {}", time);
    Ok(tables)
}

/// Expected time to the most recent common ancestor
/// of `n` samples, `2(1 - 1/n)`.
///
/// Returns `0.0` for `n < 2`.
pub fn expected_tmrca(n: usize) -> f64 {
    if n < 2 {
        return 0.0;
    }
    2.0 * (1.0 - 1.0 / n as f64)
}

/// Expected total branch length of the genealogy
/// of `n` samples, `2 * sum(1/i)` for `i` in `1..n`.
///
/// Returns `0.0` for `n < 2`.
pub fn expected_total_branch_length(n: usize) -> f64 {
    2.0 * (1..n).map(|i| 1.0 / i as f64).sum::<f64>()
}
