//! The coalescent with migration between two demes.

use crate::error::CoalseqError;
use crate::lineages::ActiveLineages;
use crate::single_deme::{pairwise_coalescence_rate, sorted_pair};
use crate::tables::TableCollection;
use coalseq_core::{DemeId, NodeId, Time};
use coalseq_rng::CoalescentRng;

/// A lineage moving between demes.
///
/// Looking backwards in time, `node` leaves `source`
/// and enters `dest`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MigrationRecord {
    /// When the migration happened
    pub time: Time,
    /// The migrating lineage
    pub node: NodeId,
    /// Deme before the event
    pub source: DemeId,
    /// Deme after the event
    pub dest: DemeId,
}

/// The migration events of one simulation,
/// in the order they happened.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MigrationHistory {
    records: Vec<MigrationRecord>,
}

impl MigrationHistory {
    /// Number of migration events
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` if no lineage ever migrated
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All events, oldest last
    pub fn records(&self) -> &[MigrationRecord] {
        &self.records
    }

    /// Iterate over all events
    pub fn iter(&self) -> impl Iterator<Item = &MigrationRecord> + '_ {
        self.records.iter()
    }
}

// Active lineages plus, for each deme, the list of slots
// holding its lineages.  `label[slot]` is the deme of a slot
// and `position[slot]` is where that slot sits in its deme's list.
struct DemeState {
    active: ActiveLineages,
    label: Vec<usize>,
    position: Vec<usize>,
    slots: [Vec<usize>; 2],
}

impl DemeState {
    fn new(n0: usize, n1: usize) -> Result<Self, CoalseqError> {
        let nsam = n0 + n1;
        let label = (0..nsam).map(|slot| usize::from(slot >= n0)).collect();
        let position = (0..nsam)
            .map(|slot| if slot < n0 { slot } else { slot - n0 })
            .collect();
        Ok(Self {
            active: ActiveLineages::from_samples(nsam)?,
            label,
            position,
            slots: [(0..n0).collect(), (n0..nsam).collect()],
        })
    }

    fn total(&self) -> usize {
        self.active.len()
    }

    fn config(&self) -> [usize; 2] {
        [self.slots[0].len(), self.slots[1].len()]
    }

    fn coalescence_rates(&self) -> [f64; 2] {
        [
            pairwise_coalescence_rate(self.slots[0].len()),
            pairwise_coalescence_rate(self.slots[1].len()),
        ]
    }

    fn leave_deme(&mut self, slot: usize) {
        let deme = self.label[slot];
        let i = self.position[slot];
        self.slots[deme].swap_remove(i);
        if let Some(&moved) = self.slots[deme].get(i) {
            self.position[moved] = i;
        }
    }

    fn join_deme(&mut self, slot: usize, deme: usize) {
        self.label[slot] = deme;
        self.position[slot] = self.slots[deme].len();
        self.slots[deme].push(slot);
    }

    // Drop the lineage in `slot`.  The lineage in the last
    // slot moves into `slot`, so its deme list is updated.
    fn remove_slot(&mut self, slot: usize) -> NodeId {
        self.leave_deme(slot);
        let last = self.total() - 1;
        if slot != last {
            let deme = self.label[last];
            self.slots[deme][self.position[last]] = slot;
        }
        self.label.swap_remove(slot);
        self.position.swap_remove(slot);
        self.active.swap_remove(slot)
    }

    // Relabel a random lineage from `source` to `dest`.
    fn migrate<R: CoalescentRng + ?Sized>(
        &mut self,
        source: usize,
        dest: usize,
        rng: &mut R,
    ) -> NodeId {
        let slot = self.slots[source][rng.uniform_index(self.slots[source].len())];
        self.leave_deme(slot);
        self.join_deme(slot, dest);
        self.active.as_slice()[slot]
    }

    // Swap-to-end removal restricted to the lineages of `deme`:
    // the first child is dropped and the second child's slot
    // receives the ancestor.
    fn coalesce<R: CoalescentRng + ?Sized>(
        &mut self,
        deme: usize,
        ancestor: NodeId,
        rng: &mut R,
    ) -> (NodeId, NodeId) {
        let p1 = self.slots[deme][rng.uniform_index(self.slots[deme].len())];
        let c1 = self.remove_slot(p1);
        let p2 = self.slots[deme][rng.uniform_index(self.slots[deme].len())];
        let c2 = self.active.replace(p2, ancestor);
        (c1, c2)
    }
}

fn check_arguments(n0: usize, n1: usize, migrate: f64) -> Result<(), CoalseqError> {
    // All 2 * (n0 + n1) - 1 nodes must be addressable.
    let num_nodes = n0
        .checked_add(n1)
        .filter(|nsam| *nsam >= 2)
        .and_then(|nsam| nsam.checked_mul(2))
        .map(|n| n - 1);
    if !num_nodes.map_or(false, |n| NodeId::try_from(n).is_ok()) {
        return Err(CoalseqError::invalid_argument(format!(
            "total sample size must be at least 2 with at most {} nodes, got {} + {}",
            i32::MAX,
            n0,
            n1
        )));
    }
    if !(migrate.is_finite() && migrate >= 0.0) {
        return Err(CoalseqError::invalid_argument(format!(
            "migration rate must be finite and non-negative, got {}",
            migrate
        )));
    }
    Ok(())
}

/// Simulate the genealogy of samples from two demes
/// connected by migration.
///
/// See [`generate_two_population_with_history`].
/// This function discards the migration history.
///
/// # Example
///
/// ```
/// use coalseq::prelude::*;
///
/// let mut rng = coalseq_rng::Rng::new(6);
/// let tables = generate_two_population(3, 4, 1.0, &mut rng).unwrap();
/// assert_eq!(tables.num_populations(), 2);
/// assert_eq!(tables.sample_nodes().len(), 7);
/// ```
pub fn generate_two_population<R: CoalescentRng + ?Sized>(
    n0: usize,
    n1: usize,
    migrate: f64,
    rng: &mut R,
) -> Result<TableCollection, CoalseqError> {
    generate_two_population_with_history(n0, n1, migrate, rng).map(|(tables, _)| tables)
}

/// Simulate the genealogy of samples from two demes
/// connected by migration, keeping a record of every
/// migration event.
///
/// # Parameters
///
/// * `n0`, `n1`: sample sizes in deme 0 and deme 1.
///   Sample nodes `0..n0` are in deme 0 and
///   `n0..n0+n1` are in deme 1.
/// * `migrate`: migration rate per lineage.  With `k`
///   lineages in total, migrations happen at rate
///   `k * migrate` and the migrant's deme is chosen
///   in proportion to the number of lineages there.
/// * `rng`: the random number source.
///
/// Every ancestor node records the deme where its
/// coalescence happened.
///
/// If no event can happen, which is the case when
/// `migrate == 0` and each deme holds one lineage, the
/// simulation stops and the tables hold one tree per deme.
///
/// # Errors
///
/// [`CoalseqError::InvalidArgument`] if `n0 + n1 < 2`,
/// if the tables would need more nodes than a [`NodeId`]
/// can address, or if `migrate` is negative or not finite.
pub fn generate_two_population_with_history<R: CoalescentRng + ?Sized>(
    n0: usize,
    n1: usize,
    migrate: f64,
    rng: &mut R,
) -> Result<(TableCollection, MigrationHistory), CoalseqError> {
    check_arguments(n0, n1, migrate)?;
    log::debug!(
        "simulating two demes with {} and {} samples, migration rate {}",
        n0,
        n1,
        migrate
    );
    let nsam = n0 + n1;

    let mut tables = TableCollection::with_capacity(1.0, 2 * nsam - 1, 2 * (nsam - 1))?;
    let demes = [tables.add_population()?, tables.add_population()?];
    for _ in 0..n0 {
        tables.add_sample(0.0, demes[0])?;
    }
    for _ in 0..n1 {
        tables.add_sample(0.0, demes[1])?;
    }

    let mut state = DemeState::new(n0, n1)?;
    let mut history = MigrationHistory::default();
    let mut time = 0.0;
    while state.total() > 1 {
        let rcoal = state.coalescence_rates();
        let tcoal = rng.exponential(rcoal[0] + rcoal[1]);
        let tmig = rng.exponential(state.total() as f64 * migrate);
        if tcoal.is_infinite() && tmig.is_infinite() {
            log::debug!(
                "no further events possible with {:?} lineages per deme",
                state.config()
            );
            break;
        }
        if tmig < tcoal {
            time += tmig;
            let p0 = state.config()[0] as f64 / state.total() as f64;
            let (source, dest) = if rng.uniform() < p0 { (0, 1) } else { (1, 0) };
            let node = state.migrate(source, dest, rng);
            log::trace!("{} migrates from {} to {} at {}", node, source, dest, time);
            history.records.push(MigrationRecord {
                time: Time::try_from(time)?,
                node,
                source: demes[source],
                dest: demes[dest],
            });
        } else {
            time += tcoal;
            let deme = if rng.uniform() < rcoal[0] / (rcoal[0] + rcoal[1]) {
                0
            } else {
                1
            };
            let ancestor = tables.add_node(time, demes[deme])?;
            let (c1, c2) = state.coalesce(deme, ancestor, rng);
            let (c1, c2) = sorted_pair(c1, c2);
            tables.add_edge(0.0, 1.0, ancestor, c1)?;
            tables.add_edge(0.0, 1.0, ancestor, c2)?;
            log::trace!(
                "{} and {} coalesce into {} in deme {} at {}",
                c1,
                c2,
                ancestor,
                deme,
                time
            );
        }
    }

    log::debug!(
        "finished at time {} after {} migrations",
        time,
        history.len()
    );
    Ok((tables, history))
}
