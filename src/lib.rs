#![warn(missing_docs)]

//! Coalescent simulation with tree sequence recording.
//!
//! # Overview
//!
//! The generators simulate genealogies backwards in time
//! and record them as a [`TableCollection`]: a node table
//! plus an edge table.
//!
//! * [`generate_single_population`] simulates `n` samples
//!   from one population.
//! * [`generate_two_population`] simulates samples from
//!   two demes connected by migration.
//!
//! Tables are turned into trees by a left-to-right sweep
//! over the genome:
//!
//! * [`build_edge_index`] sorts the edges into insertion
//!   and removal orders.
//! * [`traverse`] visits each local tree in turn.
//! * [`traverse_with_visitor`] reports a statistic per tree,
//!   computed by an [`EdgeVisitor`] as edges come and go.
//!
//! [`TreeSequence`] bundles tables with their index.
//!
//! # Randomness
//!
//! Generators take the random number source as an argument.
//! See [`coalseq_rng`].
//!
//! # Example
//!
//! ```
//! use coalseq::prelude::*;
//!
//! let mut rng = coalseq_rng::Rng::new(42);
//! let tables = generate_single_population(5, &mut rng).unwrap();
//! let index = build_edge_index(&tables).unwrap();
//! let totals = traverse_with_visitor(&tables, &index, TotalBranchLength::new())
//!     .unwrap()
//!     .collect::<Vec<_>>();
//! assert_eq!(totals.len(), 1);
//! assert!((totals[0] - edge_branch_length_sum(&tables, false)).abs() < 1e-9);
//! ```

#[macro_use]
mod macros;

mod edge_index;
mod error;
mod lineages;
pub mod prelude;
mod single_deme;
mod sweep;
mod tables;
mod trees;
mod two_demes;
mod visitor;

pub use coalseq_core::{DemeId, EdgeId, NodeId, Position, Time};
pub use edge_index::{build_edge_index, EdgeIndex, IndexedEdge};
pub use error::CoalseqError;
pub use lineages::ActiveLineages;
pub use single_deme::{
    expected_tmrca, expected_total_branch_length, generate_single_population,
};
pub use tables::*;
pub use trees::{
    traverse, traverse_with_visitor, StatisticIterator, Tree, TreeSequence, TreeSequenceFlags,
    TreesError, TreesResult,
};
pub use two_demes::{
    generate_two_population, generate_two_population_with_history, MigrationHistory,
    MigrationRecord,
};
pub use visitor::{edge_branch_length_sum, EdgeVisitor, TotalBranchLength};

/// Get the coalseq version number.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
