//! The crate prelude
//!
//! # Example
//! ```
//! use coalseq::prelude::*;
//! ```

pub use coalseq_core::prelude::*;
pub use coalseq_rng::CoalescentRng;

pub use crate::{
    build_edge_index, edge_branch_length_sum, generate_single_population,
    generate_two_population, generate_two_population_with_history, traverse,
    traverse_with_visitor, ActiveLineages, CoalseqError, EdgeIndex, EdgeVisitor, NodeFlags,
    TableCollection, TableValidationFlags, TotalBranchLength, TreeSequence, TreeSequenceFlags,
};
