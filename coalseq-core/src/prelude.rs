//! # Prelude
//!
//! ```
//! use coalseq_core::prelude::*;
//! let n = NodeId::from(3);
//! assert_eq!(n, 3);
//! ```

pub use crate::{DemeId, EdgeId, NodeId, Position, Time};
