//! Strongly-typed building blocks shared by the
//! `coalseq` crates.
//!
//! * Row ids ([`NodeId`], [`EdgeId`], [`DemeId`]) are
//!   32-bit signed integers where `-1` means "no row".
//! * [`Position`] and [`Time`] wrap [`f64`] values that are
//!   guaranteed to be finite and non-negative, which
//!   makes them totally ordered.

use thiserror::Error;

mod macros;
mod newtypes;
mod position;
pub mod prelude;
mod time;

pub use newtypes::{DemeId, EdgeId, NodeId};
pub use position::Position;
pub use time::Time;

/// Error type for conversions into
/// the types defined in this crate.
#[derive(Error, Debug, PartialEq)]
pub enum Error {
    /// An integer could not be represented
    /// by the requested type.
    #[error("{0}")]
    ConversionError(String),
    /// A genome position was negative or not finite.
    #[error("invalid position: {0:?}")]
    PositionError(f64),
    /// A time value was negative or not finite.
    #[error("invalid time: {0:?}")]
    TimeError(f64),
}
