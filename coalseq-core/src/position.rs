/// A position/coordinate within a genome
///
/// Genomes are continuous: a position is any finite,
/// non-negative [`f64`].
#[derive(Copy, Clone, Debug)]
#[repr(transparent)]
pub struct Position(f64);

impl_finite_float!(Position, PositionError);

impl Position {
    /// The left end of every genome.
    pub const ZERO: Position = Position(0.0);

    /// Create a new position from a finite, non-negative value.
    ///
    /// # Examples
    ///
    /// ```
    /// let p = coalseq_core::Position::new_valid(0.5);
    /// assert_eq!(p, 0.5);
    /// ```
    ///
    /// # Panics
    ///
    /// Will panic if `position` < 0 or is not finite.
    ///
    /// ```should_panic
    /// let p = coalseq_core::Position::new_valid(-1.0);
    /// ```
    pub fn new_valid(position: f64) -> Self {
        match Self::new(position) {
            Some(p) => p,
            None => panic!("invalid position: {}", position),
        }
    }
}
