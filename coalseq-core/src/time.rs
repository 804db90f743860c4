/// A time value
///
/// Time runs backwards from the present (`0.0`),
/// in units of `2N` generations.  Values are finite
/// and non-negative.
#[repr(transparent)]
#[derive(Copy, Clone, Debug)]
pub struct Time(f64);

impl_finite_float!(Time, TimeError);

impl Time {
    /// The present.
    pub const ZERO: Time = Time(0.0);
}
