//! Utilities related to numbers.

use std::fmt;

/// Floating point marker trait for easier control over trait bounds.
pub trait BFloat:
    Sync + Send + num::Float + num::cast::FromPrimitive + ieee754::Ieee754 + fmt::Debug
{
    /// Widens the value to double precision.
    fn widen(self) -> f64 {
        self.to_f64().expect("Conversion to f64 failed")
    }
}

impl BFloat for f32 {}
impl BFloat for f64 {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widening_preserves_values() {
        assert_eq!(175.5_f32.widen(), 175.5);
        assert_eq!((-170.25_f32).widen(), -170.25);
        assert!(f32::NAN.widen().is_nan());
    }
}
