//! Error types and error reporting macros.

use crate::geometry::Dim2;
use thiserror::Error;

/// Reasons why a cell search for a single point failed.
///
/// No partial location is ever returned alongside an error.
#[derive(Error, Clone, Copy, Debug, PartialEq)]
pub enum SearchError {
    /// The point lies outside the horizontal domain of the grid.
    #[error("Point ({x}, {y}, {z}) lies outside the grid domain")]
    OutOfDomain { x: f64, y: f64, z: f64 },

    /// The search did not settle on a cell within the iteration limit.
    #[error("Cell search for point ({x}, {y}, {z}) did not converge within {iterations} iterations")]
    NonConvergence {
        x: f64,
        y: f64,
        z: f64,
        iterations: usize,
    },

    /// The search found a cell, but the fractional position in it is not admissible.
    #[error("Could not sample point ({x}, {y}, {z}): fractional cell coordinates outside [0, 1]")]
    Sampling { x: f64, y: f64, z: f64 },
}

impl SearchError {
    /// Whether the point was found to lie outside the domain, either by the
    /// bounding box check or by the search running into a domain corner.
    pub fn is_out_of_domain(&self) -> bool {
        matches!(self, Self::OutOfDomain { .. })
    }

    /// Whether the error means the position cannot be used at all, so that the
    /// particle should be terminated rather than searched again from another hint.
    pub fn is_unusable_position(&self) -> bool {
        matches!(self, Self::OutOfDomain { .. } | Self::NonConvergence { .. })
    }
}

/// Reasons why a grid could not be constructed or extended.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum GridError {
    /// A coordinate array has fewer than two points along a dimension.
    #[error("Coordinate arrays need at least 2 points along {dim}, got {size}")]
    TooFewPoints { dim: Dim2, size: usize },

    /// The longitude and latitude arrays do not have the same shape.
    #[error("Longitude array has shape {lon_shape:?} but latitude array has shape {lat_shape:?}")]
    ShapeMismatch {
        lon_shape: Vec<usize>,
        lat_shape: Vec<usize>,
    },

    /// A coordinate array has more than two non-singleton dimensions.
    #[error("Cannot reduce array of shape {shape:?} to two dimensions")]
    NonSqueezableShape { shape: Vec<usize> },

    /// The depth array does not fit the horizontal or temporal grid.
    #[error("Depth array has shape {shape:?}, expected {expected}")]
    DepthShapeMismatch { shape: Vec<usize>, expected: String },

    /// The requested halo is wider than the grid itself.
    #[error("Halo size {halo_size} along {dim} is not in [1, {size}]")]
    InvalidHaloSize {
        dim: Dim2,
        halo_size: usize,
        size: usize,
    },
}

#[cfg(not(feature = "for-testing"))]
#[macro_export]
macro_rules! exit_with_error {
    ($($print_arg:tt)*) => {{
        eprintln!($($print_arg)*);
        quit::with_code(1);
    }};
}

#[cfg(feature = "for-testing")]
#[macro_export]
macro_rules! exit_with_error {
    ($($print_arg:tt)*) => {{
        panic!($($print_arg)*);
    }};
}

#[macro_export]
macro_rules! exit_on_error {
    ($result:expr, $($print_arg:tt)*) => {
        match $result {
            Ok(value) => value,
            Err(err) => {
                $crate::exit_with_error!($($print_arg)*, err)
            }
        }
    };
}

#[macro_export]
macro_rules! exit_on_false {
    ($logic:expr, $($print_arg:tt)*) => {
        if $logic {
            true
        } else {
            $crate::exit_with_error!($($print_arg)*)
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_errors_are_classified_for_callers() {
        let outside = SearchError::OutOfDomain {
            x: 1.0,
            y: 2.0,
            z: 0.0,
        };
        let stuck = SearchError::NonConvergence {
            x: 1.0,
            y: 2.0,
            z: 0.0,
            iterations: 10,
        };
        let sampling = SearchError::Sampling {
            x: 1.0,
            y: 2.0,
            z: 0.0,
        };
        assert!(outside.is_out_of_domain() && outside.is_unusable_position());
        assert!(!stuck.is_out_of_domain() && stuck.is_unusable_position());
        assert!(!sampling.is_out_of_domain() && !sampling.is_unusable_position());
        assert_eq!(
            stuck.to_string(),
            "Cell search for point (1, 2, 0) did not converge within 10 iterations"
        );
    }
}
