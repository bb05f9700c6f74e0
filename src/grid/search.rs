//! Iterative search for the horizontal grid cell containing a point.

use super::{
    fsr,
    horizontal::{CellCorners, HorizontalGrid},
};
use crate::{
    error::SearchError,
    geometry::{Dim2::X, Dim2::Y, Idx2, Point3},
    num::BFloat,
};
use tracing::{debug, trace, warn};

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// Parameters controlling the iterative cell search.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct SearchConfig {
    /// How far outside `[0, 1]` a fractional coordinate may be before the
    /// search moves on to a neighbouring cell.
    pub tolerance: fsr,
    /// Number of cell steps after which the search gives up.
    pub max_iterations: usize,
    /// Magnitude below which bilinear coefficients are treated as zero.
    pub degeneracy_threshold: fsr,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 1_000_000,
            degeneracy_threshold: 1e-12,
        }
    }
}

/// Result of a successful horizontal search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HorizontalLocation {
    pub indices: Idx2<usize>,
    pub xsi: fsr,
    pub eta: fsr,
}

/// Computes the coefficients `[c0, c1, c2, c3]` of the bilinear map
/// `c0 + c1*xsi + c2*eta + c3*xsi*eta` through the given corner values.
fn bilinear_coefficients(values: &[fsr; 4]) -> [fsr; 4] {
    [
        values[0],
        values[1] - values[0],
        values[3] - values[0],
        values[0] - values[1] + values[2] - values[3],
    ]
}

/// Inverts the bilinear map of the cell to find the fractional coordinates
/// `(xsi, eta)` of the point `(x, y)`.
///
/// When the quadratic for `eta` has no real root, `previous_eta` is returned as `eta`.
/// The result is not restricted to `[0, 1]`; values outside tell in which
/// direction the point lies relative to the cell.
pub fn invert_bilinear(
    corners: &CellCorners,
    x: fsr,
    y: fsr,
    previous_eta: fsr,
    degeneracy_threshold: fsr,
) -> (fsr, fsr) {
    let a = bilinear_coefficients(&corners.lon);
    let b = bilinear_coefficients(&corners.lat);

    let aa = a[3] * b[2] - a[2] * b[3];
    let bb = a[3] * b[0] - a[0] * b[3] + a[1] * b[2] - a[2] * b[1] + x * b[3] - y * a[3];
    let cc = a[1] * b[0] - a[0] * b[1] + x * b[1] - y * a[1];

    let eta = if aa.abs() < degeneracy_threshold {
        -cc / bb
    } else {
        let discriminant = bb * bb - 4.0 * aa * cc;
        if discriminant > 0.0 {
            (-bb + discriminant.sqrt()) / (2.0 * aa)
        } else {
            previous_eta
        }
    };

    let xsi_denominator = a[1] + a[3] * eta;
    let xsi = if xsi_denominator.abs() < degeneracy_threshold {
        let py = &corners.lat;
        ((y - py[0]) / (py[1] - py[0]) + (y - py[3]) / (py[2] - py[3])) * 0.5
    } else {
        (x - a[0] - a[2] * eta) / xsi_denominator
    };

    (xsi, eta)
}

fn is_outside_cell(fraction: fsr, tolerance: fsr) -> bool {
    fraction < -tolerance || fraction > 1.0 + tolerance
}

impl<F: BFloat> HorizontalGrid<F> {
    /// Finds the horizontal cell containing the given point by repeatedly
    /// inverting the bilinear map of the current cell and stepping towards
    /// the point until the fractional coordinates fall inside `[0, 1]`.
    ///
    /// # Parameters
    ///
    /// - `point`: Position to locate. Only the horizontal components are used
    ///   for the search, but all are reported in errors.
    /// - `start`: Cell to start stepping from.
    /// - `config`: Tolerance, iteration limit and degeneracy threshold.
    ///
    /// # Returns
    ///
    /// A `Result` which is either:
    ///
    /// - `Ok`: Contains the cell indices with `xsi` and `eta` clamped to `[0, 1]`.
    /// - `Err`: Contains a `SearchError`:
    ///   - `OutOfDomain` if the point fails the bounding box test or the search
    ///     runs past the first or last cell of the grid.
    ///   - `NonConvergence` if the iteration limit is exceeded.
    ///   - `Sampling` if the cell geometry yields undefined fractional coordinates.
    pub fn search_horizontal(
        &self,
        point: &Point3<fsr>,
        start: &Idx2<usize>,
        config: &SearchConfig,
    ) -> Result<HorizontalLocation, SearchError> {
        let Point3 { x, y, z } = *point;
        let out_of_domain = || SearchError::OutOfDomain { x, y, z };

        if !self.contains_in_bounding_box(x, y) {
            trace!(x, y, "Point outside grid bounding box");
            return Err(out_of_domain());
        }

        let tolerance = config.tolerance;
        let last_cell = (self.xdim() - 2, self.ydim() - 2);

        let mut indices = self.reconnect_boundary_indices(start[X] as isize, start[Y] as isize);
        let mut previous_eta = -1.0;
        let mut iterations = 0;

        let (xsi, eta) = loop {
            let corners = self.cell_corners(&indices, x);
            let (xsi, eta) =
                invert_bilinear(&corners, x, y, previous_eta, config.degeneracy_threshold);

            if !is_outside_cell(xsi, tolerance) && !is_outside_cell(eta, tolerance) {
                break (xsi, eta);
            }
            trace!(xi = indices[X], yi = indices[Y], xsi, eta, "Point not in cell");

            if xsi < -tolerance && eta < -tolerance && indices.to_tuple() == (0, 0) {
                return Err(out_of_domain());
            }
            if xsi > 1.0 + tolerance && eta > 1.0 + tolerance && indices.to_tuple() == last_cell {
                return Err(out_of_domain());
            }

            let mut xi = indices[X] as isize;
            let mut yi = indices[Y] as isize;
            if xsi < -tolerance {
                xi -= 1;
            } else if xsi > 1.0 + tolerance {
                xi += 1;
            }
            if eta < -tolerance {
                yi -= 1;
            } else if eta > 1.0 + tolerance {
                yi += 1;
            }
            indices = self.reconnect_boundary_indices(xi, yi);
            previous_eta = eta;

            iterations += 1;
            if iterations > config.max_iterations {
                warn!(x, y, z, iterations, "Cell search did not converge");
                return Err(SearchError::NonConvergence {
                    x,
                    y,
                    z,
                    iterations,
                });
            }
        };

        if xsi.is_nan() || eta.is_nan() {
            debug!(x, y, z, xi = indices[X], yi = indices[Y], "Degenerate cell");
            return Err(SearchError::Sampling { x, y, z });
        }

        Ok(HorizontalLocation {
            indices,
            xsi: xsi.max(0.0).min(1.0),
            eta: eta.max(0.0).min(1.0),
        })
    }
}
