//! Vertical layouts of curvilinear grids.

use super::{fsr, GridType, SearchTime};
use crate::{
    error::{GridError, SearchError},
    geometry::{Idx2, In2D, Point3},
    num::BFloat,
};

#[cfg(feature = "serialization")]
use serde::Serialize;

/// Interpolation method that a located cell will be sampled with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub enum InterpMethod {
    #[default]
    Linear,
    Nearest,
}

/// Everything the vertical search knows about the horizontally located point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VerticalQuery {
    pub point: Point3<fsr>,
    pub indices: Idx2<usize>,
    pub xsi: fsr,
    pub eta: fsr,
    pub time: SearchTime,
    pub interp_method: InterpMethod,
}

impl VerticalQuery {
    pub(super) fn sampling_error(&self) -> SearchError {
        SearchError::Sampling {
            x: self.point.x,
            y: self.point.y,
            z: self.point.z,
        }
    }
}

/// Vertical cell index and fractional depth within the cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VerticalLocation {
    pub index: usize,
    pub zeta: fsr,
}

/// Defines the properties of a vertical layout of depth levels.
pub trait VerticalLayout<F: BFloat>: Clone + Sync + Send {
    /// Kind of curvilinear grid this layout produces.
    const GRID_TYPE: GridType;

    /// Returns the number of depth levels.
    fn zdim(&self) -> usize;

    /// Checks that the layout fits a horizontal grid of the given shape
    /// with the given number of times.
    fn validate(&self, horizontal_shape: &In2D<usize>, tdim: usize) -> Result<(), GridError>;

    /// Returns a copy of the layout matching a horizontal grid extended with
    /// the given zonal and meridional halo sizes.
    fn with_periodic_halo(&self, halo_sizes: &In2D<Option<usize>>) -> Self;

    /// Finds the depth level interval containing the depth of the queried point.
    fn search_vertical(
        &self,
        times: &[f64],
        query: &VerticalQuery,
    ) -> Result<VerticalLocation, SearchError>;
}

/// Locates `z` in a monotonic column of `n_levels` depths given by `level`.
///
/// The column may be increasing or decreasing. Returns `None` if `z` lies outside
/// the column or the column has fewer than two levels.
pub(super) fn locate_in_column<L>(n_levels: usize, level: L, z: fsr) -> Option<VerticalLocation>
where
    L: Fn(usize) -> fsr,
{
    if n_levels < 2 {
        return None;
    }
    let first = level(0);
    let last = level(n_levels - 1);
    let ascending = last >= first;
    let (lower, upper) = if ascending { (first, last) } else { (last, first) };
    if !(z >= lower && z <= upper) {
        return None;
    }

    let is_before = |depth: fsr| if ascending { depth <= z } else { depth >= z };
    let mut low = 0;
    let mut high = n_levels - 1;
    while high - low > 1 {
        let mid = (low + high) / 2;
        if is_before(level(mid)) {
            low = mid;
        } else {
            high = mid;
        }
    }

    let (top, bottom) = (level(low), level(low + 1));
    let zeta = if bottom == top {
        0.0
    } else {
        (z - top) / (bottom - top)
    };
    Some(VerticalLocation { index: low, zeta })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn locate(column: &[fsr], z: fsr) -> Option<VerticalLocation> {
        locate_in_column(column.len(), |k| column[k], z)
    }

    #[test]
    fn increasing_column_search_works() {
        let column = [0.0, 5.0, 15.0, 40.0];
        let location = locate(&column, 10.0).unwrap();
        assert_eq!(location.index, 1);
        assert_abs_diff_eq!(location.zeta, 0.5);

        assert_eq!(locate(&column, 0.0), Some(VerticalLocation { index: 0, zeta: 0.0 }));
        assert_eq!(locate(&column, 40.0), Some(VerticalLocation { index: 2, zeta: 1.0 }));
        assert_eq!(locate(&column, 40.5), None);
        assert_eq!(locate(&column, -0.5), None);
    }

    #[test]
    fn decreasing_column_search_works() {
        let column = [0.0, -10.0, -30.0];
        let location = locate(&column, -20.0).unwrap();
        assert_eq!(location.index, 1);
        assert_abs_diff_eq!(location.zeta, 0.5);
        assert_eq!(locate(&column, 1.0), None);
    }

    #[test]
    fn nan_depth_is_not_located() {
        assert_eq!(locate(&[0.0, 1.0], fsr::NAN), None);
    }
}
