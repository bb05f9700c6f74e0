//! Curvilinear grids with terrain-following depth levels.

use super::{
    fsr,
    halo::wrap_with_halo,
    horizontal::HorizontalGrid,
    vertical::{locate_in_column, VerticalLayout, VerticalLocation, VerticalQuery},
    CurvilinearGrid, GridType, Mesh,
};
use crate::{
    error::{GridError, SearchError},
    geometry::{
        Dim2::{X, Y},
        In2D,
    },
    num::BFloat,
};
use ndarray::prelude::*;

const TIME_AXIS: Axis = Axis(0);
const LEVEL_AXIS: Axis = Axis(1);
const Y_AXIS: Axis = Axis(2);
const X_AXIS: Axis = Axis(3);

/// Depth levels that vary between the columns of the grid, and possibly in time.
///
/// Depths are stored with shape `[tdim, zdim, ydim, xdim]`, where the first
/// dimension has length one when the depths do not vary in time.
#[derive(Clone, Debug)]
pub struct SLevels<F> {
    depth: Array4<F>,
    z4d: bool,
}

impl<F: BFloat> SLevels<F> {
    /// Creates a new layout from a `[zdim, ydim, xdim]` or `[tdim, zdim, ydim, xdim]`
    /// depth array.
    pub fn new(depth: ArrayD<F>) -> Result<Self, GridError> {
        let shape = depth.shape().to_vec();
        let shape_error = || GridError::DepthShapeMismatch {
            shape: shape.clone(),
            expected: "[zdim, ydim, xdim] or [tdim, zdim, ydim, xdim]".to_string(),
        };
        let depth = match depth.ndim() {
            3 => depth.insert_axis(TIME_AXIS),
            4 => depth,
            _ => return Err(shape_error()),
        }
        .into_dimensionality::<Ix4>()
        .map_err(|_| shape_error())?;

        let z4d = depth.len_of(TIME_AXIS) != 1;
        Ok(Self { depth, z4d })
    }

    pub fn depth(&self) -> &Array4<F> {
        &self.depth
    }

    /// Whether the depths vary in time.
    pub fn is_time_varying(&self) -> bool {
        self.z4d
    }

    /// Bilinearly interpolates the depth of level `k` at time index `t` to the
    /// fractional position of the query inside its cell.
    fn interpolated_level(&self, t: usize, k: usize, query: &VerticalQuery) -> fsr {
        let (xi, yi) = query.indices.to_tuple();
        let (xsi, eta) = (query.xsi, query.eta);
        let depth = |j: usize, i: usize| self.depth[[t, k, j, i]].widen();
        (1.0 - xsi) * (1.0 - eta) * depth(yi, xi)
            + xsi * (1.0 - eta) * depth(yi, xi + 1)
            + xsi * eta * depth(yi + 1, xi + 1)
            + (1.0 - xsi) * eta * depth(yi + 1, xi)
    }
}

impl<F: BFloat> VerticalLayout<F> for SLevels<F> {
    const GRID_TYPE: GridType = GridType::CurvilinearS;

    fn zdim(&self) -> usize {
        self.depth.len_of(LEVEL_AXIS)
    }

    fn validate(&self, horizontal_shape: &In2D<usize>, tdim: usize) -> Result<(), GridError> {
        let (xdim, ydim) = horizontal_shape.to_tuple();
        let shape = self.depth.shape();
        let expected_tdim = if self.z4d { tdim } else { 1 };
        if shape[0] != expected_tdim || shape[1] == 0 || shape[2] != ydim || shape[3] != xdim {
            return Err(GridError::DepthShapeMismatch {
                shape: shape.to_vec(),
                expected: format!("[{}, zdim, {}, {}]", expected_tdim, ydim, xdim),
            });
        }
        Ok(())
    }

    fn with_periodic_halo(&self, halo_sizes: &In2D<Option<usize>>) -> Self {
        let mut depth = self.depth.clone();
        if let Some(halo_size) = halo_sizes[X] {
            depth = wrap_with_halo(depth.view(), X_AXIS, halo_size);
        }
        if let Some(halo_size) = halo_sizes[Y] {
            depth = wrap_with_halo(depth.view(), Y_AXIS, halo_size);
        }
        Self {
            depth,
            z4d: self.z4d,
        }
    }

    fn search_vertical(
        &self,
        times: &[f64],
        query: &VerticalQuery,
    ) -> Result<VerticalLocation, SearchError> {
        let t = if self.z4d { query.time.index } else { 0 };
        if t >= self.depth.len_of(TIME_AXIS) {
            return Err(query.sampling_error());
        }

        let time_weight = if self.z4d && t + 1 < self.depth.len_of(TIME_AXIS) {
            match (times.get(t), times.get(t + 1)) {
                (Some(&t0), Some(&t1)) if t1 != t0 => Some((query.time.time - t0) / (t1 - t0)),
                _ => None,
            }
        } else {
            None
        };

        let level = |k: usize| -> fsr {
            let current = self.interpolated_level(t, k, query);
            match time_weight {
                Some(weight) => {
                    current + (self.interpolated_level(t + 1, k, query) - current) * weight
                }
                None => current,
            }
        };
        locate_in_column(self.zdim(), level, query.point.z).ok_or_else(|| query.sampling_error())
    }
}

impl<F: BFloat> CurvilinearGrid<F, SLevels<F>> {
    /// Creates a new S-grid from coordinate arrays.
    ///
    /// # Parameters
    ///
    /// - `lon`: Longitudes of the grid nodes, with shape `[ydim, xdim]`.
    /// - `lat`: Latitudes of the grid nodes, with shape `[ydim, xdim]`.
    /// - `depth`: Depths of the grid nodes, with shape `[zdim, ydim, xdim]`
    ///   or `[tdim, zdim, ydim, xdim]`.
    /// - `times`: Times of the grid. A single time at zero is used if absent.
    /// - `mesh`: Interpretation of the coordinates.
    pub fn from_coords(
        lon: Array2<F>,
        lat: Array2<F>,
        depth: ArrayD<F>,
        times: Option<Vec<f64>>,
        mesh: Mesh,
    ) -> Result<Self, GridError> {
        let horizontal = HorizontalGrid::new(lon, lat, mesh)?;
        Self::new(horizontal, SLevels::new(depth)?, times)
    }
}
