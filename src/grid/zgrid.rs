//! Curvilinear grids with horizontally uniform depth levels.

use super::{
    fsr,
    horizontal::HorizontalGrid,
    vertical::{locate_in_column, VerticalLayout, VerticalLocation, VerticalQuery},
    CurvilinearGrid, GridType, Mesh,
};
use crate::{
    error::{GridError, SearchError},
    geometry::In2D,
    num::BFloat,
};
use ndarray::prelude::*;

/// Depth levels shared by every column of the grid.
#[derive(Clone, Debug)]
pub struct ZLevels<F> {
    depth: Array1<F>,
}

impl<F: BFloat> ZLevels<F> {
    pub fn new(depth: Array1<F>) -> Self {
        Self { depth }
    }

    /// Creates a layout with a single level at zero depth.
    pub fn surface_only() -> Self {
        Self::new(Array1::zeros(1))
    }

    pub fn depth(&self) -> &Array1<F> {
        &self.depth
    }
}

impl<F: BFloat> VerticalLayout<F> for ZLevels<F> {
    const GRID_TYPE: GridType = GridType::CurvilinearZ;

    fn zdim(&self) -> usize {
        self.depth.len()
    }

    fn validate(&self, _horizontal_shape: &In2D<usize>, _tdim: usize) -> Result<(), GridError> {
        if self.depth.is_empty() {
            Err(GridError::DepthShapeMismatch {
                shape: self.depth.shape().to_vec(),
                expected: "[zdim] with zdim >= 1".to_string(),
            })
        } else {
            Ok(())
        }
    }

    fn with_periodic_halo(&self, _halo_sizes: &In2D<Option<usize>>) -> Self {
        self.clone()
    }

    fn search_vertical(
        &self,
        _times: &[f64],
        query: &VerticalQuery,
    ) -> Result<VerticalLocation, SearchError> {
        locate_in_column(self.zdim(), |k| self.depth[k].widen(), query.point.z)
            .ok_or_else(|| query.sampling_error())
    }
}

impl<F: BFloat> CurvilinearGrid<F, ZLevels<F>> {
    /// Creates a new Z-grid from coordinate arrays.
    ///
    /// # Parameters
    ///
    /// - `lon`: Longitudes of the grid nodes, with shape `[ydim, xdim]`.
    /// - `lat`: Latitudes of the grid nodes, with shape `[ydim, xdim]`.
    /// - `depth`: Depth levels. A single level at zero is used if absent.
    /// - `times`: Times of the grid. A single time at zero is used if absent.
    /// - `mesh`: Interpretation of the coordinates.
    pub fn from_coords(
        lon: Array2<F>,
        lat: Array2<F>,
        depth: Option<Array1<F>>,
        times: Option<Vec<f64>>,
        mesh: Mesh,
    ) -> Result<Self, GridError> {
        let horizontal = HorizontalGrid::new(lon, lat, mesh)?;
        let levels = depth.map_or_else(ZLevels::surface_only, ZLevels::new);
        Self::new(horizontal, levels, times)
    }
}
