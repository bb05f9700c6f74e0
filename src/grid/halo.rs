//! Periodic halo extension of grid arrays.

use super::horizontal::HorizontalGrid;
use crate::{
    error::GridError,
    geometry::{
        Dim2::{self, X, Y},
        In2D,
    },
    num::BFloat,
};
use ndarray::{concatenate, prelude::*, RemoveAxis, Slice, Zip};
use tracing::info;

/// Halo size used when none is specified.
pub const DEFAULT_HALO_SIZE: usize = 5;

impl<F: BFloat> HorizontalGrid<F> {
    /// Creates a copy of the grid with `halo_size` wrapped columns (zonal) and/or
    /// rows (meridional) added on each side.
    ///
    /// The coordinate running along the extended dimension is shifted by one period
    /// in the halo, so that it continues monotonically across the seam. The other
    /// coordinate is copied unchanged. The zonal extension is applied first, so a
    /// meridional halo also covers the zonal halo columns. The recorded halo size
    /// of an extended dimension is the size of the latest extension.
    ///
    /// # Returns
    ///
    /// A `Result` which is either:
    ///
    /// - `Ok`: Contains the extended grid, with bounds recomputed from the new arrays.
    /// - `Err`: Contains `GridError::InvalidHaloSize` if the halo is empty or wider than
    ///   the grid along an extended dimension.
    pub fn with_periodic_halo(
        &self,
        zonal: bool,
        meridional: bool,
        halo_size: usize,
    ) -> Result<Self, GridError> {
        let mut lon = self.lon().clone();
        let mut lat = self.lat().clone();
        let mut is_periodic = In2D::with_each_component(|dim| self.is_periodic(dim));
        let mut halo_sizes = In2D::with_each_component(|dim| self.halo_size(dim));

        if zonal {
            check_halo_size(X, halo_size, self.xdim())?;
            lon = extend_coordinate_with_halo(&lon, X, halo_size);
            lat = wrap_with_halo(lat.view(), Axis(X.array_axis()), halo_size);
            is_periodic[X] = true;
            halo_sizes[X] = halo_size;
        }
        if meridional {
            check_halo_size(Y, halo_size, self.ydim())?;
            lat = extend_coordinate_with_halo(&lat, Y, halo_size);
            lon = wrap_with_halo(lon.view(), Axis(Y.array_axis()), halo_size);
            is_periodic[Y] = true;
            halo_sizes[Y] = halo_size;
        }
        info!(
            zonal,
            meridional,
            halo_size,
            xdim = lon.len_of(Axis(1)),
            ydim = lon.len_of(Axis(0)),
            "Extended grid with periodic halo"
        );
        self.with_extended_coords(lon, lat, is_periodic, halo_sizes)
    }
}

fn check_halo_size(dim: Dim2, halo_size: usize, size: usize) -> Result<(), GridError> {
    if halo_size == 0 || halo_size > size {
        Err(GridError::InvalidHaloSize {
            dim,
            halo_size,
            size,
        })
    } else {
        Ok(())
    }
}

/// Surrounds the array along `axis` with copies of its last and first
/// `halo_size` lanes.
///
/// # Panics
///
/// If `halo_size` exceeds the length of the axis.
pub(crate) fn wrap_with_halo<A, D>(array: ArrayView<A, D>, axis: Axis, halo_size: usize) -> Array<A, D>
where
    A: Clone,
    D: RemoveAxis,
{
    let size = array.len_of(axis);
    concatenate(
        axis,
        &[
            array.slice_axis(axis, Slice::from(size - halo_size..)),
            array.view(),
            array.slice_axis(axis, Slice::from(..halo_size)),
        ],
    )
    .expect("Wrapped lanes have the same shape as the array")
}

/// Wraps a coordinate array along the given dimension and shifts the halo
/// values by the period of the coordinate.
///
/// The period of each lane is estimated as `last - 2*first + second`, which is
/// the distance from the first to one step past the last node.
fn extend_coordinate_with_halo<F: BFloat>(coords: &Array2<F>, dim: Dim2, halo_size: usize) -> Array2<F> {
    let axis = Axis(dim.array_axis());
    let size = coords.len_of(axis);

    let shift = Zip::from(coords.index_axis(axis, size - 1))
        .and(coords.index_axis(axis, 0))
        .and(coords.index_axis(axis, 1))
        .map_collect(|&last, &first, &second| last - first - first + second);

    let mut extended = wrap_with_halo(coords.view(), axis, halo_size);
    for lane_idx in 0..halo_size {
        Zip::from(extended.index_axis_mut(axis, lane_idx))
            .and(&shift)
            .for_each(|value, &shift| *value = *value - shift);
    }
    for lane_idx in size + halo_size..size + 2 * halo_size {
        Zip::from(extended.index_axis_mut(axis, lane_idx))
            .and(&shift)
            .for_each(|value, &shift| *value = *value + shift);
    }
    extended
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Mesh;

    fn regular_grid(nx: usize, ny: usize) -> HorizontalGrid<f32> {
        let lon = Array2::from_shape_fn((ny, nx), |(_, i)| i as f32);
        let lat = Array2::from_shape_fn((ny, nx), |(j, _)| 10.0 * j as f32);
        HorizontalGrid::new(lon, lat, Mesh::Flat).unwrap()
    }

    #[test]
    fn zonal_halo_continues_longitudes_across_seam() {
        let grid = regular_grid(10, 3).with_periodic_halo(true, false, 2).unwrap();
        assert_eq!(grid.shape().to_tuple(), (14, 3));
        let expected_lon: Vec<f32> = (-2..12).map(|i| i as f32).collect();
        for row in grid.lon().rows() {
            assert_eq!(row.to_vec(), expected_lon);
        }
        assert_eq!(grid.lat().column(0).to_vec(), vec![0.0, 10.0, 20.0]);
        assert!(grid.is_periodic(X) && !grid.is_periodic(Y));
        assert_eq!(grid.halo_size(X), 2);
        assert_eq!((grid.bounds().lon_min, grid.bounds().lon_max), (-2.0, 11.0));
    }

    #[test]
    fn meridional_halo_continues_latitudes_across_seam() {
        let grid = regular_grid(3, 4).with_periodic_halo(false, true, 1).unwrap();
        assert_eq!(grid.shape().to_tuple(), (3, 6));
        assert_eq!(
            grid.lat().column(1).to_vec(),
            vec![-10.0, 0.0, 10.0, 20.0, 30.0, 40.0]
        );
        assert_eq!(grid.lon().row(0).to_vec(), vec![0.0, 1.0, 2.0]);
        assert!(grid.is_periodic(Y) && !grid.is_periodic(X));
    }

    #[test]
    fn combined_halo_extends_both_dimensions() {
        let grid = regular_grid(4, 3).with_periodic_halo(true, true, 1).unwrap();
        assert_eq!(grid.shape().to_tuple(), (6, 5));
        assert_eq!(grid.lon().row(0).to_vec(), vec![-1.0, 0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(
            grid.lat().column(0).to_vec(),
            vec![-10.0, 0.0, 10.0, 20.0, 30.0]
        );
    }

    #[test]
    fn repeated_halo_records_latest_size() {
        let grid = regular_grid(10, 3)
            .with_periodic_halo(true, false, 2)
            .unwrap()
            .with_periodic_halo(true, false, 1)
            .unwrap();
        assert_eq!(grid.xdim(), 16);
        assert_eq!(grid.halo_size(X), 1);
        assert_eq!(grid.halo_size(Y), 0);
        assert_eq!((grid.bounds().lon_min, grid.bounds().lon_max), (-3.0, 12.0));
    }

    #[test]
    fn invalid_halo_sizes_are_rejected() {
        let grid = regular_grid(4, 3);
        assert_eq!(
            grid.with_periodic_halo(true, false, 0).unwrap_err(),
            GridError::InvalidHaloSize {
                dim: X,
                halo_size: 0,
                size: 4
            }
        );
        assert!(grid.with_periodic_halo(false, true, 4).is_err());
        assert!(grid.with_periodic_halo(true, false, 4).is_ok());
    }

    #[test]
    fn wrapping_copies_lanes_along_any_axis() {
        let array = Array3::from_shape_fn((2, 2, 3), |(k, j, i)| 100 * k + 10 * j + i);
        let wrapped = wrap_with_halo(array.view(), Axis(2), 1);
        assert_eq!(wrapped.shape(), &[2, 2, 5]);
        assert_eq!(
            wrapped.slice(s![1, 1, ..]).to_vec(),
            vec![112, 110, 111, 112, 110]
        );
    }
}
