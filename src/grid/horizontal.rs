//! Horizontal topology of curvilinear grids.

use super::{fsr, Mesh};
use crate::{
    error::GridError,
    geometry::{
        Dim2::{self, X, Y},
        Idx2, In2D, Point2,
    },
    num::BFloat,
};
use ndarray::prelude::*;

/// Longitude and latitude extent of a grid, ignoring NaN coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LonLatBounds {
    pub lon_min: fsr,
    pub lon_max: fsr,
    pub lat_min: fsr,
    pub lat_max: fsr,
}

impl LonLatBounds {
    fn of_arrays<F: BFloat>(lon: &Array2<F>, lat: &Array2<F>) -> Self {
        let (lon_min, lon_max) = nan_ignoring_extent(lon);
        let (lat_min, lat_max) = nan_ignoring_extent(lat);
        Self {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
        }
    }
}

fn nan_ignoring_extent<F: BFloat>(values: &Array2<F>) -> (fsr, fsr) {
    values.iter().fold(
        (fsr::INFINITY, fsr::NEG_INFINITY),
        |(min, max), &value| {
            let value = value.widen();
            (min.min(value), max.max(value))
        },
    )
}

/// The four corners of a grid cell, ordered counter-clockwise from `(xi, yi)`.
///
/// Corner 0 is at `(xi, yi)`, 1 at `(xi+1, yi)`, 2 at `(xi+1, yi+1)` and 3 at `(xi, yi+1)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellCorners {
    pub lon: [fsr; 4],
    pub lat: [fsr; 4],
}

impl CellCorners {
    /// Maps fractional cell coordinates to the corresponding position inside the cell.
    pub fn interpolate(&self, xsi: fsr, eta: fsr) -> Point2<fsr> {
        let weights = [
            (1.0 - xsi) * (1.0 - eta),
            xsi * (1.0 - eta),
            xsi * eta,
            (1.0 - xsi) * eta,
        ];
        let blend = |values: &[fsr; 4]| -> fsr {
            weights
                .iter()
                .zip(values.iter())
                .map(|(weight, value)| weight * value)
                .sum()
        };
        Point2::new(blend(&self.lon), blend(&self.lat))
    }

    /// Shifts the corner longitudes by multiples of 360 degrees so that the
    /// cell lies on the same side of the date line as the longitude `x`.
    fn correct_for_longitude_wrap(&mut self, x: fsr) {
        let lon = &mut self.lon;
        if lon[0] < x - 225.0 {
            lon[0] += 360.0;
        }
        if lon[0] > x + 225.0 {
            lon[0] -= 360.0;
        }
        let reference = lon[0];
        for corner in lon[1..].iter_mut() {
            if *corner - reference > 180.0 {
                *corner -= 360.0;
            }
            if reference - *corner > 180.0 {
                *corner += 360.0;
            }
        }
    }
}

/// Longitude and latitude coordinates of the nodes of a structured horizontal grid.
///
/// Coordinate arrays have shape `[ydim, xdim]`.
#[derive(Clone, Debug)]
pub struct HorizontalGrid<F> {
    lon: Array2<F>,
    lat: Array2<F>,
    shape: In2D<usize>,
    mesh: Mesh,
    is_periodic: In2D<bool>,
    halo_sizes: In2D<usize>,
    bounds: LonLatBounds,
}

impl<F: BFloat> HorizontalGrid<F> {
    /// Creates a new horizontal grid from two-dimensional coordinate arrays.
    ///
    /// # Parameters
    ///
    /// - `lon`: Longitude (or x-coordinate) of each node, with shape `[ydim, xdim]`.
    /// - `lat`: Latitude (or y-coordinate) of each node, with the same shape.
    /// - `mesh`: Whether coordinates are planar or spherical degrees.
    ///
    /// # Returns
    ///
    /// A `Result` which is either:
    ///
    /// - `Ok`: Contains the new grid, which is not periodic in any direction.
    /// - `Err`: Contains a `GridError` if the shapes differ or have fewer than two nodes
    ///   along a dimension.
    pub fn new(lon: Array2<F>, lat: Array2<F>, mesh: Mesh) -> Result<Self, GridError> {
        if lon.shape() != lat.shape() {
            return Err(GridError::ShapeMismatch {
                lon_shape: lon.shape().to_vec(),
                lat_shape: lat.shape().to_vec(),
            });
        }
        let shape = In2D::with_each_component(|dim| lon.len_of(Axis(dim.array_axis())));
        for dim in Dim2::slice() {
            if shape[dim] < 2 {
                return Err(GridError::TooFewPoints {
                    dim,
                    size: shape[dim],
                });
            }
        }
        let bounds = LonLatBounds::of_arrays(&lon, &lat);
        Ok(Self {
            lon,
            lat,
            shape,
            mesh,
            is_periodic: In2D::same(false),
            halo_sizes: In2D::same(0),
            bounds,
        })
    }

    /// Creates a new horizontal grid from coordinate arrays with any number of
    /// dimensions, as long as exactly two of them have more than one element.
    ///
    /// The first non-singleton dimension is taken as y and the last as x.
    pub fn from_dyn_arrays(lon: ArrayD<F>, lat: ArrayD<F>, mesh: Mesh) -> Result<Self, GridError> {
        Self::new(squeeze_to_2d(lon)?, squeeze_to_2d(lat)?, mesh)
    }

    /// Creates a copy of the grid with new coordinates and periodicity, keeping the mesh.
    pub(super) fn with_extended_coords(
        &self,
        lon: Array2<F>,
        lat: Array2<F>,
        is_periodic: In2D<bool>,
        halo_sizes: In2D<usize>,
    ) -> Result<Self, GridError> {
        let mut grid = Self::new(lon, lat, self.mesh)?;
        grid.is_periodic = is_periodic;
        grid.halo_sizes = halo_sizes;
        Ok(grid)
    }

    pub fn lon(&self) -> &Array2<F> {
        &self.lon
    }

    pub fn lat(&self) -> &Array2<F> {
        &self.lat
    }

    /// Returns the number of nodes along x and y.
    pub fn shape(&self) -> &In2D<usize> {
        &self.shape
    }

    pub fn xdim(&self) -> usize {
        self.shape[X]
    }

    pub fn ydim(&self) -> usize {
        self.shape[Y]
    }

    pub fn mesh(&self) -> Mesh {
        self.mesh
    }

    /// Whether the grid has been extended to be periodic along the given dimension.
    pub fn is_periodic(&self, dim: Dim2) -> bool {
        self.is_periodic[dim]
    }

    /// Number of wrapped nodes added to each side along the given dimension.
    pub fn halo_size(&self, dim: Dim2) -> usize {
        self.halo_sizes[dim]
    }

    pub fn bounds(&self) -> &LonLatBounds {
        &self.bounds
    }

    /// Returns the cell in the middle of the grid, used as the default search start.
    pub fn center_indices(&self) -> Idx2<usize> {
        Idx2::new(self.xdim() / 2 - 1, self.ydim() / 2 - 1)
    }

    /// Returns the longitude spacing between consecutive nodes of the first row.
    pub fn dlon(&self) -> Array1<F> {
        let first_row = self.lon.row(0);
        &first_row.slice(s![1..]) - &first_row.slice(s![..-1])
    }

    /// Returns the corner coordinates of the given cell.
    ///
    /// On spherical meshes the corner longitudes are shifted by multiples of
    /// 360 degrees to lie on the same side of the date line as the longitude `x`.
    ///
    /// # Panics
    ///
    /// If the cell indices exceed `(xdim - 2, ydim - 2)`.
    pub fn cell_corners(&self, indices: &Idx2<usize>, x: fsr) -> CellCorners {
        let (xi, yi) = indices.to_tuple();
        let node_indices = [(yi, xi), (yi, xi + 1), (yi + 1, xi + 1), (yi + 1, xi)];
        let mut corners = CellCorners {
            lon: node_indices.map(|(j, i)| self.lon[[j, i]].widen()),
            lat: node_indices.map(|(j, i)| self.lat[[j, i]].widen()),
        };
        if self.mesh.is_spherical() {
            corners.correct_for_longitude_wrap(x);
        }
        corners
    }

    /// Maps a candidate cell index pair that may have left the grid back onto a valid cell.
    ///
    /// Flat meshes clamp both indices. Spherical meshes wrap the x-index around
    /// and reflect it across the pole when stepping past the last row.
    pub fn reconnect_boundary_indices(&self, xi: isize, yi: isize) -> Idx2<usize> {
        let spherical = self.mesh.is_spherical();
        let last_xi = self.xdim() as isize - 2;
        let last_yi = self.ydim() as isize - 2;

        let wrap_x = |xi: isize| -> isize {
            if xi < 0 {
                if spherical {
                    last_xi
                } else {
                    0
                }
            } else if xi > last_xi {
                if spherical {
                    0
                } else {
                    last_xi
                }
            } else {
                xi
            }
        };

        let mut xi = wrap_x(xi);
        let mut yi = yi.max(0);
        if yi > last_yi {
            yi = last_yi;
            if spherical {
                xi = wrap_x(self.xdim() as isize - xi);
            }
        }
        Idx2::new(xi as usize, yi as usize)
    }

    /// Whether the point passes the coarse bounding box test that precedes the cell search.
    ///
    /// Longitude is not tested on zonally periodic grids. Longitudes outside
    /// `[lon_min, lon_max]` are still accepted when the first row of the grid
    /// decreases in longitude and the point lies outside the gap between its
    /// first and last node, as happens when the row crosses the date line.
    /// Latitude is always tested, since the search never wraps along y.
    pub fn contains_in_bounding_box(&self, x: fsr, y: fsr) -> bool {
        let bounds = &self.bounds;
        if !self.is_periodic[X] && (x < bounds.lon_min || x > bounds.lon_max) {
            let first_lon = self.lon[[0, 0]].widen();
            let last_lon = self.lon[[0, self.xdim() - 1]].widen();
            if first_lon < last_lon || (x < first_lon && x > last_lon) {
                return false;
            }
        }
        if y < bounds.lat_min || y > bounds.lat_max {
            return false;
        }
        true
    }
}

/// Reduces an array to its first and last non-singleton dimensions.
fn squeeze_to_2d<F: BFloat>(array: ArrayD<F>) -> Result<Array2<F>, GridError> {
    let shape = array.shape().to_vec();
    if array.ndim() == 2 {
        return array
            .into_dimensionality::<Ix2>()
            .map_err(|_| GridError::NonSqueezableShape { shape });
    }
    let non_singleton: Vec<usize> = shape.iter().copied().filter(|&len| len > 1).collect();
    let (rows, columns) = match non_singleton[..] {
        [] => (1, 1),
        [columns] => (1, columns),
        [rows, columns] => (rows, columns),
        _ => return Err(GridError::NonSqueezableShape { shape }),
    };
    Array2::from_shape_vec((rows, columns), array.iter().copied().collect())
        .map_err(|_| GridError::NonSqueezableShape { shape })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn grid_from_rows(lon_row: &[f32], lat_column: &[f32], mesh: Mesh) -> HorizontalGrid<f32> {
        let shape = (lat_column.len(), lon_row.len());
        let lon = Array2::from_shape_fn(shape, |(_, i)| lon_row[i]);
        let lat = Array2::from_shape_fn(shape, |(j, _)| lat_column[j]);
        HorizontalGrid::new(lon, lat, mesh).unwrap()
    }

    #[test]
    fn construction_rejects_invalid_shapes() {
        let lon = Array2::<f32>::zeros((3, 4));
        assert!(matches!(
            HorizontalGrid::new(lon.clone(), Array2::zeros((4, 3)), Mesh::Flat),
            Err(GridError::ShapeMismatch { .. })
        ));
        assert_eq!(
            HorizontalGrid::new(
                Array2::<f32>::zeros((3, 1)),
                Array2::zeros((3, 1)),
                Mesh::Flat
            )
            .unwrap_err(),
            GridError::TooFewPoints { dim: X, size: 1 }
        );
    }

    #[test]
    fn squeezing_keeps_outer_non_singleton_dimensions() {
        let lon = ArrayD::from_shape_fn(IxDyn(&[1, 3, 1, 4]), |idx| idx[3] as f32);
        let lat = ArrayD::from_shape_fn(IxDyn(&[1, 3, 1, 4]), |idx| idx[1] as f32);
        let grid = HorizontalGrid::from_dyn_arrays(lon, lat, Mesh::Flat).unwrap();
        assert_eq!(grid.shape().to_tuple(), (4, 3));
        assert_eq!(grid.lon()[[2, 3]], 3.0);
        assert_eq!(grid.lat()[[2, 3]], 2.0);

        let cube = ArrayD::<f32>::zeros(IxDyn(&[2, 3, 4]));
        assert!(matches!(
            HorizontalGrid::from_dyn_arrays(cube.clone(), cube, Mesh::Flat),
            Err(GridError::NonSqueezableShape { .. })
        ));
    }

    #[test]
    fn bounds_ignore_nan_coordinates() {
        let grid = grid_from_rows(&[f32::NAN, 1.0, 2.0], &[-1.0, 5.0], Mesh::Flat);
        let bounds = grid.bounds();
        assert_eq!((bounds.lon_min, bounds.lon_max), (1.0, 2.0));
        assert_eq!((bounds.lat_min, bounds.lat_max), (-1.0, 5.0));
    }

    #[test]
    fn corners_are_corrected_across_date_line() {
        let grid = grid_from_rows(
            &[170.0, 175.0, -175.0, -170.0],
            &[0.0, 1.0, 2.0, 3.0],
            Mesh::Spherical,
        );
        let corners = grid.cell_corners(&Idx2::new(1, 1), 178.0);
        assert_eq!(corners.lon, [175.0, 185.0, 185.0, 175.0]);
        assert_eq!(corners.lat, [1.0, 1.0, 2.0, 2.0]);

        let corners = grid.cell_corners(&Idx2::new(2, 0), 178.0);
        assert_eq!(corners.lon, [185.0, 190.0, 190.0, 185.0]);
    }

    #[test]
    fn flat_corners_are_not_corrected() {
        let grid = grid_from_rows(&[170.0, 175.0, -175.0], &[0.0, 1.0], Mesh::Flat);
        let corners = grid.cell_corners(&Idx2::new(1, 0), 178.0);
        assert_eq!(corners.lon, [175.0, -175.0, -175.0, 175.0]);
    }

    #[test]
    fn interpolation_maps_fractions_into_cell() {
        let corners = CellCorners {
            lon: [0.0, 2.0, 3.0, 1.0],
            lat: [0.0, 0.0, 1.0, 1.0],
        };
        let center = corners.interpolate(0.5, 0.5);
        assert_abs_diff_eq!(center[X], 1.5);
        assert_abs_diff_eq!(center[Y], 0.5);
        assert_eq!(corners.interpolate(1.0, 1.0), Point2::new(3.0, 1.0));
    }

    #[test]
    fn flat_reconnection_clamps_indices() {
        let grid = grid_from_rows(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0, 2.0], Mesh::Flat);
        assert_eq!(grid.reconnect_boundary_indices(-1, -3), Idx2::new(0, 0));
        assert_eq!(grid.reconnect_boundary_indices(3, 2), Idx2::new(2, 1));
        assert_eq!(grid.reconnect_boundary_indices(1, 1), Idx2::new(1, 1));
    }

    #[test]
    fn spherical_reconnection_wraps_and_reflects_indices() {
        let grid = grid_from_rows(
            &[0.0, 60.0, 120.0, 180.0, 240.0, 300.0],
            &[70.0, 80.0, 90.0],
            Mesh::Spherical,
        );
        assert_eq!(grid.reconnect_boundary_indices(-1, 0), Idx2::new(4, 0));
        assert_eq!(grid.reconnect_boundary_indices(5, 0), Idx2::new(0, 0));
        assert_eq!(grid.reconnect_boundary_indices(1, 2), Idx2::new(0, 1));
        assert_eq!(grid.reconnect_boundary_indices(2, 2), Idx2::new(4, 1));
        assert_eq!(grid.reconnect_boundary_indices(4, 2), Idx2::new(2, 1));
        assert_eq!(grid.reconnect_boundary_indices(0, 2), Idx2::new(0, 1));
    }

    #[test]
    fn dlon_gives_first_row_spacing() {
        let grid = grid_from_rows(&[0.0, 1.0, 3.0, 6.0], &[0.0, 1.0], Mesh::Flat);
        assert_eq!(grid.dlon(), Array1::from(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn date_line_row_passes_bounding_box_test_only_outside_gap() {
        let grid = grid_from_rows(
            &[170.0, 175.0, -175.0, -170.0],
            &[0.0, 1.0, 2.0, 3.0],
            Mesh::Spherical,
        );
        assert!(grid.contains_in_bounding_box(178.0, 1.5));
        assert!(grid.contains_in_bounding_box(-178.0, 1.5));
        assert!(!grid.contains_in_bounding_box(178.0, 3.5));

        let grid = grid_from_rows(&[0.0, 1.0, 2.0], &[0.0, 1.0], Mesh::Flat);
        assert!(!grid.contains_in_bounding_box(2.5, 0.5));
        assert!(grid.contains_in_bounding_box(2.0, 1.0));
    }

    #[test]
    fn latitude_is_tested_on_meridionally_periodic_grids() {
        let grid = grid_from_rows(&[0.0, 1.0, 2.0], &[0.0, 1.0, 2.0, 3.0], Mesh::Flat)
            .with_periodic_halo(false, true, 1)
            .unwrap();
        assert!(grid.is_periodic(Y));
        assert!(grid.contains_in_bounding_box(1.0, -0.5));
        assert!(!grid.contains_in_bounding_box(1.0, 50.0));
        assert!(!grid.contains_in_bounding_box(1.0, -1.5));
    }
}
