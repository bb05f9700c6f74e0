//! Curvilinear grids and the search for the grid cell containing a point.

pub mod halo;
pub mod horizontal;
pub mod search;
pub mod sgrid;
pub mod vertical;
pub mod zgrid;

use self::{
    horizontal::{CellCorners, HorizontalGrid},
    search::{HorizontalLocation, SearchConfig},
    sgrid::SLevels,
    vertical::{InterpMethod, VerticalLayout, VerticalLocation, VerticalQuery},
    zgrid::ZLevels,
};
use crate::{
    error::{GridError, SearchError},
    geometry::{Dim2, Idx2, In2D, Point3},
    num::BFloat,
};
use tracing::debug;

#[cfg(feature = "serialization")]
use serde::Serialize;

/// Floating-point precision to use for grid coordinates.
#[allow(non_camel_case_types)]
pub type fgr = f32;

/// Floating-point precision to use for cell search arithmetic.
#[allow(non_camel_case_types)]
pub type fsr = f64;

/// How grid coordinates are to be interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub enum Mesh {
    /// Plain Cartesian coordinates.
    Flat,
    /// Longitude and latitude in degrees, with longitudes wrapping around at 360 degrees.
    Spherical,
}

impl Mesh {
    pub fn is_spherical(self) -> bool {
        self == Self::Spherical
    }
}

/// Vertical coordinate scheme of a curvilinear grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridType {
    /// Depth levels independent of horizontal position.
    CurvilinearZ,
    /// Depth levels varying with horizontal position and possibly time.
    CurvilinearS,
}

/// The point in time a search is performed for.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SearchTime {
    /// Index of the last grid time not after `time`.
    pub index: usize,
    /// The time itself.
    pub time: f64,
}

/// Per-call parameters of a cell search.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SearchOptions {
    /// Cell to start searching from. The grid center is used if absent.
    pub hint: Option<Idx2<usize>>,
    /// Time used by the vertical search.
    pub time: SearchTime,
    /// Skip the vertical search even for grids with several depth levels.
    pub search_2d: bool,
    /// Interpolation method the result will be used for.
    pub interp_method: InterpMethod,
}

impl SearchOptions {
    /// Returns a copy of the options that starts the search from the given cell.
    pub fn with_hint(&self, hint: Option<Idx2<usize>>) -> Self {
        Self { hint, ..*self }
    }
}

/// Indices of a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub struct CellIndices {
    /// Horizontal indices `(xi, yi)`.
    pub horizontal: Idx2<usize>,
    /// Vertical index `zi`, absent for two-dimensional searches.
    pub vertical: Option<usize>,
}

/// A grid cell together with the fractional position of a point inside it.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub struct CellLocation {
    pub indices: CellIndices,
    pub xsi: fsr,
    pub eta: fsr,
    pub zeta: fsr,
}

impl CellLocation {
    pub fn xi(&self) -> usize {
        self.indices.horizontal[Dim2::X]
    }

    pub fn yi(&self) -> usize {
        self.indices.horizontal[Dim2::Y]
    }

    pub fn zi(&self) -> Option<usize> {
        self.indices.vertical
    }
}

/// A curvilinear grid made of a horizontal topology and a vertical layout.
///
/// The vertical layout decides how depth levels are stored and searched, while all
/// horizontal behaviour is shared between layouts.
#[derive(Clone, Debug)]
pub struct CurvilinearGrid<F, L> {
    horizontal: HorizontalGrid<F>,
    vertical: L,
    times: Vec<f64>,
    search_config: SearchConfig,
}

/// Curvilinear grid with depth levels that are constant in the horizontal.
pub type CurvilinearZGrid<F> = CurvilinearGrid<F, ZLevels<F>>;

/// Curvilinear grid with depth levels that vary in the horizontal and possibly in time.
pub type CurvilinearSGrid<F> = CurvilinearGrid<F, SLevels<F>>;

impl<F: BFloat, L: VerticalLayout<F>> CurvilinearGrid<F, L> {
    /// Combines a horizontal grid and a vertical layout into a new grid.
    ///
    /// If no times are given, the grid has a single time at zero.
    pub fn new(
        horizontal: HorizontalGrid<F>,
        vertical: L,
        times: Option<Vec<f64>>,
    ) -> Result<Self, GridError> {
        let times = match times {
            Some(times) if !times.is_empty() => times,
            _ => vec![0.0],
        };
        vertical.validate(horizontal.shape(), times.len())?;
        Ok(Self {
            horizontal,
            vertical,
            times,
            search_config: SearchConfig::default(),
        })
    }

    /// Returns the grid with the given search configuration.
    pub fn with_search_config(mut self, search_config: SearchConfig) -> Self {
        self.search_config = search_config;
        self
    }

    pub fn grid_type(&self) -> GridType {
        L::GRID_TYPE
    }

    pub fn horizontal(&self) -> &HorizontalGrid<F> {
        &self.horizontal
    }

    pub fn vertical(&self) -> &L {
        &self.vertical
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn search_config(&self) -> &SearchConfig {
        &self.search_config
    }

    pub fn xdim(&self) -> usize {
        self.horizontal.xdim()
    }

    pub fn ydim(&self) -> usize {
        self.horizontal.ydim()
    }

    pub fn zdim(&self) -> usize {
        self.vertical.zdim()
    }

    pub fn tdim(&self) -> usize {
        self.times.len()
    }

    /// Returns the corners of the given cell, adjusted for longitude wrapping
    /// relative to the longitude `x` on spherical meshes.
    pub fn cell_corners(&self, indices: &Idx2<usize>, x: fsr) -> CellCorners {
        self.horizontal.cell_corners(indices, x)
    }

    /// Creates a copy of the grid extended with wrapped rows and/or columns
    /// so that it can be searched periodically.
    ///
    /// Calling this on a grid that already has a halo extends it again.
    pub fn with_periodic_halo(
        &self,
        zonal: bool,
        meridional: bool,
        halo_size: usize,
    ) -> Result<Self, GridError> {
        let horizontal = self
            .horizontal
            .with_periodic_halo(zonal, meridional, halo_size)?;
        let halo = In2D::new(
            if zonal { Some(halo_size) } else { None },
            if meridional { Some(halo_size) } else { None },
        );
        let vertical = self.vertical.with_periodic_halo(&halo);
        vertical.validate(horizontal.shape(), self.tdim())?;
        Ok(Self {
            horizontal,
            vertical,
            times: self.times.clone(),
            search_config: self.search_config.clone(),
        })
    }

    /// Finds the grid cell containing the given point and the fractional
    /// position of the point within the cell.
    ///
    /// # Parameters
    ///
    /// - `point`: Longitude, latitude and depth of the point.
    /// - `options`: Start cell, time and mode of the search.
    ///
    /// # Returns
    ///
    /// A `Result` which is either:
    ///
    /// - `Ok`: Contains the containing cell and fractional coordinates in `[0, 1]`.
    ///   The vertical index is `None` and `zeta` zero when the grid has a single
    ///   depth level or a 2D search was requested.
    /// - `Err`: Contains a `SearchError` telling why no usable cell was found.
    pub fn search_indices(
        &self,
        point: &Point3<fsr>,
        options: &SearchOptions,
    ) -> Result<CellLocation, SearchError> {
        let start = options
            .hint
            .unwrap_or_else(|| self.horizontal.center_indices());

        let HorizontalLocation { indices, xsi, eta } =
            self.horizontal
                .search_horizontal(point, &start, &self.search_config)?;

        let (vertical_index, zeta) = if self.zdim() > 1 && !options.search_2d {
            let query = VerticalQuery {
                point: *point,
                indices,
                xsi,
                eta,
                time: options.time,
                interp_method: options.interp_method,
            };
            let VerticalLocation { index, zeta } =
                self.vertical.search_vertical(&self.times, &query)?;
            (Some(index), zeta)
        } else {
            (None, 0.0)
        };

        if !(is_admissible(xsi) && is_admissible(eta) && is_admissible(zeta)) {
            debug!(%point, xsi, eta, zeta, "Inadmissible fractional cell coordinates");
            return Err(SearchError::Sampling {
                x: point.x,
                y: point.y,
                z: point.z,
            });
        }

        Ok(CellLocation {
            indices: CellIndices {
                horizontal: indices,
                vertical: vertical_index,
            },
            xsi,
            eta,
            zeta,
        })
    }
}

fn is_admissible(fraction: fsr) -> bool {
    (0.0..=1.0).contains(&fraction)
}
