#![allow(dead_code)]

use curvigrid::{
    geometry::{
        Dim2::{X, Y},
        Idx2, Point3,
    },
    grid::{fgr, fsr, CurvilinearZGrid, Mesh},
};
use ndarray::Array2;

#[cfg(feature = "cli")]
use clap::Command;
#[cfg(feature = "cli")]
use lazy_static::lazy_static;
#[cfg(feature = "cli")]
use std::ffi::OsString;

#[cfg(feature = "cli")]
lazy_static! {
    static ref COMMAND: Command = curvigrid::cli::build::build();
}

/// Runs the command line program in-process with the given arguments.
#[cfg(feature = "cli")]
pub fn run<I, T>(args: I)
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = std::iter::once(OsString::from("curvigrid")).chain(args.into_iter().map(Into::into));
    curvigrid::cli::run::run_with_args(COMMAND.clone().get_matches_from(args));
}

/// Creates a grid from a row of longitudes shared by every row and a column
/// of latitudes shared by every column.
pub fn grid_from_axes(lon_row: &[fgr], lat_column: &[fgr], mesh: Mesh) -> CurvilinearZGrid<fgr> {
    let shape = (lat_column.len(), lon_row.len());
    let lon = Array2::from_shape_fn(shape, |(_, i)| lon_row[i]);
    let lat = Array2::from_shape_fn(shape, |(j, _)| lat_column[j]);
    CurvilinearZGrid::from_coords(lon, lat, None, None, mesh).unwrap()
}

/// Creates a grid with unit spacing and its first node at the origin.
pub fn unit_grid(nx: usize, ny: usize) -> CurvilinearZGrid<fgr> {
    let lon_row: Vec<fgr> = (0..nx).map(|i| i as fgr).collect();
    let lat_column: Vec<fgr> = (0..ny).map(|j| j as fgr).collect();
    grid_from_axes(&lon_row, &lat_column, Mesh::Flat)
}

/// Creates a flat grid whose rows are rotated by `angle` degrees and whose
/// columns are additionally sheared along x by `shear` per row.
pub fn rotated_sheared_grid(nx: usize, ny: usize, angle: fsr, shear: fsr) -> CurvilinearZGrid<fgr> {
    let (sin, cos) = angle.to_radians().sin_cos();
    let node = |j: usize, i: usize| {
        let (u, v) = (i as fsr + shear * j as fsr, j as fsr);
        (10.0 + u * cos - v * sin, -5.0 + u * sin + v * cos)
    };
    let lon = Array2::from_shape_fn((ny, nx), |(j, i)| node(j, i).0 as fgr);
    let lat = Array2::from_shape_fn((ny, nx), |(j, i)| node(j, i).1 as fgr);
    CurvilinearZGrid::from_coords(lon, lat, None, None, Mesh::Flat).unwrap()
}

/// Returns the point at the given fractional position in the given cell.
pub fn point_in_cell(
    grid: &CurvilinearZGrid<fgr>,
    cell: Idx2<usize>,
    xsi: fsr,
    eta: fsr,
) -> Point3<fsr> {
    let corners = grid.cell_corners(&cell, 0.0);
    let point = corners.interpolate(xsi, eta);
    Point3::new(point[X], point[Y], 0.0)
}
