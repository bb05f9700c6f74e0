//! The `curvigrid` crate locates points in curvilinear ocean and atmosphere grids,
//! as needed for Lagrangian particle tracking.

pub mod error;
pub mod geometry;
pub mod grid;
pub mod io;
pub mod num;
pub mod particles;

#[cfg(feature = "cli")]
pub mod cli;
