//! Command line interface for locating points in a curvilinear grid.

use super::utils;
use crate::{
    exit_on_error, exit_on_false,
    geometry::{Dim2::X, Dim2::Y, In2D, Point3},
    grid::{
        fgr, fsr, halo::DEFAULT_HALO_SIZE, search::SearchConfig, CurvilinearZGrid, Mesh,
        SearchOptions,
    },
    io::Verbose,
    particles::{ParticleSet, ParticleStatus},
};
use clap::{Arg, ArgAction, ArgGroup, ArgMatches, Command};
use ndarray::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

#[cfg(feature = "json")]
use crate::io::save_data_as_json;
#[cfg(feature = "json")]
use std::path::PathBuf;

/// Creates a subcommand for locating points in a synthetic grid.
pub fn create_locate_subcommand() -> Command {
    let command = Command::new("locate")
        .about("Locate points in a synthetic curvilinear grid")
        .long_about(
            "Locate points in a synthetic curvilinear grid.\n\
             The grid is a regular lattice spanning the given bounds, rotated about its\n\
             center. With --spherical, longitudes are wrapped into [-180, 180).",
        )
        .arg(
            Arg::new("shape")
                .long("shape")
                .require_equals(true)
                .num_args(2)
                .value_delimiter(',')
                .value_names(["NX", "NY"])
                .help("Number of grid nodes along x and y")
                .default_values(["50", "40"]),
        )
        .arg(
            Arg::new("x-bounds")
                .long("x-bounds")
                .require_equals(true)
                .num_args(2)
                .value_delimiter(',')
                .allow_hyphen_values(true)
                .value_names(["LOWER", "UPPER"])
                .help("Limits of the unrotated grid along x")
                .default_values(["0", "10"]),
        )
        .arg(
            Arg::new("y-bounds")
                .long("y-bounds")
                .require_equals(true)
                .num_args(2)
                .value_delimiter(',')
                .allow_hyphen_values(true)
                .value_names(["LOWER", "UPPER"])
                .help("Limits of the unrotated grid along y")
                .default_values(["0", "8"]),
        )
        .arg(
            Arg::new("rotation")
                .long("rotation")
                .require_equals(true)
                .allow_hyphen_values(true)
                .value_name("DEGREES")
                .help("Counter-clockwise rotation of the grid about its center")
                .default_value("0"),
        )
        .arg(
            Arg::new("spherical")
                .long("spherical")
                .action(ArgAction::SetTrue)
                .help("Interpret coordinates as longitude and latitude in degrees"),
        )
        .arg(
            Arg::new("zonal-halo")
                .long("zonal-halo")
                .num_args(0..=1)
                .value_name("SIZE")
                .help("Make the grid zonally periodic by adding a halo of the given size [default: 5]"),
        )
        .arg(
            Arg::new("meridional-halo")
                .long("meridional-halo")
                .num_args(0..=1)
                .value_name("SIZE")
                .help("Make the grid meridionally periodic by adding a halo of the given size [default: 5]"),
        )
        .arg(
            Arg::new("depths")
                .long("depths")
                .require_equals(true)
                .num_args(1..)
                .value_delimiter(',')
                .allow_hyphen_values(true)
                .value_name("DEPTHS")
                .help("Depth levels of the grid [default: single level at zero]"),
        )
        .arg(
            Arg::new("tolerance")
                .long("tolerance")
                .require_equals(true)
                .value_name("VALUE")
                .help("How far outside [0, 1] fractional cell coordinates may lie")
                .default_value("1e-10"),
        )
        .arg(
            Arg::new("max-iterations")
                .long("max-iterations")
                .require_equals(true)
                .value_name("NUMBER")
                .help("Number of cell steps before a search is abandoned")
                .default_value("1000000"),
        )
        .arg(
            Arg::new("point")
                .long("point")
                .require_equals(true)
                .allow_hyphen_values(true)
                .action(ArgAction::Append)
                .value_name("X,Y[,Z]")
                .help("Point to locate (can be repeated)"),
        )
        .arg(
            Arg::new("random-points")
                .long("random-points")
                .require_equals(true)
                .value_name("NUMBER")
                .help("Number of points to locate, drawn uniformly within the grid bounds"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .require_equals(true)
                .value_name("NUMBER")
                .help("Seed for drawing random points")
                .default_value("0"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Print status messages"),
        )
        .group(
            ArgGroup::new("points")
                .args(["point", "random-points"])
                .required(true)
                .multiple(true),
        );

    #[cfg(feature = "json")]
    let command = command.arg(
        Arg::new("output")
            .short('o')
            .long("output")
            .require_equals(true)
            .value_name("OUTPUT_FILE")
            .value_parser(clap::value_parser!(PathBuf))
            .help("Write the located particles as JSON to this file instead of printing them"),
    );

    command
}

/// Runs the actions for the `locate` subcommand using the given arguments.
pub fn run_locate_subcommand(arguments: &ArgMatches) {
    let shape = utils::parse_2d_values::<usize>(arguments, "shape", 2);
    let x_bounds = utils::parse_limits::<fsr>(arguments, "x-bounds");
    let y_bounds = utils::parse_limits::<fsr>(arguments, "y-bounds");
    let rotation =
        utils::get_finite_float_value_from_required_parseable_argument::<fsr>(arguments, "rotation");
    let mesh = if arguments.get_flag("spherical") {
        Mesh::Spherical
    } else {
        Mesh::Flat
    };

    let (lon, lat) = create_synthetic_coords(&shape, x_bounds, y_bounds, rotation, mesh);
    let depth = utils::get_finite_float_values_from_parseable_argument::<fgr>(arguments, "depths")
        .map(Array1::from);

    let search_config = SearchConfig {
        tolerance: utils::get_finite_float_value_from_required_parseable_argument(
            arguments,
            "tolerance",
        ),
        max_iterations: utils::get_value_from_required_parseable_argument(
            arguments,
            "max-iterations",
        ),
        ..SearchConfig::default()
    };
    exit_on_false!(
        search_config.tolerance >= 0.0,
        "Error: tolerance must be non-negative"
    );

    let mut grid = exit_on_error!(
        CurvilinearZGrid::from_coords(lon, lat, depth, None, mesh),
        "Error: Could not create grid: {}"
    )
    .with_search_config(search_config);

    let halo_size_from_argument = |argument_name: &str| {
        arguments.contains_id(argument_name).then(|| {
            utils::get_value_from_parseable_argument(arguments, argument_name)
                .unwrap_or(DEFAULT_HALO_SIZE)
        })
    };
    if let Some(halo_size) = halo_size_from_argument("zonal-halo") {
        grid = exit_on_error!(
            grid.with_periodic_halo(true, false, halo_size),
            "Error: Could not add zonal halo: {}"
        );
    }
    if let Some(halo_size) = halo_size_from_argument("meridional-halo") {
        grid = exit_on_error!(
            grid.with_periodic_halo(false, true, halo_size),
            "Error: Could not add meridional halo: {}"
        );
    }

    let mut positions: Vec<Point3<fsr>> = arguments
        .get_many::<String>("point")
        .map(|points| {
            points
                .map(|point_string| utils::parse_point("point", point_string))
                .collect()
        })
        .unwrap_or_default();

    if let Some(n_points) = utils::get_value_from_parseable_argument::<usize>(arguments, "random-points") {
        let seed: u64 = utils::get_value_from_required_parseable_argument(arguments, "seed");
        let depth_range = grid.vertical().depth().iter().fold(
            (fsr::INFINITY, fsr::NEG_INFINITY),
            |(min, max), &depth| (min.min(depth as fsr), max.max(depth as fsr)),
        );
        positions.extend(draw_random_points(
            n_points,
            seed,
            (grid.horizontal().bounds().lon_min, grid.horizontal().bounds().lon_max),
            (grid.horizontal().bounds().lat_min, grid.horizontal().bounds().lat_max),
            depth_range,
        ));
    }

    let verbose = Verbose::from(arguments.get_flag("verbose"));
    let mut particles = ParticleSet::new(positions, verbose);
    particles.locate(&grid, &SearchOptions::default());

    #[cfg(feature = "json")]
    if let Some(output_file_path) = arguments.get_one::<PathBuf>("output") {
        exit_on_error!(
            save_data_as_json(output_file_path, &particles),
            "Error: Could not write output file: {}"
        );
        if verbose.is_yes() {
            println!("Wrote {}", output_file_path.display());
        }
        return;
    }

    print_particle_locations(&particles);
}

/// Creates coordinate arrays for a regular lattice spanning the given bounds,
/// rotated counter-clockwise by `rotation` degrees about its center.
///
/// On spherical meshes the longitudes are wrapped into `[-180, 180)`.
pub fn create_synthetic_coords(
    shape: &In2D<usize>,
    x_bounds: (fsr, fsr),
    y_bounds: (fsr, fsr),
    rotation: fsr,
    mesh: Mesh,
) -> (Array2<fgr>, Array2<fgr>) {
    let (nx, ny) = shape.to_tuple();
    let center = (
        0.5 * (x_bounds.0 + x_bounds.1),
        0.5 * (y_bounds.0 + y_bounds.1),
    );
    let (sin, cos) = rotation.to_radians().sin_cos();

    let rotated_node = |j: usize, i: usize| -> (fsr, fsr) {
        let u = x_bounds.0 + (x_bounds.1 - x_bounds.0) * (i as fsr) / ((nx - 1) as fsr);
        let v = y_bounds.0 + (y_bounds.1 - y_bounds.0) * (j as fsr) / ((ny - 1) as fsr);
        let (du, dv) = (u - center.0, v - center.1);
        let x = center.0 + du * cos - dv * sin;
        let y = center.1 + du * sin + dv * cos;
        let x = if mesh.is_spherical() {
            (x + 180.0).rem_euclid(360.0) - 180.0
        } else {
            x
        };
        (x, y)
    };

    let lon = Array2::from_shape_fn((ny, nx), |(j, i)| rotated_node(j, i).0 as fgr);
    let lat = Array2::from_shape_fn((ny, nx), |(j, i)| rotated_node(j, i).1 as fgr);
    (lon, lat)
}

fn draw_random_points(
    n_points: usize,
    seed: u64,
    x_range: (fsr, fsr),
    y_range: (fsr, fsr),
    z_range: (fsr, fsr),
) -> Vec<Point3<fsr>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut draw = |(lower, upper): (fsr, fsr)| {
        if upper > lower {
            rng.gen_range(lower..upper)
        } else {
            lower
        }
    };
    (0..n_points)
        .map(|_| Point3::new(draw(x_range), draw(y_range), draw(z_range)))
        .collect()
}

fn print_particle_locations(particles: &ParticleSet) {
    for particle in particles.particles() {
        match (particle.status(), particle.location()) {
            (ParticleStatus::Active, Some(location)) => {
                let zi = location
                    .zi()
                    .map_or_else(|| "-".to_string(), |zi| zi.to_string());
                println!(
                    "{} {}: cell [{}, {}, {}] xsi={:.6} eta={:.6} zeta={:.6}",
                    particle.id(),
                    particle.position(),
                    location.indices.horizontal[X],
                    location.indices.horizontal[Y],
                    zi,
                    location.xsi,
                    location.eta,
                    location.zeta
                );
            }
            (status, _) => println!("{} {}: {:?}", particle.id(), particle.position(), status),
        }
    }
}
