#![cfg(feature = "cli")]

mod common;

use curvigrid::{
    cli::locate::create_synthetic_coords,
    geometry::{In2D, Point3},
    grid::{CurvilinearZGrid, Mesh, SearchOptions},
};

#[test]
fn locating_given_and_random_points_works() {
    common::run([
        "locate",
        "--shape=20,15",
        "--rotation=30",
        "--point=5,4",
        "--point=5,4,0",
        "--random-points=50",
        "--seed=3",
    ]);
}

#[test]
fn locating_in_periodic_spherical_grid_works() {
    common::run([
        "locate",
        "--shape=36,10",
        "--x-bounds=-180,170",
        "--y-bounds=-45,45",
        "--spherical",
        "--zonal-halo",
        "--depths=0,10,50",
        "--point=175,0,20",
        "--point=-179,30",
    ]);
}

#[test]
fn synthetic_spherical_coords_are_wrapped() {
    let (lon, lat) = create_synthetic_coords(
        &In2D::new(5, 3),
        (160.0, 200.0),
        (0.0, 2.0),
        0.0,
        Mesh::Spherical,
    );
    assert_eq!(lon.row(0).to_vec(), vec![160.0, 170.0, -180.0, -170.0, -160.0]);
    assert_eq!(lat.column(0).to_vec(), vec![0.0, 1.0, 2.0]);

    let grid = CurvilinearZGrid::from_coords(lon, lat, None, None, Mesh::Spherical).unwrap();
    let location = grid
        .search_indices(&Point3::new(-175.0, 0.5, 0.0), &SearchOptions::default())
        .unwrap();
    assert_eq!((location.xi(), location.yi()), (2, 0));
}

#[cfg(feature = "json")]
#[test]
fn located_particles_are_written_as_json() {
    let output_dir = tempfile::tempdir().unwrap();
    let output_path = output_dir.path().join("particles.json");
    common::run([
        "locate".to_string(),
        "--shape=11,9".to_string(),
        "--x-bounds=0,10".to_string(),
        "--y-bounds=0,8".to_string(),
        "--point=2.5,3.5".to_string(),
        "--point=20,1".to_string(),
        format!("--output={}", output_path.display()),
    ]);

    let output: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output_path).unwrap()).unwrap();
    let particles = output["particles"].as_array().unwrap();
    assert_eq!(particles.len(), 2);

    assert_eq!(particles[0]["status"], "Active");
    assert_eq!(
        particles[0]["location"]["indices"]["horizontal"],
        serde_json::json!([2, 3])
    );
    assert!((particles[0]["location"]["xsi"].as_f64().unwrap() - 0.5).abs() < 1e-6);

    assert_eq!(particles[1]["status"], "OutOfDomain");
    assert!(particles[1]["location"].is_null());
}
