//! Tests for global coordinate grid construction and hemisphere partitioning.

use geomag_common::grid::{select_field_rows, HEIGHT, LAT, LON};
use geomag_common::{grid, CoordinateGrid, GeomagError, GridBuilder};
use ndarray::Array2;

// ============================================================================
// Shape and corner values
// ============================================================================

#[test]
fn test_grid_shape_and_corners() {
    for (n, m, h) in [(1, 1, 0.0), (2, 2, 0.0), (7, 13, 450.0), (180, 360, -1.5)] {
        let g = grid(n, m, h).unwrap();
        assert_eq!(g.shape(), (n + 1, m + 1, 3));

        let coords = g.as_array();
        assert_eq!(coords[[0, 0, LAT]], -90.0);
        assert_eq!(coords[[n, 0, LAT]], 90.0);
        assert_eq!(coords[[0, 0, LON]], -180.0);
        assert_eq!(coords[[0, m, LON]], 180.0);
        assert!(g.heights().iter().all(|&v| v == h));
    }
}

#[test]
fn test_small_grid_scenario() {
    let g = grid(2, 2, 0.0).unwrap();
    let lats: Vec<f64> = (0..3).map(|i| g.as_array()[[i, 0, LAT]]).collect();
    let lons: Vec<f64> = (0..3).map(|j| g.as_array()[[0, j, LON]]).collect();
    assert_eq!(lats, vec![-90.0, 0.0, 90.0]);
    assert_eq!(lons, vec![-180.0, 0.0, 180.0]);
    assert!(g.heights().iter().all(|&v| v == 0.0));

    // Latitude is constant along a row, longitude constant along a column.
    for i in 0..3 {
        for j in 0..3 {
            assert_eq!(g.as_array()[[i, j, LAT]], lats[i]);
            assert_eq!(g.as_array()[[i, j, LON]], lons[j]);
            assert_eq!(g.as_array()[[i, j, HEIGHT]], 0.0);
        }
    }
}

#[test]
fn test_grid_is_deterministic() {
    let a = grid(90, 180, 100.0).unwrap();
    let b = grid(90, 180, 100.0).unwrap();
    let bits_a: Vec<u64> = a.as_array().iter().map(|v| v.to_bits()).collect();
    let bits_b: Vec<u64> = b.as_array().iter().map(|v| v.to_bits()).collect();
    assert_eq!(bits_a, bits_b);
}

#[test]
fn test_default_builder_matches_function() {
    let from_builder = GridBuilder::default().build().unwrap();
    let from_fn = grid(180, 360, 0.0).unwrap();
    assert_eq!(from_builder, from_fn);
}

// ============================================================================
// Hemisphere partition
// ============================================================================

#[test]
fn test_hemisphere_partition_default_grid() {
    let g = GridBuilder::default().build().unwrap();
    let split = g.hemispheres();

    assert_eq!(split.north.len(), 90);
    assert_eq!(split.south.len(), 90);

    for &row in &split.north {
        assert!(g.as_array()[[row, 0, LAT]] > 0.0);
        assert!(!split.south.contains(&row));
    }
    for &row in &split.south {
        assert!(g.as_array()[[row, 0, LAT]] < 0.0);
    }

    // Equator row is in neither half.
    assert!(!split.north.contains(&90));
    assert!(!split.south.contains(&90));
}

#[test]
fn test_hemisphere_partition_odd_grid_has_no_equator_row() {
    let g = grid(3, 4, 0.0).unwrap();
    let split = g.hemispheres();
    assert_eq!(split.south, vec![0, 1]);
    assert_eq!(split.north, vec![2, 3]);
}

#[test]
fn test_select_rows() {
    let g = grid(4, 4, 0.0).unwrap();
    let north = g.select_rows(&[3, 4]).unwrap();
    assert_eq!(north.dims(), (2, 5));
    assert_eq!(north.as_array()[[0, 0, LAT]], 45.0);
    assert_eq!(north.as_array()[[1, 0, LAT]], 90.0);

    assert!(matches!(
        g.select_rows(&[5]),
        Err(GeomagError::InvalidParameter { .. })
    ));
}

#[test]
fn test_select_field_rows_and_shape_check() {
    let g = grid(2, 3, 0.0).unwrap();
    let data = Array2::from_shape_fn((3, 4), |(i, j)| (i * 10 + j) as f64);
    g.check_field_shape(&data.view()).unwrap();

    let top = select_field_rows(&data.view(), &[2]).unwrap();
    assert_eq!(top.row(0).to_vec(), vec![20.0, 21.0, 22.0, 23.0]);

    let wrong = Array2::<f64>::zeros((4, 3));
    assert!(matches!(
        g.check_field_shape(&wrong.view()),
        Err(GeomagError::Render(_))
    ));
}

#[test]
fn test_from_array_accepts_custom_coordinates() {
    let mut arr = ndarray::Array3::<f64>::zeros((1, 2, 3));
    arr[[0, 1, LAT]] = 45.0;
    arr[[0, 1, LON]] = 10.0;
    arr[[0, 1, HEIGHT]] = 400.0;
    let g = CoordinateGrid::from_array(arr).unwrap();
    assert_eq!(g.point(0, 1), Some((45.0, 10.0, 400.0)));
}
