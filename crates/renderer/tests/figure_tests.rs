//! Tests for figure layout, map axes and contour drawing.

use geomag_common::GeomagError;
use ndarray::s;
use projection::ProjectionKind;
use renderer::{Color, Colormap, Figure, GridSpec, RenderConfig, TransformMode};
use test_utils::generators::{dipole_intensity_field, lat_lon_arrays, wavy_field};

fn non_white_pixels(pixmap: &tiny_skia::Pixmap) -> usize {
    pixmap
        .pixels()
        .iter()
        .filter(|p| !(p.red() == 255 && p.green() == 255 && p.blue() == 255))
        .count()
}

fn three_panel_figure() -> (Figure, [renderer::AxesId; 3]) {
    let mut fig = Figure::from_inches(10.0, 10.0, 100.0).unwrap();
    let spec = GridSpec::new(2, 2).with_spacing(0.05, 0.05);
    let north = fig.subplot2grid(&spec, (0, 0), 1, 1, ProjectionKind::north_polar()).unwrap();
    let south = fig.subplot2grid(&spec, (0, 1), 1, 2, ProjectionKind::south_polar()).unwrap();
    let global = fig.subplot2grid(&spec, (1, 0), 1, 2, ProjectionKind::mollweide()).unwrap();
    (fig, [north, south, global])
}

#[test]
fn test_three_panel_layout() {
    let (mut fig, [north, south, global]) = three_panel_figure();
    fig.axes_mut(north).unwrap().set_extent(-180.0, 180.0, 40.0, 90.0).unwrap();
    fig.axes_mut(south).unwrap().set_extent(-180.0, 180.0, -90.0, -40.0).unwrap();
    fig.axes_mut(global).unwrap().set_global();

    let n = fig.axes(north).unwrap().rect();
    let s = fig.axes(south).unwrap().rect();
    let g = fig.axes(global).unwrap().rect();

    // Polar panels sit side by side on top, the global panel below.
    assert!(n.right() <= s.x + 1e-6);
    assert!((n.y - s.y).abs() < 1e-6);
    assert!(g.y >= n.bottom() - 1e-6);
    // Equal aspect: polar panels are square, Mollweide is 2:1.
    assert!((n.width - n.height).abs() < 1e-6);
    assert!((g.width / g.height - 2.0).abs() < 1e-3);
    // Everything stays inside the default margins.
    assert!(n.x >= 125.0 - 1e-6 && g.right() <= 900.0 + 1e-6);
}

#[test]
fn test_polar_contours_before_contouring() {
    let (mut fig, [north, _, _]) = three_panel_figure();
    let (lats, lons) = lat_lon_arrays(19, 37);
    let field = dipole_intensity_field(19, 37, 30_000.0);
    let rows = s![10.., ..];

    let axes = fig.axes_mut(north).unwrap();
    axes.set_extent(-180.0, 180.0, 40.0, 90.0).unwrap();
    let config = RenderConfig::for_units("nT");
    let set = axes
        .contour(
            &lons.slice(rows),
            &lats.slice(rows),
            &field.slice(rows),
            TransformMode::BeforeContouring,
            &config,
        )
        .unwrap();

    assert!(!set.levels.is_empty());
    assert!(!set.lines.is_empty());
    assert_eq!(set.label_text(40_000.0), "40000 nT");
    // Zonal field around the pole: every line is a circle about the origin.
    for line in &set.lines {
        let r0 = line.points[0].0.hypot(line.points[0].1);
        assert!(line.points.iter().all(|p| (p.0.hypot(p.1) - r0).abs() / r0 < 1e-2));
    }
}

#[test]
fn test_global_contours_split_at_seam() {
    let (mut fig, [_, _, global]) = three_panel_figure();
    let (lats, lons) = lat_lon_arrays(37, 73);
    let field = wavy_field(37, 73);

    let axes = fig.axes_mut(global).unwrap();
    axes.set_global();
    let width = axes.projection().global_extent().width();
    let set = axes
        .contour(
            &lons.view(),
            &lats.view(),
            &field.view(),
            TransformMode::DuringDrawing,
            &RenderConfig::default(),
        )
        .unwrap();

    assert!(!set.lines.is_empty());
    for line in &set.lines {
        for w in line.points.windows(2) {
            assert!((w[1].0 - w[0].0).abs() <= width / 2.0);
        }
    }
}

#[test]
fn test_colours_follow_colormap() {
    let (mut fig, [_, _, global]) = three_panel_figure();
    let (lats, lons) = lat_lon_arrays(19, 37);
    let field = dipole_intensity_field(19, 37, 30_000.0);
    let config = RenderConfig {
        colormap: Colormap::Single {
            color: "#ff0000".to_string(),
        },
        ..RenderConfig::default()
    };
    let set = fig
        .axes_mut(global)
        .unwrap()
        .contour(&lons.view(), &lats.view(), &field.view(), TransformMode::DuringDrawing, &config)
        .unwrap();
    assert!(set.lines.iter().all(|l| l.color == Color::rgb(255, 0, 0)));
}

#[test]
fn test_shape_mismatch_is_render_error() {
    let (mut fig, [north, _, _]) = three_panel_figure();
    let (lats, lons) = lat_lon_arrays(5, 9);
    let field = dipole_intensity_field(5, 8, 1.0);
    let err = fig
        .axes_mut(north)
        .unwrap()
        .contour(
            &lons.view(),
            &lats.view(),
            &field.view(),
            TransformMode::BeforeContouring,
            &RenderConfig::default(),
        )
        .unwrap_err();
    assert!(matches!(err, GeomagError::Render(_)));
}

#[test]
fn test_constant_field_draws_nothing() {
    let (mut fig, [_, _, global]) = three_panel_figure();
    let (lats, lons) = lat_lon_arrays(5, 9);
    let field = ndarray::Array2::from_elem((5, 9), 7.0);
    let set = fig
        .axes_mut(global)
        .unwrap()
        .contour(&lons.view(), &lats.view(), &field.view(), TransformMode::DuringDrawing, &RenderConfig::default())
        .unwrap();
    assert!(set.levels.is_empty());
    assert!(set.lines.is_empty());
}

#[test]
fn test_render_draws_lines_and_title() {
    let mut fig = Figure::new(300, 200).unwrap();
    let blank = non_white_pixels(&fig.render().unwrap());
    assert_eq!(blank, 0);

    fig.suptitle("IGRF", 15.0);
    let titled = non_white_pixels(&fig.render().unwrap());
    assert!(titled > 0);

    let spec = GridSpec::new(1, 1);
    let id = fig.subplot2grid(&spec, (0, 0), 1, 1, ProjectionKind::mollweide()).unwrap();
    let (lats, lons) = lat_lon_arrays(19, 37);
    let field = dipole_intensity_field(19, 37, 30_000.0);
    fig.axes_mut(id)
        .unwrap()
        .contour(&lons.view(), &lats.view(), &field.view(), TransformMode::DuringDrawing, &RenderConfig::default())
        .unwrap();
    let drawn = non_white_pixels(&fig.render().unwrap());
    assert!(drawn > titled);
}

#[test]
fn test_labels_can_be_disabled() {
    let render = |labels: bool| {
        let mut fig = Figure::new(400, 400).unwrap();
        let id = fig
            .subplot2grid(&GridSpec::new(1, 1), (0, 0), 1, 1, ProjectionKind::mollweide())
            .unwrap();
        let (lats, lons) = lat_lon_arrays(37, 73);
        let field = dipole_intensity_field(37, 73, 30_000.0);
        let config = RenderConfig {
            labels,
            ..RenderConfig::for_units("nT")
        };
        fig.axes_mut(id)
            .unwrap()
            .contour(&lons.view(), &lats.view(), &field.view(), TransformMode::DuringDrawing, &config)
            .unwrap();
        fig.render().unwrap()
    };
    assert_ne!(render(true).data(), render(false).data());
}

#[test]
fn test_save_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("figure.png");
    let mut fig = Figure::new(64, 48).unwrap();
    fig.suptitle("F", 10.0);
    fig.save_png(&path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..8], &renderer::png::PNG_SIGNATURE);
}

#[test]
fn test_save_png_to_missing_directory() {
    let fig = Figure::new(8, 8).unwrap();
    let err = fig.save_png("/nonexistent/dir/figure.png").unwrap_err();
    assert!(matches!(err, GeomagError::Io(_)));
}
