//! Three-panel contour maps: north polar, south polar and global.

use ndarray::ArrayView2;
use tracing::info;

use geomag_common::grid::select_field_rows;
use geomag_common::{CoordinateGrid, GeomagResult};
use projection::ProjectionKind;
use renderer::{AxesId, ContourSet, Figure, GridSpec, RenderConfig, RenderOptions, TransformMode, SUPTITLE_FONT_SIZE};

/// Figure size in inches and resolution.
pub const FIGURE_INCHES: (f64, f64) = (10.0, 10.0);
pub const FIGURE_DPI: f64 = 100.0;

/// Spacing between panels as a fraction of the average panel size.
pub const PANEL_SPACING: f64 = 0.05;

/// Latitude range shown on the polar panels.
pub const NORTH_POLAR_LATS: (f64, f64) = (40.0, 90.0);
pub const SOUTH_POLAR_LATS: (f64, f64) = (-90.0, -40.0);

/// Contour `values` on one panel of `figure` and label the lines.
///
/// With `RenderConfig::default()` labels are bare `%g` values at font
/// size 6; the three-panel maps use `RenderConfig::for_units` instead.
pub fn plot_contours<'f>(
    figure: &'f mut Figure,
    axes: AxesId,
    lons: &ArrayView2<'_, f64>,
    lats: &ArrayView2<'_, f64>,
    values: &ArrayView2<'_, f64>,
    mode: TransformMode,
    config: &RenderConfig,
) -> GeomagResult<&'f ContourSet> {
    let axes = figure.axes_mut(axes)?;
    axes.set_circular_boundary(config.circular_boundary && matches!(axes.kind(), ProjectionKind::AzimuthalEquidistant(_)));
    axes.set_graticule(config.graticule.then_some(config.graticule_spacing));
    axes.contour(lons, lats, values, mode, config)
}

/// Draw `data` on north polar, south polar and Mollweide panels.
///
/// `data` must have the grid's (lat, lon) shape. Labels read
/// `"<value> <units>"` unless `options` says otherwise. Returns the figure
/// and its axes in the order north, south, global.
pub fn contours_north_south_moll(
    coords: &CoordinateGrid,
    data: &ArrayView2<'_, f64>,
    units: &str,
    title: &str,
    options: &RenderOptions,
) -> GeomagResult<(Figure, [AxesId; 3])> {
    coords.check_field_shape(data)?;
    let config = options.apply(&RenderConfig::for_units(units));
    config.validate()?;

    let mut fig = Figure::from_inches(FIGURE_INCHES.0, FIGURE_INCHES.1, FIGURE_DPI)?;
    fig.suptitle(title, SUPTITLE_FONT_SIZE);

    let spec = GridSpec::new(2, 2).with_spacing(PANEL_SPACING, PANEL_SPACING);
    let north = fig.subplot2grid(&spec, (0, 0), 1, 1, ProjectionKind::north_polar())?;
    let south = fig.subplot2grid(&spec, (0, 1), 1, 2, ProjectionKind::south_polar())?;
    let global = fig.subplot2grid(&spec, (1, 0), 1, 2, ProjectionKind::mollweide())?;

    fig.axes_mut(north)?
        .set_extent(-180.0, 180.0, NORTH_POLAR_LATS.0, NORTH_POLAR_LATS.1)?;
    fig.axes_mut(south)?
        .set_extent(-180.0, 180.0, SOUTH_POLAR_LATS.0, SOUTH_POLAR_LATS.1)?;
    fig.axes_mut(global)?.set_global();

    // Azimuthal panels only see their own hemisphere.
    let split = coords.hemispheres();
    for (axes, rows) in [(north, &split.north), (south, &split.south)] {
        let part = coords.select_rows(rows)?;
        let values = select_field_rows(data, rows)?;
        plot_contours(
            &mut fig,
            axes,
            &part.longitudes(),
            &part.latitudes(),
            &values.view(),
            TransformMode::BeforeContouring,
            &config,
        )?;
    }

    plot_contours(
        &mut fig,
        global,
        &coords.longitudes(),
        &coords.latitudes(),
        data,
        TransformMode::DuringDrawing,
        &config,
    )?;

    info!(
        title,
        units,
        north_rows = split.north.len(),
        south_rows = split.south.len(),
        "Built north/south/global contour maps"
    );

    Ok((fig, [north, south, global]))
}
