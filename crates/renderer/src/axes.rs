//! Map axes: a projection, a visible extent and the contour sets drawn on it.

use ndarray::{Array2, ArrayView2, Zip};
use serde::{Deserialize, Serialize};
use tiny_skia::{FillRule, LineCap, LineJoin, Mask, Paint, Path, PathBuilder, Pixmap, Stroke, Transform};
use tracing::{debug, warn};

use geomag_common::{GeomagError, GeomagResult};
use projection::{Extent, MapProjection, ProjectionKind};

use crate::colormap::Color;
use crate::contour::{contour_grid, data_range};
use crate::figure::PixelRect;
use crate::format::LabelFormat;
use crate::labels::{collect_label_positions, draw_label};
use crate::style::RenderConfig;

/// Where geographic coordinates are converted to map coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformMode {
    /// Project the grid first, then contour in map coordinates. Lines never
    /// cross a seam, which suits azimuthal panels.
    BeforeContouring,
    /// Contour in longitude/latitude and project each line, breaking it
    /// where it jumps across the map edge.
    DuringDrawing,
}

/// One drawn contour line in projected coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourLine {
    pub level: f64,
    pub points: Vec<(f64, f64)>,
    pub closed: bool,
    pub color: Color,
}

/// The result of one `contour` call.
#[derive(Debug, Clone)]
pub struct ContourSet {
    pub levels: Vec<f64>,
    pub lines: Vec<ContourLine>,
    pub mode: TransformMode,
    config: RenderConfig,
    format: LabelFormat,
}

impl ContourSet {
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Label text for a level.
    pub fn label_text(&self, level: f64) -> String {
        self.format.format(level)
    }
}

/// Map axes placed in a figure cell.
#[derive(Debug)]
pub struct Axes {
    cell: PixelRect,
    kind: ProjectionKind,
    projection: Box<dyn MapProjection>,
    extent: Extent,
    extent_is_global: bool,
    circular_boundary: bool,
    graticule: Option<(f64, f64)>,
    contour_sets: Vec<ContourSet>,
}

const GRATICULE_COLOR: Color = Color::rgb(0xb0, 0xb0, 0xb0);

impl Axes {
    pub(crate) fn new(cell: PixelRect, kind: ProjectionKind) -> Self {
        let projection = kind.build();
        let extent = projection.global_extent();
        Self {
            cell,
            kind,
            projection,
            extent,
            extent_is_global: true,
            circular_boundary: false,
            graticule: None,
            contour_sets: Vec::new(),
        }
    }

    pub fn kind(&self) -> ProjectionKind {
        self.kind
    }

    pub fn projection(&self) -> &dyn MapProjection {
        self.projection.as_ref()
    }

    pub fn projection_name(&self) -> &'static str {
        self.projection.name()
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn contour_sets(&self) -> &[ContourSet] {
        &self.contour_sets
    }

    /// Limit the view to a longitude/latitude rectangle (degrees).
    pub fn set_extent(&mut self, lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> GeomagResult<()> {
        if !(lon_min < lon_max && lat_min < lat_max) || lat_min < -90.0 || lat_max > 90.0 {
            return Err(GeomagError::InvalidParameter {
                param: "extent".to_string(),
                message: format!(
                    "lon {}..{} lat {}..{} is not a valid rectangle",
                    lon_min, lon_max, lat_min, lat_max
                ),
            });
        }
        let extent = self
            .projection
            .extent_of(lon_min, lon_max, lat_min, lat_max)
            .filter(|e| e.width() > 0.0 && e.height() > 0.0)
            .ok_or_else(|| {
                GeomagError::Render(format!(
                    "extent lon {}..{} lat {}..{} is not visible in {}",
                    lon_min,
                    lon_max,
                    lat_min,
                    lat_max,
                    self.projection.name()
                ))
            })?;
        self.extent = extent;
        self.extent_is_global = false;
        Ok(())
    }

    /// Show the whole globe.
    pub fn set_global(&mut self) {
        self.extent = self.projection.global_extent();
        self.extent_is_global = true;
    }

    /// Clip the panel to the circle inscribed in its rectangle.
    pub fn set_circular_boundary(&mut self, enabled: bool) {
        self.circular_boundary = enabled;
    }

    /// Draw meridians and parallels every `spacing` = (dlon, dlat) degrees.
    pub fn set_graticule(&mut self, spacing: Option<(f64, f64)>) {
        self.graticule = spacing.filter(|&(dlon, dlat)| dlon > 0.0 && dlat > 0.0);
    }

    /// Pixel rectangle of the map area: the extent at equal aspect,
    /// centred in the cell.
    pub fn rect(&self) -> PixelRect {
        self.cell.fit_aspect(self.extent.aspect())
    }

    fn to_pixel(&self, rect: &PixelRect, x: f64, y: f64) -> (f32, f32) {
        let px = rect.x + (x - self.extent.x_min) / self.extent.width() * rect.width;
        let py = rect.y + (self.extent.y_max - y) / self.extent.height() * rect.height;
        (px as f32, py as f32)
    }

    /// Contour `values` sampled at `lons`/`lats` (degrees, same shape).
    pub fn contour(
        &mut self,
        lons: &ArrayView2<'_, f64>,
        lats: &ArrayView2<'_, f64>,
        values: &ArrayView2<'_, f64>,
        mode: TransformMode,
        config: &RenderConfig,
    ) -> GeomagResult<&ContourSet> {
        if lons.dim() != values.dim() || lats.dim() != values.dim() {
            return Err(GeomagError::Render(format!(
                "longitude {:?} and latitude {:?} shapes do not match data shape {:?}",
                lons.dim(),
                lats.dim(),
                values.dim()
            )));
        }
        config.validate()?;
        let format = config.parsed_format()?;

        let levels = match data_range(values) {
            Some((lo, hi)) => config.levels.resolve(lo, hi)?,
            None => Vec::new(),
        };

        let mut lines = Vec::new();
        if !levels.is_empty() {
            match mode {
                TransformMode::BeforeContouring => {
                    let (xs, ys, masked) = self.project_grid(lons, lats, values);
                    let contours = contour_grid(&xs.view(), &ys.view(), &masked.view(), &levels, config.smoothing_passes)?;
                    for c in contours {
                        let points = c.points.iter().map(|p| finite((p.x, p.y))).collect();
                        push_pieces(&mut lines, c.level, points, c.closed, f64::INFINITY);
                    }
                }
                TransformMode::DuringDrawing => {
                    let contours = contour_grid(lons, lats, values, &levels, config.smoothing_passes)?;
                    let max_jump = self.projection.global_extent().width() / 2.0;
                    for c in contours {
                        let points = c
                            .points
                            .iter()
                            .map(|p| self.projection.project(p.x, p.y).and_then(finite))
                            .collect();
                        push_pieces(&mut lines, c.level, points, c.closed, max_jump);
                    }
                }
            }
        }

        for line in &mut lines {
            line.color = config.colormap.color_for(line.level, &levels);
        }

        debug!(
            projection = self.projection.name(),
            ?mode,
            levels = levels.len(),
            lines = lines.len(),
            "Contoured field"
        );

        self.contour_sets.push(ContourSet {
            levels,
            lines,
            mode,
            config: config.clone(),
            format,
        });
        let index = self.contour_sets.len() - 1;
        Ok(&self.contour_sets[index])
    }

    /// Project grid coordinates; data at unprojectable points becomes NaN.
    fn project_grid(
        &self,
        lons: &ArrayView2<'_, f64>,
        lats: &ArrayView2<'_, f64>,
        values: &ArrayView2<'_, f64>,
    ) -> (Array2<f64>, Array2<f64>, Array2<f64>) {
        let mut xs = Array2::from_elem(values.dim(), f64::NAN);
        let mut ys = Array2::from_elem(values.dim(), f64::NAN);
        let mut masked = values.to_owned();
        Zip::from(&mut xs)
            .and(&mut ys)
            .and(&mut masked)
            .and(lons)
            .and(lats)
            .for_each(|x, y, v, &lon, &lat| match self.projection.project(lon, lat).and_then(finite) {
                Some((px, py)) => {
                    *x = px;
                    *y = py;
                }
                None => *v = f64::NAN,
            });
        (xs, ys, masked)
    }

    fn clip_path(&self, rect: &PixelRect) -> Option<Path> {
        if self.circular_boundary {
            let (cx, cy) = rect.center();
            let radius = rect.width.min(rect.height) / 2.0;
            return PathBuilder::from_circle(cx as f32, cy as f32, radius as f32);
        }
        if self.extent_is_global {
            let ring = self.projection.boundary();
            let mut pb = PathBuilder::new();
            for (i, &(x, y)) in ring.iter().enumerate() {
                let (px, py) = self.to_pixel(rect, x, y);
                if i == 0 {
                    pb.move_to(px, py);
                } else {
                    pb.line_to(px, py);
                }
            }
            pb.close();
            if let Some(path) = pb.finish() {
                return Some(path);
            }
        }
        let r = tiny_skia::Rect::from_xywh(rect.x as f32, rect.y as f32, rect.width as f32, rect.height as f32)?;
        Some(PathBuilder::from_rect(r))
    }

    fn polyline_path(points: &[(f32, f32)], closed: bool) -> Option<Path> {
        let mut pb = PathBuilder::new();
        let (first, rest) = points.split_first()?;
        pb.move_to(first.0, first.1);
        for p in rest {
            pb.line_to(p.0, p.1);
        }
        if closed {
            pb.close();
        }
        pb.finish()
    }

    fn graticule_lines(&self, dlon: f64, dlat: f64) -> Vec<Vec<(f64, f64)>> {
        let max_jump = self.projection.global_extent().width() / 2.0;
        let mut lines = Vec::new();
        let mut add = |samples: Vec<(f64, f64)>| {
            let points = samples
                .into_iter()
                .map(|(lon, lat)| self.projection.project(lon, lat).and_then(finite))
                .collect();
            let mut pieces = Vec::new();
            push_pieces(&mut pieces, 0.0, points, false, max_jump);
            lines.extend(pieces.into_iter().map(|l| l.points));
        };

        let mut lon = -180.0;
        while lon <= 180.0 + 1e-9 {
            add((0..=180).map(|k| (lon, -90.0 + k as f64)).collect());
            lon += dlon;
        }
        let mut lat = -90.0 + dlat;
        while lat < 90.0 - 1e-9 {
            add((0..=360).map(|k| (-180.0 + k as f64, lat)).collect());
            lat += dlat;
        }
        lines
    }

    /// Draw the panel onto the figure canvas.
    pub(crate) fn draw(&self, pixmap: &mut Pixmap) -> GeomagResult<()> {
        let rect = self.rect();
        let clip = self
            .clip_path(&rect)
            .ok_or_else(|| GeomagError::Render("degenerate axes rectangle".to_string()))?;
        let mut mask = Mask::new(pixmap.width(), pixmap.height())
            .ok_or_else(|| GeomagError::Render("cannot allocate clip mask".to_string()))?;
        mask.fill_path(&clip, FillRule::Winding, true, Transform::identity());

        let mut paint = Paint::default();
        paint.anti_alias = true;
        let mut stroke = Stroke::default();
        stroke.line_cap = LineCap::Round;
        stroke.line_join = LineJoin::Round;

        if let Some((dlon, dlat)) = self.graticule {
            paint.set_color(GRATICULE_COLOR.to_skia());
            stroke.width = 0.5;
            for line in self.graticule_lines(dlon, dlat) {
                let px: Vec<(f32, f32)> = line.iter().map(|&(x, y)| self.to_pixel(&rect, x, y)).collect();
                if let Some(path) = Self::polyline_path(&px, false) {
                    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), Some(&mask));
                }
            }
        }

        for set in &self.contour_sets {
            let config = set.config();
            stroke.width = config.line_width;

            let mut labels = Vec::new();
            let mut drawn = 0usize;
            for line in &set.lines {
                let px: Vec<(f32, f32)> = line.points.iter().map(|&(x, y)| self.to_pixel(&rect, x, y)).collect();
                let Some(path) = Self::polyline_path(&px, line.closed) else {
                    continue;
                };
                paint.set_color(line.color.to_skia());
                pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), Some(&mask));
                drawn += 1;

                if config.labels {
                    let mut ring = px;
                    if line.closed {
                        if let Some(&first) = ring.first() {
                            ring.push(first);
                        }
                    }
                    collect_label_positions(
                        &ring,
                        &set.label_text(line.level),
                        line.color,
                        config.font_size,
                        config.inline_spacing,
                        &mask,
                        &mut labels,
                    );
                }
            }

            for label in &labels {
                draw_label(pixmap, label, config.font_size, config.inline_spacing, Color::WHITE, Some(&mask));
            }

            if config.labels && drawn > 0 && labels.is_empty() {
                warn!(
                    projection = self.projection.name(),
                    lines = drawn,
                    "No contour line had room for a label"
                );
            }
            debug!(lines = drawn, labels = labels.len(), "Drew contour set");
        }

        paint.set_color(Color::BLACK.to_skia());
        stroke.width = 1.0;
        pixmap.stroke_path(&clip, &paint, &stroke, Transform::identity(), None);
        Ok(())
    }
}

fn finite(p: (f64, f64)) -> Option<(f64, f64)> {
    (p.0.is_finite() && p.1.is_finite()).then_some(p)
}

/// Split a projected line at undefined points and at jumps wider than
/// `max_jump`, pushing pieces of two or more points. A closed ring stays
/// closed only when nothing had to be cut.
fn push_pieces(
    out: &mut Vec<ContourLine>,
    level: f64,
    mut points: Vec<Option<(f64, f64)>>,
    closed: bool,
    max_jump: f64,
) {
    let breaks = |a: Option<(f64, f64)>, b: Option<(f64, f64)>| match (a, b) {
        (Some(p), Some(q)) => (q.0 - p.0).abs() > max_jump,
        _ => true,
    };

    if points.is_empty() {
        return;
    }
    let mut closed = closed;
    if closed {
        let intact = points.iter().all(Option::is_some)
            && points.windows(2).all(|w| !breaks(w[0], w[1]))
            && !breaks(points[points.len() - 1], points[0]);
        if intact {
            if points.len() >= 2 {
                out.push(ContourLine {
                    level,
                    points: points.into_iter().flatten().collect(),
                    closed: true,
                    color: Color::BLACK,
                });
            }
            return;
        }
        // Reopen the ring so the closing segment is tested like the others.
        if let Some(&first) = points.first() {
            points.push(first);
        }
        closed = false;
    }

    let mut current: Vec<(f64, f64)> = Vec::new();
    let mut previous: Option<(f64, f64)> = None;
    for p in points {
        if breaks(previous, p) && !current.is_empty() {
            if current.len() >= 2 {
                out.push(ContourLine {
                    level,
                    points: std::mem::take(&mut current),
                    closed,
                    color: Color::BLACK,
                });
            }
            current.clear();
        }
        if let Some(q) = p {
            current.push(q);
        }
        previous = p;
    }
    if current.len() >= 2 {
        out.push(ContourLine {
            level,
            points: current,
            closed,
            color: Color::BLACK,
        });
    }
}
