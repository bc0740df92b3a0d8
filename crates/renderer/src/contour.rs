//! Contour line (isoline) extraction using the marching squares algorithm.
//!
//! Contours are traced in grid index space (x = column, y = row) and then
//! mapped onto arbitrary curvilinear coordinates, so the same code serves
//! lon/lat grids and grids that were projected before contouring.

use std::collections::HashMap;

use ndarray::ArrayView2;
use rayon::prelude::*;

use geomag_common::{GeomagError, GeomagResult};

/// A point in 2D space (grid index space or map coordinates)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Identifies a grid edge crossed by a contour. Horizontal edges join
/// (row, col) to (row, col + 1); vertical edges join (row, col) to
/// (row + 1, col).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKey {
    Horizontal { row: usize, col: usize },
    Vertical { row: usize, col: usize },
}

/// A line segment between two cell edges
#[derive(Debug, Clone)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
    pub start_edge: EdgeKey,
    pub end_edge: EdgeKey,
}

/// A complete contour line (polyline)
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub level: f64,
    pub points: Vec<Point>,
    /// Closed rings do not repeat their first point.
    pub closed: bool,
}

/// Upper bound on the number of levels a `LevelSpec` may resolve to.
pub const MAX_LEVELS: usize = 1000;

/// How contour levels are chosen.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum LevelSpec {
    /// "Nice" levels with at most `max_intervals` steps across the data range.
    Auto { max_intervals: usize },
    /// Multiples of `interval` inside the data range.
    Interval { interval: f64 },
    /// Exactly these levels.
    Explicit { levels: Vec<f64> },
}

impl Default for LevelSpec {
    fn default() -> Self {
        LevelSpec::Auto { max_intervals: 7 }
    }
}

impl LevelSpec {
    /// Resolve to concrete levels for data spanning `min..=max`.
    ///
    /// More than [`MAX_LEVELS`] levels is a render error.
    pub fn resolve(&self, min: f64, max: f64) -> GeomagResult<Vec<f64>> {
        let levels = match self {
            LevelSpec::Auto { max_intervals } => nice_levels(min, max, *max_intervals),
            LevelSpec::Interval { interval } => {
                let count = interval_level_count(min, max, *interval);
                if count > MAX_LEVELS as f64 {
                    return Err(GeomagError::Render(format!(
                        "contour interval {} gives {:.0} levels over {}..{} (at most {})",
                        interval, count, min, max, MAX_LEVELS
                    )));
                }
                generate_contour_levels(min, max, *interval)
            }
            LevelSpec::Explicit { levels } => {
                let mut levels: Vec<f64> = levels.iter().copied().filter(|l| l.is_finite()).collect();
                levels.sort_by(|a, b| a.total_cmp(b));
                levels.dedup();
                levels
            }
        };
        if levels.len() > MAX_LEVELS {
            return Err(GeomagError::Render(format!(
                "{} contour levels requested (at most {})",
                levels.len(),
                MAX_LEVELS
            )));
        }
        Ok(levels)
    }
}

/// Number of multiples of `interval` inside `min..=max`, as a float so huge
/// counts do not overflow.
fn interval_level_count(min_value: f64, max_value: f64, interval: f64) -> f64 {
    if !(interval > 0.0) || !(max_value > min_value) {
        return 0.0;
    }
    (max_value / interval).floor() - (min_value / interval).ceil() + 1.0
}

/// Generate contour levels at multiples of `interval` within the data range.
///
/// Returns nothing when the range holds more than [`MAX_LEVELS`] multiples.
pub fn generate_contour_levels(min_value: f64, max_value: f64, interval: f64) -> Vec<f64> {
    let count = interval_level_count(min_value, max_value, interval);
    if !(count >= 1.0) || count > MAX_LEVELS as f64 {
        return vec![];
    }

    // Start from first multiple of interval at or above min_value
    let first = (min_value / interval).ceil() as i64;
    let last = (max_value / interval).floor() as i64;
    (first..=last).map(|k| k as f64 * interval).collect()
}

/// Choose round-numbered levels covering the data range with at most
/// `max_intervals` steps (clamped to [`MAX_LEVELS`]). Only levels strictly
/// inside the range are kept, since a line at the extreme value of the data
/// is degenerate.
pub fn nice_levels(min_value: f64, max_value: f64, max_intervals: usize) -> Vec<f64> {
    if !min_value.is_finite() || !max_value.is_finite() || max_value <= min_value {
        return vec![];
    }
    let max_intervals = max_intervals.clamp(1, MAX_LEVELS - 1) + 1;
    let span = max_value - min_value;
    let raw_step = span / max_intervals as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());

    // Smallest round step at least as large as the raw step.
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|&candidate| candidate >= raw_step * (1.0 - 1e-12))
        .unwrap_or(10.0 * magnitude);

    let first = (min_value / step).floor() as i64;
    let last = (max_value / step).ceil() as i64;
    (first..=last)
        .map(|k| k as f64 * step)
        // Snap values like 0.30000000000000004 onto the decimal grid.
        .map(|v| (v / step).round() * step)
        .filter(|&v| v > min_value && v < max_value)
        .collect()
}

/// Marching squares algorithm to generate contour segments.
///
/// Cells touching a NaN value are skipped.
pub fn march_squares(data: &ArrayView2<'_, f64>, level: f64) -> Vec<Segment> {
    let (height, width) = data.dim();
    if width < 2 || height < 2 {
        return vec![];
    }

    let mut segments = Vec::new();

    for y in 0..(height - 1) {
        for x in 0..(width - 1) {
            let tl = data[[y, x]];
            let tr = data[[y, x + 1]];
            let bl = data[[y + 1, x]];
            let br = data[[y + 1, x + 1]];

            if tl.is_nan() || tr.is_nan() || bl.is_nan() || br.is_nan() {
                continue;
            }

            // Cell index (0-15) from the corners at or above the level
            let mut cell_index = 0u8;
            if tl >= level {
                cell_index |= 1;
            }
            if tr >= level {
                cell_index |= 2;
            }
            if br >= level {
                cell_index |= 4;
            }
            if bl >= level {
                cell_index |= 8;
            }

            get_cell_segments(cell_index, x, y, [tl, tr, br, bl], level, &mut segments);
        }
    }

    segments
}

/// Append the segments of one marching squares cell.
///
/// Saddle cells are resolved with the cell-centre average.
fn get_cell_segments(
    cell_index: u8,
    x: usize,
    y: usize,
    corners: [f64; 4],
    level: f64,
    out: &mut Vec<Segment>,
) {
    if cell_index == 0 || cell_index == 15 {
        return;
    }
    let [tl, tr, br, bl] = corners;
    let (xf, yf) = (x as f64, y as f64);

    let top = (
        interpolate_edge(xf, yf, xf + 1.0, yf, tl, tr, level),
        EdgeKey::Horizontal { row: y, col: x },
    );
    let bottom = (
        interpolate_edge(xf, yf + 1.0, xf + 1.0, yf + 1.0, bl, br, level),
        EdgeKey::Horizontal { row: y + 1, col: x },
    );
    let left = (
        interpolate_edge(xf, yf, xf, yf + 1.0, tl, bl, level),
        EdgeKey::Vertical { row: y, col: x },
    );
    let right = (
        interpolate_edge(xf + 1.0, yf, xf + 1.0, yf + 1.0, tr, br, level),
        EdgeKey::Vertical { row: y, col: x + 1 },
    );

    let mut push = |a: (Point, EdgeKey), b: (Point, EdgeKey)| {
        out.push(Segment {
            start: a.0,
            end: b.0,
            start_edge: a.1,
            end_edge: b.1,
        });
    };

    let centre_high = (tl + tr + br + bl) / 4.0 >= level;

    match cell_index {
        1 | 14 => push(left, top),
        2 | 13 => push(top, right),
        3 | 12 => push(left, right),
        4 | 11 => push(right, bottom),
        6 | 9 => push(top, bottom),
        7 | 8 => push(left, bottom),
        // tl and br high
        5 => {
            if centre_high {
                push(left, bottom);
                push(top, right);
            } else {
                push(left, top);
                push(right, bottom);
            }
        }
        // tr and bl high
        10 => {
            if centre_high {
                push(left, top);
                push(right, bottom);
            } else {
                push(top, right);
                push(left, bottom);
            }
        }
        _ => {}
    }
}

/// Linearly interpolate between two edge points based on data values
fn interpolate_edge(x1: f64, y1: f64, x2: f64, y2: f64, val1: f64, val2: f64, level: f64) -> Point {
    if (val2 - val1).abs() < f64::EPSILON {
        return Point::new((x1 + x2) / 2.0, (y1 + y2) / 2.0);
    }

    let t = ((level - val1) / (val2 - val1)).clamp(0.0, 1.0);
    Point::new(x1 + t * (x2 - x1), y1 + t * (y2 - y1))
}

/// Connect line segments into continuous polylines.
///
/// Neighbouring cells share the edge a contour crosses, so segments are
/// joined through a map from edge to the (at most two) segments touching it.
pub fn connect_segments(segments: &[Segment], level: f64) -> Vec<Contour> {
    if segments.is_empty() {
        return vec![];
    }

    let mut by_edge: HashMap<EdgeKey, Vec<usize>> = HashMap::with_capacity(segments.len() * 2);
    for (i, seg) in segments.iter().enumerate() {
        by_edge.entry(seg.start_edge).or_default().push(i);
        by_edge.entry(seg.end_edge).or_default().push(i);
    }

    let mut used = vec![false; segments.len()];
    let mut contours = Vec::new();

    // Follow unused segments from `edge`, appending points via `push`.
    let walk = |mut edge: EdgeKey,
                stop: EdgeKey,
                used: &mut Vec<bool>,
                points: &mut Vec<Point>|
     -> bool {
        loop {
            let next = by_edge
                .get(&edge)
                .and_then(|ids| ids.iter().copied().find(|&id| !used[id]));
            let Some(id) = next else {
                return false;
            };
            used[id] = true;
            let seg = &segments[id];
            let (point, far_edge) = if seg.start_edge == edge {
                (seg.end, seg.end_edge)
            } else {
                (seg.start, seg.start_edge)
            };
            if far_edge == stop {
                return true;
            }
            points.push(point);
            edge = far_edge;
        }
    };

    for start_idx in 0..segments.len() {
        if used[start_idx] {
            continue;
        }
        used[start_idx] = true;
        let seg = &segments[start_idx];

        let mut forward = vec![seg.start, seg.end];
        let closed = walk(seg.end_edge, seg.start_edge, &mut used, &mut forward);

        let points = if closed {
            forward
        } else {
            let mut backward = Vec::new();
            walk(seg.start_edge, seg.end_edge, &mut used, &mut backward);
            backward.reverse();
            backward.extend(forward);
            backward
        };

        if points.len() >= 2 {
            contours.push(Contour {
                level,
                points,
                closed,
            });
        }
    }

    contours
}

/// Apply Chaikin's corner cutting algorithm for smoothing
pub fn smooth_contour(contour: &Contour, iterations: u32) -> Contour {
    if iterations == 0 || contour.points.len() < 3 {
        return contour.clone();
    }

    let mut points = contour.points.clone();

    for _ in 0..iterations {
        let n = points.len();
        let segment_count = if contour.closed { n } else { n - 1 };
        let mut new_points = Vec::with_capacity(segment_count * 2 + 2);

        if !contour.closed {
            new_points.push(points[0]);
        }
        for i in 0..segment_count {
            let p1 = points[i];
            let p2 = points[(i + 1) % n];
            new_points.push(Point::new(0.75 * p1.x + 0.25 * p2.x, 0.75 * p1.y + 0.25 * p2.y));
            new_points.push(Point::new(0.25 * p1.x + 0.75 * p2.x, 0.25 * p1.y + 0.75 * p2.y));
        }
        if !contour.closed {
            new_points.push(points[n - 1]);
        }

        points = new_points;
    }

    Contour {
        level: contour.level,
        points,
        closed: contour.closed,
    }
}

/// Generate all contours for the given levels in grid index space.
pub fn generate_all_contours(data: &ArrayView2<'_, f64>, levels: &[f64], smoothing_passes: u32) -> Vec<Contour> {
    levels
        .par_iter()
        .flat_map(|&level| {
            let segments = march_squares(data, level);
            connect_segments(&segments, level)
                .into_iter()
                .map(|c| smooth_contour(&c, smoothing_passes))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Map an index-space point onto curvilinear coordinates by bilinear
/// interpolation of the coordinate arrays.
pub fn index_to_coordinates(point: &Point, xs: &ArrayView2<'_, f64>, ys: &ArrayView2<'_, f64>) -> (f64, f64) {
    let (rows, cols) = xs.dim();
    let col0 = (point.x.floor().max(0.0) as usize).min(cols.saturating_sub(2));
    let row0 = (point.y.floor().max(0.0) as usize).min(rows.saturating_sub(2));
    let col1 = (col0 + 1).min(cols - 1);
    let row1 = (row0 + 1).min(rows - 1);
    let fx = (point.x - col0 as f64).clamp(0.0, 1.0);
    let fy = (point.y - row0 as f64).clamp(0.0, 1.0);

    // Zero-weight corners are skipped so a NaN neighbour cannot leak into
    // a point lying on a valid edge.
    let mix = |a: f64, b: f64, t: f64| {
        if t <= 0.0 {
            a
        } else if t >= 1.0 {
            b
        } else {
            a * (1.0 - t) + b * t
        }
    };
    let lerp = |a: &ArrayView2<'_, f64>| {
        let top = mix(a[[row0, col0]], a[[row0, col1]], fx);
        let bottom = mix(a[[row1, col0]], a[[row1, col1]], fx);
        mix(top, bottom, fy)
    };
    (lerp(xs), lerp(ys))
}

/// Contour `values` whose sample positions are given by the curvilinear
/// coordinate arrays `xs`, `ys`. Returned points are in those coordinates.
pub fn contour_grid(
    xs: &ArrayView2<'_, f64>,
    ys: &ArrayView2<'_, f64>,
    values: &ArrayView2<'_, f64>,
    levels: &[f64],
    smoothing_passes: u32,
) -> GeomagResult<Vec<Contour>> {
    if xs.dim() != values.dim() || ys.dim() != values.dim() {
        return Err(GeomagError::Render(format!(
            "coordinate shapes {:?} and {:?} do not match data shape {:?}",
            xs.dim(),
            ys.dim(),
            values.dim()
        )));
    }

    let contours = generate_all_contours(values, levels, smoothing_passes)
        .into_iter()
        .map(|c| Contour {
            level: c.level,
            points: c
                .points
                .iter()
                .map(|p| {
                    let (x, y) = index_to_coordinates(p, xs, ys);
                    Point::new(x, y)
                })
                .collect(),
            closed: c.closed,
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        num_levels = levels.len(),
        num_contours = contours.len(),
        total_points = contours.iter().map(|c| c.points.len()).sum::<usize>(),
        "Generated contours"
    );

    Ok(contours)
}

/// Finite minimum and maximum of the data, if any value is finite.
pub fn data_range(values: &ArrayView2<'_, f64>) -> Option<(f64, f64)> {
    values
        .iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
