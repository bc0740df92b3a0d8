//! Figures: a fixed-size canvas holding map axes laid out on a grid.

use std::path::Path;

use tiny_skia::Pixmap;
use tracing::{debug, info};

use geomag_common::{GeomagError, GeomagResult};
use projection::ProjectionKind;

use crate::axes::Axes;
use crate::colormap::Color;
use crate::text::{self, Anchor};
use crate::png;

/// A rectangle in figure pixels, origin at the top left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Largest rectangle of the given width/height ratio centred in `self`.
    pub fn fit_aspect(&self, aspect: f64) -> PixelRect {
        if !(aspect.is_finite() && aspect > 0.0) {
            return *self;
        }
        if self.width / self.height > aspect {
            let width = self.height * aspect;
            PixelRect::new(self.x + (self.width - width) / 2.0, self.y, width, self.height)
        } else {
            let height = self.width / aspect;
            PixelRect::new(self.x, self.y + (self.height - height) / 2.0, self.width, height)
        }
    }
}

/// Grid of subplot cells in figure-fraction coordinates.
///
/// Margins and spacing follow the usual matplotlib conventions: `left`,
/// `right`, `bottom` and `top` are fractions of the figure, `wspace` and
/// `hspace` are fractions of the average cell width and height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub nrows: usize,
    pub ncols: usize,
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
    pub wspace: f64,
    pub hspace: f64,
}

impl GridSpec {
    /// A grid with default margins and the given spacing.
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            ncols,
            left: 0.125,
            right: 0.9,
            bottom: 0.11,
            top: 0.88,
            wspace: 0.2,
            hspace: 0.2,
        }
    }

    pub fn with_spacing(mut self, wspace: f64, hspace: f64) -> Self {
        self.wspace = wspace;
        self.hspace = hspace;
        self
    }

    fn validate(&self) -> GeomagResult<()> {
        if self.nrows == 0 || self.ncols == 0 {
            return Err(GeomagError::InvalidParameter {
                param: "gridspec".to_string(),
                message: format!("grid needs at least one cell, got {}x{}", self.nrows, self.ncols),
            });
        }
        if !(self.left < self.right && self.bottom < self.top) || self.wspace < 0.0 || self.hspace < 0.0 {
            return Err(GeomagError::InvalidParameter {
                param: "gridspec".to_string(),
                message: "margins must leave room for the cells and spacing must be non-negative".to_string(),
            });
        }
        Ok(())
    }

    /// Figure-fraction rectangle (left, bottom, right, top) of a cell span.
    /// Spans running past the grid are clipped to it.
    pub fn span_fraction(
        &self,
        (row, col): (usize, usize),
        rowspan: usize,
        colspan: usize,
    ) -> GeomagResult<(f64, f64, f64, f64)> {
        self.validate()?;
        if row >= self.nrows || col >= self.ncols || rowspan == 0 || colspan == 0 {
            return Err(GeomagError::InvalidParameter {
                param: "subplot".to_string(),
                message: format!(
                    "cell ({}, {}) span {}x{} is outside a {}x{} grid",
                    row, col, rowspan, colspan, self.nrows, self.ncols
                ),
            });
        }
        let last_row = (row + rowspan).min(self.nrows) - 1;
        let last_col = (col + colspan).min(self.ncols) - 1;

        let n = self.ncols as f64;
        let cell_w = (self.right - self.left) / (n + self.wspace * (n - 1.0));
        let sep_w = self.wspace * cell_w;
        let m = self.nrows as f64;
        let cell_h = (self.top - self.bottom) / (m + self.hspace * (m - 1.0));
        let sep_h = self.hspace * cell_h;

        let x0 = self.left + col as f64 * (cell_w + sep_w);
        let x1 = self.left + last_col as f64 * (cell_w + sep_w) + cell_w;
        let y1 = self.top - row as f64 * (cell_h + sep_h);
        let y0 = self.top - last_row as f64 * (cell_h + sep_h) - cell_h;
        Ok((x0, y0, x1, y1))
    }
}

/// Handle to an axes within its figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxesId(pub usize);

/// Suptitle font size used when none is given.
pub const SUPTITLE_FONT_SIZE: f32 = 15.0;

/// A figure with a suptitle and any number of map axes.
#[derive(Debug)]
pub struct Figure {
    width: u32,
    height: u32,
    background: Color,
    suptitle: Option<(String, f32)>,
    axes: Vec<Axes>,
}

impl Figure {
    /// Create an empty figure of `width` x `height` pixels.
    pub fn new(width: u32, height: u32) -> GeomagResult<Self> {
        if width == 0 || height == 0 {
            return Err(GeomagError::InvalidParameter {
                param: "figsize".to_string(),
                message: format!("figure must be non-empty, got {}x{} px", width, height),
            });
        }
        Ok(Self {
            width,
            height,
            background: Color::WHITE,
            suptitle: None,
            axes: Vec::new(),
        })
    }

    /// Create a figure sized in inches at `dpi` pixels per inch.
    pub fn from_inches(width: f64, height: f64, dpi: f64) -> GeomagResult<Self> {
        let px = |inches: f64| (inches * dpi).round();
        let (w, h) = (px(width), px(height));
        if !(w >= 1.0 && h >= 1.0 && w <= u32::MAX as f64 && h <= u32::MAX as f64) {
            return Err(GeomagError::InvalidParameter {
                param: "figsize".to_string(),
                message: format!("{}x{} in at {} dpi is not a drawable size", width, height, dpi),
            });
        }
        Self::new(w as u32, h as u32)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    /// Set the centred title drawn above all axes.
    pub fn suptitle(&mut self, text: impl Into<String>, font_size: f32) {
        self.suptitle = Some((text.into(), font_size));
    }

    pub fn title(&self) -> Option<&str> {
        self.suptitle.as_ref().map(|(text, _)| text.as_str())
    }

    /// Add map axes occupying a span of grid cells.
    pub fn subplot2grid(
        &mut self,
        spec: &GridSpec,
        loc: (usize, usize),
        rowspan: usize,
        colspan: usize,
        kind: ProjectionKind,
    ) -> GeomagResult<AxesId> {
        let (x0, y0, x1, y1) = spec.span_fraction(loc, rowspan, colspan)?;
        let (w, h) = (self.width as f64, self.height as f64);
        let cell = PixelRect::new(x0 * w, (1.0 - y1) * h, (x1 - x0) * w, (y1 - y0) * h);

        let id = AxesId(self.axes.len());
        let axes = Axes::new(cell, kind);
        debug!(axes = id.0, projection = axes.projection_name(), ?cell, "Added axes");
        self.axes.push(axes);
        Ok(id)
    }

    pub fn axes(&self, id: AxesId) -> GeomagResult<&Axes> {
        self.axes.get(id.0).ok_or_else(|| missing_axes(id))
    }

    pub fn axes_mut(&mut self, id: AxesId) -> GeomagResult<&mut Axes> {
        self.axes.get_mut(id.0).ok_or_else(|| missing_axes(id))
    }

    pub fn axes_ids(&self) -> impl Iterator<Item = AxesId> {
        (0..self.axes.len()).map(AxesId)
    }

    /// Rasterise the figure.
    pub fn render(&self) -> GeomagResult<Pixmap> {
        let mut pixmap = Pixmap::new(self.width, self.height).ok_or_else(|| {
            GeomagError::Render(format!("cannot allocate a {}x{} canvas", self.width, self.height))
        })?;
        pixmap.fill(self.background.to_skia());

        for axes in &self.axes {
            axes.draw(&mut pixmap)?;
        }

        if let Some((title, font_size)) = &self.suptitle {
            text::draw_text(
                &mut pixmap,
                title,
                self.width as f32 / 2.0,
                0.02 * self.height as f32,
                0.0,
                *font_size,
                Anchor::TopCenter,
                Color::BLACK,
                None,
            );
        }

        debug!(width = self.width, height = self.height, axes = self.axes.len(), "Rendered figure");
        Ok(pixmap)
    }

    /// Render and encode as PNG.
    pub fn to_png(&self) -> GeomagResult<Vec<u8>> {
        png::encode_pixmap(&self.render()?)
    }

    /// Render and write a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> GeomagResult<()> {
        let path = path.as_ref();
        let bytes = self.to_png()?;
        std::fs::write(path, &bytes)
            .map_err(|e| GeomagError::Io(format!("cannot write {}: {}", path.display(), e)))?;
        info!(path = %path.display(), bytes = bytes.len(), "Saved figure");
        Ok(())
    }
}

fn missing_axes(id: AxesId) -> GeomagError {
    GeomagError::InvalidParameter {
        param: "axes".to_string(),
        message: format!("figure has no axes {}", id.0),
    }
}
