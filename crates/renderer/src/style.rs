//! Contour rendering configuration.
//!
//! `RenderConfig` is the fully-resolved set of options a contour set is
//! drawn with. It loads from JSON like any other style file; callers
//! override individual fields at call time through `RenderOptions`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use geomag_common::{GeomagError, GeomagResult};

use crate::colormap::Colormap;
use crate::contour::{LevelSpec, MAX_LEVELS};
use crate::format::LabelFormat;

/// Resolved contour styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// printf-style label format with one conversion for the level value.
    pub label_format: String,
    /// Line width in pixels.
    pub line_width: f32,
    /// Label font size in pixels.
    pub font_size: f32,
    /// Whether to draw inline labels.
    pub labels: bool,
    /// Blank space left around each label along its line, in pixels.
    pub inline_spacing: f32,
    pub levels: LevelSpec,
    pub colormap: Colormap,
    /// Chaikin smoothing passes applied to each contour.
    pub smoothing_passes: u32,
    /// Clip polar panels to a circle.
    pub circular_boundary: bool,
    /// Draw meridians and parallels.
    pub graticule: bool,
    /// Graticule spacing in degrees (longitude, latitude).
    pub graticule_spacing: (f64, f64),
}

impl Default for RenderConfig {
    /// Single-panel defaults: bare `%g` labels at font size 6.
    fn default() -> Self {
        Self {
            label_format: "%g".to_string(),
            line_width: 2.0,
            font_size: 6.0,
            labels: true,
            inline_spacing: 5.0,
            levels: LevelSpec::default(),
            colormap: Colormap::default(),
            smoothing_passes: 0,
            circular_boundary: false,
            graticule: false,
            graticule_spacing: (60.0, 30.0),
        }
    }
}

impl RenderConfig {
    /// Defaults for the three-panel maps of a field in `units`: labels read
    /// `"<value> <units>"` at font size 10.
    pub fn for_units(units: &str) -> Self {
        let label_format = if units.is_empty() {
            "%g".to_string()
        } else {
            // A literal percent sign in the units must not start a conversion.
            format!("%g {}", units.replace('%', "%%"))
        };
        Self {
            label_format,
            font_size: 10.0,
            ..Self::default()
        }
    }

    /// Load configuration from a JSON string. Missing fields take defaults.
    pub fn from_json(json_str: &str) -> GeomagResult<Self> {
        let config: Self = serde_json::from_str(json_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> GeomagResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Parsed label format.
    pub fn parsed_format(&self) -> GeomagResult<LabelFormat> {
        LabelFormat::parse(&self.label_format)
    }

    /// Check that the configuration can be drawn.
    pub fn validate(&self) -> GeomagResult<()> {
        if !(self.line_width.is_finite() && self.line_width > 0.0) {
            return Err(GeomagError::Render(format!(
                "line width must be positive, got {}",
                self.line_width
            )));
        }
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(GeomagError::Render(format!(
                "font size must be positive, got {}",
                self.font_size
            )));
        }
        if !(self.inline_spacing.is_finite() && self.inline_spacing >= 0.0) {
            return Err(GeomagError::Render(format!(
                "inline spacing must be non-negative, got {}",
                self.inline_spacing
            )));
        }
        match &self.levels {
            LevelSpec::Auto { max_intervals } if *max_intervals == 0 => {
                return Err(GeomagError::Render("auto levels need at least one interval".to_string()))
            }
            LevelSpec::Auto { max_intervals } if *max_intervals > MAX_LEVELS => {
                return Err(GeomagError::Render(format!(
                    "auto levels allow at most {} intervals, got {}",
                    MAX_LEVELS, max_intervals
                )))
            }
            LevelSpec::Interval { interval } if !(interval.is_finite() && *interval > 0.0) => {
                return Err(GeomagError::Render(format!(
                    "contour interval must be positive, got {}",
                    interval
                )))
            }
            _ => {}
        }
        let (dlon, dlat) = self.graticule_spacing;
        if self.graticule && !(dlon > 0.0 && dlat > 0.0) {
            return Err(GeomagError::Render("graticule spacing must be positive".to_string()));
        }
        self.colormap.validate().map_err(GeomagError::Render)?;
        self.parsed_format()?;
        Ok(())
    }
}

/// Per-call overrides; unset fields keep the base configuration's value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub label_format: Option<String>,
    pub line_width: Option<f32>,
    pub font_size: Option<f32>,
    pub labels: Option<bool>,
    pub inline_spacing: Option<f32>,
    pub levels: Option<LevelSpec>,
    pub colormap: Option<Colormap>,
    pub smoothing_passes: Option<u32>,
    pub circular_boundary: Option<bool>,
    pub graticule: Option<bool>,
}

impl RenderOptions {
    /// Apply the overrides on top of `base`.
    pub fn apply(&self, base: &RenderConfig) -> RenderConfig {
        let mut config = base.clone();
        if let Some(ref fmt) = self.label_format {
            config.label_format = fmt.clone();
        }
        if let Some(v) = self.line_width {
            config.line_width = v;
        }
        if let Some(v) = self.font_size {
            config.font_size = v;
        }
        if let Some(v) = self.labels {
            config.labels = v;
        }
        if let Some(v) = self.inline_spacing {
            config.inline_spacing = v;
        }
        if let Some(ref v) = self.levels {
            config.levels = v.clone();
        }
        if let Some(ref v) = self.colormap {
            config.colormap = v.clone();
        }
        if let Some(v) = self.smoothing_passes {
            config.smoothing_passes = v;
        }
        if let Some(v) = self.circular_boundary {
            config.circular_boundary = v;
        }
        if let Some(v) = self.graticule {
            config.graticule = v;
        }
        config
    }
}
