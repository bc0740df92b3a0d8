//! Contour map rendering for gridded geophysical fields.
//!
//! Provides:
//! - Contour lines (marching squares) with automatic or explicit levels
//! - Inline labels in printf-style formats
//! - Figures with projected map axes laid out on a grid
//! - PNG output

pub mod axes;
pub mod colormap;
pub mod contour;
pub mod figure;
pub mod format;
pub mod labels;
pub mod png;
pub mod style;
pub mod text;

pub use axes::{Axes, ContourLine, ContourSet, TransformMode};
pub use colormap::{Color, Colormap};
pub use contour::{Contour, LevelSpec, Point};
pub use figure::{AxesId, Figure, GridSpec, PixelRect, SUPTITLE_FONT_SIZE};
pub use format::LabelFormat;
pub use style::{RenderConfig, RenderOptions};
