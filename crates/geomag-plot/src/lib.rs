//! Global geomagnetic field maps.
//!
//! The pipeline is three calls: build a [`CoordinateGrid`] with [`grid`],
//! evaluate a spherical-harmonic model on it with [`eval_model`], and draw
//! one of the resulting components with [`contours_north_south_moll`].
//!
//! ```no_run
//! use geomag_plot::{contours_north_south_moll, eval_model, grid, FieldComponent, RenderOptions};
//! use geomag_model::ModelReference;
//!
//! # fn main() -> geomag_common::GeomagResult<()> {
//! let coords = grid(180, 360, 0.0)?;
//! let time = geomag_common::parse_time("2020-01-01")?;
//! let field = eval_model(&time, &coords, &ModelReference::default())?;
//! let (fig, _axes) = contours_north_south_moll(
//!     &coords,
//!     &field.get(FieldComponent::F).view(),
//!     "nT",
//!     "Total intensity",
//!     &RenderOptions::default(),
//! )?;
//! fig.save_png("intensity.png")?;
//! # Ok(())
//! # }
//! ```

pub mod evaluate;
pub mod maps;

pub use evaluate::{eval_model, EvalRequest, FieldComponent, FieldResult};
pub use geomag_common::{grid, CoordinateGrid, GeomagError, GeomagResult};
pub use maps::{contours_north_south_moll, plot_contours};
pub use renderer::{AxesId, Figure, RenderConfig, RenderOptions, TransformMode};
