//! Spherical-harmonic geomagnetic field models.
//!
//! Loads SHC coefficient files, interpolates coefficients in time and
//! evaluates the internal field on coordinate grids.

pub mod coefficients;
pub mod field;
pub mod legendre;
pub mod model;
pub mod reference;
pub mod shc;
pub mod wgs84;

pub use coefficients::{GaussCoefficients, Interpolation, TimeDependentCoefficients};
pub use field::{vincdecnorm, vincdecnorm_point};
pub use model::{CoordinateSystem, SphericalHarmonicModel, REFERENCE_RADIUS};
pub use reference::{load_model_shc, model_from_shc_text, BuiltinModel, ModelReference};
pub use shc::{parse_shc, ShcFile, ShcRow, MAX_DEGREE};
