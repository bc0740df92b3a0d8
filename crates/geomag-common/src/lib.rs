//! Common types shared across the geomagnetic mapping crates.

pub mod error;
pub mod grid;
pub mod time;

pub use error::{GeomagError, GeomagResult};
pub use grid::{grid, CoordinateGrid, GridBuilder, HemisphereSplit};
pub use time::{
    datetime_to_decimal_year, datetime_to_mjd2000, decimal_year_to_mjd2000,
    mjd2000_to_decimal_year, parse_time,
};
