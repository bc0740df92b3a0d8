//! Derived field quantities: inclination, declination and intensity.

use ndarray::{Array2, ArrayView3, Axis};

use geomag_common::{GeomagError, GeomagResult};

/// Inclination, declination (degrees) and intensity (nT) of a single
/// north/east/up vector.
///
/// Inclination is positive when the field points down; declination is
/// measured from north towards east.
pub fn vincdecnorm_point(north: f64, east: f64, up: f64) -> (f64, f64, f64) {
    let horizontal = north.hypot(east);
    let inclination = (-up).atan2(horizontal).to_degrees();
    let declination = east.atan2(north).to_degrees();
    let intensity = horizontal.hypot(up);
    (inclination, declination, intensity)
}

/// Derived quantities for an array of NEU vectors with shape `(rows, cols, 3)`.
pub fn vincdecnorm(neu: &ArrayView3<'_, f64>) -> GeomagResult<(Array2<f64>, Array2<f64>, Array2<f64>)> {
    let (rows, cols, components) = neu.dim();
    if components != 3 {
        return Err(GeomagError::Evaluation(format!(
            "expected 3 vector components, found {}",
            components
        )));
    }

    let mut inclination = Array2::<f64>::zeros((rows, cols));
    let mut declination = Array2::<f64>::zeros((rows, cols));
    let mut intensity = Array2::<f64>::zeros((rows, cols));

    for (i, row) in neu.axis_iter(Axis(0)).enumerate() {
        for (j, v) in row.axis_iter(Axis(0)).enumerate() {
            let (inc, dec, f) = vincdecnorm_point(v[0], v[1], v[2]);
            inclination[[i, j]] = inc;
            declination[[i, j]] = dec;
            intensity[[i, j]] = f;
        }
    }

    Ok((inclination, declination, intensity))
}
