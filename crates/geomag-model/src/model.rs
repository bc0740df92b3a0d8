//! Spherical-harmonic internal field model evaluation.
//!
//! The magnetic potential of internal sources is
//!
//! ```text
//! V = a Σ_n (a/r)^(n+1) Σ_m (g_n^m cos mλ + h_n^m sin mλ) P_n^m(cos θ)
//! ```
//!
//! and the field is `B = -∇V`. Components are first computed in the
//! geocentric spherical frame and then rotated into the requested output
//! frame.

use nalgebra::Vector3;
use ndarray::Array3;
use rayon::prelude::*;
use tracing::debug;

use geomag_common::grid::{HEIGHT, LAT, LON};
use geomag_common::{mjd2000_to_decimal_year, CoordinateGrid, GeomagError, GeomagResult};

use crate::coefficients::{GaussCoefficients, TimeDependentCoefficients};
use crate::legendre::{LegendreTable, SchmidtFactors};
use crate::wgs84::{geodetic_to_geocentric, rotate_neu, GeocentricPoint};

/// Reference radius of geomagnetic models (km).
pub const REFERENCE_RADIUS: f64 = 6371.2;

/// Lowest accepted height above the ellipsoid (km).
pub const MIN_HEIGHT_KM: f64 = -100.0;
/// Highest accepted height above the ellipsoid (km).
pub const MAX_HEIGHT_KM: f64 = 100_000.0;

/// Smallest colatitude used in place of an exact pole, where the east
/// component's 1/sin θ factor would otherwise be undefined.
const POLE_EPSILON: f64 = 1e-10;

/// Interpretation of the coordinate triplets, and the frame of the output
/// vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinateSystem {
    /// (geodetic latitude, longitude, height above WGS84 in km); vectors in
    /// the local geodetic north/east/up frame.
    #[default]
    GeodeticAboveWgs84,
    /// (geocentric latitude, longitude, radius in km); vectors in the
    /// geocentric north/east/up frame.
    GeocentricSpherical,
}

/// A loaded spherical-harmonic model.
#[derive(Debug, Clone)]
pub struct SphericalHarmonicModel {
    pub name: String,
    coefficients: TimeDependentCoefficients,
    schmidt: SchmidtFactors,
}

impl SphericalHarmonicModel {
    pub fn new(name: impl Into<String>, coefficients: TimeDependentCoefficients) -> Self {
        let schmidt = SchmidtFactors::new(coefficients.max_degree);
        Self {
            name: name.into(),
            coefficients,
            schmidt,
        }
    }

    pub fn max_degree(&self) -> usize {
        self.coefficients.max_degree
    }

    /// Validity interval in decimal years.
    pub fn validity(&self) -> (f64, f64) {
        self.coefficients.validity()
    }

    /// Coefficients at an MJD2000 time.
    pub fn coefficients_at(&self, mjd2000: f64) -> GeomagResult<GaussCoefficients> {
        let decimal_year = mjd2000_to_decimal_year(mjd2000)
            .map_err(|e| GeomagError::Evaluation(e.to_string()))?;
        self.coefficients.at(decimal_year)
    }

    /// Evaluate the field over a coordinate grid.
    ///
    /// Returns an array of shape `(rows, cols, 3)` holding north, east and up
    /// components in nT, in the frame given by `output`.
    pub fn eval(
        &self,
        mjd2000: f64,
        coords: &CoordinateGrid,
        input: CoordinateSystem,
        output: CoordinateSystem,
    ) -> GeomagResult<Array3<f64>> {
        let coefficients = self.coefficients_at(mjd2000)?;
        let (rows, cols) = coords.dims();
        let array = coords.as_array();

        validate_coordinates(coords, input)?;

        let row_results: Vec<Vec<Vector3<f64>>> = (0..rows)
            .into_par_iter()
            .map(|i| {
                (0..cols)
                    .map(|j| {
                        self.field_at(
                            &coefficients,
                            array[[i, j, LAT]],
                            array[[i, j, LON]],
                            array[[i, j, HEIGHT]],
                            input,
                            output,
                        )
                    })
                    .collect()
            })
            .collect();

        let mut result = Array3::<f64>::zeros((rows, cols, 3));
        for (i, row) in row_results.iter().enumerate() {
            for (j, v) in row.iter().enumerate() {
                result[[i, j, 0]] = v.x;
                result[[i, j, 1]] = v.y;
                result[[i, j, 2]] = v.z;
            }
        }

        debug!(
            model = %self.name,
            mjd2000 = mjd2000,
            rows = rows,
            cols = cols,
            max_degree = self.max_degree(),
            "evaluated field model"
        );

        Ok(result)
    }

    /// Evaluate the field at a single point.
    pub fn eval_point(
        &self,
        mjd2000: f64,
        lat: f64,
        lon: f64,
        height_or_radius: f64,
        input: CoordinateSystem,
        output: CoordinateSystem,
    ) -> GeomagResult<Vector3<f64>> {
        let coefficients = self.coefficients_at(mjd2000)?;
        check_point(lat, lon, height_or_radius, input)
            .map_err(GeomagError::Evaluation)?;
        Ok(self.field_at(&coefficients, lat, lon, height_or_radius, input, output))
    }

    fn field_at(
        &self,
        coefficients: &GaussCoefficients,
        lat: f64,
        lon: f64,
        height_or_radius: f64,
        input: CoordinateSystem,
        output: CoordinateSystem,
    ) -> Vector3<f64> {
        let (geodetic_lat, geocentric) = match input {
            CoordinateSystem::GeodeticAboveWgs84 => {
                (Some(lat), geodetic_to_geocentric(lat, lon, height_or_radius))
            }
            CoordinateSystem::GeocentricSpherical => (
                None,
                GeocentricPoint {
                    latitude: lat,
                    longitude: lon,
                    radius: height_or_radius,
                },
            ),
        };

        let neu = self.synthesise(coefficients, &geocentric);

        match output {
            CoordinateSystem::GeocentricSpherical => neu,
            CoordinateSystem::GeodeticAboveWgs84 => {
                let geodetic = match geodetic_lat {
                    Some(lat) => lat,
                    None => geocentric_to_geodetic_latitude(&geocentric),
                };
                rotate_neu(&neu, geodetic - geocentric.latitude)
            }
        }
    }

    /// Field in the geocentric north/east/up frame.
    fn synthesise(
        &self,
        coefficients: &GaussCoefficients,
        point: &GeocentricPoint,
    ) -> Vector3<f64> {
        let mut colatitude = (90.0 - point.latitude).to_radians();
        if colatitude < POLE_EPSILON {
            colatitude = POLE_EPSILON;
        } else if colatitude > std::f64::consts::PI - POLE_EPSILON {
            colatitude = std::f64::consts::PI - POLE_EPSILON;
        }
        let sin_theta = colatitude.sin();
        let lambda = point.longitude.to_radians();
        let legendre = LegendreTable::compute(&self.schmidt, colatitude);
        let ratio = REFERENCE_RADIUS / point.radius;

        let mut b_r = 0.0;
        let mut b_theta = 0.0;
        let mut b_phi = 0.0;
        let mut ratio_pow = ratio * ratio;

        for n in 1..=coefficients.max_degree {
            ratio_pow *= ratio;
            let nf = n as f64;
            for m in 0..=n {
                let (sin_m, cos_m) = (m as f64 * lambda).sin_cos();
                let g = coefficients.g(n, m);
                let h = coefficients.h(n, m);
                let t = g * cos_m + h * sin_m;
                b_r += (nf + 1.0) * ratio_pow * t * legendre.p(n, m);
                b_theta -= ratio_pow * t * legendre.dp(n, m);
                b_phi += ratio_pow * m as f64 * (g * sin_m - h * cos_m) * legendre.p(n, m);
            }
        }
        b_phi /= sin_theta;

        Vector3::new(-b_theta, b_phi, b_r)
    }
}

/// Geodetic latitude of a geocentric position (Bowring's method, one
/// iteration is sub-millimetre for near-Earth radii).
fn geocentric_to_geodetic_latitude(point: &GeocentricPoint) -> f64 {
    use crate::wgs84::{ECCENTRICITY_SQUARED, SEMI_MAJOR_AXIS};
    let (sin_lat, cos_lat) = point.latitude.to_radians().sin_cos();
    let z = point.radius * sin_lat;
    let p = point.radius * cos_lat;
    let b = SEMI_MAJOR_AXIS * (1.0 - ECCENTRICITY_SQUARED).sqrt();
    let ep2 = ECCENTRICITY_SQUARED / (1.0 - ECCENTRICITY_SQUARED);
    let beta = (SEMI_MAJOR_AXIS * z).atan2(b * p);
    let (sb, cb) = beta.sin_cos();
    (z + ep2 * b * sb.powi(3))
        .atan2(p - ECCENTRICITY_SQUARED * SEMI_MAJOR_AXIS * cb.powi(3))
        .to_degrees()
}

fn check_point(lat: f64, lon: f64, third: f64, input: CoordinateSystem) -> Result<(), String> {
    if !lat.is_finite() || !lon.is_finite() || !third.is_finite() {
        return Err(format!("non-finite coordinate ({}, {}, {})", lat, lon, third));
    }
    if lat.abs() > 90.0 {
        return Err(format!("latitude {} outside [-90, 90]", lat));
    }
    match input {
        CoordinateSystem::GeodeticAboveWgs84 => {
            if !(MIN_HEIGHT_KM..=MAX_HEIGHT_KM).contains(&third) {
                return Err(format!(
                    "height {} km outside [{}, {}] km",
                    third, MIN_HEIGHT_KM, MAX_HEIGHT_KM
                ));
            }
        }
        CoordinateSystem::GeocentricSpherical => {
            let min_radius = REFERENCE_RADIUS + MIN_HEIGHT_KM - 30.0;
            if third < min_radius || third > REFERENCE_RADIUS + MAX_HEIGHT_KM {
                return Err(format!("radius {} km outside the model domain", third));
            }
        }
    }
    Ok(())
}

fn validate_coordinates(coords: &CoordinateGrid, input: CoordinateSystem) -> GeomagResult<()> {
    let array = coords.as_array();
    let (rows, cols) = coords.dims();
    for i in 0..rows {
        for j in 0..cols {
            check_point(array[[i, j, LAT]], array[[i, j, LON]], array[[i, j, HEIGHT]], input)
                .map_err(|reason| {
                    GeomagError::Evaluation(format!("grid point ({}, {}): {}", i, j, reason))
                })?;
        }
    }
    Ok(())
}
