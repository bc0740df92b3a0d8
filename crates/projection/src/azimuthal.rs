//! Azimuthal equidistant projection.
//!
//! Distances and directions from the projection centre are true. Centred on a
//! pole, parallels become concentric circles spaced proportionally to their
//! angular distance from the pole, which makes it the usual choice for polar
//! views of geophysical fields.
//!
//! Forward equations (spherical form):
//! - cos c = sin φ1 sin φ + cos φ1 cos φ cos(λ - λ0)
//! - k = c / sin c
//! - x = R k cos φ sin(λ - λ0)
//! - y = R k (cos φ1 sin φ - sin φ1 cos φ cos(λ - λ0))

use std::f64::consts::{FRAC_PI_2, PI};

use crate::transform::{wrap_longitude, MapProjection, ProjectionParams, EARTH_RADIUS};

/// Angular distance from the antipode below which points are not projected.
const ANTIPODE_TOLERANCE: f64 = 1e-9;

/// Azimuthal equidistant projection parameters.
#[derive(Debug, Clone)]
pub struct AzimuthalEquidistant {
    /// Central meridian in degrees
    pub central_longitude: f64,
    /// Latitude of the projection centre in degrees
    pub central_latitude: f64,
    /// False easting (metres)
    pub false_easting: f64,
    /// False northing (metres)
    pub false_northing: f64,
    /// Sphere radius (metres)
    pub radius: f64,
    sin_lat0: f64,
    cos_lat0: f64,
}

impl AzimuthalEquidistant {
    pub fn new(params: ProjectionParams) -> Self {
        let lat0 = params.central_latitude.to_radians();
        Self {
            central_longitude: params.central_longitude,
            central_latitude: params.central_latitude,
            false_easting: params.false_easting,
            false_northing: params.false_northing,
            radius: EARTH_RADIUS,
            sin_lat0: lat0.sin(),
            cos_lat0: lat0.cos(),
        }
    }

    /// Centred on the north pole with meridian 0 pointing down.
    pub fn north_polar() -> Self {
        Self::new(ProjectionParams {
            central_latitude: 90.0,
            ..ProjectionParams::default()
        })
    }

    /// Centred on the south pole with meridian 0 pointing up.
    pub fn south_polar() -> Self {
        Self::new(ProjectionParams {
            central_latitude: -90.0,
            ..ProjectionParams::default()
        })
    }

    fn is_north_polar(&self) -> bool {
        self.central_latitude >= 90.0
    }

    fn is_south_polar(&self) -> bool {
        self.central_latitude <= -90.0
    }
}

impl MapProjection for AzimuthalEquidistant {
    fn name(&self) -> &'static str {
        "AzimuthalEquidistant"
    }

    fn project(&self, lon_deg: f64, lat_deg: f64) -> Option<(f64, f64)> {
        if !lon_deg.is_finite() || !lat_deg.is_finite() || lat_deg.abs() > 90.0 {
            return None;
        }
        let dlon = wrap_longitude(lon_deg - self.central_longitude).to_radians();
        let lat = lat_deg.to_radians();

        // Polar aspects use the exact radial form.
        let (x, y) = if self.is_north_polar() {
            let rho = self.radius * (FRAC_PI_2 - lat);
            if FRAC_PI_2 - lat > PI - ANTIPODE_TOLERANCE {
                return None;
            }
            (rho * dlon.sin(), -rho * dlon.cos())
        } else if self.is_south_polar() {
            let rho = self.radius * (FRAC_PI_2 + lat);
            if FRAC_PI_2 + lat > PI - ANTIPODE_TOLERANCE {
                return None;
            }
            (rho * dlon.sin(), rho * dlon.cos())
        } else {
            let cos_c = (self.sin_lat0 * lat.sin() + self.cos_lat0 * lat.cos() * dlon.cos())
                .clamp(-1.0, 1.0);
            let c = cos_c.acos();
            if c > PI - ANTIPODE_TOLERANCE {
                return None;
            }
            let k = if c.abs() < 1e-12 { 1.0 } else { c / c.sin() };
            (
                self.radius * k * lat.cos() * dlon.sin(),
                self.radius * k * (self.cos_lat0 * lat.sin() - self.sin_lat0 * lat.cos() * dlon.cos()),
            )
        };

        Some((x + self.false_easting, y + self.false_northing))
    }

    fn boundary(&self) -> Vec<(f64, f64)> {
        // The antipode maps onto a circle of radius pi * R.
        let r = PI * self.radius;
        (0..=360)
            .map(|k| {
                let t = (k as f64).to_radians();
                (
                    self.false_easting + r * t.cos(),
                    self.false_northing + r * t.sin(),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_north_pole_maps_to_origin() {
        let proj = AzimuthalEquidistant::north_polar();
        let (x, y) = proj.project(123.0, 90.0).unwrap();
        assert!(x.abs() < 1e-6 && y.abs() < 1e-6);
    }

    #[test]
    fn test_north_polar_distances_are_true() {
        let proj = AzimuthalEquidistant::north_polar();
        let (x, y) = proj.project(0.0, 40.0).unwrap();
        let expected = EARTH_RADIUS * 50f64.to_radians();
        assert!(x.abs() < 1e-6);
        assert!((y + expected).abs() < 1e-6, "y = {}", y);

        let (x, y) = proj.project(90.0, 40.0).unwrap();
        assert!((x - expected).abs() < 1e-6);
        assert!(y.abs() < 1e-6);
    }

    #[test]
    fn test_south_polar_orientation() {
        let proj = AzimuthalEquidistant::south_polar();
        let (x, y) = proj.project(0.0, -40.0).unwrap();
        assert!(x.abs() < 1e-6);
        assert!((y - EARTH_RADIUS * 50f64.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn test_antipode_is_undefined() {
        let proj = AzimuthalEquidistant::north_polar();
        assert!(proj.project(0.0, -90.0).is_none());

        let oblique = AzimuthalEquidistant::new(ProjectionParams {
            central_longitude: 10.0,
            central_latitude: 20.0,
            ..ProjectionParams::default()
        });
        assert!(oblique.project(-170.0, -20.0).is_none());
    }

    #[test]
    fn test_oblique_matches_polar_form_near_pole() {
        let polar = AzimuthalEquidistant::north_polar();
        let oblique = AzimuthalEquidistant::new(ProjectionParams {
            central_latitude: 89.999_999_9,
            ..ProjectionParams::default()
        });
        let (x1, y1) = polar.project(45.0, 60.0).unwrap();
        let (x2, y2) = oblique.project(45.0, 60.0).unwrap();
        assert!((x1 - x2).abs() < 1.0 && (y1 - y2).abs() < 1.0);
    }

    #[test]
    fn test_false_offsets() {
        let proj = AzimuthalEquidistant::new(ProjectionParams {
            central_latitude: 90.0,
            false_easting: 1000.0,
            false_northing: -500.0,
            ..ProjectionParams::default()
        });
        let (x, y) = proj.project(0.0, 90.0).unwrap();
        assert!((x - 1000.0).abs() < 1e-6);
        assert!((y + 500.0).abs() < 1e-6);
    }
}
