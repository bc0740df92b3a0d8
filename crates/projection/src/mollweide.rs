//! Mollweide equal-area projection.
//!
//! The globe maps onto a 2:1 ellipse. The auxiliary angle θ solves
//! `2θ + sin 2θ = π sin φ`, after which
//! - x = R (2√2 / π) (λ - λ0) cos θ
//! - y = R √2 sin θ

use std::f64::consts::{FRAC_PI_2, PI, SQRT_2};

use crate::transform::{wrap_longitude, Extent, MapProjection, ProjectionParams, EARTH_RADIUS};

const MAX_ITERATIONS: usize = 50;
const TOLERANCE: f64 = 1e-12;

/// Mollweide projection parameters.
#[derive(Debug, Clone)]
pub struct Mollweide {
    /// Central meridian in degrees
    pub central_longitude: f64,
    pub false_easting: f64,
    pub false_northing: f64,
    /// Sphere radius (metres)
    pub radius: f64,
}

impl Default for Mollweide {
    fn default() -> Self {
        Self::new(ProjectionParams::default())
    }
}

impl Mollweide {
    pub fn new(params: ProjectionParams) -> Self {
        Self {
            central_longitude: params.central_longitude,
            false_easting: params.false_easting,
            false_northing: params.false_northing,
            radius: EARTH_RADIUS,
        }
    }

    /// Solve for the auxiliary angle θ with Newton iteration on 2θ.
    fn auxiliary_angle(lat: f64) -> f64 {
        if (FRAC_PI_2 - lat.abs()).abs() < 1e-12 {
            return lat.signum() * FRAC_PI_2;
        }
        let target = PI * lat.sin();
        let mut two_theta = lat;
        for _ in 0..MAX_ITERATIONS {
            let delta = -(two_theta + two_theta.sin() - target) / (1.0 + two_theta.cos());
            two_theta += delta;
            if delta.abs() < TOLERANCE {
                break;
            }
        }
        two_theta / 2.0
    }
}

impl MapProjection for Mollweide {
    fn name(&self) -> &'static str {
        "Mollweide"
    }

    fn project(&self, lon_deg: f64, lat_deg: f64) -> Option<(f64, f64)> {
        if !lon_deg.is_finite() || !lat_deg.is_finite() || lat_deg.abs() > 90.0 {
            return None;
        }
        let dlon = wrap_longitude(lon_deg - self.central_longitude).to_radians();
        let theta = Self::auxiliary_angle(lat_deg.to_radians());
        let x = self.radius * 2.0 * SQRT_2 / PI * dlon * theta.cos();
        let y = self.radius * SQRT_2 * theta.sin();
        Some((x + self.false_easting, y + self.false_northing))
    }

    fn boundary(&self) -> Vec<(f64, f64)> {
        let a = 2.0 * SQRT_2 * self.radius;
        let b = SQRT_2 * self.radius;
        (0..=360)
            .map(|k| {
                let t = (k as f64).to_radians();
                (self.false_easting + a * t.cos(), self.false_northing + b * t.sin())
            })
            .collect()
    }

    fn global_extent(&self) -> Extent {
        let a = 2.0 * SQRT_2 * self.radius;
        let b = SQRT_2 * self.radius;
        Extent::new(
            self.false_easting - a,
            self.false_easting + a,
            self.false_northing - b,
            self.false_northing + b,
        )
    }

    fn seam_longitude(&self) -> Option<f64> {
        Some(wrap_longitude(self.central_longitude + 180.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin() {
        let proj = Mollweide::default();
        let (x, y) = proj.project(0.0, 0.0).unwrap();
        assert!(x.abs() < 1e-9 && y.abs() < 1e-9);
    }

    #[test]
    fn test_equator_edge_and_poles() {
        let proj = Mollweide::default();
        let r = EARTH_RADIUS;

        let (x, y) = proj.project(180.0, 0.0).unwrap();
        assert!((x - 2.0 * SQRT_2 * r).abs() < 1e-3);
        assert!(y.abs() < 1e-3);

        let (x, y) = proj.project(-180.0, 0.0).unwrap();
        assert!((x + 2.0 * SQRT_2 * r).abs() < 1e-3);
        assert!(y.abs() < 1e-3);

        let (x, y) = proj.project(77.0, 90.0).unwrap();
        assert!(x.abs() < 1e-3);
        assert!((y - SQRT_2 * r).abs() < 1e-3);
    }

    #[test]
    fn test_auxiliary_angle_solves_equation() {
        for lat_deg in [-89.0, -60.0, -10.0, 0.0, 25.0, 45.0, 80.0, 89.9] {
            let lat = f64::to_radians(lat_deg);
            let theta = Mollweide::auxiliary_angle(lat);
            let residual = 2.0 * theta + (2.0 * theta).sin() - PI * lat.sin();
            assert!(residual.abs() < 1e-9, "lat {}: residual {}", lat_deg, residual);
        }
    }

    #[test]
    fn test_global_extent_is_two_to_one() {
        let proj = Mollweide::default();
        let e = proj.global_extent();
        assert!((e.aspect() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_seam_opposite_central_meridian() {
        let proj = Mollweide::new(ProjectionParams {
            central_longitude: 30.0,
            ..ProjectionParams::default()
        });
        assert_eq!(proj.seam_longitude(), Some(-150.0));
    }
}
