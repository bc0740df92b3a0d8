//! WGS84 geodetic ⇄ geocentric spherical conversions.

use nalgebra::{Matrix3, Vector3};

/// WGS84 semi-major axis (km).
pub const SEMI_MAJOR_AXIS: f64 = 6378.137;
/// WGS84 flattening.
pub const FLATTENING: f64 = 1.0 / 298.257_223_563;
/// First eccentricity squared.
pub const ECCENTRICITY_SQUARED: f64 = FLATTENING * (2.0 - FLATTENING);

/// Geocentric spherical position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeocentricPoint {
    /// Geocentric latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees (unchanged by the conversion)
    pub longitude: f64,
    /// Distance from the Earth's centre in km
    pub radius: f64,
}

/// Convert a geodetic position (height above the ellipsoid in km) to
/// geocentric spherical coordinates.
pub fn geodetic_to_geocentric(lat_deg: f64, lon_deg: f64, height_km: f64) -> GeocentricPoint {
    let (sin_lat, cos_lat) = lat_deg.to_radians().sin_cos();
    let prime_vertical = SEMI_MAJOR_AXIS / (1.0 - ECCENTRICITY_SQUARED * sin_lat * sin_lat).sqrt();
    let axial = (prime_vertical + height_km) * cos_lat;
    let z = (prime_vertical * (1.0 - ECCENTRICITY_SQUARED) + height_km) * sin_lat;
    GeocentricPoint {
        latitude: z.atan2(axial).to_degrees(),
        longitude: lon_deg,
        radius: axial.hypot(z),
    }
}

/// Rotate a north/east/up vector between local frames whose up directions
/// differ by `angle_deg` in the meridian plane.
///
/// With `angle_deg = geodetic latitude - geocentric latitude` this takes a
/// geocentric NEU vector to the geodetic frame; the negated angle reverses
/// the rotation.
pub fn rotate_neu(neu: &Vector3<f64>, angle_deg: f64) -> Vector3<f64> {
    let (s, c) = angle_deg.to_radians().sin_cos();
    // Rotation about the east axis.
    let rotation = Matrix3::new(
        c, 0.0, -s, //
        0.0, 1.0, 0.0, //
        s, 0.0, c,
    );
    rotation * neu
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equator_and_pole_radii() {
        let p = geodetic_to_geocentric(0.0, 10.0, 0.0);
        assert!((p.radius - SEMI_MAJOR_AXIS).abs() < 1e-9);
        assert!(p.latitude.abs() < 1e-12);
        assert_eq!(p.longitude, 10.0);

        let p = geodetic_to_geocentric(90.0, 0.0, 0.0);
        let semi_minor = SEMI_MAJOR_AXIS * (1.0 - FLATTENING);
        assert!((p.radius - semi_minor).abs() < 1e-6, "{}", p.radius);
        assert!((p.latitude - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_geocentric_latitude_is_smaller_at_mid_latitudes() {
        let p = geodetic_to_geocentric(45.0, 0.0, 0.0);
        let diff = 45.0 - p.latitude;
        // About 0.19 degrees at 45N on the surface.
        assert!(diff > 0.18 && diff < 0.20, "{}", diff);
    }

    #[test]
    fn test_height_adds_radially_at_equator() {
        let p = geodetic_to_geocentric(0.0, 0.0, 450.0);
        assert!((p.radius - SEMI_MAJOR_AXIS - 450.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_round_trip_preserves_norm() {
        let v = Vector3::new(20_000.0, -1_500.0, -45_000.0);
        let rotated = rotate_neu(&v, 0.19);
        assert!((rotated.norm() - v.norm()).abs() < 1e-6);
        let back = rotate_neu(&rotated, -0.19);
        assert!((back - v).norm() < 1e-6);
    }
}
