//! Common interface for map projections.

/// Mean radius used for all projections (WGS84 semi-major axis, metres).
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Rectangle in projected coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Extent {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self { x_min, x_max, y_min, y_max }
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Width over height.
    pub fn aspect(&self) -> f64 {
        self.width() / self.height()
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }

    /// Smallest extent enclosing every given point; `None` for no points.
    pub fn enclosing(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut extent: Option<Extent> = None;
        for (x, y) in points {
            if !x.is_finite() || !y.is_finite() {
                continue;
            }
            extent = Some(match extent {
                None => Extent::new(x, x, y, y),
                Some(e) => Extent::new(e.x_min.min(x), e.x_max.max(x), e.y_min.min(y), e.y_max.max(y)),
            });
        }
        extent
    }
}

/// Parameters shared by every projection constructor.
///
/// Mirrors the options projection libraries usually accept; anything a
/// particular projection does not use is ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionParams {
    /// Central longitude in degrees.
    pub central_longitude: f64,
    /// Central latitude in degrees (azimuthal projections only).
    pub central_latitude: f64,
    /// Offset added to projected x (metres).
    pub false_easting: f64,
    /// Offset added to projected y (metres).
    pub false_northing: f64,
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self {
            central_longitude: 0.0,
            central_latitude: 0.0,
            false_easting: 0.0,
            false_northing: 0.0,
        }
    }
}

/// A forward map projection from geographic degrees to projected metres.
pub trait MapProjection: std::fmt::Debug + Send + Sync {
    /// Short human readable name.
    fn name(&self) -> &'static str;

    /// Project one point. Returns `None` where the projection is undefined
    /// (for example the antipode of an azimuthal projection's centre).
    fn project(&self, lon_deg: f64, lat_deg: f64) -> Option<(f64, f64)>;

    /// Outline of the projected globe, as a closed ring.
    fn boundary(&self) -> Vec<(f64, f64)>;

    /// Extent of the whole projected globe.
    fn global_extent(&self) -> Extent {
        Extent::enclosing(self.boundary()).unwrap_or(Extent::new(-1.0, 1.0, -1.0, 1.0))
    }

    /// Longitude at which a continuous lon/lat line is cut by the map edge,
    /// if the projection has such a seam.
    fn seam_longitude(&self) -> Option<f64> {
        None
    }

    /// Project many points at once. Undefined points become NaN.
    fn transform_points(&self, lons: &[f64], lats: &[f64]) -> Vec<(f64, f64)> {
        lons.iter()
            .zip(lats)
            .map(|(&lon, &lat)| self.project(lon, lat).unwrap_or((f64::NAN, f64::NAN)))
            .collect()
    }

    /// Extent of a lon/lat rectangle in this projection.
    ///
    /// The rectangle's edges are sampled densely so curved parallels and
    /// meridians are enclosed, not only the four corners.
    fn extent_of(&self, lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> Option<Extent> {
        const SAMPLES: usize = 180;
        let mut points = Vec::with_capacity(SAMPLES * 4 + 4);
        for k in 0..=SAMPLES {
            let t = k as f64 / SAMPLES as f64;
            let lon = lon_min + t * (lon_max - lon_min);
            let lat = lat_min + t * (lat_max - lat_min);
            points.extend(self.project(lon, lat_min));
            points.extend(self.project(lon, lat_max));
            points.extend(self.project(lon_min, lat));
            points.extend(self.project(lon_max, lat));
        }
        Extent::enclosing(points)
    }
}

/// Wrap a longitude difference into [-180, 180).
pub fn wrap_longitude(dlon_deg: f64) -> f64 {
    let wrapped = (dlon_deg + 180.0).rem_euclid(360.0) - 180.0;
    // Keep +180 on the eastern edge instead of folding it onto -180.
    if wrapped == -180.0 && dlon_deg > 0.0 {
        180.0
    } else {
        wrapped
    }
}
