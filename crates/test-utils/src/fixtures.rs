//! Common test fixtures for the geomagnetic workspace.
//!
//! SHC coefficient snippets, grid sizes and reference times that several
//! crates' tests share.

/// SHC text snippets.
pub mod shc {
    /// Axial dipole with a single epoch (static model).
    pub const AXIAL_DIPOLE: &str = "\
# axial dipole, g10 only
1 1 1
2020.0
1 0 -30000.0
";

    /// Tilted dipole with two epochs and linear interpolation.
    pub const TILTED_DIPOLE: &str = "\
# tilted dipole
1 1 2 2 1
2020.0 2025.0
1 0 -29404.8 -29376.3
1 1 -1450.9 -1413.9
1 -1 4652.5 4523.0
";

    /// Degree-2 model valid 2000 to 2010.
    pub const QUADRUPOLE_2000_2010: &str = "\
1 2 2 2 1
2000.0 2010.0
1 0 -29600.0 -29500.0
1 1 -1700.0 -1600.0
1 -1 5200.0 5000.0
2 0 -2200.0 -2400.0
2 1 3000.0 3000.0
2 -1 -2400.0 -2700.0
2 2 1700.0 1700.0
2 -2 -400.0 -600.0
";

    /// Row with the wrong number of columns.
    pub const MALFORMED_COLUMNS: &str = "\
1 1 2 2 1
2020.0 2025.0
1 0 -29404.8
";

    /// Header only.
    pub const NO_COEFFICIENTS: &str = "1 1 1\n2020.0\n";
}

/// Common grid sizes as (nlats, nlons).
pub mod grid {
    /// Smallest grid with two rows in each hemisphere.
    pub const TINY: (usize, usize) = (4, 8);

    /// Coarse global grid used by rendering tests.
    pub const COARSE: (usize, usize) = (19, 37);

    /// Default resolution of the grid builder.
    pub const DEFAULT: (usize, usize) = (180, 360);
}

/// Common time values for testing.
pub mod time {
    /// Default evaluation time.
    pub const DEFAULT_TIME: &str = "2020-01-01T00:00:00Z";

    /// A time between the built-in model's epochs.
    pub const MID_EPOCH: &str = "2022-07-01T00:00:00Z";

    /// A time outside the built-in model's validity.
    pub const OUT_OF_RANGE: &str = "1990-01-01T00:00:00Z";

    /// MJD2000 of 2020-01-01T00:00:00Z.
    pub const MJD2000_2020: f64 = 7305.0;
}

/// Units strings used in map titles and labels.
pub mod units {
    pub const NANOTESLA: &str = "nT";
    pub const DEGREES: &str = "°";
}
