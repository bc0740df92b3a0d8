//! Time-dependent Gauss coefficients.

use geomag_common::{GeomagError, GeomagResult};

use crate::shc::{ShcFile, MAX_DEGREE};

/// Triangular storage index of (n, m). Callers keep `n <= MAX_DEGREE`.
#[inline]
pub fn tri_index(n: usize, m: usize) -> usize {
    n * (n + 1) / 2 + m
}

/// Number of (n, m) slots up to `max_degree`, or `None` on overflow.
pub fn coefficient_count(max_degree: usize) -> Option<usize> {
    let n1 = max_degree.checked_add(1)?;
    let n2 = max_degree.checked_add(2)?;
    n1.checked_mul(n2).map(|v| v / 2)
}

/// Gauss coefficients g and h at a single instant, indexed by [`tri_index`].
#[derive(Debug, Clone, PartialEq)]
pub struct GaussCoefficients {
    pub max_degree: usize,
    pub g: Vec<f64>,
    pub h: Vec<f64>,
}

impl GaussCoefficients {
    pub fn zeros(max_degree: usize) -> GeomagResult<Self> {
        if max_degree > MAX_DEGREE {
            return Err(GeomagError::ModelLoad(format!(
                "maximum degree {} exceeds the supported {}",
                max_degree, MAX_DEGREE
            )));
        }
        let len = coefficient_count(max_degree)
            .ok_or_else(|| GeomagError::ModelLoad(format!("maximum degree {} is too large", max_degree)))?;
        Ok(Self {
            max_degree,
            g: vec![0.0; len],
            h: vec![0.0; len],
        })
    }

    pub fn g(&self, n: usize, m: usize) -> f64 {
        self.g[tri_index(n, m)]
    }

    pub fn h(&self, n: usize, m: usize) -> f64 {
        self.h[tri_index(n, m)]
    }
}

/// How coefficients vary between tabulated epochs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    /// Hold each epoch's value until the next epoch.
    PiecewiseConstant,
    /// Linear between neighbouring epochs.
    PiecewiseLinear,
}

impl Interpolation {
    /// Map an SHC spline order onto an interpolation scheme.
    pub fn from_spline_order(order: usize) -> GeomagResult<Self> {
        match order {
            1 => Ok(Interpolation::PiecewiseConstant),
            2 => Ok(Interpolation::PiecewiseLinear),
            other => Err(GeomagError::ModelLoad(format!(
                "unsupported spline order {} (only 1 and 2 are supported)",
                other
            ))),
        }
    }
}

/// Gauss coefficients tabulated at a sequence of epochs (decimal years).
#[derive(Debug, Clone)]
pub struct TimeDependentCoefficients {
    pub max_degree: usize,
    pub interpolation: Interpolation,
    times: Vec<f64>,
    /// One coefficient set per epoch.
    snapshots: Vec<GaussCoefficients>,
}

impl TimeDependentCoefficients {
    pub fn from_shc(shc: &ShcFile) -> GeomagResult<Self> {
        let interpolation = Interpolation::from_spline_order(shc.spline_order)?;
        let mut snapshots = vec![GaussCoefficients::zeros(shc.max_degree)?; shc.times.len()];

        for row in &shc.rows {
            let m = row.order.unsigned_abs() as usize;
            let idx = tri_index(row.degree, m);
            for (snapshot, &value) in snapshots.iter_mut().zip(&row.values) {
                if row.is_h() {
                    snapshot.h[idx] = value;
                } else {
                    snapshot.g[idx] = value;
                }
            }
        }

        Ok(Self {
            max_degree: shc.max_degree,
            interpolation,
            times: shc.times.clone(),
            snapshots,
        })
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Validity interval in decimal years. A single-epoch model is static and
    /// valid at any time.
    pub fn validity(&self) -> (f64, f64) {
        if self.times.len() == 1 {
            return (f64::NEG_INFINITY, f64::INFINITY);
        }
        (self.times[0], self.times[self.times.len() - 1])
    }

    pub fn is_valid_at(&self, decimal_year: f64) -> bool {
        let (start, end) = self.validity();
        decimal_year >= start && decimal_year <= end
    }

    /// Coefficients at the given decimal year.
    pub fn at(&self, decimal_year: f64) -> GeomagResult<GaussCoefficients> {
        if !self.is_valid_at(decimal_year) {
            let (start, end) = self.validity();
            return Err(GeomagError::Evaluation(format!(
                "time {:.4} is outside the model validity {:.4}..{:.4}",
                decimal_year, start, end
            )));
        }
        if self.times.len() == 1 {
            return Ok(self.snapshots[0].clone());
        }

        // Index of the interval [t_k, t_k+1] containing the time.
        let k = match self
            .times
            .windows(2)
            .position(|w| decimal_year >= w[0] && decimal_year < w[1])
        {
            Some(k) => k,
            // Exactly the last epoch.
            None => return Ok(self.snapshots[self.snapshots.len() - 1].clone()),
        };

        match self.interpolation {
            Interpolation::PiecewiseConstant => Ok(self.snapshots[k].clone()),
            Interpolation::PiecewiseLinear => {
                let (t0, t1) = (self.times[k], self.times[k + 1]);
                let w = (decimal_year - t0) / (t1 - t0);
                let (a, b) = (&self.snapshots[k], &self.snapshots[k + 1]);
                let lerp = |x: &[f64], y: &[f64]| -> Vec<f64> {
                    x.iter().zip(y).map(|(&p, &q)| p + w * (q - p)).collect()
                };
                Ok(GaussCoefficients {
                    max_degree: self.max_degree,
                    g: lerp(&a.g, &b.g),
                    h: lerp(&a.h, &b.h),
                })
            }
        }
    }
}
