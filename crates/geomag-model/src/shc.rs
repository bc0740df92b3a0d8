//! Parser for the SHC spherical-harmonic coefficient text format.
//!
//! Layout:
//! ```text
//! # comment lines
//! N_min N_max N_times spline_order N_steps
//! t_1 t_2 ... t_N              (decimal years)
//! n m c(t_1) c(t_2) ... c(t_N)  (m < 0 marks an h coefficient)
//! ```

use std::collections::HashSet;

use geomag_common::{GeomagError, GeomagResult};

/// Largest spherical-harmonic degree accepted from a file.
pub const MAX_DEGREE: usize = 1000;

/// One coefficient row: degree, signed order and one value per epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct ShcRow {
    pub degree: usize,
    /// Signed order; negative values index `h_n^|m|`.
    pub order: i64,
    pub values: Vec<f64>,
}

impl ShcRow {
    pub fn is_h(&self) -> bool {
        self.order < 0
    }
}

/// Parsed contents of an SHC file.
#[derive(Debug, Clone, PartialEq)]
pub struct ShcFile {
    /// Comment lines with the leading `#` stripped.
    pub comments: Vec<String>,
    pub min_degree: usize,
    pub max_degree: usize,
    pub spline_order: usize,
    pub steps: usize,
    /// Epochs in decimal years, strictly increasing.
    pub times: Vec<f64>,
    pub rows: Vec<ShcRow>,
}

fn load_error(line: usize, message: impl std::fmt::Display) -> GeomagError {
    GeomagError::ModelLoad(format!("SHC line {}: {}", line, message))
}

fn parse_usize(token: &str, line: usize, what: &str) -> GeomagResult<usize> {
    // Headers are sometimes written with a trailing ".0".
    let value: f64 = token
        .parse()
        .map_err(|_| load_error(line, format!("invalid {} '{}'", what, token)))?;
    if value < 0.0 || value.fract() != 0.0 {
        return Err(load_error(line, format!("{} must be a non-negative integer, got '{}'", what, token)));
    }
    Ok(value as usize)
}

fn parse_f64(token: &str, line: usize) -> GeomagResult<f64> {
    let value: f64 = token
        .parse()
        .map_err(|_| load_error(line, format!("invalid number '{}'", token)))?;
    if !value.is_finite() {
        return Err(load_error(line, format!("non-finite number '{}'", token)));
    }
    Ok(value)
}

/// Parse SHC text.
pub fn parse_shc(text: &str) -> GeomagResult<ShcFile> {
    let mut comments = Vec::new();
    let mut content = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(comment) = line.strip_prefix('#') {
            comments.push(comment.trim().to_string());
            continue;
        }
        content.push((idx + 1, line));
    }

    let mut lines = content.into_iter();

    // Header
    let (header_line, header) = lines
        .next()
        .ok_or_else(|| GeomagError::ModelLoad("SHC file has no header line".to_string()))?;
    let tokens: Vec<&str> = header.split_whitespace().collect();
    if tokens.len() < 3 {
        return Err(load_error(
            header_line,
            "header must list N_min N_max N_times [spline_order [N_steps]]",
        ));
    }
    let min_degree = parse_usize(tokens[0], header_line, "N_min")?;
    let max_degree = parse_usize(tokens[1], header_line, "N_max")?;
    let n_times = parse_usize(tokens[2], header_line, "N_times")?;
    let spline_order = match tokens.get(3) {
        Some(t) => parse_usize(t, header_line, "spline_order")?,
        None if n_times > 1 => 2,
        None => 1,
    };
    let steps = match tokens.get(4) {
        Some(t) => parse_usize(t, header_line, "N_steps")?,
        None => 1,
    };

    if min_degree == 0 || min_degree > max_degree {
        return Err(load_error(
            header_line,
            format!("invalid degree range {}..{}", min_degree, max_degree),
        ));
    }
    if max_degree > MAX_DEGREE {
        return Err(load_error(
            header_line,
            format!("N_max {} exceeds the supported maximum {}", max_degree, MAX_DEGREE),
        ));
    }
    if n_times == 0 {
        return Err(load_error(header_line, "N_times must be at least 1"));
    }

    // Epochs
    let (times_line, times_text) = lines
        .next()
        .ok_or_else(|| GeomagError::ModelLoad("SHC file has no epoch line".to_string()))?;
    let times = times_text
        .split_whitespace()
        .map(|t| parse_f64(t, times_line))
        .collect::<GeomagResult<Vec<f64>>>()?;
    if times.len() != n_times {
        return Err(load_error(
            times_line,
            format!("expected {} epochs, found {}", n_times, times.len()),
        ));
    }
    if times.windows(2).any(|w| w[1] <= w[0]) {
        return Err(load_error(times_line, "epochs must be strictly increasing"));
    }

    // Coefficients
    let mut rows = Vec::new();
    let mut seen = HashSet::new();
    for (line_no, line) in lines {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != n_times + 2 {
            return Err(load_error(
                line_no,
                format!("expected {} columns, found {}", n_times + 2, tokens.len()),
            ));
        }
        let degree = parse_usize(tokens[0], line_no, "degree")?;
        let order: i64 = tokens[1]
            .parse::<f64>()
            .ok()
            .filter(|v| v.fract() == 0.0)
            .map(|v| v as i64)
            .ok_or_else(|| load_error(line_no, format!("invalid order '{}'", tokens[1])))?;

        if degree < min_degree || degree > max_degree {
            return Err(load_error(
                line_no,
                format!("degree {} outside {}..={}", degree, min_degree, max_degree),
            ));
        }
        if order.unsigned_abs() as usize > degree {
            return Err(load_error(
                line_no,
                format!("order {} exceeds degree {}", order, degree),
            ));
        }
        if !seen.insert((degree, order)) {
            return Err(load_error(
                line_no,
                format!("duplicate coefficient n={} m={}", degree, order),
            ));
        }

        let values = tokens[2..]
            .iter()
            .map(|t| parse_f64(t, line_no))
            .collect::<GeomagResult<Vec<f64>>>()?;
        rows.push(ShcRow { degree, order, values });
    }

    if rows.is_empty() {
        return Err(GeomagError::ModelLoad("SHC file has no coefficients".to_string()));
    }

    Ok(ShcFile {
        comments,
        min_degree,
        max_degree,
        spline_order,
        steps,
        times,
        rows,
    })
}
