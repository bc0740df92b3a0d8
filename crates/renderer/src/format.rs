//! printf-style label formats such as `"%g nT"` or `"%.1f°"`.
//!
//! A format holds literal text around exactly one conversion. Supported
//! conversions are `g`, `f`, `e` (and upper-case `G`, `E`), `d` and `i`,
//! with optional flags (`-`, `+`, space, `0`, `#`), width and precision.
//! `%%` is a literal percent sign.

use std::fmt;
use std::str::FromStr;

use geomag_common::{GeomagError, GeomagResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
    General { upper: bool },
    Fixed,
    Exponent { upper: bool },
    Integer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Flags {
    left_align: bool,
    plus: bool,
    space: bool,
    zero_pad: bool,
    alternate: bool,
}

/// A parsed label format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelFormat {
    source: String,
    prefix: String,
    suffix: String,
    flags: Flags,
    width: Option<usize>,
    precision: Option<usize>,
    conversion: Conversion,
}

/// Largest width or precision a conversion may ask for.
pub const MAX_FIELD_WIDTH: usize = 64;

fn format_error(source: &str, message: &str) -> GeomagError {
    GeomagError::Render(format!("invalid label format '{}': {}", source, message))
}

/// Read a run of decimal digits, if any, bounded by [`MAX_FIELD_WIDTH`].
fn parse_count(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    source: &str,
    what: &str,
) -> GeomagResult<Option<usize>> {
    let mut value: Option<usize> = None;
    while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
        let next = value
            .unwrap_or(0)
            .checked_mul(10)
            .and_then(|v| v.checked_add(d as usize))
            .filter(|&v| v <= MAX_FIELD_WIDTH)
            .ok_or_else(|| format_error(source, &format!("{} exceeds {}", what, MAX_FIELD_WIDTH)))?;
        value = Some(next);
        chars.next();
    }
    Ok(value)
}

impl LabelFormat {
    pub fn parse(source: &str) -> GeomagResult<Self> {
        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut spec: Option<(Flags, Option<usize>, Option<usize>, Conversion)> = None;
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            let literal = if spec.is_some() { &mut suffix } else { &mut prefix };
            if c != '%' {
                literal.push(c);
                continue;
            }
            if chars.peek() == Some(&'%') {
                chars.next();
                literal.push('%');
                continue;
            }
            if spec.is_some() {
                return Err(format_error(source, "more than one conversion"));
            }

            let mut flags = Flags::default();
            while let Some(&f) = chars.peek() {
                match f {
                    '-' => flags.left_align = true,
                    '+' => flags.plus = true,
                    ' ' => flags.space = true,
                    '0' => flags.zero_pad = true,
                    '#' => flags.alternate = true,
                    _ => break,
                }
                chars.next();
            }

            let width = parse_count(&mut chars, source, "width")?;

            let mut precision = None;
            if chars.peek() == Some(&'.') {
                chars.next();
                // A bare "." means precision 0.
                precision = Some(parse_count(&mut chars, source, "precision")?.unwrap_or(0));
            }

            let conversion = match chars.next() {
                Some('g') => Conversion::General { upper: false },
                Some('G') => Conversion::General { upper: true },
                Some('f') | Some('F') => Conversion::Fixed,
                Some('e') => Conversion::Exponent { upper: false },
                Some('E') => Conversion::Exponent { upper: true },
                Some('d') | Some('i') => Conversion::Integer,
                Some(other) => {
                    return Err(format_error(source, &format!("unsupported conversion '%{}'", other)))
                }
                None => return Err(format_error(source, "incomplete conversion")),
            };
            spec = Some((flags, width, precision, conversion));
        }

        let (flags, width, precision, conversion) =
            spec.ok_or_else(|| format_error(source, "no conversion for the value"))?;

        Ok(Self {
            source: source.to_string(),
            prefix,
            suffix,
            flags,
            width,
            precision,
            conversion,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Format a value.
    pub fn format(&self, value: f64) -> String {
        let body = if !value.is_finite() {
            if value.is_nan() {
                "nan".to_string()
            } else {
                "inf".to_string()
            }
        } else {
            match self.conversion {
                Conversion::General { upper } => {
                    format_general(value.abs(), self.precision.unwrap_or(6), self.flags.alternate, upper)
                }
                Conversion::Fixed => format!("{:.*}", self.precision.unwrap_or(6), value.abs()),
                Conversion::Exponent { upper } => {
                    format_exponent(value.abs(), self.precision.unwrap_or(6), upper)
                }
                Conversion::Integer => format!("{:.0}", value.abs().trunc()),
            }
        };

        let negative = match self.conversion {
            Conversion::Integer => value.trunc() < 0.0,
            _ => value.is_sign_negative() && !value.is_nan(),
        };
        let sign = if negative {
            "-"
        } else if self.flags.plus {
            "+"
        } else if self.flags.space {
            " "
        } else {
            ""
        };

        let mut number = String::with_capacity(sign.len() + body.len());
        let len = sign.chars().count() + body.chars().count();
        match self.width {
            Some(width) if width > len => {
                let pad = width - len;
                if self.flags.left_align {
                    number.push_str(sign);
                    number.push_str(&body);
                    number.push_str(&" ".repeat(pad));
                } else if self.flags.zero_pad && value.is_finite() {
                    number.push_str(sign);
                    number.push_str(&"0".repeat(pad));
                    number.push_str(&body);
                } else {
                    number.push_str(&" ".repeat(pad));
                    number.push_str(sign);
                    number.push_str(&body);
                }
            }
            _ => {
                number.push_str(sign);
                number.push_str(&body);
            }
        }

        format!("{}{}{}", self.prefix, number, self.suffix)
    }
}

impl FromStr for LabelFormat {
    type Err = GeomagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for LabelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Split Rust's `{:e}` output ("1.2345e4") into mantissa and exponent.
fn split_exponent(formatted: &str) -> (&str, i32) {
    match formatted.split_once('e') {
        Some((mantissa, exp)) => (mantissa, exp.parse().unwrap_or(0)),
        None => (formatted, 0),
    }
}

fn c_exponent(exp: i32, upper: bool) -> String {
    let e = if upper { 'E' } else { 'e' };
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{}{}{:02}", e, sign, exp.abs())
}

fn format_exponent(value: f64, precision: usize, upper: bool) -> String {
    let formatted = format!("{:.*e}", precision, value);
    let (mantissa, exp) = split_exponent(&formatted);
    format!("{}{}", mantissa, c_exponent(exp, upper))
}

fn strip_trailing_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// `%g` for a non-negative finite value.
fn format_general(value: f64, precision: usize, alternate: bool, upper: bool) -> String {
    let p = precision.max(1);
    if value == 0.0 {
        return if alternate {
            format!("{:.*}", p - 1, 0.0)
        } else {
            "0".to_string()
        };
    }

    // Exponent after rounding to p significant digits.
    let rounded = format!("{:.*e}", p - 1, value);
    let (mantissa, exp) = split_exponent(&rounded);

    if exp < -4 || exp >= p as i32 {
        let mantissa = if alternate { mantissa } else { strip_trailing_zeros(mantissa) };
        format!("{}{}", mantissa, c_exponent(exp, upper))
    } else {
        let decimals = (p as i32 - 1 - exp).max(0) as usize;
        let fixed = format!("{:.*}", decimals, value);
        if alternate {
            fixed
        } else {
            strip_trailing_zeros(&fixed).to_string()
        }
    }
}
