//! Line colours for contour levels.

use serde::{Deserialize, Serialize};

/// An RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 && hex.len() != 8 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }

    pub fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }

    fn lerp(self, other: Color, t: f64) -> Color {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Color::rgba(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }
}

/// Viridis sampled at eleven evenly spaced stops.
const VIRIDIS: [Color; 11] = [
    Color::rgb(0x44, 0x01, 0x54),
    Color::rgb(0x48, 0x24, 0x75),
    Color::rgb(0x41, 0x44, 0x87),
    Color::rgb(0x35, 0x5f, 0x8d),
    Color::rgb(0x2a, 0x78, 0x8e),
    Color::rgb(0x21, 0x91, 0x8c),
    Color::rgb(0x22, 0xa8, 0x84),
    Color::rgb(0x44, 0xbf, 0x70),
    Color::rgb(0x7a, 0xd1, 0x51),
    Color::rgb(0xbd, 0xdf, 0x26),
    Color::rgb(0xfd, 0xe7, 0x25),
];

/// How contour lines are coloured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Colormap {
    /// Levels spread over viridis from the lowest to the highest level.
    #[default]
    Viridis,
    /// Every level in one colour, given as a hex string.
    Single { color: String },
}

impl Colormap {
    /// Colour of `level` within the drawn `levels` (sorted ascending).
    pub fn color_for(&self, level: f64, levels: &[f64]) -> Color {
        match self {
            Colormap::Viridis => {
                let (lo, hi) = match (levels.first(), levels.last()) {
                    (Some(&lo), Some(&hi)) if hi > lo => (lo, hi),
                    // A single level sits in the middle of the map.
                    _ => return sample(&VIRIDIS, 0.5),
                };
                sample(&VIRIDIS, (level - lo) / (hi - lo))
            }
            Colormap::Single { color } => Color::from_hex(color).unwrap_or(Color::BLACK),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            Colormap::Single { color } if Color::from_hex(color).is_none() => {
                Err(format!("invalid colour '{}'", color))
            }
            _ => Ok(()),
        }
    }
}

fn sample(stops: &[Color], t: f64) -> Color {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (stops.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(stops.len() - 2);
    stops[i].lerp(stops[i + 1], scaled - i as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Color::from_hex("#ff8000"), Some(Color::rgb(255, 128, 0)));
        assert_eq!(Color::from_hex("00000080"), Some(Color::rgba(0, 0, 0, 128)));
        assert_eq!(Color::from_hex("#fff"), None);
        assert_eq!(Color::from_hex("#gg0000"), None);
    }

    #[test]
    fn test_viridis_end_points() {
        let levels = [0.0, 10.0, 20.0];
        let cmap = Colormap::Viridis;
        assert_eq!(cmap.color_for(0.0, &levels), VIRIDIS[0]);
        assert_eq!(cmap.color_for(20.0, &levels), VIRIDIS[10]);
        assert_eq!(cmap.color_for(10.0, &levels), VIRIDIS[5]);
    }

    #[test]
    fn test_single_colour() {
        let cmap = Colormap::Single {
            color: "#123456".to_string(),
        };
        assert_eq!(cmap.color_for(5.0, &[1.0, 9.0]), Color::rgb(0x12, 0x34, 0x56));
        assert!(cmap.validate().is_ok());
        let bad = Colormap::Single {
            color: "blue".to_string(),
        };
        assert!(bad.validate().is_err());
    }
}
