//! Text for contour labels and figure titles.
//!
//! Runs are laid out with rusttype and rasterised by imageproc into an RGBA
//! image, which is then composited (rotated if needed) onto the tiny-skia
//! canvas.

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use rusttype::{point, Font, Scale};
use tiny_skia::{ColorU8, FilterQuality, Mask, Pixmap, PixmapPaint, Transform};
use tracing::warn;

use crate::colormap::Color;

/// Embedded font data - DejaVu Sans
const FONT_DATA: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Transparent margin around a rasterised run, in pixels.
const PAD: u32 = 2;

fn load_font() -> Option<Font<'static>> {
    Font::try_from_bytes(FONT_DATA)
}

/// Whether the font has a glyph for `ch`.
pub fn has_glyph(ch: char) -> bool {
    load_font().map_or(false, |font| font.glyph(ch).id().0 != 0)
}

fn run_width(font: &Font<'_>, scale: Scale, text: &str) -> f32 {
    font.layout(text, scale, point(0.0, 0.0))
        .last()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0)
}

/// Width and height (ascent to descent) of a text run in pixels.
pub fn text_size(text: &str, font_size: f32) -> (f32, f32) {
    match load_font() {
        Some(font) => {
            let scale = Scale::uniform(font_size);
            let v = font.v_metrics(scale);
            (run_width(&font, scale, text), v.ascent - v.descent)
        }
        // Rough monospace estimate
        None => (text.chars().count() as f32 * 0.6 * font_size, font_size),
    }
}

/// Anchor of a text run relative to the given point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Centre of the run's box.
    Center,
    /// Top centre of the run's box.
    TopCenter,
}

/// Rasterise `text` into a premultiplied pixmap with a `PAD` margin.
fn rasterise(font: &Font<'_>, text: &str, font_size: f32, color: Color) -> Option<Pixmap> {
    let scale = Scale::uniform(font_size);
    let v = font.v_metrics(scale);
    let width = run_width(font, scale, text).ceil() as u32 + 2 * PAD;
    let height = (v.ascent - v.descent).ceil() as u32 + 2 * PAD;

    let mut img = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    draw_text_mut(
        &mut img,
        Rgba([color.r, color.g, color.b, 255]),
        PAD as i32,
        PAD as i32,
        scale,
        font,
        text,
    );

    // Only the coverage is taken from the image; the colour is reapplied so
    // overlapping glyph edges cannot drift.
    let mut pixmap = Pixmap::new(width, height)?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(img.pixels()) {
        let alpha = (src.0[3] as u16 * color.a as u16 / 255) as u8;
        *dst = ColorU8::from_rgba(color.r, color.g, color.b, alpha).premultiply();
    }
    Some(pixmap)
}

/// Draw a text run, rotated by `angle` radians about the anchor point.
#[allow(clippy::too_many_arguments)]
pub fn draw_text(
    pixmap: &mut Pixmap,
    text: &str,
    x: f32,
    y: f32,
    angle: f32,
    font_size: f32,
    anchor: Anchor,
    color: Color,
    mask: Option<&Mask>,
) {
    if text.trim().is_empty() {
        return;
    }
    let Some(font) = load_font() else {
        warn!("Failed to load font for text rendering");
        return;
    };
    let Some(run) = rasterise(&font, text, font_size, color) else {
        warn!(text, font_size, "Text run too large to rasterise");
        return;
    };

    let anchor_x = run.width() as f32 / 2.0;
    let anchor_y = match anchor {
        Anchor::Center => run.height() as f32 / 2.0,
        Anchor::TopCenter => PAD as f32,
    };

    let (transform, quality) = if angle == 0.0 {
        // Whole-pixel placement keeps upright text sharp.
        let tx = (x - anchor_x).round();
        let ty = (y - anchor_y).round();
        (Transform::from_translate(tx, ty), FilterQuality::Nearest)
    } else {
        let t = Transform::from_translate(-anchor_x, -anchor_y)
            .post_rotate(angle.to_degrees())
            .post_translate(x, y);
        (t, FilterQuality::Bilinear)
    };
    let paint = PixmapPaint {
        quality,
        ..PixmapPaint::default()
    };
    pixmap.draw_pixmap(0, 0, run.as_ref(), &paint, transform, mask);
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bounding box (x0, y0, x1, y1) of pixels with any ink.
    fn ink_bounds(pixmap: &Pixmap) -> Option<(u32, u32, u32, u32)> {
        let w = pixmap.width();
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for (i, p) in pixmap.pixels().iter().enumerate() {
            if p.alpha() == 0 {
                continue;
            }
            let (x, y) = (i as u32 % w, i as u32 / w);
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
        bounds
    }

    #[test]
    fn test_label_characters_have_glyphs() {
        for ch in "-0123456789.e+ nT°%".chars() {
            assert!(has_glyph(ch), "{:?}", ch);
        }
    }

    #[test]
    fn test_text_size() {
        assert_eq!(text_size("", 10.0).0, 0.0);
        let (short, h) = text_size("40 nT", 10.0);
        let (long, _) = text_size("40000 nT", 10.0);
        assert!(long > short && short > 0.0);
        assert!(h > 10.0 && h < 14.0, "{}", h);

        let (double, _) = text_size("40000 nT", 20.0);
        assert!((double - 2.0 * long).abs() < 0.5, "{} vs {}", double, long);
    }

    #[test]
    fn test_draw_text_uses_colour() {
        let mut pixmap = Pixmap::new(60, 30).unwrap();
        draw_text(&mut pixmap, "42", 30.0, 15.0, 0.0, 16.0, Anchor::Center, Color::rgb(200, 0, 0), None);
        let darkest = pixmap.pixels().iter().max_by_key(|p| p.alpha()).unwrap();
        assert!(darkest.alpha() > 200);
        assert!(darkest.red() > 150 && darkest.blue() == 0);
    }

    #[test]
    fn test_center_anchor() {
        let mut pixmap = Pixmap::new(100, 40).unwrap();
        draw_text(&mut pixmap, "8888", 50.0, 20.0, 0.0, 16.0, Anchor::Center, Color::BLACK, None);
        let (x0, y0, x1, y1) = ink_bounds(&pixmap).unwrap();
        assert!(((x0 + x1) as f32 / 2.0 - 50.0).abs() < 3.0);
        assert!(((y0 + y1) as f32 / 2.0 - 20.0).abs() < 5.0);
    }

    #[test]
    fn test_top_center_anchor_hangs_below() {
        let mut pixmap = Pixmap::new(200, 60).unwrap();
        draw_text(&mut pixmap, "Title", 100.0, 10.0, 0.0, 15.0, Anchor::TopCenter, Color::BLACK, None);
        let (_, y0, _, _) = ink_bounds(&pixmap).unwrap();
        assert!(y0 >= 10);
    }

    #[test]
    fn test_rotated_text_is_vertical() {
        let mut pixmap = Pixmap::new(80, 120).unwrap();
        let angle = std::f32::consts::FRAC_PI_2;
        draw_text(&mut pixmap, "50000 nT", 40.0, 60.0, angle, 12.0, Anchor::Center, Color::BLACK, None);
        let (x0, y0, x1, y1) = ink_bounds(&pixmap).unwrap();
        assert!(y1 - y0 > 2 * (x1 - x0), "{:?}", (x0, y0, x1, y1));
    }

    #[test]
    fn test_blank_text_draws_nothing() {
        let mut pixmap = Pixmap::new(20, 20).unwrap();
        draw_text(&mut pixmap, "  ", 10.0, 10.0, 0.0, 10.0, Anchor::Center, Color::BLACK, None);
        assert!(ink_bounds(&pixmap).is_none());
    }
}
