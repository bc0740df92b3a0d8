//! Inline contour labels: placement along lines and drawing.

use tiny_skia::{FillRule, Mask, Paint, PathBuilder, Pixmap, Transform};

use crate::colormap::Color;
use crate::text::{self, Anchor};

/// Preferred distance between labels on the same line, in pixels.
pub const LABEL_SPACING: f32 = 220.0;

/// Position and metadata for a contour label
#[derive(Debug, Clone, PartialEq)]
pub struct LabelPosition {
    pub x: f32,
    pub y: f32,
    /// Rotation angle in radians, kept within ±90° so text stays upright.
    pub angle: f32,
    pub text: String,
    pub color: Color,
}

/// Size of a label's background box.
fn label_box(label: &str, font_size: f32, inline_spacing: f32) -> (f32, f32) {
    let (width, height) = text::text_size(label, font_size);
    (width + 2.0 * inline_spacing, height + 0.2 * font_size)
}

/// Calculate the total length of a polyline
fn polyline_length(points: &[(f32, f32)]) -> f32 {
    points
        .windows(2)
        .map(|w| (w[1].0 - w[0].0).hypot(w[1].1 - w[0].1))
        .sum()
}

/// Whether a pixel is inside the clip region.
fn inside(mask: &Mask, x: f32, y: f32) -> bool {
    if x < 0.0 || y < 0.0 {
        return false;
    }
    let (xi, yi) = (x as u32, y as u32);
    if xi >= mask.width() || yi >= mask.height() {
        return false;
    }
    mask.data()[(yi * mask.width() + xi) as usize] > 0
}

/// Collect label positions along one line (pixel coordinates).
///
/// Lines shorter than about two label widths get no label. Candidate
/// positions are evenly spaced; a candidate is dropped when the label box
/// would leave the clip region or overlap an existing label.
pub fn collect_label_positions(
    points: &[(f32, f32)],
    text: &str,
    color: Color,
    font_size: f32,
    inline_spacing: f32,
    clip: &Mask,
    positions: &mut Vec<LabelPosition>,
) {
    let total_length = polyline_length(points);
    let (box_w, box_h) = label_box(text, font_size, inline_spacing);
    if total_length < box_w * 2.0 {
        return;
    }

    let num_labels = ((total_length / LABEL_SPACING).floor() as usize).max(1);
    let spacing = total_length / (num_labels as f32 + 1.0);

    let mut accumulated = 0.0;
    let mut next_label_at = spacing;
    let mut placed = 0;

    for w in points.windows(2) {
        if placed >= num_labels {
            break;
        }
        let (p1, p2) = (w[0], w[1]);
        let dx = p2.0 - p1.0;
        let dy = p2.1 - p1.1;
        let segment_length = dx.hypot(dy);

        while segment_length > 0.0 && accumulated + segment_length >= next_label_at && placed < num_labels {
            let t = (next_label_at - accumulated) / segment_length;
            let x = p1.0 + t * dx;
            let y = p1.1 + t * dy;

            let mut angle = dy.atan2(dx);
            if angle.abs() > std::f32::consts::FRAC_PI_2 {
                angle += std::f32::consts::PI;
                if angle > std::f32::consts::PI {
                    angle -= 2.0 * std::f32::consts::PI;
                }
            }

            let (c, s) = (angle.cos(), angle.sin());
            let corners = [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)].map(|(u, v)| {
                let (bx, by) = (u * box_w, v * box_h);
                (x + bx * c - by * s, y + bx * s + by * c)
            });
            let fits = corners.iter().all(|&(cx, cy)| inside(clip, cx, cy));

            let min_distance = box_w.max(box_h) * 1.2;
            let overlaps = positions
                .iter()
                .any(|pos| (pos.x - x).hypot(pos.y - y) < min_distance);

            if fits && !overlaps {
                positions.push(LabelPosition {
                    x,
                    y,
                    angle,
                    text: text.to_string(),
                    color,
                });
            }

            next_label_at += spacing;
            placed += 1;
        }

        accumulated += segment_length;
    }
}

/// Draw a label: a background box that hides the line beneath, then text.
pub fn draw_label(
    pixmap: &mut Pixmap,
    label: &LabelPosition,
    font_size: f32,
    inline_spacing: f32,
    background: Color,
    mask: Option<&Mask>,
) {
    let (box_w, box_h) = label_box(&label.text, font_size, inline_spacing);

    let mut pb = PathBuilder::new();
    let (c, s) = (label.angle.cos(), label.angle.sin());
    for (i, (u, v)) in [(-0.5f32, -0.5f32), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)].iter().enumerate() {
        let (bx, by) = (u * box_w, v * box_h);
        let px = label.x + bx * c - by * s;
        let py = label.y + bx * s + by * c;
        if i == 0 {
            pb.move_to(px, py);
        } else {
            pb.line_to(px, py);
        }
    }
    pb.close();

    let mut bg_paint = Paint::default();
    bg_paint.set_color(background.to_skia());
    bg_paint.anti_alias = true;
    if let Some(path) = pb.finish() {
        pixmap.fill_path(&path, &bg_paint, FillRule::Winding, Transform::identity(), mask);
    }

    text::draw_text(
        pixmap,
        &label.text,
        label.x,
        label.y,
        label.angle,
        font_size,
        Anchor::Center,
        label.color,
        mask,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_mask(w: u32, h: u32) -> Mask {
        let mut mask = Mask::new(w, h).unwrap();
        let rect = tiny_skia::Rect::from_xywh(0.0, 0.0, w as f32, h as f32).unwrap();
        let path = PathBuilder::from_rect(rect);
        mask.fill_path(&path, FillRule::Winding, false, Transform::identity());
        mask
    }

    #[test]
    fn test_long_line_gets_labels() {
        let mask = full_mask(600, 200);
        let line = vec![(20.0, 100.0), (580.0, 100.0)];
        let mut positions = Vec::new();
        collect_label_positions(&line, "40000 nT", Color::BLACK, 10.0, 5.0, &mask, &mut positions);
        assert!(!positions.is_empty());
        assert!(positions.iter().all(|p| (p.y - 100.0).abs() < 1e-3));
        assert!(positions.iter().all(|p| p.angle.abs() < 1e-6));
    }

    #[test]
    fn test_short_line_gets_none() {
        let mask = full_mask(100, 100);
        let mut positions = Vec::new();
        collect_label_positions(&[(10.0, 10.0), (20.0, 10.0)], "40000 nT", Color::BLACK, 10.0, 5.0, &mask, &mut positions);
        assert!(positions.is_empty());
    }

    #[test]
    fn test_leftward_line_is_kept_upright() {
        let mask = full_mask(600, 200);
        let line = vec![(580.0, 100.0), (20.0, 100.0)];
        let mut positions = Vec::new();
        collect_label_positions(&line, "5", Color::BLACK, 10.0, 5.0, &mask, &mut positions);
        assert!(positions.iter().all(|p| p.angle.abs() < 1e-4));
    }

    #[test]
    fn test_labels_outside_clip_are_dropped() {
        // Empty mask: nothing is inside.
        let mask = Mask::new(600, 200).unwrap();
        let mut positions = Vec::new();
        collect_label_positions(&[(20.0, 100.0), (580.0, 100.0)], "1", Color::BLACK, 10.0, 5.0, &mask, &mut positions);
        assert!(positions.is_empty());
    }

    #[test]
    fn test_draw_label_masks_line_and_draws_text() {
        let mut pixmap = Pixmap::new(120, 40).unwrap();
        pixmap.fill(tiny_skia::Color::from_rgba8(0, 0, 255, 255));
        let label = LabelPosition {
            x: 60.0,
            y: 20.0,
            angle: 0.0,
            text: "40000 nT".to_string(),
            color: Color::BLACK,
        };
        draw_label(&mut pixmap, &label, 10.0, 5.0, Color::WHITE, None);

        // Inside the box but left of the text: background colour.
        let (box_w, _) = label_box(&label.text, 10.0, 5.0);
        let edge = pixmap.pixel((60.0 - box_w / 2.0 + 2.0) as u32, 20).unwrap();
        assert_eq!((edge.red(), edge.blue()), (255, 255));
        // Far outside: untouched.
        let outside = pixmap.pixel(1, 1).unwrap();
        assert_eq!((outside.red(), outside.blue()), (0, 255));
        // Some ink from the text.
        assert!(pixmap.pixels().iter().any(|p| p.red() < 80 && p.blue() < 80));
    }
}
