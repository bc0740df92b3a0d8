//! Tests for PNG encoding of figure pixels.
//!
//! Covers format selection (indexed vs RGBA), the chunk layout and the
//! error paths for malformed buffers.

use renderer::png::{encode_auto, encode_indexed, encode_pixmap, encode_rgba, PNG_SIGNATURE};
use test_utils::generators::{create_palette_pixels, create_test_rgba_pixels};

/// Colour type byte from the IHDR chunk.
fn color_type(png: &[u8]) -> u8 {
    png[25]
}

fn ihdr_size(png: &[u8]) -> (u32, u32) {
    let w = u32::from_be_bytes([png[16], png[17], png[18], png[19]]);
    let h = u32::from_be_bytes([png[20], png[21], png[22], png[23]]);
    (w, h)
}

/// Chunk type names in file order.
fn chunk_names(png: &[u8]) -> Vec<String> {
    let mut names = Vec::new();
    let mut pos = 8;
    while pos + 8 <= png.len() {
        let len = u32::from_be_bytes([png[pos], png[pos + 1], png[pos + 2], png[pos + 3]]) as usize;
        names.push(String::from_utf8_lossy(&png[pos + 4..pos + 8]).to_string());
        pos += 12 + len;
    }
    names
}

#[test]
fn test_signature_and_header() {
    let pixels = create_test_rgba_pixels(7, 3);
    let png = encode_rgba(&pixels, 7, 3).unwrap();
    assert_eq!(&png[0..8], &PNG_SIGNATURE);
    assert_eq!(ihdr_size(&png), (7, 3));
    assert_eq!(color_type(&png), 6);
    assert_eq!(chunk_names(&png), vec!["IHDR", "IDAT", "IEND"]);
}

#[test]
fn test_auto_uses_indexed_for_few_colours() {
    let pixels = create_palette_pixels(32, 32, 12);
    let png = encode_auto(&pixels, 32, 32).unwrap();
    assert_eq!(color_type(&png), 3);
    assert_eq!(chunk_names(&png), vec!["IHDR", "PLTE", "IDAT", "IEND"]);

    let rgba = encode_rgba(&pixels, 32, 32).unwrap();
    assert!(png.len() < rgba.len());
}

#[test]
fn test_auto_falls_back_to_rgba() {
    let mut pixels = Vec::with_capacity(300 * 4);
    for i in 0..300u32 {
        pixels.extend_from_slice(&[(i % 256) as u8, (i / 256) as u8, 7, 255]);
    }
    let png = encode_auto(&pixels, 300, 1).unwrap();
    assert_eq!(color_type(&png), 6);
}

#[test]
fn test_transparency_chunk() {
    let pixels = [255, 0, 0, 255, 0, 0, 0, 0, 0, 255, 0, 128, 0, 0, 255, 255];
    let png = encode_auto(&pixels, 2, 2).unwrap();
    assert!(chunk_names(&png).contains(&"tRNS".to_string()));
}

#[test]
fn test_large_image_indexed() {
    // Above the parallel extraction threshold.
    let pixels = create_palette_pixels(128, 128, 40);
    let png = encode_auto(&pixels, 128, 128).unwrap();
    assert_eq!(color_type(&png), 3);
    assert_eq!(ihdr_size(&png), (128, 128));
}

#[test]
fn test_indexed_validates_inputs() {
    assert!(encode_indexed(2, 2, &[[0, 0, 0, 255]], &[0, 0, 0]).is_err());
    assert!(encode_indexed(2, 2, &[], &[0, 0, 0, 0]).is_err());
    assert!(encode_indexed(2, 2, &[[0, 0, 0, 255]], &[0, 0, 0, 0]).is_ok());
}

#[test]
fn test_rgba_rejects_bad_buffers() {
    assert!(encode_rgba(&[0; 15], 2, 2).is_err());
    assert!(encode_rgba(&[], 0, 4).is_err());
}

#[test]
fn test_encode_pixmap() {
    let mut pixmap = tiny_skia::Pixmap::new(10, 5).unwrap();
    pixmap.fill(tiny_skia::Color::from_rgba8(255, 255, 255, 255));
    let png = encode_pixmap(&pixmap).unwrap();
    assert_eq!(ihdr_size(&png), (10, 5));
    // A single white colour is encoded as an indexed image.
    assert_eq!(color_type(&png), 3);
}
