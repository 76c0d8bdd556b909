use std::path::Path;

use anyhow::{Context, Result};
use image::{Rgb, RgbImage};

use super::font::{self, ADVANCE, GLYPH_ROWS};

// ---------------------------------------------------------------------------
// Raster canvas
// ---------------------------------------------------------------------------

/// Thin drawing layer over an `RgbImage`. Coordinates are signed and
/// everything outside the image is clipped.
pub struct Canvas {
    img: RgbImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Rgb<u8>) -> Self {
        Canvas {
            img: RgbImage::from_pixel(width, height, background),
        }
    }

    /// Fill the inclusive rectangle spanned by two corners.
    pub fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>) {
        let (xa, xb) = (x0.min(x1).max(0), x0.max(x1).min(self.img.width() as i64 - 1));
        let (ya, yb) = (y0.min(y1).max(0), y0.max(y1).min(self.img.height() as i64 - 1));
        for y in ya..=yb {
            for x in xa..=xb {
                self.img.put_pixel(x as u32, y as u32, color);
            }
        }
    }

    pub fn outline_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>) {
        self.fill_rect(x0, y0, x1, y0, color);
        self.fill_rect(x0, y1, x1, y1, color);
        self.fill_rect(x0, y0, x0, y1, color);
        self.fill_rect(x1, y0, x1, y1, color);
    }

    /// Straight line with a square brush `thickness` pixels wide.
    pub fn line(&mut self, from: (f64, f64), to: (f64, f64), thickness: u32, color: Rgb<u8>) {
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
        let half = (thickness as i64 - 1) / 2;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let x = (from.0 + dx * t).round() as i64;
            let y = (from.1 + dy * t).round() as i64;
            self.fill_rect(
                x - half,
                y - half,
                x - half + thickness as i64 - 1,
                y - half + thickness as i64 - 1,
                color,
            );
        }
    }

    pub fn polyline(&mut self, points: &[(f64, f64)], thickness: u32, color: Rgb<u8>) {
        for w in points.windows(2) {
            self.line(w[0], w[1], thickness, color);
        }
    }

    /// Draw `text` with its top-left corner at (x, y).
    pub fn text(&mut self, x: i64, y: i64, text: &str, scale: u32, color: Rgb<u8>) {
        let s = scale as i64;
        for (i, c) in text.chars().enumerate() {
            let gx = x + i as i64 * ADVANCE as i64 * s;
            for (col, bits) in font::glyph(c).iter().enumerate() {
                for row in 0..GLYPH_ROWS {
                    if bits & (1 << row) != 0 {
                        let px = gx + col as i64 * s;
                        let py = y + row as i64 * s;
                        self.fill_rect(px, py, px + s - 1, py + s - 1, color);
                    }
                }
            }
        }
    }

    /// Draw `text` centred horizontally on `cx`.
    pub fn text_centered(&mut self, cx: i64, y: i64, text: &str, scale: u32, color: Rgb<u8>) {
        let w = font::text_width(text, scale) as i64;
        self.text(cx - w / 2, y, text, scale, color);
    }

    /// Draw `text` rotated a quarter turn counter-clockwise, reading
    /// bottom to top, centred vertically on `cy`. `x` is the left edge.
    pub fn text_vertical(&mut self, x: i64, cy: i64, text: &str, scale: u32, color: Rgb<u8>) {
        let s = scale as i64;
        let w = font::text_width(text, scale) as i64;
        let bottom = cy + w / 2;
        for (i, c) in text.chars().enumerate() {
            let gy = bottom - i as i64 * ADVANCE as i64 * s;
            for (col, bits) in font::glyph(c).iter().enumerate() {
                for row in 0..GLYPH_ROWS as i64 {
                    if bits & (1 << row) != 0 {
                        let px = x + row * s;
                        let py = gy - col as i64 * s;
                        self.fill_rect(px, py - s + 1, px + s - 1, py, color);
                    }
                }
            }
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgb<u8> {
        *self.img.get_pixel(x, y)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.img
            .save(path)
            .with_context(|| format!("writing chart image {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    const RED: Rgb<u8> = Rgb([255, 0, 0]);

    #[test]
    fn drawing_is_clipped() {
        let mut c = Canvas::new(10, 10, WHITE);
        c.fill_rect(-5, -5, 2, 2, RED);
        c.fill_rect(8, 8, 50, 50, RED);
        c.fill_rect(100, 100, 120, 120, RED);
        assert_eq!(c.pixel(0, 0), RED);
        assert_eq!(c.pixel(9, 9), RED);
        assert_eq!(c.pixel(5, 5), WHITE);
    }

    #[test]
    fn line_hits_both_ends() {
        let mut c = Canvas::new(20, 20, WHITE);
        c.line((1.0, 1.0), (18.0, 12.0), 1, RED);
        assert_eq!(c.pixel(1, 1), RED);
        assert_eq!(c.pixel(18, 12), RED);
    }

    #[test]
    fn text_draws_pixels() {
        let mut c = Canvas::new(40, 12, WHITE);
        c.text(1, 1, "I", 1, RED);
        // 'I' has a full vertical stroke in its middle column.
        for row in 0..7 {
            assert_eq!(c.pixel(3, 1 + row), RED);
        }
    }

    #[test]
    fn descenders_reach_the_last_glyph_row() {
        let mut c = Canvas::new(12, 12, WHITE);
        // ',' sets bit 7 in its second column.
        c.text(0, 0, ",", 1, RED);
        assert_eq!(c.pixel(1, GLYPH_ROWS - 1), RED);
    }
}
