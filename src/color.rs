use image::Rgb;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues,
/// starting from a muted blue.
pub fn generate_palette(n: usize) -> Vec<Rgb<u8>> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (215.0 + (i as f32 / n as f32) * 360.0) % 360.0;
            hsl_to_rgb(Hsl::new(hue, 0.45, 0.50))
        })
        .collect()
}

fn hsl_to_rgb(hsl: Hsl) -> Rgb<u8> {
    let rgb: Srgb = hsl.into_color();
    Rgb([
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    ])
}

// ---------------------------------------------------------------------------
// Chart styling
// ---------------------------------------------------------------------------

pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
pub const GRID: Rgb<u8> = Rgb([226, 226, 226]);
pub const AXIS: Rgb<u8> = Rgb([60, 60, 60]);
pub const TEXT: Rgb<u8> = Rgb([30, 30, 30]);

/// Bar fill, bar edge and density line colours for one chart.
#[derive(Debug, Clone, Copy)]
pub struct SeriesColors {
    pub fill: Rgb<u8>,
    pub edge: Rgb<u8>,
    pub line: Rgb<u8>,
}

impl SeriesColors {
    /// Derive a light fill and a darker outline from a base colour.
    pub fn from_base(base: Rgb<u8>) -> Self {
        SeriesColors {
            fill: blend(base, BACKGROUND, 0.45),
            edge: base,
            line: blend(base, Rgb([0, 0, 0]), 0.25),
        }
    }
}

/// Mix `a` towards `b` by `t` (0 keeps `a`, 1 gives `b`).
pub fn blend(a: Rgb<u8>, b: Rgb<u8>, t: f32) -> Rgb<u8> {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Rgb([mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_distinct_colours() {
        let p = generate_palette(3);
        assert_eq!(p.len(), 3);
        assert_ne!(p[0], p[1]);
        assert_ne!(p[1], p[2]);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn blend_endpoints() {
        let a = Rgb([0, 100, 200]);
        assert_eq!(blend(a, BACKGROUND, 0.0), a);
        assert_eq!(blend(a, BACKGROUND, 1.0), BACKGROUND);
    }
}
