/// Chart layer: histogram binning, density estimate and PNG rendering.
///
/// ```text
///   numeric column ──► histogram ──► bars ─┐
///                 └──► density  ──► line ─┴─► canvas ──► <column>_distribution.png
/// ```

pub mod canvas;
pub mod font;
pub mod histogram;

use std::path::Path;

use anyhow::Result;

use crate::color::{self, SeriesColors};
use crate::data::model::Dataset;

use canvas::Canvas;
use histogram::{density_curve, histogram, DENSITY_POINTS};

/// Charts produced per run.
pub const MAX_CHARTS: usize = 3;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;
const MARGIN_LEFT: i64 = 72;
const MARGIN_RIGHT: i64 = 24;
const MARGIN_TOP: i64 = 48;
const MARGIN_BOTTOM: i64 = 56;
const TARGET_TICKS: usize = 6;

// ---------------------------------------------------------------------------
// Chart artifacts
// ---------------------------------------------------------------------------

/// A histogram written to disk for one numeric column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartArtifact {
    pub column: String,
    /// File name relative to the output directory.
    pub file_name: String,
}

/// Render one histogram per numeric column, first three in column order,
/// into `out_dir`. Existing files of the same name are overwritten.
pub fn visualize(dataset: &Dataset, out_dir: &Path) -> Result<Vec<ChartArtifact>> {
    let columns: Vec<_> = dataset.numeric_columns().take(MAX_CHARTS).collect();
    let palette = color::generate_palette(MAX_CHARTS);

    let mut artifacts = Vec::with_capacity(columns.len());
    for (idx, col) in columns.into_iter().enumerate() {
        let colors = SeriesColors::from_base(palette[idx % palette.len()]);
        let canvas = render_histogram(&col.name, &col.numeric_values(), colors);

        let file_name = chart_file_name(&col.name);
        canvas.save(&out_dir.join(&file_name))?;
        log::info!("Wrote {file_name} for column '{}'", col.name);

        artifacts.push(ChartArtifact {
            column: col.name.clone(),
            file_name,
        });
    }
    Ok(artifacts)
}

/// `<column>_distribution.png` with characters unsafe in file names
/// replaced by `_`.
pub fn chart_file_name(column: &str) -> String {
    let safe: String = column
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("{safe}_distribution.png")
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Draw a histogram with a density overlay. Missing or non-finite values
/// must already be removed; an empty slice yields an empty frame.
pub fn render_histogram(column: &str, values: &[f64], colors: SeriesColors) -> Canvas {
    let mut canvas = Canvas::new(WIDTH, HEIGHT, color::BACKGROUND);

    let left = MARGIN_LEFT;
    let right = WIDTH as i64 - MARGIN_RIGHT;
    let top = MARGIN_TOP;
    let bottom = HEIGHT as i64 - MARGIN_BOTTOM;

    canvas.text_centered(
        (left + right) / 2,
        16,
        &format!("Distribution of {column}"),
        2,
        color::TEXT,
    );
    canvas.text_centered((left + right) / 2, bottom + 34, column, 1, color::TEXT);
    canvas.text_vertical(8, (top + bottom) / 2, "Count", 1, color::TEXT);

    let Some(hist) = histogram(values) else {
        canvas.outline_rect(left, top, right, bottom, color::AXIS);
        return canvas;
    };

    let (x_lo, x_hi) = (hist.edges[0], hist.edges[hist.edges.len() - 1]);
    let density = density_curve(values, x_lo, x_hi, DENSITY_POINTS).map(|curve| {
        let scale = hist.total() as f64 * hist.bin_width();
        curve.into_iter().map(|(x, d)| (x, d * scale)).collect::<Vec<_>>()
    });

    let density_peak = density
        .as_ref()
        .map_or(0.0, |c| c.iter().map(|p| p.1).fold(0.0, f64::max));
    let y_hi = (hist.max_count() as f64).max(density_peak).max(1.0) * 1.05;

    let px = |x: f64| left as f64 + (x - x_lo) / (x_hi - x_lo) * (right - left) as f64;
    let py = |y: f64| bottom as f64 - y / y_hi * (bottom - top) as f64;

    // Grid and tick labels.
    for tick in nice_ticks(0.0, y_hi, TARGET_TICKS) {
        let y = py(tick).round() as i64;
        canvas.fill_rect(left, y, right, y, color::GRID);
        let label = format_tick(tick);
        let w = font::text_width(&label, 1) as i64;
        canvas.text(left - 6 - w, y - 3, &label, 1, color::TEXT);
    }
    for tick in nice_ticks(x_lo, x_hi, TARGET_TICKS) {
        let x = px(tick).round() as i64;
        canvas.fill_rect(x, top, x, bottom, color::GRID);
        canvas.fill_rect(x, bottom, x, bottom + 4, color::AXIS);
        canvas.text_centered(x, bottom + 10, &format_tick(tick), 1, color::TEXT);
    }

    // Bars.
    for (i, &count) in hist.counts.iter().enumerate() {
        if count == 0 {
            continue;
        }
        let x0 = px(hist.edges[i]).round() as i64;
        let x1 = px(hist.edges[i + 1]).round() as i64;
        let y0 = py(count as f64).round() as i64;
        canvas.fill_rect(x0, y0, x1, bottom, colors.fill);
        canvas.outline_rect(x0, y0, x1, bottom, colors.edge);
    }

    if let Some(curve) = density {
        let points: Vec<(f64, f64)> = curve.iter().map(|&(x, y)| (px(x), py(y))).collect();
        canvas.polyline(&points, 2, colors.line);
    }

    canvas.outline_rect(left, top, right, bottom, color::AXIS);
    canvas
}

/// Round-number ticks covering `[lo, hi]`, roughly `target` of them.
pub fn nice_ticks(lo: f64, hi: f64, target: usize) -> Vec<f64> {
    if !(hi > lo) || target == 0 {
        return vec![lo];
    }
    let raw = (hi - lo) / target as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * magnitude);

    let first = (lo / step).ceil() * step;
    let mut ticks = Vec::new();
    let mut i = 0;
    loop {
        let t = first + step * i as f64;
        if t > hi + step * 1e-9 {
            break;
        }
        // Avoid printing -0.
        ticks.push(if t.abs() < step * 1e-9 { 0.0 } else { t });
        i += 1;
    }
    ticks
}

/// Compact tick label: integers without decimals, otherwise up to four
/// significant decimals with trailing zeros trimmed.
pub fn format_tick(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        return format!("{v:.0}");
    }
    if v.abs() >= 1e6 || v.abs() < 1e-3 {
        return format!("{v:.2e}");
    }
    let s = format!("{v:.4}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
