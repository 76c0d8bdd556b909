use crate::analysis::quantile;

/// Upper bound on bins; heavy-tailed data can otherwise ask for thousands.
const MAX_BINS: usize = 200;

/// Points sampled along the density curve.
pub const DENSITY_POINTS: usize = 200;

// ---------------------------------------------------------------------------
// Binning
// ---------------------------------------------------------------------------

/// Equal-width histogram: `edges.len() == counts.len() + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn bin_width(&self) -> f64 {
        match (self.edges.first(), self.edges.last()) {
            (Some(lo), Some(hi)) if !self.counts.is_empty() => (hi - lo) / self.counts.len() as f64,
            _ => 0.0,
        }
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Bin finite values with the "auto" rule: the narrower of the Sturges
/// and Freedman–Diaconis widths, Sturges alone when the IQR is zero.
///
/// A constant sample gets a single bin of width 1 centred on the value.
/// Returns `None` when there are no finite values.
pub fn histogram(values: &[f64]) -> Option<Histogram> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let (mut lo, mut hi) = (sorted[0], sorted[sorted.len() - 1]);
    let n_bins = auto_bin_count(&sorted, hi - lo);
    if hi - lo == 0.0 {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / n_bins as f64;

    let mut counts = vec![0usize; n_bins];
    for &v in &sorted {
        let idx = (((v - lo) / width) as usize).min(n_bins - 1);
        counts[idx] += 1;
    }
    let edges = (0..=n_bins).map(|i| lo + width * i as f64).collect();

    Some(Histogram { edges, counts })
}

/// Bin count for sorted, finite data spanning `range`.
pub fn auto_bin_count(sorted: &[f64], range: f64) -> usize {
    let n = sorted.len();
    if n < 2 || range <= 0.0 {
        return 1;
    }
    let sturges = range / ((n as f64).log2() + 1.0);

    let iqr = match (quantile(sorted, 0.75), quantile(sorted, 0.25)) {
        (Some(q3), Some(q1)) => q3 - q1,
        _ => 0.0,
    };
    let fd = 2.0 * iqr / (n as f64).cbrt();

    let width = if fd > 0.0 { fd.min(sturges) } else { sturges };
    ((range / width).ceil() as usize).clamp(1, MAX_BINS)
}

// ---------------------------------------------------------------------------
// Kernel density estimate
// ---------------------------------------------------------------------------

/// Gaussian KDE with Scott's bandwidth, sampled at `points` evenly spaced
/// positions over `[lo, hi]`. Values are densities (integrate to ~1).
///
/// `None` when fewer than two finite values exist or they have no spread.
pub fn density_curve(values: &[f64], lo: f64, hi: f64, points: usize) -> Option<Vec<(f64, f64)>> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let n = finite.len();
    let sd = crate::analysis::sample_std(&finite)?;
    if sd == 0.0 || points < 2 {
        return None;
    }
    let bandwidth = sd * (n as f64).powf(-0.2);
    let norm = 1.0 / (n as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    let step = (hi - lo) / (points - 1) as f64;
    let curve = (0..points)
        .map(|i| {
            let x = lo + step * i as f64;
            let sum: f64 = finite
                .iter()
                .map(|&xi| {
                    let z = (x - xi) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum();
            (x, sum * norm)
        })
        .collect();
    Some(curve)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_bins_for_one_to_hundred() {
        let values: Vec<f64> = (1..=100).map(|v| v as f64).collect();
        let h = histogram(&values).unwrap();
        assert_eq!(h.counts.len(), 8);
        assert_eq!(h.edges.len(), 9);
        assert_eq!(h.total(), 100);
        assert!((h.edges[0] - 1.0).abs() < 1e-12);
        assert!((h.edges[8] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn constant_sample_gets_one_bin() {
        let h = histogram(&[3.0, 3.0, 3.0]).unwrap();
        assert_eq!(h.counts, vec![3]);
        assert_eq!(h.edges, vec![2.5, 3.5]);
        assert!((h.bin_width() - 1.0).abs() < 1e-12);

        let many = histogram(&[-2.0; 50]).unwrap();
        assert_eq!(many.counts, vec![50]);
        assert_eq!(many.edges, vec![-2.5, -1.5]);
    }

    #[test]
    fn non_finite_values_are_ignored() {
        assert!(histogram(&[f64::INFINITY]).is_none());
        assert!(histogram(&[]).is_none());
        let h = histogram(&[1.0, f64::NEG_INFINITY, 2.0]).unwrap();
        assert_eq!(h.total(), 2);
    }

    #[test]
    fn max_value_lands_in_last_bin() {
        let h = histogram(&[0.0, 1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(h.counts, vec![1, 1, 1, 2]);
    }

    #[test]
    fn density_integrates_to_one() {
        let values = [1.0, 2.0, 2.5, 3.0, 5.0];
        let curve = density_curve(&values, -20.0, 30.0, 2001).unwrap();
        let area: f64 = curve
            .windows(2)
            .map(|w| (w[1].0 - w[0].0) * (w[0].1 + w[1].1) / 2.0)
            .sum();
        assert!((area - 1.0).abs() < 1e-3, "area = {area}");
    }

    #[test]
    fn density_needs_spread() {
        assert!(density_curve(&[2.0, 2.0], 0.0, 4.0, 10).is_none());
        assert!(density_curve(&[2.0], 0.0, 4.0, 10).is_none());
    }
}
