use serde::Serialize;
use u_numflow::stats::{max, mean, min, std_dev};

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pearson correlation over the rows where both cells are present.
///
/// `None` when fewer than two complete pairs exist or either side has zero
/// variance.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .unzip();
    if xs.len() < 2 {
        return None;
    }
    let mx = mean(&xs)?;
    let my = mean(&ys)?;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in xs.iter().zip(&ys) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }
    Some((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Equal-width bins spanning `[min, max]`. The last bin is closed on the right.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// `bins + 1` edges in ascending order.
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

    /// Bin midpoints, one per count.
    pub fn centers(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
    }
}

/// Bin `values` into `bins` equal-width buckets.
///
/// A constant sample gets a unit-wide range centred on its value, as
/// NumPy does. Returns `None` for empty input or `bins == 0`.
pub fn histogram(values: &[f64], bins: usize) -> Option<Histogram> {
    if bins == 0 {
        return None;
    }
    let (mut lo, mut hi) = (min(values)?, max(values)?);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    Some(Histogram { edges, counts })
}

// ---------------------------------------------------------------------------
// Kernel density estimate
// ---------------------------------------------------------------------------

/// Gaussian KDE with Scott's rule bandwidth, evaluated at `points` evenly
/// spaced positions across the data range.
///
/// Returns `(x, density)` pairs; `None` when there are fewer than two
/// values or the sample has zero variance.
pub fn gaussian_kde(values: &[f64], points: usize) -> Option<Vec<(f64, f64)>> {
    let n = values.len();
    let sd = std_dev(values)?;
    if sd <= 0.0 || points < 2 {
        return None;
    }
    let bandwidth = sd * (n as f64).powf(-0.2);
    let lo = min(values)?;
    let hi = max(values)?;
    let step = (hi - lo) / (points - 1) as f64;
    let norm = 1.0 / (n as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    let curve = (0..points)
        .map(|i| {
            let x = lo + step * i as f64;
            let sum: f64 = values
                .iter()
                .map(|v| {
                    let u = (x - v) / bandwidth;
                    (-0.5 * u * u).exp()
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
    fn pearson_uses_complete_pairs() {
        let x = [Some(1.0), Some(2.0), None, Some(3.0)];
        let y = [Some(2.0), Some(4.0), Some(100.0), Some(6.0)];
        assert!((pearson(&x, &y).unwrap() - 1.0).abs() < 1e-12);

        let neg = [Some(3.0), Some(2.0), Some(0.0), Some(1.0)];
        let inc = [Some(1.0), Some(2.0), Some(4.0), Some(3.0)];
        assert!((pearson(&neg, &inc).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_undefined_for_constant_input() {
        let x = [Some(1.0), Some(1.0), Some(1.0)];
        let y = [Some(1.0), Some(2.0), Some(3.0)];
        assert!(pearson(&x, &y).is_none());
        assert!(pearson(&[Some(1.0)], &[Some(2.0)]).is_none());
    }

    #[test]
    fn histogram_counts_every_value() {
        let values: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let h = histogram(&values, 20).unwrap();
        assert_eq!(h.counts.len(), 20);
        assert_eq!(h.edges.len(), 21);
        assert_eq!(h.counts.iter().sum::<usize>(), 100);
        assert_eq!(h.counts[19], 5);
        assert!((h.bin_width() - 99.0 / 20.0).abs() < 1e-12);
    }

    #[test]
    fn histogram_of_constant_sample() {
        let h = histogram(&[3.0, 3.0], 4).unwrap();
        assert_eq!(h.edges.first(), Some(&2.5));
        assert_eq!(h.edges.last(), Some(&3.5));
        assert_eq!(h.counts.iter().sum::<usize>(), 2);
        assert!(histogram(&[], 4).is_none());
    }

    #[test]
    fn kde_integrates_to_roughly_one() {
        let values = [1.0, 2.0, 2.5, 3.0, 3.5, 4.0, 6.0];
        let curve = gaussian_kde(&values, 200).unwrap();
        assert_eq!(curve.len(), 200);
        let step = curve[1].0 - curve[0].0;
        let area: f64 = curve.iter().map(|(_, d)| d * step).sum();
        // The curve is cut at the data range, so some mass lies outside.
        assert!(area > 0.6 && area < 1.0);
        assert!(gaussian_kde(&[5.0, 5.0, 5.0], 200).is_none());
    }
}
