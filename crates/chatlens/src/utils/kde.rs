//! Gaussian kernel density estimation for small one-dimensional samples.

use std::f64::consts::PI;

pub const DEFAULT_GRID_SIZE: usize = 200;
pub const DEFAULT_CUT: f64 = 3.0;

#[derive(Debug, Clone, PartialEq)]
pub struct DensityCurve {
    pub bandwidth: f64,
    pub points: Vec<(f64, f64)>,
}

/// Sample standard deviation (n - 1 denominator).
#[must_use]
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / (n - 1.0);
    Some(variance.sqrt())
}

/// Scott's rule of thumb: `std * n^(-1/5)`.
#[must_use]
pub fn scott_bandwidth(values: &[f64]) -> Option<f64> {
    let std = sample_std(values)?;
    let bandwidth = std * (values.len() as f64).powf(-0.2);
    (bandwidth.is_finite() && bandwidth > 0.0).then_some(bandwidth)
}

/// Evaluates the density on `grid_size` evenly spaced points spanning
/// `cut` bandwidths past either end of the data.
///
/// Returns `None` when the sample has fewer than two values or no spread.
#[must_use]
pub fn gaussian_kde(values: &[f64], grid_size: usize, cut: f64) -> Option<DensityCurve> {
    let bandwidth = scott_bandwidth(values)?;
    let grid_size = grid_size.max(2);

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let start = min - cut * bandwidth;
    let end = max + cut * bandwidth;
    let step = (end - start) / (grid_size - 1) as f64;

    let norm = 1.0 / (values.len() as f64 * bandwidth * (2.0 * PI).sqrt());
    let points = (0..grid_size)
        .map(|index| {
            let x = start + step * index as f64;
            let density = values
                .iter()
                .map(|value| {
                    let z = (x - value) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum::<f64>()
                * norm;
            (x, density)
        })
        .collect();

    Some(DensityCurve { bandwidth, points })
}
