use ndarray::{Array2, Axis};

use crate::error::SimulationError;

/// Kernel half-width in standard deviations.
const TRUNCATE: f64 = 4.0;
/// Sigmas at or below this skip the axis entirely.
const MIN_SIGMA: f64 = 1e-15;
/// Largest kernel half-width accepted, in samples.
const MAX_RADIUS: f64 = 1.0e6;

#[derive(Clone, Debug)]
struct GaussianKernel {
    weights: Vec<f64>,
    radius: usize,
}

impl GaussianKernel {
    fn new(sigma: f64) -> Self {
        let radius = (TRUNCATE * sigma + 0.5) as usize;
        let inv_var = 1.0 / (sigma * sigma);
        let mut weights: Vec<f64> = (0..=2 * radius)
            .map(|k| {
                let x = k as f64 - radius as f64;
                (-0.5 * inv_var * x * x).exp()
            })
            .collect();
        let total: f64 = weights.iter().sum();
        for w in &mut weights {
            *w /= total;
        }
        Self { weights, radius }
    }
}

/// Mirror an out-of-range index back into `0..len` (`d c b a | a b c d | d c b a`).
fn reflect(index: isize, len: usize) -> usize {
    let len = len as isize;
    let period = 2 * len;
    let m = index.rem_euclid(period);
    (if m >= len { period - 1 - m } else { m }) as usize
}

fn blur_axis(input: &Array2<f64>, axis: Axis, sigma: f64) -> Array2<f64> {
    if sigma <= MIN_SIGMA || input.len_of(axis) == 0 {
        return input.clone();
    }
    let kernel = GaussianKernel::new(sigma);
    let mut out = Array2::<f64>::zeros(input.raw_dim());
    for (src, mut dst) in input.lanes(axis).into_iter().zip(out.lanes_mut(axis)) {
        let n = src.len();
        for i in 0..n {
            let mut acc = 0.0;
            for (k, w) in kernel.weights.iter().enumerate() {
                let j = i as isize + k as isize - kernel.radius as isize;
                acc += w * src[reflect(j, n)];
            }
            dst[i] = acc;
        }
    }
    out
}

pub(crate) fn check_sigma(name: &str, sigma: f64) -> Result<(), SimulationError> {
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(SimulationError::config(format!(
            "{name} must be a non-negative number, got {sigma}"
        )));
    }
    if TRUNCATE * sigma + 0.5 > MAX_RADIUS {
        return Err(SimulationError::config(format!(
            "{name} = {sigma} needs a kernel wider than {MAX_RADIUS} samples"
        )));
    }
    Ok(())
}

/// Separable Gaussian blur over the sensor axis (0) and the time axis (1).
///
/// Borders are mirrored and kernels are truncated at four standard deviations.
pub fn smooth_local(
    signal: &Array2<f64>,
    spatial_sigma: f64,
    temporal_sigma: f64,
) -> Result<Array2<f64>, SimulationError> {
    check_sigma("spatial_sigma", spatial_sigma)?;
    check_sigma("temporal_sigma", temporal_sigma)?;
    let blurred = blur_axis(signal, Axis(0), spatial_sigma);
    Ok(blur_axis(&blurred, Axis(1), temporal_sigma))
}
