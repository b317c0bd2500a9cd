// src/denoise/mod.rs
pub mod gaussian;
pub mod laplacian;

pub use gaussian::smooth_local;
pub use laplacian::smooth_graph;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::SimulationError;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DenoiseParams {
    /// Gaussian std along the sensor axis, in samples.
    pub spatial_sigma: f64,
    /// Gaussian std along the time axis, in samples.
    pub temporal_sigma: f64,
    pub n_smooth_iters: usize,
    pub smoothing_alpha: f64,
    /// Follow the local blur with graph Laplacian smoothing.
    pub graph_smoothing: bool,
}

impl Default for DenoiseParams {
    fn default() -> Self {
        Self {
            spatial_sigma: 1.0,
            temporal_sigma: 1.0,
            n_smooth_iters: 3,
            smoothing_alpha: 0.1,
            graph_smoothing: false,
        }
    }
}

impl DenoiseParams {
    pub fn validate(&self) -> Result<(), SimulationError> {
        gaussian::check_sigma("spatial_sigma", self.spatial_sigma)?;
        gaussian::check_sigma("temporal_sigma", self.temporal_sigma)?;
        laplacian::check_alpha(self.smoothing_alpha)
    }
}

/// Mean squared difference between two arrays of the same shape.
pub fn mean_squared_error(a: &Array2<f64>, b: &Array2<f64>) -> Result<f64, SimulationError> {
    SimulationError::check_len("compared rows", a.nrows(), b.nrows())?;
    SimulationError::check_len("compared columns", a.ncols(), b.ncols())?;
    if a.is_empty() {
        return Ok(0.0);
    }
    let sum: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum();
    Ok(sum / a.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    #[test]
    fn mse_of_known_arrays() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let b = array![[1.0, 0.0], [3.0, 6.0]];
        assert_eq!(mean_squared_error(&a, &b).unwrap(), 2.0);
        assert_eq!(mean_squared_error(&a, &a).unwrap(), 0.0);
    }
    #[test]
    fn mse_rejects_shape_mismatch() {
        let a = Array2::<f64>::zeros((2, 3));
        let b = Array2::<f64>::zeros((3, 2));
        assert!(mean_squared_error(&a, &b).is_err());
    }
}
