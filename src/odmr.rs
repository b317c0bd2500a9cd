//! ODMR proxy signal.
//!
//! The frequency shift is a linear projection of the field onto one axis,
//! scaled by a constant. Noise is layered on top from a caller-owned RNG.
use log::info;
use ndarray::{Array2, Array3, Axis};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::error::SimulationError;
use crate::types::{linspace, FieldAxis};

/// Offset inside the shot-noise square root.
const SHOT_NOISE_EPS: f64 = 1e-6;

/// Project `(sensors, times, 3)` onto `axis` and scale to a `(sensors, times)` signal.
pub fn encode_signal(
    field: &Array3<f64>,
    scale: f64,
    axis: FieldAxis,
) -> Result<Array2<f64>, SimulationError> {
    SimulationError::check_len("field vector components", 3, field.len_of(Axis(2)))?;
    Ok(field.index_axis(Axis(2), axis.index()).mapv(|b| scale * b))
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseModel {
    /// Gaussian std relative to `max(1, max|signal|)`.
    pub noise_level: f64,
    pub shot_noise: bool,
    /// Absolute thermal std; zero disables it.
    pub thermal_std: f64,
    /// Per-sensor drift amplitude std; zero disables it.
    pub drift_std: f64,
}

impl Default for NoiseModel {
    fn default() -> Self {
        Self {
            noise_level: 0.1,
            shot_noise: false,
            thermal_std: 0.0,
            drift_std: 0.0,
        }
    }
}

impl NoiseModel {
    pub fn validate(&self) -> Result<(), SimulationError> {
        for (name, value) in [
            ("noise_level", self.noise_level),
            ("thermal_std", self.thermal_std),
            ("drift_std", self.drift_std),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SimulationError::config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

fn normal<R: Rng + ?Sized>(rng: &mut R, std: f64) -> f64 {
    let z: f64 = rng.sample(StandardNormal);
    std * z
}

/// Add the composite noise model to `clean`.
///
/// Draw order is fixed (gaussian, shot, thermal, drift; row-major inside each
/// source), so the output is a pure function of the input and the RNG state.
pub fn inject_noise<R: Rng + ?Sized>(
    clean: &Array2<f64>,
    model: &NoiseModel,
    rng: &mut R,
) -> Result<Array2<f64>, SimulationError> {
    model.validate()?;
    let max_abs = clean.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let gauss_std = model.noise_level * max_abs.max(1.0);

    let mut noisy = clean.mapv(|v| v + normal(rng, gauss_std));

    if model.shot_noise {
        let shot_scale = 0.5 * model.noise_level;
        for (out, &v) in noisy.iter_mut().zip(clean.iter()) {
            *out += shot_scale * normal(rng, (v.abs() + SHOT_NOISE_EPS).sqrt());
        }
    }

    if model.thermal_std > 0.0 {
        noisy.mapv_inplace(|v| v + normal(rng, model.thermal_std));
    }

    if model.drift_std > 0.0 {
        let ramp = linspace(0.0, 1.0, clean.ncols());
        for mut row in noisy.rows_mut() {
            let amplitude = normal(rng, model.drift_std);
            for (v, r) in row.iter_mut().zip(&ramp) {
                *v += amplitude * r;
            }
        }
    }

    info!(
        "injected noise: gaussian std {gauss_std:.3e}, shot {}, thermal {}, drift {}",
        model.shot_noise, model.thermal_std, model.drift_std
    );
    Ok(noisy)
}
