//! Procedural neuron population.
//!
//! Each neuron is a cubic Bezier whose four control points form a short
//! Gaussian random walk. The sampled polyline is rescaled to the requested
//! physical length and translated to a random position above the sensor plane.
use log::{debug, info, warn};
use ndarray::Array2;
use rand::Rng;
use rand_distr::StandardNormal;

use crate::error::SimulationError;
use crate::types::{linspace, norm, polyline_length, NeuronCurve, PlacementArea, Vec3};

/// Sample count used for every generated curve unless overridden.
pub const DEFAULT_CURVE_POINTS: usize = 200;
/// Standard deviation of each control-point step.
const CONTROL_STEP_STD: f64 = 0.2;
/// Canonical box for the first control point: [-0.5, 0.5] x [-0.5, 0.5] x [0, 0.5].
const FIRST_CONTROL_LOW: Vec3 = [-0.5, -0.5, 0.0];
const FIRST_CONTROL_HIGH: Vec3 = [0.5, 0.5, 0.5];

#[derive(Clone, Debug)]
pub struct PopulationParams {
    pub n_neurons: usize,
    pub area: PlacementArea,
    pub z_range: (f64, f64),
    pub mean_length: f64,
    pub points_per_curve: usize,
}

impl PopulationParams {
    pub fn validate(&self) -> Result<(), SimulationError> {
        check_range("x placement", self.area.xmin, self.area.xmax)?;
        check_range("y placement", self.area.ymin, self.area.ymax)?;
        check_range("z placement", self.z_range.0, self.z_range.1)?;
        if !self.mean_length.is_finite() || self.mean_length < 0.0 {
            return Err(SimulationError::config(format!(
                "mean_length must be a non-negative number, got {}",
                self.mean_length
            )));
        }
        if self.points_per_curve < 2 {
            return Err(SimulationError::config(format!(
                "points_per_curve must be at least 2, got {}",
                self.points_per_curve
            )));
        }
        Ok(())
    }
}

pub(crate) fn check_range(what: &'static str, low: f64, high: f64) -> Result<(), SimulationError> {
    if !low.is_finite() || !high.is_finite() || low > high {
        return Err(SimulationError::InvalidRange { what, low, high });
    }
    Ok(())
}

/// Uniform draw on `[low, high)`. Equal bounds return `low`.
fn uniform<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    low + (high - low) * rng.gen::<f64>()
}

fn gaussian_step<R: Rng + ?Sized>(rng: &mut R, from: Vec3, std: f64) -> Vec3 {
    let mut out = from;
    for v in out.iter_mut() {
        let z: f64 = rng.sample(StandardNormal);
        *v += std * z;
    }
    out
}

/// Sample one Bezier neuron of polyline length `length`, positioned near the origin.
pub fn sample_neuron_curve<R: Rng + ?Sized>(
    length: f64,
    n_points: usize,
    rng: &mut R,
) -> NeuronCurve {
    let mut p0 = [0.0; 3];
    for (k, v) in p0.iter_mut().enumerate() {
        *v = uniform(rng, FIRST_CONTROL_LOW[k], FIRST_CONTROL_HIGH[k]);
    }
    let p1 = gaussian_step(rng, p0, CONTROL_STEP_STD);
    let p2 = gaussian_step(rng, p1, CONTROL_STEP_STD);
    let p3 = gaussian_step(rng, p2, CONTROL_STEP_STD);

    let mut pts = Array2::<f64>::zeros((n_points, 3));
    for (i, t) in linspace(0.0, 1.0, n_points).into_iter().enumerate() {
        let u = 1.0 - t;
        let b0 = u * u * u;
        let b1 = 3.0 * u * u * t;
        let b2 = 3.0 * u * t * t;
        let b3 = t * t * t;
        for k in 0..3 {
            pts[[i, k]] = b0 * p0[k] + b1 * p1[k] + b2 * p2[k] + b3 * p3[k];
        }
    }

    let tangents = finite_difference_tangents(&pts);

    // 按折线弧长统一缩放 (以原点为中心)
    let current = polyline_length(pts.view());
    if current > 0.0 {
        pts *= length / current;
    }
    NeuronCurve { pts, tangents }
}

/// Unit tangents from central differences (one-sided at the ends).
/// Zero-length differences stay zero vectors.
pub fn finite_difference_tangents(pts: &Array2<f64>) -> Array2<f64> {
    let n = pts.nrows();
    let mut tangents = Array2::<f64>::zeros((n, 3));
    if n < 2 {
        return tangents;
    }
    for i in 0..n {
        let (lo, hi, div) = if i == 0 {
            (0, 1, 1.0)
        } else if i == n - 1 {
            (n - 2, n - 1, 1.0)
        } else {
            (i - 1, i + 1, 2.0)
        };
        let d = [
            (pts[[hi, 0]] - pts[[lo, 0]]) / div,
            (pts[[hi, 1]] - pts[[lo, 1]]) / div,
            (pts[[hi, 2]] - pts[[lo, 2]]) / div,
        ];
        let len = norm(d);
        let len = if len == 0.0 { 1.0 } else { len };
        for k in 0..3 {
            tangents[[i, k]] = d[k] / len;
        }
    }
    tangents
}

/// Generate `params.n_neurons` independent curves placed inside the area and depth range.
pub fn generate_population<R: Rng + ?Sized>(
    params: &PopulationParams,
    rng: &mut R,
) -> Result<Vec<NeuronCurve>, SimulationError> {
    params.validate()?;
    if params.n_neurons == 0 {
        warn!("generating an empty neuron population");
    }
    let area = params.area;
    let mut neurons = Vec::with_capacity(params.n_neurons);
    for idx in 0..params.n_neurons {
        let x0 = uniform(rng, area.xmin, area.xmax);
        let y0 = uniform(rng, area.ymin, area.ymax);
        let z0 = uniform(rng, params.z_range.0, params.z_range.1);
        let length = uniform(rng, params.mean_length * 0.5, params.mean_length * 1.5);
        let mut curve = sample_neuron_curve(length, params.points_per_curve, rng);
        for mut row in curve.pts.rows_mut() {
            row[0] += x0;
            row[1] += y0;
            row[2] += z0;
        }
        debug!("neuron {idx}: length {length:.4} at ({x0:.3}, {y0:.3}, {z0:.3})");
        neurons.push(curve);
    }
    info!(
        "generated {} neurons ({} points each)",
        neurons.len(),
        params.points_per_curve
    );
    Ok(neurons)
}
