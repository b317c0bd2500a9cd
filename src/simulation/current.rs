use serde::{Deserialize, Serialize};

use crate::error::SimulationError;
use crate::types::{linspace, CurrentSegment, NeuronCurve};

/// Current multiplier along a curve: one value for the whole curve, or one per point.
#[derive(Clone, Debug)]
pub enum Waveform {
    Uniform(f64),
    PerPoint(Vec<f64>),
}

/// Turn a curve into one segment per adjacent point pair.
///
/// Each segment carries `amplitude` times the mean of the waveform at its two endpoints.
pub fn discretize_current(
    curve: &NeuronCurve,
    waveform: &Waveform,
    amplitude: f64,
) -> Result<Vec<CurrentSegment>, SimulationError> {
    let n = curve.len();
    if let Waveform::PerPoint(values) = waveform {
        SimulationError::check_len("waveform samples", n, values.len())?;
    }
    if n < 2 {
        return Ok(Vec::new());
    }
    let segments = (0..n - 1)
        .map(|i| {
            let w = match waveform {
                Waveform::Uniform(value) => *value,
                Waveform::PerPoint(values) => 0.5 * (values[i] + values[i + 1]),
            };
            CurrentSegment {
                start: curve.point(i),
                end: curve.point(i + 1),
                current: amplitude * w,
            }
        })
        .collect();
    Ok(segments)
}

/// Gaussian current pulse travelling along the curve parameter `s` in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseWaveform {
    /// Curve lengths per second.
    pub velocity: f64,
    /// Pulse standard deviation in units of `s`.
    pub width: f64,
    pub current_amplitude: f64,
}

impl Default for PulseWaveform {
    fn default() -> Self {
        Self {
            velocity: 0.5,
            width: 0.05,
            current_amplitude: 1.0,
        }
    }
}

impl PulseWaveform {
    /// Pulse centre at time `t`, wrapping back to the start of the curve.
    pub fn center(&self, t: f64) -> f64 {
        (t * self.velocity).rem_euclid(1.0)
    }

    pub fn sample(&self, n_points: usize, t: f64) -> Waveform {
        let center = self.center(t);
        let inv_var = 1.0 / (self.width * self.width);
        let values = linspace(0.0, 1.0, n_points)
            .into_iter()
            .map(|s| (-0.5 * (s - center).powi(2) * inv_var).exp())
            .collect();
        Waveform::PerPoint(values)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(SimulationError::config(format!(
                "pulse width must be positive, got {}",
                self.width
            )));
        }
        if !self.velocity.is_finite() || !self.current_amplitude.is_finite() {
            return Err(SimulationError::config(
                "pulse velocity and amplitude must be finite",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    fn straight(n: usize) -> NeuronCurve {
        let mut pts = ndarray::Array2::<f64>::zeros((n, 3));
        for i in 0..n {
            pts[[i, 0]] = i as f64;
        }
        let tangents = pts.clone();
        NeuronCurve::new(pts, tangents).unwrap()
    }
    #[test]
    fn one_segment_per_point_pair() {
        let segs = discretize_current(&straight(5), &Waveform::Uniform(2.0), 1.5).unwrap();
        assert_eq!(segs.len(), 4);
        assert_eq!(segs[2].start, [2.0, 0.0, 0.0]);
        assert_eq!(segs[2].end, [3.0, 0.0, 0.0]);
        assert!(segs.iter().all(|s| s.current == 3.0));
    }
    #[test]
    fn per_point_waveform_is_averaged() {
        let waveform = Waveform::PerPoint(vec![0.0, 1.0, -1.0]);
        let segs = discretize_current(&straight(3), &waveform, 2.0).unwrap();
        assert_eq!(segs[0].current, 1.0);
        assert_eq!(segs[1].current, 0.0);
    }
    #[test]
    fn short_curves_yield_no_segments() {
        let curve = NeuronCurve::new(array![[0.0, 0.0, 0.0]], array![[0.0, 0.0, 0.0]]).unwrap();
        let segs = discretize_current(&curve, &Waveform::Uniform(1.0), 1.0).unwrap();
        assert!(segs.is_empty());
    }
    #[test]
    fn waveform_length_mismatch_fails() {
        let waveform = Waveform::PerPoint(vec![1.0; 4]);
        assert!(matches!(
            discretize_current(&straight(5), &waveform, 1.0),
            Err(SimulationError::ShapeMismatch { expected: 5, actual: 4, .. })
        ));
    }
    #[test]
    fn pulse_wraps_around_the_curve() {
        let pulse = PulseWaveform::default();
        assert!((pulse.center(0.5) - 0.25).abs() < 1e-12);
        assert!((pulse.center(2.5) - 0.25).abs() < 1e-12);
        let Waveform::PerPoint(values) = pulse.sample(101, 0.5) else {
            panic!("expected per-point waveform");
        };
        let peak = values
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 25);
        assert!((values[25] - 1.0).abs() < 1e-12);
    }
}
