//! Biot-Savart superposition with the midpoint approximation.
//!
//! Every segment acts as a current element at its midpoint:
//! `dB = mu0 / (4 pi) * I * (dl x r) / |r|^3`, with `r` pointing from the
//! midpoint to the sensor. Terms with `|r| == 0` contribute nothing.
use ndarray::{Array2, Zip};

use crate::error::SimulationError;
use crate::types::{cross, norm, sub, CurrentSegment, SegmentBatch, Vec3};

/// Vacuum permeability (T*m/A).
pub const MU0: f64 = 4.0e-7 * std::f64::consts::PI;
/// `mu0 / (4 pi)`.
pub const BIOT_SAVART_COEFF: f64 = MU0 / (4.0 * std::f64::consts::PI);

/// Field at every sensor, shape `(sensors.len(), 3)`.
///
/// Sensors are processed in parallel; each sensor sums its segments in input order.
pub fn compute_field(
    starts: &[Vec3],
    ends: &[Vec3],
    currents: &[f64],
    sensors: &[Vec3],
) -> Result<Array2<f64>, SimulationError> {
    SimulationError::check_len("segment ends", starts.len(), ends.len())?;
    SimulationError::check_len("segment currents", starts.len(), currents.len())?;

    let elements: Vec<(Vec3, Vec3, f64)> = starts
        .iter()
        .zip(ends)
        .zip(currents)
        .map(|((&start, &end), &current)| {
            let segment = CurrentSegment {
                start,
                end,
                current,
            };
            (segment.midpoint(), segment.dl(), current)
        })
        .collect();

    let mut field = Array2::<f64>::zeros((sensors.len(), 3));
    Zip::from(field.rows_mut())
        .and(ndarray::aview1(sensors))
        .par_for_each(|mut b, sensor| {
            let total = field_at(&elements, *sensor);
            b[0] = total[0];
            b[1] = total[1];
            b[2] = total[2];
        });
    Ok(field)
}

/// Convenience wrapper over [`compute_field`] for a segment batch.
pub fn compute_field_for_batch(
    batch: &SegmentBatch,
    sensors: &[Vec3],
) -> Result<Array2<f64>, SimulationError> {
    compute_field(&batch.starts, &batch.ends, &batch.currents, sensors)
}

fn field_at(elements: &[(Vec3, Vec3, f64)], sensor: Vec3) -> Vec3 {
    let mut b = [0.0; 3];
    for (mid, dl, current) in elements {
        let r = sub(sensor, *mid);
        let r_norm = norm(r);
        if r_norm == 0.0 {
            continue;
        }
        let scale = BIOT_SAVART_COEFF * current / (r_norm * r_norm * r_norm);
        let c = cross(*dl, r);
        b[0] += scale * c[0];
        b[1] += scale * c[1];
        b[2] += scale * c[2];
    }
    b
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    fn magnitude(field: &Array2<f64>, i: usize) -> f64 {
        norm([field[[i, 0]], field[[i, 1]], field[[i, 2]]])
    }
    fn straight_wire(half_length: f64, n: usize) -> (Vec<Vec3>, Vec<Vec3>) {
        let step = 2.0 * half_length / n as f64;
        let starts = (0..n)
            .map(|i| [-half_length + step * i as f64, 0.0, 0.0])
            .collect();
        let ends = (0..n)
            .map(|i| [-half_length + step * (i + 1) as f64, 0.0, 0.0])
            .collect();
        (starts, ends)
    }
    fn random_segments(rng: &mut StdRng, n: usize) -> (Vec<Vec3>, Vec<Vec3>, Vec<f64>) {
        let point = |rng: &mut StdRng| [rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>()];
        let starts: Vec<Vec3> = (0..n).map(|_| point(rng)).collect();
        let ends: Vec<Vec3> = (0..n).map(|_| point(rng)).collect();
        let currents = (0..n).map(|_| rng.gen_range(-2.0..2.0)).collect();
        (starts, ends, currents)
    }
    #[test]
    fn long_wire_matches_closed_form() {
        let current = 2.0;
        let d = 0.5;
        let (starts, ends) = straight_wire(200.0, 80_000);
        let currents = vec![current; starts.len()];
        let sensors = [[0.0, d, 0.0], [0.0, 0.0, d]];
        let field = compute_field(&starts, &ends, &currents, &sensors).unwrap();
        let expected = MU0 * current / (2.0 * std::f64::consts::PI * d);
        for i in 0..2 {
            let rel = (magnitude(&field, i) - expected).abs() / expected;
            assert!(rel < 1e-3, "relative error {rel}");
        }
        // x-directed current, sensor on +y: field points along +z
        assert!(field[[0, 2]] > 0.0);
        assert!(field[[0, 0]].abs() < 1e-15);
    }
    #[test]
    fn superposition_is_linear() {
        let mut rng = StdRng::seed_from_u64(5);
        let (s, e, c) = random_segments(&mut rng, 30);
        let sensors: Vec<Vec3> = (0..8).map(|i| [i as f64 * 0.3, -0.4, 1.5]).collect();
        let all = compute_field(&s, &e, &c, &sensors).unwrap();
        let a = compute_field(&s[..12], &e[..12], &c[..12], &sensors).unwrap();
        let b = compute_field(&s[12..], &e[12..], &c[12..], &sensors).unwrap();
        for (total, parts) in all.iter().zip((&a + &b).iter()) {
            assert!((total - parts).abs() <= 1e-18 + 1e-12 * total.abs());
        }
    }
    #[test]
    fn segment_order_does_not_matter() {
        let mut rng = StdRng::seed_from_u64(9);
        let (s, e, c) = random_segments(&mut rng, 25);
        let sensors = [[0.5, 0.5, -1.0], [2.0, 0.0, 0.0]];
        let forward = compute_field(&s, &e, &c, &sensors).unwrap();
        let rev = |v: &[Vec3]| v.iter().rev().copied().collect::<Vec<_>>();
        let cr: Vec<f64> = c.iter().rev().copied().collect();
        let backward = compute_field(&rev(&s), &rev(&e), &cr, &sensors).unwrap();
        for (x, y) in forward.iter().zip(backward.iter()) {
            assert!((x - y).abs() <= 1e-18 + 1e-12 * x.abs());
        }
    }
    #[test]
    fn sensor_on_midpoint_is_finite() {
        let starts = [[-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let ends = [[1.0, 0.0, 0.0], [0.0, 2.0, 0.0]];
        let currents = [1.0, 1.0];
        let sensors = [[0.0, 0.0, 0.0]];
        let field = compute_field(&starts, &ends, &currents, &sensors).unwrap();
        assert!(field.iter().all(|v| v.is_finite()));
        // only the second segment contributes
        let only_second = compute_field(&starts[1..], &ends[1..], &currents[1..], &sensors).unwrap();
        assert_eq!(field, only_second);
    }
    #[test]
    fn mismatched_inputs_fail_fast() {
        let starts = [[0.0; 3]; 3];
        let ends = [[1.0; 3]; 3];
        let currents = [1.0; 2];
        assert!(matches!(
            compute_field(&starts, &ends, &currents, &[[0.0; 3]]),
            Err(SimulationError::ShapeMismatch { expected: 3, actual: 2, .. })
        ));
    }
    #[test]
    fn no_segments_gives_zero_field() {
        let field = compute_field(&[], &[], &[], &[[0.0, 0.0, 1.0]]).unwrap();
        assert_eq!(field.shape(), &[1, 3]);
        assert!(field.iter().all(|v| *v == 0.0));
    }
}
