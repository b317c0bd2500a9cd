use log::{debug, info, warn};
use ndarray::{Array2, Array3, Axis};
use rayon::prelude::*;

use crate::error::SimulationError;
use crate::simulation::current::{discretize_current, PulseWaveform};
use crate::simulation::field::compute_field_for_batch;
use crate::types::{NeuronCurve, SegmentBatch, SensorGrid};

/// Segment batch of the whole population at time `t`.
pub fn population_segments(
    population: &[NeuronCurve],
    pulse: &PulseWaveform,
    t: f64,
) -> Result<SegmentBatch, SimulationError> {
    let capacity = population.iter().map(|n| n.len().saturating_sub(1)).sum();
    let mut batch = SegmentBatch::with_capacity(capacity);
    for neuron in population {
        let waveform = pulse.sample(neuron.len(), t);
        let segments = discretize_current(neuron, &waveform, pulse.current_amplitude)?;
        batch.extend(&segments);
    }
    Ok(batch)
}

/// Field time series with shape `(sensors, times, 3)`.
///
/// Each time step superposes every neuron's segments in a single solver call.
/// Steps run in parallel and are written back by index.
pub fn assemble_time_series(
    population: &[NeuronCurve],
    sensors: &SensorGrid,
    times: &[f64],
    pulse: &PulseWaveform,
) -> Result<Array3<f64>, SimulationError> {
    pulse.validate()?;
    if population.is_empty() {
        warn!("assembling a field time series without neurons; the field is zero");
    }
    info!(
        "assembling field: {} neurons, {} sensors, {} time samples",
        population.len(),
        sensors.len(),
        times.len()
    );

    let steps: Vec<Array2<f64>> = times
        .par_iter()
        .enumerate()
        .map(|(ti, &t)| {
            let batch = population_segments(population, pulse, t)?;
            debug!("t[{ti}] = {t:.5}: {} segments", batch.len());
            compute_field_for_batch(&batch, &sensors.positions)
        })
        .collect::<Result<_, _>>()?;

    let mut series = Array3::<f64>::zeros((sensors.len(), times.len(), 3));
    for (ti, field) in steps.iter().enumerate() {
        series.index_axis_mut(Axis(1), ti).assign(field);
    }
    Ok(series)
}
