use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::denoise::DenoiseParams;
use crate::error::SimulationError;
use crate::graph::GraphParams;
use crate::odmr::NoiseModel;
use crate::simulation::neuron::{check_range, PopulationParams, DEFAULT_CURVE_POINTS};
use crate::simulation::PulseWaveform;
use crate::types::{linspace, FieldAxis, PlacementArea, SensorGrid};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub n_neurons: usize,
    /// `[xmin, xmax, ymin, ymax]`, shared by neuron placement and the sensor grid.
    pub area: [f64; 4],
    pub z_range: [f64; 2],
    pub mean_length: f64,
    pub n_time: usize,
    /// Seconds.
    pub t_max: f64,
    /// Sensors per grid side.
    pub sensor_res: usize,
    pub rng_seed: u64,
    pub points_per_neuron: usize,
    /// Height of the sensor plane.
    pub sensor_z: f64,
    pub pulse: PulseWaveform,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            n_neurons: 100,
            area: [0.0, 1.0, 0.0, 1.0],
            z_range: [0.0, 0.2],
            mean_length: 0.5,
            n_time: 40,
            t_max: 0.01,
            sensor_res: 32,
            rng_seed: 0,
            points_per_neuron: DEFAULT_CURVE_POINTS,
            sensor_z: 0.0,
            pulse: PulseWaveform::default(),
        }
    }
}

impl SimulationConfig {
    pub fn population_params(&self) -> PopulationParams {
        PopulationParams {
            n_neurons: self.n_neurons,
            area: PlacementArea::from_bounds(self.area),
            z_range: (self.z_range[0], self.z_range[1]),
            mean_length: self.mean_length,
            points_per_curve: self.points_per_neuron,
        }
    }

    pub fn sensor_grid(&self) -> SensorGrid {
        SensorGrid::planar(
            PlacementArea::from_bounds(self.area),
            self.sensor_res,
            self.sensor_z,
        )
    }

    pub fn times(&self) -> Vec<f64> {
        linspace(0.0, self.t_max, self.n_time)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        self.population_params().validate()?;
        self.pulse.validate()?;
        if self.sensor_res == 0 {
            return Err(SimulationError::config("sensor_res must be at least 1"));
        }
        if self.n_time == 0 {
            return Err(SimulationError::config("n_time must be at least 1"));
        }
        check_range("time", 0.0, self.t_max)?;
        if !self.sensor_z.is_finite() {
            return Err(SimulationError::config("sensor_z must be finite"));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OdmrConfig {
    pub signal_scale: f64,
    pub projection_axis: FieldAxis,
    #[serde(flatten)]
    pub noise: NoiseModel,
}

impl Default for OdmrConfig {
    fn default() -> Self {
        Self {
            signal_scale: 1.0,
            projection_axis: FieldAxis::Z,
            noise: NoiseModel::default(),
        }
    }
}

/// Full run configuration; every section and field may be omitted in JSON.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LucernaConfig {
    pub simulation: SimulationConfig,
    pub odmr: OdmrConfig,
    pub graph: GraphParams,
    pub denoise: DenoiseParams,
}

impl LucernaConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).context("failed to parse configuration")?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        self.simulation.validate()?;
        if !self.odmr.signal_scale.is_finite() {
            return Err(SimulationError::config("signal_scale must be finite"));
        }
        self.odmr.noise.validate()?;
        self.graph.validate()?;
        self.denoise.validate()
    }
}
