use log::info;
use ndarray::{Array2, Array3};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::LucernaConfig;
use crate::denoise::{mean_squared_error, smooth_graph, smooth_local};
use crate::error::SimulationError;
use crate::graph::{build_graph, GraphEdge, GraphNode};
use crate::odmr::{encode_signal, inject_noise};
use crate::simulation::{assemble_time_series, generate_population};
use crate::types::SensorGrid;

/// Field time series together with the axes it was sampled on.
#[derive(Clone, Debug)]
pub struct FieldRun {
    pub grid: SensorGrid,
    pub times: Vec<f64>,
    /// `(sensors, times, 3)`
    pub field: Array3<f64>,
}

#[derive(Clone, Debug)]
pub struct SignalRun {
    pub field: FieldRun,
    pub clean: Array2<f64>,
    pub noisy: Array2<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldReport {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub times: Vec<f64>,
    #[serde(rename = "Bshape")]
    pub b_shape: [usize; 3],
    /// `(sensors * times)` rows of `[bx, by, bz]`, sensor-major.
    #[serde(rename = "B")]
    pub b: Vec<[f64; 3]>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OdmrReport {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub times: Vec<f64>,
    pub df_shape: [usize; 2],
    pub df_clean: Vec<Vec<f64>>,
    pub df_noisy: Vec<Vec<f64>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphReport {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub n_nodes: usize,
    pub n_edges: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DenoiseReport {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub times: Vec<f64>,
    pub df_shape: [usize; 2],
    pub df_noisy: Vec<Vec<f64>>,
    pub df_denoised: Vec<Vec<f64>>,
    pub graph_smoothed: bool,
    pub mse_noisy: f64,
    pub mse_denoised: f64,
}

pub fn nested_rows(signal: &Array2<f64>) -> Vec<Vec<f64>> {
    signal.rows().into_iter().map(|row| row.to_vec()).collect()
}

/// Runs the simulation stages in order, each run a pure function of the config.
pub struct SimulationPipeline {
    config: LucernaConfig,
}

impl SimulationPipeline {
    pub fn new(config: LucernaConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LucernaConfig {
        &self.config
    }

    pub fn run_field(&self) -> Result<FieldRun, SimulationError> {
        let sim = &self.config.simulation;
        let mut rng = StdRng::seed_from_u64(sim.rng_seed);
        let population = generate_population(&sim.population_params(), &mut rng)?;
        let grid = sim.sensor_grid();
        let times = sim.times();
        let field = assemble_time_series(&population, &grid, &times, &sim.pulse)?;
        Ok(FieldRun { grid, times, field })
    }

    pub fn run_signals(&self) -> Result<SignalRun, SimulationError> {
        let field = self.run_field()?;
        let odmr = &self.config.odmr;
        let clean = encode_signal(&field.field, odmr.signal_scale, odmr.projection_axis)?;
        // noise draws from a fresh generator with the same seed
        let mut rng = StdRng::seed_from_u64(self.config.simulation.rng_seed);
        let noisy = inject_noise(&clean, &odmr.noise, &mut rng)?;
        Ok(SignalRun {
            field,
            clean,
            noisy,
        })
    }

    pub fn simulate(&self) -> Result<FieldReport, SimulationError> {
        let run = self.run_field()?;
        let (n_sensors, n_times, _) = run.field.dim();
        let b = run
            .field
            .rows()
            .into_iter()
            .map(|row| [row[0], row[1], row[2]])
            .collect();
        info!("simulate: field of shape ({n_sensors}, {n_times}, 3)");
        Ok(FieldReport {
            xs: run.grid.xs,
            ys: run.grid.ys,
            times: run.times,
            b_shape: [n_sensors, n_times, 3],
            b,
        })
    }

    pub fn odmr(&self) -> Result<OdmrReport, SimulationError> {
        let run = self.run_signals()?;
        let (n, t) = run.clean.dim();
        Ok(OdmrReport {
            df_shape: [n, t],
            df_clean: nested_rows(&run.clean),
            df_noisy: nested_rows(&run.noisy),
            xs: run.field.grid.xs,
            ys: run.field.grid.ys,
            times: run.field.times,
        })
    }

    pub fn graph(&self) -> Result<GraphReport, SimulationError> {
        let run = self.run_signals()?;
        let graph = build_graph(
            &run.noisy,
            &run.field.grid,
            &run.field.times,
            &self.config.graph,
        )?;
        Ok(GraphReport {
            n_nodes: graph.nodes.len(),
            n_edges: graph.edges.len(),
            nodes: graph.nodes,
            edges: graph.edges,
        })
    }

    /// Denoised signal; the second value tells whether graph smoothing ran.
    pub fn denoise_signal(&self, run: &SignalRun) -> Result<(Array2<f64>, bool), SimulationError> {
        let params = &self.config.denoise;
        let blurred = smooth_local(&run.noisy, params.spatial_sigma, params.temporal_sigma)?;
        if !params.graph_smoothing {
            return Ok((blurred, false));
        }
        let graph = build_graph(&blurred, &run.field.grid, &run.field.times, &self.config.graph)?;
        let smoothed = smooth_graph(
            &blurred,
            &graph.nodes,
            &graph.edges,
            params.n_smooth_iters,
            params.smoothing_alpha,
        )?;
        Ok((smoothed, true))
    }

    pub fn denoise(&self) -> Result<DenoiseReport, SimulationError> {
        let run = self.run_signals()?;
        let (denoised, graph_smoothed) = self.denoise_signal(&run)?;
        let mse_noisy = mean_squared_error(&run.noisy, &run.clean)?;
        let mse_denoised = mean_squared_error(&denoised, &run.clean)?;
        info!("denoise: mse {mse_noisy:.4e} -> {mse_denoised:.4e}");
        let (n, t) = denoised.dim();
        Ok(DenoiseReport {
            df_shape: [n, t],
            df_noisy: nested_rows(&run.noisy),
            df_denoised: nested_rows(&denoised),
            graph_smoothed,
            mse_noisy,
            mse_denoised,
            xs: run.field.grid.xs,
            ys: run.field.grid.ys,
            times: run.field.times,
        })
    }
}
