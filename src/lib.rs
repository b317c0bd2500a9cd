//! Magnetic-field simulation of current-carrying neuron curves, an ODMR proxy
//! signal derived from it, and two denoisers (local Gaussian blur and graph
//! Laplacian smoothing over a spatiotemporal proximity graph).
pub mod config;
pub mod denoise;
pub mod error;
pub mod export;
pub mod graph;
pub mod odmr;
pub mod pipeline;
pub mod simulation;
pub mod types;

pub use config::{LucernaConfig, OdmrConfig, SimulationConfig};
pub use denoise::{mean_squared_error, smooth_graph, smooth_local, DenoiseParams};
pub use error::SimulationError;
pub use graph::{build_graph, GraphEdge, GraphNode, GraphParams, SpatiotemporalGraph};
pub use odmr::{encode_signal, inject_noise, NoiseModel};
pub use pipeline::{DenoiseReport, FieldReport, GraphReport, OdmrReport, SimulationPipeline};
pub use simulation::{
    assemble_time_series, compute_field, discretize_current, generate_population,
    PopulationParams, PulseWaveform, Waveform,
};
pub use types::{CurrentSegment, FieldAxis, NeuronCurve, PlacementArea, SensorGrid};
