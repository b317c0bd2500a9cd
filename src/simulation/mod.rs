// src/simulation/mod.rs
pub mod assembler;
pub mod current;
pub mod field;
pub mod neuron;

pub use assembler::{assemble_time_series, population_segments};
pub use current::{discretize_current, PulseWaveform, Waveform};
pub use field::{compute_field, compute_field_for_batch, BIOT_SAVART_COEFF, MU0};
pub use neuron::{generate_population, sample_neuron_curve, PopulationParams, DEFAULT_CURVE_POINTS};
