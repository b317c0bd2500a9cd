// src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("{what} shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid {what} range: [{low}, {high}]")]
    InvalidRange {
        what: &'static str,
        low: f64,
        high: f64,
    },
    #[error("edge references node {index} but the graph has {len} nodes")]
    UnknownNode { index: usize, len: usize },
}
impl SimulationError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        SimulationError::InvalidConfig(message.into())
    }
    pub(crate) fn check_len(
        what: &'static str,
        expected: usize,
        actual: usize,
    ) -> Result<(), SimulationError> {
        if expected != actual {
            return Err(SimulationError::ShapeMismatch {
                what,
                expected,
                actual,
            });
        }
        Ok(())
    }
}
