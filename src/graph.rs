//! Spatiotemporal proximity graph over (sensor, time) samples.
//!
//! Nodes are created time-major: node `t * n_sensors + i` is sensor `i` at
//! time index `t`. Two nodes are linked when their sensors are closer than
//! the spatial threshold and their time indices differ by at most the
//! temporal threshold. Each unordered pair is stored once.
use log::info;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::SimulationError;
use crate::types::SensorGrid;

/// Added to the spatial distance before inverting it into an edge weight.
pub const EDGE_WEIGHT_EPS: f64 = 0.01;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: usize,
    pub sensor: usize,
    #[serde(rename = "freq")]
    pub value: f64,
    #[serde(rename = "deriv")]
    pub derivative: f64,
    pub spatial_mean: f64,
    pub time_idx: usize,
    pub x: f64,
    pub y: f64,
}

impl GraphNode {
    /// `[value, derivative, spatial_mean, time_idx, x, y]`
    pub fn features(&self) -> [f64; 6] {
        [
            self.value,
            self.derivative,
            self.spatial_mean,
            self.time_idx as f64,
            self.x,
            self.y,
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: usize,
    pub target: usize,
    pub weight: f64,
    pub spatial_dist: f64,
    pub time_diff: usize,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SpatiotemporalGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl SpatiotemporalGraph {
    /// Symmetric neighbour lists `(neighbour, weight)` built from the stored edges.
    pub fn adjacency(&self) -> Result<Vec<Vec<(usize, f64)>>, SimulationError> {
        adjacency(self.nodes.len(), &self.edges)
    }
}

/// Each edge is listed under both of its endpoints.
pub fn adjacency(
    len: usize,
    edges: &[GraphEdge],
) -> Result<Vec<Vec<(usize, f64)>>, SimulationError> {
    let mut adj = vec![Vec::new(); len];
    for edge in edges {
        for index in [edge.source, edge.target] {
            if index >= len {
                return Err(SimulationError::UnknownNode { index, len });
            }
        }
        adj[edge.source].push((edge.target, edge.weight));
        adj[edge.target].push((edge.source, edge.weight));
    }
    Ok(adj)
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphParams {
    pub spatial_threshold: f64,
    pub temporal_threshold: usize,
}

impl Default for GraphParams {
    fn default() -> Self {
        Self {
            spatial_threshold: 0.15,
            temporal_threshold: 1,
        }
    }
}

impl GraphParams {
    pub fn validate(&self) -> Result<(), SimulationError> {
        if !self.spatial_threshold.is_finite() || self.spatial_threshold < 0.0 {
            return Err(SimulationError::config(format!(
                "spatial_threshold must be a non-negative number, got {}",
                self.spatial_threshold
            )));
        }
        Ok(())
    }
}

/// Mean of sensors `[i - row, i + row)` at one time index, clamped to the array.
fn local_spatial_mean(signal: &Array2<f64>, i: usize, t: usize, row: usize) -> f64 {
    let lo = i.saturating_sub(row);
    let hi = (i + row).min(signal.nrows());
    if hi <= lo {
        return signal[[i, t]];
    }
    let sum: f64 = (lo..hi).map(|k| signal[[k, t]]).sum();
    sum / (hi - lo) as f64
}

/// Build nodes and edges over a `(sensors, times)` signal.
pub fn build_graph(
    signal: &Array2<f64>,
    grid: &SensorGrid,
    times: &[f64],
    params: &GraphParams,
) -> Result<SpatiotemporalGraph, SimulationError> {
    params.validate()?;
    let (n_sensors, n_times) = signal.dim();
    SimulationError::check_len("signal sensor rows", grid.len(), n_sensors)?;
    SimulationError::check_len("signal time columns", times.len(), n_times)?;
    let row = grid.row_len();

    let mut nodes = Vec::with_capacity(n_sensors * n_times);
    for t in 0..n_times {
        for i in 0..n_sensors {
            let value = signal[[i, t]];
            let derivative = if t > 0 { value - signal[[i, t - 1]] } else { 0.0 };
            let [x, y, _] = grid.positions[i];
            nodes.push(GraphNode {
                id: nodes.len(),
                sensor: i,
                value,
                derivative,
                spatial_mean: local_spatial_mean(signal, i, t, row),
                time_idx: t,
                x,
                y,
            });
        }
    }

    // Nodes are time-major, so every partner within the temporal threshold
    // lies in the contiguous id range after `a`.
    let mut edges = Vec::new();
    for a in &nodes {
        let last_time = a
            .time_idx
            .saturating_add(params.temporal_threshold)
            .min(n_times.saturating_sub(1));
        let end = (last_time + 1) * n_sensors;
        for b in &nodes[a.id + 1..end] {
            let dx = a.x - b.x;
            let dy = a.y - b.y;
            let spatial_dist = (dx * dx + dy * dy).sqrt();
            if spatial_dist >= params.spatial_threshold {
                continue;
            }
            let time_diff = b.time_idx - a.time_idx;
            edges.push(GraphEdge {
                source: a.id,
                target: b.id,
                weight: (-(time_diff as f64)).exp() / (spatial_dist + EDGE_WEIGHT_EPS),
                spatial_dist,
                time_diff,
            });
        }
    }

    info!(
        "built spatiotemporal graph: {} nodes, {} edges",
        nodes.len(),
        edges.len()
    );
    Ok(SpatiotemporalGraph { nodes, edges })
}
