//! Iterative graph Laplacian smoothing (Jacobi update).
//!
//! Every iteration reads the previous snapshot and writes a fresh buffer:
//! `new = (1 - alpha) * old + alpha * weighted_neighbour_mean(old)`.
use log::{debug, warn};
use ndarray::Array2;
use rayon::prelude::*;

use crate::error::SimulationError;
use crate::graph::{adjacency, GraphEdge, GraphNode};

pub(crate) fn check_alpha(alpha: f64) -> Result<(), SimulationError> {
    if !(0.0..=1.0).contains(&alpha) {
        return Err(SimulationError::config(format!(
            "smoothing alpha must lie in [0, 1], got {alpha}"
        )));
    }
    Ok(())
}

/// Position of a node inside the `(sensors, times)` array, if it lies within bounds.
fn cell(node: &GraphNode, dim: (usize, usize)) -> Option<(usize, usize)> {
    (node.sensor < dim.0 && node.time_idx < dim.1).then_some((node.sensor, node.time_idx))
}

/// Smooth `signal` over the proximity graph for `iterations` Jacobi steps.
///
/// Neighbours outside the array bounds are ignored; nodes without usable
/// neighbours keep their value.
pub fn smooth_graph(
    signal: &Array2<f64>,
    nodes: &[GraphNode],
    edges: &[GraphEdge],
    iterations: usize,
    alpha: f64,
) -> Result<Array2<f64>, SimulationError> {
    check_alpha(alpha)?;
    let len = nodes.len();
    let adj = adjacency(len, edges)?;

    let dim = signal.dim();
    let isolated = adj.iter().filter(|n| n.is_empty()).count();
    if isolated > 0 && iterations > 0 {
        warn!("{isolated} of {len} graph nodes have no neighbours and stay unsmoothed");
    }

    let mut current = signal.clone();
    for iteration in 0..iterations {
        let snapshot = &current;
        let updates: Vec<((usize, usize), f64)> = nodes
            .par_iter()
            .zip(adj.par_iter())
            .filter_map(|(node, neighbours)| {
                let own = cell(node, dim)?;
                let mut weighted = 0.0;
                let mut weight_sum = 0.0;
                for &(other, w) in neighbours {
                    if let Some(pos) = cell(&nodes[other], dim) {
                        weighted += snapshot[pos] * w;
                        weight_sum += w;
                    }
                }
                if weight_sum <= 0.0 {
                    return None;
                }
                let mean = weighted / weight_sum;
                Some((own, (1.0 - alpha) * snapshot[own] + alpha * mean))
            })
            .collect();

        let updated = updates.len();
        let mut next = current.clone();
        for (pos, value) in updates {
            next[pos] = value;
        }
        debug!("graph smoothing iteration {}: {updated} nodes updated", iteration + 1);
        current = next;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{build_graph, GraphParams};
    use crate::types::SensorGrid;
    use ndarray::array;
    fn node(id: usize, sensor: usize, time_idx: usize, value: f64) -> GraphNode {
        GraphNode {
            id,
            sensor,
            value,
            derivative: 0.0,
            spatial_mean: value,
            time_idx,
            x: sensor as f64,
            y: 0.0,
        }
    }
    fn edge(source: usize, target: usize, weight: f64) -> GraphEdge {
        GraphEdge {
            source,
            target,
            weight,
            spatial_dist: 0.0,
            time_diff: 0,
        }
    }
    fn sample() -> (Array2<f64>, Vec<GraphNode>, Vec<GraphEdge>) {
        let signal = Array2::from_shape_fn((9, 4), |(i, t)| ((i * 7 + t * 3) % 5) as f64 - 2.0);
        let axis = vec![0.0, 0.1, 0.2];
        let grid = SensorGrid::from_axes(axis.clone(), axis, 0.0);
        let g = build_graph(&signal, &grid, &[0.0, 1.0, 2.0, 3.0], &GraphParams::default()).unwrap();
        (signal, g.nodes, g.edges)
    }
    #[test]
    fn zero_alpha_leaves_signal_unchanged() {
        let (signal, nodes, edges) = sample();
        let out = smooth_graph(&signal, &nodes, &edges, 5, 0.0).unwrap();
        assert_eq!(out, signal);
    }
    #[test]
    fn zero_iterations_returns_input() {
        let (signal, nodes, edges) = sample();
        let out = smooth_graph(&signal, &nodes, &edges, 0, 0.7).unwrap();
        assert_eq!(out, signal);
    }
    #[test]
    fn update_is_simultaneous() {
        // chain 0 - 1 - 2 on one time sample
        let signal = array![[0.0], [1.0], [4.0]];
        let nodes = vec![node(0, 0, 0, 0.0), node(1, 1, 0, 1.0), node(2, 2, 0, 4.0)];
        let edges = vec![edge(0, 1, 1.0), edge(1, 2, 3.0)];
        let out = smooth_graph(&signal, &nodes, &edges, 1, 0.5).unwrap();
        assert!((out[[0, 0]] - 0.5).abs() < 1e-12);
        // neighbour mean of node 1 uses old values: (0 * 1 + 4 * 3) / 4 = 3
        assert!((out[[1, 0]] - 2.0).abs() < 1e-12);
        assert!((out[[2, 0]] - 2.5).abs() < 1e-12);

        // reversing node traversal order gives the same answer
        let rev_edges = vec![edge(2, 1, 3.0), edge(1, 0, 1.0)];
        let again = smooth_graph(&signal, &nodes, &rev_edges, 1, 0.5).unwrap();
        assert_eq!(out, again);
    }
    #[test]
    fn out_of_bounds_neighbours_are_ignored() {
        let signal = array![[1.0, 5.0]];
        let nodes = vec![node(0, 0, 0, 1.0), node(1, 0, 7, 100.0)];
        let edges = vec![edge(0, 1, 1.0)];
        let out = smooth_graph(&signal, &nodes, &edges, 3, 0.9).unwrap();
        assert_eq!(out, signal);
    }
    #[test]
    fn smoothing_pulls_values_together() {
        let (signal, nodes, edges) = sample();
        let out = smooth_graph(&signal, &nodes, &edges, 10, 0.5).unwrap();
        let spread = |a: &Array2<f64>| {
            let mean = a.mean().unwrap();
            a.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
        };
        assert!(spread(&out) < spread(&signal));
    }
    #[test]
    fn dangling_edges_fail_fast() {
        let signal = array![[1.0]];
        let nodes = vec![node(0, 0, 0, 1.0)];
        let res = smooth_graph(&signal, &nodes, &[edge(0, 3, 1.0)], 1, 0.5);
        assert!(matches!(res, Err(SimulationError::UnknownNode { index: 3, len: 1 })));
    }
    #[test]
    fn alpha_outside_unit_interval_is_rejected() {
        let (signal, nodes, edges) = sample();
        assert!(smooth_graph(&signal, &nodes, &edges, 1, 1.5).is_err());
        assert!(smooth_graph(&signal, &nodes, &edges, 1, f64::NAN).is_err());
    }
}
