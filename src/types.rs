// src/types.rs
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::SimulationError;

pub type Vec3 = [f64; 3];

#[inline]
pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub fn norm(a: Vec3) -> f64 {
    (a[0] * a[0] + a[1] * a[1] + a[2] * a[2]).sqrt()
}

/// Evenly spaced samples over `[start, stop]`, endpoints included.
/// A single sample yields `[start]`.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { stop } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Total length of the polyline through the rows of `pts`.
pub fn polyline_length(pts: ArrayView2<f64>) -> f64 {
    (1..pts.nrows())
        .map(|i| {
            let a = pts.row(i - 1);
            let b = pts.row(i);
            norm([b[0] - a[0], b[1] - a[1], b[2] - a[2]])
        })
        .sum()
}

// 神经元曲线：采样点 + 单位切向量，生成后不可变
#[derive(Clone, Debug)]
pub struct NeuronCurve {
    pub pts: Array2<f64>,      // L x 3
    pub tangents: Array2<f64>, // L x 3
}

impl NeuronCurve {
    pub fn new(pts: Array2<f64>, tangents: Array2<f64>) -> Result<Self, SimulationError> {
        SimulationError::check_len("curve point columns", 3, pts.ncols())?;
        SimulationError::check_len("tangent rows", pts.nrows(), tangents.nrows())?;
        SimulationError::check_len("tangent columns", 3, tangents.ncols())?;
        Ok(Self { pts, tangents })
    }

    pub fn len(&self) -> usize {
        self.pts.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.pts.nrows() == 0
    }

    pub fn point(&self, i: usize) -> Vec3 {
        let row = self.pts.row(i);
        [row[0], row[1], row[2]]
    }

    pub fn arc_length(&self) -> f64 {
        polyline_length(self.pts.view())
    }
}

// 有向电流元：start -> end，电流可为负
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurrentSegment {
    pub start: Vec3,
    pub end: Vec3,
    pub current: f64,
}

impl CurrentSegment {
    pub fn midpoint(&self) -> Vec3 {
        [
            0.5 * (self.start[0] + self.end[0]),
            0.5 * (self.start[1] + self.end[1]),
            0.5 * (self.start[2] + self.end[2]),
        ]
    }

    pub fn dl(&self) -> Vec3 {
        sub(self.end, self.start)
    }
}

/// Column-major batch of segments, the layout the field solver consumes.
#[derive(Clone, Debug, Default)]
pub struct SegmentBatch {
    pub starts: Vec<Vec3>,
    pub ends: Vec<Vec3>,
    pub currents: Vec<f64>,
}

impl SegmentBatch {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            starts: Vec::with_capacity(capacity),
            ends: Vec::with_capacity(capacity),
            currents: Vec::with_capacity(capacity),
        }
    }

    pub fn extend(&mut self, segments: &[CurrentSegment]) {
        for seg in segments {
            self.starts.push(seg.start);
            self.ends.push(seg.end);
            self.currents.push(seg.current);
        }
    }

    pub fn len(&self) -> usize {
        self.currents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.currents.is_empty()
    }
}

// 平面传感器阵列 (NV 层)，行主序：x 变化最快
#[derive(Clone, Debug)]
pub struct SensorGrid {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub positions: Vec<Vec3>,
}

impl SensorGrid {
    pub fn from_axes(xs: Vec<f64>, ys: Vec<f64>, z: f64) -> Self {
        let mut positions = Vec::with_capacity(xs.len() * ys.len());
        for &y in &ys {
            for &x in &xs {
                positions.push([x, y, z]);
            }
        }
        Self { xs, ys, positions }
    }

    pub fn planar(area: PlacementArea, resolution: usize, z: f64) -> Self {
        let xs = linspace(area.xmin, area.xmax, resolution);
        let ys = linspace(area.ymin, area.ymax, resolution);
        Self::from_axes(xs, ys, z)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of sensors in one grid row.
    pub fn row_len(&self) -> usize {
        self.xs.len()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacementArea {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl PlacementArea {
    pub fn from_bounds(bounds: [f64; 4]) -> Self {
        Self {
            xmin: bounds[0],
            xmax: bounds[1],
            ymin: bounds[2],
            ymax: bounds[3],
        }
    }
}

// 投影轴
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldAxis {
    X,
    Y,
    /// Normal to the sensor plane.
    #[default]
    Z,
}

impl FieldAxis {
    pub fn index(self) -> usize {
        match self {
            FieldAxis::X => 0,
            FieldAxis::Y => 1,
            FieldAxis::Z => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    #[test]
    fn linspace_matches_endpoints() {
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(2.0, 3.0, 1), vec![2.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }
    #[test]
    fn sensor_grid_is_row_major_x_fastest() {
        let grid = SensorGrid::from_axes(vec![0.0, 1.0, 2.0], vec![10.0, 20.0], 0.5);
        assert_eq!(grid.len(), 6);
        assert_eq!(grid.row_len(), 3);
        assert_eq!(grid.positions[1], [1.0, 10.0, 0.5]);
        assert_eq!(grid.positions[3], [0.0, 20.0, 0.5]);
    }
    #[test]
    fn segment_midpoint_and_direction() {
        let seg = CurrentSegment {
            start: [1.0, -2.0, 0.5],
            end: [3.0, 2.0, 0.5],
            current: -0.25,
        };
        assert_eq!(seg.midpoint(), [2.0, 0.0, 0.5]);
        assert_eq!(seg.dl(), [2.0, 4.0, 0.0]);
    }
    #[test]
    fn polyline_length_sums_segments() {
        let pts = array![[0.0, 0.0, 0.0], [3.0, 4.0, 0.0], [3.0, 4.0, 2.0]];
        assert!((polyline_length(pts.view()) - 7.0).abs() < 1e-12);
    }
    #[test]
    fn curve_rejects_mismatched_tangents() {
        let pts = Array2::<f64>::zeros((4, 3));
        let tangents = Array2::<f64>::zeros((3, 3));
        assert!(matches!(
            NeuronCurve::new(pts, tangents),
            Err(SimulationError::ShapeMismatch { .. })
        ));
    }
}
