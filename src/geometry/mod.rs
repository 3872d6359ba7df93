mod extrude;
mod store;
pub mod triangulate;

pub use extrude::{Extrude, ExtrudeSettings};
pub use store::{GeometryId, GeometryStore};

use serde::{Deserialize, Serialize};

use crate::math::{Aabb, Point3, Vector3, TOLERANCE};

/// Derives the number of depth subdivisions from the extrusion depth so
/// tall columns keep enough side vertices for smooth shading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepPolicy {
    /// Depth covered by one side-wall layer.
    pub step_height: f64,
    /// Upper bound on layers per extrusion.
    pub max_steps: u32,
}

impl Default for StepPolicy {
    fn default() -> Self {
        Self {
            step_height: 5.0,
            max_steps: 16,
        }
    }
}

impl StepPolicy {
    /// Number of layers for `depth`, at least one.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn steps_for(&self, depth: f64) -> u32 {
        if !(depth > 0.0 && self.step_height > 0.0) || !depth.is_finite() {
            return 1;
        }
        let max = self.max_steps.max(1);
        let raw = (depth / self.step_height).ceil();
        (raw.min(f64::from(max)) as u32).max(1)
    }
}

/// Triangle mesh produced by extrusion.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    /// Vertex positions.
    pub positions: Vec<Point3>,
    /// Vertex normals, one per position.
    pub normals: Vec<Vector3>,
    /// Triangle indices (each triple defines a triangle).
    pub indices: Vec<[u32; 3]>,
    /// Bounds of `positions`, refreshed by [`compute_bounding_box`](Self::compute_bounding_box).
    pub bounding_box: Aabb,
}

impl Geometry {
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Iterates triangles as corner positions.
    pub fn triangles(&self) -> impl Iterator<Item = [Point3; 3]> + '_ {
        self.indices.iter().map(|t| {
            [
                self.positions[t[0] as usize],
                self.positions[t[1] as usize],
                self.positions[t[2] as usize],
            ]
        })
    }

    /// Recomputes vertex normals as the area-weighted sum of adjacent
    /// face normals.
    pub fn compute_vertex_normals(&mut self) {
        let mut acc = vec![Vector3::zeros(); self.positions.len()];
        for t in &self.indices {
            let [a, b, c] = t.map(|i| self.positions[i as usize]);
            let face = (b - a).cross(&(c - a));
            for &i in t {
                acc[i as usize] += face;
            }
        }
        self.normals = acc
            .into_iter()
            .map(|n| {
                let len = n.norm();
                if len < TOLERANCE {
                    Vector3::z()
                } else {
                    n / len
                }
            })
            .collect();
    }

    pub fn compute_bounding_box(&mut self) {
        self.bounding_box = Aabb::from_points(&self.positions);
    }
}
