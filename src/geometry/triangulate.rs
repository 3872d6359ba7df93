use std::collections::HashMap;

use spade::handles::{FixedFaceHandle, FixedVertexHandle, InnerTag};
use spade::{ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation};

use crate::error::{Result, TessellationError};
use crate::math::polygon_2d::signed_area_2d;
use crate::math::Point2;
use crate::outline::Shape;

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// Triangulated cap of a shape: unique contour points and CCW triangles
/// indexing into them.
#[derive(Debug, Clone, Default)]
pub struct CapTriangulation {
    pub points: Vec<Point2>,
    pub triangles: Vec<[u32; 3]>,
}

/// Triangulates the interior of `shape` (holes excluded) with a
/// constrained Delaunay triangulation.
///
/// # Errors
///
/// Returns [`TessellationError::Failed`] if a ring has fewer than three
/// points, a coordinate cannot be inserted, or no interior triangle
/// remains.
#[allow(clippy::cast_possible_truncation)]
pub fn triangulate_shape(shape: &Shape) -> Result<CapTriangulation> {
    let mut cdt = Cdt::new();
    for ring in shape.rings() {
        insert_constraint_loop(&mut cdt, ring)?;
    }

    let interior = interior_mask(&cdt);

    let mut cap = CapTriangulation::default();
    let mut vertex_map: HashMap<usize, u32> = HashMap::new();

    for face in cdt.inner_faces() {
        if !interior[face.fix().index()] {
            continue;
        }
        let mut tri = [0u32; 3];
        for (slot, vh) in face.vertices().iter().enumerate() {
            let idx = vh.fix().index();
            tri[slot] = *vertex_map.entry(idx).or_insert_with(|| {
                let pos = vh.position();
                cap.points.push(Point2::new(pos.x, pos.y));
                (cap.points.len() - 1) as u32
            });
        }
        let corners = [
            cap.points[tri[0] as usize],
            cap.points[tri[1] as usize],
            cap.points[tri[2] as usize],
        ];
        if signed_area_2d(&corners) < 0.0 {
            tri.swap(1, 2);
        }
        cap.triangles.push(tri);
    }

    if cap.triangles.is_empty() {
        return Err(TessellationError::Failed("shape has no interior triangles".into()).into());
    }
    Ok(cap)
}

/// Inserts a closed loop of points as constraint edges.
///
/// Edges that would cross an existing constraint are skipped: real-world
/// outlines are occasionally self-touching and a partial boundary still
/// yields a usable cap.
fn insert_constraint_loop(cdt: &mut Cdt, points: &[Point2]) -> Result<()> {
    if points.len() < 3 {
        return Err(
            TessellationError::Failed("constraint loop needs at least 3 points".into()).into(),
        );
    }

    let mut handles: Vec<FixedVertexHandle> = Vec::with_capacity(points.len());
    for p in points {
        let h = cdt
            .insert(SpadePoint2::new(p.x, p.y))
            .map_err(|e: InsertionError| TessellationError::Failed(format!("CDT insert: {e}")))?;
        handles.push(h);
    }

    for i in 0..handles.len() {
        let from = handles[i];
        let to = handles[(i + 1) % handles.len()];
        if from == to {
            continue;
        }
        if cdt.can_add_constraint(from, to) {
            cdt.add_constraint(from, to);
        } else {
            tracing::trace!(edge = i, "skipping crossing constraint edge");
        }
    }

    Ok(())
}

/// Marks the faces of a cap triangulation that lie inside the shape,
/// indexed by face index.
///
/// The walk starts on the hull and flips sides each time it steps across
/// a ring edge. Ring edges skipped during insertion are not constraints,
/// so faces next to them take the side of the face they were reached from.
fn interior_mask(cdt: &Cdt) -> Vec<bool> {
    let mut side: Vec<Option<bool>> = vec![None; cdt.num_all_faces()];
    let mut pending: Vec<(FixedFaceHandle<InnerTag>, bool)> = Vec::new();

    for hull_edge in cdt.convex_hull() {
        let face = hull_edge.face().as_inner().or_else(|| hull_edge.rev().face().as_inner());
        if let Some(face) = face {
            let on_ring = cdt.is_constraint_edge(hull_edge.as_undirected().fix());
            pending.push((face.fix(), on_ring));
        }
    }

    while let Some((face, inside)) = pending.pop() {
        if side[face.index()].is_some() {
            continue;
        }
        side[face.index()] = Some(inside);
        for edge in cdt.face(face).adjacent_edges() {
            let Some(next) = edge.rev().face().as_inner() else {
                continue;
            };
            if side[next.fix().index()].is_none() {
                let crosses_ring = cdt.is_constraint_edge(edge.as_undirected().fix());
                pending.push((next.fix(), inside != crosses_ring));
            }
        }
    }

    side.into_iter().map(|s| s == Some(true)).collect()
}
