//! Pointer picking against the extruded meshes.

use crate::geometry::GeometryStore;
use crate::math::{Point2, Point3};
use crate::scene::{Camera, MeshGroup, MeshId};

/// Nearest mesh under the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub mesh: MeshId,
    /// World-space distance from the ray origin.
    pub distance: f64,
    /// World-space hit point.
    pub point: Point3,
}

/// Casts a ray through a point in normalized device coordinates and
/// returns the nearest intersected mesh.
pub struct Picker {
    ndc: Point2,
}

impl Picker {
    #[must_use]
    pub fn new(ndc: Point2) -> Self {
        Self { ndc }
    }

    /// Executes the pick. Meshes whose geometry is missing from `store`
    /// are ignored.
    #[must_use]
    pub fn execute(&self, camera: &Camera, group: &MeshGroup, store: &GeometryStore) -> Option<PickHit> {
        let world_ray = camera.ray_from_ndc(&self.ndc)?;
        let world = group.world_matrix();
        let inverse = world.try_inverse()?;
        let local_ray = world_ray.transform(&inverse);

        let mut best: Option<PickHit> = None;
        for (id, mesh) in group.iter() {
            let Ok(geometry) = store.get(mesh.geometry) else {
                continue;
            };
            if local_ray.intersect_aabb(&geometry.bounding_box).is_none() {
                continue;
            }
            for [a, b, c] in geometry.triangles() {
                let Some(t) = local_ray.intersect_triangle(&a, &b, &c) else {
                    continue;
                };
                let point = world.transform_point(&local_ray.at(t));
                let distance = (point - world_ray.origin).norm();
                if best.map_or(true, |h| distance < h.distance) {
                    best = Some(PickHit {
                        mesh: id,
                        distance,
                        point,
                    });
                }
            }
        }
        best
    }
}

/// Meshes currently highlighted by the outline pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub objects: Vec<MeshId>,
}

impl Selection {
    /// Replaces the selection with `mesh` alone.
    pub fn select_only(&mut self, mesh: MeshId) {
        self.objects.clear();
        self.objects.push(mesh);
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }

    #[must_use]
    pub fn contains(&self, mesh: MeshId) -> bool {
        self.objects.contains(&mesh)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Updates the selection from a pick result. A miss clears only when
    /// `clear_on_miss` is set. Returns `true` if the selection changed.
    pub fn apply_pick(&mut self, hit: Option<&PickHit>, clear_on_miss: bool) -> bool {
        match hit {
            Some(hit) => {
                if self.objects.len() == 1 && self.objects[0] == hit.mesh {
                    return false;
                }
                self.select_only(hit.mesh);
                tracing::debug!(mesh = ?hit.mesh, distance = hit.distance, "selection changed");
                true
            }
            None if clear_on_miss && !self.is_empty() => {
                self.clear();
                tracing::debug!("selection cleared");
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use crate::data::RegionId;
    use crate::geometry::{Extrude, ExtrudeSettings};
    use crate::outline::Shape;
    use crate::scene::{ExtrudedMesh, Material, MaterialPalette, Viewport};

    fn add_box(group: &mut MeshGroup, store: &mut GeometryStore, region: u32, half: f64, depth: f64) -> MeshId {
        let palette = MaterialPalette::new(Material::height_gradient());
        let shape = Shape::new(
            vec![
                Point2::new(-half, -half),
                Point2::new(half, -half),
                Point2::new(half, half),
                Point2::new(-half, half),
            ],
            vec![],
        );
        let geometry = Extrude::new(&shape, ExtrudeSettings::new(depth, 1)).execute().unwrap();
        let geometry = store.insert(geometry);
        group.add(ExtrudedMesh {
            region_id: RegionId(region),
            category: "A".into(),
            shape,
            depth,
            geometry,
            material: palette.resolve("A").unwrap(),
        })
    }

    fn camera() -> Camera {
        Camera::from_config(&CameraConfig::default(), Viewport::new(1280, 720))
    }

    #[test]
    fn center_ray_hits_mesh_under_target() {
        let mut group = MeshGroup::new();
        let mut store = GeometryStore::new();
        let id = add_box(&mut group, &mut store, 1, 50.0, 10.0);
        group.recenter(&store).unwrap();

        let hit = Picker::new(Point2::origin()).execute(&camera(), &group, &store).unwrap();
        assert_eq!(hit.mesh, id);
        assert!(hit.distance > 0.0);
    }

    #[test]
    fn corner_ray_misses() {
        let mut group = MeshGroup::new();
        let mut store = GeometryStore::new();
        add_box(&mut group, &mut store, 1, 50.0, 10.0);
        group.recenter(&store).unwrap();

        let hit = Picker::new(Point2::new(0.95, 0.95)).execute(&camera(), &group, &store);
        assert!(hit.is_none());
    }

    #[test]
    fn nearest_mesh_wins() {
        let mut group = MeshGroup::new();
        let mut store = GeometryStore::new();
        add_box(&mut group, &mut store, 1, 40.0, 10.0);
        let tall = add_box(&mut group, &mut store, 2, 40.0, 30.0);
        group.recenter(&store).unwrap();

        let hit = Picker::new(Point2::origin()).execute(&camera(), &group, &store).unwrap();
        assert_eq!(hit.mesh, tall);
    }

    #[test]
    fn disposed_geometry_is_skipped() {
        let mut group = MeshGroup::new();
        let mut store = GeometryStore::new();
        let id = add_box(&mut group, &mut store, 1, 50.0, 10.0);
        store.dispose(group.get(id).unwrap().geometry);
        assert!(Picker::new(Point2::origin()).execute(&camera(), &group, &store).is_none());
    }

    #[test]
    fn miss_keeps_selection_unless_configured() {
        let mut group = MeshGroup::new();
        let mut store = GeometryStore::new();
        let id = add_box(&mut group, &mut store, 1, 50.0, 10.0);
        let hit = PickHit {
            mesh: id,
            distance: 1.0,
            point: Point3::origin(),
        };

        let mut selection = Selection::default();
        assert!(selection.apply_pick(Some(&hit), false));
        assert!(!selection.apply_pick(Some(&hit), false));
        assert!(!selection.apply_pick(None, false));
        assert!(selection.contains(id));
        assert!(selection.apply_pick(None, true));
        assert!(selection.is_empty());
    }
}
