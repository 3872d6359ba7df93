//! Scene graph: the extruded mesh group, camera, lights and gizmos.

pub mod camera;
pub mod controls;
mod material;

pub use camera::{Camera, Projection, Viewport};
pub use controls::MapControls;
pub use material::{Material, MaterialId, MaterialPalette, ParseRgbError, Rgb};

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::config::AppConfig;
use crate::data::RegionId;
use crate::error::Result;
use crate::geometry::{GeometryId, GeometryStore};
use crate::math::{Aabb, Matrix4, Vector3};
use crate::outline::Shape;

slotmap::new_key_type! {
    /// Unique identifier for an extruded mesh. Stable across geometry
    /// replacement.
    pub struct MeshId;
}

/// One extruded shape of one region.
#[derive(Debug, Clone)]
pub struct ExtrudedMesh {
    pub region_id: RegionId,
    /// Category of the record currently driving this mesh.
    pub category: String,
    /// Flat source shape, kept so the geometry can be regenerated.
    pub shape: Shape,
    /// Depth the current geometry was extruded with.
    pub depth: f64,
    pub geometry: GeometryId,
    pub material: MaterialId,
}

/// Group holding every extruded mesh under a shared transform.
#[derive(Debug)]
pub struct MeshGroup {
    meshes: SlotMap<MeshId, ExtrudedMesh>,
    pub position: Vector3,
    pub scale: Vector3,
}

impl MeshGroup {
    #[must_use]
    pub fn new() -> Self {
        Self {
            meshes: SlotMap::with_key(),
            position: Vector3::zeros(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn add(&mut self, mesh: ExtrudedMesh) -> MeshId {
        self.meshes.insert(mesh)
    }

    #[must_use]
    pub fn get(&self, id: MeshId) -> Option<&ExtrudedMesh> {
        self.meshes.get(id)
    }

    pub fn get_mut(&mut self, id: MeshId) -> Option<&mut ExtrudedMesh> {
        self.meshes.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeshId, &ExtrudedMesh)> {
        self.meshes.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = MeshId> + '_ {
        self.meshes.keys()
    }

    /// Meshes belonging to `region` (one per sub-shape).
    pub fn by_region(&self, region: RegionId) -> impl Iterator<Item = (MeshId, &ExtrudedMesh)> {
        self.meshes.iter().filter(move |(_, m)| m.region_id == region)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Local-to-world transform: scale, then translate.
    #[must_use]
    pub fn world_matrix(&self) -> Matrix4 {
        Matrix4::new_translation(&self.position) * Matrix4::new_nonuniform_scaling(&self.scale)
    }

    /// World-space bounds of every mesh's current geometry.
    ///
    /// # Errors
    ///
    /// Returns an error if a mesh references a disposed geometry.
    pub fn world_bounds(&self, store: &GeometryStore) -> Result<Aabb> {
        let world = self.world_matrix();
        let mut bounds = Aabb::empty();
        for mesh in self.meshes.values() {
            let geometry = store.get(mesh.geometry)?;
            bounds = bounds.union(&geometry.bounding_box.transformed(&world));
        }
        Ok(bounds)
    }

    /// Flips the group vertically (outline coordinates grow downward) and
    /// moves it so its world bounds are centered on the origin.
    ///
    /// # Errors
    ///
    /// Returns an error if a mesh references a disposed geometry.
    pub fn recenter(&mut self, store: &GeometryStore) -> Result<()> {
        self.position = Vector3::zeros();
        self.scale = Vector3::new(1.0, -1.0, 1.0);
        let bounds = self.world_bounds(store)?;
        if !bounds.is_empty() {
            self.position = -bounds.center().coords;
        }
        tracing::debug!(offset = ?self.position, "recentered mesh group");
        Ok(())
    }
}

impl Default for MeshGroup {
    fn default() -> Self {
        Self::new()
    }
}

/// Light source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Light {
    Ambient {
        color: Rgb,
        intensity: f64,
    },
    Directional {
        color: Rgb,
        intensity: f64,
        position: [f64; 3],
    },
}

/// Debug gizmo drawn alongside the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Helper {
    Axes { size: f64 },
    CameraFrustum,
}

/// Everything the render loop draws.
#[derive(Debug)]
pub struct Scene {
    pub group: MeshGroup,
    pub palette: MaterialPalette,
    pub camera: Camera,
    pub lights: Vec<Light>,
    pub helpers: Vec<Helper>,
}

impl Scene {
    /// Empty scene with camera, lights, gizmos and palette from `config`.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let viewport = Viewport::new(config.surface.width, config.surface.height);
        let mut palette = MaterialPalette::new(Material::height_gradient());
        for (category, color) in &config.scene.category_colors {
            palette.assign(category.clone(), Material::Solid { color: *color });
        }
        let mut helpers = Vec::new();
        if let Some(size) = config.scene.axes_size {
            helpers.push(Helper::Axes { size });
        }
        if config.scene.camera_helper {
            helpers.push(Helper::CameraFrustum);
        }
        Self {
            group: MeshGroup::new(),
            palette,
            camera: Camera::from_config(&config.camera, viewport),
            lights: config.scene.lights.clone(),
            helpers,
        }
    }
}
