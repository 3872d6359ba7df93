//! Frame submission: the post-processing chain, the backend seam and a
//! headless backend that records what it would draw.

mod post;
pub mod shaders;

pub use post::{OutlineParams, Pass, PostProcessing};
pub use shaders::ShaderSource;

use crate::error::Result;
use crate::geometry::GeometryStore;
use crate::picking::Selection;
use crate::scene::{Material, Scene, Viewport};

/// Everything a backend needs to draw one frame.
pub struct FrameContext<'a> {
    pub scene: &'a Scene,
    pub store: &'a GeometryStore,
    pub post: &'a PostProcessing,
    pub selection: &'a Selection,
    /// Seconds since startup; drives the outline pulse.
    pub elapsed: f64,
}

/// Drawing surface abstraction.
pub trait RenderBackend {
    /// Called whenever the surface changes size.
    fn resize(&mut self, viewport: Viewport, pixel_ratio: f64);

    /// Draws one frame.
    ///
    /// # Errors
    ///
    /// Returns an error if a mesh references geometry missing from the
    /// store.
    fn render(&mut self, frame: &FrameContext<'_>) -> Result<()>;
}

/// Summary of one frame drawn by [`HeadlessBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub meshes: usize,
    pub triangles: usize,
    pub selected: usize,
    pub passes: Vec<&'static str>,
    /// Distinct custom programs the frame needs, from passes and materials.
    pub programs: Vec<ShaderSource>,
    pub viewport: Viewport,
    pub outline_strength: Option<f64>,
}

/// Backend without a GPU. Keeps a record of every frame.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    pub frames: Vec<FrameRecord>,
    pub surface: Option<(Viewport, f64)>,
}

impl HeadlessBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn last_frame(&self) -> Option<&FrameRecord> {
        self.frames.last()
    }
}

impl RenderBackend for HeadlessBackend {
    fn resize(&mut self, viewport: Viewport, pixel_ratio: f64) {
        self.surface = Some((viewport, pixel_ratio));
    }

    fn render(&mut self, frame: &FrameContext<'_>) -> Result<()> {
        let mut triangles = 0;
        let mut programs: Vec<ShaderSource> = Vec::new();
        for (_, mesh) in frame.scene.group.iter() {
            triangles += frame.store.get(mesh.geometry)?.triangle_count();
            let source = frame.scene.palette.get(mesh.material).and_then(Material::shader_source);
            if let Some(source) = source.filter(|s| !programs.contains(s)) {
                programs.push(source);
            }
        }
        for source in frame.post.passes().iter().filter_map(Pass::shader_source) {
            if !programs.contains(&source) {
                programs.push(source);
            }
        }
        let selected = frame
            .selection
            .objects
            .iter()
            .filter(|id| frame.scene.group.get(**id).is_some())
            .count();
        self.frames.push(FrameRecord {
            meshes: frame.scene.group.len(),
            triangles,
            selected,
            passes: frame.post.passes().iter().map(Pass::name).collect(),
            programs,
            viewport: frame.scene.camera.viewport(),
            outline_strength: frame.post.outline().map(|o| o.strength_at(frame.elapsed)),
        });
        Ok(())
    }
}

/// Elapsed-time accumulator for the render loop.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameClock {
    elapsed: f64,
    frames: u64,
}

impl FrameClock {
    /// Adds `dt` seconds and counts a frame. Negative or non-finite
    /// deltas count the frame without advancing time.
    pub fn tick(&mut self, dt: f64) -> f64 {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
        self.frames += 1;
        self.elapsed
    }

    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}
