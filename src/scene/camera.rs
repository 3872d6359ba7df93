use nalgebra::{Orthographic3, Perspective3};

use crate::config::{CameraConfig, ProjectionKind};
use crate::math::{Matrix4, Point2, Point3, Ray, Vector3};

/// Pixel size of the render surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height; 1 for a zero-height viewport.
    #[must_use]
    pub fn aspect(&self) -> f64 {
        if self.height == 0 {
            1.0
        } else {
            f64::from(self.width) / f64::from(self.height)
        }
    }

    /// Maps a pixel position (origin top-left) to normalized device
    /// coordinates in `[-1, 1]`, y up.
    #[must_use]
    pub fn pointer_to_ndc(&self, x: f64, y: f64) -> Point2 {
        let w = f64::from(self.width.max(1));
        let h = f64::from(self.height.max(1));
        Point2::new(x / w * 2.0 - 1.0, -(y / h) * 2.0 + 1.0)
    }
}

/// Projection model with its live parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Frustum planes in world units, before zoom.
    Orthographic {
        left: f64,
        right: f64,
        top: f64,
        bottom: f64,
    },
    /// Vertical field of view in degrees.
    Perspective { fov: f64, aspect: f64 },
}

/// Scene camera looking from `position` toward `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub projection: Projection,
    pub position: Point3,
    pub target: Point3,
    pub up: Vector3,
    pub near: f64,
    pub far: f64,
    pub zoom: f64,
    viewport: Viewport,
    projection_matrix: Matrix4,
}

impl Camera {
    /// Creates a camera for `viewport`. Orthographic frustum planes follow
    /// the viewport in pixels, centered on the view axis.
    #[must_use]
    pub fn from_config(config: &CameraConfig, viewport: Viewport) -> Self {
        let projection = match config.projection {
            ProjectionKind::Orthographic => ortho_planes(viewport),
            ProjectionKind::Perspective => Projection::Perspective {
                fov: config.fov,
                aspect: viewport.aspect(),
            },
        };
        let [px, py, pz] = config.position;
        let [tx, ty, tz] = config.target;
        let mut camera = Self {
            projection,
            position: Point3::new(px, py, pz),
            target: Point3::new(tx, ty, tz),
            up: Vector3::y(),
            near: config.near,
            far: config.far,
            zoom: config.zoom,
            viewport,
            projection_matrix: Matrix4::identity(),
        };
        camera.update_projection();
        camera
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Adapts the projection to a new surface size and refreshes the
    /// projection matrix.
    ///
    /// A surface with a zero dimension (hidden or minimized) is recorded
    /// but keeps the previous projection until it has an area again.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if viewport.width == 0 || viewport.height == 0 {
            tracing::debug!(width = viewport.width, height = viewport.height, "empty viewport; keeping projection");
            return;
        }
        self.projection = match self.projection {
            Projection::Orthographic { .. } => ortho_planes(viewport),
            Projection::Perspective { fov, .. } => Projection::Perspective {
                fov,
                aspect: viewport.aspect(),
            },
        };
        self.update_projection();
    }

    /// Recomputes the cached projection matrix. Call after editing
    /// `near`, `far`, `zoom` or `projection` directly.
    pub fn update_projection(&mut self) {
        self.projection_matrix = match self.projection {
            Projection::Orthographic {
                left,
                right,
                top,
                bottom,
            } => {
                let zoom = self.zoom.max(f64::EPSILON);
                let cx = (left + right) * 0.5;
                let cy = (top + bottom) * 0.5;
                let dx = (right - left) / (2.0 * zoom);
                let dy = (top - bottom) / (2.0 * zoom);
                Orthographic3::new(cx - dx, cx + dx, cy - dy, cy + dy, self.near, self.far)
                    .to_homogeneous()
            }
            Projection::Perspective { fov, aspect } => {
                Perspective3::new(aspect, fov.to_radians(), self.near, self.far).to_homogeneous()
            }
        };
    }

    #[must_use]
    pub fn projection_matrix(&self) -> &Matrix4 {
        &self.projection_matrix
    }

    #[must_use]
    pub fn view_matrix(&self) -> Matrix4 {
        Matrix4::look_at_rh(&self.position, &self.target, &self.effective_up())
    }

    /// Unit vector from `position` toward `target`.
    #[must_use]
    pub fn forward(&self) -> Vector3 {
        let d = self.target - self.position;
        if d.norm() > 0.0 {
            d.normalize()
        } else {
            -Vector3::z()
        }
    }

    /// Ray through a point in normalized device coordinates.
    ///
    /// Orthographic rays start on the near plane and run parallel to the
    /// view axis; perspective rays start at the eye.
    #[must_use]
    pub fn ray_from_ndc(&self, ndc: &Point2) -> Option<Ray> {
        let inv = (self.projection_matrix * self.view_matrix()).try_inverse()?;
        let near = inv.transform_point(&Point3::new(ndc.x, ndc.y, -1.0));
        match self.projection {
            Projection::Orthographic { .. } => Some(Ray::new(near, self.forward())),
            Projection::Perspective { .. } => {
                let mid = inv.transform_point(&Point3::new(ndc.x, ndc.y, 0.5));
                Some(Ray::new(self.position, mid - self.position))
            }
        }
    }

    /// `up`, nudged when it is parallel to the view direction so the view
    /// matrix stays well defined.
    fn effective_up(&self) -> Vector3 {
        let forward = self.forward();
        if forward.cross(&self.up).norm() < 1e-6 {
            Vector3::z()
        } else {
            self.up
        }
    }
}

fn ortho_planes(viewport: Viewport) -> Projection {
    let w = f64::from(viewport.width);
    let h = f64::from(viewport.height);
    Projection::Orthographic {
        left: -w / 2.0,
        right: w / 2.0,
        top: h / 2.0,
        bottom: -h / 2.0,
    }
}
