use std::f64::consts::PI;

use nalgebra::UnitQuaternion;

use crate::config::ControlsConfig;
use crate::math::{Vector3, TOLERANCE};

use super::camera::{Camera, Projection};

const POLE_EPS: f64 = 1e-6;

/// Map-style orbit controls: rotate around the target, pan the target,
/// dolly toward it. Input accumulates as pending deltas that
/// [`update`](Self::update) applies once per frame, with damping if enabled.
#[derive(Debug, Clone)]
pub struct MapControls {
    pub enable_damping: bool,
    pub damping_factor: f64,
    pub screen_space_panning: bool,
    pub min_distance: f64,
    pub max_distance: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub min_polar_angle: f64,
    pub max_polar_angle: f64,
    theta_delta: f64,
    phi_delta: f64,
    pan_offset: Vector3,
    dolly_factor: f64,
}

impl MapControls {
    #[must_use]
    pub fn from_config(config: &ControlsConfig) -> Self {
        Self {
            enable_damping: config.enable_damping,
            damping_factor: config.damping_factor,
            screen_space_panning: config.screen_space_panning,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            min_polar_angle: 0.0,
            max_polar_angle: config.max_polar_angle,
            theta_delta: 0.0,
            phi_delta: 0.0,
            pan_offset: Vector3::zeros(),
            dolly_factor: 1.0,
        }
    }

    /// Queues a rotation: `azimuth` around the up axis, `polar` away from it.
    pub fn rotate(&mut self, azimuth: f64, polar: f64) {
        self.theta_delta -= azimuth;
        self.phi_delta -= polar;
    }

    /// Queues a pan of the target by `(dx, dy)` world units. Without
    /// screen-space panning, `dy` moves along the ground plane instead of
    /// the camera's up axis.
    pub fn pan(&mut self, dx: f64, dy: f64, camera: &Camera) {
        let forward = camera.forward();
        let right = forward.cross(&camera.up);
        let right = if right.norm() > TOLERANCE {
            right.normalize()
        } else {
            Vector3::x()
        };
        let vertical = if self.screen_space_panning {
            right.cross(&forward).normalize()
        } else {
            let v = camera.up.cross(&right);
            if v.norm() > TOLERANCE {
                v.normalize()
            } else {
                camera.up
            }
        };
        self.pan_offset += right * dx + vertical * dy;
    }

    /// Queues a dolly; `factor > 1` moves closer (or zooms in).
    pub fn dolly(&mut self, factor: f64) {
        if factor > 0.0 && factor.is_finite() {
            self.dolly_factor *= factor;
        }
    }

    /// Applies pending input to `camera`. Returns `true` if the camera moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let up = camera.up.normalize();
        let to_y_up = UnitQuaternion::rotation_between(&up, &Vector3::y())
            .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI));

        let offset = to_y_up * (camera.position - camera.target);
        let mut radius = offset.norm();
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = if radius > 0.0 {
            (offset.y / radius).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        };

        let step = if self.enable_damping { self.damping_factor } else { 1.0 };
        theta += self.theta_delta * step;
        phi += self.phi_delta * step;
        phi = phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(POLE_EPS, PI - POLE_EPS);

        let old_zoom = camera.zoom;
        match camera.projection {
            Projection::Perspective { .. } => radius /= self.dolly_factor,
            Projection::Orthographic { .. } => {
                camera.zoom = (camera.zoom * self.dolly_factor).clamp(self.min_zoom, self.max_zoom);
            }
        }
        radius = radius.clamp(self.min_distance, self.max_distance);

        let old_position = camera.position;
        let pan = self.pan_offset * step;
        camera.target += pan;

        let new_offset = Vector3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        camera.position = camera.target + to_y_up.inverse() * new_offset;

        if self.enable_damping {
            self.theta_delta *= 1.0 - self.damping_factor;
            self.phi_delta *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.theta_delta = 0.0;
            self.phi_delta = 0.0;
            self.pan_offset = Vector3::zeros();
        }
        self.dolly_factor = 1.0;

        let zoom_changed = (camera.zoom - old_zoom).abs() > TOLERANCE;
        if zoom_changed {
            camera.update_projection();
        }
        zoom_changed || (camera.position - old_position).norm() > 1e-9 || pan.norm() > 1e-9
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::{CameraConfig, ProjectionKind};
    use crate::scene::camera::Viewport;
    use approx::assert_relative_eq;

    fn camera(projection: ProjectionKind) -> Camera {
        let config = CameraConfig {
            projection,
            ..CameraConfig::default()
        };
        Camera::from_config(&config, Viewport::new(800, 600))
    }

    #[test]
    fn idle_update_keeps_camera_in_place() {
        let mut cam = camera(ProjectionKind::Orthographic);
        let before = cam.position;
        let mut controls = MapControls::from_config(&ControlsConfig::default());
        assert!(!controls.update(&mut cam));
        assert_relative_eq!(cam.position, before, epsilon = 1e-9);
    }

    #[test]
    fn damped_rotation_converges_to_requested_angle() {
        let mut cam = camera(ProjectionKind::Orthographic);
        let start = cam.position - cam.target;
        let mut controls = MapControls::from_config(&ControlsConfig::default());
        controls.rotate(0.3, 0.0);
        for _ in 0..600 {
            controls.update(&mut cam);
        }
        let end = cam.position - cam.target;
        let start_theta = start.x.atan2(start.z);
        let end_theta = end.x.atan2(end.z);
        assert_relative_eq!(start_theta - end_theta, 0.3, epsilon = 1e-6);
        assert_relative_eq!(end.norm(), start.norm(), epsilon = 1e-6);
    }

    #[test]
    fn perspective_dolly_clamps_to_min_distance() {
        let mut cam = camera(ProjectionKind::Perspective);
        let mut controls = MapControls::from_config(&ControlsConfig::default());
        controls.dolly(100.0);
        controls.update(&mut cam);
        assert_relative_eq!((cam.position - cam.target).norm(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn orthographic_dolly_changes_zoom_within_bounds() {
        let mut cam = camera(ProjectionKind::Orthographic);
        let mut controls = MapControls::from_config(&ControlsConfig::default());
        controls.dolly(2.0);
        assert!(controls.update(&mut cam));
        assert_relative_eq!(cam.zoom, 3.8);
        controls.dolly(1_000.0);
        controls.update(&mut cam);
        assert_relative_eq!(cam.zoom, 20.0);
    }

    #[test]
    fn pan_without_damping_moves_target_once() {
        let mut cam = camera(ProjectionKind::Orthographic);
        let config = ControlsConfig {
            enable_damping: false,
            ..ControlsConfig::default()
        };
        let mut controls = MapControls::from_config(&config);
        let before = cam.target;
        controls.pan(10.0, 0.0, &cam);
        controls.update(&mut cam);
        assert_relative_eq!((cam.target - before).norm(), 10.0, epsilon = 1e-9);
        let after_first = cam.target;
        controls.update(&mut cam);
        assert_relative_eq!(cam.target, after_first);
    }
}
