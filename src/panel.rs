//! Live parameter panel.
//!
//! The panel validates edits and applies them to the camera and the
//! post-processing chain. Period edits are handed back to the caller,
//! which owns the transition controller.

use crate::data::Period;
use crate::render::PostProcessing;
use crate::scene::{Camera, Rgb};

/// Numeric parameter exposed by the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelParam {
    CameraX,
    CameraY,
    CameraZ,
    Near,
    Far,
    PixelSize,
    EdgeStrength,
    EdgeGlow,
    EdgeThickness,
    PulsePeriod,
}

impl PanelParam {
    pub const ALL: [Self; 10] = [
        Self::CameraX,
        Self::CameraY,
        Self::CameraZ,
        Self::Near,
        Self::Far,
        Self::PixelSize,
        Self::EdgeStrength,
        Self::EdgeGlow,
        Self::EdgeThickness,
        Self::PulsePeriod,
    ];

    /// `(min, max, step)`; a `None` step is continuous.
    #[must_use]
    pub fn range(self) -> (f64, f64, Option<f64>) {
        match self {
            Self::CameraX => (-300.0, 1300.0, Some(10.0)),
            Self::CameraY => (-300.0, 300.0, Some(10.0)),
            Self::CameraZ => (-300.0, 600.0, Some(5.0)),
            Self::Near => (0.1, 100.0, None),
            Self::Far => (200.0, 1000.0, None),
            Self::PixelSize => (1.0, 20.0, Some(1.0)),
            Self::EdgeStrength => (0.01, 10.0, None),
            Self::EdgeGlow => (0.0, 1.0, None),
            Self::EdgeThickness => (1.0, 4.0, None),
            Self::PulsePeriod => (0.0, 5.0, None),
        }
    }

    /// Clamps `value` into range and snaps it to the step grid.
    #[must_use]
    pub fn normalize(self, value: f64) -> f64 {
        let (min, max, step) = self.range();
        let clamped = value.clamp(min, max);
        match step {
            Some(step) => (min + ((clamped - min) / step).round() * step).clamp(min, max),
            None => clamped,
        }
    }
}

/// Color parameter exposed by the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorParam {
    VisibleEdge,
    HiddenEdge,
}

/// One edit made in the panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelChange {
    Number(PanelParam, f64),
    Color(ColorParam, Rgb),
    Period(Period),
}

/// Outcome of [`DebugPanel::apply`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelEffect {
    /// Camera position or projection changed.
    Camera,
    /// A post-processing uniform changed.
    Post,
    /// A valid period was picked; the caller starts the transition.
    PeriodSelected(Period),
    /// The edit was invalid and nothing changed.
    Rejected,
}

/// Panel state: the enumerated periods and the current selection.
#[derive(Debug, Clone)]
pub struct DebugPanel {
    periods: Vec<Period>,
    period: Option<Period>,
}

impl DebugPanel {
    /// Creates a panel offering `periods`; the first one starts selected.
    #[must_use]
    pub fn new(periods: Vec<Period>) -> Self {
        let period = periods.first().copied();
        Self { periods, period }
    }

    #[must_use]
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    #[must_use]
    pub fn period(&self) -> Option<Period> {
        self.period
    }

    /// Marks `period` as selected when it is one of the offered periods.
    /// Returns `false` otherwise.
    pub fn sync_period(&mut self, period: Period) -> bool {
        if self.periods.contains(&period) {
            self.period = Some(period);
            true
        } else {
            false
        }
    }

    /// Applies `change`. Numbers are clamped and snapped; non-finite
    /// numbers and unlisted periods are rejected.
    pub fn apply(&mut self, change: PanelChange, camera: &mut Camera, post: &mut PostProcessing) -> PanelEffect {
        match change {
            PanelChange::Number(param, value) => {
                if !value.is_finite() {
                    tracing::warn!(?param, value, "rejecting non-finite panel value");
                    return PanelEffect::Rejected;
                }
                let v = param.normalize(value);
                if (v - value).abs() > f64::EPSILON {
                    tracing::debug!(?param, requested = value, applied = v, "panel value adjusted");
                }
                Self::apply_number(param, v, camera, post)
            }
            PanelChange::Color(param, color) => {
                let Some(outline) = post.outline_mut() else {
                    return PanelEffect::Rejected;
                };
                match param {
                    ColorParam::VisibleEdge => outline.visible_edge_color = color,
                    ColorParam::HiddenEdge => outline.hidden_edge_color = color,
                }
                PanelEffect::Post
            }
            PanelChange::Period(period) => {
                if !self.sync_period(period) {
                    tracing::warn!(%period, "period is not selectable");
                    return PanelEffect::Rejected;
                }
                PanelEffect::PeriodSelected(period)
            }
        }
    }

    fn apply_number(param: PanelParam, v: f64, camera: &mut Camera, post: &mut PostProcessing) -> PanelEffect {
        match param {
            PanelParam::CameraX => camera.position.x = v,
            PanelParam::CameraY => camera.position.y = v,
            PanelParam::CameraZ => camera.position.z = v,
            PanelParam::Near => {
                if v >= camera.far {
                    tracing::warn!(near = v, far = camera.far, "near plane must stay below far");
                    return PanelEffect::Rejected;
                }
                camera.near = v;
                camera.update_projection();
            }
            PanelParam::Far => {
                if v <= camera.near {
                    tracing::warn!(near = camera.near, far = v, "far plane must stay above near");
                    return PanelEffect::Rejected;
                }
                camera.far = v;
                camera.update_projection();
            }
            PanelParam::PixelSize => {
                return if post.set_pixel_size(v) {
                    PanelEffect::Post
                } else {
                    PanelEffect::Rejected
                };
            }
            PanelParam::EdgeStrength
            | PanelParam::EdgeGlow
            | PanelParam::EdgeThickness
            | PanelParam::PulsePeriod => {
                let Some(outline) = post.outline_mut() else {
                    return PanelEffect::Rejected;
                };
                match param {
                    PanelParam::EdgeStrength => outline.edge_strength = v,
                    PanelParam::EdgeGlow => outline.edge_glow = v,
                    PanelParam::EdgeThickness => outline.edge_thickness = v,
                    _ => outline.pulse_period = v,
                }
                return PanelEffect::Post;
            }
        }
        PanelEffect::Camera
    }
}
