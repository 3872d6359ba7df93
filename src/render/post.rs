use serde::{Deserialize, Serialize};

use crate::config::PostConfig;
use crate::scene::Rgb;

use super::shaders::{self, ShaderSource};

/// Minimum strength multiplier reached at the trough of the outline pulse.
const PULSE_LOW: f64 = 0.25;

/// Parameters of the selection outline pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineParams {
    pub edge_strength: f64,
    pub edge_glow: f64,
    pub edge_thickness: f64,
    /// Seconds per pulse; 0 disables pulsing.
    pub pulse_period: f64,
    pub visible_edge_color: Rgb,
    pub hidden_edge_color: Rgb,
    /// Render-target size in device pixels.
    #[serde(skip)]
    pub resolution: [f64; 2],
}

impl Default for OutlineParams {
    fn default() -> Self {
        Self {
            edge_strength: 3.0,
            edge_glow: 0.0,
            edge_thickness: 1.0,
            pulse_period: 0.0,
            visible_edge_color: Rgb::WHITE,
            hidden_edge_color: Rgb::new(0x19, 0x0a, 0x05),
            resolution: [0.0, 0.0],
        }
    }
}

impl OutlineParams {
    /// Edge strength after applying the pulse at `elapsed` seconds.
    #[must_use]
    pub fn strength_at(&self, elapsed: f64) -> f64 {
        if self.pulse_period <= 0.0 {
            return self.edge_strength;
        }
        let phase = elapsed * 10.0 / self.pulse_period;
        let scalar = (1.0 + PULSE_LOW) / 2.0 + phase.cos() * (1.0 - PULSE_LOW) / 2.0;
        self.edge_strength * scalar
    }
}

/// One stage of the post-processing chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Pass {
    /// Draws the scene into the chain's first target.
    Render,
    /// Snaps texture lookups to a grid of `pixel_size` device pixels.
    Pixelation { pixel_size: f64, resolution: [f64; 2] },
    /// Highlights the selected meshes.
    Outline(OutlineParams),
    Fxaa { inv_resolution: [f64; 2] },
    /// Tone mapping and color-space conversion to the surface.
    Output,
}

impl Pass {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Render => "render",
            Self::Pixelation { .. } => "pixelation",
            Self::Outline(_) => "outline",
            Self::Fxaa { .. } => "fxaa",
            Self::Output => "output",
        }
    }

    /// Custom program this pass runs, or `None` for a pass the backend
    /// provides natively.
    #[must_use]
    pub fn shader_source(&self) -> Option<ShaderSource> {
        match self {
            Self::Pixelation { .. } => Some(shaders::PIXELATION),
            Self::Render | Self::Outline(_) | Self::Fxaa { .. } | Self::Output => None,
        }
    }
}

/// Ordered post-processing chain.
#[derive(Debug, Clone, PartialEq)]
pub struct PostProcessing {
    passes: Vec<Pass>,
}

impl PostProcessing {
    /// Builds the chain sized for a `width` x `height` surface.
    #[must_use]
    pub fn from_config(config: &PostConfig, width: u32, height: u32, pixel_ratio: f64) -> Self {
        let mut passes = vec![Pass::Render];
        if config.pixelation {
            passes.push(Pass::Pixelation {
                pixel_size: config.pixel_size,
                resolution: [0.0, 0.0],
            });
        }
        passes.push(Pass::Outline(config.outline.clone()));
        if config.fxaa {
            passes.push(Pass::Fxaa {
                inv_resolution: [0.0, 0.0],
            });
        }
        passes.push(Pass::Output);

        let mut post = Self { passes };
        post.resize(width, height, pixel_ratio);
        post
    }

    #[must_use]
    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    /// Updates every resolution uniform for a new surface size.
    pub fn resize(&mut self, width: u32, height: u32, pixel_ratio: f64) {
        let w = f64::from(width.max(1)) * pixel_ratio;
        let h = f64::from(height.max(1)) * pixel_ratio;
        for pass in &mut self.passes {
            match pass {
                Pass::Pixelation { resolution, .. } => *resolution = [w, h],
                Pass::Outline(params) => params.resolution = [w, h],
                Pass::Fxaa { inv_resolution } => *inv_resolution = [1.0 / w, 1.0 / h],
                Pass::Render | Pass::Output => {}
            }
        }
        tracing::debug!(width = w, height = h, "resized post-processing chain");
    }

    #[must_use]
    pub fn pixel_size(&self) -> Option<f64> {
        self.passes.iter().find_map(|p| match p {
            Pass::Pixelation { pixel_size, .. } => Some(*pixel_size),
            _ => None,
        })
    }

    /// Sets the pixelation cell size. Returns `false` if the chain has no
    /// pixelation pass.
    pub fn set_pixel_size(&mut self, size: f64) -> bool {
        for pass in &mut self.passes {
            if let Pass::Pixelation { pixel_size, .. } = pass {
                *pixel_size = size;
                return true;
            }
        }
        false
    }

    #[must_use]
    pub fn outline(&self) -> Option<&OutlineParams> {
        self.passes.iter().find_map(|p| match p {
            Pass::Outline(params) => Some(params),
            _ => None,
        })
    }

    pub fn outline_mut(&mut self) -> Option<&mut OutlineParams> {
        self.passes.iter_mut().find_map(|p| match p {
            Pass::Outline(params) => Some(params),
            _ => None,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_chain_order() {
        let post = PostProcessing::from_config(&PostConfig::default(), 800, 600, 1.0);
        let names: Vec<_> = post.passes().iter().map(Pass::name).collect();
        assert_eq!(names, ["render", "pixelation", "outline", "fxaa", "output"]);
        assert_relative_eq!(post.pixel_size().unwrap(), 8.0);
        let custom: Vec<_> = post.passes().iter().filter_map(Pass::shader_source).collect();
        assert_eq!(custom, [shaders::PIXELATION]);
    }

    #[test]
    fn disabled_passes_are_omitted() {
        let config = PostConfig {
            pixelation: false,
            fxaa: false,
            ..PostConfig::default()
        };
        let mut post = PostProcessing::from_config(&config, 800, 600, 1.0);
        assert_eq!(post.passes().len(), 3);
        assert!(post.pixel_size().is_none());
        assert!(!post.set_pixel_size(4.0));
    }

    #[test]
    fn resize_updates_every_resolution_uniform() {
        let mut post = PostProcessing::from_config(&PostConfig::default(), 800, 600, 1.0);
        post.resize(1024, 512, 2.0);
        for pass in post.passes() {
            match pass {
                Pass::Pixelation { resolution, .. } => assert_eq!(*resolution, [2048.0, 1024.0]),
                Pass::Outline(p) => assert_eq!(p.resolution, [2048.0, 1024.0]),
                Pass::Fxaa { inv_resolution } => {
                    assert_relative_eq!(inv_resolution[0], 1.0 / 2048.0);
                    assert_relative_eq!(inv_resolution[1], 1.0 / 1024.0);
                }
                Pass::Render | Pass::Output => {}
            }
        }
    }

    #[test]
    fn pulse_oscillates_between_bounds() {
        let params = OutlineParams {
            pulse_period: 2.0,
            ..OutlineParams::default()
        };
        assert_relative_eq!(params.strength_at(0.0), 3.0);
        for i in 0..100 {
            let s = params.strength_at(f64::from(i) * 0.05);
            assert!(s <= 3.0 + 1e-12 && s >= 3.0 * PULSE_LOW - 1e-12);
        }
        assert_relative_eq!(OutlineParams::default().strength_at(12.3), 3.0);
    }
}
