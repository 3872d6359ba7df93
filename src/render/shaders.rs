//! GLSL sources handed to a GPU backend. Stored verbatim, never compiled
//! by this crate.

/// Full-screen pass vertex shader.
pub const PIXELATION_VERT: &str = r"varying vec2 vUv;
void main() {
  vUv = uv;
  gl_Position = projectionMatrix * modelViewMatrix * vec4(position, 1.0);
}
";

/// Snaps UV lookups to `pixelSize`-pixel cells.
pub const PIXELATION_FRAG: &str = r"uniform float pixelSize;
uniform sampler2D tDiffuse;
varying vec2 vUv;
void main() {
  vec2 dxy = pixelSize / vec2(textureSize(tDiffuse, 0));
  vec2 coord = dxy * floor(vUv / dxy);
  gl_FragColor = texture(tDiffuse, coord);
}
";

pub const HEIGHT_GRADIENT_VERT: &str = r"varying float vHeight;
void main() {
  vHeight = position.z;
  gl_Position = projectionMatrix * modelViewMatrix * vec4(position, 1.0);
}
";

/// Mixes `low` into `high` over `(vHeight + offset) / span`. Must agree
/// with `Material::color_at`.
pub const HEIGHT_GRADIENT_FRAG: &str = r"uniform vec3 low;
uniform vec3 high;
uniform float offset;
uniform float span;
varying float vHeight;
void main() {
  float mixFactor = clamp((vHeight + offset) / span, 0.0, 1.0);
  gl_FragColor = vec4(mix(low, high, mixFactor), 1.0);
}
";

/// Vertex and fragment source of one GPU program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderSource {
    pub vertex: &'static str,
    pub fragment: &'static str,
}

pub const PIXELATION: ShaderSource = ShaderSource {
    vertex: PIXELATION_VERT,
    fragment: PIXELATION_FRAG,
};

pub const HEIGHT_GRADIENT: ShaderSource = ShaderSource {
    vertex: HEIGHT_GRADIENT_VERT,
    fragment: HEIGHT_GRADIENT_FRAG,
};
