//! Magnitude → extrusion depth mapping.

use serde::{Deserialize, Serialize};

use crate::config::ScaleConfig;

/// Default lower bound applied by [`DepthScale::floored`].
pub const MIN_DEPTH: f64 = 0.1;

/// Shape of the mapping between domain and range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScaleLaw {
    /// `log_base(x)`, domain starts at 1.
    Log { base: f64 },
    /// `sign(x) * ln(1 + |x| / constant)`: linear near zero, logarithmic
    /// for large magnitudes, defined at zero.
    Symlog { constant: f64 },
}

impl ScaleLaw {
    fn transform(self, x: f64) -> f64 {
        match self {
            Self::Log { base } => x.log(base),
            Self::Symlog { constant } => x.signum() * (x.abs() / constant).ln_1p(),
        }
    }

    /// Smallest meaningful domain value for the law.
    fn domain_start(self) -> f64 {
        match self {
            Self::Log { .. } => 1.0,
            Self::Symlog { .. } => 0.0,
        }
    }
}

impl Default for ScaleLaw {
    fn default() -> Self {
        Self::Log { base: 10.0 }
    }
}

/// Monotonic mapping from a raw magnitude to a bounded depth.
///
/// Inputs are clamped to the domain before the law applies, so the
/// output always lies inside `range`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthScale {
    law: ScaleLaw,
    domain: (f64, f64),
    range: (f64, f64),
    min_depth: f64,
}

impl DepthScale {
    /// Creates a scale over an explicit domain. A reversed domain is
    /// swapped.
    #[must_use]
    pub fn new(law: ScaleLaw, domain: (f64, f64), range: (f64, f64)) -> Self {
        let domain = if domain.0 <= domain.1 {
            domain
        } else {
            (domain.1, domain.0)
        };
        Self {
            law,
            domain,
            range,
            min_depth: MIN_DEPTH,
        }
    }

    /// Log10 scale with domain `[1, max]`.
    #[must_use]
    pub fn log_for(max: f64, range: (f64, f64)) -> Self {
        let law = ScaleLaw::Log { base: 10.0 };
        Self::new(law, (law.domain_start(), max.max(law.domain_start())), range)
    }

    /// Symmetric-log scale with domain `[0, max]`.
    #[must_use]
    pub fn symlog_for(max: f64, constant: f64, range: (f64, f64)) -> Self {
        let law = ScaleLaw::Symlog { constant };
        Self::new(law, (law.domain_start(), max.max(law.domain_start())), range)
    }

    /// Builds the configured law over `[domain_start, max]`.
    #[must_use]
    pub fn from_config(config: &ScaleConfig, max: f64) -> Self {
        let start = config.law.domain_start();
        let max = if max.is_finite() { max.max(start) } else { start };
        Self::new(config.law, (start, max), (config.range[0], config.range[1]))
            .with_min_depth(config.min_depth)
    }

    #[must_use]
    pub fn with_min_depth(mut self, min_depth: f64) -> Self {
        self.min_depth = min_depth;
        self
    }

    #[must_use]
    pub fn law(&self) -> ScaleLaw {
        self.law
    }

    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    #[must_use]
    pub fn min_depth(&self) -> f64 {
        self.min_depth
    }

    /// Maps `magnitude` into the range.
    #[must_use]
    pub fn scale(&self, magnitude: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let x = if magnitude.is_nan() {
            d0
        } else {
            magnitude.clamp(d0, d1)
        };
        let t0 = self.law.transform(d0);
        let span = self.law.transform(d1) - t0;
        let t = if span.abs() > 0.0 && span.is_finite() {
            (self.law.transform(x) - t0) / span
        } else {
            // Collapsed domain: every input sits at the middle of the range.
            0.5
        };
        r0 + t.clamp(0.0, 1.0) * (r1 - r0)
    }

    /// [`scale`](Self::scale) bounded below by the minimum depth, safe to
    /// hand to the extrusion routine.
    #[must_use]
    pub fn floored(&self, magnitude: f64) -> f64 {
        self.scale(magnitude).max(self.min_depth)
    }
}
