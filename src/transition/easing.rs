use serde::{Deserialize, Serialize};

/// Easing curve mapping linear progress `[0, 1]` onto eased progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    /// Quadratic ease-in-out.
    #[default]
    Power1InOut,
    /// Cubic ease-in-out.
    CubicInOut,
}

impl Easing {
    /// Eased value of `t`, clamped to `[0, 1]`.
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Linear => t,
            Self::Power1InOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Self::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const ALL: [Easing; 3] = [Easing::Linear, Easing::Power1InOut, Easing::CubicInOut];

    #[test]
    fn endpoints_and_midpoint() {
        for e in ALL {
            assert_relative_eq!(e.apply(0.0), 0.0);
            assert_relative_eq!(e.apply(1.0), 1.0);
            assert_relative_eq!(e.apply(0.5), 0.5);
        }
    }

    #[test]
    fn monotonic() {
        for e in ALL {
            let mut prev = 0.0;
            for i in 0..=100 {
                let v = e.apply(f64::from(i) / 100.0);
                assert!(v >= prev, "{e:?} not monotonic at {i}");
                prev = v;
            }
        }
    }

    #[test]
    fn ease_in_out_is_slow_at_the_ends() {
        assert!(Easing::Power1InOut.apply(0.1) < 0.1);
        assert!(Easing::Power1InOut.apply(0.9) > 0.9);
    }

    #[test]
    fn out_of_range_input_is_clamped() {
        assert_relative_eq!(Easing::CubicInOut.apply(-3.0), 0.0);
        assert_relative_eq!(Easing::CubicInOut.apply(7.0), 1.0);
        assert_relative_eq!(Easing::Linear.apply(f64::NAN), 0.0);
    }
}
