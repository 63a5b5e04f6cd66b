//! Scalar helpers for parameters that travel around a closed path.

use serde::{Deserialize, Serialize};

/// Wrap any real number into `[0, 1)`. Values already in range come back
/// unchanged, bit for bit.
pub fn wrap_unit(x: f64) -> f64 {
    if (0.0..1.0).contains(&x) {
        return x;
    }
    let w = x.rem_euclid(1.0);
    // tiny negative inputs round up to exactly 1.0
    if w >= 1.0 {
        0.0
    } else {
        w
    }
}

/// Easing curve applied to a normalized progress value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    #[default]
    CubicInOut,
    QuadInOut,
    SineInOut,
}

impl Easing {
    /// Map progress in `[0, 1]` to eased progress in `[0, 1]`.
    pub fn apply(self, p: f64) -> f64 {
        match self {
            Easing::Linear => p,
            Easing::CubicInOut => {
                if p < 0.5 {
                    4.0 * p * p * p
                } else {
                    1.0 - (-2.0 * p + 2.0).powi(3) / 2.0
                }
            }
            Easing::QuadInOut => {
                if p < 0.5 {
                    2.0 * p * p
                } else {
                    1.0 - (-2.0 * p + 2.0).powi(2) / 2.0
                }
            }
            Easing::SineInOut => -((std::f64::consts::PI * p).cos() - 1.0) / 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_wrap_unit() {
        assert_eq!(wrap_unit(0.25), 0.25);
        assert_eq!(wrap_unit(0.33), 0.33);
        assert_eq!(wrap_unit(0.9), 0.9);
        assert_abs_diff_eq!(wrap_unit(1.25), 0.25, epsilon = 1e-15);
        assert_abs_diff_eq!(wrap_unit(-0.8), 0.2, epsilon = 1e-15);
        assert_eq!(wrap_unit(1.0), 0.0);
        assert_eq!(wrap_unit(-1e-20), 0.0);
        assert!(wrap_unit(-1e-20) < 1.0);
    }

    #[test]
    fn test_easing_endpoints() {
        for easing in [
            Easing::Linear,
            Easing::CubicInOut,
            Easing::QuadInOut,
            Easing::SineInOut,
        ] {
            assert_abs_diff_eq!(easing.apply(0.0), 0.0, epsilon = 1e-15);
            assert_abs_diff_eq!(easing.apply(1.0), 1.0, epsilon = 1e-15);
            assert_abs_diff_eq!(easing.apply(0.5), 0.5, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_cubic_is_monotonic() {
        let mut prev = 0.0;
        for i in 1..=100 {
            let v = Easing::CubicInOut.apply(i as f64 / 100.0);
            assert!(v >= prev);
            prev = v;
        }
    }

    #[test]
    fn test_easing_serde_names() {
        let e: Easing = serde_json::from_str("\"cubic_in_out\"").unwrap();
        assert_eq!(e, Easing::CubicInOut);
    }
}
