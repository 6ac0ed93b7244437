//! Normalization of raw features into the unit interval.

use crate::core::features::RawFeatures;
use serde::{Deserialize, Serialize};

/// Raw eye aperture that maps to 1.0.
pub const EYE_SCALE: f64 = 30.0;
/// Raw lip gap that maps to 1.0.
pub const MOUTH_SCALE: f64 = 20.0;
/// Raw brow height difference that maps to 1.0.
pub const BROW_SCALE: f64 = 10.0;

/// Features scaled into [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedFeatures {
    pub eye_openness: f64,
    pub mouth_tension: f64,
    pub brow_furrow: f64,
}

/// Scale each raw feature by its constant and clamp into [0, 1].
///
/// Total: negative inputs clamp to 0 and NaN maps to 0.
pub fn normalize(raw: &RawFeatures) -> NormalizedFeatures {
    NormalizedFeatures {
        eye_openness: unit(raw.eye_openness / EYE_SCALE),
        mouth_tension: unit(raw.mouth_tension / MOUTH_SCALE),
        brow_furrow: unit(raw.brow_furrow / BROW_SCALE),
    }
}

fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(eye: f64, mouth: f64, brow: f64) -> RawFeatures {
        RawFeatures {
            eye_openness: eye,
            mouth_tension: mouth,
            brow_furrow: brow,
        }
    }

    #[test]
    fn test_scales() {
        let n = normalize(&raw(15.0, 10.0, 5.0));
        assert!((n.eye_openness - 0.5).abs() < 1e-12);
        assert!((n.mouth_tension - 0.5).abs() < 1e-12);
        assert!((n.brow_furrow - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_large_values_clamp_to_one() {
        let n = normalize(&raw(300.0, 1e9, f64::INFINITY));
        assert_eq!(n.eye_openness, 1.0);
        assert_eq!(n.mouth_tension, 1.0);
        assert_eq!(n.brow_furrow, 1.0);
    }

    #[test]
    fn test_negative_and_nan_clamp_to_zero() {
        let n = normalize(&raw(-4.0, f64::NAN, f64::NEG_INFINITY));
        assert_eq!(n, NormalizedFeatures::default());
    }
}
