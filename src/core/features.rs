//! Feature extraction from facial landmarks.
//!
//! Three geometric measurements are taken from a single `LandmarkSet`, all in
//! source-pixel units:
//!
//! - **eye openness**: vertical aperture of each eye, averaged
//! - **mouth tension**: vertical gap between the outer lip contours
//! - **brow furrow**: height difference between the left and right brow
//!
//! Brow furrow measures left/right asymmetry rather than furrow depth. The
//! scoring weights were tuned against exactly this quantity, so it is kept.

use crate::error::MalformedLandmarks;
use crate::vision::{FaceRegion, LandmarkSet};
use serde::{Deserialize, Serialize};

/// Points on the upper eye contour that bracket the eye's vertical aperture.
const EYE_APERTURE_TOP: usize = 3;
const EYE_APERTURE_BOTTOM: usize = 7;

/// Mid-mouth point on both outer lip contours.
const LIP_MIDPOINT: usize = 5;

/// Brow point compared between left and right.
const BROW_POINT: usize = 2;

/// Raw geometric measurements for one face.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFeatures {
    pub eye_openness: f64,
    pub mouth_tension: f64,
    pub brow_furrow: f64,
}

/// Compute raw features from a landmark set.
///
/// Fails with `MalformedLandmarks::MissingIndex` if a contour is too short
/// for one of the referenced points.
pub fn extract_features(landmarks: &LandmarkSet) -> Result<RawFeatures, MalformedLandmarks> {
    let left_eye = eye_aperture(landmarks, FaceRegion::LeftEyeUpper)?;
    let right_eye = eye_aperture(landmarks, FaceRegion::RightEyeUpper)?;

    let upper_lip = landmarks.point(FaceRegion::LipsUpperOuter, LIP_MIDPOINT)?;
    let lower_lip = landmarks.point(FaceRegion::LipsLowerOuter, LIP_MIDPOINT)?;

    let left_brow = landmarks.point(FaceRegion::LeftEyebrowUpper, BROW_POINT)?;
    let right_brow = landmarks.point(FaceRegion::RightEyebrowUpper, BROW_POINT)?;

    Ok(RawFeatures {
        eye_openness: (left_eye + right_eye) / 2.0,
        mouth_tension: (upper_lip.y - lower_lip.y).abs(),
        brow_furrow: (left_brow.y - right_brow.y).abs(),
    })
}

fn eye_aperture(landmarks: &LandmarkSet, eye: FaceRegion) -> Result<f64, MalformedLandmarks> {
    let top = landmarks.point(eye, EYE_APERTURE_TOP)?;
    let bottom = landmarks.point(eye, EYE_APERTURE_BOTTOM)?;
    Ok((top.y - bottom.y).abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::{FaceDetection, Point};

    /// Eight-point contour with `y[3] = top` and `y[7] = bottom`.
    fn eye(top: f64, bottom: f64) -> Vec<Point> {
        (0..8)
            .map(|i| match i {
                3 => Point::new(i as f64, top),
                7 => Point::new(i as f64, bottom),
                _ => Point::new(i as f64, 100.0),
            })
            .collect()
    }

    fn lip(mid_y: f64) -> Vec<Point> {
        (0..11).map(|i| Point::new(i as f64, if i == 5 { mid_y } else { 0.0 })).collect()
    }

    fn brow(y: f64) -> Vec<Point> {
        vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(2.0, y)]
    }

    fn landmarks(
        left_eye: Vec<Point>,
        right_eye: Vec<Point>,
        upper_lip: f64,
        lower_lip: f64,
        left_brow: f64,
        right_brow: f64,
    ) -> LandmarkSet {
        let detection = FaceDetection::default()
            .with_region(FaceRegion::LeftEyeUpper, left_eye)
            .with_region(FaceRegion::RightEyeUpper, right_eye)
            .with_region(FaceRegion::LipsUpperOuter, lip(upper_lip))
            .with_region(FaceRegion::LipsLowerOuter, lip(lower_lip))
            .with_region(FaceRegion::LeftEyebrowUpper, brow(left_brow))
            .with_region(FaceRegion::RightEyebrowUpper, brow(right_brow));
        LandmarkSet::try_from(detection).unwrap()
    }

    #[test]
    fn test_eye_openness_averages_both_eyes() {
        let set = landmarks(eye(200.0, 210.0), eye(220.0, 200.0), 0.0, 0.0, 0.0, 0.0);
        let features = extract_features(&set).unwrap();
        assert!((features.eye_openness - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_distances_are_absolute() {
        // Lower lip above upper lip, right brow above left brow
        let set = landmarks(eye(0.0, 0.0), eye(0.0, 0.0), 300.0, 290.0, 50.0, 58.0);
        let features = extract_features(&set).unwrap();
        assert!((features.mouth_tension - 10.0).abs() < 1e-9);
        assert!((features.brow_furrow - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let set = landmarks(eye(1.5, 9.25), eye(3.0, 4.0), 7.0, 1.0, 2.0, 11.0);
        assert_eq!(extract_features(&set).unwrap(), extract_features(&set).unwrap());
    }

    #[test]
    fn test_short_eye_contour_is_malformed() {
        let short_eye = eye(0.0, 0.0).into_iter().take(7).collect();
        let set = landmarks(eye(0.0, 0.0), short_eye, 0.0, 0.0, 0.0, 0.0);

        let err = extract_features(&set).unwrap_err();
        assert_eq!(
            err,
            MalformedLandmarks::MissingIndex {
                region: FaceRegion::RightEyeUpper,
                index: 7,
                len: 7,
            }
        );
    }

    #[test]
    fn test_short_brow_contour_is_malformed() {
        let detection = FaceDetection::default()
            .with_region(FaceRegion::LeftEyeUpper, eye(0.0, 0.0))
            .with_region(FaceRegion::RightEyeUpper, eye(0.0, 0.0))
            .with_region(FaceRegion::LipsUpperOuter, lip(0.0))
            .with_region(FaceRegion::LipsLowerOuter, lip(0.0))
            .with_region(FaceRegion::LeftEyebrowUpper, brow(0.0))
            .with_region(FaceRegion::RightEyebrowUpper, vec![Point::default()]);
        let set = LandmarkSet::try_from(detection).unwrap();

        assert!(matches!(
            extract_features(&set),
            Err(MalformedLandmarks::MissingIndex {
                region: FaceRegion::RightEyebrowUpper,
                ..
            })
        ));
    }
}
