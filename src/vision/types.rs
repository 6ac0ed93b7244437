//! Frame and landmark types exchanged with the vision collaborators.
//!
//! `FaceDetection` is the loosely structured shape a landmark model emits
//! (named contours in a map). `LandmarkSet` is the validated, strongly typed
//! form the feature extractor works on; conversion happens once, at the model
//! boundary.

use crate::error::MalformedLandmarks;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A landmark position in source-pixel coordinates.
///
/// Serialized as `[x, y, z]`; `[x, y]` and `{"x", "y"}` are accepted on input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "PointRepr", into = "[f64; 3]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
    /// Depth, 0 for 2D detections
    pub z: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub fn with_depth(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PointRepr {
    Xyz([f64; 3]),
    Xy([f64; 2]),
    Named {
        x: f64,
        y: f64,
        #[serde(default)]
        z: f64,
    },
}

impl From<PointRepr> for Point {
    fn from(repr: PointRepr) -> Self {
        match repr {
            PointRepr::Xyz([x, y, z]) => Point::with_depth(x, y, z),
            PointRepr::Xy([x, y]) => Point::new(x, y),
            PointRepr::Named { x, y, z } => Point::with_depth(x, y, z),
        }
    }
}

impl From<Point> for [f64; 3] {
    fn from(p: Point) -> Self {
        [p.x, p.y, p.z]
    }
}

/// One captured video frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Monotonic index within the stream
    pub index: u64,
    pub width: u32,
    pub height: u32,
    pub captured_at: DateTime<Utc>,
    /// Packed RGB pixels, shared so frames are cheap to hand to the model
    pub pixels: Arc<[u8]>,
}

/// Named facial contours the stress heuristic reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaceRegion {
    LeftEyeUpper,
    RightEyeUpper,
    LipsUpperOuter,
    LipsLowerOuter,
    LeftEyebrowUpper,
    RightEyebrowUpper,
}

impl FaceRegion {
    /// Every region a `LandmarkSet` must carry.
    pub const REQUIRED: [FaceRegion; 6] = [
        FaceRegion::LeftEyeUpper,
        FaceRegion::RightEyeUpper,
        FaceRegion::LipsUpperOuter,
        FaceRegion::LipsLowerOuter,
        FaceRegion::LeftEyebrowUpper,
        FaceRegion::RightEyebrowUpper,
    ];

    /// Key used for this region in model annotations.
    pub fn annotation_key(self) -> &'static str {
        match self {
            FaceRegion::LeftEyeUpper => "leftEyeUpper",
            FaceRegion::RightEyeUpper => "rightEyeUpper",
            FaceRegion::LipsUpperOuter => "lipsUpperOuter",
            FaceRegion::LipsLowerOuter => "lipsLowerOuter",
            FaceRegion::LeftEyebrowUpper => "leftEyebrowUpper",
            FaceRegion::RightEyebrowUpper => "rightEyebrowUpper",
        }
    }
}

impl fmt::Display for FaceRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.annotation_key())
    }
}

/// Raw output for one face, as produced by a landmark model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceDetection {
    /// Named contours keyed by annotation name
    #[serde(default)]
    pub annotations: HashMap<String, Vec<Point>>,
    /// Dense mesh of every tracked point
    #[serde(default)]
    pub mesh: Vec<Point>,
}

impl FaceDetection {
    /// Set the points of a named region.
    pub fn with_region(mut self, region: FaceRegion, points: Vec<Point>) -> Self {
        self.annotations
            .insert(region.annotation_key().to_string(), points);
        self
    }

    pub fn with_mesh(mut self, mesh: Vec<Point>) -> Self {
        self.mesh = mesh;
        self
    }
}

/// Validated landmarks for one face in one frame.
///
/// Only constructed through `TryFrom<FaceDetection>`, which guarantees every
/// required region is present. Point counts are not checked here; the
/// feature extractor reports short contours itself.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    left_eye_upper: Vec<Point>,
    right_eye_upper: Vec<Point>,
    lips_upper_outer: Vec<Point>,
    lips_lower_outer: Vec<Point>,
    left_eyebrow_upper: Vec<Point>,
    right_eyebrow_upper: Vec<Point>,
    mesh: Vec<Point>,
}

impl LandmarkSet {
    /// Points of a named region.
    pub fn region(&self, region: FaceRegion) -> &[Point] {
        match region {
            FaceRegion::LeftEyeUpper => &self.left_eye_upper,
            FaceRegion::RightEyeUpper => &self.right_eye_upper,
            FaceRegion::LipsUpperOuter => &self.lips_upper_outer,
            FaceRegion::LipsLowerOuter => &self.lips_lower_outer,
            FaceRegion::LeftEyebrowUpper => &self.left_eyebrow_upper,
            FaceRegion::RightEyebrowUpper => &self.right_eyebrow_upper,
        }
    }

    /// A single point of a region, or `MissingIndex` if the contour is short.
    pub fn point(&self, region: FaceRegion, index: usize) -> Result<Point, MalformedLandmarks> {
        let points = self.region(region);
        points
            .get(index)
            .copied()
            .ok_or(MalformedLandmarks::MissingIndex {
                region,
                index,
                len: points.len(),
            })
    }

    pub fn mesh(&self) -> &[Point] {
        &self.mesh
    }

    /// Consume the set, keeping only the mesh for the overlay.
    pub fn into_mesh(self) -> Vec<Point> {
        self.mesh
    }
}

impl TryFrom<FaceDetection> for LandmarkSet {
    type Error = MalformedLandmarks;

    fn try_from(mut detection: FaceDetection) -> Result<Self, Self::Error> {
        let mut take = |region: FaceRegion| {
            detection
                .annotations
                .remove(region.annotation_key())
                .ok_or(MalformedLandmarks::MissingRegion(region))
        };

        Ok(Self {
            left_eye_upper: take(FaceRegion::LeftEyeUpper)?,
            right_eye_upper: take(FaceRegion::RightEyeUpper)?,
            lips_upper_outer: take(FaceRegion::LipsUpperOuter)?,
            lips_lower_outer: take(FaceRegion::LipsLowerOuter)?,
            left_eyebrow_upper: take(FaceRegion::LeftEyebrowUpper)?,
            right_eyebrow_upper: take(FaceRegion::RightEyebrowUpper)?,
            mesh: detection.mesh,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_detection() -> FaceDetection {
        FaceRegion::REQUIRED
            .iter()
            .fold(FaceDetection::default(), |d, &r| {
                d.with_region(r, vec![Point::new(1.0, 2.0); 8])
            })
            .with_mesh(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)])
    }

    #[test]
    fn test_point_accepts_pairs_and_triples() {
        let pts: Vec<Point> =
            serde_json::from_str(r#"[[1.0, 2.0], [3.0, 4.0, 5.0], {"x": 6.0, "y": 7.0}]"#).unwrap();
        assert_eq!(pts[0], Point::new(1.0, 2.0));
        assert_eq!(pts[1], Point::with_depth(3.0, 4.0, 5.0));
        assert_eq!(pts[2], Point::new(6.0, 7.0));

        let json = serde_json::to_string(&pts[1]).unwrap();
        assert_eq!(json, "[3.0,4.0,5.0]");
    }

    #[test]
    fn test_landmark_set_from_complete_detection() {
        let set = LandmarkSet::try_from(full_detection()).unwrap();
        assert_eq!(set.region(FaceRegion::LipsLowerOuter).len(), 8);
        assert_eq!(set.mesh().len(), 2);
    }

    #[test]
    fn test_missing_region_is_rejected() {
        let mut detection = full_detection();
        detection.annotations.remove("rightEyebrowUpper");

        let err = LandmarkSet::try_from(detection).unwrap_err();
        assert_eq!(err, MalformedLandmarks::MissingRegion(FaceRegion::RightEyebrowUpper));
    }

    #[test]
    fn test_point_lookup_reports_short_contour() {
        let detection = full_detection().with_region(FaceRegion::LeftEyeUpper, vec![Point::default(); 3]);
        let set = LandmarkSet::try_from(detection).unwrap();

        assert!(set.point(FaceRegion::LeftEyeUpper, 2).is_ok());
        assert_eq!(
            set.point(FaceRegion::LeftEyeUpper, 3),
            Err(MalformedLandmarks::MissingIndex {
                region: FaceRegion::LeftEyeUpper,
                index: 3,
                len: 3,
            })
        );
    }
}
