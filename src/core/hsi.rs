//! HSI (Human State Interface) 1.0 rendering of a stress publication.
//!
//! Used for machine-readable output of the current reading. A snapshot is
//! built on demand from the latest publication and is not retained.

use crate::core::detection::Publication;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// The current HSI format version.
pub const HSI_VERSION: &str = "1.0";

/// The name of this producer.
pub const PRODUCER_NAME: &str = "facial-stress-agent";

/// How to read an axis score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HsiDirection {
    HigherIsMore,
    Bidirectional,
}

/// Kind of source behind a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HsiSourceType {
    Sensor,
    Derived,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HsiProducer {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
}

/// Observation window. For a single frame start and end coincide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HsiWindow {
    pub start: String,
    pub end: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HsiAxisReading {
    /// Axis name (lower_snake_case)
    pub axis: String,
    /// Score in [0, 1], or null if unavailable
    pub score: Option<f64>,
    pub confidence: f64,
    pub window_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<HsiDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_source_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HsiAxesDomain {
    pub readings: Vec<HsiAxisReading>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HsiAxes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affect: Option<HsiAxesDomain>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub behavior: Option<HsiAxesDomain>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HsiSource {
    #[serde(rename = "type")]
    pub source_type: HsiSourceType,
    pub quality: f64,
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HsiPrivacy {
    /// Must be false: HSI payloads never carry PII
    pub contains_pii: bool,
    pub raw_biosignals_allowed: bool,
    pub derived_metrics_allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Default for HsiPrivacy {
    fn default() -> Self {
        Self {
            contains_pii: false,
            raw_biosignals_allowed: false,
            derived_metrics_allowed: true,
            notes: Some("No images or landmark coordinates included".to_string()),
        }
    }
}

/// HSI 1.0 snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HsiSnapshot {
    pub hsi_version: String,
    pub observed_at_utc: String,
    pub computed_at_utc: String,
    pub producer: HsiProducer,
    pub window_ids: Vec<String>,
    pub windows: HashMap<String, HsiWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<HashMap<String, HsiSource>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axes: Option<HsiAxes>,
    pub privacy: HsiPrivacy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, serde_json::Value>>,
}

/// Confidence reported on every axis; the heuristic has no calibrated uncertainty.
const HEURISTIC_CONFIDENCE: f64 = 0.5;

/// Builds HSI snapshots from publications.
pub struct HsiBuilder {
    instance_id: Uuid,
    session_id: Option<String>,
}

impl HsiBuilder {
    /// Create a new HSI builder with a unique instance ID.
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4(),
            session_id: None,
        }
    }

    pub fn with_session_id(mut self, session_id: String) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    /// Render one publication.
    pub fn build(&self, publication: &Publication) -> HsiSnapshot {
        let computed_at = Utc::now();
        let observed_at = publication.observed_at.to_rfc3339();

        let window_id = format!("w_frame_{}", publication.frame_index);
        let mut windows = HashMap::new();
        windows.insert(
            window_id.clone(),
            HsiWindow {
                start: observed_at.clone(),
                end: observed_at.clone(),
                label: Some("single_frame".to_string()),
            },
        );

        let landmark_source = format!("s_face_landmarks_{}", self.instance_id);
        let heuristic_source = format!("s_stress_heuristic_{}", self.instance_id);
        let mut sources = HashMap::new();
        sources.insert(
            landmark_source.clone(),
            HsiSource {
                source_type: HsiSourceType::Sensor,
                quality: if publication.mesh.is_empty() { 0.5 } else { 0.9 },
                degraded: publication.mesh.is_empty(),
                notes: publication
                    .mesh
                    .is_empty()
                    .then(|| "Model returned no mesh".to_string()),
            },
        );
        sources.insert(
            heuristic_source.clone(),
            HsiSource {
                source_type: HsiSourceType::Derived,
                quality: HEURISTIC_CONFIDENCE,
                degraded: false,
                notes: Some("Fixed-weight heuristic, not clinically validated".to_string()),
            },
        );

        let axis = |name: &str,
                    score: f64,
                    direction: HsiDirection,
                    source: &str,
                    notes: Option<&str>| {
            HsiAxisReading {
                axis: name.to_string(),
                score: Some(score),
                confidence: HEURISTIC_CONFIDENCE,
                window_id: window_id.clone(),
                direction: Some(direction),
                evidence_source_ids: Some(vec![source.to_string()]),
                notes: notes.map(str::to_string),
            }
        };

        let reading = &publication.reading;
        let label = reading.label.to_string();
        let affect = vec![axis(
            "stress",
            reading.score,
            HsiDirection::HigherIsMore,
            &heuristic_source,
            Some(&label),
        )];

        let features = &publication.features;
        let behavior = vec![
            axis(
                "eye_openness",
                features.eye_openness,
                HsiDirection::Bidirectional,
                &landmark_source,
                None,
            ),
            axis(
                "mouth_tension",
                features.mouth_tension,
                HsiDirection::HigherIsMore,
                &landmark_source,
                None,
            ),
            axis(
                "brow_asymmetry",
                features.brow_furrow,
                HsiDirection::HigherIsMore,
                &landmark_source,
                Some("Left/right eyebrow height difference"),
            ),
        ];

        let mut meta = HashMap::new();
        meta.insert(
            "frame_index".to_string(),
            serde_json::Value::from(publication.frame_index),
        );
        meta.insert(
            "mesh_points".to_string(),
            serde_json::Value::from(publication.mesh.len()),
        );
        meta.insert(
            "stress_label".to_string(),
            serde_json::to_value(reading.label).unwrap_or(serde_json::Value::Null),
        );
        if let Some(ref session_id) = self.session_id {
            meta.insert(
                "session_id".to_string(),
                serde_json::Value::String(session_id.clone()),
            );
        }

        HsiSnapshot {
            hsi_version: HSI_VERSION.to_string(),
            observed_at_utc: observed_at,
            computed_at_utc: computed_at.to_rfc3339(),
            producer: HsiProducer {
                name: PRODUCER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                instance_id: Some(self.instance_id.to_string()),
            },
            window_ids: vec![window_id],
            windows,
            source_ids: Some(vec![landmark_source, heuristic_source]),
            sources: Some(sources),
            axes: Some(HsiAxes {
                affect: Some(HsiAxesDomain { readings: affect }),
                behavior: Some(HsiAxesDomain { readings: behavior }),
            }),
            privacy: HsiPrivacy::default(),
            meta: Some(meta),
        }
    }

    /// Build and serialize a snapshot as a single JSON line.
    pub fn build_json(&self, publication: &Publication) -> String {
        let snapshot = self.build(publication);
        serde_json::to_string(&snapshot).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for HsiBuilder {
    fn default() -> Self {
        Self::new()
    }
}
