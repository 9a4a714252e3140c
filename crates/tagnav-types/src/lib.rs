use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A 3-D position. Camera-frame detections are in metres (as delivered by the
/// vision stage); everything downstream (body frame, world frame) is in
/// centimetres, matching the mount configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// One fiducial-tag observation from the vision stage: the tag's position and
/// orientation relative to the camera's optical centre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawTagDetection {
    /// AprilTag identifier (non-negative).
    pub id: u32,
    /// Tag position in the camera frame, metres.
    pub position: Position,
    /// Tag orientation in the camera frame, row-major 3×3.
    pub rotation: [[f64; 3]; 3],
}

/// Inbound "raw tags" message: all detections from one camera frame, in
/// detector output order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawTagBatch {
    pub detections: Vec<RawTagDetection>,
}

/// Derived per-detection geometry, one entry per well-formed detection in the
/// originating batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VisibleTag {
    pub id: u32,
    /// Planar distance to the tag, centimetres.
    pub horizontal_distance: f64,
    /// Vertical offset magnitude, centimetres.
    pub vertical_distance: f64,
    /// Planar bearing from the vehicle's forward axis, degrees.
    pub angle: f64,
    /// Compass-style heading, degrees in [0, 360).
    pub heading: f64,
    /// Vehicle position relative to the tag, centimetres.
    pub relative_position: Position,
    /// World-frame position, centimetres. `None` when the tag is not in the
    /// ground-truth table, distinct from a tag sitting at the world origin.
    pub absolute_position: Option<Position>,
}

/// Outbound "visible tags" message, emitted once per inbound batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VisibleTagReport {
    pub tags: Vec<VisibleTag>,
}

/// Outbound "vehicle position" message, emitted at most once per inbound
/// batch: the absolute position estimate from the selected tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VehiclePosition {
    pub tag_id: u32,
    /// World-frame position, centimetres.
    pub position: Position,
    /// Compass-style heading, degrees in [0, 360).
    pub heading: f64,
}

/// Unified event wrapper for the internal message bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// e.g. "tagnav-node::dispatcher"
    pub source: String,
    pub payload: MessagePayload,
}

impl Event {
    /// Wrap a payload with a fresh id and the current timestamp.
    pub fn now(source: impl Into<String>, payload: MessagePayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source: source.into(),
            payload,
        }
    }
}

/// Variants of data routed over the internal event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MessagePayload {
    RawTags(RawTagBatch),
    VisibleTags(VisibleTagReport),
    VehiclePosition(VehiclePosition),
    CaptureFault { device: String, message: String },
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Camera mount constants: where the camera sits on the vehicle and how it is
/// oriented. Loaded once at startup; never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraMount {
    /// Mount position relative to the body origin: forward, right, down,
    /// centimetres.
    pub position_cm: [f64; 3],
    /// Mount attitude relative to the body axes: roll, pitch, yaw, radians.
    pub attitude_rad: [f64; 3],
}

impl Default for CameraMount {
    fn default() -> Self {
        // The flight configuration: camera 8.5 cm below the body origin,
        // yawed 90° (the sensor is mounted sideways).
        Self {
            position_cm: [0.0, 0.0, 8.5],
            attitude_rad: [0.0, 0.0, std::f64::consts::FRAC_PI_2],
        }
    }
}

/// Documented world pose of one ground-truth tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagWorldPose {
    /// Roll, pitch, yaw in radians.
    pub rpy: [f64; 3],
    /// World position in centimetres.
    pub xyz: [f64; 3],
}

impl TagWorldPose {
    pub fn identity() -> Self {
        Self {
            rpy: [0.0; 3],
            xyz: [0.0; 3],
        }
    }
}

/// Mapping from tag ID to its surveyed world pose. A tag absent from this
/// table is "unknown" and can never contribute an absolute position.
pub type TagTruthTable = BTreeMap<u32, TagWorldPose>;

/// Full static configuration consumed by the frame registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavConfig {
    #[serde(default)]
    pub camera_mount: CameraMount,
    #[serde(default = "default_tag_truth")]
    pub tag_truth: TagTruthTable,
}

fn default_tag_truth() -> TagTruthTable {
    BTreeMap::from([(0, TagWorldPose::identity())])
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            camera_mount: CameraMount::default(),
            tag_truth: default_tag_truth(),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Global error type spanning configuration, geometry, capture, and bus
/// failures.
#[derive(Error, Debug)]
pub enum NavError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed detection for tag {tag_id}: {details}")]
    MalformedDetection { tag_id: u32, details: String },

    #[error("Transform is singular and cannot be inverted")]
    SingularTransform,

    #[error("Capture fault on {device}: {details}")]
    Capture { device: String, details: String },

    #[error("Event bus error: {0}")]
    Channel(String),
}
