//! Node configuration – reads `~/.tagnav/config.toml`.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use tagnav_hal::{CaptureConfig, CaptureProtocol};
use tagnav_types::{CameraMount, NavConfig, TagWorldPose};

/// Capture backend choice as written in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    V4l2,
    Argus,
}

impl From<Protocol> for CaptureProtocol {
    fn from(p: Protocol) -> Self {
        match p {
            Protocol::V4l2 => CaptureProtocol::V4l2,
            Protocol::Argus => CaptureProtocol::Argus,
        }
    }
}

/// `[capture]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CaptureSection {
    #[serde(default)]
    pub protocol: Protocol,

    #[serde(default = "default_device")]
    pub device: String,

    /// Output resolution delivered to the detector, `[width, height]`.
    #[serde(default = "default_resolution")]
    pub resolution: [u32; 2],

    /// Optional output rate limit in frames per second.
    #[serde(default)]
    pub framerate: Option<u32>,
}

impl Default for CaptureSection {
    fn default() -> Self {
        Self {
            protocol: Protocol::default(),
            device: default_device(),
            resolution: default_resolution(),
            framerate: None,
        }
    }
}

/// One surveyed tag, written as a `[[tags]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TagEntry {
    pub id: u32,
    /// Roll/pitch/yaw of the tag face in the world frame, radians.
    #[serde(default)]
    pub rpy: [f64; 3],
    /// Tag centre in the world frame, centimetres.
    #[serde(default)]
    pub xyz: [f64; 3],
}

/// Persisted node configuration stored in `~/.tagnav/config.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    /// Event bus channel capacity per topic.
    #[serde(default = "default_bus_capacity")]
    pub bus_capacity: usize,

    #[serde(default)]
    pub camera_mount: CameraMount,

    #[serde(default)]
    pub capture: CaptureSection,

    /// Surveyed tag poses. When the section is absent only tag 0 at the
    /// world origin is known.
    #[serde(default)]
    pub tags: Option<Vec<TagEntry>>,
}

fn default_bus_capacity() -> usize {
    256
}
fn default_device() -> String {
    "/dev/video0".to_string()
}
fn default_resolution() -> [u32; 2] {
    [1280, 720]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bus_capacity: default_bus_capacity(),
            camera_mount: CameraMount::default(),
            capture: CaptureSection::default(),
            tags: None,
        }
    }
}

impl Config {
    /// Project this file-level config onto the geometry core's view of it.
    pub fn nav_config(&self) -> NavConfig {
        let tag_truth: BTreeMap<u32, TagWorldPose> = match &self.tags {
            None => NavConfig::default().tag_truth,
            Some(entries) => entries
                .iter()
                .map(|e| (e.id, TagWorldPose { rpy: e.rpy, xyz: e.xyz }))
                .collect(),
        };
        NavConfig {
            camera_mount: self.camera_mount.clone(),
            tag_truth,
        }
    }

    /// Capture pipeline settings for the HAL.
    pub fn capture_config(&self) -> CaptureConfig {
        CaptureConfig {
            protocol: self.capture.protocol.into(),
            device: self.capture.device.clone(),
            resolution: (self.capture.resolution[0], self.capture.resolution[1]),
            framerate: self.capture.framerate,
        }
    }
}

/// Return the path to `~/.tagnav/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
/// Extracted for testability without mutating environment variables.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".tagnav").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &PathBuf) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    Ok(Some(cfg))
}
