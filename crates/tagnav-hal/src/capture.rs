//! Generic `VideoSource` trait and the GStreamer pipeline builder for the
//! Jetson capture path.

use tagnav_types::NavError;

/// A raw image frame returned by a video source.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Raw pixel data (BGR24 unless the source says otherwise).
    pub data: Vec<u8>,
}

/// A camera or other frame producer.
///
/// Drivers implement this trait; the node only ever sees the trait object,
/// so tests substitute a mock without touching real hardware.
pub trait VideoSource: Send + Sync {
    /// Stable identifier for this source, e.g. `"/dev/video0"`.
    fn id(&self) -> &str;

    /// Capture and return the next available frame.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::Capture`] if the frame cannot be read (device
    /// disconnected, decoder stall, buffer unavailable).
    fn read(&mut self) -> Result<Frame, NavError>;
}

/// Capture backend on the Jetson.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureProtocol {
    /// USB camera through `v4l2src`, MJPEG decoded by the hardware decoder.
    V4l2,
    /// CSI camera through `nvarguscamerasrc`, staying in NVMM memory until
    /// the colour convert.
    Argus,
}

/// Everything needed to build the capture pipeline for one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConfig {
    pub protocol: CaptureProtocol,
    /// Device node, e.g. `/dev/video0`. Ignored by the Argus backend.
    pub device: String,
    /// Output resolution delivered to the appsink, `(width, height)`.
    pub resolution: (u32, u32),
    /// Optional output rate limit. `None` delivers frames at the sensor
    /// rate; `Some(fps)` inserts a `videorate` stage, which costs next to
    /// nothing.
    pub framerate: Option<u32>,
}

impl CaptureConfig {
    /// Render the GStreamer connection string for this configuration.
    ///
    /// Both backends capture 1280x720 at 60 fps from the sensor and convert
    /// to the requested output format and resolution on the way to the
    /// appsink; only the source half of the pipeline differs.
    pub fn pipeline(&self) -> String {
        let format = match self.protocol {
            CaptureProtocol::V4l2 => "BGRx",
            CaptureProtocol::Argus => "BGR",
        };

        let frame_string = match self.framerate {
            None => format!("video/x-raw,format={format}"),
            Some(fps) => {
                format!("videorate ! video/x-raw,format={format},framerate={fps}/1")
            }
        };

        let (width, height) = self.resolution;
        match self.protocol {
            CaptureProtocol::V4l2 => format!(
                "v4l2src device={device} io-mode=2 ! \
                 image/jpeg,width=1280,height=720,framerate=60/1 ! jpegparse ! \
                 nvv4l2decoder mjpeg=1 ! nvvidconv ! {frame_string} ! videoconvert ! \
                 video/x-raw,width={width},height={height},format=BGRx ! appsink",
                device = self.device,
            ),
            CaptureProtocol::Argus => format!(
                "nvarguscamerasrc ! video/x-raw(memory:NVMM), width=1280, \
                 height=720,format=NV12, framerate=60/1 ! nvvidconv ! \
                 video/x-raw,format=BGRx ! videoconvert ! \
                 {frame_string},width={width},height={height} ! appsink",
            ),
        }
    }
}
