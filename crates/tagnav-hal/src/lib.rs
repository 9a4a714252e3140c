//! `tagnav-hal` – the video-capture hardware boundary.
//!
//! Everything above this crate works with [`Frame`]s and trait objects;
//! everything below is GStreamer plumbing on the Jetson.
//!
//! # Modules
//!
//! - [`capture`] – [`VideoSource`] trait, [`Frame`], and the
//!   [`CaptureConfig`] pipeline builder for the `v4l2` and `argus` backends.
//! - [`watchdog`] – polls a source and raises capture faults on the event
//!   bus when reads fail.

pub mod capture;
pub mod watchdog;

pub use capture::{CaptureConfig, CaptureProtocol, Frame, VideoSource};
