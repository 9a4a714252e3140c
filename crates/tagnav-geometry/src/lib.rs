//! `tagnav-geometry` – coordinate-transform and tag-fusion core.
//!
//! Converts camera-frame AprilTag detections into body-frame and world-frame
//! poses and selects the single best tag as the vehicle's absolute position
//! estimate.
//!
//! # Modules
//!
//! - [`transform`] – [`RigidTransform`][transform::RigidTransform]: 4×4
//!   homogeneous pose with composition and rigid-closed-form inversion.
//! - [`registry`] – [`FrameRegistry`][registry::FrameRegistry]: static
//!   camera-to-body and per-tag world transforms, built once from
//!   configuration.
//! - [`resolver`] – turns one raw detection into a
//!   [`VisibleTag`][tagnav_types::VisibleTag].
//! - [`dispatcher`] – [`process_batch`][dispatcher::process_batch]: pure
//!   batch-in, reports-out entry point.
//! - [`bearing`] – stateless planar bearing helpers, also exposed for
//!   external diagnostics.

pub mod bearing;
pub mod dispatcher;
pub mod registry;
pub mod resolver;
pub mod transform;
