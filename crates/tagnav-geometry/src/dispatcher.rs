//! Fusion dispatcher.
//!
//! Processes one inbound detection batch end-to-end: resolves every
//! detection in arrival order, assembles the "visible tags" report, and
//! selects the position estimate. [`process_batch`] is a pure function of
//! the batch and the registry (no cross-batch state, no transport
//! concerns), so the surrounding node stays a thin subscribe/publish shim.

use tracing::warn;

use tagnav_types::{RawTagBatch, VehiclePosition, VisibleTagReport};

use crate::registry::FrameRegistry;
use crate::resolver;

/// Everything one batch produces: the per-tag report (always), and the
/// vehicle position estimate (at most one per batch).
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub report: VisibleTagReport,
    pub estimate: Option<VehiclePosition>,
}

/// Process one detection batch.
///
/// Malformed detections are logged and skipped; one bad detection never
/// aborts the batch. The estimate comes from the first detection, in
/// arrival order, that resolved to an absolute position; when none does,
/// the estimate is `None` and only the report is produced.
pub fn process_batch(batch: &RawTagBatch, registry: &FrameRegistry) -> BatchOutcome {
    let mut tags = Vec::with_capacity(batch.detections.len());
    let mut estimate: Option<VehiclePosition> = None;

    for detection in &batch.detections {
        let tag = match resolver::resolve(detection, registry) {
            Ok(tag) => tag,
            Err(e) => {
                warn!(tag_id = detection.id, error = %e, "skipping malformed detection");
                continue;
            }
        };

        if estimate.is_none() {
            if let Some(position) = tag.absolute_position {
                estimate = Some(VehiclePosition {
                    tag_id: tag.id,
                    position,
                    heading: tag.heading,
                });
            }
        }

        tags.push(tag);
    }

    BatchOutcome {
        report: VisibleTagReport { tags },
        estimate,
    }
}
