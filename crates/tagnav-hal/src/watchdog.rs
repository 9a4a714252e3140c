//! Capture watchdog: polls a [`VideoSource`] and raises faults on the bus.
//!
//! The detector owns the frames; the watchdog only cares that frames keep
//! coming. A failed read becomes a [`MessagePayload::CaptureFault`] on
//! [`Topic::SystemAlerts`] so operators see a dying camera before the
//! position estimates silently stop.

use std::time::Duration;

use tracing::warn;

use tagnav_middleware::{EventBus, Topic};
use tagnav_types::{Event, MessagePayload};

use crate::capture::VideoSource;

const SOURCE: &str = "tagnav-hal::watchdog";

/// Poll interval matching the capture rate ceiling (100 Hz).
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Poll the source once; on failure, publish a fault alert.
///
/// Returns whether the read succeeded so the caller can track consecutive
/// failures.
pub fn poll_once(source: &mut dyn VideoSource, bus: &EventBus) -> bool {
    match source.read() {
        Ok(_) => true,
        Err(e) => {
            warn!(device = source.id(), error = %e, "video capture read failed");
            let alert = Event::now(
                SOURCE,
                MessagePayload::CaptureFault {
                    device: source.id().to_string(),
                    message: e.to_string(),
                },
            );
            // Nobody listening is fine; the warning above already landed.
            let _ = bus.publish_to(Topic::SystemAlerts, alert);
            false
        }
    }
}

/// Poll the source forever at [`POLL_INTERVAL`].
pub async fn run(mut source: Box<dyn VideoSource>, bus: EventBus) {
    let mut ticker = tokio::time::interval(POLL_INTERVAL);
    loop {
        ticker.tick().await;
        poll_once(source.as_mut(), &bus);
    }
}
