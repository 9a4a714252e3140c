//! The fusion loop: raw detection batches in, reports and estimates out.

use std::sync::Arc;

use tracing::{debug, info, warn};

use tagnav_geometry::dispatcher;
use tagnav_geometry::registry::FrameRegistry;
use tagnav_middleware::{EventBus, Topic};
use tagnav_types::{Event, MessagePayload};

const SOURCE: &str = "tagnav-node";

/// Subscribe to [`Topic::RawTags`] and process batches until the bus shuts
/// down.
///
/// Every batch yields one [`Topic::VisibleTags`] report; batches where some
/// tag has a surveyed world pose also yield a [`Topic::VehiclePosition`]
/// estimate. Publish failures mean nobody is listening yet, which is normal
/// during startup, so they are logged at debug and dropped.
pub async fn run(bus: EventBus, registry: Arc<FrameRegistry>) {
    let mut raw_tags = bus.subscribe_to(Topic::RawTags);
    info!("fusion loop started");

    while let Some(event) = raw_tags.recv().await {
        let MessagePayload::RawTags(batch) = &event.payload else {
            warn!(source = %event.source, "unexpected payload on RawTags topic");
            continue;
        };

        let outcome = dispatcher::process_batch(batch, &registry);

        let report = Event::now(SOURCE, MessagePayload::VisibleTags(outcome.report));
        if let Err(e) = bus.publish_to(Topic::VisibleTags, report) {
            debug!(error = %e, "visible-tags report dropped");
        }

        if let Some(estimate) = outcome.estimate {
            debug!(
                tag_id = estimate.tag_id,
                x = estimate.position.x,
                y = estimate.position.y,
                z = estimate.position.z,
                heading = estimate.heading,
                "position estimate"
            );
            let event = Event::now(SOURCE, MessagePayload::VehiclePosition(estimate));
            if let Err(e) = bus.publish_to(Topic::VehiclePosition, event) {
                debug!(error = %e, "position estimate dropped");
            }
        }
    }

    info!("fusion loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::f64::consts::FRAC_PI_2;
    use std::time::Duration;
    use tagnav_types::{
        CameraMount, NavConfig, Position, RawTagBatch, RawTagDetection, TagWorldPose,
    };
    use tokio::time::timeout;

    const REFERENCE_ROTATION: [[f64; 3]; 3] =
        [[-1.0, 0.0, 1.0], [0.0, 1.0, -1.0], [1.0, -1.0, 0.0]];

    fn registry() -> Arc<FrameRegistry> {
        let config = NavConfig {
            camera_mount: CameraMount {
                position_cm: [15.0, 10.0, 10.0],
                attitude_rad: [0.0, 0.0, FRAC_PI_2],
            },
            tag_truth: BTreeMap::from([(0, TagWorldPose::identity())]),
        };
        Arc::new(FrameRegistry::new(&config).unwrap())
    }

    fn batch_event(id: u32) -> Event {
        Event::now(
            "vision::frame",
            MessagePayload::RawTags(RawTagBatch {
                detections: vec![RawTagDetection {
                    id,
                    position: Position::new(1.0, 2.0, 3.0),
                    rotation: REFERENCE_ROTATION,
                }],
            }),
        )
    }

    #[tokio::test]
    async fn batch_produces_report_and_estimate() {
        let bus = EventBus::default();
        let mut reports = bus.subscribe_to(Topic::VisibleTags);
        let mut positions = bus.subscribe_to(Topic::VehiclePosition);

        let loop_bus = bus.clone();
        tokio::spawn(run(loop_bus, registry()));
        tokio::task::yield_now().await;

        bus.publish_to(Topic::RawTags, batch_event(0)).unwrap();

        let report = timeout(Duration::from_secs(1), reports.recv())
            .await
            .expect("report within deadline")
            .expect("bus open");
        let MessagePayload::VisibleTags(report) = report.payload else {
            panic!("wrong payload on VisibleTags topic");
        };
        assert_eq!(report.tags.len(), 1);
        assert_eq!(report.tags[0].id, 0);

        let estimate = timeout(Duration::from_secs(1), positions.recv())
            .await
            .expect("estimate within deadline")
            .expect("bus open");
        let MessagePayload::VehiclePosition(estimate) = estimate.payload else {
            panic!("wrong payload on VehiclePosition topic");
        };
        assert_eq!(estimate.tag_id, 0);
        assert!((estimate.position.x - 110.0).abs() < 1e-9);
        assert!((estimate.position.y - 185.0).abs() < 1e-9);
        assert!((estimate.position.z + 310.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn unknown_tag_reports_without_estimate() {
        let bus = EventBus::default();
        let mut reports = bus.subscribe_to(Topic::VisibleTags);
        let mut positions = bus.subscribe_to(Topic::VehiclePosition);

        tokio::spawn(run(bus.clone(), registry()));
        tokio::task::yield_now().await;

        bus.publish_to(Topic::RawTags, batch_event(3)).unwrap();

        let report = timeout(Duration::from_secs(1), reports.recv())
            .await
            .expect("report within deadline")
            .expect("bus open");
        let MessagePayload::VisibleTags(report) = report.payload else {
            panic!("wrong payload on VisibleTags topic");
        };
        assert!(report.tags[0].absolute_position.is_none());

        // No estimate must follow for an unsurveyed tag.
        let no_estimate = timeout(Duration::from_millis(100), positions.recv()).await;
        assert!(no_estimate.is_err());
    }

    #[tokio::test]
    async fn foreign_payload_on_raw_topic_is_ignored() {
        let bus = EventBus::default();
        let mut reports = bus.subscribe_to(Topic::VisibleTags);

        tokio::spawn(run(bus.clone(), registry()));
        tokio::task::yield_now().await;

        // A misrouted event must not crash the loop or produce a report.
        let stray = Event::now(
            "misbehaving-publisher",
            MessagePayload::CaptureFault {
                device: "/dev/video0".to_string(),
                message: "misrouted".to_string(),
            },
        );
        bus.publish_to(Topic::RawTags, stray).unwrap();
        bus.publish_to(Topic::RawTags, batch_event(0)).unwrap();

        let report = timeout(Duration::from_secs(1), reports.recv())
            .await
            .expect("loop survived the stray event")
            .expect("bus open");
        assert!(matches!(report.payload, MessagePayload::VisibleTags(_)));
    }
}
