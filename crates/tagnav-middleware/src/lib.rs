//! `tagnav-middleware` – event transport between pipeline stages.
//!
//! Routes asynchronous data between the capture boundary, the geometry core,
//! and downstream consumers without caring about the data's meaning.
//!
//! # Modules
//!
//! - [`bus`] – Headless, typed, topic-based publish/subscribe event bus built
//!   on Tokio broadcast channels.

pub mod bus;

pub use bus::{EventBus, Topic, TopicReceiver};
