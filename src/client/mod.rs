//! Clients for remote platform services.

mod events;

pub use events::{InstanceEvent, InstanceEventClient};
