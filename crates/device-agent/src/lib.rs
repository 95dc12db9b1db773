//! Device Agent
//!
//! Local agent component for a connected device:
//! - Sensor store: indexed, persisted component records for the device
//! - Message router: schema-driven dispatch of inbound agent messages
//! - Default registration and data submission flows
//! - UDP intake for messages pushed by local applications

// Configuration
pub mod config;

pub mod error;

// Component records and persistence
pub mod store;

// Message schemas and validation
pub mod schema;

// Cloud transport
pub mod connector;

// Registration and submission flows
pub mod flows;

// Schema-driven dispatch
pub mod router;

// UDP intake
pub mod listener;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::AgentConfig;
pub use router::{DispatchOutcome, MessageRouter};
pub use store::{Component, SensorStore};
