//! Message Flows
//!
//! Business logic invoked by the router once a message has been classified.
//! Each flow reports plain success or failure; details are logged by the
//! flow itself.

mod registration;
mod submission;

pub use registration::*;
pub use submission::*;

use async_trait::async_trait;
use serde_json::Value;

/// Handles component registration messages
#[async_trait]
pub trait Registration: Send + Sync + 'static {
    async fn registration(&self, message: &Value) -> bool;
}

/// Handles data submission messages
#[async_trait]
pub trait Submission: Send + Sync + 'static {
    async fn submission(&self, message: &Value) -> bool;
}
