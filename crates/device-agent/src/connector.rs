//! Cloud Connector
//!
//! The transport towards the cloud service. The wire protocol lives behind
//! the [`Connector`] trait; the agent only needs component registration,
//! data submission and device update.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use crate::error::ConnectorResult;
use crate::store::Component;

/// A single observation bound to a registered component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Component identifier
    pub cid: Value,
    pub value: Value,
    /// Observation time (epoch milliseconds)
    pub on: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Vec<f64>>,
}

/// Transport to the cloud service
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Register a new component for this device
    async fn register_component(&self, component: &Component) -> ConnectorResult<()>;

    /// Submit a batch of readings
    async fn submit_data(&self, readings: Vec<Reading>) -> ConnectorResult<()>;

    /// Forward a device update; the response is returned verbatim
    async fn update(&self, message: Value) -> Value;
}

/// Connector that logs traffic and acknowledges it.
///
/// Used when the agent runs without a cloud endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogConnector;

#[async_trait]
impl Connector for LogConnector {
    async fn register_component(&self, component: &Component) -> ConnectorResult<()> {
        info!(
            name = ?component.name,
            kind = ?component.kind,
            "Component registration (offline)"
        );
        Ok(())
    }

    async fn submit_data(&self, readings: Vec<Reading>) -> ConnectorResult<()> {
        info!(count = readings.len(), "Data submission (offline)");
        Ok(())
    }

    async fn update(&self, message: Value) -> Value {
        info!("Device update (offline): {}", message);
        json!({ "status": "accepted", "offline": true })
    }
}
