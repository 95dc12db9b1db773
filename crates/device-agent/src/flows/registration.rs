//! Component registration flow.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, info};

use super::Registration;
use crate::connector::Connector;
use crate::store::{Component, SensorStore};

/// Registers components with the cloud and records them in the sensor store
///
/// A component already known by name and type is accepted without
/// contacting the connector.
pub struct ComponentRegistration {
    store: Arc<SensorStore>,
    connector: Arc<dyn Connector>,
}

impl ComponentRegistration {
    pub fn new(store: Arc<SensorStore>, connector: Arc<dyn Connector>) -> Self {
        Self { store, connector }
    }

    fn candidate(message: &Value) -> Option<Component> {
        let name = message.get("n")?.clone();
        let kind = message.get("t")?.clone();
        Some(Component::new(name, kind))
    }
}

#[async_trait]
impl Registration for ComponentRegistration {
    async fn registration(&self, message: &Value) -> bool {
        let Some(candidate) = Self::candidate(message) else {
            error!("Registration message lacks name or type: {}", message);
            return false;
        };

        if let Some(existing) = self.store.exist(&candidate) {
            debug!(cid = ?existing.cid, "Component already registered");
            return true;
        }

        if let Err(e) = self.connector.register_component(&candidate).await {
            error!(name = ?candidate.name, "Component registration rejected: {}", e);
            return false;
        }

        let (stored, added) = self.store.insert_unique(candidate);
        if !added {
            return true;
        }

        match self.store.save().await {
            Ok(()) => {
                info!(cid = ?stored.cid, name = ?stored.name, "Component registered");
                true
            }
            Err(e) => {
                error!("Failed to persist registered component: {}", e);
                if let Some(cid) = &stored.cid {
                    self.store.remove_cid(cid);
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentConfig;
    use crate::test_support::RecordingConnector;
    use serde_json::json;
    use tempfile::TempDir;

    async fn setup(connector: RecordingConnector) -> (TempDir, Arc<SensorStore>, Arc<RecordingConnector>, ComponentRegistration) {
        let dir = TempDir::new().unwrap();
        let config = AgentConfig::with_data_directory(dir.path());
        let store = Arc::new(SensorStore::init("device.json", &config).await);
        let connector = Arc::new(connector);
        let flow = ComponentRegistration::new(store.clone(), connector.clone());
        (dir, store, connector, flow)
    }

    #[tokio::test]
    async fn test_registers_and_persists() {
        let (dir, store, connector, flow) = setup(RecordingConnector::default()).await;

        assert!(flow.registration(&json!({ "n": "temp", "t": "temperature.v1.0" })).await);
        assert_eq!(store.len(), 1);
        assert_eq!(connector.registrations.lock().len(), 1);

        let config = AgentConfig::with_data_directory(dir.path());
        let reloaded = SensorStore::init("device.json", &config).await;
        assert!(reloaded.by_name(&json!("temp")).is_some());
    }

    #[tokio::test]
    async fn test_existing_component_skips_connector() {
        let (_dir, store, connector, flow) = setup(RecordingConnector::default()).await;
        store.add(Component::new("temp", "temperature.v1.0"));

        assert!(flow.registration(&json!({ "n": "temp", "t": "temperature.v1.0" })).await);
        assert_eq!(store.len(), 1);
        assert!(connector.registrations.lock().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_registration_is_not_stored() {
        let (_dir, store, _connector, flow) = setup(RecordingConnector::failing()).await;

        assert!(!flow.registration(&json!({ "n": "temp", "t": "temperature.v1.0" })).await);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_message() {
        let (_dir, _store, _connector, flow) = setup(RecordingConnector::default()).await;
        assert!(!flow.registration(&json!({ "n": "temp" })).await);
    }

    #[tokio::test]
    async fn test_failed_save_does_not_keep_component() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-directory");
        tokio::fs::write(&blocker, "").await.unwrap();

        let config = AgentConfig::with_data_directory(blocker.join("data"));
        let store = Arc::new(SensorStore::init("device.json", &config).await);
        let connector = Arc::new(RecordingConnector::default());
        let flow = ComponentRegistration::new(store.clone(), connector.clone());

        let message = json!({ "n": "temp", "t": "temperature.v1.0" });
        assert!(!flow.registration(&message).await);
        assert!(store.is_empty());

        // A retry goes through the connector and the save again
        assert!(!flow.registration(&message).await);
        assert!(store.is_empty());
        assert_eq!(connector.registrations.lock().len(), 2);
    }
}
