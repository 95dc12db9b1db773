//! Shared test doubles.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use crate::connector::{Connector, Reading};
use crate::error::{ConnectorError, ConnectorResult};
use crate::store::Component;

/// Connector recording every call
#[derive(Default)]
pub struct RecordingConnector {
    pub fail: AtomicBool,
    pub registrations: Mutex<Vec<Component>>,
    pub submissions: Mutex<Vec<Vec<Reading>>>,
    pub updates: AtomicUsize,
}

impl RecordingConnector {
    pub fn failing() -> Self {
        let connector = Self::default();
        connector.fail.store(true, Ordering::SeqCst);
        connector
    }

    fn check(&self) -> ConnectorResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            Err(ConnectorError::Transport("unreachable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Connector for RecordingConnector {
    async fn register_component(&self, component: &Component) -> ConnectorResult<()> {
        self.check()?;
        self.registrations.lock().push(component.clone());
        Ok(())
    }

    async fn submit_data(&self, readings: Vec<Reading>) -> ConnectorResult<()> {
        self.check()?;
        self.submissions.lock().push(readings);
        Ok(())
    }

    async fn update(&self, message: Value) -> Value {
        self.updates.fetch_add(1, Ordering::SeqCst);
        json!({ "echo": message })
    }
}
