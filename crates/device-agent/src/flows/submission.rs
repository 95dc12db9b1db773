//! Data submission flow.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, error};

use super::Submission;
use crate::connector::{Connector, Reading};
use crate::store::SensorStore;

/// Resolves readings against registered components and submits them
///
/// The whole batch fails if any reading names an unknown component.
pub struct DataSubmission {
    store: Arc<SensorStore>,
    connector: Arc<dyn Connector>,
}

impl DataSubmission {
    pub fn new(store: Arc<SensorStore>, connector: Arc<dyn Connector>) -> Self {
        Self { store, connector }
    }

    fn reading(&self, item: &Value, now: i64) -> Option<Reading> {
        let name = item.get("n")?;
        let Some(component) = self.store.by_name(name) else {
            error!("No component registered under name {}", name);
            return None;
        };

        let on = match item.get("on") {
            None => now,
            Some(on) => match epoch_millis(on) {
                Some(on) => on,
                None => {
                    error!("Reading for {} has an invalid timestamp: {}", name, on);
                    return None;
                }
            },
        };

        Some(Reading {
            cid: component.cid?,
            value: item.get("v").cloned().unwrap_or(Value::Null),
            on,
            loc: item
                .get("loc")
                .and_then(|loc| serde_json::from_value(loc.clone()).ok()),
        })
    }
}

/// Integral epoch milliseconds that fit an `i64`, whatever the JSON number encoding
fn epoch_millis(value: &Value) -> Option<i64> {
    if let Some(ms) = value.as_i64() {
        return Some(ms);
    }
    let ms = value.as_f64()?;
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range
    if ms.fract() == 0.0 && ms >= i64::MIN as f64 && ms < i64::MAX as f64 {
        Some(ms as i64)
    } else {
        None
    }
}

#[async_trait]
impl Submission for DataSubmission {
    async fn submission(&self, message: &Value) -> bool {
        let items = match message {
            Value::Array(items) => items.iter().collect::<Vec<_>>(),
            single => vec![single],
        };
        if items.is_empty() {
            return false;
        }

        let now = Utc::now().timestamp_millis();
        let Some(readings) = items
            .into_iter()
            .map(|item| self.reading(item, now))
            .collect::<Option<Vec<_>>>()
        else {
            return false;
        };

        let count = readings.len();
        match self.connector.submit_data(readings).await {
            Ok(()) => {
                debug!(count, "Submitted readings");
                true
            }
            Err(e) => {
                error!("Data submission failed: {}", e);
                false
            }
        }
    }
}
