//! Sensor Store
//!
//! In-memory, indexed view of the components attached to one device, backed
//! by a single JSON document. The store is write-back: `add` only touches
//! memory and `save` rewrites the whole document.

use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::component::{Component, strict_eq};
use super::document::{SENSOR_LIST, read_document, write_document};
use crate::config::AgentConfig;
use crate::error::StoreResult;

/// Component store for a single device document
///
/// Lookups are linear scans returning the first match in insertion order.
/// Device-local component counts are small, and first-match order is part
/// of the lookup contract.
pub struct SensorStore {
    /// Store (document file) name
    name: String,
    /// Absolute location of the backing document
    path: PathBuf,
    /// Last loaded or saved document, including device-level fields
    document: RwLock<Map<String, Value>>,
    /// Component records in insertion order
    components: RwLock<Vec<Component>>,
    /// Serializes document writes
    save_lock: Mutex<()>,
}

impl SensorStore {
    /// Load the store named `store_name` from the configured data directory.
    ///
    /// Never fails: a missing or unreadable document starts an empty store,
    /// and an absent or malformed `sensor_list` starts an empty collection.
    pub async fn init(store_name: &str, config: &AgentConfig) -> Self {
        let path = config.data_file(store_name);
        let document = read_document(&path).await.unwrap_or_default();

        let components = match document.get(SENSOR_LIST) {
            Some(list) => match serde_json::from_value::<Vec<Component>>(list.clone()) {
                Ok(components) => components,
                Err(e) => {
                    warn!(store = store_name, "Ignoring malformed {}: {}", SENSOR_LIST, e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        info!(
            store = store_name,
            components = components.len(),
            "Loaded sensor store from {}",
            path.display()
        );

        Self {
            name: store_name.to_string(),
            path,
            document: RwLock::new(document),
            components: RwLock::new(components),
            save_lock: Mutex::new(()),
        }
    }

    /// Store name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.components.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.read().is_empty()
    }

    /// Snapshot of all components in order
    pub fn components(&self) -> Vec<Component> {
        self.components.read().clone()
    }

    /// Append a copy of `component` under a freshly generated cid.
    ///
    /// Any cid carried by the argument is replaced. Does not persist.
    pub fn add(&self, component: Component) -> Component {
        let mut components = self.components.write();
        Self::push(&mut components, component)
    }

    /// Return the existing component with the same name and type, or add it.
    ///
    /// The boolean is `true` when the component was added. Check and insert
    /// happen under one lock so concurrent registrations cannot duplicate.
    pub fn insert_unique(&self, component: Component) -> (Component, bool) {
        let mut components = self.components.write();
        if let Some(existing) = components.iter().find(|c| c.same_identity(&component)) {
            return (existing.clone(), false);
        }
        (Self::push(&mut components, component), true)
    }

    fn push(components: &mut Vec<Component>, mut component: Component) -> Component {
        let cid = Self::generate_cid(components);
        debug!(cid = %cid, "Adding component");
        component.cid = Some(Value::String(cid));
        components.push(component.clone());
        component
    }

    fn generate_cid(existing: &[Component]) -> String {
        loop {
            let cid = Uuid::new_v4().to_string();
            if !existing.iter().any(|c| c.cid_str() == Some(cid.as_str())) {
                return cid;
            }
        }
    }

    /// Drop the component with the given cid, returning it
    pub(crate) fn remove_cid(&self, cid: &Value) -> Option<Component> {
        let mut components = self.components.write();
        let index = components
            .iter()
            .position(|c| matches_field(c.cid.as_ref(), cid))?;
        Some(components.remove(index))
    }

    /// First component whose cid strictly equals `cid`
    pub fn by_cid(&self, cid: &Value) -> Option<Component> {
        self.find(|c| matches_field(c.cid.as_ref(), cid))
    }

    /// First component whose name strictly equals `name`
    pub fn by_name(&self, name: &Value) -> Option<Component> {
        self.find(|c| matches_field(c.name.as_ref(), name))
    }

    /// First component whose type strictly equals `kind`; `null` never matches
    pub fn by_type(&self, kind: &Value) -> Option<Component> {
        self.find(|c| matches_field(c.kind.as_ref(), kind))
    }

    /// First component with the same name and type as `candidate`
    pub fn exist(&self, candidate: &Component) -> Option<Component> {
        self.find(|c| c.same_identity(candidate))
    }

    fn find(&self, predicate: impl Fn(&Component) -> bool) -> Option<Component> {
        self.components.read().iter().find(|c| predicate(c)).cloned()
    }

    /// Write the in-memory collection into `sensor_list` and rewrite the document.
    ///
    /// Saves are serialized; the snapshot is taken once the previous save has
    /// finished, so the last save to complete writes the newest collection.
    pub async fn save(&self) -> StoreResult<()> {
        let _guard = self.save_lock.lock().await;
        let document = {
            let components = self.components.read();
            let mut document = self.document.read().clone();
            document.insert(SENSOR_LIST.to_string(), serde_json::to_value(&*components)?);
            document
        };

        write_document(&self.path, &document).await?;
        info!(store = %self.name, "Saved sensor store");

        *self.document.write() = document;
        Ok(())
    }
}

fn matches_field(field: Option<&Value>, wanted: &Value) -> bool {
    !wanted.is_null() && field.is_some_and(|v| strict_eq(v, wanted))
}
