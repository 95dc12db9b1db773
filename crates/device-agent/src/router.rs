//! Message Router
//!
//! Classifies inbound agent messages by schema conformance and dispatches
//! each one to exactly one flow. Routes are evaluated in a fixed priority
//! order: component registration, data submission, device update. The
//! first conforming route wins even if a later one would also match.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, error, info};

use crate::connector::Connector;
use crate::flows::{ComponentRegistration, DataSubmission, Registration, Submission};
use crate::schema::{Schema, SchemaValidator, StructuralValidator, builtin};
use crate::store::SensorStore;

/// Outcome delivered for a message that matched no schema
pub const MESSAGE_INVALID: &str = "Message invalid";

/// Kind of an inbound message, as decided by classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    ComponentRegistration,
    DataSubmission,
    DeviceUpdate,
}

/// A schema paired with the flow handling its messages
#[derive(Debug, Clone)]
pub struct Route {
    pub kind: MessageKind,
    pub schema: Schema,
}

impl Route {
    pub fn new(kind: MessageKind, schema: Schema) -> Self {
        Self { kind, schema }
    }
}

/// Default route table in priority order
pub fn default_routes() -> Vec<Route> {
    vec![
        Route::new(MessageKind::ComponentRegistration, builtin::component_registration()),
        Route::new(MessageKind::DataSubmission, builtin::data_submission()),
        Route::new(MessageKind::DeviceUpdate, builtin::device_update()),
    ]
}

/// Result of dispatching one message
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Registration flow result
    Registered(bool),
    /// Data submission flow result
    Submitted(bool),
    /// Connector response to a device update
    Updated(Value),
    /// No schema matched
    Invalid,
}

impl DispatchOutcome {
    /// Whether the dispatched flow reported success
    pub fn is_success(&self) -> bool {
        match self {
            Self::Registered(ok) | Self::Submitted(ok) => *ok,
            Self::Updated(_) => true,
            Self::Invalid => false,
        }
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registered(ok) | Self::Submitted(ok) => write!(f, "{}", ok),
            Self::Updated(response) => write!(f, "{}", response),
            Self::Invalid => f.write_str(MESSAGE_INVALID),
        }
    }
}

/// Routes inbound messages to the registration, submission or update flow
///
/// Holds no per-message state; cheap to clone and share across tasks.
#[derive(Clone)]
pub struct MessageRouter {
    routes: Arc<[Route]>,
    validator: Arc<dyn SchemaValidator>,
    registration: Arc<dyn Registration>,
    submission: Arc<dyn Submission>,
    connector: Arc<dyn Connector>,
}

impl MessageRouter {
    /// Create a router with the built-in schemas and default flows
    pub fn new(store: Arc<SensorStore>, connector: Arc<dyn Connector>) -> Self {
        Self {
            routes: default_routes().into(),
            validator: Arc::new(StructuralValidator),
            registration: Arc::new(ComponentRegistration::new(store.clone(), connector.clone())),
            submission: Arc::new(DataSubmission::new(store, connector.clone())),
            connector,
        }
    }

    /// Replace the schema validator
    pub fn with_validator(mut self, validator: Arc<dyn SchemaValidator>) -> Self {
        self.validator = validator;
        self
    }

    /// Replace the registration flow
    pub fn with_registration(mut self, registration: Arc<dyn Registration>) -> Self {
        self.registration = registration;
        self
    }

    /// Replace the data submission flow
    pub fn with_submission(mut self, submission: Arc<dyn Submission>) -> Self {
        self.submission = submission;
        self
    }

    /// Replace the route table; order is priority order
    pub fn with_routes(mut self, routes: Vec<Route>) -> Self {
        self.routes = routes.into();
        self
    }

    /// Current route table
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Kind of the first route whose schema `message` conforms to
    pub fn classify(&self, message: &Value) -> Option<MessageKind> {
        self.routes
            .iter()
            .find(|route| self.validator.conforms(message, &route.schema))
            .map(|route| route.kind)
    }

    /// Classify `message` and run the matching flow to completion
    pub async fn dispatch(&self, message: Value) -> DispatchOutcome {
        let Some(kind) = self.classify(&message) else {
            debug!("Message matched no schema");
            return DispatchOutcome::Invalid;
        };

        match kind {
            MessageKind::ComponentRegistration => {
                let ok = self.registration.registration(&message).await;
                if !ok {
                    error!("Component registration failed: {}", message);
                }
                DispatchOutcome::Registered(ok)
            }
            MessageKind::DataSubmission => {
                let ok = self.submission.submission(&message).await;
                if !ok {
                    error!("Invalid data submission received: {}", message);
                }
                DispatchOutcome::Submitted(ok)
            }
            MessageKind::DeviceUpdate => {
                let response = self.connector.update(message).await;
                info!("Response received: {}", response);
                DispatchOutcome::Updated(response)
            }
        }
    }

    /// Dispatch `message` in the background and return immediately.
    ///
    /// The outcome is sent on `reply` when one is given; without it the
    /// message is fire-and-forget. Must be called within a tokio runtime.
    pub fn handle(&self, message: Value, reply: Option<oneshot::Sender<DispatchOutcome>>) {
        let router = self.clone();
        tokio::spawn(async move {
            let outcome = router.dispatch(message).await;
            debug!(success = outcome.is_success(), "Message handled: {}", outcome);
            if let Some(reply) = reply {
                let _ = reply.send(outcome);
            }
        });
    }
}
