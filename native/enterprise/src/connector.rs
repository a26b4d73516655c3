//! Connection management seam between the proxy and the host environment.

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::remote::{RemoteError, RemoteService};

/// Identifies the service the connector should bind to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAddress {
    pub package: String,
    pub action: String,
}

impl Default for ServiceAddress {
    fn default() -> Self {
        Self {
            package: "com.pvr.tobservice".to_string(),
            action: "com.pvr.tobservice.ToBService".to_string(),
        }
    }
}

#[derive(Debug)]
pub enum BindEvent {
    Connected(Arc<dyn RemoteService>),
    Failed(String),
    Disconnected,
}

/// Notification channel for one bind request.
///
/// Events are tagged with the request they belong to; the proxy ignores events
/// of a request it has since abandoned.
#[derive(Debug, Clone)]
pub struct BindEvents {
    generation: u64,
    sender: UnboundedSender<(u64, BindEvent)>,
}

impl BindEvents {
    pub(crate) fn new(generation: u64, sender: UnboundedSender<(u64, BindEvent)>) -> Self {
        Self { generation, sender }
    }

    pub fn connected(&self, remote: Arc<dyn RemoteService>) {
        self.send(BindEvent::Connected(remote));
    }

    pub fn failed(&self, reason: impl Into<String>) {
        self.send(BindEvent::Failed(reason.into()));
    }

    pub fn disconnected(&self) {
        self.send(BindEvent::Disconnected);
    }

    fn send(&self, event: BindEvent) {
        if self.sender.send((self.generation, event)).is_err() {
            debug!(generation = self.generation, "Proxy gone, bind event dropped");
        }
    }
}

/// The host's connection-management facility.
pub trait ServiceConnector: Send + Sync + fmt::Debug {
    /// Starts connecting to `address`. The outcome, and any later loss of the
    /// connection, is reported through `events`.
    fn bind(&self, address: &ServiceAddress, events: BindEvents) -> Result<(), RemoteError>;

    /// Releases the connection established by the last `bind`.
    fn unbind(&self);
}
