//! Client-side proxy for the enterprise device-management service.
//!
//! The host provides the IPC plumbing through [`ServiceConnector`] and
//! [`RemoteService`]; [`ServiceProxy`] owns the connection and exposes every
//! request the service supports.

use std::{error::Error, path::Path, sync::Arc};

use anyhow::Result;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

pub mod codec;
pub mod config;
pub mod connector;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod models;
pub mod proxy;
pub mod remote;
#[cfg(test)]
mod testing;

pub use config::ProxyConfig;
pub use connector::{BindEvents, ServiceAddress, ServiceConnector};
pub use dispatch::CallbackDelivery;
pub use error::ProxyError;
pub use proxy::ServiceProxy;
pub use remote::{RemoteError, RemoteService};

/// Loads the config at `config_path`, sets up logging and creates an unbound proxy.
///
/// The returned guard must be kept alive while file logging is in use.
pub fn start(
    connector: Arc<dyn ServiceConnector>,
    config_path: &Path,
) -> Result<(Arc<ServiceProxy>, Option<WorkerGuard>)> {
    let loaded = ProxyConfig::load(config_path);
    let config = loaded.as_ref().cloned().unwrap_or_default();
    let guard = logging::init(&config.logging)?;
    if let Err(e) = &loaded {
        warn!(error = e.as_ref() as &dyn Error, "Failed to load config, using defaults");
    }

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        let message = format!("{panic_info}\n{backtrace}");
        error!(message, "Rust panic");
        original_hook(panic_info);
    }));

    info!(version = env!("CARGO_PKG_VERSION"), "Starting enterprise proxy");
    Ok((ServiceProxy::new(connector, &config), guard))
}
