use std::{
    collections::HashMap,
    error::Error,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError, Weak,
        atomic::{AtomicU64, Ordering},
    },
};

use derive_more::Debug;
use lazy_regex::{Lazy, Regex, lazy_regex};
use tokio::sync::{
    RwLock,
    mpsc::{self, UnboundedReceiver, UnboundedSender},
    watch,
};
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span, debug, error, info, info_span, instrument, trace, warn};

use crate::{
    config::ProxyConfig,
    connector::{BindEvent, BindEvents, ServiceAddress, ServiceConnector},
    dispatch::Dispatcher,
    error::{ProxyError, Result},
    models::BindState,
    remote::{
        EventSink, RemoteCall, RemoteEvent, RemoteQuery, RemoteService, RemoteValue, Reply, Topic,
    },
};

mod control;
mod display;
mod space;
mod status;

pub static PACKAGE_NAME_REGEX: Lazy<Regex> = lazy_regex!(r"^(?:[A-Za-z]{1}[\w]*\.)+[A-Za-z][\w]*$");

/// Validates a package name and returns an error if invalid
pub fn ensure_valid_package(package_name: &str) -> Result<()> {
    if PACKAGE_NAME_REGEX.is_match(package_name) {
        Ok(())
    } else {
        Err(ProxyError::InvalidPackage(package_name.to_string()))
    }
}

type BindCallback = Arc<dyn Fn(bool) + Send + Sync>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Logs a failed request. Requests made without a connection are expected
/// during startup and teardown, so they only warn.
fn report(error: &ProxyError) {
    if error.is_unbound() {
        warn!(error = error as &dyn Error, "Request dropped");
    } else {
        error!(error = error as &dyn Error, "Request failed");
    }
}

/// Unwraps a query result, logging the failure and falling back to `sentinel`.
fn or_sentinel<T: std::fmt::Debug>(result: Result<T>, sentinel: T) -> T {
    result.unwrap_or_else(|e| {
        report(&e);
        trace!(?sentinel, "Returning sentinel");
        sentinel
    })
}

fn unexpected_event<T>(event: RemoteEvent) -> Option<T> {
    warn!(?event, "Dropping event of an unexpected kind");
    None
}

/// Client-side handle to the device-management service.
///
/// Owns the single connection to the service and forwards every request
/// through it. Requests made while no connection is bound are logged and
/// dropped; callbacks of dropped requests never run.
#[derive(Debug)]
pub struct ServiceProxy {
    connector: Arc<dyn ServiceConnector>,
    address: ServiceAddress,
    /// Bound service, if any. The write lock serializes bind state transitions
    remote: RwLock<Option<Arc<dyn RemoteService>>>,
    state: watch::Sender<BindState>,
    /// Bumped on every bind and unbind, bind events of older generations are stale
    generation: AtomicU64,
    #[debug(skip)]
    bind_callback: Mutex<Option<BindCallback>>,
    events: UnboundedSender<(u64, BindEvent)>,
    /// Parent token of every listener forwarder of the current connection
    session: Mutex<CancellationToken>,
    listeners: Mutex<HashMap<Topic, CancellationToken>>,
    dispatcher: Dispatcher,
    shutdown: CancellationToken,
}

impl ServiceProxy {
    /// Creates an unbound proxy and starts its bind event loop.
    ///
    /// Must be called from within a tokio runtime.
    #[instrument(skip(connector, config))]
    pub fn new(connector: Arc<dyn ServiceConnector>, config: &ProxyConfig) -> Arc<Self> {
        let (events, receiver) = mpsc::unbounded_channel();
        let proxy = Arc::new(Self {
            connector,
            address: config.service.clone(),
            remote: RwLock::new(None),
            state: watch::Sender::new(BindState::Unbound),
            generation: AtomicU64::new(0),
            bind_callback: Mutex::new(None),
            events,
            session: Mutex::new(CancellationToken::new()),
            listeners: Mutex::new(HashMap::new()),
            dispatcher: Dispatcher::new(config.callbacks),
            shutdown: CancellationToken::new(),
        });

        tokio::spawn({
            let handle = Arc::downgrade(&proxy);
            let shutdown = proxy.shutdown.clone();
            async move {
                let result =
                    shutdown.run_until_cancelled(Self::handle_bind_events(handle, receiver)).await;
                debug!(result = ?result, "Bind event loop finished");
            }
            .instrument(info_span!("task_handle_bind_events"))
        });
        proxy
    }

    async fn handle_bind_events(
        handle: Weak<Self>,
        mut receiver: UnboundedReceiver<(u64, BindEvent)>,
    ) {
        while let Some((generation, event)) = receiver.recv().await {
            let Some(proxy) = handle.upgrade() else {
                break;
            };
            proxy.on_bind_event(generation, event).await;
        }
    }

    #[instrument(skip(self))]
    async fn on_bind_event(&self, generation: u64, event: BindEvent) {
        let mut remote = self.remote.write().await;
        let current = self.generation.load(Ordering::SeqCst);
        if generation != current {
            // Dropping a stale connection releases it
            debug!(generation, current, "Ignoring stale bind event");
            return;
        }

        let outcome = match (event, self.bind_state()) {
            (BindEvent::Connected(service), BindState::Pending) => {
                *remote = Some(service);
                self.set_state(BindState::Bound);
                info!("Service bound");
                Some(true)
            }
            (BindEvent::Failed(reason), BindState::Pending) => {
                warn!(reason, "Failed to bind service");
                self.set_state(BindState::Unbound);
                Some(false)
            }
            (BindEvent::Disconnected, BindState::Bound | BindState::Pending) => {
                warn!("Service disconnected");
                remote.take();
                self.end_session();
                self.set_state(BindState::Unbound);
                self.connector.unbind();
                Some(false)
            }
            (event, state) => {
                debug!(?event, %state, "Ignoring unexpected bind event");
                None
            }
        };
        drop(remote);

        if let Some(bound) = outcome {
            self.notify_bind(bound);
        }
    }

    /// Starts binding to the service. The outcome is reported to the bind
    /// callback and through [`ServiceProxy::subscribe_bind_state`].
    #[instrument(skip(self))]
    pub async fn bind(&self) {
        let _remote = self.remote.write().await;
        let state = self.bind_state();
        if state != BindState::Unbound {
            info!(%state, "Bind already in progress or done, ignoring");
            return;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.set_state(BindState::Pending);
        info!(generation, package = %self.address.package, "Binding service");
        let events = BindEvents::new(generation, self.events.clone());
        if let Err(e) = self.connector.bind(&self.address, events) {
            error!(error = &e as &dyn Error, "Connector refused to bind");
            // Reported like any other failure, after this call returns
            if self.events.send((generation, BindEvent::Failed(e.to_string()))).is_err() {
                debug!("Bind event loop stopped, failure not reported");
            }
        }
    }

    /// Drops the connection and cancels all listeners. Does not invoke the
    /// bind callback.
    #[instrument(skip(self))]
    pub async fn unbind(&self) {
        let mut remote = self.remote.write().await;
        if self.bind_state() == BindState::Unbound {
            debug!("Service not bound, nothing to unbind");
            return;
        }

        self.generation.fetch_add(1, Ordering::SeqCst);
        remote.take();
        self.end_session();
        self.set_state(BindState::Unbound);
        self.connector.unbind();
        info!("Service unbound");
    }

    /// Sets the callback invoked with `true` when a bind succeeds and with
    /// `false` when it fails or the connection is lost. Replaces any previous one.
    pub fn set_bind_callback(&self, callback: impl Fn(bool) + Send + Sync + 'static) {
        *lock(&self.bind_callback) = Some(Arc::new(callback));
    }

    pub fn bind_state(&self) -> BindState {
        *self.state.borrow()
    }

    pub fn is_bound(&self) -> bool {
        self.bind_state().is_bound()
    }

    /// Stream of bind states, starting with the current one.
    pub fn subscribe_bind_state(&self) -> WatchStream<BindState> {
        WatchStream::new(self.state.subscribe())
    }

    /// Runs callbacks held back by [`CallbackDelivery::Queued`] delivery.
    ///
    /// [`CallbackDelivery::Queued`]: crate::dispatch::CallbackDelivery::Queued
    pub fn run_pending_callbacks(&self) -> usize {
        self.dispatcher.run_pending()
    }

    /// Stops processing bind events. The current connection, if any, stays
    /// installed until [`ServiceProxy::unbind`].
    pub fn shutdown(&self) {
        info!("Shutting down service proxy");
        self.shutdown.cancel();
    }

    fn set_state(&self, state: BindState) {
        let previous = self.state.send_replace(state);
        debug!(%previous, %state, "Bind state changed");
    }

    fn notify_bind(&self, bound: bool) {
        let callback = lock(&self.bind_callback).clone();
        match callback {
            Some(callback) => self.dispatcher.deliver(move || callback(bound)),
            None => trace!(bound, "No bind callback set"),
        }
    }

    /// Cancels every listener forwarder of the current connection.
    fn end_session(&self) {
        let previous = std::mem::replace(&mut *lock(&self.session), CancellationToken::new());
        previous.cancel();
        let cancelled = lock(&self.listeners).drain().count();
        debug!(cancelled, "Listeners cancelled");
    }

    /// Attempts to get the bound service
    async fn try_current_remote(&self) -> Option<Arc<dyn RemoteService>> {
        self.remote.read().await.as_ref().map(Arc::clone)
    }

    /// Gets the bound service or returns an error naming `operation`
    async fn current_remote(&self, operation: &'static str) -> Result<Arc<dyn RemoteService>> {
        self.try_current_remote().await.ok_or(ProxyError::Unbound { operation })
    }

    /// Issues a call that returns nothing.
    async fn send(&self, call: RemoteCall) {
        let operation = call.name();
        let result = match self.current_remote(operation).await {
            Ok(remote) => remote
                .transact(call, None)
                .map_err(|source| ProxyError::Remote { operation, source }),
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => trace!(operation, "Call sent"),
            Err(e) => report(&e),
        }
    }

    /// Issues a call answered through a [`Reply`] and hands the adapted result
    /// to `callback`, at most once and never before this returns.
    async fn request<T: Send + 'static>(
        &self,
        call: RemoteCall,
        adapt: impl FnOnce(RemoteValue) -> std::result::Result<T, RemoteValue> + Send + 'static,
        callback: impl FnOnce(T) + Send + 'static,
    ) {
        let operation = call.name();
        let remote = match self.current_remote(operation).await {
            Ok(remote) => remote,
            Err(e) => return report(&e),
        };

        let (reply, receiver) = Reply::channel();
        if let Err(source) = remote.transact(call, Some(reply)) {
            return report(&ProxyError::Remote { operation, source });
        }
        trace!(operation, "Request sent, awaiting reply");

        let dispatcher = self.dispatcher.clone();
        tokio::spawn(
            async move {
                let Ok(value) = receiver.await else {
                    debug!(operation, "Reply dropped without a result");
                    return;
                };
                match adapt(value) {
                    Ok(result) => dispatcher.deliver(move || callback(result)),
                    Err(got) => report(&ProxyError::UnexpectedReply { operation, got }),
                }
            }
            .instrument(Span::current()),
        );
    }

    /// Issues a query and adapts its result.
    async fn query<T>(
        &self,
        query: RemoteQuery,
        adapt: impl FnOnce(RemoteValue) -> std::result::Result<T, RemoteValue>,
    ) -> Result<T> {
        let operation = query.name();
        let remote = self.current_remote(operation).await?;
        let value =
            remote.query(query).await.map_err(|source| ProxyError::Remote { operation, source })?;
        adapt(value).map_err(|got| ProxyError::UnexpectedReply { operation, got })
    }

    /// Registers a listener for `topic` and forwards its events to `callback`
    /// until the connection ends or the listener is replaced.
    async fn listen<T: Send + 'static>(
        &self,
        topic: Topic,
        adapt: impl Fn(RemoteEvent) -> Option<T> + Send + 'static,
        callback: impl Fn(T) + Send + Sync + 'static,
    ) -> Result<i32> {
        let operation = topic.name();
        // Held until the forwarder is registered, so an unbind cannot slip in between
        let remote = self.remote.read().await;
        let service = remote.as_ref().ok_or(ProxyError::Unbound { operation })?;
        let (sink, mut receiver) = EventSink::channel();
        let code = service
            .subscribe(topic, sink)
            .map_err(|source| ProxyError::Remote { operation, source })?;

        let token = lock(&self.session).child_token();
        if let Some(previous) = lock(&self.listeners).insert(topic, token.clone()) {
            debug!(topic = operation, "Replacing listener");
            previous.cancel();
        }
        drop(remote);

        let dispatcher = self.dispatcher.clone();
        let callback = Arc::new(callback);
        tokio::spawn(
            async move {
                let forward = async move {
                    while let Some(event) = receiver.recv().await {
                        let Some(payload) = adapt(event) else {
                            continue;
                        };
                        let callback = callback.clone();
                        dispatcher.deliver(move || callback(payload));
                    }
                };
                let result = token.run_until_cancelled(forward).await;
                debug!(cancelled = result.is_none(), "Listener forwarder finished");
            }
            .instrument(info_span!("task_forward_events", topic = operation)),
        );
        info!(topic = operation, code, "Listener registered");
        Ok(code)
    }
}
