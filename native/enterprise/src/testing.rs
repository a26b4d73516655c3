//! In-process stand-ins for the service and the host's connection manager.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::{sync::oneshot, time::timeout};
use tokio_stream::StreamExt;

use crate::{
    config::ProxyConfig,
    connector::{BindEvents, ServiceAddress, ServiceConnector},
    dispatch::CallbackDelivery,
    models::BindState,
    proxy::ServiceProxy,
    remote::{
        EventSink, RemoteCall, RemoteError, RemoteEvent, RemoteQuery, RemoteService, RemoteValue,
        Reply, Topic,
    },
};

const WAIT: Duration = Duration::from_secs(5);

/// Records every call and lets the test decide how and when it completes.
#[derive(Debug, Default)]
pub struct FakeRemote {
    calls: Mutex<Vec<RemoteCall>>,
    queries: Mutex<Vec<RemoteQuery>>,
    pending: Mutex<Vec<(&'static str, Reply)>>,
    answers: Mutex<HashMap<&'static str, RemoteValue>>,
    sinks: Mutex<HashMap<Topic, EventSink>>,
    fault: Mutex<Option<RemoteError>>,
}

impl FakeRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Sets the result of every later query named `query`.
    pub fn answer(&self, query: &'static str, value: RemoteValue) {
        self.answers.lock().unwrap().insert(query, value);
    }

    /// Makes every later call fail with `error`.
    pub fn fail_with(&self, error: RemoteError) {
        *self.fault.lock().unwrap() = Some(error);
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<RemoteQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn pending(&self) -> Vec<&'static str> {
        self.pending.lock().unwrap().iter().map(|(name, _)| *name).collect()
    }

    fn take_pending(&self, operation: &str) -> Reply {
        let mut pending = self.pending.lock().unwrap();
        let index = pending
            .iter()
            .position(|(name, _)| *name == operation)
            .unwrap_or_else(|| panic!("no pending {operation} call"));
        pending.remove(index).1
    }

    /// Completes the oldest outstanding `operation` call with `value`.
    pub fn complete(&self, operation: &str, value: RemoteValue) {
        self.take_pending(operation).send(value);
    }

    /// Drops the oldest outstanding `operation` call without completing it.
    pub fn abandon(&self, operation: &str) {
        drop(self.take_pending(operation));
    }

    /// Pushes `event` to the listener of `topic`, returning whether it was accepted.
    pub fn emit(&self, topic: Topic, event: RemoteEvent) -> bool {
        self.sinks.lock().unwrap().get(&topic).is_some_and(|sink| sink.send(event))
    }

    pub fn listener_closed(&self, topic: Topic) -> bool {
        self.sinks.lock().unwrap().get(&topic).is_none_or(EventSink::is_closed)
    }

    fn check_fault(&self) -> Result<(), RemoteError> {
        match self.fault.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteService for FakeRemote {
    fn transact(&self, call: RemoteCall, reply: Option<Reply>) -> Result<(), RemoteError> {
        self.check_fault()?;
        if let Some(reply) = reply {
            self.pending.lock().unwrap().push((call.name(), reply));
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }

    async fn query(&self, query: RemoteQuery) -> Result<RemoteValue, RemoteError> {
        self.check_fault()?;
        let name = query.name();
        self.queries.lock().unwrap().push(query);
        self.answers
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| RemoteError::Rejected(format!("no answer for {name}")))
    }

    fn subscribe(&self, topic: Topic, sink: EventSink) -> Result<i32, RemoteError> {
        self.check_fault()?;
        self.sinks.lock().unwrap().insert(topic, sink);
        Ok(0)
    }
}

#[derive(Debug, Default)]
pub struct FakeConnector {
    events: Mutex<Vec<BindEvents>>,
    unbinds: AtomicUsize,
    refuse: AtomicBool,
}

impl FakeConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn refuse_binds(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    /// Event sender handed over by the most recent accepted bind.
    pub fn last_events(&self) -> BindEvents {
        self.events.lock().unwrap().last().cloned().expect("no bind requested")
    }

    pub fn binds(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn unbinds(&self) -> usize {
        self.unbinds.load(Ordering::SeqCst)
    }
}

impl ServiceConnector for FakeConnector {
    fn bind(&self, _address: &ServiceAddress, events: BindEvents) -> Result<(), RemoteError> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(RemoteError::Rejected("binding not permitted".to_string()));
        }
        self.events.lock().unwrap().push(events);
        Ok(())
    }

    fn unbind(&self) {
        self.unbinds.fetch_add(1, Ordering::SeqCst);
    }
}

/// Lets spawned tasks run to completion.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

pub async fn wait_for_state(proxy: &ServiceProxy, state: BindState) {
    let mut states = proxy.subscribe_bind_state();
    timeout(WAIT, async {
        while let Some(current) = states.next().await {
            if current == state {
                return;
            }
        }
    })
    .await
    .expect("bind state not reached");
}

pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    timeout(WAIT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached");
}

/// A proxy already bound to a fresh [`FakeRemote`].
pub async fn bound_proxy(
    callbacks: CallbackDelivery,
) -> (Arc<ServiceProxy>, Arc<FakeRemote>, Arc<FakeConnector>) {
    let connector = FakeConnector::new();
    let config = ProxyConfig { callbacks, ..ProxyConfig::default() };
    let proxy = ServiceProxy::new(connector.clone(), &config);
    proxy.bind().await;
    let remote = FakeRemote::new();
    connector.last_events().connected(remote.clone());
    wait_for_state(&proxy, BindState::Bound).await;
    (proxy, remote, connector)
}

/// A callback that forwards its argument to the returned receiver.
pub fn capture<T: Send + 'static>() -> (impl FnOnce(T) + Send + 'static, oneshot::Receiver<T>) {
    let (tx, rx) = oneshot::channel();
    (
        move |value| {
            let _ = tx.send(value);
        },
        rx,
    )
}

/// Waits for a captured callback; `None` when it was dropped without running.
pub async fn captured<T>(receiver: oneshot::Receiver<T>) -> Option<T> {
    timeout(WAIT, receiver).await.expect("callback neither ran nor dropped").ok()
}
