use std::sync::{Arc, Mutex, PoisonError};

use derive_more::Debug;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{trace, warn};

/// Where local callbacks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackDelivery {
    /// On the task that received the remote completion
    #[default]
    Direct,
    /// Held until the host drains them with `run_pending_callbacks`,
    /// typically once per frame on its main thread
    Queued,
}

type Job = Box<dyn FnOnce() + Send>;

/// Delivers adapted results to local callbacks.
#[derive(Debug, Clone)]
pub(crate) struct Dispatcher {
    mode: CallbackDelivery,
    #[debug(skip)]
    sender: UnboundedSender<Job>,
    #[debug(skip)]
    receiver: Arc<Mutex<UnboundedReceiver<Job>>>,
}

impl Dispatcher {
    pub fn new(mode: CallbackDelivery) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self { mode, sender, receiver: Arc::new(Mutex::new(receiver)) }
    }

    pub fn deliver(&self, job: impl FnOnce() + Send + 'static) {
        match self.mode {
            CallbackDelivery::Direct => job(),
            CallbackDelivery::Queued => {
                if self.sender.send(Box::new(job)).is_err() {
                    warn!("Callback queue closed, dropping callback");
                }
            }
        }
    }

    /// Runs every queued callback on the calling thread and returns how many ran.
    pub fn run_pending(&self) -> usize {
        let jobs: Vec<Job> = {
            let mut receiver = self.receiver.lock().unwrap_or_else(PoisonError::into_inner);
            std::iter::from_fn(|| receiver.try_recv().ok()).collect()
        };
        let count = jobs.len();
        // Run outside the lock, callbacks may queue more work
        for job in jobs {
            job();
        }
        if count > 0 {
            trace!(count, "Ran queued callbacks");
        }
        count
    }
}
