//! Background workers.
//!
//! A [`Worker`] is an isolated thread that owns its handler and shares no
//! state with the caller. Each request travels with its own one-shot reply
//! channel, so a caller holds a [`PendingResponse`] it can poll or wait on.
//! Workers that die (handler panic) are discarded by [`LazyWorker`] and
//! rebuilt on the next request; the failed request is never retried.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub mod loader;
pub mod search;

pub use loader::{LoadedBookmarks, LoaderRequest, LoaderResponse};
pub use search::{search_tree, SearchHit, SearchRequest, SearchResponse};

use crate::model::error::WorkerError;

type Envelope<Req, Resp> = (Req, Sender<Resp>);

/// Handle to a running worker thread.
#[derive(Debug)]
pub struct Worker<Req, Resp> {
    name: String,
    tx: Option<Sender<Envelope<Req, Resp>>>,
    handle: Option<JoinHandle<()>>,
}

impl<Req, Resp> Worker<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    /// Start a worker thread running `handler` for each request.
    ///
    /// # Errors
    ///
    /// `WorkerError::Spawn` if the OS refuses the thread.
    pub fn spawn<H>(name: impl Into<String>, mut handler: H) -> Result<Self, WorkerError>
    where
        H: FnMut(Req) -> Resp + Send + 'static,
    {
        let name = name.into();
        let (tx, rx) = mpsc::channel::<Envelope<Req, Resp>>();
        let handle = thread::Builder::new()
            .name(format!("bmb-{name}"))
            .spawn(move || {
                while let Ok((request, reply)) = rx.recv() {
                    // The caller may have stopped waiting.
                    let _ = reply.send(handler(request));
                }
            })
            .map_err(|err| WorkerError::Spawn {
                name: name.clone(),
                reason: err.to_string(),
            })?;
        tracing::debug!(worker = %name, "worker started");

        Ok(Self {
            name,
            tx: Some(tx),
            handle: Some(handle),
        })
    }

    /// Send one request.
    ///
    /// # Errors
    ///
    /// `WorkerError::Disconnected` if the worker has stopped.
    pub fn post(&self, request: Req) -> Result<PendingResponse<Resp>, WorkerError> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| WorkerError::Disconnected(self.name.clone()))?;
        let (reply_tx, reply_rx) = mpsc::channel();
        tx.send((request, reply_tx))
            .map_err(|_| WorkerError::Disconnected(self.name.clone()))?;
        Ok(PendingResponse {
            name: self.name.clone(),
            rx: reply_rx,
        })
    }

    /// Worker name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the thread is still running.
    pub fn is_alive(&self) -> bool {
        self.tx.is_some() && self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop accepting requests; the thread exits after its current request.
    pub fn terminate(&mut self) {
        if self.tx.take().is_some() {
            tracing::debug!(worker = %self.name, "worker terminated");
        }
        // Detached: a handler stuck in I/O must not block the caller.
        self.handle.take();
    }
}

impl<Req, Resp> Drop for Worker<Req, Resp> {
    fn drop(&mut self) {
        self.tx.take();
    }
}

/// A response that has not been consumed yet.
#[derive(Debug)]
pub struct PendingResponse<Resp> {
    name: String,
    rx: Receiver<Resp>,
}

impl<Resp> PendingResponse<Resp> {
    /// Non-blocking check.
    ///
    /// # Errors
    ///
    /// `WorkerError::Disconnected` if the worker died before answering.
    pub fn try_take(&mut self) -> Result<Option<Resp>, WorkerError> {
        match self.rx.try_recv() {
            Ok(response) => Ok(Some(response)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(WorkerError::Disconnected(self.name.clone())),
        }
    }

    /// Block for up to `timeout`.
    ///
    /// # Errors
    ///
    /// `WorkerError::Timeout` or `WorkerError::Disconnected`.
    pub fn wait(self, timeout: Duration) -> Result<Resp, WorkerError> {
        self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => WorkerError::Timeout {
                name: self.name.clone(),
                timeout,
            },
            RecvTimeoutError::Disconnected => WorkerError::Disconnected(self.name.clone()),
        })
    }
}

type SharedHandler<Req, Resp> = Arc<dyn Fn(Req) -> Resp + Send + Sync>;

/// A worker created on first use and recreated after transport failure.
pub struct LazyWorker<Req, Resp> {
    name: String,
    handler: SharedHandler<Req, Resp>,
    worker: Option<Worker<Req, Resp>>,
    spawn_count: usize,
}

impl<Req, Resp> std::fmt::Debug for LazyWorker<Req, Resp> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyWorker")
            .field("name", &self.name)
            .field("running", &self.worker.is_some())
            .field("spawn_count", &self.spawn_count)
            .finish_non_exhaustive()
    }
}

impl<Req, Resp> LazyWorker<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    /// No thread is started until the first request.
    pub fn new<H>(name: impl Into<String>, handler: H) -> Self
    where
        H: Fn(Req) -> Resp + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            handler: Arc::new(handler),
            worker: None,
            spawn_count: 0,
        }
    }

    /// Send `request`, starting a worker if none is running.
    ///
    /// # Errors
    ///
    /// Spawn or transport failures. The worker is discarded either way and
    /// the request is dropped.
    pub fn request(&mut self, request: Req) -> Result<PendingResponse<Resp>, WorkerError> {
        if self.worker.as_ref().is_some_and(|w| !w.is_alive()) {
            tracing::info!(worker = %self.name, "discarding dead worker");
            self.worker = None;
        }
        if self.worker.is_none() {
            let handler = Arc::clone(&self.handler);
            self.worker = Some(Worker::spawn(self.name.clone(), move |req| handler(req))?);
            self.spawn_count += 1;
        }

        let Some(worker) = self.worker.as_ref() else {
            return Err(WorkerError::Disconnected(self.name.clone()));
        };
        match worker.post(request) {
            Ok(pending) => Ok(pending),
            Err(err) => {
                tracing::warn!(worker = %self.name, error = %err, "worker request failed");
                self.worker = None;
                Err(err)
            }
        }
    }

    /// Drop the current worker after a transport failure seen by the caller.
    pub fn discard(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            worker.terminate();
        }
    }

    /// Whether a worker thread is currently held.
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(Worker::is_alive)
    }

    /// Threads started so far.
    pub fn spawn_count(&self) -> usize {
        self.spawn_count
    }

    /// Stop the worker, if any.
    pub fn terminate(&mut self) {
        self.discard();
    }
}
