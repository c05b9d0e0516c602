//! Connection dispatcher and registration tasks.
//!
//! The [`RegistrationDispatcher`] owns a bounded pool of worker tasks fed by
//! a bounded queue. [`RegistrationDispatcher::handle`] enqueues an accepted
//! connection and returns immediately; it never blocks the accept loop. If
//! the queue is full or the pool has shut down, the connection is dropped
//! with a debug record and the worker is expected to retry; registration is
//! idempotent from the worker's perspective.
//!
//! Each queued connection is serviced by exactly one registration task: read
//! one wire message, validate the `register` type tag, parse the descriptor
//! payload, submit it to the registry, and write exactly one response. Every
//! fallible step returns a typed outcome; the task's top level matches on it
//! to pick the response. Inbound failures never propagate past the task.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::constants::{
    DEFAULT_POOL_SIZE, DEFAULT_QUEUE_DEPTH, DEFAULT_REGISTRATION_READ_TIMEOUT_SECS,
    ERROR_INVALID_FORMAT, MSG_REGISTER, MSG_RESP, SUCCESS_RESPONSE_PREFIX,
};
use crate::descriptor::WorkerDescriptor;
use crate::error::{Error, Result};
use crate::message::{read_message, write_message, WireMessage};
use crate::registry::WorkerRegistry;

/// Tuning knobs for the dispatcher.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Number of pool workers. Values below 1 are treated as 1.
    pub pool_size: usize,
    /// Depth of the bounded queue between accept loop and pool.
    pub queue_depth: usize,
    /// Timeout for reading the registration request from a connection.
    pub read_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            queue_depth: DEFAULT_QUEUE_DEPTH,
            read_timeout: Duration::from_secs(DEFAULT_REGISTRATION_READ_TIMEOUT_SECS),
        }
    }
}

/// Dispatches inbound registration connections onto a bounded worker pool.
pub struct RegistrationDispatcher {
    queue_tx: mpsc::Sender<TcpStream>,
    workers: Vec<JoinHandle<()>>,
}

impl RegistrationDispatcher {
    /// Create a dispatcher with a single pool worker and default limits.
    pub fn new(registry: Arc<dyn WorkerRegistry>) -> Self {
        Self::with_config(registry, DispatcherConfig::default())
    }

    /// Create a dispatcher with explicit pool and queue sizing.
    pub fn with_config(registry: Arc<dyn WorkerRegistry>, config: DispatcherConfig) -> Self {
        let pool_size = config.pool_size.max(1);
        let queue_depth = config.queue_depth.max(1);
        let read_timeout = config.read_timeout;

        let (queue_tx, queue_rx) = mpsc::channel::<TcpStream>(queue_depth);
        let queue_rx = Arc::new(Mutex::new(queue_rx));

        let mut workers = Vec::with_capacity(pool_size);
        for worker in 0..pool_size {
            let queue_rx = queue_rx.clone();
            let registry = registry.clone();
            workers.push(tokio::spawn(async move {
                loop {
                    // Hold the lock only while waiting for the next stream,
                    // so siblings can pick up work as soon as it arrives.
                    let next = { queue_rx.lock().await.recv().await };
                    match next {
                        Some(mut stream) => {
                            service_registration(&mut stream, registry.as_ref(), read_timeout)
                                .await;
                        }
                        None => break,
                    }
                }
                tracing::debug!(worker, "Registration pool worker exiting");
            }));
        }

        tracing::info!(pool_size, queue_depth, "Registration dispatcher started");

        Self { queue_tx, workers }
    }

    /// Enqueue an accepted connection for registration servicing.
    ///
    /// Never blocks. If the queue is full or the pool has shut down the
    /// connection is dropped without notifying the caller; the worker
    /// retries.
    pub fn handle(&self, stream: TcpStream) {
        if let Err(e) = self.queue_tx.try_send(stream) {
            tracing::debug!(error = %e, "Dropping inbound registration connection");
        }
    }

    /// Stop accepting work and wait for in-flight registrations to finish.
    pub async fn shutdown(self) {
        drop(self.queue_tx);
        for handle in self.workers {
            let _ = handle.await;
        }
        tracing::debug!("Registration dispatcher stopped");
    }
}

/// Service one registration connection end to end.
///
/// Always attempts to write exactly one response; a failure to write it is
/// recorded and discarded, and the task ends normally regardless.
pub(crate) async fn service_registration<S>(
    stream: &mut S,
    registry: &dyn WorkerRegistry,
    read_timeout: Duration,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let response = match try_register(stream, registry, read_timeout).await {
        Ok(payload) => WireMessage::new(
            MSG_RESP,
            format!("{}{}", SUCCESS_RESPONSE_PREFIX, payload),
        ),
        Err(e) => {
            tracing::debug!(error = %e, "Registration attempt rejected");
            WireMessage::new(MSG_RESP, ERROR_INVALID_FORMAT)
        }
    };

    if let Err(e) = write_message(stream, &response).await {
        tracing::debug!(error = %e, "Failed to write registration response");
    }
}

/// Run the fallible half of a registration: read, validate, parse, register.
///
/// Returns the original descriptor payload on success so the response can
/// echo it back verbatim.
async fn try_register<S>(
    stream: &mut S,
    registry: &dyn WorkerRegistry,
    read_timeout: Duration,
) -> Result<String>
where
    S: AsyncRead + Unpin,
{
    let request = timeout(read_timeout, read_message(stream))
        .await
        .map_err(|_| Error::MissingData("registration read timeout".to_owned()))??;

    if request.msg_type() != MSG_REGISTER {
        return Err(Error::UnexpectedMessageType(request.msg_type().to_string()));
    }

    let descriptor = WorkerDescriptor::parse(request.payload())?;
    registry.register_worker(descriptor).await?;

    Ok(request.payload().to_string())
}
