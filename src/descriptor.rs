//! Worker descriptors and the outbound connection lifecycle.
//!
//! A [`WorkerDescriptor`] is the parsed, validated identity of a storage
//! worker: the id it claims for itself, plus the host and port the
//! coordinator dials for protocol traffic. Descriptors are immutable once
//! parsed and freely shareable; identity is the worker id alone.
//!
//! The wire encoding is `"<id>@<host>:<port>"`, case-sensitive ASCII with no
//! whitespace tolerance. Parsing is a split-and-validate tokenizer rather
//! than a pattern match: each field is checked in place, and every failure
//! collapses to the single [`Error::InvalidDescriptor`] kind.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;

use crate::error::{Error, Result};
use crate::message::{read_message, write_message, WireMessage};

/// Identity and address of a registered storage worker.
#[derive(Debug, Clone)]
pub struct WorkerDescriptor {
    worker_id: i64,
    host: String,
    port: u16,
}

impl WorkerDescriptor {
    /// Parse a descriptor string of the form `"<id>@<host>:<port>"`.
    ///
    /// The three fields must span the entire string: exactly one `@`,
    /// exactly one `:` after it, a base-10 `i64` id, a non-empty host, and a
    /// base-10 port. Any deviation fails with [`Error::InvalidDescriptor`];
    /// which field was at fault is not distinguished.
    pub fn parse(descriptor: &str) -> Result<Self> {
        let (id_part, addr_part) = descriptor.split_once('@').ok_or(Error::InvalidDescriptor)?;
        if addr_part.contains('@') {
            return Err(Error::InvalidDescriptor);
        }

        let (host, port_part) = addr_part.split_once(':').ok_or(Error::InvalidDescriptor)?;
        if port_part.contains(':') || id_part.contains(':') {
            return Err(Error::InvalidDescriptor);
        }
        if host.is_empty() {
            return Err(Error::InvalidDescriptor);
        }

        let worker_id: i64 = id_part.parse().map_err(|_| Error::InvalidDescriptor)?;
        let port: u16 = port_part.parse().map_err(|_| Error::InvalidDescriptor)?;

        Ok(Self {
            worker_id,
            host: host.to_string(),
            port,
        })
    }

    /// The worker-claimed 64-bit identifier.
    pub fn worker_id(&self) -> i64 {
        self.worker_id
    }

    /// Hostname or IP literal of the worker.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// TCP port the worker listens on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Open a timeout-bound TCP connection to this worker.
    ///
    /// The timeout bounds name resolution, connection establishment, and all
    /// subsequent reads on the returned [`WorkerConnection`]. Name-resolution
    /// failure reports [`Error::CouldNotConnect`]; refusal, timeout, or any
    /// other I/O failure during establishment reports
    /// [`Error::CouldNotCreateSocket`]. The descriptor does not retain
    /// ownership of the connection.
    pub async fn connect(&self, connect_timeout: Duration) -> Result<WorkerConnection> {
        let addr = timeout(
            connect_timeout,
            lookup_host((self.host.as_str(), self.port)),
        )
        .await
        .map_err(|_| Error::CouldNotCreateSocket)?
        .map_err(|_| Error::CouldNotConnect)?
        .next()
        .ok_or(Error::CouldNotConnect)?;

        let stream = timeout(connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| Error::CouldNotCreateSocket)?
            .map_err(|e| {
                tracing::debug!(
                    worker_id = self.worker_id,
                    host = %self.host,
                    port = self.port,
                    error = ?e.kind(),
                    "Outbound connect failed"
                );
                Error::CouldNotCreateSocket
            })?;

        Ok(WorkerConnection {
            stream,
            io_timeout: connect_timeout,
        })
    }
}

impl fmt::Display for WorkerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.worker_id, self.host, self.port)
    }
}

// Registry identity is the worker id; host and port are not compared.
impl PartialEq for WorkerDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.worker_id == other.worker_id
    }
}

impl Eq for WorkerDescriptor {}

impl Hash for WorkerDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.worker_id.hash(state);
    }
}

/// An open, timeout-configured connection to a worker.
///
/// Created by [`WorkerDescriptor::connect`]; the caller owns it for the
/// duration of one protocol exchange and closes it when done.
#[derive(Debug)]
pub struct WorkerConnection {
    stream: TcpStream,
    io_timeout: Duration,
}

impl WorkerConnection {
    /// Read one wire message, bounded by the connection's timeout.
    pub async fn read_message(&mut self) -> Result<WireMessage> {
        timeout(self.io_timeout, read_message(&mut self.stream))
            .await
            .map_err(|_| Error::IoError(std::io::ErrorKind::TimedOut))?
    }

    /// Write one wire message, bounded by the connection's timeout.
    pub async fn write_message(&mut self, message: &WireMessage) -> Result<()> {
        timeout(self.io_timeout, write_message(&mut self.stream, message))
            .await
            .map_err(|_| Error::IoError(std::io::ErrorKind::TimedOut))?
    }

    /// Address of the worker end of this connection.
    pub fn peer_addr(&self) -> Result<std::net::SocketAddr> {
        self.stream.peer_addr().map_err(Error::from)
    }

    /// Close the connection.
    ///
    /// Best-effort from the caller's perspective: a failure surfaces as
    /// [`Error::CouldNotCloseSocket`], but callers are expected not to abort
    /// completed work on account of it. Calling close on an already-closed
    /// connection may report the same error and is otherwise harmless.
    pub async fn close(&mut self) -> Result<()> {
        self.stream
            .shutdown()
            .await
            .map_err(|_| Error::CouldNotCloseSocket)
    }
}
