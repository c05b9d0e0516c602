//! # kvgrid
//! Worker membership and registration subsystem for a distributed key-value
//! cluster coordinator.
//!
//! Storage workers join the coordinator's membership registry over TCP: each
//! worker connects, sends a single `register` message carrying its descriptor
//! string (`"<id>@<host>:<port>"`), and receives a single `resp` message
//! back: either an echo of the descriptor on success or a fixed format-error
//! string on any failure. The coordinator later dials registered workers
//! through timeout-bound outbound connections for transaction traffic.
//!
//! # Goals
//! - A bounded registration pool whose accept path never blocks
//! - Explicit, typed error handling at every fallible step
//! - A registry contract safe for any number of concurrent registrations
//!
//! ## Getting started
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use kvgrid::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> kvgrid::error::Result<()> {
//!     let registry = Arc::new(InMemoryRegistry::new());
//!     let dispatcher = RegistrationDispatcher::new(registry.clone());
//!     let server = RegistrationServer::bind("127.0.0.1:9090", dispatcher).await?;
//!     server.run().await
//! }
//! ```
//!
//! Dialing a registered worker:
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use kvgrid::descriptor::WorkerDescriptor;
//!
//! # async fn dial() -> kvgrid::error::Result<()> {
//! let descriptor = WorkerDescriptor::parse("7@localhost:9090")?;
//! let mut conn = descriptor.connect(Duration::from_millis(500)).await?;
//! // ... exchange protocol messages ...
//! conn.close().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod constants;
pub mod descriptor;
pub mod dispatcher;
mod encode;
pub mod error;
pub mod message;
mod parser;
pub mod registry;
pub mod server;
pub mod telemetry;

pub mod prelude {
    //! Main exports of the registration subsystem.
    pub use crate::constants::{ERROR_INVALID_FORMAT, MSG_REGISTER, MSG_RESP};
    pub use crate::descriptor::{WorkerConnection, WorkerDescriptor};
    pub use crate::dispatcher::{DispatcherConfig, RegistrationDispatcher};
    pub use crate::error::{Error, Result};
    pub use crate::message::{read_message, write_message, WireMessage};
    pub use crate::registry::{InMemoryRegistry, WorkerRegistry};
    pub use crate::server::RegistrationServer;

    pub use bytes;
}
