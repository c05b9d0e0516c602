//! Crate and protocol level errors.
//!
//! # Error Taxonomy
//!
//! Errors fall into three classes with different propagation rules:
//!
//! - **Format errors** (`ParsingError`, `MissingData`, `InvalidDescriptor`,
//!   `UnexpectedMessageType`): anything wrong with an inbound registration.
//!   These are contained inside the registration task and surface on the wire
//!   only as the fixed [`ERROR_INVALID_FORMAT`] response payload.
//! - **Registry errors** (`RegistryRejected`): the coordinator's registry
//!   refused the registration. Collapsed into the same wire response as
//!   format errors; the reason is not distinguished on the wire.
//! - **Connection errors** (`CouldNotConnect`, `CouldNotCreateSocket`,
//!   `CouldNotCloseSocket`): outbound-path failures. These propagate to the
//!   caller of `connect`/`close` as distinct, typed failures so the
//!   transaction layer can tell "host unreachable" from "other I/O failure".
//!
//! [`ERROR_INVALID_FORMAT`]: crate::constants::ERROR_INVALID_FORMAT

use bytes::Bytes;
use std::{io, result};
use thiserror::Error as ThisError;

pub type Result<T> = result::Result<T, Error>;

/// Errors produced by the registration subsystem.
///
/// The display strings of the connection-class variants are fixed protocol
/// messages and must not be reworded.
#[derive(Clone, Debug, ThisError)]
pub enum Error {
    /// An error in the network.
    #[error("IO error: {0:?}")]
    IoError(io::ErrorKind),

    /// Could not parse the wire data.
    #[error("Parsing error: invalid data ({} bytes)", .0.len())]
    ParsingError(Bytes),

    /// Missing data or connection closed.
    #[error("Missing data: {0}")]
    MissingData(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Descriptor string did not match `<id>@<host>:<port>`.
    ///
    /// One variant covers bad shape, bad id, and bad port alike; which field
    /// failed is deliberately not encoded.
    #[error("Unknown Error: Could not parse worker descriptor")]
    InvalidDescriptor,

    /// Inbound message carried a type tag other than `register`.
    #[error("Unexpected message type: {0}")]
    UnexpectedMessageType(String),

    /// The registry refused the registration.
    #[error("Registration rejected: {0}")]
    RegistryRejected(String),

    /// Host name could not be resolved to any address.
    #[error("Network Error: Could not connect")]
    CouldNotConnect,

    /// Connection refused, timed out, or failed during establishment.
    #[error("Network Error: Could not create socket")]
    CouldNotCreateSocket,

    /// Closing an outbound connection failed.
    #[error("Network Error: Could not close socket")]
    CouldNotCloseSocket,
}

impl Error {
    /// Returns true for outbound connection-class errors.
    ///
    /// Callers of `connect`/`close` use this to separate network failures
    /// from format errors, which never originate on the outbound path.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Error::CouldNotConnect | Error::CouldNotCreateSocket | Error::CouldNotCloseSocket
        )
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Error::IoError(a), Error::IoError(b)) => a == b,
            (Error::ParsingError(a), Error::ParsingError(b)) => a == b,
            (Error::MissingData(a), Error::MissingData(b)) => a == b,
            (Error::Config(a), Error::Config(b)) => a == b,
            (Error::InvalidDescriptor, Error::InvalidDescriptor) => true,
            (Error::UnexpectedMessageType(a), Error::UnexpectedMessageType(b)) => a == b,
            (Error::RegistryRejected(a), Error::RegistryRejected(b)) => a == b,
            (Error::CouldNotConnect, Error::CouldNotConnect) => true,
            (Error::CouldNotCreateSocket, Error::CouldNotCreateSocket) => true,
            (Error::CouldNotCloseSocket, Error::CouldNotCloseSocket) => true,
            _ => false,
        }
    }
}

impl Eq for Error {}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::IoError(e.kind())
    }
}
