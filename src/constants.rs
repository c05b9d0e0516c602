//! Centralized protocol and configuration constants.
//!
//! This module consolidates the fixed wire-protocol literals and the default
//! limits used throughout the kvgrid registration subsystem. The protocol
//! literals are load-bearing: workers compare response payloads byte for
//! byte, so their exact values matter for compatibility.

// =============================================================================
// Protocol Constants (registration wire protocol)
// =============================================================================

/// Message type tag carried by a registration request.
pub const MSG_REGISTER: &str = "register";

/// Message type tag carried by every response.
pub const MSG_RESP: &str = "resp";

/// Fixed payload of an error response.
///
/// Every inbound-path failure (unreadable message, wrong type tag, malformed
/// descriptor, registry rejection) collapses to this single string on the
/// wire. Registry rejections are intentionally not distinguished from parse
/// failures in the response.
pub const ERROR_INVALID_FORMAT: &str = "Format Error: Message format incorrect";

/// Prefix of a successful registration response.
///
/// The full payload is this prefix followed by the original descriptor
/// string, e.g. `"Successfully registered 7@localhost:9090"`.
pub const SUCCESS_RESPONSE_PREFIX: &str = "Successfully registered ";

// =============================================================================
// Network Constants
// =============================================================================

/// Maximum size of a single wire frame (64 KB).
///
/// Registration messages are tiny (a type tag plus a descriptor string), so
/// anything near this limit is malformed or malicious. Bounding the frame
/// size prevents memory exhaustion from a bad length prefix.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 64 * 1024;

/// Default timeout for reading a registration request from an inbound
/// connection (30 seconds).
///
/// A worker that connects but never sends its request would otherwise pin a
/// pool slot indefinitely. If the request isn't completely received within
/// this timeout, the task gives up and writes the error response.
pub const DEFAULT_REGISTRATION_READ_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Dispatcher Constants
// =============================================================================

/// Default number of pool workers servicing registration requests.
///
/// A single worker is sufficient for typical cluster sizes; deployments that
/// expect registration storms widen the pool explicitly.
pub const DEFAULT_POOL_SIZE: usize = 1;

/// Default depth of the bounded queue between the acceptor and the pool.
///
/// When the queue is full, further inbound connections are dropped (the
/// worker retries registration). 64 pending connections is generous for a
/// protocol where each exchange is a single request/response.
pub const DEFAULT_QUEUE_DEPTH: usize = 64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_literals_are_exact() {
        // These values are part of the wire contract and must never drift.
        assert_eq!(MSG_REGISTER, "register");
        assert_eq!(MSG_RESP, "resp");
        assert_eq!(
            ERROR_INVALID_FORMAT,
            "Format Error: Message format incorrect"
        );
        assert_eq!(SUCCESS_RESPONSE_PREFIX, "Successfully registered ");
    }

    #[test]
    #[allow(clippy::assertions_on_constants)]
    fn test_limits_are_reasonable() {
        assert!(DEFAULT_MAX_MESSAGE_SIZE >= 1024);
        assert!(DEFAULT_POOL_SIZE >= 1);
        assert!(DEFAULT_QUEUE_DEPTH >= DEFAULT_POOL_SIZE);
    }
}
