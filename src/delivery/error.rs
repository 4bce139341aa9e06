//! Delivery error definitions.

use thiserror::Error;

/// Errors that can occur while transmitting a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// Network or client-side failure before a response arrived.
    #[error("transport failure: {0}")]
    TransportFailure(String),

    /// The client has no connectivity.
    #[error("client is offline")]
    Offline,

    /// The collection endpoint answered with a non-success status.
    #[error("endpoint rejected record with status {status}")]
    EndpointRejected { status: u16 },

    /// Payload too large for the beacon transport.
    #[error("payload of {size} bytes exceeds beacon limit of {limit} bytes")]
    PayloadTooLarge { size: usize, limit: usize },
}

/// Result type for delivery operations.
pub type DeliveryResult<T> = Result<T, DeliveryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DeliveryError::EndpointRejected { status: 503 };
        assert_eq!(err.to_string(), "endpoint rejected record with status 503");

        let err = DeliveryError::PayloadTooLarge {
            size: 70_000,
            limit: 65_536,
        };
        assert!(err.to_string().contains("70000"));
    }
}
