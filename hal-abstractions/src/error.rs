#![deny(unsafe_code)]
//! Transport error types

/// Errors a transport or connector can report to the sampling core
///
/// The core logs these and drops the batch; none of them is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Link is down (e.g. Wi-Fi not associated), request not attempted
    NotConnected,
    /// Socket connect/read/write error
    SocketError,
    /// Request timeout
    Timeout,
    /// Peer closed or answered without a status line
    InvalidResponse,
    /// Request head did not fit its buffer
    RequestTooLarge,
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotConnected => write!(f, "Not connected"),
            Self::SocketError => write!(f, "Socket error"),
            Self::Timeout => write!(f, "Request timeout"),
            Self::InvalidResponse => write!(f, "Invalid response"),
            Self::RequestTooLarge => write!(f, "Request too large"),
        }
    }
}

impl core::error::Error for TransportError {}

impl embedded_io_async::Error for TransportError {
    fn kind(&self) -> embedded_io_async::ErrorKind {
        match self {
            Self::SocketError => embedded_io_async::ErrorKind::BrokenPipe,
            Self::NotConnected => embedded_io_async::ErrorKind::NotConnected,
            Self::Timeout => embedded_io_async::ErrorKind::TimedOut,
            Self::InvalidResponse => embedded_io_async::ErrorKind::InvalidData,
            Self::RequestTooLarge => embedded_io_async::ErrorKind::OutOfMemory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io_async::{Error, ErrorKind};

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(TransportError::SocketError.kind(), ErrorKind::BrokenPipe);
        assert_eq!(TransportError::Timeout.kind(), ErrorKind::TimedOut);
        assert_eq!(TransportError::InvalidResponse.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            std::format!("{}", TransportError::NotConnected),
            "Not connected"
        );
    }
}
