#![deny(unsafe_code)]
//! Batch transport and stream connector traits
//!
//! `Transport` is what the sampling loop hands a finished payload to.
//! `Connector` is the lower seam a stream-based transport (such as the
//! core's HTTP transport) uses to obtain a fresh connection per request.

use embedded_io_async::{Read, Write};

use super::error::TransportError;

/// Sends one serialized batch to a remote endpoint
///
/// Called once per batch from the sampling task. Implementors enforce their
/// own timeouts; the caller never retries.
pub trait Transport {
    /// Deliver `body` to `path`
    ///
    /// Returns `Ok(())` when the peer acknowledged the request in whatever
    /// sense the protocol defines.
    fn send(
        &mut self,
        path: &str,
        body: &[u8],
    ) -> impl core::future::Future<Output = Result<(), TransportError>>;
}

/// Opens byte-stream connections to a fixed remote endpoint
///
/// The endpoint (host, port, TLS settings) is owned by the implementor.
/// The connection may borrow socket buffers from the connector.
pub trait Connector {
    /// Stream type produced by `connect`
    type Connection<'a>: Read + Write
    where
        Self: 'a;

    /// Establish a new connection
    ///
    /// Returns `TransportError::NotConnected` when the link itself is down.
    fn connect(
        &mut self,
    ) -> impl core::future::Future<Output = Result<Self::Connection<'_>, TransportError>>;
}
