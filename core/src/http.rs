#![deny(unsafe_code)]
//! HTTP/1.1 POST transport
//!
//! Frames each batch as a single `POST` with a JSON content type over a fresh
//! connection from a [`Connector`]. Any well-formed HTTP response counts as
//! delivered; the status code is logged, not interpreted.
//!
//! The connect and the request/response exchange each run under
//! `HttpConfig::timeout_ms`, timed by the transport's own `DelayNs`.
//!
//! # Example
//!
//! ```ignore
//! let config = HttpConfig {
//!     host: "192.168.1.1",
//!     port: 80,
//!     ..HttpConfig::default()
//! };
//! let mut transport = HttpTransport::new(tcp_connector, embassy_time::Delay, config);
//! transport.send("/samples", payload).await?;
//! ```

use core::fmt::Write as _;
use core::future::Future;

use embassy_futures::select::{select, Either};
use embedded_hal_async::delay::DelayNs;
use embedded_io_async::{Read, Write};
use heapless::{String, Vec};
use pulse_hal::{Connector, Transport, TransportError};

/// Request head buffer: request line plus four headers
const HEAD_CAPACITY: usize = 256;

/// Longest status line kept for parsing
const STATUS_LINE_CAPACITY: usize = 64;

/// Response bytes after the status line read for the debug log
const RESPONSE_PREFIX_CAPACITY: usize = 128;

/// HTTP transport configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpConfig {
    /// Server hostname, sent in the `Host` header and logs
    pub host: &'static str,
    /// Server port, for logs (the connector owns the endpoint)
    pub port: u16,
    /// Value of the `Content-Type` header
    pub content_type: &'static str,
    /// Deadline for the connect and for the request/response exchange
    pub timeout_ms: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "192.168.1.1",
            port: 80,
            content_type: "application/json",
            timeout_ms: 5000,
        }
    }
}

/// `Transport` that POSTs each batch over HTTP/1.1
pub struct HttpTransport<C, D> {
    connector: C,
    delay: D,
    config: HttpConfig,
}

impl<C: Connector, D: DelayNs> HttpTransport<C, D> {
    /// Create a transport over `connector`, timing deadlines with `delay`
    pub fn new(connector: C, delay: D, config: HttpConfig) -> Self {
        Self {
            connector,
            delay,
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Underlying connector
    pub fn connector(&self) -> &C {
        &self.connector
    }
}

impl<C: Connector, D: DelayNs> Transport for HttpTransport<C, D> {
    async fn send(&mut self, path: &str, body: &[u8]) -> Result<(), TransportError> {
        info!(
            "POST to http://{}:{}{}",
            self.config.host,
            self.config.port,
            path
        );
        let head = request_head(&self.config, path, body.len())?;
        let timeout_ms = self.config.timeout_ms;

        let mut conn = with_deadline(&mut self.delay, timeout_ms, self.connector.connect())
            .await
            .and_then(|conn| conn)
            .inspect_err(|e| warn!("Connection failed, POST aborted: {}", e))?;

        let status = with_deadline(
            &mut self.delay,
            timeout_ms,
            exchange(&mut conn, head.as_bytes(), body),
        )
        .await
        .and_then(|status| status)
        .inspect_err(|e| warn!("POST failed: {}", e))?;
        info!("response code: {}", status);

        if let Ok(prefix) =
            with_deadline(&mut self.delay, timeout_ms, read_prefix(&mut conn)).await
        {
            if let Some(data) = response_body(&prefix) {
                debug!("response data: {}", data);
            }
        }
        Ok(())
    }
}

/// Run `io`, failing with `Timeout` once `timeout_ms` has passed
///
/// `io` is polled first, so a result that is already available wins over an
/// expired deadline.
async fn with_deadline<D, F>(
    delay: &mut D,
    timeout_ms: u32,
    io: F,
) -> Result<F::Output, TransportError>
where
    D: DelayNs,
    F: Future,
{
    match select(io, delay.delay_ms(timeout_ms)).await {
        Either::First(output) => Ok(output),
        Either::Second(()) => Err(TransportError::Timeout),
    }
}

/// Write the request and read back the status code
async fn exchange<S: Read + Write>(
    conn: &mut S,
    head: &[u8],
    body: &[u8],
) -> Result<u16, TransportError> {
    conn.write_all(head)
        .await
        .map_err(|_| TransportError::SocketError)?;
    conn.write_all(body)
        .await
        .map_err(|_| TransportError::SocketError)?;
    conn.flush().await.map_err(|_| TransportError::SocketError)?;
    read_status(conn).await
}

/// Build the request line and headers
fn request_head(
    config: &HttpConfig,
    path: &str,
    body_len: usize,
) -> Result<String<HEAD_CAPACITY>, TransportError> {
    let mut head = String::new();
    write!(
        head,
        "POST {} HTTP/1.1\r\nHost: {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        path, config.host, config.content_type, body_len
    )
    .map_err(|_| TransportError::RequestTooLarge)?;
    Ok(head)
}

/// Read the status line and return its code
async fn read_status<R: Read>(conn: &mut R) -> Result<u16, TransportError> {
    let mut line: Vec<u8, STATUS_LINE_CAPACITY> = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        let n = conn
            .read(&mut byte)
            .await
            .map_err(|_| TransportError::SocketError)?;
        if n == 0 || byte[0] == b'\n' {
            break;
        }
        if line.push(byte[0]).is_err() {
            break;
        }
    }
    parse_status_line(&line).ok_or(TransportError::InvalidResponse)
}

/// Read what follows the status line, up to `RESPONSE_PREFIX_CAPACITY` bytes
async fn read_prefix<R: Read>(conn: &mut R) -> Vec<u8, RESPONSE_PREFIX_CAPACITY> {
    let mut buf = [0u8; RESPONSE_PREFIX_CAPACITY];
    let mut filled = 0;
    while filled < buf.len() {
        match conn.read(&mut buf[filled..]).await {
            Ok(0) | Err(_) => break,
            Ok(n) => filled += n,
        }
    }
    Vec::from_slice(&buf[..filled]).unwrap_or_default()
}

/// Body part of a response prefix that starts at the header lines
fn response_body(prefix: &[u8]) -> Option<&str> {
    let text = core::str::from_utf8(prefix).ok()?;
    if let Some(body) = text.strip_prefix("\r\n") {
        return Some(body);
    }
    text.split_once("\r\n\r\n").map(|(_, body)| body)
}

/// Parse `HTTP/1.x NNN reason`
fn parse_status_line(line: &[u8]) -> Option<u16> {
    let line = core::str::from_utf8(line).ok()?;
    let mut parts = line.trim_end_matches('\r').split(' ');
    if !parts.next()?.starts_with("HTTP/") {
        return None;
    }
    let code: u16 = parts.next()?.parse().ok()?;
    (100..=599).contains(&code).then_some(code)
}
