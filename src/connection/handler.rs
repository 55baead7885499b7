//! Connection Handler Module
//!
//! This module handles individual client connections to linekv.
//! Each client gets its own handler task that runs in a loop,
//! reading lines and sending replies.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! 1. Client connects (TCP handshake)
//!        │
//!        ▼
//! 2. ConnectionHandler spawned                       (Open)
//!        │
//!        ▼
//! 3. ┌──────────────────────────────┐
//!    │  Read until a full line      │  (AwaitingLine)
//!    │              │               │
//!    │              ▼               │
//!    │  Parse + execute command     │  (Dispatching)
//!    │              │               │
//!    │              ▼               │
//!    │  Send reply (if any)         │
//!    │              │               │
//!    │         [Loop back]          │
//!    └──────────────────────────────┘
//!        │
//!        ▼
//! 4. EOF / I/O error                                 (Closed)
//! ```
//!
//! ## Buffer Management
//!
//! TCP is a stream protocol: one read may hold half a line or several lines.
//! Incoming bytes accumulate in a BytesMut buffer and complete lines are
//! split off the front of it.

use crate::commands::CommandHandler;
use crate::protocol::types::LF;
use crate::protocol::{parse_line, Reply};
use bytes::BytesMut;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;
use tracing::{debug, error, info, trace, warn};

/// Maximum length of a single line, terminator excluded (64 KB)
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Initial buffer capacity
const INITIAL_BUFFER_SIZE: usize = 4096;

/// Statistics for connection handling
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Total number of connections accepted
    pub connections_accepted: AtomicU64,
    /// Currently active connections
    pub active_connections: AtomicU64,
    /// Total commands processed
    pub commands_processed: AtomicU64,
    /// Total bytes read
    pub bytes_read: AtomicU64,
    /// Total bytes written
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn command_processed(&self) {
        self.commands_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written.fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// Handles a single client connection.
///
/// Generic over the stream so it can run on a `TcpStream` or on any other
/// duplex byte stream.
pub struct ConnectionHandler<S> {
    /// The stream for this connection
    stream: BufWriter<S>,

    /// Client's address (for logging)
    addr: SocketAddr,

    /// Buffer for incoming data
    buffer: BytesMut,

    /// Reusable buffer for outgoing replies
    out: BytesMut,

    /// The command handler (shared storage behind it)
    command_handler: CommandHandler,

    /// Connection statistics (shared)
    stats: Arc<ConnectionStats>,
}

impl<S> ConnectionHandler<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a new connection handler.
    ///
    /// # Arguments
    ///
    /// * `stream` - The byte stream for this connection
    /// * `addr` - The client's socket address
    /// * `command_handler` - The command handler for executing commands
    /// * `stats` - Shared connection statistics
    pub fn new(
        stream: S,
        addr: SocketAddr,
        command_handler: CommandHandler,
        stats: Arc<ConnectionStats>,
    ) -> Self {
        stats.connection_opened();

        Self {
            stream: BufWriter::new(stream),
            addr,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            out: BytesMut::new(),
            command_handler,
            stats,
        }
    }

    /// Runs the main connection loop.
    ///
    /// Reads lines from the client, executes them and sends back replies
    /// until the client disconnects or an error occurs.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        info!(client = %self.addr, "Client connected");

        let result = self.main_loop().await;

        match &result {
            Ok(()) => info!(client = %self.addr, "Client disconnected"),
            Err(ConnectionError::IoError(io_err))
                if io_err.kind() == std::io::ErrorKind::ConnectionReset =>
            {
                debug!(client = %self.addr, "Connection reset by client")
            }
            Err(e) => warn!(client = %self.addr, error = %e, "Connection error"),
        }

        self.stats.connection_closed();
        result
    }

    /// The main read-execute-respond loop.
    async fn main_loop(&mut self) -> Result<(), ConnectionError> {
        loop {
            while let Some(line) = self.next_line() {
                self.dispatch(&line).await?;
            }

            if !self.read_more_data().await? {
                // Client closed its side; an unterminated final line still counts
                if !self.buffer.is_empty() {
                    let rest = self.buffer.split();
                    let line = decode_line(&rest);
                    self.dispatch(&line).await?;
                }
                return Ok(());
            }
        }
    }

    /// Splits the next complete line off the buffer, if there is one.
    fn next_line(&mut self) -> Option<String> {
        let pos = self.buffer.iter().position(|&b| b == LF)?;
        let raw = self.buffer.split_to(pos + 1);
        let line = decode_line(&raw[..pos]);

        trace!(
            client = %self.addr,
            consumed = raw.len(),
            remaining = self.buffer.len(),
            "Framed line"
        );

        Some(line)
    }

    /// Parses and executes one line, writing the reply if there is one.
    async fn dispatch(&mut self, line: &str) -> Result<(), ConnectionError> {
        trace!(client = %self.addr, line = %line, "Dispatching");

        let reply = self.command_handler.execute_parsed(parse_line(line));
        self.stats.command_processed();

        self.send_reply(&reply).await
    }

    /// Reads more data from the stream into the buffer.
    ///
    /// Returns `false` once the peer has closed the connection.
    async fn read_more_data(&mut self) -> Result<bool, ConnectionError> {
        if self.buffer.len() > MAX_LINE_LENGTH {
            error!(
                client = %self.addr,
                size = self.buffer.len(),
                "Line length limit exceeded"
            );
            return Err(ConnectionError::LineTooLong);
        }

        if self.buffer.capacity() - self.buffer.len() < 1024 {
            self.buffer.reserve(4096);
        }

        let n = self.stream.get_mut().read_buf(&mut self.buffer).await?;
        if n == 0 {
            return Ok(false);
        }

        self.stats.bytes_read(n);
        trace!(client = %self.addr, bytes = n, "Read data");

        Ok(true)
    }

    /// Sends a reply to the client. Silent replies write nothing.
    async fn send_reply(&mut self, reply: &Reply) -> Result<(), ConnectionError> {
        if reply.is_silent() {
            return Ok(());
        }

        self.out.clear();
        reply.serialize_into(&mut self.out);

        self.stream.write_all(&self.out).await?;
        self.stream.flush().await?;
        self.stats.bytes_written(self.out.len());
        trace!(
            client = %self.addr,
            bytes = self.out.len(),
            "Sent reply"
        );
        Ok(())
    }
}

/// Decodes raw line bytes, replacing invalid UTF-8, and trims surrounding
/// whitespace (including a trailing `\r`).
fn decode_line(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).trim().to_string()
}

/// Errors that end a connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A line exceeded `MAX_LINE_LENGTH` without a terminator
    #[error("line exceeds {} bytes", MAX_LINE_LENGTH)]
    LineTooLong,
}

/// Handles a client connection.
///
/// This is a convenience function that creates a ConnectionHandler
/// and runs it to completion. Errors are logged, never propagated.
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    command_handler: CommandHandler,
    stats: Arc<ConnectionStats>,
) {
    let handler = ConnectionHandler::new(stream, addr, command_handler, stats);
    if let Err(e) = handler.run().await {
        debug!(client = %addr, error = %e, "Connection ended with error");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageEngine;
    use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;
    use tokio_test::io::Builder;

    fn test_addr() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    async fn run_mock(mock: tokio_test::io::Mock) -> Result<(), ConnectionError> {
        run_mock_with(Arc::new(StorageEngine::new()), mock).await
    }

    async fn run_mock_with(
        storage: Arc<StorageEngine>,
        mock: tokio_test::io::Mock,
    ) -> Result<(), ConnectionError> {
        let stats = Arc::new(ConnectionStats::new());
        let handler = CommandHandler::new(storage);

        ConnectionHandler::new(mock, test_addr(), handler, stats)
            .run()
            .await
    }

    async fn create_test_server() -> (SocketAddr, Arc<StorageEngine>, Arc<ConnectionStats>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let storage = Arc::new(StorageEngine::new());
        let stats = Arc::new(ConnectionStats::new());

        let storage_clone = Arc::clone(&storage);
        let stats_clone = Arc::clone(&stats);

        tokio::spawn(async move {
            while let Ok((stream, client_addr)) = listener.accept().await {
                let handler = CommandHandler::new(Arc::clone(&storage_clone));
                let stats = Arc::clone(&stats_clone);
                tokio::spawn(handle_connection(stream, client_addr, handler, stats));
            }
        });

        (addr, storage, stats)
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let mock = Builder::new().read(b"PUT a 1\nGET a\n").write(b"1\n").build();
        run_mock(mock).await.unwrap();
    }

    #[tokio::test]
    async fn test_get_missing() {
        let mock = Builder::new()
            .read(b"GET missing\n")
            .write(b"key missing not found\n")
            .build();
        run_mock(mock).await.unwrap();
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let mock = Builder::new()
            .read(b"PUT a 1\n")
            .read(b"PUT a 2\n")
            .read(b"GET a\n")
            .write(b"2\n")
            .build();
        run_mock(mock).await.unwrap();
    }

    #[tokio::test]
    async fn test_del_never_written() {
        let mock = Builder::new()
            .read(b"DEL a\nGET a\n")
            .write(b"key a not found\n")
            .build();
        run_mock(mock).await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_command_keeps_connection_open() {
        let mock = Builder::new()
            .read(b"FOO\n")
            .read(b"PUT a 1\nGET a\n")
            .write(b"1\n")
            .build();
        run_mock(mock).await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_command_keeps_connection_open() {
        let mock = Builder::new()
            .read(b"PUT a b c\n")
            .write(b"Invalid put command\n")
            .read(b"GET\n")
            .write(b"Invalid get command\n")
            .read(b"PUT a b\nGET a\n")
            .write(b"b\n")
            .build();
        run_mock(mock).await.unwrap();
    }

    #[tokio::test]
    async fn test_line_split_across_reads() {
        let mock = Builder::new()
            .read(b"PU")
            .read(b"T a 1\r\nGE")
            .read(b"T a\r\n")
            .write(b"1\n")
            .build();
        run_mock(mock).await.unwrap();
    }

    #[tokio::test]
    async fn test_trailing_line_without_newline() {
        let mock = Builder::new().read(b"PUT a 1\nGET a").write(b"1\n").build();
        run_mock(mock).await.unwrap();
    }

    #[tokio::test]
    async fn test_line_too_long() {
        let long = vec![b'a'; MAX_LINE_LENGTH + 1];
        let mock = Builder::new().read(&long).build();

        let result = run_mock(mock).await;
        assert!(matches!(result, Err(ConnectionError::LineTooLong)));
    }

    #[tokio::test]
    async fn test_line_at_max_length_is_accepted() {
        let mut line = b"PUT k ".to_vec();
        line.resize(MAX_LINE_LENGTH, b'v');

        // The terminator arrives in a later read than the full-length line
        let mock = Builder::new().read(&line).read(b"\n").build();
        let storage = Arc::new(StorageEngine::new());

        run_mock_with(Arc::clone(&storage), mock).await.unwrap();

        let value = storage.get("k").unwrap();
        assert_eq!(value.len(), MAX_LINE_LENGTH - "PUT k ".len());
        assert!(value.bytes().all(|b| b == b'v'));
    }

    #[tokio::test]
    async fn test_list_over_tcp() {
        let (addr, _, _) = create_test_server().await;

        let client = TcpStream::connect(addr).await.unwrap();
        let (read_half, mut write_half) = client.into_split();
        let mut reader = BufReader::new(read_half);

        write_half
            .write_all(b"PUT x 1\nPUT y 2\nLIST\n")
            .await
            .unwrap();

        let mut lines = Vec::new();
        for _ in 0..2 {
            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();
            lines.push(line);
        }
        lines.sort();
        assert_eq!(lines, vec!["x=1\n".to_string(), "y=2\n".to_string()]);

        // Nothing else follows the listing
        write_half.write_all(b"GET x\n").await.unwrap();
        let mut line = String::new();
        reader.read_line(&mut line).await.unwrap();
        assert_eq!(line, "1\n");
    }

    #[tokio::test]
    async fn test_connections_share_storage() {
        let (addr, storage, _) = create_test_server().await;

        let mut writer = TcpStream::connect(addr).await.unwrap();
        writer.write_all(b"PUT shared yes\n").await.unwrap();

        // PUT produces no reply, so wait for the write to land
        let deadline = tokio::time::Instant::now() + tokio::time::Duration::from_secs(2);
        while storage.get("shared").is_none() && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
        }

        let mut reader = TcpStream::connect(addr).await.unwrap();
        reader.write_all(b"GET shared\n").await.unwrap();

        let mut buf = [0u8; 64];
        let n = reader.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"yes\n");
    }

    #[tokio::test]
    async fn test_connection_stats() {
        let (addr, _, stats) = create_test_server().await;

        assert_eq!(stats.active_connections.load(Ordering::Relaxed), 0);

        let mut client = TcpStream::connect(addr).await.unwrap();

        // Give the server time to accept the connection
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        assert_eq!(stats.connections_accepted.load(Ordering::Relaxed), 1);
        assert_eq!(stats.active_connections.load(Ordering::Relaxed), 1);

        client.write_all(b"GET nothing\n").await.unwrap();
        let mut buf = [0u8; 64];
        let _ = client.read(&mut buf).await.unwrap();

        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        assert!(stats.commands_processed.load(Ordering::Relaxed) >= 1);
        assert!(stats.bytes_read.load(Ordering::Relaxed) > 0);
        assert!(stats.bytes_written.load(Ordering::Relaxed) > 0);

        // Close connection
        drop(client);

        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        assert_eq!(stats.active_connections.load(Ordering::Relaxed), 0);
    }
}
