//! MCP server over the stdio transport.
//!
//! Reads one JSON-RPC message per line, hands it to the [`Dispatcher`] and
//! writes the reply. Notifications are dispatched but never answered, as
//! JSON-RPC requires. The loop ends on EOF, SIGINT or SIGTERM.

use std::io;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, warn};

use crate::dictionary::Dictionary;
use crate::mcp::dispatcher::Dispatcher;
use crate::mcp::protocol::{parse_message, JsonRpcError};
use crate::mcp::transport::StdioTransport;

/// The MCP server for dictionary search over stdio.
pub struct McpServer<D, R = tokio::io::Stdin, W = tokio::io::Stdout> {
    /// Method routing.
    dispatcher: Dispatcher<D>,
    /// The transport layer.
    transport: StdioTransport<R, W>,
}

impl<D: Dictionary> McpServer<D> {
    /// Creates a server on stdin/stdout.
    #[must_use]
    pub fn new(dictionary: D) -> Self {
        Self::with_transport(dictionary, StdioTransport::new())
    }
}

impl<D, R, W> McpServer<D, R, W>
where
    D: Dictionary,
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a server on an arbitrary transport.
    pub const fn with_transport(dictionary: D, transport: StdioTransport<R, W>) -> Self {
        Self {
            dispatcher: Dispatcher::new(dictionary),
            transport,
        }
    }

    /// Runs the MCP server main loop with graceful shutdown handling.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn run(&mut self) -> io::Result<()> {
        self.run_with_shutdown().await
    }

    /// Serves until the input reaches EOF, without signal handling.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn serve(&mut self) -> io::Result<()> {
        loop {
            let line_result = self.transport.read_line().await;
            if self.handle_transport_result(line_result).await? {
                return Ok(());
            }
        }
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(unix)]
    async fn run_with_shutdown(&mut self) -> io::Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt()).map_err(io::Error::other)?;
        let mut sigterm = signal(SignalKind::terminate()).map_err(io::Error::other)?;

        loop {
            tokio::select! {
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT, initiating graceful shutdown");
                    return Ok(());
                }

                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating graceful shutdown");
                    return Ok(());
                }

                line_result = self.transport.read_line() => {
                    if self.handle_transport_result(line_result).await? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(windows)]
    async fn run_with_shutdown(&mut self) -> io::Result<()> {
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    tracing::info!("Received Ctrl+C, initiating graceful shutdown");
                    return Ok(());
                }

                line_result = self.transport.read_line() => {
                    if self.handle_transport_result(line_result).await? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Handles the result from transport read.
    ///
    /// Returns `true` if the server should shut down.
    async fn handle_transport_result(
        &mut self,
        line_result: io::Result<Option<Vec<u8>>>,
    ) -> io::Result<bool> {
        let Some(line) = line_result? else {
            debug!("Input closed");
            return Ok(true);
        };

        let Ok(line) = String::from_utf8(line) else {
            warn!("Received a line that is not valid UTF-8");
            self.transport.write_message(&JsonRpcError::parse_error()).await?;
            return Ok(false);
        };

        if line.trim().is_empty() {
            return Ok(false);
        }

        self.handle_line(&line).await?;
        Ok(false)
    }

    /// Handles a single line of input.
    async fn handle_line(&mut self, line: &str) -> io::Result<()> {
        match parse_message(line) {
            Ok(msg) => {
                let is_notification = msg.id().is_none();
                let response = self.dispatcher.dispatch(msg.into()).await;
                if is_notification {
                    return Ok(());
                }
                self.transport.write_message(&response).await
            }
            Err(error) => self.transport.write_message(&error).await,
        }
    }
}
