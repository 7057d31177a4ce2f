//! `InvadersServer` builder and accept loop.
//!
//! This is the entry point for running an Invaders game server. It ties
//! together all the layers: transport → protocol → registry → rooms.

use std::sync::Arc;

use invaders_protocol::JsonCodec;
use invaders_room::{EngineConfig, RoomRegistry};
use tokio::sync::Mutex;

use crate::InvadersError;
use crate::handler::handle_connection;
use crate::transport::WebSocketTransport;

/// Shared server state passed to each connection handler task.
///
/// The registry sits behind a `Mutex`; handlers lock it only to look up
/// or update the room index and release it before talking to a room
/// whenever they can.
pub(crate) struct ServerState {
    pub(crate) registry: Mutex<RoomRegistry>,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting an Invaders server.
///
/// # Example
///
/// ```rust,no_run
/// use invaders::prelude::*;
///
/// # async fn run() -> Result<(), InvadersError> {
/// let server = InvadersServer::builder()
///     .bind("0.0.0.0:3000")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct InvadersServerBuilder {
    bind_addr: String,
    engine: EngineConfig,
}

impl InvadersServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            engine: EngineConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the phase durations, tie policy, and seed used by every room.
    pub fn engine_config(mut self, config: EngineConfig) -> Self {
        self.engine = config;
        self
    }

    /// Binds the listener and builds the server.
    pub async fn build(self) -> Result<InvadersServer, InvadersError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            registry: Mutex::new(RoomRegistry::new(self.engine)),
            codec: JsonCodec,
        });

        Ok(InvadersServer { transport, state })
    }
}

impl Default for InvadersServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Invaders game server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct InvadersServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl InvadersServer {
    pub fn builder() -> InvadersServerBuilder {
        InvadersServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop, spawning a handler task per connection.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), InvadersError> {
        tracing::info!("Invaders server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
