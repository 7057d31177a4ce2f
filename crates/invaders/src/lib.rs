//! # Invaders
//!
//! Game server for Invaders, a social-deduction party game for 5, 7 or 9
//! players. Players connect over WebSocket, open or join a room, and the
//! server runs the night/day/vote cycle until one team wins.
//!
//! The rules live in `invaders-rules`, rooms and their timers in
//! `invaders-room`. This crate adds the network front end.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use invaders::prelude::*;
//!
//! # async fn run() -> Result<(), InvadersError> {
//! let server = InvadersServer::builder()
//!     .bind("0.0.0.0:3000")
//!     .engine_config(EngineConfig::default())
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

#![allow(async_fn_in_trait)]

mod error;
mod handler;
mod server;
pub mod transport;

pub use error::InvadersError;
pub use server::{InvadersServer, InvadersServerBuilder};

/// Everything needed to run a server or write a client against it.
pub mod prelude {
    pub use crate::{InvadersError, InvadersServer, InvadersServerBuilder};
    pub use invaders_protocol::{
        Envelope, LobbyMessage, Payload, PlayerId, Recipient, RoomCode,
        RoomListEntry,
    };
    pub use invaders_room::{EngineConfig, PhaseDurations, RoomSettings};
    pub use invaders_rules::{
        GameCommand, GameEvent, Phase, Role, TieBreak, Team,
    };
}
