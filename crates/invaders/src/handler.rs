//! Per-connection handler: lobby requests, game commands, and event
//! delivery.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Allocate a `PlayerId` for the connection
//!   2. Loop: wait on the socket and on the player's room events at once
//!      - inbound envelope → lobby request or game command
//!      - room event → outbound envelope
//!   3. On exit, close the socket and give up the player's seat

use std::sync::Arc;

use invaders_protocol::{
    Codec, Envelope, LobbyMessage, Payload, PlayerId, RoomListEntry,
};
use invaders_room::{PlayerSender, RoomError, RoomSettings, list_joinable};
use invaders_rules::{GameCommand, GameEvent};
use tokio::sync::mpsc;

use crate::InvadersError;
use crate::server::ServerState;
use crate::transport::{Connection, WebSocketConnection};

/// Drop guard that removes the player from their room when the handler
/// exits, including on error or panic.
///
/// `Drop` is synchronous, so the leave runs in a fire-and-forget task.
struct SeatGuard {
    player_id: PlayerId,
    state: Arc<ServerState>,
}

impl Drop for SeatGuard {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let mut registry = state.registry.lock().await;
            match registry.leave_room(player_id).await {
                Ok(()) | Err(RoomError::NoRoom(_)) => {}
                Err(e) => {
                    tracing::debug!(%player_id, error = %e, "leave on disconnect failed");
                }
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), InvadersError> {
    let conn_id = conn.id();
    let player_id = state.registry.lock().await.allocate_player_id();
    tracing::info!(%conn_id, %player_id, "player connected");

    let _guard = SeatGuard {
        player_id,
        state: Arc::clone(&state),
    };

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let mut session = Session {
        conn: &conn,
        state: &state,
        player_id,
        events: events_tx,
        seq: 1,
    };

    loop {
        tokio::select! {
            frame = conn.recv() => match frame {
                Ok(Some(data)) => session.handle_frame(&data).await?,
                Ok(None) => {
                    tracing::info!(%player_id, "connection closed cleanly");
                    break;
                }
                Err(e) => {
                    tracing::debug!(%player_id, error = %e, "recv error");
                    break;
                }
            },
            // The session keeps a sender alive, so this never yields `None`.
            Some(event) = events_rx.recv() => {
                session.send(Payload::Game(event)).await?;
            }
        }
    }

    if let Err(e) = conn.close().await {
        tracing::trace!(%player_id, error = %e, "close after disconnect");
    }

    // _guard drops here → the player leaves their room.
    Ok(())
}

/// What one connection knows about itself.
struct Session<'a> {
    conn: &'a WebSocketConnection,
    state: &'a ServerState,
    player_id: PlayerId,
    /// Handed to every room this player joins.
    events: PlayerSender,
    /// Next outbound sequence number.
    seq: u64,
}

impl Session<'_> {
    async fn handle_frame(&mut self, data: &[u8]) -> Result<(), InvadersError> {
        let envelope: Envelope<GameCommand> = match self.state.codec.decode(data) {
            Ok(env) => env,
            Err(e) => {
                tracing::debug!(player_id = %self.player_id, error = %e, "failed to decode envelope");
                return self.send_error(400, &format!("invalid message: {e}")).await;
            }
        };

        match envelope.payload {
            Payload::Lobby(msg) => self.handle_lobby(msg).await,
            Payload::Game(command) => self.handle_game(command).await,
        }
    }

    async fn handle_lobby(&mut self, msg: LobbyMessage) -> Result<(), InvadersError> {
        let player_id = self.player_id;
        match msg {
            LobbyMessage::CreateRoom {
                player_name,
                capacity,
                randomize_roles,
            } => {
                let settings = RoomSettings::new(capacity).randomize_roles(randomize_roles);
                let result = {
                    let mut registry = self.state.registry.lock().await;
                    registry
                        .create_room(player_id, player_name, settings, self.events.clone())
                        .await
                };
                match result {
                    Ok(room) => {
                        self.send(Payload::Lobby(LobbyMessage::RoomJoined { room, player_id }))
                            .await
                    }
                    Err(e) => self.send_room_error(&e).await,
                }
            }

            LobbyMessage::JoinRoom { room, player_name } => {
                let result = {
                    let mut registry = self.state.registry.lock().await;
                    registry
                        .join_room(player_id, &room, player_name, self.events.clone())
                        .await
                };
                match result {
                    Ok(()) => {
                        self.send(Payload::Lobby(LobbyMessage::RoomJoined { room, player_id }))
                            .await
                    }
                    Err(e) => self.send_room_error(&e).await,
                }
            }

            LobbyMessage::ListRooms => {
                // Query rooms without holding the registry lock.
                let handles = self.state.registry.lock().await.room_handles();
                let rooms = list_joinable(handles)
                    .await
                    .into_iter()
                    .filter_map(|info| {
                        Some(RoomListEntry {
                            player_count: info.player_count(),
                            max_players: info.max_players(),
                            host: info.host?,
                            room: info.code,
                        })
                    })
                    .collect();
                self.send(Payload::Lobby(LobbyMessage::RoomList { rooms })).await
            }

            LobbyMessage::LeaveRoom => {
                let result = self.state.registry.lock().await.leave_room(player_id).await;
                match result {
                    Ok(()) => Ok(()),
                    Err(e) => self.send_room_error(&e).await,
                }
            }

            LobbyMessage::Health => {
                let rooms = self.state.registry.lock().await.room_count();
                self.send(Payload::Lobby(LobbyMessage::HealthStatus { rooms })).await
            }

            LobbyMessage::RoomList { .. }
            | LobbyMessage::HealthStatus { .. }
            | LobbyMessage::RoomJoined { .. }
            | LobbyMessage::Error { .. } => {
                tracing::debug!(%player_id, "ignoring server-only lobby message");
                Ok(())
            }
        }
    }

    /// Routes a game command to the player's room. The registry lock is
    /// only held to find the room.
    ///
    /// Votes and night actions sent outside a room get no reply.
    async fn handle_game(&mut self, command: GameCommand) -> Result<(), InvadersError> {
        let handle = self.state.registry.lock().await.handle_for(self.player_id);
        let result = match handle {
            Ok(handle) => handle.command(self.player_id, command).await,
            Err(e) if command.is_submission() => {
                tracing::debug!(player_id = %self.player_id, error = %e, "submission outside a room dropped");
                return Ok(());
            }
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => Ok(()),
            Err(e) => self.send_room_error(&e).await,
        }
    }

    async fn send(&mut self, payload: Payload<GameEvent>) -> Result<(), InvadersError> {
        let envelope = Envelope {
            seq: next_seq(&mut self.seq),
            payload,
        };
        let bytes = self.state.codec.encode(&envelope)?;
        self.conn.send(&bytes).await?;
        Ok(())
    }

    async fn send_room_error(&mut self, err: &RoomError) -> Result<(), InvadersError> {
        tracing::debug!(player_id = %self.player_id, error = %err, "request rejected");
        self.send_error(status_code(err), &err.to_string()).await
    }

    async fn send_error(&mut self, code: u16, message: &str) -> Result<(), InvadersError> {
        self.send(Payload::Lobby(LobbyMessage::Error {
            code,
            message: message.to_string(),
        }))
        .await
    }
}

/// HTTP-style status for a rejected request.
fn status_code(err: &RoomError) -> u16 {
    match err {
        RoomError::NotFound(_) | RoomError::NoRoom(_) | RoomError::NotInRoom(..) => 404,
        RoomError::NotHost(_) => 403,
        RoomError::RoomFull(_)
        | RoomError::AlreadyInRoom(..)
        | RoomError::NotEnoughPlayers { .. }
        | RoomError::InvalidState(_) => 409,
        RoomError::UnsupportedCapacity(_) | RoomError::Rules(_) => 400,
        RoomError::Unavailable(_) => 503,
    }
}

/// Increments and returns the next sequence number.
fn next_seq(seq: &mut u64) -> u64 {
    let current = *seq;
    *seq += 1;
    current
}

#[cfg(test)]
mod tests {
    use invaders_protocol::RoomCode;

    use super::*;

    #[test]
    fn test_status_codes() {
        let code = RoomCode::new("ABC123").unwrap();
        assert_eq!(status_code(&RoomError::NotFound(code.clone())), 404);
        assert_eq!(status_code(&RoomError::RoomFull(code.clone())), 409);
        assert_eq!(status_code(&RoomError::NotHost(PlayerId(1))), 403);
        assert_eq!(status_code(&RoomError::UnsupportedCapacity(6)), 400);
        assert_eq!(status_code(&RoomError::Unavailable(code)), 503);
        assert_eq!(
            status_code(&RoomError::NotEnoughPlayers { have: 2, need: 5 }),
            409
        );
    }

    #[test]
    fn test_next_seq_counts_up() {
        let mut seq = 1;
        assert_eq!(next_seq(&mut seq), 1);
        assert_eq!(next_seq(&mut seq), 2);
        assert_eq!(seq, 3);
    }
}
