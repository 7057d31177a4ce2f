//! Integration tests for the Invaders server, handler, and full connection
//! flow over real WebSocket connections.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use invaders::prelude::*;
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Phases short enough to play a whole game inside a test.
fn fast_config() -> EngineConfig {
    EngineConfig {
        durations: PhaseDurations {
            waiting: Duration::from_millis(50),
            night: Duration::from_millis(100),
            day: Duration::from_millis(50),
            voting: Duration::from_secs(1),
            results: Duration::from_millis(50),
        },
        seed: Some(11),
        ..EngineConfig::default()
    }
}

/// Starts a server on a random port and returns the address.
async fn start_server(config: EngineConfig) -> String {
    let server = InvadersServer::builder()
        .bind("127.0.0.1:0")
        .engine_config(config)
        .build()
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    addr
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

async fn send_lobby(ws: &mut ClientWs, data: Value) {
    let envelope = json!({ "seq": 0, "payload": { "type": "Lobby", "data": data } });
    ws.send(Message::text(envelope.to_string())).await.unwrap();
}

async fn send_game(ws: &mut ClientWs, data: Value) {
    let envelope = json!({ "seq": 0, "payload": { "type": "Game", "data": data } });
    ws.send(Message::text(envelope.to_string())).await.unwrap();
}

/// Reads the next envelope from the server.
async fn recv(ws: &mut ClientWs) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("server went quiet")
            .expect("stream ended")
            .expect("socket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

/// Reads envelopes until the payload's inner `type` equals `kind`.
async fn recv_until(ws: &mut ClientWs, kind: &str) -> Value {
    loop {
        let envelope = recv(ws).await;
        if envelope["payload"]["data"]["type"] == kind {
            return envelope["payload"]["data"].clone();
        }
    }
}

async fn recv_phase(ws: &mut ClientWs, phase: &str) -> Value {
    loop {
        let event = recv_until(ws, "phase_change").await;
        if event["phase"] == phase {
            return event;
        }
    }
}

/// Opens a room and returns the host socket, room code and host id.
async fn create_room(addr: &str, capacity: usize) -> (ClientWs, String, u64) {
    let mut ws = connect(addr).await;
    send_lobby(
        &mut ws,
        json!({ "type": "CreateRoom", "player_name": "p1", "capacity": capacity }),
    )
    .await;
    let joined = recv_until(&mut ws, "RoomJoined").await;
    let room = joined["room"].as_str().unwrap().to_string();
    let id = joined["player_id"].as_u64().unwrap();
    (ws, room, id)
}

async fn join_room(addr: &str, room: &str, name: &str) -> (ClientWs, u64) {
    let mut ws = connect(addr).await;
    send_lobby(
        &mut ws,
        json!({ "type": "JoinRoom", "room": room, "player_name": name }),
    )
    .await;
    let joined = recv_until(&mut ws, "RoomJoined").await;
    (ws, joined["player_id"].as_u64().unwrap())
}

/// Opens a 5-seat room and fills it.
async fn full_table(addr: &str) -> Vec<(ClientWs, u64)> {
    let (host, room, host_id) = create_room(addr, 5).await;
    let mut table = vec![(host, host_id)];
    for n in 2..=5 {
        table.push(join_room(addr, &room, &format!("p{n}")).await);
    }
    table
}

// =========================================================================
// Lobby
// =========================================================================

#[tokio::test]
async fn test_create_room_replies_then_sends_roster() {
    let addr = start_server(fast_config()).await;
    let mut ws = connect(&addr).await;
    send_lobby(
        &mut ws,
        json!({ "type": "CreateRoom", "player_name": "Salma", "capacity": 7 }),
    )
    .await;

    let joined = recv(&mut ws).await;
    assert_eq!(joined["seq"], 1);
    assert_eq!(joined["payload"]["type"], "Lobby");
    assert_eq!(joined["payload"]["data"]["type"], "RoomJoined");
    let room = joined["payload"]["data"]["room"].as_str().unwrap();
    assert_eq!(room.len(), 6);

    let roster = recv(&mut ws).await;
    assert_eq!(roster["seq"], 2);
    assert_eq!(roster["payload"]["type"], "Game");
    let data = &roster["payload"]["data"];
    assert_eq!(data["type"], "players_update");
    assert_eq!(data["players"][0]["name"], "Salma");
    assert_eq!(data["host"], joined["payload"]["data"]["player_id"]);
}

#[tokio::test]
async fn test_unsupported_capacity_is_rejected() {
    let addr = start_server(fast_config()).await;
    let mut ws = connect(&addr).await;
    send_lobby(
        &mut ws,
        json!({ "type": "CreateRoom", "player_name": "Omar", "capacity": 4 }),
    )
    .await;

    let error = recv_until(&mut ws, "Error").await;
    assert_eq!(error["code"], 400);
}

#[tokio::test]
async fn test_join_unknown_room_returns_404() {
    let addr = start_server(fast_config()).await;
    let mut ws = connect(&addr).await;
    send_lobby(
        &mut ws,
        json!({ "type": "JoinRoom", "room": "ZZZZZZ", "player_name": "Omar" }),
    )
    .await;

    let error = recv_until(&mut ws, "Error").await;
    assert_eq!(error["code"], 404);
    assert!(error["message"].as_str().unwrap().contains("ZZZZZZ"));
}

#[tokio::test]
async fn test_garbage_gets_400_and_connection_survives() {
    let addr = start_server(fast_config()).await;
    let mut ws = connect(&addr).await;
    ws.send(Message::text("definitely not json")).await.unwrap();

    let error = recv_until(&mut ws, "Error").await;
    assert_eq!(error["code"], 400);

    send_lobby(&mut ws, json!({ "type": "ListRooms" })).await;
    let list = recv_until(&mut ws, "RoomList").await;
    assert!(list["rooms"].is_array());
}

#[tokio::test]
async fn test_list_rooms_shows_open_room() {
    let addr = start_server(fast_config()).await;
    let (_host, room, host_id) = create_room(&addr, 9).await;

    let mut ws = connect(&addr).await;
    send_lobby(&mut ws, json!({ "type": "ListRooms" })).await;
    let list = recv_until(&mut ws, "RoomList").await;

    let rooms = list["rooms"].as_array().unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0]["room"], room);
    assert_eq!(rooms[0]["player_count"], 1);
    assert_eq!(rooms[0]["max_players"], 9);
    assert_eq!(rooms[0]["host"], host_id);
}

#[tokio::test]
async fn test_disconnect_passes_host_on() {
    let addr = start_server(fast_config()).await;
    let (host, room, _) = create_room(&addr, 5).await;
    let (mut guest, guest_id) = join_room(&addr, &room, "p2").await;

    drop(host);

    loop {
        let update = recv_until(&mut guest, "players_update").await;
        if update["players"].as_array().unwrap().len() == 1 {
            assert_eq!(update["host"], guest_id);
            break;
        }
    }
}

// =========================================================================
// Game
// =========================================================================

#[tokio::test]
async fn test_game_command_outside_room_returns_404() {
    let addr = start_server(fast_config()).await;
    let mut ws = connect(&addr).await;
    send_game(&mut ws, json!({ "type": "start_game" })).await;

    let error = recv_until(&mut ws, "Error").await;
    assert_eq!(error["code"], 404);
}

#[tokio::test]
async fn test_vote_outside_room_gets_no_reply() {
    let addr = start_server(fast_config()).await;
    let mut ws = connect(&addr).await;
    send_game(&mut ws, json!({ "type": "vote", "target": 1 })).await;
    send_game(
        &mut ws,
        json!({ "type": "night_action", "role": "VISITOR", "target": 1 }),
    )
    .await;
    send_lobby(&mut ws, json!({ "type": "ListRooms" })).await;

    // Frames arrive in order, so the list comes first if nothing else was sent.
    let next = recv(&mut ws).await;
    assert_eq!(next["seq"], 1);
    assert_eq!(next["payload"]["data"]["type"], "RoomList");
}

#[tokio::test]
async fn test_health_reports_room_count() {
    let addr = start_server(fast_config()).await;
    let (_host, _room, _) = create_room(&addr, 5).await;

    let mut ws = connect(&addr).await;
    send_lobby(&mut ws, json!({ "type": "Health" })).await;
    let health = recv_until(&mut ws, "HealthStatus").await;
    assert_eq!(health["rooms"], 1);
}

#[tokio::test]
async fn test_only_host_may_start() {
    let addr = start_server(fast_config()).await;
    let mut table = full_table(&addr).await;
    send_game(&mut table[1].0, json!({ "type": "start_game" })).await;

    let error = recv_until(&mut table[1].0, "Error").await;
    assert_eq!(error["code"], 403);
}

#[tokio::test]
async fn test_start_before_full_returns_409() {
    let addr = start_server(fast_config()).await;
    let (mut host, _room, _) = create_room(&addr, 5).await;
    send_game(&mut host, json!({ "type": "start_game" })).await;

    let error = recv_until(&mut host, "Error").await;
    assert_eq!(error["code"], 409);
}

#[tokio::test]
async fn test_full_game_over_websocket() {
    let addr = start_server(fast_config()).await;
    let mut table = full_table(&addr).await;
    send_game(&mut table[0].0, json!({ "type": "start_game" })).await;

    // Everyone learns their own role, and only their own.
    let mut visitor = None;
    for (ws, id) in table.iter_mut() {
        recv_until(ws, "game_started").await;
        let assignment = recv(ws).await;
        let data = &assignment["payload"]["data"];
        assert_eq!(data["type"], "role_assignment");
        if data["role"] == "VISITOR" {
            assert_eq!(data["team"], "evil");
            visitor = Some(*id);
        }
    }
    let visitor = visitor.expect("five-player rooms deal one Visitor");

    for (ws, _) in table.iter_mut() {
        let voting = recv_phase(ws, "voting").await;
        assert_eq!(voting["round"], 1);
    }
    let scapegoat = table.iter().map(|(_, id)| *id).find(|id| *id != visitor).unwrap();
    for (ws, id) in table.iter_mut() {
        let target = if *id == visitor { scapegoat } else { visitor };
        send_game(ws, json!({ "type": "vote", "target": target })).await;
    }

    let host = &mut table[0].0;
    let results = recv_until(host, "vote_results").await;
    assert_eq!(results["executed"], visitor);

    let over = recv_until(host, "game_over").await;
    assert_eq!(over["winner"], "good");
    assert_eq!(over["player_roles"].as_array().unwrap().len(), 5);
    let last = over["game_log"].as_array().unwrap().last().unwrap().clone();
    assert_eq!(last, "The good team wins");
}
