//! TCP bridge to the mineflayer sidecar.
//!
//! Protocol: newline-delimited JSON, one response per request.
//!
//! ```text
//! → {"id": 7, "op": "move_to", "args": {"x": 10, "y": 64, "z": -3}}
//! ← {"id": 7, "ok": true, "data": null}
//! ← {"id": 8, "ok": false, "error": "no path to goal"}
//! ```
//!
//! Calls that wait on the world (`move_to`, `mine_block`) are answered when
//! the sidecar observes completion, so the await here is the goal-reached
//! future. One call is in flight at a time; the per-call timeout converts a
//! hang into `BridgeError::Timeout` instead of stalling the processing loop.

use async_trait::async_trait;
use cobblemind_core::bridge::{ContextSource, GameBridge, ItemStack, Position};
use cobblemind_core::error::BridgeError;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufStream};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct Request<'a> {
    id: u64,
    op: &'a str,
    args: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct Response {
    id: u64,
    ok: bool,
    #[serde(default)]
    data: serde_json::Value,
    #[serde(default)]
    error: Option<String>,
}

/// A `GameBridge` over a JSON-line TCP connection to the sidecar.
pub struct TcpBridge {
    io: Mutex<BufStream<TcpStream>>,
    next_id: AtomicU64,
    call_timeout: Duration,
}

impl TcpBridge {
    /// Connect to the sidecar.
    pub async fn connect(
        host: &str,
        port: u16,
        call_timeout: Duration,
    ) -> Result<Self, BridgeError> {
        let addr = format!("{host}:{port}");
        let stream = TcpStream::connect(&addr)
            .await
            .map_err(|e| BridgeError::NotConnected(format!("{addr}: {e}")))?;

        debug!(%addr, "Connected to game sidecar");

        Ok(Self {
            io: Mutex::new(BufStream::new(stream)),
            next_id: AtomicU64::new(1),
            call_timeout,
        })
    }

    /// Issue one request and await its response.
    async fn call(&self, op: &str, args: serde_json::Value) -> Result<serde_json::Value, BridgeError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut line = serde_json::to_string(&Request { id, op, args })
            .map_err(|e| BridgeError::Protocol(e.to_string()))?;
        line.push('\n');

        let mut io = self.io.lock().await;

        tokio::time::timeout(self.call_timeout, async {
            io.write_all(line.as_bytes())
                .await
                .map_err(|e| BridgeError::Io(e.to_string()))?;
            io.flush().await.map_err(|e| BridgeError::Io(e.to_string()))?;

            loop {
                let mut buf = String::new();
                let n = io
                    .read_line(&mut buf)
                    .await
                    .map_err(|e| BridgeError::Io(e.to_string()))?;
                if n == 0 {
                    return Err(BridgeError::NotConnected("sidecar closed the connection".into()));
                }

                let response: Response = serde_json::from_str(buf.trim())
                    .map_err(|e| BridgeError::Protocol(format!("bad response line: {e}")))?;

                // A response left over from a timed-out earlier call is skipped.
                if response.id < id {
                    warn!(stale = response.id, expected = id, "Skipping stale sidecar response");
                    continue;
                }
                if response.id != id {
                    return Err(BridgeError::Protocol(format!(
                        "response id {} does not match request id {id}",
                        response.id
                    )));
                }

                return if response.ok {
                    Ok(response.data)
                } else {
                    Err(BridgeError::Rejected(
                        response.error.unwrap_or_else(|| "unspecified failure".into()),
                    ))
                };
            }
        })
        .await
        .map_err(|_| BridgeError::Timeout { op: op.to_string() })?
    }

    /// Drain the whisper events the sidecar has buffered since the last poll.
    ///
    /// Returns `(originator, text)` pairs in arrival order. Not part of the
    /// `GameBridge` trait — this is the transport feed, consumed by the
    /// runtime wiring rather than by actions.
    pub async fn poll_whispers(&self) -> Result<Vec<(String, String)>, BridgeError> {
        let data = self.call("poll_whispers", serde_json::json!({})).await?;
        let events = data["events"].as_array().cloned().unwrap_or_default();
        Ok(events
            .iter()
            .filter_map(|e| {
                Some((
                    e["username"].as_str()?.to_string(),
                    e["message"].as_str()?.to_string(),
                ))
            })
            .collect())
    }
}

#[async_trait]
impl ContextSource for TcpBridge {
    async fn snapshot(&self) -> Result<serde_json::Value, BridgeError> {
        self.call("snapshot", serde_json::json!({})).await
    }
}

#[async_trait]
impl GameBridge for TcpBridge {
    async fn whisper(&self, username: &str, message: &str) -> Result<(), BridgeError> {
        self.call(
            "whisper",
            serde_json::json!({ "username": username, "message": message }),
        )
        .await
        .map(|_| ())
    }

    async fn chat(&self, message: &str) -> Result<(), BridgeError> {
        self.call("chat", serde_json::json!({ "message": message }))
            .await
            .map(|_| ())
    }

    async fn goto(&self, target: Position) -> Result<(), BridgeError> {
        self.call("move_to", serde_json::json!(target)).await.map(|_| ())
    }

    async fn dig(&self, dx: i32, dy: i32, dz: i32) -> Result<String, BridgeError> {
        let data = self
            .call(
                "mine_block",
                serde_json::json!({ "x_offset": dx, "y_offset": dy, "z_offset": dz }),
            )
            .await?;
        Ok(data["block"].as_str().unwrap_or("unknown").to_string())
    }

    async fn place(
        &self,
        block_type: &str,
        dx: i32,
        dy: i32,
        dz: i32,
    ) -> Result<(), BridgeError> {
        self.call(
            "place_block",
            serde_json::json!({
                "block_type": block_type,
                "x_offset": dx,
                "y_offset": dy,
                "z_offset": dz
            }),
        )
        .await
        .map(|_| ())
    }

    async fn inventory(&self) -> Result<Vec<ItemStack>, BridgeError> {
        let data = self.call("inventory", serde_json::json!({})).await?;
        serde_json::from_value(data["items"].clone())
            .map_err(|e| BridgeError::Protocol(format!("bad inventory payload: {e}")))
    }

    async fn surroundings(&self, radius: u32) -> Result<serde_json::Value, BridgeError> {
        self.call("look_around", serde_json::json!({ "radius": radius }))
            .await
    }

    async fn craft(&self, item: &str, quantity: u32) -> Result<(), BridgeError> {
        self.call(
            "craft",
            serde_json::json!({ "item": item, "quantity": quantity }),
        )
        .await
        .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;

    /// Spawn a one-connection sidecar that answers each request line with
    /// `respond(request) -> Vec<response lines>`.
    async fn scripted_sidecar<F>(respond: F) -> u16
    where
        F: Fn(serde_json::Value) -> Vec<String> + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (read, mut write) = stream.into_split();
            let mut lines = BufReader::new(read).lines();

            while let Ok(Some(line)) = lines.next_line().await {
                let request: serde_json::Value = serde_json::from_str(&line).unwrap();
                for reply in respond(request) {
                    write.write_all(reply.as_bytes()).await.unwrap();
                    write.write_all(b"\n").await.unwrap();
                }
            }
        });

        port
    }

    #[tokio::test]
    async fn whisper_round_trip() {
        let port = scripted_sidecar(|req| {
            assert_eq!(req["op"], "whisper");
            assert_eq!(req["args"]["username"], "Alice");
            vec![format!(r#"{{"id": {}, "ok": true, "data": null}}"#, req["id"])]
        })
        .await;

        let bridge = TcpBridge::connect("127.0.0.1", port, Duration::from_secs(1))
            .await
            .unwrap();
        bridge.whisper("Alice", "hello").await.unwrap();
    }

    #[tokio::test]
    async fn rejection_surfaces_game_error() {
        let port = scripted_sidecar(|req| {
            vec![format!(
                r#"{{"id": {}, "ok": false, "error": "no path to goal"}}"#,
                req["id"]
            )]
        })
        .await;

        let bridge = TcpBridge::connect("127.0.0.1", port, Duration::from_secs(1))
            .await
            .unwrap();
        let err = bridge
            .goto(Position {
                x: 1.0,
                y: 64.0,
                z: 1.0,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Rejected(reason) if reason.contains("no path")));
    }

    #[tokio::test]
    async fn silent_sidecar_times_out() {
        let port = scripted_sidecar(|_req| vec![]).await;

        let bridge = TcpBridge::connect("127.0.0.1", port, Duration::from_millis(50))
            .await
            .unwrap();
        let err = bridge.chat("hello").await.unwrap_err();
        assert!(matches!(err, BridgeError::Timeout { op } if op == "chat"));
    }

    #[tokio::test]
    async fn stale_response_is_skipped() {
        let port = scripted_sidecar(|req| {
            let id = req["id"].as_u64().unwrap();
            vec![
                // Leftover answer from a call that timed out earlier
                format!(r#"{{"id": {}, "ok": true, "data": "stale"}}"#, id.saturating_sub(1)),
                format!(r#"{{"id": {id}, "ok": true, "data": null}}"#),
            ]
        })
        .await;

        let bridge = TcpBridge::connect("127.0.0.1", port, Duration::from_secs(1))
            .await
            .unwrap();
        // next_id starts at 1; bump it so a "stale" id exists below it
        bridge.next_id.store(5, Ordering::Relaxed);
        bridge.chat("hello").await.unwrap();
    }

    #[tokio::test]
    async fn inventory_parses_typed_items() {
        let port = scripted_sidecar(|req| {
            vec![format!(
                r#"{{"id": {}, "ok": true, "data": {{"items": [{{"name": "bread", "count": 3, "slot": 37}}]}}}}"#,
                req["id"]
            )]
        })
        .await;

        let bridge = TcpBridge::connect("127.0.0.1", port, Duration::from_secs(1))
            .await
            .unwrap();
        let items = bridge.inventory().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "bread");
        assert_eq!(items[0].count, 3);
    }

    #[tokio::test]
    async fn snapshot_returns_opaque_blob() {
        let port = scripted_sidecar(|req| {
            vec![format!(
                r#"{{"id": {}, "ok": true, "data": {{"position": {{"x": 1, "y": 64, "z": 2}}, "health": 20}}}}"#,
                req["id"]
            )]
        })
        .await;

        let bridge = TcpBridge::connect("127.0.0.1", port, Duration::from_secs(1))
            .await
            .unwrap();
        let blob = bridge.snapshot().await.unwrap();
        assert_eq!(blob["health"], 20);
    }

    #[tokio::test]
    async fn poll_whispers_drains_buffered_events() {
        let port = scripted_sidecar(|req| {
            assert_eq!(req["op"], "poll_whispers");
            vec![format!(
                r#"{{"id": {}, "ok": true, "data": {{"events": [{{"username": "Alice", "message": "hi"}}, {{"username": "Bob", "message": "yo"}}]}}}}"#,
                req["id"]
            )]
        })
        .await;

        let bridge = TcpBridge::connect("127.0.0.1", port, Duration::from_secs(1))
            .await
            .unwrap();
        let events = bridge.poll_whispers().await.unwrap();
        assert_eq!(
            events,
            vec![
                ("Alice".to_string(), "hi".to_string()),
                ("Bob".to_string(), "yo".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn connect_refused_is_not_connected() {
        // Port 1 is essentially never listening
        let err = TcpBridge::connect("127.0.0.1", 1, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::NotConnected(_)));
    }
}
