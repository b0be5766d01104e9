//! Shared helpers for integration tests

#![allow(dead_code)]

use drift_telemetry::app::config::{Config, TransportConfig};
use drift_telemetry::app::replay::TraceEvent;
use drift_telemetry::pipeline::Command;
use drift_telemetry::trials::{Coherence, TrialKind};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Minimal HTTP endpoint answering every request with the same status and
/// body. Request bodies are recorded.
pub struct MockInference {
    pub url: String,
    pub bodies: Arc<Mutex<Vec<String>>>,
}

impl MockInference {
    pub async fn start(status: u16, body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/predict", listener.local_addr().unwrap());
        let bodies = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&bodies);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let request_body = read_request_body(&mut socket).await;
                recorded.lock().unwrap().push(request_body);

                let response = format!(
                    "HTTP/1.1 {} Mock\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Self { url, bodies }
    }

    pub fn requests(&self) -> Vec<String> {
        self.bodies.lock().unwrap().clone()
    }
}

async fn read_request_body(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 2048];

    loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let length = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                return String::from_utf8_lossy(&buf[end + 4..end + 4 + length]).to_string();
            }
        }
    }

    String::new()
}

/// Config pointing at `endpoint` with fast retries
pub fn config_for(endpoint: &str) -> Config {
    Config {
        transport: TransportConfig {
            endpoint: endpoint.to_string(),
            timeout_ms: 2_000,
            max_attempts: 2,
            backoff_base_ms: 10,
        },
        ..Default::default()
    }
}

pub fn command(t: u64, command: Command) -> TraceEvent {
    TraceEvent::Command { t, command }
}

pub fn pointer(x: f64, y: f64, t: u64) -> TraceEvent {
    TraceEvent::Pointer { x, y, t }
}

/// Straight horizontal stroke of `steps` samples, 20 ms and 10 px apart
pub fn stroke(from_x: f64, y: f64, start_t: u64, steps: u64) -> Vec<TraceEvent> {
    (0..steps)
        .map(|i| pointer(from_x + i as f64 * 10.0, y, start_t + i * 20))
        .collect()
}

/// One session with a go trial and a stop trial per coherence level
pub fn trial_session(start_t: u64) -> Vec<TraceEvent> {
    let mut events = vec![command(start_t, Command::Start)];
    let mut t = start_t + 100;

    for coherence in Coherence::ALL {
        events.push(command(
            t,
            Command::StartTrial {
                kind: TrialKind::Go,
                coherence,
            },
        ));
        events.extend(stroke(0.0, 0.0, t + 300, 10));
        events.push(command(t + 1_000, Command::EndTrial));
        t += 1_200;

        events.push(command(
            t,
            Command::StartTrial {
                kind: TrialKind::Stop,
                coherence,
            },
        ));
        events.push(command(t + 1_000, Command::EndTrial));
        t += 1_200;
    }

    events.push(command(t, Command::Stop));
    events
}
