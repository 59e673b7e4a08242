mod chat_client;
mod collaborator;

use std::{collections::BTreeMap, net::SocketAddr};

use nutrisense::llm::{
    LlmConfig,
    types::{BackendProfile, CredentialRef, ModelProfile, RouteTarget},
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    task::JoinHandle,
};

/// Serves exactly one HTTP response and hands back the raw request it saw.
pub async fn one_shot_server(status_line: &str, body: &str) -> (SocketAddr, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("listener should have an address");
    let response = format!(
        "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("client should connect");
        let request = read_request(&mut socket).await;
        socket
            .write_all(response.as_bytes())
            .await
            .expect("response should be written");
        let _ = socket.shutdown().await;
        request
    });
    (addr, handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut raw = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let read = socket.read(&mut chunk).await.expect("request should be readable");
        if read == 0 {
            break;
        }
        raw.extend_from_slice(&chunk[..read]);

        let text = String::from_utf8_lossy(&raw).to_string();
        let Some(header_end) = text.find("\r\n\r\n") else {
            continue;
        };
        let content_length = text[..header_end]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if raw.len() >= header_end + 4 + content_length {
            break;
        }
    }
    String::from_utf8_lossy(&raw).to_string()
}

pub fn completion_body(content: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-1",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}
        ]
    })
    .to_string()
}

pub fn config_for(addr: SocketAddr, credential: CredentialRef) -> LlmConfig {
    let mut route_aliases = BTreeMap::new();
    route_aliases.insert(
        "default".to_string(),
        RouteTarget {
            backend_id: "local".to_string(),
            model_id: "m1".to_string(),
        },
    );
    LlmConfig {
        backends: vec![BackendProfile {
            id: "local".to_string(),
            endpoint: format!("http://{addr}/v1/"),
            credential,
            models: vec![ModelProfile {
                id: "m1".to_string(),
            }],
        }],
        route_aliases,
        roles: BTreeMap::new(),
        temperature: BTreeMap::new(),
        request_timeout_ms: 2_000,
    }
}
