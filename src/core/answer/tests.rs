use super::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

type CapturedRequest = (String, Vec<(String, String)>, Vec<u8>);

async fn read_http_request(stream: &mut TcpStream) -> Result<CapturedRequest, String> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let read = stream.read(&mut chunk).await.map_err(|err| err.to_string())?;
        if read == 0 {
            return Err("Unexpected EOF while reading HTTP headers".to_string());
        }
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(pos) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default().to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect();
    let content_length = headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buffer[header_end + 4..].to_vec();
    while body.len() < content_length {
        let read = stream.read(&mut chunk).await.map_err(|err| err.to_string())?;
        if read == 0 {
            return Err("Unexpected EOF while reading HTTP body".to_string());
        }
        body.extend_from_slice(&chunk[..read]);
    }
    body.truncate(content_length);

    Ok((request_line, headers, body))
}

/// Serve a single canned response and record the request that triggered it.
async fn serve_once(
    status_line: &'static str,
    body: String,
) -> (String, Arc<Mutex<Option<CapturedRequest>>>) {
    serve_once_after(Duration::ZERO, status_line, body).await
}

/// Like [`serve_once`], but hold the response back for `delay`.
async fn serve_once_after(
    delay: Duration,
    status_line: &'static str,
    body: String,
) -> (String, Arc<Mutex<Option<CapturedRequest>>>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("local addr should resolve");
    let captured = Arc::new(Mutex::new(None));
    let captured_for_server = Arc::clone(&captured);

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.map_err(|err| err.to_string())?;
        let request = read_http_request(&mut stream).await?;
        *captured_for_server.lock().await = Some(request);
        tokio::time::sleep(delay).await;
        let response = format!(
            "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        stream
            .write_all(response.as_bytes())
            .await
            .map_err(|err| err.to_string())?;
        Ok::<(), String>(())
    });

    (format!("http://{addr}/open_api/v2/chat"), captured)
}

fn fetcher_with_timeout(endpoint: &str, timeout_secs: Option<u64>) -> HttpAnswerFetcher {
    let mut settings = crate::utils::test_utils::create_test_settings();
    settings.endpoint = endpoint.to_string();
    settings.request_timeout_secs = timeout_secs;
    HttpAnswerFetcher::from_settings_with(Client::builder().no_proxy(), &settings)
        .expect("client should build")
}

fn test_fetcher(endpoint: &str) -> HttpAnswerFetcher {
    let client = Client::builder()
        .no_proxy()
        .build()
        .expect("client should build");
    HttpAnswerFetcher::new(client, endpoint, "secret-token", "web_user_001")
}

#[test]
fn extract_answer_returns_first_assistant_answer() {
    let body = json!({
        "messages": [
            {"role": "assistant", "type": "verbose", "content": "{}"},
            {"role": "assistant", "type": "answer", "content": "X"},
            {"role": "assistant", "type": "answer", "content": "Y"},
            {"role": "assistant", "type": "follow_up", "content": "Z?"}
        ]
    });
    assert_eq!(extract_answer(&body).as_deref(), Some("X"));
}

#[test]
fn extract_answer_ignores_user_echoes_and_broken_entries() {
    let body = json!({
        "messages": [
            {"role": "user", "type": "answer", "content": "echo"},
            {"role": "assistant", "type": "answer"},
            {"role": "assistant", "type": "answer", "content": 42},
            {"role": "assistant", "type": "answer", "content": "real"}
        ]
    });
    assert_eq!(extract_answer(&body).as_deref(), Some("real"));
}

#[test]
fn extract_answer_rejects_unexpected_shapes() {
    assert_eq!(extract_answer(&json!({"messages": []})), None);
    assert_eq!(extract_answer(&json!({"code": 4100, "msg": "bad token"})), None);
    assert_eq!(extract_answer(&json!({"messages": "nope"})), None);
    assert_eq!(extract_answer(&json!([1, 2, 3])), None);
}

#[tokio::test]
async fn fetch_returns_answer_content_exactly() {
    let body = json!({
        "messages": [{"role": "assistant", "type": "answer", "content": "X"}]
    })
    .to_string();
    let (url, _) = serve_once("200 OK", body).await;

    let reply = test_fetcher(&url).fetch_answer("bot-basic", "hello").await;
    assert_eq!(reply, "X");
}

#[tokio::test]
async fn fetch_sends_bearer_token_and_payload() {
    let body = json!({
        "messages": [{"role": "assistant", "type": "answer", "content": "ok"}]
    })
    .to_string();
    let (url, captured) = serve_once("200 OK", body).await;

    test_fetcher(&url)
        .fetch_answer("bot-cutie", "多少钱做双眼皮")
        .await;

    let (request_line, headers, body) = captured
        .lock()
        .await
        .take()
        .expect("server should capture the request");
    assert!(request_line.starts_with("POST /open_api/v2/chat"));
    let auth = headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("authorization"))
        .map(|(_, value)| value.as_str());
    assert_eq!(auth, Some("Bearer secret-token"));
    let payload: Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(
        payload,
        json!({"bot_id": "bot-cutie", "user": "web_user_001", "query": "多少钱做双眼皮"})
    );
}

#[tokio::test]
async fn empty_message_list_yields_no_reply_fallback() {
    let (url, _) = serve_once("200 OK", json!({"messages": []}).to_string()).await;
    let reply = test_fetcher(&url).fetch_answer("bot", "q").await;
    assert_eq!(reply, NO_REPLY_FALLBACK);
}

#[tokio::test]
async fn malformed_body_yields_no_reply_fallback() {
    let (url, _) = serve_once("200 OK", "<html>oops</html>".to_string()).await;
    let reply = test_fetcher(&url).fetch_answer("bot", "q").await;
    assert_eq!(reply, NO_REPLY_FALLBACK);
}

#[tokio::test]
async fn error_status_yields_network_fallback() {
    let (url, _) = serve_once(
        "502 Bad Gateway",
        json!({"messages": [{"role": "assistant", "type": "answer", "content": "X"}]}).to_string(),
    )
    .await;
    let reply = test_fetcher(&url).fetch_answer("bot", "q").await;
    assert_eq!(reply, NETWORK_ERROR_FALLBACK);
}

#[tokio::test]
async fn connection_refused_yields_network_fallback() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("local addr should resolve");
    drop(listener);

    let reply = test_fetcher(&format!("http://{addr}/chat"))
        .fetch_answer("bot", "q")
        .await;
    assert_eq!(reply, NETWORK_ERROR_FALLBACK);
}

#[tokio::test]
async fn slow_backend_past_the_timeout_yields_network_fallback() {
    let body = json!({
        "messages": [{"role": "assistant", "type": "answer", "content": "X"}]
    })
    .to_string();
    let (url, _) = serve_once_after(Duration::from_millis(2500), "200 OK", body).await;

    let reply = fetcher_with_timeout(&url, Some(1))
        .fetch_answer("bot", "q")
        .await;
    assert_eq!(reply, NETWORK_ERROR_FALLBACK);
}

#[tokio::test]
async fn zero_timeout_from_the_file_means_no_timeout() {
    let body = json!({
        "messages": [{"role": "assistant", "type": "answer", "content": "X"}]
    })
    .to_string();
    let (url, _) = serve_once_after(Duration::from_millis(200), "200 OK", body).await;

    let reply = fetcher_with_timeout(&url, Some(0))
        .fetch_answer("bot", "q")
        .await;
    assert_eq!(reply, "X");
}
