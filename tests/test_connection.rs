use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use ember::http::connection::Connection;
use ember::http::handler::{SharedHandler, default_handler};
use ember::http::request::Request;
use ember::http::response::Response;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream, duplex};
use tokio::task::JoinHandle;
use tokio::time::{Duration, timeout};

fn spawn_conn(server_io: DuplexStream, handler: SharedHandler) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut conn = Connection::new(server_io, handler);
        let _ = conn.run().await;
    })
}

async fn read_until(client: &mut DuplexStream, needle: &str) -> String {
    let mut out = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = client.read(&mut buf).await.unwrap();
        assert!(n > 0, "stream closed before {needle:?} arrived");
        out.extend_from_slice(&buf[..n]);
        let text = String::from_utf8_lossy(&out).into_owned();
        if text.contains(needle) {
            return text;
        }
    }
}

async fn read_to_end(client: &mut DuplexStream) -> String {
    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();
    String::from_utf8_lossy(&out).into_owned()
}

async fn echo_path(req: Request, mut res: Response) -> anyhow::Result<()> {
    res.send(format!("echo {}", req.path));
    Ok(())
}

#[tokio::test]
async fn test_pipelined_messages_dispatch_in_order() {
    let (mut client, server_io) = duplex(4096);

    let count = Arc::new(AtomicUsize::new(0));
    let seen = count.clone();
    let handler: SharedHandler = Arc::new(move |req: Request, mut res: Response| {
        let seen = seen.clone();
        async move {
            seen.fetch_add(1, Ordering::SeqCst);
            res.send(format!("echo {}", req.path));
            Ok::<_, anyhow::Error>(())
        }
    });
    let task = spawn_conn(server_io, handler);

    // Two complete messages in a single chunk; the second closes the connection
    client
        .write_all(b"GET /one HTTP/1.1\r\nConnection: keep-alive\r\n\r\nGET /two HTTP/1.1\r\n\r\n")
        .await
        .unwrap();

    let text = read_to_end(&mut client).await;

    assert_eq!(count.load(Ordering::SeqCst), 2);
    let first = text.find("echo /one").expect("first response missing");
    let second = text.find("echo /two").expect("second response missing");
    assert!(first < second, "second response written before the first");

    task.await.unwrap();
}

#[tokio::test]
async fn test_keep_alive_reuses_connection_for_sequential_exchanges() {
    let (mut client, server_io) = duplex(4096);
    let task = spawn_conn(server_io, Arc::new(echo_path));

    client
        .write_all(b"GET /first HTTP/1.1\r\nConnection: keep-alive\r\n\r\n")
        .await
        .unwrap();
    let first = read_until(&mut client, "echo /first").await;
    assert!(first.contains("Connection: keep-alive\r\n"));

    // Same socket, next exchange; no keep-alive this time
    client
        .write_all(b"GET /second HTTP/1.1\r\n\r\n")
        .await
        .unwrap();
    let rest = read_to_end(&mut client).await;
    assert!(rest.contains("echo /second"));
    assert!(rest.contains("Connection: close\r\n"));

    task.await.unwrap();
}

#[tokio::test]
async fn test_no_response_before_declared_body_completes() {
    async fn echo_body(req: Request, mut res: Response) -> anyhow::Result<()> {
        let body = req.body_text().map(|b| b.into_owned()).unwrap_or_default();
        res.send(body);
        Ok(())
    }

    let (mut client, server_io) = duplex(4096);
    let task = spawn_conn(server_io, Arc::new(echo_body));

    // 3 of 10 declared body bytes
    client
        .write_all(b"POST /x HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc")
        .await
        .unwrap();

    let mut probe = [0u8; 64];
    let early = timeout(Duration::from_millis(50), client.read(&mut probe)).await;
    assert!(early.is_err(), "response written before the body completed");

    // The remaining 7 bytes complete the message
    client.write_all(b"defghij").await.unwrap();
    let text = read_to_end(&mut client).await;
    assert!(text.contains("Content-Length: 10\r\n"));
    assert!(text.ends_with("abcdefghij"));

    task.await.unwrap();
}

#[tokio::test]
async fn test_handler_failure_produces_500_and_connection_persists() {
    async fn flaky(req: Request, mut res: Response) -> anyhow::Result<()> {
        if req.path == "/fail" {
            anyhow::bail!("boom");
        }
        res.send("fine");
        Ok(())
    }

    let (mut client, server_io) = duplex(4096);
    let task = spawn_conn(server_io, Arc::new(flaky));

    client
        .write_all(b"GET /fail HTTP/1.1\r\nConnection: keep-alive\r\n\r\nGET /ok HTTP/1.1\r\n\r\n")
        .await
        .unwrap();

    let text = read_to_end(&mut client).await;

    let failure = text
        .find("HTTP/1.1 500 Internal Server Error\r\n")
        .expect("500 response missing");
    let success = text.find("HTTP/1.1 200 OK\r\n").expect("200 response missing");
    assert!(failure < success);
    assert!(text.contains(r#"{"error":"Internal Server Error"}"#));
    // The failed exchange kept the connection open for the next one
    assert!(text.contains("fine"));

    task.await.unwrap();
}

#[tokio::test]
async fn test_handler_response_sent_before_failure_stands() {
    async fn sends_then_fails(_req: Request, mut res: Response) -> anyhow::Result<()> {
        res.status(201).send("partial work");
        anyhow::bail!("failed after responding");
    }

    let (mut client, server_io) = duplex(4096);
    let task = spawn_conn(server_io, Arc::new(sends_then_fails));

    client.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();
    let text = read_to_end(&mut client).await;

    assert!(text.starts_with("HTTP/1.1 201 Created\r\n"));
    assert!(!text.contains("500"));

    task.await.unwrap();
}

#[tokio::test]
async fn test_json_body_reaches_handler() {
    async fn greet(req: Request, mut res: Response) -> anyhow::Result<()> {
        let name = req
            .json()
            .and_then(|v| v.get("name").and_then(|n| n.as_str()).map(str::to_string))
            .unwrap_or_else(|| "stranger".to_string());
        res.json(&serde_json::json!({ "hello": name }));
        Ok(())
    }

    let (mut client, server_io) = duplex(4096);
    let task = spawn_conn(server_io, Arc::new(greet));

    let body = r#"{"name":"ada"}"#;
    let req = format!(
        "POST /greet HTTP/1.1\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    );
    client.write_all(req.as_bytes()).await.unwrap();

    let text = read_to_end(&mut client).await;
    assert!(text.contains("Content-Type: application/json; charset=utf-8\r\n"));
    assert!(text.ends_with(r#"{"hello":"ada"}"#));

    task.await.unwrap();
}

#[tokio::test]
async fn test_default_handler_echoes_method_and_path() {
    let (mut client, server_io) = duplex(4096);
    let task = spawn_conn(server_io, default_handler());

    client
        .write_all(b"PUT /anything HTTP/1.1\r\n\r\n")
        .await
        .unwrap();

    let text = read_to_end(&mut client).await;
    assert!(text.contains(r#""framework":"ember""#));
    assert!(text.contains("Default handler: PUT /anything"));

    task.await.unwrap();
}

#[tokio::test]
async fn test_silent_handler_emits_no_bytes() {
    async fn silent(_req: Request, _res: Response) -> anyhow::Result<()> {
        Ok(())
    }

    let (mut client, server_io) = duplex(4096);
    let task = spawn_conn(server_io, Arc::new(silent));

    client.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();
    let text = read_to_end(&mut client).await;

    assert!(text.is_empty());
    task.await.unwrap();
}

#[tokio::test]
async fn test_peer_eof_with_partial_message_tears_down_session() {
    let (mut client, server_io) = duplex(4096);
    let task = spawn_conn(server_io, Arc::new(echo_path));

    // Partial head, then EOF: the buffered bytes are discarded silently
    client.write_all(b"GET / HTTP/1.1\r\nHost: a").await.unwrap();
    client.shutdown().await.unwrap();

    task.await.unwrap();

    let text = read_to_end(&mut client).await;
    assert!(text.is_empty());
}
