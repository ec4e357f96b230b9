//! End-to-end tests over a real TCP socket.

use std::sync::Arc;
use std::time::Duration;

use http::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use trellis_core::Engine;
use trellis_middleware::{logger, recovery};
use trellis_server::{Server, ServerConfig, ShutdownSignal};

fn engine() -> Engine {
    let mut engine = Engine::new();
    engine.use_middleware(logger()).use_middleware(recovery());
    engine
        .get("/", |ctx| ctx.string(StatusCode::OK, "Hello Trellis"))
        .unwrap();
    engine
        .get("/hello/:name", |ctx| {
            let name = ctx.param("name").unwrap_or_default().to_string();
            ctx.string(StatusCode::OK, format!("hello {name}"));
        })
        .unwrap();
    engine
        .get("/panic", |ctx| {
            let names: Vec<&str> = ctx.path().split('/').collect();
            ctx.string(StatusCode::OK, names[100]);
        })
        .unwrap();
    engine
        .post("/login", |ctx| {
            let username = ctx.post_form("username").unwrap_or_default();
            ctx.json(
                StatusCode::OK,
                &serde_json::json!({ "username": username }),
            );
        })
        .unwrap();
    engine
}

async fn start(config: ServerConfig) -> (std::net::SocketAddr, ShutdownSignal, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = ShutdownSignal::new();
    let server = Server::new(config, Arc::new(engine().seal()));
    let signal = shutdown.clone();
    let handle = tokio::spawn(async move {
        server.serve(listener, signal).await.unwrap();
    });
    (addr, shutdown, handle)
}

async fn send(addr: std::net::SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut buf = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut buf))
        .await
        .unwrap()
        .unwrap();
    String::from_utf8_lossy(&buf).into_owned()
}

fn get(path: &str) -> String {
    format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
}

#[tokio::test]
async fn test_routes_over_tcp() {
    let (addr, shutdown, handle) = start(ServerConfig::default()).await;

    let response = send(addr, &get("/")).await;
    assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
    assert!(response.ends_with("Hello Trellis"));

    let response = send(addr, &get("/hello/trellis")).await;
    assert!(response.ends_with("hello trellis"), "{response}");

    let response = send(addr, &get("/nope")).await;
    assert!(response.starts_with("HTTP/1.1 404 Not Found"), "{response}");
    assert!(response.ends_with("404 NOT FOUND: /nope"));

    shutdown.trigger();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_recovered_panic_keeps_serving() {
    let (addr, shutdown, handle) = start(ServerConfig::default()).await;

    let response = send(addr, &get("/panic")).await;
    assert!(
        response.starts_with("HTTP/1.1 500 Internal Server Error"),
        "{response}"
    );
    assert!(response.ends_with(r#"{"message":"Internal Server Error"}"#));

    let response = send(addr, &get("/")).await;
    assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");

    shutdown.trigger();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_form_post() {
    let (addr, shutdown, handle) = start(ServerConfig::default()).await;

    let body = "username=alice&password=1234";
    let request = format!(
        "POST /login HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\
         Content-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    );
    let response = send(addr, &request).await;
    assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
    assert!(response.ends_with(r#"{"username":"alice"}"#), "{response}");

    shutdown.trigger();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_body_limit() {
    let config = ServerConfig::builder().max_body_bytes(8).build();
    let (addr, shutdown, handle) = start(config).await;

    let body = "username=a-name-well-past-the-limit";
    let request = format!(
        "POST /login HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\
         Content-Length: {}\r\n\r\n{}",
        body.len(),
        body
    );
    let response = send(addr, &request).await;
    assert!(
        response.starts_with("HTTP/1.1 413"),
        "{response}"
    );

    shutdown.trigger();
    handle.await.unwrap();
}
