//! Chain execution through a sealed engine.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use http::{Method, Request, StatusCode};
use trellis_core::{BufferedResponse, Context, Engine, ResponseWriter, SealedEngine};

type Log = Arc<Mutex<Vec<String>>>;

fn push(log: &Log, entry: &str) {
    log.lock().unwrap().push(entry.to_string());
}

fn dispatch(engine: &SealedEngine, method: Method, uri: &str) -> BufferedResponse {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Bytes::new())
        .unwrap();
    let mut response = BufferedResponse::new();
    engine.dispatch(&request, &mut response);
    response
}

fn engine_with(log: &Log, b: impl Fn(&mut Context<'_>) + Send + Sync + 'static) -> SealedEngine {
    let mut engine = Engine::new();

    let a_log = Arc::clone(log);
    engine.use_middleware(move |ctx| {
        push(&a_log, "A-pre");
        ctx.next();
        push(&a_log, "A-post");
    });
    engine.use_middleware(b);

    let end_log = Arc::clone(log);
    engine
        .get("/work", move |ctx| {
            push(&end_log, "terminal");
            ctx.string(StatusCode::OK, "done");
        })
        .unwrap();
    engine.seal()
}

#[test]
fn test_fail_short_circuits_remaining_chain() {
    let log = Log::default();
    let b_log = Arc::clone(&log);
    let engine = engine_with(&log, move |ctx| {
        push(&b_log, "B");
        ctx.fail(StatusCode::INTERNAL_SERVER_ERROR, "boom");
    });

    let response = dispatch(&engine, Method::GET, "/work");

    assert_eq!(*log.lock().unwrap(), vec!["A-pre", "B", "A-post"]);
    assert_eq!(response.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["message"], "boom");
}

#[test]
fn test_passthrough_runs_every_handler() {
    let log = Log::default();
    let b_log = Arc::clone(&log);
    let engine = engine_with(&log, move |ctx| {
        push(&b_log, "B-pre");
        ctx.next();
        push(&b_log, "B-post");
    });

    let response = dispatch(&engine, Method::GET, "/work");

    assert_eq!(
        *log.lock().unwrap(),
        vec!["A-pre", "B-pre", "terminal", "B-post", "A-post"]
    );
    assert_eq!(response.body_text(), "done");
}

#[test]
fn test_panic_without_recovery_escapes_dispatch() {
    let log = Log::default();
    let engine = engine_with(&log, |_ctx| panic!("handler exploded"));

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        dispatch(&engine, Method::GET, "/work");
    }));
    assert!(outcome.is_err());

    // A-post never ran because the panic unwound through A.
    assert_eq!(*log.lock().unwrap(), vec!["A-pre"]);
}

#[test]
fn test_not_found_chain() {
    let log = Log::default();
    let engine = engine_with(&log, |ctx| ctx.next());

    let response = dispatch(&engine, Method::GET, "/missing");
    assert_eq!(response.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(response.body_text(), "404 NOT FOUND: /missing");

    let response = dispatch(&engine, Method::POST, "/work");
    assert_eq!(response.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(*log.lock().unwrap(), vec!["A-pre", "A-post", "A-pre", "A-post"]);
}

#[test]
fn test_post_form_dispatch() {
    let mut engine = Engine::new();
    engine
        .post("/login", |ctx| {
            let user = ctx.post_form("username").unwrap_or_default();
            ctx.json(StatusCode::OK, &serde_json::json!({ "username": user }));
        })
        .unwrap();
    let engine = engine.seal();

    let request = Request::post("/login")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Bytes::from_static(b"username=alice&password=1234"))
        .unwrap();
    let mut response = BufferedResponse::new();
    engine.dispatch(&request, &mut response);

    assert_eq!(response.body_text(), r#"{"username":"alice"}"#);
}
