//! Shared test harness: an in-process mock generation engine plus the
//! full application router wired against it.
//!
//! The mock engine serves the three surfaces the pipeline touches:
//! `POST /prompt` (always queues as `j1`), `GET /download/{filename}`
//! (stub bytes, configurable 404s), and `GET /ws` (sends a scripted
//! event sequence, then idles).

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::ws::{Message as WsMessage, WebSocketUpgrade};
use axum::extract::{Path as UrlPath, State};
use axum::http::{Request, Response, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use http_body_util::BodyExt;
use tempfile::{NamedTempFile, TempDir};
use tower::ServiceExt;

use meshtex_api::config::ServerConfig;
use meshtex_api::router::build_app_router;
use meshtex_api::state::AppState;

/// Prompt id the mock engine assigns to every submission.
pub const MOCK_PROMPT_ID: &str = "j1";

/// Behaviour knobs for one test's engine + app pair.
pub struct TestOptions {
    /// Event frames the mock WebSocket sends after connect.
    pub events: Vec<serde_json::Value>,
    /// Filenames the download endpoint 404s on.
    pub missing_downloads: Vec<&'static str>,
    /// Body of the stub converter script (after the shebang).
    pub converter_body: &'static str,
    /// Whether to write a loadable workflow template file.
    pub load_workflow: bool,
    /// Override the engine API URL (e.g. a dead port) instead of the
    /// spawned mock.
    pub engine_api_override: Option<String>,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            events: success_events(MOCK_PROMPT_ID),
            missing_downloads: vec![],
            converter_body: "cp \"$1\" \"$2/$(basename \"${1%.*}\").gltf\"\n",
            load_workflow: true,
            engine_api_override: None,
        }
    }
}

/// Everything a test needs; temp resources are dropped with it.
pub struct TestHarness {
    pub app: Router,
    pub work_root: TempDir,
    _workflow: Option<NamedTempFile>,
    _converter: tempfile::TempPath,
}

/// The canonical happy-path event sequence for a prompt id.
pub fn success_events(prompt_id: &str) -> Vec<serde_json::Value> {
    vec![
        serde_json::json!({"type": "execution_start", "data": {"prompt_id": prompt_id}}),
        serde_json::json!({"type": "executing", "data": {"node": "9", "prompt_id": prompt_id}}),
        serde_json::json!({"type": "executing", "data": {"node": null, "prompt_id": prompt_id}}),
        serde_json::json!({"type": "execution_success", "data": {"prompt_id": prompt_id}}),
    ]
}

struct MockEngine {
    events: Vec<serde_json::Value>,
    missing_downloads: Vec<&'static str>,
}

async fn submit(State(_): State<Arc<MockEngine>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({"prompt_id": MOCK_PROMPT_ID, "number": 1}))
}

async fn download(
    State(engine): State<Arc<MockEngine>>,
    UrlPath(filename): UrlPath<String>,
) -> Result<String, StatusCode> {
    if engine.missing_downloads.contains(&filename.as_str()) {
        Err(StatusCode::NOT_FOUND)
    } else {
        Ok(format!("contents of {filename}"))
    }
}

async fn events_ws(
    State(engine): State<Arc<MockEngine>>,
    ws: WebSocketUpgrade,
) -> axum::response::Response {
    ws.on_upgrade(move |mut socket| async move {
        for event in &engine.events {
            let frame = WsMessage::Text(event.to_string().into());
            if socket.send(frame).await.is_err() {
                return;
            }
        }
        // Keep the stream open; the client decides when it is done.
        tokio::time::sleep(std::time::Duration::from_secs(300)).await;
    })
}

/// Spawn the mock engine on an ephemeral port, returning its address.
async fn spawn_engine(engine: MockEngine) -> std::net::SocketAddr {
    let app = Router::new()
        .route("/prompt", post(submit))
        .route("/download/{filename}", get(download))
        .route("/ws", get(events_ws))
        .with_state(Arc::new(engine));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock engine");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve mock engine");
    });
    addr
}

/// Write the stub workflow template used by the tests.
fn write_workflow() -> NamedTempFile {
    use std::io::Write;
    let mut f = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("create workflow file");
    write!(
        f,
        r#"{{
            "3": {{ "class_type": "KSampler", "inputs": {{ "seed": 0 }} }},
            "6": {{ "class_type": "CLIPTextEncode", "inputs": {{ "text": "placeholder" }} }}
        }}"#
    )
    .expect("write workflow");
    f
}

/// Write an executable stub converter script.
///
/// Returns a closed [`tempfile::TempPath`]: keeping the write handle
/// open while the pipeline execs the script fails with ETXTBSY.
fn write_converter(body: &str) -> tempfile::TempPath {
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    let mut f = tempfile::Builder::new()
        .suffix(".sh")
        .tempfile()
        .expect("create converter script");
    writeln!(f, "#!/bin/bash").expect("write shebang");
    write!(f, "{body}").expect("write body");

    let mut perms = f.as_file().metadata().expect("metadata").permissions();
    perms.set_mode(0o755);
    f.as_file().set_permissions(perms).expect("chmod");
    f.into_temp_path()
}

/// Spawn a mock engine per the options and build the application
/// against it.
pub async fn build_test_app(options: TestOptions) -> TestHarness {
    let addr = spawn_engine(MockEngine {
        events: options.events,
        missing_downloads: options.missing_downloads,
    })
    .await;

    let workflow = options.load_workflow.then(write_workflow);
    let converter = write_converter(options.converter_body);
    let work_root = tempfile::tempdir().expect("create work root");

    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        engine_api_url: options
            .engine_api_override
            .unwrap_or_else(|| format!("http://{addr}")),
        engine_ws_url: format!("ws://{addr}"),
        workflow_path: workflow
            .as_ref()
            .map(|f| f.path().to_path_buf())
            .unwrap_or_else(|| "/nonexistent/workflow.json".into()),
        prompt_nodes: vec!["6".to_string()],
        seed_nodes: vec!["3".to_string()],
        converter_bin: converter.to_path_buf(),
        work_root: work_root.path().to_path_buf(),
        job_timeout_secs: 5,
    };

    let state = AppState::from_config(config.clone());
    let app = build_app_router(state, &config);

    TestHarness {
        app,
        work_root,
        _workflow: workflow,
        _converter: converter,
    }
}

/// Issue a GET request against the app.
pub async fn get_request(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("build request"),
    )
    .await
    .expect("send request")
}

/// Issue a JSON POST request against the app.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("build request"),
    )
    .await
    .expect("send request")
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("parse body as JSON")
}

/// Assert the work root holds no leftover scratch directories.
pub fn assert_work_root_empty(work_root: &Path) {
    let leftovers: Vec<_> = std::fs::read_dir(work_root)
        .expect("read work root")
        .collect();
    assert!(
        leftovers.is_empty(),
        "scratch directories leaked: {leftovers:?}"
    );
}
