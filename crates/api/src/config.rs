use std::path::PathBuf;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables. Read once at
/// startup; immutable thereafter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `330`). Must exceed
    /// `job_timeout_secs`, or the middleware cuts off in-flight jobs.
    pub request_timeout_secs: u64,
    /// Engine HTTP base URL (default: `http://127.0.0.1:8188`).
    pub engine_api_url: String,
    /// Engine WebSocket base URL (default: `ws://127.0.0.1:8188`).
    pub engine_ws_url: String,
    /// Path to the workflow template JSON.
    pub workflow_path: PathBuf,
    /// Node ids whose `inputs.text` receives the caller's prompt.
    pub prompt_nodes: Vec<String>,
    /// Node ids whose `inputs.seed` receives the per-request seed.
    pub seed_nodes: Vec<String>,
    /// Path to the mesh conversion utility.
    pub converter_bin: PathBuf,
    /// Directory under which per-request scratch directories are created.
    pub work_root: PathBuf,
    /// Wall-clock bound on waiting for job completion (default: `300`).
    pub job_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                  |
    /// |--------------------------|--------------------------|
    /// | `HOST`                   | `0.0.0.0`                |
    /// | `PORT`                   | `5000`                   |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`  |
    /// | `REQUEST_TIMEOUT_SECS`   | `330`                    |
    /// | `ENGINE_API_URL`         | `http://127.0.0.1:8188`  |
    /// | `ENGINE_WS_URL`          | `ws://127.0.0.1:8188`    |
    /// | `WORKFLOW_PATH`          | `workflow.json`          |
    /// | `WORKFLOW_PROMPT_NODES`  | `6`                      |
    /// | `WORKFLOW_SEED_NODES`    | `3`                      |
    /// | `CONVERTER_BIN`          | `mesh-convert`           |
    /// | `WORK_ROOT`              | `/tmp/meshtex`           |
    /// | `JOB_TIMEOUT_SECS`       | `300`                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "330".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let engine_api_url =
            std::env::var("ENGINE_API_URL").unwrap_or_else(|_| "http://127.0.0.1:8188".into());

        let engine_ws_url =
            std::env::var("ENGINE_WS_URL").unwrap_or_else(|_| "ws://127.0.0.1:8188".into());

        let workflow_path: PathBuf = std::env::var("WORKFLOW_PATH")
            .unwrap_or_else(|_| "workflow.json".into())
            .into();

        let prompt_nodes = parse_node_list(
            &std::env::var("WORKFLOW_PROMPT_NODES").unwrap_or_else(|_| "6".into()),
        );
        let seed_nodes =
            parse_node_list(&std::env::var("WORKFLOW_SEED_NODES").unwrap_or_else(|_| "3".into()));

        let converter_bin: PathBuf = std::env::var("CONVERTER_BIN")
            .unwrap_or_else(|_| "mesh-convert".into())
            .into();

        let work_root: PathBuf = std::env::var("WORK_ROOT")
            .unwrap_or_else(|_| "/tmp/meshtex".into())
            .into();

        let job_timeout_secs: u64 = std::env::var("JOB_TIMEOUT_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("JOB_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            engine_api_url,
            engine_ws_url,
            workflow_path,
            prompt_nodes,
            seed_nodes,
            converter_bin,
            work_root,
            job_timeout_secs,
        }
    }
}

/// Split a comma-separated node id list, dropping empty entries.
fn parse_node_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
