use std::sync::Arc;

use meshtex_comfyui::api::EngineApi;
use meshtex_comfyui::client::EngineClient;
use meshtex_comfyui::workflow::WorkflowTemplate;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Everything here is process-wide, read-only configuration; per-request
/// state lives in `RequestContext` and is never shared.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// REST client for the generation engine.
    pub engine_api: Arc<EngineApi>,
    /// WebSocket client for the engine's event stream.
    pub engine_client: Arc<EngineClient>,
    /// Workflow template, if it loaded at startup. `None` makes every
    /// texture request fail with a configuration error.
    pub workflow: Option<Arc<WorkflowTemplate>>,
}

impl AppState {
    /// Build state from configuration, attempting to load the workflow
    /// template.
    ///
    /// A missing or invalid template is logged but does not prevent
    /// startup; the service stays up and reports the problem per
    /// request.
    pub fn from_config(config: ServerConfig) -> Self {
        let workflow = match WorkflowTemplate::load(
            &config.workflow_path,
            config.prompt_nodes.clone(),
            config.seed_nodes.clone(),
        ) {
            Ok(tpl) => Some(Arc::new(tpl)),
            Err(e) => {
                tracing::warn!(
                    path = %config.workflow_path.display(),
                    error = %e,
                    "Workflow template not loaded; texture requests will fail",
                );
                None
            }
        };

        let engine_api = Arc::new(EngineApi::new(config.engine_api_url.clone()));
        let engine_client = Arc::new(EngineClient::new(config.engine_ws_url.clone()));

        Self {
            config: Arc::new(config),
            engine_api,
            engine_client,
            workflow,
        }
    }
}
