//! The texture request orchestrator.
//!
//! Drives one caller request through the full pipeline: context
//! creation, job submission, completion monitoring, artifact retrieval,
//! mesh conversion, and transport encoding. Every step after context
//! creation funnels through a single unconditional cleanup call, so no
//! exit path can leak a scratch directory.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use validator::Validate;

use meshtex_comfyui::monitor::{self, JobOutcome};
use meshtex_comfyui::{artifacts, workflow};
use meshtex_core::context::RequestContext;
use meshtex_core::convert::convert_mesh;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Caller request body for `POST /api/texture`.
#[derive(Debug, Deserialize, Validate)]
pub struct TextureRequest {
    /// Free-text description of the desired texture.
    #[validate(length(min = 1, message = "user_prompt must not be empty"))]
    pub user_prompt: String,
}

/// Success payload: the converted model plus the prompt it answers.
#[derive(Debug, Serialize)]
pub struct TextureResponse {
    /// Base64-encoded glTF binary.
    pub model: String,
    /// Echo of the caller's prompt.
    pub prompt: String,
}

/// Run one texture request end to end.
///
/// Validation happens before any context exists, so a bad request has
/// no side effects at all. After that point the context is cleaned up
/// on success and on every failure alike.
pub async fn handle_texture_request(
    state: &AppState,
    request: TextureRequest,
) -> AppResult<TextureResponse> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let ctx = RequestContext::create(&state.config.work_root)?;

    let result = run_pipeline(state, &ctx, &request.user_prompt).await;

    // The single cleanup funnel: success and every error path above
    // pass through here.
    ctx.cleanup();

    result.map(|model| TextureResponse {
        model,
        prompt: request.user_prompt,
    })
}

/// The pipeline body. Owns no cleanup; the caller does.
async fn run_pipeline(
    state: &AppState,
    ctx: &RequestContext,
    user_prompt: &str,
) -> AppResult<String> {
    // 1. Job description from the template.
    let template = state
        .workflow
        .as_deref()
        .ok_or_else(|| AppError::Configuration("Workflow file not loaded".to_string()))?;

    let seed = workflow::random_seed();
    let job = template
        .instantiate(user_prompt, seed)
        .map_err(|e| AppError::Configuration(e.to_string()))?;

    // 2. Submit.
    let submitted = state
        .engine_api
        .submit_workflow(&job, &ctx.client_id)
        .await?;
    let prompt_id = submitted.prompt_id;
    tracing::info!(
        prompt_id = %prompt_id,
        client_id = %ctx.client_id,
        seed,
        "Job submitted",
    );

    // 3. Wait for a terminal state over the event stream. A connection
    // failure here is fatal for the request; the job itself is
    // abandoned to the engine.
    let conn = state
        .engine_client
        .connect(&ctx.client_id)
        .await
        .map_err(|e| AppError::ExecutionFailed(e.to_string()))?;

    let timeout = Duration::from_secs(state.config.job_timeout_secs);
    match monitor::await_completion(conn, &prompt_id, timeout).await {
        JobOutcome::Succeeded => {}
        JobOutcome::Failed { error } => return Err(AppError::ExecutionFailed(error)),
        JobOutcome::TimedOut => {
            return Err(AppError::ExecutionFailed(format!(
                "job did not complete within {} seconds",
                timeout.as_secs()
            )))
        }
    }

    // 4. Retrieve outputs; only the mesh is mandatory.
    let artifacts = artifacts::retrieve(&state.engine_api, ctx).await;
    let mesh = artifacts.mesh().ok_or(AppError::ArtifactMissing("mesh"))?;

    // 5. Convert and encode.
    let converted = convert_mesh(&state.config.converter_bin, mesh, &ctx.scratch_dir).await?;
    let bytes = tokio::fs::read(&converted).await?;

    Ok(BASE64.encode(bytes))
}
