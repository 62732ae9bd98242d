//! Per-request execution context.
//!
//! Every texture request gets its own [`RequestContext`]: a freshly
//! created scratch directory for downloaded and converted artifacts,
//! plus a unique client identity used to scope the engine's event
//! stream. Contexts are never shared or reused across requests.

use std::path::{Path, PathBuf};

/// Isolated working area for a single texture request.
///
/// The scratch directory and client id exist only between
/// [`create`](Self::create) and [`cleanup`](Self::cleanup). Concurrent
/// requests each hold their own context; uniqueness comes from UUID v4
/// names rather than a counter, so two contexts can never collide.
#[derive(Debug)]
pub struct RequestContext {
    /// Directory holding this request's downloaded and converted files.
    pub scratch_dir: PathBuf,
    /// Client identity sent with the job submission and the event-stream
    /// handshake, so the engine addresses messages back to this request.
    pub client_id: String,
}

impl RequestContext {
    /// Allocate a fresh context under `work_root`.
    ///
    /// Creates `<work_root>/<uuid>/` (including `work_root` itself if
    /// missing) and generates an independent UUID v4 client id.
    pub fn create(work_root: &Path) -> std::io::Result<Self> {
        let scratch_dir = work_root.join(uuid::Uuid::new_v4().to_string());
        std::fs::create_dir_all(&scratch_dir)?;

        let client_id = uuid::Uuid::new_v4().to_string();

        tracing::debug!(
            scratch_dir = %scratch_dir.display(),
            client_id = %client_id,
            "Created request context",
        );

        Ok(Self {
            scratch_dir,
            client_id,
        })
    }

    /// Best-effort removal of the scratch directory.
    ///
    /// Never fails: removal errors (directory already gone, partially
    /// written files) are logged and swallowed. Safe to call more than
    /// once.
    pub fn cleanup(&self) {
        if !self.scratch_dir.exists() {
            return;
        }
        match std::fs::remove_dir_all(&self.scratch_dir) {
            Ok(()) => {
                tracing::debug!(
                    scratch_dir = %self.scratch_dir.display(),
                    "Removed request context",
                );
            }
            Err(e) => {
                tracing::warn!(
                    scratch_dir = %self.scratch_dir.display(),
                    error = %e,
                    "Failed to remove scratch directory",
                );
            }
        }
    }
}
