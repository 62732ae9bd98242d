//! Retrieval of the engine's output files.
//!
//! The texturing workflow produces a fixed set of files. Each is
//! fetched independently into the request's scratch directory; a failed
//! download marks that role absent and the rest proceed. Retrieval
//! itself never fails -- callers check the roles they require.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use meshtex_core::context::RequestContext;

use crate::api::EngineApi;

/// Logical role of an output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactRole {
    Mesh,
    Material,
    Texture,
}

/// The fixed manifest of outputs the texturing workflow writes.
pub const OUTPUT_MANIFEST: &[(ArtifactRole, &str)] = &[
    (ArtifactRole::Mesh, "mesh.obj"),
    (ArtifactRole::Material, "mesh.mtl"),
    (ArtifactRole::Texture, "mesh_texture.png"),
];

/// Per-role retrieval outcome: a local path, or absent.
#[derive(Debug, Default)]
pub struct ArtifactSet {
    paths: HashMap<ArtifactRole, Option<PathBuf>>,
}

impl ArtifactSet {
    /// Local path for a role, if its download succeeded.
    pub fn path(&self, role: ArtifactRole) -> Option<&Path> {
        self.paths.get(&role).and_then(|p| p.as_deref())
    }

    /// The primary mesh file, required by the conversion step.
    pub fn mesh(&self) -> Option<&Path> {
        self.path(ArtifactRole::Mesh)
    }

    /// Number of roles that were actually retrieved.
    pub fn present_count(&self) -> usize {
        self.paths.values().filter(|p| p.is_some()).count()
    }
}

/// Download every manifest entry into the context's scratch directory.
///
/// A failure on one role is logged and recorded as absent; it does not
/// abort the remaining downloads.
pub async fn retrieve(api: &EngineApi, ctx: &RequestContext) -> ArtifactSet {
    let mut set = ArtifactSet::default();

    for &(role, filename) in OUTPUT_MANIFEST {
        let path = match fetch_one(api, ctx, filename).await {
            Ok(path) => {
                tracing::debug!(?role, filename, "Retrieved artifact");
                Some(path)
            }
            Err(e) => {
                tracing::error!(?role, filename, error = %e, "Failed to retrieve artifact");
                None
            }
        };
        set.paths.insert(role, path);
    }

    set
}

async fn fetch_one(
    api: &EngineApi,
    ctx: &RequestContext,
    filename: &str,
) -> Result<PathBuf, RetrieveError> {
    let bytes = api.download_file(filename).await?;
    let path = ctx.scratch_dir.join(filename);
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

/// Why a single artifact download failed. Internal to retrieval; the
/// public surface only records absence.
#[derive(Debug, thiserror::Error)]
enum RetrieveError {
    #[error(transparent)]
    Api(#[from] crate::api::EngineApiError),

    #[error("failed to write artifact: {0}")]
    Io(#[from] std::io::Error),
}
