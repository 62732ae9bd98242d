//! Workflow template loading and per-request instantiation.
//!
//! The job description sent to the engine is a static workflow JSON
//! (node id -> `{class_type, inputs}`) with two per-request overrides:
//! the caller's prompt text and a fresh random seed. The template is
//! loaded once at startup and never mutated; each request works on its
//! own clone.

use std::path::Path;

use rand::Rng;

/// Errors from template loading and instantiation.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("failed to read workflow file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("workflow file {path} is not valid JSON: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("workflow has no node {node} with input {input}")]
    MissingNode {
        node: String,
        input: &'static str,
    },
}

/// An immutable workflow template plus the node ids designated for
/// per-request injection.
#[derive(Debug, Clone)]
pub struct WorkflowTemplate {
    template: serde_json::Value,
    prompt_nodes: Vec<String>,
    seed_nodes: Vec<String>,
}

impl WorkflowTemplate {
    /// Load the template JSON from disk.
    pub fn load(
        path: &Path,
        prompt_nodes: Vec<String>,
        seed_nodes: Vec<String>,
    ) -> Result<Self, WorkflowError> {
        let raw = std::fs::read_to_string(path).map_err(|source| WorkflowError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let template = serde_json::from_str(&raw).map_err(|source| WorkflowError::Parse {
            path: path.display().to_string(),
            source,
        })?;

        Ok(Self {
            template,
            prompt_nodes,
            seed_nodes,
        })
    }

    /// Build a template directly from a JSON value (used by tests).
    pub fn from_value(
        template: serde_json::Value,
        prompt_nodes: Vec<String>,
        seed_nodes: Vec<String>,
    ) -> Self {
        Self {
            template,
            prompt_nodes,
            seed_nodes,
        }
    }

    /// Clone the template and inject the prompt and seed into the
    /// designated nodes.
    ///
    /// A designated node that is absent from the template (or lacks an
    /// `inputs` object) is a configuration mistake and fails the
    /// request rather than silently submitting an unmodified job.
    pub fn instantiate(
        &self,
        user_prompt: &str,
        seed: u32,
    ) -> Result<serde_json::Value, WorkflowError> {
        let mut job = self.template.clone();

        for node in &self.prompt_nodes {
            set_input(&mut job, node, "text", serde_json::json!(user_prompt))?;
        }
        for node in &self.seed_nodes {
            set_input(&mut job, node, "seed", serde_json::json!(seed))?;
        }

        Ok(job)
    }
}

/// Draw a fresh seed from the full 32-bit space.
pub fn random_seed() -> u32 {
    rand::rng().random()
}

fn set_input(
    job: &mut serde_json::Value,
    node: &str,
    input: &'static str,
    value: serde_json::Value,
) -> Result<(), WorkflowError> {
    let inputs = job
        .get_mut(node)
        .and_then(|n| n.get_mut("inputs"))
        .and_then(|i| i.as_object_mut())
        .ok_or_else(|| WorkflowError::MissingNode {
            node: node.to_string(),
            input,
        })?;

    inputs.insert(input.to_string(), value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> WorkflowTemplate {
        WorkflowTemplate::from_value(
            serde_json::json!({
                "3": {
                    "class_type": "KSampler",
                    "inputs": { "seed": 0, "steps": 20 }
                },
                "6": {
                    "class_type": "CLIPTextEncode",
                    "inputs": { "text": "placeholder" }
                }
            }),
            vec!["6".to_string()],
            vec!["3".to_string()],
        )
    }

    #[test]
    fn instantiate_injects_prompt_and_seed() {
        let job = template()
            .instantiate("pink rubber ducky", 42)
            .expect("instantiate");

        assert_eq!(job["6"]["inputs"]["text"], "pink rubber ducky");
        assert_eq!(job["3"]["inputs"]["seed"], 42);
        // Untouched fields survive the clone.
        assert_eq!(job["3"]["inputs"]["steps"], 20);
    }

    #[test]
    fn instantiate_does_not_mutate_the_template() {
        let tpl = template();
        tpl.instantiate("first", 1).expect("instantiate");
        let job = tpl.instantiate("second", 2).expect("instantiate");
        assert_eq!(job["6"]["inputs"]["text"], "second");
    }

    #[test]
    fn missing_designated_node_is_an_error() {
        let tpl = WorkflowTemplate::from_value(
            serde_json::json!({ "1": { "inputs": {} } }),
            vec!["99".to_string()],
            vec![],
        );
        let err = tpl.instantiate("prompt", 1).unwrap_err();
        assert!(matches!(err, WorkflowError::MissingNode { .. }));
    }

    #[test]
    fn load_rejects_invalid_json() {
        use std::io::Write;
        let mut f = tempfile::NamedTempFile::new().expect("create temp file");
        write!(f, "{{ not json").expect("write");

        let err = WorkflowTemplate::load(f.path(), vec![], vec![]).unwrap_err();
        assert!(matches!(err, WorkflowError::Parse { .. }));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = WorkflowTemplate::load(Path::new("/nonexistent/workflow.json"), vec![], vec![])
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Read { .. }));
    }
}
