use thiserror::Error;

/// Failures while assembling a rig from an authored skeleton. All of them are
/// raised before the physics scene is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RigError {
    #[error("Model '{model}' has no node named '{node}'")]
    MissingNode { model: String, node: String },
    #[error("Node '{node}' of model '{model}' has a broken parent chain")]
    BrokenHierarchy { model: String, node: String },
}
