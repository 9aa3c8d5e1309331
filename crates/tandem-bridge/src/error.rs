use tandem_engine::device::ContextId;

/// Failures surfaced by the bridge.
///
/// Configuration problems are reported by the call that detected them.
/// Scene renderer failures are passed through untouched as `Renderer`.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("layer must have a unique, non-empty id")]
    MissingId,

    #[error("layer update cannot change id from `{old}` to `{new}`")]
    IdMismatch { old: String, new: String },

    #[error("invalid layer options: {0}")]
    InvalidOptions(#[from] serde_json::Error),

    #[error("layer `{id}` is not attached to a host map")]
    NotAttached { id: String },

    #[error("renderer instance for {context} has been finalized")]
    Finalized { context: ContextId },

    #[error("renderer instance for {context} is already in use")]
    Reentrant { context: ContextId },

    #[error("failed to build layer `{id}`")]
    Build {
        id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("scene renderer error: {0}")]
    Renderer(#[source] anyhow::Error),
}

pub type Result<T, E = BridgeError> = std::result::Result<T, E>;
