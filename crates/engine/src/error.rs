use layers::{HostError, InvalidInput, LayerError};

/// Failure taxonomy of a render pass.
///
/// Everything except [`RenderError::Fatal`] is recovered on the next pass.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// One item was skipped; the rest of the pass went on.
    InvalidInput(InvalidInput),
    HostMapUnavailable,
    LayerGroupFault(LayerError),
    Fatal(String),
}

impl RenderError {
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, RenderError::Fatal(_))
    }

    /// Short text for the surrounding UI.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Log/diagnostic category.
    pub fn category(&self) -> &'static str {
        match self {
            RenderError::InvalidInput(_) => "invalid_input",
            RenderError::HostMapUnavailable => "host_unavailable",
            RenderError::LayerGroupFault(_) => "layer_fault",
            RenderError::Fatal(_) => "fatal",
        }
    }
}

impl From<LayerError> for RenderError {
    fn from(err: LayerError) -> Self {
        match err {
            e if e.is_unavailable() => RenderError::HostMapUnavailable,
            LayerError::DuplicateMarker(key) => {
                RenderError::Fatal(format!("marker {key} emitted twice in one pass"))
            }
            e => RenderError::LayerGroupFault(e),
        }
    }
}

impl From<InvalidInput> for RenderError {
    fn from(err: InvalidInput) -> Self {
        RenderError::InvalidInput(err)
    }
}

impl From<HostError> for RenderError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::Unavailable => RenderError::HostMapUnavailable,
            e => RenderError::Fatal(e.to_string()),
        }
    }
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::InvalidInput(e) => write!(f, "skipped item: {e}"),
            RenderError::HostMapUnavailable => write!(f, "map is not available"),
            RenderError::LayerGroupFault(e) => write!(f, "layer fault: {e}"),
            RenderError::Fatal(msg) => write!(f, "render failed: {msg}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::InvalidInput(e) => Some(e),
            RenderError::LayerGroupFault(e) => Some(e),
            _ => None,
        }
    }
}
