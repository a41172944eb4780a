use runtime::EventKind;

use crate::view::TargetView;

pub const RENDER_ERROR: &str = "renderError";
pub const VIEW_CHANGED: &str = "viewChanged";
pub const DIAGNOSTIC: &str = "diagnostic";

/// Observable engine output. Subscribe by kind name with `Engine::on`.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    RenderError { message: String, recoverable: bool },
    ViewChanged(TargetView),
    /// Non-fatal issues (skipped items, dropped groups) from a pass.
    Diagnostic { category: &'static str, message: String },
}

impl EventKind for EngineEvent {
    fn kind(&self) -> &'static str {
        match self {
            EngineEvent::RenderError { .. } => RENDER_ERROR,
            EngineEvent::ViewChanged(_) => VIEW_CHANGED,
            EngineEvent::Diagnostic { .. } => DIAGNOSTIC,
        }
    }
}
