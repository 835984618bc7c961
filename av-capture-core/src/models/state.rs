use super::error::CaptureError;

/// Recorder state machine.
///
/// ```text
/// idle → graph_assembling → running → draining → stopped
///              ↓               ↓
///            failed ←──────────┘
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RecorderState {
    Idle,
    GraphAssembling,
    Running,
    Draining,
    Stopped,
    Failed(CaptureError),
}

impl RecorderState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running | Self::Draining)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped | Self::Failed(_))
    }

    pub fn error(&self) -> Option<&CaptureError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}
