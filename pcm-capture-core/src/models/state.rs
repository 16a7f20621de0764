use super::error::CaptureError;

/// Backend lifecycle state.
///
/// State transitions:
/// ```text
/// uninitialized → acquiring device → streaming → stopped
///                        ↓
///                     failed
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BackendState {
    #[default]
    Uninitialized,
    AcquiringDevice,
    Streaming,
    Stopped,
    Failed(CaptureError),
}

impl BackendState {
    pub fn is_streaming(&self) -> bool {
        matches!(self, Self::Streaming)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The error that put the backend into `Failed`, if any.
    pub fn error(&self) -> Option<&CaptureError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}
