use thiserror::Error;

/// Errors raised while acquiring, configuring, or tearing down a capture backend.
///
/// None of these reach the consumer of `AudioSource::read`; the backend logs
/// them and degrades to a failed state instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("no default input device available")]
    DeviceNotAvailable,

    #[error("{operation} failed: status {status}")]
    Platform { operation: &'static str, status: i32 },

    #[error("could not read {property}: status {status}")]
    PropertyQuery { property: &'static str, status: i32 },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("failed to spawn thread: {0}")]
    ThreadSpawn(String),

    #[error("audio capture is not supported on this platform")]
    Unsupported,

    #[error("configuration error: {0}")]
    Config(String),
}

impl CaptureError {
    /// Native status code carried by the error, if any.
    pub fn status(&self) -> Option<i32> {
        match self {
            Self::Platform { status, .. } | Self::PropertyQuery { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_error_message_includes_status() {
        let err = CaptureError::Platform {
            operation: "AudioDeviceStart",
            status: -50,
        };
        assert_eq!(err.to_string(), "AudioDeviceStart failed: status -50");
        assert_eq!(err.status(), Some(-50));
    }

    #[test]
    fn non_platform_errors_have_no_status() {
        assert_eq!(CaptureError::DeviceNotAvailable.status(), None);
        assert_eq!(CaptureError::Unsupported.status(), None);
    }
}
