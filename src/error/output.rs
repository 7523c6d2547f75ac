//! Output errors

use super::SipError;

/// Creates an invalid output directory error
pub fn invalid_directory(path: impl Into<String>) -> SipError {
    SipError::InvalidOutputDirectory { path: path.into() }
}

/// Creates a render failed error
pub fn render_failed(reason: impl Into<String>) -> SipError {
    SipError::RenderFailed {
        reason: reason.into(),
    }
}
