//! File system errors

use super::SipError;

/// Creates a file write failed error
pub fn write_failed(path: impl Into<String>, reason: impl Into<String>) -> SipError {
    SipError::FileWriteFailed {
        path: path.into(),
        reason: reason.into(),
    }
}
