//! Credential error types.

/// Errors that can occur while resolving credentials.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The credentials file is not valid JSON.
    #[error("malformed credentials file: {0}")]
    Json(#[from] serde_json::Error),

    /// The credentials file could not be read or written.
    #[error("credentials file access failed: {0}")]
    Io(#[from] std::io::Error),

    /// The credentials file uses a format version this build cannot read.
    #[error("unsupported credentials file version: {0}")]
    UnsupportedVersion(u32),

    /// No source yielded a username and password.
    #[error("no credentials configured: {0}")]
    NotConfigured(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_configured_display() {
        let err = AuthError::NotConfigured("LIMESURVEY_USERNAME is not set".to_string());
        assert_eq!(
            err.to_string(),
            "no credentials configured: LIMESURVEY_USERNAME is not set"
        );
    }

    #[test]
    fn io_failures_convert() {
        let err = AuthError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "permission denied",
        ));
        assert_eq!(
            err.to_string(),
            "credentials file access failed: permission denied"
        );
    }
}
