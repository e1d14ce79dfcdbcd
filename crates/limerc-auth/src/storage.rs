//! Credentials file I/O.
//!
//! Reads and writes `~/.limerc/credentials.json` with secure file
//! permissions (0o600):
//!
//! ```json
//! { "version": 1, "username": "admin", "password": "...", "lastUpdated": "..." }
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use limerc_core::Credentials;
use serde::{Deserialize, Serialize};

use crate::errors::AuthError;

/// Default credentials file name.
const CREDENTIALS_FILE_NAME: &str = "credentials.json";

/// Current on-disk format version.
const FORMAT_VERSION: u32 = 1;

/// Get the credentials file path under the given data directory.
pub fn credentials_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CREDENTIALS_FILE_NAME)
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CredentialsFile {
    version: u32,
    username: String,
    password: String,
    #[serde(default)]
    last_updated: String,
}

/// Load credentials from `path`.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_credentials(path: &Path) -> Result<Option<Credentials>, AuthError> {
    let data = match std::fs::read_to_string(path) {
        Ok(d) => d,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let file: CredentialsFile = serde_json::from_str(&data)?;
    if file.version != FORMAT_VERSION {
        tracing::warn!(version = file.version, "unsupported credentials file version");
        return Err(AuthError::UnsupportedVersion(file.version));
    }
    Ok(Some(Credentials::new(file.username, file.password)))
}

/// Write `credentials` to `path`, creating parent directories.
///
/// On Unix the file is created with mode 0o600 and rewritten in place, so
/// the password is never readable by other users.
pub fn save_credentials(path: &Path, credentials: &Credentials) -> Result<(), AuthError> {
    let body = serde_json::to_vec_pretty(&CredentialsFile {
        version: FORMAT_VERSION,
        username: credentials.username.clone(),
        password: credentials.password.clone(),
        last_updated: chrono::Utc::now().to_rfc3339(),
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut options = std::fs::OpenOptions::new();
    let _ = options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        let _ = options.mode(0o600);
        let mut file = options.open(path)?;
        // An existing file keeps its old mode; tighten it.
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        file.write_all(&body)?;
    }
    #[cfg(not(unix))]
    {
        options.open(path)?.write_all(&body)?;
    }

    tracing::debug!(path = %path.display(), "credentials saved");
    Ok(())
}

/// Delete the credentials file. Missing files are not an error.
pub fn clear_credentials(path: &Path) -> Result<(), AuthError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(AuthError::Io(e)),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
