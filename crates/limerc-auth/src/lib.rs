//! # limerc-auth
//!
//! Credential sources for RemoteControl logins.
//!
//! - [`StaticCredentials`]: a pair supplied by the caller
//! - [`EnvCredentials`]: `LIMESURVEY_USERNAME` / `LIMESURVEY_PASSWORD`
//! - [`FileCredentials`]: `~/.limerc/credentials.json` (0o600)
//! - [`ChainedCredentials`]: first source that yields credentials wins
//!
//! There is no default account: a missing credential is an
//! [`AuthError::NotConfigured`].

#![deny(unsafe_code)]

pub mod errors;
pub mod sources;
pub mod storage;

pub use errors::AuthError;
pub use sources::{
    ChainedCredentials, CredentialSource, EnvCredentials, FileCredentials, PASSWORD_VAR,
    StaticCredentials, USERNAME_VAR,
};
pub use storage::{clear_credentials, credentials_file_path, load_credentials, save_credentials};
