use std::path::PathBuf;
use thiserror::Error;

/// Startup-time configuration problems. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config is not valid:\n  - {}", .0.join("\n  - "))]
    Invalid(Vec<String>),

    #[error("Missing \"{option}\" option for account \"{account}\"")]
    MissingOption { account: String, option: &'static str },

    #[error("Missing \"ServiceAccountFile\" or \"AuthorizedUserXXX\" option for account \"{account}\"")]
    MissingCredentials { account: String },

    #[error("cannot read credentials file {path:?} for account \"{account}\": {source}")]
    CredentialFile {
        account: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {kind} configuration for account \"{account}\": {reason}")]
    CredentialFormat {
        account: String,
        kind: &'static str,
        reason: String,
    },

    #[error("cannot read trusted certificate authorities from {path:?}: {reason}")]
    CaCertificates { path: PathBuf, reason: String },

    #[error("cannot build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Misuse of an [`AccountDescriptor`](crate::config::descriptor::AccountDescriptor) or the registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountError {
    #[error("account \"{account}\" has no {expected} credentials")]
    UnpopulatedCredential { account: String, expected: &'static str },

    #[error("account index {index} is out of range ({count} accounts configured)")]
    IndexOutOfRange { index: usize, count: usize },
}
