//! # GCP Token Agent
//!
//! Keeps one Google Cloud Healthcare API access token per configured account
//! fresh and registers it with Orthanc as a DICOMweb server definition, so
//! Orthanc can talk to the matching Google DICOM store.
//!
//! Modules:
//! - `config`: configuration file, validation and the account registry
//! - `sources`: service-account and authorized-user OAuth2 flows
//! - `cache`: token cache in front of the token endpoints
//! - `sinks`: DICOMweb server registration in Orthanc
//! - `scheduler`: per-account refresh workers and their supervisor
//! - `host`: start/stop hooks and the DICOMweb plugin check

pub mod cache;
pub mod config;
pub mod helpers;
pub mod host;
pub mod observability;
pub mod resilience;
pub mod scheduler;
pub mod server;
pub mod sinks;
pub mod sources;
pub mod utils;

#[cfg(test)]
pub mod tests;
