//! Shared constants and invariants

pub const DEFAULT_BASE_URL: &str = "https://healthcare.googleapis.com/v1beta1/";
pub const DEFAULT_DICOMWEB_ROOT: &str = "/dicom-web";
pub const DEFAULT_ORTHANC_URL: &str = "http://localhost:8042";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
pub const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
pub const REFRESH_TOKEN_GRANT_TYPE: &str = "refresh_token";

/// A cached access token is renewed once it is this close to expiry.
pub const TOKEN_EXPIRY_SLACK_SECS: i64 = 300;
pub const ASSERTION_TTL_SECS: i64 = 3600;

pub const WORKER_TICK_MS: u64 = 100;

pub const DICOMWEB_PLUGIN_PATH: &str = "/plugins/dicom-web";
