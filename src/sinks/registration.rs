use std::collections::BTreeMap;

use serde::Serialize;

use crate::sinks::PublishError;

/// Body of `PUT <root>/servers/<name>` understood by the Orthanc DICOMweb plugin.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ServerDefinition {
    pub url: String,
    pub has_delete: String,
    pub http_headers: BTreeMap<String, String>,
}

impl ServerDefinition {
    pub fn new(url: String, header_name: String, header_value: String) -> Self {
        Self {
            url,
            has_delete: "1".to_owned(),
            http_headers: BTreeMap::from([(header_name, header_value)]),
        }
    }
}

/// Split `"<name>: <value>"` on the first colon, trimming both halves.
pub fn split_header(account: &str, token: &str) -> Result<(String, String), PublishError> {
    token
        .split_once(':')
        .map(|(name, value)| (name.trim().to_owned(), value.trim().to_owned()))
        .ok_or_else(|| PublishError::MalformedToken { account: account.to_owned() })
}
