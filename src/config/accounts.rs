use serde::Deserialize;

/// One entry of `GoogleCloudPlatform.Accounts`, as written in the config file.
///
/// Exactly one credential form must be present:
/// `ServiceAccountFile`, `AuthorizedUserFile`, or the inline
/// `AuthorizedUserClientId` / `AuthorizedUserClientSecret` / `AuthorizedUserRefreshToken` triple.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "PascalCase")]
pub struct AccountConfig {
    pub project: Option<String>,
    pub location: Option<String>,
    pub dataset: Option<String>,
    pub dicom_store: Option<String>,

    pub service_account_file: Option<String>,
    pub authorized_user_file: Option<String>,
    pub authorized_user_client_id: Option<String>,
    pub authorized_user_client_secret: Option<String>,
    pub authorized_user_refresh_token: Option<String>,
}

impl AccountConfig {
    pub fn has_inline_authorized_user(&self) -> bool {
        self.authorized_user_client_id.is_some()
            || self.authorized_user_client_secret.is_some()
            || self.authorized_user_refresh_token.is_some()
    }

    /// Names of the credential forms present, in recognition order.
    pub fn credential_forms(&self) -> Vec<&'static str> {
        let mut forms = Vec::new();
        if self.service_account_file.is_some() {
            forms.push("ServiceAccountFile");
        }
        if self.authorized_user_file.is_some() {
            forms.push("AuthorizedUserFile");
        }
        if self.has_inline_authorized_user() {
            forms.push("AuthorizedUserClientId/AuthorizedUserClientSecret/AuthorizedUserRefreshToken");
        }
        forms
    }
}
