//! Sinks receive freshly minted tokens. The only sink here registers the
//! token as a DICOMweb server definition in Orthanc.

use std::future::Future;

use thiserror::Error;

use crate::config::descriptor::AccountDescriptor;

pub mod orthanc;
pub mod registration;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PublishError {
    #[error("token for account \"{account}\" is not of the form \"<header>: <value>\"")]
    MalformedToken { account: String },
}

pub trait Publish: Send + Sync {
    /// `Ok(false)` is a transient failure already logged by the sink; `Err`
    /// is an invariant violation that must not be retried.
    fn publish(
        &self,
        account: &AccountDescriptor,
        token: &str,
    ) -> impl Future<Output = Result<bool, PublishError>> + Send;
}
