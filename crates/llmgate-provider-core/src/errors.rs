use std::error::Error;
use std::fmt;

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Failures raised before any network IO (configuration) or while decoding a
/// successful upstream body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    UnknownVendor(String),
    VendorDisabled(&'static str),
    MissingCredential { channel_id: i64 },
    InvalidConfig(String),
    Unsupported(&'static str),
    Decode(String),
    Other(String),
}

impl ProviderError {
    /// Configuration errors never reach the network and are never retried.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ProviderError::UnknownVendor(_)
                | ProviderError::VendorDisabled(_)
                | ProviderError::MissingCredential { .. }
                | ProviderError::InvalidConfig(_)
        )
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::UnknownVendor(vendor) => write!(f, "unknown vendor: {vendor}"),
            ProviderError::VendorDisabled(vendor) => write!(f, "vendor disabled: {vendor}"),
            ProviderError::MissingCredential { channel_id } => {
                write!(f, "channel {channel_id} has no credential")
            }
            ProviderError::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            ProviderError::Unsupported(what) => write!(f, "unsupported: {what}"),
            ProviderError::Decode(msg) => write!(f, "decode upstream body: {msg}"),
            ProviderError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl Error for ProviderError {}
