#[derive(Debug, thiserror::Error)]
pub enum CookieStoreError {
    /// A name, value, attribute or selector failed validation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A handle was used without a valid owning registration.
    #[error("illegal invocation")]
    IllegalInvocation,

    /// The wire channel host failed to read or write.
    #[error(transparent)]
    Channel(#[from] anyhow::Error),
}

impl CookieStoreError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        CookieStoreError::InvalidArgument(reason.into())
    }
}
