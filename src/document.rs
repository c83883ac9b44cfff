use url::Url;

use crate::errors::CookieStoreError;

/// The origin oracle: the document location the store validates against.
///
/// The store never inspects the wire channel to learn where it lives;
/// host bindings construct one of these from the real location.
#[derive(Debug, Clone)]
pub struct DocumentContext {
    location: Url,
}

impl DocumentContext {
    pub fn new(location: Url) -> Self {
        Self { location }
    }

    pub fn parse(href: &str) -> Result<Self, CookieStoreError> {
        Url::parse(href)
            .map(Self::new)
            .map_err(|e| CookieStoreError::invalid(format!("invalid document URL: {e}")))
    }

    pub fn hostname(&self) -> &str {
        self.location.host_str().unwrap_or_default()
    }

    pub fn href(&self) -> &str {
        self.location.as_str()
    }

    pub fn origin(&self) -> String {
        self.location.origin().ascii_serialization()
    }

    /// Resolve a selector URL against the document href and require it to
    /// denote exactly this document (href and origin both equal). Only
    /// same-document lookups are permitted through URL selectors.
    pub(crate) fn require_same_document(&self, url: &str) -> Result<(), CookieStoreError> {
        let resolved = self
            .location
            .join(url)
            .map_err(|e| CookieStoreError::invalid(format!("invalid URL selector: {e}")))?;

        if resolved.as_str() != self.href() || resolved.origin() != self.location.origin() {
            return Err(CookieStoreError::invalid(
                "URL selector must match the document URL",
            ));
        }
        Ok(())
    }
}
