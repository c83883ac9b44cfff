//! Argument types for the dual calling conventions of the store
//! methods. Every method accepts either a bare name (or name/value
//! pair) or a structured record; normalization to the structured form
//! happens once at method entry, before any validation.

use crate::codec::{Expires, SameSite};

/// Selector for `get` / `get_all`.
#[derive(Debug, Clone, Default)]
pub struct CookieStoreGetOptions {
    pub name: Option<String>,
    pub url: Option<String>,
}

impl CookieStoreGetOptions {
    pub(crate) fn is_empty(&self) -> bool {
        self.name.is_none() && self.url.is_none()
    }
}

impl From<&str> for CookieStoreGetOptions {
    fn from(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            url: None,
        }
    }
}

impl From<String> for CookieStoreGetOptions {
    fn from(name: String) -> Self {
        Self {
            name: Some(name),
            url: None,
        }
    }
}

/// Structured init record for `set`.
#[derive(Debug, Clone, Default)]
pub struct CookieInit {
    pub name: String,
    pub value: String,
    pub domain: Option<String>,
    pub path: Option<String>,
    pub expires: Option<Expires>,
    pub secure: bool,
    pub same_site: Option<SameSite>,
    pub http_only: bool,
}

// The (name, value) shorthand convention.
impl From<(&str, &str)> for CookieInit {
    fn from((name, value): (&str, &str)) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            ..Default::default()
        }
    }
}

impl From<(String, String)> for CookieInit {
    fn from((name, value): (String, String)) -> Self {
        Self {
            name,
            value,
            ..Default::default()
        }
    }
}

/// Options for `delete`.
#[derive(Debug, Clone, Default)]
pub struct CookieStoreDeleteOptions {
    pub name: String,
    pub domain: Option<String>,
    pub path: Option<String>,
}

impl From<&str> for CookieStoreDeleteOptions {
    fn from(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

impl From<String> for CookieStoreDeleteOptions {
    fn from(name: String) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }
}
