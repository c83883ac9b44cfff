//! The structured cookie API over the wire primitive.

pub mod options;

pub use options::{CookieInit, CookieStoreDeleteOptions, CookieStoreGetOptions};

use std::sync::Arc;

use crate::channel::WireChannel;
use crate::codec::{self, CookieAttributes, CookieRecord, SameSite};
use crate::document::DocumentContext;
use crate::errors::CookieStoreError;
use crate::event::{ChangeBus, ChangeSubscription, CookieChangeEvent, DeletedCookie};

const HOST_PREFIX: &str = "__Host-";
const SECURE_PREFIX: &str = "__Secure-";

/// The document-scoped cookie store facade.
///
/// Stateless between calls: every operation is a single transaction
/// against the wire channel, which other writers may mutate at any
/// time, so nothing is ever cached. All methods are `async` to match
/// the promise-based contract of the emulated API; none of them
/// genuinely suspends.
pub struct CookieStore {
    channel: Arc<dyn WireChannel>,
    document: DocumentContext,
    bus: ChangeBus,
}

impl CookieStore {
    /// The sanctioned factory. Fields are private; there is no other way
    /// to build a store.
    pub fn open(channel: Arc<dyn WireChannel>, document: DocumentContext) -> Self {
        Self {
            channel,
            document,
            bus: ChangeBus::default(),
        }
    }

    /// Subscribe to change notifications. Events are the documented
    /// best-effort diff around each write, not a transactional log.
    pub fn on_change(&self) -> ChangeSubscription {
        self.bus.subscribe()
    }

    /// Look up a single cookie by name or URL selector. Empty options
    /// are rejected; a URL selector must denote exactly the current
    /// document.
    pub async fn get(
        &self,
        options: impl Into<CookieStoreGetOptions>,
    ) -> Result<Option<CookieRecord>, CookieStoreError> {
        let options = options.into();
        if options.is_empty() {
            return Err(CookieStoreError::invalid(
                "CookieStoreGetOptions must not be empty",
            ));
        }
        Ok(self.get_all_matching(options).await?.into_iter().next())
    }

    /// Look up every matching cookie. With no selector, returns the
    /// whole parsed snapshot in wire order.
    pub async fn get_all(
        &self,
        options: impl Into<CookieStoreGetOptions>,
    ) -> Result<Vec<CookieRecord>, CookieStoreError> {
        self.get_all_matching(options.into()).await
    }

    async fn get_all_matching(
        &self,
        options: CookieStoreGetOptions,
    ) -> Result<Vec<CookieRecord>, CookieStoreError> {
        let wire = self.channel.read()?;
        let mut cookies = codec::parse(&wire);

        if let Some(url) = &options.url {
            // Only the current document may be addressed by URL, and the
            // single-document view reduces to the first record.
            self.document.require_same_document(url)?;
            cookies.truncate(1);
            return Ok(cookies);
        }

        if let Some(name) = &options.name {
            cookies.retain(|c| c.name == *name);
        }
        Ok(cookies)
    }

    /// Write one cookie. Accepts the `(name, value)` shorthand or a
    /// structured [`CookieInit`]; all validation happens before the
    /// single wire write.
    pub async fn set(&self, init: impl Into<CookieInit>) -> Result<(), CookieStoreError> {
        let init = init.into();

        let mut path = init.path.clone().unwrap_or_else(|| "/".to_string());
        if !path.starts_with('/') {
            return Err(CookieStoreError::invalid(
                "cookie path must start with \"/\"",
            ));
        }
        // Normalize a non-root trailing slash away.
        if path.len() > 1 && path.ends_with('/') {
            path.truncate(path.len() - 1);
        }

        if let Some(domain) = &init.domain {
            if domain.starts_with('.') {
                return Err(CookieStoreError::invalid(
                    "cookie domain cannot start with \".\"",
                ));
            }
            // No parent-domain cookies: the domain must be this host.
            if domain != self.document.hostname() {
                return Err(CookieStoreError::invalid(
                    "cookie domain must match the document hostname",
                ));
            }
        }

        if init.name.is_empty() && init.value.contains('=') {
            // An empty name would make the value ambiguous with a name
            // in the wire format.
            return Err(CookieStoreError::invalid(
                "cookie value cannot contain \"=\" when the name is empty",
            ));
        }

        let mut secure = init.secure;
        let mut same_site = init.same_site.unwrap_or(SameSite::Strict);

        if init.name.starts_with(HOST_PREFIX) {
            if init.domain.is_some() {
                return Err(CookieStoreError::invalid(
                    "__Host- cookies cannot specify a domain",
                ));
            }
            if path != "/" {
                return Err(CookieStoreError::invalid(
                    "__Host- cookies must use \"/\" as their path",
                ));
            }
            secure = true;
        }
        if init.name.starts_with(SECURE_PREFIX) {
            same_site = SameSite::Lax;
        }

        let attrs = CookieAttributes {
            max_age: None,
            domain: init.domain,
            path: Some(path),
            expires: init.expires,
            http_only: init.http_only,
            secure,
            same_site: Some(same_site),
        };
        self.write_cookie(&init.name, &init.value, &attrs).await
    }

    /// Remove one cookie by writing it back with an immediate expiry.
    /// Deleting a name absent from the wire is a silent no-op.
    pub async fn delete(
        &self,
        options: impl Into<CookieStoreDeleteOptions>,
    ) -> Result<(), CookieStoreError> {
        let options = options.into();

        let path = match options.path {
            Some(p) if p.is_empty() => "/".to_string(),
            Some(p) => {
                if !p.starts_with('/') {
                    return Err(CookieStoreError::invalid(
                        "cookie path must start with \"/\"",
                    ));
                }
                p
            }
            None => "/".to_string(),
        };

        if let Some(domain) = &options.domain {
            if domain != self.document.hostname() {
                return Err(CookieStoreError::invalid(
                    "cookie domain must match the document hostname",
                ));
            }
        }

        let Some(existing) = self.snapshot_of(&options.name)? else {
            return Ok(());
        };

        let attrs = CookieAttributes {
            max_age: Some(0.0),
            domain: options.domain,
            path: Some(path),
            ..Default::default()
        };
        self.write_cookie(&options.name, &existing.value, &attrs)
            .await
    }

    /// The only mutating path: one codec serialization, one wire write,
    /// and — when anyone listens — the pre/post diff for the affected
    /// name. The diff reads twice around a write with no isolation from
    /// the channel, so it is inherently approximate.
    async fn write_cookie(
        &self,
        name: &str,
        value: &str,
        attrs: &CookieAttributes,
    ) -> Result<(), CookieStoreError> {
        let set_str = codec::serialize(name, value, attrs)?;
        log::debug!("cookie store: writing {name:?}");

        if !self.bus.has_subscribers() {
            self.channel.write(&set_str)?;
            return Ok(());
        }

        let before = self.snapshot_of(name)?;
        self.channel.write(&set_str)?;
        let after = self.snapshot_of(name)?;

        let mut event = CookieChangeEvent::default();
        match after {
            Some(cookie) => event.changed.push(cookie),
            None => {
                if before.is_some() {
                    event.deleted.push(DeletedCookie {
                        name: name.to_string(),
                    });
                }
            }
        }
        if !event.changed.is_empty() || !event.deleted.is_empty() {
            self.bus.publish(event);
        }
        Ok(())
    }

    fn snapshot_of(&self, name: &str) -> Result<Option<CookieRecord>, CookieStoreError> {
        let wire = self.channel.read()?;
        Ok(codec::parse(&wire).into_iter().find(|c| c.name == name))
    }
}
