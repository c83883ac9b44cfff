//! The wire primitive port: a single read/write string property holding
//! every cookie visible to the document.

pub mod in_memory;
pub mod json;

pub use in_memory::InMemoryChannel;
pub use json::JsonWireChannel;

use anyhow::Result;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::codec::UTC_COOKIE_FORMAT;

/// The legacy primitive the store is built on. A read returns every
/// visible cookie as `name=value` pairs joined with `"; "`; a write
/// applies exactly one serialized cookie string. Persistence, expiry
/// enforcement and cross-document visibility belong to the host behind
/// the channel, not to the store.
pub trait WireChannel: Send + Sync {
    fn read(&self) -> Result<String>;
    fn write(&self, set_str: &str) -> Result<()>;
}

/// Apply one written set-string to an ordered jar the way a document
/// host does: `Max-Age <= 0` or a past `Expires` removes the entry,
/// anything else inserts or overwrites in place.
pub(crate) fn apply_set_string(jar: &mut Vec<(String, String)>, set_str: &str) {
    let mut parts = set_str.split(';');
    let Some(pair) = parts.next() else {
        return;
    };
    let Some((name, value)) = pair.split_once('=') else {
        return;
    };
    let name = name.trim().to_string();
    let value = value.trim().to_string();

    let mut remove = false;
    for part in parts {
        let part = part.trim();
        if let Some((key, attr)) = part.split_once('=') {
            match key.trim().to_ascii_lowercase().as_str() {
                "max-age" => {
                    if attr.trim().parse::<i64>().map_or(false, |n| n <= 0) {
                        remove = true;
                    }
                }
                "expires" => {
                    if is_past_utc_string(attr.trim()) {
                        remove = true;
                    }
                }
                _ => {}
            }
        }
    }

    if remove {
        log::debug!("wire channel: removing cookie {name:?}");
        jar.retain(|(n, _)| *n != name);
    } else if let Some(existing) = jar.iter_mut().find(|(n, _)| *n == name) {
        existing.1 = value;
    } else {
        jar.push((name, value));
    }
}

fn is_past_utc_string(s: &str) -> bool {
    PrimitiveDateTime::parse(s, UTC_COOKIE_FORMAT)
        .map(|dt| dt.assume_utc() <= OffsetDateTime::now_utc())
        .unwrap_or(false)
}

/// Seed a jar from an already-flat wire string, e.g. test fixtures.
pub(crate) fn jar_from_wire(wire: &str) -> Vec<(String, String)> {
    let mut jar = Vec::new();
    for pair in wire.split(';') {
        if let Some((name, value)) = pair.split_once('=') {
            jar.push((name.trim().to_string(), value.trim().to_string()));
        }
    }
    jar
}

pub(crate) fn jar_to_wire(jar: &[(String, String)]) -> String {
    jar.iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("; ")
}
