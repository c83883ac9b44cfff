use std::sync::RwLock;

use anyhow::Result;

use super::{apply_set_string, jar_from_wire, jar_to_wire, WireChannel};

/// In-memory document-cookie host. Holds an ordered jar and interprets
/// written attribute strings itself, so the store can be exercised
/// without a real browser document.
#[derive(Debug, Default)]
pub struct InMemoryChannel {
    jar: RwLock<Vec<(String, String)>>,
}

impl InMemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing flat wire string.
    pub fn with_wire(wire: &str) -> Self {
        Self {
            jar: RwLock::new(jar_from_wire(wire)),
        }
    }
}

impl WireChannel for InMemoryChannel {
    fn read(&self) -> Result<String> {
        let jar = self.jar.read().unwrap();
        Ok(jar_to_wire(&jar))
    }

    fn write(&self, set_str: &str) -> Result<()> {
        let mut jar = self.jar.write().unwrap();
        apply_set_string(&mut jar, set_str);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let channel = InMemoryChannel::new();
        assert_eq!(channel.read().unwrap(), "");
    }

    #[test]
    fn write_then_read_round_trips() {
        let channel = InMemoryChannel::new();
        channel.write("foo=bar").unwrap();
        channel.write("baz=qux").unwrap();
        assert_eq!(channel.read().unwrap(), "foo=bar; baz=qux");
    }

    #[test]
    fn overwrite_keeps_first_insertion_order() {
        let channel = InMemoryChannel::with_wire("a=1; b=2");
        channel.write("a=3").unwrap();
        assert_eq!(channel.read().unwrap(), "a=3; b=2");
    }

    #[test]
    fn attributes_are_consumed_not_stored() {
        let channel = InMemoryChannel::new();
        channel.write("foo=bar; Path=/; Secure; SameSite=Strict").unwrap();
        assert_eq!(channel.read().unwrap(), "foo=bar");
    }

    #[test]
    fn zero_max_age_removes_the_cookie() {
        let channel = InMemoryChannel::with_wire("foo=bar; baz=qux");
        channel.write("foo=bar; Max-Age=0; Path=/").unwrap();
        assert_eq!(channel.read().unwrap(), "baz=qux");
    }

    #[test]
    fn negative_max_age_removes_the_cookie() {
        let channel = InMemoryChannel::with_wire("foo=bar");
        channel.write("foo=; Max-Age=-1").unwrap();
        assert_eq!(channel.read().unwrap(), "");
    }

    #[test]
    fn past_expires_removes_the_cookie() {
        let channel = InMemoryChannel::with_wire("foo=bar");
        channel
            .write("foo=bar; Expires=Thu, 01 Jan 1970 00:00:00 GMT")
            .unwrap();
        assert_eq!(channel.read().unwrap(), "");
    }

    #[test]
    fn removing_an_absent_cookie_is_harmless() {
        let channel = InMemoryChannel::with_wire("a=1");
        channel.write("ghost=; Max-Age=0").unwrap();
        assert_eq!(channel.read().unwrap(), "a=1");
    }

    #[test]
    fn write_without_equals_is_ignored() {
        let channel = InMemoryChannel::new();
        channel.write("garbage").unwrap();
        assert_eq!(channel.read().unwrap(), "");
    }
}
