//! Wire-string codec: [`parse`] and [`serialize`] between the flat
//! semicolon-joined cookie string and structured records.

use std::str::FromStr;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::errors::CookieStoreError;

/// A single cookie as recoverable from a read of the wire primitive.
///
/// Name and value are the only fields that survive a write; every other
/// attribute is consumed by the host and cannot be read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieRecord {
    pub name: String,
    pub value: String,
}

/// Write-only attribute set consumed by [`serialize`].
#[derive(Debug, Clone, Default)]
pub struct CookieAttributes {
    pub max_age: Option<f64>,
    pub domain: Option<String>,
    pub path: Option<String>,
    pub expires: Option<Expires>,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: Option<SameSite>,
}

/// Cross-origin inclusion policy for a cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl FromStr for SameSite {
    type Err = CookieStoreError;

    // Input is case-insensitive; the serialized form is canonical.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(SameSite::Strict),
            "lax" => Ok(SameSite::Lax),
            "none" => Ok(SameSite::None),
            other => Err(CookieStoreError::invalid(format!(
                "invalid SameSite value {other:?}"
            ))),
        }
    }
}

impl std::fmt::Display for SameSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SameSite::Strict => write!(f, "Strict"),
            SameSite::Lax => write!(f, "Lax"),
            SameSite::None => write!(f, "None"),
        }
    }
}

/// Expiry moment for the `Expires` attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expires {
    DateTime(OffsetDateTime),
    EpochMillis(i64),
}

/// The UTC string form hosts expect for `Expires`, e.g.
/// `Thu, 01 Jan 1970 00:00:00 GMT`.
pub(crate) const UTC_COOKIE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
);

impl Expires {
    /// The epoch itself, the conventional "expire immediately" moment.
    pub fn epoch() -> Self {
        Expires::EpochMillis(0)
    }

    fn to_datetime(self) -> Result<OffsetDateTime, CookieStoreError> {
        match self {
            Expires::DateTime(dt) => Ok(dt),
            Expires::EpochMillis(ms) => {
                OffsetDateTime::from_unix_timestamp_nanos(ms as i128 * 1_000_000).map_err(|_| {
                    CookieStoreError::invalid("expires is outside the representable date range")
                })
            }
        }
    }

    pub fn to_utc_string(self) -> Result<String, CookieStoreError> {
        let dt = self.to_datetime()?.to_offset(UtcOffset::UTC);
        dt.format(UTC_COOKIE_FORMAT)
            .map_err(|_| CookieStoreError::invalid("expires cannot be rendered as a UTC string"))
    }
}

impl From<OffsetDateTime> for Expires {
    fn from(dt: OffsetDateTime) -> Self {
        Expires::DateTime(dt)
    }
}

impl From<i64> for Expires {
    fn from(millis: i64) -> Self {
        Expires::EpochMillis(millis)
    }
}

// field-content per RFC 7230 sec 3.2: VCHAR / obs-text, plus SP and HTAB.
pub(crate) fn is_field_content(s: &str) -> bool {
    s.chars()
        .all(|c| matches!(c, '\u{09}' | '\u{20}'..='\u{7e}' | '\u{80}'..='\u{ff}'))
}

/// Characters the default value encoder leaves untouched. Matches the
/// unreserved set of `encodeURIComponent`.
const VALUE_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn default_encode(raw: &str) -> String {
    utf8_percent_encode(raw, VALUE_ENCODE_SET).to_string()
}

/// `None` signals a decode failure; [`parse_with`] then falls back to the
/// raw value.
pub fn default_decode(raw: &str) -> Option<String> {
    percent_decode_str(raw)
        .decode_utf8()
        .ok()
        .map(|cow| cow.into_owned())
}

/// Parse the wire string with the default percent-decoder.
pub fn parse(wire: &str) -> Vec<CookieRecord> {
    parse_with(wire, default_decode)
}

/// Parse a flat `name=value; name2=value2` wire string.
///
/// Segments without an `=` are noise from other writers and are skipped.
/// A value wrapped in one pair of double quotes has the quotes stripped;
/// inner content is not un-escaped. A decode failure degrades to the raw
/// value instead of failing the whole read. Only the first occurrence of
/// a name is kept, in wire order.
pub fn parse_with<D>(wire: &str, decode: D) -> Vec<CookieRecord>
where
    D: Fn(&str) -> Option<String>,
{
    let mut records: Vec<CookieRecord> = Vec::new();

    for segment in wire.split(';') {
        let Some(eq) = segment.find('=') else {
            continue;
        };
        let name = segment[..eq].trim();
        let mut value = segment[eq + 1..].trim();

        if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
            value = &value[1..value.len() - 1];
        }

        if records.iter().any(|c| c.name == name) {
            continue;
        }

        records.push(CookieRecord {
            name: name.to_string(),
            value: decode(value).unwrap_or_else(|| value.to_string()),
        });
    }

    records
}

/// Serialize with the default percent-encoder.
pub fn serialize(
    name: &str,
    value: &str,
    attrs: &CookieAttributes,
) -> Result<String, CookieStoreError> {
    serialize_with(name, value, attrs, default_encode)
}

/// Serialize a name/value pair plus attributes into one set-cookie style
/// wire string.
///
/// The attribute order (`Max-Age`, `Domain`, `Path`, `Expires`,
/// `HttpOnly`, `Secure`, `SameSite`) is contractual; hosts and tests
/// match on the exact output.
pub fn serialize_with<E>(
    name: &str,
    value: &str,
    attrs: &CookieAttributes,
    encode: E,
) -> Result<String, CookieStoreError>
where
    E: Fn(&str) -> String,
{
    if !is_field_content(name) {
        return Err(CookieStoreError::invalid("cookie name is invalid"));
    }

    let encoded = encode(value);
    if !encoded.is_empty() && !is_field_content(&encoded) {
        return Err(CookieStoreError::invalid("cookie value is invalid"));
    }

    let mut out = format!("{name}={encoded}");

    if let Some(max_age) = attrs.max_age {
        if !max_age.is_finite() {
            return Err(CookieStoreError::invalid("Max-Age must be a finite number"));
        }
        out.push_str(&format!("; Max-Age={}", max_age.floor() as i64));
    }

    if let Some(domain) = attrs.domain.as_deref().filter(|d| !d.is_empty()) {
        if !is_field_content(domain) {
            return Err(CookieStoreError::invalid("cookie domain is invalid"));
        }
        out.push_str(&format!("; Domain={domain}"));
    }

    if let Some(path) = attrs.path.as_deref().filter(|p| !p.is_empty()) {
        if !is_field_content(path) {
            return Err(CookieStoreError::invalid("cookie path is invalid"));
        }
        out.push_str(&format!("; Path={path}"));
    }

    if let Some(expires) = attrs.expires {
        out.push_str(&format!("; Expires={}", expires.to_utc_string()?));
    }

    if attrs.http_only {
        out.push_str("; HttpOnly");
    }

    if attrs.secure {
        out.push_str("; Secure");
    }

    if let Some(same_site) = attrs.same_site {
        out.push_str(&format!("; SameSite={same_site}"));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn record(name: &str, value: &str) -> CookieRecord {
        CookieRecord {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn parse_splits_pairs_in_wire_order() {
        let records = parse("foo=bar; baz=qux");
        assert_eq!(records, vec![record("foo", "bar"), record("baz", "qux")]);
    }

    #[test]
    fn parse_first_occurrence_wins() {
        let records = parse("a=1; b=2; a=3");
        assert_eq!(records, vec![record("a", "1"), record("b", "2")]);
    }

    #[test]
    fn parse_skips_segments_without_equals() {
        let records = parse("noise; foo=bar; ;");
        assert_eq!(records, vec![record("foo", "bar")]);
    }

    #[test]
    fn parse_empty_wire_yields_nothing() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn parse_trims_whitespace_around_name_and_value() {
        let records = parse(" foo = bar ;baz=qux");
        assert_eq!(records, vec![record("foo", "bar"), record("baz", "qux")]);
    }

    #[test]
    fn parse_strips_one_pair_of_wrapping_quotes() {
        let records = parse(r#"foo="bar""#);
        assert_eq!(records, vec![record("foo", "bar")]);
    }

    #[test]
    fn parse_decodes_percent_encoding() {
        let records = parse("foo=bar%20baz");
        assert_eq!(records, vec![record("foo", "bar baz")]);
    }

    #[test]
    fn parse_falls_back_to_raw_value_on_decode_failure() {
        // Truncated multi-byte sequence; `decodeURIComponent` throws on it.
        let records = parse("foo=%E0%A4%A");
        assert_eq!(records, vec![record("foo", "%E0%A4%A")]);
    }

    #[test]
    fn parse_with_custom_decoder() {
        let records = parse_with("foo=bar", |raw| Some(raw.to_uppercase()));
        assert_eq!(records, vec![record("foo", "BAR")]);
    }

    #[test]
    fn serialize_bare_pair() {
        let s = serialize("foo", "bar", &CookieAttributes::default()).unwrap();
        assert_eq!(s, "foo=bar");
    }

    #[test]
    fn serialize_encodes_value() {
        let s = serialize("foo", "bar baz", &CookieAttributes::default()).unwrap();
        assert_eq!(s, "foo=bar%20baz");
    }

    #[test]
    fn serialize_rejects_control_characters_in_name() {
        let err = serialize("foo\n", "bar", &CookieAttributes::default()).unwrap_err();
        assert!(matches!(err, CookieStoreError::InvalidArgument(_)));
    }

    #[test]
    fn serialize_allows_high_latin1_in_name() {
        assert!(serialize("f\u{e9}", "bar", &CookieAttributes::default()).is_ok());
    }

    #[test]
    fn serialize_attribute_order_is_fixed() {
        let attrs = CookieAttributes {
            max_age: Some(100.0),
            domain: Some("example.com".to_string()),
            path: Some("/".to_string()),
            expires: Some(Expires::epoch()),
            http_only: true,
            secure: true,
            same_site: Some(SameSite::Strict),
        };
        let s = serialize("foo", "bar", &attrs).unwrap();
        assert_eq!(
            s,
            "foo=bar; Max-Age=100; Domain=example.com; Path=/; \
             Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; Secure; SameSite=Strict"
        );
    }

    #[test]
    fn serialize_floors_max_age() {
        let attrs = CookieAttributes {
            max_age: Some(100.9),
            ..Default::default()
        };
        assert_eq!(serialize("foo", "bar", &attrs).unwrap(), "foo=bar; Max-Age=100");
    }

    #[test]
    fn serialize_rejects_nan_max_age() {
        let attrs = CookieAttributes {
            max_age: Some(f64::NAN),
            ..Default::default()
        };
        assert!(serialize("foo", "bar", &attrs).is_err());
    }

    #[test]
    fn serialize_expires_from_datetime() {
        let attrs = CookieAttributes {
            expires: Some(datetime!(2024-02-29 12:30:45 UTC).into()),
            ..Default::default()
        };
        assert_eq!(
            serialize("foo", "bar", &attrs).unwrap(),
            "foo=bar; Expires=Thu, 29 Feb 2024 12:30:45 GMT"
        );
    }

    #[test]
    fn serialize_rejects_out_of_range_epoch_millis() {
        let attrs = CookieAttributes {
            expires: Some(Expires::EpochMillis(i64::MAX)),
            ..Default::default()
        };
        assert!(serialize("foo", "bar", &attrs).is_err());
    }

    #[test]
    fn same_site_parses_case_insensitively() {
        assert_eq!("LAX".parse::<SameSite>().unwrap(), SameSite::Lax);
        assert_eq!("Strict".parse::<SameSite>().unwrap(), SameSite::Strict);
        assert_eq!("none".parse::<SameSite>().unwrap(), SameSite::None);
        assert!("evil".parse::<SameSite>().is_err());
    }

    #[test]
    fn round_trip_preserves_field_content_values() {
        let original = "a value; with = separators & symbols";
        let wire = serialize("token", original, &CookieAttributes::default()).unwrap();
        let records = parse(&wire);
        assert_eq!(records, vec![record("token", original)]);
    }
}
