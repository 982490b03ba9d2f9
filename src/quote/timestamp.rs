//! Fixed-width ISO-8601 rendering for quote timestamps.
//!
//! Every timestamp is stored as `YYYY-MM-DDTHH:MM:SS.ffffffZ`. Because the width never
//! varies, comparing the rendered strings orders records chronologically, which the
//! file store relies on when listing quotes.

use serde::{Deserialize, Deserializer, Serializer, de::Error as _, ser::Error as _};
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

const FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z");

/// The current UTC time, truncated to whole microseconds so that it survives a
/// round-trip through its textual form unchanged.
pub fn now() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_microsecond(now.microsecond()).unwrap_or(now)
}

/// Renders `ts` in UTC as fixed-width text.
pub fn format(ts: &OffsetDateTime) -> Result<String, time::error::Format> {
    ts.to_offset(UtcOffset::UTC).format(FORMAT)
}

/// Parses the fixed-width form, or any RFC 3339 timestamp.
pub fn parse(s: &str) -> Result<OffsetDateTime, time::error::Parse> {
    match PrimitiveDateTime::parse(s, FORMAT) {
        Ok(ts) => Ok(ts.assume_utc()),
        Err(_) => OffsetDateTime::parse(s, &Rfc3339).map(|ts| ts.to_offset(UtcOffset::UTC)),
    }
}

pub(crate) fn serialize<S>(ts: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let text = format(ts).map_err(S::Error::custom)?;
    serializer.serialize_str(&text)
}

pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse(&text).map_err(D::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_format_is_fixed_width() {
        let whole = datetime!(2024-03-01 09:05:00 UTC);
        let fractional = datetime!(2024-03-01 09:05:00.5 UTC);

        assert_eq!(format(&whole).unwrap(), "2024-03-01T09:05:00.000000Z");
        assert_eq!(format(&fractional).unwrap(), "2024-03-01T09:05:00.500000Z");
    }

    #[test]
    fn test_format_converts_to_utc() {
        let shifted = datetime!(2024-03-01 11:05:00 +2);
        assert_eq!(format(&shifted).unwrap(), "2024-03-01T09:05:00.000000Z");
    }

    #[test]
    fn test_parse_accepts_both_forms() {
        let expected = datetime!(2024-03-01 09:05:00.25 UTC);
        assert_eq!(parse("2024-03-01T09:05:00.250000Z").unwrap(), expected);
        assert_eq!(parse("2024-03-01T10:05:00.25+01:00").unwrap(), expected);
        assert!(parse("yesterday").is_err());
    }

    #[test]
    fn test_now_survives_text_round_trip() {
        let ts = now();
        assert_eq!(parse(&format(&ts).unwrap()).unwrap(), ts);
    }

    #[test]
    fn test_lexical_order_matches_chronological_order() {
        let earlier = datetime!(2024-03-01 09:05:00.999999 UTC);
        let later = datetime!(2024-03-01 09:05:10 UTC);
        assert!(format(&earlier).unwrap() < format(&later).unwrap());
    }
}
