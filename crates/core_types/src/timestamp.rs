//! Text form of note timestamps.
//!
//! Timestamps are written as RFC 3339 in UTC with as many fractional digits as
//! needed, so a value survives a write/read cycle unchanged. Reading also
//! accepts naive ISO-8601 text without an offset (as older note files carry),
//! which is taken as local time.

use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serializer};
use thiserror::Error;

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid timestamp `{0}`")]
pub struct InvalidTimestamp(pub String);

pub fn format(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub fn parse(text: &str) -> Result<DateTime<Utc>, InvalidTimestamp> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Ok(parsed.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(text, NAIVE_FORMAT)
        .map_err(|_| InvalidTimestamp(text.to_string()))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| InvalidTimestamp(text.to_string()))
}

pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(value))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse(&text).map_err(serde::de::Error::custom)
}
