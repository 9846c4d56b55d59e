//! Record ingestion at the engine boundary
//!
//! Upstream collaborators hand over athletes, phases and blocks as JSON with
//! ISO-8601 date or date-time strings. Dates are parsed exactly once, here,
//! and the rest of the engine only sees `NaiveDate` / `DateTime<Utc>`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::models::RosterAthlete;

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum IngestError {
  #[error("Invalid roster JSON: {0}")]
  Json(String),

  #[error("Invalid date: {0}")]
  InvalidDate(String),

  #[error("Unexpected roster shape: {0}")]
  Shape(String),
}

impl From<serde_json::Error> for IngestError {
  fn from(e: serde_json::Error) -> Self {
    IngestError::Json(e.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Parsing
/// ---------------------------------------------------------------------------

/// Parse an ISO-8601 date or date-time into a calendar date.
/// Date-times with an offset are normalised to their UTC date.
pub fn parse_date(s: &str) -> Result<NaiveDate, IngestError> {
  let s = s.trim();
  if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
    return Ok(d);
  }
  parse_timestamp(s).map(|ts| ts.date_naive())
}

/// Parse an RFC 3339 timestamp, a naive date-time (taken as UTC) or a bare
/// date (midnight UTC).
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, IngestError> {
  let s = s.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Ok(dt.with_timezone(&Utc));
  }
  if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
    return Ok(naive.and_utc());
  }
  if let Some(midnight) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
  {
    return Ok(midnight.and_utc());
  }
  Err(IngestError::InvalidDate(s.to_string()))
}

/// Parse a roster payload: either a bare array of athletes or an object with
/// an `athletes` array.
pub fn parse_roster(json: &str) -> Result<Vec<RosterAthlete>, IngestError> {
  let value: serde_json::Value = serde_json::from_str(json)?;
  let athletes = match value {
    serde_json::Value::Array(_) => value,
    serde_json::Value::Object(mut map) => map
      .remove("athletes")
      .ok_or_else(|| IngestError::Shape("missing `athletes` field".to_string()))?,
    other => {
      return Err(IngestError::Shape(format!(
        "expected array or object, got {}",
        other
      )))
    }
  };

  let roster: Vec<RosterAthlete> = serde_json::from_value(athletes)?;
  tracing::debug!(athletes = roster.len(), "Parsed roster");
  Ok(roster)
}

/// ---------------------------------------------------------------------------
/// Serde adapters
/// ---------------------------------------------------------------------------

pub mod iso_date {
  use chrono::NaiveDate;
  use serde::{de, Deserialize, Deserializer, Serializer};

  pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&date.format("%Y-%m-%d").to_string())
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(d)?;
    super::parse_date(&raw).map_err(de::Error::custom)
  }
}

pub mod iso_date_opt {
  use chrono::NaiveDate;
  use serde::{de, Deserialize, Deserializer, Serializer};

  pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
    match date {
      Some(d) => s.serialize_some(&d.format("%Y-%m-%d").to_string()),
      None => s.serialize_none(),
    }
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
    match Option::<String>::deserialize(d)? {
      Some(raw) if !raw.trim().is_empty() => super::parse_date(&raw).map(Some).map_err(de::Error::custom),
      _ => Ok(None),
    }
  }
}

pub mod timestamp_opt {
  use chrono::{DateTime, Utc};
  use serde::{de, Deserialize, Deserializer, Serializer};

  pub fn serialize<S: Serializer>(ts: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
    match ts {
      Some(t) => s.serialize_some(&t.to_rfc3339()),
      None => s.serialize_none(),
    }
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
    match Option::<String>::deserialize(d)? {
      Some(raw) if !raw.trim().is_empty() => super::parse_timestamp(&raw).map(Some).map_err(de::Error::custom),
      _ => Ok(None),
    }
  }
}
