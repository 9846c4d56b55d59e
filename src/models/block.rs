use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// ---------------------------------------------------------------------------
/// Season
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Season {
  #[serde(rename = "Pre-Season")]
  PreSeason,
  #[serde(rename = "In-Season")]
  InSeason,
  #[serde(rename = "Off-Season")]
  OffSeason,
}

impl Season {
  pub fn as_str(&self) -> &'static str {
    match self {
      Season::PreSeason => "Pre-Season",
      Season::InSeason => "In-Season",
      Season::OffSeason => "Off-Season",
    }
  }
}

/// ---------------------------------------------------------------------------
/// Block Status: draft -> pending-signoff -> active -> complete
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockStatus {
  #[default]
  Draft,
  PendingSignoff,
  Active,
  Complete,
}

impl std::fmt::Display for BlockStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Draft => write!(f, "draft"),
      Self::PendingSignoff => write!(f, "pending-signoff"),
      Self::Active => write!(f, "active"),
      Self::Complete => write!(f, "complete"),
    }
  }
}

impl std::str::FromStr for BlockStatus {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "draft" => Ok(Self::Draft),
      "pending-signoff" => Ok(Self::PendingSignoff),
      "active" => Ok(Self::Active),
      "complete" => Ok(Self::Complete),
      _ => Err(format!("Unknown block status: {}", s)),
    }
  }
}

impl BlockStatus {
  /// Only blocks that have not been signed off may be deleted
  pub fn can_delete(&self) -> bool {
    matches!(self, Self::Draft | Self::PendingSignoff)
  }

  /// The status this one moves to in the normal lifecycle
  pub fn next(&self) -> Option<BlockStatus> {
    match self {
      Self::Draft => Some(Self::PendingSignoff),
      Self::PendingSignoff => Some(Self::Active),
      Self::Active => Some(Self::Complete),
      Self::Complete => None,
    }
  }

  pub fn can_transition_to(&self, target: BlockStatus) -> bool {
    self.next() == Some(target)
  }
}

/// 1-indexed position inside a block's programme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentDay {
  pub week: u32,
  pub day: u32,
}

/// ---------------------------------------------------------------------------
/// Block: a single 1-4 week training cycle within a phase
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
  pub id: String,
  pub phase_id: String,
  pub block_number: u32,
  pub name: String,
  pub season: Season,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sub_season: Option<String>,
  #[serde(with = "crate::ingest::iso_date")]
  pub start_date: NaiveDate,
  #[serde(with = "crate::ingest::iso_date")]
  pub end_date: NaiveDate,
  /// Programmed length in weeks
  pub duration: u32,
  #[serde(default)]
  pub status: BlockStatus,

  // Day counts are signed so malformed upstream values survive ingestion
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub days_available: Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub days_complete: Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub current_day: Option<CurrentDay>,

  #[serde(default, with = "crate::ingest::iso_date_opt", skip_serializing_if = "Option::is_none")]
  pub next_block_due: Option<NaiveDate>,
  #[serde(default, with = "crate::ingest::timestamp_opt", skip_serializing_if = "Option::is_none")]
  pub last_modification: Option<DateTime<Utc>>,
  #[serde(default, with = "crate::ingest::timestamp_opt", skip_serializing_if = "Option::is_none")]
  pub last_submission: Option<DateTime<Utc>>,
}

impl Block {
  pub fn is_active(&self) -> bool {
    self.status == BlockStatus::Active
  }

  pub fn has_valid_range(&self) -> bool {
    self.end_date >= self.start_date
  }

  /// Whether the block's date range includes `date`
  pub fn covers(&self, date: NaiveDate) -> bool {
    self.start_date <= date && date <= self.end_date
  }

  /// Latest of last modification and last submission
  pub fn last_activity(&self) -> Option<DateTime<Utc>> {
    self.last_modification.max(self.last_submission)
  }

  /// Calendar date addressed by `current_day` (week 1 day 1 = start date)
  pub fn current_day_date(&self) -> Option<NaiveDate> {
    let cd = self.current_day?;
    if cd.week == 0 || cd.day == 0 {
      return None;
    }
    let offset = (cd.week as i64 - 1) * 7 + (cd.day as i64 - 1);
    self.start_date.checked_add_signed(Duration::days(offset))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{block, date};
  use chrono::TimeZone;

  #[test]
  fn test_missing_status_defaults_to_draft() {
    assert_eq!(BlockStatus::default(), BlockStatus::Draft);

    let raw = r#"{
      "id": "b1", "phaseId": "p1", "blockNumber": 1, "name": "Base", "season": "Pre-Season",
      "startDate": "2024-03-04", "endDate": "2024-03-31", "duration": 4
    }"#;
    let parsed: Block = serde_json::from_str(raw).unwrap();
    assert_eq!(parsed.status, BlockStatus::Draft);
  }

  #[test]
  fn test_lifecycle_order() {
    assert_eq!(BlockStatus::Draft.next(), Some(BlockStatus::PendingSignoff));
    assert_eq!(BlockStatus::PendingSignoff.next(), Some(BlockStatus::Active));
    assert_eq!(BlockStatus::Active.next(), Some(BlockStatus::Complete));
    assert_eq!(BlockStatus::Complete.next(), None);

    assert!(BlockStatus::PendingSignoff.can_transition_to(BlockStatus::Active));
    assert!(!BlockStatus::Draft.can_transition_to(BlockStatus::Active));
  }

  #[test]
  fn test_only_unsigned_blocks_deletable() {
    assert!(BlockStatus::Draft.can_delete());
    assert!(BlockStatus::PendingSignoff.can_delete());
    assert!(!BlockStatus::Active.can_delete());
    assert!(!BlockStatus::Complete.can_delete());
  }

  #[test]
  fn test_status_string_roundtrip() {
    for s in ["draft", "pending-signoff", "active", "complete"] {
      let status: BlockStatus = s.parse().unwrap();
      assert_eq!(status.to_string(), s);
    }
    assert!("signed".parse::<BlockStatus>().is_err());
  }

  #[test]
  fn test_last_activity_takes_latest() {
    let mut b = block("b1", 1, date(2024, 3, 4), date(2024, 3, 31));
    assert_eq!(b.last_activity(), None);

    let modified = Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();
    let submitted = Utc.with_ymd_and_hms(2024, 3, 12, 8, 0, 0).unwrap();
    b.last_modification = Some(modified);
    assert_eq!(b.last_activity(), Some(modified));

    b.last_submission = Some(submitted);
    assert_eq!(b.last_activity(), Some(submitted));
  }

  #[test]
  fn test_current_day_date() {
    let mut b = block("b1", 1, date(2024, 3, 4), date(2024, 3, 31));
    b.current_day = Some(CurrentDay { week: 1, day: 1 });
    assert_eq!(b.current_day_date(), Some(date(2024, 3, 4)));

    b.current_day = Some(CurrentDay { week: 2, day: 3 });
    assert_eq!(b.current_day_date(), Some(date(2024, 3, 13)));

    b.current_day = Some(CurrentDay { week: 0, day: 3 });
    assert_eq!(b.current_day_date(), None);
  }

  #[test]
  fn test_covers_is_inclusive() {
    let b = block("b1", 1, date(2024, 3, 4), date(2024, 3, 10));
    assert!(b.covers(date(2024, 3, 4)));
    assert!(b.covers(date(2024, 3, 10)));
    assert!(!b.covers(date(2024, 3, 11)));
    assert!(!b.covers(date(2024, 3, 3)));
  }
}
