use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::athlete::AthleteStatus;
use super::block::{BlockStatus, Season};

/// Classified distance to the nearest due date
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Urgency {
  #[serde(rename = "overdue")]
  Overdue,
  #[serde(rename = "today")]
  Today,
  #[serde(rename = "thisWeek")]
  ThisWeek,
  #[serde(rename = "later")]
  Later,
}

impl Urgency {
  /// Classify `d = due - today` in whole days
  pub fn from_days_until(d: i64) -> Self {
    match d {
      d if d < 0 => Urgency::Overdue,
      0 => Urgency::Today,
      1..=7 => Urgency::ThisWeek,
      _ => Urgency::Later,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Urgency::Overdue => "overdue",
      Urgency::Today => "today",
      Urgency::ThisWeek => "thisWeek",
      Urgency::Later => "later",
    }
  }
}

/// Values a coach can filter the roster's urgency column by
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UrgencyClass {
  #[serde(rename = "overdue")]
  Overdue,
  #[serde(rename = "today")]
  Today,
  #[serde(rename = "thisWeek")]
  ThisWeek,
  #[serde(rename = "later")]
  Later,
  /// Athlete-level: no block is currently active
  #[serde(rename = "no-active-block")]
  NoActiveBlock,
}

impl UrgencyClass {
  /// The due-date urgency this class accepts, `None` for `NoActiveBlock`
  pub fn as_urgency(&self) -> Option<Urgency> {
    match self {
      UrgencyClass::Overdue => Some(Urgency::Overdue),
      UrgencyClass::Today => Some(Urgency::Today),
      UrgencyClass::ThisWeek => Some(Urgency::ThisWeek),
      UrgencyClass::Later => Some(Urgency::Later),
      UrgencyClass::NoActiveBlock => None,
    }
  }
}

impl From<Urgency> for UrgencyClass {
  fn from(u: Urgency) -> Self {
    match u {
      Urgency::Overdue => UrgencyClass::Overdue,
      Urgency::Today => UrgencyClass::Today,
      Urgency::ThisWeek => UrgencyClass::ThisWeek,
      Urgency::Later => UrgencyClass::Later,
    }
  }
}

/// Inclusive date bounds; an open end is unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateBounds {
  #[serde(default, with = "crate::ingest::iso_date_opt")]
  pub from: Option<NaiveDate>,
  #[serde(default, with = "crate::ingest::iso_date_opt")]
  pub to: Option<NaiveDate>,
}

impl DateBounds {
  pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
    Self { from, to }
  }

  pub fn is_empty(&self) -> bool {
    self.from.is_none() && self.to.is_none()
  }

  pub fn contains(&self, date: NaiveDate) -> bool {
    self.from.is_none_or(|f| date >= f) && self.to.is_none_or(|t| date <= t)
  }
}

/// ---------------------------------------------------------------------------
/// Filter State: accepted values per category, empty = unconstrained
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
  /// `None` (JSON `null`) accepts athletes with no status
  pub athlete_statuses: BTreeSet<Option<AthleteStatus>>,
  pub block_statuses: BTreeSet<BlockStatus>,
  pub seasons: BTreeSet<Season>,
  pub sub_seasons: BTreeSet<String>,
  pub urgencies: BTreeSet<UrgencyClass>,
  pub next_block_due: DateBounds,
  pub last_activity: DateBounds,
}

impl FilterState {
  pub fn is_empty(&self) -> bool {
    self.active_category_count() == 0
  }

  /// Number of categories that currently constrain the roster
  pub fn active_category_count(&self) -> usize {
    [
      !self.athlete_statuses.is_empty(),
      !self.block_statuses.is_empty(),
      !self.seasons.is_empty(),
      !self.sub_seasons.is_empty(),
      !self.urgencies.is_empty(),
      !self.next_block_due.is_empty(),
      !self.last_activity.is_empty(),
    ]
    .iter()
    .filter(|active| **active)
    .count()
  }

  /// Due-date urgencies accepted by the urgency category
  pub fn positive_urgencies(&self) -> impl Iterator<Item = Urgency> + '_ {
    self.urgencies.iter().filter_map(UrgencyClass::as_urgency)
  }

  /// True when any category evaluated against individual blocks is active
  pub fn has_block_scoped_constraint(&self) -> bool {
    !self.block_statuses.is_empty()
      || !self.seasons.is_empty()
      || !self.sub_seasons.is_empty()
      || self.positive_urgencies().next().is_some()
      || !self.next_block_due.is_empty()
      || !self.last_activity.is_empty()
  }
}

/// ---------------------------------------------------------------------------
/// Sort State
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
  #[default]
  AthleteName,
  NextActionDate,
  LastActivity,
  PhaseProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
  #[default]
  Asc,
  Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortState {
  pub sort_field: SortField,
  pub direction: SortDirection,
}

impl SortState {
  pub fn new(sort_field: SortField, direction: SortDirection) -> Self {
    Self { sort_field, direction }
  }
}
