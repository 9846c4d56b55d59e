use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::block::{Block, BlockStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AthleteStatus {
  Injured,
  Rehabbing,
  LingeringIssues,
}

impl AthleteStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      AthleteStatus::Injured => "injured",
      AthleteStatus::Rehabbing => "rehabbing",
      AthleteStatus::LingeringIssues => "lingering-issues",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Athlete {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub status: Option<AthleteStatus>,
}

/// A multi-block planning period for one athlete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
  pub id: String,
  pub phase_number: u32,
  #[serde(with = "crate::ingest::iso_date")]
  pub start_date: chrono::NaiveDate,
  #[serde(with = "crate::ingest::iso_date")]
  pub end_date: chrono::NaiveDate,
  /// Supplied by the persistence layer; never inferred from dates
  #[serde(default)]
  pub is_current: bool,
  #[serde(default)]
  pub blocks: Vec<Block>,
}

/// One roster entry: the athlete plus the phases fetched alongside it.
/// Rebuilt on every fetch, so the engine only ever borrows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterAthlete {
  #[serde(flatten)]
  pub athlete: Athlete,
  #[serde(default)]
  pub phases: Vec<Phase>,
}

impl RosterAthlete {
  pub fn name(&self) -> &str {
    &self.athlete.name
  }

  pub fn status(&self) -> Option<AthleteStatus> {
    self.athlete.status
  }

  /// Every block across every phase, in phase order
  pub fn blocks(&self) -> impl Iterator<Item = &Block> + '_ {
    self.phases.iter().flat_map(|p| p.blocks.iter())
  }

  /// Phases flagged current by the caller (normally zero or one)
  pub fn current_phases(&self) -> impl Iterator<Item = &Phase> + '_ {
    self.phases.iter().filter(|p| p.is_current)
  }

  pub fn has_block_with_status(&self, status: BlockStatus) -> bool {
    self.blocks().any(|b| b.status == status)
  }

  /// Most recent modification or submission over all blocks
  pub fn last_activity(&self) -> Option<DateTime<Utc>> {
    self.blocks().filter_map(Block::last_activity).max()
  }
}
