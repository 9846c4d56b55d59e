//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Date and timestamp shorthands
//! - Block / phase / athlete factories with sensible defaults

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::models::{Athlete, Block, BlockStatus, Phase, RosterAthlete, Season};

/// ---------------------------------------------------------------------------
/// Dates
/// ---------------------------------------------------------------------------

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

pub fn timestamp(y: i32, m: u32, d: u32, hour: u32) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(y, m, d, hour, 0, 0)
    .single()
    .expect("valid test timestamp")
}

/// ---------------------------------------------------------------------------
/// Record Factories
/// ---------------------------------------------------------------------------

/// Draft pre-season block in phase `p1` named "Block {id}"
pub fn block(id: &str, number: u32, start: NaiveDate, end: NaiveDate) -> Block {
  let days = (end - start).num_days() + 1;
  Block {
    id: id.to_string(),
    phase_id: "p1".to_string(),
    block_number: number,
    name: format!("Block {}", id),
    season: Season::PreSeason,
    sub_season: None,
    start_date: start,
    end_date: end,
    duration: ((days.max(1) + 6) / 7).clamp(1, 4) as u32,
    status: BlockStatus::Draft,
    days_available: None,
    days_complete: None,
    current_day: None,
    next_block_due: None,
    last_modification: None,
    last_submission: None,
  }
}

/// Four-week block in March 2024 with a next-block due date
pub fn due_block(id: &str, number: u32, due: NaiveDate) -> Block {
  let mut b = block(id, number, date(2024, 3, 4), date(2024, 3, 31));
  b.next_block_due = Some(due);
  b
}

/// Current phase holding `blocks`
pub fn phase(id: &str, number: u32, blocks: Vec<Block>) -> Phase {
  let start = blocks.iter().map(|b| b.start_date).min().unwrap_or(date(2024, 1, 1));
  let end = blocks.iter().map(|b| b.end_date).max().unwrap_or(start);
  Phase {
    id: id.to_string(),
    phase_number: number,
    start_date: start,
    end_date: end,
    is_current: true,
    blocks,
  }
}

pub fn athlete_with_phase(id: &str, name: &str, phase: Phase) -> RosterAthlete {
  RosterAthlete {
    athlete: Athlete {
      id: id.to_string(),
      name: name.to_string(),
      status: None,
    },
    phases: vec![phase],
  }
}

/// Athlete whose blocks all sit in one current phase `p1`
pub fn athlete_with_blocks(id: &str, name: &str, blocks: Vec<Block>) -> RosterAthlete {
  athlete_with_phase(id, name, phase("p1", 1, blocks))
}
