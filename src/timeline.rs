//! Timeline derivation
//!
//! Turns an athlete's blocks (optionally grouped into phases) into a padded
//! day grid plus week rows. Each day knows which block and phase own it and
//! where it sits inside that block. Rendering is left entirely to callers.

use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::calendar::{day_index_in_block, enumerate_days, week_index, week_start};
use crate::config::{EngineConfig, MAX_CONFIG_DAYS};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::models::{Block, Phase};

/// ---------------------------------------------------------------------------
/// Output Model
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseLabel {
  pub phase_id: String,
  /// Known only when the timeline was derived from phases
  pub phase_number: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineDay {
  pub date: NaiveDate,
  pub block_id: Option<String>,
  pub block_number: Option<u32>,
  pub phase: Option<PhaseLabel>,
  /// Week of the owning block, 1-indexed
  pub week_index: Option<u32>,
  pub day_index_in_block: Option<u32>,
  pub is_block_transition: bool,
  pub is_phase_transition: bool,
  /// First unprogrammed day after the last block, only once today has passed it
  pub is_after_last_programmed: bool,
  pub is_today: bool,
  pub is_current_programmed_day: bool,
}

impl TimelineDay {
  pub fn is_owned(&self) -> bool {
    self.block_id.is_some()
  }
}

/// One week-aligned row of days
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineWeek {
  pub week_start: NaiveDate,
  /// Index of the row's first day in `TimelineModel::days`
  pub first_day: usize,
  pub day_count: usize,
  // Labels come from the first day of the row
  pub block_id: Option<String>,
  pub week_index: Option<u32>,
  pub day_index_in_block: Option<u32>,
  /// A block boundary falls inside this row
  pub spans_block_transition: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineModel {
  pub start: NaiveDate,
  pub end: NaiveDate,
  pub days: Vec<TimelineDay>,
  pub weeks: Vec<TimelineWeek>,
  /// Blocks left out because their range was malformed
  pub skipped_blocks: usize,
  pub diagnostics: Diagnostics,
}

impl TimelineModel {
  pub fn week_days(&self, week: &TimelineWeek) -> &[TimelineDay] {
    let end = (week.first_day + week.day_count).min(self.days.len());
    self.days.get(week.first_day..end).unwrap_or(&[])
  }

  pub fn day(&self, date: NaiveDate) -> Option<&TimelineDay> {
    let offset = (date - self.start).num_days();
    if offset < 0 {
      return None;
    }
    self.days.get(offset as usize)
  }

  /// The day flagged as the first gap day after programming ran out
  pub fn after_last_programmed(&self) -> Option<NaiveDate> {
    self.days.iter().find(|d| d.is_after_last_programmed).map(|d| d.date)
  }

  pub fn block_transitions(&self) -> impl Iterator<Item = &TimelineDay> {
    self.days.iter().filter(|d| d.is_block_transition)
  }
}

/// ---------------------------------------------------------------------------
/// Derivation
/// ---------------------------------------------------------------------------

struct Entry<'a> {
  block: &'a Block,
  phase: PhaseLabel,
}

/// Derive the grid for a flat block list; phases are inferred from each
/// block's `phase_id`
pub fn derive_timeline(blocks: &[Block], today: NaiveDate, config: &EngineConfig) -> TimelineModel {
  let entries = blocks
    .iter()
    .map(|b| Entry {
      block: b,
      phase: PhaseLabel {
        phase_id: b.phase_id.clone(),
        phase_number: None,
      },
    })
    .collect();
  derive(entries, today, config)
}

/// Derive the grid for blocks pre-grouped into phases
pub fn derive_phase_timeline(phases: &[Phase], today: NaiveDate, config: &EngineConfig) -> TimelineModel {
  let entries = phases
    .iter()
    .flat_map(|p| {
      p.blocks.iter().map(move |b| Entry {
        block: b,
        phase: PhaseLabel {
          phase_id: p.id.clone(),
          phase_number: Some(p.phase_number),
        },
      })
    })
    .collect();
  derive(entries, today, config)
}

fn derive(entries: Vec<Entry<'_>>, today: NaiveDate, config: &EngineConfig) -> TimelineModel {
  let mut diagnostics = Diagnostics::new();
  let mut skipped_blocks = 0;

  // Malformed ranges are dropped individually, never fatal
  let mut valid: Vec<Entry<'_>> = Vec::with_capacity(entries.len());
  for entry in entries {
    let b = entry.block;
    match enumerate_days(b.start_date, b.end_date) {
      Ok(_) => valid.push(entry),
      Err(_) => {
        skipped_blocks += 1;
        diagnostics.record(Diagnostic::InvalidBlockRange {
          block_id: b.id.clone(),
          start: b.start_date,
          end: b.end_date,
        });
      }
    }
  }

  valid.sort_by(|a, b| {
    a.block
      .start_date
      .cmp(&b.block.start_date)
      .then_with(|| a.block.block_number.cmp(&b.block.block_number))
      .then_with(|| a.block.id.cmp(&b.block.id))
  });

  let (start, end, after_last) = match (valid.first(), valid.iter().map(|e| e.block.end_date).max()) {
    (Some(first), Some(latest_end)) => {
      let pad = config.timeline_pad_days;
      let after_last = latest_end.succ_opt().filter(|_| today > latest_end);
      let padded_end = shift_forward(latest_end, pad);
      let end = after_last.map_or(padded_end, |d| padded_end.max(d));
      (shift_back(first.block.start_date, pad), end, after_last)
    }
    _ => (
      shift_back(today, config.empty_horizon_before_days),
      shift_forward(today, config.empty_horizon_after_days),
      None,
    ),
  };

  let owners = assign_owners(&valid, &mut diagnostics);

  // First block start of every phase, for phase transition flags
  let mut phase_starts: HashMap<&str, NaiveDate> = HashMap::new();
  for entry in &valid {
    phase_starts
      .entry(entry.phase.phase_id.as_str())
      .or_insert(entry.block.start_date);
  }
  let block_starts: HashSet<NaiveDate> = valid.iter().map(|e| e.block.start_date).collect();

  let mut days = Vec::new();
  let mut previous_phase: Option<&str> = None;

  for date in enumerate_days(start, end).into_iter().flatten() {
    let owner = owners.get(&date).map(|&i| &valid[i]);
    let phase_id = owner.map(|e| e.phase.phase_id.as_str());

    let is_phase_transition = match owner {
      Some(e) => {
        phase_starts.get(e.phase.phase_id.as_str()) == Some(&date) && previous_phase != phase_id
      }
      None => false,
    };

    days.push(TimelineDay {
      date,
      block_id: owner.map(|e| e.block.id.clone()),
      block_number: owner.map(|e| e.block.block_number),
      phase: owner.map(|e| e.phase.clone()),
      week_index: owner.and_then(|e| week_index(date, e.block.start_date, config.week_starts_on)),
      day_index_in_block: owner.and_then(|e| day_index_in_block(date, e.block)),
      is_block_transition: block_starts.contains(&date),
      is_phase_transition,
      is_after_last_programmed: after_last == Some(date),
      is_today: date == today,
      is_current_programmed_day: owner.is_some_and(|e| e.block.current_day_date() == Some(date)),
    });

    previous_phase = phase_id;
  }

  let weeks = group_weeks(&days, config);

  tracing::debug!(
    %start,
    %end,
    blocks = valid.len(),
    skipped_blocks,
    weeks = weeks.len(),
    "Derived timeline"
  );

  TimelineModel {
    start,
    end,
    days,
    weeks,
    skipped_blocks,
    diagnostics,
  }
}

/// Offsets are capped at `MAX_CONFIG_DAYS`; near the calendar limits the
/// date is left unshifted
fn shift_back(date: NaiveDate, days: u32) -> NaiveDate {
  date
    .checked_sub_days(Days::new(u64::from(days.min(MAX_CONFIG_DAYS))))
    .unwrap_or(date)
}

fn shift_forward(date: NaiveDate, days: u32) -> NaiveDate {
  date
    .checked_add_days(Days::new(u64::from(days.min(MAX_CONFIG_DAYS))))
    .unwrap_or(date)
}

/// Map each covered day to the index of its owning entry. Entries are sorted,
/// so on overlap the earlier block keeps the day. Only overlaps within one
/// phase are reported.
fn assign_owners(valid: &[Entry<'_>], diagnostics: &mut Diagnostics) -> HashMap<NaiveDate, usize> {
  let mut owners: HashMap<NaiveDate, usize> = HashMap::new();
  let mut reported: BTreeSet<(usize, usize)> = BTreeSet::new();

  for (i, entry) in valid.iter().enumerate() {
    let b = entry.block;
    for date in enumerate_days(b.start_date, b.end_date).into_iter().flatten() {
      match owners.get(&date) {
        Some(&existing) => {
          let same_phase = valid[existing].phase.phase_id == entry.phase.phase_id;
          if same_phase && reported.insert((existing, i)) {
            diagnostics.record(Diagnostic::OverlappingBlocks {
              first: valid[existing].block.id.clone(),
              second: b.id.clone(),
              from: date,
            });
          }
        }
        None => {
          owners.insert(date, i);
        }
      }
    }
  }

  owners
}

/// Partition days into runs sharing the same week start
fn group_weeks(days: &[TimelineDay], config: &EngineConfig) -> Vec<TimelineWeek> {
  let mut weeks: Vec<TimelineWeek> = Vec::new();

  for (i, day) in days.iter().enumerate() {
    let ws = week_start(day.date, config.week_starts_on);
    match weeks.last_mut() {
      Some(week) if week.week_start == ws => {
        week.day_count += 1;
        if day.block_id != days[i - 1].block_id && day.is_owned() {
          week.spans_block_transition = true;
        }
      }
      _ => weeks.push(TimelineWeek {
        week_start: ws,
        first_day: i,
        day_count: 1,
        block_id: day.block_id.clone(),
        week_index: day.week_index,
        day_index_in_block: day.day_index_in_block,
        spans_block_transition: false,
      }),
    }
  }

  weeks
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
