//! Training program engine for coaching staff.
//!
//! Pure, synchronous derivations over athlete / phase / block records:
//! calendar primitives, a day-by-day timeline grid, progress and urgency,
//! and roster filtering and sorting. Callers fetch and render; every
//! function here takes an explicit `today` and never mutates its input.

pub mod calendar;
pub mod config;
pub mod diagnostics;
pub mod ingest;
pub mod models;
pub mod progress;
pub mod roster;
pub mod timeline;

#[cfg(test)]
mod test_utils;

pub use calendar::{
  day_index_in_block, days_between, enumerate_days, week_index, week_start, CalendarError, DayRange,
};
pub use config::{ConfigError, EngineConfig};
pub use diagnostics::{audit_blocks, Diagnostic, Diagnostics};
pub use ingest::{parse_roster, IngestError};
pub use models::{
  Athlete, AthleteStatus, Block, BlockStatus, CurrentDay, DateBounds, FilterState, Phase, RosterAthlete,
  Season, SortDirection, SortField, SortState, Urgency, UrgencyClass,
};
pub use progress::{
  athlete_overview, block_completion, current_block_in, current_block_summary, next_action,
  phase_completion, phase_progress, program_timeline_summary, AthleteOverview, NextAction,
  ProgramSummary,
};
pub use roster::{
  apply_filters, arrange_roster, sort_needs_signoff, sort_roster, BlockMarker, RosterQuery, RosterRow,
  RosterView,
};
pub use timeline::{derive_phase_timeline, derive_timeline, PhaseLabel, TimelineDay, TimelineModel, TimelineWeek};
