//! Progress & Urgency Calculator
//!
//! Per-block completion, whole-program summaries and the "next action"
//! classification shown on roster cards.
//!
//! Key principles:
//! - Missing data is unknown, not zero (completion is `None`, not 0%)
//! - "Today" is always passed in, never read from the clock
//! - Invariant violations degrade deterministically and are reported

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::calendar::days_between;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::models::{Block, Phase, RosterAthlete, Urgency};

// ---------------------------------------------------------------------------
/// Completion
// ---------------------------------------------------------------------------

/// Clamped completion percentage, `None` when nothing is available to complete.
/// Negative `days_complete` counts as zero.
pub fn completion_percent(days_complete: i64, days_available: i64) -> Option<u8> {
    if days_available <= 0 {
        return None;
    }
    let complete = days_complete.max(0) as f64;
    let pct = (complete / days_available as f64 * 100.0).round();
    Some(pct.clamp(0.0, 100.0) as u8)
}

/// Completion of one block; `None` when `days_available` is missing or <= 0
pub fn block_completion(block: &Block) -> Option<u8> {
    let available = block.days_available?;
    completion_percent(block.days_complete.unwrap_or(0), available)
}

/// Summed days over a block set as `(complete, available)`, negatives as zero
fn summed_days<'a>(blocks: impl IntoIterator<Item = &'a Block>) -> (i64, i64) {
    blocks.into_iter().fold((0, 0), |(complete, available), b| {
        (
            complete + b.days_complete.unwrap_or(0).max(0),
            available + b.days_available.unwrap_or(0).max(0),
        )
    })
}

/// Completion of a whole phase from its blocks' summed day counts
pub fn phase_completion(phase: &Phase) -> Option<u8> {
    let (complete, available) = summed_days(&phase.blocks);
    completion_percent(complete, available)
}

/// Fraction of programmed days complete across the athlete's current phase.
/// 0.0 when no current phase exists or it has no available days.
pub fn phase_progress(athlete: &RosterAthlete) -> f64 {
    let (complete, available) = summed_days(athlete.current_phases().flat_map(|p| p.blocks.iter()));
    if available > 0 {
        complete as f64 / available as f64
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
/// Program Timeline Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramSummary {
    pub block_count: usize,
    pub total_weeks: u32,
}

/// Block count and the number of weeks spanned from the earliest start to
/// the latest end
pub fn program_timeline_summary<'a>(blocks: impl IntoIterator<Item = &'a Block>) -> ProgramSummary {
    let mut block_count = 0;
    let mut earliest: Option<NaiveDate> = None;
    let mut latest: Option<NaiveDate> = None;

    for b in blocks {
        block_count += 1;
        earliest = Some(earliest.map_or(b.start_date, |e| e.min(b.start_date)));
        latest = Some(latest.map_or(b.end_date, |l| l.max(b.end_date)));
    }

    let total_weeks = match (earliest, latest) {
        (Some(start), Some(end)) => {
            let days = days_between(start, end).max(0);
            ((days + 6) / 7) as u32
        }
        _ => 0,
    };

    ProgramSummary {
        block_count,
        total_weeks,
    }
}

// ---------------------------------------------------------------------------
/// Next Action
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextAction {
    pub text: Option<String>,
    pub urgency: Option<Urgency>,
    pub due_date: Option<NaiveDate>,
    pub block_id: Option<String>,
    /// `due - today` in whole days
    pub days_until: Option<i64>,
}

impl NextAction {
    pub fn none() -> Self {
        Self::default()
    }
}

/// Earliest `next_block_due` across the blocks, classified against `today`.
/// Ties go to the lowest block number.
pub fn next_action<'a>(blocks: impl IntoIterator<Item = &'a Block>, today: NaiveDate) -> NextAction {
    let earliest = blocks
        .into_iter()
        .filter_map(|b| b.next_block_due.map(|due| (due, b)))
        .min_by(|(due_a, a), (due_b, b)| due_a.cmp(due_b).then_with(|| block_order(a, b)));

    match earliest {
        Some((due, block)) => {
            let days_until = days_between(today, due);
            NextAction {
                text: Some(format!("{} due {}", block.name, due.format("%b %-d"))),
                urgency: Some(Urgency::from_days_until(days_until)),
                due_date: Some(due),
                block_id: Some(block.id.clone()),
                days_until: Some(days_until),
            }
        }
        None => NextAction::none(),
    }
}

// ---------------------------------------------------------------------------
/// Current Block
// ---------------------------------------------------------------------------

/// Deterministic tie-break: block number, then id
fn block_order(a: &Block, b: &Block) -> Ordering {
    a.block_number
        .cmp(&b.block_number)
        .then_with(|| a.id.cmp(&b.id))
}

/// The active block; with several actives the lowest block number wins
pub fn current_block_summary<'a>(blocks: impl IntoIterator<Item = &'a Block>) -> Option<&'a Block> {
    blocks
        .into_iter()
        .filter(|b| b.is_active())
        .min_by(|a, b| block_order(a, b))
}

/// Same as [`current_block_summary`], recording a diagnostic when more than
/// one block is active
pub fn current_block_in<'a>(
    blocks: impl IntoIterator<Item = &'a Block>,
    diagnostics: &mut Diagnostics,
) -> Option<&'a Block> {
    let mut actives: Vec<&Block> = blocks.into_iter().filter(|b| b.is_active()).collect();
    actives.sort_by(|a, b| block_order(a, b));

    if actives.len() > 1 {
        diagnostics.record(Diagnostic::MultipleActiveBlocks {
            block_ids: actives.iter().map(|b| b.id.clone()).collect(),
            chosen: actives[0].id.clone(),
        });
    }
    actives.first().copied()
}

// ---------------------------------------------------------------------------
/// Athlete Overview: everything one roster card needs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AthleteOverview {
    pub athlete_id: String,
    pub current_block_id: Option<String>,
    pub current_block_completion: Option<u8>,
    pub next_action: NextAction,
    pub program: ProgramSummary,
    pub phase_progress: f64,
    pub last_activity: Option<DateTime<Utc>>,
    pub diagnostics: Diagnostics,
}

pub fn athlete_overview(athlete: &RosterAthlete, today: NaiveDate) -> AthleteOverview {
    let mut diagnostics = Diagnostics::new();
    let current = current_block_in(athlete.blocks(), &mut diagnostics);

    AthleteOverview {
        athlete_id: athlete.athlete.id.clone(),
        current_block_id: current.map(|b| b.id.clone()),
        current_block_completion: current.and_then(block_completion),
        next_action: next_action(athlete.blocks(), today),
        program: program_timeline_summary(athlete.blocks()),
        phase_progress: phase_progress(athlete),
        last_activity: athlete.last_activity(),
        diagnostics,
    }
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------
