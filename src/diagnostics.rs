//! Diagnostics channel for invariant violations
//!
//! The engine degrades instead of failing. Anything it had to paper over is
//! recorded here and logged, so upstream code can surface it without the
//! derivation itself ever returning an error.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::Block;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
  /// More than one block is active; the lowest block number wins
  MultipleActiveBlocks { block_ids: Vec<String>, chosen: String },
  /// Block numbers do not increase with start date inside a phase
  BlockNumbersOutOfOrder { phase_id: String, block_ids: Vec<String> },
  /// Two blocks of one phase claim the same day; the earlier one owns it
  OverlappingBlocks { first: String, second: String, from: NaiveDate },
  /// End date precedes start date; the block is left out of the timeline
  InvalidBlockRange { block_id: String, start: NaiveDate, end: NaiveDate },
  /// More days complete than available; completion is clamped
  DaysCompleteExceedsAvailable { block_id: String, complete: i64, available: i64 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
  entries: Vec<Diagnostic>,
}

impl Diagnostics {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn record(&mut self, diagnostic: Diagnostic) {
    match &diagnostic {
      Diagnostic::MultipleActiveBlocks { block_ids, chosen } => {
        tracing::warn!(?block_ids, %chosen, "Multiple active blocks, using lowest block number");
      }
      Diagnostic::BlockNumbersOutOfOrder { phase_id, block_ids } => {
        tracing::warn!(%phase_id, ?block_ids, "Block numbers out of chronological order");
      }
      Diagnostic::OverlappingBlocks { first, second, from } => {
        tracing::warn!(%first, %second, %from, "Overlapping blocks");
      }
      Diagnostic::InvalidBlockRange { block_id, start, end } => {
        tracing::warn!(%block_id, %start, %end, "Block ends before it starts, skipping");
      }
      Diagnostic::DaysCompleteExceedsAvailable { block_id, complete, available } => {
        tracing::warn!(%block_id, complete, available, "Days complete exceeds days available");
      }
    }
    self.entries.push(diagnostic);
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
    self.entries.iter()
  }

  pub fn extend(&mut self, other: Diagnostics) {
    self.entries.extend(other.entries);
  }
}

impl IntoIterator for Diagnostics {
  type Item = Diagnostic;
  type IntoIter = std::vec::IntoIter<Diagnostic>;

  fn into_iter(self) -> Self::IntoIter {
    self.entries.into_iter()
  }
}

/// Check a block list against the data-model invariants without failing
pub fn audit_blocks(blocks: &[Block]) -> Diagnostics {
  let mut diagnostics = Diagnostics::new();

  for b in blocks {
    if !b.has_valid_range() {
      diagnostics.record(Diagnostic::InvalidBlockRange {
        block_id: b.id.clone(),
        start: b.start_date,
        end: b.end_date,
      });
    }
    if let (Some(available), Some(complete)) = (b.days_available, b.days_complete) {
      if available > 0 && complete > available {
        diagnostics.record(Diagnostic::DaysCompleteExceedsAvailable {
          block_id: b.id.clone(),
          complete,
          available,
        });
      }
    }
  }

  let mut actives: Vec<&Block> = blocks.iter().filter(|b| b.is_active()).collect();
  if actives.len() > 1 {
    actives.sort_by_key(|b| b.block_number);
    diagnostics.record(Diagnostic::MultipleActiveBlocks {
      block_ids: actives.iter().map(|b| b.id.clone()).collect(),
      chosen: actives[0].id.clone(),
    });
  }

  let mut by_phase: BTreeMap<&str, Vec<&Block>> = BTreeMap::new();
  for b in blocks {
    by_phase.entry(b.phase_id.as_str()).or_default().push(b);
  }

  for (phase_id, mut phase_blocks) in by_phase {
    phase_blocks.sort_by_key(|b| (b.start_date, b.block_number));

    let out_of_order = phase_blocks
      .windows(2)
      .any(|pair| pair[1].block_number <= pair[0].block_number);
    if out_of_order {
      diagnostics.record(Diagnostic::BlockNumbersOutOfOrder {
        phase_id: phase_id.to_string(),
        block_ids: phase_blocks.iter().map(|b| b.id.clone()).collect(),
      });
    }

    for pair in phase_blocks.windows(2) {
      let (a, b) = (pair[0], pair[1]);
      if a.has_valid_range() && b.has_valid_range() && b.start_date <= a.end_date {
        diagnostics.record(Diagnostic::OverlappingBlocks {
          first: a.id.clone(),
          second: b.id.clone(),
          from: b.start_date,
        });
      }
    }
  }

  diagnostics
}
