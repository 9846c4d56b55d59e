//! Calendar primitives
//!
//! Pure date arithmetic shared by the timeline and progress layers. Every
//! function is total over well-formed input and has no hidden state.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;

use crate::models::Block;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CalendarError {
  #[error("Invalid date range: end {end} precedes start {start}")]
  InvalidRange { start: NaiveDate, end: NaiveDate },
}

/// Inclusive, restartable day sequence. Clone it to iterate again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRange {
  next: NaiveDate,
  last: NaiveDate,
  done: bool,
}

impl DayRange {
  pub fn start(&self) -> NaiveDate {
    self.next
  }

  pub fn end(&self) -> NaiveDate {
    self.last
  }
}

impl Iterator for DayRange {
  type Item = NaiveDate;

  fn next(&mut self) -> Option<NaiveDate> {
    if self.done {
      return None;
    }
    let current = self.next;
    match current.succ_opt() {
      Some(succ) if current < self.last => self.next = succ,
      _ => self.done = true,
    }
    Some(current)
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    let len = if self.done {
      0
    } else {
      (self.last - self.next).num_days() as usize + 1
    };
    (len, Some(len))
  }
}

impl DoubleEndedIterator for DayRange {
  fn next_back(&mut self) -> Option<NaiveDate> {
    if self.done {
      return None;
    }
    let current = self.last;
    match current.pred_opt() {
      Some(pred) if current > self.next => self.last = pred,
      _ => self.done = true,
    }
    Some(current)
  }
}

impl ExactSizeIterator for DayRange {}

/// Every day from `start` to `end`, inclusive
pub fn enumerate_days(start: NaiveDate, end: NaiveDate) -> Result<DayRange, CalendarError> {
  if end < start {
    return Err(CalendarError::InvalidRange { start, end });
  }
  Ok(DayRange {
    next: start,
    last: end,
    done: false,
  })
}

/// First day of the week containing `date`
pub fn week_start(date: NaiveDate, week_starts_on: Weekday) -> NaiveDate {
  let offset = (7 + date.weekday().num_days_from_monday() - week_starts_on.num_days_from_monday()) % 7;
  date - Duration::days(offset as i64)
}

/// 1-indexed week number of `date` counted from the week containing
/// `reference_start`; `None` before that week.
pub fn week_index(date: NaiveDate, reference_start: NaiveDate, week_starts_on: Weekday) -> Option<u32> {
  let diff = (week_start(date, week_starts_on) - week_start(reference_start, week_starts_on)).num_days();
  if diff < 0 {
    return None;
  }
  Some((diff / 7) as u32 + 1)
}

/// 1-indexed day offset from `start`; `None` before it
pub fn day_index(date: NaiveDate, start: NaiveDate) -> Option<u32> {
  let diff = days_between(start, date);
  if diff < 0 {
    None
  } else {
    Some(diff as u32 + 1)
  }
}

/// 1-indexed day of `date` within `block`; `None` before the block starts
pub fn day_index_in_block(date: NaiveDate, block: &Block) -> Option<u32> {
  day_index(date, block.start_date)
}

/// Signed number of days from `from` to `to`
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
  (to - from).num_days()
}

/// Parse a weekday name ("monday", "Sun", ...)
pub fn parse_weekday(s: &str) -> Option<Weekday> {
  s.trim().parse::<Weekday>().ok()
}
