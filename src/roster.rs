//! Roster filter / sort engine
//!
//! Filtering is a conjunction across categories and a disjunction within
//! one. Block-scoped categories are each satisfied by *any* block of the
//! athlete, independently: one block may match the status filter while a
//! different block matches the season filter.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::calendar::days_between;
use crate::models::{
  AthleteStatus, Block, BlockStatus, DateBounds, FilterState, RosterAthlete, Season, SortDirection,
  SortField, SortState, Urgency, UrgencyClass,
};
use crate::progress::phase_progress;

/// ---------------------------------------------------------------------------
/// Block-level predicates
/// ---------------------------------------------------------------------------

pub fn block_has_status(block: &Block, accepted: &BTreeSet<BlockStatus>) -> bool {
  accepted.contains(&block.status)
}

pub fn block_in_season(block: &Block, accepted: &BTreeSet<Season>) -> bool {
  accepted.contains(&block.season)
}

pub fn block_in_sub_season(block: &Block, accepted: &BTreeSet<String>) -> bool {
  block.sub_season.as_ref().is_some_and(|s| accepted.contains(s))
}

/// Urgency of the block's own `next_block_due`, if it has one
pub fn block_urgency(block: &Block, today: NaiveDate) -> Option<Urgency> {
  block
    .next_block_due
    .map(|due| Urgency::from_days_until(days_between(today, due)))
}

pub fn block_has_urgency(block: &Block, accepted: &BTreeSet<UrgencyClass>, today: NaiveDate) -> bool {
  block_urgency(block, today).is_some_and(|u| accepted.contains(&UrgencyClass::from(u)))
}

pub fn block_due_within(block: &Block, bounds: &DateBounds) -> bool {
  block.next_block_due.is_some_and(|due| bounds.contains(due))
}

pub fn block_active_within(block: &Block, bounds: &DateBounds) -> bool {
  block
    .last_activity()
    .is_some_and(|ts| bounds.contains(ts.date_naive()))
}

/// ---------------------------------------------------------------------------
/// Athlete-level categories
/// ---------------------------------------------------------------------------

pub fn matches_athlete_status(
  athlete: &RosterAthlete,
  accepted: &BTreeSet<Option<AthleteStatus>>,
) -> bool {
  accepted.is_empty() || accepted.contains(&athlete.status())
}

pub fn matches_block_statuses(athlete: &RosterAthlete, accepted: &BTreeSet<BlockStatus>) -> bool {
  accepted.is_empty() || athlete.blocks().any(|b| block_has_status(b, accepted))
}

pub fn matches_seasons(athlete: &RosterAthlete, accepted: &BTreeSet<Season>) -> bool {
  accepted.is_empty() || athlete.blocks().any(|b| block_in_season(b, accepted))
}

pub fn matches_sub_seasons(athlete: &RosterAthlete, accepted: &BTreeSet<String>) -> bool {
  accepted.is_empty() || athlete.blocks().any(|b| block_in_sub_season(b, accepted))
}

/// `no-active-block` passes when the athlete has no active block at all;
/// the other classes pass when any block's due date falls in them.
pub fn matches_urgency(athlete: &RosterAthlete, accepted: &BTreeSet<UrgencyClass>, today: NaiveDate) -> bool {
  if accepted.is_empty() {
    return true;
  }
  if accepted.contains(&UrgencyClass::NoActiveBlock) && !athlete.has_block_with_status(BlockStatus::Active) {
    return true;
  }
  athlete.blocks().any(|b| block_has_urgency(b, accepted, today))
}

pub fn matches_next_block_due(athlete: &RosterAthlete, bounds: &DateBounds) -> bool {
  bounds.is_empty() || athlete.blocks().any(|b| block_due_within(b, bounds))
}

pub fn matches_last_activity(athlete: &RosterAthlete, bounds: &DateBounds) -> bool {
  bounds.is_empty() || athlete.blocks().any(|b| block_active_within(b, bounds))
}

/// Conjunction of every category
pub fn athlete_matches(athlete: &RosterAthlete, filter: &FilterState, today: NaiveDate) -> bool {
  matches_athlete_status(athlete, &filter.athlete_statuses)
    && matches_block_statuses(athlete, &filter.block_statuses)
    && matches_seasons(athlete, &filter.seasons)
    && matches_sub_seasons(athlete, &filter.sub_seasons)
    && matches_urgency(athlete, &filter.urgencies, today)
    && matches_next_block_due(athlete, &filter.next_block_due)
    && matches_last_activity(athlete, &filter.last_activity)
}

/// Whether a single block satisfies every active block-scoped category.
/// False when no block-scoped category is active.
pub fn block_matches_active_filter(block: &Block, filter: &FilterState, today: NaiveDate) -> bool {
  if !filter.has_block_scoped_constraint() {
    return false;
  }
  let positive_urgencies: BTreeSet<UrgencyClass> = filter
    .positive_urgencies()
    .map(UrgencyClass::from)
    .collect();

  (filter.block_statuses.is_empty() || block_has_status(block, &filter.block_statuses))
    && (filter.seasons.is_empty() || block_in_season(block, &filter.seasons))
    && (filter.sub_seasons.is_empty() || block_in_sub_season(block, &filter.sub_seasons))
    && (positive_urgencies.is_empty() || block_has_urgency(block, &positive_urgencies, today))
    && (filter.next_block_due.is_empty() || block_due_within(block, &filter.next_block_due))
    && (filter.last_activity.is_empty() || block_active_within(block, &filter.last_activity))
}

/// Athletes passing every category, in input order
pub fn apply_filters<'a>(
  roster: impl IntoIterator<Item = &'a RosterAthlete>,
  filter: &FilterState,
  today: NaiveDate,
) -> Vec<&'a RosterAthlete> {
  roster
    .into_iter()
    .filter(|a| athlete_matches(a, filter, today))
    .collect()
}

/// ---------------------------------------------------------------------------
/// Sort keys
/// ---------------------------------------------------------------------------

/// Earliest of today (when a block awaits sign-off) and every due date
pub fn next_action_date(athlete: &RosterAthlete, today: NaiveDate) -> Option<NaiveDate> {
  let signoff = athlete
    .has_block_with_status(BlockStatus::PendingSignoff)
    .then_some(today);
  athlete
    .blocks()
    .filter_map(|b| b.next_block_due)
    .chain(signoff)
    .min()
}

enum SortKey {
  Name,
  /// `None` sorts last in either direction
  NextAction(Option<NaiveDate>),
  /// `None` is the largest value, so it flips with direction
  LastActivity(Option<DateTime<Utc>>),
  Progress(f64),
}

impl SortKey {
  fn compute(athlete: &RosterAthlete, field: SortField, today: NaiveDate) -> Self {
    match field {
      SortField::AthleteName => SortKey::Name,
      SortField::NextActionDate => SortKey::NextAction(next_action_date(athlete, today)),
      SortField::LastActivity => SortKey::LastActivity(athlete.last_activity()),
      SortField::PhaseProgress => SortKey::Progress(phase_progress(athlete)),
    }
  }
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
  match direction {
    SortDirection::Asc => ordering,
    SortDirection::Desc => ordering.reverse(),
  }
}

/// Missing values compare as +infinity
fn none_as_max<T: Ord>(a: &Option<T>, b: &Option<T>) -> Ordering {
  match (a, b) {
    (Some(x), Some(y)) => x.cmp(y),
    (Some(_), None) => Ordering::Less,
    (None, Some(_)) => Ordering::Greater,
    (None, None) => Ordering::Equal,
  }
}

fn compare_keys(
  (key_a, a): &(SortKey, &RosterAthlete),
  (key_b, b): &(SortKey, &RosterAthlete),
  direction: SortDirection,
) -> Ordering {
  let primary = match (key_a, key_b) {
    (SortKey::Name, SortKey::Name) => directed(a.name().cmp(b.name()), direction),
    (SortKey::NextAction(x), SortKey::NextAction(y)) => match (x, y) {
      (Some(x), Some(y)) => directed(x.cmp(y), direction),
      _ => none_as_max(x, y),
    },
    (SortKey::LastActivity(x), SortKey::LastActivity(y)) => directed(none_as_max(x, y), direction),
    (SortKey::Progress(x), SortKey::Progress(y)) => directed(x.total_cmp(y), direction),
    _ => Ordering::Equal,
  };
  primary.then_with(|| a.name().cmp(b.name()))
}

/// Order athletes by one field; ties fall back to ascending name. Stable.
pub fn sort_roster<'a>(
  roster: impl IntoIterator<Item = &'a RosterAthlete>,
  sort: &SortState,
  today: NaiveDate,
) -> Vec<&'a RosterAthlete> {
  let mut keyed: Vec<(SortKey, &'a RosterAthlete)> = roster
    .into_iter()
    .map(|a| (SortKey::compute(a, sort.sort_field, today), a))
    .collect();
  keyed.sort_by(|a, b| compare_keys(a, b, sort.direction));
  keyed.into_iter().map(|(_, a)| a).collect()
}

/// ---------------------------------------------------------------------------
/// Needs-signoff view
/// ---------------------------------------------------------------------------

/// Urgency of a pending sign-off. Undated blocks order before every due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SignoffKey {
  Undated,
  Due(NaiveDate),
}

/// Most urgent key among pending-signoff blocks; `None` without any
pub fn signoff_urgency_key(athlete: &RosterAthlete) -> Option<SignoffKey> {
  athlete
    .blocks()
    .filter(|b| b.status == BlockStatus::PendingSignoff)
    .map(|b| b.next_block_due.map_or(SignoffKey::Undated, SignoffKey::Due))
    .min()
}

pub fn needs_signoff(athlete: &RosterAthlete) -> bool {
  athlete.has_block_with_status(BlockStatus::PendingSignoff)
}

/// Most urgent sign-off first; ignores any sort state
pub fn sort_needs_signoff<'a>(roster: impl IntoIterator<Item = &'a RosterAthlete>) -> Vec<&'a RosterAthlete> {
  let mut keyed: Vec<(Option<SignoffKey>, &'a RosterAthlete)> = roster
    .into_iter()
    .map(|a| (signoff_urgency_key(a), a))
    .collect();
  keyed.sort_by(|(ka, a), (kb, b)| none_as_max(ka, kb).then_with(|| a.name().cmp(b.name())));
  keyed.into_iter().map(|(_, a)| a).collect()
}

/// ---------------------------------------------------------------------------
/// Pipeline
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum RosterView {
  All { sort: SortState },
  NeedsSignoff,
}

impl Default for RosterView {
  fn default() -> Self {
    RosterView::All {
      sort: SortState::default(),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RosterQuery {
  pub filter: FilterState,
  pub view: RosterView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockMarker {
  pub block_id: String,
  pub matches_active_filter: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterRow<'a> {
  pub athlete: &'a RosterAthlete,
  pub block_markers: Vec<BlockMarker>,
}

/// Filter, order and annotate the roster for display
pub fn arrange_roster<'a>(roster: &'a [RosterAthlete], query: &RosterQuery, today: NaiveDate) -> Vec<RosterRow<'a>> {
  let filtered = apply_filters(roster, &query.filter, today);

  let ordered = match query.view {
    RosterView::All { sort } => sort_roster(filtered, &sort, today),
    RosterView::NeedsSignoff => sort_needs_signoff(filtered.into_iter().filter(|a| needs_signoff(a))),
  };

  tracing::debug!(
    total = roster.len(),
    shown = ordered.len(),
    active_filters = query.filter.active_category_count(),
    "Arranged roster"
  );

  ordered
    .into_iter()
    .map(|athlete| RosterRow {
      athlete,
      block_markers: athlete
        .blocks()
        .map(|b| BlockMarker {
          block_id: b.id.clone(),
          matches_active_filter: block_matches_active_filter(b, &query.filter, today),
        })
        .collect(),
    })
    .collect()
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
