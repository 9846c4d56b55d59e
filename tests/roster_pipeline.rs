//! End-to-end: roster JSON in, filtered / sorted / annotated view state out.

use chrono::NaiveDate;
use coach_roster::{
  arrange_roster, athlete_overview, derive_phase_timeline, parse_roster, EngineConfig, FilterState,
  RosterQuery, RosterView, Season, SortDirection, SortField, SortState, Urgency, UrgencyClass,
};

const ROSTER: &str = r#"{
  "athletes": [
    {
      "id": "a1",
      "name": "Jordan",
      "status": "rehabbing",
      "phases": [{
        "id": "p1", "phaseNumber": 1, "startDate": "2024-03-04", "endDate": "2024-04-14", "isCurrent": true,
        "blocks": [
          {
            "id": "b1", "phaseId": "p1", "blockNumber": 1, "name": "Base", "season": "Pre-Season",
            "startDate": "2024-03-04", "endDate": "2024-03-31", "duration": 4, "status": "active",
            "daysAvailable": 28, "daysComplete": 12, "nextBlockDue": "2024-03-13",
            "lastModification": "2024-03-09T17:00:00Z"
          },
          {
            "id": "b2", "phaseId": "p1", "blockNumber": 2, "name": "Build", "season": "In-Season",
            "startDate": "2024-04-01", "endDate": "2024-04-14", "duration": 2, "status": "draft"
          }
        ]
      }]
    },
    {
      "id": "a2",
      "name": "Alex",
      "phases": [{
        "id": "p2", "phaseNumber": 1, "startDate": "2024-02-05", "endDate": "2024-03-03", "isCurrent": true,
        "blocks": [{
          "id": "b3", "phaseId": "p2", "blockNumber": 1, "name": "Intro", "season": "Off-Season",
          "startDate": "2024-02-05", "endDate": "2024-03-03", "duration": 4, "status": "complete",
          "daysAvailable": 20, "daysComplete": 20
        }]
      }]
    },
    {
      "id": "a3",
      "name": "Sam",
      "status": "injured",
      "phases": [{
        "id": "p3", "phaseNumber": 2, "startDate": "2024-03-11", "endDate": "2024-03-24", "isCurrent": true,
        "blocks": [{
          "id": "b4", "phaseId": "p3", "blockNumber": 1, "name": "Return", "season": "In-Season",
          "startDate": "2024-03-11", "endDate": "2024-03-24", "duration": 2, "status": "pending-signoff",
          "daysAvailable": 14, "daysComplete": 0
        }]
      }]
    }
  ]
}"#;

fn today() -> NaiveDate {
  NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
}

fn names(rows: &[coach_roster::RosterRow<'_>]) -> Vec<String> {
  rows.iter().map(|r| r.athlete.name().to_string()).collect()
}

#[test]
fn test_default_view_sorts_by_name() {
  let roster = parse_roster(ROSTER).expect("Roster should parse");
  let rows = arrange_roster(&roster, &RosterQuery::default(), today());
  assert_eq!(names(&rows), vec!["Alex", "Jordan", "Sam"]);
}

#[test]
fn test_season_filter_with_markers() {
  let roster = parse_roster(ROSTER).unwrap();
  let mut filter = FilterState::default();
  filter.seasons.insert(Season::InSeason);
  let query = RosterQuery {
    filter,
    view: RosterView::All {
      sort: SortState::new(SortField::NextActionDate, SortDirection::Asc),
    },
  };

  let rows = arrange_roster(&roster, &query, today());
  // Sam is pending sign-off (keyed on today), Jordan's next block is due 3/13
  assert_eq!(names(&rows), vec!["Sam", "Jordan"]);

  let jordan = &rows[1];
  let marked: Vec<_> = jordan
    .block_markers
    .iter()
    .filter(|m| m.matches_active_filter)
    .map(|m| m.block_id.as_str())
    .collect();
  assert_eq!(marked, vec!["b2"]);
}

#[test]
fn test_no_active_block_view() {
  let roster = parse_roster(ROSTER).unwrap();
  let mut filter = FilterState::default();
  filter.urgencies.insert(UrgencyClass::NoActiveBlock);
  let query = RosterQuery {
    filter,
    view: RosterView::default(),
  };
  let rows = arrange_roster(&roster, &query, today());
  assert_eq!(names(&rows), vec!["Alex", "Sam"]);
}

#[test]
fn test_needs_signoff_view() {
  let roster = parse_roster(ROSTER).unwrap();
  let query = RosterQuery {
    filter: FilterState::default(),
    view: RosterView::NeedsSignoff,
  };
  let rows = arrange_roster(&roster, &query, today());
  assert_eq!(names(&rows), vec!["Sam"]);
}

#[test]
fn test_overview_and_timeline_for_displayed_athlete() {
  let roster = parse_roster(ROSTER).unwrap();
  let jordan = roster.iter().find(|a| a.athlete.id == "a1").unwrap();

  let overview = athlete_overview(jordan, today());
  assert_eq!(overview.current_block_id.as_deref(), Some("b1"));
  assert_eq!(overview.current_block_completion, Some(43));
  assert_eq!(overview.next_action.urgency, Some(Urgency::ThisWeek));
  assert_eq!(overview.program.block_count, 2);
  assert_eq!(overview.program.total_weeks, 6);

  let timeline = derive_phase_timeline(&jordan.phases, today(), &EngineConfig::default());
  assert_eq!(timeline.skipped_blocks, 0);
  assert_eq!(timeline.days.first().map(|d| d.date), NaiveDate::from_ymd_opt(2024, 2, 26));
  assert_eq!(timeline.days.last().map(|d| d.date), NaiveDate::from_ymd_opt(2024, 4, 21));
  let today_cell = timeline.day(today()).unwrap();
  assert!(today_cell.is_today);
  assert_eq!(today_cell.block_id.as_deref(), Some("b1"));
  assert_eq!(today_cell.day_index_in_block, Some(7));
  assert_eq!(today_cell.phase.as_ref().and_then(|p| p.phase_number), Some(1));
}
