pub mod athlete;
pub mod block;
pub mod filter;

pub use athlete::{Athlete, AthleteStatus, Phase, RosterAthlete};
pub use block::{Block, BlockStatus, CurrentDay, Season};
pub use filter::{DateBounds, FilterState, SortDirection, SortField, SortState, Urgency, UrgencyClass};
