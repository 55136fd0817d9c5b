mod athlete;
mod athlete_result;
mod competition;
mod event;
mod start_list;
pub mod status;
mod team;

pub use athlete::{AgeCategory, Athlete, Gender};
pub use athlete_result::{AthleteResult, AthleteResultHistory};
pub use competition::{Competition, CompetitionType, ScoringType, Zone};
pub use event::{Branding, Event, GenderLimits, RegistrationRules, ScoringRules, TieBreakRule};
pub use start_list::StartListEntry;
pub use status::{
    CompetitionStatus, EventGuard, EventStatus, RegistrationStatus, ResultStatus, TransitionError,
    concurrent,
};
pub use team::{OrganizationType, Team, TeamDocument};
