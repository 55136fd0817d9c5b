//! Lifecycle states for events, competitions, team registrations and results.
//!
//! Every status change goes through a `transition` function; nothing writes a
//! status column without asking the owning enum first.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("cannot move {entity} from '{from}' to '{to}'")]
    Illegal {
        entity: &'static str,
        from: String,
        to: String,
    },

    #[error("registration deadline {0} is not in the future")]
    DeadlineNotInFuture(NaiveDateTime),

    #[error("{0} team(s) are still waiting for a registration decision")]
    UnresolvedTeams(i64),

    #[error("event is not open for registration")]
    RegistrationClosed,

    #[error("{entity} is no longer '{expected}', reload and try again")]
    Concurrent {
        entity: &'static str,
        expected: String,
    },
}

/// The row changed between the read and the conditional update.
pub fn concurrent<T: fmt::Display>(entity: &'static str, expected: T) -> TransitionError {
    TransitionError::Concurrent {
        entity,
        expected: expected.to_string(),
    }
}

fn illegal<T: fmt::Display>(entity: &'static str, from: T, to: T) -> TransitionError {
    TransitionError::Illegal {
        entity,
        from: from.to_string(),
        to: to.to_string(),
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "event_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Draft,
    Open,
    InProgress,
    Completed,
}

/// Facts an event transition depends on that live outside the event row.
#[derive(Debug, Clone, Copy)]
pub struct EventGuard {
    pub now: NaiveDateTime,
    pub registration_deadline: NaiveDateTime,
    pub unresolved_teams: i64,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    pub fn transition(self, to: Self, guard: &EventGuard) -> Result<Self, TransitionError> {
        match (self, to) {
            (Self::Draft, Self::Open) => {
                if guard.registration_deadline <= guard.now {
                    return Err(TransitionError::DeadlineNotInFuture(
                        guard.registration_deadline,
                    ));
                }
                Ok(to)
            }
            (Self::Open, Self::InProgress) => {
                if guard.unresolved_teams > 0 {
                    return Err(TransitionError::UnresolvedTeams(guard.unresolved_teams));
                }
                Ok(to)
            }
            (Self::InProgress, Self::Completed) => Ok(to),
            _ => Err(illegal("event", self, to)),
        }
    }

    /// Completed events are archived and no longer editable.
    pub fn is_archived(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "competition_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CompetitionStatus {
    Pending,
    InProgress,
    Completed,
}

impl CompetitionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    fn order(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::InProgress => 1,
            Self::Completed => 2,
        }
    }

    /// Moves one step forward. Going backwards is only possible with
    /// `admin_override`, e.g. to reopen a competition for a correction.
    pub fn transition(self, to: Self, admin_override: bool) -> Result<Self, TransitionError> {
        let forward = to.order() == self.order() + 1;
        let backward = to.order() < self.order();

        if forward || (backward && admin_override) {
            Ok(to)
        } else {
            Err(illegal("competition", self, to))
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "registration_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Draft,
    Submitted,
    Accepted,
    Rejected,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    pub fn transition(self, to: Self) -> Result<Self, TransitionError> {
        match (self, to) {
            (Self::Draft, Self::Submitted)
            | (Self::Submitted, Self::Accepted)
            | (Self::Submitted, Self::Rejected)
            | (Self::Rejected, Self::Draft) => Ok(to),
            _ => Err(illegal("team registration", self, to)),
        }
    }

    /// Roster and team details may only change before submission.
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft | Self::Rejected)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    sqlx::Type,
)]
#[sqlx(type_name = "result_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    #[default]
    Active,
    /// Did not start
    Dns,
    /// Disqualified
    Dq,
    /// Did not finish
    Dnf,
}

impl ResultStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Dns => "dns",
            Self::Dq => "dq",
            Self::Dnf => "dnf",
        }
    }

    pub fn counts_for_points(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl FromStr for ResultStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "dns" => Ok(Self::Dns),
            "dq" => Ok(Self::Dq),
            "dnf" => Ok(Self::Dnf),
            other => Err(format!(
                "unknown result status '{other}', expected one of: active, dns, dq, dnf"
            )),
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

display_as_str!(EventStatus, CompetitionStatus, RegistrationStatus, ResultStatus);
