use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate state of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverallStatus {
    Applied,
    #[serde(rename = "Under Review")]
    UnderReview,
    Shortlisted,
    #[serde(rename = "In Process")]
    InProcess,
    Selected,
    Rejected,
    Withdrawn,
}

impl OverallStatus {
    pub const fn label(self) -> &'static str {
        match self {
            OverallStatus::Applied => "Applied",
            OverallStatus::UnderReview => "Under Review",
            OverallStatus::Shortlisted => "Shortlisted",
            OverallStatus::InProcess => "In Process",
            OverallStatus::Selected => "Selected",
            OverallStatus::Rejected => "Rejected",
            OverallStatus::Withdrawn => "Withdrawn",
        }
    }

    pub fn ordered() -> [OverallStatus; 7] {
        [
            OverallStatus::Applied,
            OverallStatus::UnderReview,
            OverallStatus::Shortlisted,
            OverallStatus::InProcess,
            OverallStatus::Selected,
            OverallStatus::Rejected,
            OverallStatus::Withdrawn,
        ]
    }

    /// Stages staff may set before any round has been recorded.
    pub const fn is_pre_round(self) -> bool {
        matches!(
            self,
            OverallStatus::Applied | OverallStatus::UnderReview | OverallStatus::Shortlisted
        )
    }

    /// No further round results are accepted.
    pub const fn is_closed(self) -> bool {
        matches!(self, OverallStatus::Rejected | OverallStatus::Withdrawn)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundStatus {
    Scheduled,
    Completed,
    Cleared,
    Rejected,
    Absent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundType {
    Aptitude,
    Technical,
    #[serde(rename = "Group Discussion")]
    GroupDiscussion,
    #[serde(rename = "HR")]
    Hr,
    Other,
}

/// One interview or test stage as recorded by staff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRound {
    pub round_name: String,
    pub round_type: Option<RoundType>,
    pub scheduled_date: Option<NaiveDate>,
    pub actual_date: Option<DateTime<Utc>>,
    pub status: RoundStatus,
    pub score: Option<f32>,
    pub feedback: Option<String>,
    pub interviewer_name: Option<String>,
    pub notes: Option<String>,
}

/// Staff-supplied round result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundUpdate {
    pub round_name: String,
    pub status: RoundStatus,
    #[serde(default)]
    pub round_type: Option<RoundType>,
    #[serde(default)]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default)]
    pub score: Option<f32>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub interviewer_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl RoundUpdate {
    pub fn new(round_name: impl Into<String>, status: RoundStatus) -> Self {
        Self {
            round_name: round_name.into(),
            status,
            round_type: None,
            scheduled_date: None,
            score: None,
            feedback: None,
            interviewer_name: None,
            notes: None,
        }
    }
}

/// Whether a recorded update created a round or changed an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundChange {
    Appended,
    Updated,
}

/// Rounds keyed by name, with first-recorded order kept for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<SelectionRound>", into = "Vec<SelectionRound>")]
pub struct SelectionProcess {
    rounds: HashMap<String, SelectionRound>,
    order: Vec<String>,
}

impl SelectionProcess {
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn get(&self, round_name: &str) -> Option<&SelectionRound> {
        self.rounds.get(round_name)
    }

    /// Rounds in the order they were first recorded.
    pub fn rounds(&self) -> impl Iterator<Item = &SelectionRound> + '_ {
        self.order.iter().filter_map(|name| self.rounds.get(name))
    }

    /// Insert or update by name. Optional fields only overwrite when supplied.
    pub fn record(&mut self, update: RoundUpdate, at: DateTime<Utc>) -> RoundChange {
        if let Some(round) = self.rounds.get_mut(&update.round_name) {
            round.status = update.status;
            round.actual_date = Some(at);
            if update.round_type.is_some() {
                round.round_type = update.round_type;
            }
            if update.scheduled_date.is_some() {
                round.scheduled_date = update.scheduled_date;
            }
            if update.score.is_some() {
                round.score = update.score;
            }
            if update.feedback.is_some() {
                round.feedback = update.feedback;
            }
            if update.interviewer_name.is_some() {
                round.interviewer_name = update.interviewer_name;
            }
            if update.notes.is_some() {
                round.notes = update.notes;
            }
            return RoundChange::Updated;
        }

        let name = update.round_name.clone();
        self.order.push(name.clone());
        self.rounds.insert(
            name,
            SelectionRound {
                round_name: update.round_name,
                round_type: update.round_type,
                scheduled_date: update.scheduled_date,
                actual_date: Some(at),
                status: update.status,
                score: update.score,
                feedback: update.feedback,
                interviewer_name: update.interviewer_name,
                notes: update.notes,
            },
        );
        RoundChange::Appended
    }

    pub fn derived_status(&self) -> Option<OverallStatus> {
        derive_overall_status(self.rounds())
    }
}

impl From<Vec<SelectionRound>> for SelectionProcess {
    fn from(rounds: Vec<SelectionRound>) -> Self {
        let mut process = SelectionProcess::default();
        for round in rounds {
            if !process.rounds.contains_key(&round.round_name) {
                process.order.push(round.round_name.clone());
            }
            process.rounds.insert(round.round_name.clone(), round);
        }
        process
    }
}

impl From<SelectionProcess> for Vec<SelectionRound> {
    fn from(mut process: SelectionProcess) -> Self {
        process
            .order
            .iter()
            .filter_map(|name| process.rounds.remove(name))
            .collect()
    }
}

/// Aggregate status implied by the recorded rounds.
///
/// Any rejection wins; otherwise every recorded round must be cleared for
/// `Selected`. The round count is whatever has been recorded so far, so a
/// round added after the others cleared reopens the application. `None`
/// means no round has been recorded yet.
pub fn derive_overall_status<'a, I>(rounds: I) -> Option<OverallStatus>
where
    I: IntoIterator<Item = &'a SelectionRound>,
{
    let mut total = 0usize;
    let mut cleared = 0usize;

    for round in rounds {
        total += 1;
        match round.status {
            RoundStatus::Rejected => return Some(OverallStatus::Rejected),
            RoundStatus::Cleared => cleared += 1,
            RoundStatus::Scheduled | RoundStatus::Completed | RoundStatus::Absent => {}
        }
    }

    match total {
        0 => None,
        _ if cleared == total => Some(OverallStatus::Selected),
        _ => Some(OverallStatus::InProcess),
    }
}

/// Refusals raised by application lifecycle transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("round name is required")]
    MissingRoundName,
    #[error("application is {} and no longer accepts updates", .0.label())]
    Closed(OverallStatus),
    #[error("an offer has already been issued for this application")]
    OfferOutstanding,
    #[error("cannot move application from {} to {}", .from.label(), .to.label())]
    InvalidStage {
        from: OverallStatus,
        to: OverallStatus,
    },
}
