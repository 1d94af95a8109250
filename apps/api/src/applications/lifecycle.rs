//! Application lifecycle: expected status path, interview sub-state and the
//! dashboard aggregates derived from the full application set.
//!
//! Expected path:
//!
//! ```text
//! Applied ──► Interview ──► Offered
//!    │            │
//!    └────────────┴──────► Rejected
//! ```
//!
//! The path is advisory. Any status may be set from any other so users can
//! correct mistakes; off-path moves are applied and flagged, never rejected.
//! `has_interview` is independent of `status` and the two are never updated
//! together.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::applications::repository::ApplicationRepository;
use crate::errors::AppError;
use crate::models::application::{Application, ApplicationStatus};

const UPCOMING_INTERVIEW_LIMIT: usize = 5;

impl ApplicationStatus {
    /// Statuses reachable along the expected path.
    pub fn expected_next(self) -> &'static [ApplicationStatus] {
        match self {
            ApplicationStatus::Applied => &[ApplicationStatus::Interview, ApplicationStatus::Rejected],
            ApplicationStatus::Interview => &[ApplicationStatus::Offered, ApplicationStatus::Rejected],
            ApplicationStatus::Offered | ApplicationStatus::Rejected => &[],
        }
    }

    pub fn is_terminal(self) -> bool {
        self.expected_next().is_empty()
    }

    /// Re-selecting the current status counts as expected.
    pub fn is_expected_transition(self, to: ApplicationStatus) -> bool {
        self == to || self.expected_next().contains(&to)
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct StatusTransition {
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
    /// False for corrections that leave the expected path.
    pub expected: bool,
    /// `to` ends the expected path (offer or rejection).
    pub closes: bool,
}

impl StatusTransition {
    pub fn new(from: ApplicationStatus, to: ApplicationStatus) -> Self {
        Self {
            from,
            to,
            expected: from.is_expected_transition(to),
            closes: to.is_terminal() && from != to,
        }
    }
}

/// Interview sub-state derived from `(has_interview, interview_date)`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum InterviewState {
    NotScheduled,
    /// Interview agreed, date not set yet.
    DateTbd,
    Scheduled { at: DateTime<Utc> },
}

impl InterviewState {
    pub fn from_fields(has_interview: bool, interview_date: Option<DateTime<Utc>>) -> Self {
        match (has_interview, interview_date) {
            (false, _) => InterviewState::NotScheduled,
            (true, None) => InterviewState::DateTbd,
            (true, Some(at)) => InterviewState::Scheduled { at },
        }
    }

    pub fn of(application: &Application) -> Self {
        Self::from_fields(application.has_interview, application.interview_date)
    }

    /// Column values for this state. A date is only stored alongside the flag.
    pub fn into_fields(self) -> (bool, Option<DateTime<Utc>>) {
        match self {
            InterviewState::NotScheduled => (false, None),
            InterviewState::DateTbd => (true, None),
            InterviewState::Scheduled { at } => (true, Some(at)),
        }
    }
}

/// Sets `status`, leaving every other field (including the interview pair) untouched.
pub async fn change_status(
    repo: &dyn ApplicationRepository,
    owner_id: Uuid,
    id: Uuid,
    to: ApplicationStatus,
) -> Result<(Application, StatusTransition), AppError> {
    let current = repo
        .get(owner_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))?;

    let transition = StatusTransition::new(current.status, to);
    if !transition.expected {
        debug!(
            "Application {id}: off-path status correction {} -> {}",
            transition.from, transition.to
        );
    }

    let updated = repo
        .update_status(owner_id, id, to)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))?;

    if transition.closes {
        info!("Application {id} closed as {}", transition.to);
    } else {
        info!("Application {id} status {} -> {}", transition.from, transition.to);
    }
    Ok((updated, transition))
}

/// Sets the interview pair. Status is not touched.
pub async fn set_interview(
    repo: &dyn ApplicationRepository,
    owner_id: Uuid,
    id: Uuid,
    has_interview: bool,
    interview_date: Option<DateTime<Utc>>,
) -> Result<Application, AppError> {
    let (has_interview, interview_date) =
        InterviewState::from_fields(has_interview, interview_date).into_fields();

    repo.update_interview(owner_id, id, has_interview, interview_date)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))
}

// ────────────────────────────────────────────────────────────────────────────
// Dashboard aggregates
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UpcomingInterview {
    pub application_id: Uuid,
    pub position: String,
    pub company: String,
    pub interview_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ApplicationStats {
    pub total: usize,
    pub applied: usize,
    pub interview: usize,
    pub offered: usize,
    pub rejected: usize,
    pub with_interview: usize,
    /// Share of applications that moved past `Applied`.
    pub response_rate: f64,
    /// Offers per application that had an interview.
    pub interview_success: f64,
    pub upcoming_interviews: Vec<UpcomingInterview>,
}

/// Recomputed from the full set on every read; nothing is cached.
pub fn compute_stats(applications: &[Application], now: DateTime<Utc>) -> ApplicationStats {
    let count = |status: ApplicationStatus| {
        applications
            .iter()
            .filter(|a| a.status == status)
            .count()
    };

    let total = applications.len();
    let applied = count(ApplicationStatus::Applied);
    let offered = count(ApplicationStatus::Offered);
    let with_interview = applications.iter().filter(|a| a.has_interview).count();

    let mut upcoming_interviews: Vec<UpcomingInterview> = applications
        .iter()
        .filter_map(|a| match InterviewState::of(a) {
            InterviewState::Scheduled { at } if at >= now => Some(UpcomingInterview {
                application_id: a.id,
                position: a.position.clone(),
                company: a.company.clone(),
                interview_date: at,
            }),
            _ => None,
        })
        .collect();
    upcoming_interviews.sort_by_key(|i| i.interview_date);
    upcoming_interviews.truncate(UPCOMING_INTERVIEW_LIMIT);

    ApplicationStats {
        total,
        applied,
        interview: count(ApplicationStatus::Interview),
        offered,
        rejected: count(ApplicationStatus::Rejected),
        with_interview,
        response_rate: ratio(total - applied, total),
        interview_success: ratio(offered, with_interview),
        upcoming_interviews,
    }
}

/// `numerator / denominator`, or 0 when the denominator is 0.
fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
