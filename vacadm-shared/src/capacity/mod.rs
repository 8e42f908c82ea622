/// Team capacity aggregation
///
/// For a window `[from, to)` and one or all teams, decides how well staffed
/// each team is, based on the confirmed vacations of its members.
///
/// # Algorithm (per team)
///
/// 1. Load the team's users and the vacations of those users.
/// 2. Clip the vacations to the window (see [`clip_vacations`]).
/// 3. `work_days = days_between(from, to) * users`,
///    `vacation_days = Σ days_between(v.from, v.to)` over clipped vacations.
/// 4. Classify `work_days / vacation_days` (see [`classify`]).
/// 5. Attach the clipped vacations only if the caller owns the team or is a
///    transitive parent of its owner.
///
/// Teams are independent, so they are aggregated concurrently. Every
/// repository read races the request's cancellation token.
///
/// The result is a plain `Vec<CapacityRecord>`; [`report`] renders it as
/// JSON or CSV.

pub mod report;

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use crate::auth::relation::RelationChecker;
use crate::models::team::Team;
use crate::models::vacation::Vacation;
use crate::repository::{cancellable, Repository, RepositoryError};

/// Ratio above which a team counts as highly available
pub const HIGH_THRESHOLD: f64 = 0.8;

/// Ratio above which (up to [`HIGH_THRESHOLD`]) a team counts as medium
pub const MEDIUM_THRESHOLD: f64 = 0.25;

/// Staffing classification of a team over a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Availability {
    High,
    Medium,
    Low,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::High => "HIGH",
            Availability::Medium => "MEDIUM",
            Availability::Low => "LOW",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capacity request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    /// Restrict to one team; all teams when absent
    #[serde(default)]
    pub team_id: Option<Uuid>,
}

/// One team's classification over the requested window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityRecord {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub team_id: Uuid,
    pub availability: Availability,
    /// Clipped vacations, only for callers allowed to see them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vacations: Option<Vec<Vacation>>,
}

/// Error type for capacity computation
#[derive(Debug, thiserror::Error)]
pub enum CapacityError {
    /// `from` does not precede `to`
    #[error("Invalid capacity window: from must be before to")]
    InvalidWindow,

    /// The requested team does not exist
    #[error("Team not found: {0}")]
    TeamNotFound(Uuid),

    #[error("Capacity computation cancelled")]
    Cancelled,

    #[error("Repository failure: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for CapacityError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Cancelled => CapacityError::Cancelled,
            other => CapacityError::Repository(other),
        }
    }
}

/// Length of `[from, to]` in days, as hours / 24
///
/// Calendar effects (weekends, holidays, DST) are ignored.
pub fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 3_600_000.0 / 24.0
}

/// Keeps the vacations relevant to `[from, to)` and clips them to it
///
/// A vacation is relevant when it starts strictly after `from` and `from`
/// lies before its end. Relevant vacations are clamped to the window. The
/// test is not a symmetric interval intersection: a vacation starting
/// before `from` is dropped even if it overlaps, and one starting after `to`
/// is kept with an inverted interval.
pub fn clip_vacations(
    vacations: Vec<Vacation>,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Vec<Vacation> {
    vacations
        .into_iter()
        .filter(|v| v.from > from && from < v.to)
        .map(|mut v| {
            if v.from < from {
                v.from = from;
            }
            if v.to > to {
                v.to = to;
            }
            v
        })
        .collect()
}

/// Classifies `work_days / vacation_days`
///
/// - no vacation at all: `High`
/// - ratio `> 0.8`: `High`
/// - `0.25 < ratio <= 0.8`: `Medium`
/// - otherwise, including a negative ratio: `Low`
pub fn classify(work_days: f64, vacation_days: f64) -> Availability {
    if vacation_days == 0.0 {
        return Availability::High;
    }

    let ratio = work_days / vacation_days;
    if ratio > HIGH_THRESHOLD {
        Availability::High
    } else if ratio > MEDIUM_THRESHOLD {
        Availability::Medium
    } else {
        Availability::Low
    }
}

/// Computes capacity records from the repository
#[derive(Clone)]
pub struct CapacityAggregator {
    repo: Arc<dyn Repository>,
    relations: Arc<dyn RelationChecker>,
}

impl CapacityAggregator {
    pub fn new(repo: Arc<dyn Repository>, relations: Arc<dyn RelationChecker>) -> Self {
        Self { repo, relations }
    }

    /// One record per candidate team, in repository order
    ///
    /// # Errors
    ///
    /// - `InvalidWindow` if `query.from >= query.to`
    /// - `TeamNotFound` if `query.team_id` names an unknown team
    /// - `Cancelled` if `token` fires before all reads complete
    /// - `Repository` for any other storage failure
    pub async fn compute(
        &self,
        query: &CapacityQuery,
        caller_id: Uuid,
        token: &CancellationToken,
    ) -> Result<Vec<CapacityRecord>, CapacityError> {
        if query.from >= query.to {
            return Err(CapacityError::InvalidWindow);
        }

        let teams = match query.team_id {
            Some(team_id) => {
                match cancellable(token, self.repo.get_team_by_id(team_id)).await {
                    Ok(team) => vec![team],
                    Err(e) if e.is_not_found() => return Err(CapacityError::TeamNotFound(team_id)),
                    Err(e) => return Err(e.into()),
                }
            }
            None => cancellable(token, self.repo.list_teams()).await?,
        };

        debug!(
            teams = teams.len(),
            from = %query.from,
            to = %query.to,
            caller = %caller_id,
            "Computing team capacity"
        );

        try_join_all(
            teams
                .iter()
                .map(|team| self.team_capacity(team, query, caller_id, token)),
        )
        .await
    }

    async fn team_capacity(
        &self,
        team: &Team,
        query: &CapacityQuery,
        caller_id: Uuid,
        token: &CancellationToken,
    ) -> Result<CapacityRecord, CapacityError> {
        let users = cancellable(token, self.repo.list_team_users(team.id)).await?;
        let vacations = cancellable(token, self.repo.get_vacations_by_team_id(team.id)).await?;

        let clipped = clip_vacations(vacations, query.from, query.to);
        let work_days = days_between(query.from, query.to) * users.len() as f64;
        let vacation_days: f64 = clipped
            .iter()
            .map(|v| days_between(v.from, v.to))
            .sum();
        let availability = classify(work_days, vacation_days);

        let visible = self.vacations_visible(team, caller_id, token).await?;

        debug!(
            team_id = %team.id,
            users = users.len(),
            work_days,
            vacation_days,
            %availability,
            visible,
            "Team capacity computed"
        );

        Ok(CapacityRecord {
            from: query.from,
            to: query.to,
            team_id: team.id,
            availability,
            vacations: visible.then_some(clipped),
        })
    }

    /// Owner of the team, or a transitive parent of the owner
    async fn vacations_visible(
        &self,
        team: &Team,
        caller_id: Uuid,
        token: &CancellationToken,
    ) -> Result<bool, RepositoryError> {
        if cancellable(token, self.relations.is_team_owner(team.id, caller_id)).await? {
            return Ok(true);
        }
        cancellable(token, self.relations.is_parent_user(team.owner_id, caller_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 4, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    fn vacation(from: DateTime<Utc>, to: DateTime<Utc>) -> Vacation {
        Vacation {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            approved_by: Uuid::new_v4(),
            from,
            to,
            created_at: day(0),
            deleted_at: None,
        }
    }

    #[test]
    fn test_days_between() {
        assert_eq!(days_between(day(0), day(7)), 7.0);
        assert_eq!(days_between(day(0), day(0) + Duration::hours(12)), 0.5);
        assert_eq!(days_between(day(2), day(1)), -1.0);
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(80.0, 100.0), Availability::Medium);
        assert_eq!(classify(81.0, 100.0), Availability::High);
        assert_eq!(classify(25.0, 100.0), Availability::Low);
        assert_eq!(classify(26.0, 100.0), Availability::Medium);
        assert_eq!(classify(14.0, 3.5), Availability::High);
    }

    #[test]
    fn test_classify_without_vacation_is_high() {
        assert_eq!(classify(14.0, 0.0), Availability::High);
        assert_eq!(classify(0.0, 0.0), Availability::High);
    }

    #[test]
    fn test_classify_negative_vacation_days_is_low() {
        assert_eq!(classify(7.0, -2.0), Availability::Low);
    }

    #[test]
    fn test_clip_trims_end() {
        let clipped = clip_vacations(
            vec![vacation(day(0) + Duration::hours(84), day(10))],
            day(0),
            day(7),
        );
        assert_eq!(clipped.len(), 1);
        assert_eq!(clipped[0].to, day(7));
        assert_eq!(days_between(clipped[0].from, clipped[0].to), 3.5);
    }

    #[test]
    fn test_clip_drops_vacation_starting_before_window() {
        let clipped = clip_vacations(vec![vacation(day(-2), day(3))], day(0), day(7));
        assert!(clipped.is_empty());
    }

    #[test]
    fn test_clip_drops_vacation_starting_at_window_start() {
        let clipped = clip_vacations(vec![vacation(day(0), day(3))], day(0), day(7));
        assert!(clipped.is_empty());
    }

    #[test]
    fn test_clip_keeps_vacation_after_window_inverted() {
        let clipped = clip_vacations(vec![vacation(day(9), day(10))], day(0), day(7));
        assert_eq!(clipped.len(), 1);
        assert_eq!(clipped[0].from, day(9));
        assert_eq!(clipped[0].to, day(7));
    }

    #[test]
    fn test_availability_serializes_uppercase() {
        assert_eq!(
            serde_json::to_value(Availability::Medium).unwrap(),
            serde_json::json!("MEDIUM")
        );
        assert_eq!(Availability::Low.to_string(), "LOW");
    }

    #[test]
    fn test_record_omits_hidden_vacations() {
        let record = CapacityRecord {
            from: day(0),
            to: day(7),
            team_id: Uuid::nil(),
            availability: Availability::High,
            vacations: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("vacations").is_none());
        assert_eq!(json["availability"], "HIGH");
    }
}
