/// Integration tests for team capacity aggregation

mod common;

use chrono::{DateTime, Duration, TimeZone, Utc};
use common::Fixture;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use vacadm_shared::capacity::report::{render_csv, CSV_HEADER};
use vacadm_shared::capacity::{
    Availability, CapacityAggregator, CapacityError, CapacityQuery,
};
use vacadm_shared::models::team::Team;
use vacadm_shared::models::user::User;
use vacadm_shared::models::vacation::CreateVacation;
use vacadm_shared::repository::Repository;

fn day0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2022, 5, 2, 0, 0, 0).unwrap()
}

fn week() -> CapacityQuery {
    CapacityQuery {
        from: day0(),
        to: day0() + Duration::days(7),
        team_id: None,
    }
}

fn aggregator(fx: &Fixture) -> CapacityAggregator {
    CapacityAggregator::new(fx.repo.clone(), fx.relations.clone())
}

struct TeamSetup {
    boss: User,
    owner: User,
    members: Vec<User>,
    team: Team,
}

/// boss <- owner (owns team) ; two members, one with 3.5 days off in the week
async fn team_with_vacation(fx: &Fixture) -> TeamSetup {
    let boss = fx.user("boss", None, None).await;
    let owner = fx.user("owner", Some(boss.id), None).await;
    let team = fx.team("dev", owner.id).await;
    let alice = fx.user("alice", Some(owner.id), Some(team.id)).await;
    let bob = fx.user("bob", Some(owner.id), Some(team.id)).await;

    fx.repo
        .create_vacation(CreateVacation {
            user_id: alice.id,
            approved_by: owner.id,
            from: day0() + Duration::hours(84),
            to: day0() + Duration::days(10),
        })
        .await
        .unwrap();

    TeamSetup {
        boss,
        owner,
        members: vec![alice, bob],
        team,
    }
}

#[tokio::test]
async fn test_two_users_three_and_a_half_days_is_high() {
    let fx = Fixture::new();
    let setup = team_with_vacation(&fx).await;

    let records = aggregator(&fx)
        .compute(&week(), setup.owner.id, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.team_id, setup.team.id);
    assert_eq!(record.availability, Availability::High);
    assert_eq!(record.from, day0());
    assert_eq!(record.to, day0() + Duration::days(7));

    let vacations = record.vacations.as_ref().unwrap();
    assert_eq!(vacations.len(), 1);
    assert_eq!(vacations[0].from, day0() + Duration::hours(84));
    assert_eq!(vacations[0].to, day0() + Duration::days(7));
}

#[tokio::test]
async fn test_ratio_of_exactly_point_eight_is_medium() {
    let fx = Fixture::new();
    let owner = fx.user("owner", None, None).await;
    let team = fx.team("big", owner.id).await;

    // 8 day window * 10 users = 80 work days; 10 users * 2 * 5 days = 100 vacation days
    for i in 0..10 {
        let member = fx.user(&format!("m{}", i), None, Some(team.id)).await;
        for _ in 0..2 {
            fx.repo
                .create_vacation(CreateVacation {
                    user_id: member.id,
                    approved_by: owner.id,
                    from: day0() + Duration::days(1),
                    to: day0() + Duration::days(6),
                })
                .await
                .unwrap();
        }
    }

    let query = CapacityQuery {
        from: day0(),
        to: day0() + Duration::days(8),
        team_id: Some(team.id),
    };
    let records = aggregator(&fx)
        .compute(&query, owner.id, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(records[0].availability, Availability::Medium);
}

#[tokio::test]
async fn test_team_without_vacations_is_high() {
    let fx = Fixture::new();
    let owner = fx.user("owner", None, None).await;
    let team = fx.team("idle", owner.id).await;
    fx.user("member", None, Some(team.id)).await;

    let records = aggregator(&fx)
        .compute(&week(), owner.id, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(records[0].availability, Availability::High);
    assert_eq!(records[0].vacations, Some(vec![]));
}

#[tokio::test]
async fn test_vacation_after_window_counts_negative_and_is_low() {
    let fx = Fixture::new();
    let owner = fx.user("owner", None, None).await;
    let team = fx.team("late", owner.id).await;
    let member = fx.user("member", None, Some(team.id)).await;

    // Starts after the window closes, so the clipped interval is day9..day7
    fx.repo
        .create_vacation(CreateVacation {
            user_id: member.id,
            approved_by: owner.id,
            from: day0() + Duration::days(9),
            to: day0() + Duration::days(10),
        })
        .await
        .unwrap();

    let records = aggregator(&fx)
        .compute(&week(), owner.id, &CancellationToken::new())
        .await
        .unwrap();

    // 7 work days over -2 vacation days
    assert_eq!(records[0].availability, Availability::Low);
    let vacations = records[0].vacations.as_ref().unwrap();
    assert_eq!(vacations.len(), 1);
    assert_eq!(vacations[0].to, day0() + Duration::days(7));
}

#[tokio::test]
async fn test_visibility_gate() {
    let fx = Fixture::new();
    let setup = team_with_vacation(&fx).await;
    let stranger = fx.user("stranger", None, None).await;
    let agg = aggregator(&fx);
    let token = CancellationToken::new();

    for allowed in [setup.owner.id, setup.boss.id] {
        let records = agg.compute(&week(), allowed, &token).await.unwrap();
        assert!(records[0].vacations.is_some(), "caller {} should see details", allowed);
    }

    for denied in [setup.members[0].id, stranger.id] {
        let records = agg.compute(&week(), denied, &token).await.unwrap();
        assert_eq!(records[0].availability, Availability::High);
        assert!(records[0].vacations.is_none(), "caller {} must not see details", denied);
    }
}

#[tokio::test]
async fn test_all_teams_when_unscoped() {
    let fx = Fixture::new();
    let setup = team_with_vacation(&fx).await;
    let other = fx.team("other", setup.boss.id).await;

    let records = aggregator(&fx)
        .compute(&week(), setup.boss.id, &CancellationToken::new())
        .await
        .unwrap();

    let ids: Vec<Uuid> = records.iter().map(|r| r.team_id).collect();
    assert_eq!(ids, vec![setup.team.id, other.id]);
}

#[tokio::test]
async fn test_unknown_team_and_bad_window() {
    let fx = Fixture::new();
    let caller = fx.user("caller", None, None).await;
    let agg = aggregator(&fx);
    let token = CancellationToken::new();

    let missing = Uuid::new_v4();
    let result = agg
        .compute(
            &CapacityQuery {
                team_id: Some(missing),
                ..week()
            },
            caller.id,
            &token,
        )
        .await;
    assert!(matches!(result, Err(CapacityError::TeamNotFound(id)) if id == missing));

    let inverted = CapacityQuery {
        from: day0(),
        to: day0(),
        team_id: None,
    };
    assert!(matches!(
        agg.compute(&inverted, caller.id, &token).await,
        Err(CapacityError::InvalidWindow)
    ));
}

#[tokio::test]
async fn test_cancelled_aggregation() {
    let fx = Fixture::new();
    let setup = team_with_vacation(&fx).await;

    let token = CancellationToken::new();
    token.cancel();

    let result = aggregator(&fx).compute(&week(), setup.owner.id, &token).await;
    assert!(matches!(result, Err(CapacityError::Cancelled)));
}

#[tokio::test]
async fn test_csv_report_end_to_end() {
    let fx = Fixture::new();
    let setup = team_with_vacation(&fx).await;
    let agg = aggregator(&fx);
    let token = CancellationToken::new();

    let visible = agg.compute(&week(), setup.owner.id, &token).await.unwrap();
    let csv = String::from_utf8(render_csv(&visible).await.unwrap()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], CSV_HEADER.join(","));
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains(&setup.members[0].id.to_string()));

    let hidden = agg.compute(&week(), setup.members[1].id, &token).await.unwrap();
    let csv = String::from_utf8(render_csv(&hidden).await.unwrap()).unwrap();
    assert!(csv.lines().nth(1).unwrap().ends_with("HIGH,,,,,,,"));
}
