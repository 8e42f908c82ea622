/// Integration tests for the approval workflow

mod common;

use chrono::{Duration, Utc};
use common::{FailingNotifier, Fixture, RecordingNotifier};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use vacadm_shared::approval::{ApprovalError, ApprovalWorkflow};
use vacadm_shared::models::vacation_request::{CreateVacationRequest, VacationRequest};
use vacadm_shared::repository::Repository;

async fn request_for(fx: &Fixture, user_id: uuid::Uuid) -> VacationRequest {
    let from = Utc::now() + Duration::days(10);
    fx.repo
        .create_vacation_request(CreateVacationRequest {
            user_id,
            from,
            to: from + Duration::days(5),
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn test_parent_approves_request() {
    let fx = Fixture::new();
    let b = fx.user("b", None, None).await;
    let a = fx.user("a", Some(b.id), None).await;
    let request = request_for(&fx, a.id).await;

    let notifier = Arc::new(RecordingNotifier::default());
    let workflow = ApprovalWorkflow::new(fx.repo.clone(), fx.relations.clone(), notifier.clone());

    let vacation = workflow
        .approve(request.id, a.id, b.id, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(vacation.user_id, a.id);
    assert_eq!(vacation.approved_by, b.id);
    assert_eq!(vacation.from, request.from);
    assert_eq!(vacation.to, request.to);

    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, a.id);
    assert!(messages[0].1.contains("b Tester"));

    assert_eq!(fx.repo.list_user_vacations(a.id).await.unwrap(), vec![vacation]);
}

#[tokio::test]
async fn test_grandparent_may_approve() {
    let fx = Fixture::new();
    let c = fx.user("c", None, None).await;
    let b = fx.user("b", Some(c.id), None).await;
    let a = fx.user("a", Some(b.id), None).await;
    let request = request_for(&fx, a.id).await;

    let workflow = ApprovalWorkflow::new(
        fx.repo.clone(),
        fx.relations.clone(),
        Arc::new(RecordingNotifier::default()),
    );

    let vacation = workflow
        .approve(request.id, a.id, c.id, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(vacation.approved_by, c.id);
}

#[tokio::test]
async fn test_unrelated_approver_is_unauthorized() {
    let fx = Fixture::new();
    let b = fx.user("b", None, None).await;
    let a = fx.user("a", Some(b.id), None).await;
    let c = fx.user("c", None, None).await;
    let request = request_for(&fx, a.id).await;

    let notifier = Arc::new(RecordingNotifier::default());
    let workflow = ApprovalWorkflow::new(fx.repo.clone(), fx.relations.clone(), notifier.clone());

    let result = workflow
        .approve(request.id, a.id, c.id, &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(ApprovalError::Unauthorized)));
    assert!(fx.repo.list_user_vacations(a.id).await.unwrap().is_empty());
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn test_user_cannot_approve_own_request() {
    let fx = Fixture::new();
    let a = fx.user("a", None, None).await;
    let request = request_for(&fx, a.id).await;

    let workflow = ApprovalWorkflow::new(
        fx.repo.clone(),
        fx.relations.clone(),
        Arc::new(RecordingNotifier::default()),
    );

    let result = workflow
        .approve(request.id, a.id, a.id, &CancellationToken::new())
        .await;
    assert!(matches!(result, Err(ApprovalError::Unauthorized)));
}

#[tokio::test]
async fn test_unknown_or_foreign_request_is_not_found() {
    let fx = Fixture::new();
    let b = fx.user("b", None, None).await;
    let a = fx.user("a", Some(b.id), None).await;
    let other = fx.user("other", Some(b.id), None).await;
    let foreign = request_for(&fx, other.id).await;

    let workflow = ApprovalWorkflow::new(
        fx.repo.clone(),
        fx.relations.clone(),
        Arc::new(RecordingNotifier::default()),
    );
    let token = CancellationToken::new();

    let missing = workflow.approve(uuid::Uuid::new_v4(), a.id, b.id, &token).await;
    assert!(matches!(missing, Err(ApprovalError::NotFound(_))));

    let mismatched = workflow.approve(foreign.id, a.id, b.id, &token).await;
    assert!(matches!(mismatched, Err(ApprovalError::NotFound(id)) if id == foreign.id));
}

#[tokio::test]
async fn test_double_approval_creates_two_vacations() {
    let fx = Fixture::new();
    let b = fx.user("b", None, None).await;
    let a = fx.user("a", Some(b.id), None).await;
    let request = request_for(&fx, a.id).await;

    let workflow = ApprovalWorkflow::new(
        fx.repo.clone(),
        fx.relations.clone(),
        Arc::new(RecordingNotifier::default()),
    );
    let token = CancellationToken::new();

    let first = workflow.approve(request.id, a.id, b.id, &token).await.unwrap();
    let second = workflow.approve(request.id, a.id, b.id, &token).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(fx.repo.list_user_vacations(a.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_notification_failure_keeps_vacation() {
    let fx = Fixture::new();
    let b = fx.user("b", None, None).await;
    let a = fx.user("a", Some(b.id), None).await;
    let request = request_for(&fx, a.id).await;

    let workflow = ApprovalWorkflow::new(fx.repo.clone(), fx.relations.clone(), Arc::new(FailingNotifier));

    let vacation = workflow
        .approve(request.id, a.id, b.id, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        fx.repo.get_vacation_by_id(vacation.id).await.unwrap(),
        vacation
    );
}

#[tokio::test]
async fn test_cancelled_approval_writes_nothing() {
    let fx = Fixture::new();
    let b = fx.user("b", None, None).await;
    let a = fx.user("a", Some(b.id), None).await;
    let request = request_for(&fx, a.id).await;

    let notifier = Arc::new(RecordingNotifier::default());
    let workflow = ApprovalWorkflow::new(fx.repo.clone(), fx.relations.clone(), notifier.clone());

    let token = CancellationToken::new();
    token.cancel();

    let result = workflow.approve(request.id, a.id, b.id, &token).await;
    assert!(matches!(result, Err(ApprovalError::Cancelled)));
    assert!(fx.repo.list_user_vacations(a.id).await.unwrap().is_empty());
    assert!(notifier.messages().is_empty());
}
