/// Vacation requests, approval and entitlements over HTTP

mod common;

use axum::http::{Method, StatusCode};
use common::TestContext;
use serde_json::{json, Value};
use vacadm_shared::models::user::User;

struct Family {
    root: User,
    lead: User,
    dev: User,
}

async fn family(ctx: &TestContext) -> Family {
    let root = ctx.user("root", None, None).await;
    let lead = ctx.user("lead", Some(root.id), None).await;
    let dev = ctx.user("dev", Some(lead.id), None).await;
    Family { root, lead, dev }
}

fn interval() -> Value {
    json!({ "from": "2024-07-01T00:00:00Z", "to": "2024-07-14T00:00:00Z" })
}

async fn file_request(ctx: &TestContext, user: &User) -> String {
    let response = ctx
        .send(
            Method::PUT,
            &format!("/v1/users/{}/vacation-requests", user.id),
            Some(&ctx.token_for(user)),
            Some(interval()),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    response.json()["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_filing_request_notifies_parent() {
    let ctx = TestContext::new();
    let f = family(&ctx).await;

    let request_id = file_request(&ctx, &f.dev).await;

    let messages = ctx.notifier.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, f.lead.id);
    assert_eq!(
        messages[0].1,
        format!("new vacation request from dev Tester, id: {}", request_id)
    );
}

#[tokio::test]
async fn test_request_without_parent_sends_nothing() {
    let ctx = TestContext::new();
    let f = family(&ctx).await;

    file_request(&ctx, &f.root).await;
    assert!(ctx.notifier.messages().is_empty());
}

#[tokio::test]
async fn test_request_rejects_inverted_interval() {
    let ctx = TestContext::new();
    let f = family(&ctx).await;

    let response = ctx
        .send(
            Method::PUT,
            &format!("/v1/users/{}/vacation-requests", f.dev.id),
            Some(&ctx.token_for(&f.dev)),
            Some(json!({ "from": "2024-07-14T00:00:00Z", "to": "2024-07-01T00:00:00Z" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_and_delete_request() {
    let ctx = TestContext::new();
    let f = family(&ctx).await;
    let token = ctx.token_for(&f.dev);
    let request_id = file_request(&ctx, &f.dev).await;
    let uri = format!("/v1/users/{}/vacation-requests/{}", f.dev.id, request_id);

    let response = ctx
        .send(
            Method::PATCH,
            &uri,
            Some(&token),
            Some(json!({ "from": "2024-08-01T00:00:00Z", "to": "2024-08-05T00:00:00Z" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["from"], "2024-08-01T00:00:00Z");

    // Filing and changing both notify the parent
    assert_eq!(ctx.notifier.messages().len(), 2);

    let response = ctx.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = ctx.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_of_other_user_is_not_found() {
    let ctx = TestContext::new();
    let f = family(&ctx).await;
    let request_id = file_request(&ctx, &f.dev).await;

    // lead may access its own path, but the request belongs to dev
    let response = ctx
        .send(
            Method::GET,
            &format!("/v1/users/{}/vacation-requests/{}", f.lead.id, request_id),
            Some(&ctx.token_for(&f.lead)),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ancestor_approves_request() {
    let ctx = TestContext::new();
    let f = family(&ctx).await;
    let request_id = file_request(&ctx, &f.dev).await;

    // Grandparent approval is allowed
    let response = ctx
        .send(
            Method::PUT,
            &format!(
                "/v1/users/{}/vacation-requests/{}/approve/{}",
                f.dev.id, request_id, f.root.id
            ),
            Some(&ctx.token_for(&f.root)),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let vacation = response.json();
    assert_eq!(vacation["user_id"], f.dev.id.to_string());
    assert_eq!(vacation["approved_by"], f.root.id.to_string());
    assert_eq!(vacation["from"], "2024-07-01T00:00:00Z");
    assert_eq!(vacation["to"], "2024-07-14T00:00:00Z");

    let messages = ctx.notifier.messages();
    let (to, message) = messages.last().unwrap();
    assert_eq!(*to, f.dev.id);
    assert_eq!(
        message,
        "your vacation from 2024-07-01 00:00 to 2024-07-14 00:00 was approved by root Tester"
    );

    let response = ctx
        .send(
            Method::GET,
            &format!("/v1/users/{}/vacations", f.dev.id),
            Some(&ctx.token_for(&f.dev)),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_approval_requires_caller_to_be_named_approver() {
    let ctx = TestContext::new();
    let f = family(&ctx).await;
    let request_id = file_request(&ctx, &f.dev).await;

    // dev passes the path check for itself but is not lead
    let response = ctx
        .send(
            Method::PUT,
            &format!(
                "/v1/users/{}/vacation-requests/{}/approve/{}",
                f.dev.id, request_id, f.lead.id
            ),
            Some(&ctx.token_for(&f.dev)),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_self_approval_is_forbidden() {
    let ctx = TestContext::new();
    let f = family(&ctx).await;
    let request_id = file_request(&ctx, &f.dev).await;

    let response = ctx
        .send(
            Method::PUT,
            &format!(
                "/v1/users/{}/vacation-requests/{}/approve/{}",
                f.dev.id, request_id, f.dev.id
            ),
            Some(&ctx.token_for(&f.dev)),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = ctx
        .send(
            Method::GET,
            &format!("/v1/users/{}/vacations", f.dev.id),
            Some(&ctx.token_for(&f.dev)),
            None,
        )
        .await;
    assert!(response.json().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_vacation_delete_checks_owner() {
    let ctx = TestContext::new();
    let f = family(&ctx).await;
    let request_id = file_request(&ctx, &f.dev).await;

    let response = ctx
        .send(
            Method::PUT,
            &format!(
                "/v1/users/{}/vacation-requests/{}/approve/{}",
                f.dev.id, request_id, f.lead.id
            ),
            Some(&ctx.token_for(&f.lead)),
            None,
        )
        .await;
    let vacation_id = response.json()["id"].as_str().unwrap().to_string();

    let response = ctx
        .send(
            Method::DELETE,
            &format!("/v1/users/{}/vacations/{}", f.lead.id, vacation_id),
            Some(&ctx.token_for(&f.lead)),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let uri = format!("/v1/users/{}/vacations/{}", f.dev.id, vacation_id);
    let response = ctx
        .send(Method::DELETE, &uri, Some(&ctx.token_for(&f.lead)), None)
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = ctx
        .send(Method::GET, &uri, Some(&ctx.token_for(&f.dev)), None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_vacation_resource_crud() {
    let ctx = TestContext::new();
    let f = family(&ctx).await;
    let token = ctx.token_for(&f.lead);
    let base = format!("/v1/users/{}/vacation-resources", f.dev.id);

    let response = ctx
        .send(
            Method::PUT,
            &base,
            Some(&token),
            Some(json!({
                "yearly_days": 30,
                "from": "2024-01-01T00:00:00Z",
                "to": "2025-01-01T00:00:00Z"
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let resource_id = response.json()["id"].as_str().unwrap().to_string();
    let uri = format!("{}/{}", base, resource_id);

    let response = ctx
        .send(
            Method::PATCH,
            &uri,
            Some(&token),
            Some(json!({
                "yearly_days": 28,
                "from": "2024-01-01T00:00:00Z",
                "to": "2025-01-01T00:00:00Z"
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["yearly_days"], 28);

    let response = ctx.send(Method::GET, &base, Some(&token), None).await;
    assert_eq!(response.json().as_array().unwrap().len(), 1);

    let response = ctx.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = ctx.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_vacation_resource_validates_days() {
    let ctx = TestContext::new();
    let f = family(&ctx).await;

    let response = ctx
        .send(
            Method::PUT,
            &format!("/v1/users/{}/vacation-resources", f.dev.id),
            Some(&ctx.token_for(&f.dev)),
            Some(json!({
                "yearly_days": -3,
                "from": "2024-01-01T00:00:00Z",
                "to": "2025-01-01T00:00:00Z"
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json()["details"][0]["field"], "yearly_days");
}
