//! HTTP-level integration tests for friendships, groups, and direct
//! messages.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, delete_auth, delete_json_auth, get_auth, post_json_auth, put_json_auth,
    register_user,
};
use sqlx::PgPool;

/// Send a friend request from `requester` to `addressee_id` and return
/// the friendship id.
async fn send_request(app: axum::Router, token: &str, addressee_id: i64) -> i64 {
    let response = post_json_auth(
        app,
        "/api/v1/friends",
        serde_json::json!({ "addressee_id": addressee_id }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["data"]["id"].as_i64().expect("friendship id")
}

/// Create an accepted friendship between two users, returning its id.
async fn befriend(app: axum::Router, token_a: &str, token_b: &str, user_b: i64) -> i64 {
    let id = send_request(app.clone(), token_a, user_b).await;
    let response = post_json_auth(
        app,
        &format!("/api/v1/friends/{id}/accept"),
        serde_json::json!({}),
        token_b,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    id
}

// ---------------------------------------------------------------------------
// Friendships
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_friend_request_and_accept(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let (alice_id, alice) = register_user(app.clone(), "alice").await;
    let (bob_id, bob) = register_user(app.clone(), "bob").await;

    let id = send_request(app.clone(), &alice, bob_id).await;

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/friends/{id}/accept"),
        serde_json::json!({}),
        &bob,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "accepted");
    assert_eq!(json["data"]["requester_id"], alice_id);

    let response = get_auth(app, "/api/v1/friends", &alice).await;
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["status"], "accepted");
}

/// Only the addressee can answer; the requester accepting their own
/// request is a 404.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_requester_cannot_accept_own_request(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let (_, alice) = register_user(app.clone(), "alice").await;
    let (bob_id, _) = register_user(app.clone(), "bob").await;

    let id = send_request(app.clone(), &alice, bob_id).await;

    let response = post_json_auth(
        app,
        &format!("/api/v1/friends/{id}/accept"),
        serde_json::json!({}),
        &alice,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_self_friendship_rejected(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let (alice_id, alice) = register_user(app.clone(), "alice").await;

    let response = post_json_auth(
        app,
        "/api/v1/friends",
        serde_json::json!({ "addressee_id": alice_id }),
        &alice,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_request_conflicts(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let (_, alice) = register_user(app.clone(), "alice").await;
    let (bob_id, _) = register_user(app.clone(), "bob").await;

    send_request(app.clone(), &alice, bob_id).await;

    let response = post_json_auth(
        app,
        "/api/v1/friends",
        serde_json::json!({ "addressee_id": bob_id }),
        &alice,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unfriend(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let (_, alice) = register_user(app.clone(), "alice").await;
    let (bob_id, bob) = register_user(app.clone(), "bob").await;

    let id = befriend(app.clone(), &alice, &bob, bob_id).await;

    let response = delete_auth(app.clone(), &format!("/api/v1/friends/{id}"), &bob).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app, "/api/v1/friends", &alice).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

async fn create_group(app: axum::Router, token: &str, name: &str) -> i64 {
    let response = post_json_auth(
        app,
        "/api/v1/groups",
        serde_json::json!({ "name": name }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["data"]["id"].as_i64().expect("group id")
}

/// The creator is the owner and automatically the first member.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_group_creator_is_member(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let (alice_id, alice) = register_user(app.clone(), "alice").await;

    let id = create_group(app.clone(), &alice, "Oulipo").await;

    let response = get_auth(app, &format!("/api/v1/groups/{id}/members"), &alice).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["user_id"], alice_id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_group_membership_lifecycle(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let (_, alice) = register_user(app.clone(), "alice").await;
    let (bob_id, bob) = register_user(app.clone(), "bob").await;

    let id = create_group(app.clone(), &alice, "Workshop").await;

    // Non-members cannot see the group.
    let response = get_auth(app.clone(), &format!("/api/v1/groups/{id}"), &bob).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Owner adds bob.
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/groups/{id}/members"),
        serde_json::json!({ "user_id": bob_id }),
        &alice,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = get_auth(app.clone(), &format!("/api/v1/groups/{id}"), &bob).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Bob leaves.
    let response = delete_json_auth(
        app.clone(),
        &format!("/api/v1/groups/{id}/members"),
        serde_json::json!({ "user_id": bob_id }),
        &bob,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app, &format!("/api/v1/groups/{id}"), &bob).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_only_owner_updates_group(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let (_, alice) = register_user(app.clone(), "alice").await;
    let (bob_id, bob) = register_user(app.clone(), "bob").await;

    let id = create_group(app.clone(), &alice, "Original").await;
    post_json_auth(
        app.clone(),
        &format!("/api/v1/groups/{id}/members"),
        serde_json::json!({ "user_id": bob_id }),
        &alice,
    )
    .await;

    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/groups/{id}"),
        serde_json::json!({ "name": "Hijacked" }),
        &bob,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = put_json_auth(
        app,
        &format!("/api/v1/groups/{id}"),
        serde_json::json!({ "name": "Renamed" }),
        &alice,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Renamed");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_owner_cannot_leave_own_group(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let (alice_id, alice) = register_user(app.clone(), "alice").await;

    let id = create_group(app.clone(), &alice, "Mine").await;

    let response = delete_json_auth(
        app,
        &format!("/api/v1/groups/{id}/members"),
        serde_json::json!({ "user_id": alice_id }),
        &alice,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Direct messages
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_message_flow_between_friends(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let (_, alice) = register_user(app.clone(), "alice").await;
    let (bob_id, bob) = register_user(app.clone(), "bob").await;
    befriend(app.clone(), &alice, &bob, bob_id).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/messages",
        serde_json::json!({ "recipient_id": bob_id, "body": "New sonnet set is up" }),
        &alice,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let message_id = json["data"]["id"].as_i64().unwrap();
    assert!(json["data"]["read_at"].is_null());

    // Bob's inbox and unread count see the message.
    let response = get_auth(app.clone(), "/api/v1/messages", &bob).await;
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["body"], "New sonnet set is up");

    let response = get_auth(app.clone(), "/api/v1/messages/unread-count", &bob).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["unread"], 1);

    // Mark read; the count drops and re-marking is a 404.
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/messages/{message_id}/read"),
        serde_json::json!({}),
        &bob,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app.clone(), "/api/v1/messages/unread-count", &bob).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["unread"], 0);

    let response = post_json_auth(
        app,
        &format!("/api/v1/messages/{message_id}/read"),
        serde_json::json!({}),
        &bob,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_messaging_requires_friendship(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let (_, alice) = register_user(app.clone(), "alice").await;
    let (bob_id, _) = register_user(app.clone(), "bob").await;

    let response = post_json_auth(
        app,
        "/api/v1/messages",
        serde_json::json!({ "recipient_id": bob_id, "body": "Hello stranger" }),
        &alice,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_conversation_is_two_way_and_ordered(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let (alice_id, alice) = register_user(app.clone(), "alice").await;
    let (bob_id, bob) = register_user(app.clone(), "bob").await;
    befriend(app.clone(), &alice, &bob, bob_id).await;

    for (token, recipient, body) in [
        (&alice, bob_id, "first"),
        (&bob, alice_id, "second"),
        (&alice, bob_id, "third"),
    ] {
        let response = post_json_auth(
            app.clone(),
            "/api/v1/messages",
            serde_json::json!({ "recipient_id": recipient, "body": body }),
            token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = get_auth(app, &format!("/api/v1/messages/with/{bob_id}"), &alice).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let bodies: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["body"].as_str().unwrap())
        .collect();
    assert_eq!(bodies, vec!["first", "second", "third"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_only_recipient_marks_read(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let (_, alice) = register_user(app.clone(), "alice").await;
    let (bob_id, bob) = register_user(app.clone(), "bob").await;
    befriend(app.clone(), &alice, &bob, bob_id).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/messages",
        serde_json::json!({ "recipient_id": bob_id, "body": "for bob" }),
        &alice,
    )
    .await;
    let json = body_json(response).await;
    let message_id = json["data"]["id"].as_i64().unwrap();

    // The sender cannot mark the recipient's copy as read.
    let response = post_json_auth(
        app,
        &format!("/api/v1/messages/{message_id}/read"),
        serde_json::json!({}),
        &alice,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
