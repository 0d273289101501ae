//! Integration tests for the social layer: friendships, groups, messages.

use sqlx::PgPool;
use sonnet_db::models::group::CreateGroup;
use sonnet_db::models::user::CreateUser;
use sonnet_db::repositories::{FriendshipRepo, GroupRepo, MessageRepo, UserRepo};

fn new_user(name: &str) -> CreateUser {
    CreateUser {
        username: name.to_string(),
        email: format!("{name}@example.com"),
        password_hash: "$argon2id$fake".to_string(),
        display_name: Some(name.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Friendships
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_friend_request_lifecycle(pool: PgPool) {
    let alice = UserRepo::create(&pool, &new_user("alice")).await.unwrap();
    let bela = UserRepo::create(&pool, &new_user("bela")).await.unwrap();

    let request = FriendshipRepo::create(&pool, alice.id, bela.id).await.unwrap();
    assert_eq!(request.status, "pending");
    assert!(!FriendshipRepo::are_friends(&pool, alice.id, bela.id).await.unwrap());

    // Only the addressee may answer.
    let wrong = FriendshipRepo::answer(&pool, request.id, alice.id, true).await.unwrap();
    assert!(wrong.is_none());

    let accepted = FriendshipRepo::answer(&pool, request.id, bela.id, true)
        .await
        .unwrap()
        .expect("pending request should be answerable");
    assert_eq!(accepted.status, "accepted");
    assert!(FriendshipRepo::are_friends(&pool, alice.id, bela.id).await.unwrap());
    assert!(FriendshipRepo::are_friends(&pool, bela.id, alice.id).await.unwrap());

    // Already answered: a second answer is a no-op.
    let again = FriendshipRepo::answer(&pool, request.id, bela.id, false).await.unwrap();
    assert!(again.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_declined_request_is_not_friendship(pool: PgPool) {
    let carla = UserRepo::create(&pool, &new_user("carla")).await.unwrap();
    let dmitri = UserRepo::create(&pool, &new_user("dmitri")).await.unwrap();

    let request = FriendshipRepo::create(&pool, carla.id, dmitri.id).await.unwrap();
    FriendshipRepo::answer(&pool, request.id, dmitri.id, false)
        .await
        .unwrap()
        .unwrap();
    assert!(!FriendshipRepo::are_friends(&pool, carla.id, dmitri.id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_request_rejected(pool: PgPool) {
    let erik = UserRepo::create(&pool, &new_user("erik")).await.unwrap();
    let fay = UserRepo::create(&pool, &new_user("fay")).await.unwrap();

    FriendshipRepo::create(&pool, erik.id, fay.id).await.unwrap();
    let duplicate = FriendshipRepo::create(&pool, erik.id, fay.id).await;
    assert!(duplicate.is_err(), "unique pair constraint should reject");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unfriend(pool: PgPool) {
    let gus = UserRepo::create(&pool, &new_user("gus")).await.unwrap();
    let hana = UserRepo::create(&pool, &new_user("hana")).await.unwrap();

    let request = FriendshipRepo::create(&pool, gus.id, hana.id).await.unwrap();
    FriendshipRepo::answer(&pool, request.id, hana.id, true)
        .await
        .unwrap()
        .unwrap();

    // Either side may remove the friendship.
    assert!(FriendshipRepo::remove(&pool, request.id, hana.id).await.unwrap());
    assert!(!FriendshipRepo::are_friends(&pool, gus.id, hana.id).await.unwrap());
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_group_create_adds_owner_as_member(pool: PgPool) {
    let ines = UserRepo::create(&pool, &new_user("ines")).await.unwrap();
    let group = GroupRepo::create(
        &pool,
        ines.id,
        &CreateGroup {
            name: "Oulipo".to_string(),
            description: None,
        },
    )
    .await
    .unwrap();

    assert!(GroupRepo::is_member(&pool, group.id, ines.id).await.unwrap());
    let members = GroupRepo::list_members(&pool, group.id).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].role, "owner");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_group_membership(pool: PgPool) {
    let jon = UserRepo::create(&pool, &new_user("jon")).await.unwrap();
    let kira = UserRepo::create(&pool, &new_user("kira")).await.unwrap();
    let group = GroupRepo::create(
        &pool,
        jon.id,
        &CreateGroup {
            name: "Workshop".to_string(),
            description: Some("weekly".to_string()),
        },
    )
    .await
    .unwrap();

    GroupRepo::add_member(&pool, group.id, kira.id).await.unwrap();
    assert!(GroupRepo::is_member(&pool, group.id, kira.id).await.unwrap());

    let kira_groups = GroupRepo::list_for_user(&pool, kira.id).await.unwrap();
    assert_eq!(kira_groups.len(), 1);
    assert_eq!(kira_groups[0].id, group.id);

    assert!(GroupRepo::remove_member(&pool, group.id, kira.id).await.unwrap());
    assert!(!GroupRepo::is_member(&pool, group.id, kira.id).await.unwrap());
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_message_conversation_and_read_state(pool: PgPool) {
    let lena = UserRepo::create(&pool, &new_user("lena")).await.unwrap();
    let marc = UserRepo::create(&pool, &new_user("marc")).await.unwrap();

    MessageRepo::create(&pool, lena.id, marc.id, "first").await.unwrap();
    let second = MessageRepo::create(&pool, marc.id, lena.id, "second").await.unwrap();
    MessageRepo::create(&pool, lena.id, marc.id, "third").await.unwrap();

    let conversation = MessageRepo::list_conversation(&pool, lena.id, marc.id, 50)
        .await
        .unwrap();
    let bodies: Vec<_> = conversation.iter().map(|m| m.body.as_str()).collect();
    assert_eq!(bodies, vec!["first", "second", "third"]);

    assert_eq!(MessageRepo::count_unread(&pool, lena.id).await.unwrap(), 1);

    // Sender cannot mark the recipient's copy read.
    assert!(!MessageRepo::mark_read(&pool, second.id, marc.id).await.unwrap());
    assert!(MessageRepo::mark_read(&pool, second.id, lena.id).await.unwrap());
    assert_eq!(MessageRepo::count_unread(&pool, lena.id).await.unwrap(), 0);

    // Second mark is a no-op.
    assert!(!MessageRepo::mark_read(&pool, second.id, lena.id).await.unwrap());
}
