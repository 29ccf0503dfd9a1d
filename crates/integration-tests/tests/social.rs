//! Integration tests for friendships and direct messages.
//!
//! These tests require a `PostgreSQL` server reachable through
//! `DATABASE_URL`. Run with: cargo test -p wayfarer-integration-tests -- --ignored

use sqlx::PgPool;

use wayfarer_core::FriendStatus;
use wayfarer_integration_tests::create_user;
use wayfarer_server::db::{FriendRepository, MessageRepository, RepositoryError};

#[sqlx::test(migrator = "wayfarer_server::MIGRATOR")]
#[ignore = "Requires PostgreSQL"]
async fn test_friend_request_lifecycle(pool: PgPool) {
    let ana = create_user(&pool, "ana@example.com", "Ana").await;
    let ben = create_user(&pool, "ben@example.com", "Ben").await;
    let friends = FriendRepository::new(&pool);

    let request = friends.send_request(ana.id, ben.id).await.expect("send");
    assert_eq!(request.status, FriendStatus::Pending);
    assert!(!friends.are_friends(ana.id, ben.id).await.expect("check"));

    let incoming = friends.incoming(ben.id).await.expect("incoming");
    let senders: Vec<_> = incoming.iter().map(|r| r.from_name.as_str()).collect();
    assert_eq!(senders, vec!["Ana"]);

    // Only the recipient can accept
    let err = friends
        .accept(request.id, ana.id)
        .await
        .expect_err("sender cannot accept");
    assert!(matches!(err, RepositoryError::NotFound));

    let accepted = friends.accept(request.id, ben.id).await.expect("accept");
    assert_eq!(accepted.status, FriendStatus::Accepted);
    assert!(friends.are_friends(ben.id, ana.id).await.expect("check"));

    let names: Vec<_> = friends
        .friends(ana.id)
        .await
        .expect("friends")
        .into_iter()
        .map(|u| u.display_name)
        .collect();
    assert_eq!(names, vec!["Ben".to_string()]);

    friends.remove(ben.id, ana.id).await.expect("unfriend");
    assert!(!friends.are_friends(ana.id, ben.id).await.expect("check"));
}

#[sqlx::test(migrator = "wayfarer_server::MIGRATOR")]
#[ignore = "Requires PostgreSQL"]
async fn test_one_request_per_pair(pool: PgPool) {
    let ana = create_user(&pool, "ana@example.com", "Ana").await;
    let ben = create_user(&pool, "ben@example.com", "Ben").await;
    let friends = FriendRepository::new(&pool);

    friends.send_request(ana.id, ben.id).await.expect("send");
    let err = friends
        .send_request(ben.id, ana.id)
        .await
        .expect_err("reverse duplicate");
    assert!(matches!(err, RepositoryError::Conflict(_)));
}

#[sqlx::test(migrator = "wayfarer_server::MIGRATOR")]
#[ignore = "Requires PostgreSQL"]
async fn test_declined_request_can_be_sent_again(pool: PgPool) {
    let ana = create_user(&pool, "ana@example.com", "Ana").await;
    let ben = create_user(&pool, "ben@example.com", "Ben").await;
    let friends = FriendRepository::new(&pool);

    let request = friends.send_request(ana.id, ben.id).await.expect("send");
    friends.decline(request.id, ben.id).await.expect("decline");
    assert!(friends.incoming(ben.id).await.expect("incoming").is_empty());

    friends.send_request(ana.id, ben.id).await.expect("resend");
}

#[sqlx::test(migrator = "wayfarer_server::MIGRATOR")]
#[ignore = "Requires PostgreSQL"]
async fn test_messages_track_unread_state(pool: PgPool) {
    let ana = create_user(&pool, "ana@example.com", "Ana").await;
    let ben = create_user(&pool, "ben@example.com", "Ben").await;
    let messages = MessageRepository::new(&pool);

    messages.send(ana.id, ben.id, "Train at nine?").await.expect("send");
    messages.send(ana.id, ben.id, "Or ten.").await.expect("send");
    messages.send(ben.id, ana.id, "Ten.").await.expect("send");

    assert_eq!(messages.unread_count(ben.id).await.expect("count"), 2);
    assert_eq!(messages.unread_count(ana.id).await.expect("count"), 1);

    let thread: Vec<_> = messages
        .conversation(ben.id, ana.id)
        .await
        .expect("conversation")
        .into_iter()
        .map(|m| m.content)
        .collect();
    assert_eq!(thread, vec!["Train at nine?", "Or ten.", "Ten."]);

    assert_eq!(messages.mark_read(ben.id, ana.id).await.expect("mark"), 2);
    assert_eq!(messages.unread_count(ben.id).await.expect("count"), 0);
    assert_eq!(messages.mark_read(ben.id, ana.id).await.expect("mark"), 0);
}
