//! Live notification delivery against a real database
//!
//! Needs Docker or `TEST_DATABASE_URL`; run with `cargo test -- --ignored`.

mod helpers;

use std::time::Duration;

use assert_matches::assert_matches;
use serial_test::serial;
use tokio::time::timeout;

use baropot::models::baropot::Decision;
use baropot::models::notification::NotificationKind;
use baropot::BaropotError;
use helpers::*;

const HOST: i64 = 21;
const GUEST: i64 = 22;

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_join_request_reaches_host_live() {
    let ctx = TestContext::new().await;
    seed_user(&ctx.services, HOST).await;
    seed_user(&ctx.services, GUEST).await;

    let restaurant = ctx
        .services
        .restaurant_service
        .register(HOST, restaurant_request("Han", 37.5665, 126.9780))
        .await
        .unwrap();
    let baropot = ctx
        .services
        .baropot_service
        .create(HOST, baropot_request(restaurant.restaurant.id, 3))
        .await
        .unwrap();
    let id = baropot.baropot.id;

    let notifications = &ctx.services.notification_service;
    let mut host_feed = notifications.subscribe(HOST).await.unwrap();
    let mut guest_feed = notifications.subscribe(GUEST).await.unwrap();

    ctx.services.participation_service.request_join(id, GUEST, None).await.unwrap();
    let received = timeout(Duration::from_secs(5), host_feed.recv()).await.unwrap().unwrap();
    assert_eq!(received.kind, NotificationKind::BaropotParticipantJoined);
    assert_eq!(received.sender_id, Some(GUEST));
    assert_eq!(received.context_id, Some(restaurant.restaurant.id));

    ctx.services
        .participation_service
        .decide_join_request(id, HOST, GUEST, Decision::Rejected, Some("full table".into()))
        .await
        .unwrap();
    let received = timeout(Duration::from_secs(5), guest_feed.recv()).await.unwrap().unwrap();
    assert_eq!(received.kind, NotificationKind::BaropotJoinRequestRejected);
    assert!(received.message.contains("full table"));

    assert_eq!(notifications.hub_stats().await.unwrap().users, 2);
    drop(host_feed);
    drop(guest_feed);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(notifications.hub_stats().await.unwrap().users, 0);
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_mark_as_read_only_by_recipient() {
    let ctx = TestContext::new().await;
    seed_user(&ctx.services, HOST).await;
    seed_user(&ctx.services, GUEST).await;

    let notifications = &ctx.services.notification_service;
    let stored = notifications
        .notify(baropot::models::NewNotification {
            kind: NotificationKind::Bookmark,
            message: "Someone bookmarked your restaurant.".into(),
            recipient_id: HOST,
            sender_id: Some(GUEST),
            context_id: None,
        })
        .await
        .expect("notification should be stored");

    assert_matches!(notifications.mark_as_read(stored.id, GUEST).await, Err(BaropotError::NotFound { .. }));
    assert_eq!(notifications.unread(HOST).await.unwrap().len(), 1);

    notifications.mark_as_read(stored.id, HOST).await.unwrap();
    assert!(notifications.unread(HOST).await.unwrap().is_empty());

    // Unknown recipients are logged and swallowed
    let orphan = notifications
        .notify(baropot::models::NewNotification {
            kind: NotificationKind::Bookmark,
            message: "nobody".into(),
            recipient_id: 424242,
            sender_id: None,
            context_id: None,
        })
        .await;
    assert!(orphan.is_none());
}
