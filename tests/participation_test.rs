//! Participation lifecycle against a real database
//!
//! Needs Docker or `TEST_DATABASE_URL`; run with `cargo test -- --ignored`.

mod helpers;

use assert_matches::assert_matches;
use serial_test::serial;

use baropot::models::baropot::{BaropotStatus, Decision, JoinedStatus, UpdateBaropotRequest};
use baropot::models::notification::NotificationKind;
use baropot::BaropotError;
use helpers::*;

const HOST: i64 = 1;
const ALICE: i64 = 2;
const BOB: i64 = 3;

async fn setup(max_participants: i32) -> (TestContext, i64) {
    let ctx = TestContext::new().await;
    for id in [HOST, ALICE, BOB] {
        seed_user(&ctx.services, id).await;
    }

    let restaurant = ctx
        .services
        .restaurant_service
        .register(HOST, restaurant_request("Lee Kyung-moon Gopchang", 37.5716, 126.9910))
        .await
        .expect("Failed to register restaurant");

    let baropot = ctx
        .services
        .baropot_service
        .create(HOST, baropot_request(restaurant.restaurant.id, max_participants))
        .await
        .expect("Failed to create baropot");

    (ctx, baropot.baropot.id)
}

fn status_of(view: &baropot::models::BaropotView, user_id: i64) -> Option<JoinedStatus> {
    view.participants.iter().find(|p| p.user_id == user_id).map(|p| p.joined_status)
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_created_baropot_has_approved_host() {
    let (ctx, id) = setup(4).await;
    let view = ctx.services.baropot_service.find_by_id(id).await.unwrap();

    assert_eq!(view.baropot.status, BaropotStatus::Open);
    assert_eq!(view.host_id(), Some(HOST));
    assert_eq!(view.participant_count, 1);
    assert_eq!(view.pending_participant_count, 0);
    assert_eq!(view.tags, vec!["gopchang".to_string()]);
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_two_seat_scenario() {
    let (ctx, id) = setup(2).await;
    let participation = &ctx.services.participation_service;
    let baropots = &ctx.services.baropot_service;

    assert!(participation.request_join(id, ALICE, Some("hi!".into())).await.unwrap());
    let view = baropots.find_by_id(id).await.unwrap();
    assert_eq!(status_of(&view, ALICE), Some(JoinedStatus::Pending));
    assert_eq!(view.pending_participant_count, 1);

    participation.decide_join_request(id, HOST, ALICE, Decision::Approved, None).await.unwrap();
    assert_eq!(baropots.find_by_id(id).await.unwrap().baropot.status, BaropotStatus::Full);

    let err = participation.request_join(id, BOB, None).await.unwrap_err();
    assert_eq!(err.to_string(), "Conflict: capacity exceeded");

    participation
        .decide_join_request(id, HOST, ALICE, Decision::Removed, Some("no show".into()))
        .await
        .unwrap();
    let view = baropots.find_by_id(id).await.unwrap();
    assert_eq!(view.baropot.status, BaropotStatus::Open);
    assert_eq!(status_of(&view, ALICE), Some(JoinedStatus::Removed));

    participation.request_join(id, BOB, None).await.unwrap();
    let view = baropots.find_by_id(id).await.unwrap();
    assert_eq!(status_of(&view, BOB), Some(JoinedStatus::Pending));

    let kinds: Vec<NotificationKind> = ctx
        .services
        .notification_service
        .unread(ALICE)
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![NotificationKind::BaropotParticipantRemoved, NotificationKind::BaropotJoinRequestApproved]
    );
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_failed_approval_leaves_rows_unchanged() {
    let (ctx, id) = setup(2).await;
    let participation = &ctx.services.participation_service;

    participation.request_join(id, ALICE, None).await.unwrap();
    participation.request_join(id, BOB, None).await.unwrap();
    participation.decide_join_request(id, HOST, ALICE, Decision::Approved, None).await.unwrap();

    let err = participation.decide_join_request(id, HOST, BOB, Decision::Approved, None).await.unwrap_err();
    assert_matches!(err, BaropotError::Conflict(_));

    let view = ctx.services.baropot_service.find_by_id(id).await.unwrap();
    assert_eq!(status_of(&view, BOB), Some(JoinedStatus::Pending));
    assert_eq!(view.participant_count, 2);
    assert_eq!(view.baropot.status, BaropotStatus::Full);
    assert_eq!(ctx.db.count_records("baropot_participants").await.unwrap(), 3);
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_schema_rejects_duplicate_rows() {
    let (ctx, id) = setup(4).await;

    let second_host = format!(
        "INSERT INTO baropot_participants (baropot_id, user_id, is_host, joined_status) VALUES ({id}, {ALICE}, TRUE, 'APPROVED')"
    );
    assert!(ctx.db.execute_sql(&second_host).await.is_err());

    ctx.services.participation_service.request_join(id, ALICE, None).await.unwrap();
    let duplicate = format!("INSERT INTO baropot_participants (baropot_id, user_id) VALUES ({id}, {ALICE})");
    assert!(ctx.db.execute_sql(&duplicate).await.is_err());

    assert_eq!(ctx.db.count_records("baropot_participants").await.unwrap(), 2);
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_host_is_never_a_target() {
    let (ctx, id) = setup(4).await;
    let participation = &ctx.services.participation_service;

    assert_matches!(participation.request_join(id, HOST, None).await, Err(BaropotError::Forbidden(_)));
    assert_matches!(participation.cancel_join(id, HOST).await, Err(BaropotError::Forbidden(_)));
    assert_matches!(
        participation.decide_join_request(id, HOST, HOST, Decision::Removed, None).await,
        Err(BaropotError::Conflict(_))
    );
    assert_matches!(
        participation.decide_join_request(id, ALICE, BOB, Decision::Approved, None).await,
        Err(BaropotError::Forbidden(_))
    );
    assert_matches!(
        participation.request_join(999, ALICE, None).await,
        Err(BaropotError::NotFound { resource: "Baropot", id: 999 })
    );
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_failed_notifications_do_not_undo_transitions() {
    let (ctx, id) = setup(2).await;
    let participation = &ctx.services.participation_service;
    ctx.db.reject_notification_inserts().await.unwrap();

    assert!(participation.request_join(id, ALICE, None).await.unwrap());
    let view = ctx.services.baropot_service.find_by_id(id).await.unwrap();
    assert_eq!(status_of(&view, ALICE), Some(JoinedStatus::Pending));

    participation.decide_join_request(id, HOST, ALICE, Decision::Approved, None).await.unwrap();
    let view = ctx.services.baropot_service.find_by_id(id).await.unwrap();
    assert_eq!(status_of(&view, ALICE), Some(JoinedStatus::Approved));
    assert_eq!(view.baropot.status, BaropotStatus::Full);

    assert_eq!(ctx.db.count_records("notifications").await.unwrap(), 0);

    ctx.db.accept_notification_inserts().await.unwrap();
    participation.cancel_join(id, ALICE).await.unwrap();
    assert_eq!(ctx.db.count_records("notifications").await.unwrap(), 1);
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_cancel_reopens_and_notifies_host() {
    let (ctx, id) = setup(2).await;
    let participation = &ctx.services.participation_service;

    participation.request_join(id, ALICE, None).await.unwrap();
    participation.decide_join_request(id, HOST, ALICE, Decision::Approved, None).await.unwrap();

    assert!(participation.cancel_join(id, ALICE).await.unwrap());
    let view = ctx.services.baropot_service.find_by_id(id).await.unwrap();
    assert_eq!(view.baropot.status, BaropotStatus::Open);
    assert_eq!(status_of(&view, ALICE), Some(JoinedStatus::Cancelled));

    // Terminal rows stay put, and a second join is refused
    assert_matches!(participation.cancel_join(id, ALICE).await, Err(BaropotError::Conflict(_)));
    assert_matches!(participation.request_join(id, ALICE, None).await, Err(BaropotError::Conflict(_)));
    assert_matches!(participation.cancel_join(id, BOB).await, Err(BaropotError::NotFound { .. }));

    let host_inbox = ctx.services.notification_service.unread(HOST).await.unwrap();
    assert_eq!(host_inbox[0].kind, NotificationKind::BaropotJoinCancelled);
    assert_eq!(host_inbox[0].sender_id, Some(ALICE));
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_status_transitions_notify_guests() {
    let (ctx, id) = setup(3).await;
    let participation = &ctx.services.participation_service;
    let baropots = &ctx.services.baropot_service;

    participation.request_join(id, ALICE, None).await.unwrap();
    participation.decide_join_request(id, HOST, ALICE, Decision::Approved, None).await.unwrap();
    participation.request_join(id, BOB, None).await.unwrap();

    assert_matches!(baropots.update_status(id, HOST, BaropotStatus::Full).await, Err(BaropotError::Validation(_)));
    assert_matches!(baropots.update_status(id, ALICE, BaropotStatus::InProgress).await, Err(BaropotError::Forbidden(_)));
    assert_matches!(baropots.update_status(id, HOST, BaropotStatus::Completed).await, Err(BaropotError::Conflict(_)));

    let view = baropots.update_status(id, HOST, BaropotStatus::InProgress).await.unwrap();
    assert_eq!(view.baropot.status, BaropotStatus::InProgress);

    let alice = ctx.services.notification_service.unread(ALICE).await.unwrap();
    assert_eq!(alice[0].kind, NotificationKind::BaropotStatusUpdated);
    // Pending requesters are not told
    let bob = ctx.services.notification_service.unread(BOB).await.unwrap();
    assert!(bob.iter().all(|n| n.kind != NotificationKind::BaropotStatusUpdated));

    // Started events take no new requests
    let err = participation.request_join(id, BOB, None).await.unwrap_err();
    assert_matches!(err, BaropotError::Conflict(_));

    let view = baropots.update_status(id, HOST, BaropotStatus::Completed).await.unwrap();
    assert_eq!(view.baropot.status, BaropotStatus::Completed);
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_update_checks_capacity_and_schedule() {
    let (ctx, id) = setup(3).await;
    let participation = &ctx.services.participation_service;
    let baropots = &ctx.services.baropot_service;

    participation.request_join(id, ALICE, None).await.unwrap();
    participation.decide_join_request(id, HOST, ALICE, Decision::Approved, None).await.unwrap();

    let lower = UpdateBaropotRequest { max_participants: Some(2), ..Default::default() };
    let view = baropots.update(id, HOST, lower).await.unwrap();
    assert_eq!(view.baropot.max_participants, 2);
    assert_eq!(view.baropot.status, BaropotStatus::Full);

    let past = UpdateBaropotRequest { date: Some("2001-01-01".into()), ..Default::default() };
    assert_matches!(baropots.update(id, HOST, past).await, Err(BaropotError::Validation(_)));

    assert_matches!(
        baropots.update(id, ALICE, UpdateBaropotRequest::default()).await,
        Err(BaropotError::Forbidden(_))
    );

    let later = UpdateBaropotRequest {
        time: Some("20:30".into()),
        tags: Some(vec!["soju".into(), " soju ".into(), "gopchang".into()]),
        ..Default::default()
    };
    let view = baropots.update(id, HOST, later).await.unwrap();
    assert_eq!(view.tags.len(), 2);

    let alice = ctx.services.notification_service.unread(ALICE).await.unwrap();
    assert_eq!(alice[0].kind, NotificationKind::BaropotDatetimeChanged);
    assert!(alice[0].message.contains("20:30"));
}
