//! Restaurants, bookmarks and reservations against a real database
//!
//! Needs Docker or `TEST_DATABASE_URL`; run with `cargo test -- --ignored`.

mod helpers;

use assert_matches::assert_matches;
use chrono::{Duration, NaiveDate};
use serial_test::serial;

use baropot::models::notification::NotificationKind;
use baropot::models::reservation::{CreateReservationRequest, ReservationStatus};
use baropot::models::restaurant::{FindRestaurantsQuery, UpdateRestaurantRequest};
use baropot::BaropotError;
use helpers::*;

const OWNER: i64 = 10;
const GUEST: i64 = 11;

// City hall, Seoul
const ORIGIN: (f64, f64) = (37.5665, 126.9780);

async fn setup() -> TestContext {
    let ctx = TestContext::new().await;
    seed_user(&ctx.services, OWNER).await;
    seed_user(&ctx.services, GUEST).await;
    ctx
}

fn reservation(date: &str, time: &str) -> CreateReservationRequest {
    CreateReservationRequest {
        date: date.to_string(),
        time: time.to_string(),
        party_size: Some(2),
        description: None,
    }
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_near_me_search_sorts_and_cuts() {
    let ctx = setup().await;
    let restaurants = &ctx.services.restaurant_service;

    let far = restaurants.register(OWNER, restaurant_request("Far", 37.5665, 127.2000)).await.unwrap();
    let mid = restaurants.register(OWNER, restaurant_request("Mid", 37.6000, 126.9780)).await.unwrap();
    let near = restaurants.register(OWNER, restaurant_request("Near", 37.5700, 126.9780)).await.unwrap();
    assert_eq!(near.tags.len(), 2);
    assert!(near.tags.contains(&"Late Night".to_string()));

    let query = FindRestaurantsQuery {
        lat: Some(ORIGIN.0),
        lng: Some(ORIGIN.1),
        radius_km: Some(10.0),
        ..Default::default()
    };
    let found = restaurants.find_all(&query, None).await.unwrap();
    let ids: Vec<i64> = found.iter().map(|v| v.restaurant.id).collect();
    assert_eq!(ids, vec![near.restaurant.id, mid.restaurant.id]);
    assert!(found[0].distance_km.unwrap() < found[1].distance_km.unwrap());

    let all = restaurants.find_all(&FindRestaurantsQuery::default(), None).await.unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.iter().all(|v| v.distance_km.is_none()));
    assert!(all.iter().any(|v| v.restaurant.id == far.restaurant.id));

    let by_name = FindRestaurantsQuery { name: Some("mi".into()), ..Default::default() };
    assert_eq!(restaurants.find_all(&by_name, None).await.unwrap().len(), 1);
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_only_owner_may_modify() {
    let ctx = setup().await;
    let restaurants = &ctx.services.restaurant_service;
    let view = restaurants.register(OWNER, restaurant_request("Han", ORIGIN.0, ORIGIN.1)).await.unwrap();
    let id = view.restaurant.id;

    let rename = UpdateRestaurantRequest { name: Some("Han Jeongsik".into()), ..Default::default() };
    assert_matches!(restaurants.update(GUEST, id, rename.clone()).await, Err(BaropotError::Forbidden(_)));
    assert_matches!(restaurants.delete(GUEST, id).await, Err(BaropotError::Forbidden(_)));

    let updated = restaurants.update(OWNER, id, rename).await.unwrap();
    assert_eq!(updated.restaurant.name, "Han Jeongsik");
    assert_eq!(updated.photo_urls.len(), 1);

    restaurants.delete(OWNER, id).await.unwrap();
    assert_matches!(restaurants.find_one(id, None).await, Err(BaropotError::NotFound { .. }));
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_bookmarks() {
    let ctx = setup().await;
    let view = ctx
        .services
        .restaurant_service
        .register(OWNER, restaurant_request("Han", ORIGIN.0, ORIGIN.1))
        .await
        .unwrap();
    let id = view.restaurant.id;
    let bookmarks = &ctx.services.bookmark_service;

    bookmarks.add(GUEST, id).await.unwrap();
    assert_matches!(bookmarks.add(GUEST, id).await, Err(BaropotError::Conflict(_)));
    assert_matches!(bookmarks.add(GUEST, 9999).await, Err(BaropotError::NotFound { .. }));

    let inbox = ctx.services.notification_service.unread(OWNER).await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, NotificationKind::Bookmark);
    assert_eq!(inbox[0].sender_id, Some(GUEST));
    assert_eq!(inbox[0].context_id, Some(id));

    // Owners bookmarking their own place are not notified
    bookmarks.add(OWNER, id).await.unwrap();
    assert_eq!(ctx.services.notification_service.unread(OWNER).await.unwrap().len(), 1);
    bookmarks.remove(OWNER, id).await.unwrap();

    let seen = ctx.services.restaurant_service.find_one(id, Some(GUEST)).await.unwrap();
    assert!(seen.is_bookmarked);
    assert_eq!(seen.bookmark_count, 1);
    let anonymous = ctx.services.restaurant_service.find_one(id, None).await.unwrap();
    assert!(!anonymous.is_bookmarked);

    assert_eq!(bookmarks.list_for_user(GUEST).await.unwrap().len(), 1);

    bookmarks.remove(GUEST, id).await.unwrap();
    assert_matches!(bookmarks.remove(GUEST, id).await, Err(BaropotError::NotFound { .. }));
    assert!(bookmarks.list_for_user(GUEST).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_reservations_and_completion_sweep() {
    let ctx = setup().await;
    let view = ctx
        .services
        .restaurant_service
        .register(OWNER, restaurant_request("Han", ORIGIN.0, ORIGIN.1))
        .await
        .unwrap();
    let id = view.restaurant.id;
    let reservations = &ctx.services.reservation_service;

    assert_matches!(reservations.create(GUEST, id, reservation("2030-05-01", "10:00")).await, Err(BaropotError::Validation(_)));
    assert_matches!(reservations.create(GUEST, id, reservation("2030-05-01", "7pm")).await, Err(BaropotError::Validation(_)));
    assert_matches!(reservations.create(GUEST, 9999, reservation("2030-05-01", "19:00")).await, Err(BaropotError::NotFound { .. }));

    let booked = reservations.create(GUEST, id, reservation("2030-05-01", "19:00")).await.unwrap();
    assert_eq!(booked.status, ReservationStatus::Approved);
    assert_matches!(reservations.create(OWNER, id, reservation("2030-05-01", "19:00")).await, Err(BaropotError::Conflict(_)));

    let early = reservations.create(GUEST, id, reservation("2030-04-01", "12:00")).await.unwrap();

    // 20 minutes after the earlier slot is still inside the grace period
    let slot = NaiveDate::from_ymd_opt(2030, 4, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
    assert!(reservations.complete_expired(slot + Duration::minutes(20)).await.unwrap().is_empty());

    let completed = reservations.complete_expired(slot + Duration::minutes(31)).await.unwrap();
    assert_eq!(completed, vec![early.id]);

    let mine = reservations.list_for_user(GUEST).await.unwrap();
    assert_eq!(mine.len(), 2);
    let statuses: Vec<ReservationStatus> = mine.iter().map(|r| r.status).collect();
    assert_eq!(statuses, vec![ReservationStatus::Approved, ReservationStatus::Completed]);
}
