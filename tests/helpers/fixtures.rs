//! Test data builders

use chrono::{Duration, Local, NaiveTime};
use fake::faker::name::en::Name;
use fake::Fake;

use baropot::config::Settings;
use baropot::models::baropot::CreateBaropotRequest;
use baropot::models::restaurant::{RegisterRestaurantRequest, RestaurantCategory};
use baropot::models::user::{User, UserIdentity};
use baropot::services::ServiceFactory;

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

/// Defaults with a test secret and the given database
pub fn test_settings(database_url: &str) -> Settings {
    let mut settings = Settings::default();
    settings.database.url = database_url.to_string();
    settings.database.min_connections = 0;
    settings.database.acquire_timeout_seconds = 2;
    settings.auth.jwt_secret = TEST_JWT_SECRET.to_string();
    settings
}

/// Register a user with a generated name
pub async fn seed_user(services: &ServiceFactory, id: i64) -> User {
    let name: String = Name().fake();
    let identity = UserIdentity {
        id,
        name,
        email: format!("user{id}@example.com"),
    };
    services.user_service.ensure_user(&identity).await.expect("Failed to seed user")
}

/// Signed bearer header value for the user
pub fn bearer(services: &ServiceFactory, user_id: i64) -> String {
    let token = services
        .auth_service
        .issue(user_id, None, None, Duration::minutes(10))
        .expect("Failed to issue token");
    format!("Bearer {token}")
}

pub fn restaurant_request(name: &str, lat: f64, lng: f64) -> RegisterRestaurantRequest {
    RegisterRestaurantRequest {
        name: name.to_string(),
        category: RestaurantCategory::Korean,
        address: "17 Jongno 3-gil, Seoul".to_string(),
        lat,
        lng,
        description: "Grilled pork and stew".to_string(),
        phone_number: "02-123-4567".to_string(),
        opening_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
        closing_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
        last_order_time: NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
        tags: vec!["bbq".to_string(), "Late Night".to_string()],
        photo_urls: vec!["https://cdn.example.com/a.jpg".to_string()],
    }
}

/// A baropot a week from now
pub fn baropot_request(restaurant_id: i64, max_participants: i32) -> CreateBaropotRequest {
    let date = Local::now().date_naive() + Duration::days(7);
    CreateBaropotRequest {
        restaurant_id,
        title: "Friday gopchang".to_string(),
        location: "Jongno 3-ga station exit 4".to_string(),
        max_participants,
        date: date.format("%Y-%m-%d").to_string(),
        time: "19:00".to_string(),
        participant_gender: Default::default(),
        participant_age_group: Default::default(),
        contact_method: None,
        estimated_cost_per_person: Some(25000),
        payment_method: Default::default(),
        description: "Let's eat".to_string(),
        rule: None,
        tags: vec!["gopchang".to_string()],
    }
}
