//! Restaurant and bookmark models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveTime, Utc};
use sqlx::FromRow;

use crate::utils::helpers::hh_mm;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "restaurant_category", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RestaurantCategory {
    Korean,
    Japanese,
    Chinese,
    Asian,
    Western,
    Mexican,
    Cafe,
    Dessert,
    Bar,
    Buffet,
    Fusion,
    Vegan,
    FastFood,
}

labelled_enum!(RestaurantCategory {
    Korean => "KOREAN",
    Japanese => "JAPANESE",
    Chinese => "CHINESE",
    Asian => "ASIAN",
    Western => "WESTERN",
    Mexican => "MEXICAN",
    Cafe => "CAFE",
    Dessert => "DESSERT",
    Bar => "BAR",
    Buffet => "BUFFET",
    Fusion => "FUSION",
    Vegan => "VEGAN",
    FastFood => "FAST_FOOD",
});

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub category: RestaurantCategory,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub description: String,
    pub phone_number: String,
    #[serde(with = "hh_mm")]
    pub opening_time: NaiveTime,
    #[serde(with = "hh_mm")]
    pub closing_time: NaiveTime,
    #[serde(with = "hh_mm")]
    pub last_order_time: NaiveTime,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Restaurant as returned by list and detail endpoints
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantView {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub tags: Vec<String>,
    pub photo_urls: Vec<String>,
    pub bookmark_count: i64,
    pub is_bookmarked: bool,
    /// Present only for near-me searches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRestaurantRequest {
    pub name: String,
    pub category: RestaurantCategory,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(with = "hh_mm")]
    pub opening_time: NaiveTime,
    #[serde(with = "hh_mm")]
    pub closing_time: NaiveTime,
    #[serde(with = "hh_mm")]
    pub last_order_time: NaiveTime,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub photo_urls: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRestaurantRequest {
    pub name: Option<String>,
    pub category: Option<RestaurantCategory>,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub description: Option<String>,
    pub phone_number: Option<String>,
    #[serde(default, with = "hh_mm::option")]
    pub opening_time: Option<NaiveTime>,
    #[serde(default, with = "hh_mm::option")]
    pub closing_time: Option<NaiveTime>,
    #[serde(default, with = "hh_mm::option")]
    pub last_order_time: Option<NaiveTime>,
    /// Replaces the full tag set when present
    pub tags: Option<Vec<String>>,
    /// Replaces the full photo set when present
    pub photo_urls: Option<Vec<String>>,
}

/// Filters for the restaurant listing
#[derive(Debug, Clone, Default)]
pub struct FindRestaurantsQuery {
    pub name: Option<String>,
    pub categories: Vec<RestaurantCategory>,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius_km: Option<f64>,
}

impl FindRestaurantsQuery {
    /// Both coordinates are needed for a near-me search
    pub fn near(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lng)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: i64,
    pub user_id: i64,
    pub restaurant_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Tag row shared by restaurant and baropot tag tables
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}
