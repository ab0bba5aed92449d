//! Restaurant service implementation
//!
//! Registration, owner-only edits and the listing with near-me search.

use tracing::{debug, info};
use crate::config::SearchConfig;
use crate::database::DatabaseService;
use crate::models::restaurant::{
    FindRestaurantsQuery, RegisterRestaurantRequest, Restaurant, RestaurantView, UpdateRestaurantRequest,
};
use crate::utils::errors::{BaropotError, Result};
use crate::utils::helpers::{is_valid_phone, normalize_tags, normalize_whitespace};
use crate::utils::location::{bounding_box, effective_radius, haversine_km, validate_coordinates};

#[derive(Clone)]
pub struct RestaurantService {
    db: DatabaseService,
    search: SearchConfig,
}

impl RestaurantService {
    pub fn new(db: DatabaseService, search: SearchConfig) -> Self {
        Self { db, search }
    }

    /// Register a restaurant with its tags and photos
    pub async fn register(&self, owner_id: i64, mut request: RegisterRestaurantRequest) -> Result<RestaurantView> {
        request.name = normalize_whitespace(&request.name);
        request.address = normalize_whitespace(&request.address);
        if request.name.is_empty() || request.address.is_empty() {
            return Err(BaropotError::validation("name and address are required"));
        }
        validate_coordinates(request.lat, request.lng)?;
        validate_phone(&request.phone_number)?;
        let tags = normalize_tags(&request.tags);

        let mut tx = self.db.begin().await?;
        let restaurant = self.db.restaurants.create(&mut tx, owner_id, &request).await?;
        self.db.restaurant_tags.replace(&mut tx, restaurant.id, &tags).await?;
        self.db.restaurants.replace_photos(&mut tx, restaurant.id, &request.photo_urls).await?;
        tx.commit().await?;

        info!(restaurant_id = restaurant.id, owner_id = owner_id, "Restaurant registered");
        self.find_one(restaurant.id, Some(owner_id)).await
    }

    /// List restaurants; near-me results are sorted by distance and cut at the radius
    pub async fn find_all(&self, query: &FindRestaurantsQuery, viewer_id: Option<i64>) -> Result<Vec<RestaurantView>> {
        let Some((lat, lng)) = query.near() else {
            let restaurants = self.db.restaurants.search(query, None).await?;
            let pairs = restaurants.into_iter().map(|r| (r, None)).collect();
            return self.decorate(pairs, viewer_id).await;
        };

        validate_coordinates(lat, lng)?;
        let radius = effective_radius(query.radius_km, &self.search);
        let candidates = self.db.restaurants.search(query, Some(bounding_box(lat, lng, radius))).await?;
        debug!(candidates = candidates.len(), radius_km = radius, "Near-me prefilter done");

        let ranked = rank_by_distance(candidates, lat, lng, radius)
            .into_iter()
            .map(|(r, d)| (r, Some(d)))
            .collect();
        self.decorate(ranked, viewer_id).await
    }

    pub async fn find_one(&self, restaurant_id: i64, viewer_id: Option<i64>) -> Result<RestaurantView> {
        let restaurant = self.get(restaurant_id).await?;
        let mut views = self.decorate(vec![(restaurant, None)], viewer_id).await?;
        views.pop().ok_or_else(|| BaropotError::not_found("Restaurant", restaurant_id))
    }

    /// Owner-only update; tags and photos are replaced when present
    pub async fn update(&self, owner_id: i64, restaurant_id: i64, request: UpdateRestaurantRequest) -> Result<RestaurantView> {
        let current = self.get(restaurant_id).await?;
        ensure_owner(&current, owner_id)?;
        validate_coordinates(request.lat.unwrap_or(current.lat), request.lng.unwrap_or(current.lng))?;
        if let Some(phone) = &request.phone_number {
            validate_phone(phone)?;
        }

        let mut tx = self.db.begin().await?;
        self.db.restaurants.update(&mut tx, restaurant_id, &request).await?;
        if let Some(tags) = &request.tags {
            self.db.restaurant_tags.replace(&mut tx, restaurant_id, &normalize_tags(tags)).await?;
        }
        if let Some(photos) = &request.photo_urls {
            self.db.restaurants.replace_photos(&mut tx, restaurant_id, photos).await?;
        }
        tx.commit().await?;

        info!(restaurant_id = restaurant_id, owner_id = owner_id, "Restaurant updated");
        self.find_one(restaurant_id, Some(owner_id)).await
    }

    /// Owner-only delete
    pub async fn delete(&self, owner_id: i64, restaurant_id: i64) -> Result<()> {
        let current = self.get(restaurant_id).await?;
        ensure_owner(&current, owner_id)?;

        self.db.restaurants.delete(restaurant_id).await?;
        info!(restaurant_id = restaurant_id, owner_id = owner_id, "Restaurant deleted");
        Ok(())
    }

    async fn get(&self, restaurant_id: i64) -> Result<Restaurant> {
        self.db
            .restaurants
            .find_by_id(restaurant_id)
            .await?
            .ok_or_else(|| BaropotError::not_found("Restaurant", restaurant_id))
    }

    /// Attach tags, photos and bookmark info to bare rows
    pub(crate) async fn decorate(&self, rows: Vec<(Restaurant, Option<f64>)>, viewer_id: Option<i64>) -> Result<Vec<RestaurantView>> {
        if rows.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<i64> = rows.iter().map(|(r, _)| r.id).collect();
        let mut tags = self.db.restaurant_tags.names_for(&ids).await?;
        let mut photos = self.db.restaurants.photos_for(&ids).await?;
        let counts = self.db.restaurants.bookmark_counts(&ids).await?;
        let bookmarked = match viewer_id {
            Some(user_id) => self.db.restaurants.bookmarked_by(user_id, &ids).await?,
            None => Default::default(),
        };

        Ok(rows
            .into_iter()
            .map(|(restaurant, distance_km)| {
                let id = restaurant.id;
                RestaurantView {
                    tags: tags.remove(&id).unwrap_or_default(),
                    photo_urls: photos.remove(&id).unwrap_or_default(),
                    bookmark_count: counts.get(&id).copied().unwrap_or(0),
                    is_bookmarked: bookmarked.contains(&id),
                    distance_km,
                    restaurant,
                }
            })
            .collect())
    }
}

fn ensure_owner(restaurant: &Restaurant, user_id: i64) -> Result<()> {
    if restaurant.owner_id != user_id {
        return Err(BaropotError::forbidden(format!(
            "only the owner may modify restaurant {}",
            restaurant.id
        )));
    }
    Ok(())
}

/// Phone numbers are optional; when given they must look like one
fn validate_phone(phone: &str) -> Result<()> {
    if !phone.is_empty() && !is_valid_phone(phone) {
        return Err(BaropotError::validation(format!("invalid phone number: {phone}")));
    }
    Ok(())
}

/// Exact distances for prefiltered rows, dropping those beyond the radius, nearest first
pub fn rank_by_distance(restaurants: Vec<Restaurant>, lat: f64, lng: f64, radius_km: f64) -> Vec<(Restaurant, f64)> {
    let mut ranked: Vec<(Restaurant, f64)> = restaurants
        .into_iter()
        .map(|r| {
            let distance = haversine_km(lat, lng, r.lat, r.lng);
            (r, distance)
        })
        .filter(|(_, distance)| *distance <= radius_km)
        .collect();

    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::restaurant::RestaurantCategory;
    use chrono::{NaiveTime, Utc};

    fn restaurant(id: i64, lat: f64, lng: f64) -> Restaurant {
        Restaurant {
            id,
            owner_id: 1,
            name: format!("place {id}"),
            category: RestaurantCategory::Korean,
            address: "Seoul".to_string(),
            lat,
            lng,
            description: String::new(),
            phone_number: String::new(),
            opening_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            closing_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            last_order_time: NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_rank_by_distance_sorts_and_cuts() {
        let origin = (37.5665, 126.9780);
        let rows = vec![
            restaurant(1, 37.6000, 126.9780),  // ~3.7 km north
            restaurant(2, 37.5700, 126.9780),  // ~0.4 km
            restaurant(3, 37.5665, 127.2000),  // ~19.6 km east
        ];

        let ranked = rank_by_distance(rows, origin.0, origin.1, 10.0);
        let ids: Vec<i64> = ranked.iter().map(|(r, _)| r.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert!(ranked[0].1 < ranked[1].1);
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("").is_ok());
        assert!(validate_phone("02-123-4567").is_ok());
        assert_matches::assert_matches!(validate_phone("call me"), Err(BaropotError::Validation(_)));
    }

    #[test]
    fn test_ensure_owner() {
        let r = restaurant(1, 0.0, 0.0);
        assert!(ensure_owner(&r, 1).is_ok());
        assert!(matches!(ensure_owner(&r, 2), Err(BaropotError::Forbidden(_))));
    }
}
