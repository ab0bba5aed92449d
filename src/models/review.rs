//! Restaurant review models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Review row joined with its author
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    pub restaurant_id: i64,
    pub rating: i32,
    pub content: String,
    pub user_id: i64,
    pub user_name: String,
    pub user_email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    #[serde(flatten)]
    pub review: Review,
    pub photos: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub rating: i32,
    pub content: String,
    #[serde(default)]
    pub photos: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    pub rating: Option<i32>,
    pub content: Option<String>,
    /// Replaces the full photo set when present
    pub photos: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_flattens_author() {
        let view = ReviewView {
            review: Review {
                id: 1,
                restaurant_id: 2,
                rating: 5,
                content: "Great broth".to_string(),
                user_id: 3,
                user_name: "Kim".to_string(),
                user_email: "kim@example.com".to_string(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            photos: vec!["https://cdn.example.com/r.jpg".to_string()],
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["userName"], "Kim");
        assert_eq!(json["userEmail"], "kim@example.com");
        assert_eq!(json["photos"][0], "https://cdn.example.com/r.jpg");
    }

    #[test]
    fn test_update_fields_are_optional() {
        let request: UpdateReviewRequest = serde_json::from_str(r#"{"rating": 4}"#).unwrap();
        assert_eq!(request.rating, Some(4));
        assert!(request.content.is_none());
        assert!(request.photos.is_none());
    }
}
