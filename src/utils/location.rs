//! Geographic helpers for near-me search

use crate::utils::errors::{BaropotError, Result};

/// Kilometres per degree of latitude
const KM_PER_DEGREE: f64 = 111.0;

/// Mean earth radius in kilometres
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Axis-aligned coordinate window used as a cheap SQL prefilter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lng >= self.min_lng && lng <= self.max_lng
    }

    /// Whether the longitude window was widened to the whole globe
    pub fn spans_all_longitudes(&self) -> bool {
        self.min_lng <= -180.0 && self.max_lng >= 180.0
    }
}

/// Reject coordinates outside the WGS84 range; NaN never lies inside it
pub fn validate_coordinates(lat: f64, lng: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(BaropotError::validation(format!("coordinates out of range: {lat}, {lng}")));
    }
    Ok(())
}

/// Compute the bounding box of a circle of `radius_km` around a point.
///
/// Longitude span is widened by `1 / cos(lat)`. Latitude is clamped to the
/// poles; a window that would cross the antimeridian (or reach a pole) covers
/// every longitude, so the BETWEEN prefilter never drops the far side.
pub fn bounding_box(lat: f64, lng: f64, radius_km: f64) -> BoundingBox {
    let lat_delta = radius_km / KM_PER_DEGREE;
    let min_lat = (lat - lat_delta).max(-90.0);
    let max_lat = (lat + lat_delta).min(90.0);

    let cos = lat.to_radians().cos();
    let lng_delta = if cos > f64::EPSILON {
        radius_km / (KM_PER_DEGREE * cos)
    } else {
        f64::INFINITY
    };

    let (min_lng, max_lng) = if min_lat <= -90.0
        || max_lat >= 90.0
        || lng - lng_delta < -180.0
        || lng + lng_delta > 180.0
    {
        (-180.0, 180.0)
    } else {
        (lng - lng_delta, lng + lng_delta)
    };

    BoundingBox { min_lat, max_lat, min_lng, max_lng }
}

/// Great-circle distance in kilometres, rounded to two decimals
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    (EARTH_RADIUS_KM * c * 100.0).round() / 100.0
}

/// Clamp a requested radius into the configured window, falling back to the default
pub fn effective_radius(requested: Option<f64>, config: &crate::config::SearchConfig) -> f64 {
    match requested {
        Some(r) if r.is_finite() => r.clamp(config.min_radius_km, config.max_radius_km),
        _ => config.default_radius_km,
    }
}
