//! Query-string parsing for the listing endpoints
//!
//! Lists may be given as repeated keys (`tags=a&tags=b`), bracketed keys
//! (`tags[]=a`) or comma-separated values (`tags=a,b`).

use std::str::FromStr;

use crate::models::baropot::{BaropotStatus, FindBaropotsQuery};
use crate::models::restaurant::FindRestaurantsQuery;
use crate::utils::errors::{BaropotError, Result};
use crate::utils::helpers::split_csv;

/// Raw query pairs in request order
#[derive(Debug, Clone, Default)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }

    fn matches(name: &str, key: &str) -> bool {
        name == key || name.strip_suffix("[]") == Some(key)
    }

    /// Last non-empty value for `key`
    pub fn get(&self, key: &str) -> Option<String> {
        self.0
            .iter()
            .rev()
            .find(|(name, value)| Self::matches(name, key) && !value.trim().is_empty())
            .map(|(_, value)| value.trim().to_string())
    }

    /// Every value for `key`, with comma-separated values split
    pub fn list(&self, key: &str) -> Vec<String> {
        self.0
            .iter()
            .filter(|(name, _)| Self::matches(name, key))
            .flat_map(|(_, value)| split_csv(Some(value)))
            .collect()
    }

    pub fn parse<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
    {
        self.get(key)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|_| BaropotError::validation(format!("invalid value for {key}: {raw}")))
            })
            .transpose()
    }

    pub fn parse_list<T>(&self, key: &str) -> Result<Vec<T>>
    where
        T: FromStr<Err = BaropotError>,
    {
        self.list(key).iter().map(|raw| raw.parse::<T>()).collect()
    }
}

/// `GET /restaurants` filters
pub fn restaurant_query(params: &QueryParams) -> Result<FindRestaurantsQuery> {
    Ok(FindRestaurantsQuery {
        name: params.get("name"),
        categories: params.parse_list("category")?,
        address: params.get("address"),
        lat: params.parse("lat")?,
        lng: params.parse("lng")?,
        radius_km: params.parse("radius")?,
    })
}

/// `GET /baropots` filters; `default_statuses` applies when `statusList` is absent
pub fn baropot_query(params: &QueryParams, default_statuses: &[BaropotStatus]) -> Result<FindBaropotsQuery> {
    let statuses = params.parse_list("statusList")?;

    Ok(FindBaropotsQuery {
        statuses: if statuses.is_empty() { default_statuses.to_vec() } else { statuses },
        title: params.get("title"),
        tags: params.list("tags"),
        genders: params.parse_list("participantGenderList")?,
        age_groups: params.parse_list("participantAgeGroupList")?,
        restaurant_name: params.get("restaurantName"),
        restaurant_category: params.parse("restaurantCategory")?,
        address: params.get("address"),
        lat: params.parse("lat")?,
        lng: params.parse("lng")?,
        radius_km: params.parse("radius")?,
        participant_user_id: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::baropot::ParticipantGender;
    use crate::models::restaurant::RestaurantCategory;
    use assert_matches::assert_matches;

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        QueryParams::new(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }

    #[test]
    fn test_lists_accept_repeated_bracketed_and_csv() {
        let p = params(&[("tags", "bbq,noodles"), ("tags", "soju"), ("tags[]", "late night")]);
        assert_eq!(p.list("tags"), vec!["bbq", "noodles", "soju", "late night"]);
    }

    #[test]
    fn test_baropot_query_defaults_to_open() {
        let query = baropot_query(&params(&[]), &[BaropotStatus::Open]).unwrap();
        assert_eq!(query.statuses, vec![BaropotStatus::Open]);
        assert!(query.near().is_none());

        let query = baropot_query(
            &params(&[("statusList", "OPEN,FULL"), ("participantGenderList", "female"), ("lat", "37.5"), ("lng", "127.0")]),
            &[BaropotStatus::Open],
        )
        .unwrap();
        assert_eq!(query.statuses, vec![BaropotStatus::Open, BaropotStatus::Full]);
        assert_eq!(query.genders, vec![ParticipantGender::Female]);
        assert_eq!(query.near(), Some((37.5, 127.0)));
    }

    #[test]
    fn test_invalid_values_are_validation_errors() {
        assert_matches!(
            baropot_query(&params(&[("statusList", "SOMEDAY")]), &[]),
            Err(BaropotError::Validation(_))
        );
        assert_matches!(
            restaurant_query(&params(&[("lat", "north")])),
            Err(BaropotError::Validation(_))
        );
    }

    #[test]
    fn test_restaurant_query() {
        let query = restaurant_query(&params(&[("name", " Han "), ("category", "KOREAN"), ("radius", "3")])).unwrap();
        assert_eq!(query.name.as_deref(), Some("Han"));
        assert_eq!(query.categories, vec![RestaurantCategory::Korean]);
        assert_eq!(query.radius_km, Some(3.0));
        assert!(query.address.is_none());
    }
}
