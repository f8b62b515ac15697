//! Nearby-activities feed: a stateless read path over activity fields.
//! Coarse bounding-box prefilter in SQL, exact haversine cut and sort in
//! Rust. Reads activities only, never the participation ledger.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::database::activities_repo;
use crate::error::Result;
use crate::models::ActivityRow;

const MAX_FEED_ROWS: i64 = 200;
const DEFAULT_RADIUS_KM: i64 = 25;

#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lon: f64,
    pub radius_km: Option<i64>,
    pub category: Option<String>,
    pub hide_full: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ActivitySummary {
    pub activity_id: String,
    pub title: String,
    pub category: Option<String>,
    pub total_spots: i64,
    pub accepted_count: i64,
    pub available_spots: i64,
    pub status: String,
    pub distance_km: f64,
}

pub async fn nearby(pool: &SqlitePool, query: &NearbyQuery) -> Result<Vec<ActivitySummary>> {
    let radius_km = query.radius_km.unwrap_or(DEFAULT_RADIUS_KM).clamp(1, 500) as f64;
    let bbox = bounding_box(query.lat, query.lon, radius_km);
    let rows = activities_repo::list_open_in_bbox(pool, bbox, MAX_FEED_ROWS).await?;

    let category_filter = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let hide_full = query.hide_full.unwrap_or(false);

    let mut summaries = Vec::new();
    for row in rows {
        let (Some(lat), Some(lon)) = (row.latitude, row.longitude) else {
            continue;
        };
        let distance_km = haversine_km(query.lat, query.lon, lat, lon);
        if distance_km > radius_km {
            continue;
        }
        if let Some(wanted) = category_filter {
            let matches = row
                .category
                .as_deref()
                .is_some_and(|c| c.trim().eq_ignore_ascii_case(wanted));
            if !matches {
                continue;
            }
        }
        if hide_full && row.accepted_count >= row.total_spots {
            continue;
        }
        summaries.push(to_summary(row, distance_km));
    }

    summaries.sort_by(|a, b| {
        a.distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(summaries)
}

fn to_summary(row: ActivityRow, distance_km: f64) -> ActivitySummary {
    let available_spots = row.available_spots();
    ActivitySummary {
        activity_id: row.activity_id,
        title: row.title,
        category: row.category,
        total_spots: row.total_spots,
        accepted_count: row.accepted_count,
        available_spots,
        status: row.status,
        distance_km,
    }
}

fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let to_rad = |deg: f64| deg.to_radians();
    let dlat = to_rad(lat2 - lat1);
    let dlon = to_rad(lon2 - lon1);
    let a = (dlat / 2.0).sin().powi(2)
        + to_rad(lat1).cos() * to_rad(lat2).cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    6371.0 * c
}

fn bounding_box(lat: f64, lon: f64, radius_km: f64) -> (f64, f64, f64, f64) {
    let lat_change = radius_km / 111.0;
    let lat_rad = lat.to_radians();
    let lon_change = (radius_km / 111.0) / lat_rad.cos().abs();

    (
        lat - lat_change,
        lat + lat_change,
        lon - lon_change,
        lon + lon_change,
    )
}

#[cfg(test)]
mod tests {
    use super::{bounding_box, haversine_km};

    #[test]
    fn haversine_amsterdam_to_utrecht() {
        // Roughly 35km as the crow flies.
        let d = haversine_km(52.3676, 4.9041, 52.0907, 5.1214);
        assert!((30.0..40.0).contains(&d), "distance was {d}");
    }

    #[test]
    fn haversine_zero_for_same_point() {
        let d = haversine_km(52.0, 5.0, 52.0, 5.0);
        assert!(d.abs() < 1e-9);
    }

    #[test]
    fn bounding_box_contains_center() {
        let (min_lat, max_lat, min_lon, max_lon) = bounding_box(52.0, 5.0, 10.0);
        assert!(min_lat < 52.0 && 52.0 < max_lat);
        assert!(min_lon < 5.0 && 5.0 < max_lon);
    }
}
