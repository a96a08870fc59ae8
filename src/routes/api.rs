// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes. Every handler forwards the caller's Strava token.

use crate::error::{AppError, DegradeOnRateLimit, FetchError, Result};
use crate::models::activity::{ActivityFrame, ActivityRow};
use crate::models::load::{LoadTable, Resolution};
use crate::models::profile::{Profile, StatsTable};
use crate::models::stream::{ActivityStream, StreamKey};
use crate::services::fetcher::AccessToken;
use crate::services::heatmap::{build_heatmap, Heatmap};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Upper bound on ids accepted by the stream endpoints.
const MAX_STREAM_IDS: usize = 200;

/// Activities drawn on the heatmap when no ids are given.
pub const HEATMAP_DEFAULT_ACTIVITIES: usize = 50;

/// API routes (require a bearer token).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/profile", get(get_profile))
        .route("/api/athletes/{id}/stats", get(get_stats))
        .route("/api/activities", get(get_activities))
        .route("/api/training-load", get(get_training_load))
        .route("/api/streams", get(get_streams))
        .route("/api/heatmap", get(get_heatmap))
}

/// Response envelope for data that may be unavailable.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ApiData<T> {
    pub available: bool,
    /// Strava kept rate limiting until the retry budget ran out
    pub degraded: bool,
    pub data: Option<T>,
}

impl<T> ApiData<T> {
    fn from_fetch(result: std::result::Result<Option<T>, FetchError>) -> Result<Self> {
        let degraded = matches!(&result, Err(e) if e.is_rate_limited());
        let data = result.or_unavailable()?;
        Ok(Self {
            available: data.is_some(),
            degraded,
            data,
        })
    }
}

// ─── Profile ─────────────────────────────────────────────────

async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<AccessToken>,
) -> Result<Json<ApiData<Profile>>> {
    let result = state.profiles.get_profile(&token).await;
    Ok(Json(ApiData::from_fetch(result)?))
}

async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<AccessToken>,
    Path(athlete_id): Path<u64>,
) -> Result<Json<ApiData<StatsTable>>> {
    let result = state
        .profiles
        .get_year_to_date_stats(&token, athlete_id)
        .await;
    Ok(Json(ApiData::from_fetch(result)?))
}

// ─── Activities ──────────────────────────────────────────────

/// Full history as an activity frame, or `None` when rate limited.
async fn load_frame(
    state: &AppState,
    token: &AccessToken,
) -> std::result::Result<Option<ActivityFrame>, FetchError> {
    let activities = state.activities.list_activities(token).await?;
    Ok(Some(ActivityFrame::from_activities(&activities)))
}

async fn get_activities(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<AccessToken>,
) -> Result<Json<ApiData<Vec<ActivityRow>>>> {
    let result = load_frame(&state, &token).await;
    let response = ApiData::from_fetch(result.map(|frame| frame.map(|f| f.rows().to_vec())))?;
    Ok(Json(response))
}

// ─── Training Load ───────────────────────────────────────────

#[derive(Deserialize)]
struct TrainingLoadQuery {
    #[serde(default)]
    resolution: Option<String>,
}

fn parse_resolution(raw: Option<&str>) -> Result<Resolution> {
    match raw.map(str::trim) {
        None | Some("") | Some("daily") => Ok(Resolution::Daily),
        Some("weekly") => Ok(Resolution::Weekly),
        Some("monthly") => Ok(Resolution::Monthly),
        Some(other) => Err(AppError::BadRequest(format!(
            "Invalid 'resolution' parameter '{}': expected daily, weekly or monthly",
            other
        ))),
    }
}

async fn get_training_load(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<AccessToken>,
    Query(params): Query<TrainingLoadQuery>,
) -> Result<Json<ApiData<LoadTable>>> {
    let resolution = parse_resolution(params.resolution.as_deref())?;

    let listing = ApiData::from_fetch(load_frame(&state, &token).await)?;
    let Some(frame) = listing.data else {
        return Ok(Json(ApiData {
            available: false,
            degraded: listing.degraded,
            data: None,
        }));
    };

    let table = state.deriver.derive(&frame, resolution)?;
    Ok(Json(ApiData {
        available: true,
        degraded: false,
        data: Some(table),
    }))
}

// ─── Streams & Heatmap ───────────────────────────────────────

#[derive(Deserialize)]
struct StreamsQuery {
    /// Comma-separated activity ids
    ids: String,
    #[serde(default)]
    key: Option<String>,
}

fn parse_ids(raw: &str) -> Result<Vec<u64>> {
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u64>().map_err(|_| {
                AppError::BadRequest(format!("Invalid activity id '{}' in 'ids'", part))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if ids.is_empty() {
        return Err(AppError::BadRequest(
            "'ids' must list at least one activity id".to_string(),
        ));
    }
    if ids.len() > MAX_STREAM_IDS {
        return Err(AppError::BadRequest(format!(
            "At most {} activity ids are allowed",
            MAX_STREAM_IDS
        )));
    }
    Ok(ids)
}

async fn get_streams(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<AccessToken>,
    Query(params): Query<StreamsQuery>,
) -> Result<Json<ApiData<Vec<Option<ActivityStream>>>>> {
    let ids = parse_ids(&params.ids)?;
    let key = match params.key.as_deref() {
        None => StreamKey::Latlng,
        Some(raw) => raw.parse::<StreamKey>().map_err(AppError::BadRequest)?,
    };

    let batch = state.activities.fetch_streams(&token, &ids, key).await;
    Ok(Json(ApiData {
        available: batch.available() > 0,
        degraded: batch.is_degraded(),
        data: Some(batch.streams),
    }))
}

#[derive(Deserialize)]
struct HeatmapQuery {
    /// Comma-separated activity ids; defaults to the most recent activities
    #[serde(default)]
    ids: Option<String>,
}

/// Ids of the first [`HEATMAP_DEFAULT_ACTIVITIES`] listed activities.
async fn recent_activity_ids(
    state: &AppState,
    token: &AccessToken,
) -> std::result::Result<Option<Vec<u64>>, FetchError> {
    let activities = state.activities.list_activities(token).await?;
    Ok(Some(
        activities
            .iter()
            .take(HEATMAP_DEFAULT_ACTIVITIES)
            .map(|activity| activity.id)
            .collect(),
    ))
}

async fn get_heatmap(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<AccessToken>,
    Query(params): Query<HeatmapQuery>,
) -> Result<Json<ApiData<Heatmap>>> {
    let ids = match params.ids.as_deref() {
        Some(raw) => parse_ids(raw)?,
        None => {
            let listing = ApiData::from_fetch(recent_activity_ids(&state, &token).await)?;
            let Some(ids) = listing.data else {
                return Ok(Json(ApiData {
                    available: false,
                    degraded: listing.degraded,
                    data: None,
                }));
            };
            ids
        }
    };

    let batch = state
        .activities
        .fetch_streams(&token, &ids, StreamKey::Latlng)
        .await;

    let heatmap = build_heatmap(&batch.streams);
    tracing::debug!(
        requested = ids.len(),
        tracks = heatmap.track_count(),
        skipped = heatmap.skipped,
        rate_limited = batch.rate_limited,
        "Built heatmap"
    );

    Ok(Json(ApiData {
        available: heatmap.track_count() > 0,
        degraded: batch.is_degraded(),
        data: Some(heatmap),
    }))
}
