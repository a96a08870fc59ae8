// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity history and per-activity stream retrieval.

use crate::error::FetchError;
use crate::models::activity::Activity;
use crate::models::stream::{ActivityStream, RawStream, StreamKey};
use crate::services::fetcher::{
    decode_payload, is_empty_payload, AccessToken, ApiRequest, RateLimitedFetcher,
};
use futures_util::{stream, StreamExt};
use std::sync::Arc;

/// Page size for `GET /athlete/activities` (Strava's maximum).
pub const ACTIVITIES_PAGE_SIZE: u32 = 200;

const ACTIVITIES_PATH: &str = "/athlete/activities";

/// Streams fetched for a batch of ids, in request order.
#[derive(Debug, Clone, Default)]
pub struct StreamBatch {
    pub streams: Vec<Option<ActivityStream>>,
    /// Ids whose stream was lost to an exhausted rate-limit budget
    pub rate_limited: usize,
}

impl StreamBatch {
    pub fn is_degraded(&self) -> bool {
        self.rate_limited > 0
    }

    pub fn available(&self) -> usize {
        self.streams.iter().filter(|s| s.is_some()).count()
    }
}

/// Reads an athlete's activities and streams through the rate-limited fetcher.
#[derive(Clone)]
pub struct ActivityRepository {
    fetcher: Arc<RateLimitedFetcher>,
    page_size: u32,
    stream_concurrency: usize,
}

impl ActivityRepository {
    pub fn new(fetcher: Arc<RateLimitedFetcher>) -> Self {
        Self {
            fetcher,
            page_size: ACTIVITIES_PAGE_SIZE,
            stream_concurrency: 1,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Number of stream requests kept in flight by [`fetch_streams`](Self::fetch_streams).
    pub fn with_stream_concurrency(mut self, concurrency: usize) -> Self {
        self.stream_concurrency = concurrency.max(1);
        self
    }

    /// Fetch the complete activity history, page by page, until an empty
    /// page is returned.
    pub async fn list_activities(&self, token: &AccessToken) -> Result<Vec<Activity>, FetchError> {
        let mut activities = Vec::new();
        let mut page: u32 = 1;

        loop {
            let request = ApiRequest::standard(ACTIVITIES_PATH)
                .with_query("per_page", self.page_size)
                .with_query("page", page);
            let payload = self.fetcher.fetch(token, &request).await?;

            let batch: Vec<Activity> = if payload.is_null() {
                Vec::new()
            } else {
                decode_payload(ACTIVITIES_PATH, payload)?
            };

            if batch.is_empty() {
                break;
            }

            tracing::debug!(page, count = batch.len(), "Fetched activity page");
            activities.extend(batch);
            page += 1;
        }

        tracing::info!(
            total = activities.len(),
            pages = page - 1,
            "Fetched activity history"
        );
        Ok(activities)
    }

    /// Fetch one named stream. `None` when the activity has no such stream.
    pub async fn fetch_stream(
        &self,
        token: &AccessToken,
        activity_id: u64,
        key: StreamKey,
    ) -> Result<Option<ActivityStream>, FetchError> {
        let path = format!("/activities/{}/streams", activity_id);
        let request = ApiRequest::stream(path.as_str())
            .with_query("keys", key)
            .with_query("key_by_type", true);

        let mut payload = self.fetcher.fetch(token, &request).await?;
        if is_empty_payload(&payload) {
            tracing::debug!(activity_id, stream = %key, "Empty stream response");
            return Ok(None);
        }

        let Some(entry) = payload.get_mut(key.as_str()).map(serde_json::Value::take) else {
            tracing::debug!(activity_id, stream = %key, "Stream not available");
            return Ok(None);
        };

        let raw: RawStream = decode_payload(&path, entry)?;
        Ok(Some(ActivityStream::from_raw(activity_id, key, raw)))
    }

    /// Fetch `key` for every id, returning one entry per id in input order.
    ///
    /// A failed id becomes `None` and does not abort the batch. Ids lost to
    /// rate limiting are counted so callers can report degraded data.
    pub async fn fetch_streams(
        &self,
        token: &AccessToken,
        activity_ids: &[u64],
        key: StreamKey,
    ) -> StreamBatch {
        let results: Vec<Result<Option<ActivityStream>, FetchError>> =
            stream::iter(activity_ids.iter().copied())
                .map(|activity_id| self.fetch_stream(token, activity_id, key))
                .buffered(self.stream_concurrency)
                .collect()
                .await;

        let mut batch = StreamBatch::default();
        for (result, activity_id) in results.into_iter().zip(activity_ids.iter().copied()) {
            let stream = match result {
                Ok(stream) => stream,
                Err(e) => {
                    if e.is_rate_limited() {
                        batch.rate_limited += 1;
                    }
                    tracing::warn!(
                        activity_id,
                        stream = %key,
                        error = %e,
                        "Failed to fetch stream, treating as unavailable"
                    );
                    None
                }
            };
            batch.streams.push(stream);
        }

        tracing::info!(
            requested = activity_ids.len(),
            available = batch.available(),
            rate_limited = batch.rate_limited,
            stream = %key,
            "Fetched activity streams"
        );
        batch
    }
}
