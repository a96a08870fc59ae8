// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Athlete profile and year-to-date stats.

use crate::error::FetchError;
use crate::models::profile::{Profile, StatsTable, YearToDateStats};
use crate::services::fetcher::{
    decode_payload, is_empty_payload, AccessToken, ApiRequest, RateLimitedFetcher,
};
use std::sync::Arc;

const ATHLETE_PATH: &str = "/athlete";

#[derive(Clone)]
pub struct ProfileService {
    fetcher: Arc<RateLimitedFetcher>,
}

impl ProfileService {
    pub fn new(fetcher: Arc<RateLimitedFetcher>) -> Self {
        Self { fetcher }
    }

    /// Get the authenticated athlete's profile. `None` on an empty body.
    pub async fn get_profile(&self, token: &AccessToken) -> Result<Option<Profile>, FetchError> {
        let payload = self
            .fetcher
            .fetch(token, &ApiRequest::standard(ATHLETE_PATH))
            .await?;
        if is_empty_payload(&payload) {
            return Ok(None);
        }
        decode_payload(ATHLETE_PATH, payload).map(Some)
    }

    /// Get year-to-date ride / run / swim totals as a display table.
    pub async fn get_year_to_date_stats(
        &self,
        token: &AccessToken,
        athlete_id: u64,
    ) -> Result<Option<StatsTable>, FetchError> {
        let path = format!("/athletes/{}/stats", athlete_id);
        let payload = self
            .fetcher
            .fetch(token, &ApiRequest::standard(path.as_str()))
            .await?;
        if is_empty_payload(&payload) {
            return Ok(None);
        }

        let stats: YearToDateStats = decode_payload(&path, payload)?;
        Ok(Some(StatsTable::from(&stats)))
    }
}
