// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! PMC-Tracker: performance management charts from Strava history
//!
//! This crate fetches an athlete's profile, activities and GPS streams from
//! the Strava API (retrying through rate limits) and derives daily, weekly
//! and monthly training load tables.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::fetcher::HttpTransport;
use services::{ActivityRepository, LoadDeriver, ProfileService, RateLimitedFetcher, ResponseCache};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub activities: ActivityRepository,
    pub profiles: ProfileService,
    pub deriver: LoadDeriver,
}

impl AppState {
    /// Wire the services on top of `transport` according to `config`.
    pub fn new(config: Config, transport: Arc<dyn HttpTransport>) -> Self {
        let mut fetcher = RateLimitedFetcher::new(transport, config.retry_policy());
        if config.cache_responses {
            let cache = ResponseCache::new(config.cache_ttl, config.cache_capacity);
            fetcher = fetcher.with_cache(cache);
        }
        let fetcher = Arc::new(fetcher);

        let activities = ActivityRepository::new(fetcher.clone())
            .with_page_size(config.activities_page_size)
            .with_stream_concurrency(config.stream_concurrency);
        let profiles = ProfileService::new(fetcher);
        let deriver = LoadDeriver::new(config.ftp_calendar.clone(), config.analysis_start);

        Self {
            config,
            activities,
            profiles,
            deriver,
        }
    }
}
