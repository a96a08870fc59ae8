// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - retrieval and analytics.

pub mod activities;
pub mod cache;
pub mod fetcher;
pub mod ftp;
pub mod heatmap;
pub mod load;
pub mod profile;
pub mod series;

pub use activities::{ActivityRepository, StreamBatch};
pub use cache::ResponseCache;
pub use fetcher::{AccessToken, RateLimitedFetcher, ReqwestTransport, RetryPolicy};
pub use ftp::FtpCalendar;
pub use heatmap::build_heatmap;
pub use load::LoadDeriver;
pub use profile::ProfileService;
