// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod load;
pub mod profile;
pub mod stream;

pub use activity::{Activity, ActivityFrame, ActivityRow};
pub use load::{FormZone, LoadRow, LoadTable, Metric, Resolution};
pub use profile::{Profile, StatsTable, YearToDateStats};
pub use stream::{ActivityStream, StreamKey};
