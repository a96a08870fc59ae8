// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Athlete profile and year-to-date stats projections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Projection of `GET /athlete`. Unknown fields are ignored; the required
/// ones fail decoding when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Profile {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub firstname: String,
    pub lastname: String,
    #[serde(default)]
    pub city: Option<String>,
    /// FTP as recorded on the Strava profile (may differ from the calibration table)
    #[serde(default)]
    pub ftp: Option<u32>,
    pub created_at: DateTime<Utc>,
    /// Profile image URL
    #[serde(default)]
    pub profile: Option<String>,
}

impl Profile {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

/// One discipline's `ytd_*_totals` object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Totals {
    #[serde(default)]
    pub count: u32,
    /// Meters
    #[serde(default)]
    pub distance: f64,
    /// Seconds
    #[serde(default)]
    pub moving_time: f64,
    /// Seconds; not reported
    #[serde(default)]
    pub elapsed_time: f64,
    /// Meters
    #[serde(default)]
    pub elevation_gain: f64,
}

/// Projection of `GET /athletes/{id}/stats`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct YearToDateStats {
    #[serde(default)]
    pub ytd_ride_totals: Totals,
    #[serde(default)]
    pub ytd_run_totals: Totals,
    #[serde(default)]
    pub ytd_swim_totals: Totals,
}

/// Column labels of the stats table, in order.
pub const DISCIPLINES: [&str; 3] = ["Ride", "Run", "Swim"];

/// Labelled row of the stats table; one value per discipline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StatsRow {
    pub label: String,
    pub values: [f64; 3],
}

/// Year-to-date totals laid out for display: rows are measures, columns are
/// disciplines.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StatsTable {
    pub columns: Vec<String>,
    pub rows: Vec<StatsRow>,
}

impl From<&YearToDateStats> for StatsTable {
    fn from(stats: &YearToDateStats) -> Self {
        let totals = [
            stats.ytd_ride_totals,
            stats.ytd_run_totals,
            stats.ytd_swim_totals,
        ];
        let row = |label: &str, value: fn(&Totals) -> f64| StatsRow {
            label: label.to_string(),
            values: totals.map(|t| value(&t)),
        };

        Self {
            columns: DISCIPLINES.iter().map(|d| d.to_string()).collect(),
            rows: vec![
                row("Total Count", |t| f64::from(t.count)),
                row("Total Distance (km)", |t| round2(t.distance / 1000.0)),
                row("Total Moving Time (hours)", |t| {
                    round2(t.moving_time / 3600.0)
                }),
                row("Total Elevation Gain (m)", |t| t.elevation_gain),
            ],
        }
    }
}

impl StatsTable {
    pub fn value(&self, row_label: &str, discipline: &str) -> Option<f64> {
        let column = self.columns.iter().position(|c| c == discipline)?;
        self.rows
            .iter()
            .find(|row| row.label == row_label)
            .map(|row| row.values[column])
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
