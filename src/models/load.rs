// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Training-load columns and the resampled rows handed to the dashboard.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A column of the activity / load time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Distance,
    MovingTime,
    TotalElevationGain,
    Kilojoules,
    SufferScore,
    Tss,
    AverageWatts,
    WeightedAverageWatts,
    AverageCadence,
    AverageHeartrate,
    MaxHeartrate,
    AverageSpeed,
    MaxSpeed,
    ChronicTrainingLoad,
    AcuteTrainingLoad,
    TrainingStressBalance,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Distance => "distance",
            Metric::MovingTime => "moving_time",
            Metric::TotalElevationGain => "total_elevation_gain",
            Metric::Kilojoules => "kilojoules",
            Metric::SufferScore => "suffer_score",
            Metric::Tss => "tss",
            Metric::AverageWatts => "average_watts",
            Metric::WeightedAverageWatts => "weighted_average_watts",
            Metric::AverageCadence => "average_cadence",
            Metric::AverageHeartrate => "average_heartrate",
            Metric::MaxHeartrate => "max_heartrate",
            Metric::AverageSpeed => "average_speed",
            Metric::MaxSpeed => "max_speed",
            Metric::ChronicTrainingLoad => "chronic_training_load",
            Metric::AcuteTrainingLoad => "acute_training_load",
            Metric::TrainingStressBalance => "training_stress_balance",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Columns summed within a period.
pub const SUM_METRICS: [Metric; 6] = [
    Metric::Distance,
    Metric::MovingTime,
    Metric::TotalElevationGain,
    Metric::Kilojoules,
    Metric::SufferScore,
    Metric::Tss,
];

/// Columns averaged within a period.
pub const MEAN_METRICS: [Metric; 7] = [
    Metric::AverageWatts,
    Metric::WeightedAverageWatts,
    Metric::AverageCadence,
    Metric::AverageHeartrate,
    Metric::MaxHeartrate,
    Metric::AverageSpeed,
    Metric::MaxSpeed,
];

/// Rolling-window columns derived from daily TSS.
pub const LOAD_METRICS: [Metric; 3] = [
    Metric::ChronicTrainingLoad,
    Metric::AcuteTrainingLoad,
    Metric::TrainingStressBalance,
];

/// Output granularity of a load table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Resolution {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

/// Form classification of the training stress balance, using the bands of the
/// dashboard's TSB chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum FormZone {
    /// TSB >= 5
    Fresh,
    /// -10 <= TSB < 5
    Neutral,
    /// -30 <= TSB < -10
    Optimal,
    /// TSB < -30
    HighRisk,
}

impl FormZone {
    pub fn classify(training_stress_balance: f64) -> Self {
        if training_stress_balance >= 5.0 {
            FormZone::Fresh
        } else if training_stress_balance >= -10.0 {
            FormZone::Neutral
        } else if training_stress_balance >= -30.0 {
            FormZone::Optimal
        } else {
            FormZone::HighRisk
        }
    }
}

/// One resampled period. Missing values are reported as zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoadRow {
    /// Period label: the day, the Sunday ending the week, or the month end
    pub period: NaiveDate,

    // ─── Period sums ─────────────────────────────────────────────
    pub distance_km: f64,
    pub moving_time_hours: f64,
    pub total_elevation_gain: f64,
    pub kilojoules: f64,
    pub suffer_score: f64,
    pub tss: f64,

    // ─── Period means ────────────────────────────────────────────
    pub average_watts: f64,
    pub weighted_average_watts: f64,
    pub average_cadence: f64,
    pub average_heartrate: f64,
    pub max_heartrate: f64,
    pub average_speed_kmh: f64,
    pub max_speed_kmh: f64,

    // ─── Rolling load ────────────────────────────────────────────
    pub chronic_training_load: f64,
    pub acute_training_load: f64,
    pub training_stress_balance: f64,
    pub form: FormZone,
}

/// Complete load series at one resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoadTable {
    pub resolution: Resolution,
    pub rows: Vec<LoadRow>,
}

impl LoadTable {
    pub fn row(&self, period: NaiveDate) -> Option<&LoadRow> {
        self.rows.iter().find(|row| row.period == period)
    }

    pub fn latest(&self) -> Option<&LoadRow> {
        self.rows.last()
    }
}
