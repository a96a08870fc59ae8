// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava activity model and the unit-converted activity frame.

use crate::models::load::Metric;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Summary activity as returned by `GET /athlete/activities`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Activity {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sport_type: String,
    /// Local wall-clock start time
    #[serde(deserialize_with = "deserialize_local_timestamp")]
    pub start_date_local: NaiveDateTime,
    /// Meters
    #[serde(default)]
    pub distance: f64,
    /// Seconds
    #[serde(default)]
    pub moving_time: f64,
    /// Seconds
    #[serde(default)]
    pub elapsed_time: f64,
    /// Meters
    #[serde(default)]
    pub total_elevation_gain: f64,
    #[serde(default)]
    pub average_watts: Option<f64>,
    /// Absent for activities without a power meter
    #[serde(default)]
    pub weighted_average_watts: Option<f64>,
    #[serde(default)]
    pub average_heartrate: Option<f64>,
    #[serde(default)]
    pub max_heartrate: Option<f64>,
    /// m/s
    #[serde(default)]
    pub average_speed: f64,
    /// m/s
    #[serde(default)]
    pub max_speed: f64,
    #[serde(default)]
    pub average_cadence: Option<f64>,
    #[serde(default)]
    pub kilojoules: Option<f64>,
    #[serde(default)]
    pub suffer_score: Option<f64>,
}

/// Strava sends `start_date_local` with a `Z` suffix even though it is local
/// time, so the offset is dropped and the wall-clock value kept.
fn deserialize_local_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.naive_local())
        .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| serde::de::Error::custom(format!("invalid start_date_local {raw:?}: {e}")))
}

/// One activity after unit conversion.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityRow {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub name: String,
    pub sport_type: String,
    pub start_date_local: NaiveDateTime,
    /// Local start date, used as the grouping key
    pub date: NaiveDate,
    pub distance_km: f64,
    pub moving_time_hours: f64,
    pub elapsed_time_hours: f64,
    pub total_elevation_gain: f64,
    pub average_watts: Option<f64>,
    pub weighted_average_watts: Option<f64>,
    pub average_heartrate: Option<f64>,
    pub max_heartrate: Option<f64>,
    pub average_speed_kmh: f64,
    pub max_speed_kmh: f64,
    pub average_cadence: Option<f64>,
    pub kilojoules: Option<f64>,
    pub suffer_score: Option<f64>,
}

impl From<&Activity> for ActivityRow {
    fn from(activity: &Activity) -> Self {
        Self {
            id: activity.id,
            name: activity.name.clone(),
            sport_type: activity.sport_type.clone(),
            start_date_local: activity.start_date_local,
            date: activity.start_date_local.date(),
            distance_km: activity.distance / 1000.0,
            moving_time_hours: activity.moving_time / 3600.0,
            elapsed_time_hours: activity.elapsed_time / 3600.0,
            total_elevation_gain: activity.total_elevation_gain,
            average_watts: activity.average_watts,
            weighted_average_watts: activity.weighted_average_watts,
            average_heartrate: activity.average_heartrate,
            max_heartrate: activity.max_heartrate,
            average_speed_kmh: activity.average_speed * 3600.0 / 1000.0,
            max_speed_kmh: activity.max_speed * 3600.0 / 1000.0,
            average_cadence: activity.average_cadence,
            kilojoules: activity.kilojoules,
            suffer_score: activity.suffer_score,
        }
    }
}

impl ActivityRow {
    /// Raw per-activity value of `metric`; `None` when the activity does not
    /// carry it. Derived metrics (TSS, loads) are not stored on the row.
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Distance => Some(self.distance_km),
            Metric::MovingTime => Some(self.moving_time_hours),
            Metric::TotalElevationGain => Some(self.total_elevation_gain),
            Metric::Kilojoules => self.kilojoules,
            Metric::SufferScore => self.suffer_score,
            Metric::AverageWatts => self.average_watts,
            Metric::WeightedAverageWatts => self.weighted_average_watts,
            Metric::AverageCadence => self.average_cadence,
            Metric::AverageHeartrate => self.average_heartrate,
            Metric::MaxHeartrate => self.max_heartrate,
            Metric::AverageSpeed => Some(self.average_speed_kmh),
            Metric::MaxSpeed => Some(self.max_speed_kmh),
            Metric::Tss
            | Metric::ChronicTrainingLoad
            | Metric::AcuteTrainingLoad
            | Metric::TrainingStressBalance => None,
        }
    }
}

/// All activities of one athlete, converted and sorted by start time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityFrame {
    rows: Vec<ActivityRow>,
}

impl ActivityFrame {
    pub fn from_activities(activities: &[Activity]) -> Self {
        let mut rows: Vec<ActivityRow> = activities.iter().map(ActivityRow::from).collect();
        rows.sort_by_key(|row| (row.start_date_local, row.id));
        Self { rows }
    }

    pub fn rows(&self) -> &[ActivityRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Ids in start-time order.
    pub fn ids(&self) -> Vec<u64> {
        self.rows.iter().map(|row| row.id).collect()
    }
}
