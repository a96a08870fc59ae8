// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Per-activity sensor streams.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Stream types accepted by `GET /activities/{id}/streams`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum StreamKey {
    Time,
    Distance,
    Latlng,
    Altitude,
    VelocitySmooth,
    Heartrate,
    Cadence,
    Watts,
    Temp,
    Moving,
    GradeSmooth,
}

impl StreamKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamKey::Time => "time",
            StreamKey::Distance => "distance",
            StreamKey::Latlng => "latlng",
            StreamKey::Altitude => "altitude",
            StreamKey::VelocitySmooth => "velocity_smooth",
            StreamKey::Heartrate => "heartrate",
            StreamKey::Cadence => "cadence",
            StreamKey::Watts => "watts",
            StreamKey::Temp => "temp",
            StreamKey::Moving => "moving",
            StreamKey::GradeSmooth => "grade_smooth",
        }
    }
}

impl fmt::Display for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s {
            "time" => StreamKey::Time,
            "distance" => StreamKey::Distance,
            "latlng" => StreamKey::Latlng,
            "altitude" => StreamKey::Altitude,
            "velocity_smooth" => StreamKey::VelocitySmooth,
            "heartrate" => StreamKey::Heartrate,
            "cadence" => StreamKey::Cadence,
            "watts" => StreamKey::Watts,
            "temp" => StreamKey::Temp,
            "moving" => StreamKey::Moving,
            "grade_smooth" => StreamKey::GradeSmooth,
            other => return Err(format!("unknown stream type '{}'", other)),
        };
        Ok(key)
    }
}

/// One entry of a `key_by_type=true` streams response. Other fields Strava
/// sends alongside are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStream {
    pub data: Vec<Value>,
    #[serde(default)]
    pub resolution: Option<String>,
}

/// A named stream attached to one activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityStream {
    pub activity_id: u64,
    pub key: StreamKey,
    pub data: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

impl ActivityStream {
    pub fn from_raw(activity_id: u64, key: StreamKey, raw: RawStream) -> Self {
        Self {
            activity_id,
            key,
            data: raw.data,
            resolution: raw.resolution,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Samples as `(lat, lng)` pairs. `None` if any sample is not a pair of
    /// numbers (including streams of other types).
    pub fn lat_lngs(&self) -> Option<Vec<(f64, f64)>> {
        self.data
            .iter()
            .map(|sample| match sample.as_array().map(Vec::as_slice) {
                Some([lat, lng]) => Some((lat.as_f64()?, lng.as_f64()?)),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(data: Value) -> ActivityStream {
        let raw: RawStream = serde_json::from_value(serde_json::json!({
            "data": data,
            "series_type": "distance",
            "original_size": 3,
            "resolution": "high"
        }))
        .unwrap();
        ActivityStream::from_raw(7, StreamKey::Latlng, raw)
    }

    #[test]
    fn test_lat_lngs() {
        let s = stream(serde_json::json!([[52.5, 13.4], [52.51, 13.41], [52.52, 13.42]]));
        assert_eq!(
            s.lat_lngs(),
            Some(vec![(52.5, 13.4), (52.51, 13.41), (52.52, 13.42)])
        );
        assert_eq!(s.resolution.as_deref(), Some("high"));
    }

    #[test]
    fn test_lat_lngs_rejects_scalars() {
        let s = stream(serde_json::json!([120, 130, 140]));
        assert_eq!(s.lat_lngs(), None);
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn test_stream_key_round_trip_names() {
        assert_eq!("latlng".parse::<StreamKey>(), Ok(StreamKey::Latlng));
        assert_eq!(
            "velocity_smooth".parse::<StreamKey>(),
            Ok(StreamKey::VelocitySmooth)
        );
        assert!("gps".parse::<StreamKey>().is_err());
        assert_eq!(StreamKey::GradeSmooth.as_str(), "grade_smooth");
    }
}
