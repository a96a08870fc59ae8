// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GPS heatmap: every available `latlng` stream as a polyline.

use crate::models::stream::ActivityStream;
use geo::{BoundingRect, Coord, LineString, MultiLineString};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject};
use serde::Serialize;

/// Map center used when there is no track to frame.
pub const DEFAULT_CENTER: (f64, f64) = (52.5740, 13.4101);

pub const TRACK_COLOR: &str = "#EB33FF";
pub const TRACK_WEIGHT: f64 = 2.0;
pub const TRACK_OPACITY: f64 = 0.6;

/// Tracks ready for a map overlay.
#[derive(Debug, Clone, Serialize)]
pub struct Heatmap {
    /// `(lat, lng)`
    pub center: (f64, f64),
    pub tracks: FeatureCollection,
    /// Entries that had no usable GPS stream
    pub skipped: usize,
}

impl Heatmap {
    pub fn track_count(&self) -> usize {
        self.tracks.features.len()
    }
}

/// Build a heatmap from streams in activity order. Unavailable entries and
/// streams that are not `[lat, lng]` pairs are skipped.
pub fn build_heatmap(streams: &[Option<ActivityStream>]) -> Heatmap {
    let mut lines = Vec::new();
    let mut features = Vec::new();
    let mut skipped = 0;

    for stream in streams {
        let Some(stream) = stream else {
            skipped += 1;
            continue;
        };
        let Some(points) = stream.lat_lngs().filter(|points| points.len() >= 2) else {
            tracing::debug!(activity_id = stream.activity_id, "No usable GPS track");
            skipped += 1;
            continue;
        };

        // geo and GeoJSON both use x = longitude, y = latitude.
        let line: LineString<f64> = points
            .iter()
            .map(|&(lat, lng)| Coord { x: lng, y: lat })
            .collect();
        features.push(track_feature(stream.activity_id, &line));
        lines.push(line);
    }

    let center = MultiLineString::new(lines)
        .bounding_rect()
        .map(|rect| {
            let c = rect.center();
            (c.y, c.x)
        })
        .unwrap_or(DEFAULT_CENTER);

    Heatmap {
        center,
        tracks: FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        },
        skipped,
    }
}

fn track_feature(activity_id: u64, line: &LineString<f64>) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("activity_id".to_string(), activity_id.into());
    properties.insert("color".to_string(), TRACK_COLOR.into());
    properties.insert("weight".to_string(), TRACK_WEIGHT.into());
    properties.insert("opacity".to_string(), TRACK_OPACITY.into());

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::from(line))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}
