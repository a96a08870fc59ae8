// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Training Stress Score and the CTL / ATL / TSB load series.
//!
//! Pipeline:
//! 1. Score each activity against the FTP in effect on its date
//! 2. Sum and average activity columns per calendar period
//! 3. Roll 42-day / 7-day windows over daily TSS
//! 4. Join everything on the period index from the analysis start onwards

use crate::models::activity::{ActivityFrame, ActivityRow};
use crate::models::load::{
    FormZone, LoadRow, LoadTable, Metric, Resolution, LOAD_METRICS, MEAN_METRICS, SUM_METRICS,
};
use crate::services::ftp::FtpCalendar;
use crate::services::series::{
    rolling_mean, Aggregation, DatedValues, Period, SeriesError, TimeSeries,
};
use chrono::NaiveDate;

/// Chronic Training Load window (days).
pub const CTL_WINDOW_DAYS: usize = 42;
/// Acute Training Load window (days).
pub const ATL_WINDOW_DAYS: usize = 7;

/// Training stress of one activity, or `None` without weighted power.
///
/// `intensity_factor = wap / ftp` and
/// `tss = (seconds * wap * intensity_factor / (ftp * 3600)) * 100`.
pub fn compute_tss(
    weighted_average_watts: Option<f64>,
    moving_time_hours: f64,
    ftp: f64,
) -> Option<f64> {
    let wap = weighted_average_watts?;
    let intensity_factor = intensity_factor(wap, ftp)?;
    Some(((moving_time_hours * 3600.0) * wap * intensity_factor / (ftp * 3600.0)) * 100.0)
}

fn intensity_factor(weighted_average_watts: f64, ftp: f64) -> Option<f64> {
    if ftp > 0.0 {
        Some(weighted_average_watts / ftp)
    } else {
        None
    }
}

/// An activity with its calibration and stress score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredActivity {
    pub row: ActivityRow,
    pub ftp: u32,
    pub intensity_factor: Option<f64>,
    pub tss: Option<f64>,
}

impl DatedValues for ScoredActivity {
    fn date(&self) -> NaiveDate {
        self.row.date
    }

    fn value(&self, metric: Metric) -> f64 {
        let value = match metric {
            Metric::Tss => self.tss,
            other => self.row.metric(other),
        };
        value.unwrap_or(f64::NAN)
    }
}

/// Add chronic / acute load and their balance to a gap-free daily series
/// with a TSS column. Positions before a window is full are undefined.
pub fn ctl_atl_tsb(daily: TimeSeries) -> Result<TimeSeries, DeriveError> {
    let tss = daily
        .column(Metric::Tss)
        .ok_or(DeriveError::MissingTss)?
        .to_vec();

    let chronic = rolling_mean(&tss, CTL_WINDOW_DAYS);
    let acute = rolling_mean(&tss, ATL_WINDOW_DAYS);
    let balance = chronic.iter().zip(&acute).map(|(c, a)| c - a).collect();

    Ok(daily
        .with_column(Metric::ChronicTrainingLoad, chronic)?
        .with_column(Metric::AcuteTrainingLoad, acute)?
        .with_column(Metric::TrainingStressBalance, balance)?)
}

/// Group `rows` by date with `aggregation`, then resample to `period`.
pub fn resample<R: DatedValues>(
    rows: &[R],
    metrics: &[Metric],
    aggregation: Aggregation,
    period: Period,
) -> TimeSeries {
    TimeSeries::group_by_date(rows, metrics, aggregation).resample(period, aggregation)
}

/// Derives load tables from an activity frame.
#[derive(Debug, Clone)]
pub struct LoadDeriver {
    calendar: FtpCalendar,
    analysis_start: NaiveDate,
}

impl LoadDeriver {
    pub fn new(calendar: FtpCalendar, analysis_start: NaiveDate) -> Self {
        Self {
            calendar,
            analysis_start,
        }
    }

    pub fn calendar(&self) -> &FtpCalendar {
        &self.calendar
    }

    pub fn analysis_start(&self) -> NaiveDate {
        self.analysis_start
    }

    /// Score every activity. Activities without weighted power keep an
    /// undefined TSS instead of failing.
    pub fn score(&self, frame: &ActivityFrame) -> Vec<ScoredActivity> {
        frame
            .rows()
            .iter()
            .map(|row| {
                let ftp = self.calendar.ftp_at(row.date);
                let ftp_watts = f64::from(ftp);
                ScoredActivity {
                    row: row.clone(),
                    ftp,
                    intensity_factor: row
                        .weighted_average_watts
                        .and_then(|wap| intensity_factor(wap, ftp_watts)),
                    tss: compute_tss(row.weighted_average_watts, row.moving_time_hours, ftp_watts),
                }
            })
            .collect()
    }

    /// Daily summed columns plus rolling load, before trimming or filling.
    pub fn daily_loads(&self, scored: &[ScoredActivity]) -> Result<TimeSeries, DeriveError> {
        let summed = resample(scored, &SUM_METRICS, Aggregation::Sum, Period::Daily);
        ctl_atl_tsb(summed)
    }

    /// Build the load table at `resolution`.
    ///
    /// Weekly and monthly loads are means of the trimmed, zero-filled daily
    /// load values. The 42/7-day windows are always in calendar days.
    pub fn derive(
        &self,
        frame: &ActivityFrame,
        resolution: Resolution,
    ) -> Result<LoadTable, DeriveError> {
        let scored = self.score(frame);
        let daily = self.daily_loads(&scored)?;

        let combined = match resolution {
            Resolution::Daily => {
                let means = resample(&scored, &MEAN_METRICS, Aggregation::Mean, Period::Daily);
                daily.join(&means)?
            }
            Resolution::Weekly | Resolution::Monthly => {
                let period = match resolution {
                    Resolution::Monthly => Period::Monthly,
                    _ => Period::Weekly,
                };
                let sums = resample(&scored, &SUM_METRICS, Aggregation::Sum, period);
                let loads = daily
                    .since(self.analysis_start)
                    .fill_undefined(0.0)
                    .select(&LOAD_METRICS)?
                    .resample(period, Aggregation::Mean);
                let means = resample(&scored, &MEAN_METRICS, Aggregation::Mean, period);
                sums.join(&loads)?.join(&means)?
            }
        };

        let table = combined.since(self.analysis_start).fill_undefined(0.0);
        tracing::debug!(
            activities = frame.len(),
            periods = table.len(),
            ?resolution,
            "Derived training load"
        );

        Ok(LoadTable {
            resolution,
            rows: to_rows(&table),
        })
    }
}

fn to_rows(series: &TimeSeries) -> Vec<LoadRow> {
    let column = |metric: Metric| series.column(metric).unwrap_or(&[]);
    let at = |values: &[f64], i: usize| values.get(i).copied().unwrap_or(0.0);

    let distance = column(Metric::Distance);
    let moving_time = column(Metric::MovingTime);
    let elevation = column(Metric::TotalElevationGain);
    let kilojoules = column(Metric::Kilojoules);
    let suffer_score = column(Metric::SufferScore);
    let tss = column(Metric::Tss);
    let average_watts = column(Metric::AverageWatts);
    let weighted_average_watts = column(Metric::WeightedAverageWatts);
    let cadence = column(Metric::AverageCadence);
    let average_heartrate = column(Metric::AverageHeartrate);
    let max_heartrate = column(Metric::MaxHeartrate);
    let speed = column(Metric::AverageSpeed);
    let max_speed = column(Metric::MaxSpeed);
    let chronic = column(Metric::ChronicTrainingLoad);
    let acute = column(Metric::AcuteTrainingLoad);
    let balance = column(Metric::TrainingStressBalance);

    series
        .index()
        .iter()
        .enumerate()
        .map(|(i, &period)| {
            let training_stress_balance = at(balance, i);
            LoadRow {
                period,
                distance_km: at(distance, i),
                moving_time_hours: at(moving_time, i),
                total_elevation_gain: at(elevation, i),
                kilojoules: at(kilojoules, i),
                suffer_score: at(suffer_score, i),
                tss: at(tss, i),
                average_watts: at(average_watts, i),
                weighted_average_watts: at(weighted_average_watts, i),
                average_cadence: at(cadence, i),
                average_heartrate: at(average_heartrate, i),
                max_heartrate: at(max_heartrate, i),
                average_speed_kmh: at(speed, i),
                max_speed_kmh: at(max_speed, i),
                chronic_training_load: at(chronic, i),
                acute_training_load: at(acute, i),
                training_stress_balance,
                form: FormZone::classify(training_stress_balance),
            }
        })
        .collect()
}

/// Errors from deriving load tables.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeriveError {
    #[error("daily series has no TSS column")]
    MissingTss,

    #[error(transparent)]
    Series(#[from] SeriesError),
}
