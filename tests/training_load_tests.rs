// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end load derivation: Strava activity JSON to load tables.

use chrono::{Duration, NaiveDate};
use pmc_tracker::models::activity::{Activity, ActivityFrame};
use pmc_tracker::models::load::{FormZone, Resolution};
use pmc_tracker::services::{FtpCalendar, LoadDeriver};

mod common;
use common::activity_json;

fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

fn frame(activities: Vec<serde_json::Value>) -> ActivityFrame {
    let activities: Vec<Activity> = activities
        .into_iter()
        .map(|a| serde_json::from_value(a).unwrap())
        .collect();
    ActivityFrame::from_activities(&activities)
}

fn flat_ftp_deriver(start: &str) -> LoadDeriver {
    let calendar = FtpCalendar::new(vec![(date("2021-10-25"), 211)]).unwrap();
    LoadDeriver::new(calendar, date(start))
}

/// One activity per day from `first`, with weighted power from `watts(i)`.
fn daily_rides(first: &str, days: u64, watts: impl Fn(u64) -> f64) -> ActivityFrame {
    let first = date(first);
    frame(
        (0..days)
            .map(|i| {
                let day = first + Duration::days(i as i64);
                activity_json(i + 1, &format!("{}T07:30:00Z", day), Some(watts(i)))
            })
            .collect(),
    )
}

#[test]
fn test_single_activity_tss() {
    let deriver = flat_ftp_deriver("2022-01-01");
    let frame = frame(vec![activity_json(1, "2022-01-01T09:00:00Z", Some(200.0))]);

    let scored = deriver.score(&frame);
    assert_eq!(scored.len(), 1);
    assert_eq!(scored[0].ftp, 211);
    assert!((scored[0].intensity_factor.unwrap() - 0.9479).abs() < 1e-4);
    assert!((scored[0].tss.unwrap() - 89.845).abs() < 1e-3);

    let table = deriver.derive(&frame, Resolution::Daily).unwrap();
    assert_eq!(table.rows.len(), 1);
    let row = &table.rows[0];
    assert_eq!(row.period, date("2022-01-01"));
    assert!((row.tss - 89.845).abs() < 1e-3);
    // Windows are not full yet
    assert_eq!(row.chronic_training_load, 0.0);
    assert_eq!(row.acute_training_load, 0.0);
}

#[test]
fn test_default_calibration_applies_per_date() {
    let deriver = LoadDeriver::new(FtpCalendar::default(), date("2022-01-01"));
    let frame = frame(vec![
        activity_json(1, "2021-06-01T09:00:00Z", Some(200.0)),
        activity_json(2, "2022-01-30T09:00:00Z", Some(200.0)),
        activity_json(3, "2025-01-01T09:00:00Z", Some(200.0)),
    ]);

    let ftps: Vec<u32> = deriver.score(&frame).iter().map(|s| s.ftp).collect();
    assert_eq!(ftps, vec![211, 237, 279]);
}

#[test]
fn test_constant_load_converges() {
    let deriver = flat_ftp_deriver("2022-01-01");
    let frame = daily_rides("2022-01-01", 60, |_| 200.0);
    let table = deriver.derive(&frame, Resolution::Daily).unwrap();

    assert_eq!(table.rows.len(), 60);
    let tss = table.rows[0].tss;
    for row in &table.rows[41..] {
        assert!((row.chronic_training_load - tss).abs() < 1e-9);
        assert!((row.acute_training_load - tss).abs() < 1e-9);
        assert!(row.training_stress_balance.abs() < 1e-9);
        assert_eq!(row.form, FormZone::Neutral);
    }
    // Acute window fills first
    assert!((table.rows[6].acute_training_load - tss).abs() < 1e-9);
    assert_eq!(table.rows[40].chronic_training_load, 0.0);
}

#[test]
fn test_daily_resolution_zero_fills_gaps() {
    let deriver = flat_ftp_deriver("2022-01-01");
    let frame = frame(vec![
        activity_json(1, "2022-01-01T09:00:00Z", Some(200.0)),
        activity_json(2, "2022-01-04T09:00:00Z", None),
        activity_json(3, "2022-01-04T18:00:00Z", Some(180.0)),
    ]);
    let table = deriver.derive(&frame, Resolution::Daily).unwrap();

    let periods: Vec<NaiveDate> = table.rows.iter().map(|r| r.period).collect();
    assert_eq!(
        periods,
        vec![
            date("2022-01-01"),
            date("2022-01-02"),
            date("2022-01-03"),
            date("2022-01-04")
        ]
    );

    let gap = table.row(date("2022-01-02")).unwrap();
    assert_eq!(gap.distance_km, 0.0);
    assert_eq!(gap.tss, 0.0);
    assert_eq!(gap.average_heartrate, 0.0);

    // Two activities on one day: sums add, means average
    let busy = table.row(date("2022-01-04")).unwrap();
    assert!((busy.distance_km - 60.0).abs() < 1e-9);
    assert!((busy.moving_time_hours - 2.0).abs() < 1e-9);
    assert!((busy.average_heartrate - 140.0).abs() < 1e-9);
    // Activity without power contributes no stress
    let expected_tss = 100.0 * (180.0_f64 / 211.0).powi(2);
    assert!((busy.tss - expected_tss).abs() < 1e-9);
    // Only the powered activity has weighted power
    assert!((busy.weighted_average_watts - 180.0).abs() < 1e-9);
}

#[test]
fn test_weekly_load_is_mean_of_daily_load() {
    let deriver = flat_ftp_deriver("2022-01-01");
    // 2022-01-03 is a Monday
    let frame = daily_rides("2022-01-03", 70, |i| 150.0 + (i % 7) as f64 * 10.0 + (i / 7) as f64);

    let daily = deriver.derive(&frame, Resolution::Daily).unwrap();
    let weekly = deriver.derive(&frame, Resolution::Weekly).unwrap();

    // Weeks are labelled by their closing Sunday
    assert_eq!(weekly.rows.first().unwrap().period, date("2022-01-09"));
    assert_eq!(weekly.rows.len(), 10);

    let week_end = date("2022-03-06");
    let week: Vec<_> = daily
        .rows
        .iter()
        .filter(|r| r.period > week_end - Duration::days(7) && r.period <= week_end)
        .collect();
    assert_eq!(week.len(), 7);

    let mean = |f: fn(&&pmc_tracker::models::load::LoadRow) -> f64| {
        week.iter().map(f).sum::<f64>() / week.len() as f64
    };
    let row = weekly.row(week_end).unwrap();
    assert!((row.chronic_training_load - mean(|r| r.chronic_training_load)).abs() < 1e-9);
    assert!((row.acute_training_load - mean(|r| r.acute_training_load)).abs() < 1e-9);
    assert!((row.training_stress_balance - mean(|r| r.training_stress_balance)).abs() < 1e-9);

    // Sums over the week, not means
    assert!((row.distance_km - 210.0).abs() < 1e-9);
    let tss_sum: f64 = week.iter().map(|r| r.tss).sum();
    assert!((row.tss - tss_sum).abs() < 1e-9);
    assert!((row.average_heartrate - 140.0).abs() < 1e-9);
}

#[test]
fn test_first_week_averages_only_days_after_start() {
    let deriver = flat_ftp_deriver("2022-01-01");
    // Rides every day to 2021-12-27, then a pause until 2022-01-10
    let mut activities: Vec<serde_json::Value> = (0..57)
        .map(|i| {
            let day = date("2021-11-01") + Duration::days(i);
            activity_json(i as u64 + 1, &format!("{}T07:30:00Z", day), Some(200.0))
        })
        .collect();
    activities.push(activity_json(100, "2022-01-10T07:30:00Z", Some(200.0)));
    let frame = frame(activities);

    let daily = deriver.derive(&frame, Resolution::Daily).unwrap();
    let weekly = deriver.derive(&frame, Resolution::Weekly).unwrap();

    // Week 2021-12-27..2022-01-02 only sees Jan 1 and Jan 2
    let row = weekly.row(date("2022-01-02")).unwrap();
    let jan1 = daily.row(date("2022-01-01")).unwrap();
    let jan2 = daily.row(date("2022-01-02")).unwrap();
    let expected = (jan1.acute_training_load + jan2.acute_training_load) / 2.0;
    assert!((row.acute_training_load - expected).abs() < 1e-9);

    let tss = 100.0 * (200.0_f64 / 211.0).powi(2);
    assert!((row.acute_training_load - 3.0 * tss / 14.0).abs() < 1e-9);
    assert!((row.acute_training_load - 19.25).abs() < 0.01);
}

#[test]
fn test_weekly_load_counts_unfilled_windows_as_zero() {
    let deriver = flat_ftp_deriver("2022-01-01");
    let frame = daily_rides("2022-01-03", 21, |_| 200.0);
    let weekly = deriver.derive(&frame, Resolution::Weekly).unwrap();

    // Acute window fills on the last day of the first week
    let tss = 100.0 * (200.0_f64 / 211.0).powi(2);
    let row = weekly.row(date("2022-01-09")).unwrap();
    assert!((row.acute_training_load - tss / 7.0).abs() < 1e-9);
    assert!((row.acute_training_load - 12.84).abs() < 0.01);
    assert_eq!(row.chronic_training_load, 0.0);

    let full = weekly.row(date("2022-01-16")).unwrap();
    assert!((full.acute_training_load - tss).abs() < 1e-9);
}

#[test]
fn test_weekly_max_speed_is_averaged() {
    let deriver = flat_ftp_deriver("2022-01-01");
    let frame = daily_rides("2022-01-03", 7, |_| 200.0);
    let weekly = deriver.derive(&frame, Resolution::Weekly).unwrap();

    // 15 m/s on every ride
    let row = weekly.row(date("2022-01-09")).unwrap();
    assert!((row.max_speed_kmh - 54.0).abs() < 1e-9);
}

#[test]
fn test_weekly_gap_weeks_are_zero() {
    let deriver = flat_ftp_deriver("2022-01-01");
    let frame = frame(vec![
        activity_json(1, "2022-01-03T09:00:00Z", Some(200.0)),
        activity_json(2, "2022-01-25T09:00:00Z", Some(200.0)),
    ]);
    let weekly = deriver.derive(&frame, Resolution::Weekly).unwrap();

    let periods: Vec<NaiveDate> = weekly.rows.iter().map(|r| r.period).collect();
    assert_eq!(
        periods,
        vec![
            date("2022-01-09"),
            date("2022-01-16"),
            date("2022-01-23"),
            date("2022-01-30")
        ]
    );
    let empty = weekly.row(date("2022-01-16")).unwrap();
    assert_eq!(empty.distance_km, 0.0);
    assert_eq!(empty.average_heartrate, 0.0);
}

#[test]
fn test_monthly_resolution() {
    let deriver = flat_ftp_deriver("2022-01-01");
    let frame = daily_rides("2022-01-01", 59, |_| 200.0);
    let monthly = deriver.derive(&frame, Resolution::Monthly).unwrap();

    let periods: Vec<NaiveDate> = monthly.rows.iter().map(|r| r.period).collect();
    assert_eq!(periods, vec![date("2022-01-31"), date("2022-02-28")]);
    assert!((monthly.rows[0].distance_km - 31.0 * 30.0).abs() < 1e-9);
    assert!((monthly.rows[1].distance_km - 28.0 * 30.0).abs() < 1e-9);
}

#[test]
fn test_analysis_start_trims_history() {
    let deriver = flat_ftp_deriver("2022-01-01");
    let frame = daily_rides("2021-11-01", 90, |_| 200.0);
    let table = deriver.derive(&frame, Resolution::Daily).unwrap();

    assert_eq!(table.rows.first().unwrap().period, date("2022-01-01"));
    // Load carried in from before the start date is kept
    let tss = table.rows[0].tss;
    assert!((table.rows[0].chronic_training_load - tss).abs() < 1e-9);
    assert_eq!(table.latest().unwrap().period, date("2022-01-29"));
}

#[test]
fn test_no_activities_gives_empty_table() {
    let deriver = flat_ftp_deriver("2022-01-01");
    let table = deriver.derive(&frame(vec![]), Resolution::Weekly).unwrap();
    assert!(table.rows.is_empty());
}
