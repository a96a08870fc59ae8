// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for calendar dates and period boundaries.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone};

/// Anything that can be truncated to a calendar date.
pub trait CalendarDate {
    fn calendar_date(&self) -> NaiveDate;
}

impl CalendarDate for NaiveDate {
    fn calendar_date(&self) -> NaiveDate {
        *self
    }
}

impl CalendarDate for NaiveDateTime {
    fn calendar_date(&self) -> NaiveDate {
        self.date()
    }
}

impl<Tz: TimeZone> CalendarDate for DateTime<Tz> {
    fn calendar_date(&self) -> NaiveDate {
        self.date_naive()
    }
}

/// Parse `YYYY-MM-DD`, an RFC 3339 timestamp, or a naive `YYYY-MM-DDTHH:MM:SS`
/// timestamp into the date it falls on.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_local().date())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

/// The Sunday ending the week that contains `date` (weeks run Monday..=Sunday).
pub fn week_end(date: NaiveDate) -> NaiveDate {
    let days_to_sunday = (7 - date.weekday().num_days_from_sunday()) % 7;
    date + Duration::days(i64::from(days_to_sunday))
}

/// Last day of the month that contains `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_parse_calendar_date_formats() {
        assert_eq!(parse_calendar_date("2022-01-30"), Some(date("2022-01-30")));
        assert_eq!(
            parse_calendar_date("2022-01-30T07:15:00Z"),
            Some(date("2022-01-30"))
        );
        assert_eq!(
            parse_calendar_date("2022-01-30T23:15:00"),
            Some(date("2022-01-30"))
        );
        assert_eq!(parse_calendar_date("30/01/2022"), None);
    }

    #[test]
    fn test_week_end_is_following_sunday() {
        // 2022-01-01 was a Saturday
        assert_eq!(week_end(date("2022-01-01")), date("2022-01-02"));
        assert_eq!(week_end(date("2022-01-02")), date("2022-01-02"));
        assert_eq!(week_end(date("2022-01-03")), date("2022-01-09"));
    }

    #[test]
    fn test_month_end() {
        assert_eq!(month_end(date("2024-02-10")), date("2024-02-29"));
        assert_eq!(month_end(date("2023-12-01")), date("2023-12-31"));
        assert_eq!(month_end(date("2023-04-30")), date("2023-04-30"));
    }
}
