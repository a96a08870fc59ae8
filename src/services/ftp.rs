// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! FTP calibration: which threshold power applied on a given day.

use crate::time_utils::{parse_calendar_date, CalendarDate};
use chrono::NaiveDate;

/// Hand-maintained FTP test results (effective date, watts).
pub const DEFAULT_FTP_BREAKPOINTS: [(&str, u32); 10] = [
    ("2021-10-25", 211),
    ("2022-01-30", 237),
    ("2022-12-17", 249),
    ("2023-03-25", 265),
    ("2023-10-05", 256),
    ("2023-11-22", 262),
    ("2024-02-14", 266),
    ("2024-03-13", 272),
    ("2024-04-15", 277),
    ("2024-06-27", 279),
];

/// Step function from date to FTP. Dates before the first breakpoint use the
/// first breakpoint's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtpCalendar {
    breakpoints: Vec<(NaiveDate, u32)>,
}

impl FtpCalendar {
    /// Build from breakpoints sorted by strictly increasing date.
    pub fn new(breakpoints: Vec<(NaiveDate, u32)>) -> Result<Self, CalibrationError> {
        if breakpoints.is_empty() {
            return Err(CalibrationError::Empty);
        }
        if let Some(pair) = breakpoints.windows(2).find(|pair| pair[0].0 >= pair[1].0) {
            return Err(CalibrationError::NotIncreasing(pair[1].0));
        }
        if let Some((date, _)) = breakpoints.iter().find(|(_, watts)| *watts == 0) {
            return Err(CalibrationError::ZeroWatts(*date));
        }
        Ok(Self { breakpoints })
    }

    /// Parse `YYYY-MM-DD:watts` pairs separated by commas, e.g.
    /// `2021-10-25:211,2022-01-30:237`.
    pub fn parse(spec: &str) -> Result<Self, CalibrationError> {
        let breakpoints = spec
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let invalid = || CalibrationError::InvalidEntry(entry.to_string());
                let (date, watts) = entry.split_once(':').ok_or_else(invalid)?;
                let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
                    .map_err(|_| invalid())?;
                let watts = watts.trim().parse::<u32>().map_err(|_| invalid())?;
                Ok((date, watts))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(breakpoints)
    }

    pub fn breakpoints(&self) -> &[(NaiveDate, u32)] {
        &self.breakpoints
    }

    /// FTP in effect on `date` (timestamps are truncated to their date).
    pub fn ftp_at<D: CalendarDate>(&self, date: D) -> u32 {
        let date = date.calendar_date();
        // Number of breakpoints on or before `date`.
        let effective = self.breakpoints.partition_point(|(start, _)| *start <= date);
        let index = effective.saturating_sub(1);
        self.breakpoints[index].1
    }

    /// Like [`ftp_at`](Self::ftp_at) for `YYYY-MM-DD` or RFC 3339 input.
    pub fn ftp_at_str(&self, date: &str) -> Option<u32> {
        parse_calendar_date(date).map(|d| self.ftp_at(d))
    }
}

impl Default for FtpCalendar {
    fn default() -> Self {
        let breakpoints = DEFAULT_FTP_BREAKPOINTS
            .iter()
            .filter_map(|(date, watts)| {
                NaiveDate::parse_from_str(date, "%Y-%m-%d")
                    .ok()
                    .map(|d| (d, *watts))
            })
            .collect();
        Self { breakpoints }
    }
}

/// Errors from building an FTP calibration table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalibrationError {
    #[error("FTP calibration table is empty")]
    Empty,

    #[error("FTP calibration dates must be strictly increasing (at {0})")]
    NotIncreasing(NaiveDate),

    #[error("FTP calibration entry on {0} has zero watts")]
    ZeroWatts(NaiveDate),

    #[error("Invalid FTP calibration entry '{0}' (expected YYYY-MM-DD:watts)")]
    InvalidEntry(String),
}
