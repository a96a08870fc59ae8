// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Date-indexed numeric columns with calendar resampling.
//!
//! Values are `f64` with `NaN` marking "undefined" (activity without power,
//! rolling window not yet full). Sums and means skip undefined values;
//! [`TimeSeries::fill_undefined`] turns whatever is left into zero.

use crate::models::load::Metric;
use crate::time_utils::{month_end, week_end};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

/// How values that fall into the same bucket are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Sum,
    Mean,
}

impl Aggregation {
    /// Combine `values`, skipping undefined ones. A mean with nothing defined
    /// is undefined; a sum with nothing defined is zero.
    pub fn apply<I: IntoIterator<Item = f64>>(&self, values: I) -> f64 {
        let (sum, count) = values
            .into_iter()
            .filter(|v| !v.is_nan())
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
        match self {
            Aggregation::Sum => sum,
            Aggregation::Mean if count == 0 => f64::NAN,
            Aggregation::Mean => sum / count as f64,
        }
    }
}

/// Calendar bucket size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Daily,
    /// Monday..=Sunday, labelled by the Sunday
    Weekly,
    /// Labelled by the last day of the month
    Monthly,
}

impl Period {
    /// Label of the bucket containing `date`.
    pub fn bucket(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Period::Daily => date,
            Period::Weekly => week_end(date),
            Period::Monthly => month_end(date),
        }
    }

    fn next(&self, label: NaiveDate) -> NaiveDate {
        match self {
            Period::Daily => label + Duration::days(1),
            Period::Weekly => label + Duration::days(7),
            Period::Monthly => month_end(label + Duration::days(1)),
        }
    }

    /// Every bucket label from the one containing `first` to the one
    /// containing `last`, inclusive.
    pub fn labels(&self, first: NaiveDate, last: NaiveDate) -> Vec<NaiveDate> {
        let end = self.bucket(last);
        let mut labels = Vec::new();
        let mut label = self.bucket(first);
        while label <= end {
            labels.push(label);
            label = self.next(label);
        }
        labels
    }
}

/// A value source that can be grouped by date.
pub trait DatedValues {
    fn date(&self) -> NaiveDate;
    /// Value of `metric`, or `NaN` when undefined.
    fn value(&self, metric: Metric) -> f64;
}

/// One named column of a [`TimeSeries`].
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub metric: Metric,
    pub values: Vec<f64>,
}

/// Columns sharing a sorted, duplicate-free date index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    index: Vec<NaiveDate>,
    columns: Vec<Column>,
}

impl TimeSeries {
    /// Build from an index and columns of matching length. The index must be
    /// strictly increasing.
    pub fn new(index: Vec<NaiveDate>, columns: Vec<Column>) -> Result<Self, SeriesError> {
        if index.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(SeriesError::UnsortedIndex);
        }
        let mut seen = Vec::with_capacity(columns.len());
        for column in &columns {
            if column.values.len() != index.len() {
                return Err(SeriesError::LengthMismatch {
                    metric: column.metric,
                    expected: index.len(),
                    actual: column.values.len(),
                });
            }
            if seen.contains(&column.metric) {
                return Err(SeriesError::DuplicateColumn(column.metric));
            }
            seen.push(column.metric);
        }
        Ok(Self { index, columns })
    }

    /// Collapse rows sharing a date with `aggregation`, keeping only dates
    /// that have rows.
    pub fn group_by_date<R: DatedValues>(
        rows: &[R],
        metrics: &[Metric],
        aggregation: Aggregation,
    ) -> Self {
        let mut groups: BTreeMap<NaiveDate, Vec<&R>> = BTreeMap::new();
        for row in rows {
            groups.entry(row.date()).or_default().push(row);
        }

        let index: Vec<NaiveDate> = groups.keys().copied().collect();
        let columns = metrics
            .iter()
            .map(|&metric| Column {
                metric,
                values: groups
                    .values()
                    .map(|group| aggregation.apply(group.iter().map(|row| row.value(metric))))
                    .collect(),
            })
            .collect();

        Self { index, columns }
    }

    pub fn index(&self) -> &[NaiveDate] {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn metrics(&self) -> Vec<Metric> {
        self.columns.iter().map(|c| c.metric).collect()
    }

    pub fn column(&self, metric: Metric) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.metric == metric)
            .map(|c| c.values.as_slice())
    }

    pub fn value(&self, metric: Metric, date: NaiveDate) -> Option<f64> {
        let position = self.index.binary_search(&date).ok()?;
        self.column(metric).map(|values| values[position])
    }

    /// Keep only `metrics`, in the given order.
    pub fn select(&self, metrics: &[Metric]) -> Result<Self, SeriesError> {
        let columns = metrics
            .iter()
            .map(|&metric| {
                self.column(metric)
                    .map(|values| Column {
                        metric,
                        values: values.to_vec(),
                    })
                    .ok_or(SeriesError::MissingColumn(metric))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            index: self.index.clone(),
            columns,
        })
    }

    /// Add a column computed over the existing index.
    pub fn with_column(mut self, metric: Metric, values: Vec<f64>) -> Result<Self, SeriesError> {
        if self.column(metric).is_some() {
            return Err(SeriesError::DuplicateColumn(metric));
        }
        if values.len() != self.index.len() {
            return Err(SeriesError::LengthMismatch {
                metric,
                expected: self.index.len(),
                actual: values.len(),
            });
        }
        self.columns.push(Column { metric, values });
        Ok(self)
    }

    /// Resample onto every `period` bucket between the first and last date,
    /// combining values with `aggregation`. Buckets without a defined value
    /// are zero, so the result has no gaps.
    pub fn resample(&self, period: Period, aggregation: Aggregation) -> Self {
        let (Some(&first), Some(&last)) = (self.index.first(), self.index.last()) else {
            return Self {
                index: Vec::new(),
                columns: self
                    .columns
                    .iter()
                    .map(|c| Column {
                        metric: c.metric,
                        values: Vec::new(),
                    })
                    .collect(),
            };
        };

        let labels = period.labels(first, last);
        // Position of each source row's bucket in `labels`.
        let slots: Vec<usize> = self
            .index
            .iter()
            .map(|date| {
                labels
                    .binary_search(&period.bucket(*date))
                    .unwrap_or_else(|insert_at| insert_at.min(labels.len() - 1))
            })
            .collect();

        let columns = self
            .columns
            .iter()
            .map(|column| {
                let mut buckets: Vec<Vec<f64>> = vec![Vec::new(); labels.len()];
                for (value, &slot) in column.values.iter().zip(&slots) {
                    buckets[slot].push(*value);
                }
                Column {
                    metric: column.metric,
                    values: buckets
                        .into_iter()
                        .map(|bucket| {
                            let combined = aggregation.apply(bucket);
                            if combined.is_nan() {
                                0.0
                            } else {
                                combined
                            }
                        })
                        .collect(),
                }
            })
            .collect();

        Self {
            index: labels,
            columns,
        }
    }

    /// Outer-join on the date index. Dates missing on one side are undefined
    /// for that side's columns. A column present on both sides is an error.
    pub fn join(&self, other: &TimeSeries) -> Result<Self, SeriesError> {
        if let Some(metric) = other
            .columns
            .iter()
            .map(|c| c.metric)
            .find(|m| self.column(*m).is_some())
        {
            return Err(SeriesError::DuplicateColumn(metric));
        }

        let mut index: Vec<NaiveDate> = self.index.iter().chain(&other.index).copied().collect();
        index.sort_unstable();
        index.dedup();

        let realign = |source: &TimeSeries| -> Vec<Column> {
            source
                .columns
                .iter()
                .map(|column| Column {
                    metric: column.metric,
                    values: index
                        .iter()
                        .map(|date| match source.index.binary_search(date) {
                            Ok(position) => column.values[position],
                            Err(_) => f64::NAN,
                        })
                        .collect(),
                })
                .collect()
        };

        let mut columns = realign(self);
        columns.extend(realign(other));
        Ok(Self { index, columns })
    }

    /// Drop dates before `start`.
    pub fn since(&self, start: NaiveDate) -> Self {
        let from = self.index.partition_point(|date| *date < start);
        Self {
            index: self.index[from..].to_vec(),
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    metric: c.metric,
                    values: c.values[from..].to_vec(),
                })
                .collect(),
        }
    }

    /// Replace every undefined value with `fill`.
    pub fn fill_undefined(mut self, fill: f64) -> Self {
        for column in &mut self.columns {
            for value in &mut column.values {
                if value.is_nan() {
                    *value = fill;
                }
            }
        }
        self
    }
}

/// Trailing mean over exactly `window` samples: `sum(values[t-window+1..=t]) / window`.
/// Positions before the window is full are undefined, as is any window
/// containing an undefined sample.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return vec![f64::NAN; values.len()];
    }
    (0..values.len())
        .map(|t| {
            if t + 1 < window {
                return f64::NAN;
            }
            let samples = &values[t + 1 - window..=t];
            if samples.iter().any(|v| v.is_nan()) {
                f64::NAN
            } else {
                samples.iter().sum::<f64>() / window as f64
            }
        })
        .collect()
}

/// Errors from building or combining time series.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeriesError {
    #[error("column '{0}' appears more than once")]
    DuplicateColumn(Metric),

    #[error("column '{0}' is missing")]
    MissingColumn(Metric),

    #[error("column '{metric}' has {actual} values for an index of {expected}")]
    LengthMismatch {
        metric: Metric,
        expected: usize,
        actual: usize,
    },

    #[error("index must be strictly increasing")]
    UnsortedIndex,
}
