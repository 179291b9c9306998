/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Monthly storage-energy estimate for registry images, with and without the retention tactic.

use crate::registry::ImageRecord;
use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use itertools::Itertools;

pub const BYTES_PER_TERABYTE: f64 = 1_099_511_627_776.0; // 1024^4

/// Watt-hours per terabyte-day of stored image, before the final conversion.
pub const MULTIPLIER: f64 = 1.2 * 24.0 * 1.135 * 3.0 / 1000.0;

const WATT_HOURS: f64 = 1000.0;
const TRAILING_DAYS: i64 = 365;
const TRAILING_MONTHS: usize = 12;

const RECENT_TAG_PREFIX: &str = "0.";
const RECENT_WINDOW_DAYS: i64 = 30;
const RELEASE_TAG_PREFIX: &str = "1.";
const RELEASE_WINDOW_DAYS: i64 = 365;

pub fn estimate(size_in_bytes: f64) -> f64 {
    size_in_bytes / BYTES_PER_TERABYTE * MULTIPLIER
}

/// How far back the monthly walk goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BucketSpan {
    /// The current month and the 11 before it.
    #[default]
    TrailingYear,

    /// Also keep the month one year back whenever the walk still reaches it.
    InclusiveBoundary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthBucket {
    key: String,
    boundary: DateTime<Utc>,
}
impl MonthBucket {
    fn new(month: DateTime<Utc>, boundary: DateTime<Utc>) -> Self {
        Self {
            key: month.format("%Y-%m").to_string(),
            boundary,
        }
    }

    /// `YYYY-MM`
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn boundary(&self) -> DateTime<Utc> {
        self.boundary
    }

    pub fn year(&self) -> i32 {
        self.boundary.year()
    }

    pub fn month(&self) -> u32 {
        self.boundary.month()
    }
}

fn first_of_month(instant: DateTime<Utc>) -> DateTime<Utc> {
    let date = instant.date_naive() - Duration::days(instant.day0() as i64);
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Walks backward one calendar month at a time from the current month until the walk crosses
/// one year before `now`. Buckets are returned newest first.
///
/// The current month's boundary is `now` itself. Every earlier bucket is bounded by midnight on
/// the last day of its month.
pub fn month_buckets(now: DateTime<Utc>, span: BucketSpan) -> Vec<MonthBucket> {
    let one_year_ago = now - Duration::days(TRAILING_DAYS);

    let mut cursor = first_of_month(now);
    let mut buckets = vec![MonthBucket::new(cursor, now)];

    loop {
        // midnight on the last day of the previous month
        cursor = first_of_month(cursor) - Duration::days(1);
        if cursor < one_year_ago {
            break;
        }
        if span == BucketSpan::TrailingYear && buckets.len() == TRAILING_MONTHS {
            break;
        }
        buckets.push(MonthBucket::new(cursor, cursor));
    }

    buckets
}

fn pushed_within(record: &ImageRecord, boundary: DateTime<Utc>, days: i64) -> bool {
    let start = boundary - Duration::days(days);
    start <= record.image_pushed_at && record.image_pushed_at <= boundary
}

/// Which images are assumed to stay in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Every image pushed up to the bucket's month is kept.
    ///
    /// Year and month are compared independently, so an image from December of one year does
    /// not count towards April of the next.
    NoTactic,

    /// `0.*` images are kept for 30 days and `1.*` images for a year. An image carrying both
    /// kinds of tag counts once for each.
    WithTactic,
}
impl Policy {
    pub fn includes(&self, record: &ImageRecord, bucket: &MonthBucket) -> usize {
        match self {
            Policy::NoTactic => {
                let pushed = record.image_pushed_at;
                usize::from(pushed.year() <= bucket.year() && pushed.month() <= bucket.month())
            }

            Policy::WithTactic => {
                let recent = record.has_tag_prefix(RECENT_TAG_PREFIX)
                    && pushed_within(record, bucket.boundary(), RECENT_WINDOW_DAYS);
                let release = record.has_tag_prefix(RELEASE_TAG_PREFIX)
                    && pushed_within(record, bucket.boundary(), RELEASE_WINDOW_DAYS);
                usize::from(recent) + usize::from(release)
            }
        }
    }

    pub fn bucket_sum(&self, records: &[ImageRecord], bucket: &MonthBucket) -> f64 {
        records.iter().fold(0.0, |acc, record| {
            acc + self.includes(record, bucket) as f64 * estimate(record.image_size_in_bytes)
        })
    }

    /// Per-bucket sums, in the same order as `buckets`.
    pub fn bucket_sums(&self, records: &[ImageRecord], buckets: &[MonthBucket]) -> Vec<f64> {
        buckets
            .iter()
            .map(|bucket| self.bucket_sum(records, bucket))
            .collect()
    }
}

/// Orders the bucket sums oldest first and turns them into a running total in watt-hours.
pub fn cumulative_watt_hours(buckets: &[MonthBucket], sums: &[f64]) -> Vec<f64> {
    buckets
        .iter()
        .zip(sums.iter())
        .sorted_by(|(a, _), (b, _)| a.key.cmp(&b.key))
        .scan(0.0, |total, (_, sum)| {
            *total += sum;
            Some(*total * WATT_HOURS)
        })
        .collect()
}

/// Cumulative estimates of both policies, oldest month first.
#[derive(Debug, Clone)]
pub struct EnergySeries {
    pub months: Vec<String>,
    pub no_tactic: Vec<f64>,
    pub with_tactic: Vec<f64>,
}

pub fn compute(records: &[ImageRecord], now: DateTime<Utc>, span: BucketSpan) -> EnergySeries {
    let buckets = month_buckets(now, span);

    let months = buckets
        .iter()
        .map(|bucket| bucket.key.clone())
        .sorted()
        .collect();

    let no_tactic = cumulative_watt_hours(&buckets, &Policy::NoTactic.bucket_sums(records, &buckets));
    let with_tactic =
        cumulative_watt_hours(&buckets, &Policy::WithTactic.bucket_sums(records, &buckets));

    EnergySeries {
        months,
        no_tactic,
        with_tactic,
    }
}
