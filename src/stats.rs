/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use anyhow::anyhow;
use itertools::Itertools;

/// Read-only summary of a set of energy samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub mean: f64,
    pub minimum: f64,
    pub first_quartile: f64,
    pub median: f64,
    pub third_quartile: f64,
    pub maximum: f64,
    pub standard_deviation: f64,
}
impl Summary {
    pub fn from_values(values: &[f64]) -> anyhow::Result<Self> {
        if values.is_empty() {
            return Err(anyhow!("Cannot summarise an empty set of values"));
        }

        let sorted = values
            .iter()
            .copied()
            .sorted_by(|a, b| a.total_cmp(b))
            .collect_vec();

        let len = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / len;
        let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / len;

        Ok(Summary {
            mean,
            minimum: sorted[0],
            first_quartile: percentile(&sorted, 25.0),
            median: percentile(&sorted, 50.0),
            third_quartile: percentile(&sorted, 75.0),
            maximum: sorted[sorted.len() - 1],
            standard_deviation: variance.sqrt(),
        })
    }
}

/// Percentile of already sorted values, interpolating linearly between the two closest ranks.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    match sorted {
        [] => f64::NAN,
        [only] => *only,
        _ => {
            let rank = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
        }
    }
}

/// Element-wise `|a - b|` relative to the mean of `a` and `b`, in percent.
pub fn percentage_difference(a: &[f64], b: &[f64]) -> anyhow::Result<Vec<f64>> {
    if a.len() != b.len() {
        return Err(anyhow!(
            "Cannot compare series of different lengths ({} and {})",
            a.len(),
            b.len()
        ));
    }

    Ok(a.iter()
        .zip(b)
        .map(|(a, b)| (a - b).abs() / ((a + b) / 2.0) * 100.0)
        .collect())
}
