/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{
    chart::{BarChart, BarSeries},
    config,
    stats::{percentage_difference, Summary},
};
use anyhow::{anyhow, Context};
use colored::Colorize;
use serde::Deserialize;
use std::{collections::HashMap, fs, path::Path};
use term_table::{row::Row, table_cell::TableCell, Table, TableStyle};
use tracing::debug;

const WATT_HOURS_PER_KWH: f64 = 1000.0;

/// One day (or period) of the footprint tool's export.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FootprintEntry {
    pub service_estimates: Vec<ServiceEstimate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEstimate {
    pub service_name: String,
    pub kilowatt_hours: f64,
    pub tags: HashMap<String, String>,
}

pub fn parse_footprint_export(json: &str) -> anyhow::Result<Vec<FootprintEntry>> {
    Ok(serde_json::from_str::<Vec<FootprintEntry>>(json)?)
}

pub fn load_footprint_export(path: &Path) -> anyhow::Result<Vec<FootprintEntry>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Unable to read footprint export {}", path.display()))?;
    parse_footprint_export(&json)
        .with_context(|| format!("Invalid footprint export {}", path.display()))
}

/// Watt-hours of every estimate for `service_name` tagged with one of `applications`, in export
/// order.
pub fn aggregate(
    entries: &[FootprintEntry],
    service_name: &str,
    applications: &[&str],
    tag_key: &str,
) -> Vec<f64> {
    entries
        .iter()
        .flat_map(|entry| entry.service_estimates.iter())
        .filter(|estimate| estimate.service_name == service_name)
        .filter(|estimate| {
            estimate
                .tags
                .get(tag_key)
                .is_some_and(|app| applications.contains(&app.as_str()))
        })
        .map(|estimate| estimate.kilowatt_hours * WATT_HOURS_PER_KWH)
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[derive(Debug, Clone)]
pub struct SeriesResult {
    pub name: String,

    /// Mean watt-hours per label.
    pub means: Vec<f64>,

    /// Every matched sample across all labels.
    pub samples: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct Comparison {
    pub title: String,
    pub x_label: String,
    pub labels: Vec<String>,
    pub series: Vec<SeriesResult>,
}
impl Comparison {
    pub fn to_chart(&self) -> BarChart {
        BarChart {
            title: self.title.clone(),
            x_label: self.x_label.clone(),
            y_label: "Energy Consumption in Watt-Hour".to_string(),
            labels: self.labels.clone(),
            series: self
                .series
                .iter()
                .map(|series| BarSeries {
                    name: series.name.clone(),
                    values: series.means.clone(),
                })
                .collect(),
        }
    }

    /// Percentage difference between the first two series, label by label.
    pub fn percentage_difference(&self) -> anyhow::Result<Option<Vec<f64>>> {
        match &self.series[..] {
            [first, second, ..] => Ok(Some(percentage_difference(&first.means, &second.means)?)),
            _ => Ok(None),
        }
    }
}

pub fn compare(entries: &[FootprintEntry], cfg: &config::Footprint) -> anyhow::Result<Comparison> {
    if cfg.series.is_empty() {
        return Err(anyhow!("No footprint series configured"));
    }

    let mut results = vec![];
    for series in cfg.series.iter() {
        if series.applications.len() != cfg.labels.len() {
            return Err(anyhow!(
                "Series {} names {} applications but there are {} labels",
                series.name,
                series.applications.len(),
                cfg.labels.len()
            ));
        }

        let mut means = vec![];
        let mut samples = vec![];
        for (label, application) in cfg.labels.iter().zip(series.applications.iter()) {
            let values = aggregate(
                entries,
                &series.service,
                &[application.as_str()],
                &cfg.tag_key,
            );
            debug!(
                "{} / {}: {} samples for {}",
                series.name,
                label,
                values.len(),
                application
            );

            means.push(mean(&values));
            samples.extend(values);
        }

        results.push(SeriesResult {
            name: series.name.clone(),
            means,
            samples,
        });
    }

    Ok(Comparison {
        title: cfg.title.clone(),
        x_label: cfg.x_label.clone(),
        labels: cfg.labels.clone(),
        series: results,
    })
}

fn header_cell(text: &str) -> TableCell {
    TableCell::new(text.bold())
}

/// Renders per-label means, per-series statistics and the percentage difference as tables.
pub fn render_summary(comparison: &Comparison) -> anyhow::Result<String> {
    let mut out = format!("\n{}\n", format!(" {} ", comparison.title).reversed().green());

    // mean watt-hours per label
    let mut header = vec![header_cell(&comparison.x_label)];
    header.extend(comparison.series.iter().map(|s| header_cell(&s.name)));

    let mut rows = vec![Row::new(header)];
    for (idx, label) in comparison.labels.iter().enumerate() {
        let mut cells = vec![TableCell::new(label)];
        cells.extend(
            comparison
                .series
                .iter()
                .map(|s| TableCell::new(format!("{:.3}Wh", s.means[idx]))),
        );
        rows.push(Row::new(cells));
    }
    let table = Table::builder().rows(rows).style(TableStyle::rounded()).build();
    out.push_str(&table.render());
    out.push('\n');

    // summary statistics over every sample of a series
    let mut rows = vec![Row::new(vec![
        header_cell("Series"),
        header_cell("Mean"),
        header_cell("Min"),
        header_cell("Q1"),
        header_cell("Median"),
        header_cell("Q3"),
        header_cell("Max"),
        header_cell("Std"),
    ])];
    for series in comparison.series.iter() {
        let cells = match Summary::from_values(&series.samples) {
            Ok(s) => [
                s.mean,
                s.minimum,
                s.first_quartile,
                s.median,
                s.third_quartile,
                s.maximum,
                s.standard_deviation,
            ]
            .iter()
            .map(|v| TableCell::new(format!("{:.3}", v)))
            .collect::<Vec<_>>(),
            Err(_) => (0..7).map(|_| TableCell::new("--".bright_black())).collect(),
        };

        let mut row = vec![TableCell::new(&series.name)];
        row.extend(cells);
        rows.push(Row::new(row));
    }
    let table = Table::builder().rows(rows).style(TableStyle::rounded()).build();
    out.push_str(&table.render());
    out.push('\n');

    if let Some(diff) = comparison.percentage_difference()? {
        let mut rows = vec![Row::new(vec![
            header_cell(&comparison.x_label),
            header_cell(&format!(
                "{} vs {}",
                comparison.series[0].name, comparison.series[1].name
            )),
        ])];
        for (label, diff) in comparison.labels.iter().zip(diff) {
            let diff = match diff.is_nan() {
                true => "--".to_string(),
                false => format!("{:.2}%", diff),
            };
            rows.push(Row::new(vec![TableCell::new(label), TableCell::new(diff)]));
        }
        let table = Table::builder().rows(rows).style(TableStyle::rounded()).build();
        out.push_str(&table.render());
        out.push('\n');
    }

    Ok(out)
}
