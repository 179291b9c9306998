/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use anyhow::anyhow;
use colored::Colorize;
use plotters::prelude::*;
use std::path::Path;
use textplots::{Chart as TextChart, Plot, Shape};

const GROUP_WIDTH: f64 = 0.8;
const TERMINAL_SIZE: (u32, u32) = (160, 60);

#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub name: String,
    pub values: Vec<f64>,
}

/// Grouped bar chart, one group per label and one bar per series within each group.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub labels: Vec<String>,
    pub series: Vec<BarSeries>,
}
impl BarChart {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.labels.is_empty() || self.series.is_empty() {
            return Err(anyhow!("Chart '{}' has nothing to draw", self.title));
        }

        if let Some(series) = self
            .series
            .iter()
            .find(|series| series.values.len() != self.labels.len())
        {
            return Err(anyhow!(
                "Series {} has {} values but the chart has {} labels",
                series.name,
                series.values.len(),
                self.labels.len()
            ));
        }

        Ok(())
    }

    fn y_max(&self) -> f64 {
        let max = self
            .series
            .iter()
            .flat_map(|series| series.values.iter())
            .copied()
            .filter(|v| v.is_finite())
            .fold(0.0, f64::max);

        if max > 0.0 {
            max * 1.1
        } else {
            1.0
        }
    }

    /// Left edge and width of the bar for `series_idx` in the group at `label_idx`.
    pub fn bar_span(&self, label_idx: usize, series_idx: usize) -> (f64, f64) {
        let width = GROUP_WIDTH / self.series.len() as f64;
        let left = label_idx as f64 - GROUP_WIDTH / 2.0 + series_idx as f64 * width;
        (left, width)
    }

    /// Draws the chart into an SVG file.
    pub fn render_svg(&self, path: &Path, size: (u32, u32)) -> anyhow::Result<()> {
        self.validate()?;

        let n = self.labels.len();
        let root = SVGBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&self.title, ("sans-serif", 24))
            .x_label_area_size(40)
            .y_label_area_size(60)
            .margin(10)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..self.y_max())?;

        let labels = &self.labels;
        let x_label_formatter = |x: &f64| {
            let idx = x.round();
            if (x - idx).abs() < 1e-6 && idx >= 0.0 && (idx as usize) < labels.len() {
                labels[idx as usize].clone()
            } else {
                String::new()
            }
        };

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc(&self.x_label)
            .y_desc(&self.y_label)
            .x_labels(n)
            .x_label_formatter(&x_label_formatter)
            .y_label_formatter(&|y| format!("{:.2}", y))
            .draw()?;

        for (series_idx, series) in self.series.iter().enumerate() {
            let color = Palette99::pick(series_idx).to_rgba();

            chart
                .draw_series(series.values.iter().enumerate().map(|(label_idx, value)| {
                    let (left, width) = self.bar_span(label_idx, series_idx);
                    Rectangle::new([(left, 0.0), (left + width, *value)], color.filled())
                }))?
                .label(&series.name)
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }
}

/// Plots one or more series as lines in the terminal, indexed by position.
pub fn print_series(title: &str, series: &[(&str, &[f64])]) {
    let points = series
        .iter()
        .map(|(_, values)| {
            values
                .iter()
                .enumerate()
                .map(|(x, y)| (x as f32, *y as f32))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let xmax = points.iter().map(|p| p.len()).max().unwrap_or(0);
    if xmax < 2 {
        return;
    }

    println!("\n{}", format!(" {} ", title).reversed().green());
    for (idx, (name, _)) in series.iter().enumerate() {
        println!("  [{}] {}", idx + 1, name);
    }

    let shapes = points
        .iter()
        .map(|p| Shape::Lines(p.as_slice()))
        .collect::<Vec<_>>();
    shapes
        .iter()
        .fold(
            &mut TextChart::new(TERMINAL_SIZE.0, TERMINAL_SIZE.1, 0.0, (xmax - 1) as f32),
            |chart, shape| chart.lineplot(shape),
        )
        .display();
}
