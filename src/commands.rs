/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{
    chart, config::Config, convert, energy, energy::BucketSpan, footprint, load_test, registry,
    target,
};
use chrono::Utc;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

const CHART_SIZE: (u32, u32) = (1024, 600);

pub struct EnergyOpts {
    pub input: Option<PathBuf>,
    pub inclusive_boundary: bool,
    pub chart: bool,
    pub labels: bool,
}

pub fn energy(cfg: &Config, opts: EnergyOpts) -> anyhow::Result<energy::EnergySeries> {
    let input = opts.input.unwrap_or_else(|| cfg.paths.image_records.clone());
    let span = match opts.inclusive_boundary || cfg.energy.inclusive_boundary {
        true => BucketSpan::InclusiveBoundary,
        false => BucketSpan::TrailingYear,
    };

    let records = registry::load_image_records(&input)?;

    let series = energy::compute(&records, Utc::now(), span);

    if opts.labels {
        println!("{:?}", series.months);
    }
    println!("{:?}", series.no_tactic);
    println!("{:?}", series.with_tactic);

    if opts.chart {
        chart::print_series(
            "Cumulative Watt-Hours",
            &[
                ("No Tactic", series.no_tactic.as_slice()),
                ("With Tactic", series.with_tactic.as_slice()),
            ],
        );
    }

    Ok(series)
}

pub fn extract(cfg: &Config, input: Option<PathBuf>, output: Option<PathBuf>) -> anyhow::Result<()> {
    let input = input.unwrap_or_else(|| cfg.paths.registry_export.clone());
    let output = output.unwrap_or_else(|| cfg.paths.image_records.clone());

    let count = registry::extract_image_records(&input, &output)?;
    println!("{} {} images", "Extracted".green(), count);
    Ok(())
}

pub fn footprint(
    cfg: &Config,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    no_chart: bool,
) -> anyhow::Result<footprint::Comparison> {
    let input = input.unwrap_or_else(|| cfg.paths.footprint_export.clone());
    let output = output.unwrap_or_else(|| cfg.paths.chart.clone());

    let entries = footprint::load_footprint_export(&input)?;
    let comparison = footprint::compare(&entries, &cfg.footprint)?;
    println!("{}", footprint::render_summary(&comparison)?);

    if !no_chart {
        comparison.to_chart().render_svg(&output, CHART_SIZE)?;
        println!("{} {}", "Chart written to".green(), output.display());
    }

    Ok(comparison)
}

pub fn csv_to_json(input: &Path, output: &Path) -> anyhow::Result<()> {
    let count = convert::csv_to_json(input, output)?;
    println!("{} {} rows", "Converted".green(), count);
    Ok(())
}

pub async fn load(
    cfg: &Config,
    host: Option<String>,
    users: Option<u32>,
    duration: Option<u64>,
    token: CancellationToken,
) -> anyhow::Result<load_test::LoadReport> {
    let mut load = cfg.load.clone();
    if let Some(host) = host {
        load.host = host;
    }
    if let Some(users) = users {
        load.users = users;
    }
    if let Some(duration) = duration {
        load.duration_secs = duration;
    }

    let report = load_test::run(&load, token).await?;
    println!("\n{}", " Load Test ".reversed().green());
    println!("{}", report.render());
    Ok(report)
}

pub async fn serve(cfg: &Config, bind: Option<String>, token: CancellationToken) -> anyhow::Result<()> {
    let bind = bind.unwrap_or_else(|| cfg.serve.bind.clone());
    target::serve(&bind, token).await
}
