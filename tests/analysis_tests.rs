/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use chrono::{DateTime, TimeZone, Utc};
use enercomp::{
    config::Config,
    convert,
    energy::{self, BucketSpan, MULTIPLIER},
    footprint, registry,
};
use serde_json::Value;
use std::{fs, path::Path};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
}

/// Converts terabyte counts into the watt-hours the energy series reports.
fn watt_hours(terabytes: &[f64]) -> Vec<f64> {
    terabytes.iter().map(|tb| tb * MULTIPLIER * 1000.0).collect()
}

fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "{:?} vs {:?}", actual, expected);
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-9, "{:?} vs {:?}", actual, expected);
    }
}

#[test]
fn energy_series_from_image_records() -> anyhow::Result<()> {
    let records = registry::load_image_records(Path::new("./fixtures/allrepo.json"))?;
    assert_eq!(records.len(), 4);

    let series = energy::compute(&records, now(), BucketSpan::TrailingYear);
    assert_eq!(series.months.first().map(String::as_str), Some("2025-11"));
    assert_eq!(series.months.last().map(String::as_str), Some("2026-10"));

    assert_close(
        &series.no_tactic,
        &watt_hours(&[0.0, 0.5, 0.5, 0.5, 2.5, 4.5, 6.5, 9.5, 12.5, 15.5, 18.5, 22.5]),
    );
    assert_close(
        &series.with_tactic,
        &watt_hours(&[0.0, 0.5, 1.0, 1.5, 4.0, 6.5, 9.0, 12.5, 15.0, 17.5, 20.0, 23.5]),
    );
    Ok(())
}

#[test]
fn inclusive_boundary_prepends_the_year_back_month() -> anyhow::Result<()> {
    let records = registry::load_image_records(Path::new("./fixtures/allrepo.json"))?;

    let series = energy::compute(&records, now(), BucketSpan::InclusiveBoundary);
    assert_eq!(series.months.len(), 13);
    assert_eq!(series.months[0], "2025-10");
    assert_close(
        &series.no_tactic,
        &watt_hours(&[0.0, 0.0, 0.5, 0.5, 0.5, 2.5, 4.5, 6.5, 9.5, 12.5, 15.5, 18.5, 22.5]),
    );
    Ok(())
}

#[test]
fn tactic_never_costs_more_for_recent_images_only() -> anyhow::Result<()> {
    let records = registry::load_image_records(Path::new("./fixtures/allrepo.json"))?
        .into_iter()
        .filter(|record| record.has_tag_prefix("0."))
        .collect::<Vec<_>>();

    let series = energy::compute(&records, now(), BucketSpan::TrailingYear);
    for (with, without) in series.with_tactic.iter().zip(series.no_tactic.iter()) {
        assert!(with <= without);
    }
    Ok(())
}

#[test]
fn extracted_records_feed_the_energy_estimate() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let output = dir.path().join("allrepo.json");

    let count =
        registry::extract_image_records(Path::new("./fixtures/allcontainerdata.json"), &output)?;
    assert_eq!(count, 4);

    // only the four record fields survive, values untouched
    let written: Vec<Value> = serde_json::from_str(&fs::read_to_string(&output)?)?;
    let keys = written[0]
        .as_object()
        .map(|obj| obj.keys().cloned().collect::<Vec<_>>())
        .unwrap_or_default();
    assert_eq!(
        keys,
        vec![
            "repositoryName",
            "imageTags",
            "imageSizeInBytes",
            "imagePushedAt"
        ]
    );
    assert_eq!(written[0]["imagePushedAt"], "2026-10-08T09:15:00+02:00");
    assert_eq!(written[1]["imageSizeInBytes"], 2199023255552u64);

    let extracted = registry::load_image_records(&output)?;
    let fixture = registry::load_image_records(Path::new("./fixtures/allrepo.json"))?;
    assert_eq!(extracted, fixture);
    Ok(())
}

#[test]
fn csv_converts_to_string_objects() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let output = dir.path().join("users.json");

    let count = convert::csv_to_json(Path::new("./fixtures/users.csv"), &output)?;
    assert_eq!(count, 3);

    let json = fs::read_to_string(&output)?;
    assert!(json.starts_with("[\n    {\n        \"id\""));

    let rows: Vec<serde_json::Map<String, Value>> = serde_json::from_str(&json)?;
    let columns = rows[0].keys().map(String::as_str).collect::<Vec<_>>();
    assert_eq!(columns, vec!["id", "name", "email", "age", "company"]);

    assert_eq!(rows[1]["age"], "027");
    assert_eq!(rows[1]["company"], "Smith, Brown & Partners");
    assert_eq!(rows[2]["email"], "");
    Ok(())
}

#[test]
fn footprint_comparison_from_config() -> anyhow::Result<()> {
    let cfg = Config::try_from_path(Path::new("./fixtures/enercomp.toml"))?;
    let entries = footprint::load_footprint_export(&cfg.paths.footprint_export)?;
    let comparison = footprint::compare(&entries, &cfg.footprint)?;

    let names = comparison
        .series
        .iter()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Container", "Serverless"]);
    assert_close(&comparison.series[1].means, &[1.0, 3.2]);

    let dir = tempfile::tempdir()?;
    let chart = dir.path().join("comparison.svg");
    comparison.to_chart().render_svg(&chart, (640, 480))?;
    assert!(fs::read_to_string(&chart)?.contains("Serverless"));
    Ok(())
}
