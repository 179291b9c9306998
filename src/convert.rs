/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use anyhow::Context;
use csv::ReaderBuilder;
use serde::Serialize;
use serde_json::{ser::PrettyFormatter, Map, Value};
use std::{
    fs::File,
    io::{BufWriter, Read, Write},
    path::Path,
};
use tracing::info;

/// Serializes `value` as JSON indented by four spaces.
pub fn write_pretty_json<T>(value: &T, path: &Path) -> anyhow::Result<()>
where
    T: Serialize + ?Sized,
{
    let file = File::create(path).with_context(|| format!("Unable to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    value
        .serialize(&mut serializer)
        .with_context(|| format!("Unable to write JSON to {}", path.display()))?;

    writer.flush()?;
    Ok(())
}

/// Reads CSV with a header row into one JSON object per row. Values stay strings and columns
/// keep their header order.
pub fn csv_rows<R: Read>(reader: R) -> anyhow::Result<Vec<Map<String, Value>>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = reader.headers().context("Missing CSV header row")?.clone();

    let mut rows = vec![];
    for (idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Malformed CSV row {}", idx + 1))?;
        let row = headers
            .iter()
            .zip(record.iter())
            .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
            .collect::<Map<_, _>>();
        rows.push(row);
    }

    Ok(rows)
}

pub fn csv_to_json(csv_path: &Path, json_path: &Path) -> anyhow::Result<usize> {
    let file = File::open(csv_path)
        .with_context(|| format!("Unable to open CSV file {}", csv_path.display()))?;
    let rows = csv_rows(file).with_context(|| format!("Invalid CSV file {}", csv_path.display()))?;

    write_pretty_json(&rows, json_path)?;
    info!(
        "Converted {} rows from {} into {}",
        rows.len(),
        csv_path.display(),
        json_path.display()
    );

    Ok(rows.len())
}
