/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::convert::write_pretty_json;
use anyhow::{anyhow, Context};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fs, path::Path};
use tracing::info;

/// A single image pushed to the container registry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub repository_name: String,
    pub image_tags: Vec<String>,
    pub image_size_in_bytes: f64,
    #[serde(deserialize_with = "deserialize_pushed_at")]
    pub image_pushed_at: DateTime<Utc>,
}
impl ImageRecord {
    pub fn has_tag_prefix(&self, prefix: &str) -> bool {
        self.image_tags.iter().any(|tag| tag.starts_with(prefix))
    }
}

/// Image entry as it appears in the registry's `imageDetails` export. Values are carried over
/// untouched so that extraction never rewrites sizes or timestamps.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryImage {
    pub repository_name: String,
    pub image_tags: Vec<String>,
    pub image_size_in_bytes: serde_json::Number,
    pub image_pushed_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistryExport {
    image_details: Vec<RegistryImage>,
}

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
];

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses an ISO-like timestamp. The wall-clock reading is kept and stamped as UTC, an explicit
/// offset is replaced rather than converted.
pub fn parse_timestamp(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_local().and_utc());
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Ok(dt.naive_local().and_utc());
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(dt.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| anyhow!("unrecognised timestamp '{}'", raw))
}

fn deserialize_pushed_at<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

pub fn parse_image_records(json: &str) -> anyhow::Result<Vec<ImageRecord>> {
    let records = serde_json::from_str::<Vec<ImageRecord>>(json)?;

    if let Some((idx, record)) = records
        .iter()
        .enumerate()
        .find(|(_, record)| record.image_size_in_bytes < 0.0)
    {
        return Err(anyhow!(
            "record {} ({}) has a negative imageSizeInBytes: {}",
            idx,
            record.repository_name,
            record.image_size_in_bytes
        ));
    }

    Ok(records)
}

/// Reads the flat list of image records produced by [`extract_image_records`].
pub fn load_image_records(path: &Path) -> anyhow::Result<Vec<ImageRecord>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Unable to read image records from {}", path.display()))?;

    let records = parse_image_records(&json)
        .with_context(|| format!("Invalid image records in {}", path.display()))?;

    info!("Loaded {} image records from {}", records.len(), path.display());
    Ok(records)
}

pub fn parse_registry_export(json: &str) -> anyhow::Result<Vec<RegistryImage>> {
    let export = serde_json::from_str::<RegistryExport>(json)?;
    Ok(export.image_details)
}

/// Keeps the four fields the energy estimate needs from every image in a registry export and
/// writes them to `output` as a JSON array.
///
/// # Returns
///
/// The number of images written
pub fn extract_image_records(input: &Path, output: &Path) -> anyhow::Result<usize> {
    let json = fs::read_to_string(input)
        .with_context(|| format!("Unable to read registry export {}", input.display()))?;

    let images = parse_registry_export(&json)
        .with_context(|| format!("Invalid registry export {}", input.display()))?;

    write_pretty_json(&images, output)?;
    info!(
        "Extracted {} images from {} into {}",
        images.len(),
        input.display(),
        output.display()
    );

    Ok(images.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn offset_is_replaced_not_converted() -> anyhow::Result<()> {
        let ts = parse_timestamp("2026-10-08T09:15:00+02:00")?;
        assert_eq!(ts, Utc.with_ymd_and_hms(2026, 10, 8, 9, 15, 0).unwrap());
        Ok(())
    }

    #[test]
    fn can_parse_common_timestamp_shapes() -> anyhow::Result<()> {
        let expected = Utc.with_ymd_and_hms(2026, 3, 14, 10, 0, 0).unwrap();

        for raw in [
            "2026-03-14T10:00:00Z",
            "2026-03-14T10:00:00.000000+00:00",
            "2026-03-14T10:00:00+0000",
            "2026-03-14 10:00:00+01:00",
            "2026-03-14T10:00:00",
            "2026-03-14 10:00:00.000",
        ] {
            assert_eq!(parse_timestamp(raw)?, expected, "parsing {}", raw);
        }

        assert_eq!(
            parse_timestamp("2026-03-14")?,
            Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap()
        );
        Ok(())
    }

    #[test]
    fn garbage_timestamp_should_fail() {
        assert!(parse_timestamp("last tuesday").is_err());
    }

    #[test]
    fn missing_field_is_named_in_error() {
        let json = r#"[{"repositoryName": "app-a", "imageSizeInBytes": 10, "imagePushedAt": "2026-01-01T00:00:00Z"}]"#;
        let err = parse_image_records(json).unwrap_err();
        assert!(format!("{:#}", err).contains("imageTags"));
    }

    #[test]
    fn mistyped_field_should_fail() {
        let json = r#"[{"repositoryName": "app-a", "imageTags": [], "imageSizeInBytes": "big", "imagePushedAt": "2026-01-01T00:00:00Z"}]"#;
        assert!(parse_image_records(json).is_err());
    }

    #[test]
    fn negative_size_should_fail() {
        let json = r#"[{"repositoryName": "app-a", "imageTags": [], "imageSizeInBytes": -1, "imagePushedAt": "2026-01-01T00:00:00Z"}]"#;
        let err = parse_image_records(json).unwrap_err();
        assert!(err.to_string().contains("negative"));
    }

    #[test]
    fn integer_and_float_sizes_are_accepted() -> anyhow::Result<()> {
        let json = r#"[
            {"repositoryName": "a", "imageTags": ["0.1"], "imageSizeInBytes": 1024, "imagePushedAt": "2026-01-01T00:00:00Z"},
            {"repositoryName": "b", "imageTags": ["1.0"], "imageSizeInBytes": 2048.5, "imagePushedAt": "2026-01-01T00:00:00Z"}
        ]"#;
        let records = parse_image_records(json)?;
        assert_eq!(records[0].image_size_in_bytes, 1024.0);
        assert_eq!(records[1].image_size_in_bytes, 2048.5);
        assert!(records[0].has_tag_prefix("0."));
        assert!(!records[1].has_tag_prefix("0."));
        Ok(())
    }

    #[test]
    fn missing_records_file_is_named_in_error() {
        let path = Path::new("./fixtures/does-not-exist.json");
        let err = load_image_records(path).unwrap_err();
        assert!(err.to_string().contains("does-not-exist.json"));
    }

    #[test]
    fn malformed_records_file_is_named_in_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("allrepo.json");
        fs::write(&path, r#"[{"repositoryName": "app-a","#)?;

        let err = load_image_records(&path).unwrap_err();
        assert!(err.to_string().contains(&path.display().to_string()));
        Ok(())
    }

    #[test]
    fn extract_names_the_export_in_errors() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let output = dir.path().join("allrepo.json");

        let missing = dir.path().join("missing.json");
        let err = extract_image_records(&missing, &output).unwrap_err();
        assert!(err.to_string().contains(&missing.display().to_string()));

        let broken = dir.path().join("allcontainerdata.json");
        fs::write(&broken, "{\"imageDetails\": [")?;
        let err = extract_image_records(&broken, &output).unwrap_err();
        assert!(err.to_string().contains(&broken.display().to_string()));
        assert!(!output.exists());
        Ok(())
    }

    #[test]
    fn registry_export_requires_image_details() {
        assert!(parse_registry_export(r#"{"images": []}"#).is_err());
    }
}
