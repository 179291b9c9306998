/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

// ******** ******** ********
// **    CONFIGURATION     **
// ******** ******** ********
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub paths: Paths,
    pub energy: Energy,
    pub footprint: Footprint,
    pub load: Load,
    pub serve: Serve,
}
impl Config {
    pub fn try_from_path(path: &Path) -> anyhow::Result<Config> {
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Unable to read config file {}", path.display()))?;
        Config::try_from_str(&config_str)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn try_from_str(conf_str: &str) -> anyhow::Result<Config> {
        toml::from_str::<Config>(conf_str).map_err(|e| anyhow::anyhow!("TOML parsing error: {}", e))
    }

    /// Loads the config at `path`, falling back to defaults when there is no such file.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Config> {
        if path.exists() {
            Config::try_from_path(path)
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Ok(Config::default())
        }
    }
}

/// Files read and written by the analysis commands.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Paths {
    pub registry_export: PathBuf,
    pub image_records: PathBuf,
    pub footprint_export: PathBuf,
    pub chart: PathBuf,
}
impl Default for Paths {
    fn default() -> Self {
        Self {
            registry_export: PathBuf::from("allcontainerdata.json"),
            image_records: PathBuf::from("repodata/allrepo.json"),
            footprint_export: PathBuf::from("ccfjsonresult.json"),
            chart: PathBuf::from("comparison.svg"),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Energy {
    pub inclusive_boundary: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub service: String,

    /// One application tag per comparison label.
    pub applications: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Footprint {
    pub title: String,
    pub x_label: String,
    pub tag_key: String,
    pub labels: Vec<String>,
    pub series: Vec<Series>,
}
impl Default for Footprint {
    fn default() -> Self {
        Self {
            title: "Container vs Serverless".to_string(),
            x_label: "Concurrent Users".to_string(),
            tag_key: "user:Application".to_string(),
            labels: vec![],
            series: vec![],
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct TaskWeights {
    pub list: u32,
    pub create: u32,
    pub update: u32,
    pub delete: u32,
}
impl Default for TaskWeights {
    fn default() -> Self {
        Self {
            list: 5,
            create: 1,
            update: 1,
            delete: 1,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Load {
    pub host: String,
    pub users: u32,
    pub wait_time_ms: u64,
    pub duration_secs: u64,
    pub request_timeout_ms: u64,
    pub weights: TaskWeights,
}
impl Default for Load {
    fn default() -> Self {
        Self {
            host: "http://localhost:8080".to_string(),
            users: 10,
            wait_time_ms: 5000,
            duration_secs: 60,
            request_timeout_ms: 10_000,
            weights: TaskWeights::default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Serve {
    pub bind: String,
}
impl Default for Serve {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}
