/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

pub mod chart;
pub mod clap_args;
pub mod commands;
pub mod config;
pub mod convert;
pub mod energy;
pub mod footprint;
pub mod registry;
pub mod stats;
pub mod target;

use anyhow::Context;
use tracing::subscriber::set_global_default;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber. `RUST_LOG` wins over the verbosity flag.
pub fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    set_global_default(subscriber).context("Failed to set tracing subscriber")
}
