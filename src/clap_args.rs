/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Energy comparison of container image retention tactics and deployment kinds", long_about = None)]
pub struct Args {
    /// Verbose mode (-v, --verbose)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "enercomp.toml")]
    pub file: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cumulative monthly energy of stored images, with and without a retention tactic
    Energy {
        /// Image records file (defaults to `paths.image_records`)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Also keep the month exactly one year back
        #[arg(long)]
        inclusive_boundary: bool,

        /// Plot both series in the terminal
        #[arg(long)]
        chart: bool,

        /// Print the month of every value
        #[arg(long)]
        labels: bool,
    },

    /// Extract image records from a container registry export
    Extract {
        /// Registry export (defaults to `paths.registry_export`)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (defaults to `paths.image_records`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare energy estimates of a carbon footprint export
    Footprint {
        /// Footprint export (defaults to `paths.footprint_export`)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// SVG chart output (defaults to `paths.chart`)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip rendering the SVG chart
        #[arg(long)]
        no_chart: bool,
    },

    /// Convert a CSV file with a header row into a JSON array of objects
    CsvToJson {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Run a load test against a users API
    Load {
        /// Base url of the users API (defaults to `load.host`)
        #[arg(long)]
        host: Option<String>,

        /// Number of simulated users (defaults to `load.users`)
        #[arg(short, long)]
        users: Option<u32>,

        /// Test duration in seconds (defaults to `load.duration_secs`)
        #[arg(short, long)]
        duration: Option<u64>,
    },

    /// Serve an in-memory users API
    Serve {
        /// Address to bind (defaults to `serve.bind`)
        #[arg(short, long)]
        bind: Option<String>,
    },
}

pub fn parse() -> Args {
    Args::parse()
}
