/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use enercomp::{
    clap_args::{self, Commands},
    commands::{self, EnergyOpts},
    config::Config,
    init_tracing,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env may carry RUST_LOG
    dotenvy::dotenv().ok();

    let args = clap_args::parse();
    init_tracing(args.verbose)?;

    let cfg = Config::load_or_default(&args.file)?;

    // stop long running commands on ctrl-c
    let token = CancellationToken::new();
    let ctrlc_token = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received ctrl-c, shutting down");
                ctrlc_token.cancel();
            }
            Err(err) => warn!("Unable to listen for ctrl-c: {}", err),
        }
    });

    match args.command {
        Commands::Energy {
            input,
            inclusive_boundary,
            chart,
            labels,
        } => {
            commands::energy(
                &cfg,
                EnergyOpts {
                    input,
                    inclusive_boundary,
                    chart,
                    labels,
                },
            )?;
        }

        Commands::Extract { input, output } => commands::extract(&cfg, input, output)?,

        Commands::Footprint {
            input,
            output,
            no_chart,
        } => {
            commands::footprint(&cfg, input, output, no_chart)?;
        }

        Commands::CsvToJson { input, output } => commands::csv_to_json(&input, &output)?,

        Commands::Load {
            host,
            users,
            duration,
        } => {
            commands::load(&cfg, host, users, duration, token).await?;
        }

        Commands::Serve { bind } => commands::serve(&cfg, bind, token).await?,
    }

    Ok(())
}
