extern crate env_logger;
#[macro_use]
extern crate log;

use std::io::Write;

use anyhow::Result;
use clap::Parser;
use rand::rngs::SmallRng;
use rand::SeedableRng;

mod barcode;
mod cli;
mod consensus;
mod convert;
mod evaluate;
mod io;
mod rcm;
mod simulate;
mod stats;

use cli::{Cli, Commands};
use io::get_writer;

fn seeded_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => SmallRng::from_entropy(),
    }
}

fn try_main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let cli = Cli::parse();

    info!("rcmqc v{}", cli::VERSION);

    match &cli.command {
        Commands::Eval {
            rcm,
            reads,
            rate,
            preset,
            barcode_regex,
            distances,
            json,
            output,
        } => {
            let pattern = match barcode_regex {
                Some(v) => {
                    info!("Using specified barcode format: {v}");
                    v.clone()
                }
                None => {
                    let pattern = barcode::get_barcode_regex(preset);
                    info!("Using preset barcode format {pattern}");
                    pattern
                }
            };
            let extractor = barcode::BarcodeExtractor::new(&pattern)?;

            let mut writer = get_writer(output)?;
            let opts = evaluate::EvaluateOpts {
                rate: *rate,
                distances: *distances,
                json: *json,
            };

            evaluate::evaluate(rcm, reads, &extractor, &opts, &mut writer)?;
            writer.flush()?;

            info!("Completed successfully.")
        }
        Commands::SimulatedToRcm {
            file,
            output,
            skip_unmatched,
        } => {
            let mut writer = get_writer(output)?;
            convert::simulated_to_rcm(file, &mut writer, *skip_unmatched)?;
            writer.flush()?;

            info!("Completed successfully.")
        }
        Commands::SimulatedToRepertoire {
            file,
            output,
            skip_unmatched,
            seed,
        } => {
            let format = io::format_from_path(output)?;
            let mut writer = get_writer(&Some(output.clone()))?;
            let mut rng = seeded_rng(*seed);

            convert::simulated_to_repertoire(file, &mut writer, format, &mut rng, *skip_unmatched)?;
            writer.flush()?;

            info!("Completed successfully.")
        }
        Commands::FromMixcr { file, output } => {
            let mut writer = get_writer(output)?;
            convert::mixcr_to_repertoire(file, &mut writer)?;
            writer.flush()?;

            info!("Completed successfully.")
        }
        Commands::Noise {
            file,
            output,
            error_rate,
            fixed,
            min_errors,
            site_len,
            seed,
        } => {
            let format = io::format_from_path(output)?;
            let mut writer = get_writer(&Some(output.clone()))?;
            let mut rng = seeded_rng(*seed);
            let opts = simulate::NoiseOpts {
                error_rate: *error_rate,
                fixed: *fixed,
                min_errors: *min_errors,
                site_len: *site_len,
            };

            simulate::noise_file(file, &mut writer, format, &mut rng, &opts)?;
            writer.flush()?;

            info!("Completed successfully.")
        }
    };
    Ok(())
}

fn main() {
    if let Err(err) = try_main() {
        error!("{}", err);

        // report any errors that are produced
        err.chain()
            .skip(1)
            .for_each(|cause| error!("  because: {}", cause));

        std::process::exit(1);
    }
}
