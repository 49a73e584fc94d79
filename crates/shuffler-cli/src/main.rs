//! beat-shuffler: generate new loops from transient-delimited fragments

mod args;
mod config;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use args::Args;
use config::{load_config, RunSettings};
use pipeline::Generator;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "beat_shuffler=info,shuffler_core=info,shuffler_services=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref());
    let settings = RunSettings::resolve(args, config);

    info!(
        source = %settings.source_dir.display(),
        substitutions = %settings.substitution_dir.display(),
        seed = settings.seed,
        strategy = %settings.strategy,
        "Starting beat-shuffler"
    );

    let written = Generator::new(settings)?.run()?;
    info!(files = written.len(), "Done");
    Ok(())
}
