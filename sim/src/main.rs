use anyhow::Result;
use clap::Parser;
use tracing::info;

use sim::{build_sim_app, load_config, Args};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let cfg = args.apply(load_config(&args.config)?);
    info!(?cfg, "Sim config loaded");

    let mut app = build_sim_app(cfg)?;
    app.run();
    Ok(())
}
