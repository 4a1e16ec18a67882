//! The `strata-server` binary: opens a save, loads a slice range, and prints it.

use std::path::PathBuf;

use clap::Parser;
use strata_config::{CliArgs, Config, default_config_dir};
use strata_server::{RonStore, Session, SessionError, render_rows};

fn main() {
    let args = CliArgs::parse();
    if let Err(e) = run(&args) {
        eprintln!("strata-server: {e}");
        std::process::exit(1);
    }
}

fn run(args: &CliArgs) -> Result<(), SessionError> {
    let config_dir = args
        .config
        .clone()
        .or_else(default_config_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    let mut config = Config::load_or_create(&config_dir)?;
    config.apply_cli_overrides(args);
    strata_log::init_logging(config.debug.log_dir.as_deref(), Some(&config));

    let store = RonStore::new(&config.server.data_dir, config.world_gen.chunk_size);
    let mut session = Session::open_or_create(store, &args.save, args.seed, &config)?;
    session.load_chunks(args.from..args.to)?;

    if args.gravity {
        let deltas = session.apply_gravity(args.from..args.to)?;
        tracing::info!(columns = deltas.len(), "applied one gravity step");
    }

    let height = session.generator().tables().height;
    for line in render_rows(session.map(), args.from, args.to, height) {
        println!("{line}");
    }

    session.save_meta()?;
    Ok(())
}
