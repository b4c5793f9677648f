use anyhow::Context;
use clap::Parser;
use hold_ring::config;
use hold_ring::gui::app::{AppInit, AppModel};
use hold_ring::sys::runtime;
use relm4::prelude::*;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Press-and-hold progress ring", long_about = None)]
struct Args {
    /// Config file to use instead of the per-user one
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the default config file, print its path and exit
    #[arg(long)]
    init_config: bool,

    #[arg(long, default_value_t = 320)]
    width: i32,

    #[arg(long, default_value_t = 360)]
    height: i32,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    if args.init_config {
        let path = config::write_default_config().context("failed to write default config")?;
        println!("{}", path.display());
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => config::load_config_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => config::load_or_default(),
    };

    let (tx, rx) = async_channel::bounded(32);

    runtime::start_background_services(tx, args.config.clone());

    // clap owns the command line, GTK gets none of it
    let app = RelmApp::new("org.holdring.demo").with_args(Vec::new());

    app.run::<AppModel>(AppInit {
        config,
        config_path: args.config,
        events: rx,
        size: (args.width, args.height),
    });

    Ok(())
}
