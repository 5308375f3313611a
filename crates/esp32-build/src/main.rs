//! # esp32-build
//!
//! Build the Beef ESP32 static libraries, copy them into the `beef`
//! component of an ESP-IDF project and hand off to `idf.py`.
//!
//! ## Usage
//!
//! ```bash
//! esp32-build -WorkspacePath ~/beefesp32demo -IdfProjectPath ~/esp32demo/hello_world
//! esp32-build -CopyRuntime -Flash -Monitor -Port /dev/ttyACM0
//! esp32-build -Baud 0 -Flash          # let idf.py pick the baud rate
//! esp32-build -DryRun                 # print the plan only
//! ```
//!
//! ## Pipeline
//!
//! 1. `BeefBuild -platform=ESP32` produces `<project>.a` and `corlib.a`
//! 2. Both (plus the runtime with `-CopyRuntime`) go to `components/beef/lib`
//! 3. `idf.py build`, then optionally `flash` and `monitor`

use anyhow::{Context, Result};
use build_driver::args::{self, Invocation};
use build_driver::env::ProcessEnv;
use build_driver::{logging, SystemRunner};

mod cli;
mod config;
mod plan;

fn main() -> Result<()> {
    let tokens: Vec<String> = std::env::args().skip(1).collect();
    let cli = match args::parse::<cli::Cli>(&tokens) {
        Ok(Invocation::Run(cli)) => cli,
        Ok(Invocation::Help) => {
            print!("{}", args::usage::<cli::Cli>());
            return Ok(());
        }
        Err(err) => return Err(args::with_usage::<cli::Cli>(err).into()),
    };

    logging::init(cli.verbose);

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let config =
        config::resolve(&cli, &ProcessEnv, &cwd).map_err(args::with_usage::<cli::Cli>)?;
    tracing::debug!(?config, "resolved configuration");

    let plan = plan::build(&config);
    if cli.dry_run {
        let report = plan::Report {
            config: &config,
            plan: &plan,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    plan.execute(&mut SystemRunner)?;

    println!("Done.");
    Ok(())
}
