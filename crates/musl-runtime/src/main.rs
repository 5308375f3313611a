//! # zig-build-musl-runtime
//!
//! Cross-build the Beef runtime (BeefRT + BeefySysLib) as static archives for
//! musl Linux, using Zig as the C/C++ compiler behind CMake + Ninja.
//!
//! ## Usage
//!
//! ```bash
//! zig-build-musl-runtime                          # x64, zig from PATH
//! zig-build-musl-runtime -Arch arm32 -EnableFFI   # armv7 hard-float with FFI
//! zig-build-musl-runtime -Zig=/opt/zig/zig -AlsoCopyToDist
//! zig-build-musl-runtime -DryRun                  # print the plan only
//! ```
//!
//! The archives land in `<root>/IDE/dist/rt/<target-triple>`.

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

    println!("Done. Runtime libs in: {}", config.out_dir.value.display());
    Ok(())
}
