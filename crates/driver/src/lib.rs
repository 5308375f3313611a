//! # build-driver
//!
//! Shared plumbing for the Beef build tools: every tool is a linear pipeline
//! that parses PowerShell-style options, resolves a configuration, checks
//! preconditions and then runs external tools one after another.
//!
//! ## Layout
//!
//! - `args` - `-Name value` / `-Name=value` / `-Flag` parsing on top of clap
//! - `env` - explicit -> environment -> default resolution
//! - `paths` - existence checks for inputs, artifacts and tools
//! - `step` - one external process invocation and the runner that spawns it
//! - `stage` - copying artifacts into consumer directories
//! - `pipeline` - ordered plan of the above, executed fail-fast
//! - `logging` - tracing subscriber setup

pub mod args;
pub mod env;
pub mod error;
pub mod logging;
pub mod paths;
pub mod pipeline;
pub mod stage;
pub mod step;

pub use error::DriverError;
pub use pipeline::{Action, Plan};
pub use stage::ArtifactCopy;
pub use step::{Runner, Step, SystemRunner};
