//! One external tool invocation and the runner that executes it.

use crate::error::DriverError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

/// An external process to run: program, ordered args, working directory and
/// environment overrides layered on top of the inherited environment.
#[derive(Clone, Debug, Serialize)]
pub struct Step {
    #[serde(serialize_with = "lossy")]
    program: OsString,
    #[serde(serialize_with = "lossy_all")]
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    #[serde(serialize_with = "lossy_map")]
    env: BTreeMap<String, OsString>,
}

impl Step {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
            cwd: None,
            env: BTreeMap::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Run in `dir` instead of the current directory.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<OsStr>) -> Self {
        self.env.insert(key.to_string(), value.as_ref().to_os_string());
        self
    }

    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<OsStr>,
    {
        for (k, v) in vars {
            self.env.insert(k.into(), v.as_ref().to_os_string());
        }
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    pub fn get_current_dir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn get_env(&self, key: &str) -> Option<&OsStr> {
        self.env.get(key).map(OsString::as_os_str)
    }

    /// Name used in error messages.
    pub fn display_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Space-joined command line, for logs only.
    pub fn command_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|s| s.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Build the `std::process::Command`. Stdio is inherited.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd.envs(&self.env);
        cmd
    }
}

/// Executes steps.
pub trait Runner {
    fn run(&mut self, step: &Step) -> Result<(), DriverError>;
}

/// Spawns real processes and blocks until each exits.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl Runner for SystemRunner {
    fn run(&mut self, step: &Step) -> Result<(), DriverError> {
        tracing::debug!(
            cwd = ?step.get_current_dir(),
            env = ?step.env,
            "running {}",
            step.command_line()
        );

        let status = step
            .to_command()
            .status()
            .map_err(|source| DriverError::Spawn {
                program: step.display_name(),
                source,
            })?;

        if !status.success() {
            return Err(DriverError::Failed {
                program: step.display_name(),
                code: status.code(),
            });
        }
        Ok(())
    }
}

fn lossy<S: serde::Serializer>(value: &OsString, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&value.to_string_lossy())
}

#[allow(clippy::ptr_arg)]
fn lossy_all<S: serde::Serializer>(values: &Vec<OsString>, s: S) -> Result<S::Ok, S::Error> {
    s.collect_seq(values.iter().map(|v| v.to_string_lossy()))
}

fn lossy_map<S: serde::Serializer>(
    values: &BTreeMap<String, OsString>,
    s: S,
) -> Result<S::Ok, S::Error> {
    s.collect_map(values.iter().map(|(k, v)| (k, v.to_string_lossy())))
}
