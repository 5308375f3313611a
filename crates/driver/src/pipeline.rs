//! A tool's whole run as an ordered, fail-fast list of actions.

use crate::error::DriverError;
use crate::paths;
use crate::stage::{self, ArtifactCopy};
use crate::step::{Runner, Step};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Progress line on stdout, e.g. `[1/3] Build Beef ESP32 libs`.
    Announce { message: String },
    Run { step: Step },
    /// Outputs the previous step must have produced.
    Expect { paths: Vec<PathBuf> },
    Stage { copies: Vec<ArtifactCopy> },
}

/// Preconditions plus actions, checked and executed strictly in order.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Plan {
    pub preconditions: Vec<PathBuf>,
    pub actions: Vec<Action>,
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(mut self, path: impl Into<PathBuf>) -> Self {
        self.preconditions.push(path.into());
        self
    }

    pub fn announce(mut self, message: impl Into<String>) -> Self {
        self.actions.push(Action::Announce {
            message: message.into(),
        });
        self
    }

    pub fn run(mut self, step: Step) -> Self {
        self.actions.push(Action::Run { step });
        self
    }

    pub fn expect<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.actions.push(Action::Expect {
            paths: paths.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn stage(mut self, copies: Vec<ArtifactCopy>) -> Self {
        if !copies.is_empty() {
            self.actions.push(Action::Stage { copies });
        }
        self
    }

    /// Every step in the plan, in execution order.
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.actions.iter().filter_map(|a| match a {
            Action::Run { step } => Some(step),
            _ => None,
        })
    }

    /// Every file the plan will write.
    pub fn staged_files(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.actions
            .iter()
            .filter_map(|a| match a {
                Action::Stage { copies } => Some(copies.iter().map(ArtifactCopy::destination)),
                _ => None,
            })
            .flatten()
    }

    /// Validate preconditions, then run each action. The first failure
    /// aborts the rest.
    pub fn execute(&self, runner: &mut dyn Runner) -> Result<(), DriverError> {
        paths::require_all(&self.preconditions)?;

        for action in &self.actions {
            match action {
                Action::Announce { message } => println!("{message}"),
                Action::Run { step } => runner.run(step)?,
                Action::Expect { paths } => paths::expect_artifacts(paths)?,
                Action::Stage { copies } => {
                    stage::stage(copies)?;
                }
            }
        }
        Ok(())
    }
}
