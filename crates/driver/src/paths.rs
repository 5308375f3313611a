//! Existence checks run before and between pipeline stages.

use crate::error::DriverError;
use std::path::{Component, Path, PathBuf};

/// Fail with [`DriverError::MissingPath`] unless `path` is a file or directory.
pub fn require(path: &Path) -> Result<(), DriverError> {
    if path.exists() {
        Ok(())
    } else {
        Err(DriverError::MissingPath(path.to_path_buf()))
    }
}

/// Check every path, stopping at the first one that is missing.
pub fn require_all<P: AsRef<Path>>(paths: &[P]) -> Result<(), DriverError> {
    paths.iter().try_for_each(|p| require(p.as_ref()))
}

/// Check outputs a stage was supposed to produce.
pub fn expect_artifacts<P: AsRef<Path>>(paths: &[P]) -> Result<(), DriverError> {
    match paths.iter().map(AsRef::as_ref).find(|p| !p.exists()) {
        Some(missing) => Err(DriverError::MissingArtifact(missing.to_path_buf())),
        None => Ok(()),
    }
}

/// Find an executable. Bare names go through `PATH`; anything with a
/// directory component is taken relative to `cwd` and must be a file.
pub fn locate(program: &Path, cwd: &Path) -> Option<PathBuf> {
    let has_dir = program
        .parent()
        .is_some_and(|parent| !parent.as_os_str().is_empty());
    if has_dir {
        let path = cwd.join(program);
        return path.is_file().then_some(path);
    }
    which::which(program).ok()
}

/// [`locate`], failing with [`DriverError::MissingTool`].
pub fn find_program(program: &Path, cwd: &Path, name: &str, hint: &str) -> Result<PathBuf, DriverError> {
    locate(program, cwd).ok_or_else(|| DriverError::MissingTool {
        name: name.to_string(),
        hint: hint.to_string(),
    })
}

/// Resolve `.` and `..` components without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `/..` is `/`
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out
}

/// Append the platform executable suffix (`.exe` on Windows).
pub fn exe(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{stem}{}", std::env::consts::EXE_SUFFIX))
}
