//! Copy build outputs into the directory layout a downstream consumer expects.

use crate::error::DriverError;
use crate::paths;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Copy `source` into `dest_dir`, keeping its file name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ArtifactCopy {
    pub source: PathBuf,
    pub dest_dir: PathBuf,
}

impl ArtifactCopy {
    pub fn new(source: impl Into<PathBuf>, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            dest_dir: dest_dir.into(),
        }
    }

    /// Copy every file in `names` from `src_dir` into `dest_dir`.
    pub fn each(src_dir: &Path, names: &[&str], dest_dir: &Path) -> Vec<Self> {
        names
            .iter()
            .map(|name| Self::new(src_dir.join(name), dest_dir))
            .collect()
    }

    /// Where the file ends up.
    pub fn destination(&self) -> PathBuf {
        match self.source.file_name() {
            Some(name) => self.dest_dir.join(name),
            None => self.dest_dir.clone(),
        }
    }
}

/// Stage `copies`: every source must exist before anything is written;
/// existing files at the destination are overwritten.
pub fn stage(copies: &[ArtifactCopy]) -> Result<Vec<PathBuf>, DriverError> {
    let sources: Vec<&Path> = copies.iter().map(|c| c.source.as_path()).collect();
    paths::expect_artifacts(&sources)?;

    let mut written = Vec::with_capacity(copies.len());
    for copy in copies {
        std::fs::create_dir_all(&copy.dest_dir)?;
        let dest = copy.destination();
        std::fs::copy(&copy.source, &dest).map_err(|source| DriverError::Copy {
            from: copy.source.clone(),
            to: dest.clone(),
            source,
        })?;
        tracing::info!("staged {} -> {}", copy.source.display(), dest.display());
        written.push(dest);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_creates_nested_dest_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("Release/bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join("libBeefRT.a"), b"new runtime").unwrap();

        let out = dir.path().join("IDE/dist/rt/x86_64-unknown-linux-musl");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("libBeefRT.a"), b"stale").unwrap();

        let written = stage(&[ArtifactCopy::new(bin.join("libBeefRT.a"), &out)]).unwrap();

        assert_eq!(written, vec![out.join("libBeefRT.a")]);
        assert_eq!(std::fs::read(out.join("libBeefRT.a")).unwrap(), b"new runtime");
    }

    #[test]
    fn test_missing_source_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("corlib.a"), b"corlib").unwrap();
        let dest = dir.path().join("components/beef/lib");

        let copies = ArtifactCopy::each(dir.path(), &["corlib.a", "beefesp32demo.a"], &dest);
        let err = stage(&copies).unwrap_err();

        assert!(
            matches!(err, DriverError::MissingArtifact(ref p) if p.ends_with("beefesp32demo.a"))
        );
        assert!(!dest.exists());
    }

    #[test]
    fn test_destination_keeps_file_name() {
        let copy = ArtifactCopy::new("/ws/build/corlib/corlib.a", "/proj/components/beef/lib");
        assert_eq!(
            copy.destination(),
            PathBuf::from("/proj/components/beef/lib/corlib.a")
        );
    }
}
