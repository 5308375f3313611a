//! Layered configuration lookup: explicit option -> environment -> default.

use crate::error::DriverError;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Where environment variables come from.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Which tier produced a resolved value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Explicit,
    Env(String),
    /// Seeded by another field (e.g. the architecture selector).
    Derived,
    Default,
}

/// A resolved value and the tier it came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Resolved<T> {
    pub value: T,
    pub source: Source,
}

impl<T> Resolved<T> {
    pub fn new(value: T, source: Source) -> Self {
        Self { value, source }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolved<U> {
        Resolved {
            value: f(self.value),
            source: self.source,
        }
    }

    /// Fall back to `default` when nothing was resolved.
    pub fn or(found: Option<Self>, default: impl FnOnce() -> T) -> Self {
        found.unwrap_or_else(|| Self::new(default(), Source::Default))
    }

    /// Fall back to a value seeded by another field.
    pub fn or_derived(found: Option<Self>, derived: impl FnOnce() -> T) -> Self {
        found.unwrap_or_else(|| Self::new(derived(), Source::Derived))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// The explicit value alone; blank counts as not given.
pub fn explicit(value: Option<&str>) -> Option<Resolved<String>> {
    non_blank(value.map(str::to_string)).map(|v| Resolved::new(v, Source::Explicit))
}

/// First non-blank value of the explicit option, then each env key in order.
pub fn layered(
    explicit_value: Option<&str>,
    env: &dyn EnvSource,
    keys: &[&str],
) -> Option<Resolved<String>> {
    if let Some(found) = explicit(explicit_value) {
        return Some(found);
    }
    keys.iter().find_map(|key| {
        non_blank(env.var(key)).map(|value| Resolved::new(value, Source::Env((*key).to_string())))
    })
}

/// Like [`layered`] for typed values. Explicit values arrive already typed
/// from clap; env values are parsed here.
pub fn layered_parse<T: FromStr>(
    explicit: Option<T>,
    env: &dyn EnvSource,
    keys: &[&str],
    expected: &str,
) -> Result<Option<Resolved<T>>, DriverError> {
    if let Some(value) = explicit {
        return Ok(Some(Resolved::new(value, Source::Explicit)));
    }
    for key in keys {
        if let Some(raw) = non_blank(env.var(key)) {
            let value = raw.trim().parse().map_err(|_| DriverError::InvalidValue {
                option: (*key).to_string(),
                value: raw.clone(),
                expected: expected.to_string(),
            })?;
            return Ok(Some(Resolved::new(value, Source::Env((*key).to_string()))));
        }
    }
    Ok(None)
}

/// Resolve a path-valued option; relative paths are taken from `cwd`.
pub fn layered_path(
    explicit: Option<&Path>,
    env: &dyn EnvSource,
    keys: &[&str],
    cwd: &Path,
) -> Option<Resolved<PathBuf>> {
    let explicit = explicit.map(|p| p.to_string_lossy().into_owned());
    layered(explicit.as_deref(), env, keys).map(|r| r.map(|p| cwd.join(p)))
}

/// Walk from `start` towards the filesystem root and return the first
/// directory that contains `marker`.
pub fn discover_root(start: &Path, marker: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(marker).exists())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_explicit_beats_env() {
        let vars = env(&[("IDF_PATH", "/env/idf")]);
        let r = layered(Some("/cli/idf"), &vars, &["IDF_PATH"]).unwrap();
        assert_eq!(r, Resolved::new("/cli/idf".to_string(), Source::Explicit));
    }

    #[test]
    fn test_env_beats_default() {
        let vars = env(&[("IDF_PATH", "/env/idf")]);
        let r = Resolved::or(layered(None, &vars, &["IDF_PATH"]), || "/default".into());
        assert_eq!(r.value, "/env/idf");
        assert_eq!(r.source, Source::Env("IDF_PATH".into()));
    }

    #[test]
    fn test_default_when_nothing_set() {
        let r = Resolved::or(layered(None, &env(&[]), &["IDF_PATH"]), || "/default".into());
        assert_eq!(r, Resolved::new("/default".to_string(), Source::Default));
    }

    #[test]
    fn test_env_keys_are_tried_in_order() {
        let vars = env(&[("ZIG", "/b/zig"), ("BEEF_ZIG_EXE", "/a/zig")]);
        let r = layered(None, &vars, &["BEEF_ZIG_EXE", "ZIG"]).unwrap();
        assert_eq!(r.value, "/a/zig");

        let vars = env(&[("ZIG", "/b/zig")]);
        let r = layered(None, &vars, &["BEEF_ZIG_EXE", "ZIG"]).unwrap();
        assert_eq!(r.source, Source::Env("ZIG".into()));
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let vars = env(&[("BEEF_ZIG_EXE", "  "), ("ZIG", "/b/zig")]);
        let r = layered(Some(""), &vars, &["BEEF_ZIG_EXE", "ZIG"]).unwrap();
        assert_eq!(r.value, "/b/zig");
    }

    #[test]
    fn test_explicit_only() {
        assert_eq!(explicit(Some(" ")), None);
        assert_eq!(
            explicit(Some("arm")),
            Some(Resolved::new("arm".to_string(), Source::Explicit))
        );
    }

    #[test]
    fn test_parse_env_value() {
        let vars = env(&[("ESPBAUD", "115200")]);
        let r = layered_parse::<u32>(None, &vars, &["ESPBAUD"], "an integer")
            .unwrap()
            .unwrap();
        assert_eq!(r.value, 115_200);

        let r = layered_parse(Some(9600u32), &vars, &["ESPBAUD"], "an integer")
            .unwrap()
            .unwrap();
        assert_eq!(r, Resolved::new(9600, Source::Explicit));
    }

    #[test]
    fn test_unparsable_env_value_names_variable() {
        let vars = env(&[("ESPBAUD", "fast")]);
        let err = layered_parse::<u32>(None, &vars, &["ESPBAUD"], "an integer").unwrap_err();
        assert!(err.to_string().contains("ESPBAUD"));
        assert!(err.is_argument_error());
    }

    #[test]
    fn test_relative_paths_join_cwd() {
        let r = layered_path(Some(Path::new("ws")), &env(&[]), &[], Path::new("/work")).unwrap();
        assert_eq!(r.value, PathBuf::from("/work/ws"));

        let r = layered_path(Some(Path::new("/abs")), &env(&[]), &[], Path::new("/work")).unwrap();
        assert_eq!(r.value, PathBuf::from("/abs"));
    }

    #[test]
    fn test_discover_root_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("BeefRT")).unwrap();
        let nested = dir.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(
            discover_root(&nested, Path::new("BeefRT")),
            Some(dir.path().to_path_buf())
        );
        assert_eq!(discover_root(&nested, Path::new("no-such-marker-here")), None);
    }
}
