//! Resolved settings for one esp32-build run.

use crate::cli::Cli;
use build_driver::env::{self, EnvSource, Resolved, Source};
use build_driver::{paths, DriverError};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_BAUD: u32 = 921_600;
pub const DEFAULT_CONFIG: &str = "Release";
/// Runtime target the ESP32 build of BeefRT lives under.
pub const RT_TARGET: &str = "xtensa-esp32s3-elf";

#[cfg(windows)]
pub const DEFAULT_PORT: &str = "COM4";
#[cfg(not(windows))]
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";

#[cfg(windows)]
pub const EXPORT_SCRIPT: &str = "export.bat";
#[cfg(not(windows))]
pub const EXPORT_SCRIPT: &str = "export.sh";

#[derive(Clone, Debug, Serialize)]
pub struct Config {
    pub workspace: Resolved<PathBuf>,
    pub project: Resolved<String>,
    pub idf_project: Resolved<PathBuf>,
    pub idf_root: Resolved<PathBuf>,
    pub esp_llvm_root: Resolved<PathBuf>,
    pub beef_root: Resolved<PathBuf>,
    pub port: Resolved<String>,
    pub baud: Resolved<u32>,
    pub config: Resolved<String>,
    pub copy_runtime: bool,
    pub flash: bool,
    pub monitor: bool,
}

impl Config {
    fn dist(&self) -> PathBuf {
        self.beef_root.value.join("IDE").join("dist")
    }

    pub fn beef_build(&self) -> PathBuf {
        paths::exe(&self.dist(), "BeefBuild")
    }

    pub fn rt_dir(&self) -> PathBuf {
        self.dist().join("rt").join(RT_TARGET)
    }

    pub fn llvm_ar(&self) -> PathBuf {
        paths::exe(&self.esp_llvm_root.value.join("build").join("bin"), "llvm-ar")
    }

    /// `<workspace>/build/<config>_ESP32`
    pub fn lib_out(&self) -> PathBuf {
        self.workspace
            .value
            .join("build")
            .join(format!("{}_ESP32", self.config.value))
    }

    pub fn app_lib(&self) -> PathBuf {
        let name = &self.project.value;
        self.lib_out().join(name).join(format!("{name}.a"))
    }

    pub fn corlib_lib(&self) -> PathBuf {
        self.lib_out().join("corlib").join("corlib.a")
    }

    pub fn component_lib_dir(&self) -> PathBuf {
        self.idf_project
            .value
            .join("components")
            .join("beef")
            .join("lib")
    }

    pub fn export_script(&self) -> PathBuf {
        self.idf_root.value.join(EXPORT_SCRIPT)
    }
}

pub fn resolve(cli: &Cli, vars: &dyn EnvSource, cwd: &Path) -> Result<Config, DriverError> {
    let path = |explicit: Option<&Path>, keys: &[&str], default: &str| {
        Resolved::or(env::layered_path(explicit, vars, keys, cwd), || {
            cwd.join(default)
        })
    };

    let workspace = path(cli.workspace_path.as_deref(), &[], "beefesp32demo");
    let idf_project = path(cli.idf_project_path.as_deref(), &[], "esp32demo/hello_world");
    let idf_root = path(cli.idf_root.as_deref(), &["IDF_PATH"], "esp32demo/esp-idf");
    let esp_llvm_root = path(cli.esp_llvm_root.as_deref(), &["ESP_LLVM_ROOT"], "esp-llvm");

    let project = match env::explicit(cli.project.as_deref()) {
        Some(project) => project,
        None => workspace_project(&workspace.value)?,
    };

    let beef_root = match env::layered_path(cli.beef_root.as_deref(), vars, &["BEEF_ROOT"], cwd) {
        Some(root) => root,
        None => {
            let marker = paths::exe(Path::new("IDE/dist"), "BeefBuild");
            match env::discover_root(cwd, &marker) {
                Some(found) => Resolved::new(found, Source::Derived),
                None => Resolved::new(cwd.to_path_buf(), Source::Default),
            }
        }
    };

    let port = Resolved::or(env::layered(cli.port.as_deref(), vars, &["ESPPORT"]), || {
        DEFAULT_PORT.to_string()
    });
    let baud = Resolved::or(
        env::layered_parse(cli.baud, vars, &["ESPBAUD"], "a baud rate")?,
        || DEFAULT_BAUD,
    );
    let config = Resolved::or(env::explicit(cli.config.as_deref()), || {
        DEFAULT_CONFIG.to_string()
    });

    Ok(Config {
        workspace,
        project,
        idf_project,
        idf_root,
        esp_llvm_root,
        beef_root,
        port,
        baud,
        config,
        copy_runtime: cli.copy_runtime,
        flash: cli.flash,
        monitor: cli.monitor,
    })
}

/// The Beef project is named after its workspace directory by default.
fn workspace_project(workspace: &Path) -> Result<Resolved<String>, DriverError> {
    paths::normalize(workspace)
        .file_name()
        .map(|name| Resolved::new(name.to_string_lossy().into_owned(), Source::Derived))
        .ok_or_else(|| DriverError::InvalidValue {
            option: "-WorkspacePath".to_string(),
            value: workspace.display().to_string(),
            expected: "a directory; pass -Project to name the Beef project".to_string(),
        })
}
