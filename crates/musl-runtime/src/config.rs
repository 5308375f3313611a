//! Resolve the command line into an immutable build configuration.
//!
//! Precedence for every field: explicit option, then environment, then a
//! default. The architecture selector seeds triple, zig target, build dir
//! and FFI arch; a seeded value is used only when the field was not given.

use crate::cli::Cli;
use build_driver::env::{self, EnvSource, Resolved, Source};
use build_driver::{paths, DriverError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_ARM_FLAGS: &str = "-mcpu=cortex_a7 -mfpu=neon -mfloat-abi=hard";
pub const DEFAULT_JOBS: u32 = 1;

/// Target architecture
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    X64,
    Arm32,
}

impl Arch {
    pub fn target_triple(self) -> &'static str {
        match self {
            Arch::X64 => "x86_64-unknown-linux-musl",
            Arch::Arm32 => "armv7-unknown-linux-musleabihf",
        }
    }

    pub fn zig_target(self) -> &'static str {
        match self {
            Arch::X64 => "x86_64-linux-musl",
            Arch::Arm32 => "arm-linux-musleabihf",
        }
    }

    /// Build directory name under the repo root
    pub fn build_dir_name(self) -> &'static str {
        match self {
            Arch::X64 => "build_musl_zig_rt",
            Arch::Arm32 => "build_musl_arm32",
        }
    }

    pub fn ffi_arch(self) -> &'static str {
        match self {
            Arch::X64 => "x86",
            Arch::Arm32 => "arm",
        }
    }
}

impl FromStr for Arch {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self, DriverError> {
        if s.eq_ignore_ascii_case("x64") {
            Ok(Arch::X64)
        } else if s.eq_ignore_ascii_case("arm32") {
            Ok(Arch::Arm32)
        } else {
            Err(DriverError::InvalidValue {
                option: "-Arch".to_string(),
                value: s.to_string(),
                expected: "x64 or arm32".to_string(),
            })
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Config {
    pub arch: Resolved<Arch>,
    pub root: Resolved<PathBuf>,
    pub zig: Resolved<PathBuf>,
    pub cmake: Resolved<PathBuf>,
    pub build_dir: Resolved<PathBuf>,
    pub target_triple: Resolved<String>,
    pub zig_target: Resolved<String>,
    pub arm_flags: Resolved<String>,
    pub enable_ffi: bool,
    pub ffi_target_dir: Resolved<String>,
    pub ffi_arch: Resolved<String>,
    pub out_dir: Resolved<PathBuf>,
    pub also_copy_to_dist: bool,
    pub jobs: u32,
}

impl Config {
    /// Flags passed as both CMAKE_C_FLAGS and CMAKE_CXX_FLAGS.
    pub fn compiler_flags(&self) -> String {
        let mut flags = format!("--target={} -fno-sanitize=all", self.zig_target.value);
        let arm_flags = self.arm_flags.value.trim();
        if self.arch.value == Arch::Arm32 && !arm_flags.is_empty() {
            flags.push(' ');
            flags.push_str(arm_flags);
        }
        flags
    }

    /// Where CMake leaves the runtime archives.
    pub fn bin_dir(&self) -> PathBuf {
        self.build_dir.value.join("Release").join("bin")
    }

    pub fn dist_dir(&self) -> PathBuf {
        self.root.value.join("IDE").join("dist")
    }
}

pub fn resolve(cli: &Cli, vars: &dyn EnvSource, cwd: &Path) -> Result<Config, DriverError> {
    // The selector goes first so an illegal value fails before any lookup.
    let arch = match cli.arch.as_deref() {
        Some(raw) => Resolved::new(raw.parse::<Arch>()?, Source::Explicit),
        None => Resolved::new(Arch::X64, Source::Default),
    };
    let a = arch.value;

    let root = match env::layered_path(cli.root.as_deref(), vars, &["BEEF_ROOT"], cwd) {
        Some(root) => root,
        None => match env::discover_root(cwd, Path::new("BeefRT")) {
            Some(found) => Resolved::new(found, Source::Derived),
            None => Resolved::new(cwd.to_path_buf(), Source::Default),
        },
    };

    let zig = resolve_tool(
        cli.zig.as_deref(),
        vars,
        &["BEEF_ZIG_EXE", "ZIG"],
        "zig",
        cwd,
        "Zig",
        "Pass -Zig or set BEEF_ZIG_EXE.",
    )?;
    let cmake = resolve_tool(
        cli.cmake.as_deref(),
        vars,
        &["CMAKE"],
        "cmake",
        cwd,
        "cmake",
        "Install CMake, pass -CMake or set CMAKE.",
    )?;

    let target_triple = Resolved::or_derived(env::explicit(cli.target_triple.as_deref()), || {
        a.target_triple().to_string()
    });
    let zig_target = Resolved::or_derived(env::explicit(cli.zig_target.as_deref()), || {
        a.zig_target().to_string()
    });
    let build_dir = Resolved::or_derived(
        env::layered_path(cli.build_dir.as_deref(), vars, &[], cwd),
        || root.value.join(a.build_dir_name()),
    );
    let ffi_arch = Resolved::or_derived(env::explicit(cli.ffi_arch.as_deref()), || {
        a.ffi_arch().to_string()
    });
    let ffi_target_dir = Resolved::or_derived(env::explicit(cli.ffi_target_dir.as_deref()), || {
        target_triple.value.clone()
    });
    let out_dir = Resolved::or_derived(
        env::layered_path(cli.out_dir.as_deref(), vars, &[], cwd),
        || {
            root.value
                .join("IDE")
                .join("dist")
                .join("rt")
                .join(&target_triple.value)
        },
    );

    // An explicitly empty -ArmFlags disables the extra flags.
    let arm_flags = match &cli.arm_flags {
        Some(flags) => Resolved::new(flags.clone(), Source::Explicit),
        None => Resolved::new(DEFAULT_ARM_FLAGS.to_string(), Source::Default),
    };

    Ok(Config {
        arch,
        root,
        zig,
        cmake,
        build_dir,
        target_triple,
        zig_target,
        arm_flags,
        enable_ffi: cli.enable_ffi,
        ffi_target_dir,
        ffi_arch,
        out_dir,
        also_copy_to_dist: cli.also_copy_to_dist,
        jobs: cli.jobs.unwrap_or(DEFAULT_JOBS),
    })
}

fn resolve_tool(
    explicit: Option<&Path>,
    vars: &dyn EnvSource,
    keys: &[&str],
    default: &str,
    cwd: &Path,
    name: &str,
    hint: &str,
) -> Result<Resolved<PathBuf>, DriverError> {
    let explicit = explicit.map(|p| p.to_string_lossy().into_owned());
    let wanted = Resolved::or(env::layered(explicit.as_deref(), vars, keys), || {
        default.to_string()
    });
    let found = paths::find_program(Path::new(&wanted.value), cwd, name, hint)?;
    Ok(Resolved::new(found, wanted.source))
}
