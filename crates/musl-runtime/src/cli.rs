use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "zig-build-musl-runtime")]
#[command(about = "Cross-build BeefRT and BeefySysLib for musl Linux using Zig as the C/C++ compiler")]
#[command(override_usage = "zig-build-musl-runtime [-Option value | -Option=value | -Flag [true|false]]...")]
#[command(disable_help_flag = true, disable_version_flag = true, args_override_self = true)]
pub struct Cli {
    /// Target architecture [default: x64]
    #[arg(long = "Arch", value_name = "x64|arm32")]
    pub arch: Option<String>,

    /// Zig executable [env: BEEF_ZIG_EXE, ZIG] [default: zig on PATH]
    #[arg(long = "Zig", value_name = "PATH")]
    pub zig: Option<PathBuf>,

    /// Beef repo root [env: BEEF_ROOT] [default: nearest parent holding BeefRT]
    #[arg(long = "Root", value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// CMake build directory [default: <root>/build_musl_zig_rt, arm32: <root>/build_musl_arm32]
    #[arg(long = "BuildDir", value_name = "PATH")]
    pub build_dir: Option<PathBuf>,

    /// Target triple [default: x86_64-unknown-linux-musl, arm32: armv7-unknown-linux-musleabihf]
    #[arg(long = "TargetTriple", value_name = "TRIPLE")]
    pub target_triple: Option<String>,

    /// Zig target [default: x86_64-linux-musl, arm32: arm-linux-musleabihf]
    #[arg(long = "ZigTarget", value_name = "TARGET")]
    pub zig_target: Option<String>,

    /// Extra C/C++ flags for arm32, e.g. -ArmFlags "-mcpu=cortex_a9 -mfpu=neon" [default: -mcpu=cortex_a7 -mfpu=neon -mfloat-abi=hard]
    #[arg(long = "ArmFlags", value_name = "FLAGS", allow_hyphen_values = true)]
    pub arm_flags: Option<String>,

    /// Build with FFI support
    #[arg(
        long = "EnableFFI",
        value_name = "true|false",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub enable_ffi: bool,

    /// FFI target directory [default: target triple]
    #[arg(long = "FFITargetDir", value_name = "DIR")]
    pub ffi_target_dir: Option<String>,

    /// FFI architecture [default: x86, arm32: arm]
    #[arg(long = "FFIArch", value_name = "ARCH")]
    pub ffi_arch: Option<String>,

    /// Where the runtime archives are copied [default: <root>/IDE/dist/rt/<triple>]
    #[arg(long = "OutDir", value_name = "PATH")]
    pub out_dir: Option<PathBuf>,

    /// Also copy the archives into <root>/IDE/dist
    #[arg(
        long = "AlsoCopyToDist",
        value_name = "true|false",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub also_copy_to_dist: bool,

    /// CMake executable [env: CMAKE] [default: cmake on PATH]
    #[arg(long = "CMake", value_name = "PATH")]
    pub cmake: Option<PathBuf>,

    /// Parallel build jobs; Zig can run out of memory above 1 [default: 1]
    #[arg(long = "Jobs", value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub jobs: Option<u32>,

    /// Print the resolved configuration and plan as JSON without running anything
    #[arg(
        long = "DryRun",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub dry_run: bool,

    /// Debug logging on stderr (RUST_LOG overrides)
    #[arg(
        long = "Verbose",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub verbose: bool,
}
