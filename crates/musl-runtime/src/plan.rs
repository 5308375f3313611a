//! CMake configure + build with Zig, then stage the runtime archives.

use crate::config::{Arch, Config};
use build_driver::{ArtifactCopy, Plan, Step};
use serde::Serialize;

pub const RUNTIME_LIBS: [&str; 2] = ["libBeefRT.a", "libBeefySysLib.a"];

/// What `-DryRun` prints.
#[derive(Serialize)]
pub struct Report<'a> {
    pub config: &'a Config,
    pub plan: &'a Plan,
}

/// Arguments for the configure step.
pub fn configure_args(cfg: &Config) -> Vec<String> {
    let zig = cfg.zig.value.display().to_string();
    let flags = cfg.compiler_flags();

    let mut args = vec![
        "-G".to_string(),
        "Ninja".to_string(),
        "-S".to_string(),
        cfg.root.value.display().to_string(),
        "-B".to_string(),
        cfg.build_dir.value.display().to_string(),
        "-DBF_ONLY_RUNTIME=1".to_string(),
        "-DCMAKE_SYSTEM_NAME=Linux".to_string(),
        format!("-DCMAKE_C_COMPILER={zig}"),
        "-DCMAKE_C_COMPILER_ARG1=cc".to_string(),
        format!("-DCMAKE_CXX_COMPILER={zig}"),
        "-DCMAKE_CXX_COMPILER_ARG1=c++".to_string(),
        format!("-DCMAKE_C_FLAGS={flags}"),
        format!("-DCMAKE_CXX_FLAGS={flags}"),
        "-DCMAKE_TRY_COMPILE_TARGET_TYPE=STATIC_LIBRARY".to_string(),
        "-DCMAKE_BUILD_TYPE=Release".to_string(),
    ];

    if cfg.arch.value == Arch::Arm32 {
        args.push("-DCMAKE_SYSTEM_PROCESSOR=arm".to_string());
    }

    if cfg.enable_ffi {
        args.push("-UBF_DISABLE_FFI".to_string());
        args.push(format!("-DBF_FFI_TARGET_DIR={}", cfg.ffi_target_dir.value));
        args.push(format!("-DBF_FFI_ARCH={}", cfg.ffi_arch.value));
    } else {
        args.push("-DBF_DISABLE_FFI=1".to_string());
    }

    args
}

pub fn build_args(cfg: &Config) -> Vec<String> {
    vec![
        "--build".to_string(),
        cfg.build_dir.value.display().to_string(),
        "--config".to_string(),
        "Release".to_string(),
        "--".to_string(),
        "-j".to_string(),
        cfg.jobs.to_string(),
    ]
}

pub fn build(cfg: &Config) -> Plan {
    let root = &cfg.root.value;
    let bin_dir = cfg.bin_dir();

    let building = if cfg.jobs == 1 {
        "Building (single-thread to avoid Zig OOM)".to_string()
    } else {
        format!("Building ({} jobs)", cfg.jobs)
    };

    let mut plan = Plan::new()
        .require(root)
        .require(&cfg.zig.value)
        .announce(format!("Configuring: {}", cfg.build_dir.value.display()))
        .run(
            Step::new(&cfg.cmake.value)
                .args(configure_args(cfg))
                .current_dir(root),
        )
        .announce(building)
        .run(
            Step::new(&cfg.cmake.value)
                .args(build_args(cfg))
                .current_dir(root),
        )
        .expect([&bin_dir])
        .stage(ArtifactCopy::each(&bin_dir, &RUNTIME_LIBS, &cfg.out_dir.value));

    if cfg.also_copy_to_dist {
        plan = plan.stage(ArtifactCopy::each(&bin_dir, &RUNTIME_LIBS, &cfg.dist_dir()));
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use build_driver::env::{Resolved, Source};
    use std::path::PathBuf;

    fn config(arch: Arch) -> Config {
        let r = |p: &str| Resolved::new(PathBuf::from(p), Source::Default);
        let s = |v: &str| Resolved::new(v.to_string(), Source::Derived);
        Config {
            arch: Resolved::new(arch, Source::Explicit),
            root: r("/beef"),
            zig: r("/opt/zig/zig"),
            cmake: r("/usr/bin/cmake"),
            build_dir: r("/beef/build_musl_zig_rt"),
            target_triple: s(arch.target_triple()),
            zig_target: s(arch.zig_target()),
            arm_flags: s(crate::config::DEFAULT_ARM_FLAGS),
            enable_ffi: false,
            ffi_target_dir: s(arch.target_triple()),
            ffi_arch: s(arch.ffi_arch()),
            out_dir: r("/beef/IDE/dist/rt/x86_64-unknown-linux-musl"),
            also_copy_to_dist: false,
            jobs: 1,
        }
    }

    #[test]
    fn test_configure_args_x64() {
        let args = configure_args(&config(Arch::X64));
        assert_eq!(&args[..6], ["-G", "Ninja", "-S", "/beef", "-B", "/beef/build_musl_zig_rt"]);
        assert!(args.contains(&"-DCMAKE_C_COMPILER=/opt/zig/zig".to_string()));
        assert!(args.contains(&"-DCMAKE_CXX_COMPILER_ARG1=c++".to_string()));
        assert!(args.contains(&"-DCMAKE_C_FLAGS=--target=x86_64-linux-musl -fno-sanitize=all".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("-DBF_DISABLE_FFI=1"));
        assert!(!args.iter().any(|a| a.starts_with("-DCMAKE_SYSTEM_PROCESSOR")));
    }

    #[test]
    fn test_configure_args_arm32_with_ffi() {
        let mut cfg = config(Arch::Arm32);
        cfg.enable_ffi = true;
        let args = configure_args(&cfg);

        assert!(args.contains(&"-DCMAKE_SYSTEM_PROCESSOR=arm".to_string()));
        assert!(args.contains(&"-UBF_DISABLE_FFI".to_string()));
        assert!(args.contains(&"-DBF_FFI_TARGET_DIR=armv7-unknown-linux-musleabihf".to_string()));
        assert!(args.contains(&"-DBF_FFI_ARCH=arm".to_string()));
        assert!(!args.contains(&"-DBF_DISABLE_FFI=1".to_string()));
    }

    #[test]
    fn test_build_args_use_jobs() {
        let mut cfg = config(Arch::X64);
        cfg.jobs = 4;
        assert_eq!(
            build_args(&cfg),
            ["--build", "/beef/build_musl_zig_rt", "--config", "Release", "--", "-j", "4"]
        );
    }

    #[test]
    fn test_plan_shape() {
        let plan = build(&config(Arch::X64));
        assert_eq!(plan.steps().count(), 2);
        assert_eq!(
            plan.preconditions,
            [PathBuf::from("/beef"), PathBuf::from("/opt/zig/zig")]
        );
        let staged: Vec<_> = plan.staged_files().collect();
        assert_eq!(
            staged,
            [
                PathBuf::from("/beef/IDE/dist/rt/x86_64-unknown-linux-musl/libBeefRT.a"),
                PathBuf::from("/beef/IDE/dist/rt/x86_64-unknown-linux-musl/libBeefySysLib.a"),
            ]
        );
    }

    #[test]
    fn test_dist_copy_is_optional() {
        let mut cfg = config(Arch::X64);
        cfg.also_copy_to_dist = true;
        let staged: Vec<_> = build(&cfg).staged_files().collect();
        assert_eq!(staged.len(), 4);
        assert!(staged.contains(&PathBuf::from("/beef/IDE/dist/libBeefRT.a")));
    }
}
