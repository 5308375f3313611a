//! Beef build -> stage into the ESP-IDF component -> idf.py build/flash/monitor.

use crate::config::Config;
use build_driver::{ArtifactCopy, Plan, Step};
use serde::Serialize;
use std::path::Path;

pub const RUNTIME_LIBS: [&str; 2] = ["libBeefRT.a", "libBeefySysLib.a"];

/// What `-DryRun` prints.
#[derive(Serialize)]
pub struct Report<'a> {
    pub config: &'a Config,
    pub plan: &'a Plan,
}

fn beef_build_step(cfg: &Config) -> Step {
    Step::new(cfg.beef_build())
        .arg(format!("-workspace={}", cfg.workspace.value.display()))
        .arg(format!("-config={}", cfg.config.value))
        .arg("-platform=ESP32")
        .env("BEEF_RT_DIR", cfg.rt_dir())
        .env("BEEF_AR", cfg.llvm_ar())
}

/// `idf.py` arguments for a device action (`flash`, `monitor`).
pub fn device_args(cfg: &Config, action: &str) -> Vec<String> {
    let mut args = vec!["-p".to_string(), cfg.port.value.clone()];
    if cfg.baud.value > 0 {
        args.push("-b".to_string());
        args.push(cfg.baud.value.to_string());
    }
    args.push(action.to_string());
    args
}

/// Run `idf.py` inside an environment prepared by the IDF export script.
pub fn idf_step(cfg: &Config, idf_args: &[String], device: bool) -> Step {
    let step = shell_step(&cfg.export_script(), idf_args)
        .current_dir(&cfg.idf_project.value)
        .env("IDF_PATH", &cfg.idf_root.value)
        .envs([("PYTHONIOENCODING", "utf-8"), ("PYTHONUTF8", "1")]);

    if device && cfg.baud.value > 0 {
        step.env("ESPBAUD", cfg.baud.value.to_string())
    } else {
        step
    }
}

/// Quote one argument for a `cmd /c` line. Inside quotes `&`, `|` and
/// spaces are literal; embedded quotes are doubled.
#[cfg(any(windows, test))]
fn cmd_quote(arg: &str) -> String {
    format!("\"{}\"", arg.replace('"', "\"\""))
}

#[cfg(any(windows, test))]
fn cmd_line(export: &Path, idf_args: &[String]) -> String {
    let args: Vec<String> = idf_args.iter().map(|a| cmd_quote(a)).collect();
    format!(
        "chcp 65001 >nul && {} && idf.py {}",
        cmd_quote(&export.display().to_string()),
        args.join(" ")
    )
}

#[cfg(windows)]
fn shell_step(export: &Path, idf_args: &[String]) -> Step {
    Step::new("cmd.exe").arg("/c").arg(cmd_line(export, idf_args))
}

#[cfg(not(windows))]
fn shell_step(export: &Path, idf_args: &[String]) -> Step {
    // The export script path travels as $0 and idf.py args as "$@", so
    // nothing needs quoting.
    Step::new("sh")
        .arg("-c")
        .arg(". \"$0\" && exec idf.py \"$@\"")
        .arg(export)
        .args(idf_args)
}

pub fn build(cfg: &Config) -> Plan {
    let lib_dir = cfg.component_lib_dir();
    let app_lib = cfg.app_lib();
    let corlib = cfg.corlib_lib();

    let mut copies = vec![
        ArtifactCopy::new(&app_lib, &lib_dir),
        ArtifactCopy::new(&corlib, &lib_dir),
    ];
    if cfg.copy_runtime {
        copies.extend(ArtifactCopy::each(&cfg.rt_dir(), &RUNTIME_LIBS, &lib_dir));
    }

    let mut plan = Plan::new()
        .require(cfg.beef_build())
        .require(cfg.rt_dir())
        .require(cfg.llvm_ar())
        .require(&cfg.workspace.value)
        .require(&cfg.idf_project.value)
        .require(&cfg.idf_root.value)
        .require(cfg.export_script())
        .announce("[1/3] Build Beef ESP32 libs")
        .run(beef_build_step(cfg))
        .expect([&app_lib, &corlib])
        .announce("[2/3] Copy libs into ESP-IDF component")
        .stage(copies)
        .announce("[3/3] ESP-IDF build")
        .run(idf_step(cfg, &["build".to_string()], false));

    if cfg.flash {
        plan = plan
            .announce(format!("Flashing via {}", cfg.port.value))
            .run(idf_step(cfg, &device_args(cfg, "flash"), true));
    }
    if cfg.monitor {
        plan = plan
            .announce(format!("Monitoring {}", cfg.port.value))
            .run(idf_step(cfg, &device_args(cfg, "monitor"), true));
    }
    plan
}
