use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "esp32-build")]
#[command(about = "Build Beef ESP32 libraries, copy them into an ESP-IDF component and run idf.py")]
#[command(override_usage = "esp32-build [-Option value | -Option=value | -Flag]...")]
#[command(disable_help_flag = true, disable_version_flag = true, args_override_self = true)]
pub struct Cli {
    /// Beef workspace [default: ./beefesp32demo]
    #[arg(long = "WorkspacePath", value_name = "PATH")]
    pub workspace_path: Option<PathBuf>,

    /// Beef project inside the workspace [default: workspace directory name]
    #[arg(long = "Project", value_name = "NAME")]
    pub project: Option<String>,

    /// ESP-IDF project [default: ./esp32demo/hello_world]
    #[arg(long = "IdfProjectPath", value_name = "PATH")]
    pub idf_project_path: Option<PathBuf>,

    /// ESP-IDF root [env: IDF_PATH] [default: ./esp32demo/esp-idf]
    #[arg(long = "IdfRoot", value_name = "PATH")]
    pub idf_root: Option<PathBuf>,

    /// esp-llvm root [env: ESP_LLVM_ROOT] [default: ./esp-llvm]
    #[arg(long = "EspLlvmRoot", value_name = "PATH")]
    pub esp_llvm_root: Option<PathBuf>,

    /// Beef repo root [env: BEEF_ROOT] [default: nearest parent holding IDE/dist/BeefBuild]
    #[arg(long = "BeefRoot", value_name = "PATH")]
    pub beef_root: Option<PathBuf>,

    /// Serial port [env: ESPPORT] [default: COM4 on Windows, /dev/ttyUSB0 elsewhere]
    #[arg(long = "Port", value_name = "PORT")]
    pub port: Option<String>,

    /// Flash/monitor baud, 0 leaves it to idf.py [env: ESPBAUD] [default: 921600]
    #[arg(long = "Baud", value_name = "RATE")]
    pub baud: Option<u32>,

    /// Beef build configuration [default: Release]
    #[arg(long = "Config", value_name = "NAME")]
    pub config: Option<String>,

    /// Copy BeefRT/BeefySysLib into the component
    #[arg(
        long = "CopyRuntime",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub copy_runtime: bool,

    /// Run idf.py flash
    #[arg(
        long = "Flash",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub flash: bool,

    /// Run idf.py monitor
    #[arg(
        long = "Monitor",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub monitor: bool,

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
