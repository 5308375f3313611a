//! PowerShell-style option parsing.
//!
//! The tools accept `-Name value`, `-Name=value`, `--Name value` and bare
//! `-Flag`. Names are matched case-insensitively against the long names of
//! a clap [`Parser`], rewritten to `--Canonical[=value]` and then handed to
//! clap so value types and help text stay declared in one place.

use crate::error::DriverError;
use clap::{CommandFactory, Parser};

/// Outcome of parsing a command line.
#[derive(Debug)]
pub enum Invocation<C> {
    /// A help alias was present; nothing else was looked at.
    Help,
    Run(C),
}

/// One `-Name[=value]` occurrence before it is matched to a known option.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawOption {
    /// The token as the user typed it, for error messages.
    pub raw: String,
    pub name: String,
    pub value: Option<String>,
}

/// Returns true for `-h`, `--help`, `-?`, `/?`, `-Help` and friends.
pub fn is_help(token: &str) -> bool {
    if token == "/?" {
        return true;
    }
    let Some(name) = strip_dashes(token) else {
        return false;
    };
    name == "?" || name.eq_ignore_ascii_case("h") || name.eq_ignore_ascii_case("help")
}

fn strip_dashes(token: &str) -> Option<&str> {
    token
        .strip_prefix("--")
        .or_else(|| token.strip_prefix('-'))
}

/// Split a token stream into options.
///
/// A value is taken from an inline `=` first, otherwise from the next token
/// unless that token looks like an option: it starts with `-` and holds no
/// whitespace (`-ArmFlags "-mcpu=cortex_a7 -mfpu=neon"` binds). Anything
/// that is not an option is rejected.
pub fn tokenize<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<RawOption>, DriverError> {
    let mut options = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let raw = tokens[i].as_ref();
        let body = strip_dashes(raw).ok_or_else(|| DriverError::UnknownArgument(raw.to_string()))?;

        let (name, mut value) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value.to_string())),
            None => (body, None),
        };
        if name.is_empty() {
            return Err(DriverError::UnknownArgument(raw.to_string()));
        }

        if value.is_none() {
            if let Some(next) = tokens.get(i + 1).map(AsRef::as_ref) {
                if !looks_like_option(next) {
                    value = Some(next.to_string());
                    i += 1;
                }
            }
        }

        options.push(RawOption {
            raw: raw.to_string(),
            name: name.to_string(),
            value,
        });
        i += 1;
    }
    Ok(options)
}

fn looks_like_option(token: &str) -> bool {
    token.starts_with('-') && !token.contains(char::is_whitespace)
}

/// Parse `tokens` (without the program name) into the tool's option struct.
pub fn parse<C: Parser>(tokens: &[String]) -> Result<Invocation<C>, DriverError> {
    if tokens.iter().any(|t| is_help(t)) {
        return Ok(Invocation::Help);
    }

    let command = C::command();
    let mut argv = vec![command.get_name().to_string()];
    for option in tokenize(tokens)? {
        let canonical = command
            .get_arguments()
            .filter_map(clap::Arg::get_long)
            .find(|long| long.eq_ignore_ascii_case(&option.name))
            .ok_or_else(|| DriverError::UnknownArgument(option.raw.clone()))?;

        argv.push(match option.value {
            Some(value) => format!("--{canonical}={value}"),
            None => format!("--{canonical}"),
        });
    }

    tracing::trace!(?argv, "normalized arguments");
    C::try_parse_from(argv)
        .map(Invocation::Run)
        .map_err(|err| DriverError::Usage(first_line(&err.render().to_string())))
}

fn first_line(rendered: &str) -> String {
    rendered
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or(rendered)
        .trim_start_matches("error: ")
        .to_string()
}

/// Render the usage summary for a tool.
pub fn usage<C: CommandFactory>() -> String {
    C::command().render_help().to_string()
}

/// Echo the usage summary on stderr when `err` is an argument error, then
/// hand the error back. Covers errors from both parsing and resolution.
pub fn with_usage<C: CommandFactory>(err: DriverError) -> DriverError {
    if err.is_argument_error() {
        eprint!("{}", usage::<C>());
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Parser, Debug)]
    #[command(name = "demo", disable_help_flag = true, args_override_self = true)]
    struct Demo {
        #[arg(long = "WorkspacePath")]
        workspace_path: Option<String>,

        #[arg(long = "Baud")]
        baud: Option<u32>,

        #[arg(
            long = "Flash",
            action = clap::ArgAction::Set,
            num_args = 0..=1,
            default_value = "false",
            default_missing_value = "true",
            value_parser = clap::builder::BoolishValueParser::new()
        )]
        flash: bool,

        #[arg(long = "ArmFlags", allow_hyphen_values = true)]
        arm_flags: Option<String>,
    }

    fn run(tokens: &[&str]) -> Result<Invocation<Demo>, DriverError> {
        let tokens: Vec<String> = tokens.iter().map(ToString::to_string).collect();
        parse::<Demo>(&tokens)
    }

    fn demo(tokens: &[&str]) -> Demo {
        match run(tokens).unwrap() {
            Invocation::Run(demo) => demo,
            Invocation::Help => panic!("unexpected help"),
        }
    }

    #[test]
    fn test_help_aliases() {
        for alias in ["-h", "--help", "-?", "/?", "-Help", "-HELP", "--H"] {
            assert!(matches!(run(&[alias]).unwrap(), Invocation::Help), "{alias}");
        }
    }

    #[test]
    fn test_help_wins_over_bad_input() {
        assert!(matches!(
            run(&["stray", "-Nope", "-?"]).unwrap(),
            Invocation::Help
        ));
    }

    #[test]
    fn test_inline_and_following_values_agree() {
        let inline = demo(&["-WorkspacePath=/ws", "-Baud=115200"]);
        let following = demo(&["-WorkspacePath", "/ws", "-Baud", "115200"]);
        assert_eq!(inline.workspace_path, following.workspace_path);
        assert_eq!(inline.baud, following.baud);
        assert_eq!(following.baud, Some(115_200));
    }

    #[test]
    fn test_names_are_case_insensitive() {
        let parsed = demo(&["--workspacepath", "/ws", "-FLASH"]);
        assert_eq!(parsed.workspace_path.as_deref(), Some("/ws"));
        assert!(parsed.flash);
    }

    #[test]
    fn test_bare_flag_before_option() {
        let parsed = demo(&["-Flash", "-Baud", "0"]);
        assert!(parsed.flash);
        assert_eq!(parsed.baud, Some(0));
    }

    #[test]
    fn test_explicit_bool_values() {
        assert!(!demo(&["-Flash", "false"]).flash);
        assert!(demo(&["-Flash=TRUE"]).flash);
        assert!(!demo(&[]).flash);
    }

    #[test]
    fn test_inline_value_may_start_with_dash() {
        let parsed = demo(&["-ArmFlags=-mcpu=cortex_a7 -mfpu=neon"]);
        assert_eq!(parsed.arm_flags.as_deref(), Some("-mcpu=cortex_a7 -mfpu=neon"));
    }

    #[test]
    fn test_following_value_with_spaces_may_start_with_dash() {
        let parsed = demo(&["-ArmFlags", "-mcpu=cortex_a7 -mfpu=neon -mfloat-abi=hard", "-Flash"]);
        assert_eq!(
            parsed.arm_flags.as_deref(),
            Some("-mcpu=cortex_a7 -mfpu=neon -mfloat-abi=hard")
        );
        assert!(parsed.flash);
    }

    #[test]
    fn test_single_dash_token_is_still_an_option() {
        let err = run(&["-ArmFlags", "-mcpu=cortex_a7"]).unwrap_err();
        assert_eq!(err.to_string(), "Unknown argument: -mcpu=cortex_a7");
    }

    #[test]
    fn test_last_occurrence_wins() {
        assert_eq!(demo(&["-Baud", "1", "-Baud", "2"]).baud, Some(2));
    }

    #[test]
    fn test_unknown_option_names_token() {
        let err = run(&["-Bogus=1"]).unwrap_err();
        assert_eq!(err.to_string(), "Unknown argument: -Bogus=1");
    }

    #[test]
    fn test_bare_token_is_rejected() {
        let err = run(&["positional"]).unwrap_err();
        assert!(matches!(err, DriverError::UnknownArgument(ref t) if t == "positional"));
    }

    #[test]
    fn test_empty_names_are_rejected() {
        for token in ["-", "--", "-=x"] {
            assert!(matches!(run(&[token]), Err(DriverError::UnknownArgument(_))), "{token}");
        }
    }

    #[test]
    fn test_bad_value_is_usage_error() {
        let err = run(&["-Baud", "fast"]).unwrap_err();
        assert!(matches!(err, DriverError::Usage(_)));
        assert!(err.to_string().contains("fast"));
    }

    #[test]
    fn test_tokenize_dangling_value_option() {
        let options = tokenize(&["-Port"]).unwrap();
        assert_eq!(
            options,
            vec![RawOption {
                raw: "-Port".into(),
                name: "Port".into(),
                value: None,
            }]
        );
    }

    #[test]
    fn test_with_usage_returns_error_unchanged() {
        let err = with_usage::<Demo>(DriverError::UnknownArgument("-Bogus".into()));
        assert_eq!(err.to_string(), "Unknown argument: -Bogus");

        let err = with_usage::<Demo>(DriverError::MissingPath("/idf".into()));
        assert!(!err.is_argument_error());
    }

    #[test]
    fn test_usage_lists_options() {
        let text = usage::<Demo>();
        assert!(text.contains("--WorkspacePath"));
        assert!(text.contains("--Baud"));
    }
}
