#![forbid(unsafe_code)]

//! Command-line argument parsing.
//!
//! Parses args manually (no external dependencies) to keep the binary lean.
//! Supports environment variable overrides via the `HACKSCREEN_*` prefix.

use std::env;
use std::path::PathBuf;
use std::process;

use hackscreen_fx::rain::DEFAULT_FPS;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
hackscreen - a movie-style hacking sequence for your terminal

USAGE:
    hackscreen [OPTIONS]

OPTIONS:
    --seed=N         Seed every random choice for a replayable run
    --speed=F        Delay multiplier; 0 removes all pauses (default: 1.0)
    --fps=N          Rain frame rate, 1-120 (default: 25)
    --no-rain        Stop after the final sequence
    --rain-only      Skip straight to the rain
    --assets=DIR     Load content from DIR instead of the built-in copy
    --log-file=PATH  Write logs to PATH
    --help, -h       Show this help message
    --version, -V    Show version

KEYS:
    Ctrl+C           Abort the sequence
    any key          Leave the rain

ENVIRONMENT VARIABLES:
    HACKSCREEN_SEED         Override --seed
    HACKSCREEN_SPEED        Override --speed
    HACKSCREEN_FPS          Override --fps
    HACKSCREEN_TEST_MODE    Set to 1 to behave as --no-rain
    HACKSCREEN_ASSETS       Override --assets
    HACKSCREEN_LOG_FILE     Override --log-file
    HACKSCREEN_LOG          Log filter directives (default: info)
    HACKSCREEN_LOG_FORMAT   'json' for JSON log lines";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq)]
pub struct Opts {
    /// Seed for every random source; drawn from the OS when absent.
    pub seed: Option<u64>,
    /// Delay multiplier for the phase stage.
    pub speed: f64,
    /// Rain frame rate.
    pub fps: u32,
    /// Whether the rain stage runs at the end.
    pub rain: bool,
    /// Whether the phase stage runs at all.
    pub phases: bool,
    /// Content directory overriding the bundled pools.
    pub assets: Option<PathBuf>,
    /// Log destination; logging is off without one.
    pub log_file: Option<PathBuf>,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            seed: None,
            speed: 1.0,
            fps: DEFAULT_FPS,
            rain: true,
            phases: true,
            assets: None,
            log_file: None,
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(Opts),
    Help,
    Version,
}

impl Opts {
    /// Parse command-line arguments and environment variables.
    ///
    /// Environment variables take precedence over defaults but are overridden
    /// by explicit command-line flags. Prints help or version and exits when
    /// asked to; exits with status 1 on a bad argument.
    pub fn parse() -> Self {
        match parse_from(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(Command::Run(opts)) => opts,
            Ok(Command::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Command::Version) => {
                println!("hackscreen {VERSION}");
                process::exit(0);
            }
            Err(msg) => {
                eprintln!("{msg}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }
}

/// Parse `args` with environment lookups through `var`.
///
/// Unparseable environment values are ignored; unparseable flags are an
/// error.
pub fn parse_from<I, S, F>(args: I, var: F) -> Result<Command, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    F: Fn(&str) -> Option<String>,
{
    let mut opts = Opts::default();

    // Apply environment variable defaults first
    if let Some(val) = var("HACKSCREEN_SEED")
        && let Ok(n) = val.parse()
    {
        opts.seed = Some(n);
    }
    if let Some(val) = var("HACKSCREEN_SPEED")
        && let Some(f) = parse_speed(&val)
    {
        opts.speed = f;
    }
    if let Some(val) = var("HACKSCREEN_FPS")
        && let Ok(n) = val.parse()
    {
        opts.fps = n;
    }
    if var("HACKSCREEN_TEST_MODE").as_deref() == Some("1") {
        opts.rain = false;
    }
    if let Some(val) = var("HACKSCREEN_ASSETS") {
        opts.assets = Some(PathBuf::from(val));
    }
    if let Some(val) = var("HACKSCREEN_LOG_FILE") {
        opts.log_file = Some(PathBuf::from(val));
    }

    // Parse command-line args (override env vars)
    for arg in args {
        match arg.as_ref() {
            "--help" | "-h" => return Ok(Command::Help),
            "--version" | "-V" => return Ok(Command::Version),
            "--no-rain" => opts.rain = false,
            "--rain-only" => opts.phases = false,
            other => {
                if let Some(val) = other.strip_prefix("--seed=") {
                    opts.seed = Some(
                        val.parse()
                            .map_err(|_| format!("Invalid --seed value: {val}"))?,
                    );
                } else if let Some(val) = other.strip_prefix("--speed=") {
                    opts.speed = parse_speed(val)
                        .ok_or_else(|| format!("Invalid --speed value: {val}"))?;
                } else if let Some(val) = other.strip_prefix("--fps=") {
                    opts.fps = val
                        .parse()
                        .map_err(|_| format!("Invalid --fps value: {val}"))?;
                } else if let Some(val) = other.strip_prefix("--assets=") {
                    opts.assets = Some(PathBuf::from(val));
                } else if let Some(val) = other.strip_prefix("--log-file=") {
                    opts.log_file = Some(PathBuf::from(val));
                } else {
                    return Err(format!("Unknown argument: {other}"));
                }
            }
        }
    }

    if !opts.phases && !opts.rain {
        return Err("--rain-only and --no-rain leave nothing to run".to_string());
    }
    Ok(Command::Run(opts))
}

/// A finite, non-negative delay multiplier.
fn parse_speed(val: &str) -> Option<f64> {
    val.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && *f >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn run(args: &[&str], env: &[(&str, &str)]) -> Result<Command, String> {
        let env: Vec<(String, String)> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        parse_from(args.iter().copied(), |key| {
            env.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
        })
    }

    fn opts(args: &[&str], env: &[(&str, &str)]) -> Opts {
        match run(args, env) {
            Ok(Command::Run(opts)) => opts,
            other => panic!("expected options, got {other:?}"),
        }
    }

    #[test]
    fn default_opts() {
        let opts = Opts::default();
        assert_eq!(opts.seed, None);
        assert_eq!(opts.speed, 1.0);
        assert_eq!(opts.fps, 25);
        assert!(opts.rain && opts.phases);
        assert_eq!(parse_from(Vec::<String>::new(), no_env), Ok(Command::Run(opts)));
    }

    #[test]
    fn flags_are_parsed() {
        let opts = opts(
            &["--seed=99", "--speed=0", "--fps=60", "--no-rain", "--assets=/tmp/a"],
            &[],
        );
        assert_eq!(opts.seed, Some(99));
        assert_eq!(opts.speed, 0.0);
        assert_eq!(opts.fps, 60);
        assert!(!opts.rain);
        assert_eq!(opts.assets, Some(PathBuf::from("/tmp/a")));
    }

    #[test]
    fn flags_override_environment() {
        let env = [("HACKSCREEN_SEED", "1"), ("HACKSCREEN_SPEED", "2.5")];
        assert_eq!(opts(&[], &env).seed, Some(1));
        assert_eq!(opts(&[], &env).speed, 2.5);
        assert_eq!(opts(&["--seed=7"], &env).seed, Some(7));
    }

    #[test]
    fn test_mode_disables_rain() {
        assert!(!opts(&[], &[("HACKSCREEN_TEST_MODE", "1")]).rain);
        assert!(opts(&[], &[("HACKSCREEN_TEST_MODE", "0")]).rain);
    }

    #[test]
    fn bad_environment_values_are_ignored() {
        let opts = opts(&[], &[("HACKSCREEN_FPS", "fast"), ("HACKSCREEN_SPEED", "-1")]);
        assert_eq!(opts.fps, 25);
        assert_eq!(opts.speed, 1.0);
    }

    #[test]
    fn bad_flags_are_errors() {
        assert!(run(&["--fps=fast"], &[]).is_err());
        assert!(run(&["--speed=-2"], &[]).is_err());
        assert!(run(&["--speed=NaN"], &[]).is_err());
        assert!(run(&["--bogus"], &[]).is_err());
        assert!(run(&["--rain-only", "--no-rain"], &[]).is_err());
    }

    #[test]
    fn help_and_version() {
        assert_eq!(run(&["--seed=1", "-h"], &[]), Ok(Command::Help));
        assert_eq!(run(&["--version"], &[]), Ok(Command::Version));
        assert!(HELP_TEXT.contains("--rain-only"));
        assert!(!VERSION.is_empty());
    }
}
