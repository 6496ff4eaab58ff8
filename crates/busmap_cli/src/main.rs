//! busmap: address-map checker for hierarchical AXI interconnects.
//!
//! Provides `busmap check` to validate a set of bus property tables and
//! `busmap map` to list the decoded address windows of each bus.

#![warn(missing_docs)]

mod check;
mod map;
mod pipeline;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// busmap: SoC interconnect address-map validation.
#[derive(Parser, Debug)]
#[command(name = "busmap", version, about = "SoC interconnect address-map checker")]
pub struct Cli {
    /// Suppress status output; diagnostics are still printed.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a custom `busmap.toml` policy file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a set of property tables.
    Check(CheckArgs),
    /// List the decoded address windows of each bus without validating.
    Map(MapArgs),
}

/// Arguments for the `busmap check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Property tables: the system table and one table per bus.
    #[arg(required = true)]
    pub tables: Vec<PathBuf>,

    /// Clock profile selecting the supported frequencies.
    #[arg(short, long, env = "SOC_CONFIG", default_value = "embedded")]
    pub profile: String,

    /// Output format for diagnostics.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Report every range-level error instead of stopping at the first.
    #[arg(long)]
    pub all: bool,
}

/// Arguments for the `busmap map` subcommand.
#[derive(Args, Debug)]
pub struct MapArgs {
    /// Property tables to list.
    #[arg(required = true)]
    pub tables: Vec<PathBuf>,

    /// Clock profile used to resolve the table bindings.
    #[arg(short, long, env = "SOC_CONFIG", default_value = "embedded")]
    pub profile: String,

    /// Output format for the listing.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from the environment.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Diagnostic output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress status output.
    pub quiet: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom policy file.
    pub config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    logger(cli.verbose).init();

    let color = match cli.color {
        ColorChoice::Auto => terminal_supports_color(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        color,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Check(ref args) => check::run(args, &global),
        Command::Map(ref args) => map::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Logger for the busmap crates: warn, or debug with `--verbose`. `RUST_LOG`
/// overrides. The module filter is a prefix match, so it covers every
/// `busmap_*` crate.
fn logger(verbose: bool) -> env_logger::Builder {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    let mut builder = env_logger::Builder::new();
    builder
        .filter_module("busmap", level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false);
    builder
}

/// Colour is on when `TERM` is set to something other than `dumb` and
/// `NO_COLOR` is absent.
fn terminal_supports_color() -> bool {
    std::env::var_os("NO_COLOR").is_none()
        && std::env::var("TERM").is_ok_and(|term| term != "dumb")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_check_default() {
        let cli = Cli::parse_from(["busmap", "check", "config_main_bus.csv"]);
        match cli.command {
            Command::Check(ref args) => {
                assert_eq!(args.tables, vec![PathBuf::from("config_main_bus.csv")]);
                assert_eq!(args.format, ReportFormat::Text);
                assert!(!args.all);
            }
            _ => panic!("expected Check command"),
        }
    }

    #[test]
    fn parse_check_with_args() {
        let cli = Cli::parse_from([
            "busmap",
            "check",
            "config_system.csv",
            "config_main_bus.csv",
            "--profile",
            "hpc",
            "--format",
            "json",
            "--all",
        ]);
        match cli.command {
            Command::Check(ref args) => {
                assert_eq!(args.tables.len(), 2);
                assert_eq!(args.profile, "hpc");
                assert_eq!(args.format, ReportFormat::Json);
                assert!(args.all);
            }
            _ => panic!("expected Check command"),
        }
    }

    #[test]
    fn check_requires_tables() {
        assert!(Cli::try_parse_from(["busmap", "check"]).is_err());
    }

    #[test]
    fn parse_map() {
        let cli = Cli::parse_from(["busmap", "map", "a.csv", "b.csv", "-f", "json"]);
        match cli.command {
            Command::Map(ref args) => {
                assert_eq!(args.tables.len(), 2);
                assert_eq!(args.format, ReportFormat::Json);
            }
            _ => panic!("expected Map command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from([
            "busmap",
            "--quiet",
            "--color",
            "never",
            "--config",
            "/soc/busmap.toml",
            "map",
            "a.csv",
        ]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.color, ColorChoice::Never);
        assert_eq!(cli.config, Some(PathBuf::from("/soc/busmap.toml")));
    }

    #[test]
    fn verbose_logger_covers_every_busmap_crate() {
        use log::{Level, Log, Metadata};
        // RUST_LOG takes precedence over the defaults under test
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let enabled = |logger: &env_logger::Logger, target: &str, level: Level| {
            logger.enabled(&Metadata::builder().target(target).level(level).build())
        };
        let verbose = logger(true).build();
        assert!(enabled(&verbose, "busmap_validate::intra", Level::Debug));
        assert!(enabled(&verbose, "busmap_table::loader", Level::Debug));
        assert!(!enabled(&verbose, "toml::de", Level::Debug));

        let quiet = logger(false).build();
        assert!(!enabled(&quiet, "busmap_validate::intra", Level::Debug));
        assert!(enabled(&quiet, "busmap_config::loader", Level::Warn));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["busmap", "check", "a.csv", "--verbose", "--color", "always"]);
        assert!(cli.verbose);
        assert_eq!(cli.color, ColorChoice::Always);
    }
}
