//! CLI argument definitions for tractkey.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "tractkey",
    version,
    about = "Normalize Census, FFIEC, HMDA, CRA and FDIC geography onto one key",
    long_about = "Decode and reconcile public banking and census datasets.\n\n\
                  Every record is normalized to a (state, county, tract) key so that\n\
                  sources with different FIPS conventions can be filtered and joined."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Reconcile every source in a run configuration.
    Run(RunArgs),

    /// Parse a FIPS listing and show the codes for one state.
    Fips(FipsArgs),

    /// List the CRA fixed-width table layouts.
    Schemas(SchemasArgs),

    /// Join two configured sources on their geographic key.
    Join(JoinArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Run configuration (TOML).
    #[arg(long = "config", value_name = "PATH")]
    pub config: PathBuf,

    /// State abbreviation (overrides the configured region).
    #[arg(long = "state", value_name = "ABBR")]
    pub state: Option<String>,

    /// County of interest; repeat for several (overrides the configured list).
    #[arg(long = "county", value_name = "NAME")]
    pub counties: Vec<String>,

    /// Print the summary as JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,

    /// Show the first N in-region records of each source.
    #[arg(long = "preview", value_name = "N")]
    pub preview: Option<usize>,
}

#[derive(Parser)]
pub struct FipsArgs {
    /// FIPS listing text file.
    #[arg(long = "listing", value_name = "PATH")]
    pub listing: PathBuf,

    /// State abbreviation whose counties are listed.
    #[arg(long = "state", value_name = "ABBR")]
    pub state: String,

    /// 0-based, end-exclusive line range of the state block (START:END).
    #[arg(long = "state-lines", value_name = "START:END", value_parser = parse_line_range)]
    pub state_lines: Option<[usize; 2]>,

    /// 0-based, end-exclusive line range of the county block (START:END).
    #[arg(long = "county-lines", value_name = "START:END", value_parser = parse_line_range)]
    pub county_lines: Option<[usize; 2]>,
}

#[derive(Parser)]
pub struct SchemasArgs {
    /// Show the field layout of one table (token like A11 or name like A1-1).
    #[arg(long = "variant", value_name = "TABLE")]
    pub variant: Option<String>,
}

#[derive(Parser)]
pub struct JoinArgs {
    /// Run configuration (TOML).
    #[arg(long = "config", value_name = "PATH")]
    pub config: PathBuf,

    /// Name of the left source.
    #[arg(long = "left", value_name = "SOURCE")]
    pub left: String,

    /// Name of the right source.
    #[arg(long = "right", value_name = "SOURCE")]
    pub right: String,

    /// Key used to match records.
    #[arg(long = "granularity", value_enum, default_value = "tract")]
    pub granularity: GranularityArg,

    /// Print the join counts as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum GranularityArg {
    Tract,
    County,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

fn parse_line_range(value: &str) -> Result<[usize; 2], String> {
    let (start, end) = value
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got '{value}'"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<usize>()
            .map_err(|error| format!("invalid line number '{part}': {error}"))
    };
    let (start, end) = (parse(start)?, parse(end)?);
    if start >= end {
        return Err(format!("empty line range {start}:{end}"));
    }
    Ok([start, end])
}
