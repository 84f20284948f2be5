//! `bloodwork` command-line entry point.

use std::io::{self, IsTerminal};

use bt_cli::commands::{run_assess, run_convert, run_ocr};
use bt_cli::logging::{LogConfig, LogFormat, init_logging};
use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

mod cli;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::summary::{print_assess_summary, print_convert_summary, print_ocr_summary};

fn main() {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let outcome = match &cli.command {
        Command::Assess(args) => run_assess(&args.to_options()).map(|result| {
            print_assess_summary(&result);
            0
        }),
        Command::Convert(args) => run_convert(&args.to_options()).map(|result| {
            print_convert_summary(&result);
            0
        }),
        Command::Ocr(args) => run_ocr(&args.to_options()).and_then(|outcome| {
            print_ocr_summary(&outcome)?;
            Ok(0)
        }),
    };
    let exit_code = match outcome {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.log_data = cli.log_data;
    // Log files and debug output carry timestamps and event targets.
    let detailed = cli.log_file.is_some() || config.level_filter >= LevelFilter::DEBUG;
    config.with_timestamps = detailed;
    config.with_target = detailed;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(args: &[&str]) -> LogConfig {
        let cli = Cli::try_parse_from(args).unwrap();
        log_config_from_cli(&cli)
    }

    #[test]
    fn default_output_is_terse() {
        let config = config_for(&["bloodwork", "convert", "lab.csv"]);
        assert_eq!(config.level_filter, LevelFilter::WARN);
        assert!(!config.with_timestamps);
        assert!(!config.with_target);
        assert!(!config.log_data);
    }

    #[test]
    fn debug_level_adds_timestamps_and_targets() {
        let config = config_for(&["bloodwork", "--log-level", "debug", "convert", "lab.csv"]);
        assert_eq!(config.level_filter, LevelFilter::DEBUG);
        assert!(config.with_timestamps);
        assert!(config.with_target);
        assert!(!config.use_env_filter);
    }

    #[test]
    fn log_file_adds_timestamps_without_color() {
        let config = config_for(&[
            "bloodwork",
            "--log-file",
            "run.log",
            "--log-data",
            "convert",
            "lab.csv",
        ]);
        assert!(config.with_timestamps);
        assert!(config.with_target);
        assert!(config.log_data);
        assert!(!config.with_ansi);
    }
}
