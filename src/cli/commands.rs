//! Command execution

use std::io::Write;

use colored::Colorize;

use super::state::{load_shortener, save_shortener};
use super::{Cli, CliError, Commands, ConfigCommands, ParamArgs};
use crate::config::{StaticConfig, init_config};
use crate::tracking::{
    ShortenerOptions, TablesSnapshot, TrackingShortener, create_tracking_link, decode_tracking_url,
    encode_tracking_url, expand_url, extract_tracking_params, shorten_url,
};

const DEFAULT_SAMPLE_CONFIG_PATH: &str = "config.example.toml";

/// Run a parsed command, printing results to stdout.
pub fn run(cli: Cli) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_with_output(cli, &mut out)
}

/// Run a parsed command, writing results to `out`.
pub fn run_with_output(cli: Cli, out: &mut dyn Write) -> Result<(), CliError> {
    let config = init_config(cli.config.as_deref());

    if let Commands::Config { action } = &cli.command {
        return config_command(action, out);
    }

    let state_path = cli
        .state
        .clone()
        .unwrap_or_else(|| config.shortener.state_file.clone());
    let mut shortener = load_shortener(&state_path, ShortenerOptions::from(&config.shortener))?;

    let mutated = execute(&cli.command, &mut shortener, &config, out)?;
    if mutated {
        save_shortener(&state_path, &shortener)?;
    }
    Ok(())
}

/// Returns whether the id tables may have changed.
fn execute(
    command: &Commands,
    shortener: &mut TrackingShortener,
    config: &StaticConfig,
    out: &mut dyn Write,
) -> Result<bool, CliError> {
    match command {
        Commands::Encode(args) => {
            let code = encode_tracking_url(shortener, &args.to_params(), args.strategy);
            emit(out, &code)?;
            Ok(true)
        }
        Commands::Decode { code } => {
            let fields = decode_tracking_url(shortener, code);
            if fields.is_empty() {
                return Err(CliError::NotDecodable(code.clone()));
            }
            emit(out, &to_json(&fields)?)?;
            Ok(false)
        }
        Commands::Link { base_url, params } => {
            let base = base_url
                .as_deref()
                .unwrap_or(config.shortener.base_url.as_str());
            let link = link_command(shortener, base, params);
            emit(out, &link)?;
            Ok(true)
        }
        Commands::Extract { short_url } => {
            let fields = extract_tracking_params(shortener, short_url);
            if fields.is_empty() {
                return Err(CliError::NotDecodable(short_url.clone()));
            }
            emit(out, &to_json(&fields)?)?;
            Ok(false)
        }
        Commands::Shorten { long_url } => {
            let short = shorten_url(shortener, long_url)?;
            emit(out, &short)?;
            Ok(true)
        }
        Commands::Expand { short_url } => match expand_url(shortener, short_url)? {
            Some(target) => {
                emit(out, &target)?;
                Ok(false)
            }
            None => Err(CliError::NotDecodable(short_url.clone())),
        },
        Commands::Stats => {
            stats_command(shortener, out)?;
            Ok(false)
        }
        Commands::Export { file_path } => {
            let json = shortener.export_json()?;
            match file_path {
                Some(path) => {
                    std::fs::write(path, json).map_err(|e| {
                        CliError::CommandError(format!("Failed to write '{}': {}", path, e))
                    })?;
                    emit(
                        out,
                        &format!("{} Tables exported to {}", "✓".bold().green(), path.cyan()),
                    )?;
                }
                None => emit(out, &json)?,
            }
            Ok(false)
        }
        Commands::Import { file_path } => {
            let content = std::fs::read_to_string(file_path).map_err(|e| {
                CliError::CommandError(format!("Failed to read '{}': {}", file_path, e))
            })?;
            let snapshot: TablesSnapshot = serde_json::from_str(&content).map_err(|e| {
                CliError::CommandError(format!("Invalid snapshot '{}': {}", file_path, e))
            })?;
            shortener.import_tables(snapshot)?;
            emit(
                out,
                &format!(
                    "{} Imported {} campaigns, {} sub values, {} sequences",
                    "✓".bold().green(),
                    shortener.tables().campaign_count(),
                    shortener.tables().sub_value_count(),
                    shortener.tables().sequence_count()
                ),
            )?;
            Ok(true)
        }
        Commands::Config { .. } => Ok(false),
    }
}

fn link_command(shortener: &mut TrackingShortener, base_url: &str, args: &ParamArgs) -> String {
    create_tracking_link(shortener, base_url, &args.to_params(), args.strategy)
}

fn stats_command(shortener: &TrackingShortener, out: &mut dyn Write) -> Result<(), CliError> {
    let stats = shortener.stats();
    let lines = [
        format!("{}", "Table statistics:".bold().green()),
        format!(
            "  campaigns:   {} / {}",
            stats.campaigns.to_string().cyan(),
            stats.campaign_capacity
        ),
        format!("  sub values:  {}", stats.sub_values.to_string().cyan()),
        format!("  sequences:   {}", stats.sequences.to_string().cyan()),
        format!(
            "  next ids:    campaign={} sub={} seq={}",
            stats.next_campaign_id, stats.next_sub_id, stats.next_seq_id
        ),
    ];
    for line in lines {
        emit(out, &line)?;
    }
    Ok(())
}

fn config_command(action: &ConfigCommands, out: &mut dyn Write) -> Result<(), CliError> {
    match action {
        ConfigCommands::Generate { output_path } => {
            let path = output_path
                .as_deref()
                .unwrap_or(DEFAULT_SAMPLE_CONFIG_PATH);
            StaticConfig::default().save_to_file(path)?;
            emit(
                out,
                &format!(
                    "{} Sample configuration written to {}",
                    "✓".bold().green(),
                    path.cyan()
                ),
            )
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CliError::CommandError(format!("Failed to render JSON: {}", e)))
}

fn emit(out: &mut dyn Write, line: &str) -> Result<(), CliError> {
    writeln!(out, "{}", line)
        .map_err(|e| CliError::CommandError(format!("Failed to write output: {}", e)))
}
