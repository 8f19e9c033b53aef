//! nfconv — renames files and folders to one Unicode normalization form.
//!
//! This binary parses arguments, loads the optional config file, installs
//! logging, and drives `nfconv-core`, printing one line per entry.

mod output;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use nfconv_core::{
    collect_with, convert_with, CollectOptions, Config, CoreError, DropRoots, NormalizationForm,
    RenamePlan, RunReport,
};

#[derive(Parser, Debug)]
#[command(name = "nfconv", version, about = "Normalise file and folder names to NFC or NFD")]
struct Args {
    /// Files or directories to convert
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Target normalization form: nfc (composed) or nfd (decomposed)
    #[arg(long, short = 'f', value_name = "FORM")]
    form: Option<NormalizationForm>,

    /// Print the planned renames without touching anything
    #[arg(long, short = 'n')]
    dry_run: bool,

    /// Convert to FORM, then to the opposite form, then back again
    #[arg(long, conflicts_with = "dry_run")]
    round_trip: bool,

    /// Leave dot-files found inside directories alone
    #[arg(long)]
    no_hidden: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/nfconv/config.toml)
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    init_logging(log_level(args.verbose, &config)?);

    if let Err(e) = run(&args, &config) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

fn run(args: &Args, config: &Config) -> anyhow::Result<()> {
    let form = args.form.unwrap_or(config.convert.form);
    let mut options = config.collect_options();
    if args.no_hidden {
        options.include_hidden = false;
    }
    let roots = DropRoots::from_paths(&args.paths);

    if args.dry_run {
        dry_run(&roots, form, options);
        return Ok(());
    }

    let passes = if args.round_trip {
        vec![form, form.opposite(), form]
    } else {
        vec![form]
    };

    let mut roots = roots;
    for pass in passes {
        tracing::info!(form = %pass, roots = roots.len(), "starting pass");
        let report = convert_with(&roots, pass, options, |event| output::print_event(&event));
        roots = finish_pass(report)?;
    }
    Ok(())
}

fn dry_run(roots: &DropRoots, form: NormalizationForm, options: CollectOptions) {
    let collection = collect_with(roots.paths(), options);
    for line in output::collection_warnings(&collection.unreadable, &collection.missing) {
        eprintln!("{line}");
    }
    let plan = RenamePlan::build(&collection.entries, form);
    for line in output::plan_lines(&plan) {
        println!("{line}");
    }
}

/// Turns an aborted run into an error and hands back the updated roots.
///
/// The failing entry was already printed as a progress line, so the error
/// only summarises how far the pass got.
fn finish_pass(report: RunReport) -> anyhow::Result<DropRoots> {
    if report.failure().is_some() {
        anyhow::bail!(
            "conversion to {} stopped after {} of {} processed entries were renamed",
            report.form,
            report.renamed_count(),
            report.outcomes.len()
        );
    }
    Ok(report.roots)
}

/// Loads the config from `explicit`, or from the default location if present.
fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = explicit {
        return Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()));
    }
    let Some(path) = default_config_path() else {
        return Ok(Config::default());
    };
    match Config::load(&path) {
        Ok(config) => Ok(config),
        Err(CoreError::NotFound(_)) => Ok(Config::default()),
        Err(e) => Err(e).with_context(|| format!("failed to load config {}", path.display())),
    }
}

/// Returns `$XDG_CONFIG_HOME/nfconv/config.toml`, falling back to `~/.config`.
fn default_config_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join("nfconv").join("config.toml"))
}

fn log_level(verbose: u8, config: &Config) -> anyhow::Result<tracing::Level> {
    match verbose {
        0 => config
            .log
            .level
            .parse()
            .with_context(|| format!("invalid log level '{}' in config", config.log.level)),
        1 => Ok(tracing::Level::INFO),
        _ => Ok(tracing::Level::DEBUG),
    }
}

/// Logs go to stderr so progress lines on stdout stay machine-readable.
fn init_logging(level: tracing::Level) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}
