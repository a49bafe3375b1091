//! CLI command implementations
//!
//! `check` and `reduce` share project loading: configuration is discovered
//! from the first path, files are discovered and analyzed together, and
//! findings are numbered in the order `check` prints them.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{debug, info, warn};
use whittle_core::analysis::rules::rule;
use whittle_core::{
    ConfigLoader, Finding, LintEngine, ReduceOptions, Reducer, Result, WhittleConfig,
    WhittleError,
};

use crate::OutputFormat;
use crate::output::{CheckSummary, OutputFormatter, Spinner, print_diff, print_stats};

/// Staged file name used when `--output` is not given
pub const DEFAULT_TARGET: &str = "reduced.wh";

/// File written by `config init`
pub const INIT_CONFIG_FILE: &str = ".whittlerc.toml";

/// Arguments of `whittle reduce`
#[derive(Debug, Clone)]
pub struct ReduceArgs {
    pub paths: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub rules: Vec<String>,
    pub findings: Vec<usize>,
    pub no_hoist: bool,
    pub max_iterations: Option<usize>,
    pub diff: bool,
    pub stats: bool,
}

/// Load the explicit config, or discover one from the first path
fn load_config(config_path: Option<PathBuf>, paths: &[PathBuf]) -> Result<WhittleConfig> {
    if let Some(path) = config_path {
        return ConfigLoader::load(Some(&path), None);
    }
    let start = match paths.first() {
        Some(first) if first.is_file() => match first.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        },
        Some(first) if first.is_dir() => first.as_path(),
        _ => Path::new("."),
    };
    ConfigLoader::load(None, Some(start))
}

/// Check command implementation
pub fn check_command(
    paths: Vec<PathBuf>,
    format: OutputFormat,
    config_path: Option<PathBuf>,
) -> Result<ExitCode> {
    debug!("Running check command on paths: {:?}", paths);
    let config = load_config(config_path, &paths)?;

    let start_time = Instant::now();
    let mut engine = LintEngine::load(&paths, &config)?;
    let (findings, errors) = engine.check_all();
    let summary = CheckSummary::new(engine.files().count(), &findings, &errors);
    info!("Check finished in {:?}", start_time.elapsed());

    OutputFormatter::new(format).print_check(&findings, &errors, &summary)?;

    Ok(if summary.has_issues() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Reduce command implementation
pub fn reduce_command(args: ReduceArgs, config_path: Option<PathBuf>) -> Result<ExitCode> {
    debug!("Running reduce command with {:?}", args);
    let config = load_config(config_path, &args.paths)?;

    let mut options = ReduceOptions::from(&config.reducer);
    if args.no_hoist {
        options.hoist = false;
    }
    if let Some(max) = args.max_iterations {
        if max == 0 {
            return Err(WhittleError::config_error(
                "--max-iterations must be at least 1",
            ));
        }
        options.max_iterations = Some(max);
    }

    let mut engine = LintEngine::load(&args.paths, &config)?;
    let (findings, errors) = engine.check_all();
    for error in &errors {
        warn!("File skipped: {error}");
    }
    if findings.is_empty() {
        eprintln!("No findings to reduce");
        return Ok(ExitCode::SUCCESS);
    }
    let selected = select_findings(findings, &args.rules, &args.findings)?;
    if selected.is_empty() {
        return Err(WhittleError::config_error(
            "no finding matches the given --rule filters",
        ));
    }

    let target = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TARGET));
    if engine.files().any(|file| same_file(file, &target)) {
        return Err(WhittleError::config_error(format!(
            "output '{}' is one of the input files",
            target.display()
        )));
    }

    let spinner = Spinner::start(format!("Reducing {} finding(s)", selected.len()));
    let reducer = Reducer::new(&mut engine, &target, selected, options)?;
    let merged = reducer.working_text()?;
    let reduction = reducer.reduce()?;
    spinner.finish();

    match &args.output {
        Some(path) => {
            fs::write(path, &reduction.text).map_err(|e| WhittleError::io_error(path, e))?;
            eprintln!(
                "Wrote {} ({} -> {} bytes)",
                path.display(),
                reduction.stats.initial_bytes,
                reduction.stats.final_bytes
            );
        }
        None if !args.diff => print!("{}", reduction.text),
        None => {}
    }
    if args.diff {
        print_diff(&merged, &reduction.text);
    }
    if args.stats {
        print_stats(&reduction.stats);
    }
    Ok(ExitCode::SUCCESS)
}

/// Keep the findings named by number (1-based) and by rule
///
/// Empty filters keep everything.
fn select_findings(
    findings: Vec<Finding>,
    rules: &[String],
    numbers: &[usize],
) -> Result<Vec<Finding>> {
    if let Some(bad) = numbers.iter().find(|n| **n == 0 || **n > findings.len()) {
        return Err(WhittleError::config_error(format!(
            "no finding #{bad}; check reported {}",
            findings.len()
        )));
    }
    if let Some(unknown) = rules.iter().find(|id| rule(id).is_none()) {
        return Err(WhittleError::config_error(format!("unknown rule '{unknown}'")));
    }

    Ok(findings
        .into_iter()
        .enumerate()
        .filter(|(i, _)| numbers.is_empty() || numbers.contains(&(i + 1)))
        .filter(|(_, f)| rules.is_empty() || rules.contains(&f.rule_id))
        .map(|(_, f)| f)
        .collect())
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Config init command implementation
pub fn config_init_command(force: bool) -> Result<ExitCode> {
    let config_path = PathBuf::from(INIT_CONFIG_FILE);
    if config_path.exists() && !force {
        return Err(WhittleError::config_error(format!(
            "Configuration file '{INIT_CONFIG_FILE}' already exists. Use --force to overwrite."
        )));
    }

    let content = WhittleConfig::default().to_toml()?;
    fs::write(&config_path, content).map_err(|e| WhittleError::io_error(&config_path, e))?;
    println!("Created configuration file: {INIT_CONFIG_FILE}");
    Ok(ExitCode::SUCCESS)
}

/// Config show command implementation
pub fn config_show_command(config_path: Option<PathBuf>) -> Result<ExitCode> {
    let source = match config_path {
        Some(path) => Some(path),
        None => ConfigLoader::auto_discover(Path::new("."))?,
    };
    let config = ConfigLoader::load(source.as_deref(), None)?;

    match &source {
        Some(path) => println!("# Loaded from {}", path.display()),
        None => println!("# No configuration file found, showing defaults"),
    }
    print!("{}", config.to_toml()?);
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use whittle_core::Severity;

    fn finding(rule_id: &str, offset: usize) -> Finding {
        Finding::new(rule_id, Severity::Error, "message", "a.wh").at(offset, 1, offset + 1)
    }

    fn offsets(findings: &[Finding]) -> Vec<usize> {
        findings.iter().map(|f| f.offset).collect()
    }

    fn all() -> Vec<Finding> {
        vec![
            finding("correctness/undefined-function", 0),
            finding("correctness/undefined-variable", 5),
            finding("correctness/undefined-function", 9),
        ]
    }

    #[test]
    fn empty_filters_keep_everything() {
        let selected = select_findings(all(), &[], &[]).unwrap();
        assert_eq!(offsets(&selected), [0, 5, 9]);
    }

    #[test]
    fn numbers_are_one_based() {
        let selected = select_findings(all(), &[], &[1, 3]).unwrap();
        assert_eq!(offsets(&selected), [0, 9]);
    }

    #[test]
    fn rule_and_number_filters_combine() {
        let rules = ["correctness/undefined-function".to_string()];
        let selected = select_findings(all(), &rules, &[2, 3]).unwrap();
        assert_eq!(offsets(&selected), [9]);
    }

    #[test]
    fn bad_filters_are_errors() {
        assert!(select_findings(all(), &[], &[0]).is_err());
        assert!(select_findings(all(), &[], &[4]).is_err());
        assert!(select_findings(all(), &["style/none".to_string()], &[]).is_err());
    }
}
