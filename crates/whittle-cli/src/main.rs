//! Whittle CLI
//!
//! Command-line interface for the whittle test-case reducer

mod commands;
mod output;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use whittle_core::{Result, init_tracing};

#[derive(Parser)]
#[command(name = "whittle")]
#[command(about = "Whittle: shrink scripts while their findings keep reproducing")]
#[command(version = whittle_core::VERSION)]
#[command(
    long_about = "Whittle analyzes whittle scripts and reduces a program to a smaller one\n\
that still reports the same findings at the same nodes.\n\
\n\
Examples:\n  \
whittle check src/                     # List numbered findings\n  \
whittle reduce src/ --finding 2        # Reduce one finding\n  \
whittle reduce src/ -o min.wh --diff   # Write the result and show a diff\n  \
whittle config init                    # Create .whittlerc.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        help = "Path to configuration file (.whittlerc.toml/.whittlerc.json)"
    )]
    config: Option<PathBuf>,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Generate shell completion script
    #[arg(
        long,
        value_enum,
        help = "Generate completion script for specified shell"
    )]
    generate_completion: Option<Shell>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze script files and list numbered findings
    Check {
        /// Files or directories to analyze
        #[arg(help = "Files or directories to process (default: current directory)")]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "human", help = "Output format for findings")]
        format: OutputFormat,
    },

    /// Reduce a program while selected findings keep reproducing
    Reduce {
        /// Files or directories to load
        #[arg(help = "Files or directories to process (default: current directory)")]
        paths: Vec<PathBuf>,

        /// Write the reduced program here instead of printing it
        #[arg(short, long, help = "Output file (default: print to stdout)")]
        output: Option<PathBuf>,

        /// Track only findings of these rules
        #[arg(long = "rule", help = "Track findings of this rule (can be used multiple times)")]
        rules: Vec<String>,

        /// Track only these findings, numbered as by `check`
        #[arg(
            long = "finding",
            help = "Track finding number N from `check` (can be used multiple times)"
        )]
        findings: Vec<usize>,

        /// Skip the hoist pass
        #[arg(long, help = "Only remove nodes, never hoist children")]
        no_hoist: bool,

        /// Bound on outer iterations
        #[arg(long, help = "Stop after N iterations (default: run to a fixpoint)")]
        max_iterations: Option<usize>,

        /// Show a diff between the merged input and the result
        #[arg(long, help = "Print a unified diff of merged input and result")]
        diff: bool,

        /// Print reduction statistics
        #[arg(long, help = "Print reduction statistics to stderr")]
        stats: bool,
    },

    /// Manage configuration files
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version information
    Version {
        /// Show detailed version information
        #[arg(long, help = "Show build details")]
        detailed: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Initialize a new configuration file
    Init {
        /// Overwrite existing configuration file
        #[arg(long, help = "Overwrite existing configuration file")]
        force: bool,
    },

    /// Show the configuration in effect
    Show,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Human-readable output with colors
    Human,
    /// JSON format for programmatic consumption
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(shell) = cli.generate_completion {
        generate_completion_script(shell);
        return ExitCode::SUCCESS;
    }

    if !cli.no_color && std::env::var("NO_COLOR").is_err() {
        colored::control::unset_override();
    } else {
        colored::control::set_override(false);
    }

    let log_level = match cli.verbose {
        0 => "whittle=error",
        1 => "whittle=warn",
        2 => "whittle=info",
        3 => "whittle=debug",
        _ => "whittle=trace",
    };
    init_tracing(log_level);

    match run_command(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("whittle failed: {e}");
            eprintln!("{} {e}", colored::Colorize::red("error:"));
            ExitCode::from(2)
        }
    }
}

fn generate_completion_script(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

/// Current directory when no path is given
fn default_paths(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    if paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        paths
    }
}

fn run_command(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Some(Commands::Check { paths, format }) => {
            commands::check_command(default_paths(paths), format, cli.config)
        }

        Some(Commands::Reduce {
            paths,
            output,
            rules,
            findings,
            no_hoist,
            max_iterations,
            diff,
            stats,
        }) => {
            let args = commands::ReduceArgs {
                paths: default_paths(paths),
                output,
                rules,
                findings,
                no_hoist,
                max_iterations,
                diff,
                stats,
            };
            commands::reduce_command(args, cli.config)
        }

        Some(Commands::Config { action }) => match action {
            ConfigAction::Init { force } => commands::config_init_command(force),
            ConfigAction::Show => commands::config_show_command(cli.config),
        },

        Some(Commands::Version { detailed }) => {
            if detailed {
                println!("whittle {}", whittle_core::VERSION);
                println!("Build information:");
                println!("  Target: {}", std::env::consts::ARCH);
                println!("  OS: {}", std::env::consts::OS);
            } else {
                println!("{}", whittle_core::VERSION);
            }
            Ok(ExitCode::SUCCESS)
        }

        None => {
            let mut cmd = Cli::command();
            cmd.print_help()
                .map_err(|e| whittle_core::WhittleError::io_error("<stdout>", e))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
