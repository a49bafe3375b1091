//! Whittle Core
//!
//! Issue-preserving test-case reduction for whittle scripts. This crate
//! provides the syntax model and its path-addressed [`Cursor`], a small
//! rule-based analyzer behind the [`Engine`] trait, and the [`Reducer`] that
//! shrinks a program while every tracked finding keeps reproducing.

pub mod analysis;
pub mod config;
pub mod cursor;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod reducer;
pub mod result;
pub mod syntax;

// Re-export commonly used types
pub use analysis::{Declarations, Finding, IssueKey, RULES, RuleMetadata, Severity};
pub use config::{AnalyzerConfig, ConfigLoader, FilesConfig, ReducerConfig, WhittleConfig};
pub use cursor::{Cursor, Deletion, IndexShift};
pub use discovery::discover_files;
pub use engine::{Engine, IssueBuffer, LintEngine};
pub use error::{ErrorKind, WhittleError};
pub use reducer::{ReduceOptions, ReduceStats, Reducer, Reduction, reduce};
pub use result::{Result, ResultExt};
pub use syntax::{Node, NodeId, NodeKind, Span, Tree, parse, render};

/// Initialize the tracing subscriber for logging
///
/// `RUST_LOG` wins over `default_directive` when set. Calling this more than
/// once keeps the first subscriber.
pub fn init_tracing(default_directive: &str) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
