//! Configuration system for whittle
//!
//! Configuration lives in `.whittlerc.toml`, `.whittlerc.json`, `whittle.toml`
//! or `whittle.json`, found by walking up from the working directory. Every
//! key is optional.
//!
//! ```toml
//! [reducer]
//! hoist = true
//! maxIterations = 20
//!
//! [analyzer]
//! builtins = ["print", "len", "assert"]
//! disabledRules = ["suspicious/unreachable-code"]
//!
//! [files]
//! extensions = ["wh"]
//! exclude = ["**/vendor/**"]
//! ```

mod loader;
mod whittle_config;

pub use loader::{CONFIG_FILE_NAMES, ConfigLoader};
pub use whittle_config::{AnalyzerConfig, FilesConfig, ReducerConfig, WhittleConfig};
