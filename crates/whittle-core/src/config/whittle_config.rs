//! Configuration file model

use crate::{Result, WhittleError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level configuration (`.whittlerc.toml`, `whittle.json`, ...)
///
/// Every section is optional in the file and falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct WhittleConfig {
    pub reducer: ReducerConfig,
    pub analyzer: AnalyzerConfig,
    pub files: FilesConfig,
}

/// Reducer behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ReducerConfig {
    /// Run the hoist pass after each removal pass
    pub hoist: bool,
    /// Upper bound on outer iterations, unbounded when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<usize>,
}

impl Default for ReducerConfig {
    fn default() -> Self {
        Self {
            hoist: true,
            max_iterations: None,
        }
    }
}

/// Lint engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// Functions available in every file without a declaration
    pub builtins: Vec<String>,
    /// Rule IDs that are never run
    pub disabled_rules: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            builtins: ["print", "len", "assert"]
                .into_iter()
                .map(String::from)
                .collect(),
            disabled_rules: Vec::new(),
        }
    }
}

/// File discovery settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct FilesConfig {
    /// Extensions of script files, without the dot
    pub extensions: Vec<String>,
    /// Glob patterns of paths to skip
    pub exclude: Vec<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["wh".to_string()],
            exclude: Vec::new(),
        }
    }
}

impl WhittleConfig {
    /// Load configuration from a TOML or JSON file, chosen by extension
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| WhittleError::io_error(path, e))?;
        Self::parse(&content, path.extension().and_then(|e| e.to_str()))
    }

    /// Parse configuration text in the format named by `extension`
    pub fn parse(content: &str, extension: Option<&str>) -> Result<Self> {
        let config: Self = match extension {
            Some("toml") => toml::from_str(content)
                .map_err(|e| WhittleError::config_error(format!("invalid TOML: {e}")))?,
            Some("json") => serde_json::from_str(content)
                .map_err(|e| WhittleError::config_error(format!("invalid JSON: {e}")))?,
            _ => {
                return Err(WhittleError::config_error(
                    "unsupported file extension (expected .toml or .json)",
                ));
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.reducer.max_iterations == Some(0) {
            return Err(WhittleError::config_error(
                "reducer.maxIterations must be at least 1",
            ));
        }
        if let Some(unknown) = self
            .analyzer
            .disabled_rules
            .iter()
            .find(|id| crate::analysis::rules::rule(id).is_none())
        {
            return Err(WhittleError::config_error(format!(
                "unknown rule '{unknown}' in analyzer.disabledRules"
            )));
        }
        for pattern in &self.files.exclude {
            glob::Pattern::new(pattern).map_err(|e| {
                WhittleError::config_error(format!("invalid exclude pattern '{pattern}': {e}"))
            })?;
        }
        Ok(())
    }

    /// Render as TOML, the format written by `config init`
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| WhittleError::internal_error(format!("failed to serialize config: {e}")))
    }
}
