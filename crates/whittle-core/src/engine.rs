//! Analysis engine interface and the built-in lint engine
//!
//! The reducer talks to analysis only through [`Engine`]. [`LintEngine`] is
//! the implementation used by the CLI: files loaded from disk, a staging area
//! for working text that never touches disk, and an [`IssueBuffer`] recording
//! the findings emitted since it was last cleared.

use crate::analysis::{Declarations, Finding, IssueKey, RuleContext, run_rules};
use crate::config::{AnalyzerConfig, WhittleConfig};
use crate::discovery::discover_files;
use crate::syntax::{Node, NodeKind, parse};
use crate::result::ResultExt;
use crate::{Result, WhittleError};
use indexmap::IndexMap;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What the reducer needs from an analyzer
pub trait Engine {
    /// Re-check `file` against its current working text
    ///
    /// Every finding reported is also recorded as emitted.
    fn analyze(&mut self, file: &Path) -> Result<Vec<Finding>>;

    /// Current working text of `file`, staged or persisted
    fn working_text(&self, file: &Path) -> Result<&str>;

    /// Stage new working text for `file`
    fn set_working_text(&mut self, file: &Path, text: String);

    /// Fresh parse of the working text of `file`
    fn statements(&self, file: &Path) -> Result<Vec<Node>> {
        parse(self.working_text(file)?)
    }

    /// Whether a finding with `key` was emitted since the last clear
    fn was_emitted(&self, key: &IssueKey) -> bool;

    fn clear_emitted(&mut self);

    /// `files` plus every file they depend on, in load order
    fn referenced_files(&self, files: &[PathBuf]) -> Result<Vec<PathBuf>>;

    /// Name of `file` as it appears inside issue keys
    fn file_key(&self, file: &Path) -> String {
        file.display().to_string()
    }
}

/// Findings emitted since the last clear, deduplicated by key
#[derive(Debug, Default)]
pub struct IssueBuffer {
    findings: Vec<Finding>,
    emitted: HashSet<IssueKey>,
}

impl IssueBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `finding`, returning `false` when its key was already emitted
    pub fn add(&mut self, finding: Finding) -> bool {
        if self.emitted.insert(finding.key()) {
            self.findings.push(finding);
            true
        } else {
            false
        }
    }

    pub fn was_emitted(&self, key: &IssueKey) -> bool {
        self.emitted.contains(key)
    }

    pub fn clear(&mut self) {
        self.findings.clear();
        self.emitted.clear();
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Rule-based engine over a set of loaded script files
///
/// Loaded files see the top-level functions of every other loaded file.
/// Files that only exist in the staging area see nothing but themselves.
#[derive(Debug, Default)]
pub struct LintEngine {
    config: AnalyzerConfig,
    persisted: IndexMap<PathBuf, String>,
    staged: HashMap<PathBuf, String>,
    buffer: IssueBuffer,
}

impl LintEngine {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Discover and read every script file under `paths`
    pub fn load(paths: &[PathBuf], config: &WhittleConfig) -> Result<Self> {
        let mut engine = Self::new(config.analyzer.clone());
        for file in discover_files(paths, &config.files)? {
            let text = fs::read_to_string(&file).map_err(|e| WhittleError::io_error(&file, e))?;
            engine.add_file(file, text);
        }
        info!("Loaded {} files", engine.persisted.len());
        Ok(engine)
    }

    /// Add a file to the loaded project
    pub fn add_file(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.persisted.insert(path.into(), text.into());
    }

    /// Loaded files in load order
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.persisted.keys().map(PathBuf::as_path)
    }

    pub fn is_loaded(&self, file: &Path) -> bool {
        self.persisted.contains_key(file)
    }

    pub fn buffer(&self) -> &IssueBuffer {
        &self.buffer
    }

    /// Top-level functions of every loaded file, first declaration winning
    pub fn project_declarations(&self) -> Declarations {
        let mut declarations = Declarations::default();
        for file in self.persisted.keys() {
            if let Some(stmts) = self.statements(file).log_and_continue() {
                declarations.add_statements(&stmts);
            }
        }
        declarations
    }

    fn lint(&self, file: &Path, project: Option<&Declarations>) -> Result<Vec<Finding>> {
        let source = self.working_text(file)?;
        let stmts = parse(source)?;
        let mut declarations = Declarations::collect(&stmts);
        if let Some(project) = project {
            declarations.merge(project);
        }
        let ctx = RuleContext {
            file,
            source,
            statements: &stmts,
            declarations: &declarations,
            builtins: &self.config.builtins,
        };
        Ok(run_rules(&ctx, &self.config.disabled_rules))
    }

    /// Analyze every loaded file in parallel
    ///
    /// Files that fail to parse are reported in the error list rather than
    /// aborting the run.
    pub fn check_all(&mut self) -> (Vec<Finding>, Vec<WhittleError>) {
        let project = self.project_declarations();
        let files: Vec<&PathBuf> = self.persisted.keys().collect();
        let results: Vec<Result<Vec<Finding>>> = files
            .par_iter()
            .map(|file| self.lint(file, Some(&project)))
            .collect();

        let mut findings = Vec::new();
        let mut errors = Vec::new();
        for result in results {
            match result {
                Ok(file_findings) => findings.extend(file_findings),
                Err(e) => errors.push(e),
            }
        }
        for finding in &findings {
            self.buffer.add(finding.clone());
        }
        info!(
            "Checked {} files: {} findings, {} errors",
            files.len(),
            findings.len(),
            errors.len()
        );
        (findings, errors)
    }
}

impl Engine for LintEngine {
    fn analyze(&mut self, file: &Path) -> Result<Vec<Finding>> {
        let findings = if self.is_loaded(file) {
            let project = self.project_declarations();
            self.lint(file, Some(&project))?
        } else {
            self.lint(file, None)?
        };
        for finding in &findings {
            self.buffer.add(finding.clone());
        }
        debug!("Analyzed {}: {} findings", file.display(), findings.len());
        Ok(findings)
    }

    fn working_text(&self, file: &Path) -> Result<&str> {
        self.staged
            .get(file)
            .or_else(|| self.persisted.get(file))
            .map(String::as_str)
            .ok_or_else(|| WhittleError::UnknownFile {
                path: file.to_path_buf(),
            })
    }

    fn set_working_text(&mut self, file: &Path, text: String) {
        self.staged.insert(file.to_path_buf(), text);
    }

    fn was_emitted(&self, key: &IssueKey) -> bool {
        self.buffer.was_emitted(key)
    }

    fn clear_emitted(&mut self) {
        self.buffer.clear();
    }

    fn referenced_files(&self, files: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut declared_in: HashMap<String, &PathBuf> = HashMap::new();
        for file in self.persisted.keys() {
            if let Ok(stmts) = self.statements(file) {
                for stmt in &stmts {
                    if stmt.kind() == NodeKind::FunctionDecl
                        && let Some(name) = stmt.name()
                    {
                        declared_in.entry(name.to_string()).or_insert(file);
                    }
                }
            }
        }

        let mut selected: HashSet<PathBuf> = files.iter().cloned().collect();
        let mut queue: VecDeque<PathBuf> = files.iter().cloned().collect();
        while let Some(file) = queue.pop_front() {
            let stmts = self.statements(&file)?;
            let own = Declarations::collect(&stmts);
            for name in called_names(&stmts) {
                if own.contains(&name) || self.config.builtins.contains(&name) {
                    continue;
                }
                if let Some(declaring) = declared_in.get(&name)
                    && selected.insert((*declaring).clone())
                {
                    debug!("{} needs {} for '{name}'", file.display(), declaring.display());
                    queue.push_back((*declaring).clone());
                }
            }
        }

        // Requested files outside the project first, then load order.
        let mut ordered: Vec<PathBuf> = files
            .iter()
            .filter(|f| !self.is_loaded(f))
            .cloned()
            .collect();
        ordered.extend(
            self.persisted
                .keys()
                .filter(|f| selected.contains(*f))
                .cloned(),
        );
        Ok(ordered)
    }
}

fn called_names(stmts: &[Node]) -> Vec<String> {
    let mut names = Vec::new();
    for stmt in stmts {
        stmt.visit_preorder(&mut |node| {
            if node.kind() == NodeKind::Call
                && let Some(name) = node.name()
            {
                names.push(name.to_string());
            }
        });
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::rules::{ARGUMENT_COUNT, UNDEFINED_FUNCTION};

    fn engine(files: &[(&str, &str)]) -> LintEngine {
        let mut engine = LintEngine::new(AnalyzerConfig::default());
        for (path, text) in files {
            engine.add_file(*path, *text);
        }
        engine
    }

    #[test]
    fn loaded_files_share_declarations() {
        let mut engine = engine(&[("lib.wh", "fn helper(a) {}"), ("main.wh", "helper(1, 2);")]);
        let findings = engine.analyze(Path::new("main.wh")).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, ARGUMENT_COUNT);
        assert!(engine.was_emitted(&findings[0].key()));
    }

    #[test]
    fn staged_only_files_see_themselves() {
        let mut engine = engine(&[("lib.wh", "fn helper(a) {}")]);
        let out = Path::new("out.wh");
        engine.set_working_text(out, "helper(1);".to_string());
        let findings = engine.analyze(out).unwrap();
        assert_eq!(findings[0].rule_id, UNDEFINED_FUNCTION);
    }

    #[test]
    fn staging_shadows_persisted_text() {
        let mut engine = engine(&[("a.wh", "g();")]);
        engine.set_working_text(Path::new("a.wh"), "print(1);".to_string());
        assert_eq!(engine.working_text(Path::new("a.wh")).unwrap(), "print(1);");
        assert!(engine.analyze(Path::new("a.wh")).unwrap().is_empty());
    }

    #[test]
    fn unknown_files_are_errors() {
        let engine = engine(&[]);
        let err = engine.working_text(Path::new("missing.wh")).unwrap_err();
        assert!(matches!(err, WhittleError::UnknownFile { .. }));
    }

    #[test]
    fn clear_forgets_emitted_keys() {
        let mut engine = engine(&[("a.wh", "g();")]);
        let key = engine.analyze(Path::new("a.wh")).unwrap()[0].key();
        engine.clear_emitted();
        assert!(!engine.was_emitted(&key));
        assert!(engine.buffer().is_empty());
    }

    #[test]
    fn referenced_files_follow_calls_transitively() {
        let engine = engine(&[
            ("a.wh", "fn a() { b(); }"),
            ("b.wh", "fn b() { c(); }"),
            ("c.wh", "fn c() {}"),
            ("unrelated.wh", "fn d() {}"),
            ("main.wh", "a();"),
        ]);
        let files = engine
            .referenced_files(&[PathBuf::from("main.wh")])
            .unwrap();
        assert_eq!(
            files,
            ["a.wh", "b.wh", "c.wh", "main.wh"].map(PathBuf::from)
        );
    }

    #[test]
    fn check_all_collects_parse_errors() {
        let mut engine = engine(&[("good.wh", "g();"), ("bad.wh", "fn (")]);
        let (findings, errors) = engine.check_all();
        assert_eq!(findings.len(), 1);
        assert_eq!(errors.len(), 1);
        assert_eq!(engine.buffer().len(), 1);
    }
}
