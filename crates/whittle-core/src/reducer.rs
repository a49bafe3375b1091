//! Issue-preserving reduction
//!
//! A [`Reducer`] merges the files a set of findings depends on into one
//! staged file, then shrinks it while every tracked finding keeps
//! reproducing. It alternates two passes until the text stops changing:
//!
//! - removal: delete every node that is not a finding's target, one of its
//!   ancestors or inside it
//! - hoist: replace nodes by one of their children
//!
//! Each edit is rendered, re-analyzed and verified as one transaction. A
//! rejected edit restores the previous text and every cursor.

use crate::analysis::{Finding, IssueKey};
use crate::config::ReducerConfig;
use crate::cursor::{Cursor, Deletion, IndexShift};
use crate::engine::Engine;
use crate::syntax::{NodeId, Path as NodePath, Tree, column_at, render, render_statements};
use crate::result::ResultExt;
use crate::{ErrorKind, Result, WhittleError};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReduceOptions {
    /// Run the hoist pass after each removal pass
    pub hoist: bool,
    /// Stop after this many iterations even if the text still changes
    pub max_iterations: Option<usize>,
}

impl Default for ReduceOptions {
    fn default() -> Self {
        Self {
            hoist: true,
            max_iterations: None,
        }
    }
}

impl From<&ReducerConfig> for ReduceOptions {
    fn from(config: &ReducerConfig) -> Self {
        Self {
            hoist: config.hoist,
            max_iterations: config.max_iterations,
        }
    }
}

/// Counters collected over one reduction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReduceStats {
    pub iterations: usize,
    /// Edits tried, whatever their outcome
    pub attempts: usize,
    pub committed: usize,
    /// Committed edits made by the removal pass
    pub removals: usize,
    /// Committed edits made by the hoist pass
    pub hoists: usize,
    pub render_failures: usize,
    /// Edits that rendered to the unchanged text
    pub no_ops: usize,
    pub verification_failures: usize,
    pub initial_bytes: usize,
    pub final_bytes: usize,
}

/// Final text of a reduction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reduction {
    pub text: String,
    pub stats: ReduceStats,
}

/// A tracked finding and the cursor pinned to its target
#[derive(Debug, Clone)]
struct Pointer {
    cursor: Cursor,
    finding: Finding,
}

/// How tracked pointers are found again after an edit
enum Verify {
    /// Bind the recorded path
    Strict,
    /// Locate each pre-edit target by identity, falling back to the path
    Lenient(Vec<Option<NodeId>>),
}

/// State to restore when an edit is rejected
enum Undo {
    Removal {
        roving: Cursor,
        shift: Option<(IndexShift, Vec<usize>)>,
    },
    Hoist {
        roving: Cursor,
        paths: Vec<NodePath>,
    },
}

impl Undo {
    fn path(&self) -> &NodePath {
        match self {
            Undo::Removal { roving, .. } | Undo::Hoist { roving, .. } => roving.path(),
        }
    }
}

pub struct Reducer<'e, E: Engine + ?Sized> {
    engine: &'e mut E,
    /// Staged file holding the working text
    target: PathBuf,
    file_key: String,
    /// Always the parse of the current working text
    tree: Tree,
    roving: Cursor,
    pointers: Vec<Pointer>,
    options: ReduceOptions,
    stats: ReduceStats,
}

impl<'e, E: Engine + ?Sized> Reducer<'e, E> {
    /// Merge the files `findings` depend on into `target` and pin each finding
    ///
    /// Fails with [`WhittleError::FindingNotLocated`] when a finding's offset
    /// does not start any node of its file.
    pub fn new(
        engine: &'e mut E,
        target: impl Into<PathBuf>,
        findings: Vec<Finding>,
        options: ReduceOptions,
    ) -> Result<Self> {
        let target = target.into();
        let mut by_file: IndexMap<PathBuf, Vec<Finding>> = IndexMap::new();
        for finding in findings {
            by_file.entry(finding.file.clone()).or_default().push(finding);
        }
        let requested: Vec<PathBuf> = by_file.keys().cloned().collect();
        let files = engine.referenced_files(&requested)?;
        debug!("Merging {} files for {} finding files", files.len(), requested.len());

        let mut stmts = Vec::new();
        let mut pointers = Vec::new();
        for file in &files {
            let unit = Tree::new(engine.statements(file)?);
            for finding in by_file.shift_remove(file).unwrap_or_default() {
                let mut cursor = Cursor::new();
                let offset = finding.offset;
                let found = cursor.find_by(&unit, |node| {
                    node.span().start == offset && !node.kind().is_wrapper()
                })?;
                if !found {
                    return Err(not_located(&finding));
                }
                cursor.offset_statement(stmts.len());
                pointers.push(Pointer { cursor, finding });
            }
            stmts.extend(unit.into_statements());
        }
        if let Some(finding) = by_file.values().flatten().next() {
            return Err(not_located(finding));
        }

        let text = render_statements(&stmts)?;
        let stats = ReduceStats {
            initial_bytes: text.len(),
            ..ReduceStats::default()
        };
        engine.set_working_text(&target, text);
        let tree = Tree::new(engine.statements(&target)?);
        for pointer in &mut pointers {
            if !pointer.cursor.bind(&tree)? {
                return Err(not_located(&pointer.finding));
            }
        }

        let file_key = engine.file_key(&target);
        let mut reducer = Self {
            engine,
            target,
            file_key,
            tree,
            roving: Cursor::new(),
            pointers,
            options,
            stats,
        };
        reducer.check_reproduction()?;
        Ok(reducer)
    }

    fn check_reproduction(&mut self) -> Result<()> {
        self.engine.clear_emitted();
        self.engine.analyze(&self.target)?;
        let text = self.working_text()?;
        for pointer in &self.pointers {
            let key = key_of(&pointer.cursor, &pointer.finding, &self.tree, &text, &self.file_key)?;
            if !key.is_some_and(|key| self.engine.was_emitted(&key)) {
                warn!(
                    "Finding '{}' does not reproduce in the merged input; no edit will be kept",
                    pointer.finding
                );
            }
        }
        Ok(())
    }

    pub fn working_text(&self) -> Result<String> {
        Ok(self.engine.working_text(&self.target)?.to_string())
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Tracked findings and the paths of their targets
    pub fn tracked(&self) -> impl Iterator<Item = (&Finding, &NodePath)> {
        self.pointers
            .iter()
            .map(|pointer| (&pointer.finding, pointer.cursor.path()))
    }

    pub fn stats(&self) -> &ReduceStats {
        &self.stats
    }

    /// Run passes until the working text reaches a fixpoint
    pub fn reduce(mut self) -> Result<Reduction> {
        let mut iteration = 0;
        loop {
            let before = self.working_text()?;
            iteration += 1;
            self.stats.iterations = iteration;

            self.removal_pass()?;
            if self.options.hoist {
                self.hoist_pass()?;
            }

            let after = self.working_text()?;
            info!(
                iteration,
                bytes = after.len(),
                committed = self.stats.committed,
                "Reduction iteration finished"
            );
            if after == before {
                break;
            }
            if self
                .options
                .max_iterations
                .is_some_and(|max| iteration >= max)
            {
                info!("Stopping after {iteration} iterations");
                break;
            }
        }

        let text = self.working_text()?;
        self.stats.final_bytes = text.len();
        Ok(Reduction {
            text,
            stats: self.stats,
        })
    }

    /// Whether the roving node is a target, an ancestor of one or inside one
    fn is_protected(&self) -> bool {
        self.pointers
            .iter()
            .any(|pointer| pointer.cursor.path().shares_prefix(self.roving.path()))
    }

    fn removal_pass(&mut self) -> Result<()> {
        self.roving.reset(&self.tree);
        while !self.roving.is_exhausted() {
            if self.is_protected() {
                trace!(path = %self.roving.path(), "protected");
            } else {
                let saved = self.roving.clone();
                match self.roving.delete_current(&mut self.tree)? {
                    Deletion::Skipped => {}
                    Deletion::Spliced(shift) => {
                        let shifted = self
                            .pointers
                            .iter_mut()
                            .enumerate()
                            .filter_map(|(i, pointer)| shift.apply(&mut pointer.cursor).then_some(i))
                            .collect();
                        let undo = Undo::Removal {
                            roving: saved,
                            shift: Some((shift, shifted)),
                        };
                        if self.transact(Verify::Strict, undo)? {
                            self.stats.removals += 1;
                        }
                    }
                    Deletion::Nulled | Deletion::ReplacedWithNop => {
                        let undo = Undo::Removal {
                            roving: saved,
                            shift: None,
                        };
                        if self.transact(Verify::Strict, undo)? {
                            self.stats.removals += 1;
                        }
                    }
                }
            }
            self.roving.step_forward(&self.tree)?;
        }
        Ok(())
    }

    fn hoist_pass(&mut self) -> Result<()> {
        self.roving.reset(&self.tree);
        while !self.roving.is_exhausted() {
            let saved = self.roving.clone();
            let paths = self.pointers.iter().map(|p| p.cursor.save_path()).collect();
            let targets = self.pointers.iter().map(|p| p.cursor.current()).collect();
            if self.roving.hoist_current(&mut self.tree)? {
                let undo = Undo::Hoist {
                    roving: saved,
                    paths,
                };
                if self.transact(Verify::Lenient(targets), undo)? {
                    self.stats.hoists += 1;
                }
            }
            self.roving.step_forward(&self.tree)?;
        }
        Ok(())
    }

    /// Keep the edit already applied to the tree, or undo it
    ///
    /// Returns whether the edit was committed.
    fn transact(&mut self, verify: Verify, undo: Undo) -> Result<bool> {
        self.stats.attempts += 1;
        let old_text = self.working_text()?;
        let new_text = match render(&self.tree) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::Render => {
                debug!("Rolled back edit at {}: {e}", undo.path());
                self.stats.render_failures += 1;
                self.rollback(undo)?;
                return Ok(false);
            }
            Err(e) => return Err(e),
        };
        if new_text == old_text {
            trace!(path = %undo.path(), "edit leaves the text unchanged");
            self.stats.no_ops += 1;
            self.rollback(undo)?;
            return Ok(false);
        }

        self.engine.set_working_text(&self.target, new_text.clone());
        self.engine.clear_emitted();
        match self.verify(&verify, &new_text)? {
            Some(reparsed) => {
                self.tree = reparsed;
                self.stats.committed += 1;
                debug!(
                    "Committed edit at {} ({} -> {} bytes)",
                    undo.path(),
                    old_text.len(),
                    new_text.len()
                );
                Ok(true)
            }
            None => {
                self.stats.verification_failures += 1;
                self.engine.set_working_text(&self.target, old_text);
                self.rollback(undo)?;
                Ok(false)
            }
        }
    }

    /// Re-analyze the staged text and find every target again
    ///
    /// On success the pointers and the roving cursor are moved onto the
    /// returned tree. On failure nothing is changed.
    fn verify(&mut self, verify: &Verify, text: &str) -> Result<Option<Tree>> {
        let analyzed = self
            .engine
            .analyze(&self.target)
            .and_then(|_| self.engine.statements(&self.target));
        let Some(stmts) = analyzed.recoverable()? else {
            return Ok(None);
        };
        let reparsed = Tree::new(stmts);

        let mut roving = self.roving.clone();
        if !tolerant(roving.rebase(&reparsed))? {
            debug!("Roving cursor does not fit the edited tree at {}", roving.path());
            return Ok(None);
        }

        let mut claimed: HashSet<IssueKey> = HashSet::new();
        let mut cursors = Vec::with_capacity(self.pointers.len());
        for (i, pointer) in self.pointers.iter().enumerate() {
            let cursor = match verify {
                Verify::Strict => {
                    let mut cursor = pointer.cursor.clone();
                    tolerant(cursor.bind(&reparsed))?.then_some(cursor)
                }
                Verify::Lenient(targets) => {
                    self.relocate(pointer, targets.get(i).copied().flatten(), &reparsed)?
                }
            };
            let Some(cursor) = cursor else {
                debug!("Target of '{}' is gone", pointer.finding.rule_id);
                return Ok(None);
            };
            match key_of(&cursor, &pointer.finding, &reparsed, text, &self.file_key)? {
                Some(key) if self.engine.was_emitted(&key) && claimed.insert(key.clone()) => {
                    cursors.push(cursor);
                }
                key => {
                    debug!("Finding no longer reproduces: {key:?}");
                    return Ok(None);
                }
            }
        }

        for (pointer, cursor) in self.pointers.iter_mut().zip(cursors) {
            pointer.cursor = cursor;
        }
        self.roving = roving;
        Ok(Some(reparsed))
    }

    /// Cursor on `reparsed` for a pointer whose target may have moved
    fn relocate(
        &self,
        pointer: &Pointer,
        target: Option<NodeId>,
        reparsed: &Tree,
    ) -> Result<Option<Cursor>> {
        let mut candidates = Vec::with_capacity(2);
        if let Some(id) = target {
            let mut finder = Cursor::new();
            if finder.find(&self.tree, id)? {
                candidates.push(finder.save_path());
            }
        }
        candidates.push(pointer.cursor.save_path());

        for path in candidates {
            let mut cursor = Cursor::new();
            cursor.restore_path(path);
            if tolerant(cursor.bind(reparsed))? {
                return Ok(Some(cursor));
            }
        }
        Ok(None)
    }

    /// Restore cursors from `undo` and re-parse the working text
    fn rollback(&mut self, undo: Undo) -> Result<()> {
        match undo {
            Undo::Removal { roving, shift } => {
                self.roving = roving;
                if let Some((shift, shifted)) = shift {
                    for i in shifted {
                        if let Some(pointer) = self.pointers.get_mut(i) {
                            shift.revert(&mut pointer.cursor);
                        }
                    }
                }
            }
            Undo::Hoist { roving, paths } => {
                self.roving = roving;
                for (pointer, path) in self.pointers.iter_mut().zip(paths) {
                    pointer.cursor.restore_path(path);
                }
            }
        }

        self.tree = Tree::new(self.engine.statements(&self.target)?);
        if !self.roving.bind(&self.tree)? {
            return Err(WhittleError::internal_error(format!(
                "roving cursor at {} does not fit the restored tree",
                self.roving.path()
            )));
        }
        for pointer in &mut self.pointers {
            if !pointer.cursor.bind(&self.tree)? {
                return Err(WhittleError::internal_error(format!(
                    "target of '{}' at {} does not fit the restored tree",
                    pointer.finding.rule_id,
                    pointer.cursor.path()
                )));
            }
        }
        Ok(())
    }
}

/// Reduce `findings` into `target` in one call
pub fn reduce<E: Engine + ?Sized>(
    engine: &mut E,
    target: impl Into<PathBuf>,
    findings: Vec<Finding>,
    options: ReduceOptions,
) -> Result<Reduction> {
    Reducer::new(engine, target, findings, options)?.reduce()
}

/// Key the finding would have at the cursor's node in `text`
fn key_of(
    cursor: &Cursor,
    finding: &Finding,
    tree: &Tree,
    text: &str,
    file_key: &str,
) -> Result<Option<IssueKey>> {
    let Some(node) = cursor.node(tree)? else {
        return Ok(None);
    };
    let span = node.span();
    Ok(Some(finding.key_at(
        file_key,
        span.line,
        column_at(text, span.start),
    )))
}

/// Paths that no longer fit an edited tree count as not found
fn tolerant(bound: Result<bool>) -> Result<bool> {
    match bound {
        Err(e) if e.kind() == ErrorKind::Structural => {
            trace!("path does not fit: {e}");
            Ok(false)
        }
        other => other,
    }
}

fn not_located(finding: &Finding) -> WhittleError {
    WhittleError::FindingNotLocated {
        rule_id: finding.rule_id.clone(),
        file: finding.file.clone(),
        offset: finding.offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::rules::{UNDEFINED_FUNCTION, UNDEFINED_VARIABLE, UNREACHABLE_CODE};
    use crate::config::AnalyzerConfig;
    use crate::engine::LintEngine;
    use crate::syntax::Node;
    use std::path::Path;

    const INPUT: &str = "input.wh";
    const OUT: &str = "out.wh";

    /// Lint engine that counts analyses
    struct Counting {
        inner: LintEngine,
        analyses: usize,
    }

    impl Engine for Counting {
        fn analyze(&mut self, file: &Path) -> Result<Vec<Finding>> {
            self.analyses += 1;
            self.inner.analyze(file)
        }
        fn working_text(&self, file: &Path) -> Result<&str> {
            self.inner.working_text(file)
        }
        fn set_working_text(&mut self, file: &Path, text: String) {
            self.inner.set_working_text(file, text);
        }
        fn was_emitted(&self, key: &IssueKey) -> bool {
            self.inner.was_emitted(key)
        }
        fn clear_emitted(&mut self) {
            self.inner.clear_emitted();
        }
        fn referenced_files(&self, files: &[PathBuf]) -> Result<Vec<PathBuf>> {
            self.inner.referenced_files(files)
        }
    }

    fn project(source: &str) -> LintEngine {
        let mut engine = LintEngine::new(AnalyzerConfig::default());
        engine.add_file(INPUT, source);
        engine
    }

    /// Finding of `rule` whose target starts at the first `needle`
    fn finding(engine: &mut LintEngine, rule: &str, needle: &str) -> Finding {
        let source = engine.working_text(Path::new(INPUT)).unwrap().to_string();
        let offset = source.find(needle).unwrap();
        engine
            .analyze(Path::new(INPUT))
            .unwrap()
            .into_iter()
            .find(|f| f.rule_id == rule && f.offset == offset)
            .unwrap()
    }

    fn no_hoist() -> ReduceOptions {
        ReduceOptions {
            hoist: false,
            max_iterations: None,
        }
    }

    #[test]
    fn removal_keeps_the_statement_with_the_target() {
        let mut engine = project("if (x) { f(); g(); }");
        let g = finding(&mut engine, UNDEFINED_FUNCTION, "g()");

        let reduction = reduce(&mut engine, OUT, vec![g], no_hoist()).unwrap();
        assert_eq!(reduction.text, "if (x) {\n    g();\n}\n");
        assert_eq!(reduction.stats.removals, 1);
    }

    #[test]
    fn hoisting_flattens_around_the_target() {
        let mut engine = project("if (x) { f(); g(); }");
        let g = finding(&mut engine, UNDEFINED_FUNCTION, "g()");

        let reduction = reduce(&mut engine, OUT, vec![g], ReduceOptions::default()).unwrap();
        assert_eq!(reduction.text, "g();\n");
        assert!(reduction.stats.hoists >= 1);
    }

    #[test]
    fn nested_expression_statement_collapses() {
        let mut engine = project("{ (x); }");
        let x = finding(&mut engine, UNDEFINED_VARIABLE, "x");

        let reduction = reduce(&mut engine, OUT, vec![x], ReduceOptions::default()).unwrap();
        assert_eq!(reduction.text, "x;\n");
    }

    #[test]
    fn render_failure_restores_text_without_analysis() {
        let mut inner = project("while (y) g();");
        let g = finding(&mut inner, UNDEFINED_FUNCTION, "g()");
        let mut engine = Counting { inner, analyses: 0 };
        let mut reducer = Reducer::new(&mut engine, OUT, vec![g], no_hoist()).unwrap();

        let before = reducer.working_text().unwrap();
        let analyses = reducer.engine.analyses;
        let cond = reducer.tree.statements()[0].child("cond").unwrap().id();
        assert!(reducer.roving.find(&reducer.tree, cond).unwrap());
        let saved = reducer.roving.clone();
        assert_eq!(
            reducer.roving.delete_current(&mut reducer.tree).unwrap(),
            Deletion::ReplacedWithNop
        );

        let undo = Undo::Removal {
            roving: saved,
            shift: None,
        };
        assert!(!reducer.transact(Verify::Strict, undo).unwrap());
        assert_eq!(reducer.working_text().unwrap(), before);
        assert_eq!(reducer.engine.analyses, analyses);
        assert_eq!(reducer.stats.render_failures, 1);
        assert_eq!(render(&reducer.tree).unwrap(), before);
        assert_eq!(reducer.roving.path().to_string(), "stmts[0].cond");
    }

    #[test]
    fn edits_that_lose_the_finding_are_rolled_back() {
        let mut engine = project("fn f() { return 1; print(2); }");
        let dead = finding(&mut engine, UNREACHABLE_CODE, "print(2)");

        let reduction = reduce(&mut engine, OUT, vec![dead], no_hoist()).unwrap();
        assert_eq!(reduction.text, "fn f() {\n    return;\n    print(2);\n}\n");
        assert!(reduction.stats.verification_failures >= 1);
    }

    #[test]
    fn splices_shift_later_targets() {
        let mut engine = project("a(); b(); c();");
        let a = finding(&mut engine, UNDEFINED_FUNCTION, "a()");
        let c = finding(&mut engine, UNDEFINED_FUNCTION, "c()");

        let reduction = reduce(&mut engine, OUT, vec![a, c], no_hoist()).unwrap();
        assert_eq!(reduction.text, "a();\nc();\n");
    }

    #[test]
    fn pointers_follow_committed_edits() {
        let mut engine = project("a(); b(); c();");
        let c = finding(&mut engine, UNDEFINED_FUNCTION, "c()");
        let mut reducer = Reducer::new(&mut engine, OUT, vec![c], no_hoist()).unwrap();
        assert_eq!(
            reducer.tracked().next().unwrap().1.to_string(),
            "stmts[2].expr"
        );

        reducer.removal_pass().unwrap();
        let (_, path) = reducer.tracked().next().unwrap();
        assert_eq!(path.to_string(), "stmts[0].expr");
        let target = reducer.pointers[0].cursor.node(&reducer.tree).unwrap().unwrap();
        assert_eq!(target.name(), Some("c"));
    }

    #[test]
    fn inline_branches_bind_after_merging() {
        let source = "if (x) f(); else if (y) g(); else h();";
        let mut engine = project(source);
        let f = finding(&mut engine, UNDEFINED_FUNCTION, "f()");
        let reduction = reduce(&mut engine, OUT, vec![f], no_hoist()).unwrap();
        assert_eq!(reduction.text, "if (x) f();\n");

        let mut engine = project(source);
        let g = finding(&mut engine, UNDEFINED_FUNCTION, "g()");
        let reducer = Reducer::new(&mut engine, OUT, vec![g], no_hoist()).unwrap();
        assert_eq!(reducer.working_text().unwrap(), format!("{source}\n"));
        assert_eq!(
            reducer.tracked().next().unwrap().1.to_string(),
            "stmts[0].else.then.expr"
        );
    }

    #[test]
    fn hoisted_operand_takes_over_a_replaced_target() {
        let mut engine = project("x + 1;");
        let x = finding(&mut engine, UNDEFINED_VARIABLE, "x");
        let mut reducer = Reducer::new(&mut engine, OUT, vec![x], no_hoist()).unwrap();
        let pinned = reducer.pointers[0].cursor.node(&reducer.tree).unwrap().unwrap();
        assert_eq!(pinned.kind(), crate::syntax::NodeKind::Binary);

        reducer.hoist_pass().unwrap();
        assert_eq!(reducer.working_text().unwrap(), "x;\n");
        assert_eq!(reducer.stats.hoists, 1);
        let (_, path) = reducer.tracked().next().unwrap();
        assert_eq!(path.to_string(), "stmts[0].expr");
        let target = reducer.pointers[0].cursor.node(&reducer.tree).unwrap().unwrap();
        assert_eq!(target.kind(), crate::syntax::NodeKind::Variable);
    }

    #[test]
    fn wrappers_are_skipped_when_pinning() {
        let mut engine = project("print(x);");
        let x = finding(&mut engine, UNDEFINED_VARIABLE, "x");
        let reducer = Reducer::new(&mut engine, OUT, vec![x], no_hoist()).unwrap();
        let pointer = &reducer.pointers[0];
        let node: &Node = pointer.cursor.node(&reducer.tree).unwrap().unwrap();
        assert_eq!(node.kind(), crate::syntax::NodeKind::Variable);
        assert_eq!(pointer.cursor.path().to_string(), "stmts[0].expr.args[0].value");
    }

    #[test]
    fn unmatched_offsets_fail_construction() {
        let mut engine = project("g();");
        let mut bogus = finding(&mut engine, UNDEFINED_FUNCTION, "g()");
        bogus.offset = 2;
        let err = Reducer::new(&mut engine, OUT, vec![bogus], no_hoist())
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::Construction);
    }

    #[test]
    fn iteration_bound_is_honoured() {
        let mut engine = project("fn f() { return 1; print(2); }\nlet y = 3;\nq();");
        let q = finding(&mut engine, UNDEFINED_FUNCTION, "q()");
        let options = ReduceOptions {
            hoist: true,
            max_iterations: Some(1),
        };
        let reduction = reduce(&mut engine, OUT, vec![q], options).unwrap();
        assert_eq!(reduction.stats.iterations, 1);
        assert_eq!(reduction.text, "q();\n");
    }
}
