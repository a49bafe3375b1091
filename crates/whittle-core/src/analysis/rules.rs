//! Built-in lint rules
//!
//! - `correctness/undefined-function`: calls to names that resolve to nothing
//! - `correctness/argument-count`: calls with the wrong number of arguments
//! - `correctness/undefined-variable`: reads of variables before they are bound
//! - `suspicious/unreachable-code`: statements after a `return`
//!
//! Each finding targets one node and is positioned at that node's first token.

use super::finding::{Finding, Severity};
use crate::syntax::{Node, NodeKind, column_at};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Rule ID for calls to unknown functions
pub const UNDEFINED_FUNCTION: &str = "correctness/undefined-function";

/// Rule ID for calls with a mismatched argument count
pub const ARGUMENT_COUNT: &str = "correctness/argument-count";

/// Rule ID for reads of unbound variables
pub const UNDEFINED_VARIABLE: &str = "correctness/undefined-variable";

/// Rule ID for statements following a `return`
pub const UNREACHABLE_CODE: &str = "suspicious/unreachable-code";

/// Static description of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMetadata {
    pub id: &'static str,
    pub severity: Severity,
    pub description: &'static str,
}

pub const RULES: &[RuleMetadata] = &[
    RuleMetadata {
        id: UNDEFINED_FUNCTION,
        severity: Severity::Error,
        description: "Call to a function that is neither declared nor built in",
    },
    RuleMetadata {
        id: ARGUMENT_COUNT,
        severity: Severity::Error,
        description: "Call with a different number of arguments than the declaration",
    },
    RuleMetadata {
        id: UNDEFINED_VARIABLE,
        severity: Severity::Error,
        description: "Variable read before it is bound in its function scope",
    },
    RuleMetadata {
        id: UNREACHABLE_CODE,
        severity: Severity::Warning,
        description: "Statement that follows a return in the same list",
    },
];

/// Metadata of a built-in rule
pub fn rule(id: &str) -> Option<&'static RuleMetadata> {
    RULES.iter().find(|r| r.id == id)
}

/// Top-level function signatures, name to parameter count
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declarations {
    functions: HashMap<String, usize>,
}

impl Declarations {
    pub fn collect(stmts: &[Node]) -> Self {
        let mut declarations = Self::default();
        declarations.add_statements(stmts);
        declarations
    }

    /// Record the `fn` declarations among `stmts`; the first one of a name wins
    pub fn add_statements(&mut self, stmts: &[Node]) {
        for stmt in stmts {
            if stmt.kind() == NodeKind::FunctionDecl
                && let Some(name) = stmt.name()
            {
                self.functions
                    .entry(name.to_string())
                    .or_insert_with(|| stmt.list("params").len());
            }
        }
    }

    /// Add the functions of `other` that are not declared here
    pub fn merge(&mut self, other: &Declarations) {
        for (name, arity) in &other.functions {
            self.functions.entry(name.clone()).or_insert(*arity);
        }
    }

    pub fn arity(&self, name: &str) -> Option<usize> {
        self.functions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

/// Everything a rule can see about one file
pub struct RuleContext<'a> {
    pub file: &'a Path,
    pub source: &'a str,
    pub statements: &'a [Node],
    pub declarations: &'a Declarations,
    pub builtins: &'a [String],
}

impl RuleContext<'_> {
    fn finding(&self, rule_id: &'static str, message: String, node: &Node) -> Finding {
        let severity = rule(rule_id).map_or(Severity::Error, |r| r.severity);
        let span = node.span();
        Finding::new(rule_id, severity, message, self.file).at(
            span.start,
            span.line,
            column_at(self.source, span.start),
        )
    }

    fn is_builtin(&self, name: &str) -> bool {
        self.builtins.iter().any(|b| b == name)
    }
}

/// Run every rule not listed in `disabled`, ordered by position
pub fn run_rules(ctx: &RuleContext<'_>, disabled: &[String]) -> Vec<Finding> {
    let mut findings = check_scopes(ctx);
    findings.extend(check_unreachable(ctx));
    findings.retain(|f| !disabled.iter().any(|d| *d == f.rule_id));
    findings.sort_by(|a, b| a.offset.cmp(&b.offset).then_with(|| a.rule_id.cmp(&b.rule_id)));
    findings
}

/// Check calls and variable reads in one pass over every function scope
pub fn check_scopes(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let mut walker = ScopeWalker {
        ctx,
        scopes: vec![HashSet::new()],
        findings: Vec::new(),
    };
    for stmt in ctx.statements {
        walker.visit(stmt);
    }
    walker.findings
}

struct ScopeWalker<'a, 'c> {
    ctx: &'c RuleContext<'a>,
    /// Bound names, innermost function scope last
    scopes: Vec<HashSet<String>>,
    findings: Vec<Finding>,
}

impl ScopeWalker<'_, '_> {
    fn is_bound(&self, name: &str) -> bool {
        self.scopes.last().is_some_and(|scope| scope.contains(name))
    }

    fn bind(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string());
        }
    }

    fn function_body(&mut self, mut scope: HashSet<String>, params: &[Node], body: &[Node]) {
        scope.extend(params.iter().filter_map(Node::name).map(str::to_string));
        self.scopes.push(scope);
        for stmt in body {
            self.visit(stmt);
        }
        self.scopes.pop();
    }

    fn visit(&mut self, node: &Node) {
        match node.kind() {
            NodeKind::FunctionDecl => {
                self.function_body(HashSet::new(), node.list("params"), node.list("body"));
            }
            // Closures capture what is bound where they are written.
            NodeKind::Closure => {
                let captured = self.scopes.last().cloned().unwrap_or_default();
                self.function_body(captured, node.list("params"), node.list("body"));
            }
            NodeKind::Let => {
                if let Some(value) = node.child("value") {
                    self.visit(value);
                }
                if let Some(name) = node.name() {
                    self.bind(name);
                }
            }
            NodeKind::Assign => {
                if let Some(value) = node.child("value") {
                    self.visit(value);
                }
                match node.child("target") {
                    Some(target) if target.kind() == NodeKind::Variable => {
                        if let Some(name) = target.name() {
                            self.bind(name);
                        }
                    }
                    Some(target) => self.visit(target),
                    None => {}
                }
            }
            NodeKind::Variable => {
                let Some(name) = node.name() else { return };
                if !self.is_bound(name)
                    && !self.ctx.declarations.contains(name)
                    && !self.ctx.is_builtin(name)
                {
                    let finding = self.ctx.finding(
                        UNDEFINED_VARIABLE,
                        format!("variable '{name}' is used before it is bound"),
                        node,
                    );
                    self.findings.push(finding);
                }
            }
            NodeKind::Call => {
                self.check_call(node);
                for arg in node.list("args") {
                    self.visit(arg);
                }
            }
            _ => {
                for child in node.children() {
                    self.visit(child);
                }
            }
        }
    }

    fn check_call(&mut self, call: &Node) {
        let Some(name) = call.name() else { return };
        if self.ctx.is_builtin(name) || self.is_bound(name) {
            return;
        }
        let args = call.list("args").len();
        let finding = match self.ctx.declarations.arity(name) {
            None => self.ctx.finding(
                UNDEFINED_FUNCTION,
                format!("call to undefined function '{name}'"),
                call,
            ),
            Some(expected) if expected != args => self.ctx.finding(
                ARGUMENT_COUNT,
                format!("'{name}' expects {expected} argument(s), found {args}"),
                call,
            ),
            Some(_) => return,
        };
        self.findings.push(finding);
    }
}

/// Report the first statement after a `return` in every statement list
pub fn check_unreachable(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    unreachable_in(ctx, ctx.statements, &mut findings);
    findings
}

fn unreachable_in(ctx: &RuleContext<'_>, stmts: &[Node], findings: &mut Vec<Finding>) {
    report_after_return(ctx, stmts, findings);
    for stmt in stmts {
        stmt.visit_preorder(&mut |node| {
            for list in ["stmts", "body", "members"] {
                report_after_return(ctx, node.list(list), findings);
            }
        });
    }
}

fn report_after_return(ctx: &RuleContext<'_>, stmts: &[Node], findings: &mut Vec<Finding>) {
    if let Some(ret) = stmts.iter().position(|s| s.kind() == NodeKind::Return)
        && let Some(dead) = stmts.get(ret + 1)
    {
        findings.push(ctx.finding(
            UNREACHABLE_CODE,
            "statement is unreachable after return".to_string(),
            dead,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    fn lint(source: &str) -> Vec<(String, usize, usize)> {
        let stmts = parse(source).unwrap();
        let declarations = Declarations::collect(&stmts);
        let builtins = vec!["print".to_string(), "len".to_string()];
        let ctx = RuleContext {
            file: Path::new("test.wh"),
            source,
            statements: &stmts,
            declarations: &declarations,
            builtins: &builtins,
        };
        run_rules(&ctx, &[])
            .into_iter()
            .map(|f| (f.rule_id, f.line, f.column))
            .collect()
    }

    #[test]
    fn undefined_function_targets_the_call() {
        let findings = lint("fn f() {}\nf();\n  g(1);");
        assert_eq!(findings, vec![(UNDEFINED_FUNCTION.to_string(), 3, 3)]);
    }

    #[test]
    fn argument_count_mismatch() {
        let findings = lint("fn add(a, b) { return a + b; }\nprint(add(1));");
        assert_eq!(findings, vec![(ARGUMENT_COUNT.to_string(), 2, 7)]);
    }

    #[test]
    fn declarations_are_hoisted_within_a_file() {
        assert!(lint("f(); fn f() {}").is_empty());
    }

    #[test]
    fn variables_need_binding_first() {
        let findings = lint("print(x);\nlet x = 1;\nprint(x);");
        assert_eq!(findings, vec![(UNDEFINED_VARIABLE.to_string(), 1, 7)]);
    }

    #[test]
    fn let_value_is_checked_before_binding() {
        let findings = lint("let x = x;");
        assert_eq!(findings, vec![(UNDEFINED_VARIABLE.to_string(), 1, 9)]);
    }

    #[test]
    fn assignment_binds_and_blocks_do_not_scope() {
        assert!(lint("if (true) { y = 1; } print(y);").is_empty());
    }

    #[test]
    fn functions_start_fresh_but_closures_capture() {
        let findings = lint("let a = 1;\nfn f() { return a; }\nlet g = fn() { return a; };");
        assert_eq!(findings, vec![(UNDEFINED_VARIABLE.to_string(), 2, 17)]);
    }

    #[test]
    fn calling_a_bound_variable_is_not_checked() {
        assert!(lint("let h = fn(v) { return v; }; h(1, 2);").is_empty());
    }

    #[test]
    fn only_first_statement_after_return_is_reported() {
        let findings = lint("fn f() {\n    return 1;\n    print(2);\n    print(3);\n}");
        assert_eq!(findings, vec![(UNREACHABLE_CODE.to_string(), 3, 5)]);
    }

    #[test]
    fn disabled_rules_are_filtered() {
        let stmts = parse("g();").unwrap();
        let declarations = Declarations::collect(&stmts);
        let ctx = RuleContext {
            file: Path::new("a.wh"),
            source: "g();",
            statements: &stmts,
            declarations: &declarations,
            builtins: &[],
        };
        assert_eq!(run_rules(&ctx, &[]).len(), 1);
        assert!(run_rules(&ctx, &[UNDEFINED_FUNCTION.to_string()]).is_empty());
    }
}
