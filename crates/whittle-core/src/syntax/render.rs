//! Deterministic printer from trees back to source text
//!
//! Output uses four-space indentation and one statement per line. Bodies of
//! `if`/`while` that are not blocks stay on the keyword's line. Rendering
//! fails when a node sits in a slot the grammar cannot express, which is how
//! edits that break the syntax get rejected.

use super::node::{Node, NodeKind};
use super::parser::precedence;
use super::tree::Tree;
use crate::{Result, WhittleError};

const INDENT: &str = "    ";

const ASSIGN_PRECEDENCE: u8 = 0;
const UNARY_PRECEDENCE: u8 = 7;
const PRIMARY_PRECEDENCE: u8 = 8;

/// Render a whole tree
pub fn render(tree: &Tree) -> Result<String> {
    render_statements(tree.statements())
}

/// Render a statement list at the top level
pub fn render_statements(stmts: &[Node]) -> Result<String> {
    let mut printer = Printer::default();
    printer.statements(stmts, 0)?;
    Ok(printer.out)
}

/// Render a single expression
pub fn render_expression(node: &Node) -> Result<String> {
    let mut printer = Printer::default();
    printer.expression(node, ASSIGN_PRECEDENCE, 0)?;
    Ok(printer.out)
}

#[derive(Default)]
struct Printer {
    out: String,
}

impl Printer {
    fn indent(&mut self, level: usize) {
        for _ in 0..level {
            self.out.push_str(INDENT);
        }
    }

    fn statements(&mut self, stmts: &[Node], level: usize) -> Result<()> {
        for stmt in stmts {
            self.indent(level);
            self.statement(stmt, level)?;
            self.out.push('\n');
        }
        Ok(())
    }

    fn block(&mut self, stmts: &[Node], level: usize) -> Result<()> {
        if stmts.is_empty() {
            self.out.push_str("{}");
            return Ok(());
        }
        self.out.push_str("{\n");
        self.statements(stmts, level + 1)?;
        self.indent(level);
        self.out.push('}');
        Ok(())
    }

    /// Body of `if`/`else`/`while`
    fn body(&mut self, node: &Node, level: usize) -> Result<()> {
        if node.kind() == NodeKind::Block {
            self.block(node.list("stmts"), level)
        } else {
            self.statement(node, level)
        }
    }

    fn statement(&mut self, node: &Node, level: usize) -> Result<()> {
        match node.kind() {
            NodeKind::FunctionDecl => {
                self.out.push_str("fn ");
                self.out.push_str(required_name(node)?);
                self.params(node.list("params"))?;
                self.out.push(' ');
                self.block(node.list("body"), level)
            }
            NodeKind::ClassDecl => {
                self.out.push_str("class ");
                self.out.push_str(required_name(node)?);
                self.out.push(' ');
                let members = node.list("members");
                if let Some(member) = members
                    .iter()
                    .find(|m| m.kind() != NodeKind::FunctionDecl)
                {
                    return Err(WhittleError::render_error(format!(
                        "{} cannot be a class member",
                        member.kind()
                    )));
                }
                self.block(members, level)
            }
            NodeKind::Block => self.block(node.list("stmts"), level),
            NodeKind::If => {
                self.out.push_str("if (");
                self.expression(child(node, "cond")?, ASSIGN_PRECEDENCE, level)?;
                self.out.push_str(") ");
                let then = child(node, "then")?;
                match node.child("else") {
                    Some(otherwise) => {
                        if captures_else(then) {
                            self.block(std::slice::from_ref(then), level)?;
                        } else {
                            self.body(then, level)?;
                        }
                        self.out.push_str(" else ");
                        self.body(otherwise, level)
                    }
                    None => self.body(then, level),
                }
            }
            NodeKind::While => {
                self.out.push_str("while (");
                self.expression(child(node, "cond")?, ASSIGN_PRECEDENCE, level)?;
                self.out.push_str(") ");
                self.body(child(node, "body")?, level)
            }
            NodeKind::Return => {
                self.out.push_str("return");
                if let Some(value) = node.child("value") {
                    self.out.push(' ');
                    self.expression(value, ASSIGN_PRECEDENCE, level)?;
                }
                self.out.push(';');
                Ok(())
            }
            NodeKind::Let => {
                self.out.push_str("let ");
                self.out.push_str(required_name(node)?);
                if let Some(value) = node.child("value") {
                    self.out.push_str(" = ");
                    self.expression(value, ASSIGN_PRECEDENCE, level)?;
                }
                self.out.push(';');
                Ok(())
            }
            NodeKind::ExprStmt => {
                self.expression(child(node, "expr")?, ASSIGN_PRECEDENCE, level)?;
                self.out.push(';');
                Ok(())
            }
            NodeKind::Nop => {
                self.out.push(';');
                Ok(())
            }
            kind if kind.is_expression() => {
                self.expression(node, ASSIGN_PRECEDENCE, level)?;
                self.out.push(';');
                Ok(())
            }
            kind => Err(WhittleError::render_error(format!(
                "{kind} cannot appear as a statement"
            ))),
        }
    }

    fn params(&mut self, params: &[Node]) -> Result<()> {
        self.out.push('(');
        for (i, param) in params.iter().enumerate() {
            if param.kind() != NodeKind::Param {
                return Err(WhittleError::render_error(format!(
                    "{} cannot appear in a parameter list",
                    param.kind()
                )));
            }
            if i > 0 {
                self.out.push_str(", ");
            }
            self.out.push_str(required_name(param)?);
        }
        self.out.push(')');
        Ok(())
    }

    fn expression(&mut self, node: &Node, min_precedence: u8, level: usize) -> Result<()> {
        let own = expression_precedence(node)?;
        let parenthesize = own < min_precedence;
        if parenthesize {
            self.out.push('(');
        }

        match node.kind() {
            NodeKind::Variable => self.out.push_str(node.leaf("name")),
            NodeKind::Literal => self.out.push_str(node.leaf("value")),
            NodeKind::Call => {
                let callee = child(node, "callee")?;
                if callee.kind() != NodeKind::Ident {
                    return Err(WhittleError::render_error(format!(
                        "{} cannot be called",
                        callee.kind()
                    )));
                }
                self.out.push_str(callee.leaf("name"));
                self.out.push('(');
                for (i, arg) in node.list("args").iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    let value = if arg.kind() == NodeKind::Arg {
                        child(arg, "value")?
                    } else {
                        arg
                    };
                    self.expression(value, ASSIGN_PRECEDENCE, level)?;
                }
                self.out.push(')');
            }
            NodeKind::Binary => {
                let op = node.leaf("op");
                self.expression(child(node, "lhs")?, own, level)?;
                self.out.push(' ');
                self.out.push_str(op);
                self.out.push(' ');
                self.expression(child(node, "rhs")?, own + 1, level)?;
            }
            NodeKind::Unary => {
                self.out.push_str(node.leaf("op"));
                self.expression(child(node, "operand")?, UNARY_PRECEDENCE, level)?;
            }
            NodeKind::Assign => {
                let target = child(node, "target")?;
                if target.kind() != NodeKind::Variable {
                    return Err(WhittleError::render_error(format!(
                        "{} cannot be assigned to",
                        target.kind()
                    )));
                }
                self.expression(target, PRIMARY_PRECEDENCE, level)?;
                self.out.push_str(" = ");
                self.expression(child(node, "value")?, ASSIGN_PRECEDENCE, level)?;
            }
            NodeKind::Closure => {
                self.out.push_str("fn");
                self.params(node.list("params"))?;
                self.out.push(' ');
                self.block(node.list("body"), level)?;
            }
            kind => {
                return Err(WhittleError::render_error(format!(
                    "{kind} cannot appear in an expression"
                )));
            }
        }

        if parenthesize {
            self.out.push(')');
        }
        Ok(())
    }
}

/// Whether an inline statement ends in an `if` that would take a following `else`
fn captures_else(node: &Node) -> bool {
    match node.kind() {
        NodeKind::If => node.child("else").is_none_or(captures_else),
        NodeKind::While => node.child("body").is_some_and(captures_else),
        _ => false,
    }
}

fn expression_precedence(node: &Node) -> Result<u8> {
    match node.kind() {
        NodeKind::Assign => Ok(ASSIGN_PRECEDENCE),
        NodeKind::Binary => precedence(node.leaf("op")).ok_or_else(|| {
            WhittleError::render_error(format!("unknown operator '{}'", node.leaf("op")))
        }),
        NodeKind::Unary => Ok(UNARY_PRECEDENCE),
        _ => Ok(PRIMARY_PRECEDENCE),
    }
}

fn child<'a>(node: &'a Node, field: &str) -> Result<&'a Node> {
    node.child(field).ok_or_else(|| {
        WhittleError::render_error(format!("{} is missing its '{field}'", node.kind()))
    })
}

fn required_name(node: &Node) -> Result<&str> {
    let ident = child(node, "name")?;
    if ident.kind() != NodeKind::Ident {
        return Err(WhittleError::render_error(format!(
            "{} cannot name a {}",
            ident.kind(),
            node.kind()
        )));
    }
    Ok(ident.leaf("name"))
}
