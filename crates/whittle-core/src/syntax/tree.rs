//! Trees of statements under a synthetic root

use super::node::{Field, Node, NodeId, NodeKind};
use super::path::{Path, Step};
use crate::{Result, WhittleError};

/// One logical unit of top-level statements
///
/// The root is a [`NodeKind::Root`] node whose `stmts` field holds the
/// statements, so paths always start with `stmts[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    root: Node,
}

impl Tree {
    pub fn new(stmts: Vec<Node>) -> Self {
        Self {
            root: Node::root(stmts),
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn statements(&self) -> &[Node] {
        self.root.list("stmts")
    }

    pub fn into_statements(self) -> Vec<Node> {
        match self.root.into_fields().into_iter().next() {
            Some(Field::List(stmts)) => stmts,
            _ => Vec::new(),
        }
    }

    /// Node addressed by `path`
    ///
    /// `Ok(None)` when a field on the way is empty or an index is out of
    /// range. A path that names an unknown field or breaks the field/index
    /// alternation is a structural error.
    pub fn resolve(&self, path: &Path) -> Result<Option<&Node>> {
        self.resolve_steps(path.steps())
    }

    pub fn resolve_steps(&self, steps: &[Step]) -> Result<Option<&Node>> {
        let mut node = &self.root;
        let mut depth = 0;
        while depth < steps.len() {
            let name = field_step(steps, depth)?;
            match node.field(name) {
                Some(Field::Single(Some(child))) => {
                    node = child.as_ref();
                    depth += 1;
                }
                Some(Field::Single(None)) => return Ok(None),
                Some(Field::List(items)) => {
                    let index = index_step(steps, depth + 1, name)?;
                    let Some(child) = items.get(index) else {
                        return Ok(None);
                    };
                    node = child;
                    depth += 2;
                }
                Some(Field::Leaf(_)) => {
                    return Err(WhittleError::structural(format!(
                        "leaf field '{name}' of {} cannot be stepped into",
                        node.kind()
                    )));
                }
                None => return Err(unknown_field(node.kind(), name)),
            }
        }
        Ok(Some(node))
    }

    pub fn resolve_mut(&mut self, path: &Path) -> Result<Option<&mut Node>> {
        self.resolve_steps_mut(path.steps())
    }

    pub fn resolve_steps_mut(&mut self, steps: &[Step]) -> Result<Option<&mut Node>> {
        let mut node = &mut self.root;
        let mut depth = 0;
        while depth < steps.len() {
            let name = field_step(steps, depth)?;
            let kind = node.kind();
            match node.field_mut(name) {
                Some(Field::Single(Some(child))) => {
                    node = child.as_mut();
                    depth += 1;
                }
                Some(Field::Single(None)) => return Ok(None),
                Some(Field::List(items)) => {
                    let index = index_step(steps, depth + 1, name)?;
                    let Some(child) = items.get_mut(index) else {
                        return Ok(None);
                    };
                    node = child;
                    depth += 2;
                }
                Some(Field::Leaf(_)) => {
                    return Err(WhittleError::structural(format!(
                        "leaf field '{name}' of {kind} cannot be stepped into"
                    )));
                }
                None => return Err(unknown_field(kind, name)),
            }
        }
        Ok(Some(node))
    }

    /// Identities of every node below the root, in recursive pre-order
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut ids = Vec::new();
        for stmt in self.statements() {
            stmt.visit_preorder(&mut |node| ids.push(node.id()));
        }
        ids
    }
}

fn field_step(steps: &[Step], depth: usize) -> Result<&'static str> {
    match steps[depth] {
        Step::Field(name) => Ok(name),
        Step::Index(index) => Err(WhittleError::structural(format!(
            "index {index} at depth {depth} does not follow a list field"
        ))),
    }
}

fn index_step(steps: &[Step], depth: usize, list: &str) -> Result<usize> {
    match steps.get(depth) {
        Some(Step::Index(index)) => Ok(*index),
        _ => Err(WhittleError::structural(format!(
            "list field '{list}' is not followed by an index"
        ))),
    }
}

pub(crate) fn unknown_field(kind: NodeKind, name: &str) -> WhittleError {
    WhittleError::structural(format!("{kind} has no field '{name}'"))
}
