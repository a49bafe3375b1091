//! Path-addressed pre-order cursor over a [`Tree`]
//!
//! A [`Cursor`] never borrows the tree it walks. It stores the path from the
//! root to the current node, the ancestors along that path and a few flags;
//! every operation takes the tree it acts on. This is what lets the same
//! position be re-applied to a freshly parsed tree with [`Cursor::bind`].
//!
//! The walk is pre-order and visits fields in the order of the shape table.
//! Two mutations are supported: [`Cursor::delete_current`] and
//! [`Cursor::hoist_current`].

use crate::syntax::{
    Field, Node, NodeId, NodeKind, Path, Removability, Step, Tree, field_shape, fields_of,
};
use crate::{Result, WhittleError};
use tracing::trace;

/// An ancestor of the current node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Frame {
    id: NodeId,
    kind: NodeKind,
    /// Number of path steps addressing this ancestor
    depth: usize,
}

impl Frame {
    fn of(node: &Node, depth: usize) -> Self {
        Self {
            id: node.id(),
            kind: node.kind(),
            depth,
        }
    }
}

/// Outcome of [`Cursor::delete_current`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deletion {
    /// A list element was spliced out; later siblings moved down by one
    Spliced(IndexShift),
    /// An optional field was emptied
    Nulled,
    /// A required child was replaced by a `Nop`
    ReplacedWithNop,
    /// Nothing could be removed here
    Skipped,
}

/// Index adjustment caused by splicing one list element out
///
/// Paths that run through the same list at a larger index must move down by
/// one to keep addressing the same node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexShift {
    /// Steps up to and including the list field
    list: Path,
    removed: usize,
}

impl IndexShift {
    pub fn removed(&self) -> usize {
        self.removed
    }

    fn depth(&self) -> usize {
        self.list.len()
    }

    /// Whether `path` addresses a later sibling of the removed element, or
    /// something inside one
    pub fn applies_to(&self, path: &Path) -> bool {
        let depth = self.depth();
        path.len() > depth
            && path.steps()[..depth] == *self.list.steps()
            && path.index_at(depth).is_some_and(|index| index > self.removed)
    }

    /// Move `cursor` down by one index, returning whether it was affected
    pub fn apply(&self, cursor: &mut Cursor) -> bool {
        if !self.applies_to(&cursor.path) {
            return false;
        }
        let depth = self.depth();
        if let Some(index) = cursor.path.index_at(depth) {
            cursor.path.set(depth, Step::Index(index - 1));
        }
        true
    }

    /// Undo [`IndexShift::apply`] on a cursor it affected
    pub fn revert(&self, cursor: &mut Cursor) {
        let depth = self.depth();
        if let Some(index) = cursor.path.index_at(depth) {
            cursor.path.set(depth, Step::Index(index + 1));
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Cursor {
    path: Path,
    ancestors: Vec<Frame>,
    current: Option<NodeId>,
    /// Step into the current node's children on the next move
    descend: bool,
    /// The current node was removed; the path addresses its old slot
    vacant: bool,
    /// Number of moves since the last reset, `None` once exhausted
    sequence: Option<usize>,
}

impl Cursor {
    /// An exhausted cursor with an empty path
    pub fn new() -> Self {
        Self::default()
    }

    /// A cursor positioned on the first statement of `tree`
    pub fn at_start(tree: &Tree) -> Self {
        let mut cursor = Self::new();
        cursor.reset(tree);
        cursor
    }

    pub fn reset(&mut self, tree: &Tree) {
        self.path = Path::new();
        self.ancestors.clear();
        self.vacant = false;
        match tree.statements().first() {
            Some(first) => {
                self.ancestors.push(Frame::of(tree.root(), 0));
                self.path.push(Step::Field("stmts"));
                self.path.push(Step::Index(0));
                self.current = Some(first.id());
                self.descend = true;
                self.sequence = Some(0);
            }
            None => {
                self.exhaust();
            }
        }
    }

    fn exhaust(&mut self) -> bool {
        self.path = Path::new();
        self.ancestors.clear();
        self.current = None;
        self.descend = false;
        self.vacant = false;
        self.sequence = None;
        false
    }

    pub fn is_exhausted(&self) -> bool {
        self.sequence.is_none()
    }

    /// Identity of the current node, `None` when exhausted or vacant
    pub fn current(&self) -> Option<NodeId> {
        if self.vacant { None } else { self.current }
    }

    pub fn is_vacant(&self) -> bool {
        self.vacant
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sequence(&self) -> Option<usize> {
        self.sequence
    }

    /// Number of ancestors, the synthetic root included
    pub fn depth(&self) -> usize {
        self.ancestors.len()
    }

    pub fn save_path(&self) -> Path {
        self.path.clone()
    }

    /// Replace the path; ancestors are stale until [`Cursor::bind`]
    pub fn restore_path(&mut self, path: Path) {
        self.path = path;
    }

    /// Current node looked up in `tree`
    pub fn node<'t>(&self, tree: &'t Tree) -> Result<Option<&'t Node>> {
        if self.vacant || self.current.is_none() {
            return Ok(None);
        }
        tree.resolve(&self.path)
    }

    /// Move `stmts[i]` at the start of the path by `offset`
    pub fn offset_statement(&mut self, offset: usize) {
        if let Some(index) = self.path.index_at(1) {
            self.path.set(1, Step::Index(index + offset));
        }
    }

    /// Advance to the next node in pre-order
    ///
    /// Returns `false` once the walk is over.
    pub fn step_forward(&mut self, tree: &Tree) -> Result<bool> {
        let Some(sequence) = self.sequence else {
            return Ok(false);
        };
        self.sequence = Some(sequence + 1);

        if self.descend && !self.vacant {
            let node = self.resolve_prefix(tree, self.path.len())?;
            if let Some((field, is_list, child)) = first_child(node, None)? {
                self.ancestors.push(Frame::of(node, self.path.len()));
                self.path.push(Step::Field(field));
                if is_list {
                    self.path.push(Step::Index(0));
                }
                self.current = Some(child);
                return Ok(true);
            }
        }
        self.descend = false;

        // After a splice the element at the same index is the old successor.
        let mut reuse_index = std::mem::take(&mut self.vacant);
        loop {
            let Some(frame) = self.ancestors.last().copied() else {
                return Ok(self.exhaust());
            };
            let parent = self.resolve_prefix(tree, frame.depth)?;

            if let Some(Step::Index(index)) = self.path.last() {
                let list = match self.path.get(self.path.len() - 2) {
                    Some(Step::Field(list)) => list,
                    _ => return Err(self.misplaced()),
                };
                let next = if reuse_index { index } else { index + 1 };
                if let Some(sibling) = parent.list(list).get(next) {
                    self.path.set_last(Step::Index(next));
                    self.current = Some(sibling.id());
                    self.descend = true;
                    return Ok(true);
                }
                self.path.pop();
            }
            reuse_index = false;

            let Some(Step::Field(name)) = self.path.last() else {
                return Err(self.misplaced());
            };
            if let Some((field, is_list, child)) = first_child(parent, Some(name))? {
                self.path.set_last(Step::Field(field));
                if is_list {
                    self.path.push(Step::Index(0));
                }
                self.current = Some(child);
                self.descend = true;
                return Ok(true);
            }

            self.path.pop();
            self.ancestors.pop();
            self.current = Some(frame.id);
            if self.ancestors.is_empty() {
                return Ok(self.exhaust());
            }
        }
    }

    /// Re-derive ancestors and current node from the path against `tree`
    ///
    /// Returns `false`, leaving the cursor untouched, when the path no longer
    /// resolves there.
    pub fn bind(&mut self, tree: &Tree) -> Result<bool> {
        if self.path.is_empty() {
            return Ok(false);
        }
        let Some((frames, node)) = trace_path(tree, self.path.steps())? else {
            return Ok(false);
        };
        self.ancestors = frames;
        self.current = Some(node.id());
        self.descend = true;
        self.vacant = false;
        if self.sequence.is_none() {
            self.sequence = Some(0);
        }
        Ok(true)
    }

    /// Like [`Cursor::bind`], but keeps the traversal state
    ///
    /// A vacant cursor only needs its parent to exist in `tree`.
    pub fn rebase(&mut self, tree: &Tree) -> Result<bool> {
        if self.sequence.is_none() || self.path.is_empty() {
            return Ok(false);
        }
        if !self.vacant {
            let Some((frames, node)) = trace_path(tree, self.path.steps())? else {
                return Ok(false);
            };
            self.ancestors = frames;
            self.current = Some(node.id());
            return Ok(true);
        }

        let parent_depth = match self.path.last() {
            Some(Step::Index(_)) => self.path.len().saturating_sub(2),
            _ => self.path.len() - 1,
        };
        let Some((mut frames, parent)) = trace_path(tree, &self.path.steps()[..parent_depth])?
        else {
            return Ok(false);
        };
        if let Some(Step::Field(name)) = self.path.get(parent_depth)
            && parent.field(name).is_none()
        {
            return Err(crate::syntax::tree::unknown_field(parent.kind(), name));
        }
        frames.push(Frame::of(parent, parent_depth));
        self.ancestors = frames;
        self.current = None;
        Ok(true)
    }

    /// Walk from the start until `pred` holds for the current node
    pub fn find_by(&mut self, tree: &Tree, mut pred: impl FnMut(&Node) -> bool) -> Result<bool> {
        self.reset(tree);
        while !self.is_exhausted() {
            if let Some(node) = self.node(tree)?
                && pred(node)
            {
                return Ok(true);
            }
            self.step_forward(tree)?;
        }
        Ok(false)
    }

    /// Walk from the start until the node with identity `id`
    pub fn find(&mut self, tree: &Tree, id: NodeId) -> Result<bool> {
        self.reset(tree);
        while !self.is_exhausted() {
            if self.current == Some(id) {
                return Ok(true);
            }
            self.step_forward(tree)?;
        }
        Ok(false)
    }

    /// Remove the current node from its parent
    ///
    /// Behaviour depends on the slot: list elements are spliced out, optional
    /// fields emptied, required fields get a `Nop`, identifier slots are left
    /// alone.
    pub fn delete_current(&mut self, tree: &mut Tree) -> Result<Deletion> {
        if self.vacant || self.current.is_none() {
            return Ok(Deletion::Skipped);
        }
        let Some(frame) = self.ancestors.last().copied() else {
            return Ok(Deletion::Skipped);
        };
        let parent = tree
            .resolve_steps_mut(&self.path.steps()[..frame.depth])?
            .ok_or_else(|| self.misplaced())?;

        match self.path.last() {
            Some(Step::Index(index)) => {
                let list = match self.path.get(self.path.len() - 2) {
                    Some(Step::Field(list)) => list,
                    _ => return Err(self.misplaced()),
                };
                match parent.field_mut(list) {
                    Some(Field::List(items)) if index < items.len() => {
                        items.remove(index);
                    }
                    _ => return Err(self.misplaced()),
                }
                trace!(path = %self.path, "spliced list element");
                let list_path = Path::from(self.path.steps()[..self.path.len() - 1].to_vec());
                self.vacate();
                Ok(Deletion::Spliced(IndexShift {
                    list: list_path,
                    removed: index,
                }))
            }
            Some(Step::Field(name)) => {
                let shape = field_shape(parent.kind(), name)
                    .ok_or_else(|| crate::syntax::tree::unknown_field(parent.kind(), name))?;
                match shape.removability {
                    Removability::NullableAway => {
                        if let Some(slot) = parent.field_mut(name) {
                            *slot = Field::Single(None);
                        }
                        trace!(path = %self.path, "emptied optional field");
                        self.vacate();
                        Ok(Deletion::Nulled)
                    }
                    Removability::ReplaceWithNoop => {
                        let span = parent.child(name).map(Node::span).unwrap_or_default();
                        let nop = Node::nop(span);
                        self.current = Some(nop.id());
                        if let Some(slot) = parent.field_mut(name) {
                            *slot = Field::node(nop);
                        }
                        trace!(path = %self.path, "replaced required child with nop");
                        Ok(Deletion::ReplacedWithNop)
                    }
                    Removability::Immutable => Ok(Deletion::Skipped),
                }
            }
            None => Ok(Deletion::Skipped),
        }
    }

    fn vacate(&mut self) {
        self.vacant = true;
        self.descend = false;
        self.current = None;
    }

    /// Put the current node in its parent's place
    ///
    /// Refuses at the top level and directly inside a class. When the
    /// discarded parent was a wrapper (`Arg`, `ExprStmt`) the hoist repeats.
    /// Returns whether anything moved.
    pub fn hoist_current(&mut self, tree: &mut Tree) -> Result<bool> {
        if self.vacant || self.current.is_none() {
            return Ok(false);
        }
        let mut hoisted = false;
        while self.ancestors.len() >= 2 {
            let Some(parent) = self.ancestors.last().copied() else {
                break;
            };
            if parent.kind.is_declaration_boundary() {
                break;
            }

            let tail = self.path.steps()[parent.depth..].to_vec();
            self.path.truncate(parent.depth);
            self.ancestors.pop();

            let slot = tree.resolve_mut(&self.path)?.ok_or_else(|| self.misplaced())?;
            let node = take_child(slot, &tail)?;
            *slot = node;
            hoisted = true;
            trace!(path = %self.path, replaced = %parent.kind, "hoisted node");

            if !parent.kind.is_wrapper() {
                break;
            }
        }
        Ok(hoisted)
    }

    fn resolve_prefix<'t>(&self, tree: &'t Tree, len: usize) -> Result<&'t Node> {
        tree.resolve_steps(&self.path.steps()[..len])?
            .ok_or_else(|| self.misplaced())
    }

    fn misplaced(&self) -> WhittleError {
        WhittleError::structural(format!(
            "cursor path {} does not match the tree it is used on",
            self.path
        ))
    }
}

/// First field of `node` after `after` that holds a child
fn first_child(
    node: &Node,
    after: Option<&str>,
) -> Result<Option<(&'static str, bool, NodeId)>> {
    let shape = fields_of(node.kind());
    let start = match after {
        None => 0,
        Some(name) => {
            shape
                .iter()
                .position(|f| f.name == name)
                .ok_or_else(|| crate::syntax::tree::unknown_field(node.kind(), name))?
                + 1
        }
    };
    for (field_shape, field) in shape.iter().zip(node.fields()).skip(start) {
        if let Some(child) = field.first_node() {
            return Ok(Some((field_shape.name, field.is_list(), child.id())));
        }
    }
    Ok(None)
}

/// Ancestors along `steps` and the node they address
fn trace_path<'t>(tree: &'t Tree, steps: &[Step]) -> Result<Option<(Vec<Frame>, &'t Node)>> {
    let mut frames = Vec::new();
    let mut node = tree.root();
    let mut depth = 0;
    while depth < steps.len() {
        let Step::Field(name) = steps[depth] else {
            return Err(WhittleError::structural(format!(
                "index at depth {depth} does not follow a list field"
            )));
        };
        frames.push(Frame::of(node, depth));
        match node.field(name) {
            Some(Field::Single(Some(child))) => {
                node = child.as_ref();
                depth += 1;
            }
            Some(Field::Single(None)) => return Ok(None),
            Some(Field::List(items)) => {
                let Some(Step::Index(index)) = steps.get(depth + 1) else {
                    return Err(WhittleError::structural(format!(
                        "list field '{name}' is not followed by an index"
                    )));
                };
                let Some(child) = items.get(*index) else {
                    return Ok(None);
                };
                node = child;
                depth += 2;
            }
            Some(Field::Leaf(_)) | None => {
                return Err(crate::syntax::tree::unknown_field(node.kind(), name));
            }
        }
    }
    Ok(Some((frames, node)))
}

/// Detach the child of `parent` addressed by a one- or two-step tail
fn take_child(parent: &mut Node, tail: &[Step]) -> Result<Node> {
    let kind = parent.kind();
    let taken = match tail {
        [Step::Field(name)] => match parent.field_mut(name) {
            Some(Field::Single(slot)) => slot.take().map(|boxed| *boxed),
            _ => None,
        },
        [Step::Field(name), Step::Index(index)] => match parent.field_mut(name) {
            Some(Field::List(items)) if *index < items.len() => Some(items.remove(*index)),
            _ => None,
        },
        _ => None,
    };
    taken.ok_or_else(|| {
        WhittleError::structural(format!("{kind} has no child at {}", Path::from(tail.to_vec())))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{parse, render};

    fn tree(source: &str) -> Tree {
        Tree::new(parse(source).unwrap())
    }

    fn walk(tree: &Tree) -> Vec<NodeId> {
        let mut cursor = Cursor::at_start(tree);
        let mut seen = Vec::new();
        while let Some(id) = cursor.current() {
            seen.push(id);
            cursor.step_forward(tree).unwrap();
        }
        seen
    }

    const SAMPLE: &str = r#"
fn add(a, b) { return a + b; }
class Box { fn get() { return 1; } }
let x = add(1, 2);
if (x > 2) { print(x); } else { print("small"); }
while (x < 10) x = x + 1;
let f = fn(v) { return -v; };
;
"#;

    #[test]
    fn walk_matches_recursive_preorder() {
        let tree = tree(SAMPLE);
        assert_eq!(walk(&tree), tree.preorder());
    }

    #[test]
    fn walk_of_empty_tree_is_exhausted() {
        let tree = tree("");
        let mut cursor = Cursor::at_start(&tree);
        assert!(cursor.is_exhausted());
        assert!(!cursor.step_forward(&tree).unwrap());
    }

    #[test]
    fn sequence_counts_moves_and_resets_at_end() {
        let tree = tree("f(); g();");
        let mut cursor = Cursor::at_start(&tree);
        assert_eq!(cursor.sequence(), Some(0));
        cursor.step_forward(&tree).unwrap();
        assert_eq!(cursor.sequence(), Some(1));
        while cursor.step_forward(&tree).unwrap() {}
        assert_eq!(cursor.sequence(), None);
    }

    #[test]
    fn saved_paths_bind_back_to_the_same_node() {
        let tree = tree(SAMPLE);
        let mut cursor = Cursor::at_start(&tree);
        while let Some(id) = cursor.current() {
            let mut copy = Cursor::new();
            copy.restore_path(cursor.save_path());
            assert!(copy.bind(&tree).unwrap());
            assert_eq!(copy.current(), Some(id), "at {}", cursor.path());
            assert_eq!(copy.depth(), cursor.depth());
            cursor.step_forward(&tree).unwrap();
        }
    }

    #[test]
    fn paths_bind_against_a_reparsed_tree() {
        let first = tree("if (x) { f(); g(); }");
        let mut cursor = Cursor::new();
        let g = first.statements()[0].child("then").unwrap().list("stmts")[1]
            .child("expr")
            .unwrap()
            .id();
        assert!(cursor.find(&first, g).unwrap());

        let second = tree(&render(&first).unwrap());
        assert!(cursor.bind(&second).unwrap());
        let node = cursor.node(&second).unwrap().unwrap();
        assert_eq!(node.name(), Some("g"));
        assert_ne!(node.id(), g);
    }

    #[test]
    fn bind_reports_missing_targets() {
        let big = tree("f(); g();");
        let small = tree("f();");
        let mut cursor = Cursor::at_start(&big);
        cursor.step_forward(&big).unwrap();
        cursor.step_forward(&big).unwrap();
        cursor.step_forward(&big).unwrap();
        assert_eq!(cursor.path().to_string(), "stmts[1]");
        let before = cursor.current();
        assert!(!cursor.bind(&small).unwrap());
        assert_eq!(cursor.current(), before);
    }

    #[test]
    fn splice_then_step_reaches_next_sibling() {
        let mut tree = tree("a(); b(); c();");
        let c = tree.statements()[2].id();
        let mut cursor = Cursor::new();
        assert!(cursor.find(&tree, tree.statements()[1].id()).unwrap());

        let deletion = cursor.delete_current(&mut tree).unwrap();
        assert!(matches!(deletion, Deletion::Spliced(ref shift) if shift.removed() == 1));
        assert_eq!(tree.statements().len(), 2);
        assert!(cursor.step_forward(&tree).unwrap());
        assert_eq!(cursor.current(), Some(c));
    }

    #[test]
    fn splicing_the_last_element_moves_on() {
        let mut tree = tree("if (x) { a(); } b();");
        let b = tree.statements()[1].id();
        let a = tree.statements()[0].child("then").unwrap().list("stmts")[0].id();
        let mut cursor = Cursor::new();
        assert!(cursor.find(&tree, a).unwrap());
        cursor.delete_current(&mut tree).unwrap();
        assert!(cursor.step_forward(&tree).unwrap());
        assert_eq!(cursor.current(), Some(b));
    }

    #[test]
    fn optional_fields_are_nulled_and_walk_continues() {
        let mut tree = tree("if (x) f(); else g(); h();");
        let h = tree.statements()[1].id();
        let otherwise = tree.statements()[0].child("else").unwrap().id();
        let mut cursor = Cursor::new();
        assert!(cursor.find(&tree, otherwise).unwrap());
        assert_eq!(cursor.delete_current(&mut tree).unwrap(), Deletion::Nulled);
        assert!(tree.statements()[0].child("else").is_none());
        assert!(cursor.step_forward(&tree).unwrap());
        assert_eq!(cursor.current(), Some(h));
    }

    #[test]
    fn required_fields_get_a_nop() {
        let mut tree = tree("while (x) f();");
        let body = tree.statements()[0].child("body").unwrap().id();
        let mut cursor = Cursor::new();
        assert!(cursor.find(&tree, body).unwrap());
        assert_eq!(
            cursor.delete_current(&mut tree).unwrap(),
            Deletion::ReplacedWithNop
        );
        assert_eq!(render(&tree).unwrap(), "while (x) ;\n");
        let nop = tree.statements()[0].child("body").unwrap();
        assert_eq!(cursor.current(), Some(nop.id()));
    }

    #[test]
    fn identifier_slots_are_skipped() {
        let mut tree = tree("fn f() {}");
        let name = tree.statements()[0].child("name").unwrap().id();
        let mut cursor = Cursor::new();
        assert!(cursor.find(&tree, name).unwrap());
        let before = tree.clone();
        assert_eq!(cursor.delete_current(&mut tree).unwrap(), Deletion::Skipped);
        assert_eq!(tree, before);
        assert_eq!(cursor.current(), Some(name));
    }

    #[test]
    fn index_shift_moves_only_later_siblings() {
        let mut tree = tree("a(); b(); c(); if (x) { d(); }");
        let mut roving = Cursor::new();
        assert!(roving.find(&tree, tree.statements()[1].id()).unwrap());

        let mut later = Cursor::new();
        let call_c = tree.statements()[2].child("expr").unwrap().id();
        assert!(later.find(&tree, call_c).unwrap());
        let mut earlier = Cursor::at_start(&tree);

        let Deletion::Spliced(shift) = roving.delete_current(&mut tree).unwrap() else {
            panic!("expected a splice");
        };
        assert!(shift.apply(&mut later));
        assert!(!shift.apply(&mut earlier));
        assert_eq!(later.path().to_string(), "stmts[1].expr");
        assert!(later.bind(&tree).unwrap());
        assert_eq!(later.current(), Some(call_c));

        shift.revert(&mut later);
        assert_eq!(later.path().to_string(), "stmts[2].expr");
    }

    #[test]
    fn hoist_collapses_wrapper_and_block() {
        let mut tree = tree("{ (x); }");
        let x = tree.statements()[0].list("stmts")[0].child("expr").unwrap().id();
        let mut cursor = Cursor::new();
        assert!(cursor.find(&tree, x).unwrap());
        let before = cursor.path().len();

        assert!(cursor.hoist_current(&mut tree).unwrap());
        assert!(cursor.path().len() < before);
        assert_eq!(cursor.path().to_string(), "stmts[0]");
        assert_eq!(tree.statements()[0].id(), x);
        assert_eq!(tree.statements()[0].kind(), NodeKind::Variable);
        assert_eq!(render(&tree).unwrap(), "x;\n");
    }

    #[test]
    fn hoist_through_argument_replaces_the_call() {
        let mut tree = tree("f(g(y));");
        let inner = tree.statements()[0].child("expr").unwrap().list("args")[0]
            .child("value")
            .unwrap()
            .id();
        let mut cursor = Cursor::new();
        assert!(cursor.find(&tree, inner).unwrap());
        assert!(cursor.hoist_current(&mut tree).unwrap());
        assert_eq!(render(&tree).unwrap(), "g(y);\n");
        assert_eq!(cursor.path().to_string(), "stmts[0].expr");
        assert_eq!(cursor.current(), Some(inner));
    }

    #[test]
    fn hoist_refuses_top_level_and_class_members() {
        let mut tree = tree("f(); class A { fn m() {} }");
        let mut cursor = Cursor::at_start(&tree);
        assert!(!cursor.hoist_current(&mut tree).unwrap());

        let method = tree.statements()[1].list("members")[0].id();
        assert!(cursor.find(&tree, method).unwrap());
        assert!(!cursor.hoist_current(&mut tree).unwrap());
        assert_eq!(tree.statements()[1].list("members").len(), 1);
    }

    #[test]
    fn find_by_skips_wrappers() {
        let source = "x = 1; print(x);";
        let tree = tree(source);
        let mut cursor = Cursor::new();
        let offset = source.find("print").unwrap();
        let found = cursor
            .find_by(&tree, |n| n.span().start == offset && !n.kind().is_wrapper())
            .unwrap();
        assert!(found);
        assert_eq!(cursor.node(&tree).unwrap().unwrap().kind(), NodeKind::Call);
    }

    #[test]
    fn rebase_keeps_vacant_state() {
        let mut tree = tree("a(); b(); c();");
        let mut cursor = Cursor::new();
        assert!(cursor.find(&tree, tree.statements()[1].id()).unwrap());
        cursor.delete_current(&mut tree).unwrap();

        let reparsed = Tree::new(parse(&render(&tree).unwrap()).unwrap());
        assert!(cursor.rebase(&reparsed).unwrap());
        assert!(cursor.is_vacant());
        assert!(cursor.step_forward(&reparsed).unwrap());
        let node = cursor.node(&reparsed).unwrap().unwrap();
        assert_eq!(node.child("expr").and_then(Node::name), Some("c"));
    }
}
