//! Owned syntax nodes
//!
//! A [`Node`] stores its fields positionally, aligned with the entry for its
//! kind in the shape table ([`super::shape::fields_of`]). Field access by name
//! goes through that table, so the cursor can walk any kind generically.

use super::shape::{Cardinality, fields_of};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique node identity
///
/// Allocated when a node is created. Moving or cloning a node keeps its id;
/// parsing the same text twice yields different ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(u64);

impl NodeId {
    pub fn fresh() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kinds of the script language grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    /// Synthetic wrapper holding the top-level statements
    Root,
    FunctionDecl,
    ClassDecl,
    Param,
    Block,
    If,
    While,
    Return,
    Let,
    ExprStmt,
    Nop,
    Call,
    Arg,
    Assign,
    Binary,
    Unary,
    Closure,
    Variable,
    Literal,
    Ident,
}

impl NodeKind {
    /// Kinds that only wrap another node and never stand alone
    pub fn is_wrapper(self) -> bool {
        matches!(self, NodeKind::Arg | NodeKind::ExprStmt)
    }

    /// Kinds whose members must not be hoisted out
    pub fn is_declaration_boundary(self) -> bool {
        matches!(self, NodeKind::ClassDecl)
    }

    pub fn is_expression(self) -> bool {
        matches!(
            self,
            NodeKind::Call
                | NodeKind::Assign
                | NodeKind::Binary
                | NodeKind::Unary
                | NodeKind::Closure
                | NodeKind::Variable
                | NodeKind::Literal
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Source attributes of a node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Span {
    /// Byte offset of the first token
    pub start: usize,
    /// Byte offset just past the last token
    pub end: usize,
    /// 1-based line of `start`
    pub line: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize) -> Self {
        Self { start, end, line }
    }

    /// Span from the start of `self` to the end of `other`
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start,
            end: other.end,
            line: self.line,
        }
    }
}

/// Value held by one structural field
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Single(Option<Box<Node>>),
    List(Vec<Node>),
    Leaf(String),
}

impl Field {
    pub fn node(node: Node) -> Self {
        Field::Single(Some(Box::new(node)))
    }

    pub fn optional(node: Option<Node>) -> Self {
        Field::Single(node.map(Box::new))
    }

    pub fn leaf(value: impl Into<String>) -> Self {
        Field::Leaf(value.into())
    }

    /// First child node this field holds, if any
    pub fn first_node(&self) -> Option<&Node> {
        match self {
            Field::Single(node) => node.as_deref(),
            Field::List(nodes) => nodes.first(),
            Field::Leaf(_) => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Field::List(_))
    }
}

/// One syntax node
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    span: Span,
    fields: Vec<Field>,
}

impl Node {
    /// Build a node from fields given in shape-table order
    ///
    /// Missing trailing fields are filled with empty values of the declared
    /// cardinality.
    pub fn from_parts(kind: NodeKind, span: Span, mut fields: Vec<Field>) -> Self {
        let shape = fields_of(kind);
        debug_assert!(
            fields.len() <= shape.len(),
            "{kind} takes {} fields, got {}",
            shape.len(),
            fields.len()
        );
        for field in &shape[fields.len()..] {
            fields.push(match field.cardinality {
                Cardinality::List => Field::List(Vec::new()),
                Cardinality::Leaf => Field::Leaf(String::new()),
                Cardinality::Optional | Cardinality::Required => Field::Single(None),
            });
        }
        Self {
            id: NodeId::fresh(),
            kind,
            span,
            fields,
        }
    }

    /// No-op placeholder occupying a mandatory slot
    pub fn nop(span: Span) -> Self {
        Self::from_parts(NodeKind::Nop, span, Vec::new())
    }

    pub fn root(stmts: Vec<Node>) -> Self {
        let span = match (stmts.first(), stmts.last()) {
            (Some(first), Some(last)) => first.span.to(last.span),
            _ => Span::default(),
        };
        Self::from_parts(NodeKind::Root, span, vec![Field::List(stmts)])
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<Field> {
        self.fields
    }

    fn position(&self, name: &str) -> Option<usize> {
        fields_of(self.kind).iter().position(|f| f.name == name)
    }

    /// Field by name, `None` when the kind has no such field
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.position(name).map(|i| &self.fields[i])
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.position(name).map(move |i| &mut self.fields[i])
    }

    /// Child held by a single-valued field
    pub fn child(&self, name: &str) -> Option<&Node> {
        match self.field(name)? {
            Field::Single(node) => node.as_deref(),
            _ => None,
        }
    }

    /// Elements of a list field, empty for any other field
    pub fn list(&self, name: &str) -> &[Node] {
        match self.field(name) {
            Some(Field::List(nodes)) => nodes,
            _ => &[],
        }
    }

    /// Text of a leaf field, empty for any other field
    pub fn leaf(&self, name: &str) -> &str {
        match self.field(name) {
            Some(Field::Leaf(value)) => value,
            _ => "",
        }
    }

    /// Name carried by `Ident`, `Variable`, `Param` and named declarations
    pub fn name(&self) -> Option<&str> {
        match self.kind {
            NodeKind::Ident | NodeKind::Variable => Some(self.leaf("name")),
            NodeKind::Param
            | NodeKind::FunctionDecl
            | NodeKind::ClassDecl
            | NodeKind::Let
            | NodeKind::Call => {
                let field = if self.kind == NodeKind::Call {
                    "callee"
                } else {
                    "name"
                };
                self.child(field).and_then(Node::name)
            }
            _ => None,
        }
    }

    /// Direct child nodes in field order
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.fields.iter().flat_map(|field| {
            let (single, list): (Option<&Node>, &[Node]) = match field {
                Field::Single(node) => (node.as_deref(), &[]),
                Field::List(nodes) => (None, nodes.as_slice()),
                Field::Leaf(_) => (None, &[]),
            };
            single.into_iter().chain(list.iter())
        })
    }

    /// Recursive pre-order visit of this node and its descendants
    pub fn visit_preorder<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        for child in self.children() {
            child.visit_preorder(visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Node {
        Node::from_parts(NodeKind::Ident, Span::default(), vec![Field::leaf(name)])
    }

    #[test]
    fn from_parts_fills_missing_fields() {
        let ret = Node::from_parts(NodeKind::Return, Span::default(), Vec::new());
        assert_eq!(ret.fields(), &[Field::Single(None)]);

        let decl = Node::from_parts(
            NodeKind::FunctionDecl,
            Span::default(),
            vec![Field::node(ident("f"))],
        );
        assert_eq!(decl.fields().len(), 3);
        assert!(decl.list("params").is_empty());
        assert_eq!(decl.name(), Some("f"));
    }

    #[test]
    fn ids_survive_clone_but_not_rebuild() {
        let a = ident("a");
        let b = a.clone();
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), ident("a").id());
    }

    #[test]
    fn unknown_field_is_none() {
        let nop = Node::nop(Span::default());
        assert!(nop.field("stmts").is_none());
        assert!(nop.list("stmts").is_empty());
    }
}
