//! Static field metadata per node kind
//!
//! Every structural field of every kind is listed here once, in visit order,
//! together with how many children it holds and what deleting its child
//! means. The cursor never inspects field values to learn this.

use super::node::NodeKind;
use serde::Serialize;

/// How many children a field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Cardinality {
    /// Zero or one child node
    Optional,
    /// Exactly one child node
    Required,
    /// Ordered list of child nodes
    List,
    /// Opaque text, never visited
    Leaf,
}

/// What deleting the child held by a single-valued field does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Removability {
    /// The field is emptied
    NullableAway,
    /// The child is replaced by a `Nop` placeholder
    ReplaceWithNoop,
    /// The child cannot be removed
    Immutable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldShape {
    pub name: &'static str,
    pub cardinality: Cardinality,
    pub removability: Removability,
}

const fn optional(name: &'static str) -> FieldShape {
    FieldShape {
        name,
        cardinality: Cardinality::Optional,
        removability: Removability::NullableAway,
    }
}

const fn required(name: &'static str) -> FieldShape {
    FieldShape {
        name,
        cardinality: Cardinality::Required,
        removability: Removability::ReplaceWithNoop,
    }
}

/// Required identifier slot
const fn ident(name: &'static str) -> FieldShape {
    FieldShape {
        name,
        cardinality: Cardinality::Required,
        removability: Removability::Immutable,
    }
}

// Elements are spliced out, the field itself is never removed.
const fn list(name: &'static str) -> FieldShape {
    FieldShape {
        name,
        cardinality: Cardinality::List,
        removability: Removability::Immutable,
    }
}

const fn leaf(name: &'static str) -> FieldShape {
    FieldShape {
        name,
        cardinality: Cardinality::Leaf,
        removability: Removability::Immutable,
    }
}

const ROOT: &[FieldShape] = &[list("stmts")];
const FUNCTION_DECL: &[FieldShape] = &[ident("name"), list("params"), list("body")];
const CLASS_DECL: &[FieldShape] = &[ident("name"), list("members")];
const PARAM: &[FieldShape] = &[ident("name")];
const BLOCK: &[FieldShape] = &[list("stmts")];
const IF: &[FieldShape] = &[required("cond"), required("then"), optional("else")];
const WHILE: &[FieldShape] = &[required("cond"), required("body")];
const RETURN: &[FieldShape] = &[optional("value")];
const LET: &[FieldShape] = &[ident("name"), optional("value")];
const EXPR_STMT: &[FieldShape] = &[required("expr")];
const CALL: &[FieldShape] = &[ident("callee"), list("args")];
const ARG: &[FieldShape] = &[required("value")];
const ASSIGN: &[FieldShape] = &[required("target"), required("value")];
const BINARY: &[FieldShape] = &[required("lhs"), leaf("op"), required("rhs")];
const UNARY: &[FieldShape] = &[leaf("op"), required("operand")];
const CLOSURE: &[FieldShape] = &[list("params"), list("body")];
const NAMED: &[FieldShape] = &[leaf("name")];
const LITERAL: &[FieldShape] = &[leaf("value")];

/// Ordered structural fields of `kind`
pub fn fields_of(kind: NodeKind) -> &'static [FieldShape] {
    match kind {
        NodeKind::Root => ROOT,
        NodeKind::FunctionDecl => FUNCTION_DECL,
        NodeKind::ClassDecl => CLASS_DECL,
        NodeKind::Param => PARAM,
        NodeKind::Block => BLOCK,
        NodeKind::If => IF,
        NodeKind::While => WHILE,
        NodeKind::Return => RETURN,
        NodeKind::Let => LET,
        NodeKind::ExprStmt => EXPR_STMT,
        NodeKind::Nop => &[],
        NodeKind::Call => CALL,
        NodeKind::Arg => ARG,
        NodeKind::Assign => ASSIGN,
        NodeKind::Binary => BINARY,
        NodeKind::Unary => UNARY,
        NodeKind::Closure => CLOSURE,
        NodeKind::Variable | NodeKind::Ident => NAMED,
        NodeKind::Literal => LITERAL,
    }
}

/// Shape of one named field of `kind`
pub fn field_shape(kind: NodeKind, name: &str) -> Option<&'static FieldShape> {
    fields_of(kind).iter().find(|f| f.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_slots_are_immutable() {
        for (kind, field) in [
            (NodeKind::FunctionDecl, "name"),
            (NodeKind::Let, "name"),
            (NodeKind::Call, "callee"),
            (NodeKind::Param, "name"),
        ] {
            let shape = field_shape(kind, field).unwrap();
            assert_eq!(shape.removability, Removability::Immutable, "{kind}.{field}");
        }
    }

    #[test]
    fn if_fields_in_visit_order() {
        let names: Vec<_> = fields_of(NodeKind::If).iter().map(|f| f.name).collect();
        assert_eq!(names, ["cond", "then", "else"]);
        assert_eq!(
            field_shape(NodeKind::If, "else").unwrap().removability,
            Removability::NullableAway
        );
        assert_eq!(
            field_shape(NodeKind::If, "then").unwrap().removability,
            Removability::ReplaceWithNoop
        );
    }

    #[test]
    fn unknown_field_has_no_shape() {
        assert!(field_shape(NodeKind::Nop, "expr").is_none());
    }
}
