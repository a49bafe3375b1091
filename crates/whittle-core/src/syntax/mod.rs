//! Syntax model and front end for whittle scripts
//!
//! - [`node`]: owned nodes with positional fields
//! - [`shape`]: the static field table every generic walk consults
//! - [`path`]: field/index addresses of nodes
//! - [`tree`]: statement lists under a synthetic root
//! - [`lexer`], [`parser`], [`render`]: text to tree and back

pub mod lexer;
pub mod node;
pub mod parser;
pub mod path;
pub mod render;
pub mod shape;
pub mod tree;

pub use node::{Field, Node, NodeId, NodeKind, Span};
pub use parser::parse;
pub use path::{Path, Step};
pub use render::{render, render_expression, render_statements};
pub use shape::{Cardinality, FieldShape, Removability, field_shape, fields_of};
pub use tree::Tree;

/// 1-based column of `offset`, counted from the nearest preceding newline
pub fn column_at(text: &str, offset: usize) -> usize {
    let offset = offset.min(text.len());
    let line_start = text.as_bytes()[..offset]
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |nl| nl + 1);
    offset - line_start + 1
}
