//! Node addresses built from field names and list indexes

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Step {
    Field(&'static str),
    Index(usize),
}

/// Steps from the root of a tree to one node
///
/// A field step naming a list field is always followed by an index step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Path(Vec<Step>);

impl Path {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn steps(&self) -> &[Step] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<Step> {
        self.0.last().copied()
    }

    pub fn get(&self, depth: usize) -> Option<Step> {
        self.0.get(depth).copied()
    }

    pub(crate) fn push(&mut self, step: Step) {
        self.0.push(step);
    }

    pub(crate) fn pop(&mut self) -> Option<Step> {
        self.0.pop()
    }

    pub(crate) fn set_last(&mut self, step: Step) {
        if let Some(last) = self.0.last_mut() {
            *last = step;
        }
    }

    pub(crate) fn set(&mut self, depth: usize, step: Step) {
        self.0[depth] = step;
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }

    /// Whether both paths agree over their shared length
    ///
    /// True when one addresses the other's node, an ancestor of it or a
    /// descendant of it.
    pub fn shares_prefix(&self, other: &Path) -> bool {
        self.0.iter().zip(&other.0).all(|(a, b)| a == b)
    }

    /// Index stored at `depth`, if that step is an index
    pub fn index_at(&self, depth: usize) -> Option<usize> {
        match self.0.get(depth) {
            Some(Step::Index(i)) => Some(*i),
            _ => None,
        }
    }
}

impl From<Vec<Step>> for Path {
    fn from(steps: Vec<Step>) -> Self {
        Self(steps)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, step) in self.0.iter().enumerate() {
            match step {
                Step::Field(name) if i == 0 => f.write_str(name)?,
                Step::Field(name) => write!(f, ".{name}")?,
                Step::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}
