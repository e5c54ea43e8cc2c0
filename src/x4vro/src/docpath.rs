//! Structural document paths.
//!
//! A [`DocPath`] locates an element by a sequence of indexed name steps from
//! the document root, e.g. `/macros/macro/properties/recharge`. A step only
//! carries a 1-based index when the element has same-named siblings, which is
//! the form the game engine accepts in diff selectors.

use std::fmt;

/// One step of a document path: element name plus optional sibling index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    pub name: String,
    pub index: Option<usize>,
}

/// Structural locator of an element, from the document root downward.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocPath {
    steps: Vec<PathStep>,
}

impl DocPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &str, index: Option<usize>) {
        self.steps.push(PathStep {
            name: name.to_string(),
            index,
        });
    }

    pub fn pop(&mut self) {
        self.steps.pop();
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            write!(f, "/{}", step.name)?;
            if let Some(index) = step.index {
                write!(f, "[{index}]")?;
            }
        }
        Ok(())
    }
}

/// Remove patch-envelope steps (`/diff/replace`, `/diff/add`) from a rendered
/// path, so paths read as if the element came from the raw asset document.
/// Keeps generated paths consistent between plain stock files and prior patch
/// files that wrap their payload in a diff envelope.
pub fn collapse_diff_envelope(path: &str) -> String {
    path.replace("/diff/replace", "").replace("/diff/add", "")
}

/// Split a rendered attribute path at its final separator into the element
/// path (with trailing `/`) and the attribute name.
pub fn split_attribute(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(pos) => (&path[..=pos], &path[pos + 1..]),
        None => ("", path),
    }
}

/// Build the engine selector for an attribute path:
/// `/macro/properties/recharge/max` becomes `/macro/properties/recharge/@max`.
pub fn selector(path: &str) -> String {
    let (element_path, attribute) = split_attribute(path);
    format!("{element_path}@{attribute}")
}
