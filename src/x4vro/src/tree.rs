//! Owned XML element tree.
//!
//! A thin tree built from a quick-xml event stream, so first-match queries
//! and document-path computation stay independent of the underlying parser
//! and can be tested against synthetic in-memory trees.

use crate::docpath::DocPath;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("XML parse error: {0}")]
    Xml(String),

    #[error("document has no root element")]
    NoRoot,

    #[error("unbalanced closing tag </{0}>")]
    Unbalanced(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One XML element with its attributes (in document order) and children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

/// A parsed XML document. Text content is discarded; asset values live in
/// attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlTree {
    pub root: Element,
}

impl XmlTree {
    /// Parse a document from raw bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self, TreeError> {
        let mut reader = Reader::from_reader(bytes);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    stack.push(element_from_start(&e)?);
                }
                Ok(Event::Empty(e)) => {
                    let element = element_from_start(&e)?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None if root.is_none() => root = Some(element),
                        None => {}
                    }
                }
                Ok(Event::End(e)) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    let element = stack.pop().ok_or(TreeError::Unbalanced(name))?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => root = Some(element),
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(TreeError::Xml(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(Self {
            root: root.ok_or(TreeError::NoRoot)?,
        })
    }

    /// Parse a document from a file on disk.
    pub fn parse_file(path: &Path) -> Result<Self, TreeError> {
        let bytes = fs::read(path)?;
        Self::parse(&bytes)
    }

    /// Find the first element named `tag` in document order, anywhere in the
    /// tree, along with its structural path from the root.
    pub fn find_first(&self, tag: &str) -> Option<(&Element, DocPath)> {
        let mut path = DocPath::new();
        path.push(&self.root.name, None);
        if self.root.name == tag {
            let found = path.clone();
            return Some((&self.root, found));
        }
        find_in(&self.root, tag, &mut path)
    }
}

fn element_from_start(e: &BytesStart<'_>) -> Result<Element, TreeError> {
    let mut element = Element::new(&String::from_utf8_lossy(e.name().as_ref()));
    for attr in e.attributes() {
        let attr = attr.map_err(|err| TreeError::Xml(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| TreeError::Xml(err.to_string()))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

/// Depth-first, document-order search below `parent`. Child steps carry a
/// 1-based index only when a same-named sibling exists.
fn find_in<'a>(
    parent: &'a Element,
    tag: &str,
    path: &mut DocPath,
) -> Option<(&'a Element, DocPath)> {
    for (i, child) in parent.children.iter().enumerate() {
        let siblings = parent
            .children
            .iter()
            .filter(|c| c.name == child.name)
            .count();
        let index = if siblings > 1 {
            let position = parent.children[..i]
                .iter()
                .filter(|c| c.name == child.name)
                .count();
            Some(position + 1)
        } else {
            None
        };

        path.push(&child.name, index);
        if child.name == tag {
            let found = path.clone();
            return Some((child, found));
        }
        if let Some(found) = find_in(child, tag, path) {
            return Some(found);
        }
        path.pop();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHIELD_MACRO: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<macros>
  <macro name="shield_arg_s_standard_01_mk1_macro" class="shieldgenerator">
    <properties>
      <identification name="Shield" makerrace="argon" mk="1"/>
      <recharge max="432" rate="23" delay="9.5"/>
      <hull integrated="1"/>
    </properties>
  </macro>
</macros>
"#;

    #[test]
    fn test_find_first_returns_path() {
        let tree = XmlTree::parse(SHIELD_MACRO.as_bytes()).unwrap();
        let (element, path) = tree.find_first("recharge").unwrap();
        assert_eq!(path.to_string(), "/macros/macro/properties/recharge");
        assert_eq!(element.attributes.len(), 3);
        assert_eq!(element.attributes[0], ("max".to_string(), "432".to_string()));
    }

    #[test]
    fn test_find_first_missing_tag() {
        let tree = XmlTree::parse(SHIELD_MACRO.as_bytes()).unwrap();
        assert!(tree.find_first("boost").is_none());
    }

    #[test]
    fn test_find_first_is_document_order() {
        let doc = r#"<root><a><hit v="1"/></a><hit v="2"/></root>"#;
        let tree = XmlTree::parse(doc.as_bytes()).unwrap();
        let (element, path) = tree.find_first("hit").unwrap();
        assert_eq!(element.attributes[0].1, "1");
        assert_eq!(path.to_string(), "/root/a/hit");
    }

    #[test]
    fn test_sibling_indices_only_when_duplicated() {
        let doc = r#"<macros><macro n="1"/><macro n="2"><inner t="x"/></macro></macros>"#;
        let tree = XmlTree::parse(doc.as_bytes()).unwrap();
        let (_, path) = tree.find_first("inner").unwrap();
        assert_eq!(path.to_string(), "/macros/macro[2]/inner");
    }

    #[test]
    fn test_root_match() {
        let tree = XmlTree::parse(b"<diff><replace sel=\"x\"/></diff>").unwrap();
        let (_, path) = tree.find_first("diff").unwrap();
        assert_eq!(path.to_string(), "/diff");
    }

    #[test]
    fn test_synthetic_tree_query() {
        // find_first must work on hand-built trees, independent of parsing.
        let mut properties = Element::new("properties");
        let mut recharge = Element::new("recharge");
        recharge.attributes.push(("max".into(), "100".into()));
        properties.children.push(recharge);
        let mut root = Element::new("macro");
        root.children.push(properties);
        let tree = XmlTree { root };

        let (element, path) = tree.find_first("recharge").unwrap();
        assert_eq!(path.to_string(), "/macro/properties/recharge");
        assert_eq!(element.attributes[0].1, "100");
    }

    #[test]
    fn test_empty_document_is_error() {
        assert!(matches!(XmlTree::parse(b""), Err(TreeError::NoRoot)));
    }
}
