//! Asset attribute extraction.
//!
//! Opens one asset document, locates the first element matching each
//! requested tag, and records that element's attribute values keyed by their
//! document-path location.

use crate::docpath;
use crate::tree::{TreeError, XmlTree};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{file}: {source}")]
    Tree {
        file: String,
        #[source]
        source: TreeError,
    },

    #[error("{file}: non-numeric value {value:?} for {key}")]
    Conversion {
        file: String,
        key: String,
        value: String,
    },
}

/// Extract raw string attribute values for each requested tag.
///
/// For each tag the first matching element anywhere in the document
/// contributes one entry per attribute, keyed
/// `<document path>/<attribute name>`. A tag with no match contributes
/// nothing. With `collapse_diffs`, patch-envelope path segments are removed
/// so keys read as if the element came from the un-diffed document.
pub fn extract_raw_attributes(
    file: &Path,
    tags: &[&str],
    collapse_diffs: bool,
) -> Result<BTreeMap<String, String>, ExtractError> {
    let tree = XmlTree::parse_file(file).map_err(|source| ExtractError::Tree {
        file: file.display().to_string(),
        source,
    })?;

    let mut result = BTreeMap::new();
    for tag in tags {
        let Some((element, path)) = tree.find_first(tag) else {
            continue;
        };
        let mut rendered = path.to_string();
        if collapse_diffs {
            rendered = docpath::collapse_diff_envelope(&rendered);
        }
        // Later tags overwrite earlier ones on key collision; document paths
        // are unique per file so this does not occur in practice.
        for (name, value) in &element.attributes {
            result.insert(format!("{rendered}/{name}"), value.clone());
        }
    }
    Ok(result)
}

/// Extract attribute values for each requested tag, converted to floats.
///
/// Any non-numeric value fails the extraction; there is no partial fallback.
pub fn extract_attributes(
    file: &Path,
    tags: &[&str],
    collapse_diffs: bool,
) -> Result<BTreeMap<String, f64>, ExtractError> {
    let raw = extract_raw_attributes(file, tags, collapse_diffs)?;
    let mut result = BTreeMap::new();
    for (key, value) in raw {
        let parsed = value
            .trim()
            .parse::<f64>()
            .map_err(|_| ExtractError::Conversion {
                file: file.display().to_string(),
                key: key.clone(),
                value: value.clone(),
            })?;
        result.insert(key, parsed);
    }
    Ok(result)
}
