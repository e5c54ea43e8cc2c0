//! Single-file extraction handler.
//!
//! Runs the attribute extractor over one asset file and prints the
//! document-path keyed values, for checking what a rebalancing run would
//! see.

use anyhow::Result;
use std::path::Path;

pub fn handle(input: &Path, tags: &[String], raw: bool, keep_diff_paths: bool) -> Result<()> {
    let tag_refs: Vec<&str> = tags.iter().map(String::as_str).collect();
    let collapse = !keep_diff_paths;

    if raw {
        let values = x4vro::extract_raw_attributes(input, &tag_refs, collapse)?;
        if values.is_empty() {
            println!("no matching tags in {}", input.display());
        }
        for (key, value) in values {
            println!("{key} = {value}");
        }
    } else {
        let values = x4vro::extract_attributes(input, &tag_refs, collapse)?;
        if values.is_empty() {
            println!("no matching tags in {}", input.display());
        }
        for (key, value) in values {
            println!("{key} = {value}");
        }
    }

    Ok(())
}
