//! Resource collection across configured source roots.
//!
//! Enumerates candidate asset files under each source's asset directory,
//! filters them by extension and filename pattern, and runs the extractor
//! over every kept file to produce one [`AssetRecord`] per file.

use crate::extract::{self, ExtractError};
use crate::identity::{self, Identity};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;
use walkdir::WalkDir;

/// Which side of the join a source feeds: stock game data or the mod's
/// variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTag {
    Base,
    Vro,
}

/// One resolved input directory: the unpacked base game, an expansion, or a
/// VRO overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRoot {
    pub name: String,
    pub root: PathBuf,
    pub tag: SourceTag,
}

/// One discovered asset file with its extracted attribute values.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRecord {
    pub source_name: String,
    pub tag: SourceTag,
    pub path: PathBuf,
    pub basename: String,
    pub identity: Option<Identity>,
    /// Document-path column -> extracted numeric value.
    pub values: BTreeMap<String, f64>,
}

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("invalid file pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to list {path}: {source}")]
    List {
        path: String,
        #[source]
        source: walkdir::Error,
    },

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Collect one record per matching asset file across all sources.
///
/// Lists `root/asset_path` for each source (one level, sorted for
/// deterministic output), keeps `.xml` files whose base filename matches the
/// inclusion pattern, and extracts the requested tags with float conversion
/// and diff-envelope collapsing. An empty result set for a source is valid;
/// a missing directory is not.
pub fn collect_records(
    sources: &[SourceRoot],
    asset_path: &str,
    file_pattern: &str,
    tags: &[&str],
    identity_prefix: &str,
) -> Result<Vec<AssetRecord>, CollectError> {
    let pattern = Regex::new(file_pattern).map_err(|source| CollectError::Pattern {
        pattern: file_pattern.to_string(),
        source,
    })?;

    let mut records = Vec::new();
    for source in sources {
        let asset_dir = source.root.join(asset_path);
        for entry in WalkDir::new(&asset_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|source| CollectError::List {
                path: asset_dir.display().to_string(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let is_xml = path
                .extension()
                .map(|ext| ext == "xml")
                .unwrap_or(false);
            let basename = entry.file_name().to_string_lossy().into_owned();
            if !is_xml || !pattern.is_match(&basename) {
                continue;
            }

            let values = extract::extract_attributes(path, tags, true)?;
            records.push(AssetRecord {
                source_name: source.name.clone(),
                tag: source.tag,
                path: path.to_path_buf(),
                identity: identity::parse_identity(identity_prefix, &basename),
                basename,
                values,
            });
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn shield_doc(max: f64, rate: f64, delay: f64) -> String {
        format!(
            r#"<macros><macro class="shieldgenerator"><properties><recharge max="{max}" rate="{rate}" delay="{delay}"/></properties></macro></macros>"#
        )
    }

    fn seed_source(dir: &Path, asset_path: &str) -> PathBuf {
        let macros_dir = dir.join(asset_path);
        fs::create_dir_all(&macros_dir).unwrap();
        macros_dir
    }

    fn sources(base: &Path, vro: &Path) -> Vec<SourceRoot> {
        vec![
            SourceRoot {
                name: "base".into(),
                root: base.to_path_buf(),
                tag: SourceTag::Base,
            },
            SourceRoot {
                name: "vro_base".into(),
                root: vro.to_path_buf(),
                tag: SourceTag::Vro,
            },
        ]
    }

    const ASSET_PATH: &str = "assets/props/SurfaceElements/macros";

    #[test]
    fn test_collects_matching_xml_only() {
        let base = tempfile::tempdir().unwrap();
        let vro = tempfile::tempdir().unwrap();
        let base_macros = seed_source(base.path(), ASSET_PATH);
        seed_source(vro.path(), ASSET_PATH);

        fs::write(
            base_macros.join("shield_arg_s_standard_01_mk1_macro.xml"),
            shield_doc(432.0, 23.0, 9.5),
        )
        .unwrap();
        // Dropped: wrong pattern, wrong extension.
        fs::write(base_macros.join("engine_arg_s_travel_01_mk1.xml"), "<x/>").unwrap();
        fs::write(base_macros.join("shield_notes.txt"), "notes").unwrap();

        let records = collect_records(
            &sources(base.path(), vro.path()),
            ASSET_PATH,
            "^shield.*",
            &["recharge"],
            "shield",
        )
        .unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.tag, SourceTag::Base);
        assert_eq!(record.basename, "shield_arg_s_standard_01_mk1_macro.xml");
        assert_eq!(record.identity.as_ref().unwrap().faction, "arg");
        assert_eq!(
            record.values["/macros/macro/properties/recharge/max"],
            432.0
        );
    }

    #[test]
    fn test_empty_source_is_valid() {
        let base = tempfile::tempdir().unwrap();
        let vro = tempfile::tempdir().unwrap();
        seed_source(base.path(), ASSET_PATH);
        seed_source(vro.path(), ASSET_PATH);

        let records = collect_records(
            &sources(base.path(), vro.path()),
            ASSET_PATH,
            "^shield.*",
            &["recharge"],
            "shield",
        )
        .unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let base = tempfile::tempdir().unwrap();
        let vro = tempfile::tempdir().unwrap();
        seed_source(base.path(), ASSET_PATH);
        // vro root exists but has no asset directory underneath.

        let result = collect_records(
            &sources(base.path(), vro.path()),
            ASSET_PATH,
            "^shield.*",
            &["recharge"],
            "shield",
        );
        assert!(matches!(result, Err(CollectError::List { .. })));
    }

    #[test]
    fn test_collection_is_idempotent() {
        let base = tempfile::tempdir().unwrap();
        let vro = tempfile::tempdir().unwrap();
        let base_macros = seed_source(base.path(), ASSET_PATH);
        let vro_macros = seed_source(vro.path(), ASSET_PATH);

        fs::write(
            base_macros.join("shield_arg_s_standard_01_mk1_macro.xml"),
            shield_doc(432.0, 23.0, 9.5),
        )
        .unwrap();
        fs::write(
            vro_macros.join("shield_arg_s_standard_01_mk1_macro.xml"),
            shield_doc(500.0, 20.0, 11.0),
        )
        .unwrap();

        let srcs = sources(base.path(), vro.path());
        let first = collect_records(&srcs, ASSET_PATH, "^shield.*", &["recharge"], "shield").unwrap();
        let second =
            collect_records(&srcs, ASSET_PATH, "^shield.*", &["recharge"], "shield").unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_bad_pattern_is_reported() {
        let result = collect_records(&[], "macros", "([", &["recharge"], "shield");
        assert!(matches!(result, Err(CollectError::Pattern { .. })));
    }
}
