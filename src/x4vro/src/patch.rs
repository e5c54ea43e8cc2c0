//! Diff patch writing.
//!
//! Serializes a minimal `<diff>` document that directs the game engine to
//! replace attribute values in place. The writer does not validate that any
//! selector resolves against a real document; that is the caller's
//! responsibility.

use crate::docpath;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("failed to write patch {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Round to 2 decimal places and render with Rust's shortest float form
/// (`15` rather than `15.0`); the engine parses both spellings.
pub fn format_value(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded}")
}

/// Write a patch document replacing each attribute path with its value.
///
/// One `<replace sel="ELEMENT_PATH@ATTRIBUTE">VALUE</replace>` directive per
/// entry, in entry order, wrapped in the fixed declaration + `<diff>`
/// envelope. Overwrites any existing file and creates missing parent
/// directories.
pub fn write_diff_patch(out_path: &Path, entries: &[(String, f64)]) -> Result<(), PatchError> {
    let io_err = |source| PatchError::Io {
        path: out_path.display().to_string(),
        source,
    };

    let mut lines = Vec::with_capacity(entries.len() + 3);
    lines.push(r#"<?xml version="1.0" encoding="utf-8"?>"#.to_string());
    lines.push("<diff>".to_string());
    for (path, value) in entries {
        lines.push(format!(
            r#"  <replace sel="{}">{}</replace>"#,
            docpath::selector(path),
            format_value(*value)
        ));
    }
    lines.push("</diff>".to_string());

    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(out_path, lines.join("\n")).map_err(io_err)
}

/// Re-root `path` from `from_root` into `to_root`, preserving the relative
/// layout underneath. Returns `None` when `path` is not under `from_root`.
pub fn re_root(path: &Path, from_root: &Path, to_root: &Path) -> Option<PathBuf> {
    let relative = path.strip_prefix(from_root).ok()?;
    Some(to_root.join(relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_single_replace_directive() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("shield_arg_s_standard_01_mk1_macro.xml");

        let entries = vec![("/macro/properties/recharge/max".to_string(), 123.456)];
        write_diff_patch(&out, &entries).unwrap();

        let content = fs::read_to_string(&out).unwrap();
        assert_eq!(
            content,
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
             <diff>\n\
             \x20 <replace sel=\"/macro/properties/recharge/@max\">123.46</replace>\n\
             </diff>"
        );
    }

    #[test]
    fn test_entries_keep_their_order() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("engine.xml");

        let entries = vec![
            ("/m/p/thrust/forward".to_string(), 1000.0),
            ("/m/p/thrust/reverse".to_string(), 200.0),
            ("/m/p/boost/thrust".to_string(), 8.0),
        ];
        write_diff_patch(&out, &entries).unwrap();

        let content = fs::read_to_string(&out).unwrap();
        let forward = content.find("thrust/@forward").unwrap();
        let reverse = content.find("thrust/@reverse").unwrap();
        let boost = content.find("boost/@thrust").unwrap();
        assert!(forward < reverse && reverse < boost);
    }

    #[test]
    fn test_creates_parent_directories_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir
            .path()
            .join("extensions/al_shieldmod_vro/assets/props/shield.xml");

        write_diff_patch(&out, &[("/a/b".to_string(), 1.0)]).unwrap();
        write_diff_patch(&out, &[("/a/b".to_string(), 2.0)]).unwrap();

        let content = fs::read_to_string(&out).unwrap();
        assert!(content.contains(">2</replace>"));
        assert!(!content.contains(">1</replace>"));
    }

    #[test]
    fn test_format_value_rounds_to_two_places() {
        assert_eq!(format_value(123.456), "123.46");
        assert_eq!(format_value(15.0), "15");
        assert_eq!(format_value(0.125), "0.13");
        assert_eq!(format_value(4.5), "4.5");
    }

    #[test]
    fn test_re_root() {
        let path = Path::new("/mods/vro/assets/props/Engines/macros/engine.xml");
        let rerooted = re_root(path, Path::new("/mods/vro"), Path::new("/out/travelmod")).unwrap();
        assert_eq!(
            rerooted,
            Path::new("/out/travelmod/assets/props/Engines/macros/engine.xml")
        );
        assert!(re_root(path, Path::new("/elsewhere"), Path::new("/out")).is_none());
    }
}
