//! Run configuration.
//!
//! Everything a run needs is carried in one [`RunConfig`] passed into the
//! pipeline: named source roots, per-family asset locations and output
//! directories, and the summary directory. Roots the config leaves unset are
//! filled in through a [`RootResolver`] strategy, so interactive prompting
//! stays outside the library.

use crate::collect::{SourceRoot, SourceTag};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write config {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("no root configured for source {0:?}")]
    MissingRoot(String),
}

/// One named input source. Expansion sources without a configured root are
/// resolved at run time; VRO overlays for expansions are derived
/// automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    pub tag: SourceTag,
}

/// Per-component-family settings: where its asset files live, which files
/// count, which tags to extract, and where patches go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyConfig {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
    pub asset_path: String,
    pub file_pattern: String,
    pub tags: Vec<String>,
    pub identity_prefix: String,
}

impl FamilyConfig {
    pub fn shields() -> Self {
        Self {
            enabled: true,
            out_dir: None,
            asset_path: "assets/props/SurfaceElements/macros".to_string(),
            file_pattern: "^shield.*".to_string(),
            tags: vec!["recharge".to_string()],
            identity_prefix: "shield".to_string(),
        }
    }

    pub fn engines() -> Self {
        Self {
            enabled: true,
            out_dir: None,
            asset_path: "assets/props/Engines/macros".to_string(),
            file_pattern: "^engine.*".to_string(),
            tags: vec![
                "thrust".to_string(),
                "boost".to_string(),
                "travel".to_string(),
            ],
            identity_prefix: "engine".to_string(),
        }
    }

    pub fn tag_refs(&self) -> Vec<&str> {
        self.tags.iter().map(String::as_str).collect()
    }
}

/// Strategy for filling in source roots the config leaves unset.
pub trait RootResolver {
    fn resolve(&self, name: &str) -> Option<PathBuf>;
}

/// Resolver that never supplies anything; unset roots become errors.
pub struct ConfiguredOnly;

impl RootResolver for ConfiguredOnly {
    fn resolve(&self, _name: &str) -> Option<PathBuf> {
        None
    }
}

/// The name of the mod's own root source; overlay derivation and output
/// re-rooting hang off it.
pub const VRO_ROOT_SOURCE: &str = "vro_base";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "RunConfig::default_sources")]
    pub sources: Vec<SourceEntry>,
    #[serde(default = "FamilyConfig::shields")]
    pub shields: FamilyConfig,
    #[serde(default = "FamilyConfig::engines")]
    pub engines: FamilyConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_dir: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            sources: Self::default_sources(),
            shields: FamilyConfig::shields(),
            engines: FamilyConfig::engines(),
            summary_dir: None,
        }
    }
}

impl RunConfig {
    fn default_sources() -> Vec<SourceEntry> {
        let entry = |name: &str, tag| SourceEntry {
            name: name.to_string(),
            root: None,
            tag,
        };
        vec![
            entry("base", SourceTag::Base),
            entry("split", SourceTag::Base),
            entry("terran", SourceTag::Base),
            entry(VRO_ROOT_SOURCE, SourceTag::Vro),
        ]
    }

    /// Default config location, next to the other tool configs.
    pub fn default_path() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join("x4vro").join("config.toml"))
    }

    /// Load from a TOML file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Save to a TOML file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        let write_err = |source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, contents).map_err(write_err)
    }

    /// The resolved root of the mod's own source, needed to re-root output
    /// paths. Only meaningful on an already-resolved source list.
    pub fn vro_root(sources: &[SourceRoot]) -> Option<&Path> {
        sources
            .iter()
            .find(|source| source.name == VRO_ROOT_SOURCE)
            .map(|source| source.root.as_path())
    }

    /// Resolve every source entry to a concrete root, consulting `resolver`
    /// for unset ones, then derive VRO overlay sources for each expansion:
    /// `split` gains `vro_split` rooted at
    /// `<vro_root>/extensions/<split dir name>`, and so on.
    pub fn resolve_sources(
        &self,
        resolver: &dyn RootResolver,
    ) -> Result<Vec<SourceRoot>, ConfigError> {
        let mut resolved = Vec::with_capacity(self.sources.len());
        for entry in &self.sources {
            let root = entry
                .root
                .clone()
                .or_else(|| resolver.resolve(&entry.name))
                .ok_or_else(|| ConfigError::MissingRoot(entry.name.clone()))?;
            resolved.push(SourceRoot {
                name: entry.name.clone(),
                root,
                tag: entry.tag,
            });
        }

        if let Some(vro_root) = Self::vro_root(&resolved).map(Path::to_path_buf) {
            let mut derived = Vec::new();
            for source in &resolved {
                if source.tag != SourceTag::Base || source.name == "base" {
                    continue;
                }
                let overlay_name = format!("vro_{}", source.name);
                if resolved.iter().any(|s| s.name == overlay_name) {
                    continue;
                }
                let Some(dir_name) = source.root.file_name() else {
                    continue;
                };
                derived.push(SourceRoot {
                    name: overlay_name,
                    root: vro_root.join("extensions").join(dir_name),
                    tag: SourceTag::Vro,
                });
            }
            resolved.extend(derived);
        }

        Ok(resolved)
    }
}
