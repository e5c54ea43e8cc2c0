//! # x4vro
//!
//! X4: Foundations component rebalancing for the VRO mod - asset attribute
//! extraction, identity joins, and diff patch generation.
//!
//! This library provides functionality to:
//! - Parse component macro XML and extract tagged attribute values with
//!   their document-path locations
//! - Collect asset records across the base game, expansions, and VRO
//!   overlay directories
//! - Join mod-variant components to their stock counterparts by filename
//!   identity and compute rebalanced shield and engine statistics
//! - Emit `<diff>` patch files the game engine applies at load time
//!
//! ## Example
//!
//! ```no_run
//! use x4vro::config::{ConfiguredOnly, RunConfig};
//! use x4vro::rebalance::shields;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RunConfig::load("config.toml".as_ref())?;
//! let sources = config.resolve_sources(&ConfiguredOnly)?;
//!
//! let outcome = shields::rebalance(&sources, &config.shields)?;
//! for component in &outcome.components {
//!     let out = component.record.vro.path.with_extension("patch.xml");
//!     x4vro::write_diff_patch(&out, &component.entries)?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod collect;
pub mod config;
pub mod docpath;
pub mod extract;
pub mod identity;
pub mod patch;
pub mod rebalance;
pub mod tree;

// Re-export commonly used items
#[doc(inline)]
pub use collect::{collect_records, AssetRecord, CollectError, SourceRoot, SourceTag};
#[doc(inline)]
pub use config::{ConfigError, FamilyConfig, RootResolver, RunConfig};
#[doc(inline)]
pub use docpath::{collapse_diff_envelope, selector, DocPath};
#[doc(inline)]
pub use extract::{extract_attributes, extract_raw_attributes, ExtractError};
#[doc(inline)]
pub use identity::{parse_identity, Identity, SizeClass};
#[doc(inline)]
pub use patch::{re_root, write_diff_patch, PatchError};
#[doc(inline)]
pub use rebalance::{
    ColumnMap, JoinedRecord, RebalanceError, RebalanceOutcome, RebalancedComponent,
};
#[doc(inline)]
pub use tree::{Element, TreeError, XmlTree};
