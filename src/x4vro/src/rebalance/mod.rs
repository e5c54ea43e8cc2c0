//! Component rebalancing: identity joins, rescale factors, and the
//! per-family rule sets.
//!
//! Both rebalancers share the same shape: collect records for the component
//! family, left-join mod-variant records onto their stock counterparts by
//! filename identity, derive mean rescale factors per grouping key, then
//! compute each output attribute through a fixed formula with an
//! undefined-to-fallback escape hatch. Undefined values can only leave
//! through the fallback arms, never into a patch file.

pub mod engines;
pub mod shields;

use crate::collect::{AssetRecord, CollectError, SourceTag};
use crate::identity::Identity;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RebalanceError {
    #[error(transparent)]
    Collect(#[from] CollectError),

    #[error("no column found for attribute {0}")]
    MissingColumn(String),
}

/// Maps semantic attribute names (`recharge_max`, `thrust_forward`) to the
/// document-path column holding them. Document paths double as column
/// identifiers, so this map is threaded through every derived-table step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMap {
    columns: BTreeMap<String, String>,
}

impl ColumnMap {
    /// Build from the union of value keys across records: a key containing
    /// `/<tag>/` is registered as `<tag>_<last path segment>`.
    pub fn build(records: &[AssetRecord], tags: &[&str]) -> Self {
        let mut columns = BTreeMap::new();
        for tag in tags {
            let needle = format!("/{tag}/");
            for record in records {
                for key in record.values.keys() {
                    if key.contains(&needle) {
                        let attr = key.rsplit('/').next().unwrap_or_default();
                        columns.insert(format!("{tag}_{attr}"), key.clone());
                    }
                }
            }
        }
        Self { columns }
    }

    /// Look up a required column; absence means no input file carried the
    /// attribute at all.
    pub fn path(&self, name: &str) -> Result<&str, RebalanceError> {
        self.columns
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| RebalanceError::MissingColumn(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.columns.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(|(name, path)| (name.as_str(), path.as_str()))
    }
}

/// One mod-variant record paired with its stock counterpart, when one shares
/// its identity.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRecord {
    pub vro: AssetRecord,
    pub base: Option<AssetRecord>,
}

impl JoinedRecord {
    pub fn identity(&self) -> Option<&Identity> {
        self.vro.identity.as_ref()
    }

    pub fn vro_value(&self, column: &str) -> Option<f64> {
        self.vro.values.get(column).copied()
    }

    pub fn base_value(&self, column: &str) -> Option<f64> {
        self.base
            .as_ref()
            .and_then(|record| record.values.get(column).copied())
    }
}

/// Left-join mod-variant records onto stock records by identity.
///
/// Records without a parsed identity never match and keep a `None` stock
/// side; their formulas resolve entirely through the mod-variant fallbacks.
/// If several stock records share one identity, the first collected wins.
pub fn join_by_identity(records: Vec<AssetRecord>) -> Vec<JoinedRecord> {
    let (vro, base): (Vec<_>, Vec<_>) = records
        .into_iter()
        .partition(|record| record.tag == SourceTag::Vro);

    vro.into_iter()
        .map(|record| {
            let counterpart = record.identity.as_ref().and_then(|identity| {
                base.iter()
                    .find(|candidate| candidate.identity.as_ref() == Some(identity))
                    .cloned()
            });
            JoinedRecord {
                vro: record,
                base: counterpart,
            }
        })
        .collect()
}

/// Mean of per-record `vro/base` ratios for one column, per grouping key.
///
/// Pairs with a missing side or a non-finite ratio (stock value zero)
/// contribute nothing; a key with zero contributing pairs is simply absent,
/// and every consumer resolves that through its fallback path.
pub fn rescale_factors<K, F>(
    joined: &[JoinedRecord],
    key_fn: F,
    column: &str,
) -> BTreeMap<K, f64>
where
    K: Ord,
    F: Fn(&JoinedRecord) -> Option<K>,
{
    let mut sums: BTreeMap<K, (f64, usize)> = BTreeMap::new();
    for record in joined {
        let Some(key) = key_fn(record) else { continue };
        let (Some(vro), Some(base)) = (record.vro_value(column), record.base_value(column)) else {
            continue;
        };
        let ratio = vro / base;
        if !ratio.is_finite() {
            continue;
        }
        let entry = sums.entry(key).or_insert((0.0, 0));
        entry.0 += ratio;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(key, (sum, count))| (key, sum / count as f64))
        .collect()
}

/// One component's computed patch entries, in output order, alongside the
/// joined record they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct RebalancedComponent {
    pub record: JoinedRecord,
    /// (vro-side document-path column, computed value); the patch overwrites
    /// the mod-variant's own file, so output keys are the mod-variant's
    /// columns.
    pub entries: Vec<(String, f64)>,
}

impl RebalancedComponent {
    pub fn entry(&self, column: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(path, _)| path == column)
            .map(|(_, value)| *value)
    }
}

/// Result of one family's rebalancing pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RebalanceOutcome {
    pub components: Vec<RebalancedComponent>,
    pub columns: ColumnMap,
}
