//! Shield recharge rebalancing.
//!
//! Rescales shield recharge capacity, delay, and rate. Capacity and rate are
//! renormalized against the mean mod-to-stock ratio per (size, tier) group;
//! delay is stretched on small hulls only. Khaak shields keep their
//! mod-variant values untouched.

use super::{
    join_by_identity, rescale_factors, ColumnMap, JoinedRecord, RebalanceError, RebalanceOutcome,
    RebalancedComponent,
};
use crate::collect::{self, AssetRecord, SourceRoot};
use crate::config::FamilyConfig;
use crate::identity::SizeClass;

/// Factions whose components bypass the stock-derived formulas entirely.
const FACTION_EXCEPTIONS: &[&str] = &["kha"];

const DELAY_STRETCH: f64 = 1.5;
const SMALL_RATE_SCALE: f64 = 0.9;
const MEDIUM_RATE_BOOST: f64 = 1.25;

/// Collect and rebalance all shield components reachable from `sources`.
pub fn rebalance(
    sources: &[SourceRoot],
    family: &FamilyConfig,
) -> Result<RebalanceOutcome, RebalanceError> {
    let tags = family.tag_refs();
    let records = collect::collect_records(
        sources,
        &family.asset_path,
        &family.file_pattern,
        &tags,
        &family.identity_prefix,
    )?;
    let columns = ColumnMap::build(&records, &tags);
    rebalance_records(records, columns)
}

fn rebalance_records(
    records: Vec<AssetRecord>,
    columns: ColumnMap,
) -> Result<RebalanceOutcome, RebalanceError> {
    let max_col = columns.path("recharge_max")?.to_string();
    let delay_col = columns.path("recharge_delay")?.to_string();
    let rate_col = columns.path("recharge_rate")?.to_string();

    let joined = join_by_identity(records);
    let max_factors = rescale_factors(&joined, size_tier, &max_col);
    let rate_factors = rescale_factors(&joined, size_tier, &rate_col);

    let mut components = Vec::with_capacity(joined.len());
    for record in joined {
        let is_exception = record
            .identity()
            .map(|identity| FACTION_EXCEPTIONS.contains(&identity.faction.as_str()))
            .unwrap_or(false);
        let size = record.identity().map(|identity| identity.size);
        let factor_key = size_tier(&record);

        // Capacity: stock value scaled by the group's mean mod/stock ratio.
        let max_factor = factor_key
            .as_ref()
            .and_then(|key| max_factors.get(key))
            .copied();
        let mut max_value = match (record.base_value(&max_col), max_factor) {
            (Some(base), Some(factor)) => Some(base * factor),
            _ => None,
        };
        if is_exception || max_value.is_none() {
            max_value = record.vro_value(&max_col);
        }

        // Delay: stretched stock value, small hulls only.
        let mut delay_value = record.base_value(&delay_col).map(|base| base * DELAY_STRETCH);
        if is_exception || size != Some(SizeClass::S) || delay_value.is_none() {
            delay_value = record.vro_value(&delay_col);
        }

        // Rate: group-normalized stock value, with flat size overrides.
        let rate_factor = factor_key
            .as_ref()
            .and_then(|key| rate_factors.get(key))
            .copied();
        let base_rate = record.base_value(&rate_col);
        let mut rate_value = match (base_rate, rate_factor) {
            (Some(base), Some(factor)) => Some(base * factor),
            _ => None,
        };
        if size == Some(SizeClass::S) {
            rate_value = base_rate.map(|base| base * SMALL_RATE_SCALE);
        } else if size == Some(SizeClass::M) {
            rate_value = match (base_rate, rate_factor) {
                (Some(base), Some(factor)) => Some(base * factor * MEDIUM_RATE_BOOST),
                _ => None,
            };
        }
        if is_exception || rate_value.is_none() {
            rate_value = record.vro_value(&rate_col);
        }

        let mut entries = Vec::with_capacity(3);
        if let Some(value) = max_value {
            entries.push((max_col.clone(), value));
        }
        if let Some(value) = delay_value {
            entries.push((delay_col.clone(), value));
        }
        if let Some(value) = rate_value {
            entries.push((rate_col.clone(), value));
        }
        components.push(RebalancedComponent { record, entries });
    }

    Ok(RebalanceOutcome {
        components,
        columns,
    })
}

fn size_tier(record: &JoinedRecord) -> Option<(SizeClass, String)> {
    record
        .identity()
        .map(|identity| (identity.size, identity.tier.clone()))
}
