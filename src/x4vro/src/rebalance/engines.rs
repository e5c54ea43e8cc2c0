//! Engine thrust and travel-drive rebalancing.
//!
//! The engine pass normalizes boost and travel thrust through effective
//! (mass-independent) values, then rank-matches components within each size
//! class so travel performance can borrow boost-derived values: components
//! are ranked by effective travel thrust and by effective boost thrust, and
//! each pairs with whichever component holds its travel rank in the boost
//! ranking. Faction-specific corrections adjust boost ramps and travel
//! charge on large hulls.

use super::{
    join_by_identity, rescale_factors, ColumnMap, JoinedRecord, RebalanceError, RebalanceOutcome,
    RebalancedComponent,
};
use crate::collect::{self, AssetRecord, SourceRoot};
use crate::config::FamilyConfig;
use crate::identity::SizeClass;
use std::cmp::Ordering;

/// Small and medium hulls swap travel thrust for their ranked partner's
/// boost thrust; large hulls instead stretch their own travel thrust.
const LARGE_TRAVEL_STRETCH: f64 = 5.0 / 3.0;

// Faction corrections, large (L/XL) hulls only.
const BOOST_DURATION_DOUBLED: &[&str] = &["par"];
const BOOST_RAMPS_HALVED: &[&str] = &["spl"];
const BOOST_SOFTENED: &[&str] = &["arg", "tel"];
const SOFTENED_DURATION_SCALE: f64 = 1.33;
const SOFTENED_RAMP_SCALE: f64 = 0.75;
const TRAVEL_CHARGE_TRIMMED: &[&str] = &["ter"];
const TRIMMED_CHARGE_SCALE: f64 = 0.75;

/// Collect and rebalance all travel-capable engines reachable from `sources`.
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

struct Cols {
    fwd: String,
    rev: String,
    boost_thrust: String,
    boost_duration: String,
    boost_attack: String,
    boost_release: String,
    travel_thrust: String,
    travel_charge: String,
    travel_attack: String,
    travel_release: String,
}

impl Cols {
    fn resolve(columns: &ColumnMap) -> Result<Self, RebalanceError> {
        Ok(Self {
            fwd: columns.path("thrust_forward")?.to_string(),
            rev: columns.path("thrust_reverse")?.to_string(),
            boost_thrust: columns.path("boost_thrust")?.to_string(),
            boost_duration: columns.path("boost_duration")?.to_string(),
            boost_attack: columns.path("boost_attack")?.to_string(),
            boost_release: columns.path("boost_release")?.to_string(),
            travel_thrust: columns.path("travel_thrust")?.to_string(),
            travel_charge: columns.path("travel_charge")?.to_string(),
            travel_attack: columns.path("travel_attack")?.to_string(),
            travel_release: columns.path("travel_release")?.to_string(),
        })
    }
}

struct EngineRow {
    record: JoinedRecord,
    size: SizeClass,
    faction: String,
    thrust_factor: Option<f64>,
    attack_factor: Option<f64>,
    fwd_pre: Option<f64>,
    eff_boost_pre: Option<f64>,
    eff_travel_pre: Option<f64>,
}

fn rebalance_records(
    mut records: Vec<AssetRecord>,
    columns: ColumnMap,
) -> Result<RebalanceOutcome, RebalanceError> {
    let cols = Cols::resolve(&columns)?;

    // Components without travel stats are fixed thrusters, not engines.
    records.retain(|record| record.values.contains_key(&cols.travel_thrust));

    let joined = join_by_identity(records);
    let thrust_factors = rescale_factors(&joined, size_tier_kind, &cols.fwd);
    let attack_factors = rescale_factors(&joined, size_tier_kind, &cols.travel_attack);

    // Records without a parsed identity have no size class and cannot take
    // part in the rank matching; they are silently excluded.
    let mut rows: Vec<EngineRow> = joined
        .into_iter()
        .filter(|record| record.identity().is_some())
        .map(|record| {
            let key = size_tier_kind(&record);
            let thrust_factor = key
                .as_ref()
                .and_then(|key| thrust_factors.get(key))
                .copied();
            let attack_factor = key
                .as_ref()
                .and_then(|key| attack_factors.get(key))
                .copied();

            let eff_boost_base = product(
                record.base_value(&cols.fwd),
                record.base_value(&cols.boost_thrust),
            );
            let eff_travel_base = product(
                record.base_value(&cols.fwd),
                record.base_value(&cols.travel_thrust),
            );
            let eff_boost_vro = product(
                record.vro_value(&cols.fwd),
                record.vro_value(&cols.boost_thrust),
            );
            let eff_travel_vro = product(
                record.vro_value(&cols.fwd),
                record.vro_value(&cols.travel_thrust),
            );

            // Normalized multipliers: stock effective thrust over the new
            // forward thrust, else the mod value renormalized through the
            // group factor, else the mod multiplier as-is.
            let fwd_pre = record.vro_value(&cols.fwd);
            let boost_pre = ratio(eff_boost_base, fwd_pre)
                .or_else(|| {
                    ratio(
                        eff_boost_vro,
                        ratio(record.vro_value(&cols.fwd), thrust_factor),
                    )
                })
                .or_else(|| record.vro_value(&cols.boost_thrust));
            let travel_pre = ratio(eff_travel_base, fwd_pre)
                .or_else(|| {
                    ratio(
                        eff_travel_vro,
                        ratio(record.vro_value(&cols.fwd), thrust_factor),
                    )
                })
                .or_else(|| record.vro_value(&cols.travel_thrust));

            let identity = record.identity().cloned();
            let (size, faction) = match identity {
                Some(identity) => (identity.size, identity.faction),
                // Unreachable after the filter above.
                None => (SizeClass::S, String::new()),
            };

            EngineRow {
                size,
                faction,
                thrust_factor,
                attack_factor,
                eff_boost_pre: product(fwd_pre, boost_pre),
                eff_travel_pre: product(fwd_pre, travel_pre),
                fwd_pre,
                record,
            }
        })
        .collect();

    // Rank matching happens in (size, forward thrust) order so tie-breaks
    // are deterministic.
    rows.sort_by(|a, b| a.size.cmp(&b.size).then(cmp_ascending(a.fwd_pre, b.fwd_pre)));
    let partner = rank_match(&rows);
    let partner_eff_boost: Vec<Option<f64>> = partner
        .iter()
        .map(|&index| rows[index].eff_boost_pre)
        .collect();

    let mut components = Vec::with_capacity(rows.len());
    for (i, row) in rows.into_iter().enumerate() {
        let record = &row.record;
        let large = row.size.is_large_hull();

        let fwd_out = record.vro_value(&cols.fwd);

        let rev_out = product(record.base_value(&cols.rev), row.thrust_factor)
            .or_else(|| record.vro_value(&cols.rev));

        let boost_thrust_out = ratio(row.eff_boost_pre, fwd_out)
            .or_else(|| record.vro_value(&cols.boost_thrust));

        let mut boost_duration = stock_or_renormalized(record, &cols.boost_duration, row.attack_factor);
        let mut boost_attack = stock_or_renormalized(record, &cols.boost_attack, row.attack_factor);
        let mut boost_release = stock_or_renormalized(record, &cols.boost_release, row.attack_factor);
        if large && BOOST_DURATION_DOUBLED.contains(&row.faction.as_str()) {
            boost_duration = boost_duration.map(|value| value * 2.0);
        }
        if large && BOOST_RAMPS_HALVED.contains(&row.faction.as_str()) {
            boost_attack = boost_attack.map(|value| value * 0.5);
            boost_release = boost_release.map(|value| value * 0.5);
        }
        if large && BOOST_SOFTENED.contains(&row.faction.as_str()) {
            boost_duration = boost_duration.map(|value| value * SOFTENED_DURATION_SCALE);
            boost_attack = boost_attack.map(|value| value * SOFTENED_RAMP_SCALE);
            boost_release = boost_release.map(|value| value * SOFTENED_RAMP_SCALE);
        }

        let eff_travel_out = if large {
            row.eff_travel_pre.map(|value| value * LARGE_TRAVEL_STRETCH)
        } else {
            partner_eff_boost[i]
        };
        let travel_thrust_out = ratio(eff_travel_out, fwd_out)
            .or_else(|| record.vro_value(&cols.travel_thrust));

        let mut travel_charge = stock_or_renormalized(record, &cols.travel_charge, row.attack_factor);
        if large && TRAVEL_CHARGE_TRIMMED.contains(&row.faction.as_str()) {
            travel_charge = travel_charge.map(|value| value * TRIMMED_CHARGE_SCALE);
        }
        let travel_attack = stock_or_renormalized(record, &cols.travel_attack, row.attack_factor);
        let travel_release = stock_or_renormalized(record, &cols.travel_release, row.attack_factor);

        let mut entries = Vec::with_capacity(10);
        let mut push = |column: &str, value: Option<f64>| {
            if let Some(value) = value {
                entries.push((column.to_string(), value));
            }
        };
        push(&cols.fwd, fwd_out);
        push(&cols.rev, rev_out);
        push(&cols.boost_thrust, boost_thrust_out);
        push(&cols.boost_duration, boost_duration);
        push(&cols.boost_attack, boost_attack);
        push(&cols.boost_release, boost_release);
        push(&cols.travel_thrust, travel_thrust_out);
        push(&cols.travel_charge, travel_charge);
        push(&cols.travel_attack, travel_attack);
        push(&cols.travel_release, travel_release);

        components.push(RebalancedComponent {
            record: row.record,
            entries,
        });
    }

    Ok(RebalanceOutcome {
        components,
        columns,
    })
}

/// Stock value as-is, else the mod value renormalized by the group factor,
/// else the mod value raw.
fn stock_or_renormalized(
    record: &JoinedRecord,
    column: &str,
    factor: Option<f64>,
) -> Option<f64> {
    record
        .base_value(column)
        .or_else(|| ratio(record.vro_value(column), factor))
        .or_else(|| record.vro_value(column))
}

fn size_tier_kind(record: &JoinedRecord) -> Option<(SizeClass, String, String)> {
    record
        .identity()
        .map(|identity| (identity.size, identity.tier.clone(), identity.kind.clone()))
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

fn product(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => finite(a * b),
        _ => None,
    }
}

fn ratio(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => finite(a / b),
        _ => None,
    }
}

/// Ascending order with undefined values last.
fn cmp_ascending(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Descending order with undefined values last; stable sorting keeps the
/// first-seen tie-break from the caller's ordering.
fn cmp_descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// For each row, the index of the row in its size class whose boost rank
/// equals the row's travel rank. Ranks are a bijection within each size
/// class, so every row gets exactly one partner (possibly itself).
fn rank_match(rows: &[EngineRow]) -> Vec<usize> {
    let mut partner: Vec<usize> = (0..rows.len()).collect();

    let mut start = 0;
    while start < rows.len() {
        let size = rows[start].size;
        let len = rows[start..].iter().take_while(|r| r.size == size).count();
        let group: Vec<usize> = (start..start + len).collect();

        let travel_ranks = rank_descending(rows, &group, |row| row.eff_travel_pre);
        let boost_ranks = rank_descending(rows, &group, |row| row.eff_boost_pre);

        let mut by_boost_rank = vec![0usize; len];
        for (pos, &index) in group.iter().enumerate() {
            by_boost_rank[boost_ranks[pos] - 1] = index;
        }
        for (pos, &index) in group.iter().enumerate() {
            partner[index] = by_boost_rank[travel_ranks[pos] - 1];
        }

        start += len;
    }
    partner
}

fn rank_descending<F>(rows: &[EngineRow], group: &[usize], value: F) -> Vec<usize>
where
    F: Fn(&EngineRow) -> Option<f64>,
{
    let mut order: Vec<usize> = (0..group.len()).collect();
    order.sort_by(|&a, &b| cmp_descending(value(&rows[group[a]]), value(&rows[group[b]])));
    let mut ranks = vec![0usize; group.len()];
    for (rank, &pos) in order.iter().enumerate() {
        ranks[pos] = rank + 1;
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::super::testutil::record;
    use super::*;
    use crate::collect::SourceTag;

    const FWD: &str = "/macros/macro/properties/thrust/forward";
    const REV: &str = "/macros/macro/properties/thrust/reverse";
    const BTH: &str = "/macros/macro/properties/boost/thrust";
    const BDUR: &str = "/macros/macro/properties/boost/duration";
    const BATK: &str = "/macros/macro/properties/boost/attack";
    const BREL: &str = "/macros/macro/properties/boost/release";
    const TTH: &str = "/macros/macro/properties/travel/thrust";
    const TCH: &str = "/macros/macro/properties/travel/charge";
    const TATK: &str = "/macros/macro/properties/travel/attack";
    const TREL: &str = "/macros/macro/properties/travel/release";

    const TAGS: &[&str] = &["thrust", "boost", "travel"];

    fn engine(tag: SourceTag, basename: &str, stats: [f64; 10]) -> AssetRecord {
        let [fwd, rev, bth, bdur, batk, brel, tth, tch, tatk, trel] = stats;
        record(
            "engine",
            tag,
            basename,
            &[
                (FWD, fwd),
                (REV, rev),
                (BTH, bth),
                (BDUR, bdur),
                (BATK, batk),
                (BREL, brel),
                (TTH, tth),
                (TCH, tch),
                (TATK, tatk),
                (TREL, trel),
            ],
        )
    }

    fn run(records: Vec<AssetRecord>) -> RebalanceOutcome {
        let columns = ColumnMap::build(&records, TAGS);
        rebalance_records(records, columns).unwrap()
    }

    fn by_name<'a>(outcome: &'a RebalanceOutcome, basename: &str) -> &'a RebalancedComponent {
        outcome
            .components
            .iter()
            .find(|component| component.record.vro.basename == basename)
            .unwrap()
    }

    #[test]
    fn test_small_engines_borrow_partner_boost_thrust() {
        // Engine A: strong stock boost (8000 effective), weak travel (6000).
        // Engine B: weak stock boost (5000 effective), strong travel (9000).
        // Travel ranks: B first, A second. Boost ranks: A first, B second.
        // So A pairs with B and B pairs with A.
        let outcome = run(vec![
            engine(
                SourceTag::Base,
                "engine_arg_s_allround_01_mk1_macro.xml",
                [1000.0, 500.0, 8.0, 10.0, 2.0, 1.0, 6.0, 3.0, 4.0, 2.0],
            ),
            engine(
                SourceTag::Vro,
                "engine_arg_s_allround_01_mk1_macro.xml",
                [1000.0, 450.0, 10.0, 12.0, 4.0, 2.0, 4.0, 6.0, 8.0, 4.0],
            ),
            engine(
                SourceTag::Base,
                "engine_arg_s_travel_01_mk1_macro.xml",
                [1000.0, 600.0, 5.0, 8.0, 1.0, 1.0, 9.0, 2.0, 2.0, 2.0],
            ),
            engine(
                SourceTag::Vro,
                "engine_arg_s_travel_01_mk1_macro.xml",
                [2000.0, 700.0, 6.0, 9.0, 3.0, 2.0, 5.0, 4.0, 6.0, 3.0],
            ),
        ]);

        assert_eq!(outcome.components.len(), 2);
        let a = by_name(&outcome, "engine_arg_s_allround_01_mk1_macro.xml");
        let b = by_name(&outcome, "engine_arg_s_travel_01_mk1_macro.xml");

        // Forward thrust stays at the mod value.
        assert_eq!(a.entry(FWD), Some(1000.0));
        assert_eq!(b.entry(FWD), Some(2000.0));

        // Reverse thrust: stock value scaled by the per-kind thrust factor
        // (1.0 for allround, 2.0 for travel).
        assert_eq!(a.entry(REV), Some(500.0));
        assert_eq!(b.entry(REV), Some(1200.0));

        // Boost thrust: stock effective boost over new forward thrust.
        assert_eq!(a.entry(BTH), Some(8.0));
        assert_eq!(b.entry(BTH), Some(2.5));

        // Small hulls: travel thrust borrows the partner's effective boost.
        assert_eq!(a.entry(TTH), Some(5.0)); // B's 5000 / A's 1000
        assert_eq!(b.entry(TTH), Some(4.0)); // A's 8000 / B's 2000

        // Ramps come straight from stock when a counterpart exists.
        assert_eq!(a.entry(BDUR), Some(10.0));
        assert_eq!(b.entry(TCH), Some(2.0));
    }

    #[test]
    fn test_large_hull_travel_stretch_and_softening() {
        let outcome = run(vec![
            engine(
                SourceTag::Base,
                "engine_arg_xl_allround_01_mk1_macro.xml",
                [10000.0, 5000.0, 4.0, 20.0, 8.0, 4.0, 9.0, 10.0, 6.0, 6.0],
            ),
            engine(
                SourceTag::Vro,
                "engine_arg_xl_allround_01_mk1_macro.xml",
                [10000.0, 4000.0, 5.0, 25.0, 9.0, 5.0, 8.0, 12.0, 6.0, 7.0],
            ),
        ]);

        let component = &outcome.components[0];
        // Effective travel 90000, stretched by 5/3, over forward 10000.
        assert_eq!(component.entry(TTH), Some(15.0));
        // arg on XL hulls: duration x1.33, ramps x0.75.
        assert_eq!(component.entry(BDUR), Some(20.0 * 1.33));
        assert_eq!(component.entry(BATK), Some(6.0));
        assert_eq!(component.entry(BREL), Some(3.0));
        // No terran charge trim for argon.
        assert_eq!(component.entry(TCH), Some(10.0));
    }

    #[test]
    fn test_paranid_duration_double_and_terran_charge_trim() {
        let outcome = run(vec![
            engine(
                SourceTag::Base,
                "engine_par_l_allround_01_mk1_macro.xml",
                [8000.0, 4000.0, 4.0, 12.0, 6.0, 4.0, 9.0, 10.0, 6.0, 6.0],
            ),
            engine(
                SourceTag::Vro,
                "engine_par_l_allround_01_mk1_macro.xml",
                [8000.0, 4000.0, 4.0, 12.0, 6.0, 4.0, 9.0, 10.0, 6.0, 6.0],
            ),
            engine(
                SourceTag::Base,
                "engine_ter_l_allround_01_mk1_macro.xml",
                [8000.0, 4000.0, 4.0, 12.0, 6.0, 4.0, 9.0, 8.0, 6.0, 6.0],
            ),
            engine(
                SourceTag::Vro,
                "engine_ter_l_allround_01_mk1_macro.xml",
                [8000.0, 4000.0, 4.0, 12.0, 6.0, 4.0, 9.0, 8.0, 6.0, 6.0],
            ),
        ]);

        let par = by_name(&outcome, "engine_par_l_allround_01_mk1_macro.xml");
        let ter = by_name(&outcome, "engine_ter_l_allround_01_mk1_macro.xml");

        assert_eq!(par.entry(BDUR), Some(24.0));
        assert_eq!(par.entry(TCH), Some(10.0));
        assert_eq!(ter.entry(BDUR), Some(12.0));
        assert_eq!(ter.entry(TCH), Some(6.0));
    }

    #[test]
    fn test_mod_only_engine_falls_back_to_mod_values() {
        let outcome = run(vec![engine(
            SourceTag::Vro,
            "engine_spl_s_combat_01_mk2_macro.xml",
            [1500.0, 700.0, 9.0, 11.0, 3.0, 2.0, 7.0, 5.0, 4.0, 3.0],
        )]);

        let component = &outcome.components[0];
        assert!(component.record.base.is_none());
        assert_eq!(component.entry(FWD), Some(1500.0));
        assert_eq!(component.entry(REV), Some(700.0));
        assert_eq!(component.entry(BTH), Some(9.0));
        assert_eq!(component.entry(BDUR), Some(11.0));
        // Sole engine in its size class pairs with itself, so travel thrust
        // resolves to its own effective boost.
        assert_eq!(component.entry(TTH), Some(9.0));
        assert_eq!(component.entry(TCH), Some(5.0));
    }

    #[test]
    fn test_thrusters_without_travel_stats_are_dropped() {
        // No travel element at all, like the fixed thruster macros.
        let thruster = record(
            "engine",
            SourceTag::Vro,
            "engine_gen_s_thruster_01_mk1_macro.xml",
            &[(FWD, 100.0), (REV, 50.0), (BTH, 2.0)],
        );

        let outcome = run(vec![
            thruster,
            engine(
                SourceTag::Vro,
                "engine_arg_s_allround_01_mk1_macro.xml",
                [1000.0, 450.0, 10.0, 12.0, 4.0, 2.0, 4.0, 6.0, 8.0, 4.0],
            ),
        ]);
        assert_eq!(outcome.components.len(), 1);
        assert_eq!(
            outcome.components[0].record.vro.basename,
            "engine_arg_s_allround_01_mk1_macro.xml"
        );
    }

    #[test]
    fn test_rank_matching_is_a_bijection() {
        // Five engines in one size class, a mix of matched and mod-only
        // records.
        let mut records = Vec::new();
        for (i, (fwd, bth, tth)) in [
            (1000.0, 8.0, 6.0),
            (1100.0, 5.0, 9.0),
            (900.0, 5.0, 7.0),
            (1200.0, 3.0, 2.0),
            (800.0, 7.0, 4.0),
        ]
        .iter()
        .enumerate()
        {
            let basename = format!("engine_arg_s_allround_{i:02}_mk1_macro.xml");
            records.push(engine(
                SourceTag::Vro,
                &basename,
                [*fwd, 400.0, *bth, 10.0, 2.0, 1.0, *tth, 3.0, 4.0, 2.0],
            ));
            if i % 2 == 0 {
                records.push(engine(
                    SourceTag::Base,
                    &basename,
                    [*fwd, 420.0, *bth + 1.0, 9.0, 2.0, 1.0, *tth + 1.0, 3.0, 4.0, 2.0],
                ));
            }
        }

        let outcome = run(records);
        assert_eq!(outcome.components.len(), 5);
        // Every component got a full set of travel values through exactly
        // one ranked partner.
        for component in &outcome.components {
            assert!(component.entry(TTH).is_some());
        }
    }
}
