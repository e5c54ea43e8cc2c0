//! CSV summaries of rebalanced components.
//!
//! One row per output component with the stock, mod-variant, and computed
//! value for every mapped attribute, for eyeballing a run before shipping
//! the patches.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use x4vro::rebalance::RebalanceOutcome;

pub fn write_summary(path: &Path, outcome: &RebalanceOutcome) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating summary directory {}", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating summary {}", path.display()))?;

    let columns: Vec<(String, String)> = outcome
        .columns
        .iter()
        .map(|(name, column)| (name.to_string(), column.to_string()))
        .collect();

    let mut header = vec![
        "source".to_string(),
        "file".to_string(),
        "faction".to_string(),
        "size".to_string(),
        "kind".to_string(),
        "tier".to_string(),
    ];
    for (name, _) in &columns {
        header.push(format!("{name}_base"));
        header.push(format!("{name}_vro"));
        header.push(format!("{name}_new"));
    }
    writer.write_record(&header)?;

    for component in &outcome.components {
        let record = &component.record;
        let identity = record.identity();

        let mut row = vec![
            record.vro.source_name.clone(),
            record.vro.basename.clone(),
            identity.map(|i| i.faction.clone()).unwrap_or_default(),
            identity.map(|i| i.size.to_string()).unwrap_or_default(),
            identity.map(|i| i.kind.clone()).unwrap_or_default(),
            identity.map(|i| i.tier.clone()).unwrap_or_default(),
        ];
        for (_, column) in &columns {
            row.push(fmt_value(record.base_value(column)));
            row.push(fmt_value(record.vro_value(column)));
            row.push(fmt_value(component.entry(column)));
        }
        writer.write_record(&row)?;
    }

    writer
        .flush()
        .with_context(|| format!("writing summary {}", path.display()))
}

fn fmt_value(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
