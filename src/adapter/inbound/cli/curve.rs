//! Handlers for `lpforge curve`.
//!
//! Curves are pure functions of their inputs, so nothing here touches the
//! chain.

use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::CurvePreviewArgs;
use crate::adapter::inbound::cli::output;
use crate::domain::curve::{CurveConfig, CurveGenerator};
use crate::domain::instance::{CurveSource, InstanceSpec};
use crate::error::{Error, Result};

#[derive(Tabled)]
struct BucketRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Fee (bps)")]
    fee: i16,
    #[tabled(rename = "Weight (bps)")]
    weight: u16,
}

#[derive(Tabled)]
struct TierRow {
    #[tabled(rename = "Tier")]
    name: String,
    #[tabled(rename = "Tag")]
    tag: String,
    #[tabled(rename = "Curve")]
    source: String,
    #[tabled(rename = "Buckets")]
    buckets: usize,
    #[tabled(rename = "Target (bps)")]
    target: u16,
    #[tabled(rename = "Fee range (bps)")]
    range: String,
}

/// Print the curve described by explicit generator arguments.
///
/// # Errors
///
/// Returns [`Error::Curve`] for invalid generator parameters.
pub fn preview_generated(args: &CurvePreviewArgs, start: u32) -> Result<()> {
    let end = args.end.unwrap_or_default();
    let buckets = args.buckets.unwrap_or_default();
    let curve = CurveGenerator::generate(args.spacing.into(), start, end, buckets, args.side.into())
        .map_err(Error::Curve)?;

    if output::is_json() {
        output::result(json!({
            "command": "curve.preview",
            "curve": curve,
        }));
        return Ok(());
    }

    output::section("Generated curve");
    output::field("Buckets", curve.len());
    output::field("Target", format!("{} bps", curve.utilization_target_bps()));
    let rows: Vec<_> = curve
        .fee_rates()
        .iter()
        .zip(curve.distribution_rates())
        .enumerate()
        .map(|(index, (fee, weight))| BucketRow {
            index,
            fee: *fee,
            weight: *weight,
        })
        .collect();
    output::table(&Table::new(rows).to_string());
    Ok(())
}

/// Print a one-line overview of every configured tier's curve.
///
/// # Errors
///
/// Returns [`Error::Curve`] if a tier's curve cannot be built.
pub fn preview_tiers(tiers: &[InstanceSpec]) -> Result<()> {
    let curves = tiers
        .iter()
        .map(|tier| tier.curve_config().map(|curve| (tier, curve)))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::Curve)?;

    if output::is_json() {
        let tiers: Vec<_> = curves
            .iter()
            .map(|(tier, curve)| json!({ "name": tier.name, "tag": tier.tag, "curve": curve }))
            .collect();
        output::result(json!({
            "command": "curve.preview",
            "tiers": tiers,
        }));
        return Ok(());
    }

    output::section("Configured tiers");
    let rows: Vec<_> = curves
        .iter()
        .map(|(tier, curve)| TierRow {
            name: tier.name.clone(),
            tag: tier.tag.clone(),
            source: source_label(&tier.curve),
            buckets: curve.len(),
            target: curve.utilization_target_bps(),
            range: fee_range(curve),
        })
        .collect();
    output::table(&Table::new(rows).to_string());
    output::hint("pass --start, --end and --buckets to preview a generated curve");
    Ok(())
}

fn source_label(source: &CurveSource) -> String {
    match source {
        CurveSource::Standard { side } => format!("standard ({side})"),
        CurveSource::Generated {
            spacing,
            start_level,
            end_level,
            side,
            ..
        } => format!("{spacing} {start_level}-{end_level} ({side})"),
    }
}

fn fee_range(curve: &CurveConfig) -> String {
    match (curve.fee_rates().first(), curve.fee_rates().last()) {
        (Some(first), Some(last)) => format!("{first} .. {last}"),
        _ => String::new(),
    }
}
