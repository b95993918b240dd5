//! Audited path: exact decimal arithmetic for the printed record.
//!
//! Rules
//! - hectares = N · k² / 10000, two decimals, half-up.
//! - ratio = hectares / Σhectares, two decimals, half-up; the last ratio absorbs
//!   `1.00 − Σratio` so the printed column sums to exactly 1.00.
//! - Per-area distance: half-up to an integer.
//! - Weighted distance = Σ distance_i · ratio_i from the rounded values above;
//!   printed once truncated to one decimal and once half-up to an integer.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::distance::AreaResult;

#[inline]
pub fn round_half_up(d: Decimal, dp: u32) -> Decimal {
    d.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

#[inline]
pub fn truncate(d: Decimal, dp: u32) -> Decimal {
    d.round_dp_with_strategy(dp, RoundingStrategy::ToZero)
}

/// Shortest decimal for `x`; non-finite values map to `None`.
#[inline]
pub fn decimal(x: f64) -> Option<Decimal> {
    Decimal::from_f64(x)
}

/// Fixed-point text with exactly `dp` decimals.
pub fn fixed(d: Decimal, dp: u32) -> String {
    let mut d = round_half_up(d, dp);
    d.rescale(dp);
    d.to_string()
}

#[derive(Clone, Debug, PartialEq)]
pub struct AuditRow {
    pub name: String,
    pub cells: u64,
    pub hectares: Decimal,
    /// Two decimals; the last row carries the remainder correction.
    pub ratio: Decimal,
    /// Integer, half-up.
    pub distance: Decimal,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AuditedTable {
    pub rows: Vec<AuditRow>,
    pub total_cells: u64,
    pub total_hectares: Decimal,
    /// Σ distance_i · ratio_i, unrounded.
    pub weighted: Decimal,
    /// `weighted` truncated to one decimal.
    pub weighted_display: Decimal,
    /// `weighted` half-up to an integer.
    pub final_distance: Decimal,
}

/// `None` for no rows, a non-finite input, or zero total hectares.
///
/// Ratios are rounded half-up to 2 decimals and the last row takes
/// `1.00 − Σ ratio`, so the printed column always sums to 1.00. When
/// several rows round up together the last ratio can drop below zero;
/// it is kept and printed as is.
pub fn audit<'a>(
    rows: impl IntoIterator<Item = (&'a str, &'a AreaResult)>,
    k_value: f64,
) -> Option<AuditedTable> {
    let k = decimal(k_value)?;
    let ten_thousand = Decimal::from(10_000u32);
    let mut out: Vec<AuditRow> = Vec::new();
    for (name, res) in rows {
        let hectares = round_half_up(Decimal::from(res.total_cells) * k * k / ten_thousand, 2);
        out.push(AuditRow {
            name: name.to_string(),
            cells: res.total_cells,
            hectares,
            ratio: Decimal::ZERO,
            distance: round_half_up(decimal(res.final_distance)?, 0),
        });
    }
    let total_hectares: Decimal = out.iter().map(|r| r.hectares).sum();
    if out.is_empty() || total_hectares.is_zero() {
        return None;
    }

    for row in &mut out {
        row.ratio = round_half_up(row.hectares / total_hectares, 2);
    }
    let ratio_sum: Decimal = out.iter().map(|r| r.ratio).sum();
    if let Some(last) = out.last_mut() {
        last.ratio += Decimal::ONE - ratio_sum;
    }

    let weighted: Decimal = out.iter().map(|r| r.distance * r.ratio).sum();
    Some(AuditedTable {
        total_cells: out.iter().map(|r| r.cells).sum(),
        total_hectares,
        weighted,
        weighted_display: truncate(weighted, 1),
        final_distance: round_half_up(weighted, 0),
        rows: out,
    })
}
