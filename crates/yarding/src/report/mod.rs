//! Aggregation and the audited report.
//!
//! Purpose
//! - Combine per-area results into one figure, and describe the printable record
//!   as a flat list of typed blocks that any renderer (screen, PDF, spreadsheet)
//!   consumes as-is.
//!
//! Two numeric paths
//! - `aggregate::summarize`: floating-point weighted average of unrounded results
//!   (operational use).
//! - `audit::audit`: exact decimals, half-up rounding, truncated one-decimal
//!   intermediate, remainder-corrected ratios (printed record).
//!   The two may differ; the report prints the audited figure.
//!
//! Code cross-refs: `crate::distance::AreaResult`, `crate::project::Area`

mod aggregate;
pub mod audit;

pub use aggregate::{summarize, Summary};
pub use audit::{audit, AuditRow, AuditedTable};

use rust_decimal::Decimal;
use serde::Serialize;

use crate::distance::AreaResult;
use crate::project::Area;
use audit::{decimal, fixed, round_half_up, truncate};

/// One renderable unit of the report; text is final, renderers only lay it out.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReportBlock {
    Title {
        text: String,
    },
    Spacer {
        size: u32,
    },
    SectionHeader {
        text: String,
    },
    FormulaLine {
        text: String,
    },
    /// A formula whose result needs both a one-decimal and a rounded value.
    ComplexFormulaLine {
        formula: String,
        result_part1: String,
        result_part2: String,
    },
    Note {
        text: String,
    },
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
        total_row: Vec<String>,
    },
    FinalCalculation {
        prefix: String,
        line1: String,
        line2: String,
        line3: String,
    },
    FinalResult {
        text: String,
    },
}

/// Blocks plus the numbers they were rendered from.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub blocks: Vec<ReportBlock>,
    pub summary: Option<Summary>,
    pub audited: Option<AuditedTable>,
}

impl Report {
    /// The figure printed in the final result line.
    pub fn printed_distance(&self) -> Option<Decimal> {
        match (&self.audited, &self.summary) {
            (Some(a), _) => Some(a.final_distance),
            (None, Some(s)) => decimal(s.final_distance).map(|d| round_half_up(d, 0)),
            (None, None) => None,
        }
    }
}

const DISTANCE_LABEL: &str = "Average yarding distance";
const L_NOTE: &str = "* L: horizontal distance from the area entrance to the landing";
const CELL_NOTE: &str = "* Area is derived from the number of cells inside each yarding area.";

fn spacer(size: u32) -> ReportBlock {
    ReportBlock::Spacer { size }
}

fn formula_block(name: &str, res: &AreaResult, k_value: f64) -> ReportBlock {
    let external = res.mode.is_external();
    let mut formula = format!("{name}: {DISTANCE_LABEL} = ((ΣV+ΣH)÷N×K)");
    if external {
        formula.push_str(" + L");
    }
    formula.push_str(&format!(
        " = (({}+{})÷{}×{})",
        res.product_v, res.product_h, res.total_cells, k_value
    ));
    if external {
        formula.push_str(&format!(" + {}", res.additional_distance()));
    }

    let d = res.final_distance;
    match decimal(d) {
        Some(dd) if d.fract() != 0.0 => ReportBlock::ComplexFormulaLine {
            formula,
            result_part1: format!(" = {} m", fixed(truncate(dd, 1), 1)),
            result_part2: format!("≒ {} m", fixed(dd, 0)),
        },
        _ => ReportBlock::FormulaLine {
            text: format!("{formula} = {d} m"),
        },
    }
}

/// Build the summary report from every area that has a result.
pub fn build_report(subtitle: &str, areas: &[Area], k_value: f64) -> Report {
    let computed: Vec<(&str, &AreaResult)> = areas
        .iter()
        .filter_map(|a| a.result.as_ref().map(|r| (a.name.as_str(), r)))
        .collect();
    let summary = summarize(computed.iter().map(|(_, r)| *r));
    if summary.is_none() {
        return Report {
            blocks: Vec::new(),
            summary,
            audited: None,
        };
    }
    let audited = audit(computed.iter().copied(), k_value);

    let mut blocks = vec![
        ReportBlock::Title {
            text: format!("{subtitle} {DISTANCE_LABEL} Calculation (Summary)")
                .trim()
                .to_string(),
        },
        spacer(20),
        ReportBlock::SectionHeader {
            text: "[Results by area]".to_string(),
        },
    ];
    blocks.extend(computed.iter().map(|(name, res)| formula_block(name, res, k_value)));
    if computed.iter().any(|(_, r)| r.mode.is_external()) {
        blocks.push(ReportBlock::Note {
            text: L_NOTE.to_string(),
        });
    }
    blocks.push(spacer(20));

    blocks.push(ReportBlock::SectionHeader {
        text: "[Weighting by area]".to_string(),
    });
    blocks.push(ReportBlock::Note {
        text: CELL_NOTE.to_string(),
    });
    blocks.push(spacer(10));

    let headers = ["Area", "Cells", "Area\n(ha)", "Area ratio", "Average yarding distance\n(m)"]
        .map(String::from)
        .to_vec();
    let (rows, total_row) = match &audited {
        Some(t) => (
            t.rows
                .iter()
                .map(|r| {
                    vec![
                        r.name.clone(),
                        r.cells.to_string(),
                        fixed(r.hectares, 2),
                        fixed(r.ratio, 2),
                        fixed(r.distance, 0),
                    ]
                })
                .collect(),
            vec![
                "Total".to_string(),
                t.total_cells.to_string(),
                fixed(t.total_hectares, 2),
                fixed(Decimal::ONE, 2),
                String::new(),
            ],
        ),
        None => (
            Vec::new(),
            vec![
                "Total".to_string(),
                "0".to_string(),
                fixed(Decimal::ZERO, 2),
                fixed(Decimal::ZERO, 2),
                String::new(),
            ],
        ),
    };
    blocks.push(ReportBlock::Table {
        headers,
        rows,
        total_row,
    });
    blocks.push(spacer(20));

    if let Some(t) = &audited {
        let line1 = t
            .rows
            .iter()
            .map(|r| format!("({}m × {})", fixed(r.distance, 0), fixed(r.ratio, 2)))
            .collect::<Vec<_>>()
            .join(" + ");
        blocks.push(ReportBlock::FinalCalculation {
            prefix: DISTANCE_LABEL.to_string(),
            line1,
            line2: format!("{} m", fixed(t.weighted_display, 1)),
            line3: format!("{} m", fixed(t.final_distance, 0)),
        });
    }
    blocks.push(spacer(20));

    let mut report = Report {
        blocks,
        summary,
        audited,
    };
    if let Some(d) = report.printed_distance() {
        report.blocks.push(ReportBlock::FinalResult {
            text: format!("{DISTANCE_LABEL} = {} m", fixed(d, 0)),
        });
    }
    report
}
