//! Operational path: plain floating-point weighted average over unrounded results.

use crate::distance::AreaResult;

/// Combined figure over every area with cells.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    /// Σ(final_i · N_i) / Σ N_i.
    pub final_distance: f64,
    pub total_cells: u64,
    pub product_v: u64,
    pub product_h: u64,
    /// Per-row cell counts summed over areas.
    pub row_counts: Vec<u64>,
    pub col_counts: Vec<u64>,
}

fn add_counts(acc: &mut Vec<u64>, counts: &[u64]) {
    if acc.len() < counts.len() {
        acc.resize(counts.len(), 0);
    }
    for (a, c) in acc.iter_mut().zip(counts) {
        *a += c;
    }
}

/// `None` when no result has cells.
pub fn summarize<'a>(results: impl IntoIterator<Item = &'a AreaResult>) -> Option<Summary> {
    let mut weighted = 0.0;
    let mut out = Summary {
        final_distance: 0.0,
        total_cells: 0,
        product_v: 0,
        product_h: 0,
        row_counts: Vec::new(),
        col_counts: Vec::new(),
    };
    for res in results.into_iter().filter(|r| r.total_cells > 0) {
        weighted += res.final_distance * res.total_cells as f64;
        out.total_cells += res.total_cells;
        out.product_v += res.product_v;
        out.product_h += res.product_h;
        add_counts(&mut out.row_counts, &res.row_counts);
        add_counts(&mut out.col_counts, &res.col_counts);
    }
    if out.total_cells == 0 {
        return None;
    }
    out.final_distance = weighted / out.total_cells as f64;
    Some(out)
}
