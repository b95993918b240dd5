//! CSV export of the audited weighting table.

use anyhow::{Context, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use yarding::report::audit::fixed;
use yarding::report::AuditedTable;

/// One row per area plus a `Total` row; decimal columns keep their printed text.
pub fn audited_frame(table: &AuditedTable) -> PolarsResult<DataFrame> {
    let mut names: Vec<String> = table.rows.iter().map(|r| r.name.clone()).collect();
    let mut cells: Vec<u64> = table.rows.iter().map(|r| r.cells).collect();
    let mut hectares: Vec<String> = table.rows.iter().map(|r| fixed(r.hectares, 2)).collect();
    let mut ratios: Vec<String> = table.rows.iter().map(|r| fixed(r.ratio, 2)).collect();
    let mut distances: Vec<String> = table.rows.iter().map(|r| fixed(r.distance, 0)).collect();

    names.push("Total".to_string());
    cells.push(table.total_cells);
    hectares.push(fixed(table.total_hectares, 2));
    ratios.push("1.00".to_string());
    distances.push(fixed(table.final_distance, 0));

    df!(
        "area" => names,
        "cells" => cells,
        "hectares" => hectares,
        "ratio" => ratios,
        "distance_m" => distances,
    )
}

pub fn write_csv(table: &AuditedTable, path: &Path) -> Result<()> {
    let mut df = audited_frame(table)?;
    let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(rows = df.height(), path = %path.display(), "table_csv");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use yarding::report::AuditRow;

    fn sample() -> AuditedTable {
        let d = |s: &str| s.parse().unwrap();
        AuditedTable {
            rows: vec![
                AuditRow {
                    name: "A".to_string(),
                    cells: 100,
                    hectares: d("6.25"),
                    ratio: d("0.25"),
                    distance: d("120"),
                },
                AuditRow {
                    name: "B".to_string(),
                    cells: 300,
                    hectares: d("18.75"),
                    ratio: d("0.75"),
                    distance: d("81"),
                },
            ],
            total_cells: 400,
            total_hectares: d("25.00"),
            weighted: d("90.75"),
            weighted_display: d("90.7"),
            final_distance: d("91"),
        }
    }

    #[test]
    fn frame_has_total_row() {
        let df = audited_frame(&sample()).unwrap();
        assert_eq!(df.shape(), (3, 5));
        let area = df.column("area").unwrap().str().unwrap();
        assert_eq!(area.get(2), Some("Total"));
        let ratio = df.column("ratio").unwrap().str().unwrap();
        assert_eq!(ratio.get(1), Some("0.75"));
    }

    #[test]
    fn csv_has_header_rows_and_total() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.csv");
        write_csv(&sample(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("area,cells,hectares,ratio,distance_m"));
        assert_eq!(lines.next(), Some("A,100,6.25,0.25,120"));
        assert_eq!(text.lines().last(), Some("Total,400,25.00,1.00,91"));
    }
}
