use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use geo::{Area as _, Centroid, InteriorPoint};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;
use yarding::project::SkipReason;
use yarding::transform::determine_layout;

mod project_file;
mod provenance;
mod table;

use project_file::ProjectFile;
use provenance::{ensure_parent, write_sidecar, Payload};

#[derive(Parser)]
#[command(name = "yarding-cli")]
#[command(about = "Average yarding distance on a fixed cell grid")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Run the full calculation and write the report blocks as JSON
    Calc {
        #[arg(long)]
        project: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Also write the audited weighting table as CSV
        #[arg(long)]
        table: Option<PathBuf>,
    },
    /// Print the ordered sub-areas produced by the split lines
    Partition {
        #[arg(long)]
        project: PathBuf,
    },
    /// Print the page preset and rotation chosen for the loaded geometry
    Layout {
        #[arg(long)]
        project: PathBuf,
    },
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Calc {
            project,
            out,
            table,
        } => calc(&project, &out, table.as_deref()),
        Action::Partition { project } => partition(&project),
        Action::Layout { project } => layout(&project),
    }
}

fn calc(project_path: &Path, out: &Path, table_path: Option<&Path>) -> Result<()> {
    tracing::info!(project = %project_path.display(), out = %out.display(), "calc");
    let file = ProjectFile::load(project_path)?;
    let mut project = file.to_project();
    file.configure(&mut project)?;

    let run = project.run_calculation()?;
    for skipped in &run.skipped {
        match &skipped.reason {
            SkipReason::NoCells => tracing::warn!(area = skipped.id, "no cells; area skipped"),
            SkipReason::Configuration(e) => tracing::warn!(area = skipped.id, error = %e, "area skipped"),
        }
    }
    if let Some(summary) = &run.summary {
        tracing::info!(
            total_cells = summary.total_cells,
            final_distance = summary.final_distance,
            "operational_summary"
        );
    }

    let report = project.report(&file.subtitle);
    let printed = report.printed_distance().map(|d| d.to_string());
    let doc = json!({
        "subtitle": file.subtitle,
        "printed_distance_m": printed,
        "operational_distance_m": run.summary.as_ref().map(|s| s.final_distance),
        "blocks": report.blocks,
    });
    ensure_parent(out)?;
    fs::write(out, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", out.display()))?;

    let mut payload = Payload::new(json!({
        "project": project_path.to_string_lossy(),
        "k_value": project.k_value(),
        "page": project.page(),
        "rotation_deg": project.view().rotation_deg,
        "pan": [project.view().pan.x, project.view().pan.y],
        "areas": project.areas().len(),
        "skipped": run.skipped.len(),
    }));
    if let Some(path) = table_path {
        match &report.audited {
            Some(t) => {
                ensure_parent(path)?;
                table::write_csv(t, path)?;
                payload.extra_outputs.push(path.to_path_buf());
            }
            None => tracing::warn!("no audited table (no cells or zero hectares); CSV not written"),
        }
    }
    let prov = write_sidecar(out, payload)?;
    tracing::info!(distance = ?printed, provenance = %prov.display(), "report_written");
    Ok(())
}

fn partition(project_path: &Path) -> Result<()> {
    tracing::info!(project = %project_path.display(), "partition");
    let file = ProjectFile::load(project_path)?;
    let mut project = file.to_project();
    for l in file.split_lines() {
        project.add_split_line(l);
    }
    let areas = project.prepare_sub_areas()?;
    let rows: Vec<_> = areas
        .iter()
        .map(|a| {
            let c = a.geometry.centroid().map(|p| [p.x(), p.y()]);
            let inside = a.geometry.interior_point().map(|p| [p.x(), p.y()]);
            json!({
                "id": a.id,
                "name": a.name,
                "centroid": c,
                "interior_point": inside,
                "area_m2": a.geometry.unsigned_area(),
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn layout(project_path: &Path) -> Result<()> {
    tracing::info!(project = %project_path.display(), "layout");
    let file = ProjectFile::load(project_path)?;
    let project = file.to_project();
    let geom = project
        .all_layers_geometry()
        .context("project has no polygon geometry")?;
    let chosen = determine_layout(&geom, project.k_value());
    let footprint = project
        .combined_calculable_geometry()
        .and_then(|g| project.footprint(&g));
    let obj = json!({
        "page": chosen.page,
        "rotation_deg": chosen.rotation_deg,
        "fits": chosen.fits,
        "footprint_cells": footprint.map(|f| f.cells),
        "footprint_ha": footprint.map(|f| f.hectares),
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
