use std::path::Path;

use anyhow::{Context, Result};

use taper_core::models::ExportData;
use taper_core::service::TaperService;

pub(crate) fn cmd_export(svc: &TaperService, output: Option<&Path>) -> Result<()> {
    let data = svc.export_all()?;
    let json = serde_json::to_string_pretty(&data)?;

    match output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            let measurements = data.measurements.len();
            let goals = data.goals.len();
            eprintln!(
                "Exported {measurements} measurements and {goals} goals to {}",
                path.display()
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}

pub(crate) fn cmd_import(svc: &TaperService, file: &Path, json: bool) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let data: ExportData =
        serde_json::from_str(&raw).with_context(|| format!("Invalid export file: {}", file.display()))?;

    let summary = svc.import_all(&data)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Measurements: {} added, {} updated, {} skipped",
            summary.measurements_added, summary.measurements_updated, summary.measurements_skipped
        );
        println!(
            "Goals:        {} added, {} updated, {} skipped",
            summary.goals_added, summary.goals_updated, summary.goals_skipped
        );
    }

    Ok(())
}
