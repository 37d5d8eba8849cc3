use anyhow::{Result, bail};
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use taper_core::models::UpdateMeasurement;
use taper_core::service::TaperService;

use super::helpers::{
    LBS_PER_KG, format_signed, json_error, parse_date, parse_waist_cm, parse_weight_kg,
};

pub(crate) fn cmd_log(
    svc: &TaperService,
    weight: &str,
    waist: Option<&String>,
    date: Option<String>,
    notes: Option<String>,
    json: bool,
) -> Result<()> {
    let weight_kg = parse_weight_kg(weight)?;
    let waist_cm = waist.map(|w| parse_waist_cm(w)).transpose()?;
    let date = parse_date(date)?;

    let entry = svc.log_measurement(date, weight_kg, waist_cm, notes)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        let lbs = entry.weight_kg * LBS_PER_KG;
        println!(
            "Logged {:.1} kg ({:.1} lbs) for {}",
            entry.weight_kg,
            lbs,
            entry.date.format("%Y-%m-%d")
        );
        if let Some(waist) = entry.waist_cm {
            println!("  Waist: {waist:.1} cm");
        }
        if let Some(bmi) = entry.bmi {
            println!("  BMI: {bmi:.1}");
        }
        if let Some(ref n) = entry.notes {
            println!("  Notes: {n}");
        }
    }

    Ok(())
}

pub(crate) fn cmd_show(svc: &TaperService, date: Option<String>, json: bool) -> Result<()> {
    let date = parse_date(date)?;
    let entry = svc.get_measurement(date)?;

    if let Some(e) = entry {
        if json {
            println!("{}", serde_json::to_string_pretty(&e)?);
        } else {
            let lbs = e.weight_kg * LBS_PER_KG;
            println!(
                "{}: {:.1} kg ({:.1} lbs)",
                e.date.format("%Y-%m-%d"),
                e.weight_kg,
                lbs
            );
            if let Some(waist) = e.waist_cm {
                println!("  Waist: {waist:.1} cm");
            }
            if let Some(bmi) = e.bmi {
                println!("  BMI: {bmi:.1}");
            }
            if let Some(ref n) = e.notes {
                println!("  Notes: {n}");
            }
        }
    } else {
        let date_str = date.format("%Y-%m-%d");
        if json {
            println!("{}", json_error(&format!("No measurement for {date_str}")));
        } else {
            eprintln!("No measurement for {date_str}");
        }
        process::exit(2);
    }

    Ok(())
}

pub(crate) fn cmd_history(svc: &TaperService, days: Option<u32>, json: bool) -> Result<()> {
    let entries = svc.get_history(days.map(i64::from))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if entries.is_empty() {
        eprintln!("No measurements found. Use `taper log` to record one.");
    } else {
        #[derive(Tabled)]
        struct MeasurementRow {
            #[tabled(rename = "ID")]
            id: i64,
            #[tabled(rename = "Date")]
            date: String,
            #[tabled(rename = "Weight (kg)")]
            kg: String,
            #[tabled(rename = "Waist (cm)")]
            waist: String,
            #[tabled(rename = "BMI")]
            bmi: String,
            #[tabled(rename = "Notes")]
            notes: String,
        }

        let rows: Vec<MeasurementRow> = entries
            .iter()
            .map(|e| MeasurementRow {
                id: e.id,
                date: e.date.format("%Y-%m-%d").to_string(),
                kg: format!("{:.1}", e.weight_kg),
                waist: e.waist_cm.map_or("-".into(), |v| format!("{v:.1}")),
                bmi: e.bmi.map_or("-".into(), |v| format!("{v:.1}")),
                notes: e.notes.clone().unwrap_or_default(),
            })
            .collect();

        let table = Table::new(&rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(2..5)).with(Alignment::right()))
            .to_string();
        println!("{table}");

        // Oldest-to-newest trend across the listed entries
        if entries.len() > 1 {
            let newest = entries.first().map(|e| e.weight_kg);
            let oldest = entries.last().map(|e| e.weight_kg);
            if let (Some(newest), Some(oldest)) = (newest, oldest) {
                let delta = format_signed(newest - oldest);
                println!("Change over shown period: {delta} kg");
            }
        }
    }

    Ok(())
}

pub(crate) fn cmd_update(
    svc: &TaperService,
    id: i64,
    weight: Option<&String>,
    waist: Option<&String>,
    date: Option<String>,
    notes: Option<String>,
    json: bool,
) -> Result<()> {
    if weight.is_none() && waist.is_none() && date.is_none() && notes.is_none() {
        bail!("Nothing to update. Provide at least one of --weight, --waist, --date, or --notes");
    }

    let update = UpdateMeasurement {
        date: date.map(|d| parse_date(Some(d))).transpose()?,
        weight_kg: weight.map(|w| parse_weight_kg(w)).transpose()?,
        waist_cm: waist.map(|w| parse_waist_cm(w).map(Some)).transpose()?,
        bmi: None,
        notes: notes.map(Some),
    };

    if let Ok(entry) = svc.update_measurement(id, update) {
        if json {
            println!("{}", serde_json::to_string_pretty(&entry)?);
        } else {
            println!(
                "Updated measurement {id}: {:.1} kg on {}",
                entry.weight_kg,
                entry.date.format("%Y-%m-%d")
            );
        }
        Ok(())
    } else {
        if json {
            println!("{}", json_error(&format!("Measurement {id} not found")));
        } else {
            eprintln!("Measurement {id} not found");
        }
        process::exit(2);
    }
}

pub(crate) fn cmd_delete(svc: &TaperService, id: i64, json: bool) -> Result<()> {
    if svc.delete_measurement(id)? {
        if json {
            println!("{}", serde_json::json!({ "deleted": id }));
        } else {
            println!("Deleted measurement {id}");
        }
        Ok(())
    } else {
        if json {
            println!("{}", json_error(&format!("Measurement {id} not found")));
        } else {
            eprintln!("Measurement {id} not found");
        }
        process::exit(2);
    }
}
