use anyhow::{Result, bail};

use taper_core::models::Settings;
use taper_core::service::TaperService;

use super::helpers::parse_date;

fn show_value(value: Option<f64>, unit: &str) -> String {
    value.map_or("-".to_string(), |v| format!("{v:.1} {unit}"))
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_settings_set(
    svc: &TaperService,
    start_weight: Option<f64>,
    goal_weight: Option<f64>,
    start_date: Option<String>,
    goal_date: Option<String>,
    height: Option<f64>,
    json: bool,
) -> Result<()> {
    if start_weight.is_none()
        && goal_weight.is_none()
        && start_date.is_none()
        && goal_date.is_none()
        && height.is_none()
    {
        bail!(
            "Nothing to set. Provide at least one of --start-weight, --goal-weight, --start-date, --goal-date, or --height"
        );
    }

    let update = Settings {
        start_weight_kg: start_weight,
        goal_weight_kg: goal_weight,
        start_date: start_date.map(|d| parse_date(Some(d))).transpose()?,
        goal_date: goal_date.map(|d| parse_date(Some(d))).transpose()?,
        height_cm: height,
    };

    // Saving merges over what is already stored; untouched fields survive
    let merged = svc.save_settings(&update)?;

    if let (Some(start), Some(goal)) = (merged.start_date, merged.goal_date) {
        if start > goal {
            eprintln!("Warning: start date {start} is after goal date {goal}; charts will be empty");
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&merged)?);
    } else {
        println!("Settings saved");
        print_settings(&merged);
    }

    Ok(())
}

pub(crate) fn cmd_settings_show(svc: &TaperService, json: bool) -> Result<()> {
    let settings = svc.get_settings()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&settings)?);
    } else if settings.is_empty() {
        eprintln!("No settings stored. Use `taper settings set` to configure your plan.");
    } else {
        print_settings(&settings);
    }

    Ok(())
}

fn print_settings(settings: &Settings) {
    println!(
        "  Start weight: {}",
        show_value(settings.start_weight_kg, "kg")
    );
    println!(
        "  Goal weight:  {}",
        show_value(settings.goal_weight_kg, "kg")
    );
    println!(
        "  Start date:   {}",
        settings
            .start_date
            .map_or("-".to_string(), |d| d.format("%Y-%m-%d").to_string())
    );
    println!(
        "  Goal date:    {}",
        settings
            .goal_date
            .map_or("-".to_string(), |d| d.format("%Y-%m-%d").to_string())
    );
    println!("  Height:       {}", show_value(settings.height_cm, "cm"));
}
