use anyhow::Result;
use serde::Serialize;
use std::process;

use taper_core::models::{Goal, Overview};
use taper_core::service::TaperService;
use taper_core::timeline::ChartView;

use super::helpers::{LBS_PER_KG, format_signed, progress_gauge, sparkline};

#[derive(Clone, Copy, clap::ValueEnum)]
pub(crate) enum ChartMetric {
    Weight,
    Waist,
}

pub(crate) fn cmd_overview(svc: &TaperService, json: bool) -> Result<()> {
    let overview = svc.overview()?;
    let goals = svc.list_goals()?;

    if json {
        #[derive(Serialize)]
        struct OverviewOut {
            #[serde(flatten)]
            overview: Overview,
            goals: Vec<Goal>,
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&OverviewOut { overview, goals })?
        );
        return Ok(());
    }

    if overview.latest.is_none() && goals.is_empty() {
        eprintln!("Nothing to show yet. Use `taper log` and `taper goal add` to get started.");
        process::exit(2);
    }

    if let Some(latest) = &overview.latest {
        let lbs = latest.weight_kg * LBS_PER_KG;
        let date = latest.date.format("%Y-%m-%d");
        println!("=== {date} ===\n");
        print!("  Weight: {:.1} kg ({lbs:.1} lbs)", latest.weight_kg);
        if let Some(delta) = overview.weight_delta_kg {
            print!("   vs previous: {} kg", format_signed(delta));
        }
        println!();

        match latest.waist_cm {
            Some(waist) => {
                print!("  Waist:  {waist:.1} cm");
                if let Some(delta) = overview.waist_delta_cm {
                    print!("           vs previous: {} cm", format_signed(delta));
                }
                println!();
            }
            None => println!("  Waist:  -"),
        }

        match &overview.bmi {
            Some(panel) => {
                let current = panel.current;
                let label = panel.category.label();
                println!("  BMI:    {current:.1} ({label})");
                print!(
                    "          start {:.1} ({})",
                    panel.start,
                    format_signed(panel.delta_start)
                );
                if let (Some(prev), Some(delta)) = (panel.previous, panel.delta_previous) {
                    print!("   previous {prev:.1} ({})", format_signed(delta));
                }
                println!();
            }
            None => println!("  BMI:    - (set your height to track BMI)"),
        }
    } else {
        eprintln!("No measurements yet. Use `taper log` to record one.");
    }

    if !goals.is_empty() {
        println!("\nWeekly goals (week of {}):", goals[0].week_start);
        for goal in &goals {
            let gauge = progress_gauge(goal.completed, goal.frequency, 10);
            let id = goal.id;
            let activity = &goal.activity;
            println!("  [{id}] {activity:<20} {gauge}");
        }
    }

    Ok(())
}

pub(crate) fn cmd_chart(svc: &TaperService, metric: ChartMetric, json: bool) -> Result<()> {
    let view = match metric {
        ChartMetric::Weight => svc.weight_chart()?,
        ChartMetric::Waist => svc.waist_chart()?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    let (label, unit) = match metric {
        ChartMetric::Weight => ("Weight", "kg"),
        ChartMetric::Waist => ("Waist", "cm"),
    };

    if view.series.is_empty() {
        eprintln!("No chart interval. Set --start-date and --goal-date via `taper settings set`.");
        process::exit(2);
    }
    let Some(bounds) = view.bounds else {
        // Interval exists but no measurement falls inside it
        eprintln!("No {label} measurements inside the chart interval.");
        process::exit(2);
    };

    render_chart(&view, label, unit, bounds.min, bounds.max);
    Ok(())
}

fn render_chart(view: &ChartView, label: &str, unit: &str, min: f64, max: f64) {
    let first = view.series.first().map(|p| p.date);
    let last = view.series.last().map(|p| p.date);
    if let (Some(first), Some(last)) = (first, last) {
        let days = view.series.len();
        println!("{label} {first} → {last} ({days} days)");
    }

    println!(
        "{}",
        sparkline(&view.series, taper_core::timeline::Bounds { min, max })
    );
    println!("y: {min:.1} – {max:.1} {unit}");

    let count = view.ticks.len();
    match (view.ticks.first(), view.ticks.last()) {
        (Some(first), Some(last)) if count > 1 => {
            println!("measurements: {count} (first {first}, last {last})");
        }
        (Some(only), _) => println!("measurements: 1 ({only})"),
        _ => {}
    }

    if let Some(line) = &view.goal_line {
        let start = line[0].value;
        let goal = line[1].value;
        println!("goal line: {start:.1} → {goal:.1} {unit}");
    }
}
