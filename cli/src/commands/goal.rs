use anyhow::{Result, bail};
use std::process;

use taper_core::models::{Goal, UpdateGoal};
use taper_core::service::TaperService;

use super::helpers::{json_error, progress_gauge};

const GAUGE_WIDTH: usize = 10;

pub(crate) fn cmd_goal_add(
    svc: &TaperService,
    activity: &str,
    frequency: i64,
    json: bool,
) -> Result<()> {
    let goal = svc.add_goal(activity, frequency)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&goal)?);
    } else {
        let activity = &goal.activity;
        let frequency = goal.frequency;
        println!("Added goal [{}]: {activity}, {frequency}x per week", goal.id);
    }

    Ok(())
}

pub(crate) fn cmd_goal_list(svc: &TaperService, json: bool) -> Result<()> {
    // Reading the list rolls stale goals over into the current week
    let goals = svc.list_goals()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&goals)?);
    } else if goals.is_empty() {
        eprintln!("No goals yet. Use `taper goal add <activity> <frequency>` to create one.");
    } else {
        println!("Weekly goals (week of {}):\n", goals[0].week_start);
        for goal in &goals {
            print_goal_line(goal);
        }
    }

    Ok(())
}

pub(crate) fn cmd_goal_done(svc: &TaperService, id: i64, json: bool) -> Result<()> {
    adjust(svc, id, 1, json)
}

pub(crate) fn cmd_goal_undo(svc: &TaperService, id: i64, json: bool) -> Result<()> {
    adjust(svc, id, -1, json)
}

fn adjust(svc: &TaperService, id: i64, delta: i64, json: bool) -> Result<()> {
    if let Ok(goal) = svc.adjust_goal(id, delta) {
        if json {
            println!("{}", serde_json::to_string_pretty(&goal)?);
        } else {
            print_goal_line(&goal);
            if goal.completed == goal.frequency {
                let activity = &goal.activity;
                println!("  {activity} done for this week!");
            }
        }
        Ok(())
    } else {
        if json {
            println!("{}", json_error(&format!("Goal {id} not found")));
        } else {
            eprintln!("Goal {id} not found");
        }
        process::exit(2);
    }
}

pub(crate) fn cmd_goal_edit(
    svc: &TaperService,
    id: i64,
    activity: Option<String>,
    frequency: Option<i64>,
    json: bool,
) -> Result<()> {
    if activity.is_none() && frequency.is_none() {
        bail!("Nothing to edit. Provide --activity and/or --frequency");
    }

    let goal = svc.edit_goal(id, &UpdateGoal {
        activity,
        frequency,
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&goal)?);
    } else {
        println!("Updated goal {id}:");
        print_goal_line(&goal);
    }

    Ok(())
}

pub(crate) fn cmd_goal_delete(svc: &TaperService, id: i64, json: bool) -> Result<()> {
    if svc.delete_goal(id)? {
        if json {
            println!("{}", serde_json::json!({ "deleted": id }));
        } else {
            println!("Deleted goal {id}");
        }
        Ok(())
    } else {
        if json {
            println!("{}", json_error(&format!("Goal {id} not found")));
        } else {
            eprintln!("Goal {id} not found");
        }
        process::exit(2);
    }
}

fn print_goal_line(goal: &Goal) {
    let gauge = progress_gauge(goal.completed, goal.frequency, GAUGE_WIDTH);
    let id = goal.id;
    let activity = &goal.activity;
    println!("  [{id}] {activity:<20} {gauge} this week");
}
