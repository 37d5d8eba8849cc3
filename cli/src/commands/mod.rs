mod export;
mod goal;
mod helpers;
mod log;
mod overview;
mod settings;

pub(crate) use export::{cmd_export, cmd_import};
pub(crate) use goal::{
    cmd_goal_add, cmd_goal_delete, cmd_goal_done, cmd_goal_edit, cmd_goal_list, cmd_goal_undo,
};
pub(crate) use log::{cmd_delete, cmd_history, cmd_log, cmd_show, cmd_update};
pub(crate) use overview::{ChartMetric, cmd_chart, cmd_overview};
pub(crate) use settings::{cmd_settings_set, cmd_settings_show};
