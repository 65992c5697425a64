mod bmi;
mod goal;
mod helpers;
mod log;
mod report;
mod suggest;

use fitsphere_core::db::Database;
use fitsphere_core::service::ReportService;

pub(crate) type Service = ReportService<Database>;

pub(crate) use bmi::cmd_bmi;
pub(crate) use goal::{cmd_goal_set, cmd_goal_show};
pub(crate) use log::{cmd_clear, cmd_delete, cmd_entries, cmd_food, cmd_log};
pub(crate) use report::cmd_report;
pub(crate) use suggest::cmd_suggest;
