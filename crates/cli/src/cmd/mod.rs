mod plan;
mod run;

pub use plan::{PlanMode, cmd_plan};
pub use run::{cmd_rollback, cmd_upgrade};
