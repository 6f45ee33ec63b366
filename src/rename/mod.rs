mod collision;
mod executor;
mod name_builder;
mod planner;
mod types;

pub use collision::{ensure_unique, CollisionError, MAX_COLLISION_ATTEMPTS};
pub use executor::{
    execute, spawn_execution, CancelFlag, ExecutionEvent, ExecutionHandle, ExecutionResult,
    ExecutorError,
};
pub use name_builder::{
    build_name, build_pa_mat_base, build_pa_mat_name, build_position_base, build_position_name,
    format_batch_date,
};
pub use planner::{build_mapping, build_mapping_at};
pub use types::*;
