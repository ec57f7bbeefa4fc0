//! studyplan-core: task model, scoring engine and analytics for the study planner.
//!
//! Everything here is a pure computation over data handed in by the caller,
//! with the evaluation instant passed explicitly. Storage and presentation
//! live in `studyplan-cli`.

pub mod analytics;
pub mod calendar;
pub mod dashboard;
pub mod error;
pub mod scoring;
pub mod task;
pub mod time;

pub use analytics::{compute_analytics, hour_label, Analytics, Insight, HOURS_PER_DAY, TREND_DAYS};
pub use calendar::{cell_preview, month_grid, shift_month, tasks_due_on, week_of};
pub use dashboard::{due_label, format_minutes, DashboardRow, QuickStats, SortKey, TaskQuery};
pub use error::{ParseEnumError, ValidationError};
pub use scoring::{
    category_weight, days_until_due, due_in_days, procrastination_score, task_priority,
    ProcrastinationLevel,
};
pub use task::{Category, Priority, StudySession, Task, TaskDraft, TaskStatus};
pub use time::{format_instant, parse_instant, parse_instant_in, parse_local_due_to_utc, parse_timezone};
