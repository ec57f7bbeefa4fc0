use anyhow::Result;
use clap::Subcommand;
use studyplan_core::task::DEFAULT_ESTIMATE_MINUTES;
use studyplan_core::{
    parse_local_due_to_utc, Category, Priority, StudySession, Task, TaskDraft, TaskStatus,
};
use uuid::Uuid;

use crate::state::find_task;
use crate::views::{local_stamp, short_id};
use crate::Ctx;

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Add a new task
    Add {
        title: String,

        /// Due date in your timezone: "YYYY-MM-DD HH:MM" (a bare date means 23:59)
        #[arg(long)]
        due: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Estimated minutes
        #[arg(long, default_value_t = DEFAULT_ESTIMATE_MINUTES)]
        estimate: u32,

        #[arg(long, default_value_t = Priority::Medium)]
        priority: Priority,

        #[arg(long, default_value_t = Category::Assignment)]
        category: Category,
    },

    /// Edit fields of an existing task (id or unique id prefix)
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// New due date in your timezone
        #[arg(long)]
        due: Option<String>,

        #[arg(long)]
        estimate: Option<u32>,

        #[arg(long)]
        priority: Option<Priority>,

        #[arg(long)]
        category: Option<Category>,

        /// Set status directly (no transition rules are enforced)
        #[arg(long)]
        status: Option<TaskStatus>,
    },

    /// Record a study session for a task and mark it in progress
    Start { id: String },

    /// Mark a task completed
    Complete {
        id: String,

        /// Minutes actually spent
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        actual: Option<u32>,
    },

    /// Delete a task
    Delete { id: String },
}

pub fn run(cmd: TaskCommand, ctx: &Ctx) -> Result<()> {
    match cmd {
        TaskCommand::Add {
            title,
            due,
            description,
            estimate,
            priority,
            category,
        } => {
            let draft = TaskDraft {
                title,
                description,
                due_date: Some(parse_local_due_to_utc(&due, &ctx.config.planner.timezone)?),
                estimated_time: estimate,
                priority,
                category,
            };
            add(draft, ctx)
        }
        TaskCommand::Edit {
            id,
            title,
            description,
            due,
            estimate,
            priority,
            category,
            status,
        } => {
            let due = due
                .map(|d| parse_local_due_to_utc(&d, &ctx.config.planner.timezone))
                .transpose()?;
            edit(
                &id,
                FieldEdits {
                    title,
                    description,
                    due,
                    estimate,
                    priority,
                    category,
                    status,
                },
                ctx,
            )
        }
        TaskCommand::Start { id } => start(&id, ctx),
        TaskCommand::Complete { id, actual } => complete(&id, actual, ctx),
        TaskCommand::Delete { id } => delete(&id, ctx),
    }
}

#[derive(Debug)]
struct FieldEdits {
    title: Option<String>,
    description: Option<String>,
    due: Option<chrono::DateTime<chrono::Utc>>,
    estimate: Option<u32>,
    priority: Option<Priority>,
    category: Option<Category>,
    status: Option<TaskStatus>,
}

impl FieldEdits {
    /// Whether any task-form field was given, as opposed to only a status.
    fn touches_form(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.due.is_some()
            || self.estimate.is_some()
            || self.priority.is_some()
            || self.category.is_some()
    }
}

fn add(draft: TaskDraft, ctx: &Ctx) -> Result<()> {
    let mut tasks = ctx.store.load_tasks()?;
    let task = draft.into_task(Uuid::new_v4().to_string(), ctx.now)?;

    println!(
        "Added {} ({}) due {}",
        task.title,
        short_id(&task.id),
        task.due_date.map(|d| local_stamp(d, ctx.tz)).unwrap_or_default()
    );
    tracing::info!(id = %task.id, category = %task.category, "added task");

    tasks.push(task);
    ctx.store.save_tasks(&tasks)
}

fn edit(id: &str, edits: FieldEdits, ctx: &Ctx) -> Result<()> {
    let mut tasks = ctx.store.load_tasks()?;
    let idx = find_task(&tasks, id)?;
    let task = &mut tasks[idx];

    if edits.touches_form() {
        apply_form_edits(task, &edits)?;
    }
    if let Some(status) = edits.status {
        task.set_status(status, ctx.now);
    }

    println!("Updated {} ({})", task.title, short_id(&task.id));
    tracing::info!(id = %task.id, "edited task");
    ctx.store.save_tasks(&tasks)
}

/// Form fields go through the same validation as `add`.
fn apply_form_edits(task: &mut Task, edits: &FieldEdits) -> Result<()> {
    let mut draft = TaskDraft::from(&*task);
    if let Some(title) = &edits.title {
        draft.title = title.clone();
    }
    if let Some(description) = &edits.description {
        draft.description = description.clone();
    }
    if let Some(due) = edits.due {
        draft.due_date = Some(due);
    }
    if let Some(estimate) = edits.estimate {
        draft.estimated_time = estimate;
    }
    if let Some(priority) = edits.priority {
        draft.priority = priority;
    }
    if let Some(category) = edits.category {
        draft.category = category;
    }
    draft.apply_to(task)?;
    Ok(())
}

fn start(id: &str, ctx: &Ctx) -> Result<()> {
    let mut tasks = ctx.store.load_tasks()?;
    let idx = find_task(&tasks, id)?;
    let task = &mut tasks[idx];

    let session = StudySession::start(Uuid::new_v4().to_string(), task.id.clone(), ctx.now);
    task.set_status(TaskStatus::InProgress, ctx.now);

    println!(
        "Started {} at {}",
        task.title,
        local_stamp(session.start_time, ctx.tz)
    );
    tracing::info!(task = %task.id, session = %session.id, "started study session");

    ctx.store.append_session(&session)?;
    ctx.store.save_tasks(&tasks)
}

fn complete(id: &str, actual: Option<u32>, ctx: &Ctx) -> Result<()> {
    let mut tasks = ctx.store.load_tasks()?;
    let idx = find_task(&tasks, id)?;
    let task = &mut tasks[idx];

    task.set_status(TaskStatus::Completed, ctx.now);
    if actual.is_some() {
        task.actual_time = actual;
    }

    println!("Completed {} ({})", task.title, short_id(&task.id));
    tracing::info!(id = %task.id, actual_minutes = ?task.actual_time, "completed task");
    ctx.store.save_tasks(&tasks)
}

fn delete(id: &str, ctx: &Ctx) -> Result<()> {
    let mut tasks = ctx.store.load_tasks()?;
    let idx = find_task(&tasks, id)?;
    let task = tasks.remove(idx);

    println!("Deleted {} ({})", task.title, short_id(&task.id));
    tracing::info!(id = %task.id, "deleted task");
    ctx.store.save_tasks(&tasks)
}
