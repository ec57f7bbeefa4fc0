//! Task and study-session model.
//!
//! Field names serialize in the camelCase schema the stored collections use,
//! so a `tasks.json` written by any front-end loads unchanged.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ParseEnumError, ValidationError};
use crate::time::{format_instant, parse_instant_in};

/// Default estimate offered by the task form, in minutes.
pub const DEFAULT_ESTIMATE_MINUTES: u32 = 60;

/// Productivity recorded for a session started from the dashboard.
pub const DEFAULT_SESSION_PRODUCTIVITY: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }
}

/// User-declared priority. Distinct from the computed composite priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Assignment,
    Exam,
    Project,
    Personal,
    Work,
    /// Anything a stored collection carries that we don't recognise.
    #[serde(other)]
    Unknown,
}

impl Category {
    pub const KNOWN: [Category; 5] = [
        Self::Assignment,
        Self::Exam,
        Self::Project,
        Self::Personal,
        Self::Work,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assignment => "assignment",
            Self::Exam => "exam",
            Self::Project => "project",
            Self::Personal => "personal",
            Self::Work => "work",
            Self::Unknown => "unknown",
        }
    }
}

macro_rules! display_and_parse {
    ($ty:ty, $kind:literal, $expected:literal, [$($variant:expr),+ $(,)?]) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_lowercase();
                [$($variant),+]
                    .into_iter()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| ParseEnumError::new($kind, s, $expected))
            }
        }
    };
}

display_and_parse!(
    TaskStatus,
    "status",
    "pending, in-progress, completed",
    [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Completed]
);
display_and_parse!(
    Priority,
    "priority",
    "low, medium, high",
    [Priority::Low, Priority::Medium, Priority::High]
);
display_and_parse!(
    Category,
    "category",
    "assignment, exam, project, personal, work",
    [
        Category::Assignment,
        Category::Exam,
        Category::Project,
        Category::Personal,
        Category::Work,
    ]
);

/// A planner task.
///
/// Temporal fields are optional because stored data may be missing or
/// malformed; scoring treats an absent instant as "no signal" rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredTask", into = "StoredTask")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    /// Minutes.
    pub estimated_time: u32,
    /// Minutes actually spent, recorded on completion.
    pub actual_time: Option<u32>,
    pub priority: Priority,
    pub category: Category,
    pub status: TaskStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Display cache some front-ends write. Never read by the scoring code.
    pub procrastination_score: Option<f64>,
    source: SourceText,
}

/// On-disk shape of a task. Timestamps and category stay as text so that
/// values we can't interpret are written back as they were found.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredTask {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    due_date: Option<String>,
    estimated_time: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    actual_time: Option<u32>,
    priority: Priority,
    category: String,
    status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    completed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    procrastination_score: Option<f64>,
}

/// Text a task was loaded from. Never part of equality.
#[derive(Debug, Clone, Default)]
struct SourceText {
    due_date: Option<SourceStamp>,
    created_at: Option<SourceStamp>,
    completed_at: Option<SourceStamp>,
    /// Set only when the stored category wasn't recognised.
    category: Option<String>,
}

impl PartialEq for SourceText {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

#[derive(Debug, Clone)]
struct SourceStamp {
    text: String,
    read_as: Option<DateTime<Utc>>,
}

impl SourceStamp {
    fn read<Z: TimeZone>(text: String, tz: &Z) -> Self {
        let read_as = parse_instant_in(&text, tz);
        Self { text, read_as }
    }

    /// Stored text while the value is unchanged since load, else canonical text.
    fn write(stamp: Option<&SourceStamp>, current: Option<DateTime<Utc>>) -> Option<String> {
        match stamp {
            Some(s) if s.read_as == current => Some(s.text.clone()),
            _ => current.map(format_instant),
        }
    }
}

impl From<StoredTask> for Task {
    fn from(stored: StoredTask) -> Self {
        let stamp = |raw: Option<String>| raw.map(|text| SourceStamp::read(text, &Utc));
        let due_date = stamp(stored.due_date);
        let created_at = stamp(stored.created_at);
        let completed_at = stamp(stored.completed_at);

        let category = Category::KNOWN
            .into_iter()
            .find(|c| c.as_str() == stored.category)
            .unwrap_or(Category::Unknown);

        Self {
            id: stored.id,
            title: stored.title,
            description: stored.description,
            due_date: due_date.as_ref().and_then(|s| s.read_as),
            estimated_time: stored.estimated_time,
            actual_time: stored.actual_time,
            priority: stored.priority,
            category,
            status: stored.status,
            created_at: created_at.as_ref().and_then(|s| s.read_as),
            completed_at: completed_at.as_ref().and_then(|s| s.read_as),
            procrastination_score: stored.procrastination_score,
            source: SourceText {
                due_date,
                created_at,
                completed_at,
                category: (category == Category::Unknown).then_some(stored.category),
            },
        }
    }
}

impl From<Task> for StoredTask {
    fn from(task: Task) -> Self {
        let src = &task.source;
        let category = match (task.category, &src.category) {
            (Category::Unknown, Some(raw)) => raw.clone(),
            (category, _) => category.as_str().to_string(),
        };

        Self {
            due_date: SourceStamp::write(src.due_date.as_ref(), task.due_date),
            created_at: SourceStamp::write(src.created_at.as_ref(), task.created_at),
            completed_at: SourceStamp::write(src.completed_at.as_ref(), task.completed_at),
            category,
            id: task.id,
            title: task.title,
            description: task.description,
            estimated_time: task.estimated_time,
            actual_time: task.actual_time,
            priority: task.priority,
            status: task.status,
            procrastination_score: task.procrastination_score,
        }
    }
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            due_date: None,
            estimated_time: DEFAULT_ESTIMATE_MINUTES,
            actual_time: None,
            priority: Priority::Medium,
            category: Category::Assignment,
            status: TaskStatus::Pending,
            created_at: None,
            completed_at: None,
            procrastination_score: None,
            source: SourceText::default(),
        }
    }

    /// Re-read offset-less stored timestamps as local time in `tz`.
    ///
    /// Deserialization has no zone to hand and reads them as UTC. Values
    /// changed since load are left alone.
    pub fn resolve_in<Z: TimeZone>(&mut self, tz: &Z) {
        let fields = [
            (&mut self.due_date, &mut self.source.due_date),
            (&mut self.created_at, &mut self.source.created_at),
            (&mut self.completed_at, &mut self.source.completed_at),
        ];
        for (value, stamp) in fields {
            let Some(stamp) = stamp else { continue };
            if stamp.read_as != *value {
                continue;
            }
            *stamp = SourceStamp::read(std::mem::take(&mut stamp.text), tz);
            *value = stamp.read_as;
        }
    }

    pub fn with_due(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }

    pub fn with_created(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_estimate(mut self, minutes: u32) -> Self {
        self.estimated_time = minutes;
        self
    }

    pub fn completed(mut self, at: DateTime<Utc>, actual_minutes: Option<u32>) -> Self {
        self.status = TaskStatus::Completed;
        self.completed_at = Some(at);
        self.actual_time = actual_minutes;
        self
    }

    /// Change status. Moving to completed stamps `completed_at` once; any
    /// transition is accepted.
    pub fn set_status(&mut self, status: TaskStatus, now: DateTime<Utc>) {
        if status == TaskStatus::Completed && self.completed_at.is_none() {
            self.completed_at = Some(now);
        }
        self.status = status;
    }

    /// Minutes to count for a finished task: actual time when recorded, else the estimate.
    pub fn spent_minutes(&self) -> u32 {
        self.actual_time
            .filter(|m| *m > 0)
            .unwrap_or(self.estimated_time)
    }

    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

/// Editable task fields, as captured by the task form.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub estimated_time: u32,
    pub priority: Priority,
    pub category: Category,
}

impl Default for TaskDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            due_date: None,
            estimated_time: DEFAULT_ESTIMATE_MINUTES,
            priority: Priority::Medium,
            category: Category::Assignment,
        }
    }
}

impl From<&Task> for TaskDraft {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date,
            estimated_time: task.estimated_time,
            priority: task.priority,
            category: task.category,
        }
    }
}

impl TaskDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        if self.due_date.is_none() {
            return Err(ValidationError::MissingDueDate);
        }
        if self.estimated_time == 0 {
            return Err(ValidationError::ZeroEstimate);
        }
        Ok(())
    }

    /// Build a new pending task created at `now`.
    pub fn into_task(self, id: impl Into<String>, now: DateTime<Utc>) -> Result<Task, ValidationError> {
        self.validate()?;
        let mut task = Task::new(id, self.title.trim()).with_created(now);
        task.description = self.description;
        task.due_date = self.due_date;
        task.estimated_time = self.estimated_time;
        task.priority = self.priority;
        task.category = self.category;
        Ok(task)
    }

    /// Overwrite the editable fields of an existing task. Id, status and
    /// timestamps are left alone.
    pub fn apply_to(self, task: &mut Task) -> Result<(), ValidationError> {
        self.validate()?;
        task.title = self.title.trim().to_string();
        task.description = self.description;
        task.due_date = self.due_date;
        task.estimated_time = self.estimated_time;
        task.priority = self.priority;
        task.category = self.category;
        Ok(())
    }
}

/// A block of time spent on a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub id: String,
    pub task_id: String,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    /// 1-10.
    pub productivity: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl StudySession {
    pub fn start(id: impl Into<String>, task_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            task_id: task_id.into(),
            start_time: now,
            end_time: None,
            duration: None,
            productivity: DEFAULT_SESSION_PRODUCTIVITY,
            notes: None,
        }
    }

    pub fn with_productivity(mut self, productivity: u8) -> Self {
        self.productivity = productivity.clamp(1, 10);
        self
    }
}
