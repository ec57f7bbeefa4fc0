//! Dashboard helpers: quick stats, filtering/sorting and display formatting.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::scoring::{due_in_days, procrastination_score, task_priority, PROCRASTINATION_WARNING};
use crate::task::{Task, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct QuickStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    /// Due at least one whole day ago (rounded the same way as the due labels).
    pub overdue: usize,
}

impl QuickStats {
    pub fn collect(tasks: &[Task], now: DateTime<Utc>) -> Self {
        let mut stats = Self {
            total: tasks.len(),
            ..Self::default()
        };
        for t in tasks {
            match t.status {
                TaskStatus::Completed => stats.completed += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                TaskStatus::Pending => {}
            }
            if due_in_days(t, now).is_some_and(|d| d < 0) {
                stats.overdue += 1;
            }
        }
        stats
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Composite priority, highest first.
    #[default]
    Priority,
    /// Earliest due first.
    DueDate,
    /// Newest first.
    CreatedAt,
}

/// Which tasks the dashboard shows and in what order.
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    /// `None` shows every status.
    pub status: Option<TaskStatus>,
    pub search: String,
    pub sort: SortKey,
}

/// A task with the scores the dashboard displays, computed once per render.
#[derive(Debug, Clone)]
pub struct DashboardRow<'a> {
    pub task: &'a Task,
    pub priority: f64,
    pub procrastination: f64,
    pub due_in_days: Option<i64>,
}

impl DashboardRow<'_> {
    pub fn procrastination_warning(&self) -> bool {
        self.procrastination > PROCRASTINATION_WARNING
    }
}

impl TaskQuery {
    pub fn matches(&self, task: &Task) -> bool {
        self.status.is_none_or(|s| task.status == s) && task.matches_search(&self.search)
    }

    /// Filter and sort `tasks`. Ties keep their input order; tasks missing the
    /// timestamp a sort needs go last.
    pub fn apply<'a>(&self, tasks: &'a [Task], now: DateTime<Utc>) -> Vec<DashboardRow<'a>> {
        let mut rows: Vec<DashboardRow<'a>> = tasks
            .iter()
            .filter(|t| self.matches(t))
            .map(|task| DashboardRow {
                task,
                priority: task_priority(task, now),
                procrastination: procrastination_score(task, now),
                due_in_days: due_in_days(task, now),
            })
            .collect();

        match self.sort {
            SortKey::Priority => rows.sort_by(|a, b| b.priority.total_cmp(&a.priority)),
            SortKey::DueDate => {
                rows.sort_by(|a, b| missing_last(a.task.due_date, b.task.due_date, false))
            }
            SortKey::CreatedAt => {
                rows.sort_by(|a, b| missing_last(a.task.created_at, b.task.created_at, true))
            }
        }

        rows
    }
}

fn missing_last<T: Ord>(a: Option<T>, b: Option<T>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) if descending => y.cmp(&x),
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// `"1h 30m"`, or just `"45m"` under an hour.
pub fn format_minutes(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{mins}m")
    }
}

pub fn due_label(due_in_days: i64) -> String {
    match due_in_days {
        d if d < 0 => format!("Overdue by {} days", d.abs()),
        0 => "Due today".to_string(),
        d => format!("Due in {d} days"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Category;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 10, 0, 0).unwrap()
    }

    fn sample() -> Vec<Task> {
        let mut essay = Task::new("essay", "History essay")
            .with_category(Category::Assignment)
            .with_created(now() - Duration::days(3))
            .with_due(now() + Duration::days(10));
        essay.description = "WWI causes".into();

        let mut exam = Task::new("exam", "Calculus exam")
            .with_category(Category::Exam)
            .with_created(now() - Duration::days(1))
            .with_due(now() + Duration::hours(20));
        exam.set_status(TaskStatus::InProgress, now());

        let laundry = Task::new("laundry", "Laundry")
            .with_category(Category::Personal)
            .with_created(now() - Duration::days(5))
            .with_due(now() - Duration::days(2))
            .completed(now() - Duration::days(2), Some(20));

        let undated = Task::new("undated", "Someday reading").with_category(Category::Personal);

        vec![essay, exam, laundry, undated]
    }

    fn ids(rows: &[DashboardRow<'_>]) -> Vec<String> {
        rows.iter().map(|r| r.task.id.clone()).collect()
    }

    #[test]
    fn quick_stats() {
        let stats = QuickStats::collect(&sample(), now());
        assert_eq!(
            stats,
            QuickStats {
                total: 4,
                completed: 1,
                in_progress: 1,
                overdue: 1,
            }
        );
    }

    #[test]
    fn sorts_by_priority_desc() {
        let tasks = sample();
        let rows = TaskQuery::default().apply(&tasks, now());
        // exam: 40 + 40 + 27 (capped); laundry: 10 + 50 + 30; essay: 20 + 0 + ~3.5; undated: 10
        assert_eq!(ids(&rows), vec!["exam", "laundry", "essay", "undated"]);
        assert!(rows[0].procrastination_warning());
        assert!(!rows[2].procrastination_warning());
    }

    #[test]
    fn sorts_by_due_date_with_missing_last() {
        let tasks = sample();
        let q = TaskQuery {
            sort: SortKey::DueDate,
            ..TaskQuery::default()
        };
        assert_eq!(ids(&q.apply(&tasks, now())), vec!["laundry", "exam", "essay", "undated"]);
    }

    #[test]
    fn sorts_by_created_newest_first() {
        let tasks = sample();
        let q = TaskQuery {
            sort: SortKey::CreatedAt,
            ..TaskQuery::default()
        };
        assert_eq!(ids(&q.apply(&tasks, now())), vec!["exam", "essay", "laundry", "undated"]);
    }

    #[test]
    fn filters_by_status_and_search() {
        let tasks = sample();
        let q = TaskQuery {
            status: Some(TaskStatus::Pending),
            ..TaskQuery::default()
        };
        assert_eq!(ids(&q.apply(&tasks, now())), vec!["essay", "undated"]);

        let q = TaskQuery {
            search: "wwi".into(),
            ..TaskQuery::default()
        };
        assert_eq!(ids(&q.apply(&tasks, now())), vec!["essay"]);

        let q = TaskQuery {
            status: Some(TaskStatus::Completed),
            search: "CALC".into(),
            ..TaskQuery::default()
        };
        assert!(q.apply(&tasks, now()).is_empty());
    }

    #[test]
    fn formats_minutes() {
        assert_eq!(format_minutes(45), "45m");
        assert_eq!(format_minutes(60), "1h 0m");
        assert_eq!(format_minutes(135), "2h 15m");
    }

    #[test]
    fn due_labels() {
        assert_eq!(due_label(-3), "Overdue by 3 days");
        assert_eq!(due_label(0), "Due today");
        assert_eq!(due_label(4), "Due in 4 days");
    }
}
