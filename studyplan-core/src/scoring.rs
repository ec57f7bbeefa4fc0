//! Scoring engine: procrastination score and composite task priority.
//!
//! Both scores are pure functions of a task and an explicit evaluation
//! instant. Nothing is cached on the task; two calls at different `now`
//! values may disagree, which is the point (deadlines approach).
//!
//! Rules are ordered tables evaluated top to bottom, first match wins.
//! Row order encodes precedence, not magnitude.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::{Category, Task};
use crate::time::days_between;

pub const MAX_SCORE: f64 = 100.0;

/// Tasks scoring above this get a procrastination warning on the dashboard.
pub const PROCRASTINATION_WARNING: f64 = 50.0;

const PROCRASTINATION_WEIGHT: f64 = 0.3;

/// Cap for the smooth elapsed-window score once no band matches.
const ELAPSED_SCORE_CAP: f64 = 50.0;

/// Where a task sits in its creation-to-deadline window.
#[derive(Debug, Clone, Copy)]
struct Window {
    /// Fractional days until due; negative once overdue.
    days_until_due: f64,
    /// Share of the window already elapsed; above 1.0 once past due.
    time_ratio: f64,
}

struct Rule {
    applies: fn(&Window) -> bool,
    score: f64,
}

const PROCRASTINATION_RULES: [Rule; 4] = [
    // overdue
    Rule { applies: |w| w.days_until_due < 0.0, score: 100.0 },
    Rule { applies: |w| w.days_until_due < 1.0, score: 90.0 },
    Rule { applies: |w| w.days_until_due < 3.0, score: 70.0 },
    // most of the window gone, whatever the absolute days left
    Rule { applies: |w| w.time_ratio > 0.8, score: 60.0 },
];

/// (days until due, exclusive upper bound; bonus). Mutually exclusive bands.
const URGENCY_BANDS: [(f64, f64); 4] = [(0.0, 50.0), (1.0, 40.0), (3.0, 30.0), (7.0, 20.0)];

/// Fractional days from `now` until the task is due.
pub fn days_until_due(task: &Task, now: DateTime<Utc>) -> Option<f64> {
    task.due_date.map(|due| days_between(now, due))
}

/// Whole days until due, rounded up: 0 means due within the coming day
/// (or overdue by less than one), negative means at least a full day overdue.
pub fn due_in_days(task: &Task, now: DateTime<Utc>) -> Option<i64> {
    days_until_due(task, now).map(|d| d.ceil() as i64)
}

/// Heuristic 0-100: how close to (or past) its deadline a task is relative
/// to the window it was given.
///
/// Missing `due_date`/`created_at` yields 0. A due date not after creation is
/// malformed and yields 100.
pub fn procrastination_score(task: &Task, now: DateTime<Utc>) -> f64 {
    let (Some(due), Some(created)) = (task.due_date, task.created_at) else {
        return 0.0;
    };

    let total_ms = (due - created).num_milliseconds();
    if total_ms <= 0 {
        return MAX_SCORE;
    }

    let window = Window {
        days_until_due: days_between(now, due),
        time_ratio: (now - created).num_milliseconds() as f64 / total_ms as f64,
    };

    PROCRASTINATION_RULES
        .iter()
        .find(|rule| (rule.applies)(&window))
        .map(|rule| rule.score)
        // now < created would give a negative ratio
        .unwrap_or_else(|| (window.time_ratio * ELAPSED_SCORE_CAP).clamp(0.0, ELAPSED_SCORE_CAP))
}

/// Base weight a category contributes to the composite priority.
pub fn category_weight(category: Category) -> f64 {
    match category {
        Category::Exam => 40.0,
        Category::Project => 30.0,
        Category::Assignment => 20.0,
        Category::Work => 15.0,
        Category::Personal => 10.0,
        Category::Unknown => 0.0,
    }
}

fn urgency_bonus(days_until_due: Option<f64>) -> f64 {
    let Some(days) = days_until_due else {
        return 0.0;
    };
    URGENCY_BANDS
        .iter()
        .find(|(below, _)| days < *below)
        .map(|(_, bonus)| *bonus)
        .unwrap_or(0.0)
}

/// Composite 0-100 priority used for default ordering: category weight plus
/// deadline urgency plus 30% of the procrastination score, capped.
pub fn task_priority(task: &Task, now: DateTime<Utc>) -> f64 {
    let total = category_weight(task.category)
        + urgency_bonus(days_until_due(task, now))
        + procrastination_score(task, now) * PROCRASTINATION_WEIGHT;
    total.min(MAX_SCORE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcrastinationLevel {
    Low,
    Medium,
    High,
}

impl ProcrastinationLevel {
    pub fn from_score(score: f64) -> Self {
        if score < 30.0 {
            Self::Low
        } else if score < 60.0 {
            Self::Medium
        } else {
            Self::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 15, 12, 0, 0).unwrap()
    }

    /// Created a week ago, due at `due`.
    fn task_due(due: DateTime<Utc>) -> Task {
        Task::new("t", "task")
            .with_created(now() - Duration::days(7))
            .with_due(due)
    }

    #[test]
    fn missing_dates_score_zero() {
        let t = Task::new("t", "no dates");
        assert_eq!(procrastination_score(&t, now()), 0.0);

        let t = Task::new("t", "no created").with_due(now() + Duration::days(1));
        assert_eq!(procrastination_score(&t, now()), 0.0);

        let t = Task::new("t", "no due").with_created(now());
        assert_eq!(procrastination_score(&t, now()), 0.0);
    }

    #[test]
    fn due_not_after_creation_is_worst_case() {
        let t = Task::new("t", "same instant").with_created(now()).with_due(now());
        assert_eq!(procrastination_score(&t, now() - Duration::days(3)), 100.0);

        let t = Task::new("t", "backwards")
            .with_created(now())
            .with_due(now() - Duration::hours(1));
        assert_eq!(procrastination_score(&t, now()), 100.0);
    }

    #[test]
    fn overdue_by_one_second() {
        let t = task_due(now() - Duration::seconds(1));
        assert_eq!(procrastination_score(&t, now()), 100.0);
    }

    #[test]
    fn deadline_bands() {
        assert_eq!(procrastination_score(&task_due(now() + Duration::hours(12)), now()), 90.0);
        assert_eq!(procrastination_score(&task_due(now() + Duration::days(2)), now()), 70.0);
        // exactly one day out falls through to the three-day band
        assert_eq!(procrastination_score(&task_due(now() + Duration::days(1)), now()), 70.0);
    }

    #[test]
    fn window_consumption_band() {
        // 90% of a 40-day window gone, 4 days left
        let t = Task::new("t", "long")
            .with_created(now() - Duration::days(36))
            .with_due(now() + Duration::days(4));
        assert_eq!(procrastination_score(&t, now()), 60.0);
    }

    #[test]
    fn smooth_score_below_bands() {
        let fresh = Task::new("t", "fresh")
            .with_created(now())
            .with_due(now() + Duration::days(30));
        assert_eq!(procrastination_score(&fresh, now()), 0.0);

        // half the window gone => 25
        let half = Task::new("t", "half")
            .with_created(now() - Duration::days(10))
            .with_due(now() + Duration::days(10));
        assert!((procrastination_score(&half, now()) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn evaluation_before_creation_never_negative() {
        let t = Task::new("t", "future")
            .with_created(now() + Duration::days(1))
            .with_due(now() + Duration::days(30));
        assert_eq!(procrastination_score(&t, now()), 0.0);
    }

    #[test]
    fn category_weights() {
        assert_eq!(category_weight(Category::Exam), 40.0);
        assert_eq!(category_weight(Category::Project), 30.0);
        assert_eq!(category_weight(Category::Assignment), 20.0);
        assert_eq!(category_weight(Category::Work), 15.0);
        assert_eq!(category_weight(Category::Personal), 10.0);
        assert_eq!(category_weight(Category::Unknown), 0.0);
    }

    #[test]
    fn exam_due_in_thirty_minutes_caps_at_100() {
        let t = task_due(now() + Duration::minutes(30)).with_category(Category::Exam);
        assert_eq!(procrastination_score(&t, now()), 90.0);
        // 40 + 40 + 27 = 107
        assert_eq!(task_priority(&t, now()), 100.0);
    }

    #[test]
    fn urgency_bands_in_priority() {
        let fresh = |due: DateTime<Utc>| {
            Task::new("t", "p")
                .with_category(Category::Personal)
                .with_created(now())
                .with_due(due)
        };
        // 10 + 20 (due within a week) + 0.3 * smooth score (0 at creation)
        assert_eq!(task_priority(&fresh(now() + Duration::days(5)), now()), 30.0);
        // 10 + 0 + 0
        assert_eq!(task_priority(&fresh(now() + Duration::days(20)), now()), 10.0);
        // 10 + 30 + 0.3 * 70
        assert!((task_priority(&fresh(now() + Duration::days(2)), now()) - 61.0).abs() < 1e-9);
    }

    #[test]
    fn priority_without_due_date_is_category_only() {
        let t = Task::new("t", "undated").with_category(Category::Project);
        assert_eq!(task_priority(&t, now()), 30.0);
    }

    #[test]
    fn scores_stay_in_range() {
        let offsets = [-400, -30, -1, 0, 1, 5, 23, 47, 71, 150, 1000, 10_000];
        for cat in Category::KNOWN.into_iter().chain([Category::Unknown]) {
            for created in offsets {
                for due in offsets {
                    let t = Task::new("t", "r")
                        .with_category(cat)
                        .with_created(now() + Duration::hours(created))
                        .with_due(now() + Duration::hours(due));
                    let p = procrastination_score(&t, now());
                    let q = task_priority(&t, now());
                    assert!((0.0..=100.0).contains(&p), "procrastination {p}");
                    assert!((0.0..=100.0).contains(&q), "priority {q}");
                }
            }
        }
    }

    #[test]
    fn due_in_days_rounds_up() {
        assert_eq!(due_in_days(&task_due(now() + Duration::hours(2)), now()), Some(1));
        assert_eq!(due_in_days(&task_due(now() - Duration::hours(2)), now()), Some(0));
        assert_eq!(due_in_days(&task_due(now() - Duration::hours(30)), now()), Some(-1));
        assert_eq!(due_in_days(&Task::new("t", "x"), now()), None);
    }

    #[test]
    fn levels() {
        assert_eq!(ProcrastinationLevel::from_score(0.0), ProcrastinationLevel::Low);
        assert_eq!(ProcrastinationLevel::from_score(30.0), ProcrastinationLevel::Medium);
        assert_eq!(ProcrastinationLevel::from_score(59.9), ProcrastinationLevel::Medium);
        assert_eq!(ProcrastinationLevel::from_score(60.0), ProcrastinationLevel::High);
    }
}
