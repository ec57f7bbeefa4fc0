//! Analytics aggregator: folds a task collection into a summary.
//!
//! Sessions are not consumed here; the summary is derived from tasks alone.

use std::collections::BTreeMap;

use chrono::{DateTime, Days, TimeZone, Timelike, Utc};
use serde::Serialize;

use crate::scoring::{procrastination_score, ProcrastinationLevel};
use crate::task::{Category, Task, TaskStatus};

/// Days covered by the procrastination trend, ending today.
pub const TREND_DAYS: usize = 7;

pub const HOURS_PER_DAY: usize = 24;

/// Summary statistics over a task collection at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    /// Mean minutes per completed task (actual time, else estimate).
    pub average_completion_time: f64,
    /// Oldest first; the last entry is today.
    pub procrastination_trend: [f64; TREND_DAYS],
    /// Completions per local hour of day.
    pub productivity_by_hour: [u32; HOURS_PER_DAY],
    /// Only categories that occur at least once.
    pub category_breakdown: BTreeMap<Category, usize>,
}

/// Fold `tasks` into a fresh [`Analytics`] as of `now`.
///
/// `now`'s timezone decides calendar days (trend) and hours (histogram).
/// Never fails: tasks with missing timestamps simply don't contribute to the
/// trend or histogram.
pub fn compute_analytics<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>) -> Analytics {
    let tz = now.timezone();
    let instant = now.with_timezone(&Utc);

    let completed: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .collect();

    let average_completion_time = if completed.is_empty() {
        0.0
    } else {
        let minutes: f64 = completed.iter().map(|t| f64::from(t.spent_minutes())).sum();
        minutes / completed.len() as f64
    };

    let today = now.date_naive();
    let mut procrastination_trend = [0.0; TREND_DAYS];
    for (slot, days_back) in procrastination_trend
        .iter_mut()
        .zip((0..TREND_DAYS as u64).rev())
    {
        let Some(day) = today.checked_sub_days(Days::new(days_back)) else {
            continue;
        };
        let scores: Vec<f64> = tasks
            .iter()
            .filter(|t| {
                t.created_at
                    .is_some_and(|c| c.with_timezone(&tz).date_naive() == day)
            })
            .map(|t| procrastination_score(t, instant))
            .collect();
        if !scores.is_empty() {
            *slot = scores.iter().sum::<f64>() / scores.len() as f64;
        }
    }

    let mut productivity_by_hour = [0u32; HOURS_PER_DAY];
    for at in completed.iter().filter_map(|t| t.completed_at) {
        productivity_by_hour[at.with_timezone(&tz).hour() as usize] += 1;
    }

    let mut category_breakdown = BTreeMap::new();
    for t in tasks {
        *category_breakdown.entry(t.category).or_insert(0) += 1;
    }

    tracing::debug!(
        total = tasks.len(),
        completed = completed.len(),
        categories = category_breakdown.len(),
        "computed analytics"
    );

    Analytics {
        total_tasks: tasks.len(),
        completed_tasks: completed.len(),
        average_completion_time,
        procrastination_trend,
        productivity_by_hour,
        category_breakdown,
    }
}

/// Advice surfaced under the analytics charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Insight {
    HighProcrastination,
    LowCompletionRate,
    GoodWorkSchedule,
    GetStarted,
}

impl Insight {
    pub fn title(&self) -> &'static str {
        match self {
            Self::HighProcrastination => "High Procrastination Detected",
            Self::LowCompletionRate => "Low Completion Rate",
            Self::GoodWorkSchedule => "Good Work Schedule",
            Self::GetStarted => "Get Started!",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::HighProcrastination => {
                "Your procrastination score is quite high. Consider breaking large tasks into smaller chunks and setting earlier deadlines."
            }
            Self::LowCompletionRate => {
                "You're completing less than half of your tasks. Try setting more realistic deadlines and prioritizing better."
            }
            Self::GoodWorkSchedule => {
                "You're most productive during regular work hours. This is great for maintaining a healthy work-life balance!"
            }
            Self::GetStarted => {
                "Add your first task to start tracking your productivity and procrastination patterns."
            }
        }
    }
}

impl Analytics {
    /// Percent of tasks completed, to one decimal; 0 with no tasks.
    pub fn completion_rate(&self) -> f64 {
        if self.total_tasks == 0 {
            return 0.0;
        }
        one_decimal(self.completed_tasks as f64 / self.total_tasks as f64 * 100.0)
    }

    /// Mean of the daily trend values, empty days included, to one decimal.
    /// Level and insights are judged on this displayed value.
    pub fn average_procrastination(&self) -> f64 {
        one_decimal(self.procrastination_trend.iter().sum::<f64>() / TREND_DAYS as f64)
    }

    pub fn procrastination_level(&self) -> ProcrastinationLevel {
        ProcrastinationLevel::from_score(self.average_procrastination())
    }

    /// First hour holding the highest completion count; 0 when nothing was completed.
    pub fn most_productive_hour(&self) -> usize {
        let max = self.productivity_by_hour.iter().copied().max().unwrap_or(0);
        self.productivity_by_hour
            .iter()
            .position(|c| *c == max)
            .unwrap_or(0)
    }

    /// Percent of all tasks in `category`.
    pub fn category_share(&self, category: Category) -> f64 {
        if self.total_tasks == 0 {
            return 0.0;
        }
        let count = self.category_breakdown.get(&category).copied().unwrap_or(0);
        count as f64 / self.total_tasks as f64 * 100.0
    }

    pub fn insights(&self) -> Vec<Insight> {
        let mut out = Vec::new();
        if self.average_procrastination() > 60.0 {
            out.push(Insight::HighProcrastination);
        }
        if self.completion_rate() < 50.0 {
            out.push(Insight::LowCompletionRate);
        }
        if (9..=17).contains(&self.most_productive_hour()) {
            out.push(Insight::GoodWorkSchedule);
        }
        if self.total_tasks == 0 {
            out.push(Insight::GetStarted);
        }
        out
    }
}

fn one_decimal(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// 12-hour clock label for an hour of day, e.g. `9:00 AM`, `12:00 PM`.
pub fn hour_label(hour: usize) -> String {
    match hour {
        0..=11 => format!("{hour}:00 AM"),
        12 => "12:00 PM".to_string(),
        h => format!("{}:00 PM", h - 12),
    }
}
