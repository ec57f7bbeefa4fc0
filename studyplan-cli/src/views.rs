//! Read-only views: dashboard list, calendar, analytics and sessions.

use anyhow::Result;
use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use clap::{Subcommand, ValueEnum};
use serde::Serialize;
use studyplan_core::{
    cell_preview, compute_analytics, due_label, format_minutes, hour_label, month_grid,
    shift_month, tasks_due_on, week_of, Analytics, Insight, ProcrastinationLevel, QuickStats,
    SortKey, Task, TaskQuery, TaskStatus, TREND_DAYS,
};

use crate::state::find_task;
use crate::Ctx;

#[derive(Subcommand, Debug)]
pub enum ViewCommand {
    /// Dashboard: quick stats and tasks ordered by computed priority
    List {
        /// Only show tasks with this status
        #[arg(long)]
        status: Option<TaskStatus>,

        /// Case-insensitive match on title or description
        #[arg(long, default_value = "")]
        search: String,

        #[arg(long, value_enum, default_value_t = SortArg::Priority)]
        sort: SortArg,

        /// Max tasks to print (default: config planner.max_tasks_per_day)
        #[arg(long)]
        limit: Option<usize>,

        /// Print every matching task
        #[arg(long, default_value_t = false, conflicts_with = "limit")]
        all: bool,
    },

    /// Tasks by due date on a month, week or day view
    Calendar {
        #[arg(long, value_enum, default_value_t = CalendarView::Month)]
        view: CalendarView,

        /// Day to show (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Move the month view forward/backward by this many months
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        months: i32,
    },

    /// Completion rate, procrastination trend, productive hours, categories
    Analytics {
        /// Emit JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Recorded study sessions, newest first
    Sessions {
        /// Only sessions for this task (id or unique id prefix)
        #[arg(long)]
        task: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortArg {
    Priority,
    DueDate,
    CreatedAt,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Priority => SortKey::Priority,
            SortArg::DueDate => SortKey::DueDate,
            SortArg::CreatedAt => SortKey::CreatedAt,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CalendarView {
    Month,
    Week,
    Day,
}

pub fn run(cmd: ViewCommand, ctx: &Ctx) -> Result<()> {
    match cmd {
        ViewCommand::List {
            status,
            search,
            sort,
            limit,
            all,
        } => {
            let query = TaskQuery {
                status,
                search,
                sort: sort.into(),
            };
            let limit = if all {
                usize::MAX
            } else {
                limit.unwrap_or(ctx.config.planner.max_tasks_per_day)
            };
            list(&query, limit, ctx)
        }
        ViewCommand::Calendar { view, date, months } => {
            let date = date.unwrap_or_else(|| ctx.today());
            calendar(view, date, months, ctx)
        }
        ViewCommand::Analytics { json } => analytics(json, ctx),
        ViewCommand::Sessions { task } => sessions(task.as_deref(), ctx),
    }
}

pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

pub fn local_stamp(at: DateTime<Utc>, tz: Tz) -> String {
    at.with_timezone(&tz).format("%a %b %-d %H:%M").to_string()
}

fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 {
        return String::new();
    }
    let filled = ((value / max) * width as f64).round().clamp(0.0, width as f64) as usize;
    "#".repeat(filled)
}

fn list(query: &TaskQuery, limit: usize, ctx: &Ctx) -> Result<()> {
    let tasks = ctx.store.load_tasks()?;
    let stats = QuickStats::collect(&tasks, ctx.now);

    println!("# Dashboard\n");
    println!(
        "Total {} | Completed {} | In progress {} | Overdue {}\n",
        stats.total, stats.completed, stats.in_progress, stats.overdue
    );

    let rows = query.apply(&tasks, ctx.now);
    if rows.is_empty() {
        println!("No tasks found. Add one with: studyplan add \"Title\" --due \"YYYY-MM-DD HH:MM\"");
        return Ok(());
    }

    for (i, row) in rows.iter().take(limit).enumerate() {
        let t = row.task;
        let due = row
            .due_in_days
            .map(due_label)
            .unwrap_or_else(|| "No due date".to_string());

        println!("{}. {} [{}] ({})", i + 1, t.title, t.category, short_id(&t.id));
        println!(
            "   {} | {} | {} | est {} | priority {:.0} | procrastination {:.0}{}",
            t.priority.as_str().to_uppercase(),
            t.status.as_str().replace('-', " "),
            due,
            format_minutes(t.estimated_time),
            row.priority,
            row.procrastination,
            if row.procrastination_warning() {
                "  (!) procrastination risk"
            } else {
                ""
            }
        );
        if !t.description.is_empty() {
            println!("   {}", t.description);
        }
    }

    if rows.len() > limit {
        println!("\n... {} more (use --all)", rows.len() - limit);
    }

    Ok(())
}

fn calendar(view: CalendarView, date: NaiveDate, months: i32, ctx: &Ctx) -> Result<()> {
    let tasks = ctx.store.load_tasks()?;
    match view {
        CalendarView::Month => render_month(&tasks, shift_month(date, months), ctx.tz),
        CalendarView::Week => render_week(&tasks, date, ctx.tz),
        CalendarView::Day => render_day(&tasks, date, ctx.tz),
    }
    Ok(())
}

fn render_month(tasks: &[Task], anchor: NaiveDate, tz: Tz) {
    println!("# {}\n", anchor.format("%B %Y"));
    println!("Sun Mon Tue Wed Thu Fri Sat");

    let grid = month_grid(anchor);
    for week in grid.chunks(7) {
        let cells: Vec<String> = week
            .iter()
            .map(|cell| match cell {
                None => "   ".to_string(),
                Some(day) => {
                    let mark = if tasks_due_on(tasks, *day, &tz).is_empty() { ' ' } else { '*' };
                    format!("{:>2}{}", day.day(), mark)
                }
            })
            .collect();
        println!("{}", cells.join(" ").trim_end());
    }
    println!();

    for day in grid.iter().flatten() {
        let due = tasks_due_on(tasks, *day, &tz);
        if due.is_empty() {
            continue;
        }
        let (shown, hidden) = cell_preview(&due);
        let mut line = shown
            .iter()
            .map(|t| t.title.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        if hidden > 0 {
            line.push_str(&format!(" +{hidden} more"));
        }
        println!("{}: {}", day.format("%b %-d"), line);
    }
}

fn render_week(tasks: &[Task], date: NaiveDate, tz: Tz) {
    let week = week_of(date);
    println!(
        "# Week of {} - {}\n",
        week[0].format("%b %-d"),
        week[6].format("%b %-d, %Y")
    );
    for day in week {
        println!("{}", day.format("%a %b %-d"));
        for t in tasks_due_on(tasks, day, &tz) {
            println!("  - {} [{}] {}", t.title, t.priority, t.status);
        }
    }
}

fn render_day(tasks: &[Task], date: NaiveDate, tz: Tz) {
    let due = tasks_due_on(tasks, date, &tz);
    println!("# {}\n", date.format("%B %-d, %Y"));
    println!("{} tasks due\n", due.len());

    if due.is_empty() {
        println!("No tasks due today");
        println!("Enjoy your free day!");
        return;
    }

    for t in due {
        println!("{} ({})", t.title, t.status);
        println!(
            "   est {} | {} | {}",
            format_minutes(t.estimated_time),
            t.category,
            t.priority
        );
        if !t.description.is_empty() {
            println!("   {}", t.description);
        }
    }
}

/// Analytics plus the derived figures the text view shows.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyticsReport<'a> {
    #[serde(flatten)]
    analytics: &'a Analytics,
    completion_rate: f64,
    average_procrastination: f64,
    procrastination_level: ProcrastinationLevel,
    most_productive_hour: usize,
    insights: Vec<Insight>,
}

impl<'a> AnalyticsReport<'a> {
    fn new(analytics: &'a Analytics) -> Self {
        Self {
            analytics,
            completion_rate: analytics.completion_rate(),
            average_procrastination: analytics.average_procrastination(),
            procrastination_level: analytics.procrastination_level(),
            most_productive_hour: analytics.most_productive_hour(),
            insights: analytics.insights(),
        }
    }
}

fn analytics(json: bool, ctx: &Ctx) -> Result<()> {
    let tasks = ctx.store.load_tasks()?;
    let local_now = ctx.now.with_timezone(&ctx.tz);
    let a = compute_analytics(&tasks, &local_now);
    let report = AnalyticsReport::new(&a);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("# Analytics\n");
    println!(
        "Completion rate: {:.1}% ({} of {} tasks completed)",
        report.completion_rate, a.completed_tasks, a.total_tasks
    );
    println!(
        "Average completion time: {}",
        format_minutes(a.average_completion_time.round() as u32)
    );
    println!(
        "Average procrastination: {:.1}% ({} procrastination level)",
        report.average_procrastination,
        report.procrastination_level.label()
    );
    println!(
        "Most productive hour: {}",
        hour_label(report.most_productive_hour)
    );

    println!("\n## Procrastination trend (last {TREND_DAYS} days)\n");
    let today = local_now.date_naive();
    for (i, score) in a.procrastination_trend.iter().enumerate() {
        let back = (TREND_DAYS - 1 - i) as u64;
        let label = today
            .checked_sub_days(Days::new(back))
            .map(|d| d.format("%a").to_string())
            .unwrap_or_default();
        println!("{label:<4}{score:>6.1} {}", bar(*score, 100.0, 20));
    }

    println!("\n## Productivity by hour\n");
    let peak = a.productivity_by_hour.iter().copied().max().unwrap_or(0);
    if peak == 0 {
        println!("(no completed tasks with a completion time yet)");
    } else {
        for (hour, count) in a.productivity_by_hour.iter().enumerate() {
            if *count > 0 {
                println!(
                    "{:>8} {:>3} {}",
                    hour_label(hour),
                    count,
                    bar(f64::from(*count), f64::from(peak), 20)
                );
            }
        }
    }

    println!("\n## Task categories\n");
    if a.category_breakdown.is_empty() {
        println!("(no tasks)");
    }
    for (category, count) in &a.category_breakdown {
        println!(
            "{:<11}{:>3} tasks {:>5.1}%",
            category.as_str(),
            count,
            a.category_share(*category)
        );
    }

    println!("\n## Insights & recommendations\n");
    if report.insights.is_empty() {
        println!("Nothing to flag. Keep it up!");
    }
    for insight in &report.insights {
        println!("- {}: {}", insight.title(), insight.message());
    }

    Ok(())
}

fn sessions(task: Option<&str>, ctx: &Ctx) -> Result<()> {
    let tasks = ctx.store.load_tasks()?;
    let mut sessions = ctx.store.load_sessions()?;

    if let Some(id) = task {
        let wanted = tasks[find_task(&tasks, id)?].id.clone();
        sessions.retain(|s| s.task_id == wanted);
    }
    sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));

    if sessions.is_empty() {
        println!("No study sessions recorded. Start one with: studyplan start <id>");
        return Ok(());
    }

    for s in &sessions {
        let title = tasks
            .iter()
            .find(|t| t.id == s.task_id)
            .map(|t| t.title.as_str())
            .unwrap_or("(deleted task)");
        let duration = s
            .duration
            .map(format_minutes)
            .unwrap_or_else(|| "open".to_string());
        println!(
            "{} | {} | productivity {}/10 | {}",
            local_stamp(s.start_time, ctx.tz),
            title,
            s.productivity,
            duration
        );
    }

    Ok(())
}
