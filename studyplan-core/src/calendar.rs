//! Calendar helpers: month grid, week strip and per-day task lookup.
//!
//! Weeks start on Sunday. Days are local calendar days in the caller's zone.

use chrono::{Datelike, Days, Months, NaiveDate, TimeZone};

use crate::task::Task;

/// Tasks listed in a month cell before collapsing the rest into "+N more".
pub const MONTH_CELL_PREVIEW: usize = 3;

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.weekday().num_days_from_sunday()))
}

/// Cells for the month containing `date`: `None` padding up to the first
/// weekday, then every day of the month.
pub fn month_grid(date: NaiveDate) -> Vec<Option<NaiveDate>> {
    let first = first_of_month(date);
    let padding = first.weekday().num_days_from_sunday() as usize;

    std::iter::repeat_n(None, padding)
        .chain(
            first
                .iter_days()
                .take_while(|d| d.month() == first.month())
                .map(Some),
        )
        .collect()
}

/// The Sunday-start week containing `date`.
pub fn week_of(date: NaiveDate) -> [NaiveDate; 7] {
    let start = start_of_week(date);
    std::array::from_fn(|i| start + Days::new(i as u64))
}

/// Move by whole months; the day clamps to the target month's length.
pub fn shift_month(date: NaiveDate, months: i32) -> NaiveDate {
    let step = Months::new(months.unsigned_abs());
    let shifted = if months >= 0 {
        date.checked_add_months(step)
    } else {
        date.checked_sub_months(step)
    };
    shifted.unwrap_or(date)
}

/// Tasks due on `day` in `tz`, in input order.
pub fn tasks_due_on<'a, Tz: TimeZone>(tasks: &'a [Task], day: NaiveDate, tz: &Tz) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| {
            t.due_date
                .is_some_and(|due| due.with_timezone(tz).date_naive() == day)
        })
        .collect()
}

/// Split a day's tasks into what a month cell shows and how many are hidden.
pub fn cell_preview<'a, 'b>(tasks: &'b [&'a Task]) -> (&'b [&'a Task], usize) {
    let shown = tasks.len().min(MONTH_CELL_PREVIEW);
    (&tasks[..shown], tasks.len() - shown)
}
