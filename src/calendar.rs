//! Year grid construction.
//!
//! A year is laid out as one continuous sequence of weeks, Sunday first.
//! Incomplete weeks at both ends are filled with padding cells that stand
//! for the tail of the previous December and the head of the following
//! January.

use chrono::{Datelike, Month, NaiveDate, Weekday};
use num_traits::FromPrimitive;
use std::fmt;

pub const DAYS_PER_WEEK: usize = 7;

// The Gregorian calendar repeats every 400 years (146097 days, a whole
// number of weeks).
const GREGORIAN_CYCLE: i32 = 400;
const CYCLE_BASE: i32 = 2000;

const SATURDAY: u32 = 6;

pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

pub fn days_of_month(month: &Month, year: i32) -> u32 {
    match month {
        Month::February if is_leap_year(year) => 29,
        Month::February => 28,
        Month::April | Month::June | Month::September | Month::November => 30,
        _ => 31,
    }
}

pub fn days_of_year(year: i32) -> u32 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

/// Weekday of January 1st of `year`, valid for every `i32` year.
pub fn first_weekday(year: i32) -> Weekday {
    NaiveDate::from_ymd_opt(CYCLE_BASE + year.rem_euclid(GREGORIAN_CYCLE), 1, 1)
        .map_or(Weekday::Sun, |date| date.weekday())
}

pub fn months() -> impl Iterator<Item = Month> {
    (1..=12u32).filter_map(Month::from_u32)
}

/// Month from its zero-based index (January = 0).
pub fn month_from_index(index: u32) -> Option<Month> {
    Month::from_u32(index + 1)
}

pub fn month_index(month: &Month) -> u32 {
    month.number_from_month() - 1
}

/// Composite key of a calendar date.
///
/// The month is zero-based. Components are not validated: two keys are
/// equal iff year, month and day are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateKey {
    year: i32,
    month: u32,
    day: u32,
}

impl DateKey {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        DateKey { year, month, day }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month0(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn month(&self) -> Option<Month> {
        month_from_index(self.month)
    }

    pub fn to_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month + 1, self.day)
    }
}

impl<T: Datelike> From<&T> for DateKey {
    fn from(date: &T) -> Self {
        DateKey::new(date.year(), date.month0(), date.day())
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month + 1, self.day)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Tail of the previous year's December.
    Leading,
    Day(Month),
    /// Head of the following year's January.
    Trailing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CalendarCell {
    kind: CellKind,
    day: u32,
}

impl CalendarCell {
    pub fn leading(day: u32) -> Self {
        CalendarCell {
            kind: CellKind::Leading,
            day,
        }
    }

    pub fn day_of(month: Month, day: u32) -> Self {
        CalendarCell {
            kind: CellKind::Day(month),
            day,
        }
    }

    pub fn trailing(day: u32) -> Self {
        CalendarCell {
            kind: CellKind::Trailing,
            day,
        }
    }

    pub fn kind(&self) -> CellKind {
        self.kind
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn is_padding(&self) -> bool {
        !matches!(self.kind, CellKind::Day(_))
    }

    /// Month of a real day, `None` for padding.
    pub fn month(&self) -> Option<Month> {
        match self.kind {
            CellKind::Day(month) => Some(month),
            _ => None,
        }
    }

    /// Zero-based month, `-1` for padding cells of either end.
    pub fn month0(&self) -> i32 {
        self.month().map_or(-1, |m| month_index(&m) as i32)
    }

    /// The month this cell belongs to on a wall calendar, padding included.
    pub fn calendar_month(&self) -> Month {
        match self.kind {
            CellKind::Leading => Month::December,
            CellKind::Day(month) => month,
            CellKind::Trailing => Month::January,
        }
    }

    /// The real date this cell stands for when the grid shows `year`.
    pub fn key(&self, year: i32) -> DateKey {
        match self.kind {
            CellKind::Leading => DateKey::new(year.saturating_sub(1), 11, self.day),
            CellKind::Day(month) => DateKey::new(year, month_index(&month), self.day),
            CellKind::Trailing => DateKey::new(year.saturating_add(1), 0, self.day),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarGrid {
    year: i32,
    cells: Vec<CalendarCell>,
}

impl CalendarGrid {
    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn cells(&self) -> &[CalendarCell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CalendarCell> {
        self.cells.get(index)
    }

    pub fn weeks(&self) -> std::slice::Chunks<'_, CalendarCell> {
        self.cells.chunks(DAYS_PER_WEEK)
    }

    pub fn num_weeks(&self) -> usize {
        self.cells.len() / DAYS_PER_WEEK
    }

    pub fn week_of(index: usize) -> usize {
        index / DAYS_PER_WEEK
    }

    pub fn real_days(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_padding()).count()
    }

    pub fn key_at(&self, index: usize) -> Option<DateKey> {
        self.cells.get(index).map(|cell| cell.key(self.year))
    }

    /// Index of the real cell for `day` of `month`.
    pub fn position_of(&self, month: Month, day: u32) -> Option<usize> {
        self.cells
            .iter()
            .position(|cell| cell.kind == CellKind::Day(month) && cell.day == day)
    }

    /// The month whose label is shown on the cell at `index`, if it is the
    /// first cell of a month run.
    pub fn month_label(&self, index: usize) -> Option<Month> {
        let cell = self.cells.get(index)?;
        if index == 0 || self.cells[index - 1].kind != cell.kind {
            Some(cell.calendar_month())
        } else {
            None
        }
    }

    /// The month marked by a real 15th in the given week.
    pub fn month_marker(&self, week: usize) -> Option<Month> {
        self.weeks()
            .nth(week)?
            .iter()
            .find(|cell| cell.day == 15)
            .and_then(CalendarCell::month)
    }
}

pub fn build_year_grid(year: i32) -> CalendarGrid {
    let start = first_weekday(year).num_days_from_sunday();
    let mut cells = Vec::with_capacity(DAYS_PER_WEEK * 54);

    // A year starting on Saturday gets no leading padding, so its first
    // week begins in the Sunday column.
    if start < SATURDAY {
        for i in 0..start {
            cells.push(CalendarCell::leading(32 - start + i));
        }
    }

    for month in months() {
        for day in 1..=days_of_month(&month, year) {
            cells.push(CalendarCell::day_of(month, day));
        }
    }

    let last_week_days = cells.len() % DAYS_PER_WEEK;
    if last_week_days > 0 {
        for day in 1..=(DAYS_PER_WEEK - last_week_days) as u32 {
            cells.push(CalendarCell::trailing(day));
        }
    }

    CalendarGrid { year, cells }
}
