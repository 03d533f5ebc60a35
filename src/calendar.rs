use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

pub const GRID_CELLS: usize = 42;
pub const EVENT_DAYS: [u32; 4] = [5, 12, 19, 26];

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

/// Month being shown; `month` is zero based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarCursor {
    pub month: u32,
    pub year: i32,
}

impl CalendarCursor {
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            month: date.month0(),
            year: date.year(),
        }
    }

    pub fn previous(self) -> Self {
        if self.month == 0 {
            Self { month: 11, year: self.year - 1 }
        } else {
            Self { month: self.month - 1, ..self }
        }
    }

    pub fn next(self) -> Self {
        if self.month >= 11 {
            Self { month: 0, year: self.year + 1 }
        } else {
            Self { month: self.month + 1, ..self }
        }
    }

    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[self.month as usize % 12]
    }

    pub fn label(&self) -> String {
        format!("{} {}", self.month_name(), self.year)
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
    }

    pub fn days_in_month(&self) -> u32 {
        self.first_day()
            .and_then(|first| first.checked_add_months(Months::new(1)))
            .and_then(|next| next.pred_opt())
            .map(|last| last.day())
            .unwrap_or(31)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub day: u32,
    pub in_month: bool,
    pub today: bool,
    pub has_event: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarGrid {
    pub cursor: CalendarCursor,
    pub label: String,
    pub cells: Vec<DayCell>,
}

impl CalendarGrid {
    /// Six weeks starting on Sunday, padded with neighbouring months.
    pub fn build(cursor: CalendarCursor, today: NaiveDate) -> Self {
        let mut cells = Vec::with_capacity(GRID_CELLS);
        let leading = cursor
            .first_day()
            .map(|first| first.weekday().num_days_from_sunday())
            .unwrap_or(0);
        let previous_days = cursor.previous().days_in_month();

        for offset in (0..leading).rev() {
            cells.push(DayCell {
                day: previous_days - offset,
                in_month: false,
                today: false,
                has_event: false,
            });
        }

        let today_cursor = CalendarCursor::containing(today);
        for day in 1..=cursor.days_in_month() {
            cells.push(DayCell {
                day,
                in_month: true,
                today: today_cursor == cursor && today.day() == day,
                has_event: EVENT_DAYS.contains(&day),
            });
        }

        let trailing = GRID_CELLS.saturating_sub(cells.len());
        for day in 1..=trailing as u32 {
            cells.push(DayCell {
                day,
                in_month: false,
                today: false,
                has_event: false,
            });
        }

        Self {
            cursor,
            label: cursor.label(),
            cells,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn cursor_wraps_across_years() {
        let january = CalendarCursor { month: 0, year: 2026 };
        assert_eq!(january.previous(), CalendarCursor { month: 11, year: 2025 });
        let december = CalendarCursor { month: 11, year: 2026 };
        assert_eq!(december.next(), CalendarCursor { month: 0, year: 2027 });
        assert_eq!(december.previous().next(), december);
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(CalendarCursor { month: 1, year: 2024 }.days_in_month(), 29);
        assert_eq!(CalendarCursor { month: 1, year: 2026 }.days_in_month(), 28);
        assert_eq!(CalendarCursor { month: 11, year: 2026 }.days_in_month(), 31);
    }

    #[test]
    fn every_month_fills_forty_two_cells() {
        let today = date(2026, 10, 19);
        let mut cursor = CalendarCursor { month: 0, year: 2020 };
        for _ in 0..120 {
            let grid = CalendarGrid::build(cursor, today);
            assert_eq!(grid.cells.len(), GRID_CELLS, "{}", grid.label);
            cursor = cursor.next();
        }
    }

    #[test]
    fn grid_marks_leading_days_today_and_events() {
        // October 2026 starts on a Thursday.
        let cursor = CalendarCursor { month: 9, year: 2026 };
        let grid = CalendarGrid::build(cursor, date(2026, 10, 19));
        assert_eq!(grid.label, "October 2026");

        let leading: Vec<u32> = grid.cells.iter().take_while(|c| !c.in_month).map(|c| c.day).collect();
        assert_eq!(leading, vec![27, 28, 29, 30]);

        let today: Vec<u32> = grid.cells.iter().filter(|c| c.today).map(|c| c.day).collect();
        assert_eq!(today, vec![19]);

        let events: Vec<u32> = grid.cells.iter().filter(|c| c.has_event).map(|c| c.day).collect();
        assert_eq!(events, EVENT_DAYS.to_vec());

        let trailing: Vec<u32> = grid.cells.iter().rev().take_while(|c| !c.in_month).map(|c| c.day).collect();
        assert_eq!(trailing.len(), GRID_CELLS - 4 - 31);
        assert_eq!(trailing.last(), Some(&1));
    }

    #[test]
    fn today_only_marked_in_its_own_month() {
        let grid = CalendarGrid::build(CalendarCursor { month: 8, year: 2026 }, date(2026, 10, 19));
        assert!(grid.cells.iter().all(|c| !c.today));
    }
}
