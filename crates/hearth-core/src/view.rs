//! Renderable month, week and day views.
//!
//! A [`ViewBuilder`] ties the pure pieces together: the grid picks the dates,
//! bucketing finds each day's items, timed events are validated, laid out in
//! columns and placed on the hour axis, and every item gets its member color.

use chrono::{Datelike, NaiveDate};
use tracing::{debug, instrument, warn};

use crate::axis::AxisWindow;
use crate::bucket::{DateBucketMap, group_by_date};
use crate::clock::ClockTime;
use crate::color::{MemberColorRef, resolve_color};
use crate::datekey::format_date_key;
use crate::error::CalendarError;
use crate::grid::{MonthGrid, ViewMode, month_grid, view_title, week_dates};
use crate::layout::layout_events;
use crate::model::{Assignable, CalendarData, CalendarEvent, Task, TimedEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Task,
    Event,
}

/// One bar in a day's all-day banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllDayEntry<'a> {
    pub kind: EntryKind,
    pub id: i64,
    pub title: &'a str,
    pub completed: bool,
    pub color: &'a str,
}

/// A timed event placed on the hour axis. All geometry is in percent: `top`
/// and `height` of the axis window, `left` and `width` of the day column.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedEvent<'a> {
    pub event: &'a CalendarEvent,
    pub start: ClockTime,
    pub end: ClockTime,
    pub column: usize,
    pub total_columns: usize,
    pub top: f64,
    pub height: f64,
    pub left: f64,
    pub width: f64,
    pub color: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayColumn<'a> {
    pub date: NaiveDate,
    pub key: String,
    pub is_today: bool,
    pub all_day: Vec<AllDayEntry<'a>>,
    pub timed: Vec<PositionedEvent<'a>>,
    /// Timed events left off the axis because their times did not parse.
    pub rejected: Vec<&'a CalendarEvent>,
}

impl DayColumn<'_> {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.all_day.is_empty() && self.timed.is_empty() && self.rejected.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthCell<'a> {
    pub date: NaiveDate,
    pub key: String,
    pub in_month: bool,
    pub is_today: bool,
    pub tasks: Vec<&'a Task>,
    pub events: Vec<&'a CalendarEvent>,
}

impl MonthCell<'_> {
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.tasks.len() + self.events.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthView<'a> {
    pub title: String,
    pub grid: MonthGrid,
    pub cells: Vec<MonthCell<'a>>,
}

impl<'a> MonthView<'a> {
    pub fn weeks(&self) -> impl Iterator<Item = &[MonthCell<'a>]> {
        self.cells.chunks(crate::grid::GRID_COLUMNS)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeekView<'a> {
    pub title: String,
    pub hours: Vec<u32>,
    pub days: Vec<DayColumn<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayView<'a> {
    pub title: String,
    pub hours: Vec<u32>,
    pub column: DayColumn<'a>,
}

struct Buckets<'a> {
    tasks: DateBucketMap<&'a Task>,
    events: DateBucketMap<&'a CalendarEvent>,
}

pub struct ViewBuilder<'a> {
    data: &'a CalendarData,
    axis: AxisWindow,
    today: NaiveDate,
}

impl<'a> ViewBuilder<'a> {
    #[must_use]
    pub fn new(data: &'a CalendarData, axis: AxisWindow, today: NaiveDate) -> Self {
        Self { data, axis, today }
    }

    fn buckets(&self) -> Buckets<'a> {
        Buckets {
            tasks: group_by_date(&self.data.tasks, |task| task.due_date.as_deref()),
            events: group_by_date(&self.data.events, |event| event.date.as_deref()),
        }
    }

    #[instrument(skip(self))]
    pub fn month(&self, focus: NaiveDate) -> Result<MonthView<'a>, CalendarError> {
        let grid = month_grid(focus.year(), focus.month0() as i32)?;
        let buckets = self.buckets();

        let cells: Vec<MonthCell<'a>> = grid
            .dates()
            .map(|date| {
                let key = format_date_key(date);
                MonthCell {
                    date,
                    in_month: grid.in_month(date),
                    is_today: date == self.today,
                    tasks: buckets.tasks.get(&key).cloned().unwrap_or_default(),
                    events: buckets.events.get(&key).cloned().unwrap_or_default(),
                    key,
                }
            })
            .collect();

        debug!(
            cells = cells.len(),
            items = cells.iter().map(MonthCell::item_count).sum::<usize>(),
            "built month view"
        );

        Ok(MonthView {
            title: view_title(ViewMode::Month, focus)?,
            grid,
            cells,
        })
    }

    #[instrument(skip(self))]
    pub fn week(&self, focus: NaiveDate) -> Result<WeekView<'a>, CalendarError> {
        let buckets = self.buckets();
        let days = week_dates(focus)?
            .into_iter()
            .map(|date| self.day_column(date, &buckets))
            .collect();

        Ok(WeekView {
            title: view_title(ViewMode::Week, focus)?,
            hours: self.axis.grid_hours(),
            days,
        })
    }

    #[instrument(skip(self))]
    pub fn day(&self, focus: NaiveDate) -> Result<DayView<'a>, CalendarError> {
        let buckets = self.buckets();
        Ok(DayView {
            title: view_title(ViewMode::Day, focus)?,
            hours: self.axis.grid_hours(),
            column: self.day_column(focus, &buckets),
        })
    }

    fn color_of<A: Assignable>(&self, item: &'a A) -> &'a str {
        resolve_color(MemberColorRef::from_member(self.data.member_for(item)))
    }

    fn day_column(&self, date: NaiveDate, buckets: &Buckets<'a>) -> DayColumn<'a> {
        let key = format_date_key(date);
        let tasks = buckets.tasks.get(&key).map(Vec::as_slice).unwrap_or_default();
        let events = buckets.events.get(&key).map(Vec::as_slice).unwrap_or_default();

        let mut all_day: Vec<AllDayEntry<'a>> = tasks
            .iter()
            .map(|&task| AllDayEntry {
                kind: EntryKind::Task,
                id: task.id,
                title: task.title.as_str(),
                completed: task.completed,
                color: self.color_of(task),
            })
            .collect();

        let mut timed_events: Vec<TimedEvent<'a>> = Vec::new();
        let mut rejected: Vec<&'a CalendarEvent> = Vec::new();
        for &event in events {
            match TimedEvent::from_event(event) {
                Ok(Some(timed)) => timed_events.push(timed),
                Ok(None) => all_day.push(AllDayEntry {
                    kind: EntryKind::Event,
                    id: event.id,
                    title: event.title.as_str(),
                    completed: false,
                    color: self.color_of(event),
                }),
                Err(err) => {
                    warn!(
                        event = event.id,
                        date = %key,
                        error = %err,
                        "leaving event with malformed time off the grid"
                    );
                    rejected.push(event);
                }
            }
        }

        let timed = layout_events(&timed_events)
            .into_iter()
            .map(|slot| {
                let timed = *slot.event;
                let total = slot.total_columns as f64;
                PositionedEvent {
                    event: timed.event,
                    start: timed.start,
                    end: timed.end,
                    column: slot.column,
                    total_columns: slot.total_columns,
                    top: self.axis.time_position(timed.start),
                    height: self.axis.event_height(timed.start, timed.end),
                    left: slot.column as f64 / total * 100.0,
                    width: 100.0 / total,
                    color: self.color_of(timed.event),
                }
            })
            .collect();

        DayColumn {
            date,
            is_today: date == self.today,
            key,
            all_day,
            timed,
            rejected,
        }
    }
}
