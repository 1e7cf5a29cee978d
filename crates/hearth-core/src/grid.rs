use chrono::{
  Datelike,
  Days,
  NaiveDate
};

use crate::error::CalendarError;

pub const GRID_ROWS: usize = 6;
pub const GRID_COLUMNS: usize = 7;
pub const GRID_CELLS: usize =
  GRID_ROWS * GRID_COLUMNS;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum ViewMode {
  Month,
  Week,
  Day
}

impl ViewMode {
  #[must_use]
  pub fn from_key(
    raw: &str
  ) -> Option<Self> {
    match raw
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "month" => Some(Self::Month),
      | "week" => Some(Self::Week),
      | "day" => Some(Self::Day),
      | _ => None
    }
  }

  #[must_use]
  pub fn as_key(self) -> &'static str {
    match self {
      | Self::Month => "month",
      | Self::Week => "week",
      | Self::Day => "day"
    }
  }
}

/// Six Sunday-first weeks covering one
/// month, padded with the neighbouring
/// months' days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
  year:  i32,
  month: u32,
  rows:  [[NaiveDate; GRID_COLUMNS];
    GRID_ROWS]
}

impl MonthGrid {
  #[must_use]
  pub fn year(&self) -> i32 {
    self.year
  }

  /// One-based month the grid was
  /// built for, after normalization.
  #[must_use]
  pub fn month(&self) -> u32 {
    self.month
  }

  #[must_use]
  pub fn rows(
    &self
  ) -> &[[NaiveDate; GRID_COLUMNS];
       GRID_ROWS] {
    &self.rows
  }

  pub fn dates(
    &self
  ) -> impl Iterator<Item = NaiveDate> + '_
  {
    self.rows.iter().flatten().copied()
  }

  #[must_use]
  pub fn first(&self) -> NaiveDate {
    self.rows[0][0]
  }

  #[must_use]
  pub fn last(&self) -> NaiveDate {
    self.rows[GRID_ROWS - 1]
      [GRID_COLUMNS - 1]
  }

  #[must_use]
  pub fn contains(
    &self,
    date: NaiveDate
  ) -> bool {
    date >= self.first()
      && date <= self.last()
  }

  #[must_use]
  pub fn in_month(
    &self,
    date: NaiveDate
  ) -> bool {
    date.year() == self.year
      && date.month() == self.month
  }
}

/// Builds the 42-day grid for `month0`
/// (zero-based) of `year`. Months
/// outside 0..=11 roll into adjacent
/// years.
#[tracing::instrument]
pub fn month_grid(
  year: i32,
  month0: i32
) -> Result<MonthGrid, CalendarError> {
  let (year, month) =
    normalize_month(
      i64::from(year),
      i64::from(month0)
    )?;
  let first =
    first_day_of_month(year, month)?;
  let grid_start = start_of_week(first)?;

  let mut rows =
    [[grid_start; GRID_COLUMNS];
      GRID_ROWS];
  for (row_idx, row) in
    rows.iter_mut().enumerate()
  {
    for (col_idx, cell) in
      row.iter_mut().enumerate()
    {
      let offset =
        row_idx * GRID_COLUMNS + col_idx;
      *cell = add_days(
        grid_start,
        offset as i64
      )?;
    }
  }

  tracing::trace!(
    year,
    month,
    start = %grid_start,
    "built month grid"
  );

  Ok(MonthGrid {
    year,
    month,
    rows
  })
}

/// The Sunday-first week containing
/// `date`.
pub fn week_dates(
  date: NaiveDate
) -> Result<
  [NaiveDate; GRID_COLUMNS],
  CalendarError
> {
  let sunday = start_of_week(date)?;
  let mut days = [sunday; GRID_COLUMNS];
  for (idx, day) in
    days.iter_mut().enumerate()
  {
    *day =
      add_days(sunday, idx as i64)?;
  }
  Ok(days)
}

/// First and last day a view needs
/// data for. The month view asks for
/// the whole padded grid.
pub fn view_range(
  view: ViewMode,
  focus: NaiveDate
) -> Result<
  (NaiveDate, NaiveDate),
  CalendarError
> {
  match view {
    | ViewMode::Day => Ok((focus, focus)),
    | ViewMode::Week => {
      let week = week_dates(focus)?;
      Ok((
        week[0],
        week[GRID_COLUMNS - 1]
      ))
    }
    | ViewMode::Month => {
      let grid = month_grid(
        focus.year(),
        focus.month0() as i32
      )?;
      Ok((grid.first(), grid.last()))
    }
  }
}

/// Moves the focus date `step` views
/// forward (negative steps move back).
pub fn shift_focus(
  focus: NaiveDate,
  view: ViewMode,
  step: i64
) -> Result<NaiveDate, CalendarError> {
  match view {
    | ViewMode::Month => {
      shift_months(focus, step)
    }
    | ViewMode::Week => {
      add_days(
        focus,
        step.saturating_mul(7)
      )
    }
    | ViewMode::Day => {
      add_days(focus, step)
    }
  }
}

pub fn view_title(
  view: ViewMode,
  focus: NaiveDate
) -> Result<String, CalendarError> {
  let title = match view {
    | ViewMode::Month => {
      focus.format("%B %Y").to_string()
    }
    | ViewMode::Week => {
      let week = week_dates(focus)?;
      let (start, end) = (
        week[0],
        week[GRID_COLUMNS - 1]
      );
      if start.year() == end.year() {
        format!(
          "{} – {}",
          start.format("%b %-d"),
          end.format("%b %-d, %Y")
        )
      } else {
        format!(
          "{} – {}",
          start.format("%b %-d, %Y"),
          end.format("%b %-d, %Y")
        )
      }
    }
    | ViewMode::Day => {
      focus
        .format("%A, %B %-d, %Y")
        .to_string()
    }
  };
  Ok(title)
}

fn normalize_month(
  year: i64,
  month0: i64
) -> Result<(i32, u32), CalendarError> {
  let total = year
    .checked_mul(12)
    .and_then(|months| {
      months.checked_add(month0)
    })
    .ok_or_else(|| {
      CalendarError::out_of_range(
        format!(
          "year {year} month {month0}"
        )
      )
    })?;
  let year =
    i32::try_from(total.div_euclid(12))
      .map_err(|_| {
        CalendarError::out_of_range(
          format!("year {year}")
        )
      })?;
  let month =
    total.rem_euclid(12) as u32 + 1;
  Ok((year, month))
}

fn first_day_of_month(
  year: i32,
  month: u32
) -> Result<NaiveDate, CalendarError> {
  NaiveDate::from_ymd_opt(
    year, month, 1
  )
  .ok_or_else(|| {
    CalendarError::out_of_range(
      format!("{year}-{month:02}-01")
    )
  })
}

fn days_in_month(
  year: i32,
  month: u32
) -> Result<u32, CalendarError> {
  let (next_year, next_month) =
    normalize_month(
      i64::from(year),
      i64::from(month)
    )?;
  let last = first_day_of_month(
    next_year, next_month
  )?
  .pred_opt()
  .ok_or_else(|| {
    CalendarError::out_of_range(
      format!(
        "last day of {year}-{month:02}"
      )
    )
  })?;
  Ok(last.day())
}

fn shift_months(
  date: NaiveDate,
  months: i64
) -> Result<NaiveDate, CalendarError> {
  let (year, month) = normalize_month(
    i64::from(date.year()),
    i64::from(date.month0())
      .saturating_add(months)
  )?;
  let day = date
    .day()
    .min(days_in_month(year, month)?);
  NaiveDate::from_ymd_opt(
    year, month, day
  )
  .ok_or_else(|| {
    CalendarError::out_of_range(
      format!(
        "{year}-{month:02}-{day:02}"
      )
    )
  })
}

fn start_of_week(
  day: NaiveDate
) -> Result<NaiveDate, CalendarError> {
  let diff = day
    .weekday()
    .num_days_from_sunday();
  add_days(day, -i64::from(diff))
}

fn add_days(
  date: NaiveDate,
  days: i64
) -> Result<NaiveDate, CalendarError> {
  let shifted = if days >= 0 {
    date.checked_add_days(Days::new(
      days.unsigned_abs()
    ))
  } else {
    date.checked_sub_days(Days::new(
      days.unsigned_abs()
    ))
  };
  shifted.ok_or_else(|| {
    CalendarError::out_of_range(
      format!("{date} {days:+} days")
    )
  })
}
