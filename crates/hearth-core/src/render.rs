use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use chrono::Datelike;
use unicode_width::UnicodeWidthStr;

use crate::axis::{AxisWindow, hour_label};
use crate::config::Config;
use crate::view::{DayColumn, DayView, EntryKind, MonthView, WeekView};

const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => io::stdout().is_terminal(),
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self { color })
    }

    #[must_use]
    pub fn plain() -> Self {
        Self { color: false }
    }

    #[tracing::instrument(skip(self, view))]
    pub fn print_month(&self, view: &MonthView<'_>) -> anyhow::Result<()> {
        self.write_month(io::stdout().lock(), view)
    }

    #[tracing::instrument(skip(self, view))]
    pub fn print_week(&self, view: &WeekView<'_>) -> anyhow::Result<()> {
        self.write_week(io::stdout().lock(), view)
    }

    #[tracing::instrument(skip(self, view))]
    pub fn print_day(&self, view: &DayView<'_>) -> anyhow::Result<()> {
        self.write_day(io::stdout().lock(), view)
    }

    /// Day numbers with item counts; `*` marks today, `~` marks padding days
    /// from the neighbouring months.
    pub fn write_month<W: Write>(&self, mut out: W, view: &MonthView<'_>) -> anyhow::Result<()> {
        writeln!(out, "{}", view.title)?;
        writeln!(out)?;

        let headers = WEEKDAY_LABELS.iter().map(ToString::to_string).collect();
        let rows = view
            .weeks()
            .map(|week| {
                week.iter()
                    .map(|cell| {
                        let mut label = format!("{:>2}", cell.date.day());
                        if !cell.in_month {
                            label.push('~');
                        }
                        if cell.is_today {
                            label = self.paint(&format!("{label}*"), "1;33");
                        }
                        match cell.item_count() {
                            0 => label,
                            count => format!("{label} ({count})"),
                        }
                    })
                    .collect::<Vec<String>>()
            })
            .collect();

        write_table(&mut out, headers, rows)
    }

    pub fn write_week<W: Write>(&self, mut out: W, view: &WeekView<'_>) -> anyhow::Result<()> {
        writeln!(out, "{}", view.title)?;
        for (idx, day) in view.days.iter().enumerate() {
            writeln!(out)?;
            let heading = format!("{} {}", WEEKDAY_LABELS[idx % WEEKDAY_LABELS.len()], day.key);
            let heading = if day.is_today {
                self.paint(&heading, "1;33")
            } else {
                heading
            };
            writeln!(out, "{heading}")?;
            self.write_column(&mut out, day)?;
        }
        Ok(())
    }

    pub fn write_day<W: Write>(&self, mut out: W, view: &DayView<'_>) -> anyhow::Result<()> {
        writeln!(out, "{}", view.title)?;
        writeln!(out)?;
        let hours = view
            .hours
            .iter()
            .map(|hour| hour_label(*hour))
            .collect::<Vec<_>>()
            .join(" | ");
        writeln!(out, "axis: {hours}")?;
        writeln!(out)?;
        self.write_column(&mut out, &view.column)
    }

    fn write_column<W: Write>(&self, mut out: W, day: &DayColumn<'_>) -> anyhow::Result<()> {
        if day.is_empty() {
            writeln!(out, "  (nothing scheduled)")?;
            return Ok(());
        }

        for entry in &day.all_day {
            let marker = match (entry.kind, entry.completed) {
                (EntryKind::Task, true) => "[x]",
                (EntryKind::Task, false) => "[ ]",
                (EntryKind::Event, _) => "all-day",
            };
            writeln!(
                out,
                "  {marker} {}",
                self.paint_hex(entry.title, entry.color)
            )?;
        }

        if !day.timed.is_empty() {
            let headers = ["Time", "Title", "Column", "Top", "Height", "Color"]
                .iter()
                .map(ToString::to_string)
                .collect();
            let rows = day
                .timed
                .iter()
                .map(|placed| {
                    vec![
                        format!("  {}-{}", placed.start, placed.end),
                        self.paint_hex(&placed.event.title, placed.color),
                        format!("{}/{}", placed.column + 1, placed.total_columns),
                        format!("{:.1}%", placed.top),
                        format!("{:.1}%", placed.height),
                        placed.color.to_string(),
                    ]
                })
                .collect();
            write_table(&mut out, headers, rows)?;
        }

        for event in &day.rejected {
            writeln!(
                out,
                "  ! {} has an unreadable time ({} - {})",
                event.title,
                event.start_time.as_deref().unwrap_or("?"),
                event.end_time.as_deref().unwrap_or("?")
            )?;
        }

        Ok(())
    }

    pub fn write_hours<W: Write>(&self, mut out: W, axis: &AxisWindow) -> anyhow::Result<()> {
        for hour in axis.grid_hours() {
            writeln!(out, "{hour:02}:00  {}", hour_label(hour))?;
        }
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }

    fn paint_hex(&self, text: &str, hex: &str) -> String {
        match parse_hex(hex) {
            Some((r, g, b)) => self.paint(text, &format!("38;2;{r};{g};{b}")),
            None => text.to_string(),
        }
    }
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for (header, width) in headers.iter().zip(widths.iter().copied()) {
        write!(writer, "{header:width$} ")?;
    }
    writeln!(writer)?;

    for &width in &widths {
        write!(writer, "{:-<width$} ", "")?;
    }
    writeln!(writer)?;

    for row in rows {
        for (cell, width) in row.iter().zip(widths.iter().copied()) {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = width.saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
