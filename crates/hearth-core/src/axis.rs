//! Vertical time axis for the week and day views.
//!
//! Positions and heights are percentages of the [`AxisWindow`], so the
//! presentation layer can scale them to any pixel height.

use crate::clock::ClockTime;
use crate::error::CalendarError;

pub const DEFAULT_START_HOUR: u32 = 6;
pub const DEFAULT_END_HOUR: u32 = 22;
pub const DEFAULT_SNAP_MINUTES: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisWindow {
    start_hour: u32,
    end_hour: u32,
}

impl Default for AxisWindow {
    fn default() -> Self {
        Self {
            start_hour: DEFAULT_START_HOUR,
            end_hour: DEFAULT_END_HOUR,
        }
    }
}

impl AxisWindow {
    pub fn new(start_hour: u32, end_hour: u32) -> Result<Self, CalendarError> {
        if start_hour >= end_hour || end_hour > 24 {
            return Err(CalendarError::InvalidAxisWindow {
                start_hour,
                end_hour,
            });
        }
        Ok(Self {
            start_hour,
            end_hour,
        })
    }

    #[must_use]
    pub fn start_hour(&self) -> u32 {
        self.start_hour
    }

    #[must_use]
    pub fn end_hour(&self) -> u32 {
        self.end_hour
    }

    #[must_use]
    pub fn window_minutes(&self) -> u32 {
        (self.end_hour - self.start_hour) * 60
    }

    /// Top offset of `time` as a percentage of the window, clamped to
    /// `0..=100`.
    #[must_use]
    pub fn time_position(&self, time: ClockTime) -> f64 {
        let offset = f64::from(time.minutes_since_midnight()) - f64::from(self.start_hour * 60);
        (offset / f64::from(self.window_minutes()) * 100.0).clamp(0.0, 100.0)
    }

    /// Height of `start..end` as a percentage of the window. Never negative;
    /// not capped at 100.
    #[must_use]
    pub fn event_height(&self, start: ClockTime, end: ClockTime) -> f64 {
        let duration =
            f64::from(end.minutes_since_midnight()) - f64::from(start.minutes_since_midnight());
        (duration / f64::from(self.window_minutes()) * 100.0).max(0.0)
    }

    /// Tick hours, both ends included.
    #[must_use]
    pub fn grid_hours(&self) -> Vec<u32> {
        (self.start_hour..=self.end_hour).collect()
    }

    /// The clock time under a click at `fraction` (0.0 top, 1.0 bottom) of
    /// the rendered grid, rounded to the nearest `snap_minutes`.
    ///
    /// The rendered grid has one row per tick hour, so it is one hour taller
    /// than the window itself.
    #[must_use]
    pub fn time_at_fraction(&self, fraction: f64, snap_minutes: u32) -> ClockTime {
        let rows = self.grid_hours().len() as f64;
        let offset = fraction.clamp(0.0, 1.0) * rows * 60.0;
        let total = f64::from(self.start_hour * 60) + offset;

        let snap = f64::from(snap_minutes.max(1));
        let hour = (total / 60.0).floor();
        let minute = ((total - hour * 60.0) / snap).round() * snap;

        tracing::trace!(fraction, hour, minute, "resolved grid click");
        ClockTime::from_minutes_clamped((hour * 60.0 + minute) as i64)
    }
}

/// `6 AM`, `12 PM`, `10 PM`; midnight is `12 AM` at either end of the day.
#[must_use]
pub fn hour_label(hour: u32) -> String {
    match hour {
        0 | 24 => "12 AM".to_string(),
        12 => "12 PM".to_string(),
        h if h < 12 => format!("{h} AM"),
        h => format!("{} PM", h - 12),
    }
}

#[cfg(test)]
mod tests {
    use super::{AxisWindow, hour_label};
    use crate::clock::ClockTime;

    fn t(raw: &str) -> ClockTime {
        raw.parse().expect("valid clock time")
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn positions_on_default_window() {
        let axis = AxisWindow::default();
        assert!(approx(axis.time_position(t("06:00")), 0.0));
        assert!(approx(axis.time_position(t("14:00")), 50.0));
        assert!(approx(axis.time_position(t("22:00")), 100.0));
    }

    #[test]
    fn positions_clamp_outside_window() {
        let axis = AxisWindow::default();
        assert!(approx(axis.time_position(t("05:15")), 0.0));
        assert!(approx(axis.time_position(t("23:30")), 100.0));
    }

    #[test]
    fn heights_never_go_negative() {
        let axis = AxisWindow::default();
        assert!(approx(axis.event_height(t("09:00"), t("10:00")), 6.25));
        assert!(approx(axis.event_height(t("09:00"), t("09:00")), 0.0));
        assert!(approx(axis.event_height(t("11:00"), t("10:00")), 0.0));
        assert!(axis.event_height(t("00:00"), t("23:59")) > 100.0);
    }

    #[test]
    fn grid_hours_are_inclusive() {
        let hours = AxisWindow::default().grid_hours();
        assert_eq!(hours.first(), Some(&6));
        assert_eq!(hours.last(), Some(&22));
        assert_eq!(hours.len(), 17);
    }

    #[test]
    fn custom_windows_are_validated() {
        assert!(AxisWindow::new(8, 8).is_err());
        assert!(AxisWindow::new(10, 9).is_err());
        assert!(AxisWindow::new(0, 25).is_err());
        let full = AxisWindow::new(0, 24).expect("full day");
        assert_eq!(full.window_minutes(), 1440);
        assert!(approx(full.time_position(t("12:00")), 50.0));
    }

    #[test]
    fn click_fraction_snaps_to_quarter_hours() {
        let axis = AxisWindow::default();
        assert_eq!(axis.time_at_fraction(0.0, 15), t("06:00"));
        // 17 rows of 60 minutes: half way is 8h30m past 06:00.
        assert_eq!(axis.time_at_fraction(0.5, 15), t("14:30"));
        // 07:53 rounds up into the next hour.
        let fraction = 113.0 / (17.0 * 60.0);
        assert_eq!(axis.time_at_fraction(fraction, 15), t("08:00"));
        assert_eq!(axis.time_at_fraction(1.0, 15), t("23:00"));
    }

    #[test]
    fn hour_labels_use_twelve_hour_clock() {
        assert_eq!(hour_label(0), "12 AM");
        assert_eq!(hour_label(6), "6 AM");
        assert_eq!(hour_label(12), "12 PM");
        assert_eq!(hour_label(22), "10 PM");
        assert_eq!(hour_label(24), "12 AM");
    }
}
