use thiserror::Error;

/// Errors raised by the calendar layout components when an input cannot be
/// represented. Application-level code wraps these in `anyhow`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("invalid clock time {raw:?}: expected HH:MM")]
    InvalidClockTime { raw: String },

    #[error("invalid date key {raw:?}: expected YYYY-MM-DD")]
    InvalidDateKey { raw: String },

    #[error("invalid axis window {start_hour}-{end_hour}: need start < end <= 24")]
    InvalidAxisWindow { start_hour: u32, end_hour: u32 },

    #[error("date out of range: {context}")]
    DateOutOfRange { context: String },
}

impl CalendarError {
    pub(crate) fn out_of_range(context: impl Into<String>) -> Self {
        Self::DateOutOfRange {
            context: context.into(),
        }
    }
}
