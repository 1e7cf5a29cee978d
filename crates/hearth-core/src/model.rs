use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clock::ClockTime;
use crate::error::CalendarError;
use crate::layout::TimedItem;

pub type MemberId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyMember {
    pub id: MemberId,
    pub name: String,

    #[serde(default)]
    pub is_system: bool,

    #[serde(default)]
    pub color: Option<String>,
}

/// An all-day item: only a due date, no time of day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,

    /// `YYYY-MM-DD` or a full date-time; only the day part matters here.
    #[serde(default)]
    pub due_date: Option<String>,

    #[serde(default)]
    pub completed: bool,

    #[serde(default)]
    pub assigned_to: Option<MemberId>,

    #[serde(default)]
    pub family_member: Option<FamilyMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: i64,
    pub title: String,

    #[serde(default)]
    pub date: Option<String>,

    #[serde(default)]
    pub all_day: bool,

    #[serde(default)]
    pub start_time: Option<String>,

    #[serde(default)]
    pub end_time: Option<String>,

    #[serde(default)]
    pub assigned_to: Option<MemberId>,

    #[serde(default)]
    pub family_member: Option<FamilyMember>,
}

impl CalendarEvent {
    /// Timed events go on the hour axis; the rest join the all-day banner.
    #[must_use]
    pub fn is_timed(&self) -> bool {
        !self.all_day && non_empty(self.start_time.as_deref()).is_some()
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.filter(|value| !value.trim().is_empty())
}

/// Items that may be assigned to a family member.
pub trait Assignable {
    fn assigned_to(&self) -> Option<MemberId>;
    fn embedded_member(&self) -> Option<&FamilyMember>;
}

impl Assignable for Task {
    fn assigned_to(&self) -> Option<MemberId> {
        self.assigned_to
    }

    fn embedded_member(&self) -> Option<&FamilyMember> {
        self.family_member.as_ref()
    }
}

impl Assignable for CalendarEvent {
    fn assigned_to(&self) -> Option<MemberId> {
        self.assigned_to
    }

    fn embedded_member(&self) -> Option<&FamilyMember> {
        self.family_member.as_ref()
    }
}

/// An event whose clock times passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedEvent<'a> {
    pub event: &'a CalendarEvent,
    pub start: ClockTime,
    pub end: ClockTime,
}

impl<'a> TimedEvent<'a> {
    /// `Ok(None)` for all-day events. A missing end time makes a zero-length
    /// event; a malformed start or end is an error.
    pub fn from_event(event: &'a CalendarEvent) -> Result<Option<Self>, CalendarError> {
        if !event.is_timed() {
            return Ok(None);
        }
        let Some(raw_start) = non_empty(event.start_time.as_deref()) else {
            return Ok(None);
        };
        let start: ClockTime = raw_start.parse()?;
        let end = match non_empty(event.end_time.as_deref()) {
            Some(raw_end) => raw_end.parse()?,
            None => start,
        };
        Ok(Some(Self { event, start, end }))
    }
}

impl TimedItem for TimedEvent<'_> {
    fn start_time(&self) -> ClockTime {
        self.start
    }

    fn end_time(&self) -> ClockTime {
        self.end
    }
}

/// A snapshot of what the household service returned for a date window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarData {
    #[serde(default)]
    pub tasks: Vec<Task>,

    #[serde(default)]
    pub events: Vec<CalendarEvent>,

    #[serde(default)]
    pub family_members: Vec<FamilyMember>,
}

impl CalendarData {
    /// Reads a JSON snapshot. A missing file is an empty calendar.
    #[tracing::instrument]
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            warn!(file = %path.display(), "calendar snapshot not found; using empty calendar");
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let data = Self::from_json(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        info!(
            file = %path.display(),
            tasks = data.tasks.len(),
            events = data.events.len(),
            members = data.family_members.len(),
            "loaded calendar snapshot"
        );
        Ok(data)
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw).context("invalid calendar snapshot json")
    }

    #[must_use]
    pub fn member(&self, id: MemberId) -> Option<&FamilyMember> {
        self.family_members.iter().find(|member| member.id == id)
    }

    /// The member an item belongs to: looked up by id first, then the copy
    /// embedded in the item itself.
    pub fn member_for<'a, A: Assignable>(&'a self, item: &'a A) -> Option<&'a FamilyMember> {
        item.assigned_to()
            .and_then(|id| self.member(id))
            .or_else(|| item.embedded_member())
    }

    /// Keeps unassigned items and items of `active` members. `None` keeps
    /// everything.
    #[must_use]
    pub fn filter_members(&self, active: Option<&BTreeSet<MemberId>>) -> Self {
        let Some(active) = active else {
            return self.clone();
        };

        let visible = |item: &dyn Assignable| {
            item.assigned_to().is_none_or(|id| active.contains(&id))
        };
        let filtered = Self {
            tasks: self.tasks.iter().filter(|task| visible(*task)).cloned().collect(),
            events: self.events.iter().filter(|event| visible(*event)).cloned().collect(),
            family_members: self.family_members.clone(),
        };

        debug!(
            active = ?active,
            tasks = filtered.tasks.len(),
            events = filtered.events.len(),
            "applied member filter"
        );
        filtered
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{CalendarData, CalendarEvent, TimedEvent};
    use crate::error::CalendarError;

    const SNAPSHOT: &str = r##"{
        "tasks": [
            {"id": 1, "title": "Trash", "due_date": "2026-10-19", "assigned_to": 2},
            {"id": 2, "title": "Groceries", "due_date": null, "assigned_to": null},
            {"id": 3, "title": "Vet", "due_date": "2026-10-20T00:00:00", "assigned_to": 3,
             "family_member": {"id": 3, "name": "Kim", "is_system": false, "color": "#3366FF"}}
        ],
        "events": [
            {"id": 10, "title": "Soccer", "date": "2026-10-19", "all_day": false,
             "start_time": "16:00", "end_time": "17:30", "assigned_to": 2}
        ],
        "family_members": [
            {"id": 1, "name": "Everyone", "is_system": true, "color": null},
            {"id": 2, "name": "Alex", "is_system": false, "color": "#AA3322"}
        ]
    }"##;

    fn event(start: Option<&str>, end: Option<&str>, all_day: bool) -> CalendarEvent {
        CalendarEvent {
            id: 1,
            title: "Dentist".to_string(),
            date: Some("2026-10-19".to_string()),
            all_day,
            start_time: start.map(str::to_string),
            end_time: end.map(str::to_string),
            assigned_to: None,
            family_member: None,
        }
    }

    #[test]
    fn parses_snapshot_with_defaults() {
        let data = CalendarData::from_json(SNAPSHOT).expect("parse snapshot");
        assert_eq!(data.tasks.len(), 3);
        assert!(!data.tasks[0].completed);
        assert_eq!(data.events[0].start_time.as_deref(), Some("16:00"));
        assert!(CalendarData::from_json("{}").expect("empty").tasks.is_empty());
    }

    #[test]
    fn member_lookup_prefers_roster_then_embedded() {
        let data = CalendarData::from_json(SNAPSHOT).expect("parse snapshot");
        let alex = data.member_for(&data.tasks[0]).expect("alex");
        assert_eq!(alex.name, "Alex");
        let kim = data.member_for(&data.tasks[2]).expect("embedded kim");
        assert_eq!(kim.name, "Kim");
        assert!(data.member_for(&data.tasks[1]).is_none());
    }

    #[test]
    fn member_filter_keeps_unassigned_items() {
        let data = CalendarData::from_json(SNAPSHOT).expect("parse snapshot");
        let active = BTreeSet::from([3]);
        let filtered = data.filter_members(Some(&active));
        let ids: Vec<i64> = filtered.tasks.iter().map(|task| task.id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert!(filtered.events.is_empty());
        assert_eq!(data.filter_members(None), data);
    }

    #[test]
    fn timed_event_validation() {
        let all_day = event(None, None, true);
        assert_eq!(TimedEvent::from_event(&all_day), Ok(None));

        let flagged = event(Some("09:00"), Some("10:00"), true);
        assert_eq!(TimedEvent::from_event(&flagged), Ok(None));

        let open_ended = event(Some("09:00"), None, false);
        let timed = TimedEvent::from_event(&open_ended)
            .expect("valid")
            .expect("timed");
        assert_eq!(timed.start, timed.end);

        let broken = event(Some("9am"), Some("10:00"), false);
        assert!(matches!(
            TimedEvent::from_event(&broken),
            Err(CalendarError::InvalidClockTime { .. })
        ));
    }
}
