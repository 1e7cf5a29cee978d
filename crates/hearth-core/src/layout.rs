//! Side-by-side columns for overlapping timed events.
//!
//! Events are swept in `(start, end)` order. An event joins the current group
//! while it starts before the latest end seen in that group; otherwise the
//! group is closed. Every member of a group gets an equal-width column in
//! sorted order, so a chain of overlaps widens the whole group even where two
//! of its members never touch.

use std::cmp::Ordering;

use crate::clock::ClockTime;

/// Anything that occupies a validated time range on one day.
pub trait TimedItem {
    fn start_time(&self) -> ClockTime;
    fn end_time(&self) -> ClockTime;
}

impl<T: TimedItem + ?Sized> TimedItem for &T {
    fn start_time(&self) -> ClockTime {
        (**self).start_time()
    }

    fn end_time(&self) -> ClockTime {
        (**self).end_time()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutSlot<E> {
    pub event: E,
    pub column: usize,
    pub total_columns: usize,
}

/// Strict overlap: touching ranges (`a.end == b.start`) do not overlap.
#[must_use]
pub fn overlaps<A: TimedItem, B: TimedItem>(a: &A, b: &B) -> bool {
    a.start_time() < b.end_time() && b.start_time() < a.end_time()
}

fn by_start_then_end<E: TimedItem>(a: &E, b: &E) -> Ordering {
    a.start_time()
        .cmp(&b.start_time())
        .then_with(|| a.end_time().cmp(&b.end_time()))
}

/// Assigns `(column, total_columns)` to every event. The output follows the
/// sorted processing order, not the input order.
#[tracing::instrument(skip_all, fields(events = events.len()))]
pub fn layout_events<E: TimedItem>(events: &[E]) -> Vec<LayoutSlot<&E>> {
    if events.is_empty() {
        return Vec::new();
    }

    let mut sorted: Vec<&E> = events.iter().collect();
    sorted.sort_by(|a, b| by_start_then_end(*a, *b));

    let mut groups: Vec<Vec<&E>> = Vec::new();
    let mut current: Vec<&E> = Vec::new();
    let mut group_end = ClockTime::MIDNIGHT;

    for event in sorted {
        if !current.is_empty() && event.start_time() >= group_end {
            groups.push(std::mem::take(&mut current));
        }
        if current.is_empty() {
            group_end = event.end_time();
        } else {
            group_end = group_end.max(event.end_time());
        }
        current.push(event);
    }
    groups.push(current);

    tracing::debug!(groups = groups.len(), "grouped overlapping events");

    groups
        .into_iter()
        .flat_map(|group| {
            let total_columns = group.len();
            group
                .into_iter()
                .enumerate()
                .map(move |(column, event)| LayoutSlot {
                    event,
                    column,
                    total_columns,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{LayoutSlot, TimedItem, layout_events, overlaps};
    use crate::clock::ClockTime;

    #[derive(Debug, PartialEq, Eq)]
    struct Block {
        name: &'static str,
        start: ClockTime,
        end: ClockTime,
    }

    impl TimedItem for Block {
        fn start_time(&self) -> ClockTime {
            self.start
        }

        fn end_time(&self) -> ClockTime {
            self.end
        }
    }

    fn block(name: &'static str, start: &str, end: &str) -> Block {
        Block {
            name,
            start: start.parse().expect("start"),
            end: end.parse().expect("end"),
        }
    }

    fn summary(slots: &[LayoutSlot<&Block>]) -> Vec<(&'static str, usize, usize)> {
        slots
            .iter()
            .map(|slot| (slot.event.name, slot.column, slot.total_columns))
            .collect()
    }

    fn assert_overlapping_columns_differ(slots: &[LayoutSlot<&Block>]) {
        for (i, a) in slots.iter().enumerate() {
            for b in &slots[i + 1..] {
                if overlaps(a.event, b.event) {
                    assert_eq!(a.total_columns, b.total_columns);
                    assert_ne!(a.column, b.column, "{} and {}", a.event.name, b.event.name);
                }
            }
        }
    }

    #[test]
    fn empty_input_has_no_slots() {
        let events: Vec<Block> = Vec::new();
        assert!(layout_events(&events).is_empty());
    }

    #[test]
    fn lone_event_takes_full_width() {
        let events = vec![block("solo", "09:00", "10:00")];
        assert_eq!(summary(&layout_events(&events)), vec![("solo", 0, 1)]);
    }

    #[test]
    fn overlapping_pair_splits_and_later_event_stands_alone() {
        let events = vec![
            block("c", "11:00", "12:00"),
            block("b", "09:30", "10:30"),
            block("a", "09:00", "10:00"),
        ];
        let slots = layout_events(&events);
        assert_eq!(
            summary(&slots),
            vec![("a", 0, 2), ("b", 1, 2), ("c", 0, 1)]
        );
        assert_overlapping_columns_differ(&slots);
    }

    #[test]
    fn touching_events_do_not_share_a_group() {
        let events = vec![
            block("first", "09:00", "10:00"),
            block("second", "10:00", "11:00"),
        ];
        assert_eq!(
            summary(&layout_events(&events)),
            vec![("first", 0, 1), ("second", 0, 1)]
        );
    }

    #[test]
    fn chained_overlaps_widen_the_whole_group() {
        // a overlaps b, b overlaps c, a and c never touch.
        let events = vec![
            block("a", "09:00", "10:00"),
            block("b", "09:45", "11:00"),
            block("c", "10:30", "11:30"),
        ];
        let slots = layout_events(&events);
        assert!(!overlaps(&events[0], &events[2]));
        assert_eq!(
            summary(&slots),
            vec![("a", 0, 3), ("b", 1, 3), ("c", 2, 3)]
        );
    }

    #[test]
    fn group_end_tracks_longest_event() {
        // The long event keeps the group open past the short one's end.
        let events = vec![
            block("long", "08:00", "12:00"),
            block("short", "08:30", "09:00"),
            block("late", "11:00", "11:30"),
            block("after", "12:00", "13:00"),
        ];
        let slots = layout_events(&events);
        assert_eq!(
            summary(&slots),
            vec![
                ("long", 0, 3),
                ("short", 1, 3),
                ("late", 2, 3),
                ("after", 0, 1)
            ]
        );
        assert_overlapping_columns_differ(&slots);
    }

    #[test]
    fn ties_sort_by_end_time_and_keep_input_order() {
        let events = vec![
            block("wide", "09:00", "11:00"),
            block("narrow", "09:00", "09:30"),
            block("twin", "09:00", "09:30"),
        ];
        assert_eq!(
            summary(&layout_events(&events)),
            vec![("narrow", 0, 3), ("twin", 1, 3), ("wide", 2, 3)]
        );
    }

    #[test]
    fn zero_length_event_after_group_starts_new_group() {
        let events = vec![
            block("meeting", "09:00", "10:00"),
            block("reminder", "10:00", "10:00"),
        ];
        assert_eq!(
            summary(&layout_events(&events)),
            vec![("meeting", 0, 1), ("reminder", 0, 1)]
        );
    }
}
