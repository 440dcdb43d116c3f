//! Read-only reductions over a collection snapshot. Nothing here mutates the
//! store; the view derives display state and translates nothing back.

use chrono::NaiveDate;
use shared::protocol::EntryPayload;

/// Entries in display order: ascending `order`, id as a stable tiebreak for
/// the sparse sequences deletes leave behind.
pub fn display_order(entries: &[EntryPayload]) -> Vec<&EntryPayload> {
    let mut sorted: Vec<&EntryPayload> = entries.iter().collect();
    sorted.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.0.cmp(&b.id.0)));
    sorted
}

/// Per-row move-control state. The store already treats boundary moves as
/// no-ops; disabling the controls keeps the call from being issued at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowControls {
    pub can_move_up: bool,
    pub can_move_down: bool,
}

pub fn row_controls(row_count: usize, index: usize) -> RowControls {
    RowControls {
        can_move_up: index > 0,
        can_move_down: index + 1 < row_count,
    }
}

pub fn count_matching<F>(entries: &[EntryPayload], predicate: F) -> usize
where
    F: Fn(&EntryPayload) -> bool,
{
    entries.iter().filter(|entry| predicate(entry)).count()
}

pub fn featured_count(entries: &[EntryPayload]) -> usize {
    count_matching(entries, |entry| entry.body.is_featured())
}

/// The entry with the greatest date under `date_of`; `None` when no entry
/// carries one.
pub fn most_recent_by<F>(entries: &[EntryPayload], date_of: F) -> Option<&EntryPayload>
where
    F: Fn(&EntryPayload) -> Option<NaiveDate>,
{
    entries
        .iter()
        .filter_map(|entry| date_of(entry).map(|date| (date, entry)))
        .max_by_key(|(date, _)| *date)
        .map(|(_, entry)| entry)
}

pub fn most_recent(entries: &[EntryPayload]) -> Option<&EntryPayload> {
    most_recent_by(entries, |entry| entry.body.display_date())
}
