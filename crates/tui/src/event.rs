//! Key routing status shared by input widgets.

/// Whether a widget handled a key.
///
/// The question box returns `NotConsumed` for keys that are not edits
/// (`Enter`, `Tab`, arrows up/down) so the dashboard can act on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Consumed,
    NotConsumed,
}
