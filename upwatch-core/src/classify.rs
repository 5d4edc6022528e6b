use upwatch_store::EntityState;

use crate::snapshot::{Snapshot, SnapshotEntry};

/// Notification classes in the order they are reported, which doubles as
/// the priority order when composing a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventClass {
    Warning,
    Returned,
    Locked,
    Unlocked,
    Info,
}

impl EventClass {
    pub fn glyph(self) -> char {
        match self {
            EventClass::Warning => '\u{26A0}',  // warning sign
            EventClass::Returned => '\u{2705}', // white heavy check mark
            EventClass::Locked => '\u{1F512}',  // lock
            EventClass::Unlocked => '\u{1F513}', // open lock
            EventClass::Info => '\u{2611}',     // ballot box with check
        }
    }
}

/// One classified change notification for a tracked server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub class: EventClass,
    pub message: String,
}

impl Event {
    fn new(class: EventClass, message: String) -> Self {
        Self { class, message }
    }
}

/// Resolve a tracked name against the snapshot.
///
/// When multiple entries share the name, the first one in snapshot order
/// wins and the rest are ignored for matching. Known limitation; the full
/// snapshot still feeds the caches.
pub fn find_entry<'a>(name: &str, snapshot: &'a Snapshot) -> Option<&'a SnapshotEntry> {
    snapshot.iter().find(|entry| entry.name == name)
}

/// Classify one observation of a tracked server against its persisted
/// state.
///
/// Total over its domain and pure: returns the new state to persist and
/// at most one event. The state is written back by the caller even when
/// no event fires. An unset `passworded` compares as false; on absence
/// the old `passworded` value is retained.
pub fn classify(
    name: &str,
    old: &EntityState,
    entry: Option<&SnapshotEntry>,
) -> (EntityState, Option<Event>) {
    let new_listed = entry.is_some();
    let new_password = entry.map(|e| e.has_password);
    let was_passworded = old.passworded == Some(true);

    let event = match old.listed {
        Some(true) => {
            if !new_listed {
                Some(Event::new(
                    EventClass::Warning,
                    format!("{name} is no longer listed"),
                ))
            } else if new_password == Some(true) && !was_passworded {
                Some(Event::new(
                    EventClass::Locked,
                    format!("{name} is now password protected"),
                ))
            } else if was_passworded && new_password != Some(true) {
                Some(Event::new(
                    EventClass::Unlocked,
                    format!("{name} is no longer password protected"),
                ))
            } else {
                None
            }
        }
        Some(false) => {
            if new_listed {
                if new_password == Some(true) {
                    Some(Event::new(
                        EventClass::Locked,
                        format!("{name} is back on the list, password protected"),
                    ))
                } else {
                    Some(Event::new(
                        EventClass::Returned,
                        format!("{name} is back on the list"),
                    ))
                }
            } else {
                None
            }
        }
        None => {
            if new_listed {
                if new_password == Some(true) {
                    Some(Event::new(
                        EventClass::Locked,
                        format!("{name} is listed as password protected"),
                    ))
                } else {
                    Some(Event::new(EventClass::Info, format!("{name} is listed")))
                }
            } else {
                Some(Event::new(
                    EventClass::Warning,
                    format!("{name} is not listed"),
                ))
            }
        }
    };

    let state = EntityState {
        listed: Some(new_listed),
        passworded: if new_listed { new_password } else { old.passworded },
    };

    (state, event)
}
