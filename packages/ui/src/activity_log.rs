//! Recent note events shown to the user (saved, deleted, locked again).
//!
//! Messages name notes by title only; passwords and content never go here.
//! An entry about a note that still exists keeps its id so the panel can link
//! back to it.

use dioxus::prelude::*;

const MAX_ENTRIES: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    /// Modifier class on `.activity-log-entry`.
    pub fn class(self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Success => "success",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
    pub note_id: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ActivityLog {
    pub entries: Vec<LogEntry>,
    pub visible: bool,
}

impl ActivityLog {
    /// Oldest entries are dropped past a fixed bound.
    pub fn push(&mut self, level: LogLevel, message: String, note_id: Option<String>) {
        if self.entries.len() >= MAX_ENTRIES {
            self.entries.remove(0);
        }
        self.entries.push(LogEntry {
            timestamp: current_time(),
            level,
            message,
            note_id,
        });
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn error_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.level == LogLevel::Error)
            .count()
    }

    pub fn newest_first(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().rev()
    }

    /// A deleted note must not stay linkable.
    pub fn forget_note(&mut self, note_id: &str) {
        for entry in &mut self.entries {
            if entry.note_id.as_deref() == Some(note_id) {
                entry.note_id = None;
            }
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }
}

/// Call once near the root.
pub fn use_activity_log_provider() -> Signal<ActivityLog> {
    use_context_provider(|| Signal::new(ActivityLog::default()))
}

pub fn use_activity_log() -> Signal<ActivityLog> {
    use_context::<Signal<ActivityLog>>()
}

pub fn log_activity(log: &mut Signal<ActivityLog>, level: LogLevel, message: &str) {
    trace_entry(level, message, None);
    log.write().push(level, message.to_string(), None);
}

/// Like [`log_activity`], linking the entry to `note_id`.
pub fn log_note_activity(
    log: &mut Signal<ActivityLog>,
    level: LogLevel,
    note_id: &str,
    message: &str,
) {
    trace_entry(level, message, Some(note_id));
    log.write()
        .push(level, message.to_string(), Some(note_id.to_string()));
}

fn trace_entry(level: LogLevel, message: &str, note_id: Option<&str>) {
    match level {
        LogLevel::Error => tracing::error!(note_id, "{message}"),
        LogLevel::Warning => tracing::warn!(note_id, "{message}"),
        LogLevel::Info | LogLevel::Success => tracing::debug!(note_id, "{message}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn current_time() -> String {
    let date = js_sys::Date::new_0();
    let h = date.get_hours();
    let m = date.get_minutes();
    let s = date.get_seconds();
    format!("{h:02}:{m:02}:{s:02}")
}

#[cfg(not(target_arch = "wasm32"))]
fn current_time() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_drops_oldest_past_bound() {
        let mut log = ActivityLog::default();
        for i in 0..MAX_ENTRIES + 5 {
            log.push(LogLevel::Info, format!("entry {i}"), None);
        }
        assert_eq!(log.entries.len(), MAX_ENTRIES);
        assert_eq!(log.entries[0].message, "entry 5");
        assert_eq!(log.entries.last().map(|e| e.message.as_str()), Some("entry 54"));
    }

    #[test]
    fn has_errors_only_for_error_level() {
        let mut log = ActivityLog::default();
        log.push(LogLevel::Warning, "slow".to_string(), None);
        log.push(LogLevel::Success, "saved".to_string(), Some("n1".to_string()));
        assert!(!log.has_errors());
        log.push(LogLevel::Error, "delete failed".to_string(), None);
        log.push(LogLevel::Error, "save failed".to_string(), None);
        assert!(log.has_errors());
        assert_eq!(log.error_count(), 2);
    }

    #[test]
    fn newest_entries_come_first() {
        let mut log = ActivityLog::default();
        log.push(LogLevel::Info, "first".to_string(), None);
        log.push(LogLevel::Info, "second".to_string(), None);
        let order: Vec<_> = log.newest_first().map(|e| e.message.as_str()).collect();
        assert_eq!(order, ["second", "first"]);
    }

    #[test]
    fn deleted_notes_lose_their_links() {
        let mut log = ActivityLog::default();
        log.push(LogLevel::Success, "Saved \"A\"".to_string(), Some("a".to_string()));
        log.push(LogLevel::Success, "Saved \"B\"".to_string(), Some("b".to_string()));
        log.forget_note("a");
        let links: Vec<_> = log.entries.iter().map(|e| e.note_id.as_deref()).collect();
        assert_eq!(links, [None, Some("b")]);
    }

    #[test]
    fn level_classes_are_distinct() {
        let classes = [
            LogLevel::Info,
            LogLevel::Success,
            LogLevel::Warning,
            LogLevel::Error,
        ]
        .map(LogLevel::class);
        assert_eq!(classes, ["info", "success", "warning", "error"]);
    }
}
