use serde::Serialize;

use crate::features::placement::{Placeholder, PlaceholderId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogAction {
    Added,
    Moved,
    Removed,
}

impl LogAction {
    pub fn as_str(self) -> &'static str {
        match self {
            LogAction::Added => "Added",
            LogAction::Moved => "Moved",
            LogAction::Removed => "Removed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Added" => Some(LogAction::Added),
            "Moved" => Some(LogAction::Moved),
            "Removed" => Some(LogAction::Removed),
            _ => None,
        }
    }
}

/// Snapshot of a placeholder taken when an action was accepted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub action: LogAction,
    pub id: PlaceholderId,
    pub label: String,
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
    pub width: f64,
    pub height: f64,
}

impl LogEntry {
    pub fn snapshot(placeholder: &Placeholder, action: LogAction, timestamp: String) -> Self {
        Self {
            timestamp,
            action,
            id: placeholder.id,
            label: placeholder.label.clone(),
            x1: round_px(placeholder.x),
            y1: round_px(placeholder.y),
            x2: round_px(placeholder.x + placeholder.width),
            y2: round_px(placeholder.y + placeholder.height),
            width: placeholder.width,
            height: placeholder.height,
        }
    }

    /// `<timestamp> - <action>: <label> at (<x1>, <y1>) to (<x2>, <y2>)`
    pub fn export_line(&self) -> String {
        format!(
            "{} - {}: {} at ({}, {}) to ({}, {})",
            self.timestamp,
            self.action.as_str(),
            self.label,
            self.x1,
            self.y1,
            self.x2,
            self.y2
        )
    }
}

pub(crate) fn round_px(value: f64) -> i64 {
    value.round() as i64
}

/// One line of an exported log, read back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub timestamp: String,
    pub action: LogAction,
    pub label: String,
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

/// Parse a line produced by [`LogEntry::export_line`].
pub fn parse_line(line: &str) -> Option<ParsedLine> {
    let (timestamp, rest) = line.split_once(" - ")?;
    let (action, rest) = rest.split_once(": ")?;
    let action = LogAction::parse(action)?;
    // Labels may contain anything, so anchor on the trailing coordinates.
    let (label, coords) = rest.rsplit_once(" at (")?;
    let (first, second) = coords.split_once(") to (")?;
    let second = second.strip_suffix(')')?;
    let (x1, y1) = parse_pair(first)?;
    let (x2, y2) = parse_pair(second)?;
    Some(ParsedLine {
        timestamp: timestamp.to_string(),
        action,
        label: label.to_string(),
        x1,
        y1,
        x2,
        y2,
    })
}

fn parse_pair(raw: &str) -> Option<(i64, i64)> {
    let (a, b) = raw.split_once(',')?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}

/// Append-only record of accepted placement changes.
#[derive(Debug, Clone, Default)]
pub struct ActionLog {
    entries: Vec<LogEntry>,
}

impl ActionLog {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn append(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Export text, one entry per line. `None` for an empty log.
    pub fn export(&self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let lines: Vec<String> = self.entries.iter().map(LogEntry::export_line).collect();
        Some(lines.join("\n"))
    }
}
