//! Table definitions for the history database

/// Variable samples: one row per `set_and_store` call
pub const VAR_HISTORY_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS var_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ts TEXT NOT NULL,
    path TEXT NOT NULL,
    value REAL,
    extra TEXT
);
"#;

/// Alarm and status events: one row per fired event
pub const EVENT_HISTORY_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS event_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ts TEXT NOT NULL,
    source TEXT NOT NULL,
    message TEXT NOT NULL,
    severity INTEGER NOT NULL,
    category TEXT
);
"#;
