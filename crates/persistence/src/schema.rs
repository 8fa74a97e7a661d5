//! Database schema definitions

/// SQL to create all tables
/// NOTE: teams and assets are stored as JSON text; the engine decodes them
pub const CREATE_TABLES: &str = r#"
-- Graded trade proposals (written by the trade builder, read-only for evaluation)
CREATE TABLE IF NOT EXISTS trades (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    user_email TEXT,
    user_display_name TEXT,
    session_id TEXT NOT NULL,
    teams_json TEXT NOT NULL DEFAULT '[]',
    assets_json TEXT NOT NULL DEFAULT '[]',
    grade INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'rejected',
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
);

-- ========== INDEXES ==========

CREATE INDEX IF NOT EXISTS idx_trades_session ON trades(session_id, status);
CREATE INDEX IF NOT EXISTS idx_trades_user ON trades(user_id);
CREATE INDEX IF NOT EXISTS idx_trades_created ON trades(created_at DESC)
"#;

/// Additive column migrations, applied after `CREATE_TABLES`.
/// "duplicate column name" errors are tolerated so these are safe to re-run.
pub const MIGRATIONS: &[&str] = &[
    // Stores created before multi-sport support have no sport column
    "ALTER TABLE trades ADD COLUMN sport TEXT NOT NULL DEFAULT 'nfl'",
];
