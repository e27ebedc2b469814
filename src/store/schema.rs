//! SQLite schema definition
//!
//! The `contexts.signature` UNIQUE constraint is the enforcement point for
//! concurrent get-or-create: an insert that loses the race is a no-op and
//! the winner's row is re-read.

pub const SCHEMA: &str = r#"
-- ============================================
-- TAG REGISTRY
-- ============================================

-- Top-level dimensions of a situation (Place, People, Time, Tools, Myself)
CREATE TABLE IF NOT EXISTS tag_groups (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

-- Optional sub-grouping within a dimension (e.g. Myself > Mood)
CREATE TABLE IF NOT EXISTS tag_categories (
    id INTEGER PRIMARY KEY,
    group_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    UNIQUE(group_id, name),
    FOREIGN KEY(group_id) REFERENCES tag_groups(id) ON DELETE CASCADE
);

-- Atomic situational descriptors (Home, Laptop, Happy, Sunday, ...)
CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY,
    group_id INTEGER NOT NULL,
    category_id INTEGER,
    name TEXT NOT NULL,
    icon TEXT NOT NULL DEFAULT '',
    FOREIGN KEY(group_id) REFERENCES tag_groups(id) ON DELETE CASCADE,
    FOREIGN KEY(category_id) REFERENCES tag_categories(id) ON DELETE SET NULL
);

-- ============================================
-- CONTEXTS
-- ============================================

-- One canonical record per distinct tag set
CREATE TABLE IF NOT EXISTS contexts (
    id INTEGER PRIMARY KEY,
    signature TEXT NOT NULL UNIQUE,        -- sorted dash-joined tag ids, e.g. "1-4-12"
    created_at TEXT NOT NULL               -- RFC 3339
);

CREATE TABLE IF NOT EXISTS context_tags (
    context_id INTEGER NOT NULL,
    tag_id INTEGER NOT NULL,
    UNIQUE(context_id, tag_id),
    FOREIGN KEY(context_id) REFERENCES contexts(id) ON DELETE CASCADE,
    FOREIGN KEY(tag_id) REFERENCES tags(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_context_tags_tag ON context_tags(tag_id);

-- ============================================
-- CONTENT & GOALS
-- ============================================

CREATE TABLE IF NOT EXISTS notes (
    id INTEGER PRIMARY KEY,
    context_id INTEGER NOT NULL,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY(context_id) REFERENCES contexts(id) ON DELETE CASCADE
);

-- A goal links to at most one of: a single tag, or a full context
CREATE TABLE IF NOT EXISTS goals (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    importance INTEGER NOT NULL DEFAULT 2,  -- 1 Low .. 4 Critical
    is_completed BOOLEAN NOT NULL DEFAULT FALSE,
    linked_tag_id INTEGER,
    linked_context_id INTEGER,
    deadline TEXT,
    created_at TEXT NOT NULL,
    FOREIGN KEY(linked_tag_id) REFERENCES tags(id) ON DELETE CASCADE,
    FOREIGN KEY(linked_context_id) REFERENCES contexts(id) ON DELETE CASCADE
);

-- ============================================
-- GAMIFICATION
-- ============================================

-- goal_id UNIQUE: at most one achievement per completed goal
CREATE TABLE IF NOT EXISTS achievements (
    id INTEGER PRIMARY KEY,
    context_id INTEGER,
    goal_id INTEGER UNIQUE,
    title TEXT NOT NULL,
    reflection TEXT NOT NULL DEFAULT '',
    points INTEGER NOT NULL DEFAULT 0,
    achieved_at TEXT NOT NULL,
    FOREIGN KEY(context_id) REFERENCES contexts(id) ON DELETE SET NULL,
    FOREIGN KEY(goal_id) REFERENCES goals(id) ON DELETE SET NULL
);

-- ============================================
-- CHAT & AUTOMATION
-- ============================================

CREATE TABLE IF NOT EXISTS chat_messages (
    id INTEGER PRIMARY KEY,
    session_id TEXT NOT NULL,
    role TEXT NOT NULL,                    -- 'user', 'assistant', 'system'
    content TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_chat_session ON chat_messages(session_id);

-- Advice written back by the automation peer for a context
CREATE TABLE IF NOT EXISTS recommendations (
    id INTEGER PRIMARY KEY,
    context_id INTEGER NOT NULL,
    title TEXT NOT NULL,
    summary TEXT NOT NULL DEFAULT '',
    recommendation TEXT NOT NULL,
    priority INTEGER NOT NULL DEFAULT 2,   -- 1 Low .. 3 High
    created_at TEXT NOT NULL,
    FOREIGN KEY(context_id) REFERENCES contexts(id) ON DELETE CASCADE
);

-- ============================================
-- PRESETS
-- ============================================

-- Quick-access tag bundles ('Focus Mode', 'Commute', ...)
CREATE TABLE IF NOT EXISTS presets (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    icon TEXT NOT NULL DEFAULT 'star'
);

CREATE TABLE IF NOT EXISTS preset_tags (
    preset_id INTEGER NOT NULL,
    tag_id INTEGER NOT NULL,
    UNIQUE(preset_id, tag_id),
    FOREIGN KEY(preset_id) REFERENCES presets(id) ON DELETE CASCADE,
    FOREIGN KEY(tag_id) REFERENCES tags(id) ON DELETE CASCADE
);
"#;
