//! Persistent storage with SQLite
//!
//! All persistence goes through `Store`. The connection sits behind a mutex
//! so one handle can be shared between request paths and the webhook
//! dispatcher's workers (which persist assistant replies).

mod schema;

use anyhow::Result;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::Path;
use thiserror::Error;

pub use schema::SCHEMA;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("goal {0} not found")]
    GoalNotFound(i64),
    #[error("preset '{0}' not found")]
    PresetNotFound(String),
}

pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// In-memory store, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock();
        // Concurrent callers may hold separate connections to the same file
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ============================================
    // TAG REGISTRY
    // ============================================

    /// Get or create a tag group by name, returning its id.
    pub fn ensure_group(&self, name: &str) -> Result<i64> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR IGNORE INTO tag_groups (name) VALUES (?)",
            params![name],
        )?;
        let id = conn.query_row(
            "SELECT id FROM tag_groups WHERE name = ?",
            params![name],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    pub fn ensure_category(&self, group_id: i64, name: &str) -> Result<i64> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR IGNORE INTO tag_categories (group_id, name) VALUES (?, ?)",
            params![group_id, name],
        )?;
        let id = conn.query_row(
            "SELECT id FROM tag_categories WHERE group_id = ? AND name = ?",
            params![group_id, name],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    pub fn create_tag(
        &self,
        group_id: i64,
        category_id: Option<i64>,
        name: &str,
        icon: &str,
    ) -> Result<i64> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO tags (group_id, category_id, name, icon) VALUES (?, ?, ?, ?)",
            params![group_id, category_id, name, icon],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Deleting a group cascades to its tags; deleting a category nulls
    /// the reference on dependent tags (schema FK actions).
    pub fn delete_group(&self, group_id: i64) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM tag_groups WHERE id = ?", params![group_id])?;
        Ok(())
    }

    pub fn delete_category(&self, category_id: i64) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "DELETE FROM tag_categories WHERE id = ?",
            params![category_id],
        )?;
        Ok(())
    }

    const TAG_SELECT: &'static str = r#"SELECT t.id, t.name, t.icon, g.name,
                      (SELECT name FROM tag_categories c WHERE c.id = t.category_id)
               FROM tags t
               JOIN tag_groups g ON t.group_id = g.id"#;

    fn map_tag(row: &rusqlite::Row) -> rusqlite::Result<TagRow> {
        Ok(TagRow {
            id: row.get(0)?,
            name: row.get(1)?,
            icon: row.get(2)?,
            group_name: row.get(3)?,
            category_name: row.get(4)?,
        })
    }

    pub fn get_tag(&self, id: i64) -> Result<Option<TagRow>> {
        let conn = self.conn.lock();
        let row = conn.query_row(
            &format!("{} WHERE t.id = ?", Self::TAG_SELECT),
            params![id],
            Self::map_tag,
        );
        match row {
            Ok(t) => Ok(Some(t)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Filter a candidate id list down to ids that exist in the registry.
    pub fn existing_tag_ids(&self, ids: &[i64]) -> Result<Vec<i64>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT id FROM tags WHERE id = ?")?;
        let mut found = Vec::new();
        for id in ids {
            let hit: Option<i64> = match stmt.query_row(params![id], |row| row.get(0)) {
                Ok(v) => Some(v),
                Err(rusqlite::Error::QueryReturnedNoRows) => None,
                Err(e) => return Err(e.into()),
            };
            if let Some(v) = hit {
                found.push(v);
            }
        }
        Ok(found)
    }

    /// Look up a tag by group name and tag name (smart-default detection).
    pub fn find_tag(&self, group_name: &str, tag_name: &str) -> Result<Option<TagRow>> {
        let conn = self.conn.lock();
        let row = conn.query_row(
            &format!(
                "{} WHERE g.name = ? AND t.name = ? LIMIT 1",
                Self::TAG_SELECT
            ),
            params![group_name, tag_name],
            Self::map_tag,
        );
        match row {
            Ok(t) => Ok(Some(t)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All tags belonging to one of the named groups, in id order.
    pub fn tags_in_groups(&self, group_names: &[String]) -> Result<Vec<TagRow>> {
        if group_names.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn.lock();
        let placeholders = vec!["?"; group_names.len()].join(", ");
        let mut stmt = conn.prepare(&format!(
            "{} WHERE g.name IN ({}) ORDER BY t.id",
            Self::TAG_SELECT,
            placeholders
        ))?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(group_names.iter()),
            Self::map_tag,
        )?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn list_tags(&self) -> Result<Vec<TagRow>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY g.name, t.name",
            Self::TAG_SELECT
        ))?;
        let rows = stmt.query_map([], Self::map_tag)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn tags_for_context(&self, context_id: i64) -> Result<Vec<TagRow>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "{} JOIN context_tags ct ON ct.tag_id = t.id
               WHERE ct.context_id = ? ORDER BY t.id",
            Self::TAG_SELECT
        ))?;
        let rows = stmt.query_map(params![context_id], Self::map_tag)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ============================================
    // CONTEXTS
    // ============================================

    /// Atomic get-or-create keyed on the unique signature.
    ///
    /// The insert and the tag attachment run in one transaction; a conflict
    /// on the signature means another caller won the race, and the existing
    /// row is returned with `created = false`.
    pub fn get_or_create_context(
        &self,
        signature: &str,
        tag_ids: &[i64],
    ) -> Result<(ContextRow, bool)> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let inserted = tx.execute(
            "INSERT INTO contexts (signature, created_at) VALUES (?, ?)
             ON CONFLICT(signature) DO NOTHING",
            params![signature, Utc::now().to_rfc3339()],
        )?;

        let row = tx.query_row(
            "SELECT id, signature, created_at FROM contexts WHERE signature = ?",
            params![signature],
            |row| {
                Ok(ContextRow {
                    id: row.get(0)?,
                    signature: row.get(1)?,
                    created_at: row.get(2)?,
                })
            },
        )?;

        // Attach the resolved tag set exactly once, on creation
        if inserted > 0 {
            for tag_id in tag_ids {
                tx.execute(
                    "INSERT OR IGNORE INTO context_tags (context_id, tag_id) VALUES (?, ?)",
                    params![row.id, tag_id],
                )?;
            }
        }

        tx.commit()?;
        Ok((row, inserted > 0))
    }

    pub fn get_context(&self, id: i64) -> Result<Option<ContextRow>> {
        let conn = self.conn.lock();
        let row = conn.query_row(
            "SELECT id, signature, created_at FROM contexts WHERE id = ?",
            params![id],
            |row| {
                Ok(ContextRow {
                    id: row.get(0)?,
                    signature: row.get(1)?,
                    created_at: row.get(2)?,
                })
            },
        );
        match row {
            Ok(c) => Ok(Some(c)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn context_tag_ids(&self, context_id: i64) -> Result<Vec<i64>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT tag_id FROM context_tags WHERE context_id = ? ORDER BY tag_id",
        )?;
        let rows = stmt.query_map(params![context_id], |row| row.get(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn count_contexts(&self) -> Result<i64> {
        let conn = self.conn.lock();
        let count = conn.query_row("SELECT COUNT(*) FROM contexts", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Creation timestamps of every context (badge evaluation).
    pub fn context_timestamps(&self) -> Result<Vec<DateTime<Utc>>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT created_at FROM contexts")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for ts in rows {
            out.push(parse_rfc3339(&ts?)?);
        }
        Ok(out)
    }

    /// Creation timestamps of contexts containing a tag, newest first,
    /// bounded below (streak window).
    pub fn context_timestamps_for_tag(
        &self,
        tag_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT c.created_at FROM contexts c
             JOIN context_tags ct ON ct.context_id = c.id
             WHERE ct.tag_id = ? AND c.created_at >= ?
             ORDER BY c.created_at DESC",
        )?;
        let rows = stmt.query_map(params![tag_id, since.to_rfc3339()], |row| {
            row.get::<_, String>(0)
        })?;
        let mut out = Vec::new();
        for ts in rows {
            out.push(parse_rfc3339(&ts?)?);
        }
        Ok(out)
    }

    #[cfg(test)]
    pub(crate) fn backdate_context(&self, context_id: i64, created_at: DateTime<Utc>) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "UPDATE contexts SET created_at = ? WHERE id = ?",
            params![created_at.to_rfc3339(), context_id],
        )?;
        Ok(())
    }

    // ============================================
    // NOTES
    // ============================================

    pub fn add_note(&self, context_id: i64, title: &str, content: &str) -> Result<i64> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO notes (context_id, title, content, created_at) VALUES (?, ?, ?, ?)",
            params![context_id, title, content, Utc::now().to_rfc3339()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Most recent notes for a context, newest first.
    pub fn recent_notes(&self, context_id: i64, limit: usize) -> Result<Vec<NoteRow>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, context_id, title, content, created_at FROM notes
             WHERE context_id = ? ORDER BY created_at DESC, id DESC LIMIT ?",
        )?;
        let rows = stmt.query_map(params![context_id, limit as i64], |row| {
            Ok(NoteRow {
                id: row.get(0)?,
                context_id: row.get(1)?,
                title: row.get(2)?,
                content: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ============================================
    // GOALS
    // ============================================

    pub fn add_goal(&self, goal: &NewGoal) -> Result<i64> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO goals
               (title, description, importance, is_completed,
                linked_tag_id, linked_context_id, deadline, created_at)
             VALUES (?, ?, ?, FALSE, ?, ?, ?, ?)",
            params![
                goal.title,
                goal.description,
                goal.importance,
                goal.linked_tag_id,
                goal.linked_context_id,
                goal.deadline,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    const GOAL_SELECT: &'static str = r#"SELECT id, title, description, importance,
                      is_completed, linked_tag_id, linked_context_id, deadline, created_at
               FROM goals"#;

    fn map_goal(row: &rusqlite::Row) -> rusqlite::Result<GoalRow> {
        Ok(GoalRow {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            importance: row.get(3)?,
            is_completed: row.get(4)?,
            linked_tag_id: row.get(5)?,
            linked_context_id: row.get(6)?,
            deadline: row.get(7)?,
            created_at: row.get(8)?,
        })
    }

    pub fn get_goal(&self, id: i64) -> Result<Option<GoalRow>> {
        let conn = self.conn.lock();
        let row = conn.query_row(
            &format!("{} WHERE id = ?", Self::GOAL_SELECT),
            params![id],
            Self::map_goal,
        );
        match row {
            Ok(g) => Ok(Some(g)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_goals(&self, include_completed: bool) -> Result<Vec<GoalRow>> {
        let conn = self.conn.lock();
        let query = if include_completed {
            format!(
                "{} ORDER BY importance DESC, created_at DESC",
                Self::GOAL_SELECT
            )
        } else {
            format!(
                "{} WHERE is_completed = FALSE ORDER BY importance DESC, created_at DESC",
                Self::GOAL_SELECT
            )
        };
        let mut stmt = conn.prepare(&query)?;
        let rows = stmt.query_map([], Self::map_goal)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Open goals linked to the context itself or to any of its tags,
    /// most important first, newest first within an importance level.
    pub fn open_goals_linked_to(
        &self,
        context_id: i64,
        tag_ids: &[i64],
    ) -> Result<Vec<GoalRow>> {
        let conn = self.conn.lock();
        let tag_filter = if tag_ids.is_empty() {
            String::new()
        } else {
            format!(
                " OR linked_tag_id IN ({})",
                vec!["?"; tag_ids.len()].join(", ")
            )
        };
        let query = format!(
            "{} WHERE is_completed = FALSE
                 AND (linked_context_id = ?{})
               ORDER BY importance DESC, created_at DESC",
            Self::GOAL_SELECT,
            tag_filter
        );
        let mut stmt = conn.prepare(&query)?;
        let mut values: Vec<i64> = vec![context_id];
        values.extend_from_slice(tag_ids);
        let rows = stmt.query_map(rusqlite::params_from_iter(values.iter()), Self::map_goal)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Flip a goal to completed. Returns true only on the false -> true
    /// transition; an already-completed goal is a no-op.
    pub fn complete_goal(&self, goal_id: i64) -> Result<bool> {
        let conn = self.conn.lock();
        let exists: i64 = conn.query_row(
            "SELECT COUNT(*) FROM goals WHERE id = ?",
            params![goal_id],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(StoreError::GoalNotFound(goal_id).into());
        }
        let changed = conn.execute(
            "UPDATE goals SET is_completed = TRUE WHERE id = ? AND is_completed = FALSE",
            params![goal_id],
        )?;
        Ok(changed > 0)
    }

    // ============================================
    // ACHIEVEMENTS
    // ============================================

    /// INSERT OR IGNORE backs the one-achievement-per-goal invariant: a
    /// duplicate goal_id hits the unique index and becomes a no-op.
    pub fn add_achievement(
        &self,
        context_id: Option<i64>,
        goal_id: Option<i64>,
        title: &str,
        reflection: &str,
        points: i64,
    ) -> Result<Option<i64>> {
        let conn = self.conn.lock();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO achievements
               (context_id, goal_id, title, reflection, points, achieved_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                context_id,
                goal_id,
                title,
                reflection,
                points,
                Utc::now().to_rfc3339()
            ],
        )?;
        if inserted > 0 {
            Ok(Some(conn.last_insert_rowid()))
        } else {
            Ok(None)
        }
    }

    pub fn total_points(&self) -> Result<i64> {
        let conn = self.conn.lock();
        let total = conn.query_row(
            "SELECT COALESCE(SUM(points), 0) FROM achievements",
            [],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    pub fn list_achievements(&self) -> Result<Vec<AchievementRow>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, context_id, goal_id, title, reflection, points, achieved_at
             FROM achievements ORDER BY achieved_at DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(AchievementRow {
                id: row.get(0)?,
                context_id: row.get(1)?,
                goal_id: row.get(2)?,
                title: row.get(3)?,
                reflection: row.get(4)?,
                points: row.get(5)?,
                achieved_at: row.get(6)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ============================================
    // CHAT
    // ============================================

    pub fn add_chat_message(&self, session_id: &str, role: &str, content: &str) -> Result<i64> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO chat_messages (session_id, role, content, created_at)
             VALUES (?, ?, ?, ?)",
            params![session_id, role, content, Utc::now().to_rfc3339()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Last `limit` messages of a session, in chronological order.
    pub fn recent_chat_messages(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessageRow>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, session_id, role, content, created_at FROM chat_messages
             WHERE session_id = ? ORDER BY id DESC LIMIT ?",
        )?;
        let rows = stmt.query_map(params![session_id, limit as i64], |row| {
            Ok(ChatMessageRow {
                id: row.get(0)?,
                session_id: row.get(1)?,
                role: row.get(2)?,
                content: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;
        let mut messages = rows.collect::<Result<Vec<_>, _>>()?;
        messages.reverse();
        Ok(messages)
    }

    // ============================================
    // RECOMMENDATIONS
    // ============================================

    pub fn add_recommendation(
        &self,
        context_id: i64,
        title: &str,
        summary: &str,
        recommendation: &str,
        priority: i64,
    ) -> Result<i64> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO recommendations
               (context_id, title, summary, recommendation, priority, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                context_id,
                title,
                summary,
                recommendation,
                priority,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn list_recommendations(
        &self,
        context_id: Option<i64>,
    ) -> Result<Vec<RecommendationRow>> {
        let conn = self.conn.lock();
        let base = "SELECT id, context_id, title, summary, recommendation, priority, created_at
             FROM recommendations";
        let map_row = |row: &rusqlite::Row| -> rusqlite::Result<RecommendationRow> {
            Ok(RecommendationRow {
                id: row.get(0)?,
                context_id: row.get(1)?,
                title: row.get(2)?,
                summary: row.get(3)?,
                recommendation: row.get(4)?,
                priority: row.get(5)?,
                created_at: row.get(6)?,
            })
        };
        let rows = match context_id {
            Some(id) => {
                let mut stmt = conn.prepare(&format!(
                    "{} WHERE context_id = ? ORDER BY created_at DESC",
                    base
                ))?;
                let rows = stmt.query_map(params![id], map_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare(&format!("{} ORDER BY created_at DESC", base))?;
                let rows = stmt.query_map([], map_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };
        Ok(rows)
    }

    // ============================================
    // PRESETS
    // ============================================

    pub fn create_preset(&self, name: &str, icon: &str, tag_ids: &[i64]) -> Result<i64> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO presets (name, icon) VALUES (?, ?)",
            params![name, icon],
        )?;
        let preset_id = tx.last_insert_rowid();
        for tag_id in tag_ids {
            tx.execute(
                "INSERT OR IGNORE INTO preset_tags (preset_id, tag_id) VALUES (?, ?)",
                params![preset_id, tag_id],
            )?;
        }
        tx.commit()?;
        Ok(preset_id)
    }

    pub fn list_presets(&self) -> Result<Vec<PresetRow>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT p.id, p.name, p.icon,
                    (SELECT COUNT(*) FROM preset_tags pt WHERE pt.preset_id = p.id)
             FROM presets p ORDER BY p.name",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(PresetRow {
                id: row.get(0)?,
                name: row.get(1)?,
                icon: row.get(2)?,
                tag_count: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Tag ids bundled under a preset name.
    pub fn preset_tag_ids(&self, name: &str) -> Result<Vec<i64>> {
        let conn = self.conn.lock();
        let preset_id: Option<i64> = match conn.query_row(
            "SELECT id FROM presets WHERE name = ?",
            params![name],
            |row| row.get(0),
        ) {
            Ok(id) => Some(id),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => return Err(e.into()),
        };
        let preset_id = preset_id.ok_or_else(|| StoreError::PresetNotFound(name.to_string()))?;

        let mut stmt =
            conn.prepare("SELECT tag_id FROM preset_tags WHERE preset_id = ? ORDER BY tag_id")?;
        let rows = stmt.query_map(params![preset_id], |row| row.get(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ============================================
    // REPORT QUERIES
    // ============================================

    /// Tags of a group ranked by achievements that happened in contexts
    /// containing them.
    pub fn achievements_by_tag(&self, group_name: &str) -> Result<Vec<TagStatRow>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT t.name, t.icon, COUNT(a.id)
             FROM tags t
             JOIN tag_groups g ON t.group_id = g.id
             LEFT JOIN context_tags ct ON ct.tag_id = t.id
             LEFT JOIN achievements a ON a.context_id = ct.context_id
             WHERE g.name = ?
             GROUP BY t.id
             ORDER BY COUNT(a.id) DESC, t.name",
        )?;
        let rows = stmt.query_map(params![group_name], |row| {
            Ok(TagStatRow {
                name: row.get(0)?,
                icon: row.get(1)?,
                value: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Tags of a group/category ranked by total achievement points earned
    /// in contexts containing them.
    pub fn points_by_tag(&self, group_name: &str, category_name: &str) -> Result<Vec<TagStatRow>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT t.name, t.icon, COALESCE(SUM(a.points), 0)
             FROM tags t
             JOIN tag_groups g ON t.group_id = g.id
             JOIN tag_categories c ON t.category_id = c.id
             LEFT JOIN context_tags ct ON ct.tag_id = t.id
             LEFT JOIN achievements a ON a.context_id = ct.context_id
             WHERE g.name = ? AND c.name = ?
             GROUP BY t.id
             ORDER BY COALESCE(SUM(a.points), 0) DESC, t.name",
        )?;
        let rows = stmt.query_map(params![group_name, category_name], |row| {
            Ok(TagStatRow {
                name: row.get(0)?,
                icon: row.get(1)?,
                value: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

fn parse_rfc3339(ts: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(ts)?;
    Ok(parsed.with_timezone(&Utc))
}

// ============================================
// ROW TYPES
// ============================================

#[derive(Debug, Clone)]
pub struct TagRow {
    pub id: i64,
    pub name: String,
    pub icon: String,
    pub group_name: String,
    pub category_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ContextRow {
    pub id: i64,
    pub signature: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NoteRow {
    pub id: i64,
    pub context_id: i64,
    pub title: String,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewGoal {
    pub title: String,
    pub description: Option<String>,
    pub importance: i64,
    pub linked_tag_id: Option<i64>,
    pub linked_context_id: Option<i64>,
    pub deadline: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GoalRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub importance: i64,
    pub is_completed: bool,
    pub linked_tag_id: Option<i64>,
    pub linked_context_id: Option<i64>,
    pub deadline: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct AchievementRow {
    pub id: i64,
    pub context_id: Option<i64>,
    pub goal_id: Option<i64>,
    pub title: String,
    pub reflection: String,
    pub points: i64,
    pub achieved_at: String,
}

#[derive(Debug, Clone)]
pub struct ChatMessageRow {
    pub id: i64,
    pub session_id: String,
    pub role: String,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct RecommendationRow {
    pub id: i64,
    pub context_id: i64,
    pub title: String,
    pub summary: String,
    pub recommendation: String,
    pub priority: i64,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct PresetRow {
    pub id: i64,
    pub name: String,
    pub icon: String,
    pub tag_count: i64,
}

#[derive(Debug, Clone)]
pub struct TagStatRow {
    pub name: String,
    pub icon: String,
    pub value: i64,
}
