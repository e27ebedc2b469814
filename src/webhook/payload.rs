//! Outbound event payload construction
//!
//! Two wire shapes, one per logical endpoint. Field names are part of the
//! automation workflow contract; do not rename casually.

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;

use crate::engine::importance_label;
use crate::store::{ChatMessageRow, Store};

/// Cap on notes carried in a context event.
pub const MAX_NOTES: usize = 5;
/// Cap on goals carried in a context event.
pub const MAX_GOALS: usize = 5;
/// Cap on prior messages carried in a chat event.
pub const MAX_HISTORY: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct ContextEvent {
    pub context_id: i64,
    pub unique_signature: String,
    pub created_at: String,
    pub options: Vec<OptionInfo>,
    pub notes: Vec<NoteInfo>,
    pub active_goals: Vec<GoalInfo>,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionInfo {
    pub id: i64,
    pub name: String,
    pub group: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NoteInfo {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalInfo {
    pub title: String,
    pub importance_label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatEvent {
    pub session_id: String,
    pub message: String,
    pub history: Vec<HistoryMessage>,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryMessage {
    pub role: String,
    pub content: String,
}

/// Snapshot of a context for the automation peer: its tags, the newest
/// notes, and the most pressing open goals. `None` when the context row is
/// gone by the time the event is built.
pub fn context_event(store: &Store, context_id: i64) -> Result<Option<ContextEvent>> {
    let context = match store.get_context(context_id)? {
        Some(c) => c,
        None => return Ok(None),
    };

    let options = store
        .tags_for_context(context.id)?
        .into_iter()
        .map(|tag| OptionInfo {
            id: tag.id,
            name: tag.name,
            group: tag.group_name,
            category: tag.category_name,
        })
        .collect();

    let notes = store
        .recent_notes(context.id, MAX_NOTES)?
        .into_iter()
        .map(|note| NoteInfo {
            title: note.title,
            content: note.content,
        })
        .collect();

    let tag_ids = store.context_tag_ids(context.id)?;
    let active_goals = store
        .open_goals_linked_to(context.id, &tag_ids)?
        .into_iter()
        .take(MAX_GOALS)
        .map(|goal| GoalInfo {
            title: goal.title,
            importance_label: importance_label(goal.importance).to_string(),
        })
        .collect();

    Ok(Some(ContextEvent {
        context_id: context.id,
        unique_signature: context.signature,
        created_at: context.created_at,
        options,
        notes,
        active_goals,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

/// Chat event carrying the new message and the prior history (capped,
/// chronological) so the peer can stay stateless.
pub fn chat_event(session_id: &str, message: &str, history: &[ChatMessageRow]) -> ChatEvent {
    let start = history.len().saturating_sub(MAX_HISTORY);
    ChatEvent {
        session_id: session_id.to_string(),
        message: message.to_string(),
        history: history[start..]
            .iter()
            .map(|m| HistoryMessage {
                role: m.role.clone(),
                content: m.content.clone(),
            })
            .collect(),
        timestamp: Utc::now().to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::signature::resolve;
    use crate::store::NewGoal;

    #[test]
    fn test_context_event_shape() {
        let store = Store::open_in_memory().unwrap();
        let gid = store.ensure_group("Place").unwrap();
        let cid = store.ensure_category(gid, "Indoors").unwrap();
        let home = store.create_tag(gid, Some(cid), "Home", "fa-home").unwrap();

        let resolved = resolve(&store, &[home]).unwrap().unwrap();
        store
            .add_note(resolved.context.id, "Wifi", "Router password on the box")
            .unwrap();
        store
            .add_goal(&NewGoal {
                title: "Water the plants".to_string(),
                importance: 3,
                linked_tag_id: Some(home),
                ..Default::default()
            })
            .unwrap();

        let event = context_event(&store, resolved.context.id)
            .unwrap()
            .unwrap();
        assert_eq!(event.context_id, resolved.context.id);
        assert_eq!(event.unique_signature, home.to_string());
        assert_eq!(event.options.len(), 1);
        assert_eq!(event.options[0].group, "Place");
        assert_eq!(event.options[0].category.as_deref(), Some("Indoors"));
        assert_eq!(event.notes.len(), 1);
        assert_eq!(event.active_goals.len(), 1);
        assert_eq!(event.active_goals[0].importance_label, "High");

        let value = serde_json::to_value(&event).unwrap();
        assert!(value.get("unique_signature").is_some());
        assert!(value.get("timestamp").is_some());
    }

    #[test]
    fn test_context_event_caps_notes_and_goals() {
        let store = Store::open_in_memory().unwrap();
        let gid = store.ensure_group("Place").unwrap();
        let home = store.create_tag(gid, None, "Home", "").unwrap();
        let resolved = resolve(&store, &[home]).unwrap().unwrap();

        for i in 0..8 {
            store
                .add_note(resolved.context.id, &format!("note {}", i), "x")
                .unwrap();
            store
                .add_goal(&NewGoal {
                    title: format!("goal {}", i),
                    importance: 2,
                    linked_tag_id: Some(home),
                    ..Default::default()
                })
                .unwrap();
        }

        let event = context_event(&store, resolved.context.id)
            .unwrap()
            .unwrap();
        assert_eq!(event.notes.len(), MAX_NOTES);
        assert_eq!(event.active_goals.len(), MAX_GOALS);
    }

    #[test]
    fn test_context_event_missing_context() {
        let store = Store::open_in_memory().unwrap();
        assert!(context_event(&store, 7).unwrap().is_none());
    }

    #[test]
    fn test_chat_event_history_cap_keeps_newest() {
        let store = Store::open_in_memory().unwrap();
        for i in 0..15 {
            store
                .add_chat_message("s", "user", &format!("m{}", i))
                .unwrap();
        }
        let history = store.recent_chat_messages("s", 50).unwrap();

        let event = chat_event("s", "newest", &history);
        assert_eq!(event.history.len(), MAX_HISTORY);
        assert_eq!(event.history.first().unwrap().content, "m5");
        assert_eq!(event.history.last().unwrap().content, "m14");
        assert_eq!(event.message, "newest");
    }
}
