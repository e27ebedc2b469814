//! Chat commands
//!
//! `send` persists the user message and fires the chat event; the
//! assistant's reply, if the automation peer produces one, lands in the
//! session history once delivery completes.

use anyhow::Result;
use uuid::Uuid;

use crate::store::Store;
use crate::webhook::payload::MAX_HISTORY;
use crate::webhook::Dispatcher;

pub fn send(
    store: &Store,
    dispatcher: &Dispatcher,
    session: Option<String>,
    message: String,
) -> Result<()> {
    let session_id = session.unwrap_or_else(|| Uuid::new_v4().to_string());

    // History snapshot precedes the new message so the payload carries
    // prior turns only
    let history = store.recent_chat_messages(&session_id, MAX_HISTORY)?;
    store.add_chat_message(&session_id, "user", &message)?;

    dispatcher.dispatch_chat(&session_id, &message, &history);

    println!("Sent to session {}.", session_id);
    println!("Check replies with: situ chat history --session {}", session_id);
    Ok(())
}

pub fn history(store: &Store, session: String, limit: usize) -> Result<()> {
    let messages = store.recent_chat_messages(&session, limit)?;

    if messages.is_empty() {
        println!("No messages in session {}.", session);
        return Ok(());
    }

    for message in messages {
        let stamp = &message.created_at[..16.min(message.created_at.len())];
        println!("[{}] {:>9}: {}", stamp, message.role, message.content);
    }
    Ok(())
}
