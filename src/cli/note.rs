//! Note commands

use anyhow::Result;

use crate::engine::resolve;
use crate::store::Store;
use crate::webhook::Dispatcher;

pub fn add(
    store: &Store,
    dispatcher: &Dispatcher,
    title: String,
    content: String,
    tags: Vec<i64>,
) -> Result<()> {
    let resolved = match resolve(store, &tags)? {
        Some(r) => r,
        None => {
            println!("Notes attach to a context; pass at least one valid tag with --tags.");
            return Ok(());
        }
    };

    store.add_note(resolved.context.id, &title, &content)?;
    println!(
        "Note '{}' saved to context {} [{}].",
        title, resolved.context.id, resolved.context.signature
    );

    dispatcher.dispatch_context(resolved.context.id);
    Ok(())
}

pub fn list(store: &Store, tags: Vec<i64>) -> Result<()> {
    let resolved = match resolve(store, &tags)? {
        Some(r) => r,
        None => {
            println!("No context for that selection.");
            return Ok(());
        }
    };

    let notes = store.recent_notes(resolved.context.id, 50)?;
    if notes.is_empty() {
        println!("No notes for context [{}].", resolved.context.signature);
        return Ok(());
    }

    for note in notes {
        println!("[{}] {}\n    {}", &note.created_at[..10.min(note.created_at.len())], note.title, note.content);
    }
    Ok(())
}
