//! Resolve command: tag selection -> canonical context

use anyhow::Result;
use chrono::Local;

use crate::engine::{defaults::smart_defaults, relevant_goals, resolve, importance_label};
use crate::store::Store;
use crate::webhook::Dispatcher;

pub fn run(
    store: &Store,
    dispatcher: &Dispatcher,
    mut tags: Vec<i64>,
    preset: Option<String>,
    smart: bool,
    device: String,
) -> Result<()> {
    if let Some(name) = preset {
        tags = store.preset_tag_ids(&name)?;
    } else if smart || tags.is_empty() {
        tags.extend(smart_defaults(store, Local::now(), &device)?);
    }

    let resolved = match resolve(store, &tags)? {
        Some(r) => r,
        None => {
            println!("No context: no valid tags selected.");
            return Ok(());
        }
    };

    println!(
        "Context {} [{}]{}",
        resolved.context.id,
        resolved.context.signature,
        if resolved.created { " (new)" } else { "" },
    );

    let context_tags = store.tags_for_context(resolved.context.id)?;
    let names: Vec<String> = context_tags
        .iter()
        .map(|t| format!("{} ({})", t.name, t.group_name))
        .collect();
    println!("Tags: {}", names.join(", "));

    let notes = store.recent_notes(resolved.context.id, 5)?;
    if !notes.is_empty() {
        println!("\nNotes:");
        for note in notes {
            println!("  - {}: {}", note.title, note.content);
        }
    }

    let goals = relevant_goals(store, Some(&resolved.context))?;
    if !goals.is_empty() {
        println!("\nGoals:");
        for goal in goals {
            println!(
                "  [{}] {} (#{})",
                importance_label(goal.importance),
                goal.title,
                goal.id,
            );
        }
    }

    // Notify the automation peer about the new situation
    if resolved.created {
        dispatcher.dispatch_context(resolved.context.id);
    }

    Ok(())
}
