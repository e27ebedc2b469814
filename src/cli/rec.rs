//! Recommendation commands
//!
//! The automation peer calls back into the surrounding layer with advice
//! for a context; `rec add` is that ingest surface here.

use anyhow::{bail, Result};

use crate::engine::priority_label;
use crate::store::Store;

pub fn add(
    store: &Store,
    context_id: i64,
    title: String,
    summary: Option<String>,
    recommendation: String,
    priority: i64,
) -> Result<()> {
    if store.get_context(context_id)?.is_none() {
        bail!("context {} does not exist", context_id);
    }

    let id = store.add_recommendation(
        context_id,
        &title,
        summary.as_deref().unwrap_or(""),
        &recommendation,
        priority,
    )?;
    println!("Recommendation '{}' (id {}) saved.", title, id);
    Ok(())
}

pub fn list(store: &Store, context: Option<i64>) -> Result<()> {
    let recommendations = store.list_recommendations(context)?;

    if recommendations.is_empty() {
        println!("No recommendations yet.");
        return Ok(());
    }

    for rec in recommendations {
        println!(
            "[{}] ({}) {} - context {}",
            &rec.created_at[..10.min(rec.created_at.len())],
            priority_label(rec.priority),
            rec.title,
            rec.context_id,
        );
        if !rec.summary.is_empty() {
            println!("    {}", rec.summary);
        }
        println!("    {}", rec.recommendation);
    }
    Ok(())
}
