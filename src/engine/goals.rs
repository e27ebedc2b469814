//! Goal aggregation for a resolved context

use anyhow::Result;

use crate::store::{ContextRow, GoalRow, Store};

/// All open goals relevant to a context: linked to the context itself, or
/// to any tag it contains. Ordered by importance descending, then newest
/// first. No context means no goals.
pub fn relevant_goals(store: &Store, context: Option<&ContextRow>) -> Result<Vec<GoalRow>> {
    let context = match context {
        Some(c) => c,
        None => return Ok(Vec::new()),
    };

    let tag_ids = store.context_tag_ids(context.id)?;
    store.open_goals_linked_to(context.id, &tag_ids)
}
