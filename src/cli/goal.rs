//! Goal commands

use anyhow::Result;

use crate::engine::{importance_label, points_for_importance};
use crate::store::{NewGoal, Store, StoreError};
use crate::webhook::Dispatcher;

#[allow(clippy::too_many_arguments)]
pub fn add(
    store: &Store,
    dispatcher: &Dispatcher,
    title: String,
    description: Option<String>,
    importance: i64,
    tag: Option<i64>,
    context: Option<i64>,
    deadline: Option<String>,
) -> Result<()> {
    let goal_id = store.add_goal(&NewGoal {
        title: title.clone(),
        description,
        importance,
        linked_tag_id: tag,
        linked_context_id: context,
        deadline,
    })?;
    println!(
        "Goal '{}' (id {}, {})",
        title,
        goal_id,
        importance_label(importance)
    );

    if let Some(context_id) = context {
        dispatcher.dispatch_context(context_id);
    }
    Ok(())
}

pub fn list(store: &Store, all: bool) -> Result<()> {
    let goals = store.list_goals(all)?;

    if goals.is_empty() {
        println!("No goals. Add one with 'situ goal add'.");
        return Ok(());
    }

    println!("{:<6} {:<10} {:<6} {:<30} {}", "ID", "Priority", "Done", "Title", "Linked to");
    println!("{}", "-".repeat(72));
    for goal in goals {
        let linked = match (goal.linked_tag_id, goal.linked_context_id) {
            (Some(tag), _) => format!("tag {}", tag),
            (_, Some(context)) => format!("context {}", context),
            _ => "-".to_string(),
        };
        println!(
            "{:<6} {:<10} {:<6} {:<30} {}",
            goal.id,
            importance_label(goal.importance),
            if goal.is_completed { "yes" } else { "no" },
            goal.title,
            linked,
        );
    }
    Ok(())
}

/// Complete a goal. The false -> true transition mints the achievement;
/// repeating the command is a no-op.
pub fn done(
    store: &Store,
    dispatcher: &Dispatcher,
    goal_id: i64,
    reflection: Option<String>,
) -> Result<()> {
    let goal = store
        .get_goal(goal_id)?
        .ok_or(StoreError::GoalNotFound(goal_id))?;

    if !store.complete_goal(goal_id)? {
        println!("Goal '{}' was already completed.", goal.title);
        return Ok(());
    }

    let points = points_for_importance(goal.importance);
    store.add_achievement(
        goal.linked_context_id,
        Some(goal_id),
        &goal.title,
        reflection.as_deref().unwrap_or(""),
        points,
    )?;
    println!("Completed '{}' (+{} points).", goal.title, points);

    if let Some(context_id) = goal.linked_context_id {
        dispatcher.dispatch_context(context_id);
    }
    Ok(())
}
