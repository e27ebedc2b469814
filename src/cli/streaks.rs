//! Streaks command

use anyhow::Result;
use chrono::Local;

use crate::engine::streaks_for;
use crate::store::Store;

pub fn run(store: &Store, days: i64, groups: Vec<String>) -> Result<()> {
    let today = Local::now().date_naive();
    let streaks = streaks_for(store, &groups, days, today)?;

    if streaks.is_empty() {
        println!(
            "No streaks in the last {} days (groups: {}).",
            days,
            groups.join(", ")
        );
        return Ok(());
    }

    println!("{:<20} {:<15} {}", "Tag", "Icon", "Streak");
    println!("{}", "-".repeat(44));
    for streak in streaks {
        println!(
            "{:<20} {:<15} {} days",
            streak.name, streak.icon, streak.length
        );
    }
    Ok(())
}
