//! Analytics command: where and in which mood achievements happen

use anyhow::Result;

use crate::store::Store;

pub fn run(store: &Store) -> Result<()> {
    let top_places = store.achievements_by_tag("Place")?;
    if !top_places.is_empty() {
        println!("Top performing places:");
        for stat in top_places.iter().take(5) {
            println!("  {:<20} {} achievements", stat.name, stat.value);
        }
    }

    let mood_stats = store.points_by_tag("Myself", "Mood")?;
    if !mood_stats.is_empty() {
        println!("\nPoints by mood:");
        for stat in mood_stats {
            println!("  {:<20} {} points", stat.name, stat.value);
        }
    }

    let status_stats = store.points_by_tag("Myself", "Status")?;
    if !status_stats.is_empty() {
        println!("\nPoints by status:");
        for stat in status_stats {
            println!("  {:<20} {} points", stat.name, stat.value);
        }
    }

    if top_places.is_empty() {
        println!("Nothing to report yet.");
    }
    Ok(())
}
