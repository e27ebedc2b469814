//! Profile command: points and badges

use anyhow::Result;

use crate::engine::profile;
use crate::store::Store;

pub fn run(store: &Store) -> Result<()> {
    let profile = profile(store)?;

    println!("Total points: {}", profile.total_points);

    if profile.badges.is_empty() {
        println!("No badges yet. Log a situation to start the journey.");
    } else {
        println!("\nBadges:");
        for badge in &profile.badges {
            println!("  * {} - {}", badge.name, badge.description);
        }
    }

    let achievements = store.list_achievements()?;
    if !achievements.is_empty() {
        println!("\nRecent achievements:");
        for achievement in achievements.iter().take(10) {
            println!(
                "  [{}] {} (+{})",
                &achievement.achieved_at[..10.min(achievement.achieved_at.len())],
                achievement.title,
                achievement.points,
            );
        }
    }
    Ok(())
}
