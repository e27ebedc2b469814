//! Point totals and badge evaluation
//!
//! Every call recomputes from current data; nothing is cached or revoked.

use anyhow::Result;
use chrono::{Local, Timelike};

use crate::store::Store;

/// Local hour at or after which a context counts towards Night Owl.
const NIGHT_OWL_HOUR: u32 = 23;
const NIGHT_OWL_THRESHOLD: usize = 5;
const HIGH_ACHIEVER_POINTS: i64 = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone)]
pub struct Profile {
    pub total_points: i64,
    pub badges: Vec<Badge>,
}

/// Current gamification profile: achievement point total plus unlocked
/// badges, evaluated in a fixed order.
pub fn profile(store: &Store) -> Result<Profile> {
    let total_points = store.total_points()?;
    let mut badges = Vec::new();

    if store.count_contexts()? > 0 {
        badges.push(Badge {
            name: "Started Journey",
            description: "Logged a first situation",
        });
    }

    if total_points > HIGH_ACHIEVER_POINTS {
        badges.push(Badge {
            name: "High Achiever",
            description: "Earned more than 500 points",
        });
    }

    let late_night = store
        .context_timestamps()?
        .iter()
        .filter(|ts| ts.with_timezone(&Local).hour() >= NIGHT_OWL_HOUR)
        .count();
    if late_night > NIGHT_OWL_THRESHOLD {
        badges.push(Badge {
            name: "Night Owl",
            description: "Logged more than 5 situations after 23:00",
        });
    }

    Ok(Profile {
        total_points,
        badges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};

    use crate::engine::signature::resolve;

    fn seed_tag(store: &Store, group: &str, name: &str) -> i64 {
        let gid = store.ensure_group(group).unwrap();
        store.create_tag(gid, None, name, "").unwrap()
    }

    fn badge_names(profile: &Profile) -> Vec<&'static str> {
        profile.badges.iter().map(|b| b.name).collect()
    }

    #[test]
    fn test_empty_store_has_nothing() {
        let store = Store::open_in_memory().unwrap();
        let profile = profile(&store).unwrap();
        assert_eq!(profile.total_points, 0);
        assert!(profile.badges.is_empty());
    }

    #[test]
    fn test_first_context_starts_the_journey() {
        let store = Store::open_in_memory().unwrap();
        let home = seed_tag(&store, "Place", "Home");
        resolve(&store, &[home]).unwrap().unwrap();

        let profile = profile(&store).unwrap();
        assert_eq!(badge_names(&profile), vec!["Started Journey"]);
    }

    #[test]
    fn test_high_achiever_strictly_above_500() {
        let store = Store::open_in_memory().unwrap();
        store
            .add_achievement(None, None, "Milestone", "", 500)
            .unwrap();
        assert_eq!(profile(&store).unwrap().total_points, 500);
        assert!(badge_names(&profile(&store).unwrap()).is_empty());

        store.add_achievement(None, None, "One more", "", 1).unwrap();
        let p = profile(&store).unwrap();
        assert_eq!(p.total_points, 501);
        assert_eq!(badge_names(&p), vec!["High Achiever"]);
    }

    /// A UTC instant whose local wall clock reads 23:30, `n` days back.
    fn late_night_instant(n: i64) -> DateTime<Utc> {
        let day = Local::now().date_naive() - Duration::days(n + 1);
        let local = Local
            .from_local_datetime(&day.and_time(
                NaiveTime::from_hms_opt(23, 30, 0).unwrap(),
            ))
            .single()
            .unwrap();
        local.with_timezone(&Utc)
    }

    #[test]
    fn test_night_owl_needs_more_than_five() {
        let store = Store::open_in_memory().unwrap();
        let home = seed_tag(&store, "Place", "Home");

        for n in 0..5 {
            let marker = seed_tag(&store, "Time", &format!("night-{}", n));
            let resolved = resolve(&store, &[home, marker]).unwrap().unwrap();
            store
                .backdate_context(resolved.context.id, late_night_instant(n))
                .unwrap();
        }
        // five late contexts plus one early one: not yet an owl
        let early = resolve(&store, &[home]).unwrap().unwrap();
        store
            .backdate_context(
                early.context.id,
                Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap(),
            )
            .unwrap();
        assert!(!badge_names(&profile(&store).unwrap()).contains(&"Night Owl"));

        let marker = seed_tag(&store, "Time", "night-6");
        let resolved = resolve(&store, &[home, marker]).unwrap().unwrap();
        store
            .backdate_context(resolved.context.id, late_night_instant(6))
            .unwrap();
        assert!(badge_names(&profile(&store).unwrap()).contains(&"Night Owl"));
    }
}
