//! Consecutive-day streak analytics
//!
//! A tag holds a streak when contexts containing it were created on
//! consecutive local calendar days. A streak is alive if the tag was
//! logged today, or yesterday (grace for "haven't logged today yet").
//! Single isolated days are not streaks.

use std::collections::HashSet;

use anyhow::Result;
use chrono::{Duration, Local, NaiveDate, NaiveTime};

use crate::store::Store;

const DEFAULT_ICON: &str = "star";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Streak {
    pub name: String,
    pub icon: String,
    pub length: u32,
}

/// Length of the currently-alive run of consecutive days ending at `today`
/// or, via the grace day, at `today - 1`. Zero when neither anchor is in
/// the set.
pub fn consecutive_days(dates: &HashSet<NaiveDate>, today: NaiveDate) -> u32 {
    let anchor = if dates.contains(&today) {
        today
    } else if dates.contains(&(today - Duration::days(1))) {
        today - Duration::days(1)
    } else {
        return 0;
    };

    let mut length = 0;
    let mut day = anchor;
    while dates.contains(&day) {
        length += 1;
        day = match day.pred_opt() {
            Some(d) => d,
            None => break,
        };
    }
    length
}

/// Streaks across every tag in the named groups, within the lookback
/// window, longest first. Ties keep discovery order. Only streaks longer
/// than one day are reported.
pub fn streaks_for(
    store: &Store,
    group_names: &[String],
    lookback_days: i64,
    today: NaiveDate,
) -> Result<Vec<Streak>> {
    let window_start = today - Duration::days(lookback_days);
    // Fetch from one day below the window so any local/UTC offset stays
    // covered; the exact filter happens on local dates
    let since = (window_start - Duration::days(1))
        .and_time(NaiveTime::MIN)
        .and_utc();

    let mut streaks = Vec::new();
    for tag in store.tags_in_groups(group_names)? {
        let timestamps = store.context_timestamps_for_tag(tag.id, since)?;
        let dates: HashSet<NaiveDate> = timestamps
            .iter()
            .map(|ts| ts.with_timezone(&Local).date_naive())
            .filter(|d| *d >= window_start && *d <= today)
            .collect();

        if dates.is_empty() {
            continue;
        }

        let length = consecutive_days(&dates, today);
        if length > 1 {
            let icon = if tag.icon.is_empty() {
                DEFAULT_ICON.to_string()
            } else {
                tag.icon.clone()
            };
            streaks.push(Streak {
                name: tag.name,
                icon,
                length,
            });
        }
    }

    // Stable sort: equal lengths keep discovery order
    streaks.sort_by_key(|s| std::cmp::Reverse(s.length));
    Ok(streaks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::signature::resolve;
    use chrono::Utc;

    fn days_ago(n: i64) -> NaiveDate {
        Local::now().date_naive() - Duration::days(n)
    }

    fn date_set(offsets: &[i64]) -> HashSet<NaiveDate> {
        offsets.iter().map(|n| days_ago(*n)).collect()
    }

    #[test]
    fn test_three_consecutive_days() {
        let today = days_ago(0);
        assert_eq!(consecutive_days(&date_set(&[0, 1, 2]), today), 3);
    }

    #[test]
    fn test_single_day_counts_one() {
        let today = days_ago(0);
        assert_eq!(consecutive_days(&date_set(&[0]), today), 1);
    }

    #[test]
    fn test_gap_stops_the_count() {
        let today = days_ago(0);
        // today and three days ago, nothing in between
        assert_eq!(consecutive_days(&date_set(&[0, 3]), today), 1);
        assert_eq!(consecutive_days(&date_set(&[0, 1, 3, 4]), today), 2);
    }

    #[test]
    fn test_grace_day_keeps_streak_alive() {
        let today = days_ago(0);
        // nothing today, logged yesterday and the day before
        assert_eq!(consecutive_days(&date_set(&[1, 2]), today), 2);
    }

    #[test]
    fn test_dead_streak_is_zero() {
        let today = days_ago(0);
        assert_eq!(consecutive_days(&date_set(&[2, 3, 4]), today), 0);
        assert_eq!(consecutive_days(&HashSet::new(), today), 0);
    }

    fn seed_tag(store: &Store, group: &str, name: &str, icon: &str) -> i64 {
        let gid = store.ensure_group(group).unwrap();
        store.create_tag(gid, None, name, icon).unwrap()
    }

    /// One context per day containing `tag`, `n` days back.
    fn log_tag_on(store: &Store, tag: i64, day_offset: i64) {
        let marker = seed_tag(
            store,
            "Time",
            &format!("marker-{}-{}", tag, day_offset),
            "",
        );
        let resolved = resolve(store, &[tag, marker]).unwrap().unwrap();
        store
            .backdate_context(
                resolved.context.id,
                Utc::now() - Duration::days(day_offset),
            )
            .unwrap();
    }

    #[test]
    fn test_streaks_for_reports_and_orders() {
        let store = Store::open_in_memory().unwrap();
        let gym = seed_tag(&store, "Place", "Gym", "fa-dumbbell");
        let park = seed_tag(&store, "Place", "Park", "");
        let cafe = seed_tag(&store, "Place", "Cafe", "fa-coffee");

        for offset in [0, 1, 2] {
            log_tag_on(&store, gym, offset);
        }
        for offset in [0, 1] {
            log_tag_on(&store, park, offset);
        }
        // isolated day, must not appear
        log_tag_on(&store, cafe, 0);

        let groups = vec!["Place".to_string()];
        let streaks = streaks_for(&store, &groups, 30, days_ago(0)).unwrap();

        assert_eq!(streaks.len(), 2);
        assert_eq!(streaks[0].name, "Gym");
        assert_eq!(streaks[0].length, 3);
        assert_eq!(streaks[0].icon, "fa-dumbbell");
        assert_eq!(streaks[1].name, "Park");
        assert_eq!(streaks[1].length, 2);
        // icon fallback for tags without one
        assert_eq!(streaks[1].icon, "star");
    }

    #[test]
    fn test_streaks_for_grace_day() {
        let store = Store::open_in_memory().unwrap();
        let gym = seed_tag(&store, "Place", "Gym", "");

        log_tag_on(&store, gym, 1);
        log_tag_on(&store, gym, 2);

        let groups = vec!["Place".to_string()];
        let streaks = streaks_for(&store, &groups, 30, days_ago(0)).unwrap();
        assert_eq!(streaks.len(), 1);
        assert_eq!(streaks[0].length, 2);
    }

    #[test]
    fn test_streaks_for_historical_today() {
        let store = Store::open_in_memory().unwrap();
        let gym = seed_tag(&store, "Place", "Gym", "");

        for offset in [30, 31, 32] {
            log_tag_on(&store, gym, offset);
        }

        // the window is anchored to the passed `today`, not the wall clock
        let groups = vec!["Place".to_string()];
        let streaks = streaks_for(&store, &groups, 3, days_ago(30)).unwrap();
        assert_eq!(streaks.len(), 1);
        assert_eq!(streaks[0].name, "Gym");
        assert_eq!(streaks[0].length, 3);
    }

    #[test]
    fn test_streaks_for_ignores_other_groups() {
        let store = Store::open_in_memory().unwrap();
        let happy = seed_tag(&store, "Myself", "Happy", "");
        for offset in [0, 1, 2] {
            log_tag_on(&store, happy, offset);
        }

        let groups = vec!["Place".to_string()];
        assert!(streaks_for(&store, &groups, 30, days_ago(0))
            .unwrap()
            .is_empty());
    }
}
