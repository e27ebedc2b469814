//! Smart-default tag detection
//!
//! Pre-selects tags from the clock and the device hint so a fresh
//! resolution starts from a plausible situation. Missing tags are skipped
//! silently; the registry decides what exists.

use anyhow::Result;
use chrono::{DateTime, Local, Timelike};

use crate::store::Store;

const TIME_GROUP: &str = "Time";
const TOOLS_GROUP: &str = "Tools";

/// Day period for a local hour: Morning 5-11, Afternoon 12-16, Evening
/// otherwise.
pub fn day_period(hour: u32) -> &'static str {
    match hour {
        5..=11 => "Morning",
        12..=16 => "Afternoon",
        _ => "Evening",
    }
}

/// Tag ids suggested for the current moment: the weekday tag, the
/// day-period tag, and the device tag (anything containing "mobile" maps
/// to Mobile, everything else to Laptop).
pub fn smart_defaults(store: &Store, now: DateTime<Local>, device: &str) -> Result<Vec<i64>> {
    let mut defaults = Vec::new();

    let weekday = now.format("%A").to_string();
    if let Some(tag) = store.find_tag(TIME_GROUP, &weekday)? {
        defaults.push(tag.id);
    }

    if let Some(tag) = store.find_tag(TIME_GROUP, day_period(now.hour()))? {
        defaults.push(tag.id);
    }

    let device_name = if device.to_lowercase().contains("mobile") {
        "Mobile"
    } else {
        "Laptop"
    };
    if let Some(tag) = store.find_tag(TOOLS_GROUP, device_name)? {
        defaults.push(tag.id);
    }

    Ok(defaults)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_tag(store: &Store, group: &str, name: &str) -> i64 {
        let gid = store.ensure_group(group).unwrap();
        store.create_tag(gid, None, name, "").unwrap()
    }

    #[test]
    fn test_day_period_boundaries() {
        assert_eq!(day_period(4), "Evening");
        assert_eq!(day_period(5), "Morning");
        assert_eq!(day_period(11), "Morning");
        assert_eq!(day_period(12), "Afternoon");
        assert_eq!(day_period(16), "Afternoon");
        assert_eq!(day_period(17), "Evening");
        assert_eq!(day_period(23), "Evening");
    }

    #[test]
    fn test_detects_weekday_period_and_device() {
        let store = Store::open_in_memory().unwrap();
        let now = Local::now();

        let weekday = seed_tag(&store, "Time", &now.format("%A").to_string());
        let period = seed_tag(&store, "Time", day_period(now.hour()));
        let laptop = seed_tag(&store, "Tools", "Laptop");
        let mobile = seed_tag(&store, "Tools", "Mobile");

        let defaults = smart_defaults(&store, now, "laptop").unwrap();
        assert_eq!(defaults, vec![weekday, period, laptop]);

        let defaults = smart_defaults(&store, now, "Mobile Safari").unwrap();
        assert_eq!(defaults, vec![weekday, period, mobile]);
    }

    #[test]
    fn test_missing_tags_are_skipped() {
        let store = Store::open_in_memory().unwrap();
        // registry knows nothing: no defaults, no error
        assert!(smart_defaults(&store, Local::now(), "laptop")
            .unwrap()
            .is_empty());
    }
}
