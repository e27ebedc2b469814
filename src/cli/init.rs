//! Init command: seed the base tag registry

use anyhow::Result;

use crate::store::Store;

const GROUPS: [&str; 5] = ["Place", "People", "Time", "Tools", "Myself"];

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub fn run(store: &Store) -> Result<()> {
    for group in GROUPS {
        store.ensure_group(group)?;
    }

    let time = store.ensure_group("Time")?;
    for day in WEEKDAYS {
        ensure_tag(store, time, "Time", day, "fa-calendar")?;
    }
    for period in ["Morning", "Afternoon", "Evening"] {
        ensure_tag(store, time, "Time", period, "fa-clock")?;
    }

    let tools = store.ensure_group("Tools")?;
    ensure_tag(store, tools, "Tools", "Laptop", "fa-laptop")?;
    ensure_tag(store, tools, "Tools", "Mobile", "fa-mobile")?;

    let place = store.ensure_group("Place")?;
    ensure_tag(store, place, "Place", "Home", "fa-home")?;
    ensure_tag(store, place, "Place", "Office", "fa-building")?;

    let myself = store.ensure_group("Myself")?;
    let mood = store.ensure_category(myself, "Mood")?;
    for (name, icon) in [
        ("Happy", "fa-smile"),
        ("Focused", "fa-bullseye"),
        ("Tired", "fa-bed"),
    ] {
        ensure_tag_in_category(store, myself, Some(mood), "Myself", name, icon)?;
    }
    let status = store.ensure_category(myself, "Status")?;
    for (name, icon) in [("Busy", "fa-hourglass"), ("Free", "fa-mug-hot")] {
        ensure_tag_in_category(store, myself, Some(status), "Myself", name, icon)?;
    }

    let tags = store.list_tags()?;
    println!("Registry seeded: {} groups, {} tags.", GROUPS.len(), tags.len());
    Ok(())
}

fn ensure_tag(store: &Store, group_id: i64, group_name: &str, name: &str, icon: &str) -> Result<()> {
    ensure_tag_in_category(store, group_id, None, group_name, name, icon)
}

fn ensure_tag_in_category(
    store: &Store,
    group_id: i64,
    category_id: Option<i64>,
    group_name: &str,
    name: &str,
    icon: &str,
) -> Result<()> {
    if store.find_tag(group_name, name)?.is_none() {
        store.create_tag(group_id, category_id, name, icon)?;
    }
    Ok(())
}
