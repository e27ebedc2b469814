//! Preset commands: quick-access tag bundles

use anyhow::Result;

use crate::store::Store;

pub fn add(store: &Store, name: String, icon: Option<String>, tags: Vec<i64>) -> Result<()> {
    let valid = store.existing_tag_ids(&tags)?;
    if valid.is_empty() {
        println!("A preset needs at least one valid tag id.");
        return Ok(());
    }

    let id = store.create_preset(&name, icon.as_deref().unwrap_or("star"), &valid)?;
    println!("Preset '{}' (id {}, {} tags)", name, id, valid.len());
    Ok(())
}

pub fn list(store: &Store) -> Result<()> {
    let presets = store.list_presets()?;

    if presets.is_empty() {
        println!("No presets. Add one with 'situ preset add'.");
        return Ok(());
    }

    println!("{:<6} {:<20} {:<10} {}", "ID", "Name", "Icon", "Tags");
    println!("{}", "-".repeat(48));
    for preset in presets {
        println!(
            "{:<6} {:<20} {:<10} {}",
            preset.id, preset.name, preset.icon, preset.tag_count
        );
    }
    Ok(())
}
