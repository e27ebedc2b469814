//! Tag registry commands

use anyhow::Result;

use crate::store::Store;

pub fn add_group(store: &Store, name: String) -> Result<()> {
    let id = store.ensure_group(&name)?;
    println!("Group '{}' (id {})", name, id);
    Ok(())
}

pub fn add_category(store: &Store, group: String, name: String) -> Result<()> {
    let group_id = store.ensure_group(&group)?;
    let id = store.ensure_category(group_id, &name)?;
    println!("Category '{}' > '{}' (id {})", group, name, id);
    Ok(())
}

pub fn add(
    store: &Store,
    group: String,
    category: Option<String>,
    name: String,
    icon: Option<String>,
) -> Result<()> {
    let group_id = store.ensure_group(&group)?;
    let category_id = match category {
        Some(c) => Some(store.ensure_category(group_id, &c)?),
        None => None,
    };
    let id = store.create_tag(
        group_id,
        category_id,
        &name,
        icon.as_deref().unwrap_or(""),
    )?;
    println!("Tag '{}' (id {})", name, id);
    Ok(())
}

pub fn list(store: &Store) -> Result<()> {
    let tags = store.list_tags()?;

    if tags.is_empty() {
        println!("No tags yet. Run 'situ init' or 'situ tag add'.");
        return Ok(());
    }

    println!("{:<6} {:<12} {:<12} {:<20} {}", "ID", "Group", "Category", "Name", "Icon");
    println!("{}", "-".repeat(64));
    for tag in tags {
        println!(
            "{:<6} {:<12} {:<12} {:<20} {}",
            tag.id,
            tag.group_name,
            tag.category_name.as_deref().unwrap_or("-"),
            tag.name,
            if tag.icon.is_empty() { "-" } else { &tag.icon },
        );
    }
    Ok(())
}
