//! Situation-signature resolution
//!
//! A situation is an unordered set of tag ids. Its signature is the
//! deduplicated set sorted ascending and dash-joined as decimal strings,
//! e.g. "1-4-12". The signature is the unique key of the context record,
//! so the same selection always resolves to the same row regardless of
//! order or repetition.
//!
//! Ids are sorted numerically, then rendered. Sorting the rendered strings
//! instead would reorder once id widths mix ("100" < "99"), so the numeric
//! policy keeps signatures stable as ids grow.

use anyhow::Result;

use crate::store::{ContextRow, Store};

/// A resolved context plus the tag set attached to it.
#[derive(Debug, Clone)]
pub struct ResolvedContext {
    pub context: ContextRow,
    pub tag_ids: Vec<i64>,
    /// True when this call created the context record.
    pub created: bool,
}

/// Canonical signature of a tag id multiset. `None` when the set is empty.
pub fn signature_for(tag_ids: &[i64]) -> Option<String> {
    let mut ids: Vec<i64> = tag_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    if ids.is_empty() {
        return None;
    }

    Some(
        ids.iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join("-"),
    )
}

/// Resolve a tag selection to its canonical context, creating it on first
/// sight. Unknown ids are dropped silently; an empty resolved set yields
/// `None` and persists nothing.
pub fn resolve(store: &Store, requested: &[i64]) -> Result<Option<ResolvedContext>> {
    let mut valid = store.existing_tag_ids(requested)?;
    valid.sort_unstable();
    valid.dedup();

    let signature = match signature_for(&valid) {
        Some(sig) => sig,
        None => return Ok(None),
    };

    let (context, created) = store.get_or_create_context(&signature, &valid)?;

    Ok(Some(ResolvedContext {
        context,
        tag_ids: valid,
        created,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn seed_tag(store: &Store, group: &str, name: &str) -> i64 {
        let gid = store.ensure_group(group).unwrap();
        store.create_tag(gid, None, name, "").unwrap()
    }

    #[test]
    fn test_signature_is_order_and_duplicate_invariant() {
        assert_eq!(signature_for(&[12, 4, 1]), Some("1-4-12".to_string()));
        assert_eq!(signature_for(&[1, 4, 12]), Some("1-4-12".to_string()));
        assert_eq!(signature_for(&[4, 1, 12, 4, 1]), Some("1-4-12".to_string()));
        assert_eq!(signature_for(&[]), None);
    }

    #[test]
    fn test_signature_sorts_numerically_across_id_widths() {
        // String sort would put "100" before "99"
        assert_eq!(signature_for(&[100, 99]), Some("99-100".to_string()));
    }

    #[test]
    fn test_resolve_permutations_hit_the_same_context() {
        let store = Store::open_in_memory().unwrap();
        let a = seed_tag(&store, "Place", "Home");
        let b = seed_tag(&store, "Myself", "Happy");
        let c = seed_tag(&store, "Time", "Sunday");

        let first = resolve(&store, &[c, a, b]).unwrap().unwrap();
        assert!(first.created);

        let second = resolve(&store, &[a, b, c, b, a]).unwrap().unwrap();
        assert!(!second.created);
        assert_eq!(first.context.id, second.context.id);
        assert_eq!(first.context.signature, second.context.signature);
        assert_eq!(store.count_contexts().unwrap(), 1);
    }

    #[test]
    fn test_resolve_drops_unknown_ids() {
        let store = Store::open_in_memory().unwrap();
        let a = seed_tag(&store, "Place", "Office");

        let resolved = resolve(&store, &[a, 999, 1000]).unwrap().unwrap();
        assert_eq!(resolved.tag_ids, vec![a]);
        assert_eq!(resolved.context.signature, a.to_string());
    }

    #[test]
    fn test_resolve_empty_or_all_unknown_creates_nothing() {
        let store = Store::open_in_memory().unwrap();

        assert!(resolve(&store, &[]).unwrap().is_none());
        assert!(resolve(&store, &[42, 43]).unwrap().is_none());
        assert_eq!(store.count_contexts().unwrap(), 0);
    }

    #[test]
    fn test_concurrent_resolve_creates_one_context() {
        // Two handles over the same database file, racing on a fresh set
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("situ.db");

        let store = Arc::new(Store::open(&path).unwrap());
        let a = seed_tag(&store, "Place", "Gym");
        let b = seed_tag(&store, "Time", "Morning");

        let other = Arc::new(Store::open(&path).unwrap());

        let mut handles = Vec::new();
        for store in [store.clone(), other.clone(), store.clone(), other.clone()] {
            handles.push(std::thread::spawn(move || {
                resolve(&store, &[b, a]).unwrap().unwrap()
            }));
        }

        let resolved: Vec<ResolvedContext> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        let ids: Vec<i64> = resolved.iter().map(|r| r.context.id).collect();
        assert!(ids.iter().all(|id| *id == ids[0]));
        assert_eq!(resolved.iter().filter(|r| r.created).count(), 1);
        assert_eq!(store.count_contexts().unwrap(), 1);
    }
}
