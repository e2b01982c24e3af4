// File: src/core/merge.rs
use crate::core::types::{Word, WordKey};
use std::collections::HashMap;

/// Maps every stored key to the `createdAt` it carries.
/// A later duplicate only fills in a timestamp the earlier one was missing.
pub fn collect_existing(existing: &[Word]) -> HashMap<WordKey, Option<i64>> {
    let mut lookup: HashMap<WordKey, Option<i64>> = HashMap::with_capacity(existing.len());
    for word in existing {
        let slot = lookup.entry(word.key()).or_insert(None);
        if slot.is_none() {
            *slot = word.created_at;
        }
    }
    lookup
}

/// Reconciles an incoming snapshot against the stored words.
///
/// The snapshot is authoritative for membership and for every field except
/// `createdAt`, which survives from the stored entry whenever it had one.
/// Output follows incoming order. Stored words missing from the snapshot are
/// dropped. If the snapshot repeats a key, the last occurrence's fields land
/// at the first occurrence's position, so keys stay unique in the result.
pub fn merge(existing: &[Word], incoming: Vec<Word>) -> Vec<Word> {
    let history = collect_existing(existing);
    let mut merged: Vec<Word> = Vec::with_capacity(incoming.len());
    let mut positions: HashMap<WordKey, usize> = HashMap::with_capacity(incoming.len());

    for mut word in incoming {
        let key = word.key();

        if let Some(Some(created_at)) = history.get(&key) {
            word.created_at = Some(*created_at);
        }

        match positions.get(&key) {
            Some(&index) => {
                // Repeated key inside one snapshot. Keep the first position
                // and any timestamp already settled for it.
                let settled = merged[index].created_at;
                merged[index] = word;
                if merged[index].created_at.is_none() {
                    merged[index].created_at = settled;
                }
            }
            None => {
                positions.insert(key, merged.len());
                merged.push(word);
            }
        }
    }

    merged
}
