//! Server-wins reconciliation of a local collection against a snapshot.
//!
//! # Invariants
//! - After a merge the local ids are exactly the remote ids.
//! - Records present on both sides keep their local position.
//! - Remote-only records are appended in remote order.
//! - No local edit is ever preferred over the remote copy.
//! - Each id appears at most once afterwards. A duplicated local id keeps
//!   its first position; a duplicated remote id takes its first copy.

use crate::model::quote::{Quote, QuoteId};
use std::collections::{HashMap, HashSet};

/// Counts of changes applied by one merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub updated: usize,
    pub added: usize,
    pub removed: usize,
}

impl MergeReport {
    pub fn changed(&self) -> bool {
        self.updated > 0 || self.added > 0 || self.removed > 0
    }
}

/// Applies `remote` onto `local` in place.
pub fn merge_snapshot(local: &mut Vec<Quote>, remote: &[Quote]) -> MergeReport {
    let mut report = MergeReport::default();
    let mut positions: HashMap<QuoteId, usize> = HashMap::with_capacity(local.len());
    for (position, quote) in local.iter().enumerate() {
        positions.entry(quote.id.clone()).or_insert(position);
    }

    let mut remote_ids: HashSet<&QuoteId> = HashSet::with_capacity(remote.len());
    for incoming in remote {
        if !remote_ids.insert(&incoming.id) {
            continue;
        }
        match positions.get(&incoming.id) {
            Some(&position) => {
                if local[position] != *incoming {
                    local[position] = incoming.clone();
                    report.updated += 1;
                }
            }
            None => {
                positions.insert(incoming.id.clone(), local.len());
                local.push(incoming.clone());
                report.added += 1;
            }
        }
    }

    let before = local.len();
    let mut kept: HashSet<QuoteId> = HashSet::with_capacity(remote_ids.len());
    local.retain(|quote| remote_ids.contains(&quote.id) && kept.insert(quote.id.clone()));
    report.removed = before - local.len();

    report
}
