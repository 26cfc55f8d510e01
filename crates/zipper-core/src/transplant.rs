//! Moving a renumbered source graph into the destination
//!
//! Entries are moved, not copied. After the move the destination holds
//! two catalogs; the source's catalog and info dictionary are freed so
//! only the destination's stay reachable.

use crate::error::ZipperError;
use crate::graph::{DocumentGraph, ObjNr, ObjNrSet, TableEntry, FREE_HEAD};

/// Insert every source entry except the free list head into `dest`.
///
/// Returns the patched source free list head so the caller can splice
/// the source's free chain. Each entry bumps the declared size by one.
pub fn append_source_objects_to_dest(
    source_table: impl IntoIterator<Item = (ObjNr, TableEntry)>,
    dest: &mut DocumentGraph,
) -> ObjNr {
    tracing::debug!("append_source_objects_to_dest begin");

    let mut source_free_head = FREE_HEAD;
    let mut appended = 0usize;

    for (nr, entry) in source_table {
        if nr == FREE_HEAD {
            if let TableEntry::Free { next, .. } = entry {
                source_free_head = next;
            }
            continue;
        }

        tracing::trace!("adding obj #{} from source to dest", nr);
        dest.table.insert(nr, entry);
        dest.size += 1;
        appended += 1;
    }

    tracing::debug!("append_source_objects_to_dest end: {} entries", appended);
    source_free_head
}

/// Link a chain of transplanted free entries in front of the destination's
/// free list.
///
/// The walk to the chain's tail is bounded by the table size; a chain that
/// runs into an in-use or missing entry is left unlinked.
pub fn splice_free_list(dest: &mut DocumentGraph, chain_head: ObjNr) {
    if chain_head == FREE_HEAD {
        return;
    }

    let mut tail = chain_head;
    let mut terminated = false;
    for _ in 0..dest.table.len() {
        match dest.table.get(&tail) {
            Some(TableEntry::Free { next, .. }) if *next == FREE_HEAD => {
                terminated = true;
                break;
            }
            Some(TableEntry::Free { next, .. }) => tail = *next,
            _ => break,
        }
    }

    if !terminated {
        tracing::warn!(
            "source free list starting at #{} is not terminated, left unlinked",
            chain_head
        );
        return;
    }

    let old_head = dest.free_list_head();
    if let Some(TableEntry::Free { next, .. }) = dest.table.get_mut(&tail) {
        *next = old_head;
    }
    dest.set_free_list_head(chain_head);
    tracing::debug!("spliced source free list #{}..#{}", chain_head, tail);
}

/// Free the source's catalog and, if present, its info dictionary.
///
/// Objects referenced only from the info dictionary stay in use; they are
/// not traced and freed along with it.
pub fn reclaim_source_roots(
    dest: &mut DocumentGraph,
    source_root: ObjNr,
    source_info: Option<ObjNr>,
) -> Result<(), ZipperError> {
    dest.delete_object(source_root)?;

    if let Some(info) = source_info {
        dest.delete_object(info)?;
    }

    Ok(())
}

/// Union the source's (already renumbered) auxiliary sets into the destination's
pub fn merge_obj_nr_sets(source: [ObjNrSet; 4], dest: &mut DocumentGraph) {
    tracing::debug!("merge_obj_nr_sets");

    for (src, dst) in source.into_iter().zip(dest.aux.sets_mut()) {
        dst.extend(src);
    }
}
