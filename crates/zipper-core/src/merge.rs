//! Zipper merge of two document graphs
//!
//! The algorithm:
//! 1. Plan fresh numbers for every source object, starting at the
//!    destination's declared size
//! 2. Patch every reference in the source through the plan and re-key its table
//! 3. Zip the source's pages into the destination's page tree
//! 4. Move the source entries into the destination table
//! 5. Free the source's catalog and info dictionary
//! 6. Union the auxiliary object number sets

use crate::error::ZipperError;
use crate::graph::DocumentGraph;
use crate::interleave::zipper_merge_page_trees;
use crate::patch::patch_source_object_numbers;
use crate::renumber::RenumberingPlan;
use crate::transplant::{
    append_source_objects_to_dest, merge_obj_nr_sets, reclaim_source_roots, splice_free_list,
};

/// Merge `source` into `dest`, interleaving their pages.
///
/// `source` is consumed. On error `dest` may be partially modified and
/// must be discarded; only page tree and renumbering errors are
/// guaranteed to leave it untouched.
pub fn zipper_merge(
    source: DocumentGraph,
    dest: &mut DocumentGraph,
    reverse_source: bool,
    reverse_dest: bool,
) -> Result<(), ZipperError> {
    tracing::debug!(
        "zipper_merge: source {} entries (size {}), dest {} entries (size {})",
        source.table.len(),
        source.size,
        dest.table.len(),
        dest.size
    );

    let plan = RenumberingPlan::new(source.real_object_numbers(), dest.size);
    let source = patch_source_object_numbers(source, &plan)?;

    zipper_merge_page_trees(&source, dest, reverse_source, reverse_dest)?;

    let DocumentGraph {
        table,
        root,
        info,
        aux,
        ..
    } = source;

    let source_free_head = append_source_objects_to_dest(table, dest);
    splice_free_list(dest, source_free_head);

    reclaim_source_roots(dest, root, info)?;

    merge_obj_nr_sets(aux.into_sets(), dest);

    tracing::info!(
        "zipper_merge: {} pages, {} entries, size {}",
        dest.page_count,
        dest.table.len(),
        dest.size
    );
    Ok(())
}
