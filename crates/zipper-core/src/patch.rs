//! Reference patching
//!
//! Rewrites every object number inside the source graph through a
//! [`RenumberingPlan`] so the graph can be moved into the destination's
//! number space.

use crate::error::ZipperError;
use crate::graph::{
    AuxiliarySets, Dictionary, DocumentGraph, ObjNr, ObjNrSet, Object, TableEntry, FREE_HEAD,
};
use crate::renumber::RenumberingPlan;
use std::collections::BTreeMap;

/// Patch all references in `obj` in place.
///
/// Stream payloads are opaque; only their dictionaries are visited.
pub fn patch_object(obj: &mut Object, plan: &RenumberingPlan) -> Result<(), ZipperError> {
    match obj {
        Object::Reference(nr) => *nr = plan.get(*nr)?,
        Object::Dictionary(dict) => patch_dict(dict, plan)?,
        Object::Array(arr) => patch_array(arr, plan)?,
        Object::Stream(stream) | Object::ObjectStream(stream) | Object::XRefStream(stream) => {
            patch_dict(&mut stream.dict, plan)?
        }
        Object::Null
        | Object::Boolean(_)
        | Object::Integer(_)
        | Object::Real(_)
        | Object::Name(_)
        | Object::String(..) => {}
    }
    Ok(())
}

pub fn patch_dict(dict: &mut Dictionary, plan: &RenumberingPlan) -> Result<(), ZipperError> {
    for (_, value) in dict.iter_mut() {
        patch_object(value, plan)?;
    }
    Ok(())
}

pub fn patch_array(arr: &mut [Object], plan: &RenumberingPlan) -> Result<(), ZipperError> {
    for value in arr.iter_mut() {
        patch_object(value, plan)?;
    }
    Ok(())
}

/// Remap a set of object numbers
pub fn patch_obj_nr_set(
    set: &ObjNrSet,
    plan: &RenumberingPlan,
) -> Result<ObjNrSet, ZipperError> {
    set.iter().map(|&nr| plan.get(nr)).collect()
}

fn patch_auxiliary_sets(
    aux: &mut AuxiliarySets,
    plan: &RenumberingPlan,
) -> Result<(), ZipperError> {
    for set in aux.sets_mut() {
        *set = patch_obj_nr_set(set, plan)?;
    }
    Ok(())
}

/// Free list pointers use 0 as terminator, which is never renumbered
fn patch_free_link(next: ObjNr, plan: &RenumberingPlan) -> Result<ObjNr, ZipperError> {
    if next == FREE_HEAD {
        Ok(FREE_HEAD)
    } else {
        plan.get(next)
    }
}

/// Renumber a whole source graph.
///
/// Patches root, info, the free list head, every table entry and the
/// auxiliary sets, then re-keys the table under the mapped numbers. The
/// declared size is left alone: it stops meaning anything once the graph
/// lives in another number space, and the graph is consumed by the
/// transplant right after.
pub fn patch_source_object_numbers(
    mut source: DocumentGraph,
    plan: &RenumberingPlan,
) -> Result<DocumentGraph, ZipperError> {
    tracing::debug!(
        "patch_source_object_numbers: {} objects, base #{}",
        plan.len(),
        plan.base()
    );

    source.root = plan.get(source.root)?;
    if let Some(info) = source.info {
        source.info = Some(plan.get(info)?);
    }

    let head = source.free_list_head();
    let patched_head = patch_free_link(head, plan)?;

    let mut table = BTreeMap::new();
    for (nr, mut entry) in std::mem::take(&mut source.table) {
        if nr == FREE_HEAD {
            continue;
        }

        match &mut entry {
            TableEntry::Free { next, .. } => {
                let patched = patch_free_link(*next, plan)?;
                tracing::trace!("patch free entry #{}: next {} -> {}", nr, next, patched);
                *next = patched;
            }
            TableEntry::InUse { object, .. } => {
                tracing::trace!("patch obj #{}", nr);
                patch_object(object, plan)?;
            }
        }

        table.insert(plan.get(nr)?, entry);
    }
    source.table = table;
    source.set_free_list_head(patched_head);

    patch_auxiliary_sets(&mut source.aux, plan)?;

    tracing::debug!("patch_source_object_numbers end");
    Ok(source)
}
