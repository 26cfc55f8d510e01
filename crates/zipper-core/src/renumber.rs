//! Renumbering plan
//!
//! Maps every object number of the source graph into a block of fresh
//! numbers directly above the destination's declared size, so the two
//! tables can be combined without collisions.

use crate::error::ZipperError;
use crate::graph::{ObjNr, FREE_HEAD};
use std::collections::BTreeMap;

/// Bijection from source object numbers onto `[base, base + len)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenumberingPlan {
    lookup: BTreeMap<ObjNr, ObjNr>,
    base: ObjNr,
}

impl RenumberingPlan {
    /// Assign fresh numbers consecutively from `base`, in ascending order
    /// of the source numbers.
    ///
    /// The free list head is never renumbered and is skipped if present.
    pub fn new(source_nrs: impl IntoIterator<Item = ObjNr>, base: ObjNr) -> Self {
        let mut sorted: Vec<ObjNr> = source_nrs
            .into_iter()
            .filter(|&nr| nr != FREE_HEAD)
            .collect();
        sorted.sort_unstable();
        sorted.dedup();

        let lookup = sorted
            .into_iter()
            .zip(base..)
            .collect::<BTreeMap<_, _>>();

        Self { lookup, base }
    }

    /// Mapped number for `nr`, or a corruption error if the plan never saw it
    pub fn get(&self, nr: ObjNr) -> Result<ObjNr, ZipperError> {
        self.lookup
            .get(&nr)
            .copied()
            .ok_or(ZipperError::CorruptionError(nr))
    }

    /// First number of the assigned block
    pub fn base(&self) -> ObjNr {
        self.base
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    /// (source, mapped) pairs in ascending source order
    pub fn iter(&self) -> impl Iterator<Item = (ObjNr, ObjNr)> + '_ {
        self.lookup.iter().map(|(&from, &to)| (from, to))
    }
}
