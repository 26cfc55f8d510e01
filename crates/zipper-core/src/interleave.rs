//! Page tree zipper
//!
//! Builds the merged page order by alternately taking one page from each
//! document, like closing a zipper. Either side can be walked back to
//! front, which is how a stack of odd pages and a reversed stack of even
//! pages from a single-sided scanner end up in reading order.

use crate::error::ZipperError;
use crate::graph::{DocumentGraph, ObjNr, Object};
use std::collections::VecDeque;

/// Take the next element from the front, or from the back when `reverse`
fn next_item<T>(items: &mut VecDeque<T>, reverse: bool) -> Option<T> {
    if reverse {
        items.pop_back()
    } else {
        items.pop_front()
    }
}

/// Alternate `first` and `second`, starting with `first`.
///
/// Once one side runs out the other drains in its own order. Elements are
/// only moved, never inspected.
pub fn interleave<T>(
    first: Vec<T>,
    second: Vec<T>,
    reverse_first: bool,
    reverse_second: bool,
) -> Vec<T> {
    let mut merged = Vec::with_capacity(first.len() + second.len());
    let mut first = VecDeque::from(first);
    let mut second = VecDeque::from(second);

    while !first.is_empty() || !second.is_empty() {
        merged.extend(next_item(&mut first, reverse_first));
        merged.extend(next_item(&mut second, reverse_second));
    }

    merged
}

/// `/Kids` of a page tree root; a missing entry counts as no pages
fn page_kids(graph: &DocumentGraph, pages_root: ObjNr) -> Result<Vec<Object>, ZipperError> {
    match graph.dereference_dict(pages_root)?.get(b"Kids") {
        Some(Object::Array(kids)) => Ok(kids.clone()),
        Some(other) => Err(ZipperError::StructuralError(format!(
            "Kids of pages obj #{} is a {}, expected an array",
            pages_root,
            other.kind()
        ))),
        None => Ok(Vec::new()),
    }
}

/// Zip the source's pages into the destination's page tree.
///
/// Both page trees are resolved before the destination is touched, so a
/// structural error leaves it unchanged. The source must already live in
/// the destination's number space.
pub fn zipper_merge_page_trees(
    source: &DocumentGraph,
    dest: &mut DocumentGraph,
    reverse_source: bool,
    reverse_dest: bool,
) -> Result<(), ZipperError> {
    tracing::debug!("zipper_merge_page_trees begin");

    let dest_pages_root = dest.pages_root()?;
    let dest_kids = page_kids(dest, dest_pages_root)?;

    let source_pages_root = source.pages_root()?;
    let source_kids = page_kids(source, source_pages_root)?;

    let merged = interleave(dest_kids, source_kids, reverse_dest, reverse_source);
    let count = merged.len();

    let pages_dict = dest.dereference_dict_mut(dest_pages_root)?;
    pages_dict.set("Count", Object::Integer(count as i64));
    pages_dict.set("Kids", Object::Array(merged));
    dest.page_count = count;

    tracing::debug!("zipper_merge_page_trees end: {} pages", count);
    Ok(())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: nothing is lost or duplicated
        #[test]
        fn interleave_preserves_length(
            a in prop::collection::vec(any::<u16>(), 0..40),
            b in prop::collection::vec(any::<u16>(), 0..40),
            rev_a in any::<bool>(),
            rev_b in any::<bool>()
        ) {
            let merged = interleave(a.clone(), b.clone(), rev_a, rev_b);
            prop_assert_eq!(merged.len(), a.len() + b.len());
        }

        /// Property: equal lengths alternate strictly, first side leading
        #[test]
        fn interleave_alternates_on_equal_lengths(
            n in 0usize..30,
            rev_a in any::<bool>(),
            rev_b in any::<bool>()
        ) {
            let a: Vec<(u8, usize)> = (0..n).map(|i| (0, i)).collect();
            let b: Vec<(u8, usize)> = (0..n).map(|i| (1, i)).collect();
            let merged = interleave(a, b, rev_a, rev_b);
            for (i, (side, _)) in merged.iter().enumerate() {
                prop_assert_eq!(*side as usize, i % 2);
            }
        }

        /// Property: the longer side's leftovers form an uninterrupted suffix
        #[test]
        fn interleave_drains_remainder(
            a in prop::collection::vec(any::<u16>(), 0..20),
            extra in prop::collection::vec(any::<u16>(), 1..20),
            rev_a in any::<bool>(),
            rev_b in any::<bool>()
        ) {
            let mut b = a.clone();
            b.extend(extra.iter().copied());

            let mut effective_b = b.clone();
            if rev_b {
                effective_b.reverse();
            }

            let merged = interleave(a.clone(), b.clone(), rev_a, rev_b);
            let tail = &merged[2 * a.len()..];
            prop_assert_eq!(tail, &effective_b[a.len()..]);
        }
    }
}
