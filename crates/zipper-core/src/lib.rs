//! Zipper merge for PDF documents
//!
//! Combines two PDFs into one whose pages alternate between the two
//! inputs, e.g. the front and back sides of a stack scanned on a
//! single-sided feeder. Either input can be walked back to front.
//!
//! The merge works on [`DocumentGraph`], an in-memory cross-reference
//! table. The source graph is renumbered into the destination's free
//! number range, its pages are zipped into the destination's page tree,
//! and its objects are moved across. [`codec`] converts between PDF bytes
//! and graphs using lopdf.

pub mod codec;
pub mod command;
pub mod error;
pub mod graph;
pub mod interleave;
pub mod merge;
pub mod patch;
pub mod renumber;
pub mod transplant;

pub use command::{MergeOptions, MergeOutput, ProcessMetrics};
pub use error::ZipperError;
pub use graph::{DocumentGraph, ObjNr, Object, TableEntry};
pub use interleave::interleave;
pub use merge::zipper_merge;
pub use renumber::RenumberingPlan;

use std::time::Instant;

/// Parse PDF bytes and return page count
pub fn get_page_count(bytes: &[u8]) -> Result<u32, ZipperError> {
    let graph = codec::decode(bytes)?;
    Ok(graph.page_count as u32)
}

/// Zipper merge two PDFs given as bytes.
///
/// Pages alternate starting with the destination's first page. The
/// destination's catalog and info dictionary are kept.
pub fn zipper_merge_documents(
    source: &[u8],
    destination: &[u8],
    options: &MergeOptions,
) -> Result<MergeOutput, ZipperError> {
    let started = Instant::now();

    let source_graph = codec::decode(source)?;
    let mut dest_graph = codec::decode(destination)?;

    zipper_merge(
        source_graph,
        &mut dest_graph,
        options.reverse_source,
        options.reverse_destination,
    )?;

    let data = codec::encode(&dest_graph)?;

    let metrics = ProcessMetrics {
        source_size_bytes: source.len(),
        destination_size_bytes: destination.len(),
        output_size_bytes: data.len(),
        page_count: dest_graph.page_count as u32,
        object_count: dest_graph.size,
        processing_time_ms: started.elapsed().as_millis() as u64,
    };

    Ok(MergeOutput { data, metrics })
}
