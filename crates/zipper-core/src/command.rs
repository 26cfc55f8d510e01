use serde::{Deserialize, Serialize};

/// Page order options for a zipper merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Walk the source's pages back to front
    #[serde(default)]
    pub reverse_source: bool,
    /// Walk the destination's pages back to front
    #[serde(default)]
    pub reverse_destination: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessMetrics {
    pub source_size_bytes: usize,
    pub destination_size_bytes: usize,
    pub output_size_bytes: usize,
    pub page_count: u32,
    /// Declared size of the merged cross-reference table
    pub object_count: u32,
    pub processing_time_ms: u64,
}

#[derive(Debug, Clone)]
pub struct MergeOutput {
    /// Merged PDF bytes
    pub data: Vec<u8>,
    pub metrics: ProcessMetrics,
}
