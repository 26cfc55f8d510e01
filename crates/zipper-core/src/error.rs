use crate::graph::ObjNr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ZipperError {
    /// A page-tree root is missing or is not a dictionary.
    #[error("Invalid page tree: {0}")]
    StructuralError(String),

    /// A reference points outside the renumbering plan.
    #[error("Corrupt object graph: obj #{0} has no renumbering entry")]
    CorruptionError(ObjNr),

    #[error("Cannot free obj #{0}: no table entry")]
    ReclamationError(ObjNr),

    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}
