//! In-memory document graph
//!
//! A decoded PDF as a cross-reference table of numbered objects, plus the
//! trailer-level bookkeeping (size, root, info, page count) and the
//! auxiliary object-number sets the writer consults.
//!
//! Free entries live in the same table as in-use entries. Object #0 is
//! never a real object: it is the permanent head of the singly linked
//! free list, and each free entry stores the number of the next one.

use crate::error::ZipperError;
use std::collections::{BTreeMap, BTreeSet};

/// Object number within one document graph
pub type ObjNr = u32;

/// Set of object numbers
pub type ObjNrSet = BTreeSet<ObjNr>;

/// Object number of the free list head
pub const FREE_HEAD: ObjNr = 0;

/// Generation of the free list head, and the ceiling for any generation
pub const MAX_GENERATION: u16 = 65535;

/// How a string object was written in the source file
pub use lopdf::StringFormat;

/// A PDF object value.
///
/// Scalar leaves carry lopdf's own representations so they cross the
/// codec unchanged; only containers and references differ.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    String(Vec<u8>, StringFormat),
    Array(Vec<Object>),
    Dictionary(Dictionary),
    /// Non-owning pointer to another object in the same table
    Reference(ObjNr),
    Stream(Stream),
    /// Object stream; the payload holds the contained objects in encoded form
    ObjectStream(Stream),
    XRefStream(Stream),
}

impl Object {
    pub fn as_dict(&self) -> Option<&Dictionary> {
        match self {
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_dict_mut(&mut self) -> Option<&mut Dictionary> {
        match self {
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Object>> {
        match self {
            Object::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<ObjNr> {
        match self {
            Object::Reference(nr) => Some(*nr),
            _ => None,
        }
    }

    /// Short kind name used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Object::Null => "null",
            Object::Boolean(_) => "boolean",
            Object::Integer(_) => "integer",
            Object::Real(_) => "real",
            Object::Name(_) => "name",
            Object::String(..) => "string",
            Object::Array(_) => "array",
            Object::Dictionary(_) => "dictionary",
            Object::Reference(_) => "reference",
            Object::Stream(_) => "stream",
            Object::ObjectStream(_) => "object stream",
            Object::XRefStream(_) => "xref stream",
        }
    }
}

impl From<bool> for Object {
    fn from(value: bool) -> Self {
        Object::Boolean(value)
    }
}

impl From<i64> for Object {
    fn from(value: i64) -> Self {
        Object::Integer(value)
    }
}

impl From<Vec<Object>> for Object {
    fn from(value: Vec<Object>) -> Self {
        Object::Array(value)
    }
}

impl From<Dictionary> for Object {
    fn from(value: Dictionary) -> Self {
        Object::Dictionary(value)
    }
}

impl From<Stream> for Object {
    fn from(value: Stream) -> Self {
        Object::Stream(value)
    }
}

/// Stream dictionary plus its (still encoded) payload
#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    pub dict: Dictionary,
    pub content: Vec<u8>,
}

impl Stream {
    pub fn new(dict: Dictionary, content: Vec<u8>) -> Self {
        Self { dict, content }
    }
}

/// PDF dictionary. Key order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary(BTreeMap<Vec<u8>, Object>);

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &[u8]) -> Option<&Object> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &[u8]) -> Option<&mut Object> {
        self.0.get_mut(key)
    }

    /// Insert or replace an entry
    pub fn set(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Object>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &[u8]) -> Option<Object> {
        self.0.remove(key)
    }

    pub fn has(&self, key: &[u8]) -> bool {
        self.0.contains_key(key)
    }

    /// True when `/Type` is the given name
    pub fn has_type(&self, type_name: &[u8]) -> bool {
        matches!(self.get(b"Type"), Some(Object::Name(name)) if name == type_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Vec<u8>, &Object)> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&Vec<u8>, &mut Object)> {
        self.0.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Cross-reference table entry
#[derive(Debug, Clone, PartialEq)]
pub enum TableEntry {
    /// Unused slot; `next` is the following free object number (0 ends the list)
    Free { next: ObjNr, generation: u16 },
    InUse { object: Object, generation: u16 },
}

impl TableEntry {
    pub fn in_use(object: impl Into<Object>) -> Self {
        TableEntry::InUse {
            object: object.into(),
            generation: 0,
        }
    }

    pub fn is_free(&self) -> bool {
        matches!(self, TableEntry::Free { .. })
    }

    pub fn object(&self) -> Option<&Object> {
        match self {
            TableEntry::InUse { object, .. } => Some(object),
            TableEntry::Free { .. } => None,
        }
    }

    pub fn object_mut(&mut self) -> Option<&mut Object> {
        match self {
            TableEntry::InUse { object, .. } => Some(object),
            TableEntry::Free { .. } => None,
        }
    }

    pub fn generation(&self) -> u16 {
        match self {
            TableEntry::Free { generation, .. } | TableEntry::InUse { generation, .. } => {
                *generation
            }
        }
    }
}

/// Object numbers tracked outside the table for the writer's benefit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuxiliarySets {
    pub duplicate_objects: ObjNrSet,
    pub linearization_objects: ObjNrSet,
    pub xref_streams: ObjNrSet,
    pub object_streams: ObjNrSet,
}

impl AuxiliarySets {
    pub fn sets_mut(&mut self) -> [&mut ObjNrSet; 4] {
        [
            &mut self.duplicate_objects,
            &mut self.linearization_objects,
            &mut self.xref_streams,
            &mut self.object_streams,
        ]
    }

    pub fn into_sets(self) -> [ObjNrSet; 4] {
        [
            self.duplicate_objects,
            self.linearization_objects,
            self.xref_streams,
            self.object_streams,
        ]
    }
}

/// A fully decoded document
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentGraph {
    /// Header version, e.g. "1.7"
    pub version: String,
    pub table: BTreeMap<ObjNr, TableEntry>,
    /// One past the highest object number ever assigned
    pub size: u32,
    pub root: ObjNr,
    pub info: Option<ObjNr>,
    pub page_count: usize,
    pub aux: AuxiliarySets,
}

impl DocumentGraph {
    /// Empty graph holding only the free list head.
    ///
    /// `root` starts out as 0; callers set it once the catalog exists.
    pub fn new(version: impl Into<String>) -> Self {
        let mut table = BTreeMap::new();
        table.insert(
            FREE_HEAD,
            TableEntry::Free {
                next: FREE_HEAD,
                generation: MAX_GENERATION,
            },
        );
        Self {
            version: version.into(),
            table,
            size: 1,
            root: FREE_HEAD,
            info: None,
            page_count: 0,
            aux: AuxiliarySets::default(),
        }
    }

    /// Insert an object under the next unused number
    pub fn add_object(&mut self, object: impl Into<Object>) -> ObjNr {
        let nr = self.size;
        self.table.insert(nr, TableEntry::in_use(object));
        self.size += 1;
        nr
    }

    pub fn entry(&self, nr: ObjNr) -> Option<&TableEntry> {
        self.table.get(&nr)
    }

    pub fn object(&self, nr: ObjNr) -> Option<&Object> {
        self.table.get(&nr).and_then(TableEntry::object)
    }

    pub fn object_mut(&mut self, nr: ObjNr) -> Option<&mut Object> {
        self.table.get_mut(&nr).and_then(TableEntry::object_mut)
    }

    pub fn dereference_dict(&self, nr: ObjNr) -> Result<&Dictionary, ZipperError> {
        match self.object(nr) {
            Some(Object::Dictionary(dict)) => Ok(dict),
            Some(other) => Err(ZipperError::StructuralError(format!(
                "obj #{} is a {}, expected a dictionary",
                nr,
                other.kind()
            ))),
            None => Err(ZipperError::StructuralError(format!(
                "obj #{} is not in use",
                nr
            ))),
        }
    }

    pub fn dereference_dict_mut(&mut self, nr: ObjNr) -> Result<&mut Dictionary, ZipperError> {
        match self.object_mut(nr) {
            Some(Object::Dictionary(dict)) => Ok(dict),
            Some(other) => Err(ZipperError::StructuralError(format!(
                "obj #{} is a {}, expected a dictionary",
                nr,
                other.kind()
            ))),
            None => Err(ZipperError::StructuralError(format!(
                "obj #{} is not in use",
                nr
            ))),
        }
    }

    /// Every table key except the free list head, ascending
    pub fn real_object_numbers(&self) -> Vec<ObjNr> {
        self.table
            .keys()
            .copied()
            .filter(|&nr| nr != FREE_HEAD)
            .collect()
    }

    /// First free object number, 0 when the list is empty
    pub fn free_list_head(&self) -> ObjNr {
        match self.table.get(&FREE_HEAD) {
            Some(TableEntry::Free { next, .. }) => *next,
            _ => FREE_HEAD,
        }
    }

    pub(crate) fn set_free_list_head(&mut self, nr: ObjNr) {
        self.table.insert(
            FREE_HEAD,
            TableEntry::Free {
                next: nr,
                generation: MAX_GENERATION,
            },
        );
    }

    /// Object numbers reachable from the head by following `next`.
    ///
    /// The walk stops at the first entry that is missing or in use, and
    /// never takes more steps than the table has entries.
    pub fn free_list(&self) -> Vec<ObjNr> {
        let mut free = Vec::new();
        let mut current = self.free_list_head();

        while current != FREE_HEAD && free.len() < self.table.len() {
            match self.table.get(&current) {
                Some(TableEntry::Free { next, .. }) => {
                    free.push(current);
                    current = *next;
                }
                _ => break,
            }
        }

        free
    }

    /// Mark an object free and push it onto the head of the free list.
    ///
    /// Freeing an already free entry is a no-op. The generation is bumped
    /// so stale references can be told apart.
    pub fn delete_object(&mut self, nr: ObjNr) -> Result<(), ZipperError> {
        if nr == FREE_HEAD {
            return Err(ZipperError::ReclamationError(nr));
        }

        let head = self.free_list_head();
        let entry = self
            .table
            .get_mut(&nr)
            .ok_or(ZipperError::ReclamationError(nr))?;

        let generation = match entry {
            TableEntry::Free { .. } => {
                tracing::debug!("delete_object: obj #{} already free", nr);
                return Ok(());
            }
            TableEntry::InUse { generation, .. } => *generation,
        };

        *entry = TableEntry::Free {
            next: head,
            generation: generation.saturating_add(1),
        };
        self.set_free_list_head(nr);

        tracing::debug!("delete_object: freed obj #{}", nr);
        Ok(())
    }

    /// Object number of the page tree root, found through the catalog's `/Pages`
    pub fn pages_root(&self) -> Result<ObjNr, ZipperError> {
        let catalog = self.dereference_dict(self.root).map_err(|e| {
            ZipperError::StructuralError(format!("root obj #{}: {}", self.root, e))
        })?;

        let pages = catalog
            .get(b"Pages")
            .and_then(Object::as_reference)
            .ok_or_else(|| {
                ZipperError::StructuralError(format!(
                    "root obj #{} has no Pages reference",
                    self.root
                ))
            })?;

        self.dereference_dict(pages)?;
        Ok(pages)
    }
}
