//! Conversion between PDF bytes and [`DocumentGraph`]
//!
//! Byte-level parsing and writing is done by lopdf; this module only
//! translates lopdf's object model into the graph the merge works on and
//! back.

use crate::error::ZipperError;
use crate::graph::{Dictionary, DocumentGraph, ObjNr, Object, Stream, TableEntry, FREE_HEAD};
use lopdf::xref::XrefType;

/// Highest object number a conforming PDF may use
pub const MAX_OBJECT_NUMBER: ObjNr = 8_388_607;

/// Parse PDF bytes into a document graph
pub fn decode(bytes: &[u8]) -> Result<DocumentGraph, ZipperError> {
    let doc =
        lopdf::Document::load_mem(bytes).map_err(|e| ZipperError::ParseError(e.to_string()))?;
    from_lopdf(&doc)
}

/// Serialize a document graph to PDF bytes
pub fn encode(graph: &DocumentGraph) -> Result<Vec<u8>, ZipperError> {
    let mut doc = to_lopdf(graph);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| ZipperError::SerializationError(format!("Save failed: {}", e)))?;

    Ok(buffer)
}

/// Build a graph from a loaded lopdf document.
///
/// Every unused number below the highest object number becomes a free
/// entry, chained in ascending order from the head. Object numbers above
/// [`MAX_OBJECT_NUMBER`] are rejected before any table is built.
pub fn from_lopdf(doc: &lopdf::Document) -> Result<DocumentGraph, ZipperError> {
    if doc.trailer.has(b"Encrypt") {
        return Err(ZipperError::ParseError(
            "encrypted documents are not supported".into(),
        ));
    }

    let (root, _) = doc
        .trailer
        .get(b"Root")
        .and_then(lopdf::Object::as_reference)
        .map_err(|_| ZipperError::ParseError("trailer has no Root reference".into()))?;

    let info = doc
        .trailer
        .get(b"Info")
        .and_then(lopdf::Object::as_reference)
        .ok()
        .map(|(nr, _)| nr);

    let highest = doc
        .objects
        .keys()
        .map(|&(nr, _)| nr)
        .max()
        .unwrap_or(FREE_HEAD)
        .max(doc.max_id);
    if highest > MAX_OBJECT_NUMBER {
        return Err(ZipperError::ParseError(format!(
            "object number {} exceeds the limit of {}",
            highest, MAX_OBJECT_NUMBER
        )));
    }

    let mut graph = DocumentGraph::new(doc.version.clone());

    for (&(nr, generation), object) in &doc.objects {
        if nr == FREE_HEAD || graph.table.contains_key(&nr) {
            continue;
        }

        let object = decode_object(object);
        match &object {
            Object::ObjectStream(_) => {
                graph.aux.object_streams.insert(nr);
            }
            Object::XRefStream(_) => {
                graph.aux.xref_streams.insert(nr);
            }
            Object::Dictionary(dict) if dict.has(b"Linearized") => {
                graph.aux.linearization_objects.insert(nr);
            }
            _ => {}
        }

        graph
            .table
            .insert(nr, TableEntry::InUse { object, generation });
    }

    let gaps: Vec<ObjNr> = (1..=highest)
        .filter(|nr| !graph.table.contains_key(nr))
        .collect();
    for (i, &nr) in gaps.iter().enumerate() {
        let next = gaps.get(i + 1).copied().unwrap_or(FREE_HEAD);
        graph
            .table
            .insert(nr, TableEntry::Free { next, generation: 0 });
    }
    graph.set_free_list_head(gaps.first().copied().unwrap_or(FREE_HEAD));

    graph.size = highest + 1;
    graph.root = root;
    graph.info = info;
    graph.page_count = doc.get_pages().len();

    tracing::debug!(
        "decoded PDF {}: {} objects, {} free, {} pages",
        graph.version,
        graph.table.len() - gaps.len() - 1,
        gaps.len(),
        graph.page_count
    );

    Ok(graph)
}

/// Build a lopdf document from a graph.
///
/// The document is set up to be saved with a classic xref table and every
/// object at top level, so object streams, xref streams and linearization
/// dictionaries are left out. A stream-based xref would claim an extra
/// object number on every save.
pub fn to_lopdf(graph: &DocumentGraph) -> lopdf::Document {
    let mut doc = lopdf::Document::with_version(graph.version.clone());
    doc.reference_table.cross_reference_type = XrefType::CrossReferenceTable;

    for (&nr, entry) in &graph.table {
        let TableEntry::InUse { object, generation } = entry else {
            continue;
        };
        if matches!(object, Object::ObjectStream(_) | Object::XRefStream(_))
            || graph.aux.linearization_objects.contains(&nr)
        {
            continue;
        }
        doc.objects
            .insert((nr, *generation), encode_object(object, graph));
    }

    doc.max_id = graph.size.saturating_sub(1);
    doc.trailer
        .set("Root", lopdf::Object::Reference(object_id(graph, graph.root)));
    if let Some(info) = graph.info {
        doc.trailer
            .set("Info", lopdf::Object::Reference(object_id(graph, info)));
    }
    doc.trailer.set("Size", lopdf::Object::Integer(graph.size as i64));

    doc
}

fn object_id(graph: &DocumentGraph, nr: ObjNr) -> lopdf::ObjectId {
    let generation = graph.entry(nr).map(TableEntry::generation).unwrap_or(0);
    (nr, generation)
}

fn decode_object(obj: &lopdf::Object) -> Object {
    match obj {
        lopdf::Object::Null => Object::Null,
        lopdf::Object::Boolean(b) => Object::Boolean(*b),
        lopdf::Object::Integer(i) => Object::Integer(*i),
        lopdf::Object::Real(r) => Object::Real(*r),
        lopdf::Object::Name(name) => Object::Name(name.clone()),
        lopdf::Object::String(bytes, format) => Object::String(bytes.clone(), *format),
        lopdf::Object::Array(arr) => Object::Array(arr.iter().map(decode_object).collect()),
        lopdf::Object::Dictionary(dict) => Object::Dictionary(decode_dict(dict)),
        lopdf::Object::Stream(stream) => {
            let dict = decode_dict(&stream.dict);
            let is_obj_stm = dict.has_type(b"ObjStm");
            let is_xref = dict.has_type(b"XRef");
            let stream = Stream::new(dict, stream.content.clone());
            if is_obj_stm {
                Object::ObjectStream(stream)
            } else if is_xref {
                Object::XRefStream(stream)
            } else {
                Object::Stream(stream)
            }
        }
        lopdf::Object::Reference((nr, _)) => Object::Reference(*nr),
    }
}

fn decode_dict(dict: &lopdf::Dictionary) -> Dictionary {
    let mut out = Dictionary::new();
    for (key, value) in dict.iter() {
        out.set(key.clone(), decode_object(value));
    }
    out
}

fn encode_object(obj: &Object, graph: &DocumentGraph) -> lopdf::Object {
    match obj {
        Object::Null => lopdf::Object::Null,
        Object::Boolean(b) => lopdf::Object::Boolean(*b),
        Object::Integer(i) => lopdf::Object::Integer(*i),
        Object::Real(r) => lopdf::Object::Real(*r),
        Object::Name(name) => lopdf::Object::Name(name.clone()),
        Object::String(bytes, format) => lopdf::Object::String(bytes.clone(), *format),
        Object::Array(arr) => {
            lopdf::Object::Array(arr.iter().map(|o| encode_object(o, graph)).collect())
        }
        Object::Dictionary(dict) => lopdf::Object::Dictionary(encode_dict(dict, graph)),
        Object::Reference(nr) => lopdf::Object::Reference(object_id(graph, *nr)),
        Object::Stream(stream) | Object::ObjectStream(stream) | Object::XRefStream(stream) => {
            lopdf::Object::Stream(lopdf::Stream::new(
                encode_dict(&stream.dict, graph),
                stream.content.clone(),
            ))
        }
    }
}

fn encode_dict(dict: &Dictionary, graph: &DocumentGraph) -> lopdf::Dictionary {
    let mut out = lopdf::Dictionary::new();
    for (key, value) in dict.iter() {
        out.set(key.clone(), encode_object(value, graph));
    }
    out
}
