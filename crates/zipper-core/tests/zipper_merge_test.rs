//! End-to-end zipper merge through PDF bytes

use lopdf::xref::XrefType;
use lopdf::{Dictionary, Document, Object, Stream};
use pretty_assertions::assert_eq;
use zipper_core::{codec, zipper_merge, zipper_merge_documents, MergeOptions, ZipperError};

/// Scanned-style PDF: `num_pages` pages whose content streams show
/// "<prefix>-Page-<n>".
///
/// Layout: pages root #1, catalog #2, then (page, content) pairs. With
/// `XrefType::CrossReferenceStream` lopdf adds the xref stream as #(2n+3).
fn create_test_pdf_with(num_pages: u32, content_prefix: &str, xref: XrefType) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    doc.reference_table.cross_reference_type = xref;
    let pages_id = doc.new_object_id();
    let catalog_id = doc.new_object_id();

    let mut kids = Vec::new();
    for page_num in 1..=num_pages {
        let page_id = doc.new_object_id();
        let content = format!(
            "BT /F1 12 Tf 50 700 Td ({}-Page-{}) Tj ET",
            content_prefix, page_num
        );
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(pages_id));
        page.set("Contents", Object::Reference(content_id));
        doc.objects.insert(page_id, Object::Dictionary(page));
        kids.push(Object::Reference(page_id));
    }

    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Count", Object::Integer(num_pages as i64));
    pages.set("Kids", Object::Array(kids));
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    doc.objects.insert(catalog_id, Object::Dictionary(catalog));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Same layout saved the way lopdf saves a 1.5 document by default
fn create_test_pdf(num_pages: u32, content_prefix: &str) -> Vec<u8> {
    create_test_pdf_with(num_pages, content_prefix, XrefType::CrossReferenceStream)
}

/// Page labels in page order, read back from the content streams
fn page_labels(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
            let content_id = page.get(b"Contents").unwrap().as_reference().unwrap();
            let stream = doc.get_object(content_id).unwrap().as_stream().unwrap();
            let text = String::from_utf8_lossy(&stream.content);
            let start = text.find('(').unwrap() + 1;
            let end = text.find(')').unwrap();
            text[start..end].to_string()
        })
        .collect()
}

#[test]
fn test_decode_records_xref_stream() {
    let graph = codec::decode(&create_test_pdf(2, "Doc")).unwrap();

    assert_eq!(graph.size, 8);
    assert_eq!(graph.root, 2);
    assert_eq!(graph.page_count, 2);
    assert_eq!(graph.pages_root().unwrap(), 1);
    assert_eq!(
        graph.aux.xref_streams.iter().copied().collect::<Vec<_>>(),
        vec![7]
    );
    assert!(graph.free_list().is_empty());
    assert_eq!(graph.version, "1.5");
}

#[test]
fn test_decode_classic_table() {
    let graph =
        codec::decode(&create_test_pdf_with(2, "Doc", XrefType::CrossReferenceTable)).unwrap();

    assert_eq!(graph.size, 7);
    assert!(graph.aux.xref_streams.is_empty());
    assert!(graph.free_list().is_empty());
}

#[test]
fn test_round_trip_keeps_size_and_free_list() {
    let bytes = create_test_pdf_with(3, "Round", XrefType::CrossReferenceTable);
    let mut graph = codec::decode(&bytes).unwrap();
    // drop the first page's content stream so the table has a gap
    graph.delete_object(4).unwrap();

    let first = codec::decode(&codec::encode(&graph).unwrap()).unwrap();
    let second = codec::decode(&codec::encode(&first).unwrap()).unwrap();

    assert_eq!(first.size, graph.size);
    assert_eq!(first.free_list(), vec![4]);
    assert_eq!(second.size, first.size);
    assert_eq!(second.free_list(), first.free_list());
    assert_eq!(second.real_object_numbers(), first.real_object_numbers());
    assert_eq!(second.page_count, 3);
}

#[test]
fn test_encode_does_not_grow_xref_stream_input() {
    let graph = codec::decode(&create_test_pdf(2, "Doc")).unwrap();
    let encoded = codec::encode(&graph).unwrap();

    let doc = Document::load_mem(&encoded).unwrap();
    assert!(doc.objects.keys().all(|&(nr, _)| nr < graph.size));
    assert!(doc
        .objects
        .values()
        .all(|object| object.type_name().ok() != Some("XRef")));

    // the xref stream's slot is released once, then the table is stable
    let reloaded = codec::decode(&encoded).unwrap();
    assert_eq!(reloaded.size, 7);
    let again = codec::decode(&codec::encode(&reloaded).unwrap()).unwrap();
    assert_eq!(again.size, reloaded.size);
    assert_eq!(again.free_list(), reloaded.free_list());
}

#[test]
fn test_zipper_merge_documents_interleaves() {
    let fronts = create_test_pdf(3, "Front");
    let backs = create_test_pdf(3, "Back");

    let output = zipper_merge_documents(&backs, &fronts, &MergeOptions::default()).unwrap();

    assert_eq!(
        page_labels(&output.data),
        vec![
            "Front-Page-1",
            "Back-Page-1",
            "Front-Page-2",
            "Back-Page-2",
            "Front-Page-3",
            "Back-Page-3",
        ]
    );
    assert_eq!(output.metrics.page_count, 6);
    assert_eq!(output.metrics.output_size_bytes, output.data.len());
}

#[test]
fn test_zipper_merge_documents_reversed_backs() {
    // A single-sided scanner returns the backs in reverse order
    let fronts = create_test_pdf(2, "Front");
    let backs = create_test_pdf(2, "Back");
    let options = MergeOptions {
        reverse_source: true,
        reverse_destination: false,
    };

    let output = zipper_merge_documents(&backs, &fronts, &options).unwrap();

    assert_eq!(
        page_labels(&output.data),
        vec!["Front-Page-1", "Back-Page-2", "Front-Page-2", "Back-Page-1"]
    );
}

#[test]
fn test_zipper_merge_documents_uneven() {
    let fronts = create_test_pdf(1, "Front");
    let backs = create_test_pdf(3, "Back");

    let output = zipper_merge_documents(&backs, &fronts, &MergeOptions::default()).unwrap();

    assert_eq!(
        page_labels(&output.data),
        vec!["Front-Page-1", "Back-Page-1", "Back-Page-2", "Back-Page-3"]
    );
    assert_eq!(zipper_core::get_page_count(&output.data).unwrap(), 4);
}

#[test]
fn test_merged_graph_frees_source_catalog() {
    let source = codec::decode(&create_test_pdf(2, "Src")).unwrap();
    let mut dest = codec::decode(&create_test_pdf(2, "Dst")).unwrap();
    let dest_size = dest.size;
    let source_root = source.root;
    let transplanted = source.real_object_numbers().len() as u32;

    zipper_merge(source, &mut dest, false, false).unwrap();

    assert_eq!(dest.size, dest_size + transplanted);
    // renumbering is ascending from the old destination size
    let mapped_root = dest_size + source_root - 1;
    assert!(dest.free_list().contains(&mapped_root));
}

#[test]
fn test_missing_page_tree_is_structural_error() {
    let mut doc = Document::with_version("1.5");
    let catalog_id = doc.new_object_id();
    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    doc.objects.insert(catalog_id, Object::Dictionary(catalog));
    doc.trailer.set("Root", Object::Reference(catalog_id));
    let mut broken = Vec::new();
    doc.save_to(&mut broken).unwrap();

    let result = zipper_merge_documents(
        &broken,
        &create_test_pdf(1, "Ok"),
        &MergeOptions::default(),
    );

    assert!(matches!(result, Err(ZipperError::StructuralError(_))));
}
