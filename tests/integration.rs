//! Integration tests for the PDF master library

use lopdf::{
    dictionary, Document, EncryptionState, EncryptionVersion, Object, Permissions, Stream,
    StringFormat,
};
use pdf_master::export::{export_index, DirectorySink, INDEX_FILE_NAME};
use pdf_master::pdf::{count_pages, extract_metadata_from_bytes, LopdfCodec};
use pdf_master::{
    merge, AnnotationConfig, Error, IndexRow, Manifest, Session, SourceContent, Status,
};
use tempfile::TempDir;

/// A document whose pages each draw a marker like "A1", "A2"
fn marked_document(label: &str, pages: usize, width: i64, height: i64) -> Document {
    let mut doc = Document::with_version("1.5");
    doc.trailer.set(
        "ID",
        vec![
            Object::String(b"pdf-master-fixtr".to_vec(), StringFormat::Literal),
            Object::String(b"pdf-master-fixtr".to_vec(), StringFormat::Literal),
        ],
    );
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (1..=pages)
        .map(|n| {
            let content = format!("BT /F1 12 Tf 72 72 Td ({}{}) Tj ET", label, n);
            let content_id =
                doc.add_object(Stream::new(lopdf::Dictionary::new(), content.into_bytes()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
                "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
                "Contents" => Object::Reference(content_id),
            });
            Object::Reference(page_id)
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc
}

fn to_bytes(mut doc: Document) -> Vec<u8> {
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("Failed to build fixture PDF");
    buffer
}

fn marked_pdf(label: &str, pages: usize, width: i64, height: i64) -> Vec<u8> {
    to_bytes(marked_document(label, pages, width, height))
}

/// Marked PDF encrypted with RC4 under the given user password
fn encrypted_pdf(label: &str, user_password: &str) -> Vec<u8> {
    let mut doc = marked_document(label, 1, 612, 792);
    let version = EncryptionVersion::V2 {
        document: &doc,
        owner_password: "owner",
        user_password,
        key_length: 128,
        permissions: Permissions::all(),
    };
    let state = EncryptionState::try_from(version).expect("Failed to set up encryption");
    doc.encrypt(&state).expect("Failed to encrypt fixture");
    to_bytes(doc)
}

/// Marked PDF whose pages point at their content through an indirect array
fn indirect_contents_pdf(label: &str, pages: usize) -> Vec<u8> {
    let mut doc = marked_document(label, pages, 612, 792);
    for page_id in doc.get_pages().into_values() {
        let stream = doc.get_dictionary(page_id).unwrap().get(b"Contents").unwrap().clone();
        let array_id = doc.add_object(vec![stream]);
        doc.get_dictionary_mut(page_id)
            .unwrap()
            .set("Contents", Object::Reference(array_id));
    }
    to_bytes(doc)
}

fn letter_pdf(label: &str, pages: usize) -> Vec<u8> {
    marked_pdf(label, pages, 612, 792)
}

fn manifest_of(sources: &[(&str, Vec<u8>)]) -> Manifest {
    let mut manifest = Manifest::new();
    manifest.add(
        sources
            .iter()
            .map(|(name, bytes)| (*name, SourceContent::from(bytes.clone()))),
    );
    manifest
}

fn no_annotations() -> AnnotationConfig {
    AnnotationConfig {
        page_numbers: false,
        watermark: false,
        watermark_text: String::new(),
    }
}

/// Decompressed content of every page of a merged document, in page order
fn page_contents(bytes: &[u8]) -> Vec<String> {
    let mut doc = Document::load_mem(bytes).expect("Merged output should parse");
    doc.decompress();
    doc.get_pages()
        .values()
        .map(|&id| String::from_utf8_lossy(&doc.get_page_content(id).unwrap()).into_owned())
        .collect()
}

/// Operands of the text matrix set just before `text` is shown
fn text_matrix_before(content: &str, text: &str) -> Vec<f32> {
    let shown = content.find(text).unwrap();
    let line = content[..shown]
        .lines()
        .rev()
        .find(|line| line.ends_with(" Tm"))
        .expect("text should be positioned with Tm");
    line.split_whitespace()
        .filter(|token| *token != "Tm")
        .map(|token| token.parse().unwrap())
        .collect()
}

fn assert_close(actual: f32, expected: f32) {
    assert!((actual - expected).abs() < 0.01, "{} != {}", actual, expected);
}

fn row(serial: usize, name: &str, start: usize, end: usize, count: usize) -> IndexRow {
    IndexRow {
        serial,
        source_name: name.to_string(),
        start_page: start,
        end_page: end,
        page_count: count,
    }
}

#[test]
fn test_merge_preserves_page_order() {
    let manifest = manifest_of(&[("A", letter_pdf("A", 2)), ("B", letter_pdf("B", 3))]);

    let result =
        merge(&LopdfCodec, &manifest.snapshot(), &no_annotations()).expect("Failed to merge");

    let markers: Vec<String> = page_contents(&result.combined_document)
        .iter()
        .map(|content| {
            let start = content.find('(').unwrap() + 1;
            let end = content.find(')').unwrap();
            content[start..end].to_string()
        })
        .collect();
    assert_eq!(markers, vec!["A1", "A2", "B1", "B2", "B3"]);
    assert_eq!(result.index, vec![row(1, "A", 1, 2, 2), row(2, "B", 3, 5, 3)]);
}

#[test]
fn test_page_accounting_matches_document() {
    let manifest = manifest_of(&[
        ("F1", letter_pdf("x", 1)),
        ("F2", letter_pdf("y", 5)),
        ("F3", letter_pdf("z", 2)),
    ]);

    let result = merge(&LopdfCodec, &manifest.snapshot(), &AnnotationConfig::default()).unwrap();

    let metadata = extract_metadata_from_bytes(&result.combined_document).unwrap();
    assert_eq!(metadata.page_count, 8);
    assert_eq!(result.total_pages(), 8);
    assert_eq!(result.index[0].start_page, 1);
    for pair in result.index.windows(2) {
        assert_eq!(pair[1].start_page, pair[0].end_page + 1);
    }
}

#[test]
fn test_reordered_merge_swaps_rows() {
    let mut manifest = manifest_of(&[("A", letter_pdf("A", 2)), ("B", letter_pdf("B", 3))]);
    let first = merge(&LopdfCodec, &manifest.snapshot(), &no_annotations()).unwrap();

    manifest.move_entry(1, 0).unwrap();
    let second = merge(&LopdfCodec, &manifest.snapshot(), &no_annotations()).unwrap();

    assert_eq!(second.index, vec![row(1, "B", 1, 3, 3), row(2, "A", 4, 5, 2)]);
    assert_eq!(first.total_pages(), second.total_pages());
}

#[test]
fn test_annotations_do_not_change_structure() {
    let manifest = manifest_of(&[("A", letter_pdf("A", 2)), ("B", letter_pdf("B", 1))]);
    let annotated = AnnotationConfig {
        page_numbers: true,
        watermark: true,
        watermark_text: String::new(),
    };

    let bare = merge(&LopdfCodec, &manifest.snapshot(), &no_annotations()).unwrap();
    let full = merge(&LopdfCodec, &manifest.snapshot(), &annotated).unwrap();

    assert_eq!(bare.index, full.index);
    let bare_pages = page_contents(&bare.combined_document);
    let full_pages = page_contents(&full.combined_document);
    assert_eq!(bare_pages.len(), full_pages.len());

    for (n, (plain, stamped)) in bare_pages.iter().zip(&full_pages).enumerate() {
        assert!(!plain.contains("Page "));
        assert!(stamped.contains(&format!("(Page {} of 3) Tj", n + 1)));
        assert!(stamped.contains("(CONFIDENTIAL) Tj"));

        // Watermark is drawn before the page number
        let watermark_at = stamped.find("(CONFIDENTIAL)").unwrap();
        let number_at = stamped.find("(Page ").unwrap();
        assert!(watermark_at < number_at);
    }
}

#[test]
fn test_watermark_uses_custom_text_and_opacity() {
    let manifest = manifest_of(&[("A", letter_pdf("A", 1))]);
    let config = AnnotationConfig {
        page_numbers: false,
        watermark: true,
        watermark_text: "DRAFT (v2)".to_string(),
    };

    let result = merge(&LopdfCodec, &manifest.snapshot(), &config).unwrap();
    let content = &page_contents(&result.combined_document)[0];

    assert!(content.contains("(DRAFT \\(v2\\)) Tj"));
    assert!(content.contains("/PMGs350 gs"));
    assert!(content.contains("0.8 0.8 0.8 rg"));

    let matrix = text_matrix_before(content, "(DRAFT");
    let diagonal = std::f32::consts::FRAC_1_SQRT_2;
    assert_close(matrix[0], diagonal);
    assert_close(matrix[1], diagonal);
    assert_close(matrix[2], -diagonal);
    assert_close(matrix[3], diagonal);
    assert_close(matrix[4], 612.0 / 5.0);
    assert_close(matrix[5], 792.0 / 3.0);
}

#[test]
fn test_page_numbers_centered_per_page_width() {
    let manifest = manifest_of(&[
        ("narrow", marked_pdf("n", 1, 300, 400)),
        ("wide", marked_pdf("w", 1, 900, 400)),
    ]);
    let config = AnnotationConfig::default();

    let result = merge(&LopdfCodec, &manifest.snapshot(), &config).unwrap();
    let pages = page_contents(&result.combined_document);

    // "Page 1 of 2" is 51.15pt wide at 10pt in Helvetica
    let narrow = text_matrix_before(&pages[0], "(Page 1 of 2)");
    let wide = text_matrix_before(&pages[1], "(Page 2 of 2)");
    assert_eq!(&narrow[..4], &[1.0, 0.0, 0.0, 1.0]);
    assert_close(narrow[4], (300.0 - 51.15) / 2.0);
    assert_close(narrow[5], 20.0);
    assert_close(wide[4], (900.0 - 51.15) / 2.0);
    assert_close(wide[5], 20.0);
}

#[test]
fn test_corrupt_source_is_all_or_nothing() {
    let mut session = Session::new();
    session.manifest.add([("validA", letter_pdf("A", 1))]);
    let first = session.merge(&LopdfCodec).unwrap().clone();

    session.manifest.add([
        ("corruptB", b"this is not really a pdf".to_vec()),
        ("validC", letter_pdf("C", 1)),
    ]);
    let err = session.merge(&LopdfCodec).unwrap_err();

    assert!(matches!(err, Error::DecodeFailure { .. }));
    assert_eq!(err.failed_source(), Some("corruptB"));
    assert!(matches!(session.status(), Status::Error(_)));

    // Prior result untouched
    let kept = session.result().expect("previous result should survive");
    assert_eq!(kept.combined_document, first.combined_document);
    assert_eq!(kept.index, first.index);
}

#[test]
fn test_empty_manifest_produces_nothing() {
    let result = merge(&LopdfCodec, &Manifest::new().snapshot(), &AnnotationConfig::default());
    assert!(matches!(result, Err(Error::EmptyInput)));
}

#[test]
fn test_index_csv_round_trip() {
    let manifest = manifest_of(&[
        ("F1", letter_pdf("x", 1)),
        ("F2", letter_pdf("y", 5)),
        ("F3", letter_pdf("z", 2)),
    ]);
    let result = merge(&LopdfCodec, &manifest.snapshot(), &no_annotations()).unwrap();
    let artifact = export_index(&result);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(artifact.bytes.as_slice());

    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["S.No", "File Name", "Start Page", "End Page", "Total Pages"]
    );

    let parsed: Vec<IndexRow> = reader
        .records()
        .map(|record| {
            let record = record.unwrap();
            IndexRow {
                serial: record[0].parse().unwrap(),
                source_name: record[1].to_string(),
                start_page: record[2].parse().unwrap(),
                end_page: record[3].parse().unwrap(),
                page_count: record[4].parse().unwrap(),
            }
        })
        .collect();

    assert_eq!(
        parsed,
        vec![
            row(1, "F1", 1, 1, 1),
            row(2, "F2", 2, 6, 5),
            row(3, "F3", 7, 8, 2),
        ]
    );
}

#[test]
fn test_session_writes_both_artifacts() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let mut session = Session::new();
    session.manifest.add([
        ("one, two.pdf", letter_pdf("A", 2)),
        ("three.pdf", letter_pdf("B", 1)),
    ]);

    session.merge(&LopdfCodec).expect("Failed to merge PDFs");
    assert_eq!(session.status(), &Status::Success);

    let mut sink = DirectorySink::new(temp_dir.path());
    let document = session.save_document(&mut sink).unwrap();
    let index = session.save_index(&mut sink).unwrap();

    assert_eq!(count_pages(&document).unwrap(), 3);
    assert_eq!(index, temp_dir.path().join(INDEX_FILE_NAME));
    assert_eq!(
        std::fs::read_to_string(index).unwrap(),
        "S.No,File Name,Start Page,End Page,Total Pages\n\
         1,\"one, two.pdf\",1,2,2\n\
         2,\"three.pdf\",3,3,1\n"
    );

    session.clear_all();
    assert!(session.manifest.is_empty());
    assert!(session.result().is_none());
    assert_eq!(session.status(), &Status::Idle);
}

#[test]
fn test_sources_read_lazily_from_disk() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("disk.pdf");

    let mut manifest = Manifest::new();
    manifest.add([("disk.pdf", path.clone())]);

    // File appears only after it was queued
    std::fs::write(&path, letter_pdf("D", 4)).unwrap();
    let result = merge(&LopdfCodec, &manifest.snapshot(), &no_annotations()).unwrap();
    assert_eq!(result.index, vec![row(1, "disk.pdf", 1, 4, 4)]);

    std::fs::remove_file(&path).unwrap();
    let err = merge(&LopdfCodec, &manifest.snapshot(), &no_annotations()).unwrap_err();
    assert_eq!(err.failed_source(), Some("disk.pdf"));
}

#[test]
fn test_owner_protected_source_keeps_its_content() {
    let manifest = manifest_of(&[
        ("plain", letter_pdf("A", 1)),
        ("protected", encrypted_pdf("LOCKED", "")),
    ]);

    let result = merge(&LopdfCodec, &manifest.snapshot(), &AnnotationConfig::default()).unwrap();

    let output = Document::load_mem(&result.combined_document).unwrap();
    assert!(!output.is_encrypted());
    let pages = page_contents(&result.combined_document);
    assert!(pages[1].contains("(LOCKED1) Tj"), "{}", pages[1]);
    assert!(pages[1].contains("(Page 2 of 2) Tj"));
    assert_eq!(result.index[1], row(2, "protected", 2, 2, 1));
}

#[test]
fn test_user_password_source_fails_merge() {
    let manifest = manifest_of(&[
        ("plain", letter_pdf("A", 1)),
        ("locked", encrypted_pdf("B", "secret")),
    ]);

    let err = merge(&LopdfCodec, &manifest.snapshot(), &no_annotations()).unwrap_err();

    assert!(matches!(err, Error::DecodeFailure { .. }));
    assert_eq!(err.failed_source(), Some("locked"));
}

#[test]
fn test_indirect_contents_array_survives_stamping() {
    let manifest = manifest_of(&[("indirect", indirect_contents_pdf("M", 2))]);
    let config = AnnotationConfig {
        page_numbers: true,
        watermark: true,
        watermark_text: String::new(),
    };

    let result = merge(&LopdfCodec, &manifest.snapshot(), &config).unwrap();
    let pages = page_contents(&result.combined_document);

    for (n, content) in pages.iter().enumerate() {
        let marker = content.find(&format!("(M{}) Tj", n + 1)).expect("page content lost");
        let stamp = content.find("(CONFIDENTIAL) Tj").unwrap();
        assert!(marker < stamp);
        assert!(content.contains(&format!("(Page {} of 2) Tj", n + 1)));
    }
}

#[test]
fn test_source_without_pages_fails_merge() {
    let manifest = manifest_of(&[
        ("plain", letter_pdf("A", 1)),
        ("blank", marked_pdf("Z", 0, 612, 792)),
    ]);

    let err = merge(&LopdfCodec, &manifest.snapshot(), &no_annotations()).unwrap_err();

    assert_eq!(err.failed_source(), Some("blank"));
}
