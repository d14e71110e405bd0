//! Integration tests for the preflight validation engine.

use pdf_preflight::document::{Document, DocumentBuilder};
use pdf_preflight::object::{Dictionary, Object, ObjectRef};
use pdf_preflight::preflight::{validate, validate_with_config, PreflightConfiguration, ProcessName};
use pdf_preflight::ErrorCode;
use proptest::prelude::*;

const CATALOG: ObjectRef = ObjectRef::new(1, 0);
const PAGES: ObjectRef = ObjectRef::new(2, 0);

/// Route engine logs through the test harness when RUST_LOG is set.
fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn name(s: &str) -> Object {
    Object::Name(s.to_string())
}

fn valid_trailer() -> Dictionary {
    let mut t = Dictionary::new();
    t.insert(
        "ID".to_string(),
        Object::Array(vec![
            Object::String(b"f1d2".to_vec()),
            Object::String(b"a9c4".to_vec()),
        ]),
    );
    t.insert("Size".to_string(), Object::Integer(16));
    t.insert("Root".to_string(), Object::Reference(CATALOG));
    t
}

/// Catalog plus a flat page tree over the given page dictionaries. Pages are
/// numbered from object 10.
fn doc_with_pages(pages: Vec<Dictionary>) -> DocumentBuilder {
    init_logs();
    let kid_refs: Vec<ObjectRef> = (0..pages.len())
        .map(|i| ObjectRef::new(10 + i as u32, 0))
        .collect();

    let mut pages_dict = Dictionary::new();
    pages_dict.insert("Type".to_string(), name("Pages"));
    pages_dict.insert(
        "Kids".to_string(),
        Object::Array(kid_refs.iter().map(|r| Object::Reference(*r)).collect()),
    );
    pages_dict.insert("Count".to_string(), Object::Integer(pages.len() as i64));

    let mut catalog = Dictionary::new();
    catalog.insert("Type".to_string(), name("Catalog"));
    catalog.insert("Pages".to_string(), Object::Reference(PAGES));

    let mut builder = Document::builder()
        .object(CATALOG, Object::Dictionary(catalog))
        .object(PAGES, Object::Dictionary(pages_dict));
    for (kid_ref, mut page) in kid_refs.into_iter().zip(pages) {
        page.insert("Type".to_string(), name("Page"));
        page.insert("Parent".to_string(), Object::Reference(PAGES));
        builder = builder.object(kid_ref, Object::Dictionary(page));
    }
    builder.trailer(valid_trailer())
}

fn page_with_annotation(annot: Dictionary) -> Document {
    let mut page = Dictionary::new();
    page.insert(
        "Annots".to_string(),
        Object::Array(vec![Object::Dictionary(annot)]),
    );
    doc_with_pages(vec![page]).build()
}

/// A Text annotation that passes every annotation check.
fn clean_annotation() -> Dictionary {
    let mut annot = Dictionary::new();
    annot.insert("Subtype".to_string(), name("Text"));
    annot.insert(
        "Rect".to_string(),
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(20),
            Object::Integer(20),
        ]),
    );
    annot.insert("F".to_string(), Object::Integer(4));
    annot
}

#[test]
fn test_minimal_document_is_valid() {
    let doc = doc_with_pages(vec![Dictionary::new()]).build();
    let result = validate(&doc);
    assert!(result.is_valid(), "unexpected findings: {:?}", result.errors);
}

#[test]
fn test_missing_rect_one_finding_other_checks_still_run() {
    let mut annot = clean_annotation();
    annot.shift_remove("Rect");
    annot.shift_remove("F");
    let doc = page_with_annotation(annot);

    let result = validate(&doc);
    // Exactly one finding for the missing field, and the flag check still
    // contributed its own.
    assert_eq!(
        result.errors_with_code(ErrorCode::AnnotMissingFields).count(),
        1
    );
    assert_eq!(
        result.errors_with_code(ErrorCode::AnnotForbiddenFlag).count(),
        1
    );
}

#[test]
fn test_runs_are_idempotent() {
    let mut annot = clean_annotation();
    annot.insert("CA".to_string(), Object::Real(0.5));
    let doc = page_with_annotation(annot);

    let first = validate(&doc);
    let second = validate(&doc);
    assert!(!first.is_valid());
    assert_eq!(first, second);
}

#[test]
fn test_trailer_missing_keys_one_finding_each() {
    let mut trailer = valid_trailer();
    trailer.shift_remove("ID");
    trailer.shift_remove("Size");
    let doc = doc_with_pages(vec![Dictionary::new()]).trailer(trailer).build();

    let result = validate(&doc);
    assert_eq!(result.errors_with_code(ErrorCode::TrailerMissingId).count(), 1);
    assert_eq!(
        result.errors_with_code(ErrorCode::TrailerMissingSize).count(),
        1
    );
    assert_eq!(
        result.errors_with_code(ErrorCode::TrailerMissingRoot).count(),
        0
    );
}

fn linearization_dictionary() -> Dictionary {
    let mut lin = Dictionary::new();
    lin.insert("Linearized".to_string(), Object::Integer(1));
    for key in ["L", "H", "O", "E", "N", "T"] {
        lin.insert(key.to_string(), Object::Integer(1));
    }
    lin
}

#[test]
fn test_linearized_id_mismatch_single_finding() {
    let mut first = valid_trailer();
    first.insert(
        "ID".to_string(),
        Object::Array(vec![
            Object::String(b"orig".to_vec()),
            Object::String(b"orig".to_vec()),
        ]),
    );
    let last = valid_trailer();

    let doc = doc_with_pages(vec![Dictionary::new()])
        .object(ObjectRef::new(30, 0), Object::Dictionary(linearization_dictionary()))
        .revision(first)
        .revision(last.clone())
        .trailer(last)
        .build();

    let result = validate(&doc);
    assert_eq!(
        result.errors_with_code(ErrorCode::TrailerIdInconsistent).count(),
        1
    );
}

#[test]
fn test_linearized_matching_ids_pass() {
    let trailer = valid_trailer();
    let doc = doc_with_pages(vec![Dictionary::new()])
        .object(ObjectRef::new(30, 0), Object::Dictionary(linearization_dictionary()))
        .revision(trailer.clone())
        .revision(trailer.clone())
        .trailer(trailer)
        .build();

    let result = validate(&doc);
    assert!(result.is_valid(), "unexpected findings: {:?}", result.errors);
}

#[test]
fn test_shared_font_findings_reported_once() {
    // An incomplete font shared by three pages through their resources.
    let font_ref = ObjectRef::new(40, 0);
    let mut font = Dictionary::new();
    font.insert("Type".to_string(), name("Font"));
    font.insert("Subtype".to_string(), name("Type1"));

    let pages: Vec<Dictionary> = (0..3)
        .map(|_| {
            let mut fonts = Dictionary::new();
            fonts.insert("F1".to_string(), Object::Reference(font_ref));
            let mut resources = Dictionary::new();
            resources.insert("Font".to_string(), Object::Dictionary(fonts));
            let mut page = Dictionary::new();
            page.insert("Resources".to_string(), Object::Dictionary(resources));
            page
        })
        .collect();
    let doc = doc_with_pages(pages)
        .object(font_ref, Object::Dictionary(font))
        .build();

    let result = validate(&doc);
    let font_findings = result
        .errors_with_code(ErrorCode::FontDictionaryInvalid)
        .count();
    assert_eq!(font_findings, 1, "findings: {:?}", result.errors);
    // The single validation happened on the first page.
    assert_eq!(
        result
            .errors_with_code(ErrorCode::FontDictionaryInvalid)
            .next()
            .unwrap()
            .page,
        Some(0)
    );
}

#[test]
fn test_transparency_group_stamped_with_page() {
    let mut group = Dictionary::new();
    group.insert("S".to_string(), name("Transparency"));
    let mut page = Dictionary::new();
    page.insert("Group".to_string(), Object::Dictionary(group));
    let doc = doc_with_pages(vec![Dictionary::new(), page]).build();

    let result = validate(&doc);
    let findings: Vec<_> = result
        .errors_with_code(ErrorCode::TransparencyGroupForbidden)
        .collect();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].page, Some(1));
}

#[test]
fn test_appearance_with_d_entry_single_finding() {
    let mut ap = Dictionary::new();
    ap.insert(
        "N".to_string(),
        Object::Stream {
            dict: Dictionary::new(),
            data: bytes::Bytes::from_static(b"q Q"),
        },
    );
    ap.insert("D".to_string(), Object::Dictionary(Dictionary::new()));
    let mut annot = clean_annotation();
    annot.insert("AP".to_string(), Object::Dictionary(ap));
    let doc = page_with_annotation(annot);

    let result = validate(&doc);
    // One finding for the disallowed entry; the N checks were skipped, so no
    // second appearance finding appears.
    assert_eq!(
        result
            .errors_with_code(ErrorCode::AnnotInvalidApContent)
            .count(),
        1
    );
    assert_eq!(result.errors.len(), 1);
}

#[test]
fn test_forbidden_annotation_subtype() {
    let mut annot = clean_annotation();
    annot.insert("Subtype".to_string(), name("FileAttachment"));
    let doc = page_with_annotation(annot);

    let result = validate(&doc);
    assert_eq!(
        result
            .errors_with_code(ErrorCode::AnnotForbiddenSubtype)
            .count(),
        1
    );
}

#[test]
fn test_unknown_annotation_subtype_still_checks_flags() {
    let mut annot = clean_annotation();
    annot.insert("Subtype".to_string(), name("RichMedia"));
    annot.insert("F".to_string(), Object::Integer(2));
    let doc = page_with_annotation(annot);

    let result = validate(&doc);
    assert_eq!(result.errors_with_code(ErrorCode::UnknownSubtype).count(), 1);
    assert_eq!(
        result.errors_with_code(ErrorCode::AnnotForbiddenFlag).count(),
        1
    );
}

#[test]
fn test_self_referential_popup_reported_not_recursed() {
    let annot_ref = ObjectRef::new(50, 0);
    let mut annot = clean_annotation();
    annot.insert("Popup".to_string(), Object::Reference(annot_ref));

    let mut page = Dictionary::new();
    page.insert(
        "Annots".to_string(),
        Object::Array(vec![Object::Reference(annot_ref)]),
    );
    let doc = doc_with_pages(vec![page])
        .object(annot_ref, Object::Dictionary(annot))
        .build();

    let result = validate(&doc);
    assert_eq!(
        result.errors_with_code(ErrorCode::RecursionDetected).count(),
        1
    );
}

#[test]
fn test_launch_action_forbidden() {
    let mut launch = Dictionary::new();
    launch.insert("S".to_string(), name("Launch"));
    let mut annot = clean_annotation();
    annot.insert("Subtype".to_string(), name("Link"));
    annot.insert("A".to_string(), Object::Dictionary(launch));
    let doc = page_with_annotation(annot);

    let result = validate(&doc);
    assert_eq!(result.errors_with_code(ErrorCode::ActionForbidden).count(), 1);
}

#[test]
fn test_trailer_only_profile_skips_pages() {
    let mut annot = clean_annotation();
    annot.shift_remove("Rect");
    let doc = page_with_annotation(annot);

    let config =
        PreflightConfiguration::default().with_document_processes(vec![ProcessName::Trailer]);
    let result = validate_with_config(&doc, &config);
    assert!(result.is_valid());
}

/// Arbitrary annotation dictionaries: a pool of plausible keys with loosely
/// typed values, so the engine sees both well-formed and damaged shapes.
fn arb_annotation() -> impl Strategy<Value = Dictionary> {
    let value = prop_oneof![
        Just(Object::Null),
        any::<i64>().prop_map(Object::Integer),
        any::<bool>().prop_map(Object::Boolean),
        "[A-Za-z]{1,12}".prop_map(Object::Name),
        (1u32..60, 0u16..2).prop_map(|(id, gen)| Object::Reference(ObjectRef::new(id, gen))),
    ];
    let key = prop_oneof![
        Just("Subtype".to_string()),
        Just("Rect".to_string()),
        Just("F".to_string()),
        Just("CA".to_string()),
        Just("C".to_string()),
        Just("AP".to_string()),
        Just("A".to_string()),
        Just("AA".to_string()),
        Just("Popup".to_string()),
    ];
    proptest::collection::vec((key, value), 0..8).prop_map(|entries| {
        let mut dict = Dictionary::new();
        for (k, v) in entries {
            dict.insert(k, v);
        }
        dict
    })
}

proptest! {
    #[test]
    fn prop_arbitrary_annotations_terminate_and_are_idempotent(annot in arb_annotation()) {
        let doc = page_with_annotation(annot);
        let first = validate(&doc);
        let second = validate(&doc);
        prop_assert_eq!(first, second);
    }
}
