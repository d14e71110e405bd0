//! Single-page validation.
//!
//! Runs the configured page-level processes against one page, in the order
//! the configuration lists them. Every process runs even when an earlier one
//! reported findings.

use crate::document::PageObject;
use crate::object::Object;
use crate::preflight::config::ProcessName;
use crate::preflight::content;
use crate::preflight::context::{EntityKind, PreflightContext};
use crate::preflight::resources;
use crate::preflight::result::{ErrorCode, ValidationError};
use crate::preflight::{action, annotation, colorspace, graphic};

/// Validate one page with the configured page-level processes.
pub fn validate_page<'a>(ctx: &mut PreflightContext<'a>, page: &PageObject<'a>) -> bool {
    if !ctx.push_checked(EntityKind::Page, page.id) {
        ctx.add_error(ValidationError::new(
            ErrorCode::RecursionDetected,
            "Page dictionary appears below itself in the page tree",
        ));
        return false;
    }

    let mut ok = true;
    for process in ctx.config().page_processes() {
        ok &= match process {
            ProcessName::Actions => validate_actions(ctx, page),
            ProcessName::Annotations => validate_annotations(ctx, page),
            ProcessName::ColorSpaces => validate_color_spaces(ctx, page),
            ProcessName::Resources => validate_resources(ctx, page),
            ProcessName::GraphicObjects => validate_graphic_objects(ctx, page),
            ProcessName::GroupTransparency => graphic::check_group_transparency(ctx, page.dict),
            ProcessName::ContentStream => content::replay_page(ctx, page),
            other => {
                log::warn!("{:?} is not a page-level process, skipping", other);
                true
            }
        };
    }

    ctx.pop();
    ok
}

/// Pages carry actions only through the AA entry.
fn validate_actions<'a>(ctx: &mut PreflightContext<'a>, page: &PageObject<'a>) -> bool {
    action::validate_additional_actions(ctx, page.dict)
}

fn validate_annotations<'a>(ctx: &mut PreflightContext<'a>, page: &PageObject<'a>) -> bool {
    let Some(entry) = page.dict.get("Annots") else {
        return true;
    };
    let Some(annots) = ctx.resolve(entry).and_then(Object::as_array) else {
        ctx.add_error(ValidationError::new(
            ErrorCode::DictionaryInvalid,
            "The Annots entry of a page isn't an array",
        ));
        return false;
    };
    let mut ok = true;
    for annot_entry in annots {
        let annot_ref = annot_entry.as_reference();
        match ctx.resolve(annot_entry) {
            Some(Object::Dictionary(annot)) => {
                ok &= annotation::validate_annotation(ctx, annot_ref, annot);
            }
            Some(other) => {
                ctx.add_error(ValidationError::new(
                    ErrorCode::WrongType,
                    format!("An Annots entry is a {}, not a dictionary", other.type_name()),
                ));
                ok = false;
            }
            None => {
                ctx.add_error(ValidationError::new(
                    ErrorCode::UnresolvedReference,
                    "An Annots entry references a missing object",
                ));
                ok = false;
            }
        }
    }
    ok
}

fn validate_color_spaces<'a>(ctx: &mut PreflightContext<'a>, page: &PageObject<'a>) -> bool {
    let Some(resources) = page
        .dict
        .get("Resources")
        .and_then(|entry| ctx.resolve_dict(entry))
    else {
        return true;
    };
    let Some(spaces) = resources
        .get("ColorSpace")
        .and_then(|entry| ctx.resolve_dict(entry))
    else {
        return true;
    };
    let mut ok = true;
    for (_, space) in spaces {
        ok &= colorspace::validate_color_space(ctx, space);
    }
    ok
}

fn validate_resources<'a>(ctx: &mut PreflightContext<'a>, page: &PageObject<'a>) -> bool {
    let Some(entry) = page.dict.get("Resources") else {
        return true;
    };
    match ctx.resolve_dict(entry) {
        Some(res) => resources::validate_resources(ctx, entry.as_reference(), res),
        None => {
            ctx.add_error(ValidationError::new(
                ErrorCode::DictionaryInvalid,
                "The Resources entry of a page isn't a dictionary",
            ));
            false
        }
    }
}

/// The only graphic object attached directly to a page is its thumbnail.
fn validate_graphic_objects<'a>(ctx: &mut PreflightContext<'a>, page: &PageObject<'a>) -> bool {
    let Some(entry) = page.dict.get("Thumb") else {
        return true;
    };
    match ctx.resolve(entry) {
        Some(Object::Stream { dict, data }) => {
            graphic::validate_image_xobject(ctx, entry.as_reference(), dict, data)
        }
        _ => {
            ctx.add_error(ValidationError::new(
                ErrorCode::GraphicInvalid,
                "The Thumb entry of a page isn't an image stream",
            ));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::object::{Dictionary, ObjectRef};
    use crate::preflight::config::PreflightConfiguration;

    fn single_page_doc(page: Dictionary) -> Document {
        let catalog_ref = ObjectRef::new(1, 0);
        let pages_ref = ObjectRef::new(2, 0);
        let page_ref = ObjectRef::new(3, 0);

        let mut pages = Dictionary::new();
        pages.insert("Type".to_string(), Object::Name("Pages".to_string()));
        pages.insert(
            "Kids".to_string(),
            Object::Array(vec![Object::Reference(page_ref)]),
        );
        pages.insert("Count".to_string(), Object::Integer(1));

        let mut catalog = Dictionary::new();
        catalog.insert("Type".to_string(), Object::Name("Catalog".to_string()));
        catalog.insert("Pages".to_string(), Object::Reference(pages_ref));

        let mut trailer = Dictionary::new();
        trailer.insert("Root".to_string(), Object::Reference(catalog_ref));

        Document::builder()
            .object(catalog_ref, Object::Dictionary(catalog))
            .object(pages_ref, Object::Dictionary(pages))
            .object(page_ref, Object::Dictionary(page))
            .trailer(trailer)
            .build()
    }

    #[test]
    fn test_empty_page_passes() {
        let mut page = Dictionary::new();
        page.insert("Type".to_string(), Object::Name("Page".to_string()));
        let doc = single_page_doc(page);
        let config = PreflightConfiguration::default();
        let mut ctx = PreflightContext::new(&doc, &config);
        let pages = doc.pages();

        assert!(validate_page(&mut ctx, &pages[0]));
        assert!(ctx.errors().is_empty());
        assert_eq!(ctx.path_depth(), 0);
    }

    #[test]
    fn test_dangling_annotation_reference() {
        let mut page = Dictionary::new();
        page.insert("Type".to_string(), Object::Name("Page".to_string()));
        page.insert(
            "Annots".to_string(),
            Object::Array(vec![Object::Reference(ObjectRef::new(99, 0))]),
        );
        let doc = single_page_doc(page);
        let config = PreflightConfiguration::default();
        let mut ctx = PreflightContext::new(&doc, &config);
        let pages = doc.pages();

        assert!(!validate_page(&mut ctx, &pages[0]));
        assert_eq!(ctx.errors()[0].code, ErrorCode::UnresolvedReference);
    }

    #[test]
    fn test_transparency_group_on_page() {
        let mut group = Dictionary::new();
        group.insert("S".to_string(), Object::Name("Transparency".to_string()));
        let mut page = Dictionary::new();
        page.insert("Type".to_string(), Object::Name("Page".to_string()));
        page.insert("Group".to_string(), Object::Dictionary(group));
        let doc = single_page_doc(page);
        let config = PreflightConfiguration::default();
        let mut ctx = PreflightContext::new(&doc, &config);
        let pages = doc.pages();

        assert!(!validate_page(&mut ctx, &pages[0]));
        let findings = ctx
            .errors()
            .iter()
            .filter(|e| e.code == ErrorCode::TransparencyGroupForbidden)
            .count();
        assert_eq!(findings, 1);
    }

    #[test]
    fn test_disabled_process_is_skipped() {
        let mut page = Dictionary::new();
        page.insert("Type".to_string(), Object::Name("Page".to_string()));
        page.insert("Annots".to_string(), Object::Integer(3));
        let doc = single_page_doc(page);
        let config =
            PreflightConfiguration::default().without_process(ProcessName::Annotations);
        let mut ctx = PreflightContext::new(&doc, &config);
        let pages = doc.pages();

        assert!(validate_page(&mut ctx, &pages[0]));
        assert!(ctx.errors().is_empty());
    }
}
