//! Catalog and page-tree walk.
//!
//! Checks the catalog entries that carry behavior (OpenAction, AA), then
//! drives the page-level processes over every leaf page in document order.
//! The page index is set around each page so its findings carry a location.

use crate::object::{Dictionary, Object};
use crate::preflight::action;
use crate::preflight::context::PreflightContext;
use crate::preflight::process::page;
use crate::preflight::result::{ErrorCode, ValidationError};

/// Run the catalog and page-tree process.
pub fn run(ctx: &mut PreflightContext<'_>) -> bool {
    let Some(catalog) = ctx.document().catalog() else {
        ctx.add_error(ValidationError::new(
            ErrorCode::NoCatalog,
            "There is no document catalog",
        ));
        return false;
    };

    let mut ok = check_open_action(ctx, catalog);

    // A catalog-level AA entry triggers actions on open and close, which the
    // archival profile rules out entirely.
    if catalog.contains_key("AA") {
        ctx.add_error(ValidationError::new(
            ErrorCode::ActionForbidden,
            "The catalog must not carry an AA entry",
        ));
        ok = false;
    }

    let pages_ok = catalog
        .get("Pages")
        .map(|entry| ctx.document().resolve_dict(entry).is_some())
        .unwrap_or(false);
    if !pages_ok {
        ctx.add_error(ValidationError::new(
            ErrorCode::MissingPageTree,
            "The Pages entry of the catalog is missing or isn't a dictionary",
        ));
        return false;
    }

    for page_obj in ctx.document().pages() {
        ctx.set_current_page(Some(page_obj.index));
        ok &= page::validate_page(ctx, &page_obj);
    }
    ctx.set_current_page(None);
    ok
}

/// OpenAction may be a destination array or an action dictionary.
fn check_open_action<'a>(ctx: &mut PreflightContext<'a>, catalog: &'a Dictionary) -> bool {
    let Some(entry) = catalog.get("OpenAction") else {
        return true;
    };
    match ctx.resolve(entry) {
        Some(Object::Array(_)) => true,
        Some(Object::Dictionary(dict)) => {
            action::validate_action(ctx, entry.as_reference(), dict)
        }
        _ => {
            ctx.add_error(ValidationError::new(
                ErrorCode::ActionInvalidType,
                "The OpenAction entry must be a destination or an action",
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

    fn doc_with_catalog(catalog: Dictionary) -> Document {
        let catalog_ref = ObjectRef::new(1, 0);
        let mut trailer = Dictionary::new();
        trailer.insert("Root".to_string(), Object::Reference(catalog_ref));
        Document::builder()
            .object(catalog_ref, Object::Dictionary(catalog))
            .trailer(trailer)
            .build()
    }

    #[test]
    fn test_no_catalog() {
        let doc = Document::builder().build();
        let config = PreflightConfiguration::default();
        let mut ctx = PreflightContext::new(&doc, &config);
        assert!(!run(&mut ctx));
        assert_eq!(ctx.errors()[0].code, ErrorCode::NoCatalog);
    }

    #[test]
    fn test_missing_page_tree() {
        let mut catalog = Dictionary::new();
        catalog.insert("Type".to_string(), Object::Name("Catalog".to_string()));
        let doc = doc_with_catalog(catalog);
        let config = PreflightConfiguration::default();
        let mut ctx = PreflightContext::new(&doc, &config);
        assert!(!run(&mut ctx));
        assert_eq!(ctx.errors()[0].code, ErrorCode::MissingPageTree);
    }

    #[test]
    fn test_catalog_additional_actions_forbidden() {
        let mut pages = Dictionary::new();
        pages.insert("Type".to_string(), Object::Name("Pages".to_string()));
        pages.insert("Kids".to_string(), Object::Array(vec![]));
        let mut catalog = Dictionary::new();
        catalog.insert("Pages".to_string(), Object::Dictionary(pages));
        catalog.insert("AA".to_string(), Object::Dictionary(Dictionary::new()));
        let doc = doc_with_catalog(catalog);
        let config = PreflightConfiguration::default();
        let mut ctx = PreflightContext::new(&doc, &config);
        assert!(!run(&mut ctx));
        assert_eq!(ctx.errors()[0].code, ErrorCode::ActionForbidden);
    }

    #[test]
    fn test_open_action_launch_rejected() {
        let mut launch = Dictionary::new();
        launch.insert("S".to_string(), Object::Name("Launch".to_string()));
        let mut pages = Dictionary::new();
        pages.insert("Type".to_string(), Object::Name("Pages".to_string()));
        pages.insert("Kids".to_string(), Object::Array(vec![]));
        let mut catalog = Dictionary::new();
        catalog.insert("Pages".to_string(), Object::Dictionary(pages));
        catalog.insert("OpenAction".to_string(), Object::Dictionary(launch));
        let doc = doc_with_catalog(catalog);
        let config = PreflightConfiguration::default();
        let mut ctx = PreflightContext::new(&doc, &config);
        assert!(!run(&mut ctx));
        assert!(ctx
            .errors()
            .iter()
            .any(|e| e.code == ErrorCode::ActionForbidden));
    }
}
