//! Font validation.
//!
//! Fonts are the one entity validated once per object identity: a font
//! shared by several pages or resource dictionaries goes through its checks
//! the first time it is met and every later encounter replays the cached
//! verdict. Inline font dictionaries without an identity are validated in
//! place each time.

mod composite;
mod descriptor;
mod simple;

pub use descriptor::DescriptorHelper;

use crate::object::{Dictionary, Object, ObjectRef};
use crate::preflight::context::{EntityKind, PreflightContext};
use crate::preflight::result::{ErrorCode, ValidationError};
use std::collections::HashMap;

/// Concrete rule set selected for a font subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontKind {
    /// Type1 or MMType1 simple font
    Type1,
    /// TrueType simple font
    TrueType,
    /// Type3 glyph-procedure font
    Type3,
    /// Type0 composite font
    Composite,
    /// Unrecognized subtype
    Unknown,
}

lazy_static::lazy_static! {
    static ref SUBTYPE_TABLE: HashMap<&'static str, FontKind> = {
        use FontKind::*;
        let mut m = HashMap::new();
        m.insert("Type1", Type1);
        m.insert("MMType1", Type1);
        m.insert("TrueType", TrueType);
        m.insert("Type3", Type3);
        m.insert("Type0", Composite);
        m
    };
}

impl FontKind {
    /// Select the rule set for a declared subtype.
    pub fn from_subtype(subtype: &str) -> Self {
        SUBTYPE_TABLE
            .get(subtype)
            .copied()
            .unwrap_or(FontKind::Unknown)
    }
}

/// Validate a font dictionary, consulting the per-run cache when the font is
/// an indirect object.
pub fn validate_font<'a>(
    ctx: &mut PreflightContext<'a>,
    id: Option<ObjectRef>,
    dict: &'a Dictionary,
) -> bool {
    match id {
        Some(id) => ctx.font_cache_get_or_insert(id, |ctx| validate_uncached(ctx, Some(id), dict)),
        None => validate_uncached(ctx, None, dict),
    }
}

fn validate_uncached<'a>(
    ctx: &mut PreflightContext<'a>,
    id: Option<ObjectRef>,
    dict: &'a Dictionary,
) -> bool {
    if !ctx.push_checked(EntityKind::Font, id) {
        ctx.add_error(ValidationError::new(
            ErrorCode::RecursionDetected,
            "Font dictionary is nested inside itself",
        ));
        return false;
    }

    let font_name = dict
        .get("BaseFont")
        .and_then(|o| ctx.resolve(o))
        .and_then(Object::as_name)
        .unwrap_or("unnamed font")
        .to_string();

    let subtype = dict
        .get("Subtype")
        .and_then(|o| ctx.resolve(o))
        .and_then(Object::as_name)
        .map(str::to_string);

    let mut ok = check_common_entries(ctx, &font_name, dict);
    ok &= match subtype.as_deref() {
        None => {
            ctx.add_error(ValidationError::new(
                ErrorCode::FontDictionaryInvalid,
                format!("The font {} has no Subtype entry", font_name),
            ));
            false
        }
        Some(s) => match FontKind::from_subtype(s) {
            FontKind::Type1 => {
                simple::validate_simple_font(ctx, &font_name, dict, descriptor::TYPE1)
            }
            FontKind::TrueType => {
                simple::validate_simple_font(ctx, &font_name, dict, descriptor::TRUETYPE)
            }
            FontKind::Type3 => simple::validate_type3_font(ctx, &font_name, dict),
            FontKind::Composite => composite::validate_composite_font(ctx, &font_name, dict),
            FontKind::Unknown => {
                ctx.add_error(ValidationError::new(
                    ErrorCode::UnknownSubtype,
                    format!("The font subtype {} is not recognized", s),
                ));
                false
            }
        },
    };

    ctx.pop();
    ok
}

/// Checks every font kind shares: the Type entry, when present, must be Font.
fn check_common_entries<'a>(
    ctx: &mut PreflightContext<'a>,
    font_name: &str,
    dict: &'a Dictionary,
) -> bool {
    if let Some(type_name) = dict.get("Type").and_then(|o| ctx.resolve(o)).and_then(Object::as_name)
    {
        if type_name != "Font" {
            ctx.add_error(ValidationError::new(
                ErrorCode::FontDictionaryInvalid,
                format!("The Type entry of {} must be Font", font_name),
            ));
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::preflight::config::PreflightConfiguration;

    #[test]
    fn test_subtype_table() {
        assert_eq!(FontKind::from_subtype("Type1"), FontKind::Type1);
        assert_eq!(FontKind::from_subtype("MMType1"), FontKind::Type1);
        assert_eq!(FontKind::from_subtype("Type0"), FontKind::Composite);
        assert_eq!(FontKind::from_subtype("OpenType"), FontKind::Unknown);
    }

    #[test]
    fn test_unknown_subtype_still_runs_common_checks() {
        let doc = Document::builder().build();
        let config = PreflightConfiguration::default();
        let mut ctx = PreflightContext::new(&doc, &config);

        let mut dict = Dictionary::new();
        dict.insert("Type".to_string(), Object::Name("Pattern".to_string()));
        dict.insert("Subtype".to_string(), Object::Name("OpenType".to_string()));
        dict.insert("BaseFont".to_string(), Object::Name("Mystery".to_string()));

        assert!(!validate_font(&mut ctx, None, &dict));
        let codes: Vec<_> = ctx.errors().iter().map(|e| e.code).collect();
        assert!(codes.contains(&ErrorCode::FontDictionaryInvalid));
        assert!(codes.contains(&ErrorCode::UnknownSubtype));
    }

    #[test]
    fn test_shared_font_validated_once() {
        let font_ref = ObjectRef::new(7, 0);
        let mut font = Dictionary::new();
        font.insert("Subtype".to_string(), Object::Name("Type1".to_string()));
        let doc = Document::builder()
            .object(font_ref, Object::Dictionary(font))
            .build();
        let config = PreflightConfiguration::default();
        let mut ctx = PreflightContext::new(&doc, &config);

        let font_obj = Object::Reference(font_ref);
        let Some(Object::Dictionary(dict)) = doc.resolve(&font_obj) else {
            panic!("font did not resolve");
        };
        let first_run = validate_font(&mut ctx, Some(font_ref), dict);
        let errors_after_first = ctx.errors().len();
        let second_run = validate_font(&mut ctx, Some(font_ref), dict);

        assert_eq!(first_run, second_run);
        assert_eq!(ctx.errors().len(), errors_after_first);
        assert_eq!(ctx.font_cache_hits(), 1);
    }
}
