//! Composite (Type0) font validation.
//!
//! A Type0 font wraps exactly one CID-keyed descendant. The two kinds of
//! descendant differ in the FontFile key the descriptor accepts and in
//! whether a CIDToGIDMap is required, so those two checks are the only
//! points that vary per kind.

use crate::object::{Dictionary, Object};
use crate::preflight::context::PreflightContext;
use crate::preflight::font::descriptor;
use crate::preflight::font::simple;
use crate::preflight::result::{ErrorCode, ValidationError};

const TYPE0_MANDATORY_FIELDS: [&str; 5] =
    ["Type", "Subtype", "BaseFont", "Encoding", "DescendantFonts"];

const DESCENDANT_MANDATORY_FIELDS: [&str; 4] = ["Type", "Subtype", "BaseFont", "CIDSystemInfo"];

/// Validate a Type0 font dictionary and its descendant.
pub fn validate_composite_font<'a>(
    ctx: &mut PreflightContext<'a>,
    font_name: &str,
    dict: &'a Dictionary,
) -> bool {
    let missing: Vec<&str> = TYPE0_MANDATORY_FIELDS
        .iter()
        .copied()
        .filter(|key| !dict.contains_key(*key))
        .collect();
    let mut ok = missing.is_empty();
    if !ok {
        ctx.add_error(ValidationError::new(
            ErrorCode::FontDictionaryInvalid,
            format!("The font {} is missing {}", font_name, missing.join(", ")),
        ));
    }
    ok &= check_encoding(ctx, font_name, dict);
    ok &= simple::check_to_unicode(ctx, font_name, dict);
    ok &= check_descendant(ctx, font_name, dict);
    ok
}

/// The encoding must be one of the identity CMaps or an embedded CMap stream.
fn check_encoding<'a>(
    ctx: &mut PreflightContext<'a>,
    font_name: &str,
    dict: &'a Dictionary,
) -> bool {
    let Some(entry) = dict.get("Encoding") else {
        // Absence is already covered by the mandatory-field check.
        return true;
    };
    match ctx.resolve(entry) {
        Some(Object::Name(name)) if name == "Identity-H" || name == "Identity-V" => true,
        Some(Object::Stream { .. }) => true,
        _ => {
            ctx.add_error(ValidationError::new(
                ErrorCode::FontEncodingInvalid,
                format!(
                    "The Encoding of {} must be Identity-H, Identity-V or a CMap stream",
                    font_name
                ),
            ));
            false
        }
    }
}

/// DescendantFonts must hold exactly one CID font dictionary.
fn check_descendant<'a>(
    ctx: &mut PreflightContext<'a>,
    font_name: &str,
    dict: &'a Dictionary,
) -> bool {
    let Some(entry) = dict.get("DescendantFonts") else {
        return true;
    };
    let descendants = ctx
        .resolve(entry)
        .and_then(Object::as_array)
        .map(Vec::as_slice);
    let descendant = match descendants {
        Some([single]) => ctx.resolve_dict(single),
        _ => None,
    };
    let Some(descendant) = descendant else {
        ctx.add_error(ValidationError::new(
            ErrorCode::FontDescendantInvalid,
            format!(
                "The DescendantFonts of {} must hold exactly one font dictionary",
                font_name
            ),
        ));
        return false;
    };
    validate_cid_font(ctx, font_name, descendant)
}

fn validate_cid_font<'a>(
    ctx: &mut PreflightContext<'a>,
    font_name: &str,
    dict: &'a Dictionary,
) -> bool {
    let missing: Vec<&str> = DESCENDANT_MANDATORY_FIELDS
        .iter()
        .copied()
        .filter(|key| !dict.contains_key(*key))
        .collect();
    let mut ok = missing.is_empty();
    if !ok {
        ctx.add_error(ValidationError::new(
            ErrorCode::FontDescendantInvalid,
            format!(
                "The descendant of {} is missing {}",
                font_name,
                missing.join(", ")
            ),
        ));
    }
    ok &= check_cid_system_info(ctx, font_name, dict);

    let subtype = dict
        .get("Subtype")
        .and_then(|o| ctx.resolve(o))
        .and_then(Object::as_name);
    match subtype {
        Some("CIDFontType0") => {
            ok &= descriptor::CID_TYPE0.check_descriptor(ctx, font_name, dict);
            ok &= check_cid_to_gid_map(ctx, font_name, dict, false);
        }
        Some("CIDFontType2") => {
            ok &= descriptor::CID_TYPE2.check_descriptor(ctx, font_name, dict);
            ok &= check_cid_to_gid_map(ctx, font_name, dict, true);
        }
        Some(other) => {
            ctx.add_error(ValidationError::new(
                ErrorCode::FontDescendantInvalid,
                format!(
                    "The descendant of {} has the unexpected subtype {}",
                    font_name, other
                ),
            ));
            ok = false;
        }
        None => {
            // Absence already reported with the mandatory fields.
        }
    }
    ok
}

fn check_cid_system_info<'a>(
    ctx: &mut PreflightContext<'a>,
    font_name: &str,
    dict: &'a Dictionary,
) -> bool {
    let Some(entry) = dict.get("CIDSystemInfo") else {
        return true;
    };
    let Some(info) = ctx.resolve_dict(entry) else {
        ctx.add_error(ValidationError::new(
            ErrorCode::FontDescendantInvalid,
            format!("The CIDSystemInfo of {} isn't a dictionary", font_name),
        ));
        return false;
    };
    let registry = info
        .get("Registry")
        .and_then(|o| ctx.resolve(o))
        .map(|o| matches!(o, Object::String(_)))
        .unwrap_or(false);
    let ordering = info
        .get("Ordering")
        .and_then(|o| ctx.resolve(o))
        .map(|o| matches!(o, Object::String(_)))
        .unwrap_or(false);
    let supplement = info
        .get("Supplement")
        .and_then(|o| ctx.resolve(o))
        .and_then(Object::as_integer)
        .is_some();
    if registry && ordering && supplement {
        return true;
    }
    ctx.add_error(ValidationError::new(
        ErrorCode::FontDescendantInvalid,
        format!("The CIDSystemInfo of {} is incomplete", font_name),
    ));
    false
}

/// CIDToGIDMap may be the Identity name or an embedded map stream. A
/// CIDFontType2 must declare one; the entry is optional for CIDFontType0.
fn check_cid_to_gid_map<'a>(
    ctx: &mut PreflightContext<'a>,
    font_name: &str,
    dict: &'a Dictionary,
    mandatory: bool,
) -> bool {
    match dict.get("CIDToGIDMap").map(|o| ctx.resolve(o)) {
        Some(Some(Object::Name(name))) if name == "Identity" => true,
        Some(Some(Object::Stream { .. })) => true,
        Some(_) => {
            ctx.add_error(ValidationError::new(
                ErrorCode::FontCidMapInvalid,
                format!(
                    "The CIDToGIDMap of {} must be Identity or a map stream",
                    font_name
                ),
            ));
            false
        }
        None if mandatory => {
            ctx.add_error(ValidationError::new(
                ErrorCode::FontCidMapInvalid,
                format!("The CIDToGIDMap of {} is missing", font_name),
            ));
            false
        }
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::preflight::config::PreflightConfiguration;

    fn cid_system_info() -> Dictionary {
        let mut d = Dictionary::new();
        d.insert("Registry".to_string(), Object::String(b"Adobe".to_vec()));
        d.insert("Ordering".to_string(), Object::String(b"Identity".to_vec()));
        d.insert("Supplement".to_string(), Object::Integer(0));
        d
    }

    fn type0_skeleton(descendant: Dictionary) -> Dictionary {
        let mut d = Dictionary::new();
        d.insert("Type".to_string(), Object::Name("Font".to_string()));
        d.insert("Subtype".to_string(), Object::Name("Type0".to_string()));
        d.insert("BaseFont".to_string(), Object::Name("NotoSans".to_string()));
        d.insert("Encoding".to_string(), Object::Name("Identity-H".to_string()));
        d.insert(
            "DescendantFonts".to_string(),
            Object::Array(vec![Object::Dictionary(descendant)]),
        );
        d
    }

    #[test]
    fn test_descendant_must_be_single() {
        let doc = Document::builder().build();
        let config = PreflightConfiguration::default();
        let mut ctx = PreflightContext::new(&doc, &config);

        let mut dict = type0_skeleton(Dictionary::new());
        dict.insert("DescendantFonts".to_string(), Object::Array(vec![]));
        assert!(!validate_composite_font(&mut ctx, "F0", &dict));
        assert!(ctx
            .errors()
            .iter()
            .any(|e| e.code == ErrorCode::FontDescendantInvalid));
    }

    #[test]
    fn test_bad_encoding_name() {
        let doc = Document::builder().build();
        let config = PreflightConfiguration::default();
        let mut ctx = PreflightContext::new(&doc, &config);

        let mut descendant = Dictionary::new();
        descendant.insert(
            "CIDSystemInfo".to_string(),
            Object::Dictionary(cid_system_info()),
        );
        let mut dict = type0_skeleton(descendant);
        dict.insert("Encoding".to_string(), Object::Name("UniJIS".to_string()));
        validate_composite_font(&mut ctx, "F0", &dict);
        assert!(ctx
            .errors()
            .iter()
            .any(|e| e.code == ErrorCode::FontEncodingInvalid));
    }

    #[test]
    fn test_cid_type2_requires_gid_map() {
        let doc = Document::builder().build();
        let config = PreflightConfiguration::default();
        let mut ctx = PreflightContext::new(&doc, &config);

        let mut descriptor_dict = Dictionary::new();
        for key in [
            "FontName", "Flags", "ItalicAngle", "Ascent", "Descent", "CapHeight", "StemV",
            "FontBBox",
        ] {
            descriptor_dict.insert(key.to_string(), Object::Integer(0));
        }
        descriptor_dict.insert(
            "FontFile2".to_string(),
            Object::Stream {
                dict: Dictionary::new(),
                data: bytes::Bytes::from_static(&[0, 1, 0, 0]),
            },
        );
        let mut descendant = Dictionary::new();
        descendant.insert("Type".to_string(), Object::Name("Font".to_string()));
        descendant.insert(
            "Subtype".to_string(),
            Object::Name("CIDFontType2".to_string()),
        );
        descendant.insert("BaseFont".to_string(), Object::Name("NotoSans".to_string()));
        descendant.insert(
            "CIDSystemInfo".to_string(),
            Object::Dictionary(cid_system_info()),
        );
        descendant.insert(
            "FontDescriptor".to_string(),
            Object::Dictionary(descriptor_dict),
        );

        let dict = type0_skeleton(descendant);
        assert!(!validate_composite_font(&mut ctx, "F0", &dict));
        assert!(ctx
            .errors()
            .iter()
            .any(|e| e.code == ErrorCode::FontCidMapInvalid));
    }
}
