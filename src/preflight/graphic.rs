//! Graphic object validation and the output-intent ICC lookup.
//!
//! Covers form XObjects (annotation appearance streams), image XObjects
//! (page thumbnails, resource images), the transparency-group attribute and
//! graphics-state parameter dictionaries. Unreadable payloads are converted
//! into a single finding at the boundary of the sub-check that hit them and
//! never abort the rest of the page.

use crate::document::Document;
use crate::object::{Dictionary, Object, ObjectRef};
use crate::preflight::context::{EntityKind, PreflightContext};
use crate::preflight::resources;
use crate::preflight::result::{ErrorCode, ValidationError};

/// Color family of an ICC profile, read from the profile header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorFamily {
    /// Three-component RGB profile
    Rgb,
    /// Four-component CMYK profile
    Cmyk,
    /// Single-component gray profile
    Gray,
}

/// Minimal descriptor of the document output-intent ICC profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IccProfileInfo {
    /// Color family declared by the profile header
    pub family: ColorFamily,
}

impl IccProfileInfo {
    /// True for RGB profiles.
    pub fn is_rgb(&self) -> bool {
        self.family == ColorFamily::Rgb
    }
}

/// Byte offset of the color-space signature inside an ICC header.
const ICC_COLOR_SPACE_OFFSET: usize = 16;

/// Locate and sniff the destination profile of the first output intent.
///
/// Returns `None` when the document declares no usable intent; the policy
/// checks that need one report their own findings.
pub fn find_output_intent(document: &Document) -> Option<IccProfileInfo> {
    let catalog = document.catalog()?;
    let intents = document
        .resolve(catalog.get("OutputIntents")?)
        .and_then(Object::as_array)?;
    let intent = document.resolve_dict(intents.first()?)?;
    let profile = document.resolve(intent.get("DestOutputProfile")?)?;
    let (_, data) = profile.as_stream()?;
    if data.len() < ICC_COLOR_SPACE_OFFSET + 4 {
        log::warn!("output intent ICC profile shorter than a header");
        return None;
    }
    let family = match &data[ICC_COLOR_SPACE_OFFSET..ICC_COLOR_SPACE_OFFSET + 4] {
        b"RGB " => ColorFamily::Rgb,
        b"CMYK" => ColorFamily::Cmyk,
        b"GRAY" => ColorFamily::Gray,
        other => {
            log::warn!("unknown ICC color space signature {:?}", other);
            return None;
        }
    };
    Some(IccProfileInfo { family })
}

/// The group attribute must not mark a transparency group, whatever else the
/// dictionary carries.
pub fn check_group_transparency<'a>(ctx: &mut PreflightContext<'a>, dict: &'a Dictionary) -> bool {
    let Some(group_entry) = dict.get("Group") else {
        return true;
    };
    let Some(group) = ctx.resolve_dict(group_entry) else {
        return true;
    };
    let subtype = group.get("S").and_then(|o| ctx.resolve(o)).and_then(Object::as_name);
    if subtype == Some("Transparency") {
        ctx.add_error(ValidationError::new(
            ErrorCode::TransparencyGroupForbidden,
            "Group has a transparency S entry",
        ));
        return false;
    }
    true
}

/// Validate a form XObject (annotation appearance stream or resource form).
pub fn validate_form_xobject<'a>(
    ctx: &mut PreflightContext<'a>,
    id: Option<ObjectRef>,
    dict: &'a Dictionary,
    data: &bytes::Bytes,
) -> bool {
    if !ctx.push_checked(EntityKind::XObject, id) {
        ctx.add_error(ValidationError::new(
            ErrorCode::RecursionDetected,
            "Form XObject is nested inside itself",
        ));
        return false;
    }

    let mut ok = true;
    if let Some(subtype) = dict.get("Subtype").and_then(|o| ctx.resolve(o)).and_then(Object::as_name) {
        if subtype != "Form" {
            ctx.add_error(ValidationError::new(
                ErrorCode::GraphicInvalid,
                format!("Expected a Form XObject, found subtype {}", subtype),
            ));
            ok = false;
        }
    }
    if dict.contains_key("PS") {
        ctx.add_error(ValidationError::new(
            ErrorCode::PostScriptForbidden,
            "A form XObject must not contain a PS entry",
        ));
        ok = false;
    }
    let subtype2 = dict.get("Subtype2").and_then(|o| ctx.resolve(o)).and_then(Object::as_name);
    if subtype2 == Some("PS") {
        ctx.add_error(ValidationError::new(
            ErrorCode::PostScriptForbidden,
            "A form XObject must not declare Subtype2 PS",
        ));
        ok = false;
    }
    ok &= check_group_transparency(ctx, dict);
    if data.is_empty() {
        log::debug!("form XObject {:?} has an empty payload", id);
    }
    if let Some(res_entry) = dict.get("Resources") {
        match ctx.resolve_dict(res_entry) {
            Some(res) => {
                ok &= resources::validate_resources(ctx, res_entry.as_reference(), res);
            }
            None => {
                ctx.add_error(ValidationError::new(
                    ErrorCode::DictionaryInvalid,
                    "The Resources entry of a form XObject isn't a dictionary",
                ));
                ok = false;
            }
        }
    }

    ctx.pop();
    ok
}

/// Validate an image XObject (page thumbnail or resource image).
pub fn validate_image_xobject<'a>(
    ctx: &mut PreflightContext<'a>,
    id: Option<ObjectRef>,
    dict: &'a Dictionary,
    data: &bytes::Bytes,
) -> bool {
    if !ctx.push_checked(EntityKind::XObject, id) {
        ctx.add_error(ValidationError::new(
            ErrorCode::RecursionDetected,
            "Image XObject is nested inside itself",
        ));
        return false;
    }

    let mut ok = true;
    for key in ["Width", "Height"] {
        let present = dict
            .get(key)
            .and_then(|o| ctx.resolve(o))
            .and_then(Object::as_integer)
            .is_some();
        if !present {
            ctx.add_error(ValidationError::new(
                ErrorCode::GraphicInvalid,
                format!("The {} entry of an image is missing or isn't an integer", key),
            ));
            ok = false;
        }
    }
    if uses_filter(ctx, dict, "LZWDecode") {
        ctx.add_error(ValidationError::new(
            ErrorCode::LzwForbidden,
            "LZWDecode filter is forbidden",
        ));
        ok = false;
    }
    if dict.contains_key("SMask") {
        ctx.add_error(ValidationError::new(
            ErrorCode::SoftMaskForbidden,
            "An image must not carry a soft mask",
        ));
        ok = false;
    }
    let interpolate = dict
        .get("Interpolate")
        .and_then(|o| ctx.resolve(o))
        .and_then(Object::as_bool)
        .unwrap_or(false);
    if interpolate {
        ctx.add_error(ValidationError::new(
            ErrorCode::GraphicInvalid,
            "The Interpolate entry of an image must be false",
        ));
        ok = false;
    }
    if data.is_empty() {
        ctx.add_error(ValidationError::new(
            ErrorCode::GraphicInvalid,
            "Unable to read the image payload",
        ));
        ok = false;
    }

    ctx.pop();
    ok
}

/// Validate a graphics-state parameter dictionary.
pub fn validate_extgstate<'a>(ctx: &mut PreflightContext<'a>, dict: &'a Dictionary) -> bool {
    let mut ok = true;
    if dict.contains_key("TR") {
        ctx.add_error(ValidationError::new(
            ErrorCode::ExtGStateInvalid,
            "A graphics state must not contain a TR entry",
        ));
        ok = false;
    }
    if let Some(tr2) = dict.get("TR2").and_then(|o| ctx.resolve(o)) {
        if tr2.as_name() != Some("Default") {
            ctx.add_error(ValidationError::new(
                ErrorCode::ExtGStateInvalid,
                "The TR2 entry of a graphics state may only be Default",
            ));
            ok = false;
        }
    }
    for key in ["CA", "ca"] {
        if let Some(value) = dict.get(key).map(|o| ctx.resolve(o)) {
            if value.and_then(Object::as_number) != Some(1.0) {
                ctx.add_error(ValidationError::new(
                    ErrorCode::ExtGStateInvalid,
                    format!("The {} entry of a graphics state must be 1.0", key),
                ));
                ok = false;
            }
        }
    }
    if let Some(bm) = dict.get("BM").and_then(|o| ctx.resolve(o)).and_then(Object::as_name) {
        if bm != "Normal" && bm != "Compatible" {
            ctx.add_error(ValidationError::new(
                ErrorCode::ExtGStateInvalid,
                format!("The blend mode {} is forbidden", bm),
            ));
            ok = false;
        }
    }
    ok
}

/// True when the Filter entry names `filter_name`, directly or in an array.
fn uses_filter<'a>(ctx: &PreflightContext<'a>, dict: &'a Dictionary, filter_name: &str) -> bool {
    match dict.get("Filter").and_then(|o| ctx.resolve(o)) {
        Some(Object::Name(n)) => n == filter_name,
        Some(Object::Array(arr)) => arr
            .iter()
            .any(|f| ctx.resolve(f).and_then(Object::as_name) == Some(filter_name)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::object::ObjectRef;

    fn rgb_profile_bytes() -> bytes::Bytes {
        let mut data = vec![0u8; 128];
        data[ICC_COLOR_SPACE_OFFSET..ICC_COLOR_SPACE_OFFSET + 4].copy_from_slice(b"RGB ");
        bytes::Bytes::from(data)
    }

    fn doc_with_intent(profile: Option<bytes::Bytes>) -> Document {
        let catalog_ref = ObjectRef::new(1, 0);
        let profile_ref = ObjectRef::new(2, 0);

        let mut catalog = Dictionary::new();
        if let Some(data) = profile {
            let mut intent = Dictionary::new();
            intent.insert(
                "DestOutputProfile".to_string(),
                Object::Reference(profile_ref),
            );
            catalog.insert(
                "OutputIntents".to_string(),
                Object::Array(vec![Object::Dictionary(intent)]),
            );
            let mut builder = Document::builder();
            builder = builder.object(
                profile_ref,
                Object::Stream {
                    dict: Dictionary::new(),
                    data,
                },
            );
            let mut trailer = Dictionary::new();
            trailer.insert("Root".to_string(), Object::Reference(catalog_ref));
            return builder
                .object(catalog_ref, Object::Dictionary(catalog))
                .trailer(trailer)
                .build();
        }
        let mut trailer = Dictionary::new();
        trailer.insert("Root".to_string(), Object::Reference(catalog_ref));
        Document::builder()
            .object(catalog_ref, Object::Dictionary(catalog))
            .trailer(trailer)
            .build()
    }

    #[test]
    fn test_output_intent_rgb() {
        let doc = doc_with_intent(Some(rgb_profile_bytes()));
        let intent = find_output_intent(&doc).unwrap();
        assert!(intent.is_rgb());
    }

    #[test]
    fn test_output_intent_absent() {
        let doc = doc_with_intent(None);
        assert!(find_output_intent(&doc).is_none());
    }

    #[test]
    fn test_output_intent_truncated_profile() {
        let doc = doc_with_intent(Some(bytes::Bytes::from_static(b"short")));
        assert!(find_output_intent(&doc).is_none());
    }
}
