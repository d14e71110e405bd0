//! Simple font validation: Type1, MMType1, TrueType and Type3.
//!
//! Simple fonts address at most 256 glyphs through FirstChar, LastChar and
//! Widths. Type3 fonts define glyphs as content streams and skip the
//! embedding requirement; the other kinds go through the descriptor walk.

use crate::object::{Dictionary, Object};
use crate::preflight::context::PreflightContext;
use crate::preflight::font::descriptor::DescriptorHelper;
use crate::preflight::result::{ErrorCode, ValidationError};

const SIMPLE_MANDATORY_FIELDS: [&str; 6] =
    ["Type", "Subtype", "BaseFont", "FirstChar", "LastChar", "Widths"];

const TYPE3_MANDATORY_FIELDS: [&str; 6] = [
    "FontMatrix",
    "CharProcs",
    "Encoding",
    "Widths",
    "FirstChar",
    "LastChar",
];

const STANDARD_ENCODINGS: [&str; 3] =
    ["MacRomanEncoding", "MacExpertEncoding", "WinAnsiEncoding"];

/// Validate a Type1, MMType1 or TrueType font dictionary.
pub fn validate_simple_font<'a>(
    ctx: &mut PreflightContext<'a>,
    font_name: &str,
    dict: &'a Dictionary,
    helper: DescriptorHelper,
) -> bool {
    let mut ok = check_mandatory_fields(ctx, font_name, dict, &SIMPLE_MANDATORY_FIELDS);
    ok &= check_widths_count(ctx, font_name, dict);
    ok &= check_encoding(ctx, font_name, dict);
    ok &= check_to_unicode(ctx, font_name, dict);
    ok &= helper.check_descriptor(ctx, font_name, dict);
    ok
}

/// Validate a Type3 font dictionary.
pub fn validate_type3_font<'a>(
    ctx: &mut PreflightContext<'a>,
    font_name: &str,
    dict: &'a Dictionary,
) -> bool {
    let mut ok = check_mandatory_fields(ctx, font_name, dict, &TYPE3_MANDATORY_FIELDS);
    ok &= check_widths_count(ctx, font_name, dict);
    ok &= check_to_unicode(ctx, font_name, dict);
    ok
}

/// Missing mandatory entries collapse into one finding per font.
fn check_mandatory_fields(
    ctx: &mut PreflightContext<'_>,
    font_name: &str,
    dict: &Dictionary,
    fields: &[&str],
) -> bool {
    let missing: Vec<&str> = fields
        .iter()
        .copied()
        .filter(|key| !dict.contains_key(*key))
        .collect();
    if missing.is_empty() {
        return true;
    }
    ctx.add_error(ValidationError::new(
        ErrorCode::FontDictionaryInvalid,
        format!("The font {} is missing {}", font_name, missing.join(", ")),
    ));
    false
}

/// The Widths array must cover exactly the FirstChar..=LastChar range.
fn check_widths_count<'a>(
    ctx: &mut PreflightContext<'a>,
    font_name: &str,
    dict: &'a Dictionary,
) -> bool {
    let first = dict
        .get("FirstChar")
        .and_then(|o| ctx.resolve(o))
        .and_then(Object::as_integer);
    let last = dict
        .get("LastChar")
        .and_then(|o| ctx.resolve(o))
        .and_then(Object::as_integer);
    let widths = dict
        .get("Widths")
        .and_then(|o| ctx.resolve(o))
        .and_then(Object::as_array);
    let (Some(first), Some(last), Some(widths)) = (first, last, widths) else {
        // Absence is already covered by the mandatory-field check.
        return true;
    };
    // FirstChar and LastChar come straight from the file; the range
    // arithmetic must not trust them.
    let expected = last.checked_sub(first).and_then(|span| span.checked_add(1));
    if !matches!(expected, Some(n) if n >= 0 && widths.len() as i64 == n) {
        ctx.add_error(ValidationError::new(
            ErrorCode::FontDictionaryInvalid,
            format!(
                "The Widths array of {} has {} entries, expected {}",
                font_name,
                widths.len(),
                expected.unwrap_or(0).max(0)
            ),
        ));
        return false;
    }
    true
}

/// Encoding must be a standard encoding name or an encoding dictionary.
fn check_encoding<'a>(
    ctx: &mut PreflightContext<'a>,
    font_name: &str,
    dict: &'a Dictionary,
) -> bool {
    let Some(entry) = dict.get("Encoding") else {
        return true;
    };
    match ctx.resolve(entry) {
        Some(Object::Name(name)) if STANDARD_ENCODINGS.contains(&name.as_str()) => true,
        Some(Object::Dictionary(_)) => true,
        _ => {
            ctx.add_error(ValidationError::new(
                ErrorCode::FontEncodingInvalid,
                format!("The Encoding entry of {} is not usable", font_name),
            ));
            false
        }
    }
}

/// ToUnicode, when present, must be a CMap stream.
pub(super) fn check_to_unicode<'a>(
    ctx: &mut PreflightContext<'a>,
    font_name: &str,
    dict: &'a Dictionary,
) -> bool {
    let Some(entry) = dict.get("ToUnicode") else {
        return true;
    };
    match ctx.resolve(entry) {
        Some(Object::Stream { .. }) => true,
        _ => {
            ctx.add_error(ValidationError::new(
                ErrorCode::FontToUnicodeInvalid,
                format!("The ToUnicode entry of {} isn't a stream", font_name),
            ));
            false
        }
    }
}
