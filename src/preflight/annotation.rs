//! Annotation validation.
//!
//! Subtype dispatch is a static table; an unrecognized subtype still runs the
//! checks common to every annotation and is reported as an extension finding,
//! never silently skipped. All checks of one annotation always run — a failed
//! mandatory-field check does not suppress the flag, color or appearance
//! checks, and each contributes its own findings.

use crate::object::{Dictionary, Object, ObjectRef};
use crate::preflight::action;
use crate::preflight::context::{EntityKind, PreflightContext};
use crate::preflight::graphic;
use crate::preflight::result::{ErrorCode, ValidationError};
use std::collections::HashMap;

bitflags::bitflags! {
    /// Annotation flag word (the `F` entry).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AnnotationFlags: u32 {
        /// Do not render the annotation
        const INVISIBLE = 1 << 0;
        /// Hidden on screen and paper
        const HIDDEN = 1 << 1;
        /// Include when printing
        const PRINT = 1 << 2;
        /// Do not scale with the page
        const NO_ZOOM = 1 << 3;
        /// Do not rotate with the page
        const NO_ROTATE = 1 << 4;
        /// Do not display on screen
        const NO_VIEW = 1 << 5;
        /// Ignore user interaction
        const READ_ONLY = 1 << 6;
        /// Do not allow deletion
        const LOCKED = 1 << 7;
        /// Invert the NoView flag on certain events
        const TOGGLE_NO_VIEW = 1 << 8;
    }
}

/// Concrete rule set selected for an annotation subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationKind {
    /// Text ("sticky note") annotation
    Text,
    /// Link annotation
    Link,
    /// Free text annotation
    FreeText,
    /// Line annotation
    Line,
    /// Square or circle annotation
    SquareCircle,
    /// Text markup annotation (highlight, underline, squiggly, strikeout)
    Markup,
    /// Rubber stamp annotation
    Stamp,
    /// Ink annotation
    Ink,
    /// Popup annotation
    Popup,
    /// Widget annotation
    Widget,
    /// Printer's mark annotation
    PrinterMark,
    /// Subtype forbidden outright by the profile
    Forbidden,
    /// Unrecognized subtype, common checks only
    Unknown,
}

lazy_static::lazy_static! {
    static ref SUBTYPE_TABLE: HashMap<&'static str, AnnotationKind> = {
        use AnnotationKind::*;
        let mut m = HashMap::new();
        m.insert("Text", Text);
        m.insert("Link", Link);
        m.insert("FreeText", FreeText);
        m.insert("Line", Line);
        m.insert("Square", SquareCircle);
        m.insert("Circle", SquareCircle);
        m.insert("Highlight", Markup);
        m.insert("Underline", Markup);
        m.insert("Squiggly", Markup);
        m.insert("StrikeOut", Markup);
        m.insert("Stamp", Stamp);
        m.insert("Ink", Ink);
        m.insert("Popup", Popup);
        m.insert("Widget", Widget);
        m.insert("PrinterMark", PrinterMark);
        // Forbidden for the archival profile.
        m.insert("FileAttachment", Forbidden);
        m.insert("Sound", Forbidden);
        m.insert("Movie", Forbidden);
        m.insert("TrapNet", Forbidden);
        m
    };
}

impl AnnotationKind {
    /// Select the rule set for a declared subtype.
    pub fn from_subtype(subtype: &str) -> Self {
        SUBTYPE_TABLE
            .get(subtype)
            .copied()
            .unwrap_or(AnnotationKind::Unknown)
    }

    /// Mandatory fields beyond Subtype and Rect.
    fn extra_mandatory(&self) -> &'static [&'static str] {
        match self {
            AnnotationKind::FreeText => &["DA"],
            AnnotationKind::Line => &["L"],
            AnnotationKind::Markup => &["QuadPoints"],
            AnnotationKind::Ink => &["InkList"],
            _ => &[],
        }
    }
}

/// Validate one annotation dictionary.
///
/// Returns true only when every check passed; every check runs and records
/// its own findings regardless of earlier failures.
pub fn validate_annotation<'a>(
    ctx: &mut PreflightContext<'a>,
    id: Option<ObjectRef>,
    dict: &'a Dictionary,
) -> bool {
    if !ctx.push_checked(EntityKind::Annotation, id) {
        ctx.add_error(ValidationError::new(
            ErrorCode::RecursionDetected,
            format!(
                "Annotation {} is referenced by one of its own sub-entries",
                id.map(|r| r.to_string()).unwrap_or_default()
            ),
        ));
        return false;
    }

    let subtype = dict
        .get("Subtype")
        .and_then(|o| ctx.resolve(o))
        .and_then(Object::as_name)
        .map(str::to_string);
    let kind = match subtype.as_deref() {
        Some(s) => AnnotationKind::from_subtype(s),
        None => AnnotationKind::Unknown,
    };
    let label = subtype.as_deref().unwrap_or("unknown").to_string();

    let mut ok = true;
    if kind == AnnotationKind::Unknown && subtype.is_some() {
        ctx.add_error(ValidationError::new(
            ErrorCode::UnknownSubtype,
            format!("Annotation subtype {} is not recognized, only common checks were run", label),
        ));
        ok = false;
    }
    if kind == AnnotationKind::Forbidden {
        ctx.add_error(ValidationError::new(
            ErrorCode::AnnotForbiddenSubtype,
            format!("The {} annotation subtype is forbidden", label),
        ));
        ok = false;
    }

    ok &= check_mandatory_fields(ctx, dict, kind, &label);
    ok &= check_flags(ctx, dict, &label);
    ok &= check_colors(ctx, dict);
    ok &= check_appearance(ctx, dict);
    ok &= check_ca(ctx, dict);
    ok &= check_actions(ctx, dict, kind);
    ok &= check_popup(ctx, dict);

    ctx.pop();
    ok
}

/// Mandatory-field check: Subtype, Rect and the kind-specific extras.
/// Any missing field produces exactly one finding for the annotation.
fn check_mandatory_fields(
    ctx: &mut PreflightContext<'_>,
    dict: &Dictionary,
    kind: AnnotationKind,
    label: &str,
) -> bool {
    let mut complete = dict.contains_key("Subtype") && dict.contains_key("Rect");
    for key in kind.extra_mandatory() {
        complete = complete && dict.contains_key(*key);
    }
    if !complete {
        ctx.add_error(ValidationError::new(
            ErrorCode::AnnotMissingFields,
            format!("A mandatory field for the {} annotation is missing", label),
        ));
    }
    complete
}

/// The flag word must have Print set and Hidden, Invisible and NoView clear.
fn check_flags<'a>(ctx: &mut PreflightContext<'a>, dict: &'a Dictionary, label: &str) -> bool {
    let raw = dict
        .get("F")
        .and_then(|o| ctx.resolve(o))
        .and_then(Object::as_integer)
        .unwrap_or(0);
    let flags = AnnotationFlags::from_bits_truncate(raw as u32);

    let valid = flags.contains(AnnotationFlags::PRINT)
        && !flags.contains(AnnotationFlags::HIDDEN)
        && !flags.contains(AnnotationFlags::INVISIBLE)
        && !flags.contains(AnnotationFlags::NO_VIEW);
    if !valid {
        ctx.add_error(ValidationError::new(
            ErrorCode::AnnotForbiddenFlag,
            format!("Flags of the {} annotation are invalid", label),
        ));
    }
    valid
}

/// An explicit color requires the document output intent to carry an RGB
/// profile.
fn check_colors(ctx: &mut PreflightContext<'_>, dict: &Dictionary) -> bool {
    if !dict.contains_key("C") {
        return true;
    }
    let rgb = ctx.output_intent().map(|p| p.is_rgb()).unwrap_or(false);
    if !rgb {
        ctx.add_error(ValidationError::new(
            ErrorCode::AnnotForbiddenColor,
            "Annotation uses a color but the output intent profile is not RGB",
        ));
    }
    rgb
}

/// CA, when present, must be exactly 1.0. Absence is fine.
fn check_ca<'a>(ctx: &mut PreflightContext<'a>, dict: &'a Dictionary) -> bool {
    let Some(ca) = dict.get("CA").map(|o| ctx.resolve(o)) else {
        return true;
    };
    match ca.and_then(Object::as_number) {
        Some(v) if v == 1.0 => true,
        Some(v) => {
            ctx.add_error(ValidationError::new(
                ErrorCode::AnnotInvalidCa,
                format!("CA entry is invalid. Expected 1.0 / Read {}", v),
            ));
            false
        }
        None => {
            ctx.add_error(ValidationError::new(
                ErrorCode::AnnotInvalidCa,
                "CA entry is invalid. Expected a number",
            ));
            false
        }
    }
}

/// Appearance check: when AP is present only the N entry is authorized, and
/// N must be a stream. A well-formed N stream recurses into form XObject
/// validation.
///
/// A dictionary that carries D or R gets exactly one finding and the N
/// checks are skipped for it.
fn check_appearance<'a>(ctx: &mut PreflightContext<'a>, dict: &'a Dictionary) -> bool {
    let Some(ap_entry) = dict.get("AP") else {
        return true;
    };
    let Some(ap) = ctx.resolve_dict(ap_entry) else {
        ctx.add_error(ValidationError::new(
            ErrorCode::AnnotInvalidApContent,
            "AP entry is present but is not a dictionary",
        ));
        return false;
    };

    if ap.contains_key("D") || ap.contains_key("R") {
        ctx.add_error(ValidationError::new(
            ErrorCode::AnnotInvalidApContent,
            "Only the N Appearance is authorized",
        ));
        return false;
    }
    let Some(n_entry) = ap.get("N") else {
        ctx.add_error(ValidationError::new(
            ErrorCode::AnnotMissingApN,
            "The N Appearance must be present",
        ));
        return false;
    };
    match ctx.resolve(n_entry) {
        Some(Object::Stream { dict: n_dict, data }) => {
            graphic::validate_form_xobject(ctx, n_entry.as_reference(), n_dict, data)
        }
        Some(_) | None => {
            ctx.add_error(ValidationError::new(
                ErrorCode::AnnotInvalidApContent,
                "The N Appearance must be a Stream",
            ));
            false
        }
    }
}

/// Actions attached to the annotation re-enter the action validation path.
/// Widgets must not carry additional actions at all.
fn check_actions<'a>(
    ctx: &mut PreflightContext<'a>,
    dict: &'a Dictionary,
    kind: AnnotationKind,
) -> bool {
    let mut ok = action::validate_action_entry(ctx, dict);
    if kind == AnnotationKind::Widget && dict.contains_key("AA") {
        ctx.add_error(ValidationError::new(
            ErrorCode::AnnotForbiddenAdditionalAction,
            "A Widget annotation must not have additional actions",
        ));
        ok = false;
    } else {
        ok &= action::validate_additional_actions(ctx, dict);
    }
    ok
}

/// The Popup entry references another annotation, validated through its own
/// factory-selected rule set. The path stack refuses self-referential chains.
fn check_popup<'a>(ctx: &mut PreflightContext<'a>, dict: &'a Dictionary) -> bool {
    let Some(popup_entry) = dict.get("Popup") else {
        return true;
    };
    let popup_ref = popup_entry.as_reference();
    match ctx.resolve(popup_entry) {
        Some(Object::Dictionary(popup_dict)) => validate_annotation(ctx, popup_ref, popup_dict),
        _ => {
            ctx.add_error(ValidationError::new(
                ErrorCode::DictionaryInvalid,
                "An Annotation has a Popup entry, but the value is missing or isn't a dictionary",
            ));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtype_table() {
        assert_eq!(AnnotationKind::from_subtype("Link"), AnnotationKind::Link);
        assert_eq!(AnnotationKind::from_subtype("Circle"), AnnotationKind::SquareCircle);
        assert_eq!(AnnotationKind::from_subtype("StrikeOut"), AnnotationKind::Markup);
        assert_eq!(AnnotationKind::from_subtype("Movie"), AnnotationKind::Forbidden);
        assert_eq!(AnnotationKind::from_subtype("3D"), AnnotationKind::Unknown);
    }

    #[test]
    fn test_extra_mandatory_fields() {
        assert_eq!(AnnotationKind::FreeText.extra_mandatory(), &["DA"]);
        assert_eq!(AnnotationKind::Ink.extra_mandatory(), &["InkList"]);
        assert!(AnnotationKind::Link.extra_mandatory().is_empty());
    }

    #[test]
    fn test_flag_word() {
        let flags = AnnotationFlags::from_bits_truncate(4);
        assert!(flags.contains(AnnotationFlags::PRINT));
        assert!(!flags.contains(AnnotationFlags::HIDDEN));

        let flags = AnnotationFlags::from_bits_truncate(6);
        assert!(flags.contains(AnnotationFlags::HIDDEN));
    }
}
