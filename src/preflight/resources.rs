//! Resource dictionary validation.
//!
//! A resource dictionary names the fonts, XObjects and graphics states a
//! content stream may invoke. Each category is walked independently so one
//! damaged entry never hides findings from its siblings. Nested form
//! XObjects re-enter this module through their own Resources entry with the
//! cycle guard active.

use crate::object::{Dictionary, Object, ObjectRef};
use crate::preflight::context::{EntityKind, PreflightContext};
use crate::preflight::font;
use crate::preflight::graphic;
use crate::preflight::result::{ErrorCode, ValidationError};

/// Validate one resource dictionary.
pub fn validate_resources<'a>(
    ctx: &mut PreflightContext<'a>,
    id: Option<ObjectRef>,
    dict: &'a Dictionary,
) -> bool {
    if !ctx.push_checked(EntityKind::Resources, id) {
        ctx.add_error(ValidationError::new(
            ErrorCode::RecursionDetected,
            "Resource dictionary is nested inside itself",
        ));
        return false;
    }

    let mut ok = true;
    ok &= check_fonts(ctx, dict);
    ok &= check_xobjects(ctx, dict);
    ok &= check_graphics_states(ctx, dict);

    ctx.pop();
    ok
}

fn check_fonts<'a>(ctx: &mut PreflightContext<'a>, dict: &'a Dictionary) -> bool {
    let Some(entry) = dict.get("Font") else {
        return true;
    };
    let Some(fonts) = ctx.resolve_dict(entry) else {
        ctx.add_error(ValidationError::new(
            ErrorCode::DictionaryInvalid,
            "The Font entry of a resource dictionary isn't a dictionary",
        ));
        return false;
    };
    let mut ok = true;
    for (name, value) in fonts {
        let font_ref = value.as_reference();
        match ctx.resolve(value) {
            Some(Object::Dictionary(font_dict)) => {
                ok &= font::validate_font(ctx, font_ref, font_dict);
            }
            _ => {
                ctx.add_error(ValidationError::new(
                    ErrorCode::FontDictionaryInvalid,
                    format!("The font resource {} isn't a dictionary", name),
                ));
                ok = false;
            }
        }
    }
    ok
}

fn check_xobjects<'a>(ctx: &mut PreflightContext<'a>, dict: &'a Dictionary) -> bool {
    let Some(entry) = dict.get("XObject") else {
        return true;
    };
    let Some(xobjects) = ctx.resolve_dict(entry) else {
        ctx.add_error(ValidationError::new(
            ErrorCode::DictionaryInvalid,
            "The XObject entry of a resource dictionary isn't a dictionary",
        ));
        return false;
    };
    let mut ok = true;
    for (name, value) in xobjects {
        let xobject_ref = value.as_reference();
        match ctx.resolve(value) {
            Some(Object::Stream { dict: xdict, data }) => {
                let subtype = xdict
                    .get("Subtype")
                    .and_then(|o| ctx.resolve(o))
                    .and_then(Object::as_name);
                match subtype {
                    Some("Image") => {
                        ok &= graphic::validate_image_xobject(ctx, xobject_ref, xdict, data);
                    }
                    Some("Form") => {
                        ok &= graphic::validate_form_xobject(ctx, xobject_ref, xdict, data);
                    }
                    Some("PS") => {
                        ctx.add_error(ValidationError::new(
                            ErrorCode::PostScriptForbidden,
                            format!("The XObject resource {} is a PostScript XObject", name),
                        ));
                        ok = false;
                    }
                    Some(other) => {
                        ctx.add_error(ValidationError::new(
                            ErrorCode::UnknownSubtype,
                            format!("The XObject subtype {} is not recognized", other),
                        ));
                        ok = false;
                    }
                    None => {
                        ctx.add_error(ValidationError::new(
                            ErrorCode::GraphicInvalid,
                            format!("The XObject resource {} has no subtype", name),
                        ));
                        ok = false;
                    }
                }
            }
            _ => {
                ctx.add_error(ValidationError::new(
                    ErrorCode::GraphicInvalid,
                    format!("The XObject resource {} isn't a stream", name),
                ));
                ok = false;
            }
        }
    }
    ok
}

fn check_graphics_states<'a>(ctx: &mut PreflightContext<'a>, dict: &'a Dictionary) -> bool {
    let Some(entry) = dict.get("ExtGState") else {
        return true;
    };
    let Some(states) = ctx.resolve_dict(entry) else {
        ctx.add_error(ValidationError::new(
            ErrorCode::DictionaryInvalid,
            "The ExtGState entry of a resource dictionary isn't a dictionary",
        ));
        return false;
    };
    let mut ok = true;
    for (name, value) in states {
        match ctx.resolve_dict(value) {
            Some(state) => {
                ok &= graphic::validate_extgstate(ctx, state);
            }
            None => {
                ctx.add_error(ValidationError::new(
                    ErrorCode::ExtGStateInvalid,
                    format!("The graphics state {} isn't a dictionary", name),
                ));
                ok = false;
            }
        }
    }
    ok
}
