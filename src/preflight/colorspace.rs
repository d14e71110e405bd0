//! Color-space validation.
//!
//! Device color spaces are only legal when the document output intent covers
//! them; ICC-based spaces must carry a plausible component count. Composite
//! spaces (Indexed, Separation, DeviceN) recurse into their base or alternate
//! space with a bounded depth.

use crate::object::Object;
use crate::preflight::context::PreflightContext;
use crate::preflight::result::{ErrorCode, ValidationError};

/// Nesting bound for composite color spaces. Indexed-of-Separation style
/// stacking never goes this deep in real files.
const MAX_COLOR_SPACE_DEPTH: usize = 8;

/// Validate one color-space object (a name or an array form).
pub fn validate_color_space<'a>(ctx: &mut PreflightContext<'a>, obj: &'a Object) -> bool {
    validate_at_depth(ctx, obj, 0)
}

fn validate_at_depth<'a>(ctx: &mut PreflightContext<'a>, obj: &'a Object, depth: usize) -> bool {
    if depth > MAX_COLOR_SPACE_DEPTH {
        ctx.add_error(ValidationError::new(
            ErrorCode::ColorSpaceInvalid,
            "Color space nesting is too deep",
        ));
        return false;
    }
    match ctx.resolve(obj) {
        Some(Object::Name(name)) => check_named_space(ctx, name),
        Some(Object::Array(parts)) => check_array_space(ctx, parts, depth),
        _ => {
            ctx.add_error(ValidationError::new(
                ErrorCode::ColorSpaceInvalid,
                "The color space entry isn't a name or an array",
            ));
            false
        }
    }
}

/// Device spaces are gated on the output intent; calibrated spaces and
/// Pattern carry their own color definition and always pass here.
fn check_named_space(ctx: &mut PreflightContext<'_>, name: &str) -> bool {
    match name {
        "DeviceRGB" | "RGB" => {
            let covered = ctx.output_intent().map(|i| i.is_rgb()).unwrap_or(false);
            if !covered {
                ctx.add_error(ValidationError::new(
                    ErrorCode::ColorSpaceForbidden,
                    "DeviceRGB requires an RGB output intent",
                ));
            }
            covered
        }
        "DeviceCMYK" | "CMYK" => {
            let covered = ctx
                .output_intent()
                .map(|i| i.family == crate::preflight::graphic::ColorFamily::Cmyk)
                .unwrap_or(false);
            if !covered {
                ctx.add_error(ValidationError::new(
                    ErrorCode::ColorSpaceForbidden,
                    "DeviceCMYK requires a CMYK output intent",
                ));
            }
            covered
        }
        "DeviceGray" | "G" => {
            // Any output intent covers gray.
            let covered = ctx.output_intent().is_some();
            if !covered {
                ctx.add_error(ValidationError::new(
                    ErrorCode::ColorSpaceForbidden,
                    "DeviceGray requires an output intent",
                ));
            }
            covered
        }
        "CalRGB" | "CalGray" | "Lab" | "Pattern" => true,
        other => {
            ctx.add_error(ValidationError::new(
                ErrorCode::ColorSpaceInvalid,
                format!("The color space {} is not recognized", other),
            ));
            false
        }
    }
}

fn check_array_space<'a>(
    ctx: &mut PreflightContext<'a>,
    parts: &'a [Object],
    depth: usize,
) -> bool {
    let family = parts
        .first()
        .and_then(|o| ctx.resolve(o))
        .and_then(Object::as_name);
    match family {
        Some("ICCBased") => check_icc_based(ctx, parts),
        Some("Indexed" | "I") => match parts.get(1) {
            Some(base) => validate_at_depth(ctx, base, depth + 1),
            None => {
                ctx.add_error(ValidationError::new(
                    ErrorCode::ColorSpaceInvalid,
                    "The Indexed color space has no base space",
                ));
                false
            }
        },
        Some("Separation" | "DeviceN") => match parts.get(2) {
            Some(alternate) => validate_at_depth(ctx, alternate, depth + 1),
            None => {
                ctx.add_error(ValidationError::new(
                    ErrorCode::ColorSpaceInvalid,
                    "The separation color space has no alternate space",
                ));
                false
            }
        },
        Some("CalRGB" | "CalGray" | "Lab" | "Pattern") => true,
        Some(other) => {
            ctx.add_error(ValidationError::new(
                ErrorCode::ColorSpaceInvalid,
                format!("The color space family {} is not recognized", other),
            ));
            false
        }
        None => {
            ctx.add_error(ValidationError::new(
                ErrorCode::ColorSpaceInvalid,
                "The color space array has no family name",
            ));
            false
        }
    }
}

/// ICC-based spaces carry their profile in a stream whose N entry states the
/// component count.
fn check_icc_based<'a>(ctx: &mut PreflightContext<'a>, parts: &'a [Object]) -> bool {
    let stream = parts.get(1).and_then(|o| ctx.resolve(o));
    let Some(Object::Stream { dict, .. }) = stream else {
        ctx.add_error(ValidationError::new(
            ErrorCode::IccProfileInvalid,
            "The ICCBased color space has no profile stream",
        ));
        return false;
    };
    let components = dict
        .get("N")
        .and_then(|o| ctx.resolve(o))
        .and_then(Object::as_integer);
    match components {
        Some(1 | 3 | 4) => true,
        _ => {
            ctx.add_error(ValidationError::new(
                ErrorCode::IccProfileInvalid,
                "The N entry of an ICC profile stream must be 1, 3 or 4",
            ));
            false
        }
    }
}
