//! Trailer and cross-reference consistency.
//!
//! Linearized files carry their identity in two places, so the check works
//! on the first and last revision trailers (or, from PDF 1.5 on, the first
//! and last cross-reference streams): the mandatory-key walk runs on the
//! first one, and the first document ID must be carried forward by the
//! last. Non-linearized files only get the mandatory-key walk over the
//! current trailer.

use crate::object::{Dictionary, Object};
use crate::preflight::context::PreflightContext;
use crate::preflight::result::{ErrorCode, ValidationError};

/// Keys a linearization parameter dictionary must carry.
const LINEARIZATION_KEYS: [&str; 6] = ["L", "H", "O", "E", "N", "T"];

/// Run the trailer consistency process.
pub fn run(ctx: &mut PreflightContext<'_>) -> bool {
    match find_linearization_dictionary(ctx) {
        Some(lin_dict) => {
            let mut ok = check_linearized_dictionary(ctx, lin_dict);
            if ctx.document().version() <= (1, 4) {
                ok &= check_revision_trailers(ctx);
            } else {
                ok &= check_xref_streams(ctx);
            }
            ok
        }
        None => check_main_trailer(ctx, ctx.document().trailer()),
    }
}

/// The linearization parameter dictionary is the first dictionary object in
/// the file carrying a Linearized entry.
fn find_linearization_dictionary<'a>(ctx: &PreflightContext<'a>) -> Option<&'a Dictionary> {
    ctx.document()
        .objects()
        .filter_map(|(r, o)| Some((r, o.as_dict()?)))
        .filter(|(_, d)| d.contains_key("Linearized"))
        .min_by_key(|(r, _)| ctx.document().xref().offset(*r).unwrap_or(u64::MAX))
        .map(|(_, d)| d)
}

/// All missing linearization keys collapse into one finding.
fn check_linearized_dictionary(ctx: &mut PreflightContext<'_>, dict: &Dictionary) -> bool {
    let missing: Vec<&str> = LINEARIZATION_KEYS
        .iter()
        .copied()
        .filter(|key| !dict.contains_key(*key))
        .collect();
    if missing.is_empty() {
        return true;
    }
    ctx.add_error(ValidationError::new(
        ErrorCode::LinearizedDictInvalid,
        format!(
            "The linearization dictionary is missing {}",
            missing.join(", ")
        ),
    ));
    false
}

/// Pre-1.5 linearized files: compare the first and last revision trailers.
fn check_revision_trailers(ctx: &mut PreflightContext<'_>) -> bool {
    let xref = ctx.document().xref();
    let (Some(first), Some(last)) = (xref.first_trailer(), xref.last_trailer()) else {
        ctx.add_error(ValidationError::new(
            ErrorCode::TrailerSyntax,
            "There are no trailer in the PDF file",
        ));
        return false;
    };
    let mut ok = check_main_trailer(ctx, first);
    if !ids_are_consistent(ctx, first, last) {
        ctx.add_error(ValidationError::new(
            ErrorCode::TrailerIdInconsistent,
            "The ID of the first revision is not carried by the last revision",
        ));
        ok = false;
    }
    ok
}

/// From 1.5 on the trailer data lives in cross-reference streams; the first
/// and last stream in the file take the roles of the revision trailers.
fn check_xref_streams(ctx: &mut PreflightContext<'_>) -> bool {
    let streams = ctx.document().objects_of_type("XRef");
    if streams.is_empty() {
        // Hybrid files keep classic trailers next to a 1.5+ version header.
        return check_revision_trailers(ctx);
    }
    let mut located: Vec<(u64, &Dictionary)> = Vec::with_capacity(streams.len());
    for (r, dict) in streams {
        match ctx.document().xref().offset(r) {
            Some(offset) => located.push((offset, dict)),
            None => {
                ctx.add_error(ValidationError::new(
                    ErrorCode::TrailerSyntax,
                    format!("The cross-reference stream {} has no byte offset", r),
                ));
                return false;
            }
        }
    }
    let first = located
        .iter()
        .min_by_key(|(offset, _)| *offset)
        .map(|(_, d)| *d);
    let last = located
        .iter()
        .max_by_key(|(offset, _)| *offset)
        .map(|(_, d)| *d);
    let (Some(first), Some(last)) = (first, last) else {
        return false;
    };
    let mut ok = check_main_trailer(ctx, first);
    if !ids_are_consistent(ctx, first, last) {
        ctx.add_error(ValidationError::new(
            ErrorCode::TrailerIdInconsistent,
            "The ID of the first cross-reference stream is not carried by the last",
        ));
        ok = false;
    }
    ok
}

/// Mandatory-key walk over one trailer dictionary. Each missing key gets its
/// own finding; present keys are type-checked after resolution.
fn check_main_trailer(ctx: &mut PreflightContext<'_>, trailer: &Dictionary) -> bool {
    let mut ok = true;
    let document = ctx.document();

    match trailer.get("ID") {
        None => {
            ctx.add_error(ValidationError::new(
                ErrorCode::TrailerMissingId,
                "The ID entry of the trailer is missing",
            ));
            ok = false;
        }
        Some(id) => {
            if document.resolve(id).and_then(Object::as_array).is_none() {
                ctx.add_error(ValidationError::new(
                    ErrorCode::TrailerTypeMismatch,
                    "The ID entry of the trailer isn't an array",
                ));
                ok = false;
            }
        }
    }
    match trailer.get("Size") {
        None => {
            ctx.add_error(ValidationError::new(
                ErrorCode::TrailerMissingSize,
                "The Size entry of the trailer is missing",
            ));
            ok = false;
        }
        Some(size) => {
            if document.resolve(size).and_then(Object::as_integer).is_none() {
                ctx.add_error(ValidationError::new(
                    ErrorCode::TrailerTypeMismatch,
                    "The Size entry of the trailer isn't an integer",
                ));
                ok = false;
            }
        }
    }
    match trailer.get("Root") {
        None => {
            ctx.add_error(ValidationError::new(
                ErrorCode::TrailerMissingRoot,
                "The Root entry of the trailer is missing",
            ));
            ok = false;
        }
        Some(root) => {
            if !matches!(document.resolve(root), Some(Object::Dictionary(_))) {
                ctx.add_error(ValidationError::new(
                    ErrorCode::TrailerTypeMismatch,
                    "The Root entry of the trailer isn't the catalog dictionary",
                ));
                ok = false;
            }
        }
    }
    if trailer.contains_key("Encrypt") {
        ctx.add_error(ValidationError::new(
            ErrorCode::TrailerEncryptPresent,
            "The trailer must not carry an Encrypt entry",
        ));
        ok = false;
    }
    if let Some(prev) = trailer.get("Prev") {
        if document.resolve(prev).and_then(Object::as_integer).is_none() {
            ctx.add_error(ValidationError::new(
                ErrorCode::TrailerTypeMismatch,
                "The Prev entry of the trailer isn't an integer",
            ));
            ok = false;
        }
    }
    if let Some(info) = trailer.get("Info") {
        if !matches!(document.resolve(info), Some(Object::Dictionary(_))) {
            ctx.add_error(ValidationError::new(
                ErrorCode::TrailerTypeMismatch,
                "The Info entry of the trailer isn't a dictionary",
            ));
            ok = false;
        }
    }
    ok
}

/// True when every ID part of the first trailer also appears in the last.
/// Either side may omit the entry without a finding; the mandatory-key walk
/// already covers absence where it matters.
fn ids_are_consistent(
    ctx: &PreflightContext<'_>,
    first: &Dictionary,
    last: &Dictionary,
) -> bool {
    let document = ctx.document();
    let resolve_id = |trailer: &Dictionary| -> Option<Vec<Vec<u8>>> {
        let entry = trailer.get("ID")?;
        let parts = document.resolve(entry)?.as_array()?;
        parts
            .iter()
            .map(|p| {
                document
                    .resolve(p)
                    .and_then(Object::as_string)
                    .map(<[u8]>::to_vec)
            })
            .collect()
    };
    let (first_id, last_id) = match (first.get("ID"), last.get("ID")) {
        (None, _) | (_, None) => return true,
        _ => match (resolve_id(first), resolve_id(last)) {
            (Some(f), Some(l)) => (f, l),
            _ => return false,
        },
    };
    let mut remaining = last_id;
    first_id.iter().all(|part| {
        match remaining.iter().position(|p| p == part) {
            Some(at) => {
                remaining.swap_remove(at);
                true
            }
            None => false,
        }
    })
}
