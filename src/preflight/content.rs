//! Content stream replay.
//!
//! A lightweight replay of the page content: the stream is tokenized just
//! far enough to catch font selections (`Tf`) and verify that each selected
//! font exists in the page resources and survives font validation. Encoded
//! streams are skipped; decoding filters is out of scope for this pass and
//! the resource walk already covers the fonts those streams can reach.

use crate::document::PageObject;
use crate::object::{Dictionary, Object};
use crate::preflight::context::PreflightContext;
use crate::preflight::font;
use crate::preflight::result::{ErrorCode, ValidationError};

/// Replay the content streams of one page.
pub fn replay_page<'a>(ctx: &mut PreflightContext<'a>, page: &PageObject<'a>) -> bool {
    let Some(contents_entry) = page.dict.get("Contents") else {
        return true;
    };
    let streams = match ctx.resolve(contents_entry) {
        Some(Object::Stream { dict, data }) => vec![(dict, data)],
        Some(Object::Array(parts)) => {
            let mut streams = Vec::with_capacity(parts.len());
            for part in parts {
                match ctx.resolve(part).and_then(Object::as_stream) {
                    Some(stream) => streams.push(stream),
                    None => {
                        ctx.add_error(ValidationError::new(
                            ErrorCode::ContentStreamError,
                            "A Contents array entry isn't a stream",
                        ));
                        return false;
                    }
                }
            }
            streams
        }
        _ => {
            ctx.add_error(ValidationError::new(
                ErrorCode::ContentStreamError,
                "The Contents entry isn't a stream or an array of streams",
            ));
            return false;
        }
    };

    let resources = page
        .dict
        .get("Resources")
        .and_then(|entry| ctx.resolve_dict(entry));

    let mut ok = true;
    for (stream_dict, data) in streams {
        if stream_dict.contains_key("Filter") {
            log::debug!("skipping encoded content stream on page {}", page.index);
            continue;
        }
        ok &= replay_stream(ctx, resources, data);
    }
    ok
}

/// Scan one raw stream for Tf operators and validate each selected font.
fn replay_stream<'a>(
    ctx: &mut PreflightContext<'a>,
    resources: Option<&'a Dictionary>,
    data: &bytes::Bytes,
) -> bool {
    let mut ok = true;
    let mut last_name: Option<String> = None;
    for token in tokenize(data) {
        match token {
            Token::Name(name) => last_name = Some(name),
            Token::Operator(op) if op == "Tf" => {
                match last_name.take() {
                    Some(font_name) => {
                        ok &= check_font_selection(ctx, resources, &font_name);
                    }
                    None => {
                        ctx.add_error(ValidationError::new(
                            ErrorCode::ContentStreamError,
                            "A Tf operator has no font operand",
                        ));
                        ok = false;
                    }
                }
            }
            Token::Operator(_) => last_name = None,
            Token::Other => {}
        }
    }
    ok
}

fn check_font_selection<'a>(
    ctx: &mut PreflightContext<'a>,
    resources: Option<&'a Dictionary>,
    font_name: &str,
) -> bool {
    let font_entry = resources
        .and_then(|res| res.get("Font"))
        .and_then(|entry| ctx.resolve_dict(entry))
        .and_then(|fonts| fonts.get(font_name));
    let Some(font_entry) = font_entry else {
        ctx.add_error(ValidationError::new(
            ErrorCode::ContentStreamError,
            format!("The font {} is not declared in the page resources", font_name),
        ));
        return false;
    };
    let font_ref = font_entry.as_reference();
    match ctx.resolve(font_entry) {
        Some(Object::Dictionary(font_dict)) => font::validate_font(ctx, font_ref, font_dict),
        _ => {
            ctx.add_error(ValidationError::new(
                ErrorCode::FontDictionaryInvalid,
                format!("The font resource {} isn't a dictionary", font_name),
            ));
            false
        }
    }
}

enum Token {
    Name(String),
    Operator(String),
    Other,
}

/// Split a raw content stream into names, operators and everything else.
/// This is deliberately shallow: strings and inline images are not parsed,
/// only whitespace-delimited tokens are inspected.
fn tokenize(data: &[u8]) -> impl Iterator<Item = Token> + '_ {
    data.split(|b| b.is_ascii_whitespace())
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| {
            if let Some(name) = chunk.strip_prefix(b"/") {
                return match std::str::from_utf8(name) {
                    Ok(name) => Token::Name(name.to_string()),
                    Err(_) => Token::Other,
                };
            }
            if chunk.iter().all(|b| b.is_ascii_alphabetic() || *b == b'*' || *b == b'\'' || *b == b'"')
            {
                return match std::str::from_utf8(chunk) {
                    Ok(op) => Token::Operator(op.to_string()),
                    Err(_) => Token::Other,
                };
            }
            Token::Other
        })
}
