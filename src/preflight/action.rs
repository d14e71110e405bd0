//! Action validation.
//!
//! Actions hang off annotations, pages and the catalog through the `A`,
//! `OpenAction` and `AA` entries. Each action dictionary is dispatched on its
//! `S` subtype through a static table; chained actions (`Next`) re-enter the
//! same path with the cycle guard active, so self-referential chains are
//! reported instead of recursed into.

use crate::object::{Dictionary, Object, ObjectRef};
use crate::preflight::context::{EntityKind, PreflightContext};
use crate::preflight::result::{ErrorCode, ValidationError};
use std::collections::HashMap;

/// Concrete rule set selected for an action subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Go to a destination in the current document
    GoTo,
    /// Go to a destination in another document
    GoToRemote,
    /// Go to an article thread
    Thread,
    /// Resolve a URI
    Uri,
    /// Hide or show annotations
    Hide,
    /// Named viewer action
    Named,
    /// Submit form data
    Submit,
    /// Subtype forbidden outright by the profile
    Forbidden,
    /// Unrecognized subtype
    Unknown,
}

lazy_static::lazy_static! {
    static ref SUBTYPE_TABLE: HashMap<&'static str, ActionKind> = {
        use ActionKind::*;
        let mut m = HashMap::new();
        m.insert("GoTo", GoTo);
        m.insert("GoToR", GoToRemote);
        m.insert("Thread", Thread);
        m.insert("URI", Uri);
        m.insert("Hide", Hide);
        m.insert("Named", Named);
        m.insert("SubmitForm", Submit);
        // Forbidden for the archival profile.
        m.insert("Launch", Forbidden);
        m.insert("Sound", Forbidden);
        m.insert("Movie", Forbidden);
        m.insert("ResetForm", Forbidden);
        m.insert("ImportData", Forbidden);
        m.insert("JavaScript", Forbidden);
        m
    };
}

const ALLOWED_NAMED_ACTIONS: [&str; 4] = ["NextPage", "PrevPage", "FirstPage", "LastPage"];

impl ActionKind {
    /// Select the rule set for a declared subtype.
    pub fn from_subtype(subtype: &str) -> Self {
        SUBTYPE_TABLE
            .get(subtype)
            .copied()
            .unwrap_or(ActionKind::Unknown)
    }
}

/// Validate the `A` entry of a dictionary, when present.
pub fn validate_action_entry<'a>(ctx: &mut PreflightContext<'a>, dict: &'a Dictionary) -> bool {
    let Some(entry) = dict.get("A") else {
        return true;
    };
    let action_ref = entry.as_reference();
    match ctx.resolve(entry) {
        Some(Object::Dictionary(action)) => validate_action(ctx, action_ref, action),
        _ => {
            ctx.add_error(ValidationError::new(
                ErrorCode::ActionInvalidType,
                "The A entry is missing or isn't an action dictionary",
            ));
            false
        }
    }
}

/// Validate every entry of the `AA` additional-actions dictionary, when
/// present. Callers that forbid `AA` outright check for the key themselves.
pub fn validate_additional_actions<'a>(
    ctx: &mut PreflightContext<'a>,
    dict: &'a Dictionary,
) -> bool {
    let Some(entry) = dict.get("AA") else {
        return true;
    };
    let Some(aa) = ctx.resolve_dict(entry) else {
        ctx.add_error(ValidationError::new(
            ErrorCode::ActionInvalidType,
            "The AA entry isn't a dictionary",
        ));
        return false;
    };
    let mut ok = true;
    for (event, value) in aa {
        let action_ref = value.as_reference();
        match ctx.resolve(value) {
            Some(Object::Dictionary(action)) => {
                ok &= validate_action(ctx, action_ref, action);
            }
            _ => {
                ctx.add_error(ValidationError::new(
                    ErrorCode::ActionInvalidType,
                    format!("The {} additional action isn't an action dictionary", event),
                ));
                ok = false;
            }
        }
    }
    ok
}

/// Validate one action dictionary and its `Next` chain.
pub fn validate_action<'a>(
    ctx: &mut PreflightContext<'a>,
    id: Option<ObjectRef>,
    dict: &'a Dictionary,
) -> bool {
    if !ctx.push_checked(EntityKind::Action, id) {
        ctx.add_error(ValidationError::new(
            ErrorCode::RecursionDetected,
            format!(
                "Action {} appears in its own Next chain",
                id.map(|r| r.to_string()).unwrap_or_default()
            ),
        ));
        return false;
    }

    let subtype = dict
        .get("S")
        .and_then(|o| ctx.resolve(o))
        .and_then(Object::as_name)
        .map(str::to_string);

    let mut ok = match subtype.as_deref() {
        None => {
            ctx.add_error(ValidationError::new(
                ErrorCode::ActionMissingKey,
                "The action dictionary has no S entry",
            ));
            false
        }
        Some(s) => check_subtype_rules(ctx, dict, s),
    };

    ok &= check_next_chain(ctx, dict);
    ctx.pop();
    ok
}

fn check_subtype_rules<'a>(
    ctx: &mut PreflightContext<'a>,
    dict: &'a Dictionary,
    subtype: &str,
) -> bool {
    match ActionKind::from_subtype(subtype) {
        ActionKind::GoTo => require_key(ctx, dict, subtype, "D"),
        ActionKind::GoToRemote => {
            let d = require_key(ctx, dict, subtype, "D");
            let f = require_key(ctx, dict, subtype, "F");
            d && f
        }
        ActionKind::Thread => require_key(ctx, dict, subtype, "D"),
        ActionKind::Uri => check_uri(ctx, dict),
        ActionKind::Hide => check_hide(ctx, dict),
        ActionKind::Named => check_named(ctx, dict),
        ActionKind::Submit => require_key(ctx, dict, subtype, "F"),
        ActionKind::Forbidden => {
            ctx.add_error(ValidationError::new(
                ErrorCode::ActionForbidden,
                format!("The {} action is forbidden", subtype),
            ));
            false
        }
        ActionKind::Unknown => {
            ctx.add_error(ValidationError::new(
                ErrorCode::UnknownSubtype,
                format!("The action type {} is not recognized", subtype),
            ));
            false
        }
    }
}

fn require_key(
    ctx: &mut PreflightContext<'_>,
    dict: &Dictionary,
    subtype: &str,
    key: &str,
) -> bool {
    if dict.contains_key(key) {
        return true;
    }
    ctx.add_error(ValidationError::new(
        ErrorCode::ActionMissingKey,
        format!("The {} entry of the {} action is missing", key, subtype),
    ));
    false
}

/// URI actions need a URI entry holding a string.
fn check_uri<'a>(ctx: &mut PreflightContext<'a>, dict: &'a Dictionary) -> bool {
    match dict.get("URI") {
        None => {
            ctx.add_error(ValidationError::new(
                ErrorCode::ActionMissingKey,
                "The URI entry of the URI action is missing",
            ));
            false
        }
        Some(uri) => match ctx.resolve(uri) {
            Some(Object::String(_)) => true,
            _ => {
                ctx.add_error(ValidationError::new(
                    ErrorCode::ActionInvalidType,
                    "The URI entry of the URI action must be a string",
                ));
                false
            }
        },
    }
}

/// Hide actions need a target and must keep H false.
fn check_hide<'a>(ctx: &mut PreflightContext<'a>, dict: &'a Dictionary) -> bool {
    let mut ok = require_key(ctx, dict, "Hide", "T");
    let hidden = dict
        .get("H")
        .and_then(|o| ctx.resolve(o))
        .and_then(Object::as_bool)
        // H defaults to true, which is exactly the forbidden value.
        .unwrap_or(true);
    if hidden {
        ctx.add_error(ValidationError::new(
            ErrorCode::ActionInvalidType,
            "The H entry of the Hide action must be false",
        ));
        ok = false;
    }
    ok
}

/// Named actions may only trigger simple page navigation.
fn check_named<'a>(ctx: &mut PreflightContext<'a>, dict: &'a Dictionary) -> bool {
    let name = dict
        .get("N")
        .and_then(|o| ctx.resolve(o))
        .and_then(Object::as_name);
    match name {
        Some(n) if ALLOWED_NAMED_ACTIONS.contains(&n) => true,
        Some(n) => {
            ctx.add_error(ValidationError::new(
                ErrorCode::ActionForbidden,
                format!("The named action {} is forbidden", n),
            ));
            false
        }
        None => {
            ctx.add_error(ValidationError::new(
                ErrorCode::ActionMissingKey,
                "The N entry of the Named action is missing or isn't a name",
            ));
            false
        }
    }
}

/// `Next` may hold a single action or an array of actions; each one re-enters
/// the action path with the cycle guard.
fn check_next_chain<'a>(ctx: &mut PreflightContext<'a>, dict: &'a Dictionary) -> bool {
    let Some(next) = dict.get("Next") else {
        return true;
    };
    match ctx.resolve(next) {
        Some(Object::Dictionary(action)) => validate_action(ctx, next.as_reference(), action),
        Some(Object::Array(actions)) => {
            let mut ok = true;
            for entry in actions {
                match ctx.resolve(entry) {
                    Some(Object::Dictionary(action)) => {
                        ok &= validate_action(ctx, entry.as_reference(), action);
                    }
                    _ => {
                        ctx.add_error(ValidationError::new(
                            ErrorCode::ActionInvalidType,
                            "A Next entry isn't an action dictionary",
                        ));
                        ok = false;
                    }
                }
            }
            ok
        }
        _ => {
            ctx.add_error(ValidationError::new(
                ErrorCode::ActionInvalidType,
                "The Next entry must be an action or an array of actions",
            ));
            false
        }
    }
}
