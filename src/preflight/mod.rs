//! The preflight validation engine.
//!
//! A validation run walks an already-parsed [`Document`](crate::document::Document)
//! and aggregates every conformance finding into a [`PreflightResult`].
//! Checks never abort each other: a finding is recorded and the walk goes
//! on, so one run reports everything it can reach. Two runs over the same
//! document produce the same findings in the same order.

pub mod action;
pub mod annotation;
pub mod colorspace;
pub mod config;
pub mod content;
pub mod context;
pub mod font;
pub mod graphic;
pub mod process;
pub mod resources;
pub mod result;

pub use config::{PreflightConfiguration, ProcessName};
pub use context::PreflightContext;
pub use result::{ErrorCategory, ErrorCode, PreflightResult, ValidationError};

use crate::document::Document;

/// Validate a document with the default archival profile.
pub fn validate(document: &Document) -> PreflightResult {
    validate_with_config(document, &PreflightConfiguration::default())
}

/// Validate a document with an explicit rule-set configuration.
pub fn validate_with_config(
    document: &Document,
    config: &PreflightConfiguration,
) -> PreflightResult {
    let mut ctx = PreflightContext::new(document, config);
    log::info!(
        "starting validation run, {} document processes",
        config.document_processes().len()
    );
    for process in config.document_processes() {
        process::run_document_process(&mut ctx, *process);
        debug_assert_eq!(ctx.path_depth(), 0, "unbalanced traversal path");
    }
    let result = ctx.into_result();
    log::info!("validation run finished with {} findings", result.errors.len());
    result
}
