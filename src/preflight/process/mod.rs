//! Validation processes.
//!
//! Document-level processes run once per document; page-level processes are
//! driven by the page-tree walk. Dispatch is by [`ProcessName`], so a
//! configuration can reorder or drop processes without touching the engine.

pub mod page;
pub mod page_tree;
pub mod trailer;

use crate::preflight::config::ProcessName;
use crate::preflight::context::PreflightContext;

/// Run one document-level process. Page-level names are skipped with a
/// warning; they only make sense under the page-tree walk.
pub fn run_document_process(ctx: &mut PreflightContext<'_>, process: ProcessName) -> bool {
    match process {
        ProcessName::Trailer => trailer::run(ctx),
        ProcessName::PageTree => page_tree::run(ctx),
        other => {
            log::warn!("{:?} is not a document-level process, skipping", other);
            true
        }
    }
}
