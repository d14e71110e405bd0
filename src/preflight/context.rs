//! Per-run validation state.
//!
//! One [`PreflightContext`] lives exactly as long as one validation run. It
//! owns the findings list, the traversal path stack used for cycle refusal
//! and error locality, the font-container cache and the one-shot output
//! intent lookup. The document itself is shared read-only.

use crate::document::Document;
use crate::object::{Dictionary, Object, ObjectRef};
use crate::preflight::config::PreflightConfiguration;
use crate::preflight::graphic::{self, IccProfileInfo};
use crate::preflight::result::{PreflightResult, ValidationError};
use std::collections::HashMap;

/// Kind of entity currently being validated, recorded on the path stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A page dictionary
    Page,
    /// An annotation dictionary
    Annotation,
    /// An action dictionary
    Action,
    /// A font dictionary
    Font,
    /// A form or image XObject
    XObject,
    /// A resource dictionary
    Resources,
}

/// One frame of the traversal path: what is being validated and, when the
/// entity is an indirect object, its identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathFrame {
    /// Entity kind of this frame
    pub kind: EntityKind,
    /// Object identity, when the entity is an indirect object
    pub id: Option<ObjectRef>,
}

/// Explicit traversal path stack.
///
/// Every push is matched by a pop, including early returns; the stack is
/// empty before and after a top-level validation.
#[derive(Debug, Default)]
pub struct PreflightPath {
    frames: Vec<PathFrame>,
}

impl PreflightPath {
    /// Push a frame unless the same object identity is already an ancestor.
    ///
    /// Returns `false` without pushing when `id` is already on the stack;
    /// the caller reports that as a structural error instead of recursing.
    pub fn push_checked(&mut self, kind: EntityKind, id: Option<ObjectRef>) -> bool {
        if let Some(id) = id {
            if self.frames.iter().any(|f| f.id == Some(id)) {
                return false;
            }
        }
        self.frames.push(PathFrame { kind, id });
        true
    }

    /// Pop the innermost frame.
    pub fn pop(&mut self) {
        self.frames.pop();
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// True between runs and sub-validations at top level.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Mutable state of a single validation run.
pub struct PreflightContext<'a> {
    document: &'a Document,
    config: &'a PreflightConfiguration,
    errors: Vec<ValidationError>,
    path: PreflightPath,
    font_cache: HashMap<ObjectRef, bool>,
    font_cache_hits: usize,
    /// None = not looked up yet; Some(None) = looked up, no usable intent.
    output_intent: Option<Option<IccProfileInfo>>,
    current_page: Option<usize>,
}

impl<'a> PreflightContext<'a> {
    /// Create the context for one run.
    pub fn new(document: &'a Document, config: &'a PreflightConfiguration) -> Self {
        Self {
            document,
            config,
            errors: Vec::new(),
            path: PreflightPath::default(),
            font_cache: HashMap::new(),
            font_cache_hits: 0,
            output_intent: None,
            current_page: None,
        }
    }

    /// The document under validation.
    pub fn document(&self) -> &'a Document {
        self.document
    }

    /// The active rule-set configuration.
    pub fn config(&self) -> &'a PreflightConfiguration {
        self.config
    }

    /// Append a finding, stamping it with the current page when it carries
    /// none of its own. Never fails; the list never loses an entry.
    pub fn add_error(&mut self, mut error: ValidationError) {
        if error.page.is_none() {
            error.page = self.current_page;
        }
        log::debug!("finding: {}", error);
        self.errors.push(error);
    }

    /// Findings recorded so far.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Enter a sub-validation. See [`PreflightPath::push_checked`].
    pub fn push_checked(&mut self, kind: EntityKind, id: Option<ObjectRef>) -> bool {
        self.path.push_checked(kind, id)
    }

    /// Leave a sub-validation.
    pub fn pop(&mut self) {
        self.path.pop();
    }

    /// Current traversal depth; zero at top level.
    pub fn path_depth(&self) -> usize {
        self.path.depth()
    }

    /// Resolve an object through the document, tolerating dangling references.
    pub fn resolve(&self, obj: &'a Object) -> Option<&'a Object> {
        self.document.resolve(obj)
    }

    /// Resolve an entry as a dictionary (streams included).
    pub fn resolve_dict(&self, obj: &'a Object) -> Option<&'a Dictionary> {
        self.document.resolve_dict(obj)
    }

    /// Set or clear the page index stamped onto new findings.
    pub fn set_current_page(&mut self, page: Option<usize>) {
        self.current_page = page;
    }

    /// Page index currently being validated.
    pub fn current_page(&self) -> Option<usize> {
        self.current_page
    }

    /// Run `build` at most once per distinct font object identity and cache
    /// its boolean outcome for the rest of the run.
    pub fn font_cache_get_or_insert<F>(&mut self, id: ObjectRef, build: F) -> bool
    where
        F: FnOnce(&mut Self) -> bool,
    {
        if let Some(cached) = self.font_cache.get(&id) {
            self.font_cache_hits += 1;
            log::debug!("font cache hit for {}", id);
            return *cached;
        }
        let outcome = build(self);
        self.font_cache.insert(id, outcome);
        outcome
    }

    /// Number of font-cache hits so far in this run.
    pub fn font_cache_hits(&self) -> usize {
        self.font_cache_hits
    }

    /// Output-intent ICC profile of the document, looked up once per run.
    pub fn output_intent(&mut self) -> Option<IccProfileInfo> {
        if self.output_intent.is_none() {
            self.output_intent = Some(graphic::find_output_intent(self.document));
        }
        self.output_intent.unwrap_or(None)
    }

    /// Finish the run and hand out the ordered findings.
    pub fn into_result(self) -> PreflightResult {
        PreflightResult {
            errors: self.errors,
        }
    }
}
