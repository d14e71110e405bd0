// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::match_like_matches_macro)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # PDF Preflight
//!
//! Archival conformance validation for parsed PDF documents.
//!
//! ## Core Features
//!
//! - **Non-aborting validation**: every check runs; findings accumulate into
//!   one ordered report instead of stopping at the first problem
//! - **Trailer consistency**: mandatory trailer keys, linearization
//!   dictionaries and first/last revision ID agreement
//! - **Page-level rules**: annotations, actions, fonts, color spaces,
//!   XObjects, graphics states, transparency groups and content streams
//! - **Cycle refusal**: self-referential annotations, actions and page trees
//!   are reported as findings, never recursed into
//! - **Configurable profiles**: processes can be reordered or dropped per
//!   run without touching engine code
//!
//! ## Quick Start
//!
//! ```
//! use pdf_preflight::document::Document;
//! use pdf_preflight::object::{Dictionary, Object, ObjectRef};
//! use pdf_preflight::preflight;
//!
//! let catalog = ObjectRef::new(1, 0);
//! let mut catalog_dict = Dictionary::new();
//! catalog_dict.insert("Type".to_string(), Object::Name("Catalog".to_string()));
//!
//! let mut trailer = Dictionary::new();
//! trailer.insert("Root".to_string(), Object::Reference(catalog));
//!
//! let doc = Document::builder()
//!     .object(catalog, Object::Dictionary(catalog_dict))
//!     .trailer(trailer)
//!     .build();
//!
//! let result = preflight::validate(&doc);
//! for finding in &result.errors {
//!     println!("{}", finding);
//! }
//! ```

pub mod document;
pub mod error;
pub mod object;
pub mod preflight;
pub mod xref;

pub use document::{Document, DocumentBuilder, PageObject};
pub use error::{Error, Result};
pub use object::{Dictionary, Object, ObjectRef};
pub use preflight::{
    validate, validate_with_config, ErrorCategory, ErrorCode, PreflightConfiguration,
    PreflightResult, ProcessName, ValidationError,
};
pub use xref::XrefTable;
