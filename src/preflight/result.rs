//! Validation findings and run results.
//!
//! Conformance findings are plain data: a code from a closed taxonomy, a
//! human-readable message and the page the engine was on when the finding was
//! recorded. They are appended in traversal order and never deduplicated —
//! multiplicity is meaningful (one finding per invalid annotation, not one
//! per kind of problem).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad class of a finding, following the engine's recovery policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Wrong node type, missing mandatory key, unresolved reference,
    /// malformed cross-reference data
    Structural,
    /// Forbidden key present, value outside the single allowed value,
    /// profile mismatch
    Policy,
    /// Unrecognized subtype — degraded handling, not fatal
    Extension,
    /// Byte-level failure caught at a sub-check boundary and converted into
    /// a single finding
    Io,
}

/// Error codes for conformance violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Generic structural errors
    /// Document has no catalog
    NoCatalog,
    /// A dictionary entry is missing or has an unusable value
    DictionaryInvalid,
    /// An indirect reference does not resolve
    UnresolvedReference,
    /// An entry has the wrong object type
    WrongType,
    /// An object was re-entered while already being validated
    RecursionDetected,

    // Trailer / cross-reference errors
    /// Trailer data could not be located or read
    TrailerSyntax,
    /// Trailer is missing the ID entry
    TrailerMissingId,
    /// Trailer is missing the Size entry
    TrailerMissingSize,
    /// Trailer is missing the Root entry
    TrailerMissingRoot,
    /// A trailer entry has the wrong type
    TrailerTypeMismatch,
    /// Trailer contains the Encrypt entry
    TrailerEncryptPresent,
    /// First and last revision IDs do not match
    TrailerIdInconsistent,
    /// Linearization dictionary is missing mandatory keys
    LinearizedDictInvalid,

    // Page tree errors
    /// Catalog has no usable page tree root
    MissingPageTree,

    // Annotation errors
    /// Mandatory annotation field missing
    AnnotMissingFields,
    /// Annotation flag word has a forbidden combination
    AnnotForbiddenFlag,
    /// Annotation CA value differs from 1.0
    AnnotInvalidCa,
    /// Annotation color clashes with the output intent profile
    AnnotForbiddenColor,
    /// Appearance dictionary carries a disallowed entry
    AnnotInvalidApContent,
    /// Appearance dictionary is missing the N entry
    AnnotMissingApN,
    /// Annotation subtype forbidden by the profile
    AnnotForbiddenSubtype,
    /// Annotation carries forbidden additional actions
    AnnotForbiddenAdditionalAction,

    // Action errors
    /// Mandatory action key missing
    ActionMissingKey,
    /// Action type forbidden by the profile
    ActionForbidden,
    /// Action entry has an invalid value
    ActionInvalidType,

    // Font errors
    /// Mandatory font dictionary fields missing
    FontDictionaryInvalid,
    /// Font descriptor missing or incomplete
    FontDescriptorInvalid,
    /// Font program not embedded
    FontNotEmbedded,
    /// Embedded font program unreadable
    FontProgramDamaged,
    /// Font encoding invalid for the profile
    FontEncodingInvalid,
    /// ToUnicode entry is not a CMap stream
    FontToUnicodeInvalid,
    /// Glyph index mapping invalid
    FontCidMapInvalid,
    /// Descendant font entry invalid
    FontDescendantInvalid,

    // Graphic errors
    /// Transparency group attribute present
    TransparencyGroupForbidden,
    /// Graphic object missing fields or unreadable
    GraphicInvalid,
    /// PostScript content forbidden
    PostScriptForbidden,
    /// Soft mask forbidden
    SoftMaskForbidden,
    /// LZW compression forbidden
    LzwForbidden,
    /// Graphics state parameter outside the allowed values
    ExtGStateInvalid,
    /// Content stream could not be replayed
    ContentStreamError,

    // Color errors
    /// Device color space clashes with the output intent
    ColorSpaceForbidden,
    /// ICC profile data invalid
    IccProfileInvalid,
    /// Color space entry malformed or unknown
    ColorSpaceInvalid,

    // Extension
    /// Unrecognized subtype, common checks only
    UnknownSubtype,
}

impl ErrorCode {
    /// The recovery class this code belongs to.
    pub fn category(&self) -> ErrorCategory {
        use ErrorCode::*;
        match self {
            UnknownSubtype => ErrorCategory::Extension,
            TrailerSyntax | FontProgramDamaged | ContentStreamError | GraphicInvalid => {
                ErrorCategory::Io
            }
            TrailerEncryptPresent
            | AnnotForbiddenFlag
            | AnnotInvalidCa
            | AnnotForbiddenColor
            | AnnotForbiddenSubtype
            | AnnotForbiddenAdditionalAction
            | ActionForbidden
            | FontNotEmbedded
            | TransparencyGroupForbidden
            | PostScriptForbidden
            | SoftMaskForbidden
            | LzwForbidden
            | ExtGStateInvalid
            | ColorSpaceForbidden => ErrorCategory::Policy,
            _ => ErrorCategory::Structural,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            ErrorCode::NoCatalog => "SYNTAX-001",
            ErrorCode::DictionaryInvalid => "SYNTAX-002",
            ErrorCode::UnresolvedReference => "SYNTAX-003",
            ErrorCode::WrongType => "SYNTAX-004",
            ErrorCode::RecursionDetected => "SYNTAX-005",
            ErrorCode::TrailerSyntax => "TRAILER-001",
            ErrorCode::TrailerMissingId => "TRAILER-002",
            ErrorCode::TrailerMissingSize => "TRAILER-003",
            ErrorCode::TrailerMissingRoot => "TRAILER-004",
            ErrorCode::TrailerTypeMismatch => "TRAILER-005",
            ErrorCode::TrailerEncryptPresent => "TRAILER-006",
            ErrorCode::TrailerIdInconsistent => "TRAILER-007",
            ErrorCode::LinearizedDictInvalid => "TRAILER-008",
            ErrorCode::MissingPageTree => "PAGE-001",
            ErrorCode::AnnotMissingFields => "ANNOT-001",
            ErrorCode::AnnotForbiddenFlag => "ANNOT-002",
            ErrorCode::AnnotInvalidCa => "ANNOT-003",
            ErrorCode::AnnotForbiddenColor => "ANNOT-004",
            ErrorCode::AnnotInvalidApContent => "ANNOT-005",
            ErrorCode::AnnotMissingApN => "ANNOT-006",
            ErrorCode::AnnotForbiddenSubtype => "ANNOT-007",
            ErrorCode::AnnotForbiddenAdditionalAction => "ANNOT-008",
            ErrorCode::ActionMissingKey => "ACTION-001",
            ErrorCode::ActionForbidden => "ACTION-002",
            ErrorCode::ActionInvalidType => "ACTION-003",
            ErrorCode::FontDictionaryInvalid => "FONT-001",
            ErrorCode::FontDescriptorInvalid => "FONT-002",
            ErrorCode::FontNotEmbedded => "FONT-003",
            ErrorCode::FontProgramDamaged => "FONT-004",
            ErrorCode::FontEncodingInvalid => "FONT-005",
            ErrorCode::FontToUnicodeInvalid => "FONT-006",
            ErrorCode::FontCidMapInvalid => "FONT-007",
            ErrorCode::FontDescendantInvalid => "FONT-008",
            ErrorCode::TransparencyGroupForbidden => "GRAPHIC-001",
            ErrorCode::GraphicInvalid => "GRAPHIC-002",
            ErrorCode::PostScriptForbidden => "GRAPHIC-003",
            ErrorCode::SoftMaskForbidden => "GRAPHIC-004",
            ErrorCode::LzwForbidden => "GRAPHIC-005",
            ErrorCode::ExtGStateInvalid => "GRAPHIC-006",
            ErrorCode::ContentStreamError => "GRAPHIC-007",
            ErrorCode::ColorSpaceForbidden => "COLOR-001",
            ErrorCode::IccProfileInvalid => "COLOR-002",
            ErrorCode::ColorSpaceInvalid => "COLOR-003",
            ErrorCode::UnknownSubtype => "EXT-001",
        };
        write!(f, "{}", code)
    }
}

/// A single conformance finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Error code from the closed taxonomy.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Zero-based page index the engine was validating, if any.
    pub page: Option<usize>,
}

impl ValidationError {
    /// Create a new finding without page information.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            page: None,
        }
    }

    /// Set the page index.
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(page) = self.page {
            write!(f, " (page {})", page)?;
        }
        Ok(())
    }
}

/// Result of a preflight run.
///
/// The document is compliant if and only if the error list is empty after
/// every process ran to completion. A non-empty list is a regular outcome,
/// not a failure of the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreflightResult {
    /// All findings in traversal order.
    pub errors: Vec<ValidationError>,
}

impl PreflightResult {
    /// True if no finding was recorded.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Findings with the given code.
    pub fn errors_with_code(&self, code: ErrorCode) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(move |e| e.code == code)
    }

    /// Serialize the result to a JSON report.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write the JSON report to a writer.
    pub fn write_json<W: std::io::Write>(&self, writer: W) -> crate::error::Result<()> {
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| crate::error::Error::Io(e.into()))
    }
}
