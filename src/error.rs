//! Engine-level failures.
//!
//! Only problems that stop the engine itself surface here, such as a
//! reference graph that cannot be walked or a report sink that cannot be
//! written. Conformance findings never travel through this type; they
//! accumulate as [`crate::preflight::ValidationError`] records in the run
//! context.

use crate::object::ObjectRef;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the validation engine itself.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A reference points at an object the cross-reference table does not know
    #[error("dangling reference {0}")]
    DanglingReference(ObjectRef),

    /// Following a reference chain came back to an object already visited
    #[error("reference cycle through {0}")]
    ReferenceCycle(ObjectRef),

    /// A reference chain was longer than the resolver allows
    #[error("reference chain longer than {0} links")]
    ResolveDepthExceeded(u32),

    /// Writing the machine-readable report failed
    #[error("report error: {0}")]
    Io(#[from] std::io::Error),
}
