//! Traversal, handlers and entry points.
//!
//! This module ties the pieces together:
//!
//! - **`walker`**: depth-first traversal of a live message (`Walker`, internal)
//! - **`path`**: where the walker is (`Path`, `Step`)
//! - **`handler`**: what happens to a sensitive field (`RedactionHandler`, `ClearField`)
//! - **`policy`**: string substitution for `SubstituteHandler`
//! - **`redact`**: application layer (`Redactor`, `redact`, `Redactable`)
//!
//! Deciding *what* is sensitive lives in `crate::classification`.

mod handler;
mod path;
#[cfg(feature = "policy")]
mod policy;
mod redact;
mod walker;

#[cfg(feature = "policy")]
pub use handler::SubstituteHandler;
pub use handler::{ClearField, RedactionHandler};
pub use path::{Path, Step};
#[cfg(feature = "policy")]
pub use policy::{KeepConfig, TextRedactionPolicy, REDACTED_PLACEHOLDER};
pub use redact::{redact, Redactable, Redactor, RedactorBuilder};
