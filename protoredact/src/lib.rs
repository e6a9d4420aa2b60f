//! Annotation-driven redaction for protobuf messages.
//!
//! Fields are marked sensitive in the schema with a custom field option:
//!
//! ```text
//! message SensitiveData { repeated string map_keys_to_redact = 1; }
//! extend google.protobuf.FieldOptions { SensitiveData sensitive_data = 50101; }
//!
//! message Payment {
//!   string card_number = 1 [(sensitive_data) = {}];
//!   map<string, string> headers = 2 [(sensitive_data) = { map_keys_to_redact: "authorization" }];
//! }
//! ```
//!
//! At runtime a [`Redactor`] walks a [`prost_reflect::DynamicMessage`] and
//! hands every present, annotated field to a [`RedactionHandler`] together
//! with the message that owns it. The default handler, [`ClearField`], clears
//! the field. Maps annotated with a key list keep their keys and only have the
//! values under the listed keys reset.
//!
//! Key rules:
//! - Only present fields are visited; implicit defaults are never redacted.
//! - Extension fields set on a message are classified and walked as well.
//! - Redaction is in place and single pass. A handler error stops it and is
//!   returned unchanged; the message is then partially redacted and must be
//!   discarded.
//! - A redactor without an annotation or handler is disabled and does nothing.
//!
//! What this crate does:
//! - reads the annotation from field options ([`Annotation`])
//! - classifies field occurrences ([`Classifier`])
//! - walks messages and dispatches to handlers ([`Redactor`], [`redact`])
//! - provides integrations behind feature flags (`serde`, `slog`)
//!
//! What it does not do:
//! - define what is sensitive; that is the schema author's call
//! - compile schemas or generate code

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::if_not_else,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::needless_ifs,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::enum_glob_use,
    clippy::struct_excessive_bools,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::result_large_err,
    clippy::future_not_send,
    clippy::option_if_let_else,
    clippy::from_over_into,
    clippy::manual_inspect
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

// Module declarations
mod annotation;
mod classification;
mod config;
mod redaction;
#[cfg(feature = "slog")]
pub mod slog;
#[cfg(test)]
mod test_support;

// Re-exports
pub use annotation::{Annotation, AnnotationError, FieldPolicy, FIELD_OPTIONS};
pub use classification::{map_key_text, Classifier};
pub use config::{ConfiguredHandler, RedactionConfig, RedactionMode};
#[cfg(feature = "policy")]
pub use redaction::{KeepConfig, SubstituteHandler, TextRedactionPolicy, REDACTED_PLACEHOLDER};
pub use redaction::{
    redact, ClearField, Path, Redactable, RedactionHandler, Redactor, RedactorBuilder, Step,
};
