//! Adapters for emitting redacted messages through `slog`.
//!
//! This module connects [`crate::Redactor`] with `slog` by providing a
//! `slog::Value` that serializes the *redacted* message as structured JSON via
//! `slog`'s nested-value support. Field names are the proto field names.
//!
//! It is responsible for:
//! - Ensuring the logged representation is taken after redaction, never from
//!   the original message.
//! - Avoiding fallible logging APIs: redaction and serialization failures are
//!   represented as placeholder strings rather than propagated as errors.
//!
//! It does not configure `slog` or decide what is sensitive.

use prost_reflect::{DynamicMessage, SerializeOptions};
use serde_json::Value as JsonValue;
use slog::{Key, Record, Result as SlogResult, Serializer, Value as SlogValue};

use crate::redaction::{RedactionHandler, Redactor};

/// Emitted instead of the message when the handler fails.
pub const REDACTION_FAILED: &str = "Failed to redact value";

/// Emitted instead of the message when JSON conversion fails.
pub const SERIALIZATION_FAILED: &str = "Failed to serialize redacted value";

/// A `slog::Value` holding an already redacted message as JSON.
#[derive(Clone, Debug)]
pub struct RedactedJson {
    value: JsonValue,
}

impl RedactedJson {
    fn new(value: JsonValue) -> Self {
        Self { value }
    }

    /// The JSON that will be logged.
    pub fn as_json(&self) -> &JsonValue {
        &self.value
    }
}

impl SlogValue for RedactedJson {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        let nested = slog::Serde(self.value.clone());
        SlogValue::serialize(&nested, record, key, serializer)
    }
}

/// Converts messages into a `slog::Value` that logs their redacted form.
///
/// ## Example
/// ```ignore
/// use protoredact::slog::IntoRedactedJson;
///
/// info!(logger, "payment received"; "request" => request.into_redacted_json(&redactor));
/// ```
pub trait IntoRedactedJson: Sized {
    /// Redacts `self` with `redactor` and captures the result as JSON.
    ///
    /// If the handler fails, the value is the string [`REDACTION_FAILED`];
    /// the partially redacted message is discarded.
    fn into_redacted_json<H>(self, redactor: &Redactor<H>) -> RedactedJson
    where
        H: RedactionHandler;
}

impl IntoRedactedJson for DynamicMessage {
    fn into_redacted_json<H>(mut self, redactor: &Redactor<H>) -> RedactedJson
    where
        H: RedactionHandler,
    {
        if redactor.redact(&mut self).is_err() {
            return RedactedJson::new(JsonValue::String(REDACTION_FAILED.to_owned()));
        }
        let options = SerializeOptions::new().use_proto_field_name(true);
        let value = self
            .serialize_with_options(serde_json::value::Serializer, &options)
            .unwrap_or_else(|_| JsonValue::String(SERIALIZATION_FAILED.to_owned()));
        RedactedJson::new(value)
    }
}
