//! What happens to a field once it is known to be sensitive.
//!
//! A handler receives the live parent message and the descriptor of the
//! sensitive field, and mutates the parent in place. The walker calls it once
//! per sensitive occurrence and descends into whatever the handler leaves
//! behind.

use std::convert::Infallible;

use prost_reflect::{DynamicMessage, ExtensionDescriptor, FieldDescriptor};
#[cfg(feature = "policy")]
use prost_reflect::{Kind, Value};

#[cfg(feature = "policy")]
use super::policy::TextRedactionPolicy;

/// Caller-supplied mutation applied to every sensitive field occurrence.
///
/// Implemented for any `Fn(&mut DynamicMessage, &FieldDescriptor) -> Result<(), E>`,
/// so closures can be passed directly to [`super::RedactorBuilder::handler`].
///
/// An error aborts the traversal and is returned to the caller unchanged. The
/// message is left partially redacted in that case.
///
/// Sensitive extension fields go through [`RedactionHandler::redact_extension`],
/// which clears them unless a handler overrides it.
pub trait RedactionHandler {
    /// Error returned by a failed mutation.
    type Error;

    /// Redacts `field` on `parent`.
    fn redact_field(
        &self,
        parent: &mut DynamicMessage,
        field: &FieldDescriptor,
    ) -> Result<(), Self::Error>;

    /// Redacts the extension field `extension` set on `parent`.
    fn redact_extension(
        &self,
        parent: &mut DynamicMessage,
        extension: &ExtensionDescriptor,
    ) -> Result<(), Self::Error> {
        parent.clear_extension(extension);
        Ok(())
    }
}

impl<F, E> RedactionHandler for F
where
    F: Fn(&mut DynamicMessage, &FieldDescriptor) -> Result<(), E>,
{
    type Error = E;

    fn redact_field(&self, parent: &mut DynamicMessage, field: &FieldDescriptor) -> Result<(), E> {
        self(parent, field)
    }
}

/// The default handler: clears the field to its absent state.
///
/// Repeated and map fields become empty, messages and explicit-presence
/// scalars become unset, oneof members leave their oneof unset.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClearField;

impl RedactionHandler for ClearField {
    type Error = Infallible;

    fn redact_field(
        &self,
        parent: &mut DynamicMessage,
        field: &FieldDescriptor,
    ) -> Result<(), Infallible> {
        parent.clear_field(field);
        Ok(())
    }
}

/// Rewrites string fields with a [`TextRedactionPolicy`] and clears the rest.
///
/// Singular strings, every element of repeated strings and every value of a
/// string-valued map are rewritten, keeping the field present. Any other kind
/// of field is cleared like [`ClearField`] does.
#[cfg(feature = "policy")]
#[derive(Clone, Debug, Default)]
pub struct SubstituteHandler {
    policy: TextRedactionPolicy,
}

#[cfg(feature = "policy")]
impl SubstituteHandler {
    pub fn new(policy: TextRedactionPolicy) -> Self {
        Self { policy }
    }

    /// Substitutes a fixed placeholder.
    pub fn placeholder(placeholder: impl Into<String>) -> Self {
        Self::new(TextRedactionPolicy::full_with(placeholder.into()))
    }

    pub fn policy(&self) -> &TextRedactionPolicy {
        &self.policy
    }

    fn substitute(&self, value: &mut Value) {
        match value {
            Value::String(text) => *text = self.policy.apply_to(text),
            Value::List(items) => items.iter_mut().for_each(|item| self.substitute(item)),
            Value::Map(entries) => entries.values_mut().for_each(|item| self.substitute(item)),
            _ => {}
        }
    }
}

#[cfg(feature = "policy")]
impl RedactionHandler for SubstituteHandler {
    type Error = Infallible;

    fn redact_field(
        &self,
        parent: &mut DynamicMessage,
        field: &FieldDescriptor,
    ) -> Result<(), Infallible> {
        if holds_strings(&field.kind(), field.is_map()) {
            self.substitute(parent.get_field_mut(field));
        } else {
            parent.clear_field(field);
        }
        Ok(())
    }

    fn redact_extension(
        &self,
        parent: &mut DynamicMessage,
        extension: &ExtensionDescriptor,
    ) -> Result<(), Infallible> {
        if holds_strings(&extension.kind(), extension.is_map()) {
            self.substitute(parent.get_extension_mut(extension));
        } else {
            parent.clear_extension(extension);
        }
        Ok(())
    }
}

#[cfg(feature = "policy")]
fn holds_strings(kind: &Kind, is_map: bool) -> bool {
    match kind {
        Kind::String => true,
        Kind::Message(entry) if is_map => {
            matches!(entry.map_entry_value_field().kind(), Kind::String)
        }
        _ => false,
    }
}
