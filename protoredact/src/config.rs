//! Declarative redactor setup.
//!
//! A [`RedactionConfig`] names the annotation by its fully qualified extension
//! name and picks a handler mode. With the `serde` feature it can be read from
//! any serde format:
//!
//! ```json
//! { "annotation": "acme.options.sensitive", "mode": { "substitute": { "placeholder": "***" } } }
//! ```
//!
//! Leaving `annotation` out builds a disabled redactor. That is the explicit
//! off switch, not an error.

use std::convert::Infallible;

use prost_reflect::{DescriptorPool, DynamicMessage, ExtensionDescriptor, FieldDescriptor};

use crate::{
    annotation::{Annotation, AnnotationError},
    redaction::{ClearField, RedactionHandler, Redactor},
};
#[cfg(feature = "policy")]
use crate::redaction::SubstituteHandler;

/// Which built-in handler a configured redactor uses.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RedactionMode {
    /// Clear sensitive fields.
    #[default]
    Clear,
    /// Replace strings with `placeholder`, clear everything else.
    #[cfg(feature = "policy")]
    Substitute { placeholder: String },
}

/// Settings for building a [`Redactor`] against a descriptor pool.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct RedactionConfig {
    /// Fully qualified name of the `FieldOptions` extension.
    pub annotation: Option<String>,
    /// Payload field holding map keys; discovered automatically when unset.
    pub map_keys_field: Option<String>,
    pub mode: RedactionMode,
}

impl RedactionConfig {
    /// Resolves the annotation in `pool` and builds the redactor.
    pub fn build(
        &self,
        pool: &DescriptorPool,
    ) -> Result<Redactor<ConfiguredHandler>, AnnotationError> {
        let Some(name) = self.annotation.as_deref() else {
            return Ok(Redactor::disabled());
        };
        let annotation = match self.map_keys_field.as_deref() {
            None => Annotation::from_pool(pool, name)?,
            Some(field) => {
                let extension = pool.get_extension_by_name(name).ok_or_else(|| {
                    AnnotationError::NotFound {
                        name: name.to_owned(),
                    }
                })?;
                Annotation::with_map_keys_field(extension, field)?
            }
        };
        let handler = match &self.mode {
            RedactionMode::Clear => ConfiguredHandler::Clear(ClearField),
            #[cfg(feature = "policy")]
            RedactionMode::Substitute { placeholder } => {
                ConfiguredHandler::Substitute(SubstituteHandler::placeholder(placeholder.clone()))
            }
        };
        Ok(Redactor::builder()
            .annotation(annotation)
            .handler(handler)
            .build())
    }
}

/// Handler chosen by a [`RedactionMode`].
#[derive(Clone, Debug)]
pub enum ConfiguredHandler {
    Clear(ClearField),
    #[cfg(feature = "policy")]
    Substitute(SubstituteHandler),
}

impl RedactionHandler for ConfiguredHandler {
    type Error = Infallible;

    fn redact_field(
        &self,
        parent: &mut DynamicMessage,
        field: &FieldDescriptor,
    ) -> Result<(), Infallible> {
        match self {
            ConfiguredHandler::Clear(handler) => handler.redact_field(parent, field),
            #[cfg(feature = "policy")]
            ConfiguredHandler::Substitute(handler) => handler.redact_field(parent, field),
        }
    }

    fn redact_extension(
        &self,
        parent: &mut DynamicMessage,
        extension: &ExtensionDescriptor,
    ) -> Result<(), Infallible> {
        match self {
            ConfiguredHandler::Clear(handler) => handler.redact_extension(parent, extension),
            #[cfg(feature = "policy")]
            ConfiguredHandler::Substitute(handler) => handler.redact_extension(parent, extension),
        }
    }
}
