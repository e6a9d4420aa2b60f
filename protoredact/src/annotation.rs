//! The "sensitive" field option and how it is read.
//!
//! An annotation is a protobuf extension of `google.protobuf.FieldOptions`.
//! Its presence on a field marks every occurrence of that field as sensitive.
//! For map fields the extension may additionally carry a list of map keys,
//! which narrows redaction to the entries stored under those keys.
//!
//! The list of keys can come from two places:
//!
//! | Extension type | Keys are read from |
//! |----------------|--------------------|
//! | message with a `repeated string map_keys_to_redact` field | that field |
//! | `repeated string` | the extension values themselves |
//! | anything else (e.g. `bool`) | nowhere; the whole map is redacted |
//!
//! This module does not walk messages. It turns descriptor options into a
//! [`FieldPolicy`], which the classifier caches per descriptor.

use std::{collections::BTreeSet, sync::Arc};

use prost_reflect::{
    DescriptorPool, DynamicMessage, ExtensionDescriptor, FieldDescriptor, Kind, Value,
};

/// Full name of the message every annotation must extend.
pub const FIELD_OPTIONS: &str = "google.protobuf.FieldOptions";

/// Errors raised while resolving an annotation from a descriptor pool.
///
/// These only happen when a [`crate::Redactor`] is being set up. Redaction
/// itself never produces an `AnnotationError`.
#[derive(Debug, thiserror::Error)]
pub enum AnnotationError {
    /// No extension with this full name exists in the pool.
    #[error("extension `{name}` not found in descriptor pool")]
    NotFound { name: String },

    /// The extension exists but does not extend field options.
    #[error("extension `{extension}` extends `{extendee}`, expected `{FIELD_OPTIONS}`")]
    WrongExtendee { extension: String, extendee: String },

    /// A payload field was requested but the extension is not message typed.
    #[error("extension `{extension}` is not message typed and cannot carry a payload field")]
    PayloadNotMessage { extension: String },

    /// The requested payload field does not exist on the extension message.
    #[error("payload field `{field}` not found on extension `{extension}`")]
    MissingPayloadField { extension: String, field: String },

    /// The requested payload field exists but is not `repeated string`.
    #[error("payload field `{field}` must be `repeated string`")]
    InvalidPayloadField { field: String },
}

/// What a single annotated field asks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldPolicy {
    /// The whole field occurrence is sensitive.
    Field,
    /// Only the map entries under these keys are sensitive.
    MapKeys(Arc<BTreeSet<String>>),
}

#[derive(Clone, Debug)]
enum KeySource {
    None,
    Extension,
    PayloadField(String),
}

/// A resolved sensitivity annotation.
///
/// Cheap to clone; the descriptor it wraps is reference counted.
#[derive(Clone, Debug)]
pub struct Annotation {
    extension: ExtensionDescriptor,
    keys: KeySource,
}

impl Annotation {
    /// Payload field looked up by [`Annotation::new`] on message-typed extensions.
    pub const DEFAULT_MAP_KEYS_FIELD: &'static str = "map_keys_to_redact";

    /// Wraps `extension`, discovering where map keys are stored.
    pub fn new(extension: ExtensionDescriptor) -> Result<Self, AnnotationError> {
        check_extendee(&extension)?;
        let keys = match extension.kind() {
            Kind::String if extension.is_list() => KeySource::Extension,
            Kind::Message(payload) if !extension.is_list() => payload
                .get_field_by_name(Self::DEFAULT_MAP_KEYS_FIELD)
                .filter(is_string_list)
                .map_or(KeySource::None, |field| {
                    KeySource::PayloadField(field.name().to_owned())
                }),
            _ => KeySource::None,
        };
        Ok(Self { extension, keys })
    }

    /// Wraps `extension`, reading map keys from the named payload field.
    pub fn with_map_keys_field(
        extension: ExtensionDescriptor,
        field: &str,
    ) -> Result<Self, AnnotationError> {
        check_extendee(&extension)?;
        let Kind::Message(payload) = extension.kind() else {
            return Err(AnnotationError::PayloadNotMessage {
                extension: extension.full_name().to_owned(),
            });
        };
        let Some(payload_field) = payload.get_field_by_name(field) else {
            return Err(AnnotationError::MissingPayloadField {
                extension: extension.full_name().to_owned(),
                field: field.to_owned(),
            });
        };
        if !is_string_list(&payload_field) {
            return Err(AnnotationError::InvalidPayloadField {
                field: payload_field.full_name().to_owned(),
            });
        }
        Ok(Self {
            extension,
            keys: KeySource::PayloadField(field.to_owned()),
        })
    }

    /// Looks up the extension `name` (fully qualified) in `pool`.
    pub fn from_pool(pool: &DescriptorPool, name: &str) -> Result<Self, AnnotationError> {
        let extension = pool
            .get_extension_by_name(name)
            .ok_or_else(|| AnnotationError::NotFound {
                name: name.to_owned(),
            })?;
        Self::new(extension)
    }

    /// The extension this annotation is bound to.
    pub fn extension(&self) -> &ExtensionDescriptor {
        &self.extension
    }

    /// Returns `true` if `field` carries this annotation.
    pub fn is_present_on(&self, field: &FieldDescriptor) -> bool {
        field.options().has_extension(&self.extension)
    }

    /// Resolves the policy of `field`, or `None` when it is not annotated.
    ///
    /// Non-map fields, and map fields with an empty key list, resolve to
    /// [`FieldPolicy::Field`].
    pub fn policy_for(&self, field: &FieldDescriptor) -> Option<FieldPolicy> {
        self.resolve(&field.options(), field.is_map())
    }

    /// Resolves the policy of an extension field set on a message.
    pub fn policy_for_extension(&self, extension: &ExtensionDescriptor) -> Option<FieldPolicy> {
        self.resolve(&extension.options(), extension.is_map())
    }

    fn resolve(&self, options: &DynamicMessage, is_map: bool) -> Option<FieldPolicy> {
        if !options.has_extension(&self.extension) {
            return None;
        }
        if !is_map {
            return Some(FieldPolicy::Field);
        }
        let keys = self.map_keys(&options.get_extension(&self.extension));
        if keys.is_empty() {
            Some(FieldPolicy::Field)
        } else {
            Some(FieldPolicy::MapKeys(Arc::new(keys)))
        }
    }

    fn map_keys(&self, payload: &Value) -> BTreeSet<String> {
        match &self.keys {
            KeySource::None => BTreeSet::new(),
            KeySource::Extension => strings(payload),
            KeySource::PayloadField(name) => payload
                .as_message()
                .and_then(|message| message.get_field_by_name(name))
                .map(|list| strings(&list))
                .unwrap_or_default(),
        }
    }
}

fn check_extendee(extension: &ExtensionDescriptor) -> Result<(), AnnotationError> {
    let extendee = extension.containing_message();
    if extendee.full_name() == FIELD_OPTIONS {
        Ok(())
    } else {
        Err(AnnotationError::WrongExtendee {
            extension: extension.full_name().to_owned(),
            extendee: extendee.full_name().to_owned(),
        })
    }
}

fn is_string_list(field: &FieldDescriptor) -> bool {
    field.is_list() && matches!(field.kind(), Kind::String)
}

fn strings(value: &Value) -> BTreeSet<String> {
    value
        .as_list()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{Annotation, AnnotationError, FieldPolicy};
    use crate::test_support::{field, pool, SECRET, SENSITIVE_DATA};

    #[test]
    fn resolves_annotation_by_name() {
        let annotation = Annotation::from_pool(&pool(), SENSITIVE_DATA).unwrap();
        assert_eq!(annotation.extension().full_name(), SENSITIVE_DATA);
    }

    #[test]
    fn unknown_extension_is_reported() {
        let err = Annotation::from_pool(&pool(), "protoredact.test.nope").unwrap_err();
        assert!(matches!(err, AnnotationError::NotFound { .. }));
        assert_eq!(
            err.to_string(),
            "extension `protoredact.test.nope` not found in descriptor pool"
        );
    }

    #[test]
    fn extension_of_message_options_is_rejected() {
        let err = Annotation::from_pool(&pool(), "protoredact.test.audited").unwrap_err();
        match err {
            AnnotationError::WrongExtendee { extendee, .. } => {
                assert_eq!(extendee, "google.protobuf.MessageOptions");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn explicit_payload_field_must_exist() {
        let extension = pool().get_extension_by_name(SENSITIVE_DATA).unwrap();
        let err = Annotation::with_map_keys_field(extension, "keys").unwrap_err();
        assert!(matches!(err, AnnotationError::MissingPayloadField { .. }));
    }

    #[test]
    fn explicit_payload_field_needs_message_extension() {
        let extension = pool().get_extension_by_name(SECRET).unwrap();
        let err = Annotation::with_map_keys_field(extension, "map_keys_to_redact").unwrap_err();
        assert!(matches!(err, AnnotationError::PayloadNotMessage { .. }));
    }

    #[test]
    fn unannotated_field_has_no_policy() {
        let annotation = Annotation::from_pool(&pool(), SENSITIVE_DATA).unwrap();
        assert_eq!(annotation.policy_for(&field("Record", "field_int64")), None);
        assert!(!annotation.is_present_on(&field("Record", "entries")));
    }

    #[test]
    fn scalar_and_message_fields_resolve_to_whole_field() {
        let annotation = Annotation::from_pool(&pool(), SENSITIVE_DATA).unwrap();
        for name in ["field_string_sensitive", "entries_sensitive", "owner_sensitive", "pin"] {
            assert_eq!(
                annotation.policy_for(&field("Record", name)),
                Some(FieldPolicy::Field),
                "{name}"
            );
        }
    }

    #[test]
    fn map_with_empty_payload_resolves_to_whole_field() {
        let annotation = Annotation::from_pool(&pool(), SENSITIVE_DATA).unwrap();
        assert_eq!(
            annotation.policy_for(&field("Entry", "sensitive_map")),
            Some(FieldPolicy::Field)
        );
    }

    #[test]
    fn map_payload_keys_are_collected() {
        let annotation = Annotation::from_pool(&pool(), SENSITIVE_DATA).unwrap();
        let Some(FieldPolicy::MapKeys(keys)) = annotation.policy_for(&field("Record", "headers"))
        else {
            panic!("headers should carry a key list");
        };
        assert_eq!(
            keys.iter().map(String::as_str).collect::<Vec<_>>(),
            ["authorization", "cookie"]
        );
    }

    #[test]
    fn repeated_string_extension_supplies_its_own_keys() {
        let annotation = Annotation::from_pool(&pool(), "protoredact.test.masked_keys").unwrap();
        let Some(FieldPolicy::MapKeys(keys)) = annotation.policy_for(&field("Record", "tags"))
        else {
            panic!("tags should carry a key list");
        };
        assert!(keys.contains("owner"));
    }

    #[test]
    fn bool_marker_never_narrows_a_map() {
        let annotation = Annotation::from_pool(&pool(), SECRET).unwrap();
        assert_eq!(
            annotation.policy_for(&field("Record", "blob_secret")),
            Some(FieldPolicy::Field)
        );
        assert_eq!(annotation.policy_for(&field("Record", "headers")), None);
    }

    #[test]
    fn extension_fields_carry_their_own_options() {
        let annotation = Annotation::from_pool(&pool(), SENSITIVE_DATA).unwrap();
        let extension = |name: &str| {
            pool()
                .get_extension_by_name(&format!("protoredact.test.{name}"))
                .unwrap()
        };
        assert_eq!(
            annotation.policy_for_extension(&extension("token_ext")),
            Some(FieldPolicy::Field)
        );
        assert_eq!(annotation.policy_for_extension(&extension("secret_ext")), None);
    }
}
