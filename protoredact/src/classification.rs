//! Deciding which field occurrences are sensitive.
//!
//! The classifier answers one question per field step: should the handler be
//! called for this field? It never mutates a message, with one exception:
//! maps annotated with a key list are redacted entry by entry right here,
//! because a handler only ever sees whole fields.

use std::{
    borrow::Cow,
    collections::{BTreeSet, HashMap},
};

use prost_reflect::{DescriptorPool, ExtensionDescriptor, FieldDescriptor, Kind, MapKey, Value};
use tracing::trace;

use crate::annotation::{Annotation, FieldPolicy};

/// Classifies field occurrences against a single [`Annotation`].
///
/// Built with [`Classifier::indexed`], the policy of every field and extension
/// in the annotation's descriptor pool is resolved up front. Descriptors from
/// other pools are still classified, just without the cache.
#[derive(Clone, Debug)]
pub struct Classifier {
    annotation: Annotation,
    // Annotated descriptors of the annotation's pool, by full name.
    index: Option<HashMap<String, FieldPolicy>>,
}

impl Classifier {
    /// Creates a classifier that reads field options on every lookup.
    pub fn new(annotation: Annotation) -> Self {
        Self {
            annotation,
            index: None,
        }
    }

    /// Creates a classifier with every field policy of the pool resolved once.
    pub fn indexed(annotation: Annotation) -> Self {
        let pool = annotation.extension().parent_pool();
        let fields = pool.all_messages().flat_map(|message| {
            message
                .fields()
                .filter_map(|field| {
                    let policy = annotation.policy_for(&field)?;
                    Some((field.full_name().to_owned(), policy))
                })
                .collect::<Vec<_>>()
        });
        let extensions = pool.all_extensions().filter_map(|extension| {
            let policy = annotation.policy_for_extension(&extension)?;
            Some((extension.full_name().to_owned(), policy))
        });
        let index = fields.chain(extensions).collect();
        Self {
            annotation,
            index: Some(index),
        }
    }

    /// The annotation this classifier matches.
    pub fn annotation(&self) -> &Annotation {
        &self.annotation
    }

    /// Returns the policy of `field`, or `None` if it is not annotated.
    pub fn policy(&self, field: &FieldDescriptor) -> Option<FieldPolicy> {
        self.cached(field.parent_pool(), field.full_name())
            .unwrap_or_else(|| self.annotation.policy_for(field))
    }

    /// Returns the policy of an extension field, or `None` if it is not
    /// annotated.
    pub fn extension_policy(&self, extension: &ExtensionDescriptor) -> Option<FieldPolicy> {
        self.cached(extension.parent_pool(), extension.full_name())
            .unwrap_or_else(|| self.annotation.policy_for_extension(extension))
    }

    // `None` when the descriptor cannot be answered from the index.
    fn cached(&self, pool: &DescriptorPool, full_name: &str) -> Option<Option<FieldPolicy>> {
        let index = self.index.as_ref()?;
        if pool != self.annotation.extension().parent_pool() {
            return None;
        }
        Some(index.get(full_name).cloned())
    }

    /// Decides whether the handler must be called for this occurrence.
    ///
    /// `field` is `None` for steps without a descriptor (the root, list
    /// elements, map values); those are never sensitive.
    ///
    /// For a map narrowed to a key list, matching entries in `value` are reset
    /// to the map's zero value and `false` is returned: the field as a whole
    /// needs no further action.
    pub fn is_sensitive(&self, field: Option<&FieldDescriptor>, value: &mut Value) -> bool {
        let Some(field) = field else {
            return false;
        };
        apply(self.policy(field), field.full_name(), &field.kind(), value)
    }

    /// Same as [`Classifier::is_sensitive`], for an extension field.
    pub fn is_sensitive_extension(
        &self,
        extension: &ExtensionDescriptor,
        value: &mut Value,
    ) -> bool {
        apply(
            self.extension_policy(extension),
            extension.full_name(),
            &extension.kind(),
            value,
        )
    }
}

fn apply(policy: Option<FieldPolicy>, full_name: &str, kind: &Kind, value: &mut Value) -> bool {
    match policy {
        None => false,
        Some(FieldPolicy::Field) => true,
        Some(FieldPolicy::MapKeys(keys)) => {
            if let Value::Map(entries) = value {
                reset_map_entries(full_name, kind, entries, &keys);
            }
            false
        }
    }
}

/// Renders a map key the way key lists spell it.
///
/// Integer keys are written in decimal, bool keys as `true` / `false`.
pub fn map_key_text(key: &MapKey) -> Cow<'_, str> {
    match key {
        MapKey::String(value) => Cow::Borrowed(value),
        MapKey::Bool(value) => Cow::Owned(value.to_string()),
        MapKey::I32(value) => Cow::Owned(value.to_string()),
        MapKey::I64(value) => Cow::Owned(value.to_string()),
        MapKey::U32(value) => Cow::Owned(value.to_string()),
        MapKey::U64(value) => Cow::Owned(value.to_string()),
    }
}

// Keys are never inserted or removed; only values are replaced.
fn reset_map_entries(
    full_name: &str,
    kind: &Kind,
    entries: &mut HashMap<MapKey, Value>,
    keys: &BTreeSet<String>,
) {
    let Kind::Message(entry) = kind else {
        return;
    };
    let zero = Value::default_value_for_field(&entry.map_entry_value_field());
    for (key, value) in entries.iter_mut() {
        let text = map_key_text(key);
        if keys.contains(text.as_ref()) {
            trace!(field = full_name, key = %text, "resetting map entry");
            *value = zero.clone();
        }
    }
}
