//! Depth-first traversal of a live message.
//!
//! The walker visits every present field in pre-order, asks the classifier
//! about it and hands sensitive ones to the handler together with the message
//! that owns them. Extension fields set on a message are visited after its
//! regular fields. Parents are `&mut` borrows threaded through the recursion,
//! so a handler always mutates the instance being walked, never a copy.

use prost_reflect::{DynamicMessage, ExtensionDescriptor, FieldDescriptor, MapKey, Value};
use tracing::{debug, trace};

use super::{
    handler::RedactionHandler,
    path::{Path, Step},
};
use crate::classification::{map_key_text, Classifier};

pub(crate) struct Walker<'a, H> {
    classifier: &'a Classifier,
    handler: &'a H,
    path: Path,
}

impl<'a, H> Walker<'a, H>
where
    H: RedactionHandler,
{
    pub(crate) fn new(classifier: &'a Classifier, handler: &'a H) -> Self {
        Self {
            classifier,
            handler,
            path: Path::new(),
        }
    }

    /// Walks `root`, stopping at the first handler error.
    pub(crate) fn walk(mut self, root: &mut DynamicMessage) -> Result<(), H::Error> {
        self.walk_message(root)
    }

    fn walk_message(&mut self, message: &mut DynamicMessage) -> Result<(), H::Error> {
        let present: Vec<FieldDescriptor> = message.fields().map(|(field, _)| field).collect();
        for field in present {
            // A handler is free to touch siblings of the field it was given.
            if !message.has_field(&field) {
                continue;
            }
            self.path.push(Step::Field(field.clone()));
            let result = self.visit_field(message, &field);
            self.path.pop();
            result?;
        }
        let extensions: Vec<ExtensionDescriptor> =
            message.extensions().map(|(extension, _)| extension).collect();
        for extension in extensions {
            if !message.has_extension(&extension) {
                continue;
            }
            self.path.push(Step::Extension(extension.clone()));
            let result = self.visit_extension(message, &extension);
            self.path.pop();
            result?;
        }
        Ok(())
    }

    fn visit_field(
        &mut self,
        parent: &mut DynamicMessage,
        field: &FieldDescriptor,
    ) -> Result<(), H::Error> {
        if self
            .classifier
            .is_sensitive(Some(field), parent.get_field_mut(field))
        {
            trace!(path = %self.path, "redacting sensitive field");
            if let Err(err) = self.handler.redact_field(parent, field) {
                debug!(path = %self.path, "redaction handler failed; message is partially redacted");
                return Err(err);
            }
            if !parent.has_field(field) {
                return Ok(());
            }
        }
        self.walk_value(parent.get_field_mut(field))
    }

    fn visit_extension(
        &mut self,
        parent: &mut DynamicMessage,
        extension: &ExtensionDescriptor,
    ) -> Result<(), H::Error> {
        if self
            .classifier
            .is_sensitive_extension(extension, parent.get_extension_mut(extension))
        {
            trace!(path = %self.path, "redacting sensitive extension");
            if let Err(err) = self.handler.redact_extension(parent, extension) {
                debug!(path = %self.path, "redaction handler failed; message is partially redacted");
                return Err(err);
            }
            if !parent.has_extension(extension) {
                return Ok(());
            }
        }
        self.walk_value(parent.get_extension_mut(extension))
    }

    fn walk_value(&mut self, value: &mut Value) -> Result<(), H::Error> {
        match value {
            Value::Message(message) => self.walk_message(message),
            Value::List(items) => {
                for (index, item) in items.iter_mut().enumerate() {
                    if let Value::Message(message) = item {
                        self.path.push(Step::ListIndex(index));
                        let result = self.walk_message(message);
                        self.path.pop();
                        result?;
                    }
                }
                Ok(())
            }
            Value::Map(entries) => {
                let mut keys: Vec<MapKey> = entries.keys().cloned().collect();
                keys.sort_by(|a, b| map_key_text(a).cmp(&map_key_text(b)));
                for key in keys {
                    if let Some(Value::Message(message)) = entries.get_mut(&key) {
                        self.path.push(Step::MapEntry(key));
                        let result = self.walk_message(message);
                        self.path.pop();
                        result?;
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
