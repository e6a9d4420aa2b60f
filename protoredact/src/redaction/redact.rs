//! Entry points: the configurable [`Redactor`] and the [`redact`] shortcut.

use std::convert::Infallible;

use prost_reflect::{DynamicMessage, ReflectMessage};
use tracing::debug;

use super::{
    handler::{ClearField, RedactionHandler},
    walker::Walker,
};
use crate::{annotation::Annotation, classification::Classifier};

/// Redacts messages against one annotation with one handler.
///
/// A redactor is immutable once built and can be shared between threads when
/// its handler can. Each call to [`Redactor::redact`] is a single synchronous
/// pass over one message.
///
/// A redactor built without an annotation or without a handler is *disabled*:
/// `redact` returns `Ok(())` and leaves the message untouched. Treat a
/// disabled redactor as if redaction had not been called at all.
#[derive(Clone, Debug)]
pub struct Redactor<H = ClearField> {
    classifier: Option<Classifier>,
    handler: Option<H>,
}

impl Redactor<ClearField> {
    /// Creates a redactor that clears every field carrying `annotation`.
    pub fn new(annotation: Annotation) -> Self {
        Self {
            classifier: Some(Classifier::indexed(annotation)),
            handler: Some(ClearField),
        }
    }

    /// Starts a builder with neither annotation nor handler set.
    pub fn builder() -> RedactorBuilder<ClearField> {
        RedactorBuilder {
            annotation: None,
            handler: None,
        }
    }
}

impl<H> Redactor<H>
where
    H: RedactionHandler,
{
    /// A redactor that never changes anything.
    pub fn disabled() -> Self {
        Self {
            classifier: None,
            handler: None,
        }
    }

    /// Replaces the handler, keeping the annotation.
    pub fn with_handler<H2>(self, handler: H2) -> Redactor<H2>
    where
        H2: RedactionHandler,
    {
        Redactor {
            classifier: self.classifier,
            handler: Some(handler),
        }
    }

    /// Returns `true` if both an annotation and a handler are configured.
    pub fn is_enabled(&self) -> bool {
        self.classifier.is_some() && self.handler.is_some()
    }

    pub fn annotation(&self) -> Option<&Annotation> {
        self.classifier.as_ref().map(Classifier::annotation)
    }

    /// Redacts `message` in place.
    ///
    /// Every present field carrying the annotation is passed to the handler
    /// together with the message that owns it. Map fields whose annotation
    /// lists keys have the values under those keys reset instead.
    ///
    /// # Errors
    ///
    /// Returns the first handler error unchanged. Traversal stops there and
    /// nothing is rolled back: the message may be partially redacted and must
    /// not be used.
    pub fn redact(&self, message: &mut DynamicMessage) -> Result<(), H::Error> {
        let (Some(classifier), Some(handler)) = (&self.classifier, &self.handler) else {
            let descriptor = message.descriptor();
            debug!(
                message = descriptor.full_name(),
                "redaction disabled: no annotation or handler configured"
            );
            return Ok(());
        };
        Walker::new(classifier, handler).walk(message)
    }
}

impl<H> Default for Redactor<H>
where
    H: RedactionHandler,
{
    fn default() -> Self {
        Self::disabled()
    }
}

/// Builder for [`Redactor`]. Either part may be left out, which yields a
/// disabled redactor.
#[derive(Clone, Debug)]
pub struct RedactorBuilder<H> {
    annotation: Option<Annotation>,
    handler: Option<H>,
}

impl<H> RedactorBuilder<H>
where
    H: RedactionHandler,
{
    #[must_use]
    pub fn annotation(mut self, annotation: Annotation) -> Self {
        self.annotation = Some(annotation);
        self
    }

    /// Sets an annotation only if one is given.
    #[must_use]
    pub fn maybe_annotation(mut self, annotation: Option<Annotation>) -> Self {
        self.annotation = annotation;
        self
    }

    #[must_use]
    pub fn handler<H2>(self, handler: H2) -> RedactorBuilder<H2>
    where
        H2: RedactionHandler,
    {
        RedactorBuilder {
            annotation: self.annotation,
            handler: Some(handler),
        }
    }

    pub fn build(self) -> Redactor<H> {
        Redactor {
            classifier: self.annotation.map(Classifier::indexed),
            handler: self.handler,
        }
    }
}

/// Clears every field of `message` carrying `annotation`.
///
/// Resolves field options on the fly; build a [`Redactor`] once when
/// redacting many messages.
///
/// # Errors
///
/// Never fails: the clearing handler is infallible. The `Result` keeps the
/// signature in line with [`Redactor::redact`].
pub fn redact(
    message: &mut DynamicMessage,
    annotation: &Annotation,
) -> Result<(), Infallible> {
    let classifier = Classifier::new(annotation.clone());
    Walker::new(&classifier, &ClearField).walk(message)
}

/// `.redact_with()` and `.redacted()` on messages.
pub trait Redactable: Sized {
    /// Redacts in place with `redactor`.
    fn redact_with<H>(&mut self, redactor: &Redactor<H>) -> Result<(), H::Error>
    where
        H: RedactionHandler;

    /// Returns a cleared copy, leaving `self` untouched.
    #[must_use]
    fn redacted(&self, annotation: &Annotation) -> Self;
}

impl Redactable for DynamicMessage {
    fn redact_with<H>(&mut self, redactor: &Redactor<H>) -> Result<(), H::Error>
    where
        H: RedactionHandler,
    {
        redactor.redact(self)
    }

    fn redacted(&self, annotation: &Annotation) -> Self {
        let mut copy = self.clone();
        if let Err(never) = redact(&mut copy, annotation) {
            match never {}
        }
        copy
    }
}
