//! Text substitution policies for string fields.
//!
//! Policies are pure string transformations used by
//! [`super::SubstituteHandler`]. They never decide what is sensitive.

use std::borrow::Cow;

/// Default placeholder used for full redaction.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

/// Keeps a prefix and a suffix visible and masks everything between them.
///
/// Operates on Unicode scalar values. When the visible spans cover the whole
/// value, the value is returned unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeepConfig {
    visible_prefix: usize,
    visible_suffix: usize,
    mask_char: char,
}

impl KeepConfig {
    /// Keeps only the first `count` characters.
    #[must_use]
    pub fn first(count: usize) -> Self {
        Self::both(count, 0)
    }

    /// Keeps only the last `count` characters.
    #[must_use]
    pub fn last(count: usize) -> Self {
        Self::both(0, count)
    }

    /// Keeps `prefix` leading and `suffix` trailing characters.
    #[must_use]
    pub fn both(prefix: usize, suffix: usize) -> Self {
        Self {
            visible_prefix: prefix,
            visible_suffix: suffix,
            mask_char: '*',
        }
    }

    /// Uses `mask_char` for the hidden middle.
    #[must_use]
    pub fn with_mask_char(mut self, mask_char: char) -> Self {
        self.mask_char = mask_char;
        self
    }

    fn apply_to(&self, value: &str) -> String {
        let total = value.chars().count();
        if self.visible_prefix.saturating_add(self.visible_suffix) >= total {
            return value.to_owned();
        }
        let hidden_end = total - self.visible_suffix;
        value
            .chars()
            .enumerate()
            .map(|(position, ch)| {
                if position < self.visible_prefix || position >= hidden_end {
                    ch
                } else {
                    self.mask_char
                }
            })
            .collect()
    }
}

/// How a sensitive string is rewritten.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextRedactionPolicy {
    /// Replace the entire value with a fixed placeholder.
    Full {
        /// The placeholder text to use.
        placeholder: Cow<'static, str>,
    },
    /// Keep configured segments visible while masking everything else.
    Keep(KeepConfig),
}

impl TextRedactionPolicy {
    /// [`TextRedactionPolicy::Full`] with [`REDACTED_PLACEHOLDER`].
    #[must_use]
    pub fn default_full() -> Self {
        Self::full_with(REDACTED_PLACEHOLDER)
    }

    /// [`TextRedactionPolicy::Full`] with a custom placeholder.
    #[must_use]
    pub fn full_with<P>(placeholder: P) -> Self
    where
        P: Into<Cow<'static, str>>,
    {
        Self::Full {
            placeholder: placeholder.into(),
        }
    }

    /// Keeps only the last `count` characters in clear text.
    #[must_use]
    pub fn keep_last(count: usize) -> Self {
        Self::Keep(KeepConfig::last(count))
    }

    /// Keeps only the first `count` characters in clear text.
    #[must_use]
    pub fn keep_first(count: usize) -> Self {
        Self::Keep(KeepConfig::first(count))
    }

    /// Applies the policy to `value`. Total: never fails.
    #[must_use]
    pub fn apply_to(&self, value: &str) -> String {
        match self {
            TextRedactionPolicy::Full { placeholder } => placeholder.clone().into_owned(),
            TextRedactionPolicy::Keep(config) => config.apply_to(value),
        }
    }
}

impl Default for TextRedactionPolicy {
    fn default() -> Self {
        Self::default_full()
    }
}
