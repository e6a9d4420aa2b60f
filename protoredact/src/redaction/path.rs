//! Where the walker currently is.
//!
//! A [`Path`] records the steps from the root message down to the value being
//! visited. It exists for diagnostics: the walker hands the live parent message
//! to handlers directly, so nothing here points into the message.

use std::fmt;

use prost_reflect::{ExtensionDescriptor, FieldDescriptor, MapKey};

use crate::classification::map_key_text;

/// One step of a traversal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Entered a field of the current message.
    Field(FieldDescriptor),
    /// Entered an extension field set on the current message.
    Extension(ExtensionDescriptor),
    /// Entered an element of a repeated field.
    ListIndex(usize),
    /// Entered the value stored under a map key.
    MapEntry(MapKey),
}

impl Step {
    /// The descriptor taken by this step, if the step is a field.
    pub fn field(&self) -> Option<&FieldDescriptor> {
        match self {
            Step::Field(field) => Some(field),
            Step::Extension(_) | Step::ListIndex(_) | Step::MapEntry(_) => None,
        }
    }
}

/// Steps from the root message to the visited value. Empty at the root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path {
    steps: Vec<Step>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    /// The last step taken, if any.
    pub fn last(&self) -> Option<&Step> {
        self.steps.last()
    }

    pub(crate) fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub(crate) fn pop(&mut self) {
        self.steps.pop();
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str("<root>");
        }
        for (position, step) in self.steps.iter().enumerate() {
            match step {
                Step::Field(field) => {
                    if position > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(field.name())?;
                }
                Step::Extension(extension) => {
                    if position > 0 {
                        f.write_str(".")?;
                    }
                    write!(f, "({})", extension.full_name())?;
                }
                Step::ListIndex(index) => write!(f, "[{index}]")?,
                Step::MapEntry(MapKey::String(key)) => write!(f, "[{key:?}]")?,
                Step::MapEntry(key) => write!(f, "[{}]", map_key_text(key))?,
            }
        }
        Ok(())
    }
}
