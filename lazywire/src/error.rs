use derive_more::Display;
use lazywire_locator::LocatorError;
use std::rc::Rc;
use thiserror::Error;

/// Kind of class expected when resolving a name through the
/// [ClassRegistry](crate::class_registry::ClassRegistry).
#[derive(Display, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum ClassRole {
    #[display(fmt = "invokable")]
    Invokable,
    #[display(fmt = "factory")]
    Factory,
    #[display(fmt = "delegator")]
    Delegator,
    #[display(fmt = "extension")]
    Extension,
}

/// Errors related to wiring configuration into a container.
#[derive(Error, Clone, Debug)]
pub enum WiringError {
    #[error("Malformed configuration at '{path}': expected {expected}")]
    Shape {
        path: String,
        expected: &'static str,
    },
    #[error("Cannot instantiate unknown {role} class: {class}")]
    UnknownClass { role: ClassRole, class: String },
    #[error("Class {class} cannot be used as {expected}")]
    IncompatibleClass { class: String, expected: ClassRole },
    #[error("Locator error: {0}")]
    Locator(#[from] LocatorError),
}

impl From<WiringError> for LocatorError {
    fn from(value: WiringError) -> Self {
        match value {
            WiringError::Locator(error) => error,
            error => LocatorError::ConstructorError(Rc::new(error)),
        }
    }
}
