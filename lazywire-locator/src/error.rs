use crate::instance_provider::ErrorPtr;
use thiserror::Error;

/// Errors related to registering and resolving services.
#[derive(Error, Clone, Debug)]
pub enum LocatorError {
    #[error("Cannot find service: {0}")]
    UnknownService(String),
    #[error("Missing target service '{target}' for alias: {alias}")]
    MissingTarget { alias: String, target: String },
    #[error("Service '{name}' cannot be downcast to: {type_name}")]
    IncompatibleService {
        name: String,
        type_name: &'static str,
    },
    #[error("Container was dropped before a deferred callback was invoked")]
    ContainerDropped,
    #[error("Error creating service: {0}")]
    ConstructorError(ErrorPtr),
}
