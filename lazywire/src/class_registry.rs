//! Capability lookup turning class names into constructible types.
//!
//! Configuration refers to classes by name. Each name must be known to a [ClassRegistry], which
//! maps it to a zero-argument constructor of one of four kinds:
//!
//! * invokable - constructs the service itself
//! * factory - constructs a [ServiceFactory], which in turn creates the service
//! * delegator - constructs a [DelegatorFactory] wrapping service creation
//! * extension - constructs an [ExtensionFactory] decorating created services
//!
//! Lookups happen lazily, when a service is first requested, so an unknown name only fails the
//! resolution which needed it.
//!
//! ## Static registration
//!
//! Classes can be submitted statically from anywhere in the application and collected with
//! [ClassRegistry::with_registered_classes]:
//!
//! ```
//! use lazywire::class_registry::{submit, ClassDefinition, ClassRegisterer, ClassRegistry};
//!
//! #[derive(Default)]
//! struct Cache;
//!
//! fn cache_class() -> ClassDefinition {
//!     ClassDefinition::invokable::<Cache>("app::Cache")
//! }
//!
//! submit! {
//!     ClassRegisterer { register: cache_class }
//! }
//!
//! fn main() {
//!     assert!(ClassRegistry::with_registered_classes().contains("app::Cache"));
//! }
//! ```

use crate::error::{ClassRole, WiringError};
use derivative::Derivative;
use fxhash::FxHashMap;
use inventory::collect;
pub use inventory::submit;
use lazywire_locator::container::Container;
use lazywire_locator::instance_provider::{CallbackPtr, InstancePtr};
use lazywire_locator::LocatorError;
#[cfg(test)]
use mockall::automock;
use std::rc::Rc;
use tracing::debug;

pub type FactoryPtr = Rc<dyn ServiceFactory>;
pub type DelegatorFactoryPtr = Rc<dyn DelegatorFactory>;
pub type ExtensionFactoryPtr = Rc<dyn ExtensionFactory>;

/// Creates service instances, typically using other services from the container.
#[cfg_attr(test, automock)]
pub trait ServiceFactory {
    fn create(&self, container: &Container) -> Result<InstancePtr, LocatorError>;
}

/// Wraps the creation of a service. The callback runs the previous creation stage - the delegator
/// decides if and when to call it, and returns the instance which should be registered instead.
#[cfg_attr(test, automock)]
pub trait DelegatorFactory {
    fn create(
        &self,
        container: &Container,
        name: &str,
        callback: CallbackPtr,
    ) -> Result<InstancePtr, LocatorError>;
}

/// Decorates an already created service instance, returning its replacement.
#[cfg_attr(test, automock)]
pub trait ExtensionFactory {
    fn extend(
        &self,
        instance: InstancePtr,
        container: &Container,
        name: &str,
    ) -> Result<InstancePtr, LocatorError>;
}

/// Wraps a factory so it can be registered as a service and referenced by name from the
/// `factories` configuration section.
pub fn factory_instance<F: ServiceFactory + 'static>(factory: F) -> InstancePtr {
    Rc::new(Rc::new(factory) as FactoryPtr)
}

/// Zero-argument constructor of a given class kind.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub enum ClassKind {
    Invokable(#[derivative(Debug = "ignore")] Rc<dyn Fn() -> InstancePtr>),
    Factory(#[derivative(Debug = "ignore")] Rc<dyn Fn() -> FactoryPtr>),
    Delegator(#[derivative(Debug = "ignore")] Rc<dyn Fn() -> DelegatorFactoryPtr>),
    Extension(#[derivative(Debug = "ignore")] Rc<dyn Fn() -> ExtensionFactoryPtr>),
}

impl ClassKind {
    pub fn role(&self) -> ClassRole {
        match self {
            ClassKind::Invokable(_) => ClassRole::Invokable,
            ClassKind::Factory(_) => ClassRole::Factory,
            ClassKind::Delegator(_) => ClassRole::Delegator,
            ClassKind::Extension(_) => ClassRole::Extension,
        }
    }
}

/// Named class known to a [ClassRegistry].
#[derive(Clone, Debug)]
pub struct ClassDefinition {
    pub name: String,
    pub kind: ClassKind,
}

impl ClassDefinition {
    pub fn invokable<T: Default + 'static>(name: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            kind: ClassKind::Invokable(Rc::new(|| Rc::new(T::default()) as InstancePtr)),
        }
    }

    pub fn factory<F: ServiceFactory + Default + 'static>(name: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            kind: ClassKind::Factory(Rc::new(|| Rc::new(F::default()) as FactoryPtr)),
        }
    }

    pub fn delegator<D: DelegatorFactory + Default + 'static>(name: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            kind: ClassKind::Delegator(Rc::new(|| Rc::new(D::default()) as DelegatorFactoryPtr)),
        }
    }

    pub fn extension<E: ExtensionFactory + Default + 'static>(name: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            kind: ClassKind::Extension(Rc::new(|| Rc::new(E::default()) as ExtensionFactoryPtr)),
        }
    }
}

/// Statically submitted class, collected by [ClassRegistry::with_registered_classes].
pub struct ClassRegisterer {
    pub register: fn() -> ClassDefinition,
}

collect!(ClassRegisterer);

/// Registry of classes which can be instantiated by name.
#[derive(Clone, Debug, Default)]
pub struct ClassRegistry {
    classes: FxHashMap<String, ClassKind>,
}

impl ClassRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with all statically submitted [ClassRegisterer]s.
    pub fn with_registered_classes() -> Self {
        inventory::iter::<ClassRegisterer>
            .into_iter()
            .map(|registerer| (registerer.register)())
            .fold(Self::new(), Self::with_class)
    }

    /// Adds a class, replacing any previous one with the same name.
    pub fn register(&mut self, definition: ClassDefinition) {
        debug!(
            class = definition.name.as_str(),
            role = %definition.kind.role(),
            "Registering class"
        );

        self.classes.insert(definition.name, definition.kind);
    }

    pub fn with_class(mut self, definition: ClassDefinition) -> Self {
        self.register(definition);
        self
    }

    pub fn with_invokable<T: Default + 'static>(self, name: impl ToString) -> Self {
        self.with_class(ClassDefinition::invokable::<T>(name))
    }

    pub fn with_invokable_fn<F>(self, name: impl ToString, constructor: F) -> Self
    where
        F: Fn() -> InstancePtr + 'static,
    {
        self.with_class(ClassDefinition {
            name: name.to_string(),
            kind: ClassKind::Invokable(Rc::new(constructor)),
        })
    }

    pub fn with_factory<F: ServiceFactory + Default + 'static>(self, name: impl ToString) -> Self {
        self.with_class(ClassDefinition::factory::<F>(name))
    }

    pub fn with_factory_fn<F>(self, name: impl ToString, constructor: F) -> Self
    where
        F: Fn() -> FactoryPtr + 'static,
    {
        self.with_class(ClassDefinition {
            name: name.to_string(),
            kind: ClassKind::Factory(Rc::new(constructor)),
        })
    }

    pub fn with_delegator<D: DelegatorFactory + Default + 'static>(
        self,
        name: impl ToString,
    ) -> Self {
        self.with_class(ClassDefinition::delegator::<D>(name))
    }

    pub fn with_delegator_fn<F>(self, name: impl ToString, constructor: F) -> Self
    where
        F: Fn() -> DelegatorFactoryPtr + 'static,
    {
        self.with_class(ClassDefinition {
            name: name.to_string(),
            kind: ClassKind::Delegator(Rc::new(constructor)),
        })
    }

    pub fn with_extension<E: ExtensionFactory + Default + 'static>(
        self,
        name: impl ToString,
    ) -> Self {
        self.with_class(ClassDefinition::extension::<E>(name))
    }

    pub fn with_extension_fn<F>(self, name: impl ToString, constructor: F) -> Self
    where
        F: Fn() -> ExtensionFactoryPtr + 'static,
    {
        self.with_class(ClassDefinition {
            name: name.to_string(),
            kind: ClassKind::Extension(Rc::new(constructor)),
        })
    }

    /// Checks if there's a class with given name.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Constructs an instance of an invokable class.
    pub fn instantiate(&self, name: &str) -> Result<InstancePtr, WiringError> {
        match self.class(name, ClassRole::Invokable)? {
            ClassKind::Invokable(constructor) => Ok(constructor()),
            _ => Err(Self::incompatible(name, ClassRole::Invokable)),
        }
    }

    /// Constructs a [ServiceFactory].
    pub fn factory(&self, name: &str) -> Result<FactoryPtr, WiringError> {
        match self.class(name, ClassRole::Factory)? {
            ClassKind::Factory(constructor) => Ok(constructor()),
            _ => Err(Self::incompatible(name, ClassRole::Factory)),
        }
    }

    /// Constructs a [DelegatorFactory].
    pub fn delegator(&self, name: &str) -> Result<DelegatorFactoryPtr, WiringError> {
        match self.class(name, ClassRole::Delegator)? {
            ClassKind::Delegator(constructor) => Ok(constructor()),
            _ => Err(Self::incompatible(name, ClassRole::Delegator)),
        }
    }

    /// Constructs an [ExtensionFactory].
    pub fn extension(&self, name: &str) -> Result<ExtensionFactoryPtr, WiringError> {
        match self.class(name, ClassRole::Extension)? {
            ClassKind::Extension(constructor) => Ok(constructor()),
            _ => Err(Self::incompatible(name, ClassRole::Extension)),
        }
    }

    fn class(&self, name: &str, role: ClassRole) -> Result<&ClassKind, WiringError> {
        self.classes
            .get(name)
            .ok_or_else(|| WiringError::UnknownClass {
                role,
                class: name.to_string(),
            })
    }

    fn incompatible(name: &str, expected: ClassRole) -> WiringError {
        WiringError::IncompatibleClass {
            class: name.to_string(),
            expected,
        }
    }
}
