//! Core functionality for storing and resolving services.
//!
//! Every key maps to a definition which is either an already realized instance or a lazy entry.
//! Lazy entries hold a producer and a cell for its result: the first successful resolution stores
//! the instance and all later lookups return it. A failed producer leaves the cell empty, so the
//! next request retries.
//!
//! Registration always overwrites. Decorating an entry means fetching its current producer with
//! [Container::raw] and registering a new producer in its place; [Container::extend] is the common
//! case of running a function over the produced instance.

use crate::error::LocatorError;
use crate::instance_provider::{CallbackPtr, InstancePtr, ProducerPtr, ServiceProvider};
use derivative::Derivative;
use fxhash::FxHashMap;
use itertools::Itertools;
use std::cell::{OnceCell, RefCell};
use std::fmt::{Debug, Formatter};
use std::rc::{Rc, Weak};
use tracing::{debug, trace};

type DefinitionMap = RefCell<FxHashMap<String, Definition>>;

#[derive(Derivative)]
#[derivative(Debug)]
struct LazyEntry {
    #[derivative(Debug = "ignore")]
    producer: ProducerPtr,
    instance: OnceCell<InstancePtr>,
}

#[derive(Clone, Debug)]
enum Definition {
    Value(InstancePtr),
    Lazy(Rc<LazyEntry>),
}

impl Definition {
    fn lazy(producer: ProducerPtr) -> Self {
        Self::Lazy(Rc::new(LazyEntry {
            producer,
            instance: OnceCell::new(),
        }))
    }

    fn producer(&self) -> ProducerPtr {
        match self {
            Definition::Value(instance) => {
                let instance = instance.clone();
                Rc::new(move |_: &Container| -> Result<InstancePtr, LocatorError> {
                    Ok(instance.clone())
                })
            }
            Definition::Lazy(entry) => entry.producer.clone(),
        }
    }
}

/// Service locator storing instances and lazy producers under string keys. Cloning a container
/// yields another handle to the same storage.
#[derive(Clone, Default)]
pub struct Container {
    definitions: Rc<DefinitionMap>,
}

impl Container {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an already realized instance.
    pub fn set<T: ToString>(&self, name: T, instance: InstancePtr) {
        let name = name.to_string();
        debug!(name = name.as_str(), "Registering instance");

        self.definitions
            .borrow_mut()
            .insert(name, Definition::Value(instance));
    }

    /// Stores a producer which will be run on the first request for the given name.
    pub fn register<T: ToString>(&self, name: T, producer: ProducerPtr) {
        let name = name.to_string();
        debug!(name = name.as_str(), "Registering lazy producer");

        self.definitions
            .borrow_mut()
            .insert(name, Definition::lazy(producer));
    }

    /// Convenience version of [Container::register] accepting a closure.
    pub fn register_fn<T, F>(&self, name: T, producer: F)
    where
        T: ToString,
        F: Fn(&Container) -> Result<InstancePtr, LocatorError> + 'static,
    {
        self.register(name, Rc::new(producer));
    }

    /// Makes `alias` resolve to whatever `target` resolves to. The target needs to be present at
    /// the time of the call, but its definition can still change later - the alias always follows
    /// the current one and shares its cached instance.
    pub fn alias(&self, alias: &str, target: &str) -> Result<(), LocatorError> {
        if !self.contains(target) {
            return Err(LocatorError::MissingTarget {
                alias: alias.to_string(),
                target: target.to_string(),
            });
        }

        let target = target.to_string();
        self.register_fn(alias, move |container| container.instance(&target));

        Ok(())
    }

    /// Returns the producer currently bound to the given name. Realized instances are exposed as
    /// producers returning them. Calling the producer bypasses the cache.
    pub fn raw(&self, name: &str) -> Result<ProducerPtr, LocatorError> {
        self.definitions
            .borrow()
            .get(name)
            .map(Definition::producer)
            .ok_or_else(|| LocatorError::UnknownService(name.to_string()))
    }

    /// Wraps the current producer for the given name, so that `extension` receives the produced
    /// instance and returns the one which gets stored instead.
    pub fn extend<F>(&self, name: &str, extension: F) -> Result<(), LocatorError>
    where
        F: Fn(InstancePtr, &Container) -> Result<InstancePtr, LocatorError> + 'static,
    {
        let previous = self.raw(name)?;
        self.register_fn(name, move |container| {
            extension(previous(container)?, container)
        });

        Ok(())
    }

    /// Binds the given producer to this container, yielding a callback which can be invoked
    /// without arguments. The callback doesn't keep the container alive.
    pub fn callback(&self, producer: ProducerPtr) -> CallbackPtr {
        let container = self.downgrade();
        Rc::new(move || -> Result<InstancePtr, LocatorError> {
            let container = container.upgrade().ok_or(LocatorError::ContainerDropped)?;
            producer(&container)
        })
    }

    /// Creates a handle which doesn't keep the storage alive.
    pub fn downgrade(&self) -> WeakContainer {
        WeakContainer {
            definitions: Rc::downgrade(&self.definitions),
        }
    }

    /// Returns all registered names, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.definitions.borrow().keys().cloned().sorted().collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.definitions.borrow().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.definitions.borrow().is_empty()
    }
}

impl ServiceProvider for Container {
    fn instance(&self, name: &str) -> Result<InstancePtr, LocatorError> {
        let definition = self
            .definitions
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| LocatorError::UnknownService(name.to_string()))?;

        match definition {
            Definition::Value(instance) => Ok(instance),
            Definition::Lazy(entry) => {
                if let Some(instance) = entry.instance.get() {
                    return Ok(instance.clone());
                }

                trace!(name, "Creating service instance");

                let instance = (entry.producer)(self)?;
                Ok(entry.instance.get_or_init(|| instance).clone())
            }
        }
    }

    #[inline]
    fn contains(&self, name: &str) -> bool {
        self.definitions.borrow().contains_key(name)
    }
}

impl Debug for Container {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.definitions.borrow().iter()).finish()
    }
}

/// Non-owning handle to a [Container].
#[derive(Clone, Debug)]
pub struct WeakContainer {
    definitions: Weak<DefinitionMap>,
}

impl WeakContainer {
    /// Returns the container, if it's still alive.
    pub fn upgrade(&self) -> Option<Container> {
        self.definitions
            .upgrade()
            .map(|definitions| Container { definitions })
    }
}
