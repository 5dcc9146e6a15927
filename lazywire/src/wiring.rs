//! Wiring a [Configuration] into a [Container].
//!
//! [ServiceConfig::configure_container] runs the stages below strictly in this order, each one
//! reading its section of `dependencies`:
//!
//! 1. the whole configuration is stored under [CONFIG_KEY]
//! 2. `services` - pre-built instances, stored as-is
//! 3. `invokables` - classes constructed lazily without arguments
//! 4. `factories` - services created lazily by a factory, given the container
//! 5. `aliases` - keys resolving to the same instance as an existing key
//! 6. `delegators` - chains wrapping the creation of an existing key
//! 7. `extensions` - chains decorating the created instance of an existing key
//!
//! Aliases and decorator chains need their targets to exist when they're registered, which is why
//! they come last. Wiring isn't transactional: when a stage fails, registrations done by earlier
//! stages stay in the container.

mod chain;

use crate::class_registry::{ClassRegistry, FactoryPtr};
use crate::dependencies::Dependencies;
use crate::error::WiringError;
use crate::value::{ConfigValue, Configuration};
use derive_more::Constructor;
use lazywire_locator::container::Container;
use lazywire_locator::instance_provider::{
    InstancePtr, ProducerPtr, ServiceProvider, TypedServiceProvider,
};
use lazywire_locator::LocatorError;
use std::rc::Rc;
use tracing::{debug, enabled, info, Level};

/// Reserved key under which the whole configuration is available after wiring.
pub const CONFIG_KEY: &str = "config";

/// Service configuration which can be applied to a container. Applying it more than once to the
/// same container is not supported.
#[derive(Constructor, Clone, Debug)]
pub struct ServiceConfig {
    config: Rc<Configuration>,
    classes: Rc<ClassRegistry>,
}

impl ServiceConfig {
    /// Registers all configured services in the given container.
    pub fn configure_container(&self, container: &Container) -> Result<(), WiringError> {
        let dependencies = Dependencies::from_config(&self.config)?;

        info!("Configuring service container...");

        // a malformed section is reported by the stage consuming it
        if enabled!(Level::DEBUG) {
            if let Ok(plan) = dependencies.plan() {
                debug!(?plan, "Planned registrations");
            }
        }

        self.inject_config(container);
        self.inject_services(container, &dependencies)?;
        self.inject_invokables(container, &dependencies)?;
        self.inject_factories(container, &dependencies)?;
        self.inject_aliases(container, &dependencies)?;
        self.inject_delegators(container, &dependencies)?;
        self.inject_extensions(container, &dependencies)?;

        info!(services = container.len(), "Service container configured");

        Ok(())
    }

    fn inject_config(&self, container: &Container) {
        container.set(CONFIG_KEY, self.config.clone());
    }

    fn inject_services(
        &self,
        container: &Container,
        dependencies: &Dependencies,
    ) -> Result<(), WiringError> {
        for (name, value) in dependencies.services()? {
            let instance = match value {
                ConfigValue::Instance(instance) => instance.clone(),
                value => Rc::new(value.clone()) as InstancePtr,
            };

            container.set(name, instance);
        }

        Ok(())
    }

    fn inject_invokables(
        &self,
        container: &Container,
        dependencies: &Dependencies,
    ) -> Result<(), WiringError> {
        for (name, class) in dependencies.invokables()? {
            debug!(name = &*name, class, "Registering invokable");

            container.register(&*name, self.invokable_producer(class));

            // List entries arrive here keyed by their position, so the constructor ends up under
            // a key like "0" with the class name aliased to it. That entry is most likely
            // unintended, but it is observable and existing configurations may rely on it.
            if name != class {
                container.alias(class, &name)?;
            }
        }

        Ok(())
    }

    fn inject_factories(
        &self,
        container: &Container,
        dependencies: &Dependencies,
    ) -> Result<(), WiringError> {
        for (name, factory) in dependencies.factories()? {
            debug!(name = &*name, factory, "Registering factory");
            container.register(name, self.factory_producer(factory));
        }

        Ok(())
    }

    fn inject_aliases(
        &self,
        container: &Container,
        dependencies: &Dependencies,
    ) -> Result<(), WiringError> {
        for (alias, target) in dependencies.aliases()? {
            debug!(alias = &*alias, target, "Registering alias");
            container.alias(&alias, target)?;
        }

        Ok(())
    }

    fn inject_delegators(
        &self,
        container: &Container,
        dependencies: &Dependencies,
    ) -> Result<(), WiringError> {
        for (name, delegators) in dependencies.delegators()? {
            if delegators.is_empty() {
                continue;
            }

            debug!(name = &*name, ?delegators, "Applying delegators");

            let producer = chain::delegate(
                &self.classes,
                &name,
                container.raw(&name)?,
                &delegators,
            );
            container.register(name, producer);
        }

        Ok(())
    }

    fn inject_extensions(
        &self,
        container: &Container,
        dependencies: &Dependencies,
    ) -> Result<(), WiringError> {
        for (name, extensions) in dependencies.extensions()? {
            debug!(name = &*name, ?extensions, "Applying extensions");

            for extension in extensions {
                container.extend(&name, chain::extension(&self.classes, &name, extension))?;
            }
        }

        Ok(())
    }

    fn invokable_producer(&self, class: &str) -> ProducerPtr {
        let classes = self.classes.clone();
        let class = class.to_string();

        Rc::new(move |_: &Container| -> Result<InstancePtr, LocatorError> {
            Ok(classes.instantiate(&class)?)
        })
    }

    fn factory_producer(&self, factory: &str) -> ProducerPtr {
        let classes = self.classes.clone();
        let factory = factory.to_string();

        Rc::new(move |container: &Container| -> Result<InstancePtr, LocatorError> {
            // a service registered under the factory name takes precedence over a class
            let instance = if container.contains(&factory) {
                container
                    .instance_typed::<FactoryPtr>(&factory)?
                    .as_ref()
                    .clone()
            } else {
                classes.factory(&factory)?
            };

            instance.create(container)
        })
    }
}
