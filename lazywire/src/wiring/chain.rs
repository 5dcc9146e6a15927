//! Decorator chain composition. Delegators and extensions are kept apart on purpose: a delegator
//! gets a callback and may never run the stage it wraps, while an extension always gets the
//! already created instance.

use crate::class_registry::ClassRegistry;
use lazywire_locator::container::Container;
use lazywire_locator::instance_provider::{InstancePtr, ProducerPtr};
use lazywire_locator::LocatorError;
use std::rc::Rc;

/// Composes delegators over `base`. The first delegator receives a callback running `base`, each
/// following one a callback running the delegator before it - the last listed is the outermost.
/// Delegator classes are instantiated on each run of the resulting producer.
pub(super) fn delegate(
    classes: &Rc<ClassRegistry>,
    name: &str,
    base: ProducerPtr,
    delegators: &[&str],
) -> ProducerPtr {
    delegators.iter().fold(base, |previous, delegator| {
        let classes = classes.clone();
        let name = name.to_string();
        let delegator = delegator.to_string();

        Rc::new(
            move |container: &Container| -> Result<InstancePtr, LocatorError> {
                let factory = classes.delegator(&delegator)?;
                factory.create(container, &name, container.callback(previous.clone()))
            },
        ) as ProducerPtr
    })
}

/// Creates a single extension stage, suitable for [Container::extend].
pub(super) fn extension(
    classes: &Rc<ClassRegistry>,
    name: &str,
    extension: &str,
) -> impl Fn(InstancePtr, &Container) -> Result<InstancePtr, LocatorError> + 'static {
    let classes = classes.clone();
    let name = name.to_string();
    let extension = extension.to_string();

    move |instance, container| {
        let factory = classes.extension(&extension)?;
        factory.extend(instance, container, &name)
    }
}
