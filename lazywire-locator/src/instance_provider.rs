use crate::container::Container;
use crate::error::LocatorError;
#[cfg(test)]
use mockall::automock;
use std::any::{type_name, Any};
use std::error::Error;
use std::rc::Rc;

/// Shared pointer to a type-erased service instance.
pub type InstancePtr = Rc<dyn Any>;

/// Shared pointer to an error raised by a producer.
pub type ErrorPtr = Rc<dyn Error>;

/// Deferred computation creating an instance for a given key. Producers receive the container
/// resolving them, so they can depend on other services.
pub type ProducerPtr = Rc<dyn Fn(&Container) -> Result<InstancePtr, LocatorError>>;

/// Zero-argument form of a producer, bound to a container.
pub type CallbackPtr = Rc<dyn Fn() -> Result<InstancePtr, LocatorError>>;

/// Generic provider for service instances.
#[cfg_attr(test, automock)]
pub trait ServiceProvider {
    /// Resolves the instance registered under the given name, creating it if needed.
    fn instance(&self, name: &str) -> Result<InstancePtr, LocatorError>;

    /// Checks if there's anything registered under the given name.
    fn contains(&self, name: &str) -> bool;
}

/// Helper trait for [ServiceProvider] providing strongly-typed access.
pub trait TypedServiceProvider {
    /// Typesafe version of [ServiceProvider::instance].
    fn instance_typed<T: 'static>(&self, name: &str) -> Result<Rc<T>, LocatorError>;

    /// Tries to get an instance like [TypedServiceProvider::instance_typed] does, but returns
    /// `None` when nothing is registered under the name.
    fn instance_option<T: 'static>(&self, name: &str) -> Result<Option<Rc<T>>, LocatorError>;
}

impl<SP: ServiceProvider + ?Sized> TypedServiceProvider for SP {
    fn instance_typed<T: 'static>(&self, name: &str) -> Result<Rc<T>, LocatorError> {
        self.instance(name)?
            .downcast::<T>()
            .map_err(|_| LocatorError::IncompatibleService {
                name: name.to_string(),
                type_name: type_name::<T>(),
            })
    }

    fn instance_option<T: 'static>(&self, name: &str) -> Result<Option<Rc<T>>, LocatorError> {
        if self.contains(name) {
            self.instance_typed(name).map(Some)
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::LocatorError;
    use crate::instance_provider::{InstancePtr, MockServiceProvider, TypedServiceProvider};
    use mockall::predicate::*;
    use std::rc::Rc;

    #[test]
    fn should_downcast_instance() {
        let mut provider = MockServiceProvider::new();
        provider
            .expect_instance()
            .with(eq("answer"))
            .times(1)
            .returning(|_| Ok(Rc::new(42_u32) as InstancePtr));

        assert_eq!(*provider.instance_typed::<u32>("answer").unwrap(), 42);
    }

    #[test]
    fn should_reject_incompatible_instance() {
        let mut provider = MockServiceProvider::new();
        provider
            .expect_instance()
            .returning(|_| Ok(Rc::new(42_u32) as InstancePtr));

        assert!(matches!(
            provider.instance_typed::<String>("answer").unwrap_err(),
            LocatorError::IncompatibleService { name, .. } if name == "answer"
        ));
    }

    #[test]
    fn should_return_none_for_missing_option() {
        let mut provider = MockServiceProvider::new();
        provider.expect_contains().with(eq("missing")).return_const(false);
        provider.expect_instance().never();

        assert!(provider
            .instance_option::<u32>("missing")
            .unwrap()
            .is_none());
    }

    #[test]
    fn should_return_present_option() {
        let mut provider = MockServiceProvider::new();
        provider.expect_contains().return_const(true);
        provider
            .expect_instance()
            .times(1)
            .returning(|_| Ok(Rc::new(7_i8) as InstancePtr));

        assert_eq!(*provider.instance_option::<i8>("seven").unwrap().unwrap(), 7);
    }
}
