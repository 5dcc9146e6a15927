mod container_test {
    use lazywire_locator::container::Container;
    use lazywire_locator::instance_provider::{InstancePtr, ServiceProvider, TypedServiceProvider};
    use lazywire_locator::LocatorError;
    use std::rc::Rc;

    struct Repository {
        url: Rc<String>,
    }

    struct Cached {
        inner: InstancePtr,
    }

    fn container() -> Container {
        let container = Container::new();
        container.set("url", Rc::new("postgres://localhost".to_string()));
        container.register_fn("repository", |container| {
            Ok(Rc::new(Repository {
                url: container.instance_typed::<String>("url")?,
            }) as InstancePtr)
        });
        container
    }

    #[test]
    fn should_resolve_dependent_services() {
        let container = container();

        let repository = container.instance_typed::<Repository>("repository").unwrap();
        assert!(Rc::ptr_eq(
            &repository.url,
            &container.instance_typed::<String>("url").unwrap()
        ));
    }

    #[test]
    fn should_decorate_through_alias() {
        let container = container();
        container.alias("repo", "repository").unwrap();
        container
            .extend("repository", |instance, _| {
                Ok(Rc::new(Cached { inner: instance }) as InstancePtr)
            })
            .unwrap();

        let cached = container.instance_typed::<Cached>("repo").unwrap();
        assert!(cached.inner.is::<Repository>());
        assert!(Rc::ptr_eq(
            &cached,
            &container.instance_typed::<Cached>("repository").unwrap()
        ));
    }

    #[test]
    fn should_replace_with_wrapping_producer() {
        let container = container();
        let previous = container.raw("repository").unwrap();
        let callback = container.callback(previous);
        container.register_fn("repository", move |_| {
            Ok(Rc::new(Cached { inner: callback()? }) as InstancePtr)
        });

        let cached = container.instance_typed::<Cached>("repository").unwrap();
        assert!(cached.inner.is::<Repository>());
    }

    #[test]
    fn should_propagate_missing_dependency() {
        let container = Container::new();
        container.register_fn("repository", |container| {
            container.instance("url")
        });

        assert!(matches!(
            container.instance("repository").unwrap_err(),
            LocatorError::UnknownService(name) if name == "url"
        ));
        assert!(container.instance_option::<Repository>("missing").unwrap().is_none());
    }
}
