//! Declarative wiring for [lazywire_locator] containers.
//!
//! Applications describe their services as plain configuration data: which instances exist, which
//! classes can be constructed without arguments, which factories produce which services, aliases,
//! and decorator chains applied around (delegators) or after (extensions) instance creation.
//! [ServiceConfig](wiring::ServiceConfig) turns such a [Configuration](value::Configuration) into
//! container registrations. Nothing is constructed during wiring - every registration is lazy and
//! runs on first request.
//!
//! Class names are resolved through a [ClassRegistry](class_registry::ClassRegistry), which maps
//! names to zero-argument constructors. Classes can be added to the registry explicitly or
//! submitted statically and collected at startup.
//!
//! ```
//! use lazywire::class_registry::ClassRegistry;
//! use lazywire::value::{ConfigValue, Configuration};
//! use lazywire::wiring::ServiceConfig;
//! use lazywire_locator::container::Container;
//! use lazywire_locator::instance_provider::TypedServiceProvider;
//! use std::rc::Rc;
//!
//! #[derive(Default)]
//! struct Mailer;
//!
//! let config = Configuration::from_iter([(
//!     "dependencies",
//!     ConfigValue::map([(
//!         "invokables",
//!         ConfigValue::map([("mailer", "app::Mailer")]),
//!     )]),
//! )]);
//! let classes = ClassRegistry::new().with_invokable::<Mailer>("app::Mailer");
//!
//! let container = Container::new();
//! ServiceConfig::new(Rc::new(config), Rc::new(classes))
//!     .configure_container(&container)
//!     .unwrap();
//!
//! let mailer = container.instance_typed::<Mailer>("mailer").unwrap();
//! let same = container.instance_typed::<Mailer>("app::Mailer").unwrap();
//! assert!(Rc::ptr_eq(&mailer, &same));
//! ```

pub mod class_registry;
pub mod dependencies;
mod error;
pub mod loader;
pub mod value;
pub mod wiring;

pub use error::{ClassRole, WiringError};
