//! Lazy service locator resolving string keys to shared instances.
//!
//! A [Container](container::Container) maps names to either realized instances or deferred
//! producers. Producers run on first request and their result is memoized, so every later lookup
//! of the same key returns the identical instance. Entries can be aliased, decorated after the
//! fact with [extend](container::Container::extend) or replaced wholesale, which is what
//! configuration-driven wiring layers build upon.
//!
//! ```
//! use lazywire_locator::container::Container;
//! use lazywire_locator::instance_provider::{InstancePtr, TypedServiceProvider};
//! use std::rc::Rc;
//!
//! let container = Container::new();
//! container.register_fn("greeting", |_| Ok(Rc::new("hello".to_string()) as InstancePtr));
//! container.alias("welcome", "greeting").unwrap();
//!
//! let greeting = container.instance_typed::<String>("greeting").unwrap();
//! let welcome = container.instance_typed::<String>("welcome").unwrap();
//! assert!(Rc::ptr_eq(&greeting, &welcome));
//! ```

pub mod container;
mod error;
pub mod instance_provider;

pub use error::LocatorError;
