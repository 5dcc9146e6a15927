//! Access to the `dependencies` section of a [Configuration].
//!
//! Every sub-section is optional and defaults to empty. Sub-sections are either mappings or plain
//! lists - list items are keyed by their stringified position, the same way a mapping with
//! numeric keys would be. Values are validated only when a section is read, so a malformed section
//! fails the wiring stage consuming it and nothing earlier.

use crate::error::WiringError;
use crate::value::{ConfigMap, ConfigValue, Configuration};
use crate::wiring::CONFIG_KEY;
use itertools::Itertools;
use std::borrow::Cow;

/// Key of the configuration section describing services.
pub const DEPENDENCIES_KEY: &str = "dependencies";

pub const SERVICES: &str = "services";
pub const INVOKABLES: &str = "invokables";
pub const FACTORIES: &str = "factories";
pub const ALIASES: &str = "aliases";
pub const DELEGATORS: &str = "delegators";
pub const EXTENSIONS: &str = "extensions";

/// Section entries in declared order.
pub type Entries<'a, V> = Vec<(Cow<'a, str>, V)>;

/// Kind of registration performed for a single key.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RegistrationKind {
    /// The whole configuration, stored under [CONFIG_KEY].
    Configuration,
    /// Pre-built instance.
    Instance,
    /// Class constructed without arguments.
    Invokable { class: String },
    /// Service created by a factory.
    Factory { factory: String },
    /// Key resolving to the same instance as another one.
    Alias { target: String },
    /// Delegators wrapping the existing registration, innermost first.
    Delegators(Vec<String>),
    /// Extensions decorating the created instance, in application order.
    Extensions(Vec<String>),
}

/// Read-only view of the `dependencies` section.
#[derive(Clone, Copy, Debug, Default)]
pub struct Dependencies<'a> {
    section: Option<&'a ConfigMap>,
}

impl<'a> Dependencies<'a> {
    pub fn from_config(config: &'a Configuration) -> Result<Self, WiringError> {
        match config.get(DEPENDENCIES_KEY) {
            None | Some(ConfigValue::Null) => Ok(Self::default()),
            Some(ConfigValue::Map(section)) => Ok(Self {
                section: Some(section),
            }),
            Some(_) => Err(WiringError::Shape {
                path: DEPENDENCIES_KEY.to_string(),
                expected: "a mapping",
            }),
        }
    }

    /// Checks if the section is missing or has no sub-sections.
    pub fn is_empty(&self) -> bool {
        self.section.map(ConfigMap::is_empty).unwrap_or(true)
    }

    /// Service name to pre-built value.
    pub fn services(&self) -> Result<Entries<'a, &'a ConfigValue>, WiringError> {
        self.entries(SERVICES)
    }

    /// Service name (or position) to invokable class name.
    pub fn invokables(&self) -> Result<Entries<'a, &'a str>, WiringError> {
        self.names(INVOKABLES)
    }

    /// Service name to factory name.
    pub fn factories(&self) -> Result<Entries<'a, &'a str>, WiringError> {
        self.names(FACTORIES)
    }

    /// Alias to target service name.
    pub fn aliases(&self) -> Result<Entries<'a, &'a str>, WiringError> {
        self.names(ALIASES)
    }

    /// Service name to delegator class names.
    pub fn delegators(&self) -> Result<Entries<'a, Vec<&'a str>>, WiringError> {
        self.chains(DELEGATORS)
    }

    /// Service name to extension class names.
    pub fn extensions(&self) -> Result<Entries<'a, Vec<&'a str>>, WiringError> {
        self.chains(EXTENSIONS)
    }

    /// Lists registrations the wiring performs for this section, in order. Keys can repeat - the
    /// last registration wins, with delegators and extensions layered over the earlier ones.
    pub fn plan(&self) -> Result<Vec<(String, RegistrationKind)>, WiringError> {
        let mut plan = vec![(CONFIG_KEY.to_string(), RegistrationKind::Configuration)];

        plan.extend(
            self.services()?
                .into_iter()
                .map(|(name, _)| (name.into_owned(), RegistrationKind::Instance)),
        );

        for (name, class) in self.invokables()? {
            let aliased = name != class;
            let name = name.into_owned();

            plan.push((
                name.clone(),
                RegistrationKind::Invokable {
                    class: class.to_string(),
                },
            ));

            if aliased {
                plan.push((class.to_string(), RegistrationKind::Alias { target: name }));
            }
        }

        plan.extend(self.factories()?.into_iter().map(|(name, factory)| {
            (
                name.into_owned(),
                RegistrationKind::Factory {
                    factory: factory.to_string(),
                },
            )
        }));

        plan.extend(self.aliases()?.into_iter().map(|(name, target)| {
            (
                name.into_owned(),
                RegistrationKind::Alias {
                    target: target.to_string(),
                },
            )
        }));

        plan.extend(
            self.delegators()?
                .into_iter()
                .filter(|(_, chain)| !chain.is_empty())
                .map(|(name, chain)| {
                    (
                        name.into_owned(),
                        RegistrationKind::Delegators(chain.iter().map(|c| c.to_string()).collect()),
                    )
                }),
        );

        plan.extend(
            self.extensions()?
                .into_iter()
                .filter(|(_, chain)| !chain.is_empty())
                .map(|(name, chain)| {
                    (
                        name.into_owned(),
                        RegistrationKind::Extensions(chain.iter().map(|c| c.to_string()).collect()),
                    )
                }),
        );

        Ok(plan)
    }

    fn entries(&self, section: &str) -> Result<Entries<'a, &'a ConfigValue>, WiringError> {
        let Some(value) = self.section.and_then(|entries| entries.get(section)) else {
            return Ok(vec![]);
        };

        match value {
            ConfigValue::Null => Ok(vec![]),
            ConfigValue::Map(entries) => Ok(entries
                .iter()
                .map(|(key, value)| (Cow::Borrowed(key.as_str()), value))
                .collect()),
            ConfigValue::List(items) => Ok(items
                .iter()
                .enumerate()
                .map(|(index, value)| (Cow::Owned(index.to_string()), value))
                .collect()),
            _ => Err(shape_error(section, None, "a mapping or a list")),
        }
    }

    fn names(&self, section: &str) -> Result<Entries<'a, &'a str>, WiringError> {
        self.entries(section)?
            .into_iter()
            .map(|(key, value)| match value.as_str() {
                Some(name) => Ok((key, name)),
                None => Err(shape_error(section, Some(&*key), "a name")),
            })
            .try_collect()
    }

    fn chains(&self, section: &str) -> Result<Entries<'a, Vec<&'a str>>, WiringError> {
        self.entries(section)?
            .into_iter()
            .map(|(key, value)| -> Result<(Cow<'a, str>, Vec<&'a str>), WiringError> {
                let chain: Vec<&'a str> = value
                    .as_list()
                    .ok_or_else(|| shape_error(section, Some(&*key), "a list of class names"))?
                    .iter()
                    .map(|item| {
                        item.as_str()
                            .ok_or_else(|| shape_error(section, Some(&*key), "a list of class names"))
                    })
                    .try_collect()?;

                Ok((key, chain))
            })
            .try_collect()
    }
}

fn shape_error(section: &str, key: Option<&str>, expected: &'static str) -> WiringError {
    let path = match key {
        Some(key) => format!("{DEPENDENCIES_KEY}.{section}.{key}"),
        None => format!("{DEPENDENCIES_KEY}.{section}"),
    };

    WiringError::Shape { path, expected }
}

#[cfg(test)]
mod tests {
    use crate::dependencies::{Dependencies, RegistrationKind, DEPENDENCIES_KEY};
    use crate::error::WiringError;
    use crate::value::{ConfigValue, Configuration};
    use crate::wiring::CONFIG_KEY;

    fn config(dependencies: ConfigValue) -> Configuration {
        Configuration::from_iter([(DEPENDENCIES_KEY, dependencies)])
    }

    #[test]
    fn should_default_to_empty_sections() {
        let config = Configuration::from_iter([("foo", "bar")]);
        let dependencies = Dependencies::from_config(&config).unwrap();

        assert!(dependencies.is_empty());
        assert!(dependencies.services().unwrap().is_empty());
        assert!(dependencies.invokables().unwrap().is_empty());
        assert!(dependencies.factories().unwrap().is_empty());
        assert!(dependencies.aliases().unwrap().is_empty());
        assert!(dependencies.delegators().unwrap().is_empty());
        assert!(dependencies.extensions().unwrap().is_empty());
    }

    #[test]
    fn should_reject_non_map_dependencies() {
        let config = config(ConfigValue::from("invalid"));

        assert!(matches!(
            Dependencies::from_config(&config).unwrap_err(),
            WiringError::Shape { path, .. } if path == DEPENDENCIES_KEY
        ));
    }

    #[test]
    fn should_key_list_entries_by_position() {
        let config = config(ConfigValue::map([(
            "invokables",
            ConfigValue::list(["app::First", "app::Second"]),
        )]));
        let dependencies = Dependencies::from_config(&config).unwrap();

        let invokables: Vec<_> = dependencies
            .invokables()
            .unwrap()
            .into_iter()
            .map(|(key, class)| (key.into_owned(), class))
            .collect();
        assert_eq!(
            invokables,
            vec![
                ("0".to_string(), "app::First"),
                ("1".to_string(), "app::Second")
            ]
        );
    }

    #[test]
    fn should_keep_declared_order() {
        let config = config(ConfigValue::map([(
            "aliases",
            ConfigValue::map([("z", "target"), ("a", "target")]),
        )]));
        let dependencies = Dependencies::from_config(&config).unwrap();

        let aliases: Vec<_> = dependencies
            .aliases()
            .unwrap()
            .into_iter()
            .map(|(key, _)| key.into_owned())
            .collect();
        assert_eq!(aliases, vec!["z", "a"]);
    }

    #[test]
    fn should_reject_non_string_class_name() {
        let config = config(ConfigValue::map([(
            "factories",
            ConfigValue::map([("service", 5_i64)]),
        )]));
        let dependencies = Dependencies::from_config(&config).unwrap();

        assert!(matches!(
            dependencies.factories().unwrap_err(),
            WiringError::Shape { path, .. } if path == "dependencies.factories.service"
        ));
    }

    #[test]
    fn should_reject_non_list_chain() {
        let config = config(ConfigValue::map([(
            "delegators",
            ConfigValue::map([("service", "app::Delegator")]),
        )]));
        let dependencies = Dependencies::from_config(&config).unwrap();

        assert!(matches!(
            dependencies.delegators().unwrap_err(),
            WiringError::Shape { path, expected } if path == "dependencies.delegators.service"
                && expected == "a list of class names"
        ));
    }

    #[test]
    fn should_reject_scalar_section() {
        let config = config(ConfigValue::map([("services", true)]));
        let dependencies = Dependencies::from_config(&config).unwrap();

        assert!(matches!(
            dependencies.services().unwrap_err(),
            WiringError::Shape { path, .. } if path == "dependencies.services"
        ));
    }

    #[test]
    fn should_plan_registrations_in_stage_order() {
        let config = config(ConfigValue::map([
            (
                "extensions",
                ConfigValue::map([
                    ("service", ConfigValue::list(["app::Extension"])),
                    ("unchanged", ConfigValue::List(vec![])),
                ]),
            ),
            ("aliases", ConfigValue::map([("alias", "service")])),
            (
                "invokables",
                ConfigValue::map([("service", "app::Service"), ("app::Own", "app::Own")]),
            ),
            ("services", ConfigValue::map([("instance", 1_i64)])),
            ("factories", ConfigValue::map([("made", "app::Factory")])),
            (
                "delegators",
                ConfigValue::map([("made", ConfigValue::list(["app::D1", "app::D2"]))]),
            ),
        ]));
        let dependencies = Dependencies::from_config(&config).unwrap();

        assert_eq!(
            dependencies.plan().unwrap(),
            vec![
                (CONFIG_KEY.to_string(), RegistrationKind::Configuration),
                ("instance".to_string(), RegistrationKind::Instance),
                (
                    "service".to_string(),
                    RegistrationKind::Invokable {
                        class: "app::Service".to_string()
                    }
                ),
                (
                    "app::Service".to_string(),
                    RegistrationKind::Alias {
                        target: "service".to_string()
                    }
                ),
                (
                    "app::Own".to_string(),
                    RegistrationKind::Invokable {
                        class: "app::Own".to_string()
                    }
                ),
                (
                    "made".to_string(),
                    RegistrationKind::Factory {
                        factory: "app::Factory".to_string()
                    }
                ),
                (
                    "alias".to_string(),
                    RegistrationKind::Alias {
                        target: "service".to_string()
                    }
                ),
                (
                    "made".to_string(),
                    RegistrationKind::Delegators(vec![
                        "app::D1".to_string(),
                        "app::D2".to_string()
                    ])
                ),
                (
                    "service".to_string(),
                    RegistrationKind::Extensions(vec!["app::Extension".to_string()])
                ),
            ]
        );
    }
}
