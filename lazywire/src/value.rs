//! Configuration data model. A [Configuration] is an ordered mapping of [ConfigValue]s, which can
//! be deserialized from any serde source or built in code. Apart from plain data, values can carry
//! pre-built service instances, which get registered as-is.

use derivative::Derivative;
use derive_more::{Deref, From};
use indexmap::IndexMap;
use lazywire_locator::instance_provider::InstancePtr;
use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt::Formatter;
use std::rc::Rc;

/// Ordered mapping of configuration values. Order is significant: registrations happen in the
/// declared order and later entries overwrite earlier ones for the same key.
pub type ConfigMap = IndexMap<String, ConfigValue>;

/// Single configuration value.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<ConfigValue>),
    Map(ConfigMap),
    /// Opaque, pre-built service instance.
    Instance(#[derivative(Debug = "ignore")] InstancePtr),
}

impl ConfigValue {
    /// Creates a map value from given entries, preserving their order.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<ConfigValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    /// Creates a list value from given items.
    pub fn list<V: Into<ConfigValue>, I: IntoIterator<Item = V>>(items: I) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Wraps a service instance.
    pub fn instance<T: 'static>(instance: Rc<T>) -> Self {
        Self::Instance(instance)
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(value) => Some(value),
            _ => None,
        }
    }

    #[inline]
    pub fn as_map(&self) -> Option<&ConfigMap> {
        match self {
            ConfigValue::Map(value) => Some(value),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::List(value) => Some(value),
            _ => None,
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<InstancePtr> for ConfigValue {
    fn from(value: InstancePtr) -> Self {
        Self::Instance(value)
    }
}

impl<V: Into<ConfigValue>> From<Vec<V>> for ConfigValue {
    fn from(value: Vec<V>) -> Self {
        Self::list(value)
    }
}

impl From<ConfigMap> for ConfigValue {
    fn from(value: ConfigMap) -> Self {
        Self::Map(value)
    }
}

impl<'de> Deserialize<'de> for ConfigValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ConfigValueVisitor)
    }
}

struct ConfigValueVisitor;

impl<'de> Visitor<'de> for ConfigValueVisitor {
    type Value = ConfigValue;

    fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
        formatter.write_str("a configuration value")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E> {
        Ok(ConfigValue::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
        Ok(ConfigValue::Integer(v))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
        Ok(i64::try_from(v)
            .map(ConfigValue::Integer)
            .unwrap_or(ConfigValue::Float(v as f64)))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
        Ok(ConfigValue::Float(v))
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
        Ok(ConfigValue::String(v.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E> {
        Ok(ConfigValue::String(v))
    }

    fn visit_none<E>(self) -> Result<Self::Value, E> {
        Ok(ConfigValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        ConfigValue::deserialize(deserializer)
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E> {
        Ok(ConfigValue::Null)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or_default());
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }

        Ok(ConfigValue::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = ConfigMap::with_capacity(map.size_hint().unwrap_or_default());
        while let Some((key, value)) = map.next_entry::<String, ConfigValue>()? {
            entries.insert(key, value);
        }

        Ok(ConfigValue::Map(entries))
    }
}

/// Top-level application configuration. Only the `dependencies` section is interpreted by the
/// wiring; all other keys are opaque and available to consumers through the container.
#[derive(Deref, From, Clone, Debug, Default)]
pub struct Configuration(ConfigMap);

impl Configuration {
    pub fn new(entries: ConfigMap) -> Self {
        Self(entries)
    }
}

impl<K: Into<String>, V: Into<ConfigValue>> FromIterator<(K, V)> for Configuration {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for Configuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        ConfigMap::deserialize(deserializer).map(Self)
    }
}
