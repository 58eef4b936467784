//! Converter configuration.
//!
//! Everything the generator needs is plain data here, loadable from JSON or
//! YAML. Keys are accepted in camelCase or snake_case and unknown keys are
//! ignored. Mappings keep the order they were written in, since that order
//! ends up in the generated source.

use std::fmt;
use std::marker::PhantomData;

use convgen_core::literal::{string_literal, symbol_literal};
use serde::de::{Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration for [`ConverterGenerator`](crate::ConverterGenerator).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverterConfig {
    /// Fully qualified name of the generated class, e.g. `My::Converter`.
    #[serde(alias = "class_name")]
    pub class_name: String,
    /// Transform methods, in the order they are emitted.
    #[serde(default, alias = "transforms_code", alias = "transformsCode")]
    pub transforms: TransformSet,
    /// Ruby code shared by all transforms; must declare `module Helpers`.
    #[serde(default, alias = "helpers_code", skip_serializing_if = "Option::is_none")]
    pub helpers_code: Option<String>,
    /// Backends the converter registers itself for.
    #[serde(default, alias = "register_for")]
    pub register_for: RegistrationList,
    /// Backend traits declared in the constructor.
    #[serde(default, alias = "backend_info")]
    pub backend_info: BackendInfo,
    /// Backend of the converter that handles nodes without a transform.
    #[serde(default, alias = "delegate_backend", skip_serializing_if = "Option::is_none")]
    pub delegate_backend: Option<String>,
}

impl ConverterConfig {
    /// Create a configuration for the class `class_name` with nothing else set.
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            ..Self::default()
        }
    }

    /// Append a transform method.
    pub fn with_transform(mut self, name: impl Into<String>, code: impl Into<String>) -> Self {
        self.transforms.push(name, code);
        self
    }

    /// Set the shared helper code.
    pub fn with_helpers(mut self, code: impl Into<String>) -> Self {
        self.helpers_code = Some(code.into());
        self
    }

    /// Register the converter for `backends`.
    pub fn with_register_for(mut self, backends: impl Into<RegistrationList>) -> Self {
        self.register_for = backends.into();
        self
    }

    /// Set one backend trait.
    pub fn with_backend_info(
        mut self,
        key: impl Into<String>,
        value: impl Into<BackendValue>,
    ) -> Self {
        self.backend_info.insert(key, value);
        self
    }

    /// Delegate unhandled nodes to the converter for `backend`.
    pub fn with_delegate_backend(mut self, backend: impl Into<String>) -> Self {
        self.delegate_backend = Some(backend.into());
        self
    }

    /// Parse a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a configuration from a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// A transform method name with the Ruby code of its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transform {
    /// Method name, usually the node name (`paragraph`, `section`, ...).
    pub name: String,
    /// Code evaluated in the context of the node.
    pub code: String,
}

/// Ordered transforms. Names are not deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformSet(Vec<Transform>);

impl TransformSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transform.
    pub fn push(&mut self, name: impl Into<String>, code: impl Into<String>) {
        self.0.push(Transform {
            name: name.into(),
            code: code.into(),
        });
    }

    /// Iterate in emission order.
    pub fn iter(&self) -> std::slice::Iter<'_, Transform> {
        self.0.iter()
    }

    /// Number of transforms, duplicates included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no transforms.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<N: Into<String>, C: Into<String>> FromIterator<(N, C)> for TransformSet {
    fn from_iter<I: IntoIterator<Item = (N, C)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (name, code) in iter {
            set.push(name, code);
        }
        set
    }
}

impl<'a> IntoIterator for &'a TransformSet {
    type Item = &'a Transform;
    type IntoIter = std::slice::Iter<'a, Transform>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for TransformSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for transform in &self.0 {
            map.serialize_entry(&transform.name, &transform.code)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TransformSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pairs = deserializer.deserialize_any(PairsVisitor::<String>::new())?;
        Ok(pairs.into_iter().collect())
    }
}

/// Value of a backend trait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BackendValue {
    /// `true` declares the bare trait; `false` is passed as an argument.
    Flag(bool),
    /// Passed to the trait as a string literal.
    Text(String),
}

impl BackendValue {
    /// Ruby literal for this value.
    pub fn to_ruby(&self) -> String {
        match self {
            BackendValue::Flag(flag) => flag.to_string(),
            BackendValue::Text(text) => string_literal(text),
        }
    }
}

impl From<bool> for BackendValue {
    fn from(flag: bool) -> Self {
        BackendValue::Flag(flag)
    }
}

impl From<&str> for BackendValue {
    fn from(text: &str) -> Self {
        BackendValue::Text(text.to_string())
    }
}

impl From<String> for BackendValue {
    fn from(text: String) -> Self {
        BackendValue::Text(text)
    }
}

/// Backend traits (`basebackend`, `outfilesuffix`, `htmlsyntax`, ...) in
/// declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendInfo(Vec<(String, BackendValue)>);

impl BackendInfo {
    /// Create an empty descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, keeping its original position if it is already present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<BackendValue>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Look up a trait.
    pub fn get(&self, key: &str) -> Option<&BackendValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Iterate in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BackendValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether no trait is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<BackendValue>> FromIterator<(K, V)> for BackendInfo {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut info = Self::new();
        for (key, value) in iter {
            info.insert(key, value);
        }
        info
    }
}

impl Serialize for BackendInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for BackendInfo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pairs = deserializer.deserialize_any(PairsVisitor::<BackendValue>::new())?;
        Ok(pairs.into_iter().collect())
    }
}

/// Accepts a map, a list of `[key, value]` pairs, or null, keeping order.
struct PairsVisitor<V>(PhantomData<V>);

impl<V> PairsVisitor<V> {
    fn new() -> Self {
        Self(PhantomData)
    }
}

impl<'de, V: Deserialize<'de>> Visitor<'de> for PairsVisitor<V> {
    type Value = Vec<(String, V)>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map or a list of [key, value] pairs")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(entry) = map.next_entry::<String, V>()? {
            pairs.push(entry);
        }
        Ok(pairs)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut pairs = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(entry) = seq.next_element::<(String, V)>()? {
            pairs.push(entry);
        }
        Ok(pairs)
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }
}

/// A backend identifier in a `register_for` statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BackendId {
    /// Emitted as a string literal.
    Name(String),
    /// Emitted as a symbol literal.
    Symbol(String),
}

impl BackendId {
    /// Parses `":name"` as a symbol and anything else as a name.
    pub fn parse(value: &str) -> Self {
        match value.strip_prefix(':') {
            Some(symbol) if !symbol.is_empty() => BackendId::Symbol(symbol.to_string()),
            _ => BackendId::Name(value.to_string()),
        }
    }

    /// Ruby literal for this identifier.
    pub fn to_ruby(&self) -> String {
        match self {
            BackendId::Name(name) => string_literal(name),
            BackendId::Symbol(symbol) => symbol_literal(symbol),
        }
    }
}

impl From<&str> for BackendId {
    fn from(value: &str) -> Self {
        BackendId::Name(value.to_string())
    }
}

impl Serialize for BackendId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BackendId::Name(name) => serializer.serialize_str(name),
            BackendId::Symbol(symbol) => serializer.serialize_str(&format!(":{symbol}")),
        }
    }
}

impl<'de> Deserialize<'de> for BackendId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(BackendId::parse(&value))
    }
}

/// Backends to register the converter for. A single identifier is accepted
/// wherever a list is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistrationList(Vec<BackendId>);

impl RegistrationList {
    /// Whether no backend is listed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, BackendId> {
        self.0.iter()
    }
}

impl From<BackendId> for RegistrationList {
    fn from(id: BackendId) -> Self {
        Self(vec![id])
    }
}

impl From<&str> for RegistrationList {
    fn from(name: &str) -> Self {
        Self(vec![BackendId::from(name)])
    }
}

impl From<Vec<BackendId>> for RegistrationList {
    fn from(ids: Vec<BackendId>) -> Self {
        Self(ids)
    }
}

impl<const N: usize> From<[&str; N]> for RegistrationList {
    fn from(names: [&str; N]) -> Self {
        Self(names.into_iter().map(BackendId::from).collect())
    }
}

impl<'de> Deserialize<'de> for RegistrationList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(BackendId),
            Many(Vec<BackendId>),
            Nothing(()),
        }

        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(id) => Self(vec![id]),
            OneOrMany::Many(ids) => Self(ids),
            OneOrMany::Nothing(()) => Self::default(),
        })
    }
}
