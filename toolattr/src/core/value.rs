//! Dynamic values flowing through attribute reads and writes.
//!
//! Attribute writes accept loosely shaped input (any string container, any
//! scalar) and reject the wrong shapes at runtime. Containers carry an explicit
//! [`CollectionKind`] tag instead of being inspected structurally.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Container kinds accepted by list attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    /// Ordered sequence (vector, array, slice).
    Sequence,
    /// Set; iteration order is whatever the source set produced.
    Set,
    /// Keys of a map.
    MapKeys,
    /// Values of a map.
    MapValues,
}

impl CollectionKind {
    pub fn name(self) -> &'static str {
        match self {
            CollectionKind::Sequence => "sequence",
            CollectionKind::Set => "set",
            CollectionKind::MapKeys => "map keys",
            CollectionKind::MapValues => "map values",
        }
    }
}

/// A tagged input container whose items have not been checked yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    kind: CollectionKind,
    items: Vec<Value>,
}

impl Collection {
    pub fn new<I, V>(kind: CollectionKind, items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            kind,
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    pub fn sequence<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new(CollectionKind::Sequence, items)
    }

    pub fn set<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new(CollectionKind::Set, items)
    }

    /// Collect the keys of a map, in the map's iteration order.
    pub fn keys<'a, M, K, V>(map: M) -> Self
    where
        M: IntoIterator<Item = (&'a K, &'a V)>,
        K: Clone + Into<Value> + 'a,
        V: 'a,
    {
        Self::new(
            CollectionKind::MapKeys,
            map.into_iter().map(|(key, _)| key.clone()),
        )
    }

    /// Collect the values of a map, in the map's iteration order.
    pub fn values<'a, M, K, V>(map: M) -> Self
    where
        M: IntoIterator<Item = (&'a K, &'a V)>,
        K: 'a,
        V: Clone + Into<Value> + 'a,
    {
        Self::new(
            CollectionKind::MapValues,
            map.into_iter().map(|(_, value)| value.clone()),
        )
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Value> {
        self.items
    }
}

/// Immutable, cheaply clonable sequence of strings stored by list attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringList(Arc<[String]>);

impl StringList {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.to_vec()
    }
}

impl Deref for StringList {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for StringList {
    fn from(items: Vec<String>) -> Self {
        Self(items.into())
    }
}

impl<'a> IntoIterator for &'a StringList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for StringList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// A value read from or written to an attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Absent value.
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Str(String),
    /// Normalized, immutable list as stored by list attributes.
    List(StringList),
    /// Unchecked input container.
    Collection(Collection),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Collection(c) => c.kind().name(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&StringList> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Unwrap a boolean, or fail with a type error.
    pub fn to_bool(&self) -> Result<bool> {
        self.as_bool()
            .ok_or_else(|| Error::type_mismatch("value", "bool", self.type_name()))
    }

    /// Unwrap a string, or fail with a type error.
    pub fn into_str(self) -> Result<String> {
        match self {
            Value::Str(s) => Ok(s),
            other => Err(Error::type_mismatch("value", "str", other.type_name())),
        }
    }

    /// Unwrap a stored string list, or fail with a type error.
    pub fn into_list(self) -> Result<StringList> {
        match self {
            Value::List(list) => Ok(list),
            other => Err(Error::type_mismatch("value", "list", other.type_name())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("none"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Str(s) => f.write_str(s),
            Value::List(list) => write!(f, "{list}"),
            Value::Collection(c) => {
                let items: Vec<String> = c.items().iter().map(ToString::to_string).collect();
                write!(f, "{}[{}]", c.kind().name(), items.join(", "))
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::Str(value.clone())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::None, Into::into)
    }
}

impl From<StringList> for Value {
    fn from(value: StringList) -> Self {
        Value::List(value)
    }
}

impl From<Collection> for Value {
    fn from(value: Collection) -> Self {
        Value::Collection(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Collection(Collection::sequence(items))
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(items: [T; N]) -> Self {
        Value::Collection(Collection::sequence(items))
    }
}

impl<T: Into<Value>> From<BTreeSet<T>> for Value {
    fn from(items: BTreeSet<T>) -> Self {
        Value::Collection(Collection::set(items))
    }
}

impl<T: Into<Value>> From<HashSet<T>> for Value {
    fn from(items: HashSet<T>) -> Self {
        Value::Collection(Collection::set(items))
    }
}
